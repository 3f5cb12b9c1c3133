//! Forced Withdrawal Tracker
//!
//! Follows the sponsor's self-service exit from a resource lock:
//! `Disabled → enable → Pending → (withdrawableAt reached) → withdrawable`.
//!
//! The tracker never mutates contract state. Transitions are requested as
//! [`ForcedWithdrawalCall`] values for the caller to submit, and observed
//! afterwards by re-reading status through a [`StatusSource`]. Every
//! evaluation takes a fresh status read and a fresh clock read; nothing that
//! gates a withdrawal is cached between evaluations.
//!
//! `Pending` and `Enabled` are gated identically: both require
//! `now >= withdrawableAt`.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use alloy_primitives::{Address, U256};
use compact_types::errors::RangeError;
use compact_types::ids::ResourceId;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::PollingConfig;
use crate::errors::{CompactError, WithdrawalError};

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Forced-withdrawal status code as reported by the verifying contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForcedWithdrawalStatus {
    Disabled = 0,
    Pending = 1,
    Enabled = 2,
}

impl ForcedWithdrawalStatus {
    pub fn from_code(code: u8) -> Result<Self, RangeError> {
        match code {
            0 => Ok(Self::Disabled),
            1 => Ok(Self::Pending),
            2 => Ok(Self::Enabled),
            other => Err(RangeError::ForcedWithdrawalStatus(other)),
        }
    }

    pub fn code(&self) -> u8 {
        *self as u8
    }

    /// Pending or Enabled.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Pending | Self::Enabled)
    }
}

impl fmt::Display for ForcedWithdrawalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disabled => write!(f, "Disabled"),
            Self::Pending => write!(f, "Pending"),
            Self::Enabled => write!(f, "Enabled"),
        }
    }
}

/// `(status, withdrawableAt)` as read from the contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForcedWithdrawalState {
    pub status: ForcedWithdrawalStatus,
    pub withdrawable_at: u64,
}

impl ForcedWithdrawalState {
    pub fn new(status: ForcedWithdrawalStatus, withdrawable_at: u64) -> Self {
        Self {
            status,
            withdrawable_at,
        }
    }

    pub fn disabled() -> Self {
        Self::new(ForcedWithdrawalStatus::Disabled, 0)
    }

    /// Decode the raw `(statusCode, withdrawableAt)` tuple.
    pub fn from_tuple(code: u8, withdrawable_at: u64) -> Result<Self, RangeError> {
        Ok(Self::new(ForcedWithdrawalStatus::from_code(code)?, withdrawable_at))
    }

    pub fn can_withdraw(&self, now: u64) -> bool {
        can_withdraw(self.status, self.withdrawable_at, now)
    }
}

/// `status ∈ {Pending, Enabled} && now >= withdrawable_at`.
pub fn can_withdraw(status: ForcedWithdrawalStatus, withdrawable_at: u64, now: u64) -> bool {
    status.is_active() && now >= withdrawable_at
}

// ---------------------------------------------------------------------------
// Time and chain reads
// ---------------------------------------------------------------------------

/// Source of the current unix time in seconds.
pub trait Clock {
    fn now(&self) -> u64;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        u64::try_from(chrono::Utc::now().timestamp()).unwrap_or(0)
    }
}

/// Manually advanced clock.
#[derive(Debug, Default)]
pub struct FixedClock {
    now: AtomicU64,
}

impl FixedClock {
    pub fn new(now: u64) -> Self {
        Self {
            now: AtomicU64::new(now),
        }
    }

    pub fn set(&self, now: u64) {
        self.now.store(now, Ordering::SeqCst);
    }

    pub fn advance(&self, secs: u64) {
        self.now.fetch_add(secs, Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> u64 {
        (**self).now()
    }
}

/// Fresh reads of on-chain lock state.
///
/// Implementations must hit the chain (or an equally fresh source) on every
/// call; the tracker relies on it to avoid acting on stale status.
pub trait StatusSource {
    fn forced_withdrawal_status(
        &self,
        owner: &Address,
        id: ResourceId,
    ) -> Result<ForcedWithdrawalState, WithdrawalError>;

    fn balance_of(&self, owner: &Address, id: ResourceId) -> Result<U256, WithdrawalError>;
}

// ---------------------------------------------------------------------------
// Calls
// ---------------------------------------------------------------------------

/// Contract write the caller should submit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "call", rename_all = "snake_case")]
pub enum ForcedWithdrawalCall {
    Enable {
        id: ResourceId,
    },
    Disable {
        id: ResourceId,
    },
    Withdraw {
        id: ResourceId,
        recipient: Address,
        amount: U256,
    },
}

impl ForcedWithdrawalCall {
    pub fn function_name(&self) -> &'static str {
        match self {
            Self::Enable { .. } => "enableForcedWithdrawal",
            Self::Disable { .. } => "disableForcedWithdrawal",
            Self::Withdraw { .. } => "forcedWithdrawal",
        }
    }

    pub fn id(&self) -> ResourceId {
        match self {
            Self::Enable { id } | Self::Disable { id } | Self::Withdraw { id, .. } => *id,
        }
    }
}

// ---------------------------------------------------------------------------
// Progress
// ---------------------------------------------------------------------------

/// Where a lock stands in the forced-withdrawal flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum WithdrawalPhase {
    Idle,
    CoolingDown { withdrawable_at: u64 },
    Withdrawable,
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Upcoming,
    Loading,
    Success,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProgressStep {
    pub label: &'static str,
    pub status: StepStatus,
}

/// Time left until maturity, split for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Countdown {
    pub days: u64,
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
    pub total: u64,
}

impl Countdown {
    pub fn until(withdrawable_at: u64, now: u64) -> Self {
        let total = withdrawable_at.saturating_sub(now);
        Self {
            days: total / 86_400,
            hours: (total % 86_400) / 3_600,
            minutes: (total % 3_600) / 60,
            seconds: total % 60,
            total,
        }
    }

    pub fn is_elapsed(&self) -> bool {
        self.total == 0
    }
}

impl fmt::Display for Countdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.days > 0 {
            write!(f, "{}d {}h {}m {}s", self.days, self.hours, self.minutes, self.seconds)
        } else if self.hours > 0 {
            write!(f, "{}h {}m {}s", self.hours, self.minutes, self.seconds)
        } else {
            write!(f, "{}m {}s", self.minutes, self.seconds)
        }
    }
}

/// Result of one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalSnapshot {
    pub state: ForcedWithdrawalState,
    pub balance: U256,
    pub now: u64,
}

impl WithdrawalSnapshot {
    pub fn can_withdraw(&self) -> bool {
        self.state.can_withdraw(self.now)
    }

    /// Balance drained while the flow was active.
    pub fn is_finished(&self) -> bool {
        self.balance.is_zero() && self.state.status.is_active()
    }

    pub fn phase(&self) -> WithdrawalPhase {
        if self.is_finished() {
            WithdrawalPhase::Finished
        } else if self.state.status == ForcedWithdrawalStatus::Disabled {
            WithdrawalPhase::Idle
        } else if self.can_withdraw() {
            WithdrawalPhase::Withdrawable
        } else {
            WithdrawalPhase::CoolingDown {
                withdrawable_at: self.state.withdrawable_at,
            }
        }
    }

    pub fn countdown(&self) -> Countdown {
        if self.state.status.is_active() {
            Countdown::until(self.state.withdrawable_at, self.now)
        } else {
            Countdown::default()
        }
    }

    /// Enable / wait / execute steps.
    pub fn progress(&self) -> [ProgressStep; 3] {
        let started = self.state.status.is_active();
        let ready = self.can_withdraw();
        let finished = self.is_finished();

        [
            ProgressStep {
                label: "Enable Forced Withdrawal",
                status: if started {
                    StepStatus::Success
                } else {
                    StepStatus::Upcoming
                },
            },
            ProgressStep {
                label: "Wait for Reset Period",
                status: if !started {
                    StepStatus::Upcoming
                } else if ready {
                    StepStatus::Success
                } else {
                    StepStatus::Loading
                },
            },
            ProgressStep {
                label: "Execute Withdrawal",
                status: if finished {
                    StepStatus::Success
                } else if ready {
                    StepStatus::Loading
                } else {
                    StepStatus::Upcoming
                },
            },
        ]
    }
}

/// Delay before the next status poll.
///
/// Only affects freshness of display; gating always re-evaluates.
pub fn next_poll_delay(snapshot: &WithdrawalSnapshot, polling: &PollingConfig) -> Duration {
    let state = &snapshot.state;
    if !state.status.is_active() {
        return Duration::from_secs(polling.far_interval_secs);
    }
    if snapshot.now >= state.withdrawable_at {
        return Duration::from_secs(polling.matured_interval_secs);
    }

    let remaining = state.withdrawable_at - snapshot.now;
    if remaining <= polling.near_window_secs {
        Duration::from_secs(polling.near_interval_secs)
    } else {
        Duration::from_secs(remaining) + Duration::from_millis(polling.maturity_grace_millis)
    }
}

// ---------------------------------------------------------------------------
// Tracker
// ---------------------------------------------------------------------------

/// Evaluates forced-withdrawal state for one lock at a time.
///
/// The only state kept between evaluations is the last observed snapshot,
/// used for transition logging. It never feeds a gating decision.
#[derive(Debug)]
pub struct ForcedWithdrawalTracker<C: Clock = SystemClock> {
    clock: C,
    polling: PollingConfig,
    last: Option<WithdrawalSnapshot>,
}

impl ForcedWithdrawalTracker<SystemClock> {
    pub fn with_defaults() -> Self {
        Self::new(SystemClock, PollingConfig::default())
    }
}

impl<C: Clock> ForcedWithdrawalTracker<C> {
    pub fn new(clock: C, polling: PollingConfig) -> Self {
        Self {
            clock,
            polling,
            last: None,
        }
    }

    pub fn now(&self) -> u64 {
        self.clock.now()
    }

    pub fn polling(&self) -> &PollingConfig {
        &self.polling
    }

    /// Last snapshot seen, for display only.
    pub fn last_snapshot(&self) -> Option<&WithdrawalSnapshot> {
        self.last.as_ref()
    }

    /// Read status and balance fresh and evaluate against the current time.
    pub fn evaluate<S: StatusSource + ?Sized>(
        &mut self,
        source: &S,
        owner: &Address,
        id: ResourceId,
    ) -> Result<WithdrawalSnapshot, WithdrawalError> {
        let state = source.forced_withdrawal_status(owner, id).map_err(|e| {
            warn!(lock_id = %id, error = %e, "Forced withdrawal status read failed");
            e
        })?;
        let balance = source.balance_of(owner, id)?;
        Ok(self.observe(state, balance))
    }

    /// Evaluate a state the caller has just read.
    pub fn observe(&mut self, state: ForcedWithdrawalState, balance: U256) -> WithdrawalSnapshot {
        let snapshot = WithdrawalSnapshot {
            state,
            balance,
            now: self.clock.now(),
        };

        match &self.last {
            Some(prev) if prev.state.status != state.status => {
                info!(
                    from = %prev.state.status,
                    to = %state.status,
                    withdrawable_at = state.withdrawable_at,
                    "Forced withdrawal status changed"
                );
            }
            None => {
                debug!(
                    status = %state.status,
                    withdrawable_at = state.withdrawable_at,
                    "Forced withdrawal status observed"
                );
            }
            _ => {}
        }
        let was_ready = self.last.map(|s| s.can_withdraw()).unwrap_or(false);
        if snapshot.can_withdraw() && !was_ready {
            info!(
                withdrawable_at = state.withdrawable_at,
                now = snapshot.now,
                "Forced withdrawal matured"
            );
        }

        self.last = Some(snapshot);
        snapshot
    }

    /// Delay before the next poll for `snapshot`.
    pub fn next_poll_delay(&self, snapshot: &WithdrawalSnapshot) -> Duration {
        next_poll_delay(snapshot, &self.polling)
    }

    /// Call that starts the reset-period countdown.
    pub fn request_enable<S: StatusSource + ?Sized>(
        &mut self,
        source: &S,
        owner: &Address,
        id: ResourceId,
    ) -> Result<ForcedWithdrawalCall, WithdrawalError> {
        let snapshot = self.evaluate(source, owner, id)?;
        if snapshot.state.status.is_active() {
            return Err(WithdrawalError::AlreadyEnabled);
        }
        Ok(ForcedWithdrawalCall::Enable { id })
    }

    /// Call that cancels a pending or enabled forced withdrawal.
    pub fn request_disable<S: StatusSource + ?Sized>(
        &mut self,
        source: &S,
        owner: &Address,
        id: ResourceId,
    ) -> Result<ForcedWithdrawalCall, WithdrawalError> {
        let snapshot = self.evaluate(source, owner, id)?;
        if !snapshot.state.status.is_active() {
            return Err(WithdrawalError::NotEnabled);
        }
        Ok(ForcedWithdrawalCall::Disable { id })
    }

    /// Call that executes the withdrawal, gated on a fresh evaluation.
    ///
    /// `recipient` defaults to `owner`; `amount` defaults to the full balance.
    pub fn request_withdraw<S: StatusSource + ?Sized>(
        &mut self,
        source: &S,
        owner: &Address,
        id: ResourceId,
        recipient: Option<Address>,
        amount: Option<U256>,
    ) -> Result<ForcedWithdrawalCall, CompactError> {
        let snapshot = self.evaluate(source, owner, id)?;
        if !snapshot.state.status.is_active() {
            return Err(WithdrawalError::NotEnabled.into());
        }
        if !snapshot.can_withdraw() {
            return Err(WithdrawalError::NotMatured {
                withdrawable_at: snapshot.state.withdrawable_at,
                now: snapshot.now,
            }
            .into());
        }

        let amount = amount.unwrap_or(snapshot.balance);
        if amount.is_zero() {
            return Err(WithdrawalError::InvalidAmount.into());
        }

        Ok(ForcedWithdrawalCall::Withdraw {
            id,
            recipient: recipient.unwrap_or(*owner),
            amount,
        })
    }
}
