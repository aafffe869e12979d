//! Account lockout bookkeeping for sign-in attempts.
//!
//! The state is two persisted fields on the profile row: a failed-attempt
//! counter and a lock flag. Reads happen before a credential check, writes
//! after it. Updates go through plain read-modify-write against the profiles
//! table, so two overlapping attempts on the same account can collapse into a
//! single increment; the source system has the same race and it is accepted
//! here.

/// Consecutive failures after which the account locks.
pub const MAX_FAILED_ATTEMPTS: u32 = 5;

/// Lockout fields of a profile row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LockoutState {
    pub failed_attempts: u32,
    pub locked: bool,
}

impl LockoutState {
    #[must_use]
    pub const fn new(failed_attempts: u32, locked: bool) -> Self {
        Self {
            failed_attempts,
            locked,
        }
    }

    /// A locked account is rejected before any credential check.
    #[must_use]
    pub const fn is_blocked(&self) -> bool {
        self.locked
    }

    /// Nothing to persist when the record is already in the reset state.
    #[must_use]
    pub const fn is_clean(&self) -> bool {
        self.failed_attempts == 0 && !self.locked
    }

    /// Count one failed credential check; locks at the threshold.
    #[must_use]
    pub const fn record_failure(self) -> Self {
        let failed_attempts = self.failed_attempts.saturating_add(1);
        Self {
            failed_attempts,
            locked: failed_attempts >= MAX_FAILED_ATTEMPTS,
        }
    }

    /// State after a successful sign-in or a completed password reset.
    /// The counter and the flag always reset together.
    #[must_use]
    pub const fn reset() -> Self {
        Self {
            failed_attempts: 0,
            locked: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locks_on_fifth_consecutive_failure() {
        let mut state = LockoutState::reset();
        for attempt in 1..MAX_FAILED_ATTEMPTS {
            state = state.record_failure();
            assert_eq!(state.failed_attempts, attempt);
            assert!(!state.locked, "must not lock before the threshold");
        }
        state = state.record_failure();
        assert_eq!(state.failed_attempts, MAX_FAILED_ATTEMPTS);
        assert!(state.locked);
        assert!(state.is_blocked());
    }

    #[test]
    fn failure_at_four_locks_the_account() {
        let state = LockoutState::new(4, false).record_failure();
        assert_eq!(state, LockoutState::new(5, true));
    }

    #[test]
    fn reset_clears_counter_and_flag() {
        let locked = LockoutState::new(7, true);
        let state = LockoutState::reset();
        assert_ne!(locked, state);
        assert_eq!(state.failed_attempts, 0);
        assert!(!state.locked);
        assert!(state.is_clean());
    }

    #[test]
    fn success_after_partial_failures_resets_counter() {
        let state = LockoutState::new(3, false);
        assert!(!state.is_blocked());
        assert!(!state.is_clean());
        assert!(LockoutState::reset().is_clean());
    }

    #[test]
    fn failures_past_threshold_stay_locked() {
        let state = LockoutState::new(9, true).record_failure();
        assert_eq!(state.failed_attempts, 10);
        assert!(state.locked);
    }

    #[test]
    fn counter_saturates_instead_of_wrapping() {
        let state = LockoutState::new(u32::MAX, true).record_failure();
        assert_eq!(state.failed_attempts, u32::MAX);
        assert!(state.locked);
    }
}
