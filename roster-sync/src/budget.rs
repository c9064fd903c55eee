//! Wall-clock budget for one run.
//!
//! The deadline is only observed at record boundaries; a write in flight is
//! never preempted.

use std::time::Duration;

use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetState {
    Running,
    TimedOut,
}

#[derive(Debug, Clone)]
pub struct Budget {
    deadline: Instant,
    state: BudgetState,
}

impl Budget {
    /// Start the clock now.
    pub fn start(limit: Duration) -> Self {
        Self {
            deadline: Instant::now() + limit,
            state: BudgetState::Running,
        }
    }

    /// Re-evaluate against the clock. Once timed out, stays timed out.
    pub fn check(&mut self) -> BudgetState {
        if self.state == BudgetState::Running && Instant::now() >= self.deadline {
            self.state = BudgetState::TimedOut;
        }
        self.state
    }

    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::advance;

    #[tokio::test(start_paused = true, flavor = "current_thread")]
    async fn times_out_at_deadline_and_stays_timed_out() {
        let mut budget = Budget::start(Duration::from_secs(10));
        assert_eq!(budget.check(), BudgetState::Running);

        advance(Duration::from_secs(9)).await;
        assert_eq!(budget.check(), BudgetState::Running);
        assert_eq!(budget.remaining(), Duration::from_secs(1));

        advance(Duration::from_secs(1)).await;
        assert_eq!(budget.check(), BudgetState::TimedOut);
        assert_eq!(budget.remaining(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true, flavor = "current_thread")]
    async fn zero_budget_is_exhausted_immediately() {
        let mut budget = Budget::start(Duration::ZERO);
        assert_eq!(budget.check(), BudgetState::TimedOut);
    }
}
