//! Scrape scheduler lifecycle states

use serde::{Deserialize, Serialize};

use crate::impl_state_conversions;

/// Lifecycle of one scrape scheduler instance.
///
/// `Idle` and `Stopped` both accept `start()`; only `Running` accepts
/// `stop()`. `Stopping` is observable while `stop()` waits for the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulerState {
    #[default]
    Idle,
    Running,
    Stopping,
    Stopped,
}

impl SchedulerState {
    pub fn can_start(self) -> bool {
        matches!(self, Self::Idle | Self::Stopped)
    }

    pub fn is_running(self) -> bool {
        self == Self::Running
    }
}

impl_state_conversions!(SchedulerState {
    Idle => "idle",
    Running => "running",
    Stopping => "stopping",
    Stopped => "stopped",
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_idle_and_stopped_can_start() {
        assert!(SchedulerState::Idle.can_start());
        assert!(SchedulerState::Stopped.can_start());
        assert!(!SchedulerState::Running.can_start());
        assert!(!SchedulerState::Stopping.can_start());
    }

    #[test]
    fn labels_round_trip() {
        for state in [
            SchedulerState::Idle,
            SchedulerState::Running,
            SchedulerState::Stopping,
            SchedulerState::Stopped,
        ] {
            assert_eq!(state.to_string().parse::<SchedulerState>(), Ok(state));
        }
    }
}
