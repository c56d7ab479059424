// timer.rs
use crate::error::{QuizError, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, PartialEq, Eq, Clone, Copy, Default, Serialize, Deserialize)]
pub enum TimerPhase {
    #[default]
    Idle,
    Running,
    Expired,
}

/// Read-only view of the session countdown.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimerState {
    pub remaining_seconds: u32,
    pub running: bool,
    pub phase: TimerPhase,
    pub duration_seconds: u32,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Tick {
    /// No session is running; the tick changed nothing.
    Ignored,
    Counting { remaining_seconds: u32 },
    /// This tick ended the session. Emitted once per session.
    Expired,
}

#[derive(Debug, Clone, Default)]
pub struct SessionTimer {
    phase: TimerPhase,
    remaining_seconds: u32,
    duration_seconds: u32,
}

impl SessionTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> TimerState {
        TimerState {
            remaining_seconds: self.remaining_seconds,
            running: self.phase == TimerPhase::Running,
            phase: self.phase,
            duration_seconds: self.duration_seconds,
        }
    }

    pub fn phase(&self) -> TimerPhase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == TimerPhase::Running
    }

    pub fn is_expired(&self) -> bool {
        self.phase == TimerPhase::Expired
    }

    /// Arms the countdown from any phase, restarting a running session.
    pub fn start(&mut self, duration_seconds: u32) -> Result<()> {
        if duration_seconds == 0 {
            return Err(QuizError::InvalidDuration);
        }
        self.phase = TimerPhase::Running;
        self.duration_seconds = duration_seconds;
        self.remaining_seconds = duration_seconds;
        Ok(())
    }

    /// Returns to Idle. Reports whether anything changed.
    pub fn stop(&mut self) -> bool {
        if self.phase == TimerPhase::Idle {
            return false;
        }
        self.phase = TimerPhase::Idle;
        self.remaining_seconds = 0;
        true
    }

    pub fn tick(&mut self) -> Tick {
        if self.phase != TimerPhase::Running {
            return Tick::Ignored;
        }
        self.remaining_seconds = self.remaining_seconds.saturating_sub(1);
        if self.remaining_seconds == 0 {
            self.phase = TimerPhase::Expired;
            Tick::Expired
        } else {
            Tick::Counting {
                remaining_seconds: self.remaining_seconds,
            }
        }
    }
}
