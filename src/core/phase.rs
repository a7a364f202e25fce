use crate::core::event::{GenerationEvent, Phase};

/// Where a generation session currently stands. Owned by the state machine
/// for the lifetime of one session, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Planning,
    Architecting,
    Coding,
    Complete,
    Failed,
}

impl SessionState {
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionState::Complete | SessionState::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Planning => "planning",
            SessionState::Architecting => "architecting",
            SessionState::Coding => "coding",
            SessionState::Complete => "complete",
            SessionState::Failed => "failed",
        }
    }
}

fn target_state(phase: Phase) -> SessionState {
    match phase {
        Phase::Planning => SessionState::Planning,
        Phase::Architect => SessionState::Architecting,
        Phase::Coding => SessionState::Coding,
        Phase::Complete => SessionState::Complete,
        Phase::Error => SessionState::Failed,
    }
}

/// What `apply` did with an incoming event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// The session moved to a new state.
    Transition(SessionState),
    /// Same-phase event: message/details updated, state and progress kept.
    Refresh,
    /// The session already reached a terminal state; event dropped.
    IgnoredTerminal,
}

/// Drives `Idle -> Planning -> Architecting -> Coding -> Complete` (with
/// `Failed` reachable from any non-terminal state) off the event stream.
pub struct PhaseStateMachine {
    state: SessionState,
    progress: f32,
    message: String,
    details: Option<String>,
}

impl PhaseStateMachine {
    pub fn new() -> Self {
        PhaseStateMachine {
            state: SessionState::Idle,
            progress: 0.0,
            message: String::new(),
            details: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn details(&self) -> Option<&str> {
        self.details.as_deref()
    }

    /// The whole ordering policy lives here. The producer is trusted, so any
    /// move is accepted while the session is live, including backward ones
    /// (a replanning producer re-enters earlier phases). Tightening to
    /// forward-only ordering means changing this one function.
    fn transition_allowed(current: SessionState, _target: SessionState) -> bool {
        !current.is_terminal()
    }

    /// Fixed per-state fraction; `None` leaves the last-known value (Failed
    /// keeps whatever progress the session had reached).
    fn progress_for(state: SessionState) -> Option<f32> {
        match state {
            SessionState::Idle => Some(0.0),
            SessionState::Planning => Some(0.25),
            SessionState::Architecting => Some(0.50),
            SessionState::Coding => Some(0.75),
            SessionState::Complete => Some(1.0),
            SessionState::Failed => None,
        }
    }

    pub fn apply(&mut self, event: &GenerationEvent) -> Applied {
        let target = target_state(event.phase);
        if !Self::transition_allowed(self.state, target) {
            tracing::debug!(
                state = self.state.as_str(),
                phase = event.phase.as_str(),
                "ignoring event after terminal state"
            );
            return Applied::IgnoredTerminal;
        }

        self.message = event.message.clone();
        self.details = event.details.clone();

        if target == self.state {
            return Applied::Refresh;
        }

        self.state = target;
        if let Some(fraction) = Self::progress_for(target) {
            self.progress = fraction;
        }
        Applied::Transition(target)
    }
}

impl Default for PhaseStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(phase: Phase) -> GenerationEvent {
        GenerationEvent {
            phase,
            message: format!("in {}", phase.as_str()),
            details: None,
            project_path: None,
            project_name: None,
        }
    }

    #[test]
    fn test_canonical_path() {
        let mut machine = PhaseStateMachine::new();
        for (phase, expected) in [
            (Phase::Planning, 0.25),
            (Phase::Architect, 0.50),
            (Phase::Coding, 0.75),
            (Phase::Complete, 1.0),
        ] {
            assert_eq!(
                machine.apply(&event(phase)),
                Applied::Transition(match phase {
                    Phase::Planning => SessionState::Planning,
                    Phase::Architect => SessionState::Architecting,
                    Phase::Coding => SessionState::Coding,
                    Phase::Complete => SessionState::Complete,
                    Phase::Error => unreachable!(),
                })
            );
            assert_eq!(machine.progress(), expected);
        }
    }

    #[test]
    fn test_skipping_a_phase_is_accepted() {
        let mut machine = PhaseStateMachine::new();
        machine.apply(&event(Phase::Planning));
        machine.apply(&event(Phase::Coding));
        machine.apply(&event(Phase::Complete));
        assert_eq!(machine.state(), SessionState::Complete);
        assert_eq!(machine.progress(), 1.0);
    }

    #[test]
    fn test_same_phase_is_refresh() {
        let mut machine = PhaseStateMachine::new();
        machine.apply(&event(Phase::Coding));
        let progress = machine.progress();

        let mut refresh = event(Phase::Coding);
        refresh.message = "Writing code (3/5)...".to_string();
        assert_eq!(machine.apply(&refresh), Applied::Refresh);
        assert_eq!(machine.state(), SessionState::Coding);
        assert_eq!(machine.progress(), progress);
        assert_eq!(machine.message(), "Writing code (3/5)...");
    }

    #[test]
    fn test_backward_move_is_accepted() {
        let mut machine = PhaseStateMachine::new();
        machine.apply(&event(Phase::Coding));
        assert_eq!(
            machine.apply(&event(Phase::Planning)),
            Applied::Transition(SessionState::Planning)
        );
        assert_eq!(machine.progress(), 0.25);
    }

    #[test]
    fn test_error_keeps_last_progress() {
        let mut machine = PhaseStateMachine::new();
        machine.apply(&event(Phase::Architect));
        machine.apply(&event(Phase::Error));
        assert_eq!(machine.state(), SessionState::Failed);
        assert_eq!(machine.progress(), 0.50);
    }

    #[test]
    fn test_terminal_states_ignore_everything() {
        let mut machine = PhaseStateMachine::new();
        machine.apply(&event(Phase::Complete));
        for phase in [Phase::Planning, Phase::Coding, Phase::Error, Phase::Complete] {
            assert_eq!(machine.apply(&event(phase)), Applied::IgnoredTerminal);
        }
        assert_eq!(machine.state(), SessionState::Complete);
        assert_eq!(machine.progress(), 1.0);

        let mut failed = PhaseStateMachine::new();
        failed.apply(&event(Phase::Error));
        assert_eq!(failed.apply(&event(Phase::Coding)), Applied::IgnoredTerminal);
        assert_eq!(failed.state(), SessionState::Failed);
    }
}
