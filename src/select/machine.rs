use super::error::{StateError, StateResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionState {
    #[default]
    Idle,
    Selecting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionEvent {
    /// Explicit toggle from the menu header button.
    Toggle,
    /// Cancellation key while selecting.
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateTransition {
    pub from: SelectionState,
    pub event: SelectionEvent,
    pub to: SelectionState,
}

impl StateTransition {
    pub const fn new(from: SelectionState, event: SelectionEvent, to: SelectionState) -> Self {
        Self { from, event, to }
    }
}

/// Two-state machine behind element-picking mode. Listener attach and
/// detach, cursor changes, and the instruction banner are the enter and
/// exit actions of `Selecting`; the UI layer applies them when a
/// transition succeeds.
#[derive(Debug, Default)]
pub struct SelectionMachine {
    state: SelectionState,
    transition_history: Vec<StateTransition>,
}

impl SelectionMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SelectionState {
        self.state
    }

    pub fn is_selecting(&self) -> bool {
        self.state == SelectionState::Selecting
    }

    pub fn can_transition(&self, event: SelectionEvent) -> bool {
        self.next_state(event).is_some()
    }

    pub fn next_state(&self, event: SelectionEvent) -> Option<SelectionState> {
        use SelectionEvent::*;
        match (self.state, event) {
            (SelectionState::Idle, Toggle) => Some(SelectionState::Selecting),
            (SelectionState::Selecting, Toggle) => Some(SelectionState::Idle),
            (SelectionState::Selecting, Cancel) => Some(SelectionState::Idle),
            _ => None,
        }
    }

    pub fn transition(&mut self, event: SelectionEvent) -> StateResult<SelectionState> {
        tracing::debug!(from = ?self.state, event = ?event, "request selection transition");
        let next = self.next_state(event).ok_or_else(|| {
            let from = self.state;
            tracing::warn!(from = ?from, event = ?event, "invalid selection transition requested");
            StateError::InvalidStateTransition { from, event }
        })?;

        let record = StateTransition::new(self.state, event, next);
        self.state = next;
        self.transition_history.push(record);

        Ok(self.state)
    }
}

#[cfg(test)]
impl SelectionMachine {
    fn history(&self) -> &[StateTransition] {
        &self.transition_history
    }
}

impl std::fmt::Display for SelectionMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SelectionState::{:?}", self.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_cycles_between_idle_and_selecting() {
        let mut machine = SelectionMachine::new();
        assert_eq!(machine.state(), SelectionState::Idle);

        let state = machine
            .transition(SelectionEvent::Toggle)
            .expect("idle -> selecting should transition");
        assert_eq!(state, SelectionState::Selecting);

        let state = machine
            .transition(SelectionEvent::Toggle)
            .expect("selecting -> idle should transition");
        assert_eq!(state, SelectionState::Idle);
    }

    #[test]
    fn cancel_only_applies_while_selecting() {
        let mut machine = SelectionMachine::new();
        assert!(!machine.can_transition(SelectionEvent::Cancel));

        let err = machine
            .transition(SelectionEvent::Cancel)
            .expect_err("idle -> cancel should fail");
        assert!(matches!(
            err,
            StateError::InvalidStateTransition {
                from: SelectionState::Idle,
                event: SelectionEvent::Cancel,
            }
        ));
        assert!(machine.history().is_empty());

        let _ = machine.transition(SelectionEvent::Toggle).unwrap();
        assert!(machine.can_transition(SelectionEvent::Cancel));
        let state = machine.transition(SelectionEvent::Cancel).unwrap();
        assert_eq!(state, SelectionState::Idle);
    }

    #[test]
    fn transition_records_history_in_order() {
        let mut machine = SelectionMachine::new();
        let _ = machine.transition(SelectionEvent::Toggle).unwrap();
        let _ = machine.transition(SelectionEvent::Cancel).unwrap();

        assert_eq!(machine.history().len(), 2);
        assert_eq!(
            machine.history()[0],
            StateTransition::new(
                SelectionState::Idle,
                SelectionEvent::Toggle,
                SelectionState::Selecting
            )
        );
        assert_eq!(
            machine.history()[1],
            StateTransition::new(
                SelectionState::Selecting,
                SelectionEvent::Cancel,
                SelectionState::Idle
            )
        );
    }
}
