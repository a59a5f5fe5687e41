use super::machine::{SelectionEvent, SelectionState};
use thiserror::Error;

pub type StateResult<T> = std::result::Result<T, StateError>;

#[derive(Debug, Error)]
pub enum StateError {
    #[error("invalid state transition: from {from:?} using event {event:?}")]
    InvalidStateTransition {
        from: SelectionState,
        event: SelectionEvent,
    },
}
