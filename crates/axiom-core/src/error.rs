//! Error types for the refinement workflow
//!
//! `WizardError` covers rejected workflow operations; `AssistError` covers
//! failures of the text assistant, which callers usually replace with a fixed
//! fallback rather than propagate.

use crate::evaluation::EvaluationStep;
use crate::types::Stage;

/// Rejected workflow operation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WizardError {
    /// Stage change not in the transition table
    #[error("invalid transition: {from} -> {to}")]
    InvalidTransition { from: Stage, to: Stage },

    /// Note text was blank after trimming
    #[error("note is empty")]
    EmptyNote,

    /// No note with this id
    #[error("unknown note: {0}")]
    UnknownNote(String),

    /// Note was already refined into an idea
    #[error("note already woven: {0}")]
    NoteAlreadyWoven(String),

    /// Operation needs an active idea
    #[error("no active idea")]
    NoActiveIdea,

    /// No story with this id in the current plan
    #[error("unknown story: {0}")]
    UnknownStory(String),

    /// Rating outside 1 to 10
    #[error("{axis} must be between 1 and 10, got {value}")]
    AxisOutOfRange { axis: &'static str, value: u8 },

    /// Answer does not match the current evaluation step
    #[error("expected an answer for {expected:?}")]
    UnexpectedAnswer { expected: EvaluationStep },
}

impl WizardError {
    /// Check if the error is a caller mistake that can be fixed by new input
    #[inline]
    #[must_use]
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::EmptyNote
                | Self::UnknownNote(_)
                | Self::UnknownStory(_)
                | Self::AxisOutOfRange { .. }
                | Self::UnexpectedAnswer { .. }
        )
    }
}

/// Assistant failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AssistError {
    /// Assistant not configured or unreachable
    #[error("assistant unavailable: {0}")]
    Unavailable(String),

    /// Reply did not have the expected shape
    #[error("malformed assistant reply: {0}")]
    Malformed(String),

    /// Assistant refused the request
    #[error("assistant rejected request: {0}")]
    Rejected(String),
}

impl AssistError {
    /// Check if error is retryable
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transition_error_display() {
        let err = WizardError::InvalidTransition {
            from: Stage::Capture,
            to: Stage::ActionPlan,
        };
        assert_eq!(err.to_string(), "invalid transition: capture -> action_plan");
        assert!(!err.is_input_error());
    }

    #[test]
    fn axis_error_display() {
        let err = WizardError::AxisOutOfRange {
            axis: "urgency",
            value: 11,
        };
        assert!(err.to_string().contains("urgency"));
        assert!(err.is_input_error());
    }

    #[test]
    fn assist_error_is_retryable() {
        assert!(AssistError::Unavailable("offline".into()).is_retryable());
        assert!(!AssistError::Malformed("no json".into()).is_retryable());
    }
}
