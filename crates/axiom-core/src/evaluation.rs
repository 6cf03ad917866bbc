//! Evaluation step sequencer
//!
//! Walks urgency, scale, then excitement. Each answer must match the current
//! step and is validated before it is recorded.

use crate::assist::{evaluate_or_fallback, IdeaAssistant};
use crate::error::WizardError;
use crate::scoring::{feasibility_score, opportunity_score, validate_axis, Scores};
use crate::types::{IdeaNode, IdeaPatch, Scale};
use serde::{Deserialize, Serialize};

/// Evaluation step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EvaluationStep {
    /// Rate urgency 1 to 10
    Urgency,
    /// Pick a market scale
    Scale,
    /// Rate excitement 1 to 10
    Excitement,
    /// All answers recorded
    Done,
}

impl EvaluationStep {
    /// Following step
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Urgency => Self::Scale,
            Self::Scale => Self::Excitement,
            Self::Excitement | Self::Done => Self::Done,
        }
    }
}

/// Answer to one evaluation step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvaluationAnswer {
    /// Urgency rating
    Urgency(u8),
    /// Market scale
    Scale(Scale),
    /// Excitement rating
    Excitement(u8),
}

/// Evaluation in progress
#[derive(Debug, Clone)]
pub struct Evaluation {
    step: EvaluationStep,
    urgency: Option<u8>,
    scale: Option<Scale>,
    excitement: Option<u8>,
}

impl Evaluation {
    /// Start at the urgency step
    #[must_use]
    pub fn new() -> Self {
        Self {
            step: EvaluationStep::Urgency,
            urgency: None,
            scale: None,
            excitement: None,
        }
    }

    /// Current step
    #[inline]
    #[must_use]
    pub fn step(&self) -> EvaluationStep {
        self.step
    }

    /// Whether all answers are recorded
    #[inline]
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.step == EvaluationStep::Done
    }

    /// Record the answer for the current step and advance
    ///
    /// # Errors
    /// - `WizardError::UnexpectedAnswer` if the answer is for another step
    /// - `WizardError::AxisOutOfRange` if a rating is outside 1 to 10
    pub fn answer(&mut self, answer: EvaluationAnswer) -> Result<IdeaPatch, WizardError> {
        let patch = match (self.step, answer) {
            (EvaluationStep::Urgency, EvaluationAnswer::Urgency(value)) => {
                let value = validate_axis("urgency", value)?;
                self.urgency = Some(value);
                IdeaPatch::new().with_urgency(value)
            }
            (EvaluationStep::Scale, EvaluationAnswer::Scale(scale)) => {
                self.scale = Some(scale);
                IdeaPatch::new().with_scale(scale)
            }
            (EvaluationStep::Excitement, EvaluationAnswer::Excitement(value)) => {
                let value = validate_axis("excitement", value)?;
                self.excitement = Some(value);
                IdeaPatch::new().with_excitement(value)
            }
            (expected, _) => return Err(WizardError::UnexpectedAnswer { expected }),
        };

        self.step = self.step.next();
        Ok(patch)
    }

    /// Scores once every step is answered
    #[must_use]
    pub fn scores(&self) -> Option<Scores> {
        self.is_done().then(|| Scores {
            opportunity: opportunity_score(self.urgency, self.scale),
            feasibility: feasibility_score(self.excitement),
        })
    }
}

impl Default for Evaluation {
    fn default() -> Self {
        Self::new()
    }
}

/// Infer all three ratings from a free-text answer
///
/// Falls back to neutral ratings if the assistant fails. Ratings are clamped
/// into 1 to 10.
pub async fn infer(assistant: &dyn IdeaAssistant, idea: &IdeaNode, input: &str) -> IdeaPatch {
    evaluate_or_fallback(assistant, idea, input).await.into_patch()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assist::OfflineAssistant;
    use crate::types::BrainDumpNote;

    #[test]
    fn steps_run_in_order() {
        let mut eval = Evaluation::new();
        assert!(eval.scores().is_none());

        let patch = eval.answer(EvaluationAnswer::Urgency(8)).unwrap();
        assert_eq!(patch.urgency, Some(8));
        assert_eq!(eval.step(), EvaluationStep::Scale);

        eval.answer(EvaluationAnswer::Scale(Scale::Medium)).unwrap();
        eval.answer(EvaluationAnswer::Excitement(9)).unwrap();

        assert!(eval.is_done());
        assert_eq!(
            eval.scores(),
            Some(Scores {
                opportunity: 7,
                feasibility: 9
            })
        );
    }

    #[test]
    fn out_of_order_answer_is_rejected() {
        let mut eval = Evaluation::new();
        let err = eval.answer(EvaluationAnswer::Scale(Scale::Niche)).unwrap_err();
        assert_eq!(
            err,
            WizardError::UnexpectedAnswer {
                expected: EvaluationStep::Urgency
            }
        );
        assert_eq!(eval.step(), EvaluationStep::Urgency);
    }

    #[test]
    fn out_of_range_rating_does_not_advance() {
        let mut eval = Evaluation::new();
        assert!(matches!(
            eval.answer(EvaluationAnswer::Urgency(11)),
            Err(WizardError::AxisOutOfRange { axis: "urgency", value: 11 })
        ));
        assert_eq!(eval.step(), EvaluationStep::Urgency);
    }

    #[tokio::test]
    async fn infer_falls_back_to_neutral() {
        let idea = IdeaNode::from_note(&BrainDumpNote::new("x"));
        let patch = infer(&OfflineAssistant, &idea, "not sure").await;
        assert_eq!(patch.urgency, Some(5));
        assert_eq!(patch.scale, Some(Scale::Medium));
        assert_eq!(patch.excitement, Some(5));
    }
}
