//! Opportunity and feasibility scoring
//!
//! - `opportunity = round((urgency + scale weight) / 2)`
//! - `feasibility = excitement`
//!
//! Missing urgency and excitement count as 5. A missing scale counts as the
//! `Massive` weight.

use crate::error::WizardError;
use crate::types::{IdeaNode, Scale};
use serde::{Deserialize, Serialize};

/// Lowest accepted rating
pub const AXIS_MIN: u8 = 1;
/// Highest accepted rating
pub const AXIS_MAX: u8 = 10;
/// Rating assumed when none was given
pub const DEFAULT_AXIS: u8 = 5;
/// Scale weight assumed when no scale was given
pub const MISSING_SCALE_WEIGHT: u8 = 10;

/// Derived scores of an idea
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scores {
    /// Opportunity, 1 to 10
    pub opportunity: u8,
    /// Feasibility, 1 to 10
    pub feasibility: u8,
}

impl Scores {
    /// Store the scores on `idea`
    pub fn apply_to(self, idea: &mut IdeaNode) {
        idea.opportunity_score = Some(self.opportunity);
        idea.feasibility_score = Some(self.feasibility);
    }
}

/// Check a rating is within 1 to 10
///
/// # Errors
/// `WizardError::AxisOutOfRange` otherwise
#[inline]
pub fn validate_axis(axis: &'static str, value: u8) -> Result<u8, WizardError> {
    if (AXIS_MIN..=AXIS_MAX).contains(&value) {
        Ok(value)
    } else {
        Err(WizardError::AxisOutOfRange { axis, value })
    }
}

/// Opportunity score from urgency and scale
#[must_use]
pub fn opportunity_score(urgency: Option<u8>, scale: Option<Scale>) -> u8 {
    let urgency = u16::from(urgency.unwrap_or(DEFAULT_AXIS));
    let weight = u16::from(scale.map_or(MISSING_SCALE_WEIGHT, Scale::weight));
    // half rounds up
    let score = (urgency + weight + 1) / 2;
    u8::try_from(score).unwrap_or(u8::MAX)
}

/// Feasibility score from excitement
#[inline]
#[must_use]
pub fn feasibility_score(excitement: Option<u8>) -> u8 {
    excitement.unwrap_or(DEFAULT_AXIS)
}

/// Score an idea
///
/// # Errors
/// `WizardError::AxisOutOfRange` if a recorded rating is outside 1 to 10
pub fn score(idea: &IdeaNode) -> Result<Scores, WizardError> {
    if let Some(urgency) = idea.urgency {
        validate_axis("urgency", urgency)?;
    }
    if let Some(excitement) = idea.excitement {
        validate_axis("excitement", excitement)?;
    }

    Ok(Scores {
        opportunity: opportunity_score(idea.urgency, idea.scale),
        feasibility: feasibility_score(idea.excitement),
    })
}
