//! Interactive refinement of one note
//!
//! Asks the triage questions, then the three evaluation ratings, one answer
//! per input line. Blank triage answers and invalid ratings are asked again.
//! The finished idea is stored and its source note marked woven.

use anyhow::{bail, Context, Result};
use axiom_core::{
    BrainDumpNote, Evaluation, EvaluationAnswer, EvaluationStep, IdeaAssistant, IdeaNode, Scale,
    ScriptedTriage, UserStory, Wizard,
};
use axiom_sync::RecordList;
use std::io::{BufRead, Write};

/// Completed idea and its action plan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Refinement {
    /// Idea as stored
    pub idea: IdeaNode,
    /// Generated plan
    pub plan: Vec<UserStory>,
}

fn prompt(step: EvaluationStep) -> &'static str {
    match step {
        EvaluationStep::Urgency => "Urgency: do people need this *now*? (1-10)",
        EvaluationStep::Scale => "Market scale: niche, medium, or massive?",
        EvaluationStep::Excitement => "Excitement: how much do you want to build it? (1-10)",
        EvaluationStep::Done => "",
    }
}

fn parse_answer(step: EvaluationStep, text: &str) -> Result<EvaluationAnswer> {
    let rating = || {
        text.parse::<u8>()
            .with_context(|| format!("'{text}' is not a rating from 1 to 10"))
    };
    Ok(match step {
        EvaluationStep::Urgency => EvaluationAnswer::Urgency(rating()?),
        EvaluationStep::Scale => {
            EvaluationAnswer::Scale(text.parse::<Scale>().map_err(anyhow::Error::msg)?)
        }
        EvaluationStep::Excitement => EvaluationAnswer::Excitement(rating()?),
        EvaluationStep::Done => bail!("evaluation is already complete"),
    })
}

fn next_line(input: &mut impl BufRead) -> Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line).context("failed to read answer")? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

/// Drive `wizard` from capture through the action plan for one note
///
/// # Errors
/// - If the note is unknown or already refined
/// - If input ends before every question is answered
/// - If output cannot be written
pub async fn run<N, I>(
    wizard: &mut Wizard<N, I>,
    note_id: &str,
    assistant: &dyn IdeaAssistant,
    mut input: impl BufRead,
    mut output: impl Write,
) -> Result<Refinement>
where
    N: RecordList<BrainDumpNote>,
    I: RecordList<IdeaNode>,
{
    let idea = wizard.start_triage(note_id)?;
    writeln!(output, "Refining: {}", idea.original_note)?;

    let mut triage = ScriptedTriage::new();
    while !triage.is_complete() {
        if let Some(question) = triage.history().last() {
            writeln!(output, "{}", question.text)?;
        }
        let answer = next_line(&mut input)?.context("input ended during triage")?;
        if let Some(patch) = triage.answer(&answer) {
            wizard.update_idea(&patch)?;
        }
    }
    if let Some(closing) = triage.history().last() {
        writeln!(output, "{}", closing.text)?;
    }
    wizard.complete_triage()?;

    let mut evaluation = Evaluation::new();
    while !evaluation.is_done() {
        let step = evaluation.step();
        writeln!(output, "{}", prompt(step))?;
        let answer = next_line(&mut input)?.context("input ended during evaluation")?;

        let patch = parse_answer(step, &answer)
            .and_then(|answer| evaluation.answer(answer).map_err(anyhow::Error::from));
        match patch {
            Ok(patch) => {
                wizard.update_idea(&patch)?;
            }
            Err(error) => writeln!(output, "{error}")?,
        }
    }

    let plan = wizard.complete_evaluation(assistant).await?.to_vec();
    writeln!(output, "Action plan:")?;
    for (index, story) in plan.iter().enumerate() {
        writeln!(output, "{}. {}", index + 1, story.text)?;
    }

    let idea = wizard.finish_idea()?;
    writeln!(output, "Saved idea {}", idea.id)?;
    tracing::info!(idea = %idea.id, note = %note_id, "refined note");
    Ok(Refinement { idea, plan })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn answers_parse_per_step() {
        assert_eq!(
            parse_answer(EvaluationStep::Urgency, "8").unwrap(),
            EvaluationAnswer::Urgency(8)
        );
        assert_eq!(
            parse_answer(EvaluationStep::Scale, "Massive").unwrap(),
            EvaluationAnswer::Scale(Scale::Massive)
        );
        assert!(parse_answer(EvaluationStep::Excitement, "very").is_err());
        assert!(parse_answer(EvaluationStep::Scale, "huge").is_err());
        assert!(parse_answer(EvaluationStep::Done, "1").is_err());
    }

    #[test]
    fn lines_are_trimmed_until_end_of_input() {
        let mut input = Cursor::new("  first \nsecond");
        assert_eq!(next_line(&mut input).unwrap().as_deref(), Some("first"));
        assert_eq!(next_line(&mut input).unwrap().as_deref(), Some("second"));
        assert_eq!(next_line(&mut input).unwrap(), None);
    }
}
