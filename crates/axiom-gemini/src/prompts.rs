//! Prompt text

use axiom_core::{ChatMessage, IdeaNode, Sender};
use std::fmt::Write as _;

pub(crate) const SYSTEM_PROMPT: &str = "\
You are AXIOM, an assistant that helps founders shape product ideas.

Role:
- Help structure an idea through a short, natural conversation
- Infer what you can from context instead of asking for everything
- Be direct, concise, and actionable

Extract, in priority order: the core problem, the target audience, the
project or solution name, then perceived urgency and market scale.

Never ask more than two questions at once.";

pub(crate) const SYSTEM_ACK: &str =
    "Understood. I am AXIOM and I will help structure this idea.";

pub(crate) const CHAT_TEMPERATURE: f32 = 0.8;
pub(crate) const PLAN_TEMPERATURE: f32 = 0.7;
pub(crate) const INTRO_TEMPERATURE: f32 = 0.9;

fn field(value: Option<&str>) -> &str {
    value.unwrap_or("unknown")
}

pub(crate) fn triage_intro(note: &str) -> String {
    format!(
        "The user just captured this idea: \"{note}\"\n\n\
         As AXIOM, write ONE welcoming sentence that shows you read and understood \
         the idea and asks the single most useful question to move forward.\n\
         Return only the sentence, no JSON."
    )
}

pub(crate) fn chat(message: &str, history: &[ChatMessage], idea: &IdeaNode) -> String {
    let mut known = String::new();
    if let Some(problem) = &idea.problem {
        let _ = writeln!(known, "- Problem: {problem}");
    }
    if let Some(audience) = &idea.target_audience {
        let _ = writeln!(known, "- Target audience: {audience}");
    }
    if let Some(name) = &idea.project_name {
        let _ = writeln!(known, "- Project name: {name}");
    }

    let transcript: Vec<String> = history
        .iter()
        .map(|m| {
            let who = match m.sender {
                Sender::User => "User",
                Sender::Axiom => "AXIOM",
            };
            format!("{who}: {}", m.text)
        })
        .collect();

    format!(
        "Known so far about the project:\n{known}\n\
         Conversation:\n{}\n\n\
         New user message: \"{message}\"\n\n\
         Extract every relevant detail from the new message, note what is still \
         missing, and reply conversationally. When problem, audience, and name are \
         all known, offer to move on to evaluation.\n\n\
         Reply in JSON:\n\
         {{\n  \"response\": \"your reply\",\n  \"extracted_problem\": \"... or null\",\n  \
         \"extracted_target_audience\": \"... or null\",\n  \"extracted_project_name\": \"... or null\",\n  \
         \"is_ready_for_evaluation\": true/false,\n  \"confidence\": \"high/medium/low\"\n}}",
        transcript.join("\n")
    )
}

pub(crate) fn evaluate(idea: &IdeaNode, input: &str) -> String {
    format!(
        "As AXIOM, read this answer and infer how the user rates the project.\n\n\
         Project:\n- Name: {}\n- Problem: {}\n- Audience: {}\n\n\
         User answer: \"{input}\"\n\n\
         Infer urgency (1-10), market scale (\"Niche\", \"Medium\" or \"Massive\"), \
         and the user's excitement (1-10). Infer from tone when not explicit.\n\n\
         Reply in JSON:\n\
         {{\"urgency\": number, \"scale\": \"Niche\" | \"Medium\" | \"Massive\", \
         \"excitement\": number, \"reasoning\": \"short explanation\"}}",
        field(idea.project_name.as_deref()),
        field(idea.problem.as_deref()),
        field(idea.target_audience.as_deref()),
    )
}

pub(crate) fn action_plan(idea: &IdeaNode) -> String {
    let rating = |v: Option<u8>| v.map_or_else(|| "?".to_string(), |n| n.to_string());
    format!(
        "You are an experienced product manager. Write a concrete, realistic MVP \
         action plan.\n\n\
         Project:\n- Name: {}\n- Problem: {}\n- Audience: {}\n- Urgency: {}/10\n\
         - Scale: {}\n- Excitement: {}/10\n\n\
         Write 5 to 8 concrete user stories, most important first, each doable in \
         1 to 3 days, in the form \"As a [audience], I want [action] so that [benefit]\".\n\n\
         Reply in JSON:\n\
         {{\"user_stories\": [{{\"story\": \"...\"}}]}}",
        field(idea.project_name.as_deref()),
        field(idea.problem.as_deref()),
        field(idea.target_audience.as_deref()),
        rating(idea.urgency),
        idea.scale.map_or("?", |s| s.label()),
        rating(idea.excitement),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axiom_core::BrainDumpNote;

    #[test]
    fn chat_prompt_lists_known_fields_and_transcript() {
        let mut idea = IdeaNode::from_note(&BrainDumpNote::new("x"));
        idea.problem = Some("late buses".into());
        let history = vec![ChatMessage::axiom("What is the problem?"), ChatMessage::user("buses")];

        let prompt = chat("commuters", &history, &idea);
        assert!(prompt.contains("- Problem: late buses"));
        assert!(!prompt.contains("- Project name"));
        assert!(prompt.contains("AXIOM: What is the problem?\nUser: buses"));
        assert!(prompt.contains("\"is_ready_for_evaluation\""));
    }

    #[test]
    fn plan_prompt_marks_missing_ratings() {
        let idea = IdeaNode::from_note(&BrainDumpNote::new("x"));
        let prompt = action_plan(&idea);
        assert!(prompt.contains("- Urgency: ?/10"));
        assert!(prompt.contains("\"user_stories\""));
    }
}
