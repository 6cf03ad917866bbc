//! Markdown export of an action plan

use crate::types::{IdeaNode, UserStory};
use chrono::NaiveDate;
use std::fmt::Write as _;

const PROJECT_URL: &str = "https://github.com/eurinhashworks/axiom_mind";

/// Render an idea and its plan as a markdown document
#[must_use]
pub fn render_markdown_plan(idea: &IdeaNode, stories: &[UserStory], date: NaiveDate) -> String {
    let done = stories.iter().filter(|s| s.completed).count();
    let progress = percent(done, stories.len());
    let or_undefined = |v: Option<&str>| v.map_or_else(|| "Not defined".to_string(), str::to_string);
    let or_na = |v: Option<u8>| v.map_or_else(|| "N/A".to_string(), |n| n.to_string());

    let mut out = String::new();
    let _ = writeln!(out, "# {}", idea.project_name.as_deref().unwrap_or("Untitled Project"));
    let _ = writeln!(out);
    let _ = writeln!(out, "**Generated by AXIOM** • {}", date.format("%B %-d, %Y"));
    let _ = writeln!(out, "\n---\n");

    let _ = writeln!(out, "## 📋 Project Information\n");
    let _ = writeln!(out, "- **Problem to solve:** {}", or_undefined(idea.problem.as_deref()));
    let _ = writeln!(out, "- **Target audience:** {}", or_undefined(idea.target_audience.as_deref()));
    let _ = writeln!(out, "- **Urgency:** {}/10", or_na(idea.urgency));
    let _ = writeln!(
        out,
        "- **Market scale:** {}",
        idea.scale.map_or("Not defined", |s| s.label())
    );
    let _ = writeln!(out, "- **Excitement:** {}/10", or_na(idea.excitement));
    if let Some(score) = idea.opportunity_score {
        let _ = writeln!(out, "- **Opportunity score:** {score}/10");
    }
    if let Some(score) = idea.feasibility_score {
        let _ = writeln!(out, "- **Feasibility score:** {score}/10");
    }
    let _ = writeln!(out, "\n---\n");

    let _ = writeln!(out, "## 🎯 MVP Action Plan\n");
    let _ = writeln!(out, "**Progress:** {done}/{} ({progress}%)\n", stories.len());
    for (index, story) in stories.iter().enumerate() {
        let mark = if story.completed { "[x]" } else { "[ ]" };
        let _ = writeln!(out, "{}. {mark} {}", index + 1, story.text);
    }
    let _ = writeln!(out, "\n---\n");

    let _ = writeln!(out, "## 📝 Original Note\n");
    for line in idea.original_note.lines() {
        let _ = writeln!(out, "> {line}");
    }
    let _ = writeln!(out, "\n---\n");

    let _ = writeln!(out, "## 🔗 Next Steps\n");
    let _ = writeln!(out, "1. Validate each user story with potential users");
    let _ = writeln!(out, "2. Prioritize features by impact and effort");
    let _ = writeln!(out, "3. Start building the MVP");
    let _ = writeln!(out, "4. Iterate on feedback");
    let _ = writeln!(out, "\n---\n");
    let _ = writeln!(out, "*Created with [AXIOM]({PROJECT_URL})*");

    out
}

/// File name for an exported plan, `<project-slug>-<timestamp>.md`
///
/// Every character outside `[a-z0-9]` (case-insensitive) becomes `-`; ideas
/// without a project name use `plan`.
#[must_use]
pub fn plan_file_name(idea: &IdeaNode, timestamp_ms: i64) -> String {
    let slug = idea
        .project_name
        .as_deref()
        .filter(|name| !name.is_empty())
        .map_or_else(
            || "plan".to_string(),
            |name| {
                name.chars()
                    .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
                    .collect()
            },
        );
    format!("{slug}-{timestamp_ms}.md")
}

fn percent(done: usize, total: usize) -> usize {
    if total == 0 {
        0
    } else {
        // half rounds up
        (done * 200 + total) / (total * 2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BrainDumpNote, Scale};

    fn idea() -> IdeaNode {
        let mut idea = IdeaNode::from_note(&BrainDumpNote::new("buses are late"));
        idea.project_name = Some("Bus Buddy!".into());
        idea.problem = Some("late buses".into());
        idea.urgency = Some(8);
        idea.scale = Some(Scale::Medium);
        idea.opportunity_score = Some(7);
        idea
    }

    fn stories() -> Vec<UserStory> {
        let mut done = UserStory::new("Landing page");
        done.completed = true;
        vec![done, UserStory::new("Core feature"), UserStory::new("Feedback")]
    }

    #[test]
    fn renders_sections() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let md = render_markdown_plan(&idea(), &stories(), date);

        assert!(md.starts_with("# Bus Buddy!\n"));
        assert!(md.contains("**Generated by AXIOM** • May 1, 2024"));
        assert!(md.contains("- **Target audience:** Not defined"));
        assert!(md.contains("- **Excitement:** N/A/10"));
        assert!(md.contains("- **Market scale:** Medium"));
        assert!(md.contains("- **Opportunity score:** 7/10"));
        assert!(!md.contains("Feasibility score"));
        assert!(md.contains("**Progress:** 1/3 (33%)"));
        assert!(md.contains("1. [x] Landing page\n2. [ ] Core feature"));
        assert!(md.contains("> buses are late"));
    }

    #[test]
    fn empty_plan_has_zero_progress() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let md = render_markdown_plan(&idea(), &[], date);
        assert!(md.contains("**Progress:** 0/0 (0%)"));
    }

    #[test]
    fn percent_rounds_half_up() {
        assert_eq!(percent(1, 3), 33);
        assert_eq!(percent(2, 3), 67);
        assert_eq!(percent(1, 8), 13);
        assert_eq!(percent(3, 3), 100);
    }

    #[test]
    fn file_name_slugs_project_name() {
        assert_eq!(plan_file_name(&idea(), 1_700_000_000_000), "bus-buddy--1700000000000.md");

        let mut unnamed = idea();
        unnamed.project_name = None;
        assert_eq!(plan_file_name(&unnamed, 5), "plan-5.md");
    }
}
