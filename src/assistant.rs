//! Keyword intent matching for the campus assistant.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::derivations;
use crate::report::format_date;
use crate::store::Store;

static TAG_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"#([a-z0-9\-]+)").unwrap());

pub const SEARCH_HELP: &str =
    "Use the search bar to find courses, assignments, notices, or faculty. You can also filter by tags.";
pub const COMMANDS_HELP: &str =
    "Try: 'deadlines', 'overdue', 'notices', 'filter by #tag', 'create assignment'.";
pub const OPENING_FORM: &str = "Opening assignment creation modal.";
pub const FALLBACK: &str =
    "I can help with deadlines, notices, filtering by tags, or quick actions. Ask me anything campus-related.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Deadlines,
    Overdue,
    Notices,
    WhereToFind,
    Help,
    CreateAssignment,
    FilterByTag(String),
    Fallback,
}

/// Follow-up the presentation layer must carry out after replying.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SideEffect {
    OpenAssignmentForm,
    FilterAssignmentsByTag(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub intent: Intent,
    pub text: String,
    pub effect: Option<SideEffect>,
}

/// First matching pattern wins.
pub fn classify(query: &str) -> Intent {
    let lower = query.to_lowercase();
    let has = |needle: &str| lower.contains(needle);
    // "overdue" alone must not read as a deadline question.
    let mentions_due = lower.replace("overdue", "").contains("due");

    if has("deadline") || mentions_due {
        Intent::Deadlines
    } else if has("overdue") {
        Intent::Overdue
    } else if has("notice") || has("announcement") {
        Intent::Notices
    } else if has("where") && has("find") {
        Intent::WhereToFind
    } else if has("help") || has("commands") {
        Intent::Help
    } else if has("create assignment") {
        Intent::CreateAssignment
    } else if let Some(captures) = TAG_PATTERN.captures(&lower) {
        Intent::FilterByTag(captures[1].to_string())
    } else {
        Intent::Fallback
    }
}

pub fn respond(store: &Store, query: &str) -> Reply {
    let intent = classify(query);
    let (text, effect) = match &intent {
        Intent::Deadlines => {
            let upcoming: Vec<String> = derivations::pending_by_due(store, 3)
                .into_iter()
                .map(|assignment| {
                    format!(
                        "{} ({}) — {}",
                        assignment.title,
                        store.course_name(&assignment.course_id),
                        format_date(assignment.due)
                    )
                })
                .collect();
            let text = if upcoming.is_empty() {
                "No upcoming deadlines.".to_string()
            } else {
                format!("Top deadlines: {}", upcoming.join(" | "))
            };
            (text, None)
        }
        Intent::Overdue => {
            let titles: Vec<&str> = derivations::overdue_assignments(store)
                .into_iter()
                .map(|assignment| assignment.title.as_str())
                .collect();
            let text = if titles.is_empty() {
                "No overdue items.".to_string()
            } else {
                format!("Overdue: {}", titles.join(", "))
            };
            (text, None)
        }
        Intent::Notices => {
            let skip = store.notices.len().saturating_sub(3);
            let latest: Vec<String> = store
                .notices
                .iter()
                .skip(skip)
                .map(|notice| format!("{} ({})", notice.title, store.course_name(&notice.course_id)))
                .collect();
            let text = if latest.is_empty() {
                "No notices yet.".to_string()
            } else {
                latest.join(" | ")
            };
            (text, None)
        }
        Intent::WhereToFind => (SEARCH_HELP.to_string(), None),
        Intent::Help => (COMMANDS_HELP.to_string(), None),
        Intent::CreateAssignment => (
            OPENING_FORM.to_string(),
            Some(SideEffect::OpenAssignmentForm),
        ),
        Intent::FilterByTag(tag) => (
            format!("Filtered assignments by #{tag}."),
            Some(SideEffect::FilterAssignmentsByTag(tag.clone())),
        ),
        Intent::Fallback => (FALLBACK.to_string(), None),
    };

    Reply {
        intent,
        text,
        effect,
    }
}
