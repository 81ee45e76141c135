use std::fmt::Write;

use chrono::{DateTime, Utc};

use crate::config::OutputFormat;
use crate::models::{Badge, ChatRole, Entity};
use crate::view::{
    AssignmentsView, CalendarView, CardAction, CourseRow, DashboardView, FacultyView,
    NoticeRow, NoticesView, PanelView, SearchView, TagChip,
};

pub fn format_date(at: DateTime<Utc>) -> String {
    at.format("%b %-d, %Y").to_string()
}

fn badge(label: &str, badge: Badge) -> String {
    match badge {
        Badge::Warning => format!("[{label}]"),
        Badge::Success => format!("({label})"),
        Badge::Danger => format!("!{label}!"),
    }
}

fn hashtags(tags: &[String]) -> String {
    tags.iter()
        .map(|tag| format!("#{tag}"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn build_panel(view: &PanelView) -> String {
    match view {
        PanelView::Courses { rows } => build_courses(rows),
        PanelView::Tags { chips } => build_tags(chips),
        PanelView::Dashboard(view) => build_dashboard(view),
        PanelView::Assignments(view) => build_assignments(view),
        PanelView::Notices(view) => build_notices(view),
        PanelView::Faculty(view) => build_faculty(view),
        PanelView::Calendar(view) => build_calendar(view),
        PanelView::Assistant(view) => {
            let mut output = String::new();
            let _ = writeln!(output, "## Assistant");
            if view.messages.is_empty() {
                let _ = writeln!(output, "No messages yet.");
            }
            for message in &view.messages {
                let who = match message.role {
                    ChatRole::User => "You",
                    ChatRole::Bot => "Assistant",
                };
                let _ = writeln!(output, "{who}: {}", message.text);
            }
            output
        }
    }
}

fn build_courses(rows: &[CourseRow]) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "## Courses");
    for row in rows {
        let marker = if row.active { ">" } else { "-" };
        let _ = writeln!(output, "{marker} {} [{}] {}", row.name, row.id, row.badge);
    }
    output
}

fn build_tags(chips: &[TagChip]) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "## Tags");
    let line: Vec<String> = chips
        .iter()
        .map(|chip| {
            if chip.active {
                format!("*#{}*", chip.tag)
            } else {
                format!("#{}", chip.tag)
            }
        })
        .collect();
    let _ = writeln!(output, "{}", line.join(" "));
    output
}

fn write_notice(output: &mut String, notice: &NoticeRow) {
    let _ = writeln!(
        output,
        "- {} {} ({}, {})",
        notice.title,
        hashtags(&notice.tags),
        format_date(notice.created_at),
        notice.course
    );
    let _ = writeln!(output, "  {}", notice.body);
}

pub fn build_dashboard(view: &DashboardView) -> String {
    let mut output = String::new();
    let suffix = if view.stats.filtered { " (filtered)" } else { "" };

    let _ = writeln!(output, "## Overview");
    let _ = writeln!(output, "- Total assignments{suffix}: {}", view.stats.total_assignments);
    let _ = writeln!(output, "- Pending{suffix}: {}", view.stats.pending);
    let _ = writeln!(output, "- Overdue{suffix}: {}", view.stats.overdue);
    let _ = writeln!(output, "- Notices{suffix}: {}", view.stats.notices);

    let _ = writeln!(output);
    let _ = writeln!(output, "## Upcoming Deadlines");
    if view.upcoming.is_empty() {
        let _ = writeln!(output, "Nothing due.");
    }
    for row in &view.upcoming {
        let _ = writeln!(
            output,
            "- {} {} due {} {}",
            row.title,
            badge(&row.status, row.badge),
            format_date(row.due),
            hashtags(&row.tags)
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Recent Notices");
    if view.recent_notices.is_empty() {
        let _ = writeln!(output, "No notices.");
    }
    for notice in &view.recent_notices {
        write_notice(&mut output, notice);
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Smart Reminders");
    if view.reminders.is_empty() {
        let _ = writeln!(output, "All clear.");
    }
    for reminder in &view.reminders {
        let _ = writeln!(output, "- {} {}", badge(reminder.label, reminder.badge), reminder.text);
    }

    output
}

pub fn build_assignments(view: &AssignmentsView) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "## Assignments");
    if let Some(tag) = &view.tag {
        let _ = writeln!(output, "Filtered by #{tag}");
    }
    if view.cards.is_empty() {
        let _ = writeln!(output, "No assignments match.");
    }
    for card in &view.cards {
        let action = match card.action {
            CardAction::MarkSubmitted => "submit",
            CardAction::Edit => "edit",
        };
        let _ = writeln!(
            output,
            "- {} {} [{}]",
            card.title,
            badge(&capitalize(&card.status), card.badge),
            card.id
        );
        let _ = writeln!(
            output,
            "  Course: {} | Due: {} | {}",
            card.course,
            format_date(card.due),
            hashtags(&card.tags)
        );
        let _ = writeln!(output, "  {} (action: {action})", card.description);
    }
    output
}

pub fn build_notices(view: &NoticesView) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "## Notices");
    if let Some(tag) = &view.tag {
        let _ = writeln!(output, "Filtered by #{tag}");
    }
    if view.rows.is_empty() {
        let _ = writeln!(output, "No notices match.");
    }
    for notice in &view.rows {
        write_notice(&mut output, notice);
    }
    output
}

pub fn build_faculty(view: &FacultyView) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "## Faculty");
    for card in &view.cards {
        let _ = writeln!(output, "- {} ({}) [{}]", card.name, card.department, card.id);
        let _ = writeln!(output, "  Email: {} | Office: {}", card.email, card.office);
        let _ = writeln!(output, "  Courses: {}", card.courses.join(", "));
    }
    output
}

pub fn build_calendar(view: &CalendarView) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "## {}", view.label);

    let header: Vec<String> = view.weekdays.iter().map(|day| format!("{day:>4}")).collect();
    let _ = writeln!(output, "{}", header.concat());

    let mut line = "    ".repeat(view.leading_blanks as usize);
    let mut column = view.leading_blanks;
    for cell in &view.days {
        let marker = if cell.events.is_empty() { ' ' } else { '*' };
        let _ = write!(line, "{:>3}{marker}", cell.day);
        column += 1;
        if column % 7 == 0 {
            let _ = writeln!(output, "{}", line.trim_end());
            line.clear();
        }
    }
    if !line.is_empty() {
        let _ = writeln!(output, "{}", line.trim_end());
    }

    let events: Vec<String> = view
        .days
        .iter()
        .flat_map(|cell| {
            cell.events
                .iter()
                .map(move |title| format!("- {}: {title}", cell.day))
        })
        .collect();
    if !events.is_empty() {
        let _ = writeln!(output);
        for event in events {
            let _ = writeln!(output, "{event}");
        }
    }
    output
}

/// Text or pretty JSON for any serializable view model.
pub fn render_output<T: serde::Serialize>(
    view: &T,
    format: OutputFormat,
    text: impl FnOnce(&T) -> String,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Text => Ok(text(view)),
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(view)?;
            json.push('\n');
            Ok(json)
        }
    }
}

pub fn build_search(view: &SearchView) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "## Search results ({})", view.results.len());
    if view.results.is_empty() {
        let _ = writeln!(output, "No results found.");
    }
    for entity in &view.results {
        let label = entity.kind_label();
        let _ = match entity {
            Entity::Faculty(member) => {
                writeln!(output, "- {label}: {} — {}", member.name, member.department)
            }
            Entity::Assignment(assignment) => writeln!(
                output,
                "- {label}: {} — due {}",
                assignment.title,
                format_date(assignment.due)
            ),
            Entity::Notice(notice) => {
                writeln!(output, "- {label}: {} — {}", notice.title, notice.body)
            }
            Entity::Course(course) => writeln!(output, "- {label}: {}", course.name),
        };
    }
    output
}
