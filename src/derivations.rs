use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{
    Assignment, AssignmentStatus, Entity, Notice, Reminder, ReminderKind, StatusFilter,
};
use crate::store::Store;

const DAY_MS: f64 = 86_400_000.0;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub total_assignments: usize,
    pub pending: usize,
    pub overdue: usize,
    pub notices: usize,
    pub filtered: bool,
}

/// Whole days until `at`, rounded up. Negative once `at` has passed by a full day.
pub fn days_left(at: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let millis = (at - now).num_milliseconds() as f64;
    (millis / DAY_MS).ceil() as i64
}

fn in_course(course_id: &str, selected: Option<&str>) -> bool {
    selected.map_or(true, |selected| selected == course_id)
}

fn has_tag(tags: &[String], tag: Option<&str>) -> bool {
    tag.map_or(true, |tag| tags.iter().any(|candidate| candidate == tag))
}

pub fn upcoming_deadlines<'a>(store: &'a Store, selected: Option<&str>) -> Vec<&'a Assignment> {
    let mut upcoming: Vec<&Assignment> = store
        .assignments
        .iter()
        .filter(|assignment| assignment.status != AssignmentStatus::Submitted)
        .filter(|assignment| in_course(&assignment.course_id, selected))
        .collect();
    upcoming.sort_by_key(|assignment| assignment.due);
    upcoming.truncate(5);
    upcoming
}

pub fn recent_notices<'a>(store: &'a Store, selected: Option<&str>) -> Vec<&'a Notice> {
    let mut notices = filtered_notices(store, selected, None);
    notices.truncate(5);
    notices
}

/// Rebuilt from scratch on every call; assignments first, then events.
pub fn smart_reminders(store: &Store, now: DateTime<Utc>) -> Vec<Reminder> {
    let mut reminders = Vec::new();

    for assignment in &store.assignments {
        let left = days_left(assignment.due, now);
        if assignment.status == AssignmentStatus::Pending && (0..=3).contains(&left) {
            reminders.push(Reminder {
                kind: ReminderKind::Deadline,
                text: format!("Finish \"{}\" — only {} day(s) left", assignment.title, left),
            });
        }
        if assignment.status == AssignmentStatus::Overdue {
            reminders.push(Reminder {
                kind: ReminderKind::Overdue,
                text: format!(
                    "Overdue: \"{}\". Submit as soon as possible.",
                    assignment.title
                ),
            });
        }
    }

    for event in &store.events {
        let left = days_left(event.date, now);
        if (0..=7).contains(&left) {
            reminders.push(Reminder {
                kind: ReminderKind::Event,
                text: format!("Upcoming event: {} in {} day(s)", event.title, left),
            });
        }
    }

    reminders
}

pub fn search(store: &Store, query: &str) -> Vec<Entity> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }
    let hit = |text: &str| text.to_lowercase().contains(&needle);

    let mut results = Vec::new();
    results.extend(
        store
            .courses
            .iter()
            .filter(|course| hit(&course.name))
            .cloned()
            .map(Entity::Course),
    );
    results.extend(
        store
            .assignments
            .iter()
            .filter(|assignment| hit(&assignment.title) || hit(&assignment.description))
            .cloned()
            .map(Entity::Assignment),
    );
    results.extend(
        store
            .notices
            .iter()
            .filter(|notice| hit(&notice.title) || hit(&notice.body))
            .cloned()
            .map(Entity::Notice),
    );
    results.extend(
        store
            .faculty
            .iter()
            .filter(|member| hit(&member.name) || hit(&member.department))
            .cloned()
            .map(Entity::Faculty),
    );
    results
}

pub fn dashboard_stats(store: &Store) -> DashboardStats {
    let count = |status| {
        store
            .assignments
            .iter()
            .filter(|assignment| assignment.status == status)
            .count()
    };
    DashboardStats {
        total_assignments: store.assignments.len(),
        pending: count(AssignmentStatus::Pending),
        overdue: count(AssignmentStatus::Overdue),
        notices: store.notices.len(),
        filtered: store.selected_course_id.is_some(),
    }
}

pub fn filtered_assignments<'a>(
    store: &'a Store,
    selected: Option<&str>,
    tag: Option<&str>,
    status: StatusFilter,
) -> Vec<&'a Assignment> {
    store
        .assignments
        .iter()
        .filter(|assignment| in_course(&assignment.course_id, selected))
        .filter(|assignment| has_tag(&assignment.tags, tag))
        .filter(|assignment| status.matches(assignment.status))
        .collect()
}

/// Newest first.
pub fn filtered_notices<'a>(
    store: &'a Store,
    selected: Option<&str>,
    tag: Option<&str>,
) -> Vec<&'a Notice> {
    let mut notices: Vec<&Notice> = store
        .notices
        .iter()
        .filter(|notice| in_course(&notice.course_id, selected))
        .filter(|notice| has_tag(&notice.tags, tag))
        .collect();
    notices.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    notices
}

/// Pending only, soonest first. Overdue items are left to their own listing.
pub fn pending_by_due(store: &Store, limit: usize) -> Vec<&Assignment> {
    let mut pending: Vec<&Assignment> = store
        .assignments
        .iter()
        .filter(|assignment| assignment.status == AssignmentStatus::Pending)
        .collect();
    pending.sort_by_key(|assignment| assignment.due);
    pending.truncate(limit);
    pending
}

pub fn overdue_assignments(store: &Store) -> Vec<&Assignment> {
    store
        .assignments
        .iter()
        .filter(|assignment| assignment.status == AssignmentStatus::Overdue)
        .collect()
}
