//! Panel identifiers, view models and the render coordinators that build them.
//!
//! Every coordinator re-derives its output from the store on each call. Nothing
//! is cached between renders, so a view model always reflects the state at the
//! moment it was requested.

use std::str::FromStr;

use chrono::{DateTime, Datelike, Months, NaiveDate, Utc};
use serde::Serialize;

use crate::derivations::{self, DashboardStats};
use crate::error::HubError;
use crate::models::{
    Assignment, Badge, ChatMessage, Entity, Notice, Reminder, Role, StatusFilter,
};
use crate::store::Store;

pub const WEEKDAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Panel {
    Courses,
    Tags,
    Dashboard,
    Assignments,
    Notices,
    Faculty,
    Calendar,
    Assistant,
}

impl Panel {
    /// Display order.
    pub fn all() -> Vec<Panel> {
        vec![
            Panel::Courses,
            Panel::Tags,
            Panel::Dashboard,
            Panel::Assignments,
            Panel::Notices,
            Panel::Faculty,
            Panel::Calendar,
            Panel::Assistant,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Panel::Courses => "Courses",
            Panel::Tags => "Tags",
            Panel::Dashboard => "Dashboard",
            Panel::Assignments => "Assignments",
            Panel::Notices => "Notices",
            Panel::Faculty => "Faculty",
            Panel::Calendar => "Calendar",
            Panel::Assistant => "Assistant",
        }
    }
}

impl FromStr for Panel {
    type Err = HubError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let wanted = value.trim().to_lowercase();
        Panel::all()
            .into_iter()
            .find(|panel| panel.name().to_lowercase() == wanted)
            .ok_or(HubError::UnknownPanel(wanted))
    }
}

/// Filters that live outside the store and are only passed to renders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters {
    pub active_tag: Option<String>,
    pub status: StatusFilter,
}

#[derive(Debug, Clone, Serialize)]
pub struct CourseRow {
    pub id: String,
    pub name: String,
    pub color: String,
    pub badge: String,
    pub active: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct TagChip {
    pub tag: String,
    pub active: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeadlineRow {
    pub id: String,
    pub title: String,
    pub status: String,
    pub badge: Badge,
    pub due: DateTime<Utc>,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NoticeRow {
    pub id: String,
    pub title: String,
    pub body: String,
    pub course: String,
    pub created_at: DateTime<Utc>,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReminderRow {
    pub label: &'static str,
    pub badge: Badge,
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub stats: DashboardStats,
    pub upcoming: Vec<DeadlineRow>,
    pub recent_notices: Vec<NoticeRow>,
    pub reminders: Vec<ReminderRow>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CardAction {
    MarkSubmitted,
    Edit,
}

#[derive(Debug, Clone, Serialize)]
pub struct AssignmentCard {
    pub id: String,
    pub title: String,
    pub status: String,
    pub badge: Badge,
    pub course: String,
    pub due: DateTime<Utc>,
    pub description: String,
    pub tags: Vec<String>,
    pub action: CardAction,
}

#[derive(Debug, Clone, Serialize)]
pub struct AssignmentsView {
    pub status_filter: StatusFilter,
    pub tag: Option<String>,
    pub cards: Vec<AssignmentCard>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NoticesView {
    pub tag: Option<String>,
    pub rows: Vec<NoticeRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FacultyCard {
    pub id: String,
    pub name: String,
    pub department: String,
    pub email: String,
    pub office: String,
    pub courses: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FacultyView {
    pub cards: Vec<FacultyCard>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DayCell {
    pub day: u32,
    pub events: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CalendarView {
    pub label: String,
    pub weekdays: [&'static str; 7],
    /// Empty cells before day 1, Sunday first.
    pub leading_blanks: u32,
    pub days: Vec<DayCell>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AssistantView {
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchView {
    pub query: String,
    pub results: Vec<Entity>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "panel", rename_all = "lowercase")]
pub enum PanelView {
    Courses { rows: Vec<CourseRow> },
    Tags { chips: Vec<TagChip> },
    Dashboard(DashboardView),
    Assignments(AssignmentsView),
    Notices(NoticesView),
    Faculty(FacultyView),
    Calendar(CalendarView),
    Assistant(AssistantView),
}

/// Everything a coordinator may read.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub store: &'a Store,
    pub filters: &'a Filters,
    pub month: NaiveDate,
    pub now: DateTime<Utc>,
}

pub fn render(panel: Panel, ctx: RenderContext<'_>) -> PanelView {
    match panel {
        Panel::Courses => PanelView::Courses {
            rows: render_courses(ctx.store),
        },
        Panel::Tags => PanelView::Tags {
            chips: render_tags(ctx.store, ctx.filters),
        },
        Panel::Dashboard => PanelView::Dashboard(render_dashboard(ctx.store, ctx.now)),
        Panel::Assignments => PanelView::Assignments(render_assignments(ctx.store, ctx.filters)),
        Panel::Notices => PanelView::Notices(render_notices(ctx.store, ctx.filters)),
        Panel::Faculty => PanelView::Faculty(render_faculty(ctx.store)),
        Panel::Calendar => PanelView::Calendar(render_calendar(ctx.store, ctx.month)),
        Panel::Assistant => PanelView::Assistant(AssistantView {
            messages: ctx.store.chat_history.clone(),
        }),
    }
}

pub fn render_courses(store: &Store) -> Vec<CourseRow> {
    store
        .courses
        .iter()
        .map(|course| CourseRow {
            id: course.id.clone(),
            name: course.name.clone(),
            color: course.color.clone(),
            badge: course.tags.iter().take(2).cloned().collect::<Vec<_>>().join(", "),
            active: store.selected_course_id.as_deref() == Some(course.id.as_str()),
        })
        .collect()
}

pub fn render_tags(store: &Store, filters: &Filters) -> Vec<TagChip> {
    store
        .tags
        .iter()
        .map(|tag| TagChip {
            tag: tag.clone(),
            active: filters.active_tag.as_deref() == Some(tag.as_str()),
        })
        .collect()
}

fn deadline_row(assignment: &Assignment) -> DeadlineRow {
    DeadlineRow {
        id: assignment.id.clone(),
        title: assignment.title.clone(),
        status: assignment.status.to_string(),
        badge: assignment.status.badge(),
        due: assignment.due,
        tags: assignment.tags.clone(),
    }
}

fn notice_row(store: &Store, notice: &Notice) -> NoticeRow {
    NoticeRow {
        id: notice.id.clone(),
        title: notice.title.clone(),
        body: notice.body.clone(),
        course: store.course_name(&notice.course_id).to_string(),
        created_at: notice.created_at,
        tags: notice.tags.clone(),
    }
}

fn reminder_row(reminder: Reminder) -> ReminderRow {
    ReminderRow {
        label: reminder.kind.label(),
        badge: reminder.kind.badge(),
        text: reminder.text,
    }
}

pub fn render_dashboard(store: &Store, now: DateTime<Utc>) -> DashboardView {
    let selected = store.selected_course_id.as_deref();
    DashboardView {
        stats: derivations::dashboard_stats(store),
        upcoming: derivations::upcoming_deadlines(store, selected)
            .into_iter()
            .map(deadline_row)
            .collect(),
        recent_notices: derivations::recent_notices(store, selected)
            .into_iter()
            .map(|notice| notice_row(store, notice))
            .collect(),
        reminders: derivations::smart_reminders(store, now)
            .into_iter()
            .map(reminder_row)
            .collect(),
    }
}

pub fn render_assignments(store: &Store, filters: &Filters) -> AssignmentsView {
    let action = match store.role {
        Role::Student => CardAction::MarkSubmitted,
        Role::Faculty => CardAction::Edit,
    };
    let cards = derivations::filtered_assignments(
        store,
        store.selected_course_id.as_deref(),
        filters.active_tag.as_deref(),
        filters.status,
    )
    .into_iter()
    .map(|assignment| AssignmentCard {
        id: assignment.id.clone(),
        title: assignment.title.clone(),
        status: assignment.status.to_string(),
        badge: assignment.status.badge(),
        course: store.course_name(&assignment.course_id).to_string(),
        due: assignment.due,
        description: assignment.description.clone(),
        tags: assignment.tags.clone(),
        action,
    })
    .collect();

    AssignmentsView {
        status_filter: filters.status,
        tag: filters.active_tag.clone(),
        cards,
    }
}

pub fn render_notices(store: &Store, filters: &Filters) -> NoticesView {
    let rows = derivations::filtered_notices(
        store,
        store.selected_course_id.as_deref(),
        filters.active_tag.as_deref(),
    )
    .into_iter()
    .map(|notice| notice_row(store, notice))
    .collect();

    NoticesView {
        tag: filters.active_tag.clone(),
        rows,
    }
}

pub fn render_faculty(store: &Store) -> FacultyView {
    FacultyView {
        cards: store
            .faculty
            .iter()
            .map(|member| FacultyCard {
                id: member.id.clone(),
                name: member.name.clone(),
                department: member.department.clone(),
                email: member.email.clone(),
                office: member.office.clone(),
                courses: member.courses.clone(),
            })
            .collect(),
    }
}

pub fn faculty_courses(store: &Store, faculty_id: &str) -> Result<Vec<String>, HubError> {
    store
        .faculty_member(faculty_id)
        .map(|member| member.courses.clone())
        .ok_or_else(|| HubError::FacultyNotFound(faculty_id.to_string()))
}

pub fn render_search(store: &Store, query: &str) -> SearchView {
    SearchView {
        query: query.trim().to_string(),
        results: derivations::search(store, query),
    }
}

pub fn month_start(at: NaiveDate) -> NaiveDate {
    at.with_day(1).unwrap_or(at)
}

pub fn shift_month(month: NaiveDate, delta: i32) -> NaiveDate {
    let start = month_start(month);
    let shifted = if delta >= 0 {
        start.checked_add_months(Months::new(delta.unsigned_abs()))
    } else {
        start.checked_sub_months(Months::new(delta.unsigned_abs()))
    };
    shifted.unwrap_or(start)
}

fn days_in_month(start: NaiveDate) -> u32 {
    shift_month(start, 1)
        .pred_opt()
        .map(|last| last.day())
        .unwrap_or(28)
}

pub fn render_calendar(store: &Store, month: NaiveDate) -> CalendarView {
    let start = month_start(month);
    let selected = store.selected_course_id.as_deref();

    let days = (1..=days_in_month(start))
        .filter_map(|day| start.with_day(day))
        .map(|date| DayCell {
            day: date.day(),
            events: store
                .events
                .iter()
                .filter(|event| selected.map_or(true, |id| id == event.course_id))
                .filter(|event| event.date.date_naive() == date)
                .map(|event| event.title.clone())
                .collect(),
        })
        .collect();

    CalendarView {
        label: start.format("%B %Y").to_string(),
        weekdays: WEEKDAYS,
        leading_blanks: start.weekday().num_days_from_sunday(),
        days,
    }
}
