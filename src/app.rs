//! Application state and the single update function that mutates it.
//!
//! Every input is expressed as an [`Action`]. [`App::dispatch`] applies it to the
//! store or the render filters and returns the [`Invalidation`] listing the
//! panels whose view models may have changed. Callers re-render exactly those
//! panels; no call site keeps its own list of dependents.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, info, warn};

use crate::assistant::{self, Reply, SideEffect};
use crate::error::{HubError, Result};
use crate::models::{
    parse_tags, Assignment, AssignmentInput, AssignmentStatus, ChatRole, Course, Event,
    EventInput, Notice, NoticeInput, Role, StatusFilter,
};
use crate::store::{self, Store};
use crate::view::{self, Filters, Panel, PanelView, RenderContext};

#[derive(Debug, Clone)]
pub enum Action {
    SelectCourse(Option<String>),
    SetActiveTag(Option<String>),
    SetStatusFilter(StatusFilter),
    ToggleRole,
    PrevMonth,
    NextMonth,
    AddCourse { name: String },
    CreateAssignment(AssignmentInput),
    EditAssignment { id: String, input: AssignmentInput },
    MarkSubmitted { id: String },
    PostNotice(NoticeInput),
    AddEvent(EventInput),
    SendChat { text: String },
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::SelectCourse(_) => "select_course",
            Action::SetActiveTag(_) => "set_active_tag",
            Action::SetStatusFilter(_) => "set_status_filter",
            Action::ToggleRole => "toggle_role",
            Action::PrevMonth => "prev_month",
            Action::NextMonth => "next_month",
            Action::AddCourse { .. } => "add_course",
            Action::CreateAssignment(_) => "create_assignment",
            Action::EditAssignment { .. } => "edit_assignment",
            Action::MarkSubmitted { .. } => "mark_submitted",
            Action::PostNotice(_) => "post_notice",
            Action::AddEvent(_) => "add_event",
            Action::SendChat { .. } => "send_chat",
        }
    }
}

/// Panels to re-render after an action, plus any follow-up the caller owes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Invalidation {
    pub panels: BTreeSet<Panel>,
    pub reply: Option<Reply>,
    pub open_assignment_form: bool,
}

impl Invalidation {
    fn of(panels: &[Panel]) -> Self {
        Self {
            panels: panels.iter().copied().collect(),
            ..Self::default()
        }
    }

    fn with(mut self, panel: Panel) -> Self {
        self.panels.insert(panel);
        self
    }

    pub fn contains(&self, panel: Panel) -> bool {
        self.panels.contains(&panel)
    }

    pub fn is_empty(&self) -> bool {
        self.panels.is_empty()
    }
}

pub struct App {
    store: Store,
    filters: Filters,
    month: NaiveDate,
    pinned_now: Option<DateTime<Utc>>,
}

impl App {
    pub fn new(store: Store, now: DateTime<Utc>) -> Self {
        Self {
            store,
            filters: Filters::default(),
            month: view::month_start(now.date_naive()),
            pinned_now: None,
        }
    }

    /// Seeded session. A pinned clock makes every derivation use `now`.
    pub fn seeded(now: DateTime<Utc>, pin_clock: bool) -> Self {
        let mut app = Self::new(Store::seeded(now), now);
        if pin_clock {
            app.pinned_now = Some(now);
        }
        app
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.pinned_now.unwrap_or_else(Utc::now)
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn set_role(&mut self, role: Role) {
        self.store.role = role;
    }

    pub fn render(&self, panel: Panel) -> PanelView {
        view::render(
            panel,
            RenderContext {
                store: &self.store,
                filters: &self.filters,
                month: self.month,
                now: self.now(),
            },
        )
    }

    /// Re-renders every panel named by `invalidation`, in display order.
    pub fn refresh(&self, invalidation: &Invalidation) -> Vec<PanelView> {
        invalidation
            .panels
            .iter()
            .map(|panel| self.render(*panel))
            .collect()
    }

    /// Applies `action`. On error the store is left exactly as it was.
    pub fn dispatch(&mut self, action: Action) -> Result<Invalidation> {
        let name = action.name();
        info!(action = name, "dispatching action");

        let result = self.apply(action);
        match &result {
            Ok(invalidation) => debug!(
                action = name,
                panels = ?invalidation.panels,
                "panels invalidated"
            ),
            Err(err) => warn!(action = name, error = %err, "action rejected"),
        }
        result
    }

    fn apply(&mut self, action: Action) -> Result<Invalidation> {
        match action {
            Action::SelectCourse(course_id) => {
                self.store.selected_course_id = course_id;
                Ok(Invalidation::of(&[
                    Panel::Courses,
                    Panel::Assignments,
                    Panel::Notices,
                    Panel::Dashboard,
                    Panel::Calendar,
                ]))
            }
            Action::SetActiveTag(tag) => {
                self.filters.active_tag = tag;
                Ok(Invalidation::of(&[Panel::Tags, Panel::Assignments, Panel::Notices]))
            }
            Action::SetStatusFilter(status) => {
                self.filters.status = status;
                Ok(Invalidation::of(&[Panel::Assignments]))
            }
            Action::ToggleRole => {
                self.store.role = self.store.role.toggled();
                Ok(Invalidation::of(&[Panel::Assignments, Panel::Dashboard]))
            }
            Action::PrevMonth => {
                self.month = view::shift_month(self.month, -1);
                Ok(Invalidation::of(&[Panel::Calendar]))
            }
            Action::NextMonth => {
                self.month = view::shift_month(self.month, 1);
                Ok(Invalidation::of(&[Panel::Calendar]))
            }
            Action::AddCourse { name } => self.add_course(&name),
            Action::CreateAssignment(input) => self.create_assignment(input),
            Action::EditAssignment { id, input } => self.edit_assignment(&id, input),
            Action::MarkSubmitted { id } => self.mark_submitted(&id),
            Action::PostNotice(input) => self.post_notice(input),
            Action::AddEvent(input) => self.add_event(input),
            Action::SendChat { text } => self.send_chat(&text),
        }
    }

    fn add_course(&mut self, name: &str) -> Result<Invalidation> {
        let name = required(name, "Course name")?;
        let course = Course {
            id: store::course_id_for(&name),
            color: self.store.next_color().to_string(),
            name,
            tags: Vec::new(),
        };
        info!(course_id = %course.id, "course created");
        self.store.courses.push(course);
        Ok(Invalidation::of(&[Panel::Courses, Panel::Dashboard]))
    }

    fn create_assignment(&mut self, input: AssignmentInput) -> Result<Invalidation> {
        let assignment = build_assignment(store::new_id("a"), input)?;
        let grew = self.store.register_tags(&assignment.tags);
        info!(assignment_id = %assignment.id, "assignment created");
        self.store.assignments.push(assignment);
        Ok(self.with_tags(Invalidation::of(&[Panel::Assignments, Panel::Dashboard]), grew))
    }

    fn edit_assignment(&mut self, id: &str, input: AssignmentInput) -> Result<Invalidation> {
        let updated = build_assignment(id.to_string(), input)?;
        let existing = self
            .store
            .assignment_mut(id)
            .ok_or_else(|| HubError::AssignmentNotFound(id.to_string()))?;
        *existing = updated;
        let tags = existing.tags.clone();
        let grew = self.store.register_tags(&tags);
        Ok(self.with_tags(Invalidation::of(&[Panel::Assignments, Panel::Dashboard]), grew))
    }

    fn mark_submitted(&mut self, id: &str) -> Result<Invalidation> {
        let assignment = self
            .store
            .assignment_mut(id)
            .ok_or_else(|| HubError::AssignmentNotFound(id.to_string()))?;
        assignment.status = AssignmentStatus::Submitted;
        Ok(Invalidation::of(&[Panel::Assignments, Panel::Dashboard]))
    }

    fn post_notice(&mut self, input: NoticeInput) -> Result<Invalidation> {
        let notice = Notice {
            id: store::new_id("n"),
            title: required(&input.title, "Notice title")?,
            course_id: input.course_id,
            body: input.body.trim().to_string(),
            created_at: self.now(),
            tags: parse_tags(&input.tags),
        };
        let grew = self.store.register_tags(&notice.tags);
        self.store.notices.push(notice);
        Ok(self.with_tags(Invalidation::of(&[Panel::Notices, Panel::Dashboard]), grew))
    }

    fn add_event(&mut self, input: EventInput) -> Result<Invalidation> {
        let event = Event {
            id: store::new_id("e"),
            title: required(&input.title, "Event title")?,
            date: store::date_to_timestamp(input.date),
            course_id: input.course_id,
        };
        self.store.events.push(event);
        Ok(Invalidation::of(&[Panel::Calendar, Panel::Dashboard]))
    }

    fn send_chat(&mut self, text: &str) -> Result<Invalidation> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(Invalidation::default());
        }
        let now = self.now();
        self.store.push_chat(ChatRole::User, text, now);
        let reply = assistant::respond(&self.store, text);
        debug!(intent = ?reply.intent, "assistant matched");
        self.store.push_chat(ChatRole::Bot, &reply.text, now);

        let mut invalidation = Invalidation::of(&[Panel::Assistant]);
        match &reply.effect {
            Some(SideEffect::FilterAssignmentsByTag(tag)) => {
                let filtered = self.apply(Action::SetActiveTag(Some(tag.clone())))?;
                invalidation.panels.extend(filtered.panels);
            }
            Some(SideEffect::OpenAssignmentForm) => invalidation.open_assignment_form = true,
            None => {}
        }
        invalidation.reply = Some(reply);
        Ok(invalidation)
    }

    fn with_tags(&self, invalidation: Invalidation, grew: bool) -> Invalidation {
        if grew {
            invalidation.with(Panel::Tags)
        } else {
            invalidation
        }
    }
}

fn required(value: &str, field: &'static str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(HubError::MissingField(field));
    }
    Ok(value.to_string())
}

/// New record from form input. Status always starts out pending.
fn build_assignment(id: String, input: AssignmentInput) -> Result<Assignment> {
    Ok(Assignment {
        id,
        title: required(&input.title, "Assignment title")?,
        course_id: input.course_id,
        due: store::date_to_timestamp(input.due),
        status: AssignmentStatus::Pending,
        description: input.description.trim().to_string(),
        tags: parse_tags(&input.tags),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::derivations;
    use crate::models::ReminderKind;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, 9, 30, 0).unwrap()
    }

    fn app() -> App {
        App::seeded(now(), true)
    }

    fn panels(invalidation: &Invalidation) -> Vec<Panel> {
        invalidation.panels.iter().copied().collect()
    }

    fn assignment_input(title: &str) -> AssignmentInput {
        AssignmentInput {
            title: title.to_string(),
            course_id: "cse101".to_string(),
            due: now().date_naive() + Duration::days(2),
            description: "D".to_string(),
            tags: "x, y".to_string(),
        }
    }

    #[test]
    fn filter_changes_invalidate_their_dependents() {
        let mut app = app();

        let selected = app.dispatch(Action::SelectCourse(Some("mat202".to_string()))).unwrap();
        assert_eq!(
            panels(&selected),
            vec![
                Panel::Courses,
                Panel::Dashboard,
                Panel::Assignments,
                Panel::Notices,
                Panel::Calendar,
            ]
        );

        let tagged = app.dispatch(Action::SetActiveTag(Some("lab".to_string()))).unwrap();
        assert_eq!(panels(&tagged), vec![Panel::Tags, Panel::Assignments, Panel::Notices]);
        assert!(!tagged.contains(Panel::Dashboard));

        let status = app
            .dispatch(Action::SetStatusFilter(StatusFilter::Only(AssignmentStatus::Pending)))
            .unwrap();
        assert_eq!(panels(&status), vec![Panel::Assignments]);

        let month = app.dispatch(Action::NextMonth).unwrap();
        assert_eq!(panels(&month), vec![Panel::Calendar]);
    }

    #[test]
    fn selecting_mat202_limits_notices() {
        let mut app = app();
        app.dispatch(Action::SelectCourse(Some("mat202".to_string()))).unwrap();
        let ids: Vec<&str> = derivations::recent_notices(app.store(), Some("mat202"))
            .iter()
            .map(|notice| notice.id.as_str())
            .collect();
        assert_eq!(ids, vec!["n2"]);

        match app.render(Panel::Notices) {
            PanelView::Notices(view) => {
                assert_eq!(view.rows.len(), 1);
                assert_eq!(view.rows[0].id, "n2");
            }
            other => panic!("unexpected view: {other:?}"),
        }
    }

    #[test]
    fn mark_submitted_clears_overdue_reminder_and_deadline() {
        let mut app = app();
        let invalidation = app
            .dispatch(Action::MarkSubmitted { id: "a3".to_string() })
            .unwrap();
        assert_eq!(panels(&invalidation), vec![Panel::Dashboard, Panel::Assignments]);

        let store = app.store();
        assert_eq!(store.assignments[2].status, AssignmentStatus::Submitted);
        assert!(derivations::smart_reminders(store, now())
            .iter()
            .all(|reminder| reminder.kind != ReminderKind::Overdue));
        assert!(derivations::upcoming_deadlines(store, None)
            .iter()
            .all(|assignment| assignment.id != "a3"));
    }

    #[test]
    fn unknown_assignment_id_changes_nothing() {
        let mut app = app();
        let before = app.store().assignments.len();
        let err = app
            .dispatch(Action::MarkSubmitted { id: "a404".to_string() })
            .unwrap_err();
        assert_eq!(err, HubError::AssignmentNotFound("a404".to_string()));

        let err = app
            .dispatch(Action::EditAssignment {
                id: "a404".to_string(),
                input: assignment_input("Renamed"),
            })
            .unwrap_err();
        assert_eq!(err, HubError::AssignmentNotFound("a404".to_string()));
        assert_eq!(app.store().assignments.len(), before);
    }

    #[test]
    fn created_assignment_is_pending_and_listed() {
        let mut app = app();
        let invalidation = app
            .dispatch(Action::CreateAssignment(assignment_input("T")))
            .unwrap();
        assert!(invalidation.contains(Panel::Assignments));
        assert!(invalidation.contains(Panel::Dashboard));
        assert!(invalidation.contains(Panel::Tags));

        let created = app.store().assignments.last().unwrap();
        assert_eq!(created.title, "T");
        assert_eq!(created.status, AssignmentStatus::Pending);
        assert_eq!(created.tags, vec!["x".to_string(), "y".to_string()]);
        assert_eq!(created.due.date_naive(), now().date_naive() + Duration::days(2));

        let listed = derivations::filtered_assignments(app.store(), None, None, StatusFilter::All);
        assert!(listed.iter().any(|assignment| assignment.id == created.id));
    }

    #[test]
    fn missing_title_is_rejected_without_store_change() {
        let mut app = app();
        let err = app
            .dispatch(Action::CreateAssignment(assignment_input("   ")))
            .unwrap_err();
        assert_eq!(err, HubError::MissingField("Assignment title"));
        assert_eq!(app.store().assignments.len(), 3);
        assert_eq!(app.store().tags.len(), 11);

        let err = app.dispatch(Action::AddCourse { name: String::new() }).unwrap_err();
        assert_eq!(err.to_string(), "Course name required");
        assert_eq!(app.store().courses.len(), 3);
    }

    #[test]
    fn edit_replaces_fields_and_resets_status() {
        let mut app = app();
        app.dispatch(Action::EditAssignment {
            id: "a3".to_string(),
            input: AssignmentInput {
                title: "Projectile Motion Report v2".to_string(),
                course_id: "phy150".to_string(),
                due: now().date_naive() + Duration::days(1),
                description: "Resubmit with error bars.".to_string(),
                tags: "lab".to_string(),
            },
        })
        .unwrap();

        let edited = &app.store().assignments[2];
        assert_eq!(edited.id, "a3");
        assert_eq!(edited.title, "Projectile Motion Report v2");
        assert_eq!(edited.status, AssignmentStatus::Pending);
        assert_eq!(edited.tags, vec!["lab".to_string()]);
    }

    #[test]
    fn new_course_gets_palette_color_and_unique_id() {
        let mut app = app();
        let invalidation = app
            .dispatch(Action::AddCourse { name: " ECE210 — Signals ".to_string() })
            .unwrap();
        assert_eq!(panels(&invalidation), vec![Panel::Courses, Panel::Dashboard]);

        let course = app.store().courses.last().unwrap();
        assert_eq!(course.name, "ECE210 — Signals");
        assert_eq!(course.color, "#ff6b6b");
        assert!(course.id.starts_with("ece210—s-"));
        assert!(course.tags.is_empty());
    }

    #[test]
    fn notices_and_events_land_in_their_panels() {
        let mut app = app();
        let posted = app
            .dispatch(Action::PostNotice(NoticeInput {
                title: "Midterm room".to_string(),
                course_id: "mat202".to_string(),
                body: "Hall C".to_string(),
                tags: "exam".to_string(),
            }))
            .unwrap();
        assert_eq!(panels(&posted), vec![Panel::Dashboard, Panel::Notices]);
        assert_eq!(app.store().notices.last().unwrap().created_at, now());

        let added = app
            .dispatch(Action::AddEvent(EventInput {
                title: "Midterm".to_string(),
                date: NaiveDate::from_ymd_opt(2026, 3, 20).unwrap(),
                course_id: "mat202".to_string(),
            }))
            .unwrap();
        assert_eq!(panels(&added), vec![Panel::Dashboard, Panel::Calendar]);

        match app.render(Panel::Calendar) {
            PanelView::Calendar(view) => {
                assert_eq!(view.days[19].events, vec!["Midterm".to_string()]);
            }
            other => panic!("unexpected view: {other:?}"),
        }
    }

    #[test]
    fn chat_tag_filter_updates_assignment_panel() {
        let mut app = app();
        let invalidation = app
            .dispatch(Action::SendChat { text: "show #report".to_string() })
            .unwrap();
        assert_eq!(
            panels(&invalidation),
            vec![Panel::Tags, Panel::Assignments, Panel::Notices, Panel::Assistant]
        );
        assert_eq!(app.store().chat_history.len(), 2);
        assert_eq!(app.store().chat_history[1].role, ChatRole::Bot);

        match app.render(Panel::Assignments) {
            PanelView::Assignments(view) => {
                assert_eq!(view.tag.as_deref(), Some("report"));
                assert_eq!(view.cards.len(), 1);
                assert_eq!(view.cards[0].id, "a3");
            }
            other => panic!("unexpected view: {other:?}"),
        }
    }

    #[test]
    fn chat_tag_filter_narrows_notices_too() {
        let mut app = app();
        let before = match app.render(Panel::Notices) {
            PanelView::Notices(view) => view.rows.len(),
            other => panic!("unexpected view: {other:?}"),
        };
        assert_eq!(before, 2);

        let invalidation = app
            .dispatch(Action::SendChat { text: "show #exam".to_string() })
            .unwrap();
        assert!(invalidation.contains(Panel::Notices));
        match app.render(Panel::Notices) {
            PanelView::Notices(view) => {
                assert_eq!(view.tag.as_deref(), Some("exam"));
                assert_eq!(view.rows.len(), 1);
            }
            other => panic!("unexpected view: {other:?}"),
        }
    }

    fn snapshot(app: &App) -> Vec<(Panel, serde_json::Value)> {
        Panel::all()
            .iter()
            .map(|panel| (*panel, serde_json::to_value(app.render(*panel)).unwrap()))
            .collect()
    }

    #[test]
    fn every_changed_panel_is_invalidated() {
        let actions = vec![
            Action::SelectCourse(Some("mat202".to_string())),
            Action::SetActiveTag(Some("lab".to_string())),
            Action::SetStatusFilter(StatusFilter::Only(AssignmentStatus::Submitted)),
            Action::ToggleRole,
            Action::PrevMonth,
            Action::NextMonth,
            Action::AddCourse { name: "ECE210".to_string() },
            Action::CreateAssignment(assignment_input("T")),
            Action::EditAssignment {
                id: "a1".to_string(),
                input: assignment_input("Renamed"),
            },
            Action::MarkSubmitted { id: "a1".to_string() },
            Action::PostNotice(NoticeInput {
                title: "Room change".to_string(),
                course_id: "cse101".to_string(),
                body: "Lab 4".to_string(),
                tags: "lab, moved".to_string(),
            }),
            Action::AddEvent(EventInput {
                title: "Quiz".to_string(),
                date: now().date_naive() + Duration::days(1),
                course_id: "cse101".to_string(),
            }),
            Action::SendChat { text: "show #exam".to_string() },
            Action::SendChat { text: "what's due soon?".to_string() },
        ];

        for action in actions {
            let mut app = app();
            let name = action.name();
            let before = snapshot(&app);
            let invalidation = app.dispatch(action).unwrap();
            let after = snapshot(&app);

            for ((panel, old), (_, new)) in before.iter().zip(after.iter()) {
                if old != new {
                    assert!(
                        invalidation.contains(*panel),
                        "{name} changed {} without invalidating it",
                        panel.name()
                    );
                }
            }
        }
    }

    #[test]
    fn chat_can_request_assignment_form() {
        let mut app = app();
        let invalidation = app
            .dispatch(Action::SendChat { text: "create assignment".to_string() })
            .unwrap();
        assert!(invalidation.open_assignment_form);
        assert!(app.dispatch(Action::SendChat { text: "  ".to_string() }).unwrap().is_empty());
        assert_eq!(app.store().chat_history.len(), 2);
    }

    #[test]
    fn role_toggle_switches_card_actions() {
        let mut app = app();
        let invalidation = app.dispatch(Action::ToggleRole).unwrap();
        assert_eq!(panels(&invalidation), vec![Panel::Dashboard, Panel::Assignments]);
        assert_eq!(app.store().role, Role::Faculty);
        assert_eq!(app.refresh(&invalidation).len(), 2);
    }
}
