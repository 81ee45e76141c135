use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use uuid::Uuid;

use crate::models::{
    Assignment, AssignmentStatus, ChatMessage, ChatRole, Course, Event, Faculty, Notice, Role,
};

const PALETTE: [&str; 6] = [
    "#4ea1ff", "#37c56c", "#ffcc66", "#ff6b6b", "#b784ff", "#5dd1b7",
];

pub const UNKNOWN_COURSE: &str = "Unknown";

/// Every entity collection plus the UI state shared by all panels.
#[derive(Debug, Clone, Default)]
pub struct Store {
    pub role: Role,
    pub courses: Vec<Course>,
    pub assignments: Vec<Assignment>,
    pub notices: Vec<Notice>,
    pub faculty: Vec<Faculty>,
    pub events: Vec<Event>,
    pub tags: Vec<String>,
    pub chat_history: Vec<ChatMessage>,
    pub selected_course_id: Option<String>,
}

impl Store {
    /// Demo data laid out relative to `now`.
    pub fn seeded(now: DateTime<Utc>) -> Self {
        let mut store = Store::default();

        let courses = vec![
            ("cse101", "CSE101 — Programming Fundamentals", "#4ea1ff", ["coding", "first-year"]),
            ("mat202", "MAT202 — Linear Algebra", "#37c56c", ["math", "core"]),
            ("phy150", "PHY150 — Mechanics", "#ffcc66", ["physics", "lab"]),
        ];
        for (id, name, color, tags) in courses {
            store.courses.push(Course {
                id: id.to_string(),
                name: name.to_string(),
                color: color.to_string(),
                tags: tags.iter().map(|tag| tag.to_string()).collect(),
            });
        }

        let assignments = vec![
            (
                "a1",
                "cse101",
                "Loops & Arrays Lab",
                3,
                AssignmentStatus::Pending,
                vec!["lab", "coding"],
                "Solve 5 problems using loops over arrays.",
            ),
            (
                "a2",
                "mat202",
                "Matrix Factorization Sheet",
                5,
                AssignmentStatus::Pending,
                vec!["homework", "math"],
                "Practice LU and QR problems from sheet 3.",
            ),
            (
                "a3",
                "phy150",
                "Projectile Motion Report",
                -1,
                AssignmentStatus::Overdue,
                vec!["lab", "report"],
                "Analyze trajectory data and submit PDF.",
            ),
        ];
        for (id, course_id, title, offset, status, tags, description) in assignments {
            store.assignments.push(Assignment {
                id: id.to_string(),
                course_id: course_id.to_string(),
                title: title.to_string(),
                due: now + Duration::days(offset),
                status,
                description: description.to_string(),
                tags: tags.into_iter().map(str::to_string).collect(),
            });
        }

        let notices = vec![
            (
                "n1",
                "cse101",
                "Lab timing update",
                "Lab moved to Thursday 2 PM.",
                0,
                vec!["schedule"],
            ),
            (
                "n2",
                "mat202",
                "Quiz reminder",
                "Syllabus: Chapters 1–3. Bring calculator.",
                -1,
                vec!["exam", "reminder"],
            ),
        ];
        for (id, course_id, title, body, offset, tags) in notices {
            store.notices.push(Notice {
                id: id.to_string(),
                course_id: course_id.to_string(),
                title: title.to_string(),
                body: body.to_string(),
                created_at: start_of_day(now + Duration::days(offset)),
                tags: tags.into_iter().map(str::to_string).collect(),
            });
        }

        let faculty = vec![
            ("f1", "Dr. Ananya Rao", "Computer Science", "ananya.rao@campushub.edu", "CSE101", "Block A-302"),
            ("f2", "Prof. Karan Mehta", "Mathematics", "karan.mehta@campushub.edu", "MAT202", "Block B-210"),
            ("f3", "Dr. Neha Kulkarni", "Physics", "neha.kulkarni@campushub.edu", "PHY150", "Block D-115"),
        ];
        for (id, name, department, email, course, office) in faculty {
            store.faculty.push(Faculty {
                id: id.to_string(),
                name: name.to_string(),
                department: department.to_string(),
                email: email.to_string(),
                office: office.to_string(),
                courses: vec![course.to_string()],
            });
        }

        let events = vec![
            ("e1", "MAT202 Quiz", 5, "mat202"),
            ("e2", "CSE101 Lab", 3, "cse101"),
        ];
        for (id, title, offset, course_id) in events {
            store.events.push(Event {
                id: id.to_string(),
                title: title.to_string(),
                date: now + Duration::days(offset),
                course_id: course_id.to_string(),
            });
        }

        store.tags = [
            "coding", "first-year", "math", "core", "physics", "lab", "homework", "exam",
            "reminder", "report", "schedule",
        ]
        .iter()
        .map(|tag| tag.to_string())
        .collect();

        store
    }

    pub fn course_name(&self, course_id: &str) -> &str {
        self.courses
            .iter()
            .find(|course| course.id == course_id)
            .map(|course| course.name.as_str())
            .unwrap_or(UNKNOWN_COURSE)
    }

    pub fn assignment_mut(&mut self, id: &str) -> Option<&mut Assignment> {
        self.assignments.iter_mut().find(|assignment| assignment.id == id)
    }

    pub fn faculty_member(&self, id: &str) -> Option<&Faculty> {
        self.faculty.iter().find(|member| member.id == id)
    }

    /// Appends tags missing from the tag cloud. Returns true when the cloud grew.
    pub fn register_tags(&mut self, tags: &[String]) -> bool {
        let mut grew = false;
        for tag in tags {
            if !self.tags.contains(tag) {
                self.tags.push(tag.clone());
                grew = true;
            }
        }
        grew
    }

    pub fn next_color(&self) -> &'static str {
        PALETTE[self.courses.len() % PALETTE.len()]
    }

    pub fn push_chat(&mut self, role: ChatRole, text: &str, time: DateTime<Utc>) {
        self.chat_history.push(ChatMessage {
            role,
            text: text.to_string(),
            time,
        });
    }
}

pub fn new_id(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::new_v4().simple())
}

/// Short lowercase slug of a course name with a unique suffix.
pub fn course_id_for(name: &str) -> String {
    let slug: String = name
        .to_lowercase()
        .chars()
        .filter(|ch| !ch.is_whitespace())
        .take(8)
        .collect();
    new_id(&slug)
}

pub fn start_of_day(at: DateTime<Utc>) -> DateTime<Utc> {
    at.date_naive().and_time(NaiveTime::MIN).and_utc()
}

/// Calendar dates typed into forms land at midnight UTC.
pub fn date_to_timestamp(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, 9, 30, 0).unwrap()
    }

    #[test]
    fn seed_matches_demo_layout() {
        let store = Store::seeded(fixed_now());
        assert_eq!(store.courses.len(), 3);
        assert_eq!(store.assignments.len(), 3);
        assert_eq!(store.notices.len(), 2);
        assert_eq!(store.faculty.len(), 3);
        assert_eq!(store.events.len(), 2);
        assert_eq!(store.tags.len(), 11);
        assert_eq!(store.role, Role::Student);
        assert!(store.selected_course_id.is_none());

        let overdue = &store.assignments[2];
        assert_eq!(overdue.id, "a3");
        assert_eq!(overdue.status, AssignmentStatus::Overdue);
        assert_eq!(overdue.due, fixed_now() - Duration::days(1));
        assert_eq!(
            store.notices[1].created_at,
            Utc.with_ymd_and_hms(2026, 3, 9, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn dangling_course_reference_reads_as_unknown() {
        let store = Store::seeded(fixed_now());
        assert_eq!(store.course_name("mat202"), "MAT202 — Linear Algebra");
        assert_eq!(store.course_name("bio999"), UNKNOWN_COURSE);
    }

    #[test]
    fn course_ids_are_slugged_and_unique() {
        let first = course_id_for("ECE210 Signals and Systems");
        let second = course_id_for("ECE210 Signals and Systems");
        assert!(first.starts_with("ece210si-"));
        assert_ne!(first, second);
    }

    #[test]
    fn register_tags_only_reports_growth_for_new_tags() {
        let mut store = Store::seeded(fixed_now());
        assert!(!store.register_tags(&["lab".to_string()]));
        assert!(store.register_tags(&["capstone".to_string(), "lab".to_string()]));
        assert_eq!(store.tags.last().map(String::as_str), Some("capstone"));
        assert_eq!(store.tags.len(), 12);
    }
}
