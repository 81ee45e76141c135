use std::io::Read;

use anyhow::Context;
use chrono::NaiveDate;

use crate::app::{Action, App};
use crate::models::AssignmentInput;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub inserted: usize,
    pub skipped: usize,
}

#[derive(serde::Deserialize)]
struct CsvRow {
    title: String,
    course_id: String,
    due: NaiveDate,
    #[serde(default)]
    description: String,
    #[serde(default)]
    tags: Option<String>,
}

pub fn import_csv(app: &mut App, csv_path: &std::path::Path) -> anyhow::Result<ImportSummary> {
    let file = std::fs::File::open(csv_path)
        .with_context(|| format!("failed to open {}", csv_path.display()))?;
    import_reader(app, file)
}

/// Rows go through the regular create action; rejected rows are skipped, not fatal.
pub fn import_reader<R: Read>(app: &mut App, reader: R) -> anyhow::Result<ImportSummary> {
    let mut reader = csv::Reader::from_reader(reader);
    let mut summary = ImportSummary::default();

    for (index, result) in reader.deserialize::<CsvRow>().enumerate() {
        let row = result.with_context(|| format!("malformed assignment row {}", index + 1))?;
        let action = Action::CreateAssignment(AssignmentInput {
            title: row.title,
            course_id: row.course_id,
            due: row.due,
            description: row.description,
            tags: row.tags.unwrap_or_default(),
        });

        match app.dispatch(action) {
            Ok(_) => summary.inserted += 1,
            Err(err) => {
                tracing::warn!(row = index + 1, error = %err, "skipping assignment row");
                summary.skipped += 1;
            }
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AssignmentStatus;
    use chrono::{TimeZone, Utc};

    fn app() -> App {
        App::seeded(Utc.with_ymd_and_hms(2026, 3, 10, 9, 30, 0).unwrap(), true)
    }

    #[test]
    fn rows_become_pending_assignments() {
        let mut app = app();
        let data = "title,course_id,due,description,tags\n\
                    Graph Traversal Lab,cse101,2026-03-12,BFS and DFS,\"lab, graphs\"\n\
                    ,mat202,2026-03-14,missing title,\n\
                    Eigen Sheet,mat202,2026-03-20,,\n";

        let summary = import_reader(&mut app, data.as_bytes()).unwrap();
        assert_eq!(summary, ImportSummary { inserted: 2, skipped: 1 });

        let store = app.store();
        assert_eq!(store.assignments.len(), 5);
        let lab = &store.assignments[3];
        assert_eq!(lab.title, "Graph Traversal Lab");
        assert_eq!(lab.status, AssignmentStatus::Pending);
        assert_eq!(lab.tags, vec!["lab".to_string(), "graphs".to_string()]);
        assert!(store.assignments[4].tags.is_empty());
        assert!(store.tags.contains(&"graphs".to_string()));
    }

    #[test]
    fn bad_dates_abort_with_row_context() {
        let mut app = app();
        let data = "title,course_id,due\nLab,cse101,next tuesday\n";
        let err = import_reader(&mut app, data.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("malformed assignment row 1"));
    }
}
