use std::io;
use std::path::PathBuf;

use anyhow::Context;
use chrono::Utc;
use clap::{ArgGroup, Parser, Subcommand};

mod app;
mod assistant;
mod config;
mod derivations;
mod error;
mod import;
mod logger;
mod models;
mod report;
mod shell;
mod store;
mod summary;
mod view;

use crate::app::{Action, App};
use crate::config::{Config, OutputFormat};
use crate::models::{Role, StatusFilter};
use crate::summary::SummaryStyle;
use crate::view::Panel;

#[derive(Parser)]
#[command(name = "campus-hub")]
#[command(about = "Campus dashboard for courses, assignments, notices and faculty", long_about = None)]
struct Cli {
    /// Output format (defaults to CAMPUSHUB_FORMAT, then text)
    #[arg(long, value_enum, global = true)]
    format: Option<OutputFormat>,
    /// Acting role (defaults to CAMPUSHUB_ROLE, then student)
    #[arg(long, global = true)]
    role: Option<Role>,
    /// Limit course-aware panels to one course id
    #[arg(long, global = true)]
    course: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Overview stats, upcoming deadlines, recent notices and reminders
    Dashboard,
    /// Assignment list
    Assignments {
        #[arg(long)]
        tag: Option<String>,
        #[arg(long, default_value = "all")]
        status: StatusFilter,
    },
    /// Notices, newest first
    Notices {
        #[arg(long)]
        tag: Option<String>,
    },
    /// Faculty directory
    Faculty {
        /// Only list the course codes of this faculty id
        #[arg(long)]
        courses_of: Option<String>,
    },
    /// Month grid with events
    Calendar {
        /// Months relative to the current one
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        offset: i32,
    },
    /// Search courses, assignments, notices and faculty
    Search { query: String },
    /// Ask the assistant a single question
    Chat {
        #[arg(required = true)]
        message: Vec<String>,
    },
    /// Summarize text into key points
    #[command(group(
        ArgGroup::new("source")
            .args(["file", "text"])
            .multiple(false)
    ))]
    Summarize {
        #[arg(long, default_value = "bullet")]
        style: SummaryStyle,
        #[arg(long)]
        file: Option<PathBuf>,
        text: Vec<String>,
    },
    /// Import assignments from a CSV file and list them
    Import {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Interactive session; changes last until quit
    Shell,
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    logger::init_logging();

    let cli = Cli::parse();
    let config = Config::from_env().context("invalid CAMPUSHUB_* configuration")?;
    let format = cli.format.unwrap_or(config.format);

    let now = config.now.unwrap_or_else(Utc::now);
    let mut app = App::seeded(now, config.now.is_some());
    app.set_role(cli.role.unwrap_or(config.role));
    if cli.course.is_some() {
        app.dispatch(Action::SelectCourse(cli.course.clone()))?;
    }
    tracing::info!(role = app.store().role.as_str(), "session ready");

    match cli.command {
        Commands::Dashboard => print_panel(&app, Panel::Dashboard, format)?,
        Commands::Assignments { tag, status } => {
            app.dispatch(Action::SetActiveTag(tag))?;
            app.dispatch(Action::SetStatusFilter(status))?;
            print_panel(&app, Panel::Assignments, format)?;
        }
        Commands::Notices { tag } => {
            app.dispatch(Action::SetActiveTag(tag))?;
            print_panel(&app, Panel::Notices, format)?;
        }
        Commands::Faculty { courses_of } => match courses_of {
            Some(faculty_id) => {
                let courses = view::faculty_courses(app.store(), &faculty_id)?;
                let output = report::render_output(&courses, format, |courses| {
                    format!("{}\n", courses.join(", "))
                })?;
                print!("{output}");
            }
            None => print_panel(&app, Panel::Faculty, format)?,
        },
        Commands::Calendar { offset } => {
            let step = if offset < 0 {
                Action::PrevMonth
            } else {
                Action::NextMonth
            };
            for _ in 0..offset.unsigned_abs() {
                app.dispatch(step.clone())?;
            }
            print_panel(&app, Panel::Calendar, format)?;
        }
        Commands::Search { query } => {
            let results = view::render_search(app.store(), &query);
            print!(
                "{}",
                report::render_output(&results, format, report::build_search)?
            );
        }
        Commands::Chat { message } => {
            let invalidation = app.dispatch(Action::SendChat {
                text: message.join(" "),
            })?;
            if invalidation.is_empty() {
                println!("Nothing to ask.");
            }
            if let Some(reply) = &invalidation.reply {
                println!("{}", reply.text);
            }
            for panel in [Panel::Assignments, Panel::Notices] {
                if invalidation.contains(panel) {
                    print_panel(&app, panel, format)?;
                }
            }
            if invalidation.open_assignment_form {
                println!("Run `campus-hub shell` and use new-assignment to fill in the form.");
            }
        }
        Commands::Summarize { style, file, text } => {
            let input = match file {
                Some(path) => std::fs::read_to_string(&path)
                    .with_context(|| format!("failed to read {}", path.display()))?,
                None => text.join(" "),
            };
            println!("{}", summary::summarize(&input, style).trim_end());
        }
        Commands::Import { csv } => {
            let summary = import::import_csv(&mut app, &csv)?;
            println!(
                "Imported {} assignments from {} ({} skipped).",
                summary.inserted,
                csv.display(),
                summary.skipped
            );
            print_panel(&app, Panel::Assignments, format)?;
        }
        Commands::Shell => {
            let stdin = io::stdin();
            let shell = shell::Shell::new(app, format, stdin.lock(), io::stdout());
            let app = shell.run()?;
            tracing::info!(messages = app.store().chat_history.len(), "shell closed");
        }
    }

    Ok(())
}

fn print_panel(app: &App, panel: Panel, format: OutputFormat) -> anyhow::Result<()> {
    let view = app.render(panel);
    print!("{}", report::render_output(&view, format, report::build_panel)?);
    Ok(())
}
