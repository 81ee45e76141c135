//! Interactive session: one command per line, mutations live until `quit`.

use std::io::{BufRead, Write};

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use crate::app::{Action, App, Invalidation};
use crate::config::OutputFormat;
use crate::error::HubError;
use crate::models::{AssignmentInput, EventInput, NoticeInput, StatusFilter};
use crate::report;
use crate::summary::{self, SummaryStyle};
use crate::view::{self, Panel, PanelView};

#[derive(Parser, Debug)]
#[command(no_binary_name = true, disable_help_subcommand = true)]
struct ShellLine {
    #[command(subcommand)]
    command: ShellCommand,
}

#[derive(clap::Args, Debug, Clone)]
struct AssignmentArgs {
    #[arg(long)]
    title: String,
    #[arg(long)]
    course: String,
    #[arg(long)]
    due: NaiveDate,
    #[arg(long, default_value = "")]
    description: String,
    #[arg(long, default_value = "")]
    tags: String,
}

impl From<AssignmentArgs> for AssignmentInput {
    fn from(args: AssignmentArgs) -> Self {
        AssignmentInput {
            title: args.title,
            course_id: args.course,
            due: args.due,
            description: args.description,
            tags: args.tags,
        }
    }
}

#[derive(Subcommand, Debug)]
enum ShellCommand {
    /// Select a course, or clear the selection when no id is given
    Select { course: Option<String> },
    /// Filter by tag, or clear the tag filter
    Tag { tag: Option<String> },
    /// Filter assignments by status (all, pending, submitted, overdue)
    Status { status: StatusFilter },
    /// Switch between student and faculty
    Role,
    /// Previous calendar month
    Prev,
    /// Next calendar month
    Next,
    /// Create a course
    AddCourse { name: Vec<String> },
    /// Create an assignment
    NewAssignment(AssignmentArgs),
    /// Replace an assignment's details
    EditAssignment {
        id: String,
        #[command(flatten)]
        args: AssignmentArgs,
    },
    /// Mark an assignment submitted
    Submit { id: String },
    /// Post a notice
    PostNotice {
        #[arg(long)]
        title: String,
        #[arg(long)]
        course: String,
        #[arg(long, default_value = "")]
        body: String,
        #[arg(long, default_value = "")]
        tags: String,
    },
    /// Add a calendar event
    AddEvent {
        #[arg(long)]
        title: String,
        #[arg(long)]
        date: NaiveDate,
        #[arg(long)]
        course: String,
    },
    /// Search courses, assignments, notices and faculty
    Search { query: Vec<String> },
    /// Ask the assistant
    Chat { message: Vec<String> },
    /// Summarize text into key points
    Summarize {
        #[arg(long, default_value = "bullet")]
        style: SummaryStyle,
        text: Vec<String>,
    },
    /// Render a panel
    Show { panel: Panel },
    /// List a faculty member's courses
    ViewCourses { faculty_id: String },
    /// List commands
    Help,
    /// Leave the shell
    Quit,
}

/// Splits a line on whitespace, keeping single- or double-quoted runs together.
pub fn tokenize(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut in_token = false;

    for ch in line.chars() {
        match quote {
            Some(open) if ch == open => quote = None,
            Some(_) => current.push(ch),
            None if ch == '"' || ch == '\'' => {
                quote = Some(ch);
                in_token = true;
            }
            None if ch.is_whitespace() => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            None => {
                current.push(ch);
                in_token = true;
            }
        }
    }
    if in_token {
        tokens.push(current);
    }
    tokens
}

pub struct Shell<R, W> {
    app: App,
    format: OutputFormat,
    input: R,
    out: W,
}

impl<R: BufRead, W: Write> Shell<R, W> {
    pub fn new(app: App, format: OutputFormat, input: R, out: W) -> Self {
        Self {
            app,
            format,
            input,
            out,
        }
    }

    /// Runs until `quit` or end of input and hands back the session state.
    pub fn run(mut self) -> anyhow::Result<App> {
        for panel in [Panel::Dashboard, Panel::Assignments] {
            self.show(panel)?;
        }

        loop {
            write!(self.out, "campus> ")?;
            self.out.flush()?;
            let Some(line) = self.read_line()? else {
                break;
            };
            let tokens = tokenize(&line);
            if tokens.is_empty() {
                continue;
            }

            let command = match ShellLine::try_parse_from(&tokens) {
                Ok(parsed) => parsed.command,
                Err(err) => {
                    writeln!(self.out, "{}", err.render())?;
                    continue;
                }
            };
            if matches!(command, ShellCommand::Quit) {
                break;
            }
            self.execute(command)?;
        }
        Ok(self.app)
    }

    fn read_line(&mut self) -> anyhow::Result<Option<String>> {
        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .context("failed to read shell input")?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    fn execute(&mut self, command: ShellCommand) -> anyhow::Result<()> {
        let action = match command {
            ShellCommand::Select { course } => Action::SelectCourse(course),
            ShellCommand::Tag { tag } => {
                Action::SetActiveTag(tag.map(|tag| tag.trim_start_matches('#').to_string()))
            }
            ShellCommand::Status { status } => Action::SetStatusFilter(status),
            ShellCommand::Role => Action::ToggleRole,
            ShellCommand::Prev => Action::PrevMonth,
            ShellCommand::Next => Action::NextMonth,
            ShellCommand::AddCourse { name } => Action::AddCourse { name: name.join(" ") },
            ShellCommand::NewAssignment(args) => Action::CreateAssignment(args.into()),
            ShellCommand::EditAssignment { id, args } => Action::EditAssignment {
                id,
                input: args.into(),
            },
            ShellCommand::Submit { id } => Action::MarkSubmitted { id },
            ShellCommand::PostNotice {
                title,
                course,
                body,
                tags,
            } => Action::PostNotice(NoticeInput {
                title,
                course_id: course,
                body,
                tags,
            }),
            ShellCommand::AddEvent {
                title,
                date,
                course,
            } => Action::AddEvent(EventInput {
                title,
                date,
                course_id: course,
            }),
            ShellCommand::Chat { message } => Action::SendChat {
                text: message.join(" "),
            },
            ShellCommand::Search { query } => {
                let view = view::render_search(self.app.store(), &query.join(" "));
                let text = report::render_output(&view, self.format, report::build_search)?;
                write!(self.out, "{text}")?;
                return Ok(());
            }
            ShellCommand::Summarize { style, text } => {
                writeln!(self.out, "{}", summary::summarize(&text.join(" "), style).trim_end())?;
                return Ok(());
            }
            ShellCommand::Show { panel } => return self.show(panel),
            ShellCommand::ViewCourses { faculty_id } => {
                match view::faculty_courses(self.app.store(), &faculty_id) {
                    Ok(courses) => writeln!(self.out, "{}", courses.join(", "))?,
                    Err(err) => writeln!(self.out, "Error: {err}")?,
                }
                return Ok(());
            }
            ShellCommand::Help => {
                let help = <ShellLine as clap::CommandFactory>::command().render_help();
                writeln!(self.out, "{help}")?;
                return Ok(());
            }
            ShellCommand::Quit => return Ok(()),
        };
        self.apply(action)
    }

    fn apply(&mut self, action: Action) -> anyhow::Result<()> {
        match self.app.dispatch(action) {
            Ok(invalidation) => self.after(invalidation),
            Err(err) => {
                writeln!(self.out, "Error: {err}")?;
                Ok(())
            }
        }
    }

    fn after(&mut self, invalidation: Invalidation) -> anyhow::Result<()> {
        if let Some(reply) = &invalidation.reply {
            writeln!(self.out, "Assistant: {}", reply.text)?;
        }
        for view in self.app.refresh(&invalidation) {
            // The reply line already covers the chat log.
            if matches!(view, PanelView::Assistant(_)) {
                continue;
            }
            let text = report::render_output(&view, self.format, report::build_panel)?;
            write!(self.out, "{text}")?;
        }
        if invalidation.open_assignment_form {
            self.assignment_form()?;
        }
        Ok(())
    }

    fn show(&mut self, panel: Panel) -> anyhow::Result<()> {
        let view = self.app.render(panel);
        let text = report::render_output(&view, self.format, report::build_panel)?;
        write!(self.out, "{text}")?;
        Ok(())
    }

    fn prompt(&mut self, label: &str) -> anyhow::Result<String> {
        write!(self.out, "{label}: ")?;
        self.out.flush()?;
        Ok(self.read_line()?.unwrap_or_default())
    }

    /// Collects the new-assignment form field by field.
    fn assignment_form(&mut self) -> anyhow::Result<()> {
        let title = self.prompt("Title")?;
        let course_id = self.prompt("Course id")?;
        let due_raw = self.prompt("Due date (YYYY-MM-DD)")?;
        let description = self.prompt("Description")?;
        let tags = self.prompt("Tags (comma)")?;

        let due = match NaiveDate::parse_from_str(due_raw.trim(), "%Y-%m-%d") {
            Ok(due) => due,
            Err(_) => {
                writeln!(self.out, "Error: {}", HubError::InvalidDate(due_raw))?;
                return Ok(());
            }
        };
        self.apply(Action::CreateAssignment(AssignmentInput {
            title,
            course_id,
            due,
            description,
            tags,
        }))
    }
}
