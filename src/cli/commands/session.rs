//! Interactive transmutation panel driven by line intents on stdin.

use anyhow::Result;
use std::io::Write;
use std::str::FromStr;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::warn;

use crate::catalog::{MaterialCatalog, OUTPUT_SUGGESTIONS};
use crate::cli::commands::build_controller;
use crate::config::TransmuteConfig;
use crate::http::BackendHttpClient;
use crate::presentation::{render_catalog, Notice, PanelView};
use crate::transmutation::{
    AuditRefresh, Complexity, FeasibilityApi, ParseComplexityError, TransmutationDraft,
    TransmutationWorkflowController,
};

/// One user action. Rows are 1-based here and converted to positions on apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Add,
    Set { row: usize, text: String },
    Remove { row: usize },
    Output(String),
    Complexity(Complexity),
    Simulate,
    Commit,
    Show,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntentError {
    #[error("empty command")]
    Empty,
    #[error("unknown command '{0}' (type 'help')")]
    Unknown(String),
    #[error("'{0}' needs an argument")]
    MissingArgument(&'static str),
    #[error("'{0}' is not a row number (rows start at 1)")]
    InvalidRow(String),
    #[error(transparent)]
    Complexity(#[from] ParseComplexityError),
}

fn parse_row(raw: &str) -> Result<usize, IntentError> {
    match raw.parse::<usize>() {
        Ok(row) if row >= 1 => Ok(row),
        _ => Err(IntentError::InvalidRow(raw.to_string())),
    }
}

impl FromStr for Intent {
    type Err = IntentError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (command, rest) = match line.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };

        match command.to_lowercase().as_str() {
            "" => Err(IntentError::Empty),
            "add" => Ok(Intent::Add),
            "set" => {
                let (row, text) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
                if row.is_empty() {
                    return Err(IntentError::MissingArgument("set"));
                }
                Ok(Intent::Set {
                    row: parse_row(row)?,
                    text: text.trim_start().to_string(),
                })
            }
            "remove" | "rm" => {
                if rest.is_empty() {
                    return Err(IntentError::MissingArgument("remove"));
                }
                Ok(Intent::Remove { row: parse_row(rest)? })
            }
            "output" => Ok(Intent::Output(rest.to_string())),
            "complexity" => {
                if rest.is_empty() {
                    return Err(IntentError::MissingArgument("complexity"));
                }
                Ok(Intent::Complexity(rest.parse()?))
            }
            "simulate" => Ok(Intent::Simulate),
            "commit" | "transmute" => Ok(Intent::Commit),
            "show" => Ok(Intent::Show),
            "help" | "?" => Ok(Intent::Help),
            "quit" | "exit" => Ok(Intent::Quit),
            other => Err(IntentError::Unknown(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStep {
    /// Re-render the panel, after an optional notice
    Updated(Option<Notice>),
    Help,
    Quit,
}

/// Forward one intent to the controller
pub async fn apply<A, R>(controller: &TransmutationWorkflowController<A, R>, intent: Intent) -> SessionStep
where
    A: FeasibilityApi,
    R: AuditRefresh,
{
    match intent {
        Intent::Add => {
            controller.add_slot();
            SessionStep::Updated(None)
        }
        Intent::Set { row, text } => {
            let Some(index) = row.checked_sub(1) else {
                let err = IntentError::InvalidRow(row.to_string());
                return SessionStep::Updated(Some(Notice::Error(err.to_string())));
            };
            match controller.update_slot(index, text) {
                Ok(()) => SessionStep::Updated(None),
                Err(err) => SessionStep::Updated(Some(Notice::Error(err.user_message()))),
            }
        }
        Intent::Remove { row } => {
            if row.checked_sub(1).is_some_and(|index| controller.remove_slot(index)) {
                SessionStep::Updated(None)
            } else {
                SessionStep::Updated(Some(Notice::Error(format!("Row {} cannot be removed", row))))
            }
        }
        Intent::Output(text) => {
            controller.set_output(text);
            SessionStep::Updated(None)
        }
        Intent::Complexity(complexity) => {
            controller.set_complexity(complexity);
            SessionStep::Updated(None)
        }
        Intent::Simulate => {
            let outcome = controller.simulate().await;
            SessionStep::Updated(Some(Notice::from_simulation(&outcome)))
        }
        Intent::Commit => {
            let outcome = controller.commit().await;
            SessionStep::Updated(Some(Notice::from_commit(&outcome)))
        }
        Intent::Show => SessionStep::Updated(None),
        Intent::Help => SessionStep::Help,
        Intent::Quit => SessionStep::Quit,
    }
}

/// Command reference, followed by the known material names for completion
pub fn help_text(suggestions: &[String]) -> String {
    let mut out = String::from("Commands:\n");
    out.push_str("  add                      add an input row\n");
    out.push_str("  set <row> <material>     fill an input row\n");
    out.push_str("  remove <row>             remove an input row\n");
    out.push_str("  output <material>        set the material to create\n");
    out.push_str("  complexity <level>       simple, moderate or complex\n");
    out.push_str("  simulate                 check feasibility\n");
    out.push_str("  commit                   perform the simulated transmutation\n");
    out.push_str("  show                     redraw the panel\n");
    out.push_str("  quit                     leave the session\n");
    if !suggestions.is_empty() {
        out.push_str(&format!("📦 Known materials: {}\n", suggestions.join(", ")));
    }
    out.push_str(&format!("🎯 Output ideas: {}", OUTPUT_SUGGESTIONS.join(", ")));
    out
}

pub struct SessionCommand;

impl SessionCommand {
    pub fn new() -> Self {
        Self
    }

    pub async fn execute(&self, config: &TransmuteConfig) -> Result<()> {
        let http = BackendHttpClient::from_config(config)?;
        let catalog = MaterialCatalog::from_config(http, config);
        let suggestions = match catalog.preview().await {
            Ok(preview) => {
                println!("{}", render_catalog(&preview));
                catalog.suggestions().await.unwrap_or_default()
            }
            Err(e) => {
                warn!(error = %e, "Materials catalog unavailable");
                Vec::new()
            }
        };

        let controller = build_controller(config, TransmutationDraft::new(), None)?;
        println!("🔮 \"To obtain, something of equal value must be lost.\"");
        println!("{}", PanelView::from_snapshot(&controller.snapshot()));
        println!("💡 Type 'help' for commands");

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            print!("amestris> ");
            std::io::stdout().flush()?;

            let Some(line) = lines.next_line().await? else {
                break;
            };
            let intent = match line.parse::<Intent>() {
                Ok(intent) => intent,
                Err(IntentError::Empty) => continue,
                Err(e) => {
                    println!("{}", Notice::Error(e.to_string()));
                    continue;
                }
            };

            match apply(&controller, intent).await {
                SessionStep::Updated(notice) => {
                    if let Some(notice) = notice {
                        println!("{}", notice);
                    }
                    println!("{}", PanelView::from_snapshot(&controller.snapshot()));
                }
                SessionStep::Help => println!("{}", help_text(&suggestions)),
                SessionStep::Quit => break,
            }
        }

        println!("👋 Session closed");
        Ok(())
    }
}

impl Default for SessionCommand {
    fn default() -> Self {
        Self::new()
    }
}
