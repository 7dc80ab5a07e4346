//! Result archiver - writes a run outcome to a timestamped Markdown file.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use log::info;
use serde_json::Value;

use super::clock::{Clock, SystemClock};
use super::render::render_sequence;
use crate::domain::RunOutcome;
use crate::error::{AgentrunError, Result};

/// Line separating the body from the metadata trailer
pub const SEPARATOR: &str = "------------------";

pub const URLS_LABEL: &str = "List of visited URLs: ";
pub const ACTION_NAMES_LABEL: &str = "Names of executed actions: ";
pub const ERRORS_LABEL: &str = "Any errors that occurred: ";
pub const MODEL_ACTIONS_LABEL: &str = "All actions with their parameters: ";

/// File name for an artifact written at `now`: `YYYY-MM-DD(HH-MM-SS).md`
pub fn artifact_name(now: NaiveDateTime) -> String {
    now.format("%Y-%m-%d(%H-%M-%S).md").to_string()
}

/// The four trailer sequences, already rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Trailer {
    urls: String,
    action_names: String,
    errors: String,
    model_actions: String,
}

impl Trailer {
    fn from_outcome(outcome: &RunOutcome) -> Result<Self> {
        match outcome {
            RunOutcome::Completed(history) => Ok(Self {
                urls: render_sequence(&history.urls())?,
                action_names: render_sequence(&history.action_names())?,
                errors: render_sequence(&history.errors())?,
                model_actions: render_sequence(&history.model_actions())?,
            }),
            RunOutcome::Aborted(abort) => {
                let none: Vec<Value> = Vec::new();
                Ok(Self {
                    urls: render_sequence(&none)?,
                    action_names: render_sequence(&none)?,
                    errors: render_sequence(&[abort.error.message.clone()])?,
                    model_actions: render_sequence(&none)?,
                })
            }
        }
    }

    fn render(&self) -> String {
        format!(
            "\n\n\n{}\n{}{}\n{}{}\n{}{}\n{}{}",
            SEPARATOR,
            URLS_LABEL,
            self.urls,
            ACTION_NAMES_LABEL,
            self.action_names,
            ERRORS_LABEL,
            self.errors,
            MODEL_ACTIONS_LABEL,
            self.model_actions
        )
    }
}

/// Body text for an outcome.
fn primary_body(outcome: &RunOutcome) -> String {
    match outcome {
        RunOutcome::Completed(history) => history.primary_body(),
        RunOutcome::Aborted(abort) => format!(
            "Task aborted after {} attempt(s) ({}): {}",
            abort.attempts, abort.cause, abort.error
        ),
    }
}

/// Writes one artifact per terminal outcome into `base_dir`.
///
/// Two archives in the same second share a name; the later one overwrites.
pub struct ResultArchiver<C: Clock = SystemClock> {
    base_dir: PathBuf,
    clock: C,
}

impl ResultArchiver<SystemClock> {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self::with_clock(base_dir, SystemClock)
    }
}

impl<C: Clock> ResultArchiver<C> {
    pub fn with_clock(base_dir: impl Into<PathBuf>, clock: C) -> Self {
        Self {
            base_dir: base_dir.into(),
            clock,
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Write the outcome and return the artifact path.
    pub fn archive(&self, outcome: &RunOutcome) -> Result<PathBuf> {
        fs::create_dir_all(&self.base_dir).map_err(|e| AgentrunError::storage(&self.base_dir, e))?;

        let path = self.base_dir.join(artifact_name(self.clock.now()));
        let trailer = Trailer::from_outcome(outcome)?;

        fs::write(&path, primary_body(outcome)).map_err(|e| AgentrunError::storage(&path, e))?;

        let mut file = OpenOptions::new()
            .append(true)
            .open(&path)
            .map_err(|e| AgentrunError::storage(&path, e))?;
        file.write_all(trailer.render().as_bytes())
            .map_err(|e| AgentrunError::storage(&path, e))?;

        info!("Archived run outcome to {}", path.display());
        Ok(path)
    }
}
