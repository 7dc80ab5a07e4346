//! Result archiving
//!
//! Turns a terminal RunOutcome into a Markdown artifact named after the
//! wall-clock second it was written in.

mod archiver;
mod clock;
mod render;

pub use archiver::{
    ACTION_NAMES_LABEL, ERRORS_LABEL, MODEL_ACTIONS_LABEL, ResultArchiver, SEPARATOR, URLS_LABEL, artifact_name,
};
pub use clock::{Clock, FixedClock, SystemClock};
pub use render::{render_sequence, render_value};
