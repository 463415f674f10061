//! ANSI color utilities for plan listings and run summaries.
//!
//! Color scheme follows the shape of a command line:
//! - Program prefix dimmed (it's the same on every line)
//! - Model type bold magenta (what changes slowest in the default shape)
//! - Populations cyan, test populations plain cyan, training bold
//! - Inference flags yellow
//! - Outcome badges: green ok, red failed, magenta not launched

use owo_colors::{OwoColorize, Style};

use crate::runner::Outcome;
use crate::types::InvocationRecord;

/// Badge for an invocation outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeBadge {
    Ok,
    Failed,
    NotLaunched,
}

impl OutcomeBadge {
    pub fn of(outcome: &Outcome) -> Self {
        match outcome {
            Outcome::Success => OutcomeBadge::Ok,
            Outcome::Failed { .. } => OutcomeBadge::Failed,
            Outcome::NotLaunched { .. } => OutcomeBadge::NotLaunched,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            OutcomeBadge::Ok => "ok",
            OutcomeBadge::Failed => "failed",
            OutcomeBadge::NotLaunched => "not-launched",
        }
    }

    pub fn style(&self) -> Style {
        match self {
            OutcomeBadge::Ok => Style::new().green(),
            OutcomeBadge::Failed => Style::new().bright_red().bold(),
            OutcomeBadge::NotLaunched => Style::new().bright_magenta(),
        }
    }
}

/// Applies styles when enabled, passes text through untouched otherwise.
#[derive(Debug, Clone, Copy)]
pub struct Colorizer {
    pub enabled: bool,
}

impl Colorizer {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    fn paint(&self, s: &str, style: Style) -> String {
        if self.enabled {
            s.style(style).to_string()
        } else {
            s.to_string()
        }
    }

    pub fn header(&self, s: &str) -> String {
        self.paint(s, Style::new().bright_blue().bold())
    }

    pub fn model(&self, s: &str) -> String {
        self.paint(s, Style::new().magenta().bold())
    }

    pub fn train_pop(&self, s: &str) -> String {
        self.paint(s, Style::new().cyan().bold())
    }

    pub fn test_pop(&self, s: &str) -> String {
        self.paint(s, Style::new().cyan())
    }

    pub fn flag(&self, s: &str) -> String {
        self.paint(s, Style::new().yellow())
    }

    pub fn dim(&self, s: &str) -> String {
        self.paint(s, Style::new().dimmed())
    }

    pub fn badge(&self, badge: OutcomeBadge) -> String {
        format!("[{}]", self.paint(badge.label(), badge.style()))
    }

    /// One invocation as a command line, argument values colored by role.
    pub fn command(&self, program: &[String], record: &InvocationRecord) -> String {
        let mut parts = vec![self.dim(&program.join(" "))];
        parts.push(format!("--model_type {}", self.model(record.model_type.as_str())));
        parts.push(format!("--train_pop {}", self.train_pop(record.train_pop.as_str())));
        parts.push(format!("--test_pop_1 {}", self.test_pop(record.test_pop_1.as_str())));
        parts.push(format!("--test_pop_2 {}", self.test_pop(record.test_pop_2.as_str())));
        parts.extend(record.modes.flags().map(|f| self.flag(&f)));
        parts.join(" ")
    }
}
