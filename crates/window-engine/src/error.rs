//! Error types for window-engine operations.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WindowError {
    #[error("Invalid window specification: {0}")]
    InvalidSpec(String),

    #[error("Invalid recurrence rule '{rule}': {reason}")]
    RuleParse { rule: String, reason: String },

    #[error("Recurrence rule '{rule}' has no occurrence after {after}")]
    RuleExhausted { rule: String, after: String },
}

pub type Result<T> = std::result::Result<T, WindowError>;
