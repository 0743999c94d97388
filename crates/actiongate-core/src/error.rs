use crate::action::Identity;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ActionError {
    #[error("config error: {0}")]
    ConfigLoad(String),

    #[error("duplicate action identities: {}", format_identities(.0))]
    DuplicateIdentity(Vec<Identity>),

    #[error("Process {0} not found.")]
    ProcessNotFound(String),

    #[error("process table error: {0}")]
    ProcessTable(String),

    #[error("failed to spawn '{program}': {reason}")]
    Spawn { program: String, reason: String },

    /// Non-zero exit. Carries the captured output, which is surfaced verbatim.
    #[error("{0}")]
    CommandFailed(String),

    #[error("command timed out after {0}s")]
    CommandTimedOut(u64),

    /// A query value the platform shell cannot carry as one literal word.
    #[error("argument cannot be passed to the shell: {0:?}")]
    UnquotableArgument(String),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, ActionError>;

fn format_identities(ids: &[Identity]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
