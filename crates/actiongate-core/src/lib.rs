pub mod action;
pub mod args;
pub mod config;
pub mod error;

pub use action::{expand, validate_identities, Action, ActionKind, BoundAction, Identity};
pub use error::{ActionError, Result};
