use crate::error::{ActionError, Result};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// ActionKind
// ---------------------------------------------------------------------------

/// The `type` of a declared action.
///
/// Unrecognized type strings are kept as `Other` so they survive expansion and
/// can be reported when the route table is built.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActionKind {
    OpenFile,
    KillProcess,
    RunCommand,
    /// Composite: expands into `OpenFile` + `KillProcess`.
    HandleProgram,
    Other(String),
}

impl ActionKind {
    pub fn as_str(&self) -> &str {
        match self {
            ActionKind::OpenFile => "openfile",
            ActionKind::KillProcess => "killprocess",
            ActionKind::RunCommand => "runcommand",
            ActionKind::HandleProgram => "handleprogram",
            ActionKind::Other(s) => s,
        }
    }

    pub fn is_composite(&self) -> bool {
        matches!(self, ActionKind::HandleProgram)
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for ActionKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "openfile" => ActionKind::OpenFile,
            "killprocess" => ActionKind::KillProcess,
            "runcommand" => ActionKind::RunCommand,
            "handleprogram" => ActionKind::HandleProgram,
            _ => ActionKind::Other(s),
        }
    }
}

impl From<ActionKind> for String {
    fn from(kind: ActionKind) -> Self {
        kind.as_str().to_string()
    }
}

// ---------------------------------------------------------------------------
// Action
// ---------------------------------------------------------------------------

/// One entry of the `items` list, exactly as declared.
///
/// Type-specific fields are optional here; whether the ones a kind needs are
/// present is decided by [`Action::bind`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    #[serde(rename = "type")]
    pub kind: ActionKind,
    #[serde(deserialize_with = "scalar_string")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, deserialize_with = "scalar_or_empty")]
    pub args: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub process_name: Option<String>,
}

impl Action {
    pub fn identity(&self) -> Identity {
        Identity::new(self.kind.clone(), self.id.clone())
    }

    /// Resolve this action into the parameters its handler is bound with.
    pub fn bind(&self) -> std::result::Result<BoundAction, Unroutable> {
        if !is_path_segment(&self.id) {
            return Err(Unroutable::InvalidId(self.id.clone()));
        }
        match &self.kind {
            ActionKind::OpenFile => Ok(BoundAction::OpenFile {
                path: required(&self.path, "path")?,
                default_args: self.args.clone(),
            }),
            ActionKind::KillProcess => Ok(BoundAction::KillProcess {
                process_name: required(&self.process_name, "process_name")?,
            }),
            ActionKind::RunCommand => Ok(BoundAction::RunCommand {
                command: required(&self.command, "command")?,
                default_args: self.args.clone(),
            }),
            ActionKind::HandleProgram => Err(Unroutable::Composite),
            ActionKind::Other(name) => Err(Unroutable::UnknownType(name.clone())),
        }
    }
}

fn required(field: &Option<String>, name: &'static str) -> std::result::Result<String, Unroutable> {
    match field {
        Some(v) if !v.trim().is_empty() => Ok(v.clone()),
        _ => Err(Unroutable::MissingField(name)),
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl From<Scalar> for String {
    fn from(s: Scalar) -> Self {
        match s {
            Scalar::Str(s) => s,
            Scalar::Int(i) => i.to_string(),
            Scalar::Float(f) => f.to_string(),
            Scalar::Bool(b) => b.to_string(),
        }
    }
}

/// YAML happily types `id: 1` as an integer; identities are always strings.
fn scalar_string<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<String, D::Error> {
    Scalar::deserialize(d).map(String::from)
}

fn scalar_or_empty<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<String, D::Error> {
    Ok(Option::<Scalar>::deserialize(d)?
        .map(String::from)
        .unwrap_or_default())
}

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// `(type, id)`: unique across the expanded action list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Identity {
    pub kind: ActionKind,
    pub id: String,
}

impl Identity {
    pub fn new(kind: ActionKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }

    /// URL path the action is served at.
    pub fn path(&self) -> String {
        format!("/{}/{}", self.kind, self.id)
    }

    /// Endpoint name; distinct for same-id actions of different kinds.
    pub fn endpoint(&self) -> String {
        format!("{}_{}", self.kind, self.id)
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.id)
    }
}

// ---------------------------------------------------------------------------
// BoundAction / Unroutable
// ---------------------------------------------------------------------------

/// Parameters a primitive action's handler is bound with at registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoundAction {
    OpenFile { path: String, default_args: String },
    KillProcess { process_name: String },
    RunCommand { command: String, default_args: String },
}

impl BoundAction {
    pub fn kind(&self) -> ActionKind {
        match self {
            BoundAction::OpenFile { .. } => ActionKind::OpenFile,
            BoundAction::KillProcess { .. } => ActionKind::KillProcess,
            BoundAction::RunCommand { .. } => ActionKind::RunCommand,
        }
    }

    /// Short human-readable summary for route listings.
    pub fn describe(&self) -> String {
        match self {
            BoundAction::OpenFile { path, default_args } => {
                format!("open {path} {default_args}").trim_end().to_string()
            }
            BoundAction::KillProcess { process_name } => format!("kill {process_name}"),
            BoundAction::RunCommand {
                command,
                default_args,
            } => format!("run {command} {default_args}").trim_end().to_string(),
        }
    }
}

/// Why an expanded action gets no route. Never fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unroutable {
    UnknownType(String),
    Composite,
    MissingField(&'static str),
    InvalidId(String),
}

impl fmt::Display for Unroutable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unroutable::UnknownType(t) => write!(f, "unknown type '{t}'"),
            Unroutable::Composite => f.write_str("composite action was not expanded"),
            Unroutable::MissingField(name) => write!(f, "missing required field '{name}'"),
            Unroutable::InvalidId(id) => write!(f, "id '{id}' is not a single URL path segment"),
        }
    }
}

static SEGMENT_RE: OnceLock<Regex> = OnceLock::new();

fn segment_re() -> &'static Regex {
    SEGMENT_RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9._~-]+$").unwrap())
}

fn is_path_segment(id: &str) -> bool {
    id != "." && id != ".." && segment_re().is_match(id)
}

// ---------------------------------------------------------------------------
// Expansion and validation
// ---------------------------------------------------------------------------

/// Rewrite composite actions into primitive ones, preserving order.
///
/// `handleprogram` X becomes `openfile` X (path, args) immediately followed by
/// `killprocess` X (process_name). Everything else passes through untouched.
pub fn expand(items: Vec<Action>) -> Vec<Action> {
    let mut expanded = Vec::with_capacity(items.len());
    for item in items {
        if !item.kind.is_composite() {
            expanded.push(item);
            continue;
        }
        expanded.push(Action {
            kind: ActionKind::OpenFile,
            id: item.id.clone(),
            path: item.path,
            args: item.args,
            command: None,
            process_name: None,
        });
        expanded.push(Action {
            kind: ActionKind::KillProcess,
            id: item.id,
            path: None,
            args: String::new(),
            command: None,
            process_name: item.process_name,
        });
    }
    expanded
}

/// Fail with every `(type, id)` pair that occurs more than once.
pub fn validate_identities(actions: &[Action]) -> Result<()> {
    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    let mut duplicates = Vec::new();
    for action in actions {
        let identity = action.identity();
        if !seen.insert(identity.clone()) && reported.insert(identity.clone()) {
            duplicates.push(identity);
        }
    }
    if duplicates.is_empty() {
        Ok(())
    } else {
        Err(ActionError::DuplicateIdentity(duplicates))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
