//! OS primitives the action handlers depend on.
//!
//! Handlers only ever talk to the [`Host`] trait, so tests can substitute a
//! recording implementation and assert exactly which side effects happened.

use std::ffi::OsStr;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use actiongate_core::{ActionError, Result};
use async_trait::async_trait;
use sysinfo::{Process, ProcessRefreshKind, ProcessesToUpdate, Signal, System, UpdateKind};
use tokio::process::Command;

/// Result of a finished shell command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    pub code: Option<i32>,
    /// stdout followed by stderr, decoded lossily as UTF-8.
    pub output: String,
}

#[async_trait]
pub trait Host: Send + Sync {
    /// Launch `program` without waiting for it. Returns the child PID when known.
    async fn spawn_detached(&self, program: &str, args: &[String]) -> Result<Option<u32>>;

    /// Send a termination signal to the lowest-PID process named exactly `name`.
    /// Returns the PID that was signalled.
    async fn terminate_first(&self, name: &str) -> Result<u32>;

    /// Run `command_line` through the platform shell and wait for it, killing
    /// it if `timeout` elapses first.
    async fn run_shell(&self, command_line: &str, timeout: Duration) -> Result<CommandOutput>;
}

/// The real machine.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemHost;

#[async_trait]
impl Host for SystemHost {
    async fn spawn_detached(&self, program: &str, args: &[String]) -> Result<Option<u32>> {
        let spawn_err = |reason: String| ActionError::Spawn {
            program: program.to_string(),
            reason,
        };

        let resolved = match which::which(program) {
            Ok(p) => p,
            // Existing but not executable: hand it to the desktop's default
            // application, which cannot take arguments.
            Err(_) if Path::new(program).exists() => {
                if !args.is_empty() {
                    return Err(spawn_err(
                        "not executable; arguments cannot be passed to a document".into(),
                    ));
                }
                open::that_detached(program).map_err(|e| spawn_err(e.to_string()))?;
                return Ok(None);
            }
            Err(e) => return Err(spawn_err(e.to_string())),
        };

        // The child is dropped without being awaited; tokio reaps it in the
        // background once it exits.
        let child = Command::new(&resolved)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| spawn_err(e.to_string()))?;
        Ok(child.id())
    }

    async fn terminate_first(&self, name: &str) -> Result<u32> {
        let name = name.to_string();
        tokio::task::spawn_blocking(move || terminate_first_blocking(&name))
            .await
            .map_err(|e| ActionError::ProcessTable(format!("task join error: {e}")))?
    }

    async fn run_shell(&self, command_line: &str, timeout: Duration) -> Result<CommandOutput> {
        let mut cmd = shell_command(command_line);
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = match tokio::time::timeout(timeout, cmd.output()).await {
            Ok(res) => res.map_err(|e| ActionError::Spawn {
                program: SHELL.to_string(),
                reason: e.to_string(),
            })?,
            Err(_) => return Err(ActionError::CommandTimedOut(timeout.as_secs())),
        };

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));
        Ok(CommandOutput {
            success: output.status.success(),
            code: output.status.code(),
            output: text,
        })
    }
}

#[cfg(windows)]
const SHELL: &str = "cmd";

#[cfg(not(windows))]
const SHELL: &str = "sh";

/// `cmd` parses its own command line, so the text is appended untouched
/// instead of being re-quoted by the runtime. `/S` strips exactly the outer
/// pair of quotes.
#[cfg(windows)]
fn shell_command(command_line: &str) -> Command {
    let mut cmd = Command::new(SHELL);
    cmd.raw_arg(format!("/S /C \"{command_line}\""));
    cmd
}

#[cfg(not(windows))]
fn shell_command(command_line: &str) -> Command {
    let mut cmd = Command::new(SHELL);
    cmd.arg("-c").arg(command_line);
    cmd
}

/// Kernel process names are cut at 15 bytes on Linux.
const TRUNCATED_NAME_LEN: usize = 15;

fn name_matches(process: &Process, name: &str) -> bool {
    let wanted = OsStr::new(name);
    if process.name() == wanted {
        return true;
    }
    let short = process.name();
    let truncated = short.len() >= TRUNCATED_NAME_LEN
        && name.as_bytes().starts_with(short.as_encoded_bytes());
    if !truncated {
        return false;
    }
    let file_name_is = |p: &Path| p.file_name() == Some(wanted);
    process.exe().is_some_and(file_name_is)
        || process
            .cmd()
            .first()
            .is_some_and(|arg0| file_name_is(Path::new(arg0)))
}

fn terminate_first_blocking(name: &str) -> Result<u32> {
    if !sysinfo::IS_SUPPORTED_SYSTEM {
        return Err(ActionError::ProcessTable(
            "process listing is not supported on this platform".into(),
        ));
    }

    let mut sys = System::new();
    let refresh = ProcessRefreshKind::nothing()
        .with_exe(UpdateKind::OnlyIfNotSet)
        .with_cmd(UpdateKind::OnlyIfNotSet);
    sys.refresh_processes_specifics(ProcessesToUpdate::All, true, refresh);

    let mut matches: Vec<_> = sys
        .processes()
        .iter()
        .filter(|(_, p)| name_matches(p, name))
        .collect();
    matches.sort_by_key(|(pid, _)| pid.as_u32());

    let Some((pid, process)) = matches.first() else {
        return Err(ActionError::ProcessNotFound(name.to_string()));
    };
    let pid = pid.as_u32();

    // SIGTERM where the platform has it, plain kill otherwise.
    let sent = match process.kill_with(Signal::Term) {
        Some(sent) => sent,
        None => process.kill(),
    };
    if sent {
        Ok(pid)
    } else {
        Err(ActionError::ProcessTable(format!(
            "failed to terminate {name} (pid {pid})"
        )))
    }
}
