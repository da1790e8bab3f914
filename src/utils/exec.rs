//! External command execution utilities.
//!
//! Every external tool (rasterizer, encoder, document query) is described by
//! a [`Cmd`] and executed through a [`Runner`]. Arguments are always passed as
//! a structured argv, never through a shell, so paths and colors coming from
//! the user cannot be interpreted as shell syntax.
//!
//! # Examples
//!
//! ```ignore
//! use crate::utils::exec::{Cmd, Runner, SystemRunner};
//!
//! let cmd = Cmd::new("convert").args(["-list", "format"]);
//! let output = SystemRunner.run(&cmd)?;
//! assert!(output.stdout.contains("WEBP"));
//! ```

use crate::debug;
use regex::Regex;
use std::{
    borrow::Cow,
    ffi::{OsStr, OsString},
    fmt,
    path::PathBuf,
    process::{Command, Output, Stdio},
    sync::OnceLock,
};
use thiserror::Error;

// ============================================================================
// Errors
// ============================================================================

/// Failure to start an external program at all.
///
/// A program that starts and exits nonzero is *not* an `ExecError`; callers
/// inspect [`CmdOutput::success`] and build their own stage error.
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("`{program}` was not found on PATH, please install it or configure its location")]
    NotFound {
        program: String,
        #[source]
        source: which::Error,
    },

    #[error("Failed to execute `{program}`")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

// ============================================================================
// Builder API
// ============================================================================

/// Command description for external process execution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cmd {
    program: OsString,
    args: Vec<OsString>,
    filter: Option<&'static FilterRule>,
}

impl Cmd {
    /// Create a new command builder.
    pub fn new<S: AsRef<OsStr>>(program: S) -> Self {
        Self {
            program: program.as_ref().to_owned(),
            ..Default::default()
        }
    }

    /// Add a single argument.
    pub fn arg<S: AsRef<OsStr>>(mut self, arg: S) -> Self {
        let arg = arg.as_ref();
        if !arg.is_empty() {
            self.args.push(arg.to_owned());
        }
        self
    }

    /// Add multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        for arg in args {
            let arg = arg.as_ref();
            if !arg.is_empty() {
                self.args.push(arg.to_owned());
            }
        }
        self
    }

    /// Set output filter for logging.
    pub fn filter(mut self, filter: &'static FilterRule) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Program name as given to [`Cmd::new`].
    #[cfg(test)]
    pub fn program(&self) -> &OsStr {
        &self.program
    }

    /// Arguments in the order they will be passed.
    #[cfg(test)]
    pub fn get_args(&self) -> &[OsString] {
        &self.args
    }

    /// Get the program name for error messages.
    pub fn program_name(&self) -> String {
        self.program.to_string_lossy().to_string()
    }

    fn filter_rule(&self) -> &'static FilterRule {
        self.filter.unwrap_or(&EMPTY_FILTER)
    }
}

impl fmt::Display for Cmd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.to_string_lossy())?;
        for arg in &self.args {
            let arg = arg.to_string_lossy();
            if arg.contains(char::is_whitespace) {
                write!(f, " \"{arg}\"")?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}

// ============================================================================
// Output
// ============================================================================

/// Captured result of a finished process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CmdOutput {
    /// Exit code, `None` if the process was terminated by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CmdOutput {
    /// Whether the process exited with code 0.
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Human-readable exit status (`exit code 1`, `terminated by signal`).
    pub fn status_label(&self) -> String {
        match self.code {
            Some(code) => format!("exit code {code}"),
            None => "terminated by signal".to_string(),
        }
    }

    /// Diagnostic text of a failed run: stderr, or stdout when stderr is empty.
    pub fn diagnostics(&self) -> String {
        let stderr = self.stderr.trim();
        if !stderr.is_empty() {
            return stderr.to_string();
        }
        self.stdout.trim().to_string()
    }

    fn from_output(output: Output) -> Self {
        Self {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }
}

// ============================================================================
// Runner
// ============================================================================

/// Executes a [`Cmd`] and blocks until it exits.
pub trait Runner {
    fn run(&self, cmd: &Cmd) -> Result<CmdOutput, ExecError>;
}

/// Runs commands as real child processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl SystemRunner {
    /// Resolve the program on PATH (absolute paths are checked as-is).
    fn resolve(cmd: &Cmd) -> Result<PathBuf, ExecError> {
        which::which(&cmd.program).map_err(|source| ExecError::NotFound {
            program: cmd.program_name(),
            source,
        })
    }
}

impl Runner for SystemRunner {
    fn run(&self, cmd: &Cmd) -> Result<CmdOutput, ExecError> {
        let name = cmd.program_name();
        let program = Self::resolve(cmd)?;
        debug!("exec"; "{}", cmd);

        let output = Command::new(&program)
            .args(&cmd.args)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| ExecError::Spawn {
                program: name.clone(),
                source,
            })?;

        let output = CmdOutput::from_output(output);
        if output.success() {
            cmd.filter_rule().log(&name, output.stderr.trim());
        }
        Ok(output)
    }
}

// ============================================================================
// Output Filtering
// ============================================================================

/// Filter rule for command output logging.
///
/// Used to reduce noise by skipping known warnings or progress messages.
#[derive(Debug, PartialEq, Eq)]
pub struct FilterRule {
    /// Prefixes to skip when logging output.
    pub skip_prefixes: &'static [&'static str],
}

impl FilterRule {
    /// Create a new filter rule.
    pub const fn new(skip_prefixes: &'static [&'static str]) -> Self {
        Self { skip_prefixes }
    }

    /// Check if a line should be skipped.
    fn should_skip(&self, line: &str) -> bool {
        line.is_empty() || self.skip_prefixes.iter().any(|p| line.starts_with(p))
    }

    /// Lines of `output` that pass the filter, ANSI codes removed.
    fn kept_lines(&self, output: &str) -> Vec<String> {
        output
            .lines()
            .map(|line| strip_ansi(line).trim().to_string())
            .filter(|line| !self.should_skip(line))
            .collect()
    }

    /// Log output lines that pass the filter (verbose only).
    pub fn log(&self, name: &str, output: &str) {
        let lines = self.kept_lines(output);
        if !lines.is_empty() {
            debug!(name; "{}", lines.join("\n"));
        }
    }
}

/// Empty filter (no skipping).
pub const EMPTY_FILTER: FilterRule = FilterRule::new(&[]);

/// Routine progress lines printed by Inkscape during a PNG export.
pub const INKSCAPE_FILTER: FilterRule = FilterRule::new(&[
    "Background RRGGBBAA:",
    "Area ",
    "Bitmap saved as:",
    "DPI:",
]);

// ============================================================================
// Helpers
// ============================================================================

/// Strip ANSI escape codes from string.
fn strip_ansi(s: &str) -> Cow<'_, str> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"\x1b\[[0-9;]*m").unwrap());
    re.replace_all(s, "")
}

// ============================================================================
// Tests
// ============================================================================
