//! Test doubles for external tools.

use super::exec::{Cmd, CmdOutput, ExecError, Runner};
use std::cell::RefCell;

type Script = Box<dyn Fn(&Cmd) -> CmdOutput>;

/// Runner that records every command and answers from a script instead of
/// spawning processes.
pub struct ScriptedRunner {
    script: Script,
    calls: RefCell<Vec<Cmd>>,
}

impl ScriptedRunner {
    pub fn new(script: impl Fn(&Cmd) -> CmdOutput + 'static) -> Self {
        Self {
            script: Box::new(script),
            calls: RefCell::new(Vec::new()),
        }
    }

    /// Every command succeeds with empty output.
    pub fn succeeding() -> Self {
        Self::new(|_| ok(""))
    }

    /// Commands recorded so far, in call order.
    pub fn calls(&self) -> Vec<Cmd> {
        self.calls.borrow().clone()
    }

    /// Program names of recorded commands, in call order.
    pub fn programs(&self) -> Vec<String> {
        self.calls.borrow().iter().map(Cmd::program_name).collect()
    }

    /// Arguments of the `index`-th call as strings.
    pub fn args_of(&self, index: usize) -> Vec<String> {
        self.calls.borrow()[index]
            .get_args()
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }
}

impl Runner for ScriptedRunner {
    fn run(&self, cmd: &Cmd) -> Result<CmdOutput, ExecError> {
        self.calls.borrow_mut().push(cmd.clone());
        Ok((self.script)(cmd))
    }
}

/// Successful output with the given stdout.
pub fn ok(stdout: &str) -> CmdOutput {
    CmdOutput {
        code: Some(0),
        stdout: stdout.to_string(),
        stderr: String::new(),
    }
}

/// Failed output with the given exit code and stderr.
pub fn failed(code: i32, stderr: &str) -> CmdOutput {
    CmdOutput {
        code: Some(code),
        stdout: String::new(),
        stderr: stderr.to_string(),
    }
}
