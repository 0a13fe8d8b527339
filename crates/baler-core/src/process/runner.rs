use crate::core::BalerResult;
use crate::process::{CommandRunner, Invocation, RunStatus};
use std::process::Command;

/// Runs invocations as real child processes.
///
/// Standard streams are inherited so tool progress reaches the operator.
/// No timeout is applied; a hung tool hangs the caller.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl SystemRunner {
    fn command(invocation: &Invocation) -> Command {
        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args);

        if let Some(cwd) = &invocation.cwd {
            cmd.current_dir(cwd);
        }

        for key in &invocation.env_remove {
            cmd.env_remove(key);
        }

        for (key, value) in &invocation.env {
            cmd.env(key, value);
        }

        cmd
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, invocation: &Invocation) -> BalerResult<RunStatus> {
        tracing::debug!(command = %invocation, cwd = ?invocation.cwd, "running");
        let status = Self::command(invocation).status()?;
        Ok(status.into())
    }
}
