//! Mock implementations of service traits for testing

use super::traits::CommandRunner;
use crate::core::BalerResult;
use baler_core::process::{Invocation, RunStatus};
use std::sync::{Arc, Mutex};

type Hook = Arc<dyn Fn(&Invocation) + Send + Sync>;

/// Mock command runner for testing
///
/// Records every invocation and succeeds unless told otherwise. Rules match
/// on a substring of the invocation's display form (`program arg1 arg2 ...`).
///
/// # Example
///
/// ```
/// use baler::di::mocks::MockCommandRunner;
/// use baler::di::CommandRunner;
/// use baler_core::process::Invocation;
///
/// let runner = MockCommandRunner::new();
/// runner.fail_when("bundle package", 7);
///
/// let status = runner.run(&Invocation::new("bundle").arg("package")).unwrap();
/// assert_eq!(status.code, Some(7));
/// assert_eq!(runner.commands(), vec!["bundle package"]);
/// ```
#[derive(Clone, Default)]
pub struct MockCommandRunner {
    calls: Arc<Mutex<Vec<Invocation>>>,
    failures: Arc<Mutex<Vec<(String, i32)>>>,
    unstartable: Arc<Mutex<Vec<String>>>,
    hooks: Arc<Mutex<Vec<(String, Hook)>>>,
}

impl MockCommandRunner {
    /// Create a runner where every command succeeds
    pub fn new() -> Self {
        Self::default()
    }

    /// Exit with `code` for invocations containing `needle`
    pub fn fail_when(&self, needle: &str, code: i32) {
        self.failures
            .lock()
            .unwrap()
            .push((needle.to_string(), code));
    }

    /// Fail to start invocations containing `needle`
    pub fn unstartable(&self, needle: &str) {
        self.unstartable.lock().unwrap().push(needle.to_string());
    }

    /// Run `hook` whenever an invocation containing `needle` is started
    pub fn on<F>(&self, needle: &str, hook: F)
    where
        F: Fn(&Invocation) + Send + Sync + 'static,
    {
        self.hooks
            .lock()
            .unwrap()
            .push((needle.to_string(), Arc::new(hook)));
    }

    /// All invocations, in order
    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().unwrap().clone()
    }

    /// Display form of all invocations, in order
    pub fn commands(&self) -> Vec<String> {
        self.calls().iter().map(|c| c.to_string()).collect()
    }

    /// Index of the first invocation containing `needle`
    pub fn position(&self, needle: &str) -> Option<usize> {
        self.calls().iter().position(|c| c.matches(needle))
    }
}

impl CommandRunner for MockCommandRunner {
    fn run(&self, invocation: &Invocation) -> BalerResult<RunStatus> {
        self.calls.lock().unwrap().push(invocation.clone());

        if self
            .unstartable
            .lock()
            .unwrap()
            .iter()
            .any(|needle| invocation.matches(needle))
        {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{}: command not found", invocation.program.display()),
            )
            .into());
        }

        let hooks: Vec<Hook> = self
            .hooks
            .lock()
            .unwrap()
            .iter()
            .filter(|(needle, _)| invocation.matches(needle))
            .map(|(_, hook)| hook.clone())
            .collect();
        for hook in hooks {
            hook(invocation);
        }

        let code = self
            .failures
            .lock()
            .unwrap()
            .iter()
            .find(|(needle, _)| invocation.matches(needle))
            .map(|(_, code)| *code)
            .unwrap_or(0);

        Ok(RunStatus::from_code(code))
    }
}
