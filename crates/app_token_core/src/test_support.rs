//! In-memory collaborators for unit tests.

use std::collections::HashMap;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::command_runner::{CommandOutput, CommandRunner};
use crate::secret_store::SecretStore;

type Handler = dyn Fn(&str, &[&str]) -> io::Result<CommandOutput> + Send + Sync;

/// A command runner that answers from a closure and records every call.
pub(crate) struct FakeCommandRunner {
    handler: Box<Handler>,
    calls: Mutex<Vec<Vec<String>>>,
}

impl FakeCommandRunner {
    pub(crate) fn new(
        handler: impl Fn(&str, &[&str]) -> io::Result<CommandOutput> + Send + Sync + 'static,
    ) -> Self {
        Self {
            handler: Box::new(handler),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// A runner whose commands all succeed with empty output.
    pub(crate) fn succeeding() -> Self {
        Self::new(|_, _| Ok(succeeded("")))
    }

    /// Every call as `[program, args...]`, in call order.
    pub(crate) fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }
}

impl CommandRunner for FakeCommandRunner {
    fn run(&self, program: &str, args: &[&str]) -> io::Result<CommandOutput> {
        let mut call = vec![program.to_string()];
        call.extend(args.iter().map(|a| a.to_string()));
        self.calls.lock().unwrap().push(call);
        (self.handler)(program, args)
    }
}

pub(crate) fn succeeded(stdout: &str) -> CommandOutput {
    CommandOutput {
        success: true,
        exit_code: Some(0),
        stdout: stdout.to_string(),
        stderr: String::new(),
    }
}

pub(crate) fn failed(code: i32, stderr: &str) -> CommandOutput {
    CommandOutput {
        success: false,
        exit_code: Some(code),
        stdout: String::new(),
        stderr: stderr.to_string(),
    }
}

/// Secret store backed by a map that counts lookups.
#[derive(Default)]
pub(crate) struct FakeSecretStore {
    secrets: HashMap<String, String>,
    lookups: AtomicUsize,
}

impl FakeSecretStore {
    pub(crate) fn with(name: &str, value: &str) -> Self {
        Self {
            secrets: HashMap::from([(name.to_string(), value.to_string())]),
            lookups: AtomicUsize::new(0),
        }
    }

    pub(crate) fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

impl SecretStore for FakeSecretStore {
    fn get_secret(&self, name: &str) -> Option<String> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.secrets.get(name).cloned()
    }
}

/// Builds an in-memory environment.
pub(crate) fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
