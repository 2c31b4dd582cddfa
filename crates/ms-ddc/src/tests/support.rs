//! Scripted stand-in for helper binaries.

use crate::error::{DdcError, Result};
use crate::runner::CommandRunner;
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

#[derive(Default)]
struct Script {
    tools: Vec<String>,
    /// Command line → queued outcomes; `None` is a failed run. The last
    /// queued outcome repeats.
    responses: HashMap<String, VecDeque<Option<String>>>,
    calls: Vec<String>,
}

/// Cheap to clone; clones share the same script and call log.
#[derive(Clone, Default)]
pub struct FakeRunner {
    script: Rc<RefCell<Script>>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `program` resolvable on the fake search path.
    pub fn with_tool(self, program: &str) -> Self {
        self.script.borrow_mut().tools.push(program.to_string());
        self
    }

    /// Queue a successful run of `line` (`"program arg arg"`).
    pub fn respond(self, line: &str, output: &str) -> Self {
        self.push(line, Some(output.to_string()));
        self
    }

    /// Queue a failed run of `line`.
    pub fn fail(self, line: &str) -> Self {
        self.push(line, None);
        self
    }

    fn push(&self, line: &str, outcome: Option<String>) {
        self.script
            .borrow_mut()
            .responses
            .entry(line.to_string())
            .or_default()
            .push_back(outcome);
    }

    /// Every command line run so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.script.borrow().calls.clone()
    }

    /// How many times `line` ran.
    pub fn count(&self, line: &str) -> usize {
        self.script.borrow().calls.iter().filter(|c| *c == line).count()
    }
}

impl CommandRunner for FakeRunner {
    fn output(&self, program: &str, args: &[String], _timeout: Duration) -> Result<String> {
        let line = std::iter::once(program.to_string())
            .chain(args.iter().cloned())
            .collect::<Vec<_>>()
            .join(" ");

        let mut script = self.script.borrow_mut();
        script.calls.push(line.clone());

        let outcome = match script.responses.get_mut(&line) {
            Some(queue) if queue.len() > 1 => queue.pop_front().flatten(),
            Some(queue) => queue.front().cloned().flatten(),
            None => None,
        };

        outcome.ok_or(DdcError::CommandFailed {
            program: program.to_string(),
            status: Some(1),
            stderr: format!("unscripted: {}", line),
        })
    }

    fn lookup(&self, program: &str) -> Option<PathBuf> {
        let script = self.script.borrow();
        script
            .tools
            .iter()
            .any(|t| t == program)
            .then(|| PathBuf::from("/usr/bin").join(program))
    }
}
