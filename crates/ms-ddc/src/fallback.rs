//! Ordered "try A, else B, else C" source lists.
//!
//! Distribution detection, macOS/Windows version detection and monitor
//! detection backends all share the same shape: candidates are attempted in
//! order and the first success wins; later candidates never run.

use crate::error::{DdcError, Result};
use log::debug;

type Producer<'a, T> = Box<dyn FnOnce() -> Result<T> + 'a>;

/// An ordered list of named candidate producers.
pub struct Chain<'a, T> {
    what: &'static str,
    candidates: Vec<(&'static str, Producer<'a, T>)>,
}

impl<'a, T> Chain<'a, T> {
    /// Start an empty chain; `what` names the value for log lines.
    pub fn new(what: &'static str) -> Self {
        Chain {
            what,
            candidates: Vec::new(),
        }
    }

    /// Append a candidate.
    pub fn then<F>(mut self, name: &'static str, producer: F) -> Self
    where
        F: FnOnce() -> Result<T> + 'a,
    {
        self.candidates.push((name, Box::new(producer)));
        self
    }

    /// Run candidates in order until one succeeds.
    ///
    /// Returns [`DdcError::Exhausted`] listing every failure when none does.
    pub fn run(self) -> Result<T> {
        let mut failures = Vec::with_capacity(self.candidates.len());
        for (name, producer) in self.candidates {
            match producer() {
                Ok(value) => {
                    debug!("{}: using {}", self.what, name);
                    return Ok(value);
                }
                Err(e) => {
                    debug!("{}: {} failed: {}", self.what, name, e);
                    failures.push(format!("{}: {}", name, e));
                }
            }
        }
        Err(DdcError::Exhausted(failures))
    }
}

#[cfg(test)]
#[path = "tests/fallback_tests.rs"]
mod tests;
