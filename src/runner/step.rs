//! Step execution
//!
//! One table row becomes one executed [`Command`]: the row is normalized,
//! handled locally or dispatched through the [`CommandTarget`] seam, and
//! the outcome is classified. The expectation toggle is threaded through
//! the call explicitly: prior state in, next state out.

use std::time::Duration;

use async_trait::async_trait;

use crate::common::Result;
use crate::document::{collapse_text, Row};

use super::normalize::{normalize, Normalized};

/// Result text of a successful step
pub const OK: &str = "OK";

/// Result text when an armed command succeeded instead of failing
pub const ERROR_EXPECTED: &str = "ERROR: Error expected";

/// Result text when a pause was interrupted before its deadline
pub const PAUSE_INTERRUPTED: &str = "ERROR: pause interrupted";

/// One executed test step with its recorded outcome
#[derive(Debug, Clone)]
pub struct Command {
    pub name: String,
    /// `None` for comment rows, which carry no argument cells
    pub args: Option<Vec<String>>,
    pub result: String,
    /// The step failed; `verify*` steps carry this without aborting the test
    pub error: bool,
    /// Hard failure: the remaining steps of the test are not executed
    pub failure: bool,
}

impl Command {
    fn passed(name: String, args: Option<Vec<String>>, result: String) -> Self {
        Self {
            name,
            args,
            result,
            error: false,
            failure: false,
        }
    }
}

/// Remote dispatch seam between the step executor and the session
///
/// The production implementation is [`crate::rc::Session`]; tests swap in
/// scripted fakes.
#[async_trait]
pub trait CommandTarget {
    /// Run one canonical command, returning the server's result text or a
    /// protocol-level error carrying a message
    async fn dispatch(&mut self, name: &str, args: &[String]) -> Result<String>;
}

/// Execute one table row against `target`
///
/// `armed` is the expectation-toggle state left behind by the previous
/// step; the returned flag is the state for the next one. Arming survives
/// local pseudo-commands and comment rows, and is consumed by the next
/// dispatched command in either outcome.
pub async fn execute<T>(target: &mut T, row: &Row, armed: bool) -> (Command, bool)
where
    T: CommandTarget + ?Sized,
{
    let Some(first) = row.cells.first() else {
        // The document layer drops cell-less rows; treat one as a comment
        return (Command::passed(String::new(), None, OK.to_string()), armed);
    };
    let name = first.text.trim().to_string();

    // A row with a lone cell is a comment
    if row.cells.len() == 1 {
        return (Command::passed(name, None, OK.to_string()), armed);
    }

    let args: Vec<String> = row.cells[1..]
        .iter()
        .map(|cell| collapse_text(&cell.text))
        .collect();

    match normalize(&name, args.clone()) {
        Normalized::Dispatch {
            name: wire_name,
            args: wire_args,
        } => {
            tracing::info!("{} {:?}", wire_name, wire_args);
            let (result, error) = match target.dispatch(&wire_name, &wire_args).await {
                Ok(body) => {
                    if armed {
                        (ERROR_EXPECTED.to_string(), true)
                    } else {
                        (body, false)
                    }
                }
                Err(e) => {
                    if armed {
                        (OK.to_string(), false)
                    } else {
                        (e.to_string(), true)
                    }
                }
            };
            let failure = error && !name.starts_with("verify");
            (
                Command {
                    name,
                    args: Some(args),
                    result,
                    error,
                    failure,
                },
                false,
            )
        }
        Normalized::ExpectFailure => {
            tracing::info!("{} {:?}", name, args);
            (Command::passed(name, Some(args), OK.to_string()), true)
        }
        Normalized::Echo { text } => {
            tracing::info!("{} {:?}", name, args);
            (
                Command::passed(name, Some(args), format!("OK,{text}")),
                armed,
            )
        }
        Normalized::Pause { millis } => {
            tracing::info!("{} {:?}", name, args);
            let (result, error) = pause(&millis).await;
            (
                Command {
                    name,
                    args: Some(args),
                    result,
                    error,
                    failure: error,
                },
                armed,
            )
        }
    }
}

/// Blocking sleep off the async executor
///
/// A non-numeric duration is a command error. An interrupted sleep yields
/// [`PAUSE_INTERRUPTED`] as plain result text, matching how the wire
/// reports it: the row shows failed but the test verdict is untouched.
async fn pause(millis: &str) -> (String, bool) {
    let ms: u64 = match millis.parse() {
        Ok(ms) => ms,
        Err(e) => {
            return (
                format!("ERROR: invalid pause duration '{millis}': {e}"),
                true,
            )
        }
    };
    let sleep = tokio::task::spawn_blocking(move || {
        std::thread::sleep(Duration::from_millis(ms));
    });
    match sleep.await {
        Ok(()) => (OK.to_string(), false),
        Err(_) => (PAUSE_INTERRUPTED.to_string(), false),
    }
}
