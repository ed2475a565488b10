//! Command normalization
//!
//! Table rows use author-facing command names; the wire protocol expects
//! canonical ones, and a handful of commands never reach the wire at all.
//! Rules are checked in order and the first match wins. Normalizing an
//! already-normalized command is a no-op: no rewritten name matches any
//! rule again.

/// Commands whose second argument selects an option by specifier
const SELECTED_COMMANDS: [&str; 2] = ["assertSelected", "verifySelected"];

/// Option specifier prefixes and the command suffix each one selects
const OPTION_SPECIFIERS: [(&str, &str); 4] = [
    ("index=", "Index"),
    ("id=", "Id"),
    ("label=", "Label"),
    ("value=", "Value"),
];

/// A command bound for the wire, or an action handled locally
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Normalized {
    /// Forward to the remote session
    Dispatch { name: String, args: Vec<String> },
    /// Arm the expectation toggle and report `OK` without dispatching
    ExpectFailure,
    /// Report `OK,<text>` without dispatching
    Echo { text: String },
    /// Sleep for the given number of milliseconds (still unparsed)
    Pause { millis: String },
}

/// Rewrite a raw (name, args) pair into its canonical form
pub fn normalize(name: &str, mut args: Vec<String>) -> Normalized {
    if name == "store" {
        return Normalized::Dispatch {
            name: "storeExpression".to_string(),
            args,
        };
    }

    if SELECTED_COMMANDS.contains(&name) {
        let mut suffix = "Label";
        if let Some(arg) = args.get_mut(1) {
            for (specifier, selected) in OPTION_SPECIFIERS {
                if let Some(stripped) = arg.strip_prefix(specifier) {
                    suffix = selected;
                    *arg = stripped.to_string();
                    break;
                }
            }
        }
        return Normalized::Dispatch {
            name: format!("{name}{suffix}"),
            args,
        };
    }

    if name.ends_with("ErrorOnNext") || name.ends_with("FailureOnNext") {
        return Normalized::ExpectFailure;
    }

    if name == "echo" {
        return Normalized::Echo {
            text: args.first().cloned().unwrap_or_default(),
        };
    }

    if name == "pause" {
        return Normalized::Pause {
            millis: args.first().cloned().unwrap_or_default(),
        };
    }

    Normalized::Dispatch {
        name: name.to_string(),
        args,
    }
}
