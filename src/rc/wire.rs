//! Wire encoding for the remote command protocol
//!
//! Requests are `application/x-www-form-urlencoded` bodies: the command
//! name under `cmd`, positional arguments numbered from `1`, and the
//! session id under `sessionId` once a session exists. Responses are
//! plain text; a body is successful iff it starts with `OK`.

use crate::common::{Error, Result};

/// Path of the command endpoint on the remote server
pub const DRIVER_PATH: &str = "/selenium-server/driver/";

/// Prefix marking a successful response body
pub const SUCCESS_PREFIX: &str = "OK";

/// Build the form parameters for one command
pub fn form_params(
    cmd: &str,
    args: &[String],
    session_id: Option<&str>,
) -> Vec<(String, String)> {
    let mut params = Vec::with_capacity(args.len() + 2);
    params.push(("cmd".to_string(), cmd.to_string()));
    for (i, arg) in args.iter().enumerate() {
        params.push(((i + 1).to_string(), arg.clone()));
    }
    if let Some(id) = session_id {
        params.push(("sessionId".to_string(), id.to_string()));
    }
    params
}

/// Whether a response body signals success
pub fn is_success(body: &str) -> bool {
    body.starts_with(SUCCESS_PREFIX)
}

/// Classify a response body: the full body on success, the body as a
/// command error otherwise
pub fn into_result(body: String) -> Result<String> {
    if is_success(&body) {
        Ok(body)
    } else {
        Err(Error::Command(body))
    }
}

/// Payload after the `OK,` marker, e.g. a freshly allocated session id
pub fn ok_payload(body: &str) -> Option<&str> {
    body.strip_prefix("OK,").map(str::trim)
}
