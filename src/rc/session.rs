//! Browser session lifecycle over the remote command protocol
//!
//! One [`Session`] maps to one remote browser session: started with
//! `getNewBrowserSession`, driven by numbered-argument commands, released
//! with `testComplete`. Sessions are never shared between tests.

use async_trait::async_trait;

use crate::common::{Error, Result, RunConfig};
use crate::runner::step::CommandTarget;

use super::wire;

/// Handle to one remote browser session
pub struct Session {
    client: reqwest::Client,
    server_url: String,
    browser: String,
    base_url: String,
    session_id: Option<String>,
}

impl Session {
    /// Create an unstarted session bound to a server, browser and base URL
    pub fn new(config: &RunConfig, base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            server_url: config.server_url(),
            browser: config.browser.clone(),
            base_url: base_url.to_string(),
            session_id: None,
        }
    }

    /// Start the remote browser session
    pub async fn start(&mut self) -> Result<()> {
        if self.session_id.is_some() {
            return Err(Error::SessionAlreadyStarted);
        }
        let args = [self.browser.clone(), self.base_url.clone()];
        let body = self
            .raw_command("getNewBrowserSession", &args)
            .await
            .map_err(|e| Error::session_start(&self.server_url, e.to_string()))?;
        let id = wire::ok_payload(&body).ok_or_else(|| {
            Error::session_start(&self.server_url, format!("unexpected reply: {body}"))
        })?;
        self.session_id = Some(id.to_string());
        Ok(())
    }

    /// Release the remote browser session
    ///
    /// The session id is cleared even if the server call fails, so stop is
    /// attempted at most once per started session.
    pub async fn stop(&mut self) -> Result<()> {
        if self.session_id.is_none() {
            return Ok(());
        }
        let result = self.raw_command("testComplete", &[]).await;
        self.session_id = None;
        result.map(|_| ())
    }

    /// POST one command and return the raw response body
    async fn raw_command(&self, cmd: &str, args: &[String]) -> Result<String> {
        let params = wire::form_params(cmd, args, self.session_id.as_deref());
        tracing::debug!("RC >>> {} {:?}", cmd, args);
        let response = self
            .client
            .post(self.server_url.as_str())
            .form(&params)
            .send()
            .await?
            .error_for_status()?;
        let body = response.text().await?;
        tracing::debug!("RC <<< {}", body);
        Ok(body)
    }
}

#[async_trait]
impl CommandTarget for Session {
    async fn dispatch(&mut self, name: &str, args: &[String]) -> Result<String> {
        if self.session_id.is_none() {
            return Err(Error::SessionNotStarted);
        }
        let body = self
            .raw_command(name, args)
            .await
            .map_err(|e| Error::Command(e.to_string()))?;
        wire::into_result(body)
    }
}
