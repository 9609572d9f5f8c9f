// crates/schoolsphere-e2e/src/webdriver.rs
// ============================================================================
// Module: WebDriver Session
// Description: W3C WebDriver client implementing the browser page contract.
// Purpose: Drive Chrome or Firefox through chromedriver or geckodriver.
// Dependencies: crate::{browser, locator}, base64, reqwest, serde, serde_json, tracing
// ============================================================================

//! ## Overview
//! [`WebDriverSession::start`] opens a session against a WebDriver server
//! and every [`BrowserPage`] call maps to one protocol command. Driver
//! errors are decoded from the `{"value": {"error", "message"}}` envelope;
//! `stale element reference` becomes [`BrowserError::StaleElement`].
//!
//! The session is deleted by [`WebDriverSession::close`] or, failing that,
//! when the value is dropped, so the browser is released on every path.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Read;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::Method;
use reqwest::Url;
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use reqwest::redirect::Policy;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use serde_json::json;
use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::browser::BrowserError;
use crate::browser::BrowserPage;
use crate::browser::ElementHandle;
use crate::locator::Selector;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// W3C web element identifier key.
pub const ELEMENT_KEY: &str = "element-6066-11e4-a52f-4ab8bbd4b5ae";

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Browser launched by the WebDriver server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Browser {
    /// Google Chrome via chromedriver.
    #[default]
    Chrome,
    /// Mozilla Firefox via geckodriver.
    Firefox,
}

impl Browser {
    /// Returns the WebDriver `browserName`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Chrome => "chrome",
            Self::Firefox => "firefox",
        }
    }
}

/// WebDriver connection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebDriverConfig {
    /// WebDriver server URL, e.g. `http://localhost:9515`.
    pub webdriver_url: String,
    /// Browser to launch.
    pub browser: Browser,
    /// Runs the browser without a window.
    pub headless: bool,
    /// Viewport width and height in pixels.
    pub window_size: (u32, u32),
    /// Per-command HTTP timeout.
    pub request_timeout: Duration,
    /// Maximum accepted response body size in bytes.
    pub max_response_bytes: usize,
}

impl WebDriverConfig {
    /// Creates a headless Chrome configuration.
    #[must_use]
    pub fn new(webdriver_url: impl Into<String>) -> Self {
        Self {
            webdriver_url: webdriver_url.into(),
            browser: Browser::Chrome,
            headless: true,
            window_size: (1280, 800),
            request_timeout: Duration::from_secs(60),
            max_response_bytes: 32 * 1024 * 1024,
        }
    }

    /// Builds the `POST /session` capabilities payload.
    #[must_use]
    pub fn capabilities(&self) -> Value {
        let (width, height) = self.window_size;
        match self.browser {
            Browser::Chrome => {
                let mut args = vec![format!("--window-size={width},{height}")];
                if self.headless {
                    args.insert(0, "--headless=new".to_string());
                }
                json!({"capabilities": {"alwaysMatch": {
                    "browserName": self.browser.as_str(),
                    "goog:chromeOptions": {"args": args}
                }}})
            }
            Browser::Firefox => {
                let mut args = vec![format!("--width={width}"), format!("--height={height}")];
                if self.headless {
                    args.insert(0, "-headless".to_string());
                }
                json!({"capabilities": {"alwaysMatch": {
                    "browserName": self.browser.as_str(),
                    "moz:firefoxOptions": {"args": args}
                }}})
            }
        }
    }
}

// ============================================================================
// SECTION: Session
// ============================================================================

/// An open WebDriver session.
#[derive(Debug)]
pub struct WebDriverSession {
    /// HTTP client used for commands.
    client: Client,
    /// WebDriver server URL.
    base: Url,
    /// Session identifier assigned by the server.
    session_id: String,
    /// Maximum accepted response body size.
    max_response_bytes: usize,
    /// Set once the session has been deleted.
    closed: bool,
}

#[derive(Deserialize)]
struct NewSession {
    #[serde(rename = "sessionId")]
    session_id: String,
}

impl WebDriverSession {
    /// Opens a new browser session.
    ///
    /// # Errors
    ///
    /// Returns [`BrowserError::Unavailable`] when the server is unreachable
    /// and [`BrowserError::SessionNotCreated`] when it refuses the session.
    pub fn start(config: &WebDriverConfig) -> Result<Self, BrowserError> {
        let base = Url::parse(config.webdriver_url.trim_end_matches('/'))
            .map_err(|err| BrowserError::Unavailable(format!("invalid webdriver url: {err}")))?;
        if base.cannot_be_a_base() {
            return Err(BrowserError::Unavailable("webdriver url cannot be a base url".to_string()));
        }
        let client = Client::builder()
            .timeout(config.request_timeout)
            .redirect(Policy::none())
            .build()
            .map_err(|err| BrowserError::Unavailable(format!("http client build failed: {err}")))?;
        let mut session = Self {
            client,
            base,
            session_id: String::new(),
            max_response_bytes: config.max_response_bytes,
            closed: true,
        };
        let value = session
            .send(Method::POST, session.endpoint(&["session"]), Some(&config.capabilities()))
            .map_err(|err| match err {
                BrowserError::Command {
                    message,
                    ..
                } => BrowserError::SessionNotCreated(message),
                other => other,
            })?;
        let created: NewSession = serde_json::from_value(value)
            .map_err(|err| BrowserError::InvalidResponse(format!("new session payload: {err}")))?;
        session.session_id = created.session_id;
        session.closed = false;
        info!(session_id = %session.session_id, browser = config.browser.as_str(), "webdriver session started");
        Ok(session)
    }

    /// Returns the server-assigned session identifier.
    #[must_use]
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Deletes the session; later calls are no-ops.
    ///
    /// # Errors
    ///
    /// Returns [`BrowserError`] when the server rejects the deletion.
    pub fn close(&mut self) -> Result<(), BrowserError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        let url = self.session_url(&[]);
        self.send(Method::DELETE, url, None).map(|_| ())?;
        info!(session_id = %self.session_id, "webdriver session closed");
        Ok(())
    }

    /// Builds `<server>/<segments...>`.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Builds `<server>/session/<id>/<segments...>`.
    fn session_url(&self, segments: &[&str]) -> Url {
        let mut all = vec!["session", self.session_id.as_str()];
        all.extend_from_slice(segments);
        self.endpoint(&all)
    }

    /// Runs a session command and returns its `value`.
    fn command(&self, method: Method, segments: &[&str], body: Option<&Value>) -> Result<Value, BrowserError> {
        self.send(method, self.session_url(segments), body)
    }

    /// Sends a request and unwraps the WebDriver `value` envelope.
    fn send(&self, method: Method, url: Url, body: Option<&Value>) -> Result<Value, BrowserError> {
        let mut request = self.client.request(method, url);
        if let Some(body) = body {
            let payload = serde_json::to_vec(body)
                .map_err(|err| BrowserError::InvalidResponse(format!("request encoding failed: {err}")))?;
            request = request.header(CONTENT_TYPE, "application/json").body(payload);
        }
        let response = request.send().map_err(|err| BrowserError::Unavailable(err.to_string()))?;
        let status = response.status().as_u16();
        let bytes = read_limited(response, self.max_response_bytes)?;
        debug!(status, bytes = bytes.len(), "webdriver response");
        let envelope: Value = serde_json::from_slice(&bytes)
            .map_err(|err| BrowserError::InvalidResponse(format!("malformed response body: {err}")))?;
        let value = envelope.get("value").cloned().unwrap_or(Value::Null);
        if (200 .. 300).contains(&status) {
            return Ok(value);
        }
        Err(classify_error(status, &value))
    }

    fn element_bool(&self, element: &ElementHandle, property: &str) -> Result<bool, BrowserError> {
        let value = self.command(Method::GET, &["element", element.as_str(), property], None)?;
        value
            .as_bool()
            .ok_or_else(|| BrowserError::InvalidResponse(format!("{property} must be a boolean")))
    }
}

impl BrowserPage for WebDriverSession {
    fn goto(&mut self, url: &str) -> Result<(), BrowserError> {
        self.command(Method::POST, &["url"], Some(&json!({"url": url}))).map(|_| ())
    }

    fn current_url(&mut self) -> Result<String, BrowserError> {
        let value = self.command(Method::GET, &["url"], None)?;
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| BrowserError::InvalidResponse("url must be a string".to_string()))
    }

    fn find_all(
        &mut self,
        selector: &Selector,
        scope: Option<&ElementHandle>,
    ) -> Result<Vec<ElementHandle>, BrowserError> {
        let body = json!({"using": selector.strategy(), "value": selector.value()});
        let value = match scope {
            Some(parent) => {
                self.command(Method::POST, &["element", parent.as_str(), "elements"], Some(&body))?
            }
            None => self.command(Method::POST, &["elements"], Some(&body))?,
        };
        let Value::Array(items) = value else {
            return Err(BrowserError::InvalidResponse("elements must be an array".to_string()));
        };
        items
            .iter()
            .map(|item| {
                item.get(ELEMENT_KEY)
                    .and_then(Value::as_str)
                    .map(ElementHandle::new)
                    .ok_or_else(|| BrowserError::InvalidResponse("element reference missing".to_string()))
            })
            .collect()
    }

    fn is_displayed(&mut self, element: &ElementHandle) -> Result<bool, BrowserError> {
        self.element_bool(element, "displayed")
    }

    fn is_enabled(&mut self, element: &ElementHandle) -> Result<bool, BrowserError> {
        self.element_bool(element, "enabled")
    }

    fn text(&mut self, element: &ElementHandle) -> Result<String, BrowserError> {
        let value = self.command(Method::GET, &["element", element.as_str(), "text"], None)?;
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| BrowserError::InvalidResponse("text must be a string".to_string()))
    }

    fn click(&mut self, element: &ElementHandle) -> Result<(), BrowserError> {
        self.command(Method::POST, &["element", element.as_str(), "click"], Some(&json!({}))).map(|_| ())
    }

    fn clear(&mut self, element: &ElementHandle) -> Result<(), BrowserError> {
        self.command(Method::POST, &["element", element.as_str(), "clear"], Some(&json!({}))).map(|_| ())
    }

    fn send_keys(&mut self, element: &ElementHandle, text: &str) -> Result<(), BrowserError> {
        let body = json!({"text": text});
        self.command(Method::POST, &["element", element.as_str(), "value"], Some(&body)).map(|_| ())
    }

    fn screenshot(&mut self) -> Result<Vec<u8>, BrowserError> {
        let value = self.command(Method::GET, &["screenshot"], None)?;
        let encoded = value
            .as_str()
            .ok_or_else(|| BrowserError::InvalidResponse("screenshot must be a string".to_string()))?;
        STANDARD
            .decode(encoded)
            .map_err(|err| BrowserError::InvalidResponse(format!("screenshot is not base64: {err}")))
    }
}

impl Drop for WebDriverSession {
    fn drop(&mut self) {
        if let Err(err) = self.close() {
            warn!(session_id = %self.session_id, error = %err, "webdriver session close failed");
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Maps a WebDriver error payload onto a [`BrowserError`].
fn classify_error(status: u16, value: &Value) -> BrowserError {
    let field = |name: &str| value.get(name).and_then(Value::as_str).unwrap_or_default().to_string();
    let error = field("error");
    let message = field("message");
    match error.as_str() {
        "stale element reference" => BrowserError::StaleElement(message),
        "session not created" => BrowserError::SessionNotCreated(message),
        "" => BrowserError::InvalidResponse(format!("status {status} without error payload")),
        _ => BrowserError::Command {
            error,
            message,
        },
    }
}

/// Reads a response body while enforcing a byte limit.
fn read_limited(response: reqwest::blocking::Response, max_bytes: usize) -> Result<Vec<u8>, BrowserError> {
    let max_bytes_u64 = u64::try_from(max_bytes).unwrap_or(u64::MAX);
    let mut buf = Vec::new();
    response
        .take(max_bytes_u64.saturating_add(1))
        .read_to_end(&mut buf)
        .map_err(|err| BrowserError::Unavailable(format!("failed to read response: {err}")))?;
    if buf.len() > max_bytes {
        return Err(BrowserError::InvalidResponse("response exceeds size limit".to_string()));
    }
    Ok(buf)
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, reason = "Test assertions.")]

    use super::*;

    #[test]
    fn chrome_capabilities_follow_headless_flag() {
        let mut config = WebDriverConfig::new("http://localhost:9515");
        let caps = config.capabilities();
        assert_eq!(
            caps["capabilities"]["alwaysMatch"]["goog:chromeOptions"]["args"],
            json!(["--headless=new", "--window-size=1280,800"])
        );
        config.headless = false;
        config.browser = Browser::Firefox;
        let caps = config.capabilities();
        assert_eq!(caps["capabilities"]["alwaysMatch"]["browserName"], "firefox");
        assert_eq!(
            caps["capabilities"]["alwaysMatch"]["moz:firefoxOptions"]["args"],
            json!(["--width=1280", "--height=800"])
        );
    }

    #[test]
    fn error_payloads_are_classified() {
        let stale = json!({"error": "stale element reference", "message": "gone"});
        assert_eq!(classify_error(404, &stale), BrowserError::StaleElement("gone".to_string()));
        let missing = json!({"error": "no such element", "message": "nope"});
        let err = classify_error(404, &missing);
        assert!(err.is_transient());
        assert!(matches!(classify_error(500, &Value::Null), BrowserError::InvalidResponse(_)));
    }
}
