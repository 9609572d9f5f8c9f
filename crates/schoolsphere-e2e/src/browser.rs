// crates/schoolsphere-e2e/src/browser.rs
// ============================================================================
// Module: Browser Page Interface
// Description: Minimal page-automation contract used by the scenario runner.
// Purpose: Decouple scenarios from the concrete browser driver.
// Dependencies: crate::locator, thiserror
// ============================================================================

//! ## Overview
//! [`BrowserPage`] exposes the handful of primitives scenarios need: load a
//! URL, find elements, inspect their state, act on them, and capture a
//! screenshot. Element handles are opaque and only valid for the page that
//! returned them; a handle whose element left the DOM yields
//! [`BrowserError::StaleElement`], which pollers treat as "not yet".

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::locator::Selector;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors reported by browser drivers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BrowserError {
    /// The driver could not be reached.
    #[error("browser driver unavailable: {0}")]
    Unavailable(String),
    /// The session could not be created.
    #[error("browser session not created: {0}")]
    SessionNotCreated(String),
    /// The element is no longer attached to the page.
    #[error("stale element reference: {0}")]
    StaleElement(String),
    /// The driver rejected a command.
    #[error("webdriver error {error}: {message}")]
    Command {
        /// WebDriver error code, e.g. `element not interactable`.
        error: String,
        /// Driver-provided message.
        message: String,
    },
    /// The driver answered with an unexpected payload.
    #[error("invalid driver response: {0}")]
    InvalidResponse(String),
}

impl BrowserError {
    /// Returns true when retrying the lookup may succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::StaleElement(_) => true,
            Self::Command {
                error,
                ..
            } => matches!(
                error.as_str(),
                "no such element" | "element not interactable" | "element click intercepted"
            ),
            _ => false,
        }
    }
}

// ============================================================================
// SECTION: Page Contract
// ============================================================================

/// Opaque reference to an element on the current page.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementHandle(String);

impl ElementHandle {
    /// Wraps a driver element reference.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the driver element reference.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Page automation primitives.
pub trait BrowserPage {
    /// Navigates to an absolute URL.
    ///
    /// # Errors
    ///
    /// Returns [`BrowserError`] when navigation fails.
    fn goto(&mut self, url: &str) -> Result<(), BrowserError>;

    /// Returns the current page URL.
    ///
    /// # Errors
    ///
    /// Returns [`BrowserError`] when the driver call fails.
    fn current_url(&mut self) -> Result<String, BrowserError>;

    /// Finds all matches of `selector`, searching inside `scope` when given.
    ///
    /// # Errors
    ///
    /// Returns [`BrowserError`] when the driver call fails.
    fn find_all(
        &mut self,
        selector: &Selector,
        scope: Option<&ElementHandle>,
    ) -> Result<Vec<ElementHandle>, BrowserError>;

    /// Returns whether the element is rendered visibly.
    ///
    /// # Errors
    ///
    /// Returns [`BrowserError`] when the driver call fails.
    fn is_displayed(&mut self, element: &ElementHandle) -> Result<bool, BrowserError>;

    /// Returns whether the element accepts interaction.
    ///
    /// # Errors
    ///
    /// Returns [`BrowserError`] when the driver call fails.
    fn is_enabled(&mut self, element: &ElementHandle) -> Result<bool, BrowserError>;

    /// Returns the rendered text of the element and its descendants.
    ///
    /// # Errors
    ///
    /// Returns [`BrowserError`] when the driver call fails.
    fn text(&mut self, element: &ElementHandle) -> Result<String, BrowserError>;

    /// Clicks the element.
    ///
    /// # Errors
    ///
    /// Returns [`BrowserError`] when the driver call fails.
    fn click(&mut self, element: &ElementHandle) -> Result<(), BrowserError>;

    /// Clears the element's value.
    ///
    /// # Errors
    ///
    /// Returns [`BrowserError`] when the driver call fails.
    fn clear(&mut self, element: &ElementHandle) -> Result<(), BrowserError>;

    /// Types text into the element.
    ///
    /// # Errors
    ///
    /// Returns [`BrowserError`] when the driver call fails.
    fn send_keys(&mut self, element: &ElementHandle, text: &str) -> Result<(), BrowserError>;

    /// Captures a PNG screenshot of the viewport.
    ///
    /// # Errors
    ///
    /// Returns [`BrowserError`] when the driver call fails.
    fn screenshot(&mut self) -> Result<Vec<u8>, BrowserError>;
}
