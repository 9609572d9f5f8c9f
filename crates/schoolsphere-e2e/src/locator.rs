// crates/schoolsphere-e2e/src/locator.rs
// ============================================================================
// Module: Element Locators
// Description: User-facing element locators and their WebDriver selectors.
// Purpose: Find elements by visible text, placeholder, label, role, or test id.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A [`Locator`] names an element the way a user sees it. Leaf locators
//! compile to a single [`Selector`] (CSS or XPath) that WebDriver evaluates
//! relative to the document or to a scope element. [`Locator::Within`]
//! narrows the search to the first scope element containing some text, as
//! in "the row that mentions this student id".
//!
//! XPath selectors always start with `.//` so the same expression works
//! from the document root and from inside an element.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Selectors
// ============================================================================

/// A WebDriver element selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// CSS selector.
    Css(String),
    /// XPath expression.
    XPath(String),
}

impl Selector {
    /// Returns the WebDriver location strategy name.
    #[must_use]
    pub const fn strategy(&self) -> &'static str {
        match self {
            Self::Css(_) => "css selector",
            Self::XPath(_) => "xpath",
        }
    }

    /// Returns the selector expression.
    #[must_use]
    pub fn value(&self) -> &str {
        match self {
            Self::Css(value) | Self::XPath(value) => value,
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.strategy(), self.value())
    }
}

// ============================================================================
// SECTION: Locators
// ============================================================================

/// How a scenario step identifies an element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Locator {
    /// Raw CSS selector, e.g. `input[id="password"]`.
    Css(String),
    /// Element whose own text contains the value.
    Text(String),
    /// Form control with the exact placeholder.
    Placeholder(String),
    /// Form control associated with the label text.
    Label(String),
    /// ARIA role (explicit or implicit) with an optional accessible name.
    Role {
        /// Role name such as `button`, `link`, or `row`.
        role: String,
        /// Exact accessible name; any name matches when absent.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
    /// Element with the `data-testid` attribute.
    TestId(String),
    /// Target located inside the first scope element that contains the text.
    Within {
        /// Locator for candidate scope elements.
        scope: Box<Self>,
        /// Text the scope element must contain.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        has_text: Option<String>,
        /// Locator evaluated inside the chosen scope element.
        target: Box<Self>,
    },
}

impl Locator {
    /// Locates by CSS selector.
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// Locates by visible text.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Locates by placeholder text.
    #[must_use]
    pub fn placeholder(text: impl Into<String>) -> Self {
        Self::Placeholder(text.into())
    }

    /// Locates by label text.
    #[must_use]
    pub fn label(text: impl Into<String>) -> Self {
        Self::Label(text.into())
    }

    /// Locates by role and exact accessible name.
    #[must_use]
    pub fn role(role: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Role {
            role: role.into(),
            name: Some(name.into()),
        }
    }

    /// Locates by role regardless of name.
    #[must_use]
    pub fn any_role(role: impl Into<String>) -> Self {
        Self::Role {
            role: role.into(),
            name: None,
        }
    }

    /// Locates by `data-testid`.
    #[must_use]
    pub fn test_id(id: impl Into<String>) -> Self {
        Self::TestId(id.into())
    }

    /// Locates `target` inside the first `self` match containing `has_text`.
    #[must_use]
    pub fn containing(self, has_text: impl Into<String>, target: Self) -> Self {
        Self::Within {
            scope: Box::new(self),
            has_text: Some(has_text.into()),
            target: Box::new(target),
        }
    }

    /// Returns the selector of a leaf locator; [`Locator::Within`] has none.
    #[must_use]
    pub fn selector(&self) -> Option<Selector> {
        let selector = match self {
            Self::Css(css) => Selector::Css(css.clone()),
            Self::Text(text) => Selector::XPath(format!(
                ".//*[not(self::script or self::style)][text()[contains(normalize-space(.), {})]]",
                xpath_literal(text)
            )),
            Self::Placeholder(text) => {
                Selector::XPath(format!(".//*[@placeholder={}]", xpath_literal(text)))
            }
            Self::Label(text) => {
                let text = xpath_literal(text);
                Selector::XPath(format!(
                    ".//*[@id=//label[normalize-space(.)={text}]/@for] | \
                     .//label[normalize-space(.)={text}]//*[self::input or self::textarea or self::select] | \
                     .//*[normalize-space(@aria-label)={text}]"
                ))
            }
            Self::Role {
                role,
                name,
            } => {
                let mut xpath = format!(".//*[{}]", role_predicate(role));
                if let Some(name) = name {
                    let name = xpath_literal(name);
                    xpath.push_str(&format!(
                        "[normalize-space(.)={name} or normalize-space(@aria-label)={name} or \
                         normalize-space(@value)={name} or normalize-space(@title)={name}]"
                    ));
                }
                Selector::XPath(xpath)
            }
            Self::TestId(id) => Selector::XPath(format!(".//*[@data-testid={}]", xpath_literal(id))),
            Self::Within {
                ..
            } => return None,
        };
        Some(selector)
    }

    /// Returns a copy with `{stamp}` replaced in every text field.
    #[must_use]
    pub fn render(&self, stamp: i64) -> Self {
        let fill = |text: &str| render_template(text, stamp);
        match self {
            Self::Css(css) => Self::Css(fill(css)),
            Self::Text(text) => Self::Text(fill(text)),
            Self::Placeholder(text) => Self::Placeholder(fill(text)),
            Self::Label(text) => Self::Label(fill(text)),
            Self::Role {
                role,
                name,
            } => Self::Role {
                role: role.clone(),
                name: name.as_deref().map(fill),
            },
            Self::TestId(id) => Self::TestId(fill(id)),
            Self::Within {
                scope,
                has_text,
                target,
            } => Self::Within {
                scope: Box::new(scope.render(stamp)),
                has_text: has_text.as_deref().map(fill),
                target: Box::new(target.render(stamp)),
            },
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Css(css) => write!(f, "css \"{css}\""),
            Self::Text(text) => write!(f, "text \"{text}\""),
            Self::Placeholder(text) => write!(f, "placeholder \"{text}\""),
            Self::Label(text) => write!(f, "label \"{text}\""),
            Self::Role {
                role,
                name: Some(name),
            } => write!(f, "{role} \"{name}\""),
            Self::Role {
                role,
                name: None,
            } => write!(f, "{role}"),
            Self::TestId(id) => write!(f, "test id \"{id}\""),
            Self::Within {
                scope,
                has_text: Some(text),
                target,
            } => write!(f, "{target} in {scope} containing \"{text}\""),
            Self::Within {
                scope,
                has_text: None,
                target,
            } => write!(f, "{target} in {scope}"),
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Replaces `{stamp}` with the scenario stamp.
#[must_use]
pub fn render_template(text: &str, stamp: i64) -> String {
    text.replace("{stamp}", &stamp.to_string())
}

/// Maps a role onto an XPath predicate covering implicit HTML roles.
fn role_predicate(role: &str) -> String {
    match role {
        "button" => "self::button or @role='button' or (self::input and \
                     (@type='button' or @type='submit' or @type='reset'))"
            .to_string(),
        "link" => "(self::a and @href) or @role='link'".to_string(),
        "option" => "self::option or @role='option'".to_string(),
        "row" => "self::tr or @role='row'".to_string(),
        "combobox" => "self::select or @role='combobox'".to_string(),
        "checkbox" => "(self::input and @type='checkbox') or @role='checkbox'".to_string(),
        "heading" => "self::h1 or self::h2 or self::h3 or self::h4 or self::h5 or self::h6 or \
                      @role='heading'"
            .to_string(),
        "textbox" => "self::textarea or @role='textbox' or (self::input and (not(@type) or \
                      @type='text' or @type='email' or @type='password' or @type='search'))"
            .to_string(),
        other => format!("@role={}", xpath_literal(other)),
    }
}

/// Quotes a string as an XPath 1.0 literal.
///
/// XPath 1.0 has no escape syntax, so values holding both quote kinds are
/// assembled with `concat()`.
#[must_use]
pub fn xpath_literal(value: &str) -> String {
    if !value.contains('\'') {
        return format!("'{value}'");
    }
    if !value.contains('"') {
        return format!("\"{value}\"");
    }
    let parts: Vec<String> = value.split('\'').map(|part| format!("'{part}'")).collect();
    format!("concat({})", parts.join(", \"'\", "))
}

// ============================================================================
// SECTION: Tests
// ============================================================================
