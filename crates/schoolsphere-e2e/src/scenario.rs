// crates/schoolsphere-e2e/src/scenario.rs
// ============================================================================
// Module: Scenario Model
// Description: Serializable scenarios, steps, roles, and seeded accounts.
// Purpose: Describe linear UI scenarios independently of any browser driver.
// Dependencies: crate::locator, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! A [`Scenario`] optionally signs in as a [`Role`] and then runs its
//! [`Step`]s in order. Steps are plain data so scenarios can live in JSON
//! files next to the built-in catalog. Text fields may contain `{stamp}`,
//! replaced with the unix time at scenario start so created records get
//! unique names.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::locator::Locator;
use crate::locator::render_template;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum accepted scenario file size in bytes.
const MAX_SCENARIO_FILE_BYTES: u64 = 1024 * 1024;
/// Longest accepted pause in milliseconds.
const MAX_PAUSE_MS: u64 = 60_000;
/// Longest accepted per-step timeout in milliseconds.
const MAX_STEP_TIMEOUT_MS: u64 = 120_000;

// ============================================================================
// SECTION: Roles and Accounts
// ============================================================================

/// Application role a scenario signs in as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// School administrator.
    Admin,
    /// Teacher.
    Teacher,
    /// Student.
    Student,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Admin => "admin",
            Self::Teacher => "teacher",
            Self::Student => "student",
        };
        f.write_str(label)
    }
}

/// Sign-in credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct Account {
    /// Login email.
    pub email: String,
    /// Login password.
    pub password: String,
}

impl Account {
    /// Creates an account.
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Accounts used for each role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accounts {
    /// Administrator account.
    pub admin: Account,
    /// Teacher account.
    pub teacher: Account,
    /// Student account.
    pub student: Account,
}

impl Accounts {
    /// Returns the account for a role.
    #[must_use]
    pub const fn get(&self, role: Role) -> &Account {
        match role {
            Role::Admin => &self.admin,
            Role::Teacher => &self.teacher,
            Role::Student => &self.student,
        }
    }
}

impl Default for Accounts {
    fn default() -> Self {
        Self {
            admin: Account::new("admin@example.com", "password123"),
            teacher: Account::new("teacher@example.com", "password123"),
            student: Account::new("student@example.com", "password123"),
        }
    }
}

// ============================================================================
// SECTION: Steps
// ============================================================================

/// What a step does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    /// Navigates to a path relative to the base URL.
    Goto {
        /// Path such as `/login`.
        path: String,
    },
    /// Replaces the value of a form control.
    Fill {
        /// Target control.
        locator: Locator,
        /// Text to enter.
        value: String,
    },
    /// Clicks the first visible match.
    Click {
        /// Target element.
        locator: Locator,
    },
    /// Waits until some match is visible.
    ExpectVisible {
        /// Expected element.
        locator: Locator,
    },
    /// Waits until no match is visible.
    ExpectHidden {
        /// Element expected to disappear.
        locator: Locator,
    },
    /// Waits until the first visible match is disabled.
    ExpectDisabled {
        /// Element expected to be disabled.
        locator: Locator,
    },
    /// Waits until the current URL contains the fragment.
    ExpectUrlContains {
        /// Expected URL fragment.
        fragment: String,
    },
    /// Sleeps for a fixed time.
    Pause {
        /// Pause length in milliseconds.
        ms: u64,
    },
    /// Saves a screenshot under the scenario's artifact directory.
    Screenshot {
        /// File stem of the PNG.
        name: String,
    },
    /// Writes a file and hands its path to a file input.
    UploadFile {
        /// Target `input[type=file]`.
        locator: Locator,
        /// File name shown by the page.
        file_name: String,
        /// File contents.
        contents: String,
    },
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Goto {
                path,
            } => write!(f, "goto {path}"),
            Self::Fill {
                locator,
                ..
            } => write!(f, "fill {locator}"),
            Self::Click {
                locator,
            } => write!(f, "click {locator}"),
            Self::ExpectVisible {
                locator,
            } => write!(f, "expect visible {locator}"),
            Self::ExpectHidden {
                locator,
            } => write!(f, "expect hidden {locator}"),
            Self::ExpectDisabled {
                locator,
            } => write!(f, "expect disabled {locator}"),
            Self::ExpectUrlContains {
                fragment,
            } => write!(f, "expect url contains \"{fragment}\""),
            Self::Pause {
                ms,
            } => write!(f, "pause {ms}ms"),
            Self::Screenshot {
                name,
            } => write!(f, "screenshot {name}"),
            Self::UploadFile {
                locator,
                file_name,
                ..
            } => write!(f, "upload \"{file_name}\" into {locator}"),
        }
    }
}

/// One scenario step with an optional timeout override.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    /// The action to perform.
    #[serde(flatten)]
    pub action: Action,
    /// Overrides the runner's default wait in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

impl Step {
    const fn of(action: Action) -> Self {
        Self {
            action,
            timeout_ms: None,
        }
    }

    /// Navigates to `path`.
    #[must_use]
    pub fn goto(path: impl Into<String>) -> Self {
        Self::of(Action::Goto {
            path: path.into(),
        })
    }

    /// Fills `locator` with `value`.
    #[must_use]
    pub fn fill(locator: Locator, value: impl Into<String>) -> Self {
        Self::of(Action::Fill {
            locator,
            value: value.into(),
        })
    }

    /// Clicks `locator`.
    #[must_use]
    pub const fn click(locator: Locator) -> Self {
        Self::of(Action::Click {
            locator,
        })
    }

    /// Expects `locator` to be visible.
    #[must_use]
    pub const fn expect_visible(locator: Locator) -> Self {
        Self::of(Action::ExpectVisible {
            locator,
        })
    }

    /// Expects `locator` to be hidden or absent.
    #[must_use]
    pub const fn expect_hidden(locator: Locator) -> Self {
        Self::of(Action::ExpectHidden {
            locator,
        })
    }

    /// Expects `locator` to be disabled.
    #[must_use]
    pub const fn expect_disabled(locator: Locator) -> Self {
        Self::of(Action::ExpectDisabled {
            locator,
        })
    }

    /// Expects the URL to contain `fragment`.
    #[must_use]
    pub fn expect_url_contains(fragment: impl Into<String>) -> Self {
        Self::of(Action::ExpectUrlContains {
            fragment: fragment.into(),
        })
    }

    /// Pauses for `ms` milliseconds.
    #[must_use]
    pub const fn pause(ms: u64) -> Self {
        Self::of(Action::Pause {
            ms,
        })
    }

    /// Captures a screenshot named `name`.
    #[must_use]
    pub fn screenshot(name: impl Into<String>) -> Self {
        Self::of(Action::Screenshot {
            name: name.into(),
        })
    }

    /// Uploads a generated file through `locator`.
    #[must_use]
    pub fn upload_file(
        locator: Locator,
        file_name: impl Into<String>,
        contents: impl Into<String>,
    ) -> Self {
        Self::of(Action::UploadFile {
            locator,
            file_name: file_name.into(),
            contents: contents.into(),
        })
    }

    /// Sets the wait timeout of this step.
    #[must_use]
    pub const fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    /// Returns a copy with `{stamp}` replaced in every text field.
    #[must_use]
    pub fn render(&self, stamp: i64) -> Self {
        let fill = |text: &str| render_template(text, stamp);
        let action = match &self.action {
            Action::Goto {
                path,
            } => Action::Goto {
                path: fill(path),
            },
            Action::Fill {
                locator,
                value,
            } => Action::Fill {
                locator: locator.render(stamp),
                value: fill(value),
            },
            Action::Click {
                locator,
            } => Action::Click {
                locator: locator.render(stamp),
            },
            Action::ExpectVisible {
                locator,
            } => Action::ExpectVisible {
                locator: locator.render(stamp),
            },
            Action::ExpectHidden {
                locator,
            } => Action::ExpectHidden {
                locator: locator.render(stamp),
            },
            Action::ExpectDisabled {
                locator,
            } => Action::ExpectDisabled {
                locator: locator.render(stamp),
            },
            Action::ExpectUrlContains {
                fragment,
            } => Action::ExpectUrlContains {
                fragment: fill(fragment),
            },
            Action::Pause {
                ms,
            } => Action::Pause {
                ms: *ms,
            },
            Action::Screenshot {
                name,
            } => Action::Screenshot {
                name: fill(name),
            },
            Action::UploadFile {
                locator,
                file_name,
                contents,
            } => Action::UploadFile {
                locator: locator.render(stamp),
                file_name: fill(file_name),
                contents: fill(contents),
            },
        };
        Self {
            action,
            timeout_ms: self.timeout_ms,
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.action.fmt(f)
    }
}

// ============================================================================
// SECTION: Scenarios
// ============================================================================

/// A linear UI scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    /// Unique name, also used as the artifact directory name.
    pub name: String,
    /// One-line summary shown by listings.
    #[serde(default)]
    pub description: String,
    /// Role to sign in as before the steps run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub login: Option<Role>,
    /// Steps in execution order.
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl Scenario {
    /// Validates names, pause lengths, and timeouts.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioFileError::Invalid`] describing the first problem.
    pub fn validate(&self) -> Result<(), ScenarioFileError> {
        let invalid = |message: String| Err(ScenarioFileError::Invalid(message));
        if self.name.is_empty()
            || !self.name.chars().all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_')
        {
            return invalid(format!(
                "scenario name \"{}\" must be non-empty ASCII letters, digits, '-' or '_'",
                self.name
            ));
        }
        if self.steps.is_empty() && self.login.is_none() {
            return invalid(format!("scenario {} has no steps", self.name));
        }
        for (index, step) in self.steps.iter().enumerate() {
            if step.timeout_ms.is_some_and(|ms| ms == 0 || ms > MAX_STEP_TIMEOUT_MS) {
                return invalid(format!(
                    "scenario {} step {} timeout must be 1..={MAX_STEP_TIMEOUT_MS} ms",
                    self.name,
                    index + 1
                ));
            }
            match &step.action {
                Action::Pause {
                    ms,
                } if *ms > MAX_PAUSE_MS => {
                    return invalid(format!(
                        "scenario {} step {} pause exceeds {MAX_PAUSE_MS} ms",
                        self.name,
                        index + 1
                    ));
                }
                Action::Screenshot {
                    name,
                }
                | Action::UploadFile {
                    file_name: name,
                    ..
                } if !is_plain_file_name(name) => {
                    return invalid(format!(
                        "scenario {} step {} file name \"{name}\" must not contain path separators",
                        self.name,
                        index + 1
                    ));
                }
                _ => {}
            }
        }
        Ok(())
    }
}

/// Returns true when `name` is a single non-empty path component.
fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\'])
}

// ============================================================================
// SECTION: Scenario Files
// ============================================================================

/// Errors raised while loading scenario files.
#[derive(Debug, Error)]
pub enum ScenarioFileError {
    /// The file could not be read.
    #[error("scenario file io error at {path}: {message}")]
    Io {
        /// File path.
        path: PathBuf,
        /// Error message.
        message: String,
    },
    /// The file is not valid scenario JSON.
    #[error("scenario file parse error at {path}: {message}")]
    Parse {
        /// File path.
        path: PathBuf,
        /// Error message.
        message: String,
    },
    /// A scenario failed validation.
    #[error("invalid scenario: {0}")]
    Invalid(String),
}

/// A scenario file holds one scenario or a list of them.
#[derive(Deserialize)]
#[serde(untagged)]
enum ScenarioFile {
    Many(Vec<Scenario>),
    One(Box<Scenario>),
}

/// Loads and validates scenarios from a JSON file.
///
/// # Errors
///
/// Returns [`ScenarioFileError`] when the file is missing, oversized, not
/// UTF-8, malformed, or contains an invalid scenario.
pub fn load_scenarios(path: &Path) -> Result<Vec<Scenario>, ScenarioFileError> {
    let io_error = |message: String| ScenarioFileError::Io {
        path: path.to_path_buf(),
        message,
    };
    let metadata = fs::metadata(path).map_err(|err| io_error(err.to_string()))?;
    if metadata.len() > MAX_SCENARIO_FILE_BYTES {
        return Err(io_error(format!("file exceeds {MAX_SCENARIO_FILE_BYTES} bytes")));
    }
    let bytes = fs::read(path).map_err(|err| io_error(err.to_string()))?;
    let content = String::from_utf8(bytes).map_err(|_| io_error("file must be utf-8".to_string()))?;
    let parsed: ScenarioFile =
        serde_json::from_str(&content).map_err(|err| ScenarioFileError::Parse {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
    let scenarios = match parsed {
        ScenarioFile::Many(scenarios) => scenarios,
        ScenarioFile::One(scenario) => vec![*scenario],
    };
    for scenario in &scenarios {
        scenario.validate()?;
    }
    Ok(scenarios)
}

// ============================================================================
// SECTION: Tests
// ============================================================================
