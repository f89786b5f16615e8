use std::error::Error;
use std::fmt;
use std::path::Path;

use serde::Deserialize;

use crate::domain::check_in_type::CheckInType;

const TEMPLATES_TOML: &str = include_str!("templates.toml");

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
struct TemplateDocument {
    templates: TemplateSet,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
struct TemplateSet {
    daily: String,
    weekly: String,
    blocked: String,
    win: String,
    other: String,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
struct OverrideDocument {
    #[serde(default)]
    templates: OverrideSet,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
struct OverrideSet {
    daily: Option<String>,
    weekly: Option<String>,
    blocked: Option<String>,
    win: Option<String>,
    other: Option<String>,
}

/// Check-in templates: the built-in TOML document, with individual entries
/// replaceable by a user override file of the same shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateRegistry {
    set: TemplateSet,
}

impl TemplateRegistry {
    pub fn builtin() -> Result<Self, TemplateError> {
        let document: TemplateDocument =
            toml::from_str(TEMPLATES_TOML).map_err(TemplateError::Builtin)?;
        Ok(Self {
            set: document.templates,
        })
    }

    /// Built-in templates merged with the override file at `path`, when one
    /// exists. A missing file is fine; an unreadable or malformed one is not.
    pub fn load(override_path: &Path) -> Result<Self, TemplateError> {
        let mut registry = Self::builtin()?;
        if !override_path.exists() {
            return Ok(registry);
        }

        let raw = std::fs::read_to_string(override_path)
            .map_err(|err| TemplateError::Read(override_path.display().to_string(), err))?;
        let document: OverrideDocument = toml::from_str(&raw)
            .map_err(|err| TemplateError::Override(override_path.display().to_string(), err))?;
        registry.apply(document.templates);
        Ok(registry)
    }

    fn apply(&mut self, overrides: OverrideSet) {
        if let Some(text) = overrides.daily {
            self.set.daily = text;
        }
        if let Some(text) = overrides.weekly {
            self.set.weekly = text;
        }
        if let Some(text) = overrides.blocked {
            self.set.blocked = text;
        }
        if let Some(text) = overrides.win {
            self.set.win = text;
        }
        if let Some(text) = overrides.other {
            self.set.other = text;
        }
    }

    pub fn text(&self, kind: CheckInType) -> &str {
        match kind {
            CheckInType::Daily => &self.set.daily,
            CheckInType::Weekly => &self.set.weekly,
            CheckInType::Blocked => &self.set.blocked,
            CheckInType::Win => &self.set.win,
            CheckInType::Other => &self.set.other,
        }
    }
}

#[derive(Debug)]
pub enum TemplateError {
    Builtin(toml::de::Error),
    Read(String, std::io::Error),
    Override(String, toml::de::Error),
}

impl fmt::Display for TemplateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateError::Builtin(err) => {
                write!(f, "built-in template document is invalid: {}", err)
            }
            TemplateError::Read(path, err) => {
                write!(f, "cannot read template overrides at {}: {}", path, err)
            }
            TemplateError::Override(path, err) => {
                write!(f, "template overrides at {} are invalid: {}", path, err)
            }
        }
    }
}

impl Error for TemplateError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            TemplateError::Builtin(err) => Some(err),
            TemplateError::Read(_, err) => Some(err),
            TemplateError::Override(_, err) => Some(err),
        }
    }
}
