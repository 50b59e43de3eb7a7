//! INI-style scene parameter files (`parameters.cfg`).
//!
//! ```text
//! [extrinsics]
//! num_cams_x = 9
//! num_cams_y: 9
//! ; comment
//! ```
//!
//! Keys are case-insensitive, section names are not. Values are trimmed and
//! indented lines continue the previous value. Options in a `[DEFAULT]`
//! section apply to every other section.

use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;

use crate::ParamsError;

/// Name of the section whose options every other section inherits.
pub const DEFAULT_SECTION: &str = "DEFAULT";

/// A parsed parameter file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterFile {
    sections: BTreeMap<String, BTreeMap<String, String>>,
}

impl ParameterFile {
    /// Parse parameter-file text.
    pub fn parse(text: &str) -> Result<Self, ParamsError> {
        let mut sections: BTreeMap<String, BTreeMap<String, String>> = BTreeMap::new();
        let mut section: Option<String> = None;
        let mut last_key: Option<String> = None;

        for (idx, raw) in text.lines().enumerate() {
            let line_no = idx + 1;
            let trimmed = raw.trim();

            if trimmed.is_empty() {
                last_key = None;
                continue;
            }
            if trimmed.starts_with('#') || trimmed.starts_with(';') {
                continue;
            }

            // Continuation of the previous value.
            if raw.starts_with([' ', '\t']) {
                if let (Some(name), Some(key)) = (&section, &last_key) {
                    if let Some(value) = sections.get_mut(name).and_then(|s| s.get_mut(key)) {
                        value.push('\n');
                        value.push_str(trimmed);
                        continue;
                    }
                }
            }

            if let Some(rest) = trimmed.strip_prefix('[') {
                let name = rest
                    .strip_suffix(']')
                    .map(str::trim)
                    .filter(|n| !n.is_empty())
                    .ok_or_else(|| syntax(line_no, "malformed section header"))?;
                if sections.contains_key(name) {
                    return Err(syntax(line_no, format!("duplicate section [{name}]")));
                }
                sections.insert(name.to_string(), BTreeMap::new());
                section = Some(name.to_string());
                last_key = None;
                continue;
            }

            let Some(name) = &section else {
                return Err(syntax(line_no, "option outside of any section"));
            };
            let split = trimmed
                .find(['=', ':'])
                .ok_or_else(|| syntax(line_no, format!("expected 'key = value', got '{trimmed}'")))?;
            let key = trimmed[..split].trim().to_lowercase();
            let value = trimmed[split + 1..].trim().to_string();
            if key.is_empty() {
                return Err(syntax(line_no, "empty option name"));
            }

            let options = sections.entry(name.clone()).or_default();
            if options.contains_key(&key) {
                return Err(syntax(
                    line_no,
                    format!("duplicate option '{key}' in section [{name}]"),
                ));
            }
            options.insert(key.clone(), value);
            last_key = Some(key);
        }

        Ok(Self { sections })
    }

    /// Read and parse a parameter file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ParamsError> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// Whether a section exists (`[DEFAULT]` excluded).
    #[must_use]
    pub fn has_section(&self, section: &str) -> bool {
        section != DEFAULT_SECTION && self.sections.contains_key(section)
    }

    /// Section names in sorted order (`[DEFAULT]` excluded).
    pub fn sections(&self) -> impl Iterator<Item = &str> {
        self.sections
            .keys()
            .map(String::as_str)
            .filter(|name| *name != DEFAULT_SECTION)
    }

    /// Look up a value, `None` if the section or key is missing.
    #[must_use]
    pub fn get_opt(&self, section: &str, key: &str) -> Option<&str> {
        let key = key.to_lowercase();
        let options = self.sections.get(section)?;
        options
            .get(&key)
            .or_else(|| self.sections.get(DEFAULT_SECTION)?.get(&key))
            .map(String::as_str)
    }

    /// Look up a value.
    pub fn get(&self, section: &str, key: &str) -> Result<&str, ParamsError> {
        if !self.sections.contains_key(section) {
            return Err(ParamsError::MissingSection(section.to_string()));
        }
        self.get_opt(section, key)
            .ok_or_else(|| ParamsError::MissingKey {
                section: section.to_string(),
                key: key.to_lowercase(),
            })
    }

    /// Look up an integer value.
    pub fn get_int(&self, section: &str, key: &str) -> Result<i64, ParamsError> {
        self.get_parsed(section, key)
    }

    /// Look up a floating point value.
    pub fn get_float(&self, section: &str, key: &str) -> Result<f64, ParamsError> {
        self.get_parsed(section, key)
    }

    /// Look up a boolean (`1/yes/true/on`, `0/no/false/off`).
    pub fn get_bool(&self, section: &str, key: &str) -> Result<bool, ParamsError> {
        let value = self.get(section, key)?;
        match value.to_lowercase().as_str() {
            "1" | "yes" | "true" | "on" => Ok(true),
            "0" | "no" | "false" | "off" => Ok(false),
            _ => Err(invalid(section, key, value)),
        }
    }

    fn get_parsed<T: FromStr>(&self, section: &str, key: &str) -> Result<T, ParamsError> {
        let value = self.get(section, key)?;
        value.parse().map_err(|_| invalid(section, key, value))
    }
}

impl FromStr for ParameterFile {
    type Err = ParamsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn syntax(line: usize, message: impl Into<String>) -> ParamsError {
    ParamsError::Syntax {
        line,
        message: message.into(),
    }
}

fn invalid(section: &str, key: &str, value: &str) -> ParamsError {
    ParamsError::InvalidValue {
        section: section.to_string(),
        key: key.to_lowercase(),
        value: value.to_string(),
    }
}
