//! Environment configuration.
//!
//! All variables share the `ALEKS_` prefix:
//!
//! | Variable                     | Required | Format                        |
//! |------------------------------|----------|-------------------------------|
//! | `ALEKS_URL`                  | no       | URL, see [`DEFAULT_URL`]      |
//! | `ALEKS_USERNAME`             | yes      |                               |
//! | `ALEKS_PASSWORD`             | yes      |                               |
//! | `ALEKS_FROM_COMPLETION_DATE` | yes      | `YYYY-MM-DD`                  |
//! | `ALEKS_TO_COMPLETION_DATE`   | yes      | `YYYY-MM-DD`                  |
//! | `ALEKS_CLASSCODES`           | yes      | comma separated `AAAAA-AAAAA` |
//!
//! A `.env` file in the working directory is loaded first when present.

use std::env;

use crate::error::{ConfigError, ConfigResult};
use crate::models::ReportRequest;

/// Service endpoint used when no URL is configured
pub const DEFAULT_URL: &str = "https://secure.aleks.com/xmlrpc";

pub const URL_VAR: &str = "ALEKS_URL";
pub const USERNAME_VAR: &str = "ALEKS_USERNAME";
pub const PASSWORD_VAR: &str = "ALEKS_PASSWORD";
pub const FROM_VAR: &str = "ALEKS_FROM_COMPLETION_DATE";
pub const TO_VAR: &str = "ALEKS_TO_COMPLETION_DATE";
pub const CLASSCODES_VAR: &str = "ALEKS_CLASSCODES";

/// Connection settings for a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub url: Option<String>,
    pub username: String,
    pub password: String,
}

impl ClientConfig {
    /// Load from the process environment (and `.env`).
    pub fn from_env() -> ConfigResult<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(env_lookup)
    }

    /// Load from any variable source.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            url: optional(&lookup, URL_VAR),
            username: required(&lookup, USERNAME_VAR)?,
            password: required(&lookup, PASSWORD_VAR)?,
        })
    }
}

/// Date range and class codes for a report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportConfig {
    pub from: String,
    pub to: String,
    pub class_codes: Vec<String>,
}

impl ReportConfig {
    /// Load from the process environment (and `.env`).
    pub fn from_env() -> ConfigResult<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(env_lookup)
    }

    /// Load from any variable source.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let class_codes = parse_class_codes(&required(&lookup, CLASSCODES_VAR)?);
        if class_codes.is_empty() {
            return Err(ConfigError::MissingVar(CLASSCODES_VAR));
        }
        Ok(Self {
            from: required(&lookup, FROM_VAR)?,
            to: required(&lookup, TO_VAR)?,
            class_codes,
        })
    }

    pub fn into_request(self) -> ReportRequest {
        ReportRequest::new(self.from, self.to, self.class_codes)
    }
}

/// Split a comma separated class code list, dropping empty entries.
pub fn parse_class_codes(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Look up a variable in the process environment.
pub fn env_lookup(name: &str) -> Option<String> {
    env::var(name).ok()
}

/// A variable that must be set to a non-blank value.
pub fn required<F>(lookup: &F, name: &'static str) -> ConfigResult<String>
where
    F: Fn(&str) -> Option<String>,
{
    optional(lookup, name).ok_or(ConfigError::MissingVar(name))
}

fn optional<F>(lookup: &F, name: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name).filter(|v| !v.trim().is_empty())
}
