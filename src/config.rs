//! Resolver configuration.
//!
//! Every field has a default, so an empty JSON object is a valid config.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ResolveResult, ValidationError};
use crate::logging::LoggingConfig;
use crate::schema::CrmSchema;

/// Name under which the resolution procedure is exposed by default.
pub const DEFAULT_PROCEDURE_NAME: &str = "eu.r11.getPersonByIdent";

/// Configuration for [`IdentityResolver`](crate::IdentityResolver) and its hosts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Label, relationship and property names.
    pub schema: CrmSchema,
    /// Require matched assignments and persons to carry their schema labels.
    pub enforce_labels: bool,
    /// Name the procedure is registered under.
    pub procedure_name: String,
    /// Subscriber settings used by hosts that call [`crate::logging::init`].
    pub logging: LoggingConfig,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            schema: CrmSchema::default(),
            enforce_labels: false,
            procedure_name: DEFAULT_PROCEDURE_NAME.to_string(),
            logging: LoggingConfig::default(),
        }
    }
}

impl ResolverConfig {
    /// Parses and validates a JSON config document.
    ///
    /// # Errors
    /// `InvalidConfig` for malformed JSON, `EmptySchemaName` for blank schema names.
    pub fn from_json_str(json: &str) -> ResolveResult<Self> {
        let config: Self = serde_json::from_str(json).map_err(|e| ValidationError::InvalidConfig {
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and validates a JSON config file.
    ///
    /// # Errors
    /// `InvalidConfig` if the file cannot be read, otherwise as [`Self::from_json_str`].
    pub fn from_path(path: impl AsRef<Path>) -> ResolveResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| ValidationError::InvalidConfig {
            reason: format!("cannot read {}: {e}", path.display()),
        })?;
        Self::from_json_str(&json)
    }

    /// Checks schema names and the procedure name.
    ///
    /// # Errors
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.schema.validate()?;
        if self.procedure_name.trim().is_empty() {
            return Err(ValidationError::InvalidConfig {
                reason: "procedure_name cannot be empty".to_string(),
            });
        }
        Ok(())
    }
}
