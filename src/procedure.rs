//! Named invocation surface.
//!
//! Hosts that dispatch calls by name (a procedure registry, an RPC layer)
//! hand a [`ProcedureCall`] to [`Procedure::call`]. Parameters are checked
//! here so the resolver only ever sees two plain strings.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ResolveError, ResolveResult, ValidationError};
use crate::resolver::{IdentityResolver, PersonMatch};

/// Parameter carrying the identifier literal.
pub const PARAM_IDENT: &str = "ident";
/// Parameter carrying the authority code.
pub const PARAM_AUTHORITY: &str = "authority";

/// A by-name call with JSON parameters.
///
/// ```json
/// { "name": "eu.r11.getPersonByIdent", "params": { "ident": "X123", "authority": "LOC" } }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcedureCall {
    /// Procedure name to dispatch on.
    pub name: String,
    /// Named arguments; the resolver reads `ident` and `authority`.
    #[serde(default)]
    pub params: BTreeMap<String, serde_json::Value>,
}

impl ProcedureCall {
    /// Build a call to the resolution procedure.
    #[must_use]
    pub fn resolve(name: impl Into<String>, ident: &str, authority: &str) -> Self {
        let params = BTreeMap::from([
            (PARAM_IDENT.to_string(), serde_json::Value::from(ident)),
            (PARAM_AUTHORITY.to_string(), serde_json::Value::from(authority)),
        ]);
        Self {
            name: name.into(),
            params,
        }
    }

    fn string_param(&self, name: &str) -> Result<&str, ValidationError> {
        match self.params.get(name) {
            None | Some(serde_json::Value::Null) => Err(ValidationError::MissingParameter {
                name: name.to_string(),
            }),
            Some(serde_json::Value::String(s)) => Ok(s.as_str()),
            Some(other) => Err(ValidationError::InvalidParameter {
                name: name.to_string(),
                reason: format!("expected a string, got {other}"),
            }),
        }
    }
}

/// The resolution procedure bound to its configured name.
#[derive(Clone)]
pub struct Procedure {
    resolver: IdentityResolver,
}

impl Procedure {
    /// Bind a resolver under its configured procedure name.
    #[must_use]
    pub const fn new(resolver: IdentityResolver) -> Self {
        Self { resolver }
    }

    /// Name the procedure answers to.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.resolver.config().procedure_name
    }

    /// Dispatch a call.
    ///
    /// # Errors
    /// - `UnknownProcedure`: if `call.name` is not this procedure
    /// - `MissingParameter` / `InvalidParameter`: for absent or non-string params
    /// - `StoreUnavailable`: if resolution fails at the store level
    pub fn call(&self, call: &ProcedureCall) -> ResolveResult<Vec<PersonMatch>> {
        if call.name != self.name() {
            return Err(ValidationError::UnknownProcedure {
                name: call.name.clone(),
            }
            .into());
        }
        let ident = call.string_param(PARAM_IDENT)?;
        let authority = call.string_param(PARAM_AUTHORITY)?;
        debug!(procedure = %call.name, "dispatching");
        self.resolver.resolve_person_by_identifier(ident, authority)
    }

    /// Dispatch a JSON-encoded call and return the records as JSON.
    ///
    /// # Errors
    /// `InvalidParameter` for an undecodable request, otherwise as [`Self::call`].
    pub fn call_json(&self, request: &str) -> ResolveResult<String> {
        let call: ProcedureCall =
            serde_json::from_str(request).map_err(|e| ValidationError::InvalidParameter {
                name: "request".to_string(),
                reason: e.to_string(),
            })?;
        let records = self.call(&call)?;
        serde_json::to_string(&records)
            .map_err(|e| ResolveError::internal(format!("failed to encode records: {e}")))
    }
}
