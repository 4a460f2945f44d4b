//! CIDOC-CRM vocabulary the resolver reads.
//!
//! Every label, relationship type, and property key is named here so a store
//! using a different prefix can be read without code changes.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Label and relationship names of the identifier-assignment pattern.
///
/// ```text
/// (Assignment)-[assigned]->(Identifier {value})
/// (Assignment)-[carried_out_by]->(Agent {identifier})
/// (Assignment)-[assigned_attribute_to]->(Person)
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrmSchema {
    /// Label of Person nodes.
    pub person_label: String,
    /// Label of Identifier nodes.
    pub identifier_label: String,
    /// Label of Agent (authority) nodes.
    pub agent_label: String,
    /// Label of Identifier Assignment nodes.
    pub assignment_label: String,
    /// Assignment → Identifier relationship type.
    pub assigned: String,
    /// Assignment → Agent relationship type.
    pub carried_out_by: String,
    /// Assignment → Person relationship type.
    pub assigned_attribute_to: String,
    /// Property holding the literal identifier on Identifier nodes.
    pub identifier_value_key: String,
    /// Property holding the authority code on Agent nodes.
    pub agent_identifier_key: String,
}

impl Default for CrmSchema {
    fn default() -> Self {
        Self {
            person_label: "crm_E21_Person".to_string(),
            identifier_label: "crm_E42_Identifier".to_string(),
            agent_label: "crm_E39_Actor".to_string(),
            assignment_label: "crm_E15_Identifier_Assignment".to_string(),
            assigned: "crm_P37_assigned".to_string(),
            carried_out_by: "crm_P14_carried_out_by".to_string(),
            assigned_attribute_to: "crm_P140_assigned_attribute_to".to_string(),
            identifier_value_key: "value".to_string(),
            agent_identifier_key: "identifier".to_string(),
        }
    }
}

impl CrmSchema {
    /// Rejects empty names.
    ///
    /// # Errors
    /// Returns `EmptySchemaName` naming the first blank field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let fields: [(&'static str, &str); 9] = [
            ("person_label", &self.person_label),
            ("identifier_label", &self.identifier_label),
            ("agent_label", &self.agent_label),
            ("assignment_label", &self.assignment_label),
            ("assigned", &self.assigned),
            ("carried_out_by", &self.carried_out_by),
            ("assigned_attribute_to", &self.assigned_attribute_to),
            ("identifier_value_key", &self.identifier_value_key),
            ("agent_identifier_key", &self.agent_identifier_key),
        ];
        match fields.iter().find(|(_, name)| name.trim().is_empty()) {
            Some((field, _)) => Err(ValidationError::EmptySchemaName { field: *field }),
            None => Ok(()),
        }
    }
}
