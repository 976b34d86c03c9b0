//! Contract error types for the kasus service
//!
//! These errors are transport-agnostic; the REST layer maps them to Problem Details.

use std::collections::BTreeMap;

/// Field → messages map, keyed with dotted paths (`desk_study.0.hasil_kesesuaian`)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn fields(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn into_map(self) -> BTreeMap<String, Vec<String>> {
        self.0
    }

    /// `Ok(())` when nothing was collected, a `Validation` error otherwise
    pub fn into_result(self) -> Result<(), KasusError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(KasusError::Validation { errors: self })
        }
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{}: {}", field, message)?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Kasus service domain errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KasusError {
    /// Malformed or missing fields, bad enum values, undecodable signatures
    #[error("Validation failed: {errors}")]
    Validation { errors: ValidationErrors },

    /// Role or team-membership check failed
    #[error("This action is not permitted")]
    Forbidden,

    /// Referenced id does not resolve
    #[error("{resource} not found: {id}")]
    NotFound { resource: String, id: String },

    /// Duplicate unique key, pending request already open, stale write
    #[error("Conflict: {reason}")]
    Conflict { reason: String },

    /// Operation not allowed from the current workflow status
    #[error("Cannot {operation} while status is '{status}'")]
    InvalidTransition { status: String, operation: String },

    /// Unexpected persistence or storage failure
    #[error("Internal error")]
    Internal,
}

impl KasusError {
    pub fn not_found(resource: &str, id: impl std::fmt::Display) -> Self {
        Self::NotFound {
            resource: resource.to_string(),
            id: id.to_string(),
        }
    }

    pub fn conflict(reason: impl Into<String>) -> Self {
        Self::Conflict {
            reason: reason.into(),
        }
    }

    pub fn invalid_transition(status: impl std::fmt::Display, operation: &str) -> Self {
        Self::InvalidTransition {
            status: status.to_string(),
            operation: operation.to_string(),
        }
    }

    /// Single-field validation failure
    pub fn invalid_field(field: &str, message: impl Into<String>) -> Self {
        let mut errors = ValidationErrors::new();
        errors.add(field, message);
        Self::Validation { errors }
    }
}
