//! Field-level validation errors for submitted forms.

use std::collections::BTreeMap;

/// Key under which errors not tied to a single field are stored.
pub const NON_FIELD_ERRORS: &str = "__all__";

/// Validation errors keyed by form field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors {
    fields: BTreeMap<&'static str, Vec<String>>,
}

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.fields.entry(field).or_default().push(message.into());
    }

    /// Errors recorded for `field`, empty if it validated.
    pub fn field(&self, field: &str) -> &[String] {
        self.fields.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has(&self, field: &str) -> bool {
        !self.field(field).is_empty()
    }

    pub fn non_field(&self) -> &[String] {
        self.field(NON_FIELD_ERRORS)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// `Ok(value)` when nothing was recorded.
    pub fn into_result<T>(self, value: T) -> Result<T, FormErrors> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}
