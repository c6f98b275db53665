//! Error types for forms.

use indexmap::IndexMap;
use thiserror::Error;

use crate::model::ModelValidation;

/// Construction errors.
///
/// These indicate a mistake in a schema or spec and are returned while
/// building forms, fields and editors.
#[derive(Debug, Error)]
pub enum FormError {
    /// No editor is registered under this type name.
    #[error("unknown editor type: {0}")]
    UnknownEditorType(String),

    /// No validator is registered under this name.
    #[error("validator \"{0}\" not found")]
    UnknownValidator(String),

    /// A required option was not supplied.
    #[error("missing required option \"{option}\" for {context}")]
    MissingOption {
        /// Option name.
        option: String,
        /// Component that requires it.
        context: String,
    },

    /// A spec field declared a datatype with no editor mapping.
    #[error("unknown spec datatype: '{0}'")]
    UnknownDatatype(String),

    /// A key that is not part of the form was referenced.
    #[error("unknown field '{0}'")]
    UnknownField(String),

    /// A fieldset layout listed dependants without a preceding field.
    #[error("dependent fieldsets must follow a field")]
    OrphanDependants,

    /// A validator pattern failed to compile.
    #[error("invalid regexp: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// The spec document could not be parsed.
    #[error("failed to parse spec: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// A single failed validator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    /// Validator type, e.g. `required`.
    pub kind: String,
    /// Human readable message.
    pub message: String,
}

impl ValidationError {
    /// Creates a new validation error.
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
        }
    }
}

/// The error carried by one field of a form.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FieldError {
    /// The editor's validator chain failed.
    #[error("{0}")]
    Invalid(ValidationError),

    /// A nested form (object editor) has errors of its own.
    #[error("nested form has {} invalid field(s)", .0.len())]
    Nested(Box<FormErrors>),

    /// The data source rejected the value for this field.
    #[error("{0}")]
    Model(String),
}

impl FieldError {
    /// Returns the message to display next to the field.
    pub fn message(&self) -> String {
        self.to_string()
    }
}

impl From<ValidationError> for FieldError {
    fn from(err: ValidationError) -> Self {
        Self::Invalid(err)
    }
}

/// Errors that could not be attached to a known field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OtherError {
    /// A whole-model message.
    Message(String),
    /// A keyed message whose field is unknown or already in error.
    Field {
        /// Key reported by the data source.
        key: String,
        /// Message reported by the data source.
        message: String,
    },
}

/// Collection of validation errors by field, plus the `_others` bucket.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormErrors {
    /// Errors keyed by field key, in field order.
    pub fields: IndexMap<String, FieldError>,
    /// Errors that could not be attached to a field.
    pub others: Vec<OtherError>,
}

impl FormErrors {
    /// Creates a new empty error collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an error for a field.
    pub fn insert(&mut self, key: impl Into<String>, error: impl Into<FieldError>) {
        self.fields.insert(key.into(), error.into());
    }

    /// Records an unattached error.
    pub fn push_other(&mut self, error: OtherError) {
        self.others.push(error);
    }

    /// Returns whether there are any errors.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.others.is_empty()
    }

    /// Returns the number of fields with errors.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns the error for a specific field.
    pub fn get(&self, key: &str) -> Option<&FieldError> {
        self.fields.get(key)
    }

    /// Returns whether a field has an error.
    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }
}

impl std::fmt::Display for FormErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (key, error) in &self.fields {
            writeln!(f, "{key}: {error}")?;
        }
        for other in &self.others {
            match other {
                OtherError::Message(message) => writeln!(f, "_others: {message}")?,
                OtherError::Field { key, message } => writeln!(f, "_others: {key}: {message}")?,
            }
        }
        Ok(())
    }
}

/// Errors raised by a data source while writing values.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    /// The data source's own validation refused the candidate values.
    #[error("data source validation failed: {0}")]
    Invalid(ModelValidation),

    /// The data source refused the write for another reason.
    #[error("data source rejected the update: {0}")]
    Rejected(String),
}

/// Errors returned by `commit()`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CommitError {
    /// A single editor failed validation.
    #[error("validation failed: {0}")]
    Field(FieldError),

    /// The form failed validation.
    #[error("validation failed:\n{0}")]
    Form(FormErrors),

    /// The data source refused the write.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// There is no data source to write to.
    #[error("no data source bound for '{0}'")]
    Unbound(String),
}

/// Result type alias for form construction.
pub type Result<T> = std::result::Result<T, FormError>;
