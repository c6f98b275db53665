//! Field validators.

use std::collections::HashMap;
use std::sync::Arc;

use regex::Regex;

use crate::error::{FormError, Result, ValidationError};
use crate::schema::{ValidatorConfig, ValidatorSpec};
use crate::value::{Value, ValueMap};

/// Trait for field validators.
pub trait Validator: Send + Sync {
    /// Validates a value.
    ///
    /// `form_values` holds the values of the sibling fields, for validators
    /// that compare against another field.
    fn validate(&self, value: &Value, form_values: &ValueMap) -> std::result::Result<(), ValidationError>;

    /// Returns the validator type, e.g. `required`.
    fn kind(&self) -> &str;

    /// Returns the error message for this validator.
    fn message(&self) -> &str;
}

/// Validator that requires a value.
#[derive(Debug, Clone)]
pub struct RequiredValidator {
    message: String,
}

impl RequiredValidator {
    /// Creates a new RequiredValidator with default message.
    pub fn new() -> Self {
        Self::with_message("Required")
    }

    /// Creates a new RequiredValidator with custom message.
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Default for RequiredValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator for RequiredValidator {
    fn validate(&self, value: &Value, _form_values: &ValueMap) -> std::result::Result<(), ValidationError> {
        match value {
            Value::Null | Value::Bool(false) => Err(ValidationError::new(self.kind(), &self.message)),
            Value::Text(s) if s.is_empty() => Err(ValidationError::new(self.kind(), &self.message)),
            _ => Ok(()),
        }
    }

    fn kind(&self) -> &str {
        "required"
    }

    fn message(&self) -> &str {
        &self.message
    }
}

/// Validator using a regex pattern.
///
/// Blank values pass; combine with `required` to reject them.
#[derive(Debug, Clone)]
pub struct RegexValidator {
    kind: String,
    pattern: Regex,
    message: String,
}

impl RegexValidator {
    /// Creates a new RegexValidator with default message.
    pub fn new(pattern: &str) -> Result<Self> {
        Self::with_message(pattern, "Invalid")
    }

    /// Creates a new RegexValidator with custom message.
    pub fn with_message(pattern: &str, message: impl Into<String>) -> Result<Self> {
        Ok(Self {
            kind: "regexp".to_string(),
            pattern: Regex::new(pattern)?,
            message: message.into(),
        })
    }

    fn named(kind: &str, pattern: &str, message: impl Into<String>) -> Result<Self> {
        Ok(Self {
            kind: kind.to_string(),
            ..Self::with_message(pattern, message)?
        })
    }
}

impl Validator for RegexValidator {
    fn validate(&self, value: &Value, _form_values: &ValueMap) -> std::result::Result<(), ValidationError> {
        if value.is_blank() || self.pattern.is_match(&value.to_form_string()) {
            Ok(())
        } else {
            Err(ValidationError::new(&self.kind, &self.message))
        }
    }

    fn kind(&self) -> &str {
        &self.kind
    }

    fn message(&self) -> &str {
        &self.message
    }
}

const EMAIL_PATTERN: &str =
    r"^[\w\-]{1,}([\w\-\+.]{1,1}[\w\-]{1,}){0,}[@][\w\-]{1,}([.]([\w\-]{1,})){1,3}$";

const URL_PATTERN: &str = r"(?i)^(http|https)://(([A-Z0-9][A-Z0-9_\-]*)(\.[A-Z0-9][A-Z0-9_\-]*)+)(:(\d+))?/?";

/// Creates the `email` validator.
pub fn email_validator(message: Option<&str>) -> Result<RegexValidator> {
    RegexValidator::named(
        "email",
        EMAIL_PATTERN,
        message.unwrap_or("Invalid email address"),
    )
}

/// Creates the `url` validator.
pub fn url_validator(message: Option<&str>) -> Result<RegexValidator> {
    RegexValidator::named("url", URL_PATTERN, message.unwrap_or("Invalid URL"))
}

/// Validator requiring the value to equal another field's value.
#[derive(Debug, Clone)]
pub struct MatchValidator {
    field: String,
    message: String,
}

impl MatchValidator {
    /// Creates a new MatchValidator with default message.
    pub fn new(field: impl Into<String>) -> Self {
        let field = field.into();
        let message = format!("Must match field \"{field}\"");
        Self { field, message }
    }

    /// Creates a new MatchValidator with custom message.
    pub fn with_message(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl Validator for MatchValidator {
    fn validate(&self, value: &Value, form_values: &ValueMap) -> std::result::Result<(), ValidationError> {
        if value.is_blank() {
            return Ok(());
        }
        let other = form_values.get(&self.field).unwrap_or(&Value::Null);
        if value.same_form_value(other) {
            Ok(())
        } else {
            Err(ValidationError::new("match", &self.message))
        }
    }

    fn kind(&self) -> &str {
        "match"
    }

    fn message(&self) -> &str {
        &self.message
    }
}

type CheckFn = dyn Fn(&Value, &ValueMap) -> Option<String> + Send + Sync;

/// Validator backed by a closure returning an error message.
pub struct FnValidator {
    kind: String,
    check: Box<CheckFn>,
}

impl FnValidator {
    /// Creates a new closure validator.
    pub fn new(
        kind: impl Into<String>,
        check: impl Fn(&Value, &ValueMap) -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind: kind.into(),
            check: Box::new(check),
        }
    }
}

impl std::fmt::Debug for FnValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnValidator")
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

impl Validator for FnValidator {
    fn validate(&self, value: &Value, form_values: &ValueMap) -> std::result::Result<(), ValidationError> {
        match (self.check)(value, form_values) {
            Some(message) => Err(ValidationError::new(&self.kind, message)),
            None => Ok(()),
        }
    }

    fn kind(&self) -> &str {
        &self.kind
    }

    fn message(&self) -> &str {
        ""
    }
}

/// Builds a validator from its configuration.
pub type ValidatorFactory = Arc<dyn Fn(&ValidatorConfig) -> Result<Arc<dyn Validator>> + Send + Sync>;

/// Named validator factories.
#[derive(Clone, Default)]
pub struct ValidatorRegistry {
    factories: HashMap<String, ValidatorFactory>,
}

impl std::fmt::Debug for ValidatorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&String> = self.factories.keys().collect();
        names.sort();
        f.debug_struct("ValidatorRegistry")
            .field("validators", &names)
            .finish()
    }
}

fn required_option<'a>(option: &'a Option<String>, name: &str, kind: &str) -> Result<&'a str> {
    option.as_deref().ok_or_else(|| FormError::MissingOption {
        option: name.to_string(),
        context: format!("validator \"{kind}\""),
    })
}

impl ValidatorRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with `required`, `regexp`, `email`, `url` and
    /// `match`.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("required", |config| {
            Ok(Arc::new(match &config.message {
                Some(message) => RequiredValidator::with_message(message),
                None => RequiredValidator::new(),
            }))
        });
        registry.register("regexp", |config| {
            let pattern = required_option(&config.regexp, "regexp", &config.kind)?;
            let message = config.message.as_deref().unwrap_or("Invalid");
            Ok(Arc::new(RegexValidator::with_message(pattern, message)?))
        });
        registry.register("email", |config| {
            Ok(Arc::new(email_validator(config.message.as_deref())?))
        });
        registry.register("url", |config| {
            Ok(Arc::new(url_validator(config.message.as_deref())?))
        });
        registry.register("match", |config| {
            let field = required_option(&config.field, "field", &config.kind)?;
            Ok(Arc::new(match &config.message {
                Some(message) => MatchValidator::with_message(field, message),
                None => MatchValidator::new(field),
            }))
        });
        registry
    }

    /// Registers a validator factory under a name, replacing any previous one.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        factory: impl Fn(&ValidatorConfig) -> Result<Arc<dyn Validator>> + Send + Sync + 'static,
    ) {
        self.factories.insert(name.into(), Arc::new(factory));
    }

    /// Returns whether a validator is registered under this name.
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Resolves a declared validator.
    pub fn build(&self, spec: &ValidatorSpec) -> Result<Arc<dyn Validator>> {
        match spec {
            ValidatorSpec::Custom(validator) => Ok(Arc::clone(validator)),
            ValidatorSpec::Named(name) => self.build_config(&ValidatorConfig::new(name.as_str())),
            ValidatorSpec::Config(config) => self.build_config(config),
        }
    }

    /// Resolves a list of declared validators, in order.
    pub fn build_all(&self, specs: &[ValidatorSpec]) -> Result<Vec<Arc<dyn Validator>>> {
        specs.iter().map(|spec| self.build(spec)).collect()
    }

    fn build_config(&self, config: &ValidatorConfig) -> Result<Arc<dyn Validator>> {
        let factory = self
            .factories
            .get(&config.kind)
            .ok_or_else(|| FormError::UnknownValidator(config.kind.clone()))?;
        factory(config)
    }
}

/// Runs validators in order and returns the first failure.
pub fn run_validators(
    validators: &[Arc<dyn Validator>],
    value: &Value,
    form_values: &ValueMap,
) -> std::result::Result<(), ValidationError> {
    validators
        .iter()
        .try_for_each(|validator| validator.validate(value, form_values))
}
