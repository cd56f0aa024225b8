use std::fmt;
use std::sync::Arc;

use crate::validation::value::{FieldValue, ValueKind};

/// User-supplied predicate for [`Rule::Custom`].
pub type Predicate = Arc<dyn Fn(&FieldValue<'_>) -> bool + Send + Sync>;

/// What a validator checks.
#[derive(Clone)]
pub enum Rule {
    /// Inclusive bounds on the character count of text or the element count
    /// of a sequence. Any other shape, `Null` included, fails.
    Length { min: usize, max: usize },
    /// Fails only on `Null`.
    Required,
    Custom(Predicate),
}

impl Rule {
    #[must_use]
    pub fn custom<F>(predicate: F) -> Self
    where
        F: Fn(&FieldValue<'_>) -> bool + Send + Sync + 'static,
    {
        Rule::Custom(Arc::new(predicate))
    }

    /// Evaluates the rule. Pure; never panics on any shape.
    #[must_use]
    pub fn check(&self, value: &FieldValue<'_>) -> bool {
        match self {
            Rule::Length { min, max } => value
                .length()
                .is_some_and(|len| *min <= len && len <= *max),
            Rule::Required => !value.is_null(),
            Rule::Custom(p) => p(value),
        }
    }

    /// Value shapes the rule is meant for. Advisory only; `check` accepts any
    /// shape.
    #[must_use]
    pub fn valid_kinds(&self) -> &'static [ValueKind] {
        match self {
            Rule::Length { .. } => &[ValueKind::Text, ValueKind::Seq],
            Rule::Required | Rule::Custom(_) => &ValueKind::ALL,
        }
    }

    pub(crate) fn default_message(&self, property: &str) -> String {
        match self {
            Rule::Length { min, max } => {
                format!("{property} must be between {min} and {max} long.")
            }
            Rule::Required => format!("{property} is required."),
            Rule::Custom(_) => format!("{property} is invalid."),
        }
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Length { min, max } => f
                .debug_struct("Length")
                .field("min", min)
                .field("max", max)
                .finish(),
            Rule::Required => f.write_str("Required"),
            Rule::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}
