use crate::validation::rule::Rule;
use crate::validation::value::FieldValue;

/// One rule bound to one property, with its error message and ordering key.
#[derive(Debug, Clone)]
pub struct Validator {
    property: String,
    rule: Rule,
    message: String,
    sequence: i32,
}

impl Validator {
    /// A validator with the rule's default message and sequence 0.
    #[must_use]
    pub fn new(property: impl Into<String>, rule: Rule) -> Self {
        let property = property.into();
        let message = rule.default_message(&property);
        Self {
            property,
            rule,
            message,
            sequence: 0,
        }
    }

    /// Replaces the error message. An empty message keeps the default.
    #[must_use]
    pub fn message(mut self, message: impl Into<String>) -> Self {
        let message = message.into();
        if !message.is_empty() {
            self.message = message;
        }
        self
    }

    /// Lower sequences run first; equal sequences keep declaration order.
    #[must_use]
    pub fn sequence(mut self, sequence: i32) -> Self {
        self.sequence = sequence;
        self
    }

    #[must_use]
    pub fn property(&self) -> &str {
        &self.property
    }

    #[must_use]
    pub fn rule(&self) -> &Rule {
        &self.rule
    }

    #[must_use]
    pub fn error_message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub fn order(&self) -> i32 {
        self.sequence
    }

    #[must_use]
    pub fn validate(&self, value: &FieldValue<'_>) -> bool {
        self.rule.check(value)
    }
}
