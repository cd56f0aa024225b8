use std::sync::Arc;

use indexmap::IndexMap;

use crate::validation::rule::Rule;
use crate::validation::validator::Validator;
use crate::validation::value::FieldValue;

/// A type whose instances can be validated.
///
/// `rules` declares the type's validators once; the result is cached per type.
/// `field` exposes a property's current value by name.
///
/// ```rust
/// use fanlog::validation::{FieldValue, RuleSet, Validate};
///
/// struct Customer {
///     name: Option<String>,
/// }
///
/// impl Validate for Customer {
///     fn rules(rules: &mut RuleSet) {
///         rules.property("Name").required().length(2, 5);
///     }
///
///     fn field(&self, name: &str) -> Option<FieldValue<'_>> {
///         match name {
///             "Name" => Some(self.name.as_deref().into()),
///             _ => None,
///         }
///     }
/// }
/// ```
pub trait Validate: 'static {
    fn rules(rules: &mut RuleSet);

    /// `None` for a name the type does not have.
    fn field(&self, name: &str) -> Option<FieldValue<'_>>;
}

/// Property name to its validators, sorted by sequence.
pub type ValidatorTable = IndexMap<String, Vec<Validator>>;

/// Collects validator declarations for one type.
#[derive(Debug, Default)]
pub struct RuleSet {
    validators: Vec<Validator>,
}

impl RuleSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts declaring rules for `name`.
    pub fn property(&mut self, name: &str) -> PropertyRules<'_> {
        PropertyRules {
            set: self,
            property: name.to_string(),
        }
    }

    pub fn add(&mut self, validator: Validator) -> &mut Self {
        self.validators.push(validator);
        self
    }

    /// Groups by property in first-seen order, then stable-sorts each group
    /// by sequence so ties keep declaration order.
    #[must_use]
    pub fn into_table(self) -> ValidatorTable {
        let mut table = ValidatorTable::new();
        for v in self.validators {
            table.entry(v.property().to_string()).or_default().push(v);
        }
        for list in table.values_mut() {
            list.sort_by_key(Validator::order);
        }
        table
    }
}

/// Builder returned by [`RuleSet::property`].
pub struct PropertyRules<'a> {
    set: &'a mut RuleSet,
    property: String,
}

impl PropertyRules<'_> {
    pub fn required(self) -> Self {
        self.rule(Rule::Required)
    }

    pub fn length(self, min: usize, max: usize) -> Self {
        self.rule(Rule::Length { min, max })
    }

    pub fn custom<F>(self, predicate: F) -> Self
    where
        F: Fn(&FieldValue<'_>) -> bool + Send + Sync + 'static,
    {
        self.rule(Rule::Custom(Arc::new(predicate)))
    }

    pub fn rule(self, rule: Rule) -> Self {
        let v = Validator::new(self.property.clone(), rule);
        self.with(|_| v)
    }

    /// Adds a fully configured validator, e.g. with a message or sequence.
    /// `build` receives the property name.
    pub fn with(self, build: impl FnOnce(&str) -> Validator) -> Self {
        let v = build(&self.property);
        self.set.validators.push(v);
        self
    }
}
