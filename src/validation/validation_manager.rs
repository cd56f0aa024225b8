use indexmap::IndexMap;

use crate::validation::rule_set::Validate;
use crate::validation::validator::Validator;
use crate::validation::validator_cache::ValidatorCache;
use crate::validation::value::FieldValue;

/// Validates one instance against its type's cached rules.
///
/// Short-lived: create one per object to check, call
/// [`is_valid`](Self::is_valid) or [`is_property_valid`](Self::is_property_valid),
/// then read [`errors`](Self::errors). Failures are recorded, never returned
/// as `Err`.
pub struct ValidationManager<'a, T: Validate> {
    target: &'a T,
    cache: &'a ValidatorCache,
    errors: IndexMap<String, String>,
}

impl<'a, T: Validate> ValidationManager<'a, T> {
    /// A manager reading rules from [`ValidatorCache::global`].
    #[must_use]
    pub fn new(target: &'a T) -> Self {
        Self::with_cache(target, ValidatorCache::global())
    }

    #[must_use]
    pub fn with_cache(target: &'a T, cache: &'a ValidatorCache) -> Self {
        Self {
            target,
            cache,
            errors: IndexMap::new(),
        }
    }

    /// Re-checks one property, replacing any error previously recorded for it.
    ///
    /// Validators run in sequence order and stop at the first failure. A
    /// property with no validators is valid.
    pub fn is_property_valid(&mut self, property: &str) -> bool {
        self.errors.shift_remove(property);
        let table = self.cache.table::<T>();
        if let Some(validators) = table.get(property) {
            self.run(property, validators);
        }
        !self.errors.contains_key(property)
    }

    /// Clears all errors and checks every property with validators.
    pub fn is_valid(&mut self) -> bool {
        self.errors.clear();
        let table = self.cache.table::<T>();
        for (property, validators) in table.iter() {
            self.run(property, validators);
        }
        self.errors.is_empty()
    }

    /// Property name to the message of its first failing validator.
    #[must_use]
    pub fn errors(&self) -> &IndexMap<String, String> {
        &self.errors
    }

    #[must_use]
    pub fn error(&self, property: &str) -> Option<&str> {
        self.errors.get(property).map(String::as_str)
    }

    #[must_use]
    pub fn target(&self) -> &'a T {
        self.target
    }

    fn run(&mut self, property: &str, validators: &[Validator]) {
        // Unknown names read as null, so `required` still reports them.
        let value = self.target.field(property).unwrap_or(FieldValue::Null);
        if let Some(failed) = validators.iter().find(|v| !v.validate(&value)) {
            self.errors
                .insert(property.to_string(), failed.error_message().to_string());
        }
    }
}
