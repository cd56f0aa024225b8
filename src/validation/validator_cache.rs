use std::any::{TypeId, type_name};
use std::sync::{Arc, OnceLock};

use dashmap::DashMap;

use crate::validation::rule_set::{RuleSet, Validate, ValidatorTable};
use crate::validation::validator::Validator;

/// Per-type validator tables, built on first use.
///
/// Two threads racing on the same type may both build a table; the first
/// insert wins and the other copy is discarded. Tables are immutable once
/// stored, so readers hold an `Arc` without any lock.
#[derive(Default)]
pub struct ValidatorCache {
    tables: DashMap<TypeId, Arc<ValidatorTable>>,
}

static GLOBAL: OnceLock<ValidatorCache> = OnceLock::new();

impl ValidatorCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide cache used by [`ValidationManager::new`](crate::validation::ValidationManager::new).
    pub fn global() -> &'static ValidatorCache {
        GLOBAL.get_or_init(ValidatorCache::new)
    }

    /// The table for `T`, declaring and caching it if needed.
    pub fn table<T: Validate>(&self) -> Arc<ValidatorTable> {
        let id = TypeId::of::<T>();
        if let Some(t) = self.tables.get(&id) {
            return Arc::clone(&t);
        }
        let built = Arc::new(build::<T>());
        Arc::clone(self.tables.entry(id).or_insert(built).value())
    }

    /// Appends `validator` to `T`'s table.
    ///
    /// The table is replaced by an updated copy, so managers already holding
    /// the old one are unaffected.
    pub fn add_validator<T: Validate>(&self, validator: Validator) {
        let id = TypeId::of::<T>();
        let mut entry = self
            .tables
            .entry(id)
            .or_insert_with(|| Arc::new(build::<T>()));

        let mut table = ValidatorTable::clone(&entry);
        let list = table.entry(validator.property().to_string()).or_default();
        list.push(validator);
        list.sort_by_key(Validator::order);
        *entry = Arc::new(table);
    }

    /// Number of types with a cached table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

fn build<T: Validate>() -> ValidatorTable {
    let mut rules = RuleSet::new();
    T::rules(&mut rules);
    let table = rules.into_table();
    tracing::trace!(
        target_type = type_name::<T>(),
        properties = table.len(),
        "validator table built"
    );
    table
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;
    use crate::validation::rule::Rule;
    use crate::validation::value::FieldValue;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static BUILDS: AtomicUsize = AtomicUsize::new(0);

    struct Counted;

    impl Validate for Counted {
        fn rules(rules: &mut RuleSet) {
            BUILDS.fetch_add(1, Ordering::SeqCst);
            rules.property("A").required();
        }

        fn field(&self, _name: &str) -> Option<FieldValue<'_>> {
            None
        }
    }

    #[test]
    fn table_is_built_once_per_cache() {
        let cache = ValidatorCache::new();
        let first = cache.table::<Counted>();
        let second = cache.table::<Counted>();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(BUILDS.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn add_validator_copies_on_write() {
        struct Plain;
        impl Validate for Plain {
            fn rules(rules: &mut RuleSet) {
                rules.property("A").required();
            }
            fn field(&self, _name: &str) -> Option<FieldValue<'_>> {
                None
            }
        }

        let cache = ValidatorCache::new();
        let before = cache.table::<Plain>();
        cache.add_validator::<Plain>(Validator::new("A", Rule::Length { min: 1, max: 2 }).sequence(-1));
        cache.add_validator::<Plain>(Validator::new("B", Rule::Required));
        let after = cache.table::<Plain>();

        assert_eq!(before["A"].len(), 1);
        assert_eq!(after["A"].len(), 2);
        assert!(matches!(after["A"][0].rule(), Rule::Length { .. }));
        assert_eq!(after["B"].len(), 1);
    }
}
