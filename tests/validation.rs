use std::thread;

use fanlog::validation::{FieldValue, Rule, RuleSet, Validate, ValidationManager, Validator, ValidatorCache};

struct Customer {
    name: Option<String>,
    email: Option<String>,
    orders: Vec<u32>,
}

impl Validate for Customer {
    fn rules(rules: &mut RuleSet) {
        rules.property("Name").required().length(2, 5);
        rules
            .property("Email")
            .with(|p| Validator::new(p, Rule::Required).message("An email address is needed"))
            .custom(|v| matches!(v, FieldValue::Text(s) if s.contains('@')));
        rules.property("Orders").length(1, 3);
    }

    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "Name" => Some(self.name.as_deref().into()),
            "Email" => Some(self.email.as_deref().into()),
            "Orders" => Some(FieldValue::from_slice(&self.orders)),
            _ => None,
        }
    }
}

fn customer(name: Option<&str>, email: Option<&str>, orders: usize) -> Customer {
    Customer {
        name: name.map(str::to_string),
        email: email.map(str::to_string),
        orders: (0..orders as u32).collect(),
    }
}

#[test]
fn whole_object_validation_through_the_global_cache() {
    let ok = customer(Some("Ann"), Some("ann@example.com"), 2);
    let mut m = ValidationManager::new(&ok);
    assert!(m.is_valid());
    assert!(m.errors().is_empty());

    let bad = customer(Some("Annabel"), None, 0);
    let mut m = ValidationManager::new(&bad);
    assert!(!m.is_valid());
    assert_eq!(m.error("Name"), Some("Name must be between 2 and 5 long."));
    assert_eq!(m.error("Email"), Some("An email address is needed"));
    assert_eq!(m.error("Orders"), Some("Orders must be between 1 and 3 long."));
    assert_eq!(m.errors().len(), 3);
}

#[test]
fn fixing_a_property_clears_only_its_error() {
    let mut c = customer(Some("A"), Some("nobody"), 1);
    {
        let mut m = ValidationManager::new(&c);
        assert!(!m.is_valid());
        assert_eq!(m.errors().len(), 2);
        assert_eq!(m.error("Email"), Some("Email is invalid."));
    }
    c.name = Some("Al".into());
    let mut m = ValidationManager::new(&c);
    assert!(m.is_property_valid("Name"));
    assert!(!m.is_property_valid("Email"));
    assert_eq!(m.errors().keys().collect::<Vec<_>>(), vec!["Email"]);
}

#[test]
fn concurrent_first_use_yields_one_table() {
    let cache = ValidatorCache::new();
    let tables: Vec<_> = thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|_| s.spawn(|| cache.table::<Customer>()))
            .collect();
        handles.into_iter().map(|h| h.join().expect("join")).collect()
    });
    assert!(tables.windows(2).all(|w| std::sync::Arc::ptr_eq(&w[0], &w[1])));
    assert_eq!(cache.len(), 1);
}
