//! Declarative property validation.
//!
//! A type implements [`Validate`] to declare its rules once and to expose its
//! property values by name. [`ValidationManager`] evaluates an instance
//! against the cached rules and collects one message per failing property.

pub mod rule;
pub mod rule_set;
pub mod validation_manager;
pub mod validator;
pub mod validator_cache;
pub mod value;

pub use rule::{Predicate, Rule};
pub use rule_set::{PropertyRules, RuleSet, Validate, ValidatorTable};
pub use validation_manager::ValidationManager;
pub use validator::Validator;
pub use validator_cache::ValidatorCache;
pub use value::{FieldValue, ValueKind};
