//! Rule registry: the operator-facing list of offers and its edit form.

pub mod controller;

pub use controller::RuleRegistry;
