// =============================================================================
// Signals Module
// =============================================================================
//
// Bounce-signal rules:
// - Per-bar conditions, each evaluated independently over the annotated table
// - Named policies, each a fixed AND of a subset of those conditions
//
// Undefined indicator values never satisfy a condition.

pub mod conditions;
pub mod policy;

pub use conditions::{evaluate_all, Condition};
pub use policy::BouncePolicy;
