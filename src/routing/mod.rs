//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (host, target)
//!     → classifier.rs (domain gate)
//!     → rules.rs (ordered rule chain, first match wins)
//!     → Return: Upstream (Primary | Default) + diagnostic reason
//! ```
//!
//! # Design Decisions
//! - Rule chain built at startup, immutable at runtime
//! - Deterministic: same input always yields the same decision and status
//! - No error path: malformed input simply matches nothing

pub mod classifier;
pub mod rules;

pub use classifier::{Classification, Classifier, Reason, Upstream};
pub use rules::{Condition, NamedRule, Rule, RuleChain};
