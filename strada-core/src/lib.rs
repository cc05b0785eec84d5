//! Core types and engines for the strada street-cleaning assistant.

/// Immutable dataset generations and their atomic publication.
pub mod catalog;
/// Manual exclusion rules for bad dataset entries.
pub mod exclusion;
/// Great-circle distance and bearing primitives.
pub mod geo;
/// Street lookup by name.
pub mod lookup;
/// Domain models shared by all crates.
pub mod model;
/// Traits describing dataset sources.
pub mod ports;
/// Point-to-street distances and ranking.
pub mod proximity;
/// Next-occurrence computation for cleaning rules.
pub mod recurrence;
/// Reminder urgency and favorites alerts.
pub mod reminder;
/// High-level service facade used by clients.
pub mod service;

pub use catalog::*;
pub use exclusion::*;
pub use lookup::*;
pub use model::*;
pub use ports::*;
pub use proximity::*;
pub use reminder::*;
pub use service::*;
