//! Database module: rule lookups behind a single actor.
//!
//! Layout:
//! - `models.rs`: Rust structs mirroring DB rows
//! - `schema.rs`: SQL DDL for initializing the database (SQLite-first)
//! - `store.rs`: the `RuleStore` seam used by the sync engines

pub mod actor;
pub mod models;
pub mod schema;
pub mod store;

pub use models::{DbHealth, HabitRule, ProjectRule, TextRule};
pub use schema::SQLITE_INIT;
pub use store::RuleStore;

pub use actor::{DbActorHandle, spawn};
