//! Domain model for person records.
//!
//! # Responsibility
//! - Define the canonical record and its typed create/update inputs.
//!
//! # Invariants
//! - Every record is identified by a store-assigned `PersonId`.
//! - Deletion is a hard delete; there are no tombstones.

pub mod person;
