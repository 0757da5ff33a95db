//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate document-store query details from the command layer.
//!
//! # Invariants
//! - Repository APIs return typed results; presentation is the caller's job.
//! - Unknown and unparseable identifiers are indistinguishable to callers.

pub mod person_repo;
