//! Person domain model.
//!
//! # Responsibility
//! - Define the stored person record and its create/patch inputs.
//! - Provide the advisory email heuristic.
//!
//! # Invariants
//! - `id` is assigned by the store at creation and never changes.
//! - `name` and `email` are present on every created record.
//! - Email validation is advisory; nothing in core rejects a record for it.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Store-assigned identifier of a person record.
pub type PersonId = Uuid;

/// Maximum email length accepted by the advisory check.
pub const EMAIL_MAX_CHARS: usize = 254;

/// One stored person.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Person {
    pub id: PersonId,
    pub name: String,
    pub email: String,
    pub age: Option<i64>,
    pub address: Option<String>,
}

impl Person {
    pub(crate) fn from_body(id: PersonId, body: PersonBody) -> Self {
        Self {
            id,
            name: body.name,
            email: body.email,
            age: body.age,
            address: body.address,
        }
    }
}

/// Stored document shape; the key lives outside the body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct PersonBody {
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// Input for creating a person.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewPerson {
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl NewPerson {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            age: None,
            address: None,
        }
    }

    pub fn with_age(mut self, age: i64) -> Self {
        self.age = Some(age);
        self
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }
}

/// Partial update: only `Some` fields are written, the rest keep their value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub age: Option<i64>,
    pub address: Option<String>,
}

impl PersonPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.age.is_none() && self.address.is_none()
    }

    /// Field/value pairs to `$set`, in a stable order.
    pub(crate) fn assignments(&self) -> Vec<(&'static str, Value)> {
        let mut set = Vec::new();
        if let Some(name) = &self.name {
            set.push(("name", Value::from(name.as_str())));
        }
        if let Some(email) = &self.email {
            set.push(("email", Value::from(email.as_str())));
        }
        if let Some(age) = self.age {
            set.push(("age", Value::from(age)));
        }
        if let Some(address) = &self.address {
            set.push(("address", Value::from(address.as_str())));
        }
        set
    }
}

/// Superficial email check: contains `@` and `.` and is at most 254 chars.
///
/// Not RFC-compliant; callers warn on `false` but proceed.
pub fn is_valid_email(email: &str) -> bool {
    email.contains('@') && email.contains('.') && email.chars().count() <= EMAIL_MAX_CHARS
}

/// Parses a store key; `None` for anything that is not one.
pub fn parse_person_id(value: &str) -> Option<PersonId> {
    Uuid::parse_str(value.trim()).ok()
}
