//! Identifier source
//!
//! Fresh string identifiers for [`insert`](crate::Database::insert).
//! Random v4 uuids in hyphen-free form, treated as collision-free.

use uuid::Uuid;

/// Generate a fresh identifier (32 lowercase hex characters)
pub fn generate() -> String {
    Uuid::new_v4().simple().to_string()
}
