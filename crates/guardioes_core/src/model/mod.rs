//! Session domain model.
//!
//! # Responsibility
//! - Define user, household and session shapes shared by the store and FFI.
//! - Keep the persisted JSON shapes compatible with earlier app releases.
//!
//! # Invariants
//! - The selected entity is a household or the individual user, never both.
//! - Unknown profile fields received from the API round-trip unchanged.

pub mod profile;
pub mod session;
