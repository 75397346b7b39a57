//! Session use-case services.
//!
//! # Responsibility
//! - Orchestrate storage, auth, push and location ports into session
//!   operations.
//! - Keep UI/FFI layers decoupled from storage and device SDK details.

pub mod score;
pub mod session_service;
