//! Networking modules for the document backend.
//!
//! SYSTEM CONTEXT
//! ==============
//! `api` defines the [`api::Backend`] seam plus its HTTP implementation, and
//! `types` defines the shared wire schema.

pub mod api;
pub mod types;
