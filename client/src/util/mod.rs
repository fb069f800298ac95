//! Utility helpers shared across the session model.
//!
//! SYSTEM CONTEXT
//! ==============
//! Utility modules isolate environment concerns (durable storage, platform
//! theme signals) from flow logic.

pub mod preferences;
pub mod theme;
