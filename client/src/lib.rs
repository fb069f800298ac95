//! # client
//!
//! Session and interaction model for the document assistant.
//!
//! A [`state::session::Session`] owns the document context and the three
//! interaction flows (upload, ask, challenge). Flows reach the backend only
//! through [`net::api::Backend`], so every state transition can be exercised
//! without a network. Rendering lives in the `docassist` binary.

pub mod net;
pub mod state;
pub mod util;
