//! Client-side session state.
//!
//! DESIGN
//! ======
//! State is split by flow (`upload`, `ask`, `challenge`) so each owns a small
//! focused model. `document` is the only shared piece and is reached through
//! capability handles handed out by `session`.

pub mod ask;
pub mod challenge;
pub mod document;
pub mod error;
pub mod in_flight;
pub mod session;
pub mod upload;

#[cfg(test)]
pub(crate) mod test_helpers;
