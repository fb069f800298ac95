//! Per-flow busy flag with invalidation.
//!
//! Each flow allows one outstanding backend call. `begin` hands out a
//! [`Ticket`]; `finish` accepts only the ticket that is still current, so a
//! reset or clear issued while a call is pending turns its late completion
//! into a no-op.

#[cfg(test)]
#[path = "in_flight_test.rs"]
mod in_flight_test;

use super::error::{Flow, FlowError};

/// Identifies one issued request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

/// Whether a completion was applied to flow state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    /// The request was invalidated by a reset before it completed.
    Stale,
}

#[derive(Debug)]
pub(crate) struct InFlight {
    flow: Flow,
    current: Option<u64>,
    issued: u64,
}

impl InFlight {
    pub(crate) fn new(flow: Flow) -> Self {
        Self { flow, current: None, issued: 0 }
    }

    pub(crate) fn is_busy(&self) -> bool {
        self.current.is_some()
    }

    /// Fail with [`FlowError::Busy`] if a request is outstanding.
    pub(crate) fn ensure_idle(&self) -> Result<(), FlowError> {
        if self.is_busy() {
            tracing::debug!(flow = %self.flow, "rejecting overlapping request");
            return Err(FlowError::Busy { flow: self.flow });
        }
        Ok(())
    }

    pub(crate) fn begin(&mut self) -> Result<Ticket, FlowError> {
        self.ensure_idle()?;
        self.issued += 1;
        self.current = Some(self.issued);
        Ok(Ticket(self.issued))
    }

    /// Clear the busy flag if `ticket` is current. Returns `false` for stale tickets.
    pub(crate) fn finish(&mut self, ticket: Ticket) -> bool {
        if self.current == Some(ticket.0) {
            self.current = None;
            true
        } else {
            tracing::debug!(flow = %self.flow, ticket = ticket.0, "ignoring stale completion");
            false
        }
    }

    pub(crate) fn invalidate(&mut self) {
        self.current = None;
    }
}
