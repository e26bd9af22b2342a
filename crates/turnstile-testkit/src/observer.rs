//! Recording observer for asserting on issuance outcomes.

use parking_lot::Mutex;
use turnstile_core::{IssuanceFailure, IssuanceObserver, TicketId};

/// Captures every observer event for later assertions.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    issued: Mutex<Vec<TicketId>>,
    failures: Mutex<Vec<IssuanceFailure>>,
}

impl RecordingObserver {
    /// Empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Tickets reported as issued, in order.
    pub fn issued(&self) -> Vec<TicketId> {
        self.issued.lock().clone()
    }

    /// Failure events, in order.
    pub fn failures(&self) -> Vec<IssuanceFailure> {
        self.failures.lock().clone()
    }
}

impl IssuanceObserver for RecordingObserver {
    fn ticket_issued(&self, ticket_id: &TicketId) {
        self.issued.lock().push(ticket_id.clone());
    }

    fn issuance_failed(&self, failure: &IssuanceFailure) {
        self.failures.lock().push(failure.clone());
    }
}
