//! In-memory ticket store with a manual clock.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use time::{Duration, OffsetDateTime};
use turnstile_core::{Result, Ticket, TicketId, TicketKind, TicketStore, TurnstileError};
use uuid::Uuid;

/// Clock start for deterministic tests: 2025-01-01 00:00:00 UTC.
const TEST_EPOCH: i64 = 1_735_689_600;

struct StoreState {
    tickets: HashMap<TicketId, Ticket>,
    now: OffsetDateTime,
}

/// Map-backed [`TicketStore`] enforcing the parent-validity invariant.
///
/// A service ticket can only be created against a live granting ticket, and
/// its expiry is capped at the parent's, so it can never outlive the
/// granting ticket that spawned it. Expired tickets behave as not found.
pub struct InMemoryTicketStore {
    state: RwLock<StoreState>,
    granting_lifetime: Duration,
    service_lifetime: Duration,
}

impl InMemoryTicketStore {
    /// Store with 8-hour granting and 10-second service lifetimes.
    pub fn new() -> Self {
        Self::with_lifetimes(Duration::hours(8), Duration::seconds(10))
    }

    /// Store with explicit lifetimes.
    pub fn with_lifetimes(granting: Duration, service: Duration) -> Self {
        // Clock start must be representable; the constant is.
        #[allow(clippy::expect_used)]
        let now = OffsetDateTime::from_unix_timestamp(TEST_EPOCH).expect("valid test epoch");
        Self {
            state: RwLock::new(StoreState {
                tickets: HashMap::new(),
                now,
            }),
            granting_lifetime: granting,
            service_lifetime: service,
        }
    }

    /// Advance the store clock.
    pub fn advance(&self, by: Duration) {
        self.state.write().now += by;
    }

    /// Current store time.
    pub fn now(&self) -> OffsetDateTime {
        self.state.read().now
    }

    /// Number of tickets held, expired ones included.
    pub fn len(&self) -> usize {
        self.state.read().tickets.len()
    }

    /// Whether the store holds no tickets at all.
    pub fn is_empty(&self) -> bool {
        self.state.read().tickets.is_empty()
    }
}

impl Default for InMemoryTicketStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TicketStore for InMemoryTicketStore {
    async fn create(&self, kind: TicketKind, parent: Option<&TicketId>) -> Result<Ticket> {
        let mut state = self.state.write();
        let now = state.now;

        let (prefix, lifetime, expiry_cap) = match kind {
            TicketKind::Granting => {
                if parent.is_some() {
                    return Err(TurnstileError::ticket_unavailable(
                        "granting tickets cannot have a parent",
                    ));
                }
                ("TGT", self.granting_lifetime, None)
            }
            TicketKind::Service => {
                let parent_id = parent.ok_or_else(|| {
                    TurnstileError::ticket_unavailable(
                        "service tickets require a granting parent",
                    )
                })?;
                let parent_ticket = state.tickets.get(parent_id).ok_or_else(|| {
                    TurnstileError::ticket_unavailable(format!(
                        "granting ticket {parent_id} not found"
                    ))
                })?;
                if parent_ticket.kind != TicketKind::Granting {
                    return Err(TurnstileError::ticket_unavailable(format!(
                        "parent ticket {parent_id} is not a granting ticket"
                    )));
                }
                if parent_ticket.is_expired(now) {
                    return Err(TurnstileError::ticket_unavailable(format!(
                        "granting ticket {parent_id} has expired"
                    )));
                }
                ("ST", self.service_lifetime, Some(parent_ticket.expires_at))
            }
        };

        let mut expires_at = now + lifetime;
        if let Some(cap) = expiry_cap {
            // Service ticket lifetime is bounded by its parent's window.
            expires_at = expires_at.min(cap);
        }

        let ticket = Ticket {
            id: TicketId::new(format!("{prefix}-{}", Uuid::new_v4())),
            kind,
            parent: parent.cloned(),
            issued_at: now,
            expires_at,
        };
        state.tickets.insert(ticket.id.clone(), ticket.clone());
        Ok(ticket)
    }

    async fn find(&self, id: &TicketId) -> Result<Ticket> {
        let state = self.state.read();
        let ticket = state
            .tickets
            .get(id)
            .ok_or_else(|| TurnstileError::ticket_unavailable(format!("ticket {id} not found")))?;
        if ticket.is_expired(state.now) {
            return Err(TurnstileError::ticket_unavailable(format!(
                "ticket {id} has expired"
            )));
        }
        Ok(ticket.clone())
    }

    async fn invalidate(&self, id: &TicketId) -> Result<()> {
        self.state.write().tickets.remove(id);
        Ok(())
    }
}
