//! In-memory queue engine for a service counter.
//!
//! The engine owns the whole aggregate behind one lock and exposes only
//! action methods and snapshot queries. Every action reads current state,
//! validates its preconditions, and installs the next state as one
//! indivisible step; invalid invocations are rejected without side effects.

mod snapshot;
mod state;
mod types;

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, info, warn};

pub use snapshot::{QueueSnapshot, RoomView};
pub use state::EngineState;
pub use types::{
    QueueMode, Rejection, Room, RoomDefinition, Ticket, TicketId, TicketStatus,
};

/// Thread-safe facade over [`EngineState`].
///
/// Actions serialize through the write lock; queries take the read lock and
/// return owned data, so callers can never mutate the aggregate directly.
pub struct QueueEngine {
    state: RwLock<EngineState>,
}

impl QueueEngine {
    /// Build an engine with a fixed room roster and ticket number base.
    ///
    /// The roster is immutable for the engine's lifetime; resets rebuild
    /// rooms from it rather than dropping them.
    pub fn new(ticket_number_base: TicketId, rooms: Vec<RoomDefinition>) -> Self {
        info!(
            base = ticket_number_base,
            rooms = rooms.len(),
            "queue engine initialized"
        );
        Self {
            state: RwLock::new(EngineState::new(ticket_number_base, rooms)),
        }
    }

    /// Issue a new ticket. Always succeeds; no caller identity is recorded.
    pub fn take_ticket(&self) -> TicketId {
        let id = self.write().take_ticket();
        info!(ticket = id, "ticket issued");
        id
    }

    /// Switch the operating mode. Idempotent; existing tickets are left
    /// untouched, even ones mid-flow. The mode only decides which staff
    /// controls are meaningful, not which transitions are legal, so a ticket
    /// orphaned by a switch can still be routed forward.
    pub fn set_mode(&self, mode: QueueMode) {
        self.write().set_mode(mode);
        info!(%mode, "queue mode set");
    }

    /// One-stage flow: call the lowest-numbered waiting ticket.
    pub fn call_next_one_stage(&self) -> Result<TicketId, Rejection> {
        let result = self.write().call_next_one_stage();
        match &result {
            Ok(id) => info!(ticket = id, "now serving (one-stage)"),
            Err(rejection) => debug!(%rejection, "call next rejected"),
        }
        result
    }

    /// Two-stage flow, stage one: call a waiting ticket out for assignment.
    pub fn call_next_for_assignment(&self) -> Result<TicketId, Rejection> {
        let result = self.write().call_next_for_assignment();
        match &result {
            Ok(id) => info!(ticket = id, "called for assignment"),
            Err(rejection) => debug!(%rejection, "call for assignment rejected"),
        }
        result
    }

    /// Two-stage flow: route the called ticket to a room's queue.
    pub fn assign_ticket_to_room(
        &self,
        ticket_id: TicketId,
        room_id: &str,
    ) -> Result<(), Rejection> {
        let result = self.write().assign_ticket_to_room(ticket_id, room_id);
        match &result {
            Ok(()) => info!(ticket = ticket_id, room = room_id, "ticket assigned"),
            Err(rejection) => debug!(%rejection, "assignment rejected"),
        }
        result
    }

    /// Two-stage flow, stage two: serve the oldest assignment in a room.
    pub fn call_next_in_room(&self, room_id: &str) -> Result<TicketId, Rejection> {
        let result = self.write().call_next_in_room(room_id);
        match &result {
            Ok(id) => info!(ticket = id, room = room_id, "now serving in room"),
            Err(rejection) => debug!(%rejection, "call next in room rejected"),
        }
        result
    }

    /// Full destructive reset. Confirmation, if any, is the caller's job.
    pub fn reset_queue(&self) {
        let mut state = self.write();
        let discarded = state.tickets.len();
        state.reset();
        warn!(discarded, "queue reset");
    }

    /// Consistent point-in-time copy of the whole queue.
    pub fn snapshot(&self) -> QueueSnapshot {
        QueueSnapshot::capture(&self.read())
    }

    /// Current mode without copying the full snapshot.
    pub fn mode(&self) -> QueueMode {
        self.read().mode
    }

    /// Single-ticket lookup for visitors re-checking their number.
    pub fn ticket(&self, id: TicketId) -> Option<Ticket> {
        self.read().tickets.get(&id).cloned()
    }

    // Transitions never panic while holding the lock, so a poisoned lock can
    // only mean a panic in a reader; the data is still consistent.
    fn write(&self) -> RwLockWriteGuard<'_, EngineState> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }

    fn read(&self) -> RwLockReadGuard<'_, EngineState> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }
}
