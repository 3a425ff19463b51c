//! Owned, serializable view of the queue for displays and the API.
//!
//! Snapshots are copies: handing one out never exposes the live aggregate to
//! mutation. Derived lists are recomputed from the canonical maps at capture
//! time rather than maintained as separate mutable state.

use serde::{Deserialize, Serialize};

use super::state::EngineState;
use super::types::{QueueMode, Ticket, TicketId, TicketStatus};

/// A room as seen by displays: roster identity plus live queue contents.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoomView {
    pub id: String,
    pub name: String,
    /// Oldest assignment first.
    pub queue: Vec<TicketId>,
    pub currently_serving: Option<TicketId>,
}

/// Consistent point-in-time view of the whole queue.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueueSnapshot {
    pub mode: QueueMode,
    pub next_ticket_number: TicketId,
    pub one_stage_serving: Option<TicketId>,
    /// All live tickets, ascending id.
    pub tickets: Vec<Ticket>,
    /// Rooms in roster (configuration) order.
    pub rooms: Vec<RoomView>,
    /// Derived: waiting tickets, ascending id.
    pub waiting: Vec<Ticket>,
    /// Derived: the one ticket called for assignment, if any.
    pub ready_for_assignment: Option<Ticket>,
}

impl QueueSnapshot {
    pub(super) fn capture(state: &EngineState) -> Self {
        let rooms = state
            .definitions()
            .iter()
            .filter_map(|def| state.rooms.get(&def.id))
            .map(|room| RoomView {
                id: room.id.clone(),
                name: room.name.clone(),
                queue: room.queue.iter().copied().collect(),
                currently_serving: room.currently_serving,
            })
            .collect();

        Self {
            mode: state.mode,
            next_ticket_number: state.next_ticket_number,
            one_stage_serving: state.one_stage_serving,
            tickets: state.tickets.values().cloned().collect(),
            rooms,
            waiting: state.waiting_tickets().into_iter().cloned().collect(),
            ready_for_assignment: state.ticket_ready_for_assignment().cloned(),
        }
    }

    /// Look up a single ticket by id.
    pub fn ticket(&self, id: TicketId) -> Option<&Ticket> {
        self.tickets.iter().find(|t| t.id == id)
    }

    /// Number of tickets currently in the given status.
    pub fn count_by_status(&self, status: TicketStatus) -> usize {
        self.tickets.iter().filter(|t| t.status == status).count()
    }
}
