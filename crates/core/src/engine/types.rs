//! Core queue data types.

use std::collections::VecDeque;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Ticket numbers are plain sequential integers, human-readable on displays.
pub type TicketId = u32;

/// Current status of a ticket.
///
/// Status flow:
/// ```text
/// one-stage:  Waiting ----------------------------------------> Serving
/// two-stage:  Waiting -> ReadyForAssignment -> Assigned -------> Serving
/// ```
///
/// There is no terminal "done" status: a ticket stays `Serving` until the
/// whole queue is reset.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    /// Issued, sitting in the general waiting pool.
    Waiting,
    /// Called out for room assignment (two-stage only, at most one at a time).
    ReadyForAssignment,
    /// Routed to a room, queued there.
    Assigned,
    /// Being served at the counter or in a room.
    Serving,
}

impl TicketStatus {
    /// Returns the status as a string (for filtering and metric labels).
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Waiting => "waiting",
            TicketStatus::ReadyForAssignment => "ready_for_assignment",
            TicketStatus::Assigned => "assigned",
            TicketStatus::Serving => "serving",
        }
    }

    /// Position along the lifecycle, used to assert forward-only movement.
    pub fn rank(&self) -> u8 {
        match self {
            TicketStatus::Waiting => 0,
            TicketStatus::ReadyForAssignment => 1,
            TicketStatus::Assigned => 2,
            TicketStatus::Serving => 3,
        }
    }

    pub const ALL: [TicketStatus; 4] = [
        TicketStatus::Waiting,
        TicketStatus::ReadyForAssignment,
        TicketStatus::Assigned,
        TicketStatus::Serving,
    ];
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A visitor's place in line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Ticket {
    /// Unique sequential number, assigned at issuance, never reused.
    pub id: TicketId,
    /// Current status.
    pub status: TicketStatus,
    /// When the ticket was issued. Display/diagnostics only.
    pub issued_at: DateTime<Utc>,
}

impl Ticket {
    pub fn new(id: TicketId) -> Self {
        Self {
            id,
            status: TicketStatus::Waiting,
            issued_at: Utc::now(),
        }
    }
}

/// Static identity of a room, supplied by configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoomDefinition {
    /// Stable identifier used in API paths.
    pub id: String,
    /// Display name.
    pub name: String,
}

impl RoomDefinition {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// A named service point with its own FIFO sub-queue and serving slot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Room {
    pub id: String,
    pub name: String,
    /// Ticket ids waiting for this room, oldest assignment first.
    pub queue: VecDeque<TicketId>,
    /// At most one ticket currently being served here.
    pub currently_serving: Option<TicketId>,
}

impl Room {
    /// A fresh room with an empty queue and nobody serving.
    pub fn from_definition(def: &RoomDefinition) -> Self {
        Self {
            id: def.id.clone(),
            name: def.name.clone(),
            queue: VecDeque::new(),
            currently_serving: None,
        }
    }
}

/// Global operating mode of the queue.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum QueueMode {
    /// Single queue, single "now serving" slot.
    #[default]
    OneStage,
    /// Visitors are first called generically, then routed to a room queue.
    TwoStage,
}

impl QueueMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueueMode::OneStage => "one_stage",
            QueueMode::TwoStage => "two_stage",
        }
    }
}

impl fmt::Display for QueueMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why an action left the state unchanged.
///
/// Rejections are diagnostics, not failures: a rejected action is
/// observationally a no-op and the aggregate is never left half-updated.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Rejection {
    #[error("no tickets waiting")]
    NothingWaiting,

    #[error("ticket {0} is already called for assignment")]
    AssignmentPending(TicketId),

    #[error("ticket not found: {0}")]
    UnknownTicket(TicketId),

    #[error("ticket {id} is {status}, expected ready_for_assignment")]
    TicketNotReady { id: TicketId, status: TicketStatus },

    #[error("room not found: {0}")]
    UnknownRoom(String),

    #[error("no tickets queued for room {0}")]
    RoomQueueEmpty(String),
}

impl Rejection {
    /// Short machine-readable reason (for metric labels).
    pub fn reason(&self) -> &'static str {
        match self {
            Rejection::NothingWaiting => "nothing_waiting",
            Rejection::AssignmentPending(_) => "assignment_pending",
            Rejection::UnknownTicket(_) => "unknown_ticket",
            Rejection::TicketNotReady { .. } => "ticket_not_ready",
            Rejection::UnknownRoom(_) => "unknown_room",
            Rejection::RoomQueueEmpty(_) => "room_queue_empty",
        }
    }

    /// True when the rejection refers to an id the caller got wrong, as
    /// opposed to a precondition on current queue state.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Rejection::UnknownTicket(_) | Rejection::UnknownRoom(_))
    }
}
