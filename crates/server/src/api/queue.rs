//! Queue API handlers.
//!
//! Thin wrappers over the engine: validate nothing themselves, translate
//! engine rejections into HTTP statuses (unknown ids -> 404, unmet
//! preconditions -> 409) and keep the action metrics.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use lobbyline_core::{QueueMode, QueueSnapshot, Rejection, Ticket, TicketId, TicketStatus};

use crate::metrics::{QUEUE_ACTIONS_TOTAL, QUEUE_RESETS_TOTAL, TICKETS_ISSUED_TOTAL};
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// A single ticket as returned by the API
#[derive(Debug, Serialize)]
pub struct TicketResponse {
    pub id: TicketId,
    pub status: TicketStatus,
    pub issued_at: String,
}

impl From<Ticket> for TicketResponse {
    fn from(ticket: Ticket) -> Self {
        Self {
            id: ticket.id,
            status: ticket.status,
            issued_at: ticket.issued_at.to_rfc3339(),
        }
    }
}

/// Request body for switching the queue mode
#[derive(Debug, Deserialize)]
pub struct SetModeBody {
    pub mode: QueueMode,
}

/// Response for mode changes
#[derive(Debug, Serialize)]
pub struct ModeResponse {
    pub mode: QueueMode,
}

/// Request body for routing a called ticket to a room
#[derive(Debug, Deserialize)]
pub struct AssignTicketBody {
    pub room_id: String,
}

/// Response for call actions
#[derive(Debug, Serialize)]
pub struct CalledResponse {
    pub ticket: TicketId,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct QueueErrorResponse {
    pub error: String,
    pub reason: &'static str,
}

/// Map an engine rejection to a response, recording the outcome.
fn rejection_response(
    action: &'static str,
    rejection: Rejection,
) -> (StatusCode, Json<QueueErrorResponse>) {
    QUEUE_ACTIONS_TOTAL
        .with_label_values(&[action, rejection.reason()])
        .inc();

    let status = if rejection.is_not_found() {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::CONFLICT
    };
    (
        status,
        Json(QueueErrorResponse {
            error: rejection.to_string(),
            reason: rejection.reason(),
        }),
    )
}

fn record_applied(action: &'static str) {
    QUEUE_ACTIONS_TOTAL
        .with_label_values(&[action, "applied"])
        .inc();
}

// ============================================================================
// Visitor handlers
// ============================================================================

/// Take a new ticket. Open to everyone, never fails.
pub async fn take_ticket(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<TicketResponse>) {
    let id = state.engine().take_ticket();
    TICKETS_ISSUED_TOTAL.inc();

    // The ticket was just inserted under the same lock discipline, so the
    // lookup can only miss if a reset raced in between; surface it as issued
    // either way since the caller got a real number.
    let ticket = state
        .engine()
        .ticket(id)
        .unwrap_or_else(|| Ticket::new(id));
    (StatusCode::CREATED, Json(TicketResponse::from(ticket)))
}

/// A visitor re-checks their own ticket by number.
pub async fn get_ticket(
    State(state): State<Arc<AppState>>,
    Path(id): Path<TicketId>,
) -> Result<Json<TicketResponse>, impl IntoResponse> {
    match state.engine().ticket(id) {
        Some(ticket) => Ok(Json(TicketResponse::from(ticket))),
        None => Err((
            StatusCode::NOT_FOUND,
            Json(QueueErrorResponse {
                error: format!("ticket not found: {}", id),
                reason: "unknown_ticket",
            }),
        )),
    }
}

/// Full queue snapshot for display boards.
pub async fn get_queue(State(state): State<Arc<AppState>>) -> Json<QueueSnapshot> {
    Json(state.engine().snapshot())
}

// ============================================================================
// Staff handlers
// ============================================================================

/// Switch between one-stage and two-stage operation.
pub async fn set_mode(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SetModeBody>,
) -> Json<ModeResponse> {
    state.engine().set_mode(body.mode);
    record_applied("set_mode");
    Json(ModeResponse { mode: body.mode })
}

/// One-stage: call the next waiting ticket to the counter.
pub async fn call_next_one_stage(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CalledResponse>, impl IntoResponse> {
    match state.engine().call_next_one_stage() {
        Ok(ticket) => {
            record_applied("call_next_one_stage");
            Ok(Json(CalledResponse { ticket }))
        }
        Err(rejection) => Err(rejection_response("call_next_one_stage", rejection)),
    }
}

/// Two-stage: call the next waiting ticket out for room assignment.
pub async fn call_next_for_assignment(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CalledResponse>, impl IntoResponse> {
    match state.engine().call_next_for_assignment() {
        Ok(ticket) => {
            record_applied("call_next_for_assignment");
            Ok(Json(CalledResponse { ticket }))
        }
        Err(rejection) => Err(rejection_response("call_next_for_assignment", rejection)),
    }
}

/// Two-stage: route the called ticket into a room's queue.
pub async fn assign_ticket(
    State(state): State<Arc<AppState>>,
    Path(id): Path<TicketId>,
    Json(body): Json<AssignTicketBody>,
) -> Result<Json<TicketResponse>, impl IntoResponse> {
    match state.engine().assign_ticket_to_room(id, &body.room_id) {
        Ok(()) => {
            record_applied("assign_ticket_to_room");
            // Freshly assigned, so the lookup hits unless a reset raced in.
            match state.engine().ticket(id) {
                Some(ticket) => Ok(Json(TicketResponse::from(ticket))),
                None => Err(rejection_response(
                    "assign_ticket_to_room",
                    Rejection::UnknownTicket(id),
                )),
            }
        }
        Err(rejection) => Err(rejection_response("assign_ticket_to_room", rejection)),
    }
}

/// Two-stage: serve the oldest assignment in a room.
pub async fn call_next_in_room(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> Result<Json<CalledResponse>, impl IntoResponse> {
    match state.engine().call_next_in_room(&room_id) {
        Ok(ticket) => {
            record_applied("call_next_in_room");
            Ok(Json(CalledResponse { ticket }))
        }
        Err(rejection) => Err(rejection_response("call_next_in_room", rejection)),
    }
}

/// Wipe the queue. Destructive; any confirmation happens client-side.
pub async fn reset_queue(State(state): State<Arc<AppState>>) -> StatusCode {
    state.engine().reset_queue();
    QUEUE_RESETS_TOTAL.inc();
    record_applied("reset_queue");
    StatusCode::NO_CONTENT
}
