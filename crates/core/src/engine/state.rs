//! The canonical queue aggregate and its transition functions.
//!
//! Every staff action is a method on [`EngineState`] that validates its
//! preconditions first and only then mutates, so a rejected action never
//! leaves a partial update behind. The surrounding [`QueueEngine`] provides
//! locking; nothing here blocks or touches I/O.
//!
//! [`QueueEngine`]: crate::engine::QueueEngine

use std::collections::BTreeMap;

use super::types::{
    QueueMode, Rejection, Room, RoomDefinition, Ticket, TicketId, TicketStatus,
};

/// The single shared aggregate: tickets, rooms, mode, and counters.
///
/// Maps are ordered by key so iteration is deterministic; the lowest-id
/// waiting ticket is always the first `Waiting` entry in `tickets`.
#[derive(Debug, Clone)]
pub struct EngineState {
    pub tickets: BTreeMap<TicketId, Ticket>,
    pub rooms: BTreeMap<String, Room>,
    pub mode: QueueMode,
    pub next_ticket_number: TicketId,
    pub one_stage_serving: Option<TicketId>,

    /// Immutable roster, kept for reset and for roster-order listings.
    definitions: Vec<RoomDefinition>,
    ticket_number_base: TicketId,
}

impl EngineState {
    pub fn new(ticket_number_base: TicketId, definitions: Vec<RoomDefinition>) -> Self {
        Self {
            tickets: BTreeMap::new(),
            rooms: build_rooms(&definitions),
            mode: QueueMode::default(),
            next_ticket_number: ticket_number_base,
            one_stage_serving: None,
            definitions,
            ticket_number_base,
        }
    }

    /// Room roster in configuration order.
    pub fn definitions(&self) -> &[RoomDefinition] {
        &self.definitions
    }

    /// Issue a new ticket into the waiting pool. Always succeeds.
    pub fn take_ticket(&mut self) -> TicketId {
        let id = self.next_ticket_number;
        self.tickets.insert(id, Ticket::new(id));
        self.next_ticket_number += 1;
        id
    }

    /// Switch the operating mode. Never touches tickets or rooms: a ticket
    /// left mid-flow by a switch keeps its status and can still be driven
    /// forward through the two-stage actions.
    pub fn set_mode(&mut self, mode: QueueMode) {
        self.mode = mode;
    }

    /// Call the lowest-numbered waiting ticket to the single serving slot.
    ///
    /// The previous occupant of the slot keeps status `Serving` and is not
    /// re-queued; the one-stage flow tracks no history.
    pub fn call_next_one_stage(&mut self) -> Result<TicketId, Rejection> {
        let id = self.next_waiting().ok_or(Rejection::NothingWaiting)?;
        self.set_status(id, TicketStatus::Serving);
        self.one_stage_serving = Some(id);
        Ok(id)
    }

    /// Call the lowest-numbered waiting ticket out for room assignment.
    ///
    /// At most one ticket may be out for assignment at a time; a second call
    /// before the pending one is routed is rejected.
    pub fn call_next_for_assignment(&mut self) -> Result<TicketId, Rejection> {
        if let Some(pending) = self.ticket_ready_for_assignment() {
            return Err(Rejection::AssignmentPending(pending.id));
        }
        let id = self.next_waiting().ok_or(Rejection::NothingWaiting)?;
        self.set_status(id, TicketStatus::ReadyForAssignment);
        Ok(id)
    }

    /// Route a called ticket to the back of a room's queue.
    pub fn assign_ticket_to_room(
        &mut self,
        ticket_id: TicketId,
        room_id: &str,
    ) -> Result<(), Rejection> {
        let status = self
            .tickets
            .get(&ticket_id)
            .map(|t| t.status)
            .ok_or(Rejection::UnknownTicket(ticket_id))?;
        if status != TicketStatus::ReadyForAssignment {
            return Err(Rejection::TicketNotReady {
                id: ticket_id,
                status,
            });
        }
        if !self.rooms.contains_key(room_id) {
            return Err(Rejection::UnknownRoom(room_id.to_string()));
        }

        // Preconditions hold; mutate both sides.
        self.set_status(ticket_id, TicketStatus::Assigned);
        if let Some(room) = self.rooms.get_mut(room_id) {
            room.queue.push_back(ticket_id);
        }
        Ok(())
    }

    /// Serve the oldest assignment in a room.
    ///
    /// The room's previous `currently_serving` occupant is overwritten and not
    /// restored to any queue, mirroring the one-stage serving slot.
    pub fn call_next_in_room(&mut self, room_id: &str) -> Result<TicketId, Rejection> {
        let room = self
            .rooms
            .get_mut(room_id)
            .ok_or_else(|| Rejection::UnknownRoom(room_id.to_string()))?;
        let id = room
            .queue
            .pop_front()
            .ok_or_else(|| Rejection::RoomQueueEmpty(room_id.to_string()))?;
        room.currently_serving = Some(id);
        self.set_status(id, TicketStatus::Serving);
        Ok(id)
    }

    /// Destroy all tickets and rebuild rooms from the static roster. The
    /// ticket counter returns to its configured base and the mode to
    /// one-stage. Session state lives outside the engine and is untouched.
    pub fn reset(&mut self) {
        self.tickets.clear();
        self.rooms = build_rooms(&self.definitions);
        self.mode = QueueMode::default();
        self.next_ticket_number = self.ticket_number_base;
        self.one_stage_serving = None;
    }

    /// Waiting tickets in ascending id order (arrival order).
    pub fn waiting_tickets(&self) -> Vec<&Ticket> {
        self.tickets
            .values()
            .filter(|t| t.status == TicketStatus::Waiting)
            .collect()
    }

    /// The one ticket currently called for assignment, if any.
    pub fn ticket_ready_for_assignment(&self) -> Option<&Ticket> {
        self.tickets
            .values()
            .find(|t| t.status == TicketStatus::ReadyForAssignment)
    }

    fn next_waiting(&self) -> Option<TicketId> {
        // BTreeMap iterates in ascending id order.
        self.tickets
            .values()
            .find(|t| t.status == TicketStatus::Waiting)
            .map(|t| t.id)
    }

    fn set_status(&mut self, id: TicketId, status: TicketStatus) {
        if let Some(ticket) = self.tickets.get_mut(&id) {
            debug_assert!(status.rank() > ticket.status.rank());
            ticket.status = status;
        }
    }
}

fn build_rooms(definitions: &[RoomDefinition]) -> BTreeMap<String, Room> {
    definitions
        .iter()
        .map(|def| (def.id.clone(), Room::from_definition(def)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_room_state() -> EngineState {
        EngineState::new(
            101,
            vec![
                RoomDefinition::new("room-a", "Room A"),
                RoomDefinition::new("room-b", "Room B"),
            ],
        )
    }

    #[test]
    fn test_take_ticket_ids_are_sequential_from_base() {
        let mut state = two_room_state();
        assert_eq!(state.take_ticket(), 101);
        assert_eq!(state.take_ticket(), 102);
        assert_eq!(state.take_ticket(), 103);
        assert_eq!(state.next_ticket_number, 104);
        assert_eq!(state.tickets.len(), 3);
    }

    #[test]
    fn test_call_next_one_stage_empty_queue_is_rejected() {
        let mut state = two_room_state();
        assert_eq!(state.call_next_one_stage(), Err(Rejection::NothingWaiting));
        assert!(state.one_stage_serving.is_none());
    }

    #[test]
    fn test_call_next_one_stage_picks_lowest_id() {
        let mut state = two_room_state();
        state.take_ticket(); // 101
        state.take_ticket(); // 102

        // Serve 101 out of order first so 102 is the lowest waiting.
        assert_eq!(state.call_next_one_stage(), Ok(101));
        assert_eq!(state.one_stage_serving, Some(101));
        assert_eq!(state.call_next_one_stage(), Ok(102));
        assert_eq!(state.one_stage_serving, Some(102));

        // 101 was not re-queued anywhere and still reads as serving.
        assert_eq!(state.tickets[&101].status, TicketStatus::Serving);
    }

    #[test]
    fn test_call_for_assignment_only_one_at_a_time() {
        let mut state = two_room_state();
        state.take_ticket(); // 101
        state.take_ticket(); // 102

        assert_eq!(state.call_next_for_assignment(), Ok(101));
        assert_eq!(
            state.tickets[&101].status,
            TicketStatus::ReadyForAssignment
        );

        // Second call before routing is a no-op.
        assert_eq!(
            state.call_next_for_assignment(),
            Err(Rejection::AssignmentPending(101))
        );
        assert_eq!(state.tickets[&102].status, TicketStatus::Waiting);
    }

    #[test]
    fn test_call_for_assignment_empty_pool_is_rejected() {
        let mut state = two_room_state();
        assert_eq!(
            state.call_next_for_assignment(),
            Err(Rejection::NothingWaiting)
        );
    }

    #[test]
    fn test_assign_requires_ready_status() {
        let mut state = two_room_state();
        state.take_ticket(); // 101, still waiting

        assert_eq!(
            state.assign_ticket_to_room(101, "room-a"),
            Err(Rejection::TicketNotReady {
                id: 101,
                status: TicketStatus::Waiting
            })
        );
        assert!(state.rooms["room-a"].queue.is_empty());
    }

    #[test]
    fn test_assign_unknown_ticket_or_room() {
        let mut state = two_room_state();
        state.take_ticket();
        state.call_next_for_assignment().unwrap();

        assert_eq!(
            state.assign_ticket_to_room(999, "room-a"),
            Err(Rejection::UnknownTicket(999))
        );
        assert_eq!(
            state.assign_ticket_to_room(101, "room-z"),
            Err(Rejection::UnknownRoom("room-z".to_string()))
        );
        // The rejected room assignment left the ticket still ready.
        assert_eq!(
            state.tickets[&101].status,
            TicketStatus::ReadyForAssignment
        );
    }

    #[test]
    fn test_full_two_stage_flow() {
        let mut state = two_room_state();
        state.take_ticket(); // 101

        assert_eq!(state.call_next_for_assignment(), Ok(101));
        assert_eq!(state.assign_ticket_to_room(101, "room-a"), Ok(()));
        assert_eq!(state.tickets[&101].status, TicketStatus::Assigned);
        assert_eq!(state.rooms["room-a"].queue, [101]);

        assert_eq!(state.call_next_in_room("room-a"), Ok(101));
        assert_eq!(state.tickets[&101].status, TicketStatus::Serving);
        assert_eq!(state.rooms["room-a"].currently_serving, Some(101));
        assert!(state.rooms["room-a"].queue.is_empty());
    }

    #[test]
    fn test_room_queue_is_fifo() {
        let mut state = two_room_state();
        for _ in 0..3 {
            state.take_ticket();
        }
        for expected in [101, 102, 103] {
            assert_eq!(state.call_next_for_assignment(), Ok(expected));
            assert_eq!(state.assign_ticket_to_room(expected, "room-b"), Ok(()));
        }
        assert_eq!(state.rooms["room-b"].queue, [101, 102, 103]);

        assert_eq!(state.call_next_in_room("room-b"), Ok(101));
        assert_eq!(state.call_next_in_room("room-b"), Ok(102));
        // 101 was overwritten in the serving slot, not restored anywhere.
        assert_eq!(state.rooms["room-b"].currently_serving, Some(102));
        assert_eq!(state.call_next_in_room("room-b"), Ok(103));
        assert_eq!(
            state.call_next_in_room("room-b"),
            Err(Rejection::RoomQueueEmpty("room-b".to_string()))
        );
    }

    #[test]
    fn test_call_next_in_unknown_or_empty_room() {
        let mut state = two_room_state();
        assert_eq!(
            state.call_next_in_room("room-z"),
            Err(Rejection::UnknownRoom("room-z".to_string()))
        );
        assert_eq!(
            state.call_next_in_room("room-a"),
            Err(Rejection::RoomQueueEmpty("room-a".to_string()))
        );
    }

    #[test]
    fn test_mode_switch_does_not_transform_tickets() {
        let mut state = two_room_state();
        state.take_ticket();
        state.call_next_for_assignment().unwrap();

        state.set_mode(QueueMode::OneStage);
        assert_eq!(
            state.tickets[&101].status,
            TicketStatus::ReadyForAssignment
        );
        // The orphaned ticket still blocks the next call...
        assert_eq!(
            state.call_next_for_assignment(),
            Err(Rejection::AssignmentPending(101))
        );
        // ...and can still be driven forward.
        assert_eq!(state.assign_ticket_to_room(101, "room-a"), Ok(()));
    }

    #[test]
    fn test_reset_restores_initial_state() {
        let mut state = two_room_state();
        for _ in 0..4 {
            state.take_ticket();
        }
        state.call_next_one_stage().unwrap();
        state.set_mode(QueueMode::TwoStage);
        state.call_next_for_assignment().unwrap();
        state.assign_ticket_to_room(102, "room-a").unwrap();

        state.reset();

        assert!(state.tickets.is_empty());
        assert_eq!(state.mode, QueueMode::OneStage);
        assert_eq!(state.next_ticket_number, 101);
        assert!(state.one_stage_serving.is_none());
        for room in state.rooms.values() {
            assert!(room.queue.is_empty());
            assert!(room.currently_serving.is_none());
        }
        // Roster survives the reset.
        assert_eq!(state.rooms.len(), 2);
        assert_eq!(state.take_ticket(), 101);
    }

    #[test]
    fn test_waiting_tickets_sorted_and_filtered() {
        let mut state = two_room_state();
        for _ in 0..3 {
            state.take_ticket();
        }
        state.call_next_one_stage().unwrap(); // 101 serving

        let waiting: Vec<TicketId> = state.waiting_tickets().iter().map(|t| t.id).collect();
        assert_eq!(waiting, [102, 103]);
    }
}
