//! Capacity ledger: remaining inventory per ticket and consumed capacity per
//! event.
//!
//! The ledger is the authority on feasibility. Ticket pools may be sized
//! larger than their event's capacity; a reservation still has to pass both
//! the ticket check and the event check.

use std::collections::BTreeMap;

use eventforge_core::{Event, EventId, Ticket, TicketId};

/// Result of a reservation attempt. Exhaustion is an expected outcome, not an
/// error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum Reservation {
    Reserved,
    /// Quantity was zero.
    EmptyQuantity,
    UnknownTicket,
    UnknownEvent,
    /// The ticket does not belong to the event it was reserved against.
    TicketEventMismatch,
    TicketExhausted,
    EventFull,
}

impl Reservation {
    pub fn is_reserved(self) -> bool {
        self == Reservation::Reserved
    }
}

#[derive(Debug, Clone)]
struct TicketPool {
    event_id: EventId,
    remaining: u32,
}

#[derive(Debug, Clone)]
struct EventLoad {
    capacity: u32,
    consumed: u32,
}

#[derive(Debug, Clone, Default)]
pub struct CapacityLedger {
    tickets: BTreeMap<TicketId, TicketPool>,
    events: BTreeMap<EventId, EventLoad>,
}

impl CapacityLedger {
    /// Seed the ledger with each ticket's `quantity_available` and zero
    /// consumption for every event.
    pub fn new(events: &[Event], tickets: &[Ticket]) -> Self {
        let events = events
            .iter()
            .map(|event| {
                (
                    event.id,
                    EventLoad {
                        capacity: event.capacity,
                        consumed: 0,
                    },
                )
            })
            .collect();
        let tickets = tickets
            .iter()
            .map(|ticket| {
                (
                    ticket.id,
                    TicketPool {
                        event_id: ticket.event_id,
                        remaining: ticket.quantity_available,
                    },
                )
            })
            .collect();
        Self { tickets, events }
    }

    /// Reserve `quantity` units of `ticket_id` against `event_id`.
    ///
    /// Both counters change together or not at all.
    pub fn reserve(&mut self, ticket_id: TicketId, event_id: EventId, quantity: u32) -> Reservation {
        if quantity == 0 {
            return Reservation::EmptyQuantity;
        }
        let Some(pool) = self.tickets.get_mut(&ticket_id) else {
            return Reservation::UnknownTicket;
        };
        let Some(load) = self.events.get_mut(&event_id) else {
            return Reservation::UnknownEvent;
        };
        if pool.event_id != event_id {
            return Reservation::TicketEventMismatch;
        }
        if pool.remaining < quantity {
            return Reservation::TicketExhausted;
        }
        if load.capacity.saturating_sub(load.consumed) < quantity {
            return Reservation::EventFull;
        }

        pool.remaining -= quantity;
        load.consumed += quantity;
        Reservation::Reserved
    }

    /// Remaining inventory of a ticket (0 for unknown tickets).
    pub fn remaining_of(&self, ticket_id: TicketId) -> u32 {
        self.tickets
            .get(&ticket_id)
            .map(|pool| pool.remaining)
            .unwrap_or(0)
    }

    /// Quantity reserved so far against an event.
    pub fn consumed_of(&self, event_id: EventId) -> u32 {
        self.events
            .get(&event_id)
            .map(|load| load.consumed)
            .unwrap_or(0)
    }

    /// Capacity still free at the event level (0 for unknown events).
    pub fn remaining_capacity_of(&self, event_id: EventId) -> u32 {
        self.events
            .get(&event_id)
            .map(|load| load.capacity.saturating_sub(load.consumed))
            .unwrap_or(0)
    }

    pub fn capacity_of(&self, event_id: EventId) -> u32 {
        self.events
            .get(&event_id)
            .map(|load| load.capacity)
            .unwrap_or(0)
    }

    /// Consumed quantity per event, in event id order.
    pub fn consumed_snapshot(&self) -> BTreeMap<EventId, u32> {
        self.events
            .iter()
            .map(|(event_id, load)| (*event_id, load.consumed))
            .collect()
    }
}
