//! Registration allocator: bounded rejection sampling against the capacity
//! ledger.

use std::collections::BTreeMap;

use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use tracing::debug;

use eventforge_core::{
    Event, EventId, IdAllocator, Money, PaymentStatus, Registration, RegistrationId,
    RegistrationStatus, Ticket, TicketId, User, UserId,
};

use crate::ledger::CapacityLedger;
use crate::provider::ValueProvider;

/// Knobs of one allocation run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AllocationRequest {
    /// Registrations to emit.
    pub target: u32,
    /// Maximum number of draws, successful or not.
    pub attempt_budget: u64,
    /// Upper bound of the per-registration quantity.
    pub max_quantity: u32,
    pub paid_probability: f64,
}

/// Why draws were discarded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectionStats {
    pub event_without_tickets: u64,
    pub ticket_sold_out: u64,
    pub event_full: u64,
    pub ledger_refused: u64,
}

impl RejectionStats {
    pub fn total(&self) -> u64 {
        self.event_without_tickets + self.ticket_sold_out + self.event_full + self.ledger_refused
    }
}

#[derive(Debug, Clone)]
pub struct AllocationOutcome {
    pub registrations: Vec<Registration>,
    pub attempts: u64,
    pub target: u32,
    pub rejections: RejectionStats,
}

impl AllocationOutcome {
    /// False when capacity or the attempt budget ran out first. That is a
    /// valid outcome.
    pub fn is_fulfilled(&self) -> bool {
        self.registrations.len() as u64 >= u64::from(self.target)
    }
}

/// Draws (user, event, ticket, quantity) tuples until the target is met or
/// the attempt budget is spent.
#[derive(Debug, Clone)]
pub struct RegistrationAllocator {
    users: Vec<UserId>,
    events: Vec<EventId>,
    tickets_by_event: BTreeMap<EventId, Vec<TicketId>>,
    prices: BTreeMap<TicketId, Money>,
    request: AllocationRequest,
}

impl RegistrationAllocator {
    pub fn new(users: &[User], events: &[Event], tickets: &[Ticket], request: AllocationRequest) -> Self {
        let mut tickets_by_event: BTreeMap<EventId, Vec<TicketId>> = BTreeMap::new();
        let mut prices = BTreeMap::new();
        for ticket in tickets {
            tickets_by_event
                .entry(ticket.event_id)
                .or_default()
                .push(ticket.id);
            prices.insert(ticket.id, ticket.price);
        }

        Self {
            users: users.iter().map(|user| user.id).collect(),
            events: events.iter().map(|event| event.id).collect(),
            tickets_by_event,
            prices,
            request,
        }
    }

    pub fn allocate<R: Rng>(
        &self,
        ledger: &mut CapacityLedger,
        provider: &dyn ValueProvider,
        rng: &mut R,
    ) -> AllocationOutcome {
        let request = self.request;
        let paid_probability = request.paid_probability.clamp(0.0, 1.0);
        let mut ids = IdAllocator::<RegistrationId>::new();
        let mut registrations = Vec::new();
        let mut rejections = RejectionStats::default();
        let mut attempts = 0_u64;

        while (registrations.len() as u64) < u64::from(request.target)
            && attempts < request.attempt_budget
        {
            attempts += 1;

            let (Some(&user_id), Some(&event_id)) =
                (self.users.choose(rng), self.events.choose(rng))
            else {
                // No users or no events: nothing can ever be drawn.
                break;
            };
            let Some(&ticket_id) = self
                .tickets_by_event
                .get(&event_id)
                .and_then(|tickets| tickets.choose(rng))
            else {
                rejections.event_without_tickets += 1;
                continue;
            };

            let available = ledger.remaining_of(ticket_id);
            if available == 0 {
                rejections.ticket_sold_out += 1;
                continue;
            }
            let free_capacity = ledger.remaining_capacity_of(event_id);
            if free_capacity == 0 {
                rejections.event_full += 1;
                continue;
            }

            let max_quantity = request.max_quantity.min(available).min(free_capacity);
            if max_quantity == 0 {
                rejections.ledger_refused += 1;
                continue;
            }
            let quantity = rng.random_range(1..=max_quantity);
            if !ledger.reserve(ticket_id, event_id, quantity).is_reserved() {
                rejections.ledger_refused += 1;
                continue;
            }

            let price = self.prices.get(&ticket_id).copied().unwrap_or(Money::ZERO);
            let registered_at = provider.date_time_this_year(rng);
            let payment_status = if rng.random_bool(paid_probability) {
                PaymentStatus::Paid
            } else {
                PaymentStatus::Unpaid
            };

            registrations.push(Registration {
                id: ids.next_id(),
                user_id,
                event_id,
                ticket_id,
                quantity,
                total_amount: price.times(quantity),
                status: RegistrationStatus::Confirmed,
                registered_at,
                payment_status,
            });
        }

        debug!(
            target_count = request.target,
            emitted = registrations.len(),
            attempts,
            rejected = rejections.total(),
            "allocation finished"
        );

        AllocationOutcome {
            registrations,
            attempts,
            target: request.target,
            rejections,
        }
    }
}
