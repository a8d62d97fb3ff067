use serde::{Deserialize, Serialize};

use eventforge_core::{Ticket, TicketId};

use crate::ledger::CapacityLedger;

/// Final sold quantity of one ticket, as written back to the sinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketSale {
    pub ticket_id: TicketId,
    pub quantity_sold: u32,
}

/// Rewrite `quantity_sold` from the ledger's remaining inventory.
///
/// This is the only mutation applied to a record after its stage.
pub fn reconcile_tickets(tickets: &mut [Ticket], ledger: &CapacityLedger) -> Vec<TicketSale> {
    tickets
        .iter_mut()
        .map(|ticket| {
            let remaining = ledger.remaining_of(ticket.id);
            ticket.quantity_sold = ticket
                .quantity_available
                .saturating_sub(remaining)
                .min(ticket.quantity_available);
            TicketSale {
                ticket_id: ticket.id,
                quantity_sold: ticket.quantity_sold,
            }
        })
        .collect()
}
