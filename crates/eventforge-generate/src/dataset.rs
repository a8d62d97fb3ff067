//! The generated dataset and the order in which sinks publish it.

use eventforge_core::{
    Event, EventCategory, EventCategoryMapping, EventSponsor, Feedback, Notification, Payment,
    Promotion, Record, Registration, Session, Speaker, Sponsor, TableData, Ticket, User, Venue,
    Waitlist,
};

use crate::reconcile::TicketSale;

/// Every record of one run. `tickets` hold their reconciled `quantity_sold`.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub users: Vec<User>,
    pub venues: Vec<Venue>,
    pub categories: Vec<EventCategory>,
    pub events: Vec<Event>,
    pub category_mappings: Vec<EventCategoryMapping>,
    pub tickets: Vec<Ticket>,
    pub registrations: Vec<Registration>,
    pub payments: Vec<Payment>,
    pub notifications: Vec<Notification>,
    pub speakers: Vec<Speaker>,
    pub sponsors: Vec<Sponsor>,
    pub sessions: Vec<Session>,
    pub event_sponsors: Vec<EventSponsor>,
    pub feedback: Vec<Feedback>,
    pub promotions: Vec<Promotion>,
    pub waitlists: Vec<Waitlist>,
    pub ticket_sales: Vec<TicketSale>,
}

/// One step of publishing a dataset to a sink.
#[derive(Debug, Clone, PartialEq)]
pub enum PublishStep {
    Insert(TableData),
    /// Write the reconciled sold quantities back to the ticket table. Sinks
    /// apply it only when they wrote the ticket table in the same run.
    ReconcileTickets {
        table: TableData,
        sales: Vec<TicketSale>,
    },
}

impl PublishStep {
    pub fn table_name(&self) -> &'static str {
        match self {
            PublishStep::Insert(table) => table.name,
            PublishStep::ReconcileTickets { table, .. } => table.name,
        }
    }
}

impl Dataset {
    /// Tickets as they were issued, before any sale was recorded.
    pub fn issued_tickets(&self) -> Vec<Ticket> {
        self.tickets
            .iter()
            .map(|ticket| Ticket {
                quantity_sold: 0,
                ..ticket.clone()
            })
            .collect()
    }

    /// Tables in dependency order, with the ticket reconciliation right
    /// after registrations.
    pub fn publication_plan(&self) -> Vec<PublishStep> {
        vec![
            PublishStep::Insert(TableData::from_records(&self.users)),
            PublishStep::Insert(TableData::from_records(&self.venues)),
            PublishStep::Insert(TableData::from_records(&self.categories)),
            PublishStep::Insert(TableData::from_records(&self.events)),
            PublishStep::Insert(TableData::from_records(&self.category_mappings)),
            PublishStep::Insert(TableData::from_records(&self.issued_tickets())),
            PublishStep::Insert(TableData::from_records(&self.registrations)),
            PublishStep::ReconcileTickets {
                table: TableData::from_records(&self.tickets),
                sales: self.ticket_sales.clone(),
            },
            PublishStep::Insert(TableData::from_records(&self.payments)),
            PublishStep::Insert(TableData::from_records(&self.notifications)),
            PublishStep::Insert(TableData::from_records(&self.speakers)),
            PublishStep::Insert(TableData::from_records(&self.sponsors)),
            PublishStep::Insert(TableData::from_records(&self.sessions)),
            PublishStep::Insert(TableData::from_records(&self.event_sponsors)),
            PublishStep::Insert(TableData::from_records(&self.feedback)),
            PublishStep::Insert(TableData::from_records(&self.promotions)),
            PublishStep::Insert(TableData::from_records(&self.waitlists)),
        ]
    }

    /// Row count per table, in publication order.
    pub fn table_sizes(&self) -> Vec<(&'static str, usize)> {
        vec![
            (User::TABLE, self.users.len()),
            (Venue::TABLE, self.venues.len()),
            (EventCategory::TABLE, self.categories.len()),
            (Event::TABLE, self.events.len()),
            (EventCategoryMapping::TABLE, self.category_mappings.len()),
            (Ticket::TABLE, self.tickets.len()),
            (Registration::TABLE, self.registrations.len()),
            (Payment::TABLE, self.payments.len()),
            (Notification::TABLE, self.notifications.len()),
            (Speaker::TABLE, self.speakers.len()),
            (Sponsor::TABLE, self.sponsors.len()),
            (Session::TABLE, self.sessions.len()),
            (EventSponsor::TABLE, self.event_sponsors.len()),
            (Feedback::TABLE, self.feedback.len()),
            (Promotion::TABLE, self.promotions.len()),
            (Waitlist::TABLE, self.waitlists.len()),
        ]
    }
}
