//! Root and catalogue entity generators.
//!
//! Each generator allocates its own identifiers and draws from the stream it
//! is handed. Generators never look at records produced later in the run.

mod catalog;
mod people;
mod program;

pub use catalog::{
    event_categories, generate_events, generate_tickets, generate_venues, map_event_categories,
};
pub use people::{city_phone, generate_speakers, generate_users};
pub use program::{
    assign_event_sponsors, generate_promotions, generate_sessions, generate_sponsors,
};
