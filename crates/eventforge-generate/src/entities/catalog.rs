//! Venues, categories, events and their ticket pools.

use chrono::Duration;
use rand::Rng;
use rand::seq::{IndexedRandom, index};

use eventforge_core::{
    CategoryId, City, CountRange, Event, EventCategory, EventCategoryMapping, EventId,
    EventStatus, IdAllocator, Money, Ticket, TicketId, TicketType, User, Venue, VenueId,
};

use crate::errors::GenerationError;
use crate::pipeline::pick;
use crate::provider::ValueProvider;

const CATEGORIES: [(&str, &str); 5] = [
    ("Conference", "Professional development and networking events"),
    ("Festival", "Music, art, or cultural celebrations"),
    ("Exhibition", "Showcases of art, products, or services"),
    ("Sports", "Competitive or recreational sporting events"),
    ("Workshop", "Hands-on learning sessions"),
];

pub fn generate_venues<R: Rng>(count: u32, provider: &dyn ValueProvider, rng: &mut R) -> Vec<Venue> {
    let mut ids = IdAllocator::<VenueId>::new();
    (0..count)
        .map(|_| {
            let city = pick(City::ALL, City::Dallas, rng);
            let name = format!("{city} {} Center", provider.company(rng));
            let address = provider.street_address(rng);
            let zip_code = provider.zip_code(rng);
            let (lat, lon) = city.coordinates();
            let latitude = round6(lat + rng.random_range(-0.15..=0.15));
            let longitude = round6(lon + rng.random_range(-0.15..=0.15));
            let capacity = rng.random_range(500..=10_000);
            Venue {
                id: ids.next_id(),
                name,
                address,
                city,
                country: "USA".to_string(),
                zip_code,
                latitude,
                longitude,
                capacity,
                created_at: provider.date_time_this_year(rng),
            }
        })
        .collect()
}

fn round6(value: f64) -> f64 {
    (value * 1_000_000.0).round() / 1_000_000.0
}

pub fn event_categories() -> Vec<EventCategory> {
    let mut ids = IdAllocator::<CategoryId>::new();
    CATEGORIES
        .iter()
        .map(|(name, description)| EventCategory {
            id: ids.next_id(),
            name: name.to_string(),
            description: description.to_string(),
        })
        .collect()
}

/// Events owned by organizer or admin users, hosted at random venues.
pub fn generate_events<R: Rng>(
    count: u32,
    users: &[User],
    venues: &[Venue],
    provider: &dyn ValueProvider,
    rng: &mut R,
) -> Result<Vec<Event>, GenerationError> {
    let organizers: Vec<_> = users
        .iter()
        .filter(|user| user.role.can_organize())
        .map(|user| user.id)
        .collect();
    if organizers.is_empty() {
        return Err(GenerationError::InvalidPolicy(
            "no organizer or admin users to own events".to_string(),
        ));
    }
    if venues.is_empty() {
        return Err(GenerationError::InvalidPolicy(
            "no venues to host events".to_string(),
        ));
    }

    let mut ids = IdAllocator::<EventId>::new();
    let mut events = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let title = provider.sentence(4, rng);
        let description = provider.paragraph(2, rng);
        let start_time = provider.future_datetime(Duration::days(365), rng);
        let end_time = start_time + Duration::hours(rng.random_range(2..=8));
        let organizer_id = *organizers.choose(rng).unwrap_or(&organizers[0]);
        let venue_id = venues.choose(rng).map(|venue| venue.id).unwrap_or(venues[0].id);
        let capacity = rng.random_range(100..=5_000);
        let status = pick(EventStatus::ALL, EventStatus::Draft, rng);
        let created_at = provider.date_time_this_year(rng);
        events.push(Event {
            id: ids.next_id(),
            title,
            description,
            start_time,
            end_time,
            organizer_id,
            venue_id,
            capacity,
            status,
            created_at,
            updated_at: created_at,
        });
    }
    Ok(events)
}

/// Each event gets a distinct random subset of categories.
pub fn map_event_categories<R: Rng>(
    events: &[Event],
    categories: &[EventCategory],
    per_event: CountRange,
    rng: &mut R,
) -> Vec<EventCategoryMapping> {
    let mut mappings = Vec::new();
    for event in events {
        let wanted = rng.random_range(per_event.min..=per_event.max) as usize;
        let amount = wanted.min(categories.len());
        for position in index::sample(rng, categories.len(), amount).into_vec() {
            mappings.push(EventCategoryMapping {
                event_id: event.id,
                category_id: categories[position].id,
            });
        }
    }
    mappings
}

/// Two pools per event: General Admission and VIP.
///
/// With `capacity_aware` the pools are sized so that together they fit the
/// event's capacity. Without it the pools are sized independently of the
/// event and may exceed it; the ledger's event check still holds either way.
pub fn generate_tickets<R: Rng>(
    events: &[Event],
    capacity_aware: bool,
    provider: &dyn ValueProvider,
    rng: &mut R,
) -> Vec<Ticket> {
    let mut ids = IdAllocator::<TicketId>::new();
    let mut tickets = Vec::with_capacity(events.len() * 2);

    for event in events {
        let (general, vip) = if capacity_aware {
            let half = event.capacity / 2;
            let general = rng.random_range(300.min(half)..=1_000.min(half));
            let rest = event.capacity - general;
            let vip = rng.random_range(300.min(rest)..=600.min(rest));
            (general, vip)
        } else {
            (rng.random_range(300..=1_000), rng.random_range(300..=600))
        };

        for (ticket_type, quantity_available, price_cents) in [
            (TicketType::GeneralAdmission, general, 2_000..=5_000),
            (TicketType::Vip, vip, 5_000..=15_000),
        ] {
            let price = Money::from_cents(rng.random_range(price_cents));
            let sales_start = provider.date_time_this_year(rng);
            let sales_end = provider.future_datetime(Duration::days(365), rng);
            tickets.push(Ticket {
                id: ids.next_id(),
                event_id: event.id,
                ticket_type,
                price,
                quantity_available,
                quantity_sold: 0,
                sales_start,
                sales_end,
                created_at: provider.date_time_this_year(rng),
            });
        }
    }

    tickets
}
