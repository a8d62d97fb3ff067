//! Event programme: sponsors, speaker sessions and promotion codes.

use std::collections::BTreeSet;

use chrono::Duration;
use rand::Rng;
use rand::seq::{IndexedRandom, index};

use eventforge_core::{
    CountRange, Event, EventSponsor, IdAllocator, Money, Promotion, PromotionId, Session,
    SessionId, Speaker, Sponsor, SponsorId, SponsorshipLevel,
};

use crate::pipeline::pick;
use crate::provider::ValueProvider;

const ROOMS: u32 = 10;
const CODE_ATTEMPTS: usize = 16;

pub fn generate_sponsors<R: Rng>(
    count: u32,
    provider: &dyn ValueProvider,
    rng: &mut R,
) -> Vec<Sponsor> {
    let mut ids = IdAllocator::<SponsorId>::new();
    (0..count)
        .map(|_| {
            let id = ids.next_id();
            let name = provider.company(rng);
            let description = provider.catch_phrase(rng);
            let website = provider.url(rng);
            Sponsor {
                id,
                name,
                description,
                logo_url: format!("https://example.com/logos/{id}.png"),
                website,
                created_at: provider.date_time_this_year(rng),
            }
        })
        .collect()
}

/// Sessions fall entirely inside their event's time window.
pub fn generate_sessions<R: Rng>(
    events: &[Event],
    speakers: &[Speaker],
    per_event: CountRange,
    provider: &dyn ValueProvider,
    rng: &mut R,
) -> Vec<Session> {
    let mut ids = IdAllocator::<SessionId>::new();
    let mut sessions = Vec::new();
    if speakers.is_empty() {
        return sessions;
    }

    for event in events {
        let window = (event.end_time - event.start_time).num_minutes().max(0);
        let longest = window.min(240);
        let shortest = longest.min(30);
        let count = rng.random_range(per_event.min..=per_event.max);
        for _ in 0..count {
            let Some(speaker) = speakers.choose(rng) else {
                break;
            };
            let minutes = rng.random_range(shortest..=longest);
            let offset = rng.random_range(0..=window - minutes);
            let start_time = event.start_time + Duration::minutes(offset);
            let title = provider.sentence(5, rng);
            let description = provider.paragraph(1, rng);
            sessions.push(Session {
                id: ids.next_id(),
                event_id: event.id,
                speaker_id: speaker.id,
                title,
                description,
                start_time,
                end_time: start_time + Duration::minutes(minutes),
                room: format!("Room {}", rng.random_range(1..=ROOMS)),
                created_at: provider.date_time_this_year(rng),
            });
        }
    }

    sessions
}

/// Up to `max_per_event` distinct sponsors per event.
pub fn assign_event_sponsors<R: Rng>(
    events: &[Event],
    sponsors: &[Sponsor],
    max_per_event: u32,
    rng: &mut R,
) -> Vec<EventSponsor> {
    let mut links = Vec::new();
    for event in events {
        let wanted = rng.random_range(0..=max_per_event) as usize;
        let amount = wanted.min(sponsors.len());
        for position in index::sample(rng, sponsors.len(), amount).into_vec() {
            links.push(EventSponsor {
                event_id: event.id,
                sponsor_id: sponsors[position].id,
                level: pick(SponsorshipLevel::ALL, SponsorshipLevel::Bronze, rng),
                contribution: Money::from_cents(rng.random_range(100_000..=1_000_000)),
            });
        }
    }
    links
}

/// Promotion codes are unique across the run. An event whose code draws keep
/// colliding simply gets fewer promotions.
pub fn generate_promotions<R: Rng>(
    events: &[Event],
    max_per_event: u32,
    provider: &dyn ValueProvider,
    rng: &mut R,
) -> Vec<Promotion> {
    let mut ids = IdAllocator::<PromotionId>::new();
    let mut used = BTreeSet::new();
    let mut promotions = Vec::new();

    for event in events {
        let count = rng.random_range(0..=max_per_event);
        for _ in 0..count {
            let Some(code) = unique_code(&mut used, provider, rng) else {
                continue;
            };
            let valid_from = provider.future_datetime(Duration::days(30), rng);
            promotions.push(Promotion {
                id: ids.next_id(),
                event_id: event.id,
                code,
                discount_basis_points: rng.random_range(500..=5_000),
                valid_from,
                valid_to: valid_from + Duration::days(30),
                created_at: provider.date_time_this_year(rng),
            });
        }
    }

    promotions
}

fn unique_code<R: Rng>(
    used: &mut BTreeSet<String>,
    provider: &dyn ValueProvider,
    rng: &mut R,
) -> Option<String> {
    for _ in 0..CODE_ATTEMPTS {
        let word: String = provider
            .word(rng)
            .chars()
            .filter(char::is_ascii_alphabetic)
            .map(|c| c.to_ascii_uppercase())
            .collect();
        let code = format!("{word}{}", rng.random_range(100..=999));
        if used.insert(code.clone()) {
            return Some(code);
        }
    }
    None
}
