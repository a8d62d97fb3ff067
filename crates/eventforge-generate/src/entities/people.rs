use rand::Rng;
use rand::seq::SliceRandom;

use eventforge_core::{City, IdAllocator, Role, Speaker, SpeakerId, User, UserId};

use crate::pipeline::pick;
use crate::provider::ValueProvider;

/// Role pool shuffled once per run; user `i` takes `pool[i % pool.len()]`.
const ROLE_WEIGHTS: [(Role, usize); 3] =
    [(Role::Attendee, 80), (Role::Organizer, 15), (Role::Admin, 5)];

pub fn generate_users<R: Rng>(count: u32, provider: &dyn ValueProvider, rng: &mut R) -> Vec<User> {
    let mut roles: Vec<Role> = ROLE_WEIGHTS
        .iter()
        .flat_map(|(role, weight)| std::iter::repeat_n(*role, *weight))
        .collect();
    roles.shuffle(rng);

    let mut ids = IdAllocator::<UserId>::new();
    (0..count as usize)
        .map(|index| {
            let id = ids.next_id();
            let first_name = provider.first_name(rng);
            let last_name = provider.last_name(rng);
            let email = format!(
                "{}.{}.{id}@example.com",
                mailbox_part(&first_name),
                mailbox_part(&last_name)
            );
            let city = pick(City::ALL, City::Dallas, rng);
            let phone = city_phone(city, rng);
            let created_at = provider.date_time_this_year(rng);
            User {
                id,
                first_name,
                last_name,
                email,
                password_hash: format!("hash{index}"),
                phone,
                role: roles[index % roles.len()],
                created_at,
                updated_at: created_at,
            }
        })
        .collect()
}

pub fn generate_speakers<R: Rng>(
    count: u32,
    provider: &dyn ValueProvider,
    rng: &mut R,
) -> Vec<Speaker> {
    let mut ids = IdAllocator::<SpeakerId>::new();
    (0..count)
        .map(|_| {
            let id = ids.next_id();
            let first_name = provider.first_name(rng);
            let last_name = provider.last_name(rng);
            let bio = provider.paragraph(3, rng);
            let email = format!(
                "{}.{}{id}@speaker.com",
                mailbox_part(&first_name),
                mailbox_part(&last_name)
            );
            let phone = format!(
                "{}-{}-{}",
                rng.random_range(100..=999),
                rng.random_range(100..=999),
                rng.random_range(1000..=9999)
            );
            Speaker {
                id,
                first_name,
                last_name,
                bio,
                email,
                phone,
                created_at: provider.date_time_this_year(rng),
            }
        })
        .collect()
}

/// Phone number with one of the city's area codes.
pub fn city_phone<R: Rng>(city: City, rng: &mut R) -> String {
    let area = pick(city.area_codes(), "800", rng);
    format!(
        "{area}-{}-{}",
        rng.random_range(200..=999),
        rng.random_range(1000..=9999)
    )
}

fn mailbox_part(name: &str) -> String {
    name.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}
