//! Derived-entity pipeline.
//!
//! Every stage reads the finished registration sequence (waitlists also read
//! the event capacities and per-event registered totals) and returns new
//! records. No stage mutates its input or another stage's output.

use std::collections::BTreeMap;

use rand::Rng;
use rand::seq::{IndexedRandom, index};

use eventforge_core::{
    CountRange, Event, EventId, Feedback, FeedbackId, IdAllocator, Notification,
    NotificationChannel, NotificationId, NotificationStatus, Payment, PaymentId, PaymentMethod,
    PaymentState, Registration, User, Waitlist, WaitlistId, WaitlistStatus,
};

use crate::provider::ValueProvider;

pub const REMINDER_MESSAGE: &str = "Reminder: Your event starts soon!";

/// Payments for the first `cap` paid registrations, in registration order.
///
/// Each payment references its registration by id and copies its total.
pub fn derive_payments<R: Rng>(
    registrations: &[Registration],
    cap: u32,
    provider: &dyn ValueProvider,
    rng: &mut R,
) -> Vec<Payment> {
    let mut ids = IdAllocator::<PaymentId>::new();
    registrations
        .iter()
        .filter(|registration| registration.is_paid())
        .take(cap as usize)
        .map(|registration| {
            let method = pick(PaymentMethod::ALL, PaymentMethod::CreditCard, rng);
            let transaction_id = format!("txn_{}", provider.uuid(rng));
            let paid_at = provider.date_time_this_year(rng);
            Payment {
                id: ids.next_id(),
                registration_id: registration.id,
                user_id: registration.user_id,
                amount: registration.total_amount,
                method,
                transaction_id,
                status: PaymentState::Completed,
                paid_at,
            }
        })
        .collect()
}

/// One confirmation per registration plus an optional reminder.
pub fn derive_notifications<R: Rng>(
    registrations: &[Registration],
    reminder_probability: f64,
    provider: &dyn ValueProvider,
    rng: &mut R,
) -> Vec<Notification> {
    let reminder_probability = reminder_probability.clamp(0.0, 1.0);
    let mut ids = IdAllocator::<NotificationId>::new();
    let mut notifications = Vec::with_capacity(registrations.len() * 2);

    for registration in registrations {
        let (status, sent_at) = if registration.is_paid() {
            (
                NotificationStatus::Sent,
                Some(provider.date_time_this_year(rng)),
            )
        } else {
            (NotificationStatus::Pending, None)
        };
        notifications.push(Notification {
            id: ids.next_id(),
            user_id: registration.user_id,
            event_id: registration.event_id,
            message: confirmation_message(registration.event_id),
            channel: pick(NotificationChannel::ALL, NotificationChannel::Email, rng),
            status,
            sent_at,
        });

        if rng.random_bool(reminder_probability) {
            notifications.push(Notification {
                id: ids.next_id(),
                user_id: registration.user_id,
                event_id: registration.event_id,
                message: REMINDER_MESSAGE.to_string(),
                channel: pick(NotificationChannel::ALL, NotificationChannel::Email, rng),
                status: NotificationStatus::Pending,
                sent_at: None,
            });
        }
    }

    notifications
}

pub fn confirmation_message(event_id: EventId) -> String {
    format!("Your registration for event {event_id} is confirmed")
}

/// Feedback for a random share of paid registrations.
pub fn derive_feedback<R: Rng>(
    registrations: &[Registration],
    feedback_probability: f64,
    provider: &dyn ValueProvider,
    rng: &mut R,
) -> Vec<Feedback> {
    let feedback_probability = feedback_probability.clamp(0.0, 1.0);
    let mut ids = IdAllocator::<FeedbackId>::new();
    let mut feedback = Vec::new();

    for registration in registrations.iter().filter(|r| r.is_paid()) {
        if !rng.random_bool(feedback_probability) {
            continue;
        }
        let rating = rng.random_range(1..=5_u8);
        let comment = provider.sentence(10, rng);
        let submitted_at = provider.date_time_this_year(rng);
        feedback.push(Feedback {
            id: ids.next_id(),
            event_id: registration.event_id,
            user_id: registration.user_id,
            rating,
            comment,
            submitted_at,
        });
    }

    feedback
}

/// Quantity registered per event, summed from the registrations.
pub fn registered_totals(registrations: &[Registration]) -> BTreeMap<EventId, u32> {
    let mut totals = BTreeMap::new();
    for registration in registrations {
        *totals.entry(registration.event_id).or_insert(0) += registration.quantity;
    }
    totals
}

/// Waitlist entries for events whose registered quantity reached capacity.
///
/// Each sold-out event gets a random set of distinct users, sized within
/// `size` and clamped to the number of users.
pub fn derive_waitlists<R: Rng>(
    events: &[Event],
    users: &[User],
    totals: &BTreeMap<EventId, u32>,
    size: CountRange,
    provider: &dyn ValueProvider,
    rng: &mut R,
) -> Vec<Waitlist> {
    let mut ids = IdAllocator::<WaitlistId>::new();
    let mut waitlists = Vec::new();

    for event in events {
        let registered = totals.get(&event.id).copied().unwrap_or(0);
        if registered < event.capacity {
            continue;
        }
        let wanted = rng.random_range(size.min..=size.max) as usize;
        let amount = wanted.min(users.len());
        for position in index::sample(rng, users.len(), amount).into_vec() {
            let joined_at = provider.date_time_this_year(rng);
            let status = pick(WaitlistStatus::ALL, WaitlistStatus::Waiting, rng);
            waitlists.push(Waitlist {
                id: ids.next_id(),
                event_id: event.id,
                user_id: users[position].id,
                joined_at,
                status,
            });
        }
    }

    waitlists
}

pub(crate) fn pick<T: Copy, R: Rng>(values: &[T], fallback: T, rng: &mut R) -> T {
    values.choose(rng).copied().unwrap_or(fallback)
}
