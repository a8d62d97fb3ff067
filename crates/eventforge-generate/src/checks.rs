//! Cross-entity invariant verification.
//!
//! Violations are impossible by construction; any finding means a generator
//! is broken and the run must not be published.

use std::collections::{BTreeMap, BTreeSet};

use eventforge_core::{
    EventId, Notification, NotificationStatus, Registration, RegistrationId, UserId,
};

use crate::dataset::Dataset;
use crate::ledger::CapacityLedger;
use crate::pipeline::{REMINDER_MESSAGE, confirmation_message, registered_totals};

/// Return a human-readable line per violated invariant.
pub fn verify_dataset(dataset: &Dataset, ledger: &CapacityLedger, payment_cap: u32) -> Vec<String> {
    let mut violations = Vec::new();
    check_events(dataset, &mut violations);
    check_tickets(dataset, ledger, &mut violations);
    check_registrations(dataset, ledger, &mut violations);
    check_payments(dataset, payment_cap, &mut violations);
    violations.extend(check_notifications(&dataset.registrations, &dataset.notifications));
    check_feedback(dataset, &mut violations);
    check_waitlists(dataset, &mut violations);
    check_program(dataset, &mut violations);
    violations
}

fn check_events(dataset: &Dataset, violations: &mut Vec<String>) {
    for event in &dataset.events {
        let organizer = dataset.users.get(event.organizer_id.index());
        if !organizer.is_some_and(|user| user.id == event.organizer_id && user.role.can_organize()) {
            violations.push(format!(
                "event {} organizer {} is not an organizer or admin",
                event.id, event.organizer_id
            ));
        }
        if !dataset.venues.iter().any(|venue| venue.id == event.venue_id) {
            violations.push(format!("event {} references unknown venue {}", event.id, event.venue_id));
        }
        if event.end_time <= event.start_time {
            violations.push(format!("event {} ends before it starts", event.id));
        }
    }
}

fn check_tickets(dataset: &Dataset, ledger: &CapacityLedger, violations: &mut Vec<String>) {
    for ticket in &dataset.tickets {
        if ticket.quantity_sold > ticket.quantity_available {
            violations.push(format!(
                "ticket {} sold {} of {}",
                ticket.id, ticket.quantity_sold, ticket.quantity_available
            ));
        }
        let expected = ticket
            .quantity_available
            .saturating_sub(ledger.remaining_of(ticket.id));
        if ticket.quantity_sold != expected {
            violations.push(format!(
                "ticket {} quantity_sold {} differs from ledger {}",
                ticket.id, ticket.quantity_sold, expected
            ));
        }
    }
}

fn check_registrations(dataset: &Dataset, ledger: &CapacityLedger, violations: &mut Vec<String>) {
    for registration in &dataset.registrations {
        let Some(ticket) = dataset.tickets.get(registration.ticket_id.index()) else {
            violations.push(format!(
                "registration {} references unknown ticket {}",
                registration.id, registration.ticket_id
            ));
            continue;
        };
        if ticket.event_id != registration.event_id {
            violations.push(format!(
                "registration {} ticket {} belongs to event {}, not {}",
                registration.id, ticket.id, ticket.event_id, registration.event_id
            ));
        }
        if registration.quantity == 0 {
            violations.push(format!("registration {} has zero quantity", registration.id));
        }
        if registration.total_amount != ticket.price.times(registration.quantity) {
            violations.push(format!(
                "registration {} total {} is not {} x {}",
                registration.id, registration.total_amount, registration.quantity, ticket.price
            ));
        }
    }

    let totals = registered_totals(&dataset.registrations);
    for event in &dataset.events {
        let registered = totals.get(&event.id).copied().unwrap_or(0);
        if registered > event.capacity {
            violations.push(format!(
                "event {} registered {} above capacity {}",
                event.id, registered, event.capacity
            ));
        }
        if registered != ledger.consumed_of(event.id) {
            violations.push(format!(
                "event {} registered {} but ledger consumed {}",
                event.id,
                registered,
                ledger.consumed_of(event.id)
            ));
        }
    }
}

fn check_payments(dataset: &Dataset, payment_cap: u32, violations: &mut Vec<String>) {
    let paid = dataset.registrations.iter().filter(|r| r.is_paid()).count();
    let allowed = paid.min(payment_cap as usize);
    if dataset.payments.len() > allowed {
        violations.push(format!(
            "{} payments exceed min({payment_cap}, {paid})",
            dataset.payments.len()
        ));
    }

    let registrations: BTreeMap<RegistrationId, _> = dataset
        .registrations
        .iter()
        .map(|registration| (registration.id, registration))
        .collect();
    for payment in &dataset.payments {
        match registrations.get(&payment.registration_id) {
            Some(registration) => {
                if !registration.is_paid() {
                    violations.push(format!(
                        "payment {} settles unpaid registration {}",
                        payment.id, registration.id
                    ));
                }
                if payment.amount != registration.total_amount {
                    violations.push(format!(
                        "payment {} amount {} differs from registration total {}",
                        payment.id, payment.amount, registration.total_amount
                    ));
                }
                if payment.user_id != registration.user_id {
                    violations.push(format!("payment {} user mismatch", payment.id));
                }
            }
            None => violations.push(format!(
                "payment {} references unknown registration {}",
                payment.id, payment.registration_id
            )),
        }
    }
}

/// Walk registrations and notifications in emission order.
///
/// Each registration owns one confirmation, `sent` exactly when the
/// registration is paid, optionally followed by a reminder that is always
/// pending. Every `sent` notification carries `sent_at`, every other one has
/// none.
pub fn check_notifications(
    registrations: &[Registration],
    notifications: &[Notification],
) -> Vec<String> {
    let mut violations = Vec::new();
    for notification in notifications {
        let sent = notification.status == NotificationStatus::Sent;
        if sent != notification.sent_at.is_some() {
            violations.push(format!(
                "notification {} status {} with sent_at {:?}",
                notification.id, notification.status, notification.sent_at
            ));
        }
    }

    let mut queue = notifications.iter().peekable();
    for registration in registrations {
        let Some(confirmation) = queue.next() else {
            violations.push(format!("registration {} has no confirmation", registration.id));
            continue;
        };
        if confirmation.message != confirmation_message(registration.event_id)
            || confirmation.user_id != registration.user_id
        {
            violations.push(format!(
                "notification {} is not the confirmation of registration {}",
                confirmation.id, registration.id
            ));
        }
        let sent = confirmation.status == NotificationStatus::Sent;
        if sent != registration.is_paid() {
            violations.push(format!(
                "confirmation {} is {} for {} registration {}",
                confirmation.id, confirmation.status, registration.payment_status, registration.id
            ));
        }

        if let Some(reminder) = queue.next_if(|n| n.message == REMINDER_MESSAGE) {
            if reminder.status != NotificationStatus::Pending || reminder.sent_at.is_some() {
                violations.push(format!(
                    "reminder {} for registration {} is not pending",
                    reminder.id, registration.id
                ));
            }
            if reminder.user_id != registration.user_id || reminder.event_id != registration.event_id {
                violations.push(format!(
                    "reminder {} does not follow registration {}",
                    reminder.id, registration.id
                ));
            }
        }
    }
    let leftover = queue.count();
    if leftover > 0 {
        violations.push(format!("{leftover} notifications without a registration"));
    }

    let sent_confirmations = notifications
        .iter()
        .filter(|n| n.status == NotificationStatus::Sent && n.message != REMINDER_MESSAGE)
        .count();
    let paid = registrations.iter().filter(|r| r.is_paid()).count();
    if sent_confirmations != paid {
        violations.push(format!(
            "{sent_confirmations} sent confirmations for {paid} paid registrations"
        ));
    }
    violations
}

fn check_feedback(dataset: &Dataset, violations: &mut Vec<String>) {
    let paid: BTreeSet<(EventId, UserId)> = dataset
        .registrations
        .iter()
        .filter(|r| r.is_paid())
        .map(|r| (r.event_id, r.user_id))
        .collect();
    for feedback in &dataset.feedback {
        if !(1..=5).contains(&feedback.rating) {
            violations.push(format!("feedback {} rating {}", feedback.id, feedback.rating));
        }
        if !paid.contains(&(feedback.event_id, feedback.user_id)) {
            violations.push(format!(
                "feedback {} has no paid registration behind it",
                feedback.id
            ));
        }
    }
}

fn check_waitlists(dataset: &Dataset, violations: &mut Vec<String>) {
    let totals = registered_totals(&dataset.registrations);
    let mut seen = BTreeSet::new();
    for entry in &dataset.waitlists {
        let Some(event) = dataset.events.get(entry.event_id.index()) else {
            violations.push(format!("waitlist {} references unknown event", entry.id));
            continue;
        };
        let registered = totals.get(&event.id).copied().unwrap_or(0);
        if registered < event.capacity {
            violations.push(format!(
                "waitlist {} for event {} below capacity ({registered}/{})",
                entry.id, event.id, event.capacity
            ));
        }
        if !seen.insert((entry.event_id, entry.user_id)) {
            violations.push(format!(
                "user {} waitlisted twice for event {}",
                entry.user_id, entry.event_id
            ));
        }
    }
}

fn check_program(dataset: &Dataset, violations: &mut Vec<String>) {
    for session in &dataset.sessions {
        let Some(event) = dataset.events.get(session.event_id.index()) else {
            violations.push(format!("session {} references unknown event", session.id));
            continue;
        };
        if session.start_time < event.start_time || session.end_time > event.end_time {
            violations.push(format!(
                "session {} falls outside event {}",
                session.id, event.id
            ));
        }
    }

    let mut codes = BTreeSet::new();
    for promotion in &dataset.promotions {
        if !codes.insert(promotion.code.as_str()) {
            violations.push(format!("promotion code {} repeated", promotion.code));
        }
    }
}
