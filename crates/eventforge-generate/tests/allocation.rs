use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use eventforge_core::{
    CountRange, EntityId, Event, EventId, EventStatus, Money, NotificationStatus, PaymentStatus,
    Registration,
    RegistrationId, RegistrationStatus, Role, Ticket, TicketId, TicketType, User, UserId, VenueId,
};
use eventforge_generate::checks::check_notifications;
use eventforge_generate::pipeline::{
    REMINDER_MESSAGE, confirmation_message, derive_feedback, derive_notifications,
    derive_payments, derive_waitlists, registered_totals,
};
use eventforge_generate::{
    AllocationRequest, CapacityLedger, FakeProvider, RegistrationAllocator, reconcile_tickets,
};

fn anchor() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 7, 1)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .expect("anchor")
}

fn users(count: u32) -> Vec<User> {
    (1..=count)
        .map(|id| User {
            id: UserId::new(id),
            first_name: format!("First{id}"),
            last_name: format!("Last{id}"),
            email: format!("user{id}@example.com"),
            password_hash: format!("hash{id}"),
            phone: "214-555-0100".to_string(),
            role: Role::Attendee,
            created_at: anchor(),
            updated_at: anchor(),
        })
        .collect()
}

fn event(id: u32, capacity: u32) -> Event {
    Event {
        id: EventId::new(id),
        title: format!("Event {id}"),
        description: String::new(),
        start_time: anchor(),
        end_time: anchor() + chrono::Duration::hours(3),
        organizer_id: UserId::new(1),
        venue_id: VenueId::new(1),
        capacity,
        status: EventStatus::Published,
        created_at: anchor(),
        updated_at: anchor(),
    }
}

fn ticket(id: u32, event_id: u32, available: u32, price_cents: i64) -> Ticket {
    Ticket {
        id: TicketId::new(id),
        event_id: EventId::new(event_id),
        ticket_type: TicketType::GeneralAdmission,
        price: Money::from_cents(price_cents),
        quantity_available: available,
        quantity_sold: 0,
        sales_start: anchor(),
        sales_end: anchor(),
        created_at: anchor(),
    }
}

fn request(target: u32, attempt_budget: u64) -> AllocationRequest {
    AllocationRequest {
        target,
        attempt_budget,
        max_quantity: 5,
        paid_probability: 0.4,
    }
}

#[test]
fn small_event_caps_registrations() {
    let users = users(10);
    let events = vec![event(1, 3)];
    let mut tickets = vec![ticket(1, 1, 3, 2500)];
    let mut ledger = CapacityLedger::new(&events, &tickets);
    let provider = FakeProvider::new(anchor());
    let mut rng = ChaCha8Rng::seed_from_u64(42);

    let outcome = RegistrationAllocator::new(&users, &events, &tickets, request(5, 50))
        .allocate(&mut ledger, &provider, &mut rng);

    assert!(outcome.registrations.len() <= 3);
    assert!(outcome.attempts <= 50);
    let sold: u32 = outcome.registrations.iter().map(|r| r.quantity).sum();
    assert!(sold <= 3);
    assert_eq!(ledger.consumed_of(EventId::new(1)), sold);

    let sales = reconcile_tickets(&mut tickets, &ledger);
    assert_eq!(sales.len(), 1);
    assert_eq!(tickets[0].quantity_sold, sold);
    assert!(tickets[0].quantity_sold <= tickets[0].quantity_available);
}

#[test]
fn attempt_budget_bounds_an_unsatisfiable_target() {
    let users = users(4);
    let events = vec![event(1, 2)];
    let tickets = vec![ticket(1, 1, 2, 1000)];
    let mut ledger = CapacityLedger::new(&events, &tickets);
    let provider = FakeProvider::new(anchor());
    let mut rng = ChaCha8Rng::seed_from_u64(7);

    let outcome = RegistrationAllocator::new(&users, &events, &tickets, request(100, 30))
        .allocate(&mut ledger, &provider, &mut rng);

    assert!(!outcome.is_fulfilled());
    assert_eq!(outcome.attempts, 30);
    assert_eq!(
        outcome.attempts,
        outcome.registrations.len() as u64 + outcome.rejections.total()
    );
}

#[test]
fn oversized_ticket_pools_never_exceed_event_capacity() {
    let users = users(50);
    let events = vec![event(1, 100), event(2, 40)];
    let tickets = vec![
        ticket(1, 1, 300, 2500),
        ticket(2, 1, 600, 9000),
        ticket(3, 2, 500, 2500),
    ];
    let mut ledger = CapacityLedger::new(&events, &tickets);
    let provider = FakeProvider::new(anchor());
    let mut rng = ChaCha8Rng::seed_from_u64(3);

    let outcome = RegistrationAllocator::new(&users, &events, &tickets, request(1_000, 10_000))
        .allocate(&mut ledger, &provider, &mut rng);

    let totals = registered_totals(&outcome.registrations);
    for event in &events {
        let registered = totals.get(&event.id).copied().unwrap_or(0);
        assert!(registered <= event.capacity);
        assert_eq!(registered, event.capacity, "event {} should fill up", event.id);
    }
    assert!(outcome.rejections.event_full > 0);
    assert_eq!(totals, ledger.consumed_snapshot());
}

#[test]
fn registrations_price_quantity_exactly() {
    let users = users(20);
    let events = vec![event(1, 500)];
    let tickets = vec![ticket(1, 1, 200, 2500), ticket(2, 1, 200, 7999)];
    let mut ledger = CapacityLedger::new(&events, &tickets);
    let provider = FakeProvider::new(anchor());
    let mut rng = ChaCha8Rng::seed_from_u64(11);

    let outcome = RegistrationAllocator::new(&users, &events, &tickets, request(40, 400))
        .allocate(&mut ledger, &provider, &mut rng);

    assert!(outcome.is_fulfilled());
    for registration in &outcome.registrations {
        let ticket = &tickets[registration.ticket_id.index()];
        assert_eq!(ticket.event_id, registration.event_id);
        assert!((1..=5).contains(&registration.quantity));
        assert_eq!(registration.total_amount, ticket.price.times(registration.quantity));
    }
}

#[test]
fn paid_registration_of_two_tickets_pays_fifty() {
    let registration = Registration {
        id: RegistrationId::new(1),
        user_id: UserId::new(1),
        event_id: EventId::new(1),
        ticket_id: TicketId::new(1),
        quantity: 2,
        total_amount: Money::from_cents(2500).times(2),
        status: RegistrationStatus::Confirmed,
        registered_at: anchor(),
        payment_status: PaymentStatus::Paid,
    };
    let provider = FakeProvider::new(anchor());
    let mut rng = ChaCha8Rng::seed_from_u64(1);

    let payments = derive_payments(&[registration.clone()], 1000, &provider, &mut rng);

    assert_eq!(registration.total_amount.to_string(), "50.00");
    assert_eq!(payments.len(), 1);
    assert_eq!(payments[0].registration_id, registration.id);
    assert_eq!(payments[0].amount.to_string(), "50.00");
    assert!(payments[0].transaction_id.starts_with("txn_"));
}

fn registrations(count: u32, paid_every: u32) -> Vec<Registration> {
    (1..=count)
        .map(|id| Registration {
            id: RegistrationId::new(id),
            user_id: UserId::new(id),
            event_id: EventId::new(1 + id % 2),
            ticket_id: TicketId::new(1),
            quantity: 1,
            total_amount: Money::from_cents(1000),
            status: RegistrationStatus::Confirmed,
            registered_at: anchor(),
            payment_status: if id % paid_every == 0 {
                PaymentStatus::Paid
            } else {
                PaymentStatus::Unpaid
            },
        })
        .collect()
}

#[test]
fn payments_take_the_first_paid_registrations_up_to_the_cap() {
    let registrations = registrations(30, 3);
    let provider = FakeProvider::new(anchor());
    let mut rng = ChaCha8Rng::seed_from_u64(5);

    let payments = derive_payments(&registrations, 4, &provider, &mut rng);

    let ids: Vec<u32> = payments.iter().map(|p| p.registration_id.get()).collect();
    assert_eq!(ids, vec![3, 6, 9, 12]);
}

#[test]
fn notifications_follow_payment_status() {
    let registrations = registrations(40, 2);
    let provider = FakeProvider::new(anchor());
    let mut rng = ChaCha8Rng::seed_from_u64(9);

    let notifications = derive_notifications(&registrations, 0.5, &provider, &mut rng);

    assert!(notifications.len() >= registrations.len());
    assert!(notifications.len() <= registrations.len() * 2);
    let mut queue = notifications.iter().peekable();
    for registration in &registrations {
        let confirmation = queue.next().expect("confirmation per registration");
        assert_eq!(confirmation.message, confirmation_message(registration.event_id));
        assert_eq!(confirmation.user_id, registration.user_id);
        assert_eq!(
            confirmation.status == NotificationStatus::Sent,
            registration.is_paid()
        );
        assert_eq!(confirmation.sent_at.is_some(), registration.is_paid());
        if let Some(reminder) = queue.next_if(|n| n.message == REMINDER_MESSAGE) {
            assert_eq!(reminder.status, NotificationStatus::Pending);
            assert!(reminder.sent_at.is_none());
            assert_eq!(reminder.event_id, registration.event_id);
        }
    }
    assert!(queue.next().is_none());
    assert!(check_notifications(&registrations, &notifications).is_empty());
}

#[test]
fn sent_confirmation_for_unpaid_registration_is_a_violation() {
    let registrations = registrations(20, 2);
    let provider = FakeProvider::new(anchor());
    let mut rng = ChaCha8Rng::seed_from_u64(21);
    let mut notifications = derive_notifications(&registrations, 1.0, &provider, &mut rng);
    let unpaid = registrations.iter().filter(|r| !r.is_paid()).count();
    assert!(unpaid > 0);

    for notification in &mut notifications {
        notification.status = NotificationStatus::Sent;
        notification.sent_at = Some(anchor());
    }
    let violations = check_notifications(&registrations, &notifications);

    assert!(violations.iter().any(|v| v.contains("for unpaid registration")));
    assert!(violations.iter().any(|v| v.starts_with("reminder") && v.ends_with("is not pending")));
    assert!(violations.iter().any(|v| v.contains("sent confirmations for")));
}

#[test]
fn feedback_only_comes_from_paid_registrations() {
    let registrations = registrations(60, 4);
    let provider = FakeProvider::new(anchor());
    let mut rng = ChaCha8Rng::seed_from_u64(13);

    let feedback = derive_feedback(&registrations, 1.0, &provider, &mut rng);

    assert_eq!(feedback.len(), 15);
    for entry in &feedback {
        assert_eq!(entry.user_id.get() % 4, 0);
        assert!((1..=5).contains(&entry.rating));
    }
}

#[test]
fn waitlists_only_for_full_events() {
    let users = users(30);
    let events = vec![event(1, 10), event(2, 10)];
    let totals: BTreeMap<EventId, u32> =
        [(EventId::new(1), 10), (EventId::new(2), 9)].into_iter().collect();
    let provider = FakeProvider::new(anchor());
    let mut rng = ChaCha8Rng::seed_from_u64(17);

    let waitlists = derive_waitlists(
        &events,
        &users,
        &totals,
        CountRange::new(10, 50),
        &provider,
        &mut rng,
    );

    assert!((10..=30).contains(&waitlists.len()));
    assert!(waitlists.iter().all(|w| w.event_id == EventId::new(1)));
    let mut seen: Vec<_> = waitlists.iter().map(|w| w.user_id).collect();
    seen.sort();
    seen.dedup();
    assert_eq!(seen.len(), waitlists.len());
}
