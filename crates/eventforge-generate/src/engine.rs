use std::time::Instant;

use tracing::{info, warn};

use eventforge_core::GenerationPolicy;

use crate::allocator::{AllocationRequest, RegistrationAllocator};
use crate::checks::verify_dataset;
use crate::dataset::Dataset;
use crate::entities;
use crate::errors::GenerationError;
use crate::ledger::CapacityLedger;
use crate::model::{AllocationReport, GenerationReport};
use crate::pipeline;
use crate::provider::{FakeProvider, ValueProvider};
use crate::reconcile::reconcile_tickets;
use crate::rng::stage_rng;

/// Result of a generation run.
#[derive(Debug, Clone)]
pub struct GenerationResult {
    pub dataset: Dataset,
    pub report: GenerationReport,
}

/// Entry point for generating an event-management dataset from a policy.
pub struct DatasetGenerator {
    policy: GenerationPolicy,
    provider: Box<dyn ValueProvider>,
}

impl DatasetGenerator {
    pub fn new(policy: GenerationPolicy) -> Self {
        let provider = Box::new(FakeProvider::new(policy.anchor));
        Self { policy, provider }
    }

    pub fn with_provider(policy: GenerationPolicy, provider: Box<dyn ValueProvider>) -> Self {
        Self { policy, provider }
    }

    pub fn policy(&self) -> &GenerationPolicy {
        &self.policy
    }

    /// Run every stage in dependency order and verify the result.
    pub fn run(&self) -> Result<GenerationResult, GenerationError> {
        let start = Instant::now();
        let policy = &self.policy;
        policy.validate()?;

        let run_id = uuid::Uuid::new_v4().to_string();
        let seed = policy.seed;
        let provider = self.provider.as_ref();
        info!(run_id = %run_id, seed, anchor = %policy.anchor, "generation started");

        let users = entities::generate_users(policy.user_count, provider, &mut stage_rng(seed, "users"));
        let venues =
            entities::generate_venues(policy.venue_count, provider, &mut stage_rng(seed, "venues"));
        let categories = entities::event_categories();
        let events = entities::generate_events(
            policy.event_count,
            &users,
            &venues,
            provider,
            &mut stage_rng(seed, "events"),
        )?;
        let mut tickets = entities::generate_tickets(
            &events,
            policy.capacity_aware_tickets,
            provider,
            &mut stage_rng(seed, "tickets"),
        );
        let category_mappings = entities::map_event_categories(
            &events,
            &categories,
            policy.categories_per_event,
            &mut stage_rng(seed, "event_category_mapping"),
        );
        info!(
            users = users.len(),
            venues = venues.len(),
            events = events.len(),
            tickets = tickets.len(),
            "catalog generated"
        );

        let mut ledger = CapacityLedger::new(&events, &tickets);
        let request = AllocationRequest {
            target: policy.registration_target,
            attempt_budget: policy.attempt_budget(),
            max_quantity: policy.max_quantity_per_registration,
            paid_probability: policy.paid_probability,
        };
        let outcome = RegistrationAllocator::new(&users, &events, &tickets, request).allocate(
            &mut ledger,
            provider,
            &mut stage_rng(seed, "registrations"),
        );
        if !outcome.is_fulfilled() {
            warn!(
                target_count = outcome.target,
                emitted = outcome.registrations.len(),
                attempts = outcome.attempts,
                "registration target not reached"
            );
        }
        info!(
            registrations = outcome.registrations.len(),
            attempts = outcome.attempts,
            rejected = outcome.rejections.total(),
            "registrations allocated"
        );

        let ticket_sales = reconcile_tickets(&mut tickets, &ledger);
        let registrations = &outcome.registrations;

        let payments = pipeline::derive_payments(
            registrations,
            policy.payment_cap,
            provider,
            &mut stage_rng(seed, "payments"),
        );
        let notifications = pipeline::derive_notifications(
            registrations,
            policy.reminder_probability,
            provider,
            &mut stage_rng(seed, "notifications"),
        );
        let speakers = entities::generate_speakers(
            policy.speaker_count,
            provider,
            &mut stage_rng(seed, "speakers"),
        );
        let sponsors = entities::generate_sponsors(
            policy.sponsor_count,
            provider,
            &mut stage_rng(seed, "sponsors"),
        );
        let sessions = entities::generate_sessions(
            &events,
            &speakers,
            policy.sessions_per_event,
            provider,
            &mut stage_rng(seed, "sessions"),
        );
        let event_sponsors = entities::assign_event_sponsors(
            &events,
            &sponsors,
            policy.max_sponsors_per_event,
            &mut stage_rng(seed, "event_sponsors"),
        );
        let feedback = pipeline::derive_feedback(
            registrations,
            policy.feedback_probability,
            provider,
            &mut stage_rng(seed, "feedback"),
        );
        let promotions = entities::generate_promotions(
            &events,
            policy.max_promotions_per_event,
            provider,
            &mut stage_rng(seed, "promotions"),
        );
        let totals = pipeline::registered_totals(registrations);
        let waitlists = pipeline::derive_waitlists(
            &events,
            &users,
            &totals,
            policy.waitlist_size,
            provider,
            &mut stage_rng(seed, "waitlists"),
        );

        let allocation = AllocationReport::from_outcome(&outcome, policy.attempt_budget());
        let dataset = Dataset {
            users,
            venues,
            categories,
            events,
            category_mappings,
            tickets,
            registrations: outcome.registrations,
            payments,
            notifications,
            speakers,
            sponsors,
            sessions,
            event_sponsors,
            feedback,
            promotions,
            waitlists,
            ticket_sales,
        };

        let violations = verify_dataset(&dataset, &ledger, policy.payment_cap);
        if !violations.is_empty() {
            warn!(run_id = %run_id, violations = violations.len(), "dataset failed verification");
            return Err(GenerationError::InvariantViolation(violations));
        }

        let mut report = GenerationReport::new(run_id.clone(), seed);
        report.allocation = allocation;
        for (table, rows) in dataset.table_sizes() {
            report.record_table(table, rows);
        }
        report.duration_ms = start.elapsed().as_millis() as u64;

        info!(
            run_id = %run_id,
            tables = report.tables.len(),
            duration_ms = report.duration_ms,
            "generation completed"
        );
        Ok(GenerationResult { dataset, report })
    }
}
