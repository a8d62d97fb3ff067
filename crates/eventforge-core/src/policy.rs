use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Inclusive integer range used by policy knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountRange {
    pub min: u32,
    pub max: u32,
}

impl CountRange {
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    fn validate(&self, name: &str) -> Result<()> {
        if self.min > self.max {
            return Err(Error::InvalidPolicy(format!(
                "{name}: min {} is greater than max {}",
                self.min, self.max
            )));
        }
        Ok(())
    }
}

/// Generation policy: entity counts, probabilities and sizing ranges.
///
/// Every field has a default so partial TOML tables are accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationPolicy {
    /// Seed for every pseudo-random stream of the run.
    pub seed: u64,
    /// Fixed "now" that relative dates are computed from.
    pub anchor: NaiveDateTime,
    pub user_count: u32,
    pub venue_count: u32,
    pub event_count: u32,
    pub speaker_count: u32,
    pub sponsor_count: u32,
    /// Registrations the allocator tries to emit.
    pub registration_target: u32,
    /// Attempt budget expressed as a multiple of the registration target.
    pub attempt_multiplier: u32,
    pub max_quantity_per_registration: u32,
    pub payment_cap: u32,
    pub paid_probability: f64,
    pub reminder_probability: f64,
    pub feedback_probability: f64,
    pub waitlist_size: CountRange,
    pub sessions_per_event: CountRange,
    pub categories_per_event: CountRange,
    pub max_sponsors_per_event: u32,
    pub max_promotions_per_event: u32,
    /// Size ticket pools so each event's tickets fit its capacity.
    pub capacity_aware_tickets: bool,
}

impl Default for GenerationPolicy {
    fn default() -> Self {
        Self {
            seed: 42,
            anchor: default_anchor(),
            user_count: 500,
            venue_count: 10,
            event_count: 15,
            speaker_count: 50,
            sponsor_count: 20,
            registration_target: 2500,
            attempt_multiplier: 10,
            max_quantity_per_registration: 5,
            payment_cap: 1000,
            paid_probability: 0.4,
            reminder_probability: 0.5,
            feedback_probability: 0.3,
            waitlist_size: CountRange::new(10, 50),
            sessions_per_event: CountRange::new(1, 5),
            categories_per_event: CountRange::new(1, 3),
            max_sponsors_per_event: 3,
            max_promotions_per_event: 2,
            capacity_aware_tickets: true,
        }
    }
}

fn default_anchor() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 7, 1)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
}

impl GenerationPolicy {
    /// Hard ceiling on allocator draws.
    pub fn attempt_budget(&self) -> u64 {
        u64::from(self.registration_target) * u64::from(self.attempt_multiplier)
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("paid_probability", self.paid_probability),
            ("reminder_probability", self.reminder_probability),
            ("feedback_probability", self.feedback_probability),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::InvalidPolicy(format!(
                    "{name} must be within [0, 1], got {value}"
                )));
            }
        }

        for (name, value) in [
            ("user_count", self.user_count),
            ("venue_count", self.venue_count),
            ("event_count", self.event_count),
            ("speaker_count", self.speaker_count),
            ("max_quantity_per_registration", self.max_quantity_per_registration),
        ] {
            if value == 0 {
                return Err(Error::InvalidPolicy(format!("{name} must be positive")));
            }
        }

        self.waitlist_size.validate("waitlist_size")?;
        self.sessions_per_event.validate("sessions_per_event")?;
        self.categories_per_event.validate("categories_per_event")?;
        if self.categories_per_event.min == 0 {
            return Err(Error::InvalidPolicy(
                "categories_per_event: min must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_constants() {
        let policy = GenerationPolicy::default();
        assert_eq!(policy.registration_target, 2500);
        assert_eq!(policy.attempt_budget(), 25_000);
        assert_eq!(policy.payment_cap, 1000);
        assert_eq!(policy.waitlist_size, CountRange::new(10, 50));
        assert!(policy.validate().is_ok());
    }

    #[test]
    fn rejects_out_of_range_probability() {
        let policy = GenerationPolicy {
            paid_probability: 1.5,
            ..GenerationPolicy::default()
        };
        assert!(matches!(policy.validate(), Err(Error::InvalidPolicy(_))));
    }

    #[test]
    fn rejects_inverted_range() {
        let policy = GenerationPolicy {
            waitlist_size: CountRange::new(50, 10),
            ..GenerationPolicy::default()
        };
        assert!(policy.validate().is_err());
    }
}
