//! Realistic value provider.
//!
//! Field-level values (names, addresses, free text, dates) come from a
//! [`ValueProvider`]. Providers hold no random state: every call receives the
//! caller's stream, which keeps a run reproducible from its seed.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, Utc};
use fake::Fake;
use fake::faker::address::en::{BuildingNumber, StreetName, ZipCode};
use fake::faker::chrono::en::DateTimeBetween;
use fake::faker::company::en::{CatchPhrase, CompanyName};
use fake::faker::internet::en::DomainSuffix;
use fake::faker::lorem::en::{Paragraph, Sentence, Word};
use fake::faker::name::en::{FirstName, LastName};
use rand::RngCore;

pub trait ValueProvider {
    fn first_name(&self, rng: &mut dyn RngCore) -> String;
    fn last_name(&self, rng: &mut dyn RngCore) -> String;
    fn company(&self, rng: &mut dyn RngCore) -> String;
    fn catch_phrase(&self, rng: &mut dyn RngCore) -> String;
    fn street_address(&self, rng: &mut dyn RngCore) -> String;
    fn zip_code(&self, rng: &mut dyn RngCore) -> String;
    /// A sentence of roughly `words` words.
    fn sentence(&self, words: usize, rng: &mut dyn RngCore) -> String;
    /// A paragraph of roughly `sentences` sentences.
    fn paragraph(&self, sentences: usize, rng: &mut dyn RngCore) -> String;
    fn word(&self, rng: &mut dyn RngCore) -> String;
    fn url(&self, rng: &mut dyn RngCore) -> String;
    /// A moment after the anchor, at most `horizon` later.
    fn future_datetime(&self, horizon: Duration, rng: &mut dyn RngCore) -> NaiveDateTime;
    /// A moment between the start of the anchor's year and the anchor.
    fn date_time_this_year(&self, rng: &mut dyn RngCore) -> NaiveDateTime;
    fn uuid(&self, rng: &mut dyn RngCore) -> String;
}

/// [`ValueProvider`] backed by the `fake` crate (en locale).
#[derive(Debug, Clone)]
pub struct FakeProvider {
    anchor: NaiveDateTime,
}

impl FakeProvider {
    /// `anchor` plays the role of "now" for relative dates.
    pub fn new(anchor: NaiveDateTime) -> Self {
        Self { anchor }
    }

    fn between(&self, start: NaiveDateTime, end: NaiveDateTime, rng: &mut dyn RngCore) -> NaiveDateTime {
        if end <= start {
            return start;
        }
        let value: DateTime<Utc> = DateTimeBetween(start.and_utc(), end.and_utc()).fake_with_rng(rng);
        // Second precision matches the exported timestamp layout.
        DateTime::from_timestamp(value.timestamp(), 0)
            .unwrap_or(value)
            .naive_utc()
    }
}

impl ValueProvider for FakeProvider {
    fn first_name(&self, rng: &mut dyn RngCore) -> String {
        FirstName().fake_with_rng(rng)
    }

    fn last_name(&self, rng: &mut dyn RngCore) -> String {
        LastName().fake_with_rng(rng)
    }

    fn company(&self, rng: &mut dyn RngCore) -> String {
        CompanyName().fake_with_rng(rng)
    }

    fn catch_phrase(&self, rng: &mut dyn RngCore) -> String {
        CatchPhrase().fake_with_rng(rng)
    }

    fn street_address(&self, rng: &mut dyn RngCore) -> String {
        let number: String = BuildingNumber().fake_with_rng(rng);
        let street: String = StreetName().fake_with_rng(rng);
        format!("{number} {street}")
    }

    fn zip_code(&self, rng: &mut dyn RngCore) -> String {
        ZipCode().fake_with_rng(rng)
    }

    fn sentence(&self, words: usize, rng: &mut dyn RngCore) -> String {
        let words = words.max(1);
        Sentence(words..words + 2).fake_with_rng(rng)
    }

    fn paragraph(&self, sentences: usize, rng: &mut dyn RngCore) -> String {
        let sentences = sentences.max(1);
        Paragraph(sentences..sentences + 1).fake_with_rng(rng)
    }

    fn word(&self, rng: &mut dyn RngCore) -> String {
        Word().fake_with_rng(rng)
    }

    fn url(&self, rng: &mut dyn RngCore) -> String {
        let name: String = Word().fake_with_rng(rng);
        let suffix: String = DomainSuffix().fake_with_rng(rng);
        format!("https://www.{}.{suffix}/", name.to_lowercase())
    }

    fn future_datetime(&self, horizon: Duration, rng: &mut dyn RngCore) -> NaiveDateTime {
        let start = self.anchor + Duration::seconds(1);
        self.between(start, self.anchor + horizon, rng)
    }

    fn date_time_this_year(&self, rng: &mut dyn RngCore) -> NaiveDateTime {
        let start = NaiveDate::from_ymd_opt(self.anchor.year(), 1, 1)
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .unwrap_or(self.anchor);
        self.between(start, self.anchor, rng)
    }

    fn uuid(&self, rng: &mut dyn RngCore) -> String {
        let mut bytes = [0_u8; 16];
        rng.fill_bytes(&mut bytes);
        uuid::Builder::from_random_bytes(bytes)
            .into_uuid()
            .to_string()
    }
}
