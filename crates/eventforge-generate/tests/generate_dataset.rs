use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use eventforge_core::{GenerationPolicy, Record, Ticket};
use eventforge_generate::pipeline::registered_totals;
use eventforge_generate::{
    CsvSink, DatasetGenerator, GenerationError, GenerationResult, SinkAction, SqlScriptSink,
};

fn policy(seed: u64) -> GenerationPolicy {
    GenerationPolicy {
        seed,
        user_count: 300,
        venue_count: 5,
        event_count: 10,
        speaker_count: 20,
        sponsor_count: 8,
        registration_target: 1_500,
        payment_cap: 200,
        ..GenerationPolicy::default()
    }
}

fn generate(policy: GenerationPolicy) -> GenerationResult {
    DatasetGenerator::new(policy).run().expect("generation succeeds")
}

fn temp_out_dir(label: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    dir.push(format!("eventforge_generate_{label}_{}", uuid::Uuid::new_v4()));
    fs::create_dir_all(&dir).expect("create temp out dir");
    dir
}

fn hash_file(path: &Path) -> Result<String, std::io::Error> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = [0_u8; 8192];
    loop {
        let read = file.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }
    Ok(hex::encode(hasher.finalize()))
}

fn hash_dir(dir: &Path) -> BTreeMap<String, String> {
    fs::read_dir(dir)
        .expect("read out dir")
        .map(|entry| entry.expect("dir entry").path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "csv"))
        .map(|path| {
            let name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            (name, hash_file(&path).expect("hash csv"))
        })
        .collect()
}

#[test]
fn dataset_satisfies_cross_entity_properties() {
    let result = generate(policy(42));
    let dataset = &result.dataset;

    assert_eq!(dataset.users.len(), 300);
    assert_eq!(dataset.events.len(), 10);
    assert_eq!(dataset.tickets.len(), 20);
    assert_eq!(dataset.categories.len(), 5);

    for ticket in &dataset.tickets {
        assert!(ticket.quantity_sold <= ticket.quantity_available);
    }

    let totals = registered_totals(&dataset.registrations);
    for event in &dataset.events {
        assert!(totals.get(&event.id).copied().unwrap_or(0) <= event.capacity);
        let sold: u32 = dataset
            .tickets
            .iter()
            .filter(|ticket| ticket.event_id == event.id)
            .map(|ticket| ticket.quantity_sold)
            .sum();
        assert_eq!(sold, totals.get(&event.id).copied().unwrap_or(0));
    }

    for registration in &dataset.registrations {
        let ticket = &dataset.tickets[registration.ticket_id.index()];
        assert_eq!(ticket.event_id, registration.event_id);
        assert_eq!(registration.total_amount, ticket.price.times(registration.quantity));
    }

    let paid = dataset.registrations.iter().filter(|r| r.is_paid()).count();
    assert!(dataset.payments.len() <= paid.min(200));
    for payment in &dataset.payments {
        let registration = &dataset.registrations[payment.registration_id.index()];
        assert!(registration.is_paid());
        assert_eq!(payment.amount, registration.total_amount);
    }

    for entry in &dataset.waitlists {
        let event = &dataset.events[entry.event_id.index()];
        assert!(totals.get(&event.id).copied().unwrap_or(0) >= event.capacity);
    }

    assert_eq!(
        result.report.allocation.fulfilled,
        dataset.registrations.len() as u64
    );
    assert!(result.report.allocation.attempts <= result.report.allocation.attempt_budget);
    assert_eq!(result.report.rows_of("tickets"), Some(20));
}

#[test]
fn legacy_ticket_sizing_still_respects_event_capacity() {
    let result = generate(GenerationPolicy {
        capacity_aware_tickets: false,
        registration_target: 4_000,
        ..policy(5)
    });
    let dataset = &result.dataset;

    let totals = registered_totals(&dataset.registrations);
    for event in &dataset.events {
        assert!(totals.get(&event.id).copied().unwrap_or(0) <= event.capacity);
    }
}

#[test]
fn same_seed_produces_identical_csv_files() {
    let dir_a = temp_out_dir("run_a");
    let dir_b = temp_out_dir("run_b");

    for dir in [&dir_a, &dir_b] {
        let result = generate(policy(99));
        CsvSink::new(dir, false)
            .publish(&result.dataset.publication_plan())
            .expect("publish csv");
    }

    let hashes_a = hash_dir(&dir_a);
    let hashes_b = hash_dir(&dir_b);
    assert_eq!(hashes_a.len(), 16);
    assert_eq!(hashes_a, hashes_b);
}

#[test]
fn different_seeds_diverge() {
    let a = generate(policy(1));
    let b = generate(policy(2));
    assert_ne!(a.dataset.users, b.dataset.users);
}

#[test]
fn csv_sink_skips_existing_files_unless_forced() {
    let dir = temp_out_dir("idempotent");
    let result = generate(policy(7));
    let plan = result.dataset.publication_plan();

    let first = CsvSink::new(&dir, false).publish(&plan).expect("first publish");
    assert_eq!(first.count(SinkAction::Written), 16);
    assert_eq!(first.count(SinkAction::Reconciled), 1);
    let users_hash = hash_file(&dir.join("users.csv")).expect("hash users");

    let second = CsvSink::new(&dir, false).publish(&plan).expect("second publish");
    assert_eq!(second.count(SinkAction::Skipped), 16);
    assert_eq!(second.count(SinkAction::Reconciled), 0);
    assert_eq!(hash_file(&dir.join("users.csv")).expect("hash users"), users_hash);

    let forced = CsvSink::new(&dir, true).publish(&plan).expect("forced publish");
    assert_eq!(forced.count(SinkAction::Overwritten), 16);
    assert_eq!(forced.count(SinkAction::Reconciled), 1);
}

#[test]
fn exported_tickets_carry_reconciled_quantities() {
    let dir = temp_out_dir("tickets");
    let result = generate(policy(11));
    CsvSink::new(&dir, false)
        .publish(&result.dataset.publication_plan())
        .expect("publish csv");

    let mut reader = csv::Reader::from_path(dir.join(format!("{}.csv", Ticket::TABLE)))
        .expect("open tickets.csv");
    let headers = reader.headers().expect("headers").clone();
    assert_eq!(headers.get(0), Some("ticket_id"));
    let sold_column = headers
        .iter()
        .position(|name| name == "quantity_sold")
        .expect("quantity_sold column");

    let mut rows = 0;
    for (record, ticket) in reader.records().zip(&result.dataset.tickets) {
        let record = record.expect("ticket row");
        assert_eq!(record.get(sold_column), Some(ticket.quantity_sold.to_string().as_str()));
        rows += 1;
    }
    assert_eq!(rows, result.dataset.tickets.len());
}

#[test]
fn ticket_file_from_an_earlier_run_is_not_reconciled() {
    let dir = temp_out_dir("kept_tickets");
    let ticket_path = dir.join("tickets.csv");
    fs::write(&ticket_path, "ticket_id\n").expect("seed tickets.csv");

    let result = generate(policy(13));
    let report = CsvSink::new(&dir, false)
        .publish(&result.dataset.publication_plan())
        .expect("publish csv");

    assert_eq!(report.count(SinkAction::Skipped), 1);
    assert_eq!(report.count(SinkAction::Reconciled), 0);
    assert_eq!(fs::read_to_string(&ticket_path).expect("read"), "ticket_id\n");
}

#[test]
fn sql_script_wraps_inserts_and_updates_in_one_transaction() {
    let dir = temp_out_dir("sql");
    let path = dir.join("data_insert.sql");
    let result = generate(policy(17));
    let plan = result.dataset.publication_plan();

    let report = SqlScriptSink::new(&path, false).publish(&plan).expect("write script");
    assert_eq!(report.count(SinkAction::Written), 16);

    let script = fs::read_to_string(&path).expect("read script");
    assert!(script.contains("BEGIN;"));
    assert!(script.trim_end().ends_with("COMMIT;"));
    assert!(script.contains("INSERT INTO users (first_name, last_name, email"));
    let updates = script.lines().filter(|line| line.starts_with("UPDATE tickets")).count();
    assert_eq!(updates, result.dataset.tickets.len());

    let skipped = SqlScriptSink::new(&path, false).publish(&plan).expect("skip script");
    assert_eq!(skipped.count(SinkAction::Skipped), 16);
}

#[test]
fn invalid_policy_is_rejected_before_generation() {
    let result = DatasetGenerator::new(GenerationPolicy {
        feedback_probability: 2.0,
        ..GenerationPolicy::default()
    })
    .run();
    assert!(matches!(result, Err(GenerationError::InvalidPolicy(_))));
}

#[test]
fn report_is_written_as_json() {
    let dir = temp_out_dir("report");
    let path = dir.join("generation_report.json");
    let result = generate(policy(19));

    result.report.write_json(&path).expect("write report");

    let data = fs::read(&path).expect("read report");
    let json: serde_json::Value = serde_json::from_slice(&data).expect("parse report");
    assert_eq!(json["run_id"], result.report.run_id.as_str());
    assert_eq!(json["seed"], 19);
    assert_eq!(
        json["tables"].as_array().map(Vec::len),
        Some(result.report.tables.len())
    );
    assert_eq!(
        json["allocation"]["fulfilled"],
        result.report.allocation.fulfilled
    );
    assert!(!dir.join("generation_report.json.tmp").exists());
}
