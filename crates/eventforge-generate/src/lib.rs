//! Deterministic dataset generation for the event-management domain.
//!
//! A run draws root entities, allocates registrations against a capacity
//! ledger, derives payments, notifications, feedback and waitlists from the
//! registration outcome, reconciles ticket sales and hands the finished
//! dataset to the file sinks as a publication plan.

pub mod allocator;
pub mod checks;
pub mod dataset;
pub mod engine;
pub mod entities;
pub mod errors;
pub mod ledger;
pub mod model;
pub mod output;
pub mod pipeline;
pub mod provider;
pub mod reconcile;
pub mod rng;

pub use allocator::{AllocationOutcome, AllocationRequest, RegistrationAllocator, RejectionStats};
pub use dataset::{Dataset, PublishStep};
pub use engine::{DatasetGenerator, GenerationResult};
pub use errors::GenerationError;
pub use ledger::{CapacityLedger, Reservation};
pub use model::{AllocationReport, GenerationReport, SinkAction, SinkReport, TableOutcome, TableReport};
pub use output::{CsvSink, SqlScriptSink};
pub use provider::{FakeProvider, ValueProvider};
pub use reconcile::{TicketSale, reconcile_tickets};
