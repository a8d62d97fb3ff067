//! Core contracts shared across eventforge crates.
//!
//! Defines typed identifiers, the entity model, table cells and the
//! generation policy consumed by the generator and the sinks.

pub mod error;
pub mod ids;
pub mod model;
pub mod money;
pub mod policy;
pub mod redaction;
pub mod table;

pub use error::{Error, Result};
pub use ids::{
    CategoryId, EntityId, EventId, FeedbackId, IdAllocator, NotificationId, PaymentId,
    PromotionId, RegistrationId, SessionId, SpeakerId, SponsorId, TicketId, UserId, VenueId,
    WaitlistId,
};
pub use model::{
    City, Event, EventCategory, EventCategoryMapping, EventSponsor, EventStatus, Feedback,
    Notification, NotificationChannel, NotificationStatus, Payment, PaymentMethod, PaymentState,
    PaymentStatus, Promotion, Registration, RegistrationStatus, Role, Session, Speaker, Sponsor,
    SponsorshipLevel, Ticket, TicketType, User, Venue, Waitlist, WaitlistStatus,
};
pub use money::Money;
pub use policy::{CountRange, GenerationPolicy};
pub use redaction::{RedactedConnection, redact_connection_string};
pub use table::{Record, Row, TIMESTAMP_FORMAT, TableData, Value};
