//! Entity records of the event-management dataset.
//!
//! Records only hold typed identifiers of the entities they reference, never
//! the entities themselves.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::ids::{
    CategoryId, EventId, FeedbackId, NotificationId, PaymentId, PromotionId, RegistrationId,
    SessionId, SpeakerId, SponsorId, TicketId, UserId, VenueId, WaitlistId,
};
use crate::money::Money;
use crate::table::{Record, Value};

macro_rules! text_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl From<$name> for Value {
            fn from(value: $name) -> Self {
                Value::Text(value.as_str().to_string())
            }
        }
    };
}

text_enum!(
    /// Account role of a user.
    Role {
        Attendee => "attendee",
        Organizer => "organizer",
        Admin => "admin",
    }
);

impl Role {
    /// Organizers and admins may own events.
    pub fn can_organize(self) -> bool {
        matches!(self, Role::Organizer | Role::Admin)
    }
}

text_enum!(
    City {
        Dallas => "Dallas",
        Philadelphia => "Philadelphia",
        NewYork => "New York",
    }
);

impl City {
    pub fn state(self) -> &'static str {
        match self {
            City::Dallas => "TX",
            City::Philadelphia => "PA",
            City::NewYork => "NY",
        }
    }

    /// Approximate city centre as (latitude, longitude).
    pub fn coordinates(self) -> (f64, f64) {
        match self {
            City::Dallas => (32.7767, -96.7970),
            City::Philadelphia => (39.9526, -75.1652),
            City::NewYork => (40.7128, -74.0060),
        }
    }

    pub fn area_codes(self) -> &'static [&'static str] {
        match self {
            City::Dallas => &["214", "469", "972"],
            City::Philadelphia => &["215", "267", "445"],
            City::NewYork => &["212", "646", "718", "917"],
        }
    }
}

text_enum!(
    EventStatus {
        Draft => "draft",
        Published => "published",
        Canceled => "canceled",
        Completed => "completed",
    }
);

text_enum!(
    TicketType {
        GeneralAdmission => "General Admission",
        Vip => "VIP",
    }
);

text_enum!(
    PaymentStatus {
        Paid => "paid",
        Unpaid => "unpaid",
    }
);

text_enum!(
    RegistrationStatus {
        Confirmed => "confirmed",
    }
);

text_enum!(
    PaymentMethod {
        CreditCard => "credit_card",
        Paypal => "paypal",
        BankTransfer => "bank_transfer",
        Cash => "cash",
    }
);

text_enum!(
    PaymentState {
        Completed => "completed",
    }
);

text_enum!(
    NotificationChannel {
        Email => "email",
        Sms => "sms",
        Push => "push",
    }
);

text_enum!(
    NotificationStatus {
        Sent => "sent",
        Pending => "pending",
    }
);

text_enum!(
    SponsorshipLevel {
        Gold => "Gold",
        Silver => "Silver",
        Bronze => "Bronze",
    }
);

text_enum!(
    WaitlistStatus {
        Waiting => "waiting",
        Notified => "notified",
        Registered => "registered",
    }
);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub phone: String,
    pub role: Role,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Record for User {
    const TABLE: &'static str = "users";
    const KEY: Option<&'static str> = Some("user_id");
    const COLUMNS: &'static [&'static str] = &[
        "first_name",
        "last_name",
        "email",
        "password_hash",
        "phone",
        "role",
        "created_at",
        "updated_at",
    ];

    fn key(&self) -> Option<i64> {
        Some(self.id.into())
    }

    fn values(&self) -> Vec<Value> {
        vec![
            self.first_name.clone().into(),
            self.last_name.clone().into(),
            self.email.clone().into(),
            self.password_hash.clone().into(),
            self.phone.clone().into(),
            self.role.into(),
            self.created_at.into(),
            self.updated_at.into(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Venue {
    pub id: VenueId,
    pub name: String,
    pub address: String,
    pub city: City,
    pub country: String,
    pub zip_code: String,
    pub latitude: f64,
    pub longitude: f64,
    pub capacity: u32,
    pub created_at: NaiveDateTime,
}

impl Record for Venue {
    const TABLE: &'static str = "venues";
    const KEY: Option<&'static str> = Some("venue_id");
    const COLUMNS: &'static [&'static str] = &[
        "name",
        "address",
        "city",
        "state",
        "country",
        "zip_code",
        "latitude",
        "longitude",
        "capacity",
        "created_at",
    ];

    fn key(&self) -> Option<i64> {
        Some(self.id.into())
    }

    fn values(&self) -> Vec<Value> {
        vec![
            self.name.clone().into(),
            self.address.clone().into(),
            self.city.into(),
            self.city.state().into(),
            self.country.clone().into(),
            self.zip_code.clone().into(),
            self.latitude.into(),
            self.longitude.into(),
            self.capacity.into(),
            self.created_at.into(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventCategory {
    pub id: CategoryId,
    pub name: String,
    pub description: String,
}

impl Record for EventCategory {
    const TABLE: &'static str = "event_categories";
    const KEY: Option<&'static str> = Some("category_id");
    const COLUMNS: &'static [&'static str] = &["name", "description"];

    fn key(&self) -> Option<i64> {
        Some(self.id.into())
    }

    fn values(&self) -> Vec<Value> {
        vec![self.name.clone().into(), self.description.clone().into()]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub title: String,
    pub description: String,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub organizer_id: UserId,
    pub venue_id: VenueId,
    pub capacity: u32,
    pub status: EventStatus,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Record for Event {
    const TABLE: &'static str = "events";
    const KEY: Option<&'static str> = Some("event_id");
    const COLUMNS: &'static [&'static str] = &[
        "title",
        "description",
        "start_time",
        "end_time",
        "organizer_id",
        "venue_id",
        "capacity",
        "status",
        "created_at",
        "updated_at",
    ];

    fn key(&self) -> Option<i64> {
        Some(self.id.into())
    }

    fn values(&self) -> Vec<Value> {
        vec![
            self.title.clone().into(),
            self.description.clone().into(),
            self.start_time.into(),
            self.end_time.into(),
            i64::from(self.organizer_id).into(),
            i64::from(self.venue_id).into(),
            self.capacity.into(),
            self.status.into(),
            self.created_at.into(),
            self.updated_at.into(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventCategoryMapping {
    pub event_id: EventId,
    pub category_id: CategoryId,
}

impl Record for EventCategoryMapping {
    const TABLE: &'static str = "event_category_mapping";
    const KEY: Option<&'static str> = None;
    const COLUMNS: &'static [&'static str] = &["event_id", "category_id"];

    fn key(&self) -> Option<i64> {
        None
    }

    fn values(&self) -> Vec<Value> {
        vec![
            i64::from(self.event_id).into(),
            i64::from(self.category_id).into(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: TicketId,
    pub event_id: EventId,
    pub ticket_type: TicketType,
    pub price: Money,
    pub quantity_available: u32,
    pub quantity_sold: u32,
    pub sales_start: NaiveDateTime,
    pub sales_end: NaiveDateTime,
    pub created_at: NaiveDateTime,
}

impl Record for Ticket {
    const TABLE: &'static str = "tickets";
    const KEY: Option<&'static str> = Some("ticket_id");
    const COLUMNS: &'static [&'static str] = &[
        "event_id",
        "ticket_type",
        "price",
        "quantity_available",
        "quantity_sold",
        "sales_start",
        "sales_end",
        "created_at",
    ];

    fn key(&self) -> Option<i64> {
        Some(self.id.into())
    }

    fn values(&self) -> Vec<Value> {
        vec![
            i64::from(self.event_id).into(),
            self.ticket_type.into(),
            self.price.into(),
            self.quantity_available.into(),
            self.quantity_sold.into(),
            self.sales_start.into(),
            self.sales_end.into(),
            self.created_at.into(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Registration {
    pub id: RegistrationId,
    pub user_id: UserId,
    pub event_id: EventId,
    pub ticket_id: TicketId,
    pub quantity: u32,
    pub total_amount: Money,
    pub status: RegistrationStatus,
    pub registered_at: NaiveDateTime,
    pub payment_status: PaymentStatus,
}

impl Registration {
    pub fn is_paid(&self) -> bool {
        self.payment_status == PaymentStatus::Paid
    }
}

impl Record for Registration {
    const TABLE: &'static str = "registrations";
    const KEY: Option<&'static str> = Some("registration_id");
    const COLUMNS: &'static [&'static str] = &[
        "user_id",
        "event_id",
        "ticket_id",
        "quantity",
        "total_amount",
        "status",
        "registered_at",
        "payment_status",
    ];

    fn key(&self) -> Option<i64> {
        Some(self.id.into())
    }

    fn values(&self) -> Vec<Value> {
        vec![
            i64::from(self.user_id).into(),
            i64::from(self.event_id).into(),
            i64::from(self.ticket_id).into(),
            self.quantity.into(),
            self.total_amount.into(),
            self.status.into(),
            self.registered_at.into(),
            self.payment_status.into(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub registration_id: RegistrationId,
    pub user_id: UserId,
    pub amount: Money,
    pub method: PaymentMethod,
    pub transaction_id: String,
    pub status: PaymentState,
    pub paid_at: NaiveDateTime,
}

impl Record for Payment {
    const TABLE: &'static str = "payments";
    const KEY: Option<&'static str> = Some("payment_id");
    const COLUMNS: &'static [&'static str] = &[
        "registration_id",
        "user_id",
        "amount",
        "payment_method",
        "transaction_id",
        "payment_status",
        "paid_at",
    ];

    fn key(&self) -> Option<i64> {
        Some(self.id.into())
    }

    fn values(&self) -> Vec<Value> {
        vec![
            i64::from(self.registration_id).into(),
            i64::from(self.user_id).into(),
            self.amount.into(),
            self.method.into(),
            self.transaction_id.clone().into(),
            self.status.into(),
            self.paid_at.into(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub user_id: UserId,
    pub event_id: EventId,
    pub message: String,
    pub channel: NotificationChannel,
    pub status: NotificationStatus,
    pub sent_at: Option<NaiveDateTime>,
}

impl Record for Notification {
    const TABLE: &'static str = "notifications";
    const KEY: Option<&'static str> = Some("notification_id");
    const COLUMNS: &'static [&'static str] =
        &["user_id", "event_id", "message", "type", "status", "sent_at"];

    fn key(&self) -> Option<i64> {
        Some(self.id.into())
    }

    fn values(&self) -> Vec<Value> {
        vec![
            i64::from(self.user_id).into(),
            i64::from(self.event_id).into(),
            self.message.clone().into(),
            self.channel.into(),
            self.status.into(),
            self.sent_at.into(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Speaker {
    pub id: SpeakerId,
    pub first_name: String,
    pub last_name: String,
    pub bio: String,
    pub email: String,
    pub phone: String,
    pub created_at: NaiveDateTime,
}

impl Record for Speaker {
    const TABLE: &'static str = "speakers";
    const KEY: Option<&'static str> = Some("speaker_id");
    const COLUMNS: &'static [&'static str] =
        &["first_name", "last_name", "bio", "email", "phone", "created_at"];

    fn key(&self) -> Option<i64> {
        Some(self.id.into())
    }

    fn values(&self) -> Vec<Value> {
        vec![
            self.first_name.clone().into(),
            self.last_name.clone().into(),
            self.bio.clone().into(),
            self.email.clone().into(),
            self.phone.clone().into(),
            self.created_at.into(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sponsor {
    pub id: SponsorId,
    pub name: String,
    pub description: String,
    pub logo_url: String,
    pub website: String,
    pub created_at: NaiveDateTime,
}

impl Record for Sponsor {
    const TABLE: &'static str = "sponsors";
    const KEY: Option<&'static str> = Some("sponsor_id");
    const COLUMNS: &'static [&'static str] =
        &["name", "description", "logo_url", "website", "created_at"];

    fn key(&self) -> Option<i64> {
        Some(self.id.into())
    }

    fn values(&self) -> Vec<Value> {
        vec![
            self.name.clone().into(),
            self.description.clone().into(),
            self.logo_url.clone().into(),
            self.website.clone().into(),
            self.created_at.into(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub event_id: EventId,
    pub speaker_id: SpeakerId,
    pub title: String,
    pub description: String,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub room: String,
    pub created_at: NaiveDateTime,
}

impl Record for Session {
    const TABLE: &'static str = "sessions";
    const KEY: Option<&'static str> = Some("session_id");
    const COLUMNS: &'static [&'static str] = &[
        "event_id",
        "speaker_id",
        "title",
        "description",
        "start_time",
        "end_time",
        "room",
        "created_at",
    ];

    fn key(&self) -> Option<i64> {
        Some(self.id.into())
    }

    fn values(&self) -> Vec<Value> {
        vec![
            i64::from(self.event_id).into(),
            i64::from(self.speaker_id).into(),
            self.title.clone().into(),
            self.description.clone().into(),
            self.start_time.into(),
            self.end_time.into(),
            self.room.clone().into(),
            self.created_at.into(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventSponsor {
    pub event_id: EventId,
    pub sponsor_id: SponsorId,
    pub level: SponsorshipLevel,
    pub contribution: Money,
}

impl Record for EventSponsor {
    const TABLE: &'static str = "event_sponsors";
    const KEY: Option<&'static str> = None;
    const COLUMNS: &'static [&'static str] = &[
        "event_id",
        "sponsor_id",
        "sponsorship_level",
        "contribution_amount",
    ];

    fn key(&self) -> Option<i64> {
        None
    }

    fn values(&self) -> Vec<Value> {
        vec![
            i64::from(self.event_id).into(),
            i64::from(self.sponsor_id).into(),
            self.level.into(),
            self.contribution.into(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    pub id: FeedbackId,
    pub event_id: EventId,
    pub user_id: UserId,
    pub rating: u8,
    pub comment: String,
    pub submitted_at: NaiveDateTime,
}

impl Record for Feedback {
    const TABLE: &'static str = "feedback";
    const KEY: Option<&'static str> = Some("feedback_id");
    const COLUMNS: &'static [&'static str] =
        &["event_id", "user_id", "rating", "comment", "submitted_at"];

    fn key(&self) -> Option<i64> {
        Some(self.id.into())
    }

    fn values(&self) -> Vec<Value> {
        vec![
            i64::from(self.event_id).into(),
            i64::from(self.user_id).into(),
            self.rating.into(),
            self.comment.clone().into(),
            self.submitted_at.into(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Promotion {
    pub id: PromotionId,
    pub event_id: EventId,
    pub code: String,
    /// Discount in hundredths of a percent.
    pub discount_basis_points: u32,
    pub valid_from: NaiveDateTime,
    pub valid_to: NaiveDateTime,
    pub created_at: NaiveDateTime,
}

impl Record for Promotion {
    const TABLE: &'static str = "promotions";
    const KEY: Option<&'static str> = Some("promotion_id");
    const COLUMNS: &'static [&'static str] = &[
        "event_id",
        "code",
        "discount_percentage",
        "valid_from",
        "valid_to",
        "created_at",
    ];

    fn key(&self) -> Option<i64> {
        Some(self.id.into())
    }

    fn values(&self) -> Vec<Value> {
        vec![
            i64::from(self.event_id).into(),
            self.code.clone().into(),
            // Same two-decimal fixed point as money columns.
            Money::from_cents(i64::from(self.discount_basis_points)).into(),
            self.valid_from.into(),
            self.valid_to.into(),
            self.created_at.into(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waitlist {
    pub id: WaitlistId,
    pub event_id: EventId,
    pub user_id: UserId,
    pub joined_at: NaiveDateTime,
    pub status: WaitlistStatus,
}

impl Record for Waitlist {
    const TABLE: &'static str = "waitlists";
    const KEY: Option<&'static str> = Some("waitlist_id");
    const COLUMNS: &'static [&'static str] = &["event_id", "user_id", "joined_at", "status"];

    fn key(&self) -> Option<i64> {
        Some(self.id.into())
    }

    fn values(&self) -> Vec<Value> {
        vec![
            i64::from(self.event_id).into(),
            i64::from(self.user_id).into(),
            self.joined_at.into(),
            self.status.into(),
        ]
    }
}
