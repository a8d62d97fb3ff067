//! Typed entity identifiers and the dense identity allocator.
//!
//! Every entity type owns its own 1-based identifier space. Identifiers are
//! handed out in insertion order and never reused, so the n-th record of a
//! table always carries id `n`.

use std::fmt;
use std::marker::PhantomData;

use serde::{Deserialize, Serialize};

/// Marker for identifier newtypes produced by [`IdAllocator`].
pub trait EntityId: Copy + Ord + fmt::Display {
    fn from_raw(raw: u32) -> Self;
    fn get(self) -> u32;
}

macro_rules! entity_id {
    ($($(#[$meta:meta])* $name:ident),+ $(,)?) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
            #[serde(transparent)]
            pub struct $name(u32);

            impl $name {
                pub const fn new(raw: u32) -> Self {
                    Self(raw)
                }

                /// Zero-based position of the record inside its table.
                pub const fn index(self) -> usize {
                    self.0.saturating_sub(1) as usize
                }
            }

            impl EntityId for $name {
                fn from_raw(raw: u32) -> Self {
                    Self(raw)
                }

                fn get(self) -> u32 {
                    self.0
                }
            }

            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    write!(f, "{}", self.0)
                }
            }

            impl From<$name> for i64 {
                fn from(value: $name) -> Self {
                    i64::from(value.0)
                }
            }
        )+
    };
}

entity_id!(
    UserId,
    VenueId,
    CategoryId,
    EventId,
    TicketId,
    RegistrationId,
    PaymentId,
    NotificationId,
    SpeakerId,
    SponsorId,
    SessionId,
    FeedbackId,
    PromotionId,
    WaitlistId,
);

/// Hands out dense sequential identifiers for one entity type.
#[derive(Debug, Clone)]
pub struct IdAllocator<T> {
    last: u32,
    _marker: PhantomData<T>,
}

impl<T: EntityId> IdAllocator<T> {
    pub fn new() -> Self {
        Self {
            last: 0,
            _marker: PhantomData,
        }
    }

    /// Allocate the next identifier (the first call yields 1).
    pub fn next_id(&mut self) -> T {
        self.last += 1;
        T::from_raw(self.last)
    }

    /// Number of identifiers handed out so far.
    pub fn allocated(&self) -> u32 {
        self.last
    }
}

impl<T: EntityId> Default for IdAllocator<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocates_dense_one_based_ids() {
        let mut ids = IdAllocator::<TicketId>::new();
        let first = ids.next_id();
        let second = ids.next_id();
        assert_eq!(first, TicketId::new(1));
        assert_eq!(second.get(), 2);
        assert_eq!(second.index(), 1);
        assert_eq!(ids.allocated(), 2);
    }

    #[test]
    fn allocators_are_scoped_per_entity() {
        let mut users = IdAllocator::<UserId>::new();
        let mut events = IdAllocator::<EventId>::new();
        users.next_id();
        users.next_id();
        assert_eq!(events.next_id(), EventId::new(1));
    }
}
