//! Newtype identifiers for SeatDesk entities.
//!
//! Distinct types keep a `BookingId` from being passed where a
//! `NotificationId` is expected. With the `sqlx` feature each UUID-backed
//! id also implements `sqlx::Type`, `sqlx::Encode`, and `sqlx::Decode`
//! for PostgreSQL.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Macro to define a newtype ID wrapper around `Uuid`.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Create an identifier from an existing UUID.
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Return the inner UUID value.
            pub fn into_uuid(self) -> Uuid {
                self.0
            }

            /// Return a reference to the inner UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Uuid {
                id.0
            }
        }

        #[cfg(feature = "sqlx")]
        impl sqlx::Type<sqlx::Postgres> for $name {
            fn type_info() -> sqlx::postgres::PgTypeInfo {
                <Uuid as sqlx::Type<sqlx::Postgres>>::type_info()
            }
        }

        #[cfg(feature = "sqlx")]
        impl<'q> sqlx::Encode<'q, sqlx::Postgres> for $name {
            fn encode_by_ref(
                &self,
                buf: &mut <sqlx::Postgres as sqlx::Database>::ArgumentBuffer<'q>,
            ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
                <Uuid as sqlx::Encode<'q, sqlx::Postgres>>::encode_by_ref(&self.0, buf)
            }
        }

        #[cfg(feature = "sqlx")]
        impl<'r> sqlx::Decode<'r, sqlx::Postgres> for $name {
            fn decode(
                value: <sqlx::Postgres as sqlx::Database>::ValueRef<'r>,
            ) -> Result<Self, sqlx::error::BoxDynError> {
                <Uuid as sqlx::Decode<'r, sqlx::Postgres>>::decode(value).map(Self)
            }
        }
    };
}

define_id!(
    /// Unique identifier for a seat booking request.
    BookingId
);

define_id!(
    /// Unique identifier for a library (seat inventory owner).
    LibraryId
);

define_id!(
    /// Unique identifier for a notification record.
    NotificationId
);

define_id!(
    /// Unique identifier for a notification recipient.
    RecipientId
);

define_id!(
    /// Unique identifier for a provisioned customer account.
    AccountId
);

define_id!(
    /// Unique identifier for an activated subscription.
    SubscriptionId
);

define_id!(
    /// Unique identifier for a task with a due date.
    TaskId
);

define_id!(
    /// Unique identifier for an exam with a scheduled date.
    ExamId
);

impl From<AccountId> for RecipientId {
    fn from(account_id: AccountId) -> Self {
        Self(account_id.0)
    }
}

/// External payment order identifier issued on order creation.
///
/// Order ids are opaque strings (e.g. `order_4f9c2a71b0de13`) rather than
/// UUIDs because they travel through the payment provider's callbacks.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
#[serde(transparent)]
pub struct OrderId(pub String);

impl OrderId {
    /// Issue a fresh order id with the given prefix.
    pub fn issue(prefix: &str) -> Self {
        let simple = Uuid::new_v4().simple().to_string();
        Self(format!("{prefix}{}", &simple[..14]))
    }

    /// Return the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OrderId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_booking_id_new_is_unique() {
        assert_ne!(BookingId::new(), BookingId::new());
    }

    #[test]
    fn test_booking_id_from_str() {
        let uuid = Uuid::new_v4();
        let id: BookingId = uuid.to_string().parse().expect("should parse");
        assert_eq!(id.into_uuid(), uuid);
    }

    #[test]
    fn test_order_id_issue_uses_prefix() {
        let id = OrderId::issue("order_");
        assert!(id.as_str().starts_with("order_"));
        assert_eq!(id.as_str().len(), "order_".len() + 14);
        assert_ne!(id, OrderId::issue("order_"));
    }
}
