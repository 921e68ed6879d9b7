//! Newtype IDs for type-safe identifiers.
//!
//! Document ids are assigned by the store, so these types only wrap and
//! never generate.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Macro to generate newtype ID structs.
macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from a string.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the ID as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume and return the inner string.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(
    /// Id of a document in the `products` collection.
    ProductId
);
define_id!(
    /// Id of a document in the `orders` collection.
    OrderId
);
define_id!(
    /// Opaque reference the payment gateway hands back on success.
    PaymentReference
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_from_string() {
        let id: ProductId = "paracetamol".into();
        assert_eq!(id.as_str(), "paracetamol");
        assert_eq!(format!("{}", id), "paracetamol");
    }

    #[test]
    fn test_id_serializes_as_plain_string() {
        let reference = PaymentReference::new("PAY123");
        assert_eq!(serde_json::to_string(&reference).unwrap(), "\"PAY123\"");

        let order: OrderId = serde_json::from_str("\"ord-1\"").unwrap();
        assert_eq!(order, OrderId::new("ord-1"));
    }
}
