use serde::{Deserialize, Serialize};

macro_rules! int_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wraps a raw database identifier.
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            /// Returns the raw identifier.
            pub const fn get(&self) -> i64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

int_id!(
    /// Identifier of a persisted order, generated by the store on commit.
    OrderId
);

int_id!(
    /// Identifier of a customer account (owned by the user directory).
    CustomerId
);

int_id!(
    /// Identifier of a carrier (courier) account.
    CarrierId
);

int_id!(
    /// Identifier of a catalog product.
    ProductId
);
