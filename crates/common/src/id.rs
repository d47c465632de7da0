use uuid::Uuid;

/// Returns a new time-ordered identifier.
///
/// Identifiers are UUIDv7 values: the leading bits carry a millisecond
/// timestamp and the generator keeps a per-process counter, so values created
/// later always compare greater, even within the same millisecond. Safe to
/// call from any number of threads.
pub fn new_sequential_id() -> Uuid {
    Uuid::now_v7()
}

/// Declares a strongly typed identifier wrapping a sequential UUID.
///
/// The generated type is `Copy`, ordered by creation time, serializes as a
/// bare UUID string and parses from one.
#[macro_export]
macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
            serde::Serialize, serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name($crate::Uuid);

        impl $name {
            /// Creates a new time-ordered identifier.
            pub fn new() -> Self {
                Self($crate::new_sequential_id())
            }

            /// Wraps an existing UUID.
            pub fn from_uuid(uuid: $crate::Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the underlying UUID.
            pub fn as_uuid(&self) -> $crate::Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $crate::Uuid::parse_str(s).map(Self)
            }
        }

        impl From<$crate::Uuid> for $name {
            fn from(uuid: $crate::Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for $crate::Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}
