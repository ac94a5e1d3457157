//! Helper macro for enumerations persisted as TEXT columns.
//!
//! Each variant carries its database value and its Spanish display label.
//! The database enforces the same value set through CHECK constraints.

macro_rules! define_text_enum {
    (
        $(#[$meta:meta])*
        $name:ident ($what:literal) {
            $( $(#[$vmeta:meta])* $variant:ident = ($val:literal, $label:literal) ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $val)] $variant ),+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Database value.
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $val),+
                }
            }

            /// Human-readable (Spanish) label.
            pub fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }

            /// Label for a stored value, falling back to the raw value when it
            /// is not recognised.
            pub fn label_or_raw(value: &str) -> &str {
                match value {
                    $($val => $label,)+
                    other => other,
                }
            }

            /// Parse a stored value, producing a validation error listing the
            /// accepted values.
            pub fn parse(value: &str) -> Result<Self, $crate::error::CoreError> {
                value.parse()
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::error::CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($val => Ok($name::$variant),)+
                    other => Err($crate::error::CoreError::Validation(format!(
                        "Invalid {}: '{}'. Valid values: {}",
                        $what,
                        other,
                        [$($val),+].join(", ")
                    ))),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}
