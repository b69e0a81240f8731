//! Display/FromStr generation for unit-variant state enums.
//!
//! ```rust
//! use glucolink_domain::impl_state_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Phase {
//!     Warmup,
//!     Active,
//! }
//!
//! impl_state_conversions!(Phase {
//!     Warmup => "warmup",
//!     Active => "active",
//! });
//!
//! assert_eq!(Phase::Active.to_string(), "active");
//! assert_eq!("WARMUP".parse::<Phase>(), Ok(Phase::Warmup));
//! ```

/// Implements `Display` (lowercase label) and case-insensitive `FromStr` for
/// an enum whose variants carry no data.
#[macro_export]
macro_rules! impl_state_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(Self::$variant => f.write_str($str),)+
                }
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.to_lowercase().as_str() {
                    $($str => Ok(Self::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($enum_name), s)),
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Light {
        Red,
        Green,
    }

    impl_state_conversions!(Light {
        Red => "red",
        Green => "green",
    });

    #[test]
    fn display_uses_label() {
        assert_eq!(Light::Red.to_string(), "red");
        assert_eq!(format!("{}", Light::Green), "green");
    }

    #[test]
    fn parse_ignores_case() {
        assert_eq!(Light::from_str("GREEN").unwrap(), Light::Green);
        assert_eq!(Light::from_str("rEd").unwrap(), Light::Red);
    }

    #[test]
    fn parse_rejects_unknown_label() {
        let err = Light::from_str("amber").unwrap_err();
        assert!(err.contains("Light"));
        assert!(err.contains("amber"));
    }
}
