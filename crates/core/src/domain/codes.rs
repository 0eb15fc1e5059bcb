use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Reservation booking designator, e.g. `Y` or `M`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BookingCode(String);

/// Two or three character airline designator.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CarrierCode(String);

/// City or airport code.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LocCode(String);

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FareId(pub String);

impl BookingCode {
    pub fn parse(value: &str) -> Result<Self, DomainError> {
        let value = value.trim();
        check_code("booking code", value, 1..=2, |ch| ch.is_ascii_alphanumeric())?;
        Ok(Self(value.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl CarrierCode {
    pub fn parse(value: &str) -> Result<Self, DomainError> {
        let value = value.trim();
        check_code("carrier code", value, 2..=3, |ch| ch.is_ascii_alphanumeric())?;
        Ok(Self(value.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl LocCode {
    pub fn parse(value: &str) -> Result<Self, DomainError> {
        let value = value.trim();
        check_code("location code", value, 3..=5, |ch| ch.is_ascii_alphabetic())?;
        Ok(Self(value.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FareId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn check_code(
    kind: &'static str,
    value: &str,
    length: std::ops::RangeInclusive<usize>,
    allowed: impl Fn(char) -> bool,
) -> Result<(), DomainError> {
    if !length.contains(&value.len()) {
        return Err(DomainError::InvalidCode {
            kind,
            value: value.to_owned(),
            reason: "unexpected length",
        });
    }
    if !value.chars().all(|ch| allowed(ch) && !ch.is_ascii_lowercase()) {
        return Err(DomainError::InvalidCode {
            kind,
            value: value.to_owned(),
            reason: "must be upper-case alphanumeric",
        });
    }
    Ok(())
}

macro_rules! string_conversions {
    ($($name:ident),+) => {
        $(
            impl TryFrom<String> for $name {
                type Error = DomainError;

                fn try_from(value: String) -> Result<Self, Self::Error> {
                    Self::parse(&value)
                }
            }

            impl From<$name> for String {
                fn from(value: $name) -> Self {
                    value.0
                }
            }

            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(&self.0)
                }
            }
        )+
    };
}

string_conversions!(BookingCode, CarrierCode, LocCode);

impl fmt::Display for FareId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
