use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::codes::BookingCode;

/// Service class of a booking code.
///
/// Variants are declared from the highest class to the lowest so that the
/// derived ordering reads "smaller is better". `Invalid` marks a booking code
/// whose cabin could not be resolved and sorts after every real cabin.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cabin {
    PremiumFirst,
    First,
    PremiumBusiness,
    Business,
    PremiumEconomy,
    Economy,
    Invalid,
}

impl Cabin {
    pub const ALL: [Cabin; 6] = [
        Self::PremiumFirst,
        Self::First,
        Self::PremiumBusiness,
        Self::Business,
        Self::PremiumEconomy,
        Self::Economy,
    ];

    /// Single character reservation cabin code.
    pub fn code(self) -> char {
        match self {
            Self::PremiumFirst => 'R',
            Self::First => 'F',
            Self::PremiumBusiness => 'J',
            Self::Business => 'C',
            Self::PremiumEconomy => 'W',
            Self::Economy => 'Y',
            Self::Invalid => '*',
        }
    }

    /// True when `self` is the same class as `other` or better.
    pub fn is_equal_or_higher_than(self, other: Cabin) -> bool {
        self <= other
    }
}

impl fmt::Display for Cabin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A booking code paired with the cabin it books into.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassOfService {
    pub booking_code: BookingCode,
    pub cabin: Cabin,
}

impl ClassOfService {
    pub fn new(booking_code: BookingCode, cabin: Cabin) -> Self {
        Self { booking_code, cabin }
    }

    /// Entry awaiting a cabin; starts as `Invalid` until a lookup fills it.
    pub fn unresolved(booking_code: BookingCode) -> Self {
        Self { booking_code, cabin: Cabin::Invalid }
    }
}
