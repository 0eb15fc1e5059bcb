use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::codes::{BookingCode, CarrierCode, FareId};
use crate::domain::itinerary::FareMarket;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Directionality {
    From,
    To,
    Both,
}

/// One-way / round-trip indicator of a fare.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OneWayRoundTrip {
    OneWayMayBeDoubled,
    RoundTripMayNotBeHalved,
    OneWayMayNotBeDoubled,
    #[default]
    Unspecified,
}

impl OneWayRoundTrip {
    pub fn indicator(self) -> char {
        match self {
            Self::OneWayMayBeDoubled => 'X',
            Self::RoundTripMayNotBeHalved => 'R',
            Self::OneWayMayNotBeDoubled => 'O',
            Self::Unspecified => ' ',
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FareCategory {
    Normal,
    Special,
}

/// Classification of the fare record the priced fare came from.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FareKind {
    #[default]
    Standard,
    Industry { valid_for_pricing: bool },
    FareByRule { specified: bool, base_prime_booking_codes: Vec<BookingCode> },
}

impl FareKind {
    /// Prime booking codes inherited from the base fare. Only an unspecified
    /// fare-by-rule fare calculates from its base fare.
    pub fn base_prime_booking_codes(&self) -> Option<&[BookingCode]> {
        match self {
            Self::FareByRule { specified: false, base_prime_booking_codes } => {
                Some(base_prime_booking_codes.as_slice())
            }
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleCategory(pub u16);

impl RuleCategory {
    pub const ELIGIBILITY: Self = Self(1);
    pub const SEASONAL: Self = Self(3);
    pub const ACCOMPANIED_PASSENGER: Self = Self(13);
    pub const TRAVEL_RESTRICTIONS: Self = Self(14);
    pub const SALES_RESTRICTIONS: Self = Self(15);
}

impl fmt::Display for RuleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cat{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryState {
    #[default]
    Pending,
    Passed,
    Failed,
}

/// Per-category rule outcome recorded on a fare by earlier processing.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryStatus(BTreeMap<RuleCategory, CategoryState>);

impl CategoryStatus {
    pub fn with(mut self, category: RuleCategory, state: CategoryState) -> Self {
        self.set(category, state);
        self
    }

    pub fn set(&mut self, category: RuleCategory, state: CategoryState) {
        self.0.insert(category, state);
    }

    pub fn state(&self, category: RuleCategory) -> CategoryState {
        self.0.get(&category).copied().unwrap_or_default()
    }

    /// A category is valid unless it was processed and failed.
    pub fn is_valid(&self, category: RuleCategory) -> bool {
        self.state(category) != CategoryState::Failed
    }

    pub fn is_processed(&self, category: RuleCategory) -> bool {
        self.state(category) != CategoryState::Pending
    }
}

/// Processing flags set on a fare before booking code validation runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FareStatus {
    pub valid: bool,
    pub valid_without_booking_code: bool,
    pub data_missing: bool,
    pub failed_fare_group: bool,
    pub not_valid_for_context: bool,
    pub routing_processed: bool,
    pub routing_valid: bool,
}

impl Default for FareStatus {
    fn default() -> Self {
        Self {
            valid: true,
            valid_without_booking_code: false,
            data_missing: false,
            failed_fare_group: false,
            not_valid_for_context: false,
            routing_processed: true,
            routing_valid: true,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Fare {
    pub id: FareId,
    pub fare_class: String,
    pub market: Arc<FareMarket>,
    pub directionality: Directionality,
    pub owrt: OneWayRoundTrip,
    pub category: FareCategory,
    pub kind: FareKind,
    pub effective_date: NaiveDate,
    pub retrieval_date: NaiveDate,
    pub nuc_amount: Decimal,
    pub prime_booking_codes: Vec<BookingCode>,
    pub status: FareStatus,
    pub categories: CategoryStatus,
}

impl Fare {
    pub fn is_normal(&self) -> bool {
        self.category == FareCategory::Normal
    }

    pub fn governing_carrier(&self) -> &CarrierCode {
        &self.market.governing_carrier
    }

    /// Prime booking codes of the fare, falling back to the base fare's codes
    /// for an unspecified fare-by-rule fare without its own.
    pub fn effective_booking_codes(&self) -> &[BookingCode] {
        if !self.prime_booking_codes.is_empty() {
            return &self.prime_booking_codes;
        }
        self.kind.base_prime_booking_codes().unwrap_or(&[])
    }
}
