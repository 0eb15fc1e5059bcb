use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::cabin::Cabin;
use crate::domain::codes::{BookingCode, CarrierCode, LocCode};
use crate::domain::fare::Fare;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AirSegment {
    pub pnr_segment: u16,
    pub origin: LocCode,
    pub destination: LocCode,
    pub carrier: CarrierCode,
    pub flight_number: u16,
    pub booking_code: BookingCode,
    pub booked_cabin: Cabin,
    pub flown: bool,
}

impl AirSegment {
    /// Same physical flight: city pair, flight number and operating carrier.
    pub fn is_same_flight(&self, other: &AirSegment) -> bool {
        self.origin == other.origin
            && self.destination == other.destination
            && self.flight_number == other.flight_number
            && self.carrier == other.carrier
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TravelSegment {
    Air(AirSegment),
    /// Surface sector (ARUNK) between two air segments.
    Surface { origin: LocCode, destination: LocCode, flown: bool },
}

impl TravelSegment {
    pub fn is_flown(&self) -> bool {
        match self {
            Self::Air(air) => air.flown,
            Self::Surface { flown, .. } => *flown,
        }
    }

    pub fn as_air(&self) -> Option<&AirSegment> {
        match self {
            Self::Air(air) => Some(air),
            Self::Surface { .. } => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FareMarket {
    pub board_city: LocCode,
    pub off_city: LocCode,
    pub governing_carrier: CarrierCode,
    pub travel_date: NaiveDate,
    pub travel_segments: Vec<TravelSegment>,
}

impl FareMarket {
    pub fn has_flown_segment(&self) -> bool {
        self.travel_segments.iter().any(TravelSegment::is_flown)
    }

    pub fn has_flown_air_segment(&self) -> bool {
        self.flown_air_segments().next().is_some()
    }

    pub fn is_fully_flown(&self) -> bool {
        !self.travel_segments.is_empty() && self.travel_segments.iter().all(TravelSegment::is_flown)
    }

    pub fn flown_air_segments(&self) -> impl Iterator<Item = &AirSegment> {
        self.travel_segments.iter().filter_map(TravelSegment::as_air).filter(|air| air.flown)
    }

    pub fn has_flown_segment_with_carrier(&self, carrier: &CarrierCode) -> bool {
        self.flown_air_segments().any(|air| &air.carrier == carrier)
    }

    pub fn city_pair(&self) -> String {
        format!("{}-{}", self.board_city, self.off_city)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeoTravelType {
    Domestic,
    Transborder,
    International,
    ForeignDomestic,
}

impl GeoTravelType {
    /// Travel wholly within the United States and Canada.
    pub fn is_us_ca(self) -> bool {
        matches!(self, Self::Domestic | Self::Transborder)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Itinerary {
    pub geo_travel_type: GeoTravelType,
    pub travel_segments: Vec<TravelSegment>,
}

/// A fare applied to a contiguous range of travel segments.
#[derive(Clone, Debug)]
pub struct FareUsage {
    pub fare: Arc<Fare>,
    pub travel_segments: Vec<TravelSegment>,
}

impl FareUsage {
    pub fn is_first_segment_flown(&self) -> bool {
        self.travel_segments.first().is_some_and(TravelSegment::is_flown)
    }
}

#[derive(Clone, Debug, Default)]
pub struct PricingUnit {
    pub fare_usages: Vec<FareUsage>,
}

#[derive(Clone, Debug, Default)]
pub struct FarePath {
    pub pricing_units: Vec<PricingUnit>,
}

impl FarePath {
    pub fn fare_usages(&self) -> impl Iterator<Item = &FareUsage> {
        self.pricing_units.iter().flat_map(|unit| unit.fare_usages.iter())
    }

    /// True when a fare usage that starts on a flown segment is priced with a
    /// normal fare.
    pub fn has_flown_normal_fare(&self) -> bool {
        self.fare_usages().any(|usage| usage.is_first_segment_flown() && usage.fare.is_normal())
    }
}

/// The itinerary being exchanged, as it was last ticketed.
#[derive(Clone, Debug, Default)]
pub struct ExchangeItinerary {
    pub fare_path: FarePath,
}

impl ExchangeItinerary {
    pub fn fare_path(&self) -> &FarePath {
        &self.fare_path
    }
}
