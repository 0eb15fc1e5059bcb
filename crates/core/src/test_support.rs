//! Builders shared by the unit tests of this crate.

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::domain::{
    AirSegment, BookingCode, Cabin, CarrierCode, CategoryStatus, Directionality, ExchangeContext,
    ExchangeItinerary, ExchangePhase, ExchangeType, Fare, FareCategory, FareId, FareKind,
    FareMarket, FarePath, FareStatus, FareUsage, GeoTravelType, Itinerary, LocCode,
    OneWayRoundTrip, PricingUnit, Transaction, TransactionKind, TravelSegment,
};
use crate::rbd::CabinLookup;

pub fn code(value: &str) -> BookingCode {
    BookingCode::parse(value).expect("valid booking code")
}

pub fn carrier(value: &str) -> CarrierCode {
    CarrierCode::parse(value).expect("valid carrier code")
}

pub fn loc(value: &str) -> LocCode {
    LocCode::parse(value).expect("valid location code")
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub fn retrieval_date() -> NaiveDate {
    date(2010, 3, 1)
}

fn travel_date() -> NaiveDate {
    date(2010, 4, 15)
}

/// Cabin of a booking code under the single-letter convention used in tests.
pub fn letter_cabin(booking_code: &str) -> Cabin {
    match booking_code {
        "F" => Cabin::PremiumFirst,
        "D" => Cabin::First,
        "C" => Cabin::PremiumBusiness,
        "A" => Cabin::Business,
        "Y" => Cabin::PremiumEconomy,
        _ => Cabin::Economy,
    }
}

/// Answers every carrier with [`letter_cabin`].
#[derive(Debug, Default)]
pub struct LetterCabins;

impl CabinLookup for LetterCabins {
    fn cabin(
        &self,
        _carrier: &CarrierCode,
        booking_code: &BookingCode,
        _travel_date: NaiveDate,
    ) -> Option<Cabin> {
        Some(letter_cabin(booking_code.as_str()))
    }
}

pub fn test_cabins() -> LetterCabins {
    LetterCabins
}

pub fn air(
    pnr_segment: u16,
    origin: &str,
    destination: &str,
    operating: &str,
    flight_number: u16,
    booking_code: &str,
    flown: bool,
) -> TravelSegment {
    TravelSegment::Air(AirSegment {
        pnr_segment,
        origin: loc(origin),
        destination: loc(destination),
        carrier: carrier(operating),
        flight_number,
        booking_code: code(booking_code),
        booked_cabin: letter_cabin(booking_code),
        flown,
    })
}

pub fn surface(origin: &str, destination: &str, flown: bool) -> TravelSegment {
    TravelSegment::Surface { origin: loc(origin), destination: loc(destination), flown }
}

pub fn market(
    board: &str,
    off: &str,
    governing_carrier: &str,
    segments: &[TravelSegment],
) -> Arc<FareMarket> {
    Arc::new(FareMarket {
        board_city: loc(board),
        off_city: loc(off),
        governing_carrier: carrier(governing_carrier),
        travel_date: travel_date(),
        travel_segments: segments.to_vec(),
    })
}

/// Normal published fare identified by its fare class.
pub fn fare_in(market: &Arc<FareMarket>, fare_class: &str, amount: i64, codes: &[&str]) -> Fare {
    Fare {
        id: FareId(fare_class.to_string()),
        fare_class: fare_class.to_string(),
        market: Arc::clone(market),
        directionality: Directionality::From,
        owrt: OneWayRoundTrip::OneWayMayBeDoubled,
        category: FareCategory::Normal,
        kind: FareKind::Standard,
        effective_date: date(2010, 1, 1),
        retrieval_date: retrieval_date(),
        nuc_amount: Decimal::from(amount),
        prime_booking_codes: codes.iter().map(|value| code(value)).collect(),
        status: FareStatus::default(),
        categories: CategoryStatus::default(),
    }
}

pub fn usage(fare: &Arc<Fare>, segments: &[TravelSegment]) -> FareUsage {
    FareUsage { fare: Arc::clone(fare), travel_segments: segments.to_vec() }
}

pub fn fare_path(pricing_units: Vec<Vec<FareUsage>>) -> FarePath {
    FarePath {
        pricing_units: pricing_units
            .into_iter()
            .map(|fare_usages| PricingUnit { fare_usages })
            .collect(),
    }
}

/// Refund transaction pricing the new itinerary against `previous`.
pub fn exchange_trx(previous: Vec<Vec<FareUsage>>) -> Transaction {
    Transaction {
        ticketing_date: date(2010, 5, 1),
        kind: TransactionKind::Exchange(ExchangeContext {
            exchange_type: ExchangeType::Refund,
            phase: ExchangePhase::NewItinerary,
            fare_retrieval_date: retrieval_date(),
            previous: ExchangeItinerary { fare_path: fare_path(previous) },
        }),
    }
}

pub fn itin(geo_travel_type: GeoTravelType, travel_segments: Vec<TravelSegment>) -> Itinerary {
    Itinerary { geo_travel_type, travel_segments }
}

pub fn international_itin() -> Itinerary {
    itin(GeoTravelType::International, Vec::new())
}
