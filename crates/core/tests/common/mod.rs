#![allow(dead_code)]

use std::sync::Arc;

use cabinguard_core::domain::{
    AirSegment, BookingCode, Cabin, CarrierCode, CategoryStatus, Directionality, ExchangeContext,
    ExchangeItinerary, ExchangePhase, ExchangeType, Fare, FareCategory, FareId, FareKind,
    FareMarket, FarePath, FareStatus, FareUsage, GeoTravelType, Itinerary, LocCode,
    OneWayRoundTrip, PricingUnit, Transaction, TransactionKind, TravelSegment,
};
use cabinguard_core::rbd::{CabinLookup, PermissiveRuleValidator, RbdServices};
use chrono::NaiveDate;
use rust_decimal::Decimal;

pub const NORMAL: FareCategory = FareCategory::Normal;
pub const SPECIAL: FareCategory = FareCategory::Special;

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub fn retrieval_date() -> NaiveDate {
    date(2010, 3, 1)
}

/// F, D, C, A and Y map to the premium-first down to premium-economy cabins;
/// every other booking code is economy.
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

pub fn services() -> RbdServices<'static> {
    RbdServices::new(&LetterCabins, &PermissiveRuleValidator)
}

pub fn air(board: &str, off: &str, carrier: &str, booking_code: &str, flown: bool) -> TravelSegment {
    air_in_cabin(board, off, carrier, booking_code, flown, letter_cabin(booking_code))
}

pub fn air_in_cabin(
    board: &str,
    off: &str,
    carrier: &str,
    booking_code: &str,
    flown: bool,
    booked_cabin: Cabin,
) -> TravelSegment {
    TravelSegment::Air(AirSegment {
        pnr_segment: 0,
        origin: LocCode::parse(board).expect("valid board city"),
        destination: LocCode::parse(off).expect("valid off city"),
        carrier: CarrierCode::parse(carrier).expect("valid carrier"),
        flight_number: 70,
        booking_code: BookingCode::parse(booking_code).expect("valid booking code"),
        booked_cabin,
        flown,
    })
}

pub fn market(board: &str, off: &str, carrier: &str, segments: &[&TravelSegment]) -> Arc<FareMarket> {
    Arc::new(FareMarket {
        board_city: LocCode::parse(board).expect("valid board city"),
        off_city: LocCode::parse(off).expect("valid off city"),
        governing_carrier: CarrierCode::parse(carrier).expect("valid carrier"),
        travel_date: date(2010, 4, 15),
        travel_segments: segments.iter().map(|segment| (*segment).clone()).collect(),
    })
}

pub fn fare(
    market: &Arc<FareMarket>,
    fare_class: &str,
    category: FareCategory,
    booking_code: &str,
    amount: i64,
) -> Arc<Fare> {
    Arc::new(Fare {
        id: FareId(format!("{}-{fare_class}", market.city_pair())),
        fare_class: fare_class.to_string(),
        market: Arc::clone(market),
        directionality: Directionality::From,
        owrt: OneWayRoundTrip::OneWayMayBeDoubled,
        category,
        kind: FareKind::Standard,
        effective_date: date(2010, 1, 1),
        retrieval_date: retrieval_date(),
        nuc_amount: Decimal::from(amount),
        prime_booking_codes: vec![BookingCode::parse(booking_code).expect("valid booking code")],
        status: FareStatus { valid_without_booking_code: true, ..FareStatus::default() },
        categories: CategoryStatus::default(),
    })
}

/// Market fare listing in ascending amount order.
pub fn listing(market: &Arc<FareMarket>, fares: &[(i64, &str)]) -> Vec<Arc<Fare>> {
    let mut fares: Vec<Arc<Fare>> = fares
        .iter()
        .map(|(amount, code)| fare(market, &format!("{code}{amount}"), SPECIAL, code, *amount))
        .collect();
    fares.sort_by(|left, right| left.nuc_amount.cmp(&right.nuc_amount));
    fares
}

pub fn usage(fare: &Arc<Fare>) -> FareUsage {
    FareUsage { fare: Arc::clone(fare), travel_segments: fare.market.travel_segments.clone() }
}

pub fn fare_path(fares: &[&Arc<Fare>]) -> FarePath {
    FarePath {
        pricing_units: vec![PricingUnit {
            fare_usages: fares.iter().map(|fare| usage(fare)).collect(),
        }],
    }
}

/// Refund of a ticket priced with `previous`, repricing the new itinerary.
pub fn exchange(previous: &[&Arc<Fare>]) -> Transaction {
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

pub fn itin(geo_travel_type: GeoTravelType, market: &FareMarket) -> Itinerary {
    Itinerary { geo_travel_type, travel_segments: market.travel_segments.clone() }
}
