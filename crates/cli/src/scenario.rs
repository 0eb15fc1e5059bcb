//! JSON exchange scenarios fed to `cabinguard validate`.
//!
//! A scenario carries everything one validation run needs: the transaction,
//! the fare markets of the new itinerary with their fare listings, the fare
//! path of the exchanged ticket, cabin reference rows and rule outcomes.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use cabinguard_core::domain::{
    AirSegment, BookingCode, Cabin, CarrierCode, CategoryStatus, Directionality, ExchangeContext,
    ExchangeItinerary, ExchangePhase, ExchangeType, Fare, FareCategory, FareId, FareKind,
    FareMarket, FarePath, FareStatus, FareUsage, GeoTravelType, Itinerary, LocCode,
    OneWayRoundTrip, PricingUnit, RuleCategory, Transaction, TransactionKind, TravelSegment,
};
use cabinguard_core::rbd::CabinLookup;
use cabinguard_core::{ApplicationError, CabinRecord, CabinTable};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    pub ticketing_date: NaiveDate,
    pub geo_travel_type: GeoTravelType,
    /// Absent for plain pricing.
    #[serde(default)]
    pub exchange: Option<ExchangeSpec>,
    #[serde(default)]
    pub cabins: Vec<CabinRecord>,
    #[serde(default)]
    pub rule_failures: Vec<RuleFailure>,
    pub markets: Vec<NewMarketSpec>,
    /// Fare ids per pricing unit of the candidate fare path.
    #[serde(default)]
    pub fare_path: Option<Vec<Vec<String>>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExchangeSpec {
    pub exchange_type: ExchangeType,
    #[serde(default = "default_phase")]
    pub phase: ExchangePhase,
    pub fare_retrieval_date: NaiveDate,
    /// Fare usages of the exchanged ticket, grouped by pricing unit.
    #[serde(default)]
    pub previous: Vec<Vec<PreviousUsageSpec>>,
}

fn default_phase() -> ExchangePhase {
    ExchangePhase::NewItinerary
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleFailure {
    pub fare: String,
    pub category: u16,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MarketSpec {
    pub board_city: LocCode,
    pub off_city: LocCode,
    pub governing_carrier: CarrierCode,
    pub travel_date: NaiveDate,
    #[serde(default)]
    pub segments: Vec<SegmentSpec>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewMarketSpec {
    pub board_city: LocCode,
    pub off_city: LocCode,
    pub governing_carrier: CarrierCode,
    pub travel_date: NaiveDate,
    #[serde(default)]
    pub segments: Vec<SegmentSpec>,
    /// Fare listing of the market, in hierarchy search order.
    #[serde(default)]
    pub fares: Vec<FareSpec>,
    /// Re-orders the listing by ascending amount. Equal amounts keep document order.
    #[serde(default)]
    pub sort_by_amount: bool,
    /// Ids of the listed fares to validate; every listed fare when empty.
    #[serde(default)]
    pub candidates: Vec<String>,
}

impl NewMarketSpec {
    fn split(self) -> (MarketSpec, Vec<FareSpec>, bool, Vec<String>) {
        let market = MarketSpec {
            board_city: self.board_city,
            off_city: self.off_city,
            governing_carrier: self.governing_carrier,
            travel_date: self.travel_date,
            segments: self.segments,
        };
        (market, self.fares, self.sort_by_amount, self.candidates)
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PreviousUsageSpec {
    pub market: MarketSpec,
    pub fare: FareSpec,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", deny_unknown_fields)]
pub enum SegmentSpec {
    Air {
        #[serde(default)]
        pnr_segment: u16,
        origin: LocCode,
        destination: LocCode,
        carrier: CarrierCode,
        #[serde(default)]
        flight_number: u16,
        booking_code: BookingCode,
        #[serde(default)]
        booked_cabin: Option<Cabin>,
        #[serde(default)]
        flown: bool,
    },
    Surface {
        origin: LocCode,
        destination: LocCode,
        #[serde(default)]
        flown: bool,
    },
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FareSpec {
    pub id: String,
    pub fare_class: String,
    #[serde(default = "default_directionality")]
    pub directionality: Directionality,
    #[serde(default)]
    pub owrt: OneWayRoundTrip,
    pub category: FareCategory,
    #[serde(default)]
    pub kind: FareKind,
    pub effective_date: NaiveDate,
    /// Defaults to the exchange's fare retrieval date.
    #[serde(default)]
    pub retrieval_date: Option<NaiveDate>,
    pub nuc_amount: Decimal,
    #[serde(default)]
    pub prime_booking_codes: Vec<BookingCode>,
    #[serde(default)]
    pub status: FareStatus,
    #[serde(default)]
    pub categories: CategoryStatus,
}

fn default_directionality() -> Directionality {
    Directionality::From
}

/// One fare market of the new itinerary, ready for validation.
#[derive(Debug)]
pub struct PreparedMarket {
    pub market: Arc<FareMarket>,
    /// Listing in hierarchy search order.
    pub fares: Vec<Arc<Fare>>,
    pub candidates: Vec<Arc<Fare>>,
}

#[derive(Debug)]
pub struct PreparedScenario {
    pub trx: Transaction,
    pub itin: Itinerary,
    pub markets: Vec<PreparedMarket>,
    pub fare_path: Option<FarePath>,
    pub rule_failures: Vec<(FareId, RuleCategory)>,
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self, ApplicationError> {
        let raw = fs::read_to_string(path).map_err(|error| {
            ApplicationError::Scenario(format!("failed to read {}: {error}", path.display()))
        })?;
        Self::from_json_str(&raw)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, ApplicationError> {
        serde_json::from_str(raw)
            .map_err(|error| ApplicationError::Scenario(format!("invalid scenario: {error}")))
    }

    /// Builds the domain model. Booked cabins left out of air segments are
    /// answered by `cabins`.
    pub fn prepare(self, cabins: &CabinTable) -> Result<PreparedScenario, ApplicationError> {
        let retrieval_date = self
            .exchange
            .as_ref()
            .map_or(self.ticketing_date, |exchange| exchange.fare_retrieval_date);

        let mut markets = Vec::with_capacity(self.markets.len());
        let mut by_id: HashMap<String, Arc<Fare>> = HashMap::new();
        let mut itin_segments = Vec::new();

        for spec in self.markets {
            let (market_spec, fare_specs, sort_by_amount, candidate_ids) = spec.split();
            let market = Arc::new(build_market(market_spec, cabins)?);
            itin_segments.extend(market.travel_segments.iter().cloned());

            let mut fares = Vec::with_capacity(fare_specs.len());
            for fare in fare_specs {
                let fare = Arc::new(build_fare(fare, &market, retrieval_date));
                if by_id.insert(fare.id.0.clone(), Arc::clone(&fare)).is_some() {
                    return Err(ApplicationError::Scenario(format!(
                        "fare id `{}` is listed more than once",
                        fare.id
                    )));
                }
                fares.push(fare);
            }
            if sort_by_amount {
                fares.sort_by(|left, right| left.nuc_amount.cmp(&right.nuc_amount));
            }

            let candidates = if candidate_ids.is_empty() {
                fares.clone()
            } else {
                candidate_ids
                    .iter()
                    .map(|id| {
                        fares.iter().find(|fare| fare.id.as_str() == id).cloned().ok_or_else(
                            || {
                                ApplicationError::Scenario(format!(
                                    "candidate `{id}` is not listed in market {}",
                                    market.city_pair()
                                ))
                            },
                        )
                    })
                    .collect::<Result<Vec<_>, _>>()?
            };

            markets.push(PreparedMarket { market, fares, candidates });
        }

        let fare_path = self
            .fare_path
            .map(|units| {
                units
                    .iter()
                    .map(|ids| {
                        ids.iter().map(|id| usage_of(&by_id, id)).collect::<Result<Vec<_>, _>>()
                    })
                    .map(|usages| usages.map(|fare_usages| PricingUnit { fare_usages }))
                    .collect::<Result<Vec<_>, _>>()
                    .map(|pricing_units| FarePath { pricing_units })
            })
            .transpose()?;

        let kind = match self.exchange {
            None => TransactionKind::Pricing,
            Some(exchange) => TransactionKind::Exchange(build_exchange(exchange, cabins)?),
        };

        Ok(PreparedScenario {
            trx: Transaction { ticketing_date: self.ticketing_date, kind },
            itin: Itinerary { geo_travel_type: self.geo_travel_type, travel_segments: itin_segments },
            markets,
            fare_path,
            rule_failures: self
                .rule_failures
                .into_iter()
                .map(|failure| (FareId(failure.fare), RuleCategory(failure.category)))
                .collect(),
        })
    }
}

fn build_exchange(
    spec: ExchangeSpec,
    cabins: &CabinTable,
) -> Result<ExchangeContext, ApplicationError> {
    let mut pricing_units = Vec::with_capacity(spec.previous.len());
    for unit in spec.previous {
        let mut fare_usages = Vec::with_capacity(unit.len());
        for usage in unit {
            let market = Arc::new(build_market(usage.market, cabins)?);
            let fare = Arc::new(build_fare(usage.fare, &market, spec.fare_retrieval_date));
            fare_usages.push(FareUsage { travel_segments: market.travel_segments.clone(), fare });
        }
        pricing_units.push(PricingUnit { fare_usages });
    }

    Ok(ExchangeContext {
        exchange_type: spec.exchange_type,
        phase: spec.phase,
        fare_retrieval_date: spec.fare_retrieval_date,
        previous: ExchangeItinerary { fare_path: FarePath { pricing_units } },
    })
}

fn build_market(spec: MarketSpec, cabins: &CabinTable) -> Result<FareMarket, ApplicationError> {
    let travel_date = spec.travel_date;
    let travel_segments = spec
        .segments
        .into_iter()
        .map(|segment| build_segment(segment, travel_date, cabins))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(FareMarket {
        board_city: spec.board_city,
        off_city: spec.off_city,
        governing_carrier: spec.governing_carrier,
        travel_date,
        travel_segments,
    })
}

fn build_segment(
    spec: SegmentSpec,
    travel_date: NaiveDate,
    cabins: &CabinTable,
) -> Result<TravelSegment, ApplicationError> {
    match spec {
        SegmentSpec::Air {
            pnr_segment,
            origin,
            destination,
            carrier,
            flight_number,
            booking_code,
            booked_cabin,
            flown,
        } => {
            let booked_cabin = match booked_cabin {
                Some(cabin) => cabin,
                None => cabins.cabin(&carrier, &booking_code, travel_date).ok_or_else(|| {
                    ApplicationError::ReferenceData(format!(
                        "no cabin for {carrier} {booking_code} on segment {origin}-{destination}"
                    ))
                })?,
            };
            Ok(TravelSegment::Air(AirSegment {
                pnr_segment,
                origin,
                destination,
                carrier,
                flight_number,
                booking_code,
                booked_cabin,
                flown,
            }))
        }
        SegmentSpec::Surface { origin, destination, flown } => {
            Ok(TravelSegment::Surface { origin, destination, flown })
        }
    }
}

fn build_fare(spec: FareSpec, market: &Arc<FareMarket>, retrieval_date: NaiveDate) -> Fare {
    Fare {
        id: FareId(spec.id),
        fare_class: spec.fare_class,
        market: Arc::clone(market),
        directionality: spec.directionality,
        owrt: spec.owrt,
        category: spec.category,
        kind: spec.kind,
        effective_date: spec.effective_date,
        retrieval_date: spec.retrieval_date.unwrap_or(retrieval_date),
        nuc_amount: spec.nuc_amount,
        prime_booking_codes: spec.prime_booking_codes,
        status: spec.status,
        categories: spec.categories,
    }
}

fn usage_of(fares: &HashMap<String, Arc<Fare>>, id: &str) -> Result<FareUsage, ApplicationError> {
    let fare = fares.get(id).ok_or_else(|| {
        ApplicationError::Scenario(format!("fare path names unknown fare `{id}`"))
    })?;
    Ok(FareUsage { fare: Arc::clone(fare), travel_segments: fare.market.travel_segments.clone() })
}
