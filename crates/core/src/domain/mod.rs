pub mod cabin;
pub mod codes;
pub mod fare;
pub mod itinerary;
pub mod transaction;

pub use cabin::{Cabin, ClassOfService};
pub use codes::{BookingCode, CarrierCode, FareId, LocCode};
pub use fare::{
    CategoryState, CategoryStatus, Directionality, Fare, FareCategory, FareKind, FareStatus,
    OneWayRoundTrip, RuleCategory,
};
pub use itinerary::{
    AirSegment, ExchangeItinerary, FareMarket, FarePath, FareUsage, GeoTravelType, Itinerary,
    PricingUnit, TravelSegment,
};
pub use transaction::{
    ExchangeContext, ExchangePhase, ExchangeType, Transaction, TransactionKind,
};
