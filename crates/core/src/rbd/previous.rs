use std::sync::Arc;

use crate::domain::{AirSegment, Fare, FareMarket, FarePath, PricingUnit};
use crate::rbd::cabin::{CabinResolver, FareCabins};

/// What the exchanged itinerary says about the flown part of a new market.
#[derive(Clone, Debug)]
pub enum PreviousFares {
    /// A previous fare covered exactly the same board and off city.
    SameFareBreak(FareCabins),
    /// The fare break moved; these previous fares covered the flown segments
    /// of the new market, at least one of them special.
    FareBreakChanged(Vec<FareCabins>),
    /// The fare break moved and every matched previous fare was normal.
    AllNormal,
    /// No previous fare covered any flown segment of the new market.
    Unmatched,
}

impl PreviousFares {
    pub fn collect(resolver: &CabinResolver<'_>, previous: &FarePath, market: &FareMarket) -> Self {
        if let Some(fare) = find_same_fare_break(previous, market) {
            return Self::SameFareBreak(resolver.resolve(&fare));
        }

        let flown = collect_flown_fares(previous, market);
        if flown.is_empty() {
            Self::Unmatched
        } else if flown.iter().all(|fare| fare.is_normal()) {
            Self::AllNormal
        } else {
            Self::FareBreakChanged(flown.iter().map(|fare| resolver.resolve(fare)).collect())
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::SameFareBreak(_) => "same_fare_break",
            Self::FareBreakChanged(_) => "fare_break_changed",
            Self::AllNormal => "all_normal",
            Self::Unmatched => "unmatched",
        }
    }

    pub fn same_fare_break(&self) -> Option<&FareCabins> {
        match self {
            Self::SameFareBreak(fare) => Some(fare),
            _ => None,
        }
    }

    /// Previous fares of a changed fare break; empty for every other state.
    pub fn fare_break_changed(&self) -> &[FareCabins] {
        match self {
            Self::FareBreakChanged(fares) => fares,
            _ => &[],
        }
    }

    /// Every previous fare whose cabins were resolved.
    pub fn resolved(&self) -> impl Iterator<Item = &FareCabins> {
        self.same_fare_break().into_iter().chain(self.fare_break_changed())
    }
}

/// Previous fare whose market has the same board and off city as `market`.
pub fn find_same_fare_break(previous: &FarePath, market: &FareMarket) -> Option<Arc<Fare>> {
    previous
        .fare_usages()
        .find(|usage| {
            usage.fare.market.board_city == market.board_city
                && usage.fare.market.off_city == market.off_city
        })
        .map(|usage| Arc::clone(&usage.fare))
}

/// Distinct previous fares covering the flown air segments of `market`, in
/// the order those segments are travelled.
pub fn collect_flown_fares(previous: &FarePath, market: &FareMarket) -> Vec<Arc<Fare>> {
    let mut fares: Vec<Arc<Fare>> = Vec::new();

    for segment in &market.travel_segments {
        if !segment.is_flown() {
            break;
        }
        let Some(air) = segment.as_air() else {
            continue;
        };

        let matched = previous
            .pricing_units
            .iter()
            .find_map(|unit| find_flown_fare_for_segment(unit, air));
        if let Some(fare) = matched {
            if !fares.iter().any(|known| Arc::ptr_eq(known, fare)) {
                fares.push(Arc::clone(fare));
            }
        }
    }

    fares
}

fn find_flown_fare_for_segment<'a>(unit: &'a PricingUnit, wanted: &AirSegment) -> Option<&'a Arc<Fare>> {
    unit.fare_usages
        .iter()
        .find(|usage| {
            usage
                .fare
                .market
                .travel_segments
                .iter()
                .take_while(|segment| segment.is_flown())
                .filter_map(|segment| segment.as_air())
                .any(|air| air.is_same_flight(wanted))
        })
        .map(|usage| &usage.fare)
}

/// True when exactly one segment of the previous fare path has been flown.
pub fn only_one_flown_segment(previous: &FarePath) -> bool {
    previous
        .fare_usages()
        .flat_map(|usage| usage.travel_segments.iter())
        .filter(|segment| segment.is_flown())
        .take(2)
        .count()
        == 1
}
