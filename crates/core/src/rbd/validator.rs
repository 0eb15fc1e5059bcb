use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::diagnostics::{DiagnosticHeader, FlightLine, MarketStatus, PreviousFareLine};
use crate::domain::{
    ExchangeType, Fare, FareMarket, FarePath, Itinerary, Transaction, TravelSegment,
};
use crate::rbd::cabin::FareCabins;
use crate::rbd::compare::{
    all_contain_equal_or_higher_cabin, all_contain_same_cabin, cabin_equal_or_higher_than_booked,
    contains_equal_or_higher_cabin, contains_same_cabin,
};
use crate::rbd::entry_point::{find_entry_point, validate_entry_point};
use crate::rbd::hierarchy::RbdHierarchy;
use crate::rbd::previous::{only_one_flown_segment, PreviousFares};
use crate::rbd::trace::{FareSummary, OutcomeReason, OutcomeRecord, RbdTrace, Recorder};
use crate::rbd::RbdServices;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Cat31Result {
    Passed,
    Failed,
    Skipped,
    /// International special fare over a changed fare break; needs the
    /// candidate's fare path to decide.
    PostponedToPhase2,
}

impl Cat31Result {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Passed => "PASSED",
            Self::Failed => "FAILED",
            Self::Skipped => "SKIPPED",
            Self::PostponedToPhase2 => "POSTPONED_TO_PHASE2",
        }
    }
}

struct ActiveState {
    exchange_type: ExchangeType,
    previous: PreviousFares,
    hierarchy: RbdHierarchy,
    only_one_flown_segment: bool,
}

/// Booking code validator for one fare market of the new itinerary.
pub struct RbdValidator<'a> {
    services: RbdServices<'a>,
    trx: &'a Transaction,
    market: &'a FareMarket,
    itin: &'a Itinerary,
    state: Option<ActiveState>,
}

impl<'a> RbdValidator<'a> {
    /// `market_fares` is the market's fare listing in ascending amount order.
    pub fn new(
        services: RbdServices<'a>,
        trx: &'a Transaction,
        market: &'a FareMarket,
        market_fares: &[Arc<Fare>],
        itin: &'a Itinerary,
    ) -> Self {
        let state = trx
            .exchange_for_new_itinerary()
            .filter(|_| market.has_flown_segment())
            .map(|exchange| {
                let previous_path = exchange.previous.fare_path();
                let previous = PreviousFares::collect(&services.resolver(), previous_path, market);

                let (hierarchy, only_one) = match &previous {
                    PreviousFares::SameFareBreak(_) => (RbdHierarchy::default(), false),
                    PreviousFares::FareBreakChanged(_) => (
                        RbdHierarchy::build(trx, market_fares, itin, services.rule_validator),
                        only_one_flown_segment(previous_path),
                    ),
                    PreviousFares::AllNormal | PreviousFares::Unmatched => {
                        (RbdHierarchy::default(), only_one_flown_segment(previous_path))
                    }
                };

                debug!(
                    event_name = "rbd.validator.activated",
                    market = %market.city_pair(),
                    carrier = %market.governing_carrier,
                    previous = previous.name(),
                    hierarchy_size = hierarchy.len(),
                    only_one_flown_segment = only_one,
                    "booking code re-validation active for fare market"
                );

                ActiveState {
                    exchange_type: exchange.exchange_type,
                    previous,
                    hierarchy,
                    only_one_flown_segment: only_one,
                }
            });

        Self { services, trx, market, itin, state }
    }

    /// Active for the new itinerary of an exchange when the market has
    /// flown travel.
    pub fn is_active(&self) -> bool {
        self.state.is_some()
    }

    pub fn previous(&self) -> Option<&PreviousFares> {
        self.state.as_ref().map(|state| &state.previous)
    }

    pub fn hierarchy(&self) -> Option<&RbdHierarchy> {
        self.state.as_ref().map(|state| &state.hierarchy)
    }

    pub fn validate_cat31(
        &self,
        candidate: &Arc<Fare>,
        fare_path: Option<&FarePath>,
        trace: Option<&mut RbdTrace>,
    ) -> Cat31Result {
        let Some(state) = &self.state else {
            return Cat31Result::Skipped;
        };

        let same_fare_break = state.previous.same_fare_break();
        let changed = state.previous.fare_break_changed();
        match same_fare_break {
            Some(previous) if previous.fare().is_normal() && candidate.is_normal() => {
                return Cat31Result::Skipped;
            }
            None if changed.is_empty() => return Cat31Result::Skipped,
            _ => {}
        }

        let mut recorder = Recorder::new(trace);
        let result = if let Some(previous) = same_fare_break {
            self.validate_same_fare_break(candidate, previous, &mut recorder)
        } else if self.itin.geo_travel_type.is_us_ca() {
            self.validate_us_ca(candidate, state, &mut recorder)
        } else if candidate.is_normal() {
            self.validate_international_normal(candidate, &mut recorder)
        } else if state.only_one_flown_segment {
            self.validate_international_special(candidate, state, &mut recorder)
        } else if let Some(path) = fare_path {
            if path.has_flown_normal_fare() {
                self.validate_international_normal(candidate, &mut recorder)
            } else {
                self.validate_international_special(candidate, state, &mut recorder)
            }
        } else {
            Cat31Result::PostponedToPhase2
        };

        let reason = self.outcome_reason(candidate, same_fare_break, result);
        recorder.outcome(OutcomeRecord {
            exchange_type: state.exchange_type,
            result,
            reason,
            nuc_amount: candidate.nuc_amount,
        });

        debug!(
            event_name = "rbd.cat31.result",
            fare_id = %candidate.id,
            market = %self.market.city_pair(),
            result = result.as_str(),
            reason = ?reason,
            "candidate fare booking code re-validated"
        );

        result
    }

    /// Refund check: the candidate must share a cabin with every previous
    /// fare of the flown part of the market.
    pub fn validate_cat33(&self, candidate: &Arc<Fare>, trace: Option<&mut RbdTrace>) -> bool {
        let Some(state) = &self.state else {
            return true;
        };
        if state.exchange_type != ExchangeType::Refund {
            return true;
        }

        let mut recorder = Recorder::new(trace);
        let passed = match &state.previous {
            PreviousFares::SameFareBreak(previous) => {
                let current = self.resolve(candidate);
                let passed = contains_same_cabin(previous, &current);
                if !passed {
                    recorder.cabin_check(&current, false);
                }
                passed
            }
            PreviousFares::FareBreakChanged(previous) => {
                let current = self.resolve(candidate);
                let passed = all_contain_same_cabin(previous, &current);
                recorder.cabin_check(&current, passed);
                passed
            }
            PreviousFares::AllNormal | PreviousFares::Unmatched => true,
        };

        debug!(
            event_name = "rbd.cat33.result",
            fare_id = %candidate.id,
            market = %self.market.city_pair(),
            passed,
            "candidate fare cabin re-validated for refund"
        );

        passed
    }

    /// Diagnostic header describing the market, or `None` outside the new
    /// itinerary of an exchange.
    pub fn header(&self) -> Option<DiagnosticHeader> {
        let exchange = self.trx.exchange_for_new_itinerary()?;

        let resolved: Vec<&FareCabins> =
            self.state.iter().flat_map(|state| state.previous.resolved()).collect();
        let previous_fares = exchange
            .previous
            .fare_path()
            .fare_usages()
            .map(|usage| PreviousFareLine {
                fare_class: usage.fare.fare_class.clone(),
                board_city: usage.fare.market.board_city.clone(),
                governing_carrier: usage.fare.governing_carrier().clone(),
                off_city: usage.fare.market.off_city.clone(),
                nuc_amount: usage.fare.nuc_amount,
                normal: usage.fare.is_normal(),
                classes: resolved
                    .iter()
                    .find(|cabins| Arc::ptr_eq(cabins.fare(), &usage.fare))
                    .map(|cabins| cabins.classes().to_vec()),
            })
            .collect();

        let flights = self
            .market
            .travel_segments
            .iter()
            .map(|segment| match segment {
                TravelSegment::Air(air) => FlightLine::Air(air.clone()),
                TravelSegment::Surface { .. } => FlightLine::Arunk,
            })
            .collect();

        let city_pair = self.market.city_pair();
        let status = match &self.state {
            None => MarketStatus::Unflown { city_pair },
            Some(state) => match &state.previous {
                PreviousFares::SameFareBreak(_) => MarketStatus::SameFareBreak,
                PreviousFares::FareBreakChanged(_) => MarketStatus::FareBreakChanged {
                    city_pair,
                    hierarchy: state
                        .hierarchy
                        .fares()
                        .iter()
                        .map(|fare| FareSummary::from(fare.as_ref()))
                        .collect(),
                },
                PreviousFares::AllNormal => MarketStatus::AllPreviousNormal,
                PreviousFares::Unmatched => MarketStatus::NoMatch,
            },
        };

        Some(DiagnosticHeader {
            exchange_type: exchange.exchange_type,
            ticketing_date: self.trx.ticketing_date,
            previous_fares,
            flights,
            status,
        })
    }

    fn resolve(&self, fare: &Arc<Fare>) -> FareCabins {
        self.services.resolver().resolve(fare)
    }

    fn validate_same_fare_break(
        &self,
        candidate: &Arc<Fare>,
        previous: &FareCabins,
        recorder: &mut Recorder<'_>,
    ) -> Cat31Result {
        if candidate.nuc_amount < previous.fare().nuc_amount {
            return Cat31Result::Failed;
        }

        if !previous.fare().is_normal() {
            let current = self.resolve(candidate);
            let passed = contains_equal_or_higher_cabin(previous, &current);
            recorder.cabin_check(&current, passed);
            if !passed {
                return Cat31Result::Failed;
            }
        }

        Cat31Result::Passed
    }

    fn validate_us_ca(
        &self,
        candidate: &Arc<Fare>,
        state: &ActiveState,
        recorder: &mut Recorder<'_>,
    ) -> Cat31Result {
        let previous = state.previous.fare_break_changed();
        let current = self.resolve(candidate);

        let cabin_passed = all_contain_equal_or_higher_cabin(previous, &current);
        recorder.cabin_check(&current, cabin_passed);
        if !cabin_passed {
            return Cat31Result::Failed;
        }

        let entry_point = find_entry_point(candidate, previous, &state.hierarchy, false);
        let passed = validate_entry_point(&current, entry_point, previous);
        recorder.entry_point(entry_point.map(Arc::as_ref), previous, passed);

        if passed {
            Cat31Result::Passed
        } else {
            Cat31Result::Failed
        }
    }

    fn validate_international_normal(
        &self,
        candidate: &Arc<Fare>,
        recorder: &mut Recorder<'_>,
    ) -> Cat31Result {
        let current = self.resolve(candidate);

        let mut passed = true;
        for segment in self.market.flown_air_segments() {
            let segment_passed = cabin_equal_or_higher_than_booked(&current, segment);
            recorder.segment_check(segment, segment_passed);
            if !segment_passed {
                passed = false;
                break;
            }
        }
        recorder.cabin_check(&current, passed);

        if passed {
            Cat31Result::Passed
        } else {
            Cat31Result::Skipped
        }
    }

    fn validate_international_special(
        &self,
        candidate: &Arc<Fare>,
        state: &ActiveState,
        recorder: &mut Recorder<'_>,
    ) -> Cat31Result {
        let previous = state.previous.fare_break_changed();
        let current = self.resolve(candidate);
        let carrier = candidate.governing_carrier();

        if self.market.has_flown_segment_with_carrier(carrier) {
            let cabin_passed = all_contain_equal_or_higher_cabin(previous, &current);
            recorder.cabin_check(&current, cabin_passed);
            if !cabin_passed {
                return Cat31Result::Failed;
            }

            let entry_point = find_entry_point(candidate, previous, &state.hierarchy, true);
            let passed = validate_entry_point(&current, entry_point, previous);
            recorder.entry_point(entry_point.map(Arc::as_ref), previous, passed);
            if !passed {
                return Cat31Result::Failed;
            }
        }

        let mut passed = true;
        for segment in self.market.flown_air_segments().filter(|segment| &segment.carrier != carrier)
        {
            let segment_passed = cabin_equal_or_higher_than_booked(&current, segment);
            recorder.segment_check(segment, segment_passed);
            if !segment_passed {
                passed = false;
                break;
            }
        }
        recorder.cabin_check(&current, passed);

        if passed {
            Cat31Result::Passed
        } else {
            Cat31Result::Failed
        }
    }

    fn outcome_reason(
        &self,
        candidate: &Fare,
        same_fare_break: Option<&FareCabins>,
        result: Cat31Result,
    ) -> OutcomeReason {
        let fully_flown = self.market.is_fully_flown();
        match (result, same_fare_break) {
            (Cat31Result::Skipped, _) => OutcomeReason::StandardRbdApply,
            (Cat31Result::PostponedToPhase2, _) => OutcomeReason::PostponedToPhase2,
            (Cat31Result::Passed, _) if !fully_flown => OutcomeReason::SkipFlownSegments,
            (Cat31Result::Passed, Some(_)) => OutcomeReason::PassAllFlown,
            (Cat31Result::Passed, None) => {
                if !self.itin.geo_travel_type.is_us_ca() && candidate.is_normal() {
                    OutcomeReason::PassCabinAllFlown
                } else {
                    OutcomeReason::PassHierarchyAllFlown
                }
            }
            (Cat31Result::Failed, Some(previous)) => {
                if candidate.nuc_amount < previous.fare().nuc_amount {
                    OutcomeReason::FailLowerFareAmount
                } else {
                    OutcomeReason::FailCabinCheck
                }
            }
            (Cat31Result::Failed, None) => OutcomeReason::FailHierarchy,
        }
    }
}
