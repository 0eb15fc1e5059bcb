use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::{AirSegment, Cabin, ClassOfService, ExchangeType, Fare};
use crate::rbd::cabin::FareCabins;
use crate::rbd::validator::Cat31Result;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FareSummary {
    pub fare_class: String,
    pub nuc_amount: Decimal,
    pub normal: bool,
    pub owrt: char,
    pub effective_date: NaiveDate,
    pub booking_codes: Vec<String>,
}

impl From<&Fare> for FareSummary {
    fn from(fare: &Fare) -> Self {
        Self {
            fare_class: fare.fare_class.clone(),
            nuc_amount: fare.nuc_amount,
            normal: fare.is_normal(),
            owrt: fare.owrt.indicator(),
            effective_date: fare.effective_date,
            booking_codes: fare
                .effective_booking_codes()
                .iter()
                .map(|code| code.as_str().to_owned())
                .collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PreviousCabins {
    pub fare_class: String,
    pub cabins: Vec<Cabin>,
}

/// Why a candidate ended with its result; drives the result line text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeReason {
    PassAllFlown,
    SkipFlownSegments,
    FailLowerFareAmount,
    FailCabinCheck,
    PassCabinAllFlown,
    PassHierarchyAllFlown,
    FailHierarchy,
    StandardRbdApply,
    PostponedToPhase2,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct OutcomeRecord {
    pub exchange_type: ExchangeType,
    pub result: Cat31Result,
    pub reason: OutcomeReason,
    pub nuc_amount: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum TraceStep {
    CabinCheck { fare: FareSummary, classes: Vec<ClassOfService>, passed: bool },
    SegmentCabinCheck { segment: AirSegment, passed: bool },
    EntryPoint { entry: Option<FareSummary>, previous: Vec<PreviousCabins>, passed: bool },
    Outcome(OutcomeRecord),
}

/// Structured record of the checks made while validating one candidate.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RbdTrace {
    pub steps: Vec<TraceStep>,
}

impl RbdTrace {
    pub fn outcome(&self) -> Option<&OutcomeRecord> {
        self.steps.iter().rev().find_map(|step| match step {
            TraceStep::Outcome(record) => Some(record),
            _ => None,
        })
    }
}

/// Optional sink handed through validation. Every method is a no-op when no
/// trace was requested.
pub(crate) struct Recorder<'t> {
    trace: Option<&'t mut RbdTrace>,
}

impl<'t> Recorder<'t> {
    pub(crate) fn new(trace: Option<&'t mut RbdTrace>) -> Self {
        Self { trace }
    }

    fn push(&mut self, step: impl FnOnce() -> TraceStep) {
        if let Some(trace) = self.trace.as_deref_mut() {
            trace.steps.push(step());
        }
    }

    pub(crate) fn cabin_check(&mut self, candidate: &FareCabins, passed: bool) {
        self.push(|| TraceStep::CabinCheck {
            fare: FareSummary::from(candidate.fare().as_ref()),
            classes: candidate.classes().to_vec(),
            passed,
        });
    }

    pub(crate) fn segment_check(&mut self, segment: &AirSegment, passed: bool) {
        self.push(|| TraceStep::SegmentCabinCheck { segment: segment.clone(), passed });
    }

    pub(crate) fn entry_point(&mut self, entry: Option<&Fare>, previous: &[FareCabins], passed: bool) {
        self.push(|| TraceStep::EntryPoint {
            entry: entry.map(FareSummary::from),
            previous: match entry {
                Some(_) => Vec::new(),
                None => previous
                    .iter()
                    .map(|fare| PreviousCabins {
                        fare_class: fare.fare().fare_class.clone(),
                        cabins: fare.classes().iter().map(|class| class.cabin).collect(),
                    })
                    .collect(),
            },
            passed,
        });
    }

    pub(crate) fn outcome(&mut self, record: OutcomeRecord) {
        self.push(|| TraceStep::Outcome(record));
    }
}
