//! Booking code and cabin re-validation of fares repriced during an exchange.
//!
//! A validator is built once per fare market of the new itinerary. It looks up
//! what was ticketed on the flown part of that market and then answers, per
//! candidate fare, whether the candidate keeps the customer in an equal or
//! higher cabin and fare level.

pub mod cabin;
pub mod compare;
pub mod entry_point;
pub mod hierarchy;
pub mod previous;
pub mod trace;
pub mod validator;
pub mod validity;

pub use cabin::{CabinLookup, CabinResolver, FareCabins, RbdByCabinService};
pub use hierarchy::RbdHierarchy;
pub use previous::PreviousFares;
pub use trace::{OutcomeReason, OutcomeRecord, RbdTrace, TraceStep};
pub use validator::{Cat31Result, RbdValidator};
pub use validity::{
    MemoizedRuleValidator, PermissiveRuleValidator, RuleValidator, StaticRuleValidator,
};

/// Collaborators a validator reads reference data and rule answers from.
///
/// Supplying `rbd_by_cabin` switches cabin resolution from the per-code table
/// lookup to the bulk cabin answer service.
#[derive(Clone, Copy)]
pub struct RbdServices<'a> {
    pub cabin_lookup: &'a dyn CabinLookup,
    pub rbd_by_cabin: Option<&'a dyn RbdByCabinService>,
    pub rule_validator: &'a dyn RuleValidator,
}

impl<'a> RbdServices<'a> {
    pub fn new(cabin_lookup: &'a dyn CabinLookup, rule_validator: &'a dyn RuleValidator) -> Self {
        Self { cabin_lookup, rbd_by_cabin: None, rule_validator }
    }

    pub fn with_rbd_by_cabin(mut self, service: &'a dyn RbdByCabinService) -> Self {
        self.rbd_by_cabin = Some(service);
        self
    }

    pub fn resolver(&self) -> CabinResolver<'a> {
        CabinResolver::new(self.cabin_lookup, self.rbd_by_cabin)
    }
}
