use std::sync::Arc;

use crate::domain::{BookingCode, Directionality, Fare, Itinerary, Transaction};
use crate::rbd::validity::{is_valid_for_hierarchy, RuleValidator};

/// Fares of a market eligible to serve as RBD hierarchy entry points.
///
/// Ordered as the reverse of the market listing. The listing is sorted by
/// ascending amount, so the hierarchy runs from the most expensive fare down.
#[derive(Clone, Debug, Default)]
pub struct RbdHierarchy {
    fares: Vec<Arc<Fare>>,
}

impl RbdHierarchy {
    pub fn build(
        trx: &Transaction,
        market_fares: &[Arc<Fare>],
        itin: &Itinerary,
        rules: &dyn RuleValidator,
    ) -> Self {
        let fares = market_fares
            .iter()
            .rev()
            .filter(|fare| is_valid_for_hierarchy(trx, itin, fare, rules))
            .cloned()
            .collect();
        Self { fares }
    }

    pub fn is_empty(&self) -> bool {
        self.fares.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fares.len()
    }

    pub fn fares(&self) -> &[Arc<Fare>] {
        &self.fares
    }

    /// First fare in listing order with the given directionality whose
    /// effective prime booking codes include `booking_code`.
    pub fn find_fare(
        &self,
        booking_code: &BookingCode,
        directionality: Directionality,
    ) -> Option<&Arc<Fare>> {
        self.fares.iter().rev().find(|fare| {
            fare.directionality == directionality
                && fare.effective_booking_codes().contains(booking_code)
        })
    }
}
