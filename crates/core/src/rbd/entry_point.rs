use std::sync::Arc;

use crate::domain::Fare;
use crate::rbd::cabin::FareCabins;
use crate::rbd::compare::all_contain_equal_or_higher_cabin;
use crate::rbd::hierarchy::RbdHierarchy;

/// Most expensive hierarchy fare booked in one of the previous special fares'
/// booking codes with the same directionality.
///
/// With `primary_carrier_only`, previous fares governed by another carrier
/// than the candidate are ignored. Only a strictly greater amount replaces an
/// earlier match.
pub fn find_entry_point<'h>(
    candidate: &Fare,
    previous: &[FareCabins],
    hierarchy: &'h RbdHierarchy,
    primary_carrier_only: bool,
) -> Option<&'h Arc<Fare>> {
    if hierarchy.is_empty() {
        return None;
    }

    let mut entry_point: Option<&Arc<Fare>> = None;
    for previous_fare in previous {
        let fare = previous_fare.fare();
        if fare.is_normal() {
            continue;
        }
        if primary_carrier_only && fare.governing_carrier() != candidate.governing_carrier() {
            continue;
        }

        for class in previous_fare.classes() {
            let Some(found) = hierarchy.find_fare(&class.booking_code, fare.directionality) else {
                continue;
            };
            if entry_point.map_or(true, |current| found.nuc_amount > current.nuc_amount) {
                entry_point = Some(found);
            }
        }
    }
    entry_point
}

/// The candidate must price at or above the entry point. Without an entry
/// point it must instead offer an equal or higher cabin than every previous
/// fare.
pub fn validate_entry_point(
    candidate: &FareCabins,
    entry_point: Option<&Arc<Fare>>,
    previous: &[FareCabins],
) -> bool {
    match entry_point {
        Some(entry) => candidate.fare().nuc_amount >= entry.nuc_amount,
        None => all_contain_equal_or_higher_cabin(previous, candidate),
    }
}
