//! Cabin comparisons between a candidate fare and previously ticketed fares.
//!
//! All checks go through `Cabin::is_equal_or_higher_than`, so an unresolved
//! cabin never beats a real one.

use crate::domain::{AirSegment, ClassOfService};
use crate::rbd::cabin::FareCabins;

/// Any candidate cabin equals any previous cabin.
pub fn contains_same_cabin(previous: &FareCabins, current: &FareCabins) -> bool {
    current.classes().iter().any(|current_class| {
        previous.classes().iter().any(|previous_class| current_class.cabin == previous_class.cabin)
    })
}

/// The candidate class is equal to or higher than every previous class.
pub fn current_equal_or_higher_than_prev(previous: &FareCabins, current: &ClassOfService) -> bool {
    previous
        .classes()
        .iter()
        .all(|previous_class| current.cabin.is_equal_or_higher_than(previous_class.cabin))
}

/// At least one candidate class is equal to or higher than all previous classes.
pub fn contains_equal_or_higher_cabin(previous: &FareCabins, current: &FareCabins) -> bool {
    current
        .classes()
        .iter()
        .any(|current_class| current_equal_or_higher_than_prev(previous, current_class))
}

/// `contains_same_cabin` against every previous fare. Fails on an empty list.
pub fn all_contain_same_cabin(previous: &[FareCabins], current: &FareCabins) -> bool {
    !previous.is_empty() && previous.iter().all(|fare| contains_same_cabin(fare, current))
}

/// `contains_equal_or_higher_cabin` against every previous fare. Fails on an
/// empty list.
pub fn all_contain_equal_or_higher_cabin(previous: &[FareCabins], current: &FareCabins) -> bool {
    !previous.is_empty()
        && previous.iter().all(|fare| contains_equal_or_higher_cabin(fare, current))
}

/// Some candidate class is equal to or higher than the cabin booked on the
/// flown segment.
pub fn cabin_equal_or_higher_than_booked(current: &FareCabins, segment: &AirSegment) -> bool {
    current
        .classes()
        .iter()
        .any(|class| class.cabin.is_equal_or_higher_than(segment.booked_cabin))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::{
        all_contain_equal_or_higher_cabin, all_contain_same_cabin, cabin_equal_or_higher_than_booked,
        contains_equal_or_higher_cabin, contains_same_cabin, current_equal_or_higher_than_prev,
    };
    use crate::domain::{Cabin, ClassOfService, TravelSegment};
    use crate::rbd::cabin::FareCabins;
    use crate::test_support::{air, code, fare_in, market};

    fn cabins(entries: &[(&str, Cabin)]) -> FareCabins {
        let mkt = market("MCN", "ATL", "DL", &[]);
        let fare = Arc::new(fare_in(&mkt, "TEST", 100, &[]));
        let classes = entries
            .iter()
            .map(|(booking_code, cabin)| ClassOfService::new(code(booking_code), *cabin))
            .collect();
        FareCabins::from_parts(fare, classes)
    }

    #[test]
    fn same_cabin_needs_one_shared_cabin() {
        let previous = cabins(&[("Y", Cabin::Economy), ("C", Cabin::Business)]);

        assert!(contains_same_cabin(&previous, &cabins(&[("J", Cabin::Business)])));
        assert!(!contains_same_cabin(&previous, &cabins(&[("F", Cabin::First)])));
        assert!(!contains_same_cabin(&previous, &cabins(&[])));
    }

    #[test]
    fn candidate_class_must_beat_every_previous_class() {
        let previous = cabins(&[("Y", Cabin::Economy), ("C", Cabin::Business)]);

        assert!(current_equal_or_higher_than_prev(
            &previous,
            &ClassOfService::new(code("C"), Cabin::Business)
        ));
        assert!(!current_equal_or_higher_than_prev(
            &previous,
            &ClassOfService::new(code("Y"), Cabin::Economy)
        ));
    }

    #[test]
    fn equal_or_higher_is_reflexive_for_non_empty_fares() {
        for cabin in Cabin::ALL {
            let fare = cabins(&[("X", cabin)]);
            assert!(contains_equal_or_higher_cabin(&fare, &fare), "{cabin:?}");
        }
        let mixed = cabins(&[("Y", Cabin::Economy), ("C", Cabin::Business)]);
        assert!(contains_equal_or_higher_cabin(&mixed, &mixed));
    }

    #[test]
    fn invalid_cabin_never_beats_a_real_cabin() {
        let previous = cabins(&[("Y", Cabin::Economy)]);
        assert!(!contains_equal_or_higher_cabin(&previous, &cabins(&[("Q", Cabin::Invalid)])));
        assert!(contains_equal_or_higher_cabin(&cabins(&[("Q", Cabin::Invalid)]), &previous));
    }

    #[test]
    fn aggregates_require_every_previous_fare_and_fail_when_empty() {
        let economy = cabins(&[("Y", Cabin::Economy)]);
        let business = cabins(&[("C", Cabin::Business)]);
        let candidate = cabins(&[("C", Cabin::Business)]);

        assert!(all_contain_equal_or_higher_cabin(&[economy.clone(), business.clone()], &candidate));
        assert!(!all_contain_same_cabin(&[economy.clone(), business.clone()], &candidate));
        assert!(all_contain_same_cabin(&[business], &candidate));
        assert!(!all_contain_equal_or_higher_cabin(&[], &candidate));
        assert!(!all_contain_same_cabin(&[], &candidate));
        assert!(all_contain_equal_or_higher_cabin(&[economy], &candidate));
    }

    #[test]
    fn booked_cabin_check_accepts_equal_or_better() {
        let TravelSegment::Air(segment) = air(1, "MCN", "ATL", "DL", 100, "A", true) else {
            panic!("expected air segment");
        };

        assert!(cabin_equal_or_higher_than_booked(&cabins(&[("A", Cabin::Business)]), &segment));
        assert!(cabin_equal_or_higher_than_booked(
            &cabins(&[("Y", Cabin::Economy), ("D", Cabin::First)]),
            &segment
        ));
        assert!(!cabin_equal_or_higher_than_booked(&cabins(&[("Y", Cabin::Economy)]), &segment));
    }
}
