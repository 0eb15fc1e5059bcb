use std::collections::HashMap;
use std::collections::HashSet;
use std::sync::Mutex;

use tracing::warn;

use crate::domain::{Fare, FareId, FareKind, Itinerary, RuleCategory, Transaction};

/// Fare rule category validation run on demand for categories earlier
/// processing left pending.
pub trait RuleValidator: Send + Sync {
    fn validate_categories(
        &self,
        trx: &Transaction,
        itin: &Itinerary,
        fare: &Fare,
        categories: &[RuleCategory],
    ) -> bool;
}

/// Categories that must already hold before a fare can enter the hierarchy.
const REQUIRED_PASSED: [RuleCategory; 2] =
    [RuleCategory::ELIGIBILITY, RuleCategory::SALES_RESTRICTIONS];

/// Categories validated on demand when not yet processed.
const ON_DEMAND: [RuleCategory; 3] = [
    RuleCategory::SEASONAL,
    RuleCategory::ACCOMPANIED_PASSENGER,
    RuleCategory::TRAVEL_RESTRICTIONS,
];

/// Whether `fare` qualifies for the RBD hierarchy of its market.
pub fn is_valid_for_hierarchy(
    trx: &Transaction,
    itin: &Itinerary,
    fare: &Fare,
    rules: &dyn RuleValidator,
) -> bool {
    if !trx.matches_fare_retrieval_date(fare) {
        return false;
    }

    let status = &fare.status;
    if status.valid_without_booking_code {
        return true;
    }

    if !status.valid {
        return false;
    }
    if let FareKind::Industry { valid_for_pricing: false } = fare.kind {
        return false;
    }

    if status.data_missing || status.not_valid_for_context || status.failed_fare_group {
        return false;
    }
    if !status.routing_processed || !status.routing_valid {
        return false;
    }

    if REQUIRED_PASSED.iter().any(|category| !fare.categories.is_valid(*category)) {
        return false;
    }

    validate_categories(trx, itin, fare, &ON_DEMAND, rules)
}

fn validate_categories(
    trx: &Transaction,
    itin: &Itinerary,
    fare: &Fare,
    categories: &[RuleCategory],
    rules: &dyn RuleValidator,
) -> bool {
    let mut pending = Vec::new();
    for category in categories {
        if fare.categories.is_processed(*category) {
            if !fare.categories.is_valid(*category) {
                return false;
            }
        } else {
            pending.push(*category);
        }
    }

    pending.is_empty() || rules.validate_categories(trx, itin, fare, &pending)
}

/// Accepts every category. Useful when the caller has already run full rule
/// validation on the market.
#[derive(Clone, Copy, Debug, Default)]
pub struct PermissiveRuleValidator;

impl RuleValidator for PermissiveRuleValidator {
    fn validate_categories(
        &self,
        _trx: &Transaction,
        _itin: &Itinerary,
        _fare: &Fare,
        _categories: &[RuleCategory],
    ) -> bool {
        true
    }
}

/// Fails a fixed set of (fare, category) pairs and accepts everything else.
#[derive(Clone, Debug, Default)]
pub struct StaticRuleValidator {
    failures: HashSet<(FareId, RuleCategory)>,
}

impl StaticRuleValidator {
    pub fn new(failures: impl IntoIterator<Item = (FareId, RuleCategory)>) -> Self {
        Self { failures: failures.into_iter().collect() }
    }
}

impl RuleValidator for StaticRuleValidator {
    fn validate_categories(
        &self,
        _trx: &Transaction,
        _itin: &Itinerary,
        fare: &Fare,
        categories: &[RuleCategory],
    ) -> bool {
        categories.iter().all(|category| !self.failures.contains(&(fare.id.clone(), *category)))
    }
}

type MemoKey = (FareId, Vec<RuleCategory>);

/// Caches answers of an inner validator per fare and category set.
pub struct MemoizedRuleValidator<V> {
    inner: V,
    answers: Mutex<HashMap<MemoKey, bool>>,
}

impl<V: RuleValidator> MemoizedRuleValidator<V> {
    pub fn new(inner: V) -> Self {
        Self { inner, answers: Mutex::new(HashMap::new()) }
    }

    pub fn cached_answers(&self) -> usize {
        match self.answers.lock() {
            Ok(guard) => guard.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }
}

impl<V: RuleValidator> RuleValidator for MemoizedRuleValidator<V> {
    fn validate_categories(
        &self,
        trx: &Transaction,
        itin: &Itinerary,
        fare: &Fare,
        categories: &[RuleCategory],
    ) -> bool {
        let key = (fare.id.clone(), categories.to_vec());
        let mut answers = match self.answers.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!(
                    event_name = "rbd.rules.cache_poisoned",
                    fare_id = %fare.id,
                    "rule answer cache lock was poisoned; continuing with recovered state"
                );
                poisoned.into_inner()
            }
        };
        if let Some(answer) = answers.get(&key) {
            return *answer;
        }

        let answer = self.inner.validate_categories(trx, itin, fare, categories);
        answers.insert(key, answer);
        answer
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::{
        is_valid_for_hierarchy, MemoizedRuleValidator, PermissiveRuleValidator, RuleValidator,
        StaticRuleValidator,
    };
    use crate::domain::{
        CategoryState, Fare, FareId, FareKind, Itinerary, RuleCategory, Transaction,
    };
    use crate::test_support::{
        date, exchange_trx, fare_in, international_itin, market, retrieval_date,
    };

    #[derive(Default)]
    struct CountingValidator {
        calls: AtomicUsize,
    }

    impl RuleValidator for CountingValidator {
        fn validate_categories(
            &self,
            _trx: &Transaction,
            _itin: &Itinerary,
            _fare: &Fare,
            categories: &[RuleCategory],
        ) -> bool {
            self.calls.fetch_add(1, Ordering::SeqCst);
            !categories.contains(&RuleCategory::TRAVEL_RESTRICTIONS)
        }
    }

    fn base_fare() -> Fare {
        let mkt = market("MCN", "ATL", "DL", &[]);
        fare_in(&mkt, "Y26", 100, &["Y"])
    }

    #[test]
    fn retrieval_date_mismatch_excludes_even_fares_valid_without_booking_code() {
        let trx = exchange_trx(Vec::new());
        let itin = international_itin();
        let mut fare = base_fare();
        fare.status.valid_without_booking_code = true;
        fare.retrieval_date = date(2009, 1, 1);

        assert!(!is_valid_for_hierarchy(&trx, &itin, &fare, &PermissiveRuleValidator));

        fare.retrieval_date = retrieval_date();
        fare.status.valid = false;
        assert!(is_valid_for_hierarchy(&trx, &itin, &fare, &PermissiveRuleValidator));
    }

    fn passes_after(mutate: impl FnOnce(&mut Fare)) -> bool {
        let trx = exchange_trx(Vec::new());
        let itin = international_itin();
        let mut fare = base_fare();
        mutate(&mut fare);
        is_valid_for_hierarchy(&trx, &itin, &fare, &PermissiveRuleValidator)
    }

    #[test]
    fn status_flags_exclude_fares() {
        assert!(passes_after(|_| {}));
        assert!(!passes_after(|fare| fare.status.valid = false));
        assert!(!passes_after(|fare| fare.kind = FareKind::Industry { valid_for_pricing: false }));
        assert!(passes_after(|fare| fare.kind = FareKind::Industry { valid_for_pricing: true }));
        assert!(!passes_after(|fare| fare.status.data_missing = true));
        assert!(!passes_after(|fare| fare.status.not_valid_for_context = true));
        assert!(!passes_after(|fare| fare.status.failed_fare_group = true));
        assert!(!passes_after(|fare| fare.status.routing_processed = false));
        assert!(!passes_after(|fare| fare.status.routing_valid = false));
    }

    #[test]
    fn failed_categories_exclude_fares() {
        for category in [
            RuleCategory::ELIGIBILITY,
            RuleCategory::SALES_RESTRICTIONS,
            RuleCategory::SEASONAL,
            RuleCategory::ACCOMPANIED_PASSENGER,
            RuleCategory::TRAVEL_RESTRICTIONS,
        ] {
            assert!(
                !passes_after(|fare| fare.categories.set(category, CategoryState::Failed)),
                "{category} should exclude the fare"
            );
        }
    }

    #[test]
    fn pending_categories_are_delegated_in_one_call() {
        let trx = exchange_trx(Vec::new());
        let itin = international_itin();
        let rules = CountingValidator::default();

        let mut fare = base_fare();
        fare.categories.set(RuleCategory::TRAVEL_RESTRICTIONS, CategoryState::Passed);
        assert!(is_valid_for_hierarchy(&trx, &itin, &fare, &rules));
        assert_eq!(rules.calls.load(Ordering::SeqCst), 1);

        assert!(!is_valid_for_hierarchy(&trx, &itin, &base_fare(), &rules));
        assert_eq!(rules.calls.load(Ordering::SeqCst), 2);

        let mut processed = base_fare();
        for category in [
            RuleCategory::SEASONAL,
            RuleCategory::ACCOMPANIED_PASSENGER,
            RuleCategory::TRAVEL_RESTRICTIONS,
        ] {
            processed.categories.set(category, CategoryState::Passed);
        }
        assert!(is_valid_for_hierarchy(&trx, &itin, &processed, &rules));
        assert_eq!(rules.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn static_validator_fails_listed_pairs() {
        let trx = exchange_trx(Vec::new());
        let itin = international_itin();
        let fare = base_fare();
        let rules =
            StaticRuleValidator::new([(FareId("Y26".to_owned()), RuleCategory::SEASONAL)]);

        assert!(!is_valid_for_hierarchy(&trx, &itin, &fare, &rules));
        assert!(rules.validate_categories(&trx, &itin, &fare, &[RuleCategory::TRAVEL_RESTRICTIONS]));
    }

    #[test]
    fn memoized_validator_answers_repeat_questions_from_cache() {
        let trx = exchange_trx(Vec::new());
        let itin = international_itin();
        let memo = MemoizedRuleValidator::new(CountingValidator::default());
        let fare = base_fare();

        for _ in 0..3 {
            assert!(!is_valid_for_hierarchy(&trx, &itin, &fare, &memo));
        }
        assert_eq!(memo.inner.calls.load(Ordering::SeqCst), 1);
        assert_eq!(memo.cached_answers(), 1);
    }
}
