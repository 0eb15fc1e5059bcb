use std::sync::Arc;

use chrono::NaiveDate;
use tracing::error;

use crate::domain::{BookingCode, Cabin, CarrierCode, ClassOfService, Fare};

/// Cabin reference table keyed by carrier, booking code and travel date.
pub trait CabinLookup: Send + Sync {
    fn cabin(
        &self,
        carrier: &CarrierCode,
        booking_code: &BookingCode,
        travel_date: NaiveDate,
    ) -> Option<Cabin>;
}

/// Bulk cabin answer service. Fills `classes` in place; entries it cannot
/// answer keep the cabin they came in with.
pub trait RbdByCabinService: Send + Sync {
    fn fill_cabins(&self, fare: &Fare, classes: &mut [ClassOfService]);
}

/// A fare together with the cabins of its prime booking codes.
#[derive(Clone, Debug)]
pub struct FareCabins {
    fare: Arc<Fare>,
    classes: Vec<ClassOfService>,
}

impl FareCabins {
    pub fn fare(&self) -> &Arc<Fare> {
        &self.fare
    }

    pub fn classes(&self) -> &[ClassOfService] {
        &self.classes
    }

    #[cfg(test)]
    pub(crate) fn from_parts(fare: Arc<Fare>, classes: Vec<ClassOfService>) -> Self {
        Self { fare, classes }
    }
}

pub struct CabinResolver<'a> {
    lookup: &'a dyn CabinLookup,
    rbd_by_cabin: Option<&'a dyn RbdByCabinService>,
}

impl<'a> CabinResolver<'a> {
    pub fn new(lookup: &'a dyn CabinLookup, rbd_by_cabin: Option<&'a dyn RbdByCabinService>) -> Self {
        Self { lookup, rbd_by_cabin }
    }

    /// Cabins are only resolved for fares whose own market has flown air
    /// travel; every other fare yields an empty view.
    pub fn resolve(&self, fare: &Arc<Fare>) -> FareCabins {
        let booking_codes = fare.effective_booking_codes();
        if booking_codes.is_empty() || !fare.market.has_flown_air_segment() {
            return FareCabins { fare: Arc::clone(fare), classes: Vec::new() };
        }

        let classes = match self.rbd_by_cabin {
            Some(service) => {
                let mut classes: Vec<ClassOfService> =
                    booking_codes.iter().cloned().map(ClassOfService::unresolved).collect();
                service.fill_cabins(fare, &mut classes);
                classes
            }
            None => booking_codes.iter().map(|code| self.lookup_one(fare, code)).collect(),
        };

        FareCabins { fare: Arc::clone(fare), classes }
    }

    fn lookup_one(&self, fare: &Fare, booking_code: &BookingCode) -> ClassOfService {
        let carrier = fare.governing_carrier();
        match self.lookup.cabin(carrier, booking_code, fare.market.travel_date) {
            Some(cabin) => ClassOfService::new(booking_code.clone(), cabin),
            None => {
                error!(
                    event_name = "rbd.cabin.lookup_miss",
                    fare_id = %fare.id,
                    carrier = %carrier,
                    booking_code = %booking_code,
                    travel_date = %fare.market.travel_date,
                    "cabin table has no entry for booking code"
                );
                ClassOfService::unresolved(booking_code.clone())
            }
        }
    }
}
