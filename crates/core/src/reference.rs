use std::collections::HashMap;
use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::warn;

use crate::domain::{BookingCode, Cabin, CarrierCode, ClassOfService, Fare};
use crate::errors::ApplicationError;
use crate::rbd::{CabinLookup, RbdByCabinService};

/// One cabin assignment of a carrier's booking code over a date range.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct CabinRecord {
    pub carrier: CarrierCode,
    pub booking_code: BookingCode,
    pub cabin: Cabin,
    #[serde(default)]
    pub effective: Option<NaiveDate>,
    #[serde(default)]
    pub discontinue: Option<NaiveDate>,
}

impl CabinRecord {
    fn covers(&self, date: NaiveDate) -> bool {
        self.effective.map_or(true, |effective| effective <= date)
            && self.discontinue.map_or(true, |discontinue| date <= discontinue)
    }
}

#[derive(Debug, Deserialize)]
struct CabinTableFile {
    #[serde(default)]
    cabin: Vec<CabinRecord>,
}

/// In-memory cabin reference table.
///
/// When several records cover the same date the one added last wins.
#[derive(Clone, Debug, Default)]
pub struct CabinTable {
    records: HashMap<(CarrierCode, BookingCode), Vec<CabinRecord>>,
}

impl CabinTable {
    pub fn new(records: impl IntoIterator<Item = CabinRecord>) -> Self {
        let mut table = Self::default();
        for record in records {
            table.insert(record);
        }
        table
    }

    pub fn insert(&mut self, record: CabinRecord) {
        self.records
            .entry((record.carrier.clone(), record.booking_code.clone()))
            .or_default()
            .push(record);
    }

    pub fn len(&self) -> usize {
        self.records.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Parses `[[cabin]]` entries of a TOML document.
    pub fn from_toml_str(raw: &str) -> Result<Self, ApplicationError> {
        let file: CabinTableFile = toml::from_str(raw)
            .map_err(|error| ApplicationError::ReferenceData(format!("cabin table: {error}")))?;
        for record in &file.cabin {
            if let (Some(effective), Some(discontinue)) = (record.effective, record.discontinue) {
                if discontinue < effective {
                    return Err(ApplicationError::ReferenceData(format!(
                        "cabin record {} {} is discontinued before it becomes effective",
                        record.carrier, record.booking_code
                    )));
                }
            }
        }
        Ok(Self::new(file.cabin))
    }

    pub fn load(path: &Path) -> Result<Self, ApplicationError> {
        let raw = fs::read_to_string(path).map_err(|error| {
            ApplicationError::ReferenceData(format!(
                "failed to read cabin table {}: {error}",
                path.display()
            ))
        })?;
        Self::from_toml_str(&raw)
    }
}

impl CabinLookup for CabinTable {
    fn cabin(
        &self,
        carrier: &CarrierCode,
        booking_code: &BookingCode,
        travel_date: NaiveDate,
    ) -> Option<Cabin> {
        self.records
            .get(&(carrier.clone(), booking_code.clone()))?
            .iter()
            .rev()
            .find(|record| record.covers(travel_date))
            .map(|record| record.cabin)
    }
}

impl RbdByCabinService for CabinTable {
    fn fill_cabins(&self, fare: &Fare, classes: &mut [ClassOfService]) {
        let carrier = fare.governing_carrier();
        let travel_date = fare.market.travel_date;
        for class in classes.iter_mut() {
            match self.cabin(carrier, &class.booking_code, travel_date) {
                Some(cabin) => class.cabin = cabin,
                None => warn!(
                    event_name = "rbd.rbd_by_cabin.miss",
                    fare_id = %fare.id,
                    carrier = %carrier,
                    booking_code = %class.booking_code,
                    "no cabin answer for booking code"
                ),
            }
        }
    }
}
