use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::fare::Fare;
use crate::domain::itinerary::ExchangeItinerary;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExchangeType {
    /// Voluntary change governed by rule category 31.
    Reissue,
    /// Voluntary refund governed by rule category 33.
    Refund,
}

impl ExchangeType {
    pub fn category_label(self) -> &'static str {
        match self {
            Self::Reissue => "CAT 31",
            Self::Refund => "CAT 33",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExchangePhase {
    ExchangedItinerary,
    NewItinerary,
}

#[derive(Clone, Debug)]
pub struct ExchangeContext {
    pub exchange_type: ExchangeType,
    pub phase: ExchangePhase,
    pub fare_retrieval_date: NaiveDate,
    pub previous: ExchangeItinerary,
}

#[derive(Clone, Debug)]
pub enum TransactionKind {
    Pricing,
    Exchange(ExchangeContext),
}

#[derive(Clone, Debug)]
pub struct Transaction {
    pub ticketing_date: NaiveDate,
    pub kind: TransactionKind,
}

impl Transaction {
    pub fn exchange(&self) -> Option<&ExchangeContext> {
        match &self.kind {
            TransactionKind::Exchange(context) => Some(context),
            TransactionKind::Pricing => None,
        }
    }

    /// Exchange context when pricing the new itinerary of an exchange.
    pub fn exchange_for_new_itinerary(&self) -> Option<&ExchangeContext> {
        self.exchange().filter(|context| context.phase == ExchangePhase::NewItinerary)
    }

    /// Plain pricing accepts any fare; an exchange only fares retrieved on the
    /// expected date.
    pub fn matches_fare_retrieval_date(&self, fare: &Fare) -> bool {
        match &self.kind {
            TransactionKind::Pricing => true,
            TransactionKind::Exchange(context) => fare.retrieval_date == context.fare_retrieval_date,
        }
    }
}
