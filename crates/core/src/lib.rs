pub mod config;
pub mod diagnostics;
pub mod domain;
pub mod errors;
pub mod rbd;
pub mod reference;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};
pub use diagnostics::{DiagnosticHeader, DiagnosticLevel, MarketStatus};
pub use domain::{Cabin, ClassOfService, Fare, FareMarket, Transaction};
pub use errors::{ApplicationError, DomainError};
pub use rbd::{Cat31Result, RbdServices, RbdTrace, RbdValidator};
pub use reference::{CabinRecord, CabinTable};
