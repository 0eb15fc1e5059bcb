use thiserror::Error;

use crate::config::ConfigError;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid {kind} `{value}`: {reason}")]
    InvalidCode { kind: &'static str, value: String, reason: &'static str },
}

#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Configuration(#[from] ConfigError),
    #[error("reference data failure: {0}")]
    ReferenceData(String),
    #[error("scenario failure: {0}")]
    Scenario(String),
}

impl ApplicationError {
    /// Stable class name used in structured command output.
    pub fn error_class(&self) -> &'static str {
        match self {
            Self::Domain(_) => "domain_validation",
            Self::Configuration(_) => "config_validation",
            Self::ReferenceData(_) => "reference_data",
            Self::Scenario(_) => "scenario",
        }
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Configuration(_) => 2,
            Self::ReferenceData(_) => 3,
            Self::Domain(_) | Self::Scenario(_) => 4,
        }
    }
}
