use thiserror::Error;

use crate::{
    config::ConfigError, dataset::DatasetError, plan::PlanExportError, reference::ReferenceError,
};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("unknown show category `{0}`")]
    UnknownCategory(String),
    #[error("invalid month `{0}` (expected Jan..Dec or 1..=12)")]
    InvalidMonth(String),
    #[error("domain invariant violation: {0}")]
    InvariantViolation(String),
}

#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Configuration(#[from] ConfigError),
    #[error(transparent)]
    Reference(#[from] ReferenceError),
    #[error(transparent)]
    Dataset(#[from] DatasetError),
    #[error(transparent)]
    Export(#[from] PlanExportError),
}

impl ApplicationError {
    /// Stable machine-readable class used in command output.
    pub fn error_class(&self) -> &'static str {
        match self {
            Self::Domain(_) => "invalid_input",
            Self::Configuration(_) => "config_validation",
            Self::Reference(_) => "reference_tables",
            Self::Dataset(_) => "dataset_load",
            Self::Export(_) => "plan_export",
        }
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Domain(_) => 1,
            Self::Configuration(_) => 2,
            Self::Dataset(_) => 3,
            Self::Reference(_) => 4,
            Self::Export(_) => 5,
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Domain(_) => "The scenario could not be evaluated. Check inputs and try again.",
            Self::Configuration(_) | Self::Reference(_) => {
                "The tool is misconfigured. Fix the configuration and retry."
            }
            Self::Dataset(_) => "The demand dataset could not be loaded. No forecast is available.",
            Self::Export(_) => "The plan could not be exported.",
        }
    }
}
