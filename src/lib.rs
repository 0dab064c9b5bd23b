pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{avatax::AvaTaxClient, storage::LocalStorage};
pub use config::{Credentials, TaxEtlConfig};
pub use core::{
    etl::{EtlEngine, TaxEnrichmentPipeline},
    pipeline::TaxResolver,
};
pub use domain::model::{FieldValue, Record, TaxOutcome};
pub use domain::ports::TaxService;
pub use utils::error::{EtlError, Result, ServiceError};
