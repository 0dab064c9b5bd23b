pub mod address;
pub mod etl;
pub mod merge;
pub mod pipeline;
pub mod tax;

#[cfg(test)]
pub(crate) mod testing;

pub use crate::domain::model::{Record, TransformResult};
pub use crate::domain::ports::{Pipeline, Storage, TaxService};
pub use crate::utils::error::Result;
