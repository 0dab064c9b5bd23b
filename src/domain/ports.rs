use crate::domain::model::{
    Address, AddressResolution, InputTable, TaxCalculation, TaxDocument, TransformResult,
};
use crate::utils::error::{Result, ServiceError};
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// Remote address normalization and tax computation.
///
/// Implementations own authentication and transport. Each method is called
/// once per record and never batched.
#[async_trait]
pub trait TaxService: Send + Sync {
    async fn resolve_address(
        &self,
        address: &Address,
    ) -> std::result::Result<AddressResolution, ServiceError>;

    async fn compute_tax(
        &self,
        document: &TaxDocument,
    ) -> std::result::Result<TaxCalculation, ServiceError>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<InputTable>;
    async fn transform(&self, data: InputTable) -> Result<TransformResult>;
    async fn load(&self, result: TransformResult) -> Result<String>;
}
