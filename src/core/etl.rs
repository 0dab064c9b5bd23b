use crate::adapters::csv_codec::{output_columns, parse_records, require_columns, write_records};
use crate::config::toml_config::TaxEtlConfig;
use crate::core::merge::output_header;
use crate::core::pipeline::TaxResolver;
use crate::core::{Pipeline, Storage, TransformResult};
use crate::domain::model::InputTable;
use crate::domain::ports::TaxService;
use crate::utils::error::Result;

/// CSV in, enriched CSV out.
pub struct TaxEnrichmentPipeline<S: Storage, T: TaxService> {
    storage: S,
    resolver: TaxResolver<T>,
    input_path: String,
    output_path: String,
    required_columns: Vec<String>,
    output_columns: Option<Vec<String>>,
}

impl<S: Storage, T: TaxService> TaxEnrichmentPipeline<S, T> {
    pub fn new(
        storage: S,
        service: T,
        config: TaxEtlConfig,
        input_path: impl Into<String>,
        output_path: impl Into<String>,
    ) -> Self {
        Self {
            storage,
            resolver: TaxResolver::new(service, config.document),
            input_path: input_path.into(),
            output_path: output_path.into(),
            required_columns: config.input.required_columns,
            output_columns: config.output.columns,
        }
    }
}

#[async_trait::async_trait]
impl<S: Storage, T: TaxService> Pipeline for TaxEnrichmentPipeline<S, T> {
    async fn extract(&self) -> Result<InputTable> {
        tracing::info!("📥 Reading records from {}", self.input_path);
        let data = self.storage.read_file(&self.input_path).await?;
        let table = parse_records(&data)?;
        require_columns(&table.columns, &self.required_columns)?;
        Ok(table)
    }

    async fn transform(&self, data: InputTable) -> Result<TransformResult> {
        let mut result = self.resolver.process(&data.records).await;
        result.input_columns = data.columns;
        Ok(result)
    }

    async fn load(&self, result: TransformResult) -> Result<String> {
        let columns = output_columns(
            &result.processed_records,
            self.output_columns.as_deref(),
            &output_header(&result.input_columns),
        );
        let bytes = write_records(&result.processed_records, &columns)?;

        self.storage.write_file(&self.output_path, &bytes).await?;
        tracing::info!(
            "💾 Wrote {} records to {}",
            result.processed_records.len(),
            self.output_path
        );
        Ok(self.output_path.clone())
    }
}

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<String> {
        tracing::info!("Starting tax enrichment run");

        let raw_data = self.pipeline.extract().await?;
        tracing::info!("Extracted {} records", raw_data.records.len());

        let transformed = self.pipeline.transform(raw_data).await?;
        tracing::info!(
            "Transformed {} records",
            transformed.processed_records.len()
        );

        let output_path = self.pipeline.load(transformed).await?;
        tracing::info!("Output saved to: {}", output_path);

        Ok(output_path)
    }
}
