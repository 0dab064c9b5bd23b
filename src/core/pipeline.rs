use crate::config::toml_config::DocumentConfig;
use crate::core::address::resolve_address;
use crate::core::merge::build_output_record;
use crate::core::tax::resolve_tax;
use crate::domain::model::{AddressStatus, Record, TransformResult};
use crate::domain::ports::TaxService;

/// Output row of one record plus how its two resolution steps went.
#[derive(Debug, Clone)]
pub struct ProcessedRecord {
    pub record: Record,
    pub address_status: AddressStatus,
    pub tax_failed: bool,
}

/// Runs the per-record resolution sequence over a batch.
///
/// Records are processed strictly one after another with a single
/// outstanding remote call, so the output order always matches the input.
pub struct TaxResolver<T: TaxService> {
    service: T,
    document: DocumentConfig,
}

impl<T: TaxService> TaxResolver<T> {
    pub fn new(service: T, document: DocumentConfig) -> Self {
        Self { service, document }
    }

    pub fn service(&self) -> &T {
        &self.service
    }

    /// Resolves one record. Never fails; see [`build_output_record`].
    pub async fn process_record(&self, record: &Record, index: usize) -> ProcessedRecord {
        tracing::info!("Record {}: BEGIN", index);

        let resolved = resolve_address(&self.service, record, index).await;
        tracing::info!("Record {}: Address resolution done.", index);

        let tax = resolve_tax(
            &self.service,
            &self.document,
            &resolved.address,
            record.amount(),
            index,
        )
        .await;
        tracing::info!("Record {}: Tax resolution done.", index);

        ProcessedRecord {
            record: build_output_record(record, &resolved, &tax),
            address_status: resolved.status,
            tax_failed: tax.is_failed(),
        }
    }

    pub async fn process(&self, records: &[Record]) -> TransformResult {
        let mut result = TransformResult {
            processed_records: Vec::with_capacity(records.len()),
            ..TransformResult::default()
        };

        for (index, record) in records.iter().enumerate() {
            let processed = self.process_record(record, index).await;

            match processed.address_status {
                AddressStatus::Resolved => {}
                AddressStatus::Ambiguous(_) => result.ambiguous_addresses += 1,
                AddressStatus::Unresolved => result.unresolved_addresses += 1,
                AddressStatus::Failed => result.address_failures += 1,
            }
            if processed.tax_failed {
                result.tax_failures += 1;
            }

            result.processed_records.push(processed.record);
        }

        tracing::info!(
            "✅ Resolved {} records ({} address failures, {} unresolved, {} ambiguous, {} tax failures)",
            result.processed_records.len(),
            result.address_failures,
            result.unresolved_addresses,
            result.ambiguous_addresses,
            result.tax_failures
        );

        result
    }
}
