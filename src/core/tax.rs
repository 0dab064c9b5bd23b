use crate::config::toml_config::DocumentConfig;
use crate::domain::model::{Address, TaxAddresses, TaxDocument, TaxLine, TaxOutcome};
use crate::domain::ports::TaxService;
use chrono::{Local, NaiveDate};

/// Builds the single-line sales order for one record. Never committed.
pub fn build_tax_document(
    settings: &DocumentConfig,
    address: &Address,
    amount: f64,
    date: NaiveDate,
) -> TaxDocument {
    TaxDocument {
        document_type: settings.document_type.clone(),
        company_code: settings.company_code.clone(),
        date,
        customer_code: settings.customer_code.clone(),
        purchase_order_no: settings.purchase_order_no.clone(),
        addresses: TaxAddresses {
            single_location: address.clone(),
        },
        lines: vec![TaxLine {
            number: "1".to_string(),
            quantity: 1.0,
            amount,
            item_code: settings.item_code.clone(),
            description: settings.line_description.clone(),
        }],
        commit: false,
        currency_code: settings.currency_code.clone(),
        description: settings.description.clone(),
    }
}

/// Computes the tax for one record. Every failure is terminal for the record
/// and comes back as [`TaxOutcome::Failed`].
pub async fn resolve_tax<T: TaxService + ?Sized>(
    service: &T,
    settings: &DocumentConfig,
    address: &Address,
    amount: Option<f64>,
    index: usize,
) -> TaxOutcome {
    let Some(amount) = amount else {
        tracing::warn!("Tax resolution for the record {} skipped: amount is not numeric", index);
        return TaxOutcome::Failed("amount is not numeric".to_string());
    };

    let date = settings.date.unwrap_or_else(|| Local::now().date_naive());
    let document = build_tax_document(settings, address, amount, date);
    tracing::debug!("Tax document for the record {}: {:?}", index, document);

    match service.compute_tax(&document).await {
        Ok(calculation) => match calculation.total_tax_calculated {
            Some(total) => TaxOutcome::Computed(total),
            None => {
                tracing::warn!(
                    "Tax resolution for the record {} failed: response has no totalTaxCalculated",
                    index
                );
                TaxOutcome::Failed("response has no totalTaxCalculated".to_string())
            }
        },
        Err(e) => {
            tracing::warn!("Tax resolution for the record {} failed: {}", index, e);
            TaxOutcome::Failed(e.to_string())
        }
    }
}
