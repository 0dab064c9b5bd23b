use crate::domain::model::{AddressStatus, Record, ResolvedAddress, ServiceMessage};
use crate::domain::ports::TaxService;

/// Terminates every diagnostic entry in the `messages` column.
pub const MESSAGE_DELIMITER: &str = "EOM. ";

const UNRESOLVED_NOTE: &str = "Address could not be resolved";

/// Concatenates service messages in the order they were returned.
pub fn build_diagnostics(messages: &[ServiceMessage]) -> String {
    messages
        .iter()
        .map(|message| {
            format!(
                "{} {} {}",
                message.summary.as_deref().unwrap_or_default(),
                message.details.as_deref().unwrap_or_default(),
                MESSAGE_DELIMITER
            )
        })
        .collect()
}

/// Normalizes the record's address. Failures never propagate; they end up in
/// the returned diagnostics instead.
pub async fn resolve_address<T: TaxService + ?Sized>(
    service: &T,
    record: &Record,
    index: usize,
) -> ResolvedAddress {
    let input = record.address();

    let resolution = match service.resolve_address(&input).await {
        Ok(resolution) => resolution,
        Err(e) => {
            tracing::error!("Tax service failure for the record {}: {}", index, e);
            return ResolvedAddress::failed(e.to_string());
        }
    };

    let mut diagnostics = build_diagnostics(&resolution.messages);
    let candidates = resolution.validated_addresses.len();

    let status = match candidates {
        0 => {
            tracing::error!("Could not resolve address for the record {}", index);
            diagnostics.push_str(&format!("{} {}", UNRESOLVED_NOTE, MESSAGE_DELIMITER));
            AddressStatus::Unresolved
        }
        1 => AddressStatus::Resolved,
        n => {
            tracing::warn!(
                "Multiple addresses ({}) resolved for the record {}. Using the first one",
                n,
                index
            );
            AddressStatus::Ambiguous(n)
        }
    };

    let address = resolution
        .validated_addresses
        .into_iter()
        .next()
        .unwrap_or_default();

    ResolvedAddress {
        address,
        diagnostics,
        status,
    }
}
