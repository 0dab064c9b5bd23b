use crate::domain::model::{FieldValue, Record, ResolvedAddress, TaxOutcome};

pub const NEW_LINE1: &str = "new_line1";
pub const NEW_CITY: &str = "new_city";
pub const NEW_REGION: &str = "new_region";
pub const NEW_COUNTRY: &str = "new_country";
pub const NEW_POSTAL_CODE: &str = "new_postalCode";
pub const MESSAGES: &str = "messages";
pub const TAX: &str = "tax";

/// Columns appended to every output row, in output order.
pub const ADDED_COLUMNS: [&str; 7] = [
    NEW_LINE1,
    NEW_CITY,
    NEW_REGION,
    NEW_COUNTRY,
    NEW_POSTAL_CODE,
    MESSAGES,
    TAX,
];

/// Header of the output file: the input header followed by the added
/// columns it does not already name.
pub fn output_header(input_columns: &[String]) -> Vec<String> {
    let mut header = input_columns.to_vec();
    for column in ADDED_COLUMNS {
        if !header.iter().any(|c| c == column) {
            header.push(column.to_string());
        }
    }
    header
}

/// Combines an input row with its resolution results. Every input row yields
/// exactly one output row; failures show up as blank address cells, a `NaN`
/// tax and the diagnostics text.
pub fn build_output_record(record: &Record, resolved: &ResolvedAddress, tax: &TaxOutcome) -> Record {
    let mut result = record.clone();
    let address = &resolved.address;

    result.insert(NEW_LINE1, FieldValue::from_option(address.line1.as_deref()));
    result.insert(NEW_CITY, FieldValue::from_option(address.city.as_deref()));
    result.insert(NEW_REGION, FieldValue::from_option(address.region.as_deref()));
    result.insert(NEW_COUNTRY, FieldValue::from_option(address.country.as_deref()));
    result.insert(
        NEW_POSTAL_CODE,
        FieldValue::from_option(address.postal_code.as_deref()),
    );
    result.insert(MESSAGES, FieldValue::text(resolved.diagnostics.as_str()));
    result.insert(TAX, tax.to_field());

    result
}
