use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use tax_etl::domain::model::{
    Address, AddressResolution, ServiceMessage, TaxCalculation, TaxDocument,
};
use tax_etl::{
    EtlEngine, FieldValue, LocalStorage, Record, ServiceError, TaxEnrichmentPipeline, TaxEtlConfig,
    TaxResolver, TaxService,
};
use tempfile::TempDir;

/// Answers keyed by the input `line1`, so one batch can mix outcomes.
#[derive(Default)]
struct ScriptedTaxService {
    addresses: HashMap<String, std::result::Result<AddressResolution, String>>,
    taxes: HashMap<String, std::result::Result<f64, String>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedTaxService {
    fn address(mut self, line1: &str, answer: std::result::Result<AddressResolution, &str>) -> Self {
        self.addresses
            .insert(line1.to_string(), answer.map_err(str::to_string));
        self
    }

    fn tax(mut self, line1: &str, answer: std::result::Result<f64, &str>) -> Self {
        self.taxes
            .insert(line1.to_string(), answer.map_err(str::to_string));
        self
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl TaxService for ScriptedTaxService {
    async fn resolve_address(
        &self,
        address: &Address,
    ) -> std::result::Result<AddressResolution, ServiceError> {
        let key = address.line1.clone().unwrap_or_default();
        self.calls.lock().unwrap().push(format!("resolve:{}", key));
        match self.addresses.get(&key) {
            Some(Ok(resolution)) => Ok(resolution.clone()),
            Some(Err(message)) => Err(ServiceError::Unavailable(message.clone())),
            None => Ok(AddressResolution::default()),
        }
    }

    async fn compute_tax(
        &self,
        document: &TaxDocument,
    ) -> std::result::Result<TaxCalculation, ServiceError> {
        let key = document
            .addresses
            .single_location
            .line1
            .clone()
            .unwrap_or_default();
        self.calls.lock().unwrap().push(format!("tax:{}", key));
        match self.taxes.get(&key) {
            Some(Ok(total)) => Ok(TaxCalculation {
                total_tax_calculated: Some(*total),
            }),
            Some(Err(message)) => Err(ServiceError::Unavailable(message.clone())),
            None => Err(ServiceError::Rejected {
                status: 400,
                message: "MissingAddress: An address is required".to_string(),
            }),
        }
    }
}

fn springfield() -> Address {
    Address {
        line1: Some("1 Main St".to_string()),
        city: Some("Springfield".to_string()),
        region: Some("IL".to_string()),
        country: Some("US".to_string()),
        postal_code: Some("62701".to_string()),
        ..Address::default()
    }
}

fn springfield_record() -> Record {
    [
        ("amount", FieldValue::text("100")),
        ("line1", FieldValue::text("1 Main St")),
        ("city", FieldValue::text("Springfield")),
        ("region", FieldValue::text("IL")),
        ("country", FieldValue::text("US")),
        ("postalCode", FieldValue::text("62701")),
    ]
    .into_iter()
    .collect()
}

fn text(value: &str) -> Option<FieldValue> {
    Some(FieldValue::text(value))
}

#[tokio::test]
async fn test_resolved_record_gets_address_and_tax() {
    let service = ScriptedTaxService::default()
        .address(
            "1 Main St",
            Ok(AddressResolution {
                validated_addresses: vec![springfield()],
                messages: vec![],
            }),
        )
        .tax("1 Main St", Ok(8.25));
    let resolver = TaxResolver::new(service, TaxEtlConfig::default().document);
    let input = springfield_record();

    let result = resolver.process(std::slice::from_ref(&input)).await;

    assert_eq!(result.processed_records.len(), 1);
    let output = &result.processed_records[0];
    for (column, value) in &input.data {
        assert_eq!(output.get(column), Some(value));
    }
    assert_eq!(output.get("new_line1").cloned(), text("1 Main St"));
    assert_eq!(output.get("new_city").cloned(), text("Springfield"));
    assert_eq!(output.get("new_region").cloned(), text("IL"));
    assert_eq!(output.get("new_country").cloned(), text("US"));
    assert_eq!(output.get("new_postalCode").cloned(), text("62701"));
    assert_eq!(output.get("messages").cloned(), text(""));
    assert_eq!(output.get("tax"), Some(&FieldValue::Number(8.25)));
}

#[tokio::test]
async fn test_address_timeout_still_produces_a_row() {
    let service = ScriptedTaxService::default().address("1 Main St", Err("timeout"));
    let resolver = TaxResolver::new(service, TaxEtlConfig::default().document);

    let result = resolver.process(&[springfield_record()]).await;

    let output = &result.processed_records[0];
    for column in [
        "new_line1",
        "new_city",
        "new_region",
        "new_country",
        "new_postalCode",
    ] {
        assert_eq!(output.get(column), Some(&FieldValue::Absent), "{}", column);
    }
    assert_eq!(output.get("messages").cloned(), text("timeout"));
    assert_eq!(output.get("tax").cloned(), text("NaN"));
    assert_eq!(result.address_failures, 1);
    assert_eq!(result.tax_failures, 1);
    // Tax is still attempted, with an empty location.
    assert_eq!(resolver.service().calls(), vec!["resolve:1 Main St", "tax:"]);
}

#[tokio::test]
async fn test_mixed_batch_keeps_order_and_isolates_failures() {
    let service = ScriptedTaxService::default()
        .address(
            "1 Main St",
            Ok(AddressResolution {
                validated_addresses: vec![springfield()],
                messages: vec![ServiceMessage::new(
                    "Address was changed",
                    "Postal code corrected",
                )],
            }),
        )
        .tax("1 Main St", Ok(8.25))
        .address("2 Nowhere Rd", Err("connection reset"))
        .address(
            "3 Lost Ln",
            Ok(AddressResolution {
                validated_addresses: vec![],
                messages: vec![ServiceMessage::new("AddressNotFound", "No match")],
            }),
        );
    let resolver = TaxResolver::new(service, TaxEtlConfig::default().document);

    let records: Vec<Record> = ["1 Main St", "2 Nowhere Rd", "3 Lost Ln"]
        .into_iter()
        .map(|line1| {
            let mut record = springfield_record();
            record.insert("line1", FieldValue::text(line1));
            record
        })
        .collect();

    let result = resolver.process(&records).await;

    assert_eq!(result.processed_records.len(), 3);
    for (input, output) in records.iter().zip(&result.processed_records) {
        assert_eq!(output.get("line1"), input.get("line1"));
    }

    let first = &result.processed_records[0];
    assert_eq!(
        first.get("messages").cloned(),
        text("Address was changed Postal code corrected EOM. ")
    );
    assert_eq!(first.get("tax"), Some(&FieldValue::Number(8.25)));

    let second = &result.processed_records[1];
    assert_eq!(second.get("messages").cloned(), text("connection reset"));

    let third = &result.processed_records[2];
    let messages = third.get("messages").map(FieldValue::render).unwrap_or_default();
    assert!(messages.starts_with("AddressNotFound No match EOM. "));
    assert_eq!(third.get("new_line1"), Some(&FieldValue::Absent));
    assert_eq!(third.get("tax").cloned(), text("NaN"));

    assert_eq!(result.address_failures, 1);
    assert_eq!(result.unresolved_addresses, 1);
    assert_eq!(result.tax_failures, 2);
    assert_eq!(
        resolver.service().calls(),
        vec![
            "resolve:1 Main St",
            "tax:1 Main St",
            "resolve:2 Nowhere Rd",
            "tax:",
            "resolve:3 Lost Ln",
            "tax:",
        ]
    );
}

#[tokio::test]
async fn test_csv_file_round_trip() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let input_path = temp_dir.path().join("customers.csv");
    let output_path = temp_dir.path().join("out/enriched.csv");
    tokio::fs::write(
        &input_path,
        "customer,amount,line1,city,region,country,postalCode\n\
Acme,100,1 Main St,Springfield,IL,US,62701\n\
Globex,50,2 Nowhere Rd,Boston,MA,US,02134\n",
    )
    .await?;

    let service = ScriptedTaxService::default()
        .address(
            "1 Main St",
            Ok(AddressResolution {
                validated_addresses: vec![springfield()],
                messages: vec![],
            }),
        )
        .tax("1 Main St", Ok(8.25))
        .address("2 Nowhere Rd", Err("timeout"));

    let pipeline = TaxEnrichmentPipeline::new(
        LocalStorage::new(temp_dir.path()),
        service,
        TaxEtlConfig::default(),
        input_path.to_str().unwrap(),
        output_path.to_str().unwrap(),
    );

    EtlEngine::new(pipeline).run().await?;

    let output = tokio::fs::read_to_string(&output_path).await?;
    assert_eq!(
        output,
        "customer,amount,line1,city,region,country,postalCode,\
new_line1,new_city,new_region,new_country,new_postalCode,messages,tax\n\
Acme,100,1 Main St,Springfield,IL,US,62701,1 Main St,Springfield,IL,US,62701,,8.25\n\
Globex,50,2 Nowhere Rd,Boston,MA,US,02134,,,,,,timeout,NaN\n"
    );
    Ok(())
}

#[tokio::test]
async fn test_missing_input_file_is_reported() {
    let temp_dir = TempDir::new().unwrap();
    let pipeline = TaxEnrichmentPipeline::new(
        LocalStorage::new(temp_dir.path()),
        ScriptedTaxService::default(),
        TaxEtlConfig::default(),
        "does-not-exist.csv",
        "out.csv",
    );

    let err = EtlEngine::new(pipeline).run().await.unwrap_err();

    assert!(matches!(err, tax_etl::EtlError::IoError(_)));
    assert!(!temp_dir.path().join("out.csv").exists());
}
