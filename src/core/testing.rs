use crate::domain::model::{Address, AddressResolution, FieldValue, Record, TaxCalculation, TaxDocument};
use crate::domain::ports::TaxService;
use crate::utils::error::ServiceError;
use async_trait::async_trait;
use std::io;
use std::sync::{Arc, Mutex};

pub(crate) fn sample_record() -> Record {
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

/// Shared sink for formatted log lines.
#[derive(Clone, Default)]
pub(crate) struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Runs `f` with a plain-text subscriber installed on the current thread and
/// returns its result along with everything it logged.
pub(crate) fn capture_logs<R>(f: impl FnOnce() -> R) -> (R, String) {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .finish();

    let result = tracing::subscriber::with_default(subscriber, f);
    let logs = String::from_utf8_lossy(&buffer.0.lock().unwrap()).into_owned();
    (result, logs)
}

/// In-memory service with canned answers.
pub(crate) struct FakeTaxService {
    resolution: std::result::Result<AddressResolution, String>,
    tax: std::result::Result<TaxCalculation, String>,
    address_calls: Mutex<Vec<Address>>,
    tax_documents: Mutex<Vec<TaxDocument>>,
}

impl FakeTaxService {
    pub(crate) fn new() -> Self {
        Self {
            resolution: Ok(AddressResolution::default()),
            tax: Ok(TaxCalculation {
                total_tax_calculated: Some(0.0),
            }),
            address_calls: Mutex::new(Vec::new()),
            tax_documents: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn with_resolution(mut self, resolution: AddressResolution) -> Self {
        self.resolution = Ok(resolution);
        self
    }

    pub(crate) fn failing_address(mut self, message: &str) -> Self {
        self.resolution = Err(message.to_string());
        self
    }

    pub(crate) fn with_tax(mut self, total: f64) -> Self {
        self.tax = Ok(TaxCalculation {
            total_tax_calculated: Some(total),
        });
        self
    }

    pub(crate) fn without_total(mut self) -> Self {
        self.tax = Ok(TaxCalculation::default());
        self
    }

    pub(crate) fn failing_tax(mut self, message: &str) -> Self {
        self.tax = Err(message.to_string());
        self
    }

    pub(crate) fn address_calls(&self) -> usize {
        self.address_calls.lock().unwrap().len()
    }

    pub(crate) fn tax_documents(&self) -> Vec<TaxDocument> {
        self.tax_documents.lock().unwrap().clone()
    }
}

#[async_trait]
impl TaxService for FakeTaxService {
    async fn resolve_address(
        &self,
        address: &Address,
    ) -> std::result::Result<AddressResolution, ServiceError> {
        self.address_calls.lock().unwrap().push(address.clone());
        self.resolution.clone().map_err(ServiceError::Unavailable)
    }

    async fn compute_tax(
        &self,
        document: &TaxDocument,
    ) -> std::result::Result<TaxCalculation, ServiceError> {
        self.tax_documents.lock().unwrap().push(document.clone());
        self.tax.clone().map_err(ServiceError::Unavailable)
    }
}
