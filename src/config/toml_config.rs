use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{
    validate_currency_code, validate_non_empty_string, validate_range, validate_url, Validate,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const SANDBOX_BASE_URL: &str = "https://sandbox-rest.avatax.com";
pub const PRODUCTION_BASE_URL: &str = "https://rest.avatax.com";

/// Job configuration. Every section is optional; a missing file means
/// defaults throughout.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TaxEtlConfig {
    pub service: ServiceConfig,
    pub document: DocumentConfig,
    pub input: InputConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// `sandbox` or `production`; ignored when `base_url` is set.
    pub environment: String,
    pub base_url: Option<String>,
    pub app_name: String,
    pub app_version: String,
    pub machine_name: Option<String>,
    pub timeout_seconds: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            environment: "sandbox".to_string(),
            base_url: None,
            app_name: "tax-etl".to_string(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            machine_name: None,
            timeout_seconds: 30,
        }
    }
}

impl ServiceConfig {
    pub fn base_url(&self) -> Result<String> {
        if let Some(url) = &self.base_url {
            return Ok(url.clone());
        }
        match self.environment.as_str() {
            "sandbox" => Ok(SANDBOX_BASE_URL.to_string()),
            "production" => Ok(PRODUCTION_BASE_URL.to_string()),
            other => Err(EtlError::InvalidConfigValueError {
                field: "service.environment".to_string(),
                value: other.to_string(),
                reason: "Expected 'sandbox' or 'production'".to_string(),
            }),
        }
    }

    /// Value of the `X-Avalara-Client` header.
    pub fn client_identifier(&self) -> String {
        format!(
            "{}; {}; RustRestClient; {}; {}",
            self.app_name,
            self.app_version,
            env!("CARGO_PKG_VERSION"),
            self.machine_name.as_deref().unwrap_or("")
        )
    }
}

/// Fixed fields of the simulated sales order sent for every record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentConfig {
    pub document_type: String,
    pub company_code: String,
    pub customer_code: String,
    pub purchase_order_no: String,
    pub item_code: String,
    pub line_description: String,
    pub currency_code: String,
    pub description: String,
    /// Transaction date; today when unset.
    pub date: Option<NaiveDate>,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            document_type: "SalesOrder".to_string(),
            company_code: "DEFAULT".to_string(),
            customer_code: "ABC".to_string(),
            purchase_order_no: "001".to_string(),
            item_code: "A0Y3GLL".to_string(),
            line_description: "Subscription".to_string(),
            currency_code: "USD".to_string(),
            description: "Tax ETL".to_string(),
            date: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub required_columns: Vec<String>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            required_columns: vec!["amount".to_string(), "line1".to_string()],
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Explicit output header. Defaults to every column in first-seen order.
    pub columns: Option<Vec<String>>,
}

impl TaxEtlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EtlError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the variable's value; unknown variables are left as is.
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| EtlError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }
}

impl Validate for TaxEtlConfig {
    fn validate(&self) -> Result<()> {
        validate_url("service.base_url", &self.service.base_url()?)?;
        validate_non_empty_string("service.app_name", &self.service.app_name)?;
        validate_range("service.timeout_seconds", self.service.timeout_seconds, 1, 600)?;

        validate_non_empty_string("document.document_type", &self.document.document_type)?;
        validate_non_empty_string("document.company_code", &self.document.company_code)?;
        validate_non_empty_string("document.item_code", &self.document.item_code)?;
        validate_currency_code("document.currency_code", &self.document.currency_code)?;

        if let Some(columns) = &self.output.columns {
            if columns.is_empty() {
                return Err(EtlError::InvalidConfigValueError {
                    field: "output.columns".to_string(),
                    value: "[]".to_string(),
                    reason: "Column list cannot be empty".to_string(),
                });
            }
        }

        tracing::debug!("Configuration validation passed");
        Ok(())
    }
}
