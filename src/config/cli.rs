use crate::config::toml_config::TaxEtlConfig;
use crate::utils::error::Result;
use crate::utils::validation::{validate_date, validate_path, Validate};
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "tax-etl")]
#[command(about = "Resolve addresses and compute sales tax for every row of a CSV file")]
pub struct CliConfig {
    /// Input CSV file
    pub input: String,

    /// Output CSV file
    pub output: String,

    #[arg(long, help = "TOML configuration file")]
    pub config: Option<String>,

    #[arg(long, help = "Transaction date (YYYY-MM-DD), defaults to today")]
    pub date: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,
}

impl CliConfig {
    /// Loads the configuration file, if any, and applies command line overrides.
    pub fn load_job_config(&self) -> Result<TaxEtlConfig> {
        let mut config = match &self.config {
            Some(path) => TaxEtlConfig::from_file(path)?,
            None => TaxEtlConfig::default(),
        };

        if let Some(date) = &self.date {
            config.document.date = Some(validate_date("date", date)?);
        }

        config.validate()?;
        Ok(config)
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_path("input", &self.input)?;
        validate_path("output", &self.output)?;
        if let Some(path) = &self.config {
            validate_path("config", path)?;
        }
        if let Some(date) = &self.date {
            validate_date("date", date)?;
        }
        Ok(())
    }
}
