use clap::Parser;
use tax_etl::utils::{logger, validation::Validate};
use tax_etl::{
    AvaTaxClient, CliConfig, Credentials, EtlEngine, EtlError, LocalStorage, TaxEnrichmentPipeline,
};

fn fail(e: EtlError) -> ! {
    tracing::error!("❌ {}", e);
    tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e);
    eprintln!("💡 {}", e.recovery_suggestion());
    std::process::exit(e.exit_code());
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Missing input/output arguments abort here, before any work is done.
    let cli = CliConfig::parse();

    if cli.json_logs {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting tax-etl");
    tracing::debug!("CLI config: {:?}", cli);

    if let Err(e) = cli.validate() {
        fail(e);
    }

    let config = cli.load_job_config().unwrap_or_else(|e| fail(e));
    let credentials = Credentials::from_env().unwrap_or_else(|e| fail(e));
    let client = AvaTaxClient::new(&config.service, credentials).unwrap_or_else(|e| fail(e));

    let pipeline = TaxEnrichmentPipeline::new(
        LocalStorage::default(),
        client,
        config,
        cli.input.clone(),
        cli.output.clone(),
    );

    match EtlEngine::new(pipeline).run().await {
        Ok(output_path) => {
            tracing::info!("✅ Done! Output saved to: {}", output_path);
            println!("✅ Output saved to: {}", output_path);
            Ok(())
        }
        Err(e) => fail(e),
    }
}
