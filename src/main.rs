use anyhow::Context;
use clap::Parser;
use numbersvc::adapters::http;
use numbersvc::utils::{logger, validation::Validate};
use numbersvc::{AppConfig, CliArgs, Classifier, NumberService, SqliteRowSource};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    let mut config = match &args.config {
        Some(path) => match AppConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("❌ Failed to load config file '{}': {}", path, e);
                eprintln!("💡 Make sure the file exists and is valid TOML format");
                std::process::exit(1);
            }
        },
        None => AppConfig::default(),
    };
    args.apply_overrides(&mut config);

    if let Err(e) = config.validate() {
        eprintln!("❌ Configuration validation failed: {}", e);
        std::process::exit(1);
    }

    if config.logging.json {
        logger::init_json_logger(args.verbose, &config.logging.level);
    } else {
        logger::init_cli_logger(args.verbose, &config.logging.level);
    }

    tracing::info!("Starting numbersvc");
    if args.verbose {
        tracing::debug!("Effective config: {:?}", config);
    }

    let classifier = Classifier::with_extra_rules(&config.country_rules())
        .context("failed to build the country rule registry")?;
    tracing::info!(
        countries = ?classifier.country_names().collect::<Vec<_>>(),
        "country rules loaded"
    );

    let rows = SqliteRowSource::open(&config.database.path)
        .with_context(|| format!("failed to open database '{}'", config.database.path))?;
    tracing::info!(path = %rows.path().display(), "database opened");

    if let Some(seed) = &args.seed {
        let content = std::fs::read_to_string(seed)
            .with_context(|| format!("failed to read seed file '{}'", seed))?;
        let numbers = content.lines().map(str::trim).filter(|line| !line.is_empty());
        let inserted = rows.insert_numbers(numbers).context("failed to seed database")?;
        tracing::info!(inserted, file = %seed, "database seeded");
    }

    let service = NumberService::new(rows, classifier)
        .with_default_limit(config.pagination.default_limit);
    let app = http::router(Arc::new(service));

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {}", address))?;
    tracing::info!("Listening on {}{}", address, http::NUMBERS_PATH);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("numbersvc stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
