use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lms_admin::app;
use lms_admin::cli::Args;
use lms_admin::config::ClientConfig;
use lms_admin::error::AppError;
use lms_admin::state::AppState;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "lms_admin=info".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<(), AppError> {
    let mut config = ClientConfig::new_from_env()?;
    if let Some(api_url) = &args.api_url {
        config = config.with_api_url(api_url.as_str())?;
    }
    info!("using backend {}", config.api_url);

    let state = AppState::connect(config, &args.path)?;
    let action = args.action()?;

    let shutdown = state.shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            shutdown.cancel();
        }
    });

    let output = app::open(&state, &action).await?;
    print!("{}", output);

    let location = state.navigator.location();
    if location.to_string() != args.path {
        println!("-> {}", location);
    }
    Ok(())
}
