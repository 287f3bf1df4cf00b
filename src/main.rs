use log::{error, info};

use directoryserver::config::AppConfig;
use directoryserver::main_module::{
    create_app_state, init_environment_and_logging, run_axum_server, ServeMode,
};

const USAGE: &str = "Usage: directoryserver [--filter-only]

  --filter-only   serve only POST /filter (stand-alone filter deployment)

Configuration is read from the environment and an optional .env file.";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if let Some(unknown) = args
        .iter()
        .skip(1)
        .find(|a| !matches!(a.as_str(), "--filter-only" | "--help" | "-h"))
    {
        eprintln!("Unknown argument: {unknown}");
        eprintln!("{USAGE}");
        anyhow::bail!("unknown argument {unknown}");
    }
    if args.iter().any(|a| a == "--help" || a == "-h") {
        println!("{USAGE}");
        return Ok(());
    }

    init_environment_and_logging();
    let mode = ServeMode::from_args(&args);
    info!(
        "Starting directoryserver {} ({:?})",
        env!("CARGO_PKG_VERSION"),
        mode
    );

    let app_state = create_app_state(AppConfig::from_env());
    if let Err(e) = run_axum_server(app_state, mode).await {
        error!("Server stopped: {e}");
        return Err(e.into());
    }

    info!("directoryserver stopped");
    Ok(())
}
