use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use gallery_client::{
    commands::{self, Cli},
    gateway::ApiGateway,
    session::SessionStore,
    types::Environment,
};
use session_storage::FileStore;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let environment = Environment::from_env();

    // Logs go to stderr so that command output on stdout stays valid JSON
    let filter = EnvFilter::builder()
        .with_default_directive(environment.tracing_level().into())
        .from_env_lossy();
    if environment.json_logs() {
        fmt()
            .json()
            .with_writer(std::io::stderr)
            .with_env_filter(filter)
            .init();
    } else {
        fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(filter)
            .init();
    }

    match run(&environment).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(environment: &Environment) -> anyhow::Result<()> {
    let cli = Cli::parse();

    let storage = Arc::new(FileStore::open(environment.session_dir())?);
    let session = Arc::new(SessionStore::initialize(storage));
    let authenticated = session.is_authenticated();
    let gateway = Arc::new(ApiGateway::new(environment.api_base_url(), session));

    let output = commands::execute(cli.command, gateway, authenticated).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
