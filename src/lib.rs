pub mod application;
pub mod cli;
pub mod config;
pub mod constants;
pub mod domain;
pub mod infrastructure;

pub use application::{conversation, tooling};
pub use cli::Cli;
pub use config::AppConfig;
pub use domain::types;
pub use infrastructure::model;

use conversation::{Conversation, ConversationOptions};
use model::AzureOpenAIClient;
use std::error::Error;
use std::path::Path;
use tokio::io::BufReader;
use tooling::StdioSession;
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

pub async fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    init_tracing();
    info!("Starting azure-mcp");
    debug!(config = ?cli.config, system = ?cli.system, "CLI arguments parsed");

    let config_path = cli.config.as_deref().map(Path::new);
    let config = AppConfig::load_with(config_path, &cli.overrides())?;
    info!(
        endpoint = %config.azure.endpoint,
        deployment = %config.azure.model,
        server = %config.server.name,
        "Configuration loaded"
    );

    let client = AzureOpenAIClient::from_config(&config.azure)?;
    let session = StdioSession::connect(config.server.clone()).await?;
    if let Some(instructions) = session.instructions().await {
        debug!(server = session.server_name(), %instructions, "Server instructions");
    }

    let mut options = ConversationOptions::default().with_max_tool_rounds(config.max_tool_rounds);
    if let Some(prompt) = config.system_prompt.clone() {
        options = options.with_system_prompt(prompt);
    }

    let bootstrapped = Conversation::bootstrap(client, session.clone(), options).await;
    let result: Result<(), Box<dyn Error>> = match bootstrapped {
        Ok(mut conversation) => {
            let mut stdout = tokio::io::stdout();
            conversation
                .run(BufReader::new(tokio::io::stdin()), &mut stdout, ctrl_c())
                .await
                .map_err(Into::into)
        }
        Err(err) => Err(err.into()),
    };

    session.shutdown().await;
    info!("Client execution finished");
    result
}

async fn ctrl_c() {
    shutdown_signal(tokio::signal::ctrl_c()).await
}

/// Resolves when `signal` fires. If listening fails it never resolves,
/// leaving end of input and `/exit` as the only ways out.
async fn shutdown_signal<F>(signal: F)
where
    F: Future<Output = std::io::Result<()>>,
{
    if let Err(err) = signal.await {
        warn!(%err, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}

fn init_tracing() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_level(true)
            .init();
    });
}
