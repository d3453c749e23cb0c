use clap::Parser;

use crate::config::ConfigOverrides;

#[derive(Parser, Debug)]
#[command(
    name = "azure-mcp",
    version,
    about = "Chat with an Azure OpenAI deployment that can call MCP server tools"
)]
pub struct Cli {
    /// Configuration file (defaults to config/client.toml when present)
    #[arg(long)]
    pub config: Option<String>,
    /// Azure OpenAI resource endpoint
    #[arg(long)]
    pub endpoint: Option<String>,
    /// Deployment name
    #[arg(long)]
    pub model: Option<String>,
    #[arg(long)]
    pub system: Option<String>,
    #[arg(long)]
    pub max_tool_rounds: Option<u32>,
    /// MCP server executable; replaces the `[server]` table
    #[arg(long)]
    pub server_command: Option<String>,
    #[arg(long = "server-arg", allow_hyphen_values = true)]
    pub server_args: Vec<String>,
}

impl Cli {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            endpoint: self.endpoint.clone(),
            model: self.model.clone(),
            system_prompt: self.system.clone(),
            max_tool_rounds: self.max_tool_rounds,
            server_command: self.server_command.clone(),
            server_args: self.server_args.clone(),
        }
    }
}
