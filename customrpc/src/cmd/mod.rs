//! CLI definitions and command implementations for `customrpc`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::chain::{ChainId, NativeCurrency, RpcEndpoint};
use crate::config::EnvLookup;
use crate::error::Error;

pub mod init;
pub mod rpc;

/// Custom RPC registry: manage per-chain custom endpoints.
#[derive(Debug, Parser)]
#[command(name = "customrpc")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, global = true, env = "CONFIG", default_value = "customrpc.toml")]
    pub config: PathBuf,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Generate a default TOML configuration file.
    Init {
        /// Output path for the configuration file.
        #[arg(short, long, default_value = "customrpc.toml")]
        output: PathBuf,

        /// Overwrite the file if it already exists.
        #[arg(long, default_value_t = false)]
        force: bool,
    },

    /// Register a custom RPC (re-adding a known URL updates it).
    Add(EndpointArgs),

    /// Replace the metadata of a registered custom RPC.
    Update(EndpointArgs),

    /// Make a registered custom RPC the active one for its chain.
    Activate {
        /// Chain id.
        #[arg(long)]
        chain_id: ChainId,
        /// URL of the endpoint to activate.
        #[arg(long)]
        rpc_url: String,
    },

    /// Remove a custom RPC from whichever chain holds it.
    Remove {
        /// URL of the endpoint to remove.
        #[arg(long)]
        rpc_url: String,
    },

    /// List chains with their active custom RPC.
    List,

    /// Print the chain group of one chain as JSON.
    Show {
        /// Chain id.
        #[arg(long)]
        chain_id: ChainId,
    },
}

/// Endpoint record given on the command line.
#[derive(Debug, Clone, Args)]
pub struct EndpointArgs {
    /// Chain id served by the endpoint.
    #[arg(long)]
    pub chain_id: ChainId,

    /// RPC URL, also the endpoint's identity.
    #[arg(long)]
    pub rpc_url: String,

    /// Display name.
    #[arg(long, default_value = "")]
    pub name: String,

    /// Network name.
    #[arg(long, default_value = "")]
    pub network: String,

    /// Native currency name.
    #[arg(long, default_value = "Ether")]
    pub currency_name: String,

    /// Native currency symbol.
    #[arg(long, default_value = "ETH")]
    pub currency_symbol: String,

    /// Native currency decimals.
    #[arg(long, default_value_t = 18)]
    pub decimals: u8,

    /// Block explorer URL.
    #[arg(long)]
    pub explorer: Option<String>,
}

impl From<EndpointArgs> for RpcEndpoint {
    fn from(args: EndpointArgs) -> Self {
        let endpoint = Self::new(args.chain_id, args.rpc_url)
            .with_display_name(args.name)
            .with_network_name(args.network)
            .with_native_currency(NativeCurrency {
                name: args.currency_name,
                symbol: args.currency_symbol,
                decimals: args.decimals,
            });
        match args.explorer {
            Some(url) => endpoint.with_explorer_url(url),
            None => endpoint,
        }
    }
}

/// Execute the parsed command line.
///
/// `env` supplies the `STORE` / `LOG_LEVEL` overrides. Returns the text to
/// print on stdout.
///
/// # Errors
///
/// Returns the first configuration, store or registry error encountered.
pub async fn run(cli: Cli, env: EnvLookup<'_>) -> Result<String, Error> {
    let open = || rpc::settings(&cli.config, env).and_then(|config| rpc::open(&config));
    let message = match cli.command {
        Commands::Init { output, force } => init::run(&output, force, env)?,
        Commands::Add(args) => rpc::add(&open()?, args.into()).await?,
        Commands::Update(args) => rpc::update(&open()?, args.into()).await?,
        Commands::Activate { chain_id, rpc_url } => {
            rpc::activate(&open()?, chain_id, &rpc_url).await?
        }
        Commands::Remove { rpc_url } => rpc::remove(&open()?, &rpc_url).await?,
        Commands::List => rpc::list(&open()?).await,
        Commands::Show { chain_id } => rpc::show(&open()?, chain_id).await?,
    };
    Ok(message)
}
