//! ridepay — spending-limit delegations for ride payments.

mod commands;
mod config;
mod simulator;

use clap::Parser;
use ridepay_store_file::FileStorage;
use ridepay_types::{Address, ChainId, ScopeKind};
use ridepay_utils::{init_tracing, LogFormat};
use ridepay_wallet_core::{AccountRole, RidePreset};
use std::path::PathBuf;

use crate::commands::{Context, ScopeArgs};
use crate::config::CliConfig;

#[derive(Parser)]
#[command(name = "ridepay", about = "Ride payments through spending-limit delegations")]
struct Cli {
    /// Chain to create accounts and delegations for: "mainnet", "sepolia" or "dev".
    #[arg(long, env = "RIDEPAY_CHAIN")]
    chain: Option<String>,

    /// JSON file holding accounts and delegations.
    #[arg(long, env = "RIDEPAY_STORAGE")]
    storage: Option<PathBuf>,

    /// ERC-20 token ride fares are paid in.
    #[arg(long, env = "RIDEPAY_TOKEN")]
    token: Option<Address>,

    /// Bundler JSON-RPC endpoint.
    #[arg(long, env = "RIDEPAY_BUNDLER_URL")]
    bundler_url: Option<String>,

    /// Paymaster sponsoring gas.
    #[arg(long, env = "RIDEPAY_PAYMASTER_URL")]
    paymaster_url: Option<String>,

    /// Artificial delay of simulated payments, in milliseconds.
    #[arg(long, env = "RIDEPAY_PROCESSING_DELAY_MS")]
    processing_delay_ms: Option<u64>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "RIDEPAY_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "RIDEPAY_LOG_FORMAT")]
    log_format: Option<String>,

    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long, env = "RIDEPAY_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Manage the delegator and delegate smart accounts.
    Account {
        #[command(subcommand)]
        action: AccountAction,
    },
    /// Create and inspect spending-limit delegations.
    Delegation {
        #[command(subcommand)]
        action: DelegationAction,
    },
    /// Simulate or execute ride payments.
    Ride {
        #[command(subcommand)]
        action: RideAction,
    },
    /// Print the effective configuration as TOML.
    Config,
    /// Print the call data redeeming a stored delegation.
    RedeemData {
        /// Position in `delegation list`.
        #[arg(long, default_value_t = 0)]
        index: usize,
    },
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum Role {
    Delegator,
    Delegate,
}

impl From<Role> for AccountRole {
    fn from(role: Role) -> Self {
        match role {
            Role::Delegator => AccountRole::Delegator,
            Role::Delegate => AccountRole::Delegate,
        }
    }
}

#[derive(clap::Subcommand)]
enum AccountAction {
    /// Create a hybrid smart account and save it.
    Create {
        #[arg(long, value_enum)]
        role: Role,
        /// Use this hex private key instead of generating one.
        #[arg(long, env = "RIDEPAY_PRIVATE_KEY", hide_env_values = true)]
        private_key: Option<String>,
        /// Print the signer's private key.
        #[arg(long)]
        print_key: bool,
    },
    /// Show the saved accounts.
    Show,
}

#[derive(clap::Subcommand)]
enum DelegationAction {
    /// Create, sign and store a delegation with any of the seven scopes.
    Create {
        /// Scope type, e.g. "erc20PeriodTransfer".
        #[arg(long)]
        scope: ScopeKind,
        #[arg(long)]
        token: Option<Address>,
        #[arg(long)]
        token_id: Option<u128>,
        #[arg(long)]
        max_amount: Option<String>,
        #[arg(long)]
        period_amount: Option<String>,
        /// Period length in seconds.
        #[arg(long)]
        period_duration: Option<u64>,
        #[arg(long)]
        amount_per_second: Option<String>,
        #[arg(long)]
        initial_amount: Option<String>,
    },
    /// Create a ride delegation from a preset: periodic, streaming, fixed or root.
    Preset {
        #[arg(value_parser = parse_preset)]
        preset: RidePreset,
        /// Token to pay in (defaults to the configured token).
        #[arg(long)]
        token: Option<Address>,
    },
    /// List stored delegations.
    List,
}

#[derive(clap::Subcommand)]
enum RideAction {
    /// Pay random rides from a stored ERC-20 delegation, tracking usage.
    Simulate {
        /// Position among the stored ERC-20 delegations.
        #[arg(long, default_value_t = 0)]
        index: usize,
        #[arg(long, default_value_t = 5)]
        rides: usize,
        /// Revoke the delegation before this ride (0-based).
        #[arg(long)]
        revoke_after: Option<usize>,
        /// Seed for reproducible rides.
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Redeem a stored delegation on-chain through the bundler.
    Pay {
        /// Position in `delegation list`.
        #[arg(long, default_value_t = 0)]
        index: usize,
        /// Fare recipient (defaults to the configured recipient).
        #[arg(long)]
        recipient: Option<Address>,
    },
}

fn parse_preset(raw: &str) -> Result<RidePreset, String> {
    RidePreset::from_name(raw)
        .ok_or_else(|| format!("unknown preset {raw:?}; expected periodic, streaming, fixed or root"))
}

/// File settings overridden by flags and environment variables.
fn resolve_config(cli: &Cli) -> anyhow::Result<CliConfig> {
    let base = match &cli.config {
        Some(path) => CliConfig::from_toml_file(path)?,
        None => CliConfig::default(),
    };
    Ok(CliConfig {
        chain: cli.chain.as_deref().map(ChainId::from_name).unwrap_or(base.chain),
        storage_path: cli.storage.clone().unwrap_or(base.storage_path),
        default_token: cli.token.unwrap_or(base.default_token),
        processing_delay_ms: cli.processing_delay_ms.unwrap_or(base.processing_delay_ms),
        bundler_url: cli.bundler_url.clone().or(base.bundler_url),
        paymaster_url: cli.paymaster_url.clone().or(base.paymaster_url),
        log_level: cli.log_level.clone().unwrap_or(base.log_level),
        log_format: cli.log_format.clone().unwrap_or(base.log_format),
        ..base
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = resolve_config(&cli)?;
    init_tracing(&config.log_level, LogFormat::from_name(&config.log_format));
    if let Some(path) = &cli.config {
        tracing::info!("Loaded config from {}", path.display());
    }

    let storage = FileStorage::open(&config.storage_path)?;
    tracing::debug!(path = %storage.path().display(), chain = config.chain.as_str(), "ready");
    let ctx = Context::new(config, storage);

    match cli.command {
        Command::Account { action } => match action {
            AccountAction::Create {
                role,
                private_key,
                print_key,
            } => ctx.account_create(role.into(), private_key.as_deref(), print_key),
            AccountAction::Show => ctx.account_show(),
        },
        Command::Delegation { action } => match action {
            DelegationAction::Create {
                scope,
                token,
                token_id,
                max_amount,
                period_amount,
                period_duration,
                amount_per_second,
                initial_amount,
            } => ctx.delegation_create(
                scope,
                ScopeArgs {
                    token,
                    token_id,
                    max_amount,
                    period_amount,
                    period_duration,
                    amount_per_second,
                    initial_amount,
                },
            ),
            DelegationAction::Preset { preset, token } => ctx.delegation_preset(preset, token),
            DelegationAction::List => ctx.delegation_list(),
        },
        Command::Ride { action } => match action {
            RideAction::Simulate {
                index,
                rides,
                revoke_after,
                seed,
            } => ctx.ride_simulate(index, rides, revoke_after, seed).await,
            RideAction::Pay { index, recipient } => ctx.ride_pay(index, recipient).await,
        },
        Command::Config => {
            print!("{}", ctx.config.to_toml_string()?);
            Ok(())
        }
        Command::RedeemData { index } => {
            println!("{}", ctx.redeem_data(index)?);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn flags_override_file_defaults() {
        let cli = Cli::parse_from([
            "ridepay",
            "--chain",
            "mainnet",
            "--processing-delay-ms",
            "0",
            "delegation",
            "preset",
            "streaming",
        ]);
        let config = resolve_config(&cli).unwrap();
        assert_eq!(config.chain, ChainId::Mainnet);
        assert_eq!(config.processing_delay_ms, 0);
        assert_eq!(config.log_level, "info");
        assert!(matches!(
            cli.command,
            Command::Delegation {
                action: DelegationAction::Preset {
                    preset: RidePreset::Streaming,
                    ..
                }
            }
        ));
    }

    #[test]
    fn scope_flag_parses_kind() {
        let cli = Cli::parse_from([
            "ridepay",
            "delegation",
            "create",
            "--scope",
            "erc20Streaming",
            "--token",
            "0xb4aE654Aca577781Ca1c5DE8FbE60c2F423f37da",
        ]);
        assert!(matches!(
            cli.command,
            Command::Delegation {
                action: DelegationAction::Create {
                    scope: ScopeKind::Erc20Streaming,
                    token: Some(_),
                    ..
                }
            }
        ));
    }

    #[test]
    fn unknown_preset_is_rejected() {
        assert!(Cli::try_parse_from(["ridepay", "delegation", "preset", "weekly"]).is_err());
    }
}
