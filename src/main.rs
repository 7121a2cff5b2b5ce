use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use log::debug;
use scriptmarket::api::scripts::ScriptFilters;
use scriptmarket::{ApiClient, ClientConfig, StaticSession};
use serde::Serialize;

/// scriptmarket - theater script marketplace client
///
/// Talks to the scriptmarket backend API. If SCRIPTMARKET_TOKEN is set it is
/// sent as the bearer token for the signed-in account.
///
/// Examples:
///   scriptmarket scripts list --search tempest
///   scriptmarket licenses download <LICENSE_ID>
#[derive(Parser, Debug)]
#[command(author, version = env!("SCRIPTMARKET_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Backend API base URL
    #[arg(
        long = "api-url",
        env = "SCRIPTMARKET_API_URL",
        value_name = "URL",
        default_value = scriptmarket::config::DEFAULT_API_URL,
        global = true
    )]
    api_url: String,

    /// Access token for the signed-in account
    #[arg(long, env = "SCRIPTMARKET_TOKEN", hide_env_values = true, global = true)]
    token: Option<String>,

    /// Per-request timeout in milliseconds
    #[arg(
        long = "timeout-ms",
        env = "SCRIPTMARKET_TIMEOUT_MS",
        default_value_t = scriptmarket::config::DEFAULT_TIMEOUT_MS,
        global = true
    )]
    timeout_ms: u64,

    /// Attempts per request for transient failures
    #[arg(
        long = "max-attempts",
        env = "SCRIPTMARKET_MAX_ATTEMPTS",
        default_value_t = scriptmarket::http::retry::MAX_ATTEMPTS,
        global = true
    )]
    max_attempts: usize,

    /// Base delay between attempts in milliseconds
    #[arg(
        long = "retry-delay-ms",
        env = "SCRIPTMARKET_RETRY_DELAY_MS",
        default_value_t = scriptmarket::http::retry::RETRY_DELAY_MS,
        global = true
    )]
    retry_delay_ms: u64,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Browse and manage scripts
    #[command(subcommand)]
    Scripts(ScriptsCommand),

    /// Performance licenses of the signed-in theater
    #[command(subcommand)]
    Licenses(LicensesCommand),

    /// Show the signed-in profile
    Profile,

    /// Payment history
    #[command(subcommand)]
    Payments(PaymentsCommand),

    /// Administration
    #[command(subcommand)]
    Admin(AdminCommand),
}

#[derive(clap::Subcommand, Debug)]
enum ScriptsCommand {
    /// Search the catalog
    List {
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        genre: Option<String>,
    },
    /// Show one script
    Show { id: String },
    /// Scripts owned by the signed-in playwright
    Mine,
    /// Upload the script file for a script
    Upload {
        id: String,
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

#[derive(clap::Subcommand, Debug)]
enum LicensesCommand {
    /// List licenses
    List,
    /// Print a download URL for a licensed script
    Download { id: String },
}

#[derive(clap::Subcommand, Debug)]
enum PaymentsCommand {
    /// List past payments
    History,
}

#[derive(clap::Subcommand, Debug)]
enum AdminCommand {
    /// Dashboard statistics
    Stats {
        #[arg(long, default_value = "7d")]
        range: String,
    },
}

impl Cli {
    fn client_config(&self) -> ClientConfig {
        ClientConfig::new(self.api_url.clone())
            .with_timeout(Duration::from_millis(self.timeout_ms))
            .with_max_attempts(self.max_attempts)
            .with_retry_base_delay(Duration::from_millis(self.retry_delay_ms))
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    let session = Arc::new(StaticSession::new(cli.token.clone()));
    let client = ApiClient::new(cli.client_config(), session)?;
    debug!("Using API at {}", client.config().base_url);

    match cli.command {
        Commands::Scripts(ScriptsCommand::List { search, genre }) => {
            let filters = ScriptFilters {
                search,
                genre,
                ..Default::default()
            };
            print_json(&client.scripts().list(&filters).await?)
        }
        Commands::Scripts(ScriptsCommand::Show { id }) => {
            print_json(&client.scripts().get(&id).await?)
        }
        Commands::Scripts(ScriptsCommand::Mine) => print_json(&client.scripts().mine().await?),
        Commands::Scripts(ScriptsCommand::Upload { id, file }) => {
            let bytes = tokio::fs::read(&file)
                .await
                .with_context(|| format!("Failed to read {:?}", file))?;
            let file_name = file
                .file_name()
                .and_then(|n| n.to_str())
                .context("File path has no file name")?;
            print_json(&client.scripts().upload_file(&id, file_name, bytes).await?)
        }
        Commands::Licenses(LicensesCommand::List) => {
            print_json(&client.licenses().list().await?)
        }
        Commands::Licenses(LicensesCommand::Download { id }) => {
            let link = client.licenses().download_url(&id).await?;
            println!("{}", link.url);
            Ok(())
        }
        Commands::Profile => print_json(&client.profile().get().await?),
        Commands::Payments(PaymentsCommand::History) => {
            print_json(&client.payments().history().await?)
        }
        Commands::Admin(AdminCommand::Stats { range }) => {
            print_json(&client.admin().stats(&range).await?)
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    run(cli).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_scripts_list_parsing() {
        let cli = Cli::try_parse_from([
            "scriptmarket",
            "scripts",
            "list",
            "--search",
            "tempest",
        ])
        .unwrap();
        match cli.command {
            Commands::Scripts(ScriptsCommand::List { search, genre }) => {
                assert_eq!(search.as_deref(), Some("tempest"));
                assert_eq!(genre, None);
            }
            _ => panic!("Expected scripts list command"),
        }
    }

    #[test]
    fn test_cli_global_options_build_config() {
        let cli = Cli::try_parse_from([
            "scriptmarket",
            "--api-url",
            "http://127.0.0.1:9000/api",
            "--timeout-ms",
            "500",
            "--max-attempts",
            "5",
            "--retry-delay-ms",
            "20",
            "profile",
        ])
        .unwrap();

        let config = cli.client_config();
        assert_eq!(config.base_url, "http://127.0.0.1:9000/api");
        assert_eq!(config.timeout, Duration::from_millis(500));
        assert_eq!(config.max_attempts, 5);
        assert_eq!(config.retry_base_delay, Duration::from_millis(20));
    }

    #[test]
    fn test_cli_admin_stats_default_range() {
        let cli = Cli::try_parse_from(["scriptmarket", "admin", "stats"]).unwrap();
        match cli.command {
            Commands::Admin(AdminCommand::Stats { range }) => assert_eq!(range, "7d"),
            _ => panic!("Expected admin stats command"),
        }
    }

    #[test]
    fn test_cli_no_subcommand_fails() {
        assert!(Cli::try_parse_from(["scriptmarket"]).is_err());
    }
}
