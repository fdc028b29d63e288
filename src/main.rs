//! cql-tui: terminal explorer for Cassandra/ScyllaDB keyspace schemas

use anyhow::{bail, Context, Result};
use clap::{ArgAction, CommandFactory, Parser};
use clap_complete::{generate, Shell};
use cql_tui::{
    config::{
        generate_example_config, load_or_default, AppConfig, ConnectionConfig, Keymap, Validatable,
    },
    metadata::{MetadataSource, ScyllaSource},
    tui::{run_tui, set_theme, Controller, EventHandler, Scheduler, Theme},
    CqlTuiError,
};
use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::{Arc, Mutex};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "cql-tui")]
#[command(version)]
#[command(about = "Browse the schema of a Cassandra/ScyllaDB keyspace", long_about = None)]
#[command(after_help = "EXIT CODES:
    0  Normal quit
    1  Error occurred

EXAMPLES:
    # Local node, first non-system keyspace
    cql-tui

    # Several contact points, explicit keyspace, authenticated
    cql-tui -a 10.0.0.1:9042,10.0.0.2:9042 -k shop -u reader -p secret

    # Show raw JSON values
    cql-tui --pp-json false")]
struct Cli {
    /// Comma-separated node addresses (host:port)
    #[arg(short, long, env = "CQL_TUI_ADDRESS")]
    address: Option<String>,

    /// Keyspace to explore (defaults to the first non-system keyspace)
    #[arg(short, long)]
    keyspace: Option<String>,

    /// Username for password authentication
    #[arg(short, long)]
    username: Option<String>,

    /// Password for password authentication
    #[arg(short, long, env = "CQL_TUI_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Pretty-print JSON values in the details pane
    #[arg(long = "pp-json", value_name = "BOOL", action = ArgAction::Set)]
    pp_json: Option<bool>,

    /// Path to configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Color theme: dark, light, high-contrast
    #[arg(long)]
    theme: Option<String>,

    /// Rows fetched when opening a table or view
    #[arg(long)]
    row_limit: Option<u32>,

    /// Log file (the terminal belongs to the UI)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Print shell completions and exit
    #[arg(long, value_enum, value_name = "SHELL")]
    completions: Option<Shell>,

    /// Print an example configuration file and exit
    #[arg(long)]
    print_config: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Some(shell) = cli.completions {
        generate(shell, &mut Cli::command(), "cql-tui", &mut io::stdout());
        return ExitCode::SUCCESS;
    }
    if cli.print_config {
        print!("{}", generate_example_config());
        return ExitCode::SUCCESS;
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %format!("{e:#}"), "exiting with error");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let (mut config, config_path) =
        load_or_default(cli.config.as_deref()).context("Failed to load configuration")?;
    apply_overrides(&mut config, cli);

    let errors = config.validate();
    if !errors.is_empty() {
        let list = errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        bail!(CqlTuiError::Config(list));
    }

    let log_path = cli.log_file.clone().unwrap_or_else(default_log_path);
    init_logging(&log_path, cli.verbose)?;
    if let Some(path) = &config_path {
        info!(path = %path.display(), "loaded configuration");
    }
    if has_partial_credentials(&config.connection) {
        warn!("only one of username and password given, connecting without authentication");
    }

    let keymap = Keymap::from_bindings(&config.keys).context("Invalid key bindings")?;
    set_theme(Theme::from_name(&config.tui.theme));

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    // Both steps are fatal here; once the UI runs, failures stay in-band
    let (source, snapshot) = runtime
        .block_on(async {
            let source = ScyllaSource::connect(&config.connection, config.tui.row_limit).await?;
            let snapshot = source.fetch_keyspace_metadata().await?;
            Ok::<_, CqlTuiError>((source, snapshot))
        })
        .context("Startup failed")?;
    let source: Arc<dyn MetadataSource> = Arc::new(source);

    let events = EventHandler::new(config.tui.tick_rate_ms);
    let scheduler = Scheduler::new(
        runtime.handle().clone(),
        Arc::clone(&source),
        events.sender(),
    );
    let mut controller = Controller::new(
        source.keyspace().to_string(),
        config.connection.addresses.clone(),
        keymap,
        config.tui.pretty_json,
    );
    scheduler.submit_all(controller.init(Some(snapshot)));

    run_tui(&mut controller, &scheduler, &events).context("Terminal UI failed")?;
    info!("quit");
    Ok(())
}

/// CLI flags win over the config file.
fn apply_overrides(config: &mut AppConfig, cli: &Cli) {
    if let Some(list) = &cli.address {
        config.connection.addresses = ConnectionConfig::parse_addresses(list);
    }
    if let Some(keyspace) = &cli.keyspace {
        config.connection.keyspace = Some(keyspace.clone());
    }
    if let Some(username) = &cli.username {
        config.connection.username = Some(username.clone());
    }
    if let Some(password) = &cli.password {
        config.connection.password = Some(password.clone());
    }
    if let Some(pretty) = cli.pp_json {
        config.tui.pretty_json = pretty;
    }
    if let Some(theme) = &cli.theme {
        config.tui.theme.clone_from(theme);
    }
    if let Some(limit) = cli.row_limit {
        config.tui.row_limit = limit;
    }
}

fn has_partial_credentials(conn: &ConnectionConfig) -> bool {
    conn.credentials().is_none() && (conn.username.is_some() || conn.password.is_some())
}

fn default_log_path() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("cql-tui")
        .join("cql-tui.log")
}

fn init_logging(path: &Path, verbose: bool) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|e| CqlTuiError::io(Some(dir.to_path_buf()), e))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| CqlTuiError::io(Some(path.to_path_buf()), e))
        .context("Failed to open log file")?;

    let log_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.to_string()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .init();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("cql-tui").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_overrides_apply_on_top_of_config() {
        let cli = parse(&[
            "--address",
            " 10.0.0.1:9042 , ,10.0.0.2:9042",
            "-k",
            "shop",
            "--pp-json",
            "false",
            "--row-limit",
            "25",
        ]);
        let mut config = AppConfig::default();
        apply_overrides(&mut config, &cli);

        assert_eq!(
            config.connection.addresses,
            vec!["10.0.0.1:9042".to_string(), "10.0.0.2:9042".to_string()]
        );
        assert_eq!(config.connection.keyspace.as_deref(), Some("shop"));
        assert!(!config.tui.pretty_json);
        assert_eq!(config.tui.row_limit, 25);
    }

    #[test]
    fn test_defaults_left_alone() {
        let mut config = AppConfig::default();
        apply_overrides(&mut config, &parse(&[]));
        assert_eq!(config, AppConfig::default());
        assert!(config.tui.pretty_json);
    }

    #[test]
    fn test_password_alone_starts_unauthenticated() {
        let cli = parse(&["-p", "secret"]);
        let mut config = AppConfig::default();
        apply_overrides(&mut config, &cli);

        assert!(config.validate().is_empty());
        assert_eq!(config.connection.credentials(), None);
        assert!(has_partial_credentials(&config.connection));
    }

    #[test]
    fn test_username_alone_accepted() {
        let mut config = AppConfig::default();
        apply_overrides(&mut config, &parse(&["-u", "reader"]));
        assert!(config.validate().is_empty());
        if std::env::var_os("CQL_TUI_PASSWORD").is_none() {
            assert_eq!(config.connection.credentials(), None);
        }
    }
}
