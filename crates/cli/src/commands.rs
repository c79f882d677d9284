//! CLI commands

use anyhow::{Context, Result, bail};
use cashrev_http::client::{
    ApiClient, ClientConfig, FileCredentialStore, Method, RequestOptions, ResponseBody,
    SessionExpired,
};
use cashrev_http::types::LoginRequest;
use clap::{Args, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config;

/// File holding the stored access token inside the data directory
const CREDENTIALS_FILE: &str = "credentials.json";

#[derive(Subcommand)]
pub enum Commands {
    /// List endpoint names and the URLs they resolve to
    Endpoints,

    /// Send a request to a named endpoint on the primary backend
    Request {
        /// Endpoint name, e.g. `topSignals`
        endpoint: String,

        #[command(flatten)]
        args: RequestArgs,
    },

    /// Send a request to a path on the secondary backend
    Secondary {
        /// Path appended to the secondary base URL, e.g. `/api/signals/latest`
        path: String,

        #[command(flatten)]
        args: RequestArgs,
    },

    /// Log in and store the access token
    Login {
        #[arg(long)]
        email: String,

        #[arg(long, env = "CASHREV_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Forget the stored access token
    Logout,

    /// Show the logged-in user
    Me,

    /// List trading signals
    Signals {
        /// Show the top signals instead of your own
        #[arg(long)]
        top: bool,
    },

    /// Show the MetaTrader 5 bridge status
    Mt5Status,

    /// Configuration file helpers
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective configuration
    Show,

    /// Write the default configuration file
    Init {
        /// Output file path (defaults to <data-dir>/config.toml)
        output: Option<PathBuf>,
    },
}

/// Per-call request options
#[derive(Args)]
pub struct RequestArgs {
    /// HTTP method
    #[arg(short = 'X', long, default_value = "GET")]
    method: String,

    /// Extra header as `Name: value`, may be repeated
    #[arg(short = 'H', long = "header", value_parser = parse_header)]
    headers: Vec<(String, String)>,

    /// Request body; sent as JSON when it parses as JSON, otherwise as text
    #[arg(short, long)]
    body: Option<String>,
}

/// Global settings shared by every command
pub struct Settings {
    pub config_path: Option<PathBuf>,
    pub data_dir: PathBuf,
    pub timeout_ms: Option<u64>,
}

impl Settings {
    fn load_config(&self) -> Result<ClientConfig> {
        config::load_client_config(self.config_path.as_deref(), self.timeout_ms)
    }

    fn client(&self) -> Result<ApiClient> {
        let credentials = FileCredentialStore::new(self.data_dir.join(CREDENTIALS_FILE));
        let client = ApiClient::builder()
            .config(self.load_config()?)
            .credentials(Arc::new(credentials))
            .on_session_expired(|event: &SessionExpired| {
                warn!(endpoint = %event.endpoint, backend = %event.backend, "Session expired");
                eprintln!("Session expired, please log in again with `cashrev login`");
            })
            .build()?;
        Ok(client)
    }
}

impl Commands {
    pub async fn execute(self, settings: Settings) -> Result<()> {
        match self {
            Commands::Endpoints => {
                let config = settings.load_config()?;
                for (name, _) in config.endpoints.iter() {
                    println!("{name:<14} {}", config.resolve_url(name)?);
                }
                Ok(())
            }
            Commands::Request { endpoint, args } => {
                let client = settings.client()?;
                let body = client.request(&endpoint, args.into_options()?).await?;
                print_body(&body)
            }
            Commands::Secondary { path, args } => {
                let client = settings.client()?;
                let body = client.request_secondary(&path, args.into_options()?).await?;
                print_body(&body)
            }
            Commands::Login { email, password } => {
                let client = settings.client()?;
                client
                    .login_and_store(&LoginRequest { email, password })
                    .await?;
                println!("Logged in");
                Ok(())
            }
            Commands::Logout => {
                settings.client()?.logout()?;
                info!("Stored credentials removed");
                println!("Logged out");
                Ok(())
            }
            Commands::Me => print_json(&settings.client()?.me().await?),
            Commands::Signals { top } => {
                let client = settings.client()?;
                let signals = if top {
                    client.top_signals().await?
                } else {
                    client.user_signals().await?
                };
                print_json(&signals)
            }
            Commands::Mt5Status => print_json(&settings.client()?.mt5_status().await?),
            Commands::Config { command } => command.execute(&settings),
        }
    }
}

impl ConfigCommands {
    pub fn execute(self, settings: &Settings) -> Result<()> {
        match self {
            ConfigCommands::Show => {
                print!("{}", config::render_config(&settings.load_config()?)?);
                Ok(())
            }
            ConfigCommands::Init { output } => {
                let config_path = output.unwrap_or_else(|| settings.data_dir.join("config.toml"));
                if config_path.exists() {
                    bail!("{} already exists", config_path.display());
                }
                config::generate_default_config(&config_path)?;
                println!("Generated configuration at: {}", config_path.display());
                Ok(())
            }
        }
    }
}

impl RequestArgs {
    fn into_options(self) -> Result<RequestOptions> {
        let method = Method::from_bytes(self.method.to_ascii_uppercase().as_bytes())
            .with_context(|| format!("invalid HTTP method '{}'", self.method))?;

        let mut options = RequestOptions::method(method);
        for (name, value) in self.headers {
            options = options.header(name, value);
        }

        Ok(match self.body {
            Some(body) => match serde_json::from_str(&body) {
                Ok(json) => options.json(json),
                Err(_) => options.text(body),
            },
            None => options,
        })
    }
}

fn parse_header(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected `Name: value`, got '{raw}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing header name in '{raw}'"));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

fn print_body(body: &ResponseBody) -> Result<()> {
    match body {
        ResponseBody::Json(value) => print_json(value),
        ResponseBody::Text(text) => {
            println!("{text}");
            Ok(())
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
