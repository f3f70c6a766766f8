//! HTTP server binary for menu-extract.
//!
//! Maps flags and environment variables to a `ServiceConfig`, builds the
//! extractor once and serves `POST /procesar-menu`.

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use menu_extract::config::{api_key_from_env, parse_flag, DEFAULT_MODEL, DEFAULT_PROVIDER, DEFAULT_PROXY_URL};
use menu_extract::server::{router, AppState};
use menu_extract::{MenuExtractor, ServiceConfig};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Restaurant menu extraction service
#[derive(Parser, Debug)]
#[command(name = "menu-server", version, about)]
struct Args {
    /// Host address to bind to
    #[arg(long, default_value = "0.0.0.0", env = "MENU_HOST")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value_t = 7000, env = "MENU_PORT")]
    port: u16,

    /// LLM provider name (gemini, openai, anthropic, ...)
    #[arg(long, default_value = DEFAULT_PROVIDER, env = "MENU_LLM_PROVIDER")]
    provider: String,

    /// Model identifier
    #[arg(short, long, default_value = DEFAULT_MODEL, env = "MENU_MODEL")]
    model: String,

    /// API key for the provider [default: the provider's own variable,
    /// e.g. GEMINI_API_KEY]
    #[arg(long, env = "MENU_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Rendering resolution for PDF pages
    #[arg(long, default_value_t = 150)]
    dpi: u32,

    /// Download timeout in seconds when the request gives none
    #[arg(long, default_value_t = 30)]
    timeout: u64,

    /// Development mode: route outbound traffic through the local proxy
    #[arg(
        long,
        env = "DEVELOPMENT",
        action = ArgAction::Set,
        num_args = 0..=1,
        default_value = "false",
        default_missing_value = "true",
        value_parser = parse_development
    )]
    development: bool,

    /// Proxy used in development mode
    #[arg(long, default_value = DEFAULT_PROXY_URL)]
    proxy_url: String,

    /// Path to the directory holding the pdfium shared library
    #[arg(long, env = "PDFIUM_LIB_PATH")]
    pdfium_lib_path: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn parse_development(value: &str) -> Result<bool, String> {
    Ok(parse_flag(value))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let filter = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .init();

    if args.development {
        std::env::set_var("HTTP_PROXY", &args.proxy_url);
        std::env::set_var("HTTPS_PROXY", &args.proxy_url);
        info!("Development mode: proxying through {}", args.proxy_url);
    }

    let mut builder = ServiceConfig::builder()
        .provider_name(&args.provider)
        .model(&args.model)
        .dpi(args.dpi)
        .default_timeout_secs(args.timeout)
        .development(args.development)
        .proxy_url(&args.proxy_url);
    if let Some(key) = args
        .api_key
        .or_else(|| api_key_from_env(&args.provider))
    {
        builder = builder.api_key(key);
    }
    if let Some(path) = args.pdfium_lib_path {
        builder = builder.pdfium_lib_path(path);
    }
    let config = builder.build().context("invalid configuration")?;
    info!("Configuration: {:?}", config);

    let extractor = MenuExtractor::new(config).context("failed to initialise the extractor")?;
    let app = router(AppState::new(extractor));

    let addr: SocketAddr = format!("{}:{}", args.host, args.port)
        .parse()
        .context("invalid listen address")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    info!("Server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
