use std::{
    path::{Path, PathBuf},
    process::ExitCode,
    time::Duration,
};

use anyhow::{bail, Context, Result};
use clap::Parser;
use httpsnap::{
    config::{load_config, resolve_settings, ResolvedSettings},
    printer::print_snapshot,
    HttpClient,
};
use log::debug;

#[derive(Parser, Debug)]
#[command(
    name = "httpsnap",
    version,
    about = "Single-shot HTTP client with a configurable transport"
)]
struct Cli {
    /// HTTP method (case-insensitive)
    #[arg(value_name = "METHOD")]
    method: String,

    /// Target URL
    #[arg(value_name = "URL")]
    url: String,

    /// Request body
    #[arg(short, long, conflicts_with = "data_file")]
    data: Option<String>,

    /// Read the request body from a file
    #[arg(long)]
    data_file: Option<PathBuf>,

    /// Extra header as "Name: value" (repeatable)
    #[arg(short = 'H', long = "header", value_name = "HEADER")]
    headers: Vec<String>,

    /// Directory or file containing httpsnap.json
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Select a profile from httpsnap.json
    #[arg(short = 'P', long)]
    profile: Option<String>,

    /// Proxy URL
    #[arg(long)]
    proxy: Option<String>,

    /// Local IP or host name to bind outbound connections to
    #[arg(long)]
    bind_ip: Option<String>,

    #[arg(short = 'A', long)]
    user_agent: Option<String>,

    /// Content-Type sent with POST requests
    #[arg(long)]
    content_type: Option<String>,

    /// Overall request timeout in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Skip TLS certificate verification
    #[arg(short = 'k', long)]
    insecure: bool,

    /// Preview the first N bytes of the response body
    #[arg(short, long)]
    preview: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    env_logger::init();
    let cli = Cli::parse();

    let cwd = std::env::current_dir()?;
    let config_target = cli
        .config
        .as_ref()
        .map(|p| resolve_relative(&cwd, p))
        .unwrap_or_else(|| cwd.clone());

    let settings = match load_config(&config_target).context("loading configuration")? {
        Some(loaded) => {
            debug!("using config {}", loaded.path.display());
            resolve_settings(&loaded.config, cli.profile.as_deref())?
        }
        None if cli.profile.is_some() => bail!("--profile given but no httpsnap.json found"),
        None => ResolvedSettings::default(),
    };

    let client = build_client(&cli, &settings)?;

    let body = match (&cli.data, &cli.data_file) {
        (Some(data), _) => Some(data.clone().into_bytes()),
        (None, Some(path)) => Some(
            std::fs::read(resolve_relative(&cwd, path))
                .with_context(|| format!("reading request body {}", path.display()))?,
        ),
        (None, None) => None,
    };

    let snapshot = client.execute(&cli.method, &cli.url, body.as_deref()).await;
    print_snapshot(&cli.method, &cli.url, &snapshot, cli.preview);

    Ok(if snapshot.is_ok() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn build_client(cli: &Cli, settings: &ResolvedSettings) -> Result<HttpClient> {
    let mut client = settings.to_client();

    for raw in &cli.headers {
        let (name, value) = parse_header_arg(raw)?;
        client.set_header(name, value);
    }
    if cli.proxy.is_some() {
        client.proxy = cli.proxy.clone();
    }
    if cli.bind_ip.is_some() {
        client.bind_ip = cli.bind_ip.clone();
    }
    if cli.user_agent.is_some() {
        client.user_agent = cli.user_agent.clone();
    }
    if cli.content_type.is_some() {
        client.content_type = cli.content_type.clone();
    }
    if let Some(ms) = cli.timeout_ms {
        client.timeout = Some(Duration::from_millis(ms));
    }
    if cli.insecure {
        client.tls_insecure_skip_verify = true;
    }

    Ok(client)
}

fn parse_header_arg(raw: &str) -> Result<(String, String)> {
    match raw.split_once(':') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.trim().to_string()))
        }
        _ => bail!("invalid header {:?}, expected \"Name: value\"", raw),
    }
}

fn resolve_relative(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
