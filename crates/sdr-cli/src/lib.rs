use clap::{Parser, Subcommand, ValueEnum};
use sdr_core::{BuildOptions, Context, Interpreter, KeyStrategy, TemplateNode};
use sdr_web::{
    Acquisition, ClientConfig, HttpFetcher, html_registry, render_state, template_router,
};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "sdr", version, about = "Interpret server-driven UI templates")]
struct Cli {
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Debug, Clone, PartialEq, Subcommand)]
enum CliCommand {
    /// Render a template file to HTML.
    Render {
        file: PathBuf,
        /// Context as inline JSON or a path to a JSON file.
        #[arg(long)]
        context: Option<String>,
        #[arg(long, value_enum, default_value_t = KeysArg::TreePath)]
        keys: KeysArg,
    },
    /// Fetch a template over HTTP, then render it.
    Fetch {
        path: String,
        #[arg(long)]
        base: Option<String>,
        /// Client configuration JSON (method, baseUrl, headers, timeoutMs).
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long)]
        context: Option<String>,
    },
    /// Serve a directory of JSON templates.
    Serve {
        #[arg(default_value = ".")]
        dir: PathBuf,
        #[arg(long, default_value_t = 3000)]
        port: u16,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum KeysArg {
    TreePath,
    Random,
    None,
}

impl From<KeysArg> for KeyStrategy {
    fn from(arg: KeysArg) -> Self {
        match arg {
            KeysArg::TreePath => KeyStrategy::TreePath,
            KeysArg::Random => KeyStrategy::Random,
            KeysArg::None => KeyStrategy::None,
        }
    }
}

pub async fn run_from_env() -> Result<(), String> {
    init_tracing();
    run_from_args(env::args().skip(1).collect()).await
}

pub async fn run_from_args(args: Vec<String>) -> Result<(), String> {
    match parse_command(args)? {
        CliCommand::Render {
            file,
            context,
            keys,
        } => {
            let html = render_file(&file, context, keys.into())?;
            println!("{html}");
            Ok(())
        }
        CliCommand::Fetch {
            path,
            base,
            config,
            context,
        } => run_fetch(path, base, config, context).await,
        CliCommand::Serve { dir, port } => run_server(dir, port).await,
    }
}

fn parse_command(args: Vec<String>) -> Result<CliCommand, String> {
    let argv = std::iter::once("sdr".to_string()).chain(args);
    Cli::try_parse_from(argv)
        .map(|cli| cli.command)
        .map_err(|e| e.to_string())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn render_file(file: &Path, context: Option<String>, keys: KeyStrategy) -> Result<String, String> {
    let source =
        fs::read_to_string(file).map_err(|e| format!("failed to read {}: {e}", file.display()))?;
    let template: TemplateNode = source
        .parse()
        .map_err(|e| format!("invalid template {}: {e}", file.display()))?;
    let ctx = load_context(context)?;
    tracing::debug!(file = %file.display(), nodes = template.node_count(), "rendering template");
    let registry = html_registry();
    let options = BuildOptions {
        keys,
        ..BuildOptions::default()
    };

    Interpreter::new(&ctx, &registry)
        .with_options(options)
        .build(&template)
        .map(|el| el.render())
        .map_err(|e| e.to_string())
}

async fn run_fetch(
    path: String,
    base: Option<String>,
    config: Option<PathBuf>,
    context: Option<String>,
) -> Result<(), String> {
    let mut client = match config {
        Some(file) => ClientConfig::load(&file)?,
        None => ClientConfig::default(),
    };
    if let Some(base) = base {
        client.base_url = base;
    }
    if client.base_url.is_empty() {
        return Err("fetch requires --base or a config file with baseUrl".to_string());
    }
    let ctx = load_context(context)?;
    tracing::debug!(base = %client.base_url, method = %client.method, path = %path, "fetching template");

    let acquisition = Acquisition::start(Arc::new(HttpFetcher::new(client)), path);
    let state = acquisition.settled().await;
    let html = render_state(&state, &ctx, &html_registry()).map_err(|e| e.to_string())?;
    println!("{html}");

    match state.error() {
        Some(err) => Err(err.to_string()),
        None => Ok(()),
    }
}

async fn run_server(dir: PathBuf, port: u16) -> Result<(), String> {
    if !dir.is_dir() {
        return Err(format!("not a directory: {}", dir.display()));
    }
    let app = template_router(dir.clone());

    let host = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&host)
        .await
        .map_err(|e| format!("failed to bind {host}: {e}"))?;
    tracing::info!(root = %dir.display(), %host, "serving templates");
    println!("URL:  http://localhost:{port}");
    axum::serve(listener, app)
        .await
        .map_err(|e| format!("server failed: {e}"))?;
    Ok(())
}

/// Inline JSON, or a path to a JSON file when one exists at that location.
fn load_context(input: Option<String>) -> Result<Context, String> {
    let Some(input) = input else {
        return Ok(Context::new());
    };

    let as_path = PathBuf::from(&input);
    let parsed = if as_path.is_file() {
        let content = fs::read_to_string(&as_path)
            .map_err(|e| format!("failed to read {}: {e}", as_path.display()))?;
        serde_json::from_str::<serde_json::Value>(&content)
            .map_err(|e| format!("invalid JSON in {}: {e}", as_path.display()))?
    } else {
        serde_json::from_str::<serde_json::Value>(&input)
            .map_err(|e| format!("invalid --context JSON: {e}"))?
    };

    if !parsed.is_object() {
        return Err("context must be a JSON object".to_string());
    }
    Ok(Context::from_json(parsed))
}
