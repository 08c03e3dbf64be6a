use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "wathiq")]
#[command(about = "Wathiq customer-support gateway", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version
    Version,

    /// Create the configuration directory and a config.json seeded from a bundled deployment preset.
    Init {
        /// Config file path (default: WATHIQ_CONFIG_PATH or ~/.wathiq/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<PathBuf>,

        /// Deployment preset to seed the config with (see `wathiq presets`)
        #[arg(long, value_name = "NAME")]
        preset: Option<String>,
    },

    /// Run the gateway (WhatsApp webhook at /webhook, web chat at /api/ai).
    Gateway {
        /// Config file path (default: WATHIQ_CONFIG_PATH or ~/.wathiq/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<PathBuf>,

        /// HTTP port (default from config or 3000)
        #[arg(long, short)]
        port: Option<u16>,
    },

    /// Send one message to a running gateway and print the reply.
    Send {
        /// Config file path (default: WATHIQ_CONFIG_PATH or ~/.wathiq/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<PathBuf>,

        /// Sender identifier (phone number or visitor name)
        #[arg(long, value_name = "ID")]
        from: Option<String>,

        /// Post to the WhatsApp webhook and print the raw TwiML instead of using the web endpoint
        #[arg(long)]
        whatsapp: bool,

        /// Message text
        message: String,
    },

    /// List the bundled deployment presets.
    Presets,
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Version) => {
            println!("wathiq {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Init { config, preset }) => {
            if let Err(e) = run_init(config, preset) {
                log::error!("init failed: {:#}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Gateway { config, port }) => {
            if let Err(e) = run_gateway(config, port).await {
                log::error!("gateway failed: {:#}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Send {
            config,
            from,
            whatsapp,
            message,
        }) => {
            if let Err(e) = run_send(config, from, whatsapp, message).await {
                log::error!("send failed: {:#}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Presets) => {
            for name in wathiq::presets::names() {
                println!("{}", name);
            }
        }
        None => {
            println!("Run with --help for usage");
        }
    }
}

fn run_init(config_path: Option<PathBuf>, preset: Option<String>) -> anyhow::Result<()> {
    let path = config_path.unwrap_or_else(wathiq::config::default_config_path);
    let dir = wathiq::init::init_config_dir(&path, preset.as_deref())?;
    println!("initialized configuration at {}", dir.display());
    Ok(())
}

async fn run_gateway(config_path: Option<PathBuf>, port: Option<u16>) -> anyhow::Result<()> {
    let (mut config, path) = wathiq::config::load_config(config_path)?;
    if let Some(p) = port {
        config.gateway.port = p;
    }
    log::info!(
        "starting gateway on {}:{} (config {})",
        config.gateway.bind,
        config.gateway.port,
        path.display()
    );
    wathiq::gateway::run_gateway(config).await
}

#[derive(Deserialize)]
struct WebReply {
    reply: String,
}

async fn run_send(
    config_path: Option<PathBuf>,
    from: Option<String>,
    whatsapp: bool,
    message: String,
) -> anyhow::Result<()> {
    let (config, _) = wathiq::config::load_config(config_path)?;
    let base = format!("http://{}:{}", config.gateway.bind.trim(), config.gateway.port);
    let client = reqwest::Client::new();

    if whatsapp {
        let from = from.unwrap_or_else(|| "whatsapp:+0000000000".to_string());
        let res = client
            .post(format!("{}/webhook", base))
            .form(&[("Body", message.as_str()), ("From", from.as_str())])
            .send()
            .await
            .with_context(|| format!("posting to {}/webhook (is the gateway running?)", base))?;
        let status = res.status();
        let body = res.text().await.context("reading webhook response")?;
        if !status.is_success() {
            anyhow::bail!("gateway answered {}: {}", status, body);
        }
        println!("{}", body);
        return Ok(());
    }

    let mut payload = serde_json::json!({ "Body": message });
    if let Some(from) = from {
        payload["From"] = serde_json::Value::String(from);
    }
    let res = client
        .post(format!("{}/api/ai", base))
        .json(&payload)
        .send()
        .await
        .with_context(|| format!("posting to {}/api/ai (is the gateway running?)", base))?;
    let status = res.status();
    if !status.is_success() {
        let body = res.text().await.unwrap_or_default();
        anyhow::bail!("gateway answered {}: {}", status, body);
    }
    let reply: WebReply = res.json().await.context("parsing gateway reply")?;
    println!("{}", reply.reply.trim());
    Ok(())
}
