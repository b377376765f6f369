use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "herasi")]
#[command(about = "Herasi WhatsApp AI bot", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version
    Version,

    /// Run the webhook gateway (HTTP server for WaMundo callbacks).
    /// Secrets come from DEEPSEEK_API_KEY, WAMUNDO_API_KEY, and
    /// WAMUNDO_PHONE_ID (environment or a .env file in the working directory).
    Gateway {
        /// Listen port (default from PORT env or 5000)
        #[arg(long, short)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Version) => {
            println!("herasi {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Gateway { port }) => {
            if let Err(e) = run_gateway(port).await {
                log::error!("gateway failed: {}", e);
                std::process::exit(1);
            }
        }
        None => {
            println!("Run with --help for usage");
        }
    }
}

async fn run_gateway(port: Option<u16>) -> anyhow::Result<()> {
    let secrets = lib::config::load_secrets();
    for key in secrets.missing_keys() {
        log::warn!("{} is not set; upstream calls will fail with auth errors", key);
    }
    if !secrets.wamundo_phone_id.is_empty() {
        log::info!("whatsapp sender id: {}", secrets.wamundo_phone_id);
    }

    let mut config = lib::config::GatewayConfig::default();
    config.port = port.unwrap_or_else(lib::config::resolve_port);

    let state = lib::gateway::GatewayState::from_secrets(&secrets);
    log::info!("starting gateway on {}:{}", config.bind, config.port);
    lib::gateway::run_gateway(config, state).await
}
