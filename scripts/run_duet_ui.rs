use clap::Parser;
use duet_adaptor_web::{DuetUiConfig, DuetUiServer};
use duet_core::{init_logging, load_env};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "run-duet-ui", about = "Serve the Duet two-agent demo UI")]
struct Cli {
    #[arg(long, env = "DUET_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Overrides DUET_UI_HOST
    #[arg(long)]
    host: Option<String>,

    /// Overrides DUET_UI_PORT
    #[arg(long)]
    port: Option<u16>,

    /// Overrides DUET_FIXTURE_PATH
    #[arg(long)]
    fixture: Option<PathBuf>,

    /// Overrides DUET_REPLAY_INTERVAL_MS
    #[arg(long)]
    interval_ms: Option<u64>,
}

/// Load `.env` first so its `DUET_LOG_LEVEL` and `RUST_LOG` reach the CLI
/// defaults and the log filter. Usage errors and `--help` exit the process.
fn load_cli<I, T>(args: I) -> duet_core::Result<Cli>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    load_env()?;
    Ok(Cli::try_parse_from(args).unwrap_or_else(|e| e.exit()))
}

fn main() -> duet_core::Result<()> {
    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    rt.block_on(async move {
        let cli = load_cli(std::env::args_os())?;
        std::env::set_var("DUET_LOG_LEVEL", &cli.log_level);
        init_logging();

        let mut config = DuetUiConfig::from_env();
        if let Some(host) = cli.host {
            config.host = host;
        }
        if let Some(port) = cli.port {
            config.port = port;
        }
        if let Some(fixture) = cli.fixture {
            config.session.fixture_path = fixture;
        }
        if let Some(ms) = cli.interval_ms {
            config.session.replay_interval = Duration::from_millis(ms);
        }
        config.session.validate()?;

        if !config.enabled {
            info!("Duet UI disabled (DUET_UI_ENABLED=false)");
            return Ok(());
        }

        let (host, port) = (config.host.clone(), config.port);
        let fixture = config.session.fixture_path.clone();
        let ui = DuetUiServer::new(config);
        if let Err(e) = ui.start().await {
            error!("Failed to start Duet UI on {}:{}: {}", host, port, e);
            return Err(e);
        }
        println!("Duet UI: http://{}:{}/ (fixture {})", host, port, fixture.display());

        let mut term =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()).ok();
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = async {
                match term.as_mut() {
                    Some(s) => { s.recv().await; }
                    None => std::future::pending::<()>().await,
                }
            } => {},
        }
        ui.stop().await?;
        Ok(())
    })
}
