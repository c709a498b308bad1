use std::fs::File;
use std::path::PathBuf;

use clap::Parser;
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};
use termbridge::AppKind;
use termbridge::apps::{EchoApp, KeyViewerApp};
use termbridge::bridge::{Bridge, BridgeSettings, ExitStatus};
use termbridge::core::config::{self, CliOverrides, ResolvedConfig};
use termbridge::core::{BridgeError, Flags, InterruptPolicy};
use termbridge::terminal::{Buffering, OutputWriter, RawModeController, signals};

#[derive(Parser)]
#[command(name = "termbridge", about = "Raw-mode terminal bridge for message-driven apps")]
struct Args {
    /// Application to host
    #[arg(short, long, value_enum)]
    app: Option<AppKind>,

    /// Who handles Escape / Ctrl-C
    #[arg(long, value_enum)]
    interrupts: Option<InterruptPolicy>,

    /// Forward decoded keypresses to the application
    #[arg(long)]
    decode_keys: Option<bool>,

    #[arg(long, value_enum)]
    buffering: Option<Buffering>,

    /// How long a lone ESC waits for the rest of a sequence
    #[arg(long)]
    escape_timeout_ms: Option<u64>,

    #[arg(long)]
    log_file: Option<PathBuf>,

    #[arg(long)]
    log_level: Option<LevelFilter>,

    /// Config file (default ~/.termbridge/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl Args {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            app: self.app,
            interrupts: self.interrupts,
            decode_keys: self.decode_keys,
            buffering: self.buffering,
            escape_timeout_ms: self.escape_timeout_ms,
            log_file: self.log_file.clone(),
            log_level: self.log_level,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = Args::parse();
    dotenv::dotenv().ok();

    let loaded = match config::load_config(args.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("termbridge: {e}");
            std::process::exit(2);
        }
    };
    let config = config::resolve(&loaded.config, &args.overrides());

    // File logger only: stdout belongs to the application
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();
    if let Ok(log_file) = File::create(&config.log_file) {
        let _ = WriteLogger::init(config.log_level, log_config, log_file);
    }

    log::info!("Termbridge starting up, config {}", loaded.source);
    log::debug!("Resolved config: {:?}", config);

    let code = match run(&config).await {
        Ok(status) => status.code,
        Err(e) => {
            log::error!("Fatal: {}", e);
            eprintln!("termbridge: {e}");
            e.exit_code()
        }
    };
    std::process::exit(code);
}

/// Register every cleanup path, then hand control to the bridge.
async fn run(config: &ResolvedConfig) -> Result<ExitStatus, BridgeError> {
    let session = RawModeController::for_stdin();
    session.install_panic_hook();
    let signals = signals::listen().map_err(BridgeError::SignalSetup)?;

    let bridge = Bridge::new(
        BridgeSettings::from(config),
        session,
        OutputWriter::stdout(config.buffering),
    );
    let flags = Flags::now();
    let stdin = tokio::io::stdin();

    match config.app {
        AppKind::Echo => bridge.run(EchoApp::new, flags, stdin, signals).await,
        AppKind::Keys => bridge.run(KeyViewerApp::new, flags, stdin, signals).await,
    }
}
