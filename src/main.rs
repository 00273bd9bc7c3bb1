//! Command-line shim around the publish step
//!
//! Reads one step record from a file, runs it and prints the step output as
//! JSON on stdout. Fatal errors exit with status 1; publish failures are part
//! of the printed output.
//!
//! ```bash
//! pubsub-step step.toml
//! pubsub-step --addr mqtt://localhost:1883 step.json -v
//! ```

use clap::Parser;
use pubsub_step::config::{ConfigError, StepConfig};
use pubsub_step::observability::init_default_logging;
use pubsub_step::{Executor, PublishExecutor};
use std::path::PathBuf;
use std::process;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Publish an ordered list of messages to a NATS or MQTT broker
#[derive(Parser)]
#[command(name = "pubsub-step")]
#[command(about = "Publish the messages of a test step to a NATS or MQTT broker")]
#[command(version)]
struct Cli {
    /// Step file (TOML, or JSON when the extension is .json)
    #[arg(value_name = "FILE")]
    step: PathBuf,

    /// Override the broker address from the step file
    #[arg(long, env = "PUBSUB_STEP_ADDR")]
    addr: Option<String>,

    /// Verbose logging
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    /// Load the step file and apply the address override
    fn load_step(&self) -> Result<StepConfig, ConfigError> {
        let mut config = StepConfig::load_from_file(&self.step)?;
        if let Some(addr) = &self.addr {
            config.addr = addr.clone();
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_default_logging(cli.verbose);

    let config = match cli.load_step() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load step from {}: {}", cli.step.display(), e);
            process::exit(1);
        }
    };

    info!(
        step = %cli.step.display(),
        messages = config.messages.len(),
        "Running publish step"
    );

    let cancel = CancellationToken::new();
    let ctrl_c_token = cancel.clone();
    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, cancelling run");
            ctrl_c_token.cancel();
        }
    });

    let executor = PublishExecutor::new();
    let output = match executor.run(&cancel, config).await {
        Ok(output) => output,
        Err(e) => {
            error!("Step failed: {}", e);
            process::exit(1);
        }
    };

    if !output.is_success() {
        warn!(error = %output.err, "Publish did not complete");
    }

    match serde_json::to_string_pretty(&output) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            error!("Failed to serialize step output: {}", e);
            process::exit(1);
        }
    }
}
