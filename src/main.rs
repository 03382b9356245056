use std::env;
use std::io;
use std::path::Path;
use std::process::ExitCode;

use identikit::csv::{read_attributes, write_keys};
use identikit::{Config, Deriver};
use tokio_stream::StreamExt;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

const USAGE: &str = "usage: identikit <transactions.csv> [config.toml]";

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::WARN.into())
                .from_env_lossy(),
        )
        .with_writer(io::stderr)
        .init();

    let mut args = env::args().skip(1);
    let Some(path) = args.next() else {
        error!("{USAGE}");
        return ExitCode::from(2);
    };

    if !path.ends_with(".csv") {
        warn!(path, "input file seems to not be a csv file");
    }

    let config = match args.next() {
        Some(config_path) => match Config::load(&config_path) {
            Ok(config) => config,
            Err(e) => {
                error!(path = %config_path, "{e}");
                return ExitCode::FAILURE;
            }
        },
        None => Config::default(),
    };

    let deriver = match Deriver::new(config) {
        Ok(deriver) => deriver,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let records = match read_attributes(Path::new(&path)) {
        Ok(records) => records,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let (tx_sender, tx_receiver) = tokio::sync::mpsc::channel(16);

    tokio::spawn(async move {
        for result in records {
            match result {
                Ok(record) => {
                    if tx_sender
                        .send((record.line, record.attributes))
                        .await
                        .is_err()
                    {
                        break;
                    }
                }
                Err(e) => {
                    warn!("{e}");
                }
            }
        }
    });

    let mut results = std::pin::pin!(deriver.derive_stream(ReceiverStream::new(tx_receiver)));
    let mut keys = Vec::new();
    while let Some((line, result)) = results.next().await {
        match result {
            Ok(derivation) => keys.push((line, derivation)),
            Err(e) => warn!(line, "{e}"),
        }
    }

    if let Err(e) = write_keys(io::stdout().lock(), keys) {
        error!("{e}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
