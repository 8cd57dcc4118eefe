use std::fs::File;
use std::io::{self, BufReader};
use std::process::ExitCode;

use koyomi_app::error::AppError;
use koyomi_app::interpreter::{Interpreter, RunOutcome};
use koyomi_app::presenter::WritePresenter;
use koyomi_core::config::load_config;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, reload, util::SubscriberInitExt};

fn main() -> anyhow::Result<ExitCode> {
    let (filter_layer, filter_handle) = reload::Layer::new(EnvFilter::new("warn"));

    // Diagnostics go to stderr; stdout carries only command output.
    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt::layer().with_target(true).with_writer(io::stderr))
        .init();

    let settings = load_config()?;

    tracing::debug!(settings = ?settings, "Configuration loaded");

    if let Ok(filter) = EnvFilter::try_new(settings.logging.level.as_str()) {
        if let Err(e) = filter_handle.modify(|current| *current = filter) {
            tracing::warn!(error = %e, "Failed to update log filter from config");
        }
    } else {
        tracing::warn!(level = %settings.logging.level, "Invalid log level in config, keeping warn");
    }

    let args: Vec<String> = std::env::args().skip(1).collect();

    let presenter = WritePresenter::new(io::stdout());
    let mut interpreter = Interpreter::new(
        presenter,
        settings.interpreter.fail_fast,
        settings.interpreter.echo_commands,
    );

    let outcome = match args.as_slice() {
        [] => {
            tracing::info!("Interactive session on stdin");
            interpreter.run(io::stdin().lock())
        }
        [flag, path] if flag == "--headless" => {
            let file = match File::open(path) {
                Ok(file) => file,
                Err(source) => {
                    let err = AppError::InputUnavailable {
                        path: path.clone(),
                        source,
                    };
                    tracing::error!(error = %err, "cannot open script");
                    eprintln!("Error: {}: {err}", err.kind());
                    return Ok(ExitCode::FAILURE);
                }
            };
            tracing::info!(path, "Headless run");
            interpreter.run(BufReader::new(file))
        }
        _ => {
            eprintln!("usage: koyomi [--headless <script>]");
            return Ok(ExitCode::from(2));
        }
    };

    match outcome {
        RunOutcome::Completed => Ok(ExitCode::SUCCESS),
        RunOutcome::Aborted => Ok(ExitCode::FAILURE),
    }
}
