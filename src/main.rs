use clap::{error::ErrorKind, Parser};
use reqwest::Client;
use std::io::Write;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};
use tractscraper::{config::Config, pipeline};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();
    info!("startup");

    std::panic::set_hook(Box::new(|info| {
        eprintln!("panic: {:?}", info);
    }));

    // ─── 2) parse arguments ──────────────────────────────────────────
    // clap exits 2 on its own; only 0 and 1 are allowed here
    let cfg = match Config::try_parse() {
        Ok(cfg) => cfg,
        Err(err) => {
            let _ = err.print();
            return match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => {
                    error!("invalid arguments");
                    ExitCode::FAILURE
                }
            };
        }
    };

    // ─── 3) run the pipeline ─────────────────────────────────────────
    let code = match pipeline::run(&cfg, &Client::new()).await {
        Ok(outcome) if outcome.is_success() => {
            info!(?outcome, "all done");
            ExitCode::SUCCESS
        }
        Ok(outcome) => {
            error!(?outcome, "data quality checks failed");
            ExitCode::FAILURE
        }
        Err(err) => {
            error!("{:#}", err);
            eprintln!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    };

    // diagnostics must be visible before the process exits
    let _ = std::io::stdout().flush();
    let _ = std::io::stderr().flush();
    code
}
