use std::env;

use gearing::api::{self, CliError};
use tracing::error;
use tracing_subscriber::EnvFilter;

/// `RUST_LOG` wins when set; otherwise `info`.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::from("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .without_time()
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn usage() -> ! {
    eprintln!("Usage:");
    eprintln!("  gearing serve [port]");
    eprintln!("  gearing project [--flags] [--config tables.json]");
    std::process::exit(1);
}

#[tokio::main]
async fn main() {
    init_tracing();

    let raw_args: Vec<String> = env::args().collect();
    match raw_args.get(1).map(|s| s.as_str()) {
        Some("serve") => {
            let port = raw_args
                .get(2)
                .and_then(|s| s.parse::<u16>().ok())
                .unwrap_or(8080);
            if let Err(e) = api::run_http_server(port).await {
                error!("server error: {e}");
                std::process::exit(1);
            }
        }
        Some("project") => match api::run_cli(raw_args.iter().skip(1)) {
            Ok(()) => {}
            Err(CliError::Args(e)) => e.exit(),
            Err(e) => {
                error!("{e}");
                std::process::exit(1);
            }
        },
        _ => usage(),
    }
}
