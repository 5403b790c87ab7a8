//! CLI entry point.
//!
//! # Responsibility
//! - Wire the composition root from `FOLIO_*` environment variables.
//! - Print the public page (fallbacks applied) as JSON, or answer a ping.
//!
//! Usage: `folio_cli [page|ping]` (default `page`).

use folio_core::{init_logging, Portfolio, PortfolioConfig};
use log::error;
use std::process::ExitCode;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let command = std::env::args().nth(1).unwrap_or_else(|| "page".to_string());
    match command.as_str() {
        "ping" => {
            println!("folio_core ping={}", folio_core::ping());
            println!("folio_core version={}", folio_core::core_version());
            ExitCode::SUCCESS
        }
        "page" => match print_page().await {
            Ok(()) => ExitCode::SUCCESS,
            Err(message) => {
                eprintln!("{message}");
                ExitCode::FAILURE
            }
        },
        other => {
            eprintln!("unknown command `{other}`; expected `page` or `ping`");
            ExitCode::from(2)
        }
    }
}

async fn print_page() -> Result<(), String> {
    let config = PortfolioConfig::from_env().map_err(|err| err.to_string())?;
    if let Some(log_dir) = &config.log_dir {
        init_logging(&config.log_level, log_dir).map_err(|err| err.to_string())?;
    }

    let portfolio = Portfolio::from_config(&config).map_err(|err| {
        error!("event=cli_page module=cli status=error error={err}");
        err.to_string()
    })?;
    let page = portfolio.public_site().page().await;
    let json = serde_json::to_string_pretty(&page).map_err(|err| err.to_string())?;
    println!("{json}");
    Ok(())
}
