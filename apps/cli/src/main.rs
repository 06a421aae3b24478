mod config;

use anyhow::Context;
use clap::{Parser, Subcommand};
use config::Config;
use finbooks_connect::ApiClient;
use finbooks_core::fx::{FxService, FxServiceTrait, NewManualRate};
use finbooks_core::settings::{CurrencySelectionManager, SettingsService, SettingsServiceTrait};
use finbooks_core::ValidationError;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "finbooks", version, about = "Finbooks multi-currency management")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the currently loaded exchange rates
    Rates,
    /// Trigger an online rate refresh
    Refresh,
    /// Set a manual rate override
    SetRate {
        base_currency: String,
        target_currency: String,
        rate: String,
    },
    /// Convert an amount between two currencies
    Convert {
        amount: String,
        from_currency: String,
        to_currency: String,
        /// Convert on the backend instead of locally
        #[arg(long)]
        remote: bool,
    },
    /// List the currencies available for selection
    Currencies,
    /// Manage the company currency setup
    Setup {
        #[command(subcommand)]
        action: SetupCommand,
    },
}

#[derive(Subcommand, Debug)]
enum SetupCommand {
    /// Show the company's base and additional currencies
    Show,
    /// Change the company base currency
    SetBase { code: String },
    /// Add currencies to the tracked set
    Add { codes: Vec<String> },
    /// Remove currencies from the tracked set
    Remove { codes: Vec<String> },
}

fn init_tracing() {
    let log_format = std::env::var("FINBOOKS_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

fn parse_amount(raw: &str) -> Result<Decimal, finbooks_core::Error> {
    raw.parse::<Decimal>()
        .map_err(|e| ValidationError::DecimalParse(e).into())
}

async fn build_fx_service(client: &ApiClient) -> anyhow::Result<FxService> {
    let setup = client.get_company_setup().await?;
    let service = FxService::new(Arc::new(client.clone()), &setup.base_currency)?;
    Ok(service)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    tracing::debug!("Using backend at {}", config.api_url);
    let client = ApiClient::new(&config.api_url, &config.api_token)?;

    match cli.command {
        Command::Rates => {
            let service = build_fx_service(&client).await?;
            service.load_rates().await?;
            for rate in service.latest_rates()? {
                println!(
                    "{}/{}  {}  ({}, {})",
                    rate.base_currency,
                    rate.target_currency,
                    rate.rate,
                    rate.source.as_str(),
                    rate.last_updated.format("%Y-%m-%d %H:%M")
                );
            }
        }
        Command::Refresh => {
            let service = build_fx_service(&client).await?;
            let count = service.refresh_rates().await?;
            println!("Refreshed {} exchange rates", count);
        }
        Command::SetRate {
            base_currency,
            target_currency,
            rate,
        } => {
            let service = build_fx_service(&client).await?;
            let saved = service
                .set_manual_rate(NewManualRate {
                    base_currency,
                    target_currency,
                    rate: parse_amount(&rate)?,
                })
                .await?;
            println!(
                "Manual rate {}/{} saved: {}",
                saved.base_currency, saved.target_currency, saved.rate
            );
        }
        Command::Convert {
            amount,
            from_currency,
            to_currency,
            remote,
        } => {
            let amount = parse_amount(&amount)?;
            let service = build_fx_service(&client).await?;
            let result = if remote {
                service
                    .convert_remote(amount, &from_currency, &to_currency)
                    .await?
            } else {
                service.load_rates().await?;
                service.convert(amount, &from_currency, &to_currency)?
            };
            println!(
                "{} {} = {} {}  (rate {}, {})",
                result.original_amount,
                result.from_currency,
                result.converted_amount,
                result.to_currency,
                result.exchange_rate,
                result.rate_source.as_str()
            );
        }
        Command::Currencies => {
            let currencies = client.get_available_currencies().await?;
            for currency in currencies {
                println!("{}  {}  {}", currency.code, currency.symbol, currency.name);
            }
        }
        Command::Setup { action } => {
            let settings = SettingsService::new(Arc::new(client.clone()));
            match action {
                SetupCommand::Show => {
                    let setup = settings.load_company_setup().await?;
                    println!("Base currency: {}", setup.base_currency);
                    for code in &setup.additional_currencies {
                        println!("Additional:    {}", code);
                    }
                }
                SetupCommand::SetBase { code } => {
                    let updated = settings.update_base_currency(&code).await?;
                    println!("Base currency is now {}", updated.base_currency);
                }
                SetupCommand::Add { codes } => {
                    edit_selection(&client, codes, true).await?;
                }
                SetupCommand::Remove { codes } => {
                    edit_selection(&client, codes, false).await?;
                }
            }
        }
    }

    Ok(())
}

/// One edit session over the selection dialog's state machine: open, toggle
/// the requested currencies, save the full set.
async fn edit_selection(client: &ApiClient, codes: Vec<String>, add: bool) -> anyhow::Result<()> {
    let setup = client.get_company_setup().await?;
    let mut manager = CurrencySelectionManager::new(Arc::new(client.clone()), setup);
    manager.open().context("Failed to open currency selection")?;

    for code in codes {
        let normalized = code.to_ascii_uppercase();
        let selected = manager.selection().contains(&normalized);
        if add == selected {
            println!(
                "{} already {}",
                normalized,
                if add { "tracked" } else { "untracked" }
            );
            continue;
        }
        if !manager.toggle(&code)? {
            println!("{} is the base currency, skipped", normalized);
        }
    }

    let saved = manager.save().await?;
    println!(
        "Tracked currencies: {}",
        saved.tracked_currencies().join(", ")
    );
    Ok(())
}
