// ==========================
//  y o s o k u  ·  予測
//  price history & forecasts
// ==========================

use anyhow::Result;
use clap::Parser;
use std::env;
use std::path::Path;
use tokio::io::{AsyncBufReadExt, BufReader};

use yosoku::{
    cli::{self, Directive, SessionArgs},
    endp::{CoinMarketCap, YahooFinance},
    session::{CycleOutput, Session},
    ui,
};

fn preprocess() {
    dotenv::dotenv().ok();
    env_logger::init();
}

fn client() -> Result<reqwest::Client> {
    let user_agent = env::var("USER_AGENT")
        .unwrap_or_else(|_| format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")));
    let client = reqwest::ClientBuilder::new().user_agent(user_agent).build()?;
    Ok(client)
}

#[tokio::main]
async fn main() -> Result<()> {
    preprocess();

    let cli = cli::Cli::parse();
    log::info!("Command line input recorded: {cli:#?}");

    let client = client()?;

    match cli.command {
        cli::Commands::Run(args) => {
            let mut session = Session::new();
            run_cycle(&mut session, &client, &args).await?;
        }

        cli::Commands::Interactive(args) => {
            interactive(&client, args).await?;
        }
    }

    Ok(())
}

/// Dispatch the argument events and render one cycle.
async fn run_cycle(
    session: &mut Session,
    client: &reqwest::Client,
    args: &SessionArgs,
) -> Result<()> {
    for event in args.events() {
        session.apply(event)?;
    }
    render(session, client, args).await
}

/// The explicit re-run loop: every input line mutates the session and
/// re-renders the whole page order.
async fn interactive(client: &reqwest::Client, args: SessionArgs) -> Result<()> {
    let mut session = Session::new();
    run_cycle(&mut session, client, &args).await?;

    println!("\ncommands: ticker <SYM> | crypto <SYM> | years <1-4> | log on|off | forecast stock|crypto | show | quit");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match cli::parse_directive(&line) {
            Some(Directive::Quit) => break,
            Some(Directive::Show) => render(&mut session, client, &args).await?,
            Some(Directive::Dispatch(event)) => {
                if let Err(e) = session.apply(event) {
                    eprintln!("{e}");
                    continue;
                }
                // any accepted input re-runs the whole page order
                if let Err(e) = render(&mut session, client, &args).await {
                    eprintln!("cycle failed: {e}");
                }
            }
            None => eprintln!("unrecognised command: {line}"),
        }
    }
    Ok(())
}

async fn render(session: &mut Session, client: &reqwest::Client, args: &SessionArgs) -> Result<()> {
    let spinner = ui::loading_spinner("loading data...");
    let output = session
        .run_cycle(client, &YahooFinance, &CoinMarketCap)
        .await?;
    spinner.finish_with_message("data loaded");

    present(&output);
    write_outputs(&args.out, &output).await?;
    log::info!("chart specifications written to {}", args.out.display());
    Ok(())
}

/// Print the table tails in page order.
fn present(output: &CycleOutput) {
    ui::print_series_tail("Stock price", &output.equity_tail);
    if let Some(forecast) = &output.equity_forecast {
        ui::print_forecast_tail("Forecast (stock)", &forecast.table_tail);
    }
    ui::print_series_tail("Crypto price (USD)", &output.crypto_tail);
    if let Some(forecast) = &output.crypto_forecast {
        ui::print_forecast_tail("Forecast (crypto)", &forecast.table_tail);
    }
}

async fn write_outputs(dir: &Path, output: &CycleOutput) -> Result<()> {
    tokio::fs::create_dir_all(dir).await?;

    write_json(dir, "stock_price.json", &output.equity_chart).await?;
    write_json(dir, "crypto_price.json", &output.crypto_chart).await?;

    if let Some(forecast) = &output.equity_forecast {
        write_json(dir, "stock_forecast.json", &forecast.overlay).await?;
        write_json(dir, "stock_components.json", &forecast.components).await?;
    }
    if let Some(forecast) = &output.crypto_forecast {
        write_json(dir, "crypto_forecast.json", &forecast.overlay).await?;
        write_json(dir, "crypto_components.json", &forecast.components).await?;
    }
    Ok(())
}

async fn write_json<T: serde::Serialize>(dir: &Path, name: &str, value: &T) -> Result<()> {
    let body = serde_json::to_vec_pretty(value)?;
    tokio::fs::write(dir.join(name), body).await?;
    Ok(())
}
