//! shelfscan CLI
//!
//! Library kiosk: scan a QR token to record attendance, borrow or return a
//! book, or open the librarian dashboard.

use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, Local};
use clap::{Args, Parser, Subcommand};
use tokio::sync::watch;
use tracing::{info, warn};

use shelfscan_cli::attendance::AttendanceSubmitter;
use shelfscan_cli::capture::{CaptureSession, LineSource, TextDetector};
use shelfscan_cli::dispatch::Route;
use shelfscan_cli::feedback::{Notifier, TerminalNotifier};
use shelfscan_cli::flows::FlowOutcome;
use shelfscan_cli::flows::admin::{AdminFlow, INVALID_TOKEN};
use shelfscan_cli::flows::borrow::{BorrowFlow, NOT_A_STUDENT};
use shelfscan_cli::flows::return_book::ReturnFlow;
use shelfscan_cli::input::LineInput;
use shelfscan_cli::prompt::ConsolePrompt;
use shelfscan_cli::scan::{ScanExit, ScanLoop, library_open, start_with_retry};
use shelfscan_client::{ApiClient, BooksClient};
use shelfscan_core::config::load_config;
use shelfscan_core::token::{self, decode};
use shelfscan_core::tracing_init::init_tracing;
use shelfscan_core::{Config, Hours, RawToken, isbn};

const START_ATTEMPTS: u32 = 3;
const START_RETRY_DELAY: Duration = Duration::from_secs(2);

#[derive(Parser, Debug)]
#[command(name = "shelfscan")]
#[command(version, about = "QR attendance kiosk and library desk client", long_about = None)]
struct Cli {
    /// Config file (defaults to the global settings.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Attendance backend base URL
    #[arg(long, global = true, env = "SHELFSCAN_API_URL")]
    api_url: Option<String>,

    /// Emit JSON log lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the kiosk scan loop on stdin
    Scan(ScanArgs),
    /// Record attendance for a token
    Attendance {
        token: String,
        /// Hours attended (1-8)
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=8))]
        hours: u8,
    },
    /// Open the borrow form for a student token
    Borrow { token: String },
    /// Return the book borrowed by a student token
    Return { token: String },
    /// Show the librarian dashboard
    Admin { token: String },
    /// Normalise and validate an ISBN
    Isbn {
        value: String,
        /// Also look the book up
        #[arg(long)]
        lookup: bool,
    },
    /// Decode a token and print its claims
    Inspect { token: String },
}

#[derive(Args, Debug)]
struct ScanArgs {
    /// Sampling interval in milliseconds
    #[arg(long)]
    interval_ms: Option<u64>,

    /// Scan outside opening hours
    #[arg(long)]
    ignore_hours: bool,
}

/// Everything a routed flow needs.
struct Kiosk {
    config: Config,
    api: ApiClient,
    books: BooksClient,
    notifier: TerminalNotifier,
    prompt: ConsolePrompt,
    input: LineInput,
}

impl Kiosk {
    fn new(config: Config) -> Result<Self> {
        let api = ApiClient::new(&config.api)?;
        let books = BooksClient::new(&config.api)?;
        let input = LineInput::stdin();
        Ok(Self {
            config,
            api,
            books,
            notifier: TerminalNotifier,
            prompt: ConsolePrompt::new(input.clone()),
            input,
        })
    }

    async fn open(&self, route: &Route) -> Result<FlowOutcome> {
        info!(%route, "opening view");
        let outcome = match route {
            Route::Admin(token) => {
                AdminFlow::new(&self.api, &self.notifier, &self.prompt)
                    .run(token)
                    .await?
            }
            Route::Borrow(token) => {
                BorrowFlow::new(&self.api, &self.books, &self.notifier, &self.prompt)
                    .run(token, Local::now().date_naive())
                    .await?
            }
            Route::Return(token) => {
                ReturnFlow::new(&self.api, &self.notifier, &self.prompt)
                    .run(token)
                    .await?
            }
        };
        info!(?outcome, "view closed");
        Ok(outcome)
    }

    async fn scan(&self, args: &ScanArgs) -> Result<()> {
        let enforce = self.config.scanner.enforce_opening_hours && !args.ignore_hours;
        if enforce && !library_open(&self.config.hours, Local::now().time(), &self.notifier) {
            return Ok(());
        }

        let interval =
            Duration::from_millis(args.interval_ms.unwrap_or(self.config.scanner.interval_ms).max(1));

        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                let _ = shutdown_tx.send(true);
            }
        });

        let mut session = CaptureSession::new(LineSource::new(self.input.clone()), TextDetector);
        let scanner = ScanLoop::new(&self.api, &self.notifier, &self.prompt, interval);

        loop {
            start_with_retry(&mut session, &self.notifier, START_ATTEMPTS, START_RETRY_DELAY)
                .await?;

            let route = match scanner.run(&mut session, &mut shutdown_rx).await? {
                ScanExit::Route(route) => route,
                ScanExit::Stopped => break,
            };

            tokio::select! {
                outcome = self.open(&route) => { outcome?; }
                _ = shutdown_rx.changed() => break,
            }
        }

        info!("scanner stopped");
        Ok(())
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing("shelfscan=info", cli.log_json);

    let mut config = load_config(cli.config.as_deref())?;
    if let Some(url) = cli.api_url {
        config.api.base_url = url;
    }
    info!(version = env!("CARGO_PKG_VERSION"), api = %config.api.base_url, "starting shelfscan");

    match cli.command {
        Commands::Scan(args) => Kiosk::new(config)?.scan(&args).await?,
        Commands::Attendance { token, hours } => {
            let api = ApiClient::new(&config.api)?;
            let hours = Hours::new(i64::from(hours))?;
            AttendanceSubmitter::new(&api, &TerminalNotifier)
                .submit(&token, hours)
                .await?;
        }
        Commands::Borrow { token } => open_routed(config, &token, Route::Borrow, NOT_A_STUDENT).await?,
        Commands::Return { token } => open_routed(config, &token, Route::Return, NOT_A_STUDENT).await?,
        Commands::Admin { token } => open_routed(config, &token, Route::Admin, INVALID_TOKEN).await?,
        Commands::Isbn { value, lookup } => show_isbn(&config, &value, lookup).await?,
        Commands::Inspect { token } => inspect(&token)?,
    }

    Ok(())
}

/// Open one view directly, as if the token had just been scanned.
async fn open_routed(
    config: Config,
    raw: &str,
    route: fn(RawToken) -> Route,
    rejection: &str,
) -> Result<()> {
    let Ok(token) = RawToken::parse(raw.trim()) else {
        TerminalNotifier.error(rejection);
        return Ok(());
    };
    Kiosk::new(config)?.open(&route(token)).await?;
    Ok(())
}

async fn show_isbn(config: &Config, value: &str, lookup: bool) -> Result<()> {
    let cleaned = isbn::clean_isbn(value);
    let valid = isbn::validate_isbn(&cleaned);
    let mut out = io::stdout();
    writeln!(out, "ISBN:    {cleaned}")?;
    writeln!(out, "Valid:   {}", if valid { "yes" } else { "no" })?;
    if !valid {
        return Ok(());
    }
    writeln!(out, "ISBN-13: {}", isbn::to_isbn13(&cleaned))?;

    if lookup {
        match BooksClient::new(&config.api)?.lookup(&cleaned).await? {
            Some(book) => {
                writeln!(out, "Title:   {}", book.title)?;
                writeln!(out, "Authors: {}", book.author_line())?;
                if let Some(thumbnail) = book.thumbnail {
                    writeln!(out, "Cover:   {thumbnail}")?;
                }
            }
            None => writeln!(out, "Book not found.")?,
        }
    }
    Ok(())
}

fn inspect(raw: &str) -> Result<()> {
    let raw = raw.trim();
    let mut out = io::stdout();
    let well_formed = token::is_well_formed(raw);
    writeln!(out, "Shape:   {}", if well_formed { "ok" } else { "malformed" })?;

    let Some(payload) = decode(raw) else {
        writeln!(out, "Payload: undecodable")?;
        return Ok(());
    };
    writeln!(out, "Payload: {}", serde_json::to_string_pretty(&payload)?)?;

    match token::validate(raw) {
        Ok(scanned) => {
            let claims = scanned.claims;
            writeln!(out, "Name:    {}", claims.fullname)?;
            writeln!(out, "SR code: {}", claims.srcode)?;
            writeln!(out, "Role:    {}", claims.role)?;
            for (label, ts) in [("Issued:", claims.iat), ("Expires:", claims.exp)] {
                if let Some(ts) = ts {
                    writeln!(out, "{label:<8} {}", format_timestamp(ts))?;
                }
            }
        }
        Err(e) => {
            warn!(error = %e, "token rejected");
            writeln!(out, "Claims:  {e}")?;
        }
    }
    Ok(())
}

fn format_timestamp(secs: i64) -> String {
    DateTime::from_timestamp(secs, 0).map_or_else(
        || secs.to_string(),
        |dt| dt.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S %Z").to_string(),
    )
}
