use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};

use askchat::answer::{AnswerService, HttpAnswerClient};
use askchat::app::App;
use askchat::config::Config;
use askchat::plain::{self, PlainView};
use askchat::session::ChatSession;
use askchat::{handler, logging, tui, ui};

#[derive(Parser, Debug)]
#[command(name = "askchat")]
#[command(version, about = "Chat with a question/answer service from the terminal")]
struct Cli {
    /// Answer service URL (POST endpoint)
    #[arg(short, long)]
    endpoint: Option<String>,

    /// Line-by-line mode instead of the full-screen UI
    #[arg(short, long)]
    plain: bool,

    /// Remember --endpoint as the default for future runs
    #[arg(long, requires = "endpoint")]
    save: bool,

    /// Write logs here instead of the cache directory
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load().context("Failed to load config")?;

    let log_path = cli
        .log_file
        .clone()
        .or_else(logging::default_log_path)
        .context("Could not determine a log file location; pass --log-file")?;
    logging::init(&log_path, config.log_level())?;
    tracing::debug!("Parsed CLI arguments: {:?}", cli);

    if cli.save {
        if let Some(endpoint) = cli.endpoint.as_deref() {
            Config::save_default_endpoint(endpoint)?;
            info!(endpoint, "saved default endpoint");
        }
    }

    let endpoint = config.resolve_endpoint(cli.endpoint.as_deref());
    info!(%endpoint, plain = cli.plain, "starting");
    let service: Arc<dyn AnswerService> = Arc::new(HttpAnswerClient::new(&endpoint));

    // The full-screen UI needs a real terminal on both ends
    let interactive = std::io::stdin().is_terminal() && std::io::stderr().is_terminal();

    let result = if cli.plain || !interactive {
        run_plain(service).await
    } else {
        run_tui(service, &endpoint).await
    };

    if let Err(e) = &result {
        error!("askchat exited with error: {:?}", e);
    }
    result
}

async fn run_plain(service: Arc<dyn AnswerService>) -> Result<()> {
    let color = std::io::stdout().is_terminal();
    let mut session = ChatSession::new(service, PlainView::new(std::io::stdout(), color));
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    plain::run(&mut session, stdin).await
}

async fn run_tui(service: Arc<dyn AnswerService>, endpoint: &str) -> Result<()> {
    tui::install_panic_hook();
    let mut terminal = tui::init()?;

    let mut events = tui::EventHandler::new();
    let mut app = App::new(service, endpoint, events.sender());

    let result = async {
        while !app.should_quit {
            terminal.draw(|frame| ui::render(&mut app, frame))?;
            match events.next().await {
                Some(event) => handler::handle_event(&mut app, event).await?,
                None => break,
            }
        }
        Ok::<(), anyhow::Error>(())
    }
    .await;

    tui::restore()?;
    info!(messages = app.session.transcript().len(), "session closed");
    result
}
