//! CLI entrypoint for table-council
//!
//! Wires together all layers with dependency injection and drives one full
//! session from the command line: every diner joins, submits a dish list,
//! the authorizer starts the negotiation, the live feed streams to the
//! terminal while a polling mirror follows the durable log.

use anyhow::{Context, Result, bail};
use clap::Parser;
use council_application::{
    DishAnalyzer, RoomService, TextGenerator, TranscriptLog, TranscriptRecorder,
};
use council_domain::{InviteCode, RoomStore, util::now_ms};
use council_infrastructure::{
    ChatApiClient, ChatDishAnalyzer, ConfigLoader, HeuristicDishAnalyzer, InMemoryRoomStore,
    InMemoryTranscriptLog, JsonlTranscriptRecorder, OfflineTextGenerator, PoiPlaceSearch,
};
use council_presentation::{Cli, ConsoleFormatter, LiveFeedPrinter, OutputFormat, parse_diner};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity level
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    // Diners
    if cli.diners.is_empty() {
        bail!("at least one --diner \"Name: dish, dish\" is required");
    }
    let diners: Vec<(String, Vec<String>)> = cli
        .diners
        .iter()
        .map(|raw| parse_diner(raw).map_err(anyhow::Error::msg))
        .collect::<Result<_>>()?;

    // Configuration
    let mut config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref()).map_err(|e| anyhow::anyhow!(e))?
    };
    if let Some(rounds) = cli.rounds {
        config.negotiation.max_rounds = rounds;
    }
    if let Some(city) = &cli.city {
        config.negotiation.city = city.clone();
    }

    // === Dependency Injection ===
    let offline = cli.offline || config.providers.chat.api_key.is_none();
    let (generator, analyzer): (Arc<dyn TextGenerator>, Arc<dyn DishAnalyzer>) = if offline {
        info!("no chat API key configured; using offline collaborators");
        (
            Arc::new(OfflineTextGenerator::new()),
            Arc::new(HeuristicDishAnalyzer::new()),
        )
    } else {
        let chat = Arc::new(
            ChatApiClient::new(config.providers.chat.clone())
                .map_err(|e| anyhow::anyhow!(e.to_string()))
                .context("building chat client")?,
        );
        let analyzer = Arc::new(ChatDishAnalyzer::new(chat.clone() as Arc<dyn TextGenerator>));
        (chat, analyzer)
    };

    let places = Arc::new(
        PoiPlaceSearch::new(config.providers.places.clone())
            .map_err(|e| anyhow::anyhow!(e.to_string()))
            .context("building place search client")?,
    );

    let mut log = InMemoryTranscriptLog::new();
    if let Some(path) = &cli.record {
        match JsonlTranscriptRecorder::new(path) {
            Some(recorder) => {
                info!(path = %recorder.path().display(), "recording transcript");
                log = log.with_recorder(Arc::new(recorder) as Arc<dyn TranscriptRecorder>);
            }
            None => bail!("could not open transcript record file {}", path.display()),
        }
    }

    let service = Arc::new(
        RoomService::new(
            Arc::new(InMemoryRoomStore::new()) as Arc<dyn RoomStore>,
            Arc::new(log) as Arc<dyn TranscriptLog>,
            generator,
            places,
            analyzer,
        )
        .with_settings(config.negotiation.clone(), config.delivery.clone()),
    );

    // Session
    let code = match &cli.code {
        Some(code) => InviteCode::parse(code.as_str()).map_err(|e| anyhow::anyhow!(e))?,
        None => InviteCode::from_seed(now_ms()),
    };

    if !cli.quiet {
        println!();
        println!("+------------------------------------------------------------+");
        println!("|            table-council - where shall we eat?             |");
        println!("+------------------------------------------------------------+");
        println!();
        println!(
            "Session {} with {} diner(s), {} round(s), {}",
            code,
            diners.len(),
            config.negotiation.max_rounds,
            chrono::Local::now().format("%Y-%m-%d %H:%M"),
        );
        println!();
    }

    // Everyone joins; the first diner is the authorizer
    let authorizer_id = "diner-1".to_string();
    for (i, (name, _)) in diners.iter().enumerate() {
        let summary = service
            .join_session(code.as_str(), &format!("diner-{}", i + 1), name)
            .await?;
        if !cli.quiet {
            println!("{} joined: {}", name, ConsoleFormatter::format_status(&summary));
        }
    }

    // Everyone submits a dish list
    for (i, (name, dishes)) in diners.iter().enumerate() {
        let summary = service
            .submit_profile(code.as_str(), &format!("diner-{}", i + 1), dishes)
            .await
            .with_context(|| format!("profile submission for {}", name))?;
        if !cli.quiet {
            println!("{} ready: {}", name, ConsoleFormatter::format_status(&summary));
        }
    }

    // The authorizer starts; a polling mirror follows the durable log the
    // way a passive participant's client would
    service.start_session(code.as_str(), &authorizer_id).await?;

    let mirror = {
        let service = Arc::clone(&service);
        let code = code.clone();
        tokio::spawn(async move {
            let mut cursor = 0u64;
            let mut seen = 0usize;
            loop {
                if let Ok(page) = service.poll_transcript(code.as_str(), cursor).await {
                    seen += page.entries.len();
                    cursor = page.total;
                    if page.status.is_completed() {
                        break;
                    }
                }
                tokio::time::sleep(Duration::from_millis(500)).await;
            }
            seen
        })
    };

    // The authorizer's live push feed
    let mut feed = service.stream_transcript(code.as_str()).await?;
    let recommendation = LiveFeedPrinter::new(cli.quiet).run(&mut feed).await;

    let mirrored = mirror.await.context("polling mirror")?;
    info!(entries = mirrored, "polling mirror drained the durable log");

    match recommendation {
        Some(rec) => match cli.output {
            OutputFormat::Text => println!("{}", ConsoleFormatter::format_recommendation(&rec)),
            OutputFormat::Json => println!("{}", ConsoleFormatter::format_json(&rec)),
        },
        None => bail!("session ended without a recommendation"),
    }

    Ok(())
}
