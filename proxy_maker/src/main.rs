//! Proxy Maker - MTG decklist to printable proxies
//!
//! Reads a decklist, picks a printing for every card and optionally sends the
//! selection to a render backend. With `--web-port` the same engine is served
//! as a JSON API instead.

use clap::Parser;
use proxy_maker::source::{LOCAL_CARD_DB_URL, SCRYFALL_API_URL};
use proxy_maker::{
    load_all, read_decklist, DeckSession, ExportClient, FileType, HttpCardSource, Pick, ProxyError,
};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// MTG proxy maker - choose set and language per card, export for print
#[derive(Parser, Debug)]
#[command(name = "proxy_maker")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the decklist file (one `4 Card Name` per line)
    #[arg(required_unless_present_any = ["web_port", "list_languages"])]
    decklist: Option<PathBuf>,

    /// Preferred printing language code
    #[arg(short, long, default_value = "en")]
    lang: String,

    /// Base URL for printings by oracle id
    #[arg(long, default_value = LOCAL_CARD_DB_URL)]
    card_source: String,

    /// Base URL of the Scryfall API used for name lookups
    #[arg(long, default_value = SCRYFALL_API_URL)]
    scryfall: String,

    /// Base URL of the render backend (no export when omitted)
    #[arg(long)]
    export_backend: Option<String>,

    /// Render output format
    #[arg(long, value_enum, default_value_t = FileType::Pdf)]
    filetype: FileType,

    /// Paper size passed to the render backend
    #[arg(long)]
    paper_size: Option<String>,

    /// Where to write the rendered file (default: download directory)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Override a selection, e.g. `--pick 3:Alpha:ja` (repeatable)
    #[arg(long = "pick", value_name = "SLOT:SET[:LANG]")]
    picks: Vec<String>,

    /// Print the supported language codes and exit
    #[arg(long, default_value_t = false)]
    list_languages: bool,

    /// Serve the JSON API on the specified port instead of a one-shot run
    #[arg(long)]
    web_port: Option<u16>,
}

/// Returns the default output path: ~/Downloads/proxies-<timestamp>.<ext>
fn default_output_path(filetype: FileType) -> PathBuf {
    let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
    dirs::download_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(format!("proxies-{}.{}", stamp, filetype.extension()))
}

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    if args.list_languages {
        for (code, name) in mtg_common::LANGUAGES {
            println!("{:<4} {}", code, name);
        }
        return;
    }

    if !mtg_common::is_known_language(&args.lang) {
        log::warn!("Unknown language code {:?}, falling back to English where needed", args.lang);
    }

    let source = Arc::new(HttpCardSource::new(&args.card_source, &args.scryfall));
    let export = args.export_backend.as_deref().map(|url| Arc::new(ExportClient::new(url)));

    if let Some(port) = args.web_port {
        if let Err(e) = proxy_maker::web::serve(source, export, port).await {
            log::error!("Web server error: {}", e);
            std::process::exit(1);
        }
        return;
    }

    if let Err(e) = run(&args, &source, export.as_deref()).await {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

/// One-shot run: load the decklist, apply picks, print and export
async fn run(
    args: &Args,
    source: &HttpCardSource,
    export: Option<&ExportClient>,
) -> Result<(), ProxyError> {
    let picks = args
        .picks
        .iter()
        .map(|pick| pick.parse::<Pick>())
        .collect::<Result<Vec<_>, _>>()?;

    let Some(path) = &args.decklist else {
        return Ok(());
    };
    let entries = read_decklist(path)?;
    log::info!("Read {} cards from {}", entries.len(), path.display());

    let session = Mutex::new(DeckSession::new());
    let generation = lock(&session).submit_entries(entries, &args.lang);
    load_all(&session, generation, source).await;

    let entries = {
        let mut session = lock(&session);
        for pick in &picks {
            if let Err(e) = session.apply_pick(pick) {
                log::warn!("Ignoring pick for slot {}: {}", pick.slot_index + 1, e);
            }
        }
        print_selection(&session);
        session.snapshot_for_export()
    };

    let Some(export) = export else {
        log::info!("No export backend configured, skipping render");
        return Ok(());
    };

    let result = export
        .request_render(&entries, args.filetype, args.paper_size.as_deref())
        .await;
    lock(&session).record_export_outcome(result.is_ok());

    let token = result?;
    log::info!("Render accepted, token {}", token);
    let bytes = export.download(&token).await?;

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(args.filetype));
    tokio::fs::write(&output, &bytes).await?;
    log::info!("Wrote {} bytes to {}", bytes.len(), output.display());

    Ok(())
}

fn lock(session: &Mutex<DeckSession>) -> MutexGuard<'_, DeckSession> {
    session.lock().unwrap_or_else(PoisonError::into_inner)
}

fn print_selection(session: &DeckSession) {
    let view = session.view();
    println!(
        "{:>4}  {:>3}  {:<32} {:<28} {:<5} {:<10} {:>8}",
        "SLOT", "QTY", "CARD", "SET", "LANG", "COLORS", "USD"
    );
    for slot in &view.slots {
        let name = if slot.double_faced {
            format!("{} (DFC)", slot.name)
        } else {
            slot.name.clone()
        };
        let price = slot
            .price_minor
            .map(|cents| format!("{}.{:02}", cents / 100, cents % 100))
            .unwrap_or_default();
        match &slot.error {
            Some(error) => println!("{:>4}  {:>3}  {:<32} {}", slot.index + 1, slot.quantity, name, error),
            None => println!(
                "{:>4}  {:>3}  {:<32} {:<28} {:<5} {:<10} {:>8}",
                slot.index + 1,
                slot.quantity,
                name,
                slot.chosen_set.as_deref().unwrap_or("-"),
                slot.chosen_language.as_deref().unwrap_or("-"),
                slot.colors.concat(),
                price
            ),
        }
    }
    println!("{} cards selected for export", view.card_count);
}
