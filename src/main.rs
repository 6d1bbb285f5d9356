//! EEM Sheet - Entry Point
//!
//! A line-oriented shell over one character sheet. Reads commands from
//! stdin until `quit`, end of input or SIGINT, then flushes any
//! pending save before exiting.
//!
//! Wiring sequence:
//! 1. Load config.toml (path from the first argument) + validate
//! 2. Init tracing (JSON structured logging on stderr)
//! 3. Resolve player identity and storage keys
//! 4. Create storage (per-key files, or memory when data_dir is empty)
//! 5. Open the sheet on the last active slot
//! 6. Run the command loop
//! 7. Flush pending writes and exit

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Local;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;
use tracing::{info, warn};

use eem_sheet::adapters::host::{InMemoryRoom, LocalPlayer, LogNotifier};
use eem_sheet::adapters::persistence::{FileStorage, MemoryStorage};
use eem_sheet::adapters::prompt::QueuedPrompt;
use eem_sheet::config::{self, AppConfig};
use eem_sheet::domain::entry::EntryId;
use eem_sheet::domain::error::SheetError;
use eem_sheet::domain::roll::RollMode;
use eem_sheet::domain::store::WriteOrigin;
use eem_sheet::ports::host::PlayerIdentity;
use eem_sheet::ports::storage::{KeyValueStorage, StorageKeys};
use eem_sheet::usecases::{CharacterSheet, PersistenceCoordinator, RollService};

type Roller = RollService<QueuedPrompt, LogNotifier, InMemoryRoom, LocalPlayer>;

#[tokio::main]
async fn main() -> Result<()> {
    // ── 1. Load configuration ───────────────────────────────
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());
    let config = config::load_config(&config_path).context("Failed to load configuration")?;

    // ── 2. Initialize structured JSON logging ───────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.app.log_level)),
        )
        .with_writer(std::io::stderr)
        .json()
        .init();

    info!(
        app_id = %config.app.id,
        version = env!("CARGO_PKG_VERSION"),
        "Starting EEM sheet"
    );

    // ── 3. Identity and keys ────────────────────────────────
    let player = Arc::new(LocalPlayer::from_config(&config.player));
    let player_id = player.player_id().await?;
    let keys = StorageKeys::new(config.app.id.clone(), player_id);

    // ── 4. Storage backend ──────────────────────────────────
    if config.persistence.data_dir.is_empty() {
        warn!("No data_dir configured, saves are kept in memory only");
        run(Arc::new(MemoryStorage::new()), keys, player, &config).await
    } else {
        let storage = FileStorage::new(&config.persistence.data_dir)
            .await
            .context("Failed to open data directory")?;
        run(Arc::new(storage), keys, player, &config).await
    }
}

/// Open the sheet and drive it from stdin.
async fn run<S: KeyValueStorage>(
    storage: Arc<S>,
    keys: StorageKeys,
    player: Arc<LocalPlayer>,
    config: &AppConfig,
) -> Result<()> {
    let notifier = Arc::new(LogNotifier::new());
    let prompt = Arc::new(QueuedPrompt::new());
    let room = Arc::new(InMemoryRoom::new());

    let roller: Roller = RollService::new(
        Arc::clone(&prompt),
        Arc::clone(&notifier),
        room,
        player,
        keys.room_data(),
        config.rolls.clone(),
    );

    // ── 5. Open the sheet ───────────────────────────────────
    let persistence = PersistenceCoordinator::new(storage, keys, config.persistence.debounce());
    let mut sheet = CharacterSheet::new(
        persistence,
        Arc::clone(&notifier),
        config.rolls.share_notification(),
    );
    sheet.open().await;
    println!("slot {} loaded, type 'help' for commands", sheet.active_slot());

    // ── 6. Command loop ─────────────────────────────────────
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            _ = signal::ctrl_c() => {
                info!("SIGINT received, flushing and exiting");
                break;
            }
            line = lines.next_line() => line.context("Failed to read stdin")?,
        };
        let Some(line) = line else {
            break;
        };

        let words: Vec<&str> = line.split_whitespace().collect();
        if words.first() == Some(&"quit") {
            break;
        }
        if let Err(e) = execute(&mut sheet, &roller, &prompt, &words).await {
            println!("error: {e}");
        }
        for note in notifier.take_recent() {
            println!("[{}] {}", note.title, note.message.replace("<br>", "\n  "));
        }
    }

    // ── 7. Graceful shutdown ────────────────────────────────
    sheet.flush().await;
    info!(slot = %sheet.active_slot(), "Shutdown complete");
    Ok(())
}

const HELP: &str = "\
set <key> <value>            write an attribute
get <key>...                 read attributes (no key: everything)
roll <attr> [mode] [mod|-] [defense|-]
add                          append a skill entry
field <id> <field> <value>   set a skill field
delete <id>                  remove a skill entry
move <id> <target> [before|after]
list                         show skill entries in order
slot <1|2|3>                 switch save slot
export [path]                write the sheet to a file
import <path>                replace the sheet from a file
share <id>                   publish a skill entry
tab <name>                   select a sheet tab
history                      show the room roll history
quit";

async fn execute<S: KeyValueStorage>(
    sheet: &mut CharacterSheet<S, LogNotifier>,
    roller: &Roller,
    prompt: &QueuedPrompt,
    words: &[&str],
) -> Result<()> {
    match words {
        [] => {}
        ["help"] => println!("{HELP}"),
        ["set", key, value @ ..] => {
            let value = value.join(" ");
            sheet.change_attribute(key, &value, WriteOrigin::User).await?;
            println!("{key} = {}", sheet.store().value(key));
        }
        ["get"] => print_values(sheet.store().values()),
        ["get", keys @ ..] => print_values(&sheet.get(keys)),
        ["roll", attribute, rest @ ..] => {
            let mode = match rest.first() {
                Some(mode) => mode.parse::<RollMode>()?,
                None => RollMode::Normal,
            };
            prompt.clear();
            let ask_modifier = rest.len() > 1;
            if let Some(answer) = rest.get(1) {
                prompt.push(parse_answer(answer)?);
            }
            if *attribute == "attack" {
                prompt.push(rest.get(2).map_or(Ok(Some(0)), |a| parse_answer(a))?);
            }
            match roller.roll(sheet.store(), attribute, mode, ask_modifier).await {
                Ok(outcome) => println!("{} = {}", outcome.title, outcome.result),
                Err(SheetError::PromptCancelled) => println!("roll cancelled"),
                Err(e) => return Err(e.into()),
            }
        }
        ["add"] => println!("{}", sheet.add_entry()),
        ["field", id, field, value @ ..] => {
            let value = value.join(" ");
            if !sheet.set_entry_field(&EntryId::from(*id), field, &value) {
                println!("no entry {id}");
            }
        }
        ["delete", id] => {
            if !sheet.delete_entry(&EntryId::from(*id)) {
                println!("no entry {id}");
            }
        }
        ["move", id, target, rest @ ..] => {
            let ratio = if rest.first() == Some(&"after") { 0.75 } else { 0.25 };
            let (id, target) = (EntryId::from(*id), EntryId::from(*target));
            if sheet.begin_drag(&id) {
                sheet.hover(&target, ratio);
                sheet.drop_drag();
            } else {
                println!("no entry {id}");
            }
        }
        ["list"] => {
            for entry in sheet.collection().entries() {
                println!("{} {}", entry.id, entry.field("skillname").unwrap_or_default());
            }
        }
        ["slot", slot] => {
            sheet.switch_slot(slot).await?;
            println!("slot {slot} loaded");
        }
        ["export", rest @ ..] => {
            let path = rest
                .first()
                .map_or_else(|| sheet.export_file_name(Local::now().naive_local()), |p| (*p).to_string());
            let snapshot = sheet.export_snapshot().await;
            tokio::fs::write(&path, snapshot)
                .await
                .with_context(|| format!("Failed to write {path}"))?;
            println!("exported to {path}");
        }
        ["import", path] => {
            let text = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read {path}"))?;
            sheet.import_snapshot(&text).await?;
            println!("imported into slot {}", sheet.active_slot());
        }
        ["share", id] => {
            if !sheet.share_entry(&EntryId::from(*id)) {
                println!("no entry {id}");
            }
        }
        ["tab", tab] => {
            sheet.select_tab(tab).await?;
        }
        ["history"] => println!("{}", roller.history().await),
        _ => println!("unknown command, type 'help'"),
    }
    Ok(())
}

/// `-` dismisses the modal; anything else must be an integer.
fn parse_answer(word: &str) -> Result<Option<i32>> {
    if word == "-" {
        return Ok(None);
    }
    word.parse::<i32>()
        .map(Some)
        .with_context(|| format!("'{word}' is not a number"))
}

fn print_values(values: &BTreeMap<String, String>) {
    for (key, value) in values {
        println!("{key} = {value}");
    }
}
