//! Roll Service - Attribute Checks and Shared Roll History
//!
//! Turns a roll request into a notification and a room history line:
//! - Optional extra modifier and, for attacks, the adversary's defense
//!   are asked for through the modal; dismissing either aborts
//! - The check die is rolled once, or twice for advantage/disadvantage
//! - Attacks also roll the character's dread die
//! - The result goes to the notification sink and is prepended to the
//!   room's roll history

use std::sync::Arc;

use chrono::Local;
use tokio::sync::watch;
use tracing::{info, instrument, warn};

use crate::config::RollConfig;
use crate::domain::attribute::parse_int_prefix;
use crate::domain::dice::{DiceExpr, roll_dice};
use crate::domain::error::SheetError;
use crate::domain::roll::{RollMode, attribute_label, history_line, prepend_history, roll_message};
use crate::domain::store::AttributeStore;
use crate::domain::validation::DEFAULT_DREAD;
use crate::ports::host::{PlayerIdentity, RoomData, RoomMetadata};
use crate::ports::notifier::Notifier;
use crate::ports::prompt::{ModifierPrompt, PromptDescriptor};

/// Attribute whose roll also asks for a defense and rolls dread.
pub const ATTACK: &str = "attack";

/// Name used when neither the character nor the player has one.
pub const UNKNOWN_ROLLER: &str = "Unknown";

/// What a completed roll produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollOutcome {
  /// `<name> - <Label>`
  pub title: String,
  /// Notification body, with `<b>`/`<br>` markup.
  pub message: String,
  /// Kept total for the chosen mode.
  pub result: i32,
  /// Line prepended to the room history.
  pub history_entry: String,
}

/// Rolls checks and publishes them.
pub struct RollService<P, N, R, I>
where
  P: ModifierPrompt,
  N: Notifier,
  R: RoomMetadata,
  I: PlayerIdentity,
{
  prompt: Arc<P>,
  notifier: Arc<N>,
  room: Arc<R>,
  identity: Arc<I>,
  /// Room metadata key holding `{ roll_history }`.
  room_key: String,
  config: RollConfig,
}

impl<P, N, R, I> RollService<P, N, R, I>
where
  P: ModifierPrompt,
  N: Notifier,
  R: RoomMetadata,
  I: PlayerIdentity,
{
  pub fn new(
    prompt: Arc<P>,
    notifier: Arc<N>,
    room: Arc<R>,
    identity: Arc<I>,
    room_key: String,
    config: RollConfig,
  ) -> Self {
    Self {
      prompt,
      notifier,
      room,
      identity,
      room_key,
      config,
    }
  }

  /// Roll `attribute` in `mode`.
  ///
  /// # Errors
  /// `PromptCancelled` when a modal is dismissed (nothing is published),
  /// `InvalidArgument` when the dread die has no positive side count.
  #[instrument(skip(self, store))]
  pub async fn roll(
    &self,
    store: &AttributeStore,
    attribute: &str,
    mode: RollMode,
    ask_modifier: bool,
  ) -> Result<RollOutcome, SheetError> {
    let extra = if ask_modifier {
      self.ask("Additional Modifier").await?
    } else {
      0
    };
    let defense = if attribute == ATTACK {
      self.ask("Adversary Defense").await?
    } else {
      0
    };

    let base = parse_int_prefix(store.value(attribute)).unwrap_or(0);
    let modifier = i32::try_from(base)
      .unwrap_or(if base < 0 { i32::MIN } else { i32::MAX })
      .saturating_add(extra)
      .saturating_add(defense);

    let dice = roll_dice(self.config.die_sides, mode.dice_count(), modifier)?;
    let result = mode.pick(&dice);
    let mut message = roll_message(&mode.describe(&dice), modifier, result);

    if attribute == ATTACK {
      let dread = match store.value("dread") {
        "" => DEFAULT_DREAD,
        value => value,
      };
      if let Some(expr) = DiceExpr::parse(dread) {
        let dread_roll = expr.roll()?;
        message.push_str(&format!("<br>Dread: <b>{}</b>", dread_roll.total));
      }
    }

    let label = attribute_label(attribute);
    let name = self.roller_name(store).await;
    let title = format!("{name} - {label}");

    self
      .notifier
      .publish(&title, &message, self.config.notification());

    let history_entry = history_line(Local::now().time(), &name, &label, &message);
    self.append_history(&history_entry).await;

    info!(title = %title, result, %mode, "Roll published");

    Ok(RollOutcome {
      title,
      message,
      result,
      history_entry,
    })
  }

  async fn ask(&self, title: &str) -> Result<i32, SheetError> {
    self
      .prompt
      .open(&PromptDescriptor::modifier(title))
      .await
      .ok_or(SheetError::PromptCancelled)
  }

  /// Character name, else the player's name, else `Unknown`.
  async fn roller_name(&self, store: &AttributeStore) -> String {
    let character = store.value("character_name");
    if !character.is_empty() {
      return character.to_string();
    }
    match self.identity.player_name().await {
      Ok(Some(name)) => name,
      Ok(None) => UNKNOWN_ROLLER.to_string(),
      Err(e) => {
        warn!(error = %e, "Player name lookup failed");
        UNKNOWN_ROLLER.to_string()
      }
    }
  }

  async fn append_history(&self, entry: &str) {
    let current = self.history().await;
    let roll_history = prepend_history(&current, entry, self.config.history_max_entries);
    if let Err(e) = self
      .room
      .set(&self.room_key, RoomData { roll_history })
      .await
    {
      warn!(error = %e, "Failed to update room roll history");
    }
  }

  /// Current room roll history, newest first.
  pub async fn history(&self) -> String {
    match self.room.get(&self.room_key).await {
      Ok(data) => data.map(|d| d.roll_history).unwrap_or_default(),
      Err(e) => {
        warn!(error = %e, "Failed to read room roll history");
        String::new()
      }
    }
  }

  /// Follow history changes made by anyone in the room.
  pub fn watch_history(&self) -> watch::Receiver<RoomData> {
    self.room.subscribe()
  }
}
