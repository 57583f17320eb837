use crate::{dates, views};
use dialoguer::Input;
use paperlot_core::{
    BatchRegistrar, GameCatalog, PaperlotError, Result, SalesReportEngine, Storage, TicketLedger,
};

/// Active command mode. Threaded through the loop as an explicit value; a
/// numeric key means a different thing depending on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Sell,
    AddBatch,
    RemoveBatch,
}

impl Mode {
    fn as_str(&self) -> &'static str {
        match self {
            Mode::Sell => "sell",
            Mode::AddBatch => "add_batch",
            Mode::RemoveBatch => "remove_batch",
        }
    }
}

enum Outcome {
    Stay,
    SwitchMode(Mode),
    Exit,
}

/// Interactive command loop. Per-command errors are reported and the loop
/// continues; only prompt/terminal failures end it.
pub async fn run(storage: &Storage) -> Result<()> {
    let mut mode = Mode::Sell;

    loop {
        let input: String = Input::new()
            .with_prompt(format!("Current mode {}", mode.as_str()))
            .allow_empty(true)
            .interact_text()
            .map_err(|e| PaperlotError::dialog(e.to_string()))?;

        match dispatch(storage, mode, input.trim()).await {
            Ok(Outcome::Stay) => {}
            Ok(Outcome::SwitchMode(next)) => mode = next,
            Ok(Outcome::Exit) => return Ok(()),
            // Single error boundary: every failure is reported, none discarded
            Err(e @ PaperlotError::Dialog(_)) => return Err(e),
            Err(e) => report_error(&e),
        }
    }
}

async fn dispatch(storage: &Storage, mode: Mode, input: &str) -> Result<Outcome> {
    if !input.is_empty() && input.chars().all(|c| c.is_ascii_digit()) {
        let (game_id, batch_id) = split_key(input)?;
        handle_key(storage, mode, game_id, batch_id).await?;
        return Ok(Outcome::Stay);
    }

    match input {
        "sell" => Ok(Outcome::SwitchMode(Mode::Sell)),
        "add_batch" => Ok(Outcome::SwitchMode(Mode::AddBatch)),
        "remove_batch" => Ok(Outcome::SwitchMode(Mode::RemoveBatch)),
        "report" => {
            run_report(storage).await?;
            Ok(Outcome::Stay)
        }
        "show_all_games" => {
            views::render_games(&GameCatalog::new(storage).list_games().await?);
            Ok(Outcome::Stay)
        }
        "show_all_papers" => {
            views::render_tickets(&TicketLedger::new(storage).list_tickets().await?);
            Ok(Outcome::Stay)
        }
        "exit" => Ok(Outcome::Exit),
        other => Err(PaperlotError::validation(format!(
            "Unknown command: '{}'",
            other
        ))),
    }
}

/// A ticket key is exactly 10 digits: 3 for the game id, 7 for the batch id.
fn split_key(input: &str) -> Result<(&str, &str)> {
    if input.len() != 10 {
        return Err(PaperlotError::validation(
            "Unknown format! A game+batch key is 10 digits (3 game + 7 batch)",
        ));
    }
    Ok((&input[..3], &input[3..]))
}

async fn handle_key(storage: &Storage, mode: Mode, game_id: &str, batch_id: &str) -> Result<()> {
    match mode {
        Mode::Sell => {
            let ticket = TicketLedger::new(storage).sell(game_id, batch_id).await?;
            println!(
                "Sold paper {} of batch {} (game {})",
                ticket.ticket_id, batch_id, game_id
            );
        }
        Mode::AddBatch => add_batch(storage, game_id, batch_id).await?,
        Mode::RemoveBatch => {
            // Catalog-wide removal: the whole game type plus every ticket
            // under it, not just this batch
            GameCatalog::new(storage).remove_game(game_id).await?;
            println!("Removed game {} and all of its papers", game_id);
        }
    }
    Ok(())
}

async fn add_batch(storage: &Storage, game_id: &str, batch_id: &str) -> Result<()> {
    let catalog = GameCatalog::new(storage);

    let mut explicit_ids = None;
    let game = match catalog.lookup(game_id).await? {
        Some(game) => game,
        None => {
            println!("This is a new game! We should register it!");
            let game = register_game_interactive(&catalog, game_id).await?;
            // A first batch may arrive partially sold through; let the
            // operator list the paper numbers actually on hand
            explicit_ids = prompt_current_stock(game.tickets_per_batch)?;
            game
        }
    };

    let created = BatchRegistrar::new(storage)
        .register_batch(&game.id, batch_id, explicit_ids.as_deref())
        .await?;
    if created {
        println!("Registered batch {} of game {}", batch_id, game.id);
    } else {
        println!("Batch already registered!");
    }
    Ok(())
}

async fn register_game_interactive<'a>(
    catalog: &GameCatalog<'a>,
    game_id: &str,
) -> Result<paperlot_core::GameType> {
    let name: String = Input::new()
        .with_prompt("Name")
        .interact_text()
        .map_err(|e| PaperlotError::dialog(e.to_string()))?;

    let tickets_per_batch: String = Input::new()
        .with_prompt("Paper per batch")
        .interact_text()
        .map_err(|e| PaperlotError::dialog(e.to_string()))?;
    let tickets_per_batch: u32 = tickets_per_batch
        .trim()
        .parse()
        .map_err(|_| PaperlotError::validation("Paper per batch must be a positive integer"))?;

    let price: String = Input::new()
        .with_prompt("Price per paper game")
        .interact_text()
        .map_err(|e| PaperlotError::dialog(e.to_string()))?;
    let price: u64 = price
        .trim()
        .parse()
        .map_err(|_| PaperlotError::validation("Price must be a non-negative integer"))?;

    catalog
        .register(game_id, name.trim(), tickets_per_batch, price)
        .await
}

fn prompt_current_stock(tickets_per_batch: u32) -> Result<Option<Vec<i64>>> {
    let raw: String = Input::new()
        .with_prompt(format!(
            "Current stock [{}] (paper ids, comma separated; empty for the full batch)",
            tickets_per_batch
        ))
        .allow_empty(true)
        .interact_text()
        .map_err(|e| PaperlotError::dialog(e.to_string()))?;

    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }

    let mut ids = Vec::new();
    for part in raw.split(',') {
        let id: i64 = part
            .trim()
            .parse()
            .map_err(|_| PaperlotError::validation(format!("Invalid paper id: '{}'", part.trim())))?;
        ids.push(id);
    }
    Ok(Some(ids))
}

async fn run_report(storage: &Storage) -> Result<()> {
    let since: String = Input::new()
        .with_prompt("Since")
        .allow_empty(true)
        .interact_text()
        .map_err(|e| PaperlotError::dialog(e.to_string()))?;
    let from = dates::parse_date(&since)?;

    let to_raw: String = Input::new()
        .with_prompt("To")
        .allow_empty(true)
        .interact_text()
        .map_err(|e| PaperlotError::dialog(e.to_string()))?;
    let to = dates::parse_date(&to_raw)?;

    let report = SalesReportEngine::new(storage).report(from, to).await?;
    views::render_report(&report);
    Ok(())
}

fn report_error(err: &PaperlotError) {
    match err {
        PaperlotError::GameNotFound { id } => {
            eprintln!("Game '{}' is not registered", id);
        }
        PaperlotError::BatchNotFound { game_id, batch_id } => {
            eprintln!("Batch '{}' of game '{}' is not registered", batch_id, game_id);
        }
        PaperlotError::Exhausted { game_id, batch_id } => {
            eprintln!(
                "There are no more papers to sell in batch '{}' of game '{}'",
                batch_id, game_id
            );
        }
        PaperlotError::GameExists { id } => {
            eprintln!("Game '{}' is already registered", id);
        }
        PaperlotError::Validation(msg) => {
            eprintln!("{}", msg);
        }
        PaperlotError::Storage(e) => {
            eprintln!("Storage error (nothing was written): {}", e);
        }
        other => {
            eprintln!("Error: {}", other);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_splits_into_game_and_batch() {
        let (game, batch) = split_key("0010000001").unwrap();
        assert_eq!(game, "001");
        assert_eq!(batch, "0000001");
    }

    #[test]
    fn short_and_long_keys_are_rejected() {
        assert!(split_key("001").is_err());
        assert!(split_key("00100000012").is_err());
    }
}
