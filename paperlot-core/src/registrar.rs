use crate::error::{PaperlotError, Result};
use crate::storage::Storage;
use crate::types::TicketStatus;
use chrono::Utc;
use rusqlite::{params, OptionalExtension};

/// Materializes a whole batch of tickets under a game type in one atomic step.
/// A batch either exists completely or not at all.
pub struct BatchRegistrar<'a> {
    storage: &'a Storage,
}

impl<'a> BatchRegistrar<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Register batch `batch_id` under `game_id`. Returns `true` when the
    /// batch was created and `false` when it was already registered (an
    /// idempotent no-op, including when two registrations race on the
    /// composite primary key).
    ///
    /// Ticket ids come from `explicit_ticket_ids` when supplied, otherwise
    /// the sequential range `0..tickets_per_batch`. All tickets of a batch
    /// share one `created_at`.
    pub async fn register_batch(
        &self,
        game_id: &str,
        batch_id: &str,
        explicit_ticket_ids: Option<&[i64]>,
    ) -> Result<bool> {
        if let Some(ids) = explicit_ticket_ids {
            validate_explicit_ids(ids)?;
        }

        let mut conn = self.storage.get_connection().await;
        let tx = conn.transaction()?;

        let tickets_per_batch: u32 = tx
            .query_row(
                "SELECT tickets_per_batch FROM game_types WHERE game_id = ?1",
                params![game_id],
                |row| row.get(0),
            )
            .optional()?
            .ok_or_else(|| PaperlotError::game_not_found(game_id))?;

        let already_registered: Option<i64> = tx
            .query_row(
                "SELECT 1 FROM tickets WHERE game_id = ?1 AND batch_id = ?2 LIMIT 1",
                params![game_id, batch_id],
                |row| row.get(0),
            )
            .optional()?;
        if already_registered.is_some() {
            tracing::info!("Batch {} of game {} already registered", batch_id, game_id);
            return Ok(false);
        }

        let created_at = Utc::now().timestamp();
        let sequential: Vec<i64> = (0..tickets_per_batch as i64).collect();
        let ticket_ids = explicit_ticket_ids.unwrap_or(&sequential);

        {
            let mut insert = tx.prepare(
                "INSERT INTO tickets (game_id, batch_id, ticket_id, status, created_at, sold_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, NULL)",
            )?;
            for ticket_id in ticket_ids {
                if let Err(e) = insert.execute(params![
                    game_id,
                    batch_id,
                    ticket_id,
                    TicketStatus::OnSale.as_str(),
                    created_at,
                ]) {
                    let err = PaperlotError::from(e);
                    if err.is_constraint_violation() {
                        // Lost a duplicate-registration race; the open
                        // transaction rolls back on drop and the batch the
                        // winner created stays intact
                        tracing::warn!(
                            "Batch {} of game {} registered concurrently",
                            batch_id,
                            game_id
                        );
                        return Ok(false);
                    }
                    return Err(err);
                }
            }
        }

        tx.commit()?;
        tracing::info!(
            "Registered batch {} of game {} with {} tickets",
            batch_id,
            game_id,
            ticket_ids.len()
        );
        Ok(true)
    }
}

fn validate_explicit_ids(ids: &[i64]) -> Result<()> {
    if ids.is_empty() {
        return Err(PaperlotError::validation(
            "explicit ticket id list must not be empty",
        ));
    }
    let mut seen = ids.to_vec();
    seen.sort_unstable();
    seen.dedup();
    if seen.len() != ids.len() {
        return Err(PaperlotError::validation(
            "explicit ticket ids must be unique within a batch",
        ));
    }
    Ok(())
}
