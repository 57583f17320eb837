use crate::error::{PaperlotError, Result};
use crate::storage::Storage;
use crate::types::{Ticket, TicketStatus};
use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Row};

/// Holds the tickets and applies the only mutation in the system: the
/// OnSale -> Sold transition.
pub struct TicketLedger<'a> {
    storage: &'a Storage,
}

pub(crate) fn ticket_from_row(row: &Row<'_>) -> rusqlite::Result<Ticket> {
    let status_str: String = row.get(3)?;
    let status = TicketStatus::parse(&status_str).ok_or_else(|| {
        rusqlite::Error::InvalidColumnType(3, "status".to_string(), rusqlite::types::Type::Text)
    })?;
    let created_ts: i64 = row.get(4)?;
    let sold_ts: Option<i64> = row.get(5)?;

    Ok(Ticket {
        game_id: row.get(0)?,
        batch_id: row.get(1)?,
        ticket_id: row.get(2)?,
        status,
        created_at: DateTime::from_timestamp(created_ts, 0).unwrap_or_else(Utc::now),
        sold_at: sold_ts.map(|ts| DateTime::from_timestamp(ts, 0).unwrap_or_else(Utc::now)),
    })
}

impl<'a> TicketLedger<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Sell one ticket from batch `(game_id, batch_id)`: the OnSale ticket
    /// with the lowest `ticket_id` is claimed, marked `Sold` and stamped with
    /// `sold_at = now`, all in one transaction. Selection is deterministic so
    /// repeated runs sell papers in ticket-number order.
    pub async fn sell(&self, game_id: &str, batch_id: &str) -> Result<Ticket> {
        let mut conn = self.storage.get_connection().await;
        let tx = conn.transaction()?;

        let candidate = tx
            .query_row(
                "SELECT game_id, batch_id, ticket_id, status, created_at, sold_at
                 FROM tickets
                 WHERE game_id = ?1 AND batch_id = ?2 AND status = 'ON_SALE'
                 ORDER BY ticket_id ASC LIMIT 1",
                params![game_id, batch_id],
                ticket_from_row,
            )
            .optional()?;

        let Some(mut ticket) = candidate else {
            // Distinguish an unknown game, an unknown batch and a sold-out
            // batch; the transaction wrote nothing either way
            let game_known: Option<i64> = tx
                .query_row(
                    "SELECT 1 FROM game_types WHERE game_id = ?1",
                    params![game_id],
                    |row| row.get(0),
                )
                .optional()?;
            if game_known.is_none() {
                return Err(PaperlotError::game_not_found(game_id));
            }
            let batch_known: Option<i64> = tx
                .query_row(
                    "SELECT 1 FROM tickets WHERE game_id = ?1 AND batch_id = ?2 LIMIT 1",
                    params![game_id, batch_id],
                    |row| row.get(0),
                )
                .optional()?;
            if batch_known.is_none() {
                return Err(PaperlotError::batch_not_found(game_id, batch_id));
            }
            return Err(PaperlotError::exhausted(game_id, batch_id));
        };

        let sold_at = Utc::now();
        let updated = tx.execute(
            "UPDATE tickets SET status = 'SOLD', sold_at = ?1
             WHERE game_id = ?2 AND batch_id = ?3 AND ticket_id = ?4 AND status = 'ON_SALE'",
            params![sold_at.timestamp(), game_id, batch_id, ticket.ticket_id],
        )?;
        if updated != 1 {
            return Err(PaperlotError::internal(format!(
                "sell claimed {} rows for ticket {} of batch {}/{}",
                updated, ticket.ticket_id, game_id, batch_id
            )));
        }
        tx.commit()?;

        ticket.status = TicketStatus::Sold;
        ticket.sold_at = DateTime::from_timestamp(sold_at.timestamp(), 0);

        tracing::info!(
            "Sold ticket {} of batch {} (game {})",
            ticket.ticket_id,
            batch_id,
            game_id
        );
        Ok(ticket)
    }

    /// Dump every ticket, ordered by the unique key.
    pub async fn list_tickets(&self) -> Result<Vec<Ticket>> {
        let conn = self.storage.get_connection().await;
        let mut stmt = conn.prepare(
            "SELECT game_id, batch_id, ticket_id, status, created_at, sold_at
             FROM tickets ORDER BY game_id, batch_id, ticket_id",
        )?;

        let ticket_iter = stmt.query_map([], ticket_from_row)?;

        let mut tickets = Vec::new();
        for ticket in ticket_iter {
            tickets.push(ticket?);
        }
        Ok(tickets)
    }
}
