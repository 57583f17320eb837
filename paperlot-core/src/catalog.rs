use crate::error::{PaperlotError, Result};
use crate::storage::Storage;
use crate::types::GameType;
use rusqlite::{params, OptionalExtension, Row};

/// Registry of game types. Game types are immutable once registered; the only
/// exposed mutation is whole-game removal, which cascades over every ticket.
pub struct GameCatalog<'a> {
    storage: &'a Storage,
}

fn game_from_row(row: &Row<'_>) -> rusqlite::Result<GameType> {
    Ok(GameType {
        id: row.get(0)?,
        name: row.get(1)?,
        tickets_per_batch: row.get(2)?,
        price_per_ticket: row.get::<_, i64>(3)? as u64,
    })
}

impl<'a> GameCatalog<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Register a new game type. Fails with `GameExists` on a duplicate id and
    /// `Validation` on a zero batch size.
    pub async fn register(
        &self,
        id: &str,
        name: &str,
        tickets_per_batch: u32,
        price_per_ticket: u64,
    ) -> Result<GameType> {
        if tickets_per_batch == 0 {
            return Err(PaperlotError::validation(
                "tickets per batch must be positive",
            ));
        }

        let conn = self.storage.get_connection().await;
        let inserted = conn.execute(
            "INSERT INTO game_types (game_id, name, tickets_per_batch, price_per_ticket)
             VALUES (?1, ?2, ?3, ?4)",
            params![id, name, tickets_per_batch, price_per_ticket as i64],
        );

        match inserted {
            Ok(_) => {}
            Err(e) => {
                let err = PaperlotError::from(e);
                if err.is_constraint_violation() {
                    return Err(PaperlotError::game_exists(id));
                }
                return Err(err);
            }
        }

        tracing::info!("Registered game type {} ({})", id, name);
        Ok(GameType {
            id: id.to_string(),
            name: name.to_string(),
            tickets_per_batch,
            price_per_ticket,
        })
    }

    pub async fn lookup(&self, id: &str) -> Result<Option<GameType>> {
        let conn = self.storage.get_connection().await;
        let game = conn
            .query_row(
                "SELECT game_id, name, tickets_per_batch, price_per_ticket
                 FROM game_types WHERE game_id = ?1",
                params![id],
                game_from_row,
            )
            .optional()?;
        Ok(game)
    }

    /// Remove a game type and, cascading, every ticket under it, in one
    /// transaction. This is catalog-wide removal, not single-batch removal:
    /// reporting and re-registration rely on the full cascade.
    pub async fn remove_game(&self, id: &str) -> Result<()> {
        let mut conn = self.storage.get_connection().await;
        let tx = conn.transaction()?;

        let removed_tickets = tx.execute("DELETE FROM tickets WHERE game_id = ?1", params![id])?;
        let removed_games = tx.execute("DELETE FROM game_types WHERE game_id = ?1", params![id])?;

        if removed_games == 0 {
            // Dropping the transaction rolls it back
            return Err(PaperlotError::game_not_found(id));
        }
        tx.commit()?;

        tracing::info!(
            "Removed game type {} and {} of its tickets",
            id,
            removed_tickets
        );
        Ok(())
    }

    pub async fn list_games(&self) -> Result<Vec<GameType>> {
        let conn = self.storage.get_connection().await;
        let mut stmt = conn.prepare(
            "SELECT game_id, name, tickets_per_batch, price_per_ticket
             FROM game_types ORDER BY game_id",
        )?;

        let game_iter = stmt.query_map([], game_from_row)?;

        let mut games = Vec::new();
        for game in game_iter {
            games.push(game?);
        }
        Ok(games)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::TicketLedger;
    use crate::registrar::BatchRegistrar;
    use tempfile::tempdir;

    async fn open_storage(dir: &tempfile::TempDir) -> Storage {
        Storage::new(&dir.path().join("game.db")).await.unwrap()
    }

    #[tokio::test]
    async fn register_and_lookup() {
        let dir = tempdir().unwrap();
        let storage = open_storage(&dir).await;
        let catalog = GameCatalog::new(&storage);

        let game = catalog.register("001", "Scratch", 5, 2).await.unwrap();
        assert_eq!(game.tickets_per_batch, 5);

        let found = catalog.lookup("001").await.unwrap().unwrap();
        assert_eq!(found, game);
        assert!(catalog.lookup("002").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_id_is_rejected() {
        let dir = tempdir().unwrap();
        let storage = open_storage(&dir).await;
        let catalog = GameCatalog::new(&storage);

        catalog.register("001", "Scratch", 5, 2).await.unwrap();
        let err = catalog.register("001", "Other", 10, 3).await.unwrap_err();
        assert!(matches!(err, PaperlotError::GameExists { id } if id == "001"));
    }

    #[tokio::test]
    async fn zero_batch_size_is_rejected() {
        let dir = tempdir().unwrap();
        let storage = open_storage(&dir).await;
        let catalog = GameCatalog::new(&storage);

        let err = catalog.register("001", "Scratch", 0, 2).await.unwrap_err();
        assert!(matches!(err, PaperlotError::Validation(_)));
    }

    #[tokio::test]
    async fn remove_cascades_over_tickets_and_allows_reregistration() {
        let dir = tempdir().unwrap();
        let storage = open_storage(&dir).await;
        let catalog = GameCatalog::new(&storage);
        let registrar = BatchRegistrar::new(&storage);
        let ledger = TicketLedger::new(&storage);

        catalog.register("001", "Scratch", 5, 2).await.unwrap();
        registrar.register_batch("001", "0000001", None).await.unwrap();
        assert_eq!(ledger.list_tickets().await.unwrap().len(), 5);

        catalog.remove_game("001").await.unwrap();
        assert!(catalog.lookup("001").await.unwrap().is_none());
        assert!(ledger.list_tickets().await.unwrap().is_empty());

        // A fresh registration starts from zero tickets
        catalog.register("001", "Scratch", 5, 2).await.unwrap();
        assert!(ledger.list_tickets().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn remove_unknown_game_fails() {
        let dir = tempdir().unwrap();
        let storage = open_storage(&dir).await;
        let catalog = GameCatalog::new(&storage);

        let err = catalog.remove_game("404").await.unwrap_err();
        assert!(matches!(err, PaperlotError::GameNotFound { id } if id == "404"));
    }
}
