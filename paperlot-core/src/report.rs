use crate::error::Result;
use crate::storage::Storage;
use crate::types::{GameSales, SalesReport};
use chrono::{DateTime, Utc};
use rusqlite::params;

/// Aggregates ledger state into per-game sold/remaining counts for a date
/// window.
pub struct SalesReportEngine<'a> {
    storage: &'a Storage,
}

impl<'a> SalesReportEngine<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Per-game counts over `[from, to]`. Only tickets created on or before
    /// `to` are considered: of those, OnSale tickets count as remaining stock
    /// and Sold tickets count as sold when `sold_at` falls inside the window.
    /// Absent bounds default to `from = epoch`, `to = now`.
    pub async fn report(
        &self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<SalesReport> {
        let from_ts = from.map(|d| d.timestamp()).unwrap_or(0);
        let to_ts = to.unwrap_or_else(Utc::now).timestamp();

        let conn = self.storage.get_connection().await;
        let mut stmt = conn.prepare(
            "SELECT t.game_id, g.name, g.price_per_ticket,
                    SUM(CASE WHEN t.status = 'ON_SALE' THEN 1 ELSE 0 END),
                    SUM(CASE WHEN t.status = 'SOLD'
                             AND t.sold_at >= ?1 AND t.sold_at <= ?2 THEN 1 ELSE 0 END)
             FROM tickets t
             JOIN game_types g ON g.game_id = t.game_id
             WHERE t.created_at <= ?2
             GROUP BY t.game_id
             ORDER BY t.game_id",
        )?;

        let row_iter = stmt.query_map(params![from_ts, to_ts], |row| {
            let game_id: String = row.get(0)?;
            let sales = GameSales {
                name: row.get(1)?,
                price_per_ticket: row.get::<_, i64>(2)? as u64,
                on_sale: row.get::<_, i64>(3)? as u64,
                sold: row.get::<_, i64>(4)? as u64,
            };
            Ok((game_id, sales))
        })?;

        let mut report = SalesReport::new();
        for row in row_iter {
            let (game_id, sales) = row?;
            report.insert(game_id, sales);
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::GameCatalog;
    use crate::ledger::TicketLedger;
    use crate::registrar::BatchRegistrar;
    use chrono::Duration;
    use tempfile::tempdir;

    async fn setup(dir: &tempfile::TempDir) -> Storage {
        let storage = Storage::new(&dir.path().join("game.db")).await.unwrap();
        GameCatalog::new(&storage)
            .register("001", "Scratch", 5, 2)
            .await
            .unwrap();
        BatchRegistrar::new(&storage)
            .register_batch("001", "0000001", None)
            .await
            .unwrap();
        storage
    }

    #[tokio::test]
    async fn scratch_scenario() {
        let dir = tempdir().unwrap();
        let storage = setup(&dir).await;
        let ledger = TicketLedger::new(&storage);
        let engine = SalesReportEngine::new(&storage);

        for _ in 0..3 {
            ledger.sell("001", "0000001").await.unwrap();
        }

        let report = engine.report(None, None).await.unwrap();
        let sales = &report["001"];
        assert_eq!(sales.name, "Scratch");
        assert_eq!(sales.on_sale, 2);
        assert_eq!(sales.sold, 3);
        assert_eq!(sales.revenue(), 6);
    }

    #[tokio::test]
    async fn counts_partition_the_tickets_created_up_to_now() {
        let dir = tempdir().unwrap();
        let storage = setup(&dir).await;
        let ledger = TicketLedger::new(&storage);
        let engine = SalesReportEngine::new(&storage);

        ledger.sell("001", "0000001").await.unwrap();
        ledger.sell("001", "0000001").await.unwrap();

        // Full window: on_sale + sold covers every ticket created so far
        let report = engine.report(None, None).await.unwrap();
        let sales = &report["001"];
        assert_eq!(sales.on_sale + sales.sold, 5);
    }

    #[tokio::test]
    async fn window_excludes_sales_outside_it() {
        let dir = tempdir().unwrap();
        let storage = setup(&dir).await;
        let ledger = TicketLedger::new(&storage);
        let engine = SalesReportEngine::new(&storage);

        for _ in 0..3 {
            ledger.sell("001", "0000001").await.unwrap();
        }

        // A window opening in the future sees the stock but none of the sales
        let future = Utc::now() + Duration::hours(1);
        let report = engine
            .report(Some(future), Some(future + Duration::hours(1)))
            .await
            .unwrap();
        let sales = &report["001"];
        assert_eq!(sales.on_sale, 2);
        assert_eq!(sales.sold, 0);
        assert_eq!(sales.revenue(), 0);
    }

    #[tokio::test]
    async fn tickets_created_after_the_window_are_invisible() {
        let dir = tempdir().unwrap();
        let storage = setup(&dir).await;
        let engine = SalesReportEngine::new(&storage);

        let past = Utc::now() - Duration::days(1);
        let report = engine.report(None, Some(past)).await.unwrap();
        assert!(report.is_empty());
    }

    #[tokio::test]
    async fn removed_games_leave_no_entry() {
        let dir = tempdir().unwrap();
        let storage = setup(&dir).await;
        let catalog = GameCatalog::new(&storage);
        let engine = SalesReportEngine::new(&storage);

        catalog.remove_game("001").await.unwrap();
        let report = engine.report(None, None).await.unwrap();
        assert!(report.get("001").is_none());
    }

    #[tokio::test]
    async fn revenue_matches_per_ticket_sums() {
        let dir = tempdir().unwrap();
        let storage = setup(&dir).await;
        let catalog = GameCatalog::new(&storage);
        let registrar = BatchRegistrar::new(&storage);
        let ledger = TicketLedger::new(&storage);
        let engine = SalesReportEngine::new(&storage);

        catalog.register("002", "Bingo", 3, 7).await.unwrap();
        registrar.register_batch("002", "0000001", None).await.unwrap();

        ledger.sell("001", "0000001").await.unwrap();
        ledger.sell("002", "0000001").await.unwrap();
        ledger.sell("002", "0000001").await.unwrap();

        let report = engine.report(None, None).await.unwrap();

        let mut per_ticket = 0u64;
        for ticket in ledger.list_tickets().await.unwrap() {
            if ticket.status == crate::types::TicketStatus::Sold {
                let game = catalog.lookup(&ticket.game_id).await.unwrap().unwrap();
                per_ticket += game.price_per_ticket;
            }
        }

        let reported: u64 = report.values().map(|s| s.revenue()).sum();
        assert_eq!(reported, per_ticket);
        assert_eq!(report["001"].revenue(), 2);
        assert_eq!(report["002"].revenue(), 14);
    }
}
