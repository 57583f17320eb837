//! paperlot - Core library for tracking lottery-style paper game tickets
//!
//! This library provides the ticket lifecycle data model, atomic batch
//! registration, the sale state transition and the sales report engine on
//! top of a SQLite store.

pub mod catalog;
pub mod error;
pub mod ledger;
pub mod registrar;
pub mod report;
pub mod storage;
pub mod types;

pub use catalog::GameCatalog;
pub use error::{PaperlotError, Result};
pub use ledger::TicketLedger;
pub use registrar::BatchRegistrar;
pub use report::SalesReportEngine;
pub use storage::Storage;
pub use types::{GameSales, GameType, SalesReport, Ticket, TicketStatus};

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_full_ticket_lifecycle() {
        let temp_dir = tempdir().unwrap();
        let storage = Storage::new(&temp_dir.path().join("game.db")).await.unwrap();

        let catalog = GameCatalog::new(&storage);
        let registrar = BatchRegistrar::new(&storage);
        let ledger = TicketLedger::new(&storage);
        let engine = SalesReportEngine::new(&storage);

        catalog.register("001", "Scratch", 5, 2).await.unwrap();
        assert!(registrar.register_batch("001", "0000001", None).await.unwrap());

        let ticket = ledger.sell("001", "0000001").await.unwrap();
        assert_eq!(ticket.ticket_id, 0);
        assert_eq!(ticket.status, TicketStatus::Sold);

        let report = engine.report(None, None).await.unwrap();
        assert_eq!(report["001"].sold, 1);
        assert_eq!(report["001"].on_sale, 4);
    }
}
