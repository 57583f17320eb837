use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A configured game product: how many papers make up a batch and what one
/// paper costs (minor currency units).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameType {
    pub id: String,
    pub name: String,
    pub tickets_per_batch: u32,
    pub price_per_ticket: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TicketStatus {
    OnSale,
    Sold,
}

impl TicketStatus {
    /// Stable TEXT encoding used in the tickets table.
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::OnSale => "ON_SALE",
            TicketStatus::Sold => "SOLD",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ON_SALE" => Some(TicketStatus::OnSale),
            "SOLD" => Some(TicketStatus::Sold),
            _ => None,
        }
    }
}

/// One sellable paper. `(game_id, batch_id, ticket_id)` is the unique key;
/// `sold_at` is set exactly when the status becomes `Sold` and never cleared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    pub game_id: String,
    pub batch_id: String,
    pub ticket_id: i64,
    pub status: TicketStatus,
    pub created_at: DateTime<Utc>,
    pub sold_at: Option<DateTime<Utc>>,
}

/// Per-game aggregation row of a sales report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSales {
    pub name: String,
    pub price_per_ticket: u64,
    pub on_sale: u64,
    pub sold: u64,
}

impl GameSales {
    pub fn revenue(&self) -> u64 {
        self.sold * self.price_per_ticket
    }
}

/// Report output keyed by game id; BTreeMap keeps the listing order stable.
pub type SalesReport = BTreeMap<String, GameSales>;
