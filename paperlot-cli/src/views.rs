use comfy_table::{presets::UTF8_FULL, Table};
use paperlot_core::{GameType, SalesReport, Ticket};

pub fn render_games(games: &[GameType]) {
    if games.is_empty() {
        println!("No games registered.");
        return;
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Game", "Name", "Papers/batch", "Price/paper"]);
    for game in games {
        table.add_row(vec![
            game.id.clone(),
            game.name.clone(),
            game.tickets_per_batch.to_string(),
            game.price_per_ticket.to_string(),
        ]);
    }
    println!("{}", table);
}

pub fn render_tickets(tickets: &[Ticket]) {
    if tickets.is_empty() {
        println!("No papers registered.");
        return;
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Game", "Batch", "Paper", "Status", "Created", "Sold"]);
    for ticket in tickets {
        table.add_row(vec![
            ticket.game_id.clone(),
            ticket.batch_id.clone(),
            ticket.ticket_id.to_string(),
            ticket.status.as_str().to_string(),
            ticket.created_at.to_rfc3339(),
            ticket
                .sold_at
                .map(|d| d.to_rfc3339())
                .unwrap_or_else(|| "-".to_string()),
        ]);
    }
    println!("{}", table);
}

pub fn render_report(report: &SalesReport) {
    if report.is_empty() {
        println!("Nothing to report for this window.");
        return;
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Game", "Name", "Remains", "Sold", "Money"]);
    for (game_id, sales) in report {
        table.add_row(vec![
            game_id.clone(),
            sales.name.clone(),
            sales.on_sale.to_string(),
            sales.sold.to_string(),
            sales.revenue().to_string(),
        ]);
    }
    println!("{}", table);
}
