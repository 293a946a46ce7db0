//! Walkthrough of the list controller against the in-memory authority.
//!
//! Run with: cargo run --example demo
//!
//! Logs go to `productlist-demo.log`.

use std::fs::File;
use std::sync::Arc;

use log::LevelFilter;
use productlist_lib::config::ControllerConfig;
use productlist_lib::controller::ListController;
use productlist_lib::model::Column;
use productlist_lib::observe::SyncStats;
use productlist_lib::selection::InMemoryAuthority;
use productlist_lib::source::RawRow;
use productlist_lib::view::ViewState;
use simplelog::{Config, WriteLogger};

const PRODUCTS: &[(&str, &str, Option<f64>)] = &[
    ("P-100", "Espresso machine", Some(349.0)),
    ("P-101", "éclair mould", Some(12.5)),
    ("P-102", "Burr grinder", Some(129.0)),
    ("P-103", "Milk jug", None),
    ("P-104", "Tamper", Some(24.0)),
];

fn snapshot() -> Vec<RawRow> {
    PRODUCTS
        .iter()
        .map(|(sku, name, price)| RawRow::new(*sku).field("name", *name).field("price", *price))
        .collect()
}

fn print_view(title: &str, view: &ViewState) {
    println!("== {}", title);
    let Some(model) = view.view_model() else {
        println!("   ({:?})", view);
        return;
    };
    for row in &model.visible_rows {
        let name = row.fields.get("name").map(|v| v.to_string()).unwrap_or_default();
        let price = row.fields.get("price").map(|v| v.to_string()).unwrap_or_default();
        let mark = if row.selected { "[x]" } else { "[ ]" };
        println!("   {} {:6} {:20} {:>8}", mark, row.identity, name, price);
    }
    println!(
        "   page {}/{} (rows {}-{} of {}), {} selected{}",
        model.pagination.page_index + 1,
        model.pagination.total_pages,
        model.pagination.range_start,
        model.pagination.range_end,
        model.pagination.total_rows,
        model.selection_summary.count,
        if model.selection_summary.all_selected { " (all)" } else { "" },
    );
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Ok(log_file) = File::create("productlist-demo.log") {
        let _ = WriteLogger::init(LevelFilter::Trace, Config::default(), log_file);
    }

    let config = ControllerConfig::default()
        .with_columns(vec![Column::text("name", "Name"), Column::number("price", "Price")])
        .with_page_sizes(vec![2, 3, 5])
        .with_default_page_size(3);
    let authority = Arc::new(InMemoryAuthority::new());
    let stats = Arc::new(SyncStats::new());
    let mut list = ListController::new(config, authority.clone())?.with_observer(stats.clone());

    print_view("initial snapshot", list.refresh(snapshot()));
    print_view("select P-102", list.toggle("P-102"));
    print_view("sort by price", list.sort_by("price")?);
    print_view("next page", list.next_page());
    print_view("sort by name, descending", {
        list.sort_by("name")?;
        list.sort_by("name")?
    });

    let mut shrunk = snapshot();
    shrunk.truncate(2);
    print_view("refresh with two rows", list.refresh(shrunk));
    print_view("select all", list.toggle_all());

    list.flush().await;
    let committed: Vec<String> = authority
        .selected_identities()
        .iter()
        .map(|id| id.to_string())
        .collect();
    println!("\nauthority holds: {}", committed.join(", "));
    println!("sync counters: {:?}", stats.snapshot());

    Ok(())
}
