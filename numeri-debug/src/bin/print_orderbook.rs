//! Order-book snapshot printer.
//!
//! Simple CLI tool that drives a local simulated feed for a few ticks and
//! prints the resulting book state once. Useful for debugging and CI
//! smoke checks.
//!
//! ## Usage
//!
//! ```bash
//! numeri-debug-print-orderbook --symbol BTC-USD --levels 10 --format json
//! ```

use anyhow::Result;
use clap::Parser;
use numeri_core::orderbook::OrderBook;
use numeri_core::snapshot::BookRegistry;
use numeri_debug::SimulatedFeed;
use serde_json::json;

#[derive(Parser)]
#[command(name = "print-orderbook", about = "Print a simulated order-book snapshot")]
struct Args {
    /// Symbol to simulate.
    #[arg(short, long, default_value = "BTC-USD")]
    symbol: String,

    /// Number of levels to display per side.
    #[arg(short, long, default_value = "5")]
    levels: usize,

    /// Output format (pretty, compact, json).
    #[arg(short, long, default_value = "pretty")]
    format: String,

    /// Number of simulated ticks to apply before printing.
    #[arg(long, default_value = "5")]
    ticks: u32,

    /// Starting mid price.
    #[arg(long, default_value = "50000.0")]
    start_mid: f64,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut feed = SimulatedFeed::new(&args.symbol, BookRegistry::new(), args.start_mid);
    for _ in 0..args.ticks.max(1) {
        feed.tick();
    }
    let book = feed.current();

    match args.format.as_str() {
        "json" => print_json(&book, args.levels),
        "compact" => print_compact(&book, args.levels),
        _ => print_pretty(&book, args.levels),
    }

    Ok(())
}

fn print_pretty(book: &OrderBook, max_levels: usize) {
    let bid = book.best_bid();
    let ask = book.best_ask();
    let mid = if bid > 0.0 && ask > 0.0 { (bid + ask) / 2.0 } else { 0.0 };
    let spread = if bid > 0.0 && ask > 0.0 { ask - bid } else { 0.0 };

    println!();
    println!("=== {} ORDER BOOK (version {}) ===", book.symbol(), book.version());
    println!("sequence: {}  depth: {}x{}", book.sequence(), book.bid_depth(), book.ask_depth());
    println!();

    println!("        ASKS        QTY       BAR");
    println!("    ============================================");
    let ask_levels = book.ask_levels();
    let max_qty = ask_levels
        .iter()
        .chain(book.bid_levels().iter())
        .map(|l| l.quantity)
        .fold(0.0f64, f64::max)
        .max(1.0);

    for level in ask_levels.iter().take(max_levels).rev() {
        println!(
            "    {:>10.2}   {:>7.4}  {}",
            level.price,
            level.quantity,
            bar(level.quantity, max_qty, 15)
        );
    }

    println!();
    println!("    MID: {mid:.2}  SPREAD: {spread:.2}");
    println!();

    println!("        BIDS        QTY       BAR");
    println!("    ============================================");
    for level in book.bid_levels().iter().take(max_levels) {
        println!(
            "    {:>10.2}   {:>7.4}  {}",
            level.price,
            level.quantity,
            bar(level.quantity, max_qty, 15)
        );
    }
    println!();
}

fn print_compact(book: &OrderBook, max_levels: usize) {
    let bid = book.best_bid();
    let ask = book.best_ask();
    let mid = if bid > 0.0 && ask > 0.0 { (bid + ask) / 2.0 } else { 0.0 };
    print!("{}  mid: {mid:.2}  depth: {}x{}  [", book.symbol(), book.bid_depth(), book.ask_depth());
    for level in book.bid_levels().iter().take(max_levels) {
        print!("{:.2}@{:.3} ", level.price, level.quantity);
    }
    print!("| ");
    for level in book.ask_levels().iter().take(max_levels) {
        print!("{:.2}@{:.3} ", level.price, level.quantity);
    }
    println!("]");
}

fn print_json(book: &OrderBook, max_levels: usize) {
    let value = json!({
        "symbol": book.symbol(),
        "sequence": book.sequence(),
        "version": book.version(),
        "best_bid": book.best_bid(),
        "best_ask": book.best_ask(),
        "bids": book.bid_levels().into_iter().take(max_levels).collect::<Vec<_>>(),
        "asks": book.ask_levels().into_iter().take(max_levels).collect::<Vec<_>>(),
    });
    println!("{}", serde_json::to_string_pretty(&value).unwrap());
}

fn bar(qty: f64, max_qty: f64, width: usize) -> String {
    if max_qty <= 0.0 {
        return " ".repeat(width);
    }
    let filled = ((qty / max_qty) * width as f64) as usize;
    let filled = filled.min(width);
    let mut bar = String::with_capacity(width);
    for i in 0..width {
        bar.push(if i < filled { '#' } else { '.' });
    }
    bar
}
