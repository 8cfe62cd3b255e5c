//! Real-time order-book terminal UI.
//!
//! Live visualization of one symbol's book: top-5 ladder, mid/spread
//! header, and a depth/imbalance panel, driven by
//! [`numeri_debug::SimulatedFeed`] since there is no live Kernel process
//! to attach to.
//!
//! ## Usage
//!
//! ```bash
//! numeri-debug-orderbook-tui --symbol BTC-USD
//! ```
//!
//! ## Keyboard controls
//!
//! - `q` or `Ctrl-C` - quit
//! - `p` - pause/resume
//! - `m` - toggle metrics panel

use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use numeri_core::orderbook::OrderBook;
use numeri_core::snapshot::BookRegistry;
use numeri_debug::SimulatedFeed;
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame, Terminal,
};

#[derive(Parser)]
#[command(name = "orderbook-tui", about = "Live terminal order-book viewer")]
struct Args {
    /// Symbol to watch (feeds a local simulated random walk).
    #[arg(short, long, default_value = "BTC-USD")]
    symbol: String,

    /// Starting mid price for the simulated feed.
    #[arg(long, default_value = "50000.0")]
    start_mid: f64,
}

struct App {
    feed: SimulatedFeed,
    paused: bool,
    show_metrics: bool,
}

impl App {
    fn new(symbol: &str, start_mid: f64) -> Self {
        Self {
            feed: SimulatedFeed::new(symbol, BookRegistry::new(), start_mid),
            paused: false,
            show_metrics: true,
        }
    }

    fn tick(&mut self) {
        if !self.paused {
            self.feed.tick();
        }
    }

    fn book(&self) -> Arc<OrderBook> {
        self.feed.current()
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &args);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = &result {
        println!("Error: {err:?}");
    }
    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    args: &Args,
) -> Result<()> {
    let mut app = App::new(&args.symbol, args.start_mid);
    let tick_rate = Duration::from_millis(200);
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|f| ui(f, &app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0));

        if crossterm::event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                    KeyCode::Char('p') => app.paused = !app.paused,
                    KeyCode::Char('m') => app.show_metrics = !app.show_metrics,
                    _ => {}
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            app.tick();
            last_tick = Instant::now();
        }
    }
}

fn ui(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(10),
            Constraint::Length(3),
        ])
        .split(f.area());

    render_header(f, chunks[0], app);
    render_orderbook(f, chunks[1], app);
    render_footer(f, chunks[2]);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let book = app.book();
    let bid = book.best_bid();
    let ask = book.best_ask();
    let mid = if bid > 0.0 && ask > 0.0 {
        (bid + ask) / 2.0
    } else {
        0.0
    };
    let spread = if bid > 0.0 && ask > 0.0 { ask - bid } else { 0.0 };

    let status = if app.paused { "PAUSED" } else { "LIVE" };
    let status_color = if app.paused { Color::Yellow } else { Color::Green };

    let title = Line::from(vec![
        Span::styled(
            "NUMERI ORDERBOOK VIEWER",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(" | {} | ", app.feed.symbol())),
        Span::styled(status, Style::default().fg(status_color).add_modifier(Modifier::BOLD)),
    ]);

    let info = Line::from(vec![
        Span::raw("Version: "),
        Span::styled(format!("{}", book.version()), Style::default().fg(Color::White)),
        Span::raw(" | Mid: $"),
        Span::styled(format!("{mid:.2}"), Style::default().fg(Color::Yellow)),
        Span::raw(" | Spread: "),
        Span::styled(format!("${spread:.2}"), Style::default().fg(Color::Magenta)),
    ]);

    let block = Block::default().borders(Borders::ALL);
    let paragraph = Paragraph::new(vec![title, info])
        .block(block)
        .alignment(Alignment::Center);
    f.render_widget(paragraph, area);
}

fn render_orderbook(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
        .split(area);

    render_ladder(f, chunks[0], app);
    if app.show_metrics {
        render_metrics(f, chunks[1], app);
    }
}

fn render_ladder(f: &mut Frame, area: Rect, app: &App) {
    let book = app.book();
    let ask_levels = book.ask_levels();
    let bid_levels = book.bid_levels();

    let max_qty = ask_levels
        .iter()
        .chain(bid_levels.iter())
        .map(|l| l.quantity)
        .fold(0.0f64, f64::max)
        .max(1.0);

    let mut items = Vec::new();
    for level in ask_levels.iter().take(5).rev() {
        items.push(ListItem::new(level_line(
            "ASK",
            Color::Red,
            level.price,
            level.quantity,
            max_qty,
        )));
    }

    let bid = book.best_bid();
    let ask = book.best_ask();
    let mid = if bid > 0.0 && ask > 0.0 { (bid + ask) / 2.0 } else { 0.0 };
    items.push(ListItem::new(Line::from(vec![
        Span::raw("───── "),
        Span::styled(
            format!("MID: ${mid:.2}"),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" ─────"),
    ])));

    for level in bid_levels.iter().take(5) {
        items.push(ListItem::new(level_line(
            "BID",
            Color::Green,
            level.price,
            level.quantity,
            max_qty,
        )));
    }

    let list = List::new(items).block(
        Block::default()
            .title("Order Book (Top 5 Levels)")
            .borders(Borders::ALL),
    );
    f.render_widget(list, area);
}

fn level_line(label: &str, color: Color, price: f64, qty: f64, max_qty: f64) -> Line<'static> {
    let bar = create_bar(qty, max_qty, 20);
    Line::from(vec![
        Span::styled(format!("{label} "), Style::default().fg(color)),
        Span::styled(
            format!("{price:>10.2}"),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(bar, Style::default().fg(color)),
        Span::raw("  "),
        Span::styled(format!("{qty:.4}"), Style::default().fg(Color::White)),
    ])
}

fn render_metrics(f: &mut Frame, area: Rect, app: &App) {
    let book = app.book();
    let bid_depth = book.bid_depth();
    let ask_depth = book.ask_depth();
    let imbalance = bid_depth as i64 - ask_depth as i64;

    let (imbalance_text, imbalance_color) = if imbalance > 2 {
        ("Buy Pressure ^", Color::Green)
    } else if imbalance < -2 {
        ("Sell Pressure v", Color::Red)
    } else {
        ("Balanced", Color::Yellow)
    };

    let text = vec![
        Line::from(Span::styled(
            "MARKET DEPTH",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(vec![
            Span::raw("Bid levels: "),
            Span::styled(format!("{bid_depth}"), Style::default().fg(Color::Green)),
        ]),
        Line::from(vec![
            Span::raw("Ask levels: "),
            Span::styled(format!("{ask_depth}"), Style::default().fg(Color::Red)),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            "IMBALANCE",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(imbalance_text, Style::default().fg(imbalance_color))),
        Line::from(""),
        Line::from(vec![
            Span::raw("Ticks: "),
            Span::styled(format!("{}", app.feed.tick_count()), Style::default().fg(Color::White)),
        ]),
    ];

    let paragraph = Paragraph::new(text)
        .block(Block::default().title("Metrics").borders(Borders::ALL))
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}

fn render_footer(f: &mut Frame, area: Rect) {
    let controls = Line::from(vec![
        Span::styled("Controls: ", Style::default().fg(Color::Cyan)),
        Span::raw("[Q]uit  [P]ause  [M]etrics"),
    ]);
    let paragraph = Paragraph::new(controls)
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Center);
    f.render_widget(paragraph, area);
}

fn create_bar(qty: f64, max_qty: f64, width: usize) -> String {
    if max_qty <= 0.0 {
        return " ".repeat(width);
    }
    let filled = ((qty / max_qty) * width as f64) as usize;
    let filled = filled.min(width);
    let mut bar = String::with_capacity(width);
    for i in 0..width {
        bar.push(if i < filled { '█' } else { '░' });
    }
    bar
}
