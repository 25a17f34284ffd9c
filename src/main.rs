use anyhow::{Context, Result};
use clap::Parser;

use delimit::cli::{CliArgs, Startup};
use delimit::config::AppConfig;
use delimit::session;
use delimit::table::TableStore;
use delimit::view::{compute_view, View};

/// Narrowest a column renders
const MIN_COLUMN_WIDTH: usize = 4;
/// Widest a column renders before content is cut
const MAX_COLUMN_WIDTH: usize = 40;
/// Rows sampled when deriving column widths
const WIDTH_SAMPLE_ROWS: usize = 100;

fn main() -> Result<()> {
    delimit::tracing::init();

    let args = CliArgs::parse();
    let config = AppConfig::load();
    if delimit::config_paths::config_file().is_some_and(|p| !p.exists()) {
        // First run: materialize the defaults so they can be edited
        if let Err(e) = config.save() {
            tracing::warn!("could not write default config: {}", e);
        }
    }

    let opened = match args.startup(config.reopen_last_file) {
        Startup::Open(path) => Some((path, true)),
        Startup::RestoreLast => session::last_file().map(|path| (path, false)),
        Startup::Empty => None,
    };

    let Some((path, explicit)) = opened else {
        println!("No file to open. Pass a path: delimit <FILE>");
        return Ok(());
    };

    let store = TableStore::open(&path, config.save_policy)
        .with_context(|| format!("failed to open {}", path.display()))?;
    tracing::debug!("save policy: {:?}", store.policy());
    if explicit {
        session::remember(&path);
    }

    let view = compute_view(
        store.table(),
        args.query.as_deref().unwrap_or(""),
        args.sort.as_deref(),
    );
    print_grid(store.table().headers(), &view);

    tracing::info!(
        "displayed {} of {} rows from {}",
        view.len(),
        store.table().len(),
        path.display()
    );
    Ok(())
}

/// Render the view as an aligned plain-text grid
fn print_grid(headers: &[String], view: &View) {
    if headers.is_empty() {
        println!("(empty file)");
        return;
    }

    let widths = column_widths(headers, view);

    println!("{}", format_row(headers, &widths));
    println!(
        "{}",
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("-+-")
    );
    for (_, row) in view.iter() {
        println!("{}", format_row(row, &widths));
    }
}

/// Column widths derived from content over a bounded row prefix, clamped
fn column_widths(headers: &[String], view: &View) -> Vec<usize> {
    let mut widths: Vec<usize> = headers
        .iter()
        .map(|h| h.chars().count().clamp(MIN_COLUMN_WIDTH, MAX_COLUMN_WIDTH))
        .collect();

    for (_, row) in view.iter().take(WIDTH_SAMPLE_ROWS) {
        for (col, cell) in row.iter().enumerate() {
            if col < widths.len() {
                widths[col] = widths[col].max(cell.chars().count()).min(MAX_COLUMN_WIDTH);
            }
        }
    }

    widths
}

fn format_row<S: AsRef<str>>(cells: &[S], widths: &[usize]) -> String {
    cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| fit(cell.as_ref(), *width))
        .collect::<Vec<_>>()
        .join(" | ")
}

/// Cut or pad a cell to exactly `width` characters
fn fit(cell: &str, width: usize) -> String {
    let mut out: String = cell.chars().take(width).collect();
    let padding = width.saturating_sub(out.chars().count());
    out.extend(std::iter::repeat(' ').take(padding));
    out
}
