//! The context bar printed before each prompt.

use marauder_config::constants::ui::{CONTEXT_BAR_OK, CONTEXT_BAR_WARN, CONTEXT_BAR_WIDTH};
use marauder_core::utils::colors::style;

pub const SYMBOL_FILLED: char = '█';
pub const SYMBOL_FREE: char = '░';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextLevel {
    Ok,
    Warn,
    Critical,
}

impl ContextLevel {
    pub fn for_fraction(fraction: f64) -> Self {
        if fraction < CONTEXT_BAR_OK {
            ContextLevel::Ok
        } else if fraction < CONTEXT_BAR_WARN {
            ContextLevel::Warn
        } else {
            ContextLevel::Critical
        }
    }
}

/// `used / limit`, capped at 1. Zero when the limit is unknown.
pub fn context_fraction(used: u64, limit: u64) -> f64 {
    if limit == 0 {
        return 0.0;
    }
    (used as f64 / limit as f64).min(1.0)
}

/// Filled cell count, level and label for the bar, or `None` when there is
/// nothing to show.
pub fn context_bar_parts(used: u64, limit: u64) -> Option<(usize, ContextLevel, String)> {
    if used == 0 && limit == 0 {
        return None;
    }

    let fraction = context_fraction(used, limit);
    let filled = ((fraction * CONTEXT_BAR_WIDTH as f64) as usize).min(CONTEXT_BAR_WIDTH);
    let label = format!(
        "{:.1}k / {:.0}k ({:.0}%)",
        used as f64 / 1_000.0,
        limit as f64 / 1_000.0,
        fraction * 100.0
    );
    Some((filled, ContextLevel::for_fraction(fraction), label))
}

/// `  ctx [bar] 12.3k / 128k (10%)`; the filled cells are colored by how
/// full the window is.
pub fn render_context_bar(used: u64, limit: u64, color: bool) -> Option<String> {
    let (filled, level, label) = context_bar_parts(used, limit)?;
    let filled_cells: String = std::iter::repeat_n(SYMBOL_FILLED, filled).collect();
    let free_cells: String = std::iter::repeat_n(SYMBOL_FREE, CONTEXT_BAR_WIDTH - filled).collect();
    let filled_cells = match level {
        ContextLevel::Ok => style(filled_cells).green(),
        ContextLevel::Warn => style(filled_cells).yellow(),
        ContextLevel::Critical => style(filled_cells).red(),
    };
    Some(format!(
        "  ctx [{}{}] {}",
        filled_cells.render(color),
        style(free_cells).dimmed().render(color),
        label
    ))
}
