//! Status line redrawn once a second while a turn runs in normal mode.

use std::io::{self, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use crossterm::{cursor, execute, style::Print, terminal};
use marauder_config::constants::ui::TICKER_INTERVAL_MS;
use marauder_core::utils::colors::style;
use marauder_core::utils::tokens::fmt_tokens;
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Counters the turn writes and the ticker reads.
#[derive(Debug)]
pub struct TickerState {
    started: Instant,
    actions: AtomicUsize,
    tokens: AtomicU64,
    phase: Mutex<String>,
}

impl TickerState {
    pub fn new(started: Instant) -> Self {
        Self {
            started,
            actions: AtomicUsize::new(0),
            tokens: AtomicU64::new(0),
            phase: Mutex::new("thinking".to_owned()),
        }
    }

    pub fn record_action(&self) {
        self.actions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn set_tokens(&self, tokens: u64) {
        self.tokens.store(tokens, Ordering::Relaxed);
    }

    pub fn set_phase(&self, phase: impl Into<String>) {
        *self.phase.lock() = phase.into();
    }

    pub fn status_line(&self) -> String {
        let phase = self.phase.lock().clone();
        format_status(
            self.started.elapsed(),
            self.actions.load(Ordering::Relaxed),
            self.tokens.load(Ordering::Relaxed),
            &phase,
        )
    }
}

pub fn format_status(elapsed: Duration, actions: usize, tokens: u64, phase: &str) -> String {
    format!(
        "  ⚡ Marauder is working  ({:.0}s • {} actions • {} tokens • {})",
        elapsed.as_secs_f64(),
        actions,
        fmt_tokens(tokens),
        phase
    )
}

/// Periodic redraw task driven by one cancellation token.
pub struct StatusTicker {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl StatusTicker {
    pub fn start(state: Arc<TickerState>, color: bool) -> Self {
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_millis(TICKER_INTERVAL_MS));
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = interval.tick() => {
                        let line = style(state.status_line()).cyan().render(color);
                        if let Err(err) = draw_status(&line) {
                            debug!(error = %err, "status redraw failed");
                        }
                    }
                }
            }
            if let Err(err) = clear_status() {
                debug!(error = %err, "status clear failed");
            }
        });
        Self { cancel, handle }
    }

    /// Cancel the task and wait until the line is cleared.
    pub async fn stop(self) {
        self.cancel.cancel();
        if let Err(err) = self.handle.await {
            debug!(error = %err, "status ticker task ended abnormally");
        }
    }
}

fn draw_status(line: &str) -> io::Result<()> {
    let mut stdout = io::stdout();
    execute!(
        stdout,
        cursor::MoveToColumn(0),
        terminal::Clear(terminal::ClearType::CurrentLine),
        Print(line)
    )?;
    stdout.flush()
}

/// Wipe the status line so regular output starts at column zero.
pub fn clear_status() -> io::Result<()> {
    let mut stdout = io::stdout();
    execute!(
        stdout,
        cursor::MoveToColumn(0),
        terminal::Clear(terminal::ClearType::CurrentLine)
    )?;
    stdout.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn status_line_format() {
        assert_eq!(
            format_status(Duration::from_millis(12_400), 3, 4_560, "reading src/main.rs"),
            "  ⚡ Marauder is working  (12s • 3 actions • 4.6k tokens • reading src/main.rs)"
        );
    }

    #[test]
    fn state_reflects_updates() {
        let state = TickerState::new(Instant::now());
        state.record_action();
        state.record_action();
        state.set_tokens(812);
        state.set_phase("waiting for API...");

        let line = state.status_line();
        assert!(line.contains("2 actions"), "{line}");
        assert!(line.contains("812 tokens"), "{line}");
        assert!(line.ends_with("waiting for API...)"), "{line}");
    }

    #[tokio::test]
    async fn stop_joins_the_task() {
        let state = Arc::new(TickerState::new(Instant::now()));
        let ticker = StatusTicker::start(Arc::clone(&state), false);
        tokio::time::sleep(Duration::from_millis(20)).await;
        ticker.stop().await;
        assert_eq!(Arc::strong_count(&state), 1);
    }
}
