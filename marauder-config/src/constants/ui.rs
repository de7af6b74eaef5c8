pub const TICKER_INTERVAL_MS: u64 = 1_000;
pub const CONTEXT_BAR_WIDTH: usize = 20;
/// Below this fraction the context bar is green.
pub const CONTEXT_BAR_OK: f64 = 0.5;
/// Below this fraction the context bar is yellow, otherwise red.
pub const CONTEXT_BAR_WARN: f64 = 0.8;

pub const MAX_DISPLAY_LINES: usize = 30;
pub const MAX_DISPLAY_ENTRIES: usize = 40;
pub const MAX_REASONING_DISPLAY_CHARS: usize = 500;
pub const TOOL_SUMMARY_COMMAND_CHARS: usize = 60;
pub const PHASE_COMMAND_CHARS: usize = 30;
