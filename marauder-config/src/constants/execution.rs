/// Tool rounds allowed in one turn before the engine gives up.
pub const MAX_TOOL_ROUNDS: usize = 50;

/// Tool output longer than this is cut before it enters history.
pub const MAX_TOOL_OUTPUT_CHARS: usize = 3_000;
pub const TOOL_OUTPUT_LINE_THRESHOLD: usize = 30;
pub const TOOL_OUTPUT_EDGE_LINES: usize = 15;

pub const DEFAULT_LIST_DEPTH: usize = 2;
pub const DEFAULT_BACKGROUND_WAIT_SECS: u64 = 5;
