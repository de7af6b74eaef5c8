//! Shell execution for the Marauder agent.
//!
//! Two entry points: [`ShellExecutor`] runs one-shot commands under a hard
//! timeout, and [`BackgroundSupervisor`] keeps long-running processes alive
//! with a bounded output buffer per process. Both put children in their own
//! process group so a whole pipeline can be signalled at once.

pub mod background;
pub mod output_buffer;
pub mod process_group;
pub mod shell;
pub mod stream;

pub use background::{
    BackgroundError, BackgroundSupervisor, MAX_STARTUP_WAIT, ProcessReport, ProcessState,
    ProcessSummary, REPORT_TAIL_LINES, STOP_GRACE_PERIOD, StartReport, StopOutcome,
};
pub use output_buffer::{OUTPUT_BUFFER_HARD_CAP, OUTPUT_BUFFER_RETAIN, OutputBuffer};
pub use shell::{
    CommandOutput, DEFAULT_COMMAND_TIMEOUT, DEFAULT_OUTPUT_LIMIT_CHARS, ShellError, ShellExecutor,
    cap_head_tail,
};
