//! Process-group helpers for reliable child process cleanup.
//!
//! Every command the agent launches runs in its own session so that shell
//! pipelines and their grandchildren can be signalled as one unit:
//! - `detach_from_tty` runs in `pre_exec` and starts a new session (the child
//!   becomes its own process-group leader and loses the controlling TTY).
//! - `set_parent_death_signal` (Linux only) arranges for the child to receive
//!   `SIGTERM` if the agent dies without cleaning up.
//! - `signal_process_group` delivers a signal to the whole group.
//!
//! On non-Unix platforms these helpers are no-ops.

use std::io;

use tokio::process::Command;

/// Signal to send to a process group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum KillSignal {
    /// SIGTERM - allows graceful shutdown
    #[default]
    Term,
    /// SIGKILL - immediate termination
    Kill,
}

#[cfg(unix)]
impl KillSignal {
    fn as_libc_signal(self) -> libc::c_int {
        match self {
            KillSignal::Term => libc::SIGTERM,
            KillSignal::Kill => libc::SIGKILL,
        }
    }
}

/// Ensure the child receives SIGTERM when the original parent dies.
///
/// Must run in `pre_exec`. `parent_pid` is captured before spawn so a parent
/// that exits between fork and exec is still noticed.
#[cfg(target_os = "linux")]
pub fn set_parent_death_signal(parent_pid: libc::pid_t) -> io::Result<()> {
    if unsafe { libc::prctl(libc::PR_SET_PDEATHSIG, libc::SIGTERM) } == -1 {
        return Err(io::Error::last_os_error());
    }

    if unsafe { libc::getppid() } != parent_pid {
        unsafe {
            libc::raise(libc::SIGTERM);
        }
    }

    Ok(())
}

/// Start a new session so the child leads its own process group.
#[cfg(unix)]
pub fn detach_from_tty() -> io::Result<()> {
    if unsafe { libc::setsid() } == -1 {
        let err = io::Error::last_os_error();
        // EPERM: already a session leader, a fresh group is enough
        if err.raw_os_error() == Some(libc::EPERM) {
            if unsafe { libc::setpgid(0, 0) } == -1 {
                return Err(io::Error::last_os_error());
            }
            return Ok(());
        }
        return Err(err);
    }
    Ok(())
}

/// Install the session/death-signal hooks on a command before spawning it.
pub fn isolate_command(command: &mut Command) {
    #[cfg(target_os = "linux")]
    let parent_pid = unsafe { libc::getpid() };

    #[cfg(unix)]
    unsafe {
        command.pre_exec(move || {
            detach_from_tty()?;
            #[cfg(target_os = "linux")]
            set_parent_death_signal(parent_pid)?;
            Ok(())
        });
    }

    #[cfg(not(unix))]
    let _ = command;
}

/// Send `signal` to the process group led by `pid` (best-effort).
///
/// A group that no longer exists is not an error.
#[cfg(unix)]
pub fn signal_process_group(pid: u32, signal: KillSignal) -> io::Result<()> {
    let Ok(raw_pid) = libc::pid_t::try_from(pid) else {
        return Err(io::Error::new(io::ErrorKind::InvalidInput, "pid out of range"));
    };

    let pgid = unsafe { libc::getpgid(raw_pid) };
    if pgid == -1 {
        let err = io::Error::last_os_error();
        if err.raw_os_error() == Some(libc::ESRCH) {
            return Ok(());
        }
        return Err(err);
    }

    if unsafe { libc::killpg(pgid, signal.as_libc_signal()) } == -1 {
        let err = io::Error::last_os_error();
        if err.raw_os_error() != Some(libc::ESRCH) {
            return Err(err);
        }
    }

    Ok(())
}

#[cfg(not(unix))]
pub fn signal_process_group(_pid: u32, _signal: KillSignal) -> io::Result<()> {
    Ok(())
}

/// Exit code for a finished child; a signal death is reported as `-signal`.
pub fn exit_code_of(status: std::process::ExitStatus) -> Option<i32> {
    if let Some(code) = status.code() {
        return Some(code);
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        status.signal().map(|signal| -signal)
    }

    #[cfg(not(unix))]
    {
        None
    }
}
