//! Deadline-bounded stdin reader for `--event-stdin`.
//!
//! Input ends at a line equal to the sentinel (after trimming), at end of
//! stream, or when the deadline passes. On timeout whatever was read so far is
//! discarded and an empty string is returned, which the caller reports as an
//! empty event.

use std::io::{self, BufRead};
use std::time::Duration;
#[cfg(unix)]
use std::time::Instant;
use tracing::{debug, warn};

/// Collect lines from `reader` until the sentinel line or EOF.
/// The sentinel line itself is not included.
pub fn read_until_sentinel<R: BufRead>(reader: R, sentinel: &str) -> io::Result<String> {
    let mut out = String::new();
    for line in reader.lines() {
        let line = line?;
        if !sentinel.is_empty() && line.trim() == sentinel {
            break;
        }
        out.push_str(&line);
        out.push('\n');
    }
    Ok(out)
}

/// Read the process's stdin, giving up after `timeout`.
#[cfg(unix)]
pub fn read_stdin_with_timeout(timeout: Duration, sentinel: &str) -> io::Result<String> {
    read_fd_with_timeout(libc::STDIN_FILENO, timeout, sentinel)
}

/// Deadline-bounded read of `fd`. The descriptor is borrowed, never closed.
#[cfg(unix)]
fn read_fd_with_timeout(fd: libc::c_int, timeout: Duration, sentinel: &str) -> io::Result<String> {
    use std::fs::File;
    use std::io::Read;
    use std::mem::ManuallyDrop;
    use std::os::unix::io::FromRawFd;

    let deadline = Instant::now() + timeout;
    // Unbuffered reads straight from the descriptor so poll() sees every unread byte.
    // ManuallyDrop keeps the descriptor open when this function returns.
    // SAFETY: the caller guarantees `fd` stays open for the duration of the call.
    let mut input = ManuallyDrop::new(unsafe { File::from_raw_fd(fd) });

    let mut pending: Vec<u8> = Vec::new();
    let mut collected = String::new();
    let mut buf = [0u8; 4096];

    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() || !wait_readable(fd, remaining)? {
            warn!(timeout_secs = timeout.as_secs(), "Timed out waiting for event on stdin");
            return Ok(String::new());
        }

        let n = match input.read(&mut buf) {
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        if n == 0 {
            // EOF: flush a final unterminated line.
            let tail = String::from_utf8_lossy(&pending).into_owned();
            if !(tail.trim() == sentinel && !sentinel.is_empty()) {
                collected.push_str(&tail);
            }
            debug!(bytes = collected.len(), "stdin closed");
            return Ok(collected);
        }

        pending.extend_from_slice(&buf[..n]);
        while let Some(pos) = pending.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = pending.drain(..=pos).collect();
            let text = String::from_utf8_lossy(&line);
            if !sentinel.is_empty() && text.trim() == sentinel {
                debug!(bytes = collected.len(), "Sentinel received");
                return Ok(collected);
            }
            collected.push_str(&text);
        }
    }
}

/// poll(2) a single descriptor for readability. `Ok(false)` on timeout.
#[cfg(unix)]
fn wait_readable(fd: libc::c_int, timeout: Duration) -> io::Result<bool> {
    let millis = timeout.as_millis().clamp(1, libc::c_int::MAX as u128) as libc::c_int;
    let mut pfd = libc::pollfd {
        fd,
        events: libc::POLLIN,
        revents: 0,
    };
    loop {
        // SAFETY: pfd is a valid pollfd and nfds is 1.
        let rc = unsafe { libc::poll(&mut pfd, 1, millis) };
        if rc < 0 {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::Interrupted {
                continue;
            }
            return Err(err);
        }
        // POLLHUP also means a read will return (EOF), so treat it as ready.
        return Ok(rc > 0);
    }
}

/// Without poll(2) the read blocks until the sentinel or EOF; the timeout is not enforced.
#[cfg(not(unix))]
pub fn read_stdin_with_timeout(_timeout: Duration, sentinel: &str) -> io::Result<String> {
    let stdin = io::stdin();
    read_until_sentinel(stdin.lock(), sentinel)
}
