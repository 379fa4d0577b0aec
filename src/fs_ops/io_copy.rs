//! Streaming copy used by the cross-device fallback.
//!
//! - The destination is created with `create_new`, so an existing file is never clobbered.
//! - 1 MiB buffers keep the syscall count low for large FLAC/WAV files.
//! - The destination is fsynced before returning; the caller syncs the
//!   directory after the final rename.
//! - On Linux `copy_file_range` is tried first and the buffered loop is the fallback.

use std::fs::{File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;

const BUF_SIZE: usize = 1024 * 1024;

/// Copy `src` into a new file at `dst`. Returns the number of bytes written.
pub(super) fn copy_streaming(src: &Path, dst: &Path) -> io::Result<u64> {
    let src_f = File::open(src)?;
    let dst_f = OpenOptions::new().write(true).create_new(true).open(dst)?;

    #[cfg(target_os = "linux")]
    if let Some(bytes) = copy_in_kernel(&src_f, &dst_f)? {
        dst_f.sync_all()?;
        return Ok(bytes);
    }

    let mut reader = BufReader::with_capacity(BUF_SIZE, src_f);
    let mut writer = BufWriter::with_capacity(BUF_SIZE, dst_f);
    let bytes = io::copy(&mut reader, &mut writer)?;
    writer.flush()?;
    writer.get_ref().sync_all()?;
    Ok(bytes)
}

/// `Ok(None)` means the kernel refused before copying anything and the
/// buffered path should be used instead.
#[cfg(target_os = "linux")]
fn copy_in_kernel(src: &File, dst: &File) -> io::Result<Option<u64>> {
    use std::os::unix::io::AsRawFd;

    const CHUNK: usize = 16 * 1024 * 1024;
    let mut total: u64 = 0;
    loop {
        // SAFETY: both descriptors are open for the duration of the call and
        // null offsets make the kernel use (and advance) the file positions.
        let rc = unsafe {
            libc::copy_file_range(
                src.as_raw_fd(),
                std::ptr::null_mut(),
                dst.as_raw_fd(),
                std::ptr::null_mut(),
                CHUNK,
                0,
            )
        };
        match rc {
            0 => return Ok(Some(total)),
            n if n > 0 => total += n as u64,
            _ => {
                let err = io::Error::last_os_error();
                let unsupported = matches!(
                    err.raw_os_error(),
                    Some(libc::EXDEV | libc::ENOSYS | libc::EINVAL | libc::EPERM | libc::EOPNOTSUPP)
                );
                if total == 0 && unsupported {
                    return Ok(None);
                }
                return Err(err);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn copies_small_file() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("a.flac");
        let dst = dir.path().join("b.flac");
        fs::write(&src, b"fLaC data").unwrap();
        assert_eq!(copy_streaming(&src, &dst).unwrap(), 9);
        assert_eq!(fs::read(&dst).unwrap(), b"fLaC data");
    }

    #[test]
    fn copies_empty_file() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("empty");
        let dst = dir.path().join("out");
        File::create(&src).unwrap();
        assert_eq!(copy_streaming(&src, &dst).unwrap(), 0);
        assert_eq!(fs::metadata(&dst).unwrap().len(), 0);
    }

    #[test]
    fn refuses_existing_destination() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("src");
        let dst = dir.path().join("dst");
        fs::write(&src, b"new").unwrap();
        fs::write(&dst, b"old").unwrap();
        let err = copy_streaming(&src, &dst).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
        assert_eq!(fs::read(&dst).unwrap(), b"old");
    }

    #[test]
    fn copies_across_buffer_boundaries() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("big.wav");
        let dst = dir.path().join("big.out");
        let data: Vec<u8> = (0..2 * BUF_SIZE + 123).map(|i| (i % 251) as u8).collect();
        fs::write(&src, &data).unwrap();
        assert_eq!(copy_streaming(&src, &dst).unwrap() as usize, data.len());
        assert_eq!(fs::read(&dst).unwrap(), data);
    }
}
