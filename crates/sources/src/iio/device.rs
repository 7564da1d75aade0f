//! Scan buffer sources
//!
//! The acquisition loop only needs "wait until a record is ready" and "read
//! one record". [`IioCharDevice`] provides both on top of the IIO character
//! device; tests substitute their own [`ScanSource`].

use iio_sens_types::DeviceDescriptor;
use std::fs::{File, OpenOptions};
use std::io::{self, Read};
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::io::AsRawFd;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Source of raw scan records
pub trait ScanSource: Send {
    /// Block until a record can be read or `timeout` elapses
    ///
    /// Returns `Ok(false)` on timeout.
    fn wait_readable(&mut self, timeout: Duration) -> io::Result<bool>;

    /// Read one record into `buf`, returning the number of bytes read
    ///
    /// Returns `Ok(0)` when nothing is pending.
    fn read_record(&mut self, buf: &mut [u8]) -> io::Result<usize>;
}

pub type BoxedScanSource = Box<dyn ScanSource>;

/// Non-blocking handle on `/dev/iio:deviceN`
#[derive(Debug)]
pub struct IioCharDevice {
    file: File,
    path: PathBuf,
}

impl IioCharDevice {
    pub fn open(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .custom_flags(libc::O_NONBLOCK)
            .open(path)?;
        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ScanSource for IioCharDevice {
    fn wait_readable(&mut self, timeout: Duration) -> io::Result<bool> {
        let mut pfd = libc::pollfd {
            fd: self.file.as_raw_fd(),
            events: libc::POLLIN,
            revents: 0,
        };
        let timeout_ms = timeout.as_millis().min(libc::c_int::MAX as u128) as libc::c_int;

        // SAFETY: pfd is a valid pollfd for the duration of the call and the count is 1
        let ret = unsafe { libc::poll(&mut pfd, 1, timeout_ms) };
        if ret < 0 {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::Interrupted {
                return Ok(false);
            }
            return Err(err);
        }
        if ret == 0 {
            return Ok(false);
        }
        if pfd.revents & (libc::POLLERR | libc::POLLNVAL) != 0 {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                format!("poll reported {:#x} on {}", pfd.revents, self.path.display()),
            ));
        }
        Ok(pfd.revents & libc::POLLIN != 0)
    }

    fn read_record(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.file.read(buf) {
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(0),
            other => other,
        }
    }
}

/// Default scan source: the device's character device
pub fn open_char_device(device: &DeviceDescriptor) -> io::Result<BoxedScanSource> {
    let source = IioCharDevice::open(&device.dev_path)?;
    log::debug!("Opened scan buffer {}", source.path().display());
    Ok(Box::new(source))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_regular_file_reads_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("iio:device0");
        fs::write(&path, [1u8, 2, 3, 4, 5, 6, 7, 8]).unwrap();

        let mut device = IioCharDevice::open(&path).unwrap();
        assert!(device.wait_readable(Duration::from_millis(10)).unwrap());

        let mut buf = [0u8; 4];
        assert_eq!(device.read_record(&mut buf).unwrap(), 4);
        assert_eq!(buf, [1, 2, 3, 4]);
        assert_eq!(device.read_record(&mut buf).unwrap(), 4);
        assert_eq!(buf, [5, 6, 7, 8]);
        assert_eq!(device.read_record(&mut buf).unwrap(), 0);
    }

    #[test]
    fn test_open_missing_device_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(IioCharDevice::open(&dir.path().join("iio:device9")).is_err());
    }
}
