//! Fixtures shared by the unit tests of this crate

use crate::iio::ScanSource;
use crossbeam::channel::{self, Receiver, RecvTimeoutError, Sender};
use iio_sens_core::EventSink;
use iio_sens_types::{IioPaths, SensorEvent};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};
use tempfile::TempDir;

/// `(name, scan index, type)` of a scan channel
pub type ChannelSpec = (&'static str, u8, &'static str);

/// Three 64-bit data axes plus the timestamp, as exposed by the virtual motion drivers
pub fn motion_channels(prefix: &str) -> Vec<ChannelSpec> {
    let names: [&'static str; 3] = match prefix {
        "accel" => ["in_accel_x", "in_accel_y", "in_accel_z"],
        "anglvel" => ["in_anglvel_x", "in_anglvel_y", "in_anglvel_z"],
        other => panic!("no channel set for {}", other),
    };
    let mut channels: Vec<ChannelSpec> = names
        .iter()
        .zip(0u8..)
        .map(|(name, index)| (*name, index, "le:s64/64>>0"))
        .collect();
    channels.push(("in_timestamp", 3, "le:s64/64>>0"));
    channels
}

/// Scan record for [`motion_channels`]
pub fn record_of(axes: &[i64; 3], timestamp: i64) -> Vec<u8> {
    axes.iter()
        .chain(std::iter::once(&timestamp))
        .flat_map(|v| v.to_le_bytes())
        .collect()
}

/// Fake IIO tree: `sys/` mirrors `/sys/bus/iio/devices`, `dev/` mirrors `/dev`
pub struct IioFixture {
    root: TempDir,
}

impl IioFixture {
    pub fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir(root.path().join("sys")).unwrap();
        fs::create_dir(root.path().join("dev")).unwrap();
        Self { root }
    }

    pub fn sysfs_root(&self) -> PathBuf {
        self.root.path().join("sys")
    }

    pub fn dev_root(&self) -> PathBuf {
        self.root.path().join("dev")
    }

    pub fn paths(&self) -> IioPaths {
        IioPaths {
            sysfs_root: self.sysfs_root(),
            dev_root: self.dev_root(),
        }
    }

    /// Create `iio:device<index>` and its character device
    ///
    /// The scale and sampling frequency attributes are named after the
    /// first channel's prefix (`in_accel_x` gives `in_accel_scale`).
    pub fn add_device(
        &self,
        index: u32,
        name: &str,
        frequencies: &str,
        scale: &str,
        channels: &[ChannelSpec],
    ) -> PathBuf {
        let dir = self.sysfs_root().join(format!("iio:device{}", index));
        let scan_dir = dir.join("scan_elements");
        fs::create_dir_all(&scan_dir).unwrap();
        fs::create_dir_all(dir.join("buffer")).unwrap();

        let prefix = channels
            .first()
            .and_then(|(channel, _, _)| channel.rsplit_once('_'))
            .map(|(prefix, _)| prefix)
            .unwrap_or("in");

        write(&dir, "name", name);
        write(&dir, "sampling_frequency_available", frequencies);
        write(&dir, &format!("{}_scale", prefix), scale);
        write(&dir, &format!("{}_sampling_frequency", prefix), "0");
        write(&dir, "buffer/enable", "0");

        for (channel, scan_index, scan_type) in channels {
            write(&scan_dir, &format!("{}_en", channel), "0");
            write(&scan_dir, &format!("{}_index", channel), &scan_index.to_string());
            write(&scan_dir, &format!("{}_type", channel), scan_type);
        }

        fs::write(self.dev_root().join(format!("iio:device{}", index)), b"").unwrap();
        dir
    }
}

fn write(dir: &Path, name: &str, value: &str) {
    fs::write(dir.join(name), format!("{}\n", value)).unwrap();
}

/// Sink collecting everything posted to it
#[derive(Default)]
pub struct RecordingSink {
    received: Mutex<Vec<(SensorEvent, bool)>>,
}

impl RecordingSink {
    pub fn received(&self) -> Vec<(SensorEvent, bool)> {
        self.received.lock().unwrap().clone()
    }

    pub fn events(&self) -> Vec<SensorEvent> {
        self.received().into_iter().map(|(event, _)| event).collect()
    }

    /// Wait until at least `count` events have arrived
    pub fn wait_for(&self, count: usize, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if self.received.lock().unwrap().len() >= count {
                return true;
            }
            thread::sleep(Duration::from_millis(5));
        }
        self.received.lock().unwrap().len() >= count
    }
}

impl EventSink for RecordingSink {
    fn post_events(&self, events: Vec<SensorEvent>, wake_up: bool) {
        let mut received = self.received.lock().unwrap();
        received.extend(events.into_iter().map(|event| (event, wake_up)));
    }
}

/// Scan source fed with whole records over a channel
pub struct ChannelScanSource {
    records: Receiver<Vec<u8>>,
    pending: Option<Vec<u8>>,
}

impl ChannelScanSource {
    pub fn new() -> (Self, Sender<Vec<u8>>) {
        let (tx, rx) = channel::unbounded();
        (
            Self {
                records: rx,
                pending: None,
            },
            tx,
        )
    }
}

impl ScanSource for ChannelScanSource {
    fn wait_readable(&mut self, timeout: Duration) -> io::Result<bool> {
        if self.pending.is_some() {
            return Ok(true);
        }
        match self.records.recv_timeout(timeout) {
            Ok(record) => {
                self.pending = Some(record);
                Ok(true)
            }
            Err(RecvTimeoutError::Timeout) => Ok(false),
            Err(RecvTimeoutError::Disconnected) => {
                thread::sleep(timeout);
                Ok(false)
            }
        }
    }

    fn read_record(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let Some(record) = self.pending.take() else {
            return Ok(0);
        };
        let n = record.len().min(buf.len());
        buf[..n].copy_from_slice(&record[..n]);
        Ok(n)
    }
}
