//! Driver settings.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(10_000);

/// libusb reads a zero timeout as "wait forever", so no transfer is given
/// less than this.
pub const MIN_TIMEOUT: Duration = Duration::from_millis(1);

/// Ids 0..=254 are the only valid pattern ids, so a well-behaved device
/// never lists more than this.
pub const DEFAULT_MAX_PATTERN_ENTRIES: usize = 255;

/// Which transport discovery opens the siren with.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BackendKind {
    /// OS HID driver via hidapi.
    Hid,
    /// Raw control transfers via libusb.
    Usb,
}

impl Default for BackendKind {
    fn default() -> BackendKind {
        if cfg!(any(windows, target_os = "macos")) {
            BackendKind::Hid
        } else {
            BackendKind::Usb
        }
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> ::std::result::Result<BackendKind, String> {
        match s.to_ascii_lowercase().as_str() {
            "hid" => Ok(BackendKind::Hid),
            "usb" => Ok(BackendKind::Usb),
            _ => Err(format!("unknown backend '{}', expected 'hid' or 'usb'", s)),
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            BackendKind::Hid => write!(f, "hid"),
            BackendKind::Usb => write!(f, "usb"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub backend: BackendKind,
    /// Upper bound on every single transfer.
    pub timeout: Duration,
    /// Give up on a pattern list after this many entries without an
    /// end-of-list marker. `None` polls until the device says stop.
    pub max_pattern_entries: Option<usize>,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            backend: BackendKind::default(),
            timeout: DEFAULT_TIMEOUT,
            max_pattern_entries: Some(DEFAULT_MAX_PATTERN_ENTRIES),
        }
    }
}

impl Config {
    pub fn with_backend(mut self, backend: BackendKind) -> Config {
        self.backend = backend;
        self
    }

    /// Sets the per-transfer timeout, raised to `MIN_TIMEOUT` if shorter.
    pub fn with_timeout(mut self, timeout: Duration) -> Config {
        self.timeout = timeout.max(MIN_TIMEOUT);
        self
    }

    /// The timeout every transfer actually gets; never zero, even when the
    /// field was set directly.
    pub fn transfer_timeout(&self) -> Duration {
        self.timeout.max(MIN_TIMEOUT)
    }

    pub fn with_max_pattern_entries(mut self, limit: Option<usize>) -> Config {
        self.max_pattern_entries = limit;
        self
    }
}
