//! Direct HID-report backend via hidapi.
//!
//! The OS HID driver owns the interface, so there is nothing to claim: each
//! report is one synchronous `get_input_report` / `send_output_report` call
//! with the report id in the first byte of the buffer. Those calls are bounded
//! by the driver's own request timeout rather than ours.

use std::fmt;
use std::io;
use std::time::Duration;

use hidapi::{HidApi, HidDevice, HidError};

use super::{Direction, Transport};
use crate::errors::*;
use crate::phy::Report;

pub struct Device {
    dev: HidDevice,
}

impl fmt::Debug for Device {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "hidraw backend")
    }
}

/// OS status code carried by a hidapi error, or -1 when there is none.
pub fn status(e: &HidError) -> i32 {
    match *e {
        HidError::IoError { ref error } => error.raw_os_error().unwrap_or(-1),
        _ => -1,
    }
}

fn is_timeout(e: &HidError) -> bool {
    match *e {
        HidError::IoError { ref error } => error.kind() == io::ErrorKind::TimedOut,
        _ => false,
    }
}

fn transfer_error(direction: Direction, report_id: u8, timeout: Duration, e: &HidError) -> Error {
    if is_timeout(e) {
        ErrorKind::TransferTimeout(direction, report_id, timeout.as_millis() as u64, status(e)).into()
    } else {
        ErrorKind::TransferFailed(direction, report_id, status(e)).into()
    }
}

impl Device {
    /// Opens the HID device described by `info`.
    pub fn open(api: &HidApi, info: &hidapi::DeviceInfo) -> Result<Device> {
        let dev = info.open_device(api).map_err(|e| {
            debug!("hid open failed: {}", e);
            Error::from(ErrorKind::DeviceOpenFailed("hid_open_path", status(&e)))
        })?;

        debug!("Opened {}", info.path().to_string_lossy());
        Ok(Device { dev })
    }
}

impl Transport for Device {
    fn control_transfer(
        &mut self,
        direction: Direction,
        report_id: u8,
        buf: &mut Report,
        timeout: Duration,
    ) -> Result<usize> {
        buf[0] = report_id;

        let result = match direction {
            Direction::In => self.dev.get_input_report(&mut buf[..]),
            Direction::Out => self.dev.send_output_report(&buf[..]).map(|()| buf.len()),
        };

        result.map_err(|e| transfer_error(direction, report_id, timeout, &e))
    }
}
