//! Report transports.
//!
//! Two ways of moving a report to and from the siren: `hidraw` goes through
//! the operating system's HID driver (one synchronous call per report), and
//! `usbhid` issues the HID class requests itself over a libusb control
//! transfer, claiming interface 0 around each one. The session only ever sees
//! the `Transport` trait.

use std::fmt;
use std::time::Duration;

use crate::errors::*;
use crate::phy::{self, Report, REPORT_SIZE};

pub mod hidraw;
pub mod usbhid;

#[cfg(test)]
pub mod mock;

/// The siren's only interface.
pub const INTERFACE_NUMBER: u8 = 0;

/// Transfer direction, from the host's point of view.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    /// GET_REPORT: device to host.
    In,
    /// SET_REPORT: host to device.
    Out,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Direction::In => write!(f, "IN"),
            Direction::Out => write!(f, "OUT"),
        }
    }
}

/// One report channel to a siren.
///
/// Implementors supply the three platform steps; `transfer` and the report
/// helpers built on it are shared. A transport is not reentrant: the
/// claim/release bracket assumes one transfer at a time, which `&mut self`
/// enforces.
pub trait Transport {
    /// Claims the HID interface ahead of one transfer. No-op where the OS
    /// arbitrates access.
    fn claim(&mut self, _direction: Direction, _report_id: u8) -> Result<()> {
        Ok(())
    }

    /// Releases the HID interface claimed by `claim`.
    fn release(&mut self, _direction: Direction, _report_id: u8) -> Result<()> {
        Ok(())
    }

    /// Issues one GET_REPORT (`In`) or SET_REPORT (`Out`) for `report_id`,
    /// returning the number of bytes moved.
    fn control_transfer(
        &mut self,
        direction: Direction,
        report_id: u8,
        buf: &mut Report,
        timeout: Duration,
    ) -> Result<usize>;

    /// claim, transfer, release.
    ///
    /// Release is attempted even when the transfer fails. A transfer error
    /// always wins over a release error; a release error after a successful
    /// transfer is still reported.
    fn transfer(
        &mut self,
        direction: Direction,
        report_id: u8,
        buf: &mut Report,
        timeout: Duration,
    ) -> Result<usize> {
        self.claim(direction, report_id)?;
        let transferred = self.control_transfer(direction, report_id, buf, timeout);
        let released = self.release(direction, report_id);

        match (transferred, released) {
            (Ok(n), Ok(())) => Ok(n),
            (Ok(_), Err(e)) => Err(e),
            (Err(e), Ok(())) => Err(e),
            (Err(e), Err(release_err)) => {
                warn!("{} (after failed transfer: {})", release_err, e);
                Err(e)
            }
        }
    }

    /// Reads input report `report_id`, returning the bytes the device sent.
    fn get_input_report(&mut self, report_id: u8, timeout: Duration) -> Result<Vec<u8>> {
        let mut buf = [0u8; REPORT_SIZE];
        let n = self.transfer(Direction::In, report_id, &mut buf, timeout)?;
        let data = &buf[..n.min(REPORT_SIZE)];
        trace!("GET_REPORT {}: {}", report_id, phy::hex_dump(data));
        Ok(data.to_vec())
    }

    /// Writes `report` as output report `report_id`.
    fn set_output_report(&mut self, report_id: u8, report: &mut Report, timeout: Duration) -> Result<()> {
        trace!("SET_REPORT {}: {}", report_id, phy::hex_dump(&report[..]));
        self.transfer(Direction::Out, report_id, report, timeout)?;
        Ok(())
    }
}

impl<'a, T: Transport + ?Sized> Transport for &'a mut T {
    fn claim(&mut self, direction: Direction, report_id: u8) -> Result<()> {
        (**self).claim(direction, report_id)
    }

    fn release(&mut self, direction: Direction, report_id: u8) -> Result<()> {
        (**self).release(direction, report_id)
    }

    fn control_transfer(
        &mut self,
        direction: Direction,
        report_id: u8,
        buf: &mut Report,
        timeout: Duration,
    ) -> Result<usize> {
        (**self).control_transfer(direction, report_id, buf, timeout)
    }
}

/// Whichever backend discovery opened.
#[derive(Debug)]
pub enum Backend {
    Hid(hidraw::Device),
    Usb(usbhid::Device),
}

impl Transport for Backend {
    fn claim(&mut self, direction: Direction, report_id: u8) -> Result<()> {
        match *self {
            Backend::Hid(ref mut dev) => dev.claim(direction, report_id),
            Backend::Usb(ref mut dev) => dev.claim(direction, report_id),
        }
    }

    fn release(&mut self, direction: Direction, report_id: u8) -> Result<()> {
        match *self {
            Backend::Hid(ref mut dev) => dev.release(direction, report_id),
            Backend::Usb(ref mut dev) => dev.release(direction, report_id),
        }
    }

    fn control_transfer(
        &mut self,
        direction: Direction,
        report_id: u8,
        buf: &mut Report,
        timeout: Duration,
    ) -> Result<usize> {
        match *self {
            Backend::Hid(ref mut dev) => dev.control_transfer(direction, report_id, buf, timeout),
            Backend::Usb(ref mut dev) => dev.control_transfer(direction, report_id, buf, timeout),
        }
    }
}
