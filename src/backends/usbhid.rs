//! Generic USB backend: HID class requests issued as libusb control transfers.
//!
//! Interface 0 is claimed before and released after every transfer, so the
//! device is only held while a report is actually in flight.

use std::fmt;
use std::time::Duration;

use rusb::{self, GlobalContext, Recipient, RequestType};

use super::{Direction, Transport, INTERFACE_NUMBER};
use crate::errors::*;
use crate::phy::Report;

// From the HID spec
const HID_GET_REPORT: u8 = 0x01;
const HID_SET_REPORT: u8 = 0x09;
const HID_REPORT_TYPE_INPUT: u16 = 0x01;

pub struct Device {
    dev: rusb::DeviceHandle<GlobalContext>,
}

impl fmt::Debug for Device {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "usbhid backend")
    }
}

/// libusb status code for an error, as the C library reports it.
pub fn status(e: rusb::Error) -> i32 {
    match e {
        rusb::Error::Io => -1,
        rusb::Error::InvalidParam => -2,
        rusb::Error::Access => -3,
        rusb::Error::NoDevice => -4,
        rusb::Error::NotFound => -5,
        rusb::Error::Busy => -6,
        rusb::Error::Timeout => -7,
        rusb::Error::Overflow => -8,
        rusb::Error::Pipe => -9,
        rusb::Error::Interrupted => -10,
        rusb::Error::NoMem => -11,
        rusb::Error::NotSupported => -12,
        rusb::Error::BadDescriptor | rusb::Error::Other => -99,
    }
}

/// `bmRequestType` for a class request to the interface.
pub fn request_type(direction: Direction) -> u8 {
    let direction = match direction {
        Direction::In => rusb::Direction::In,
        Direction::Out => rusb::Direction::Out,
    };
    rusb::request_type(direction, RequestType::Class, Recipient::Interface)
}

/// `wValue` for GET_REPORT and SET_REPORT alike. The firmware expects the
/// input report type in both directions.
pub fn setup_value(report_id: u8) -> u16 {
    HID_REPORT_TYPE_INPUT << 8 | u16::from(report_id)
}

fn open_failed(op: &'static str, e: rusb::Error) -> Error {
    ErrorKind::DeviceOpenFailed(op, status(e)).into()
}

fn transfer_error(direction: Direction, report_id: u8, timeout: Duration, e: rusb::Error) -> Error {
    match e {
        rusb::Error::Timeout => {
            ErrorKind::TransferTimeout(direction, report_id, timeout.as_millis() as u64, status(e)).into()
        }
        _ => ErrorKind::TransferFailed(direction, report_id, status(e)).into(),
    }
}

impl Device {
    /// Opens `device` and detaches any kernel driver bound to interface 0.
    pub fn open(device: &rusb::Device<GlobalContext>) -> Result<Device> {
        let handle = device.open().map_err(|e| open_failed("libusb_open", e))?;

        match handle.detach_kernel_driver(INTERFACE_NUMBER) {
            Ok(()) => debug!("Detached kernel driver from interface {}", INTERFACE_NUMBER),
            // no driver attached, or no kernel drivers on this platform
            Err(rusb::Error::NotFound) | Err(rusb::Error::NotSupported) => (),
            Err(e) => return Err(open_failed("libusb_detach_kernel_driver", e)),
        }

        debug!("Opened bus {:03} device {:03}", device.bus_number(), device.address());
        Ok(Device { dev: handle })
    }
}

impl Transport for Device {
    fn claim(&mut self, direction: Direction, report_id: u8) -> Result<()> {
        self.dev
            .claim_interface(INTERFACE_NUMBER)
            .map_err(|e| ErrorKind::InterfaceClaimFailed(INTERFACE_NUMBER, direction, report_id, status(e)).into())
    }

    fn release(&mut self, direction: Direction, report_id: u8) -> Result<()> {
        self.dev
            .release_interface(INTERFACE_NUMBER)
            .map_err(|e| ErrorKind::InterfaceReleaseFailed(INTERFACE_NUMBER, direction, report_id, status(e)).into())
    }

    fn control_transfer(
        &mut self,
        direction: Direction,
        report_id: u8,
        buf: &mut Report,
        timeout: Duration,
    ) -> Result<usize> {
        let request_type = request_type(direction);
        let value = setup_value(report_id);
        let index = u16::from(INTERFACE_NUMBER);

        let result = match direction {
            Direction::In => self.dev.read_control(request_type, HID_GET_REPORT, value, index, &mut buf[..], timeout),
            Direction::Out => self.dev.write_control(request_type, HID_SET_REPORT, value, index, &buf[..], timeout),
        };

        result.map_err(|e| transfer_error(direction, report_id, timeout, e))
    }
}
