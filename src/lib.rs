//! # Siren of Shame
//!
//! Driver for the Siren of Shame USB build-status siren (vendor 5840,
//! product 1606). The device speaks a small fixed-layout report protocol over
//! the HID control channel: one report reads the device's info block, one
//! output report carries every command, and two input reports stream the
//! LED and audio pattern lists one entry at a time.
//!
//! ```no_run
//! use sirenofshame::{Config, ControlOverrides};
//!
//! # fn main() -> sirenofshame::Result<()> {
//! let mut siren = sirenofshame::connect(&Config::default())?;
//! let patterns = siren.read_led_patterns()?;
//! if let Some(first) = patterns.first() {
//!     siren.send_control_packet(&ControlOverrides::new().led_mode(first.id).led_play_duration(500))?;
//! }
//! # Ok(())
//! # }
//! ```

#![recursion_limit = "1024"]

#[macro_use]
extern crate error_chain;
#[macro_use]
extern crate log;

extern crate byteorder;
extern crate hex;
extern crate hidapi;
extern crate rusb;

pub mod errors {
    use crate::backends::Direction;

    error_chain! {
        foreign_links {
            Usb(rusb::Error) #[doc = "Error enumerating the USB bus"];
            Hid(hidapi::HidError) #[doc = "Error initialising hidapi"];
        }

        errors {
            DeviceNotFound {
                description("no Siren of Shame device found")
                display("No Siren of Shame devices found")
            }
            DeviceOpenFailed(op: &'static str, code: i32) {
                description("could not open Siren of Shame")
                display("Could not open Siren of Shame: {} failed with status {}", op, code)
            }
            InterfaceClaimFailed(interface: u8, direction: Direction, report_id: u8, code: i32) {
                description("could not claim interface")
                display("Could not claim interface {} for {} transfer of report {}: status {}", interface, direction, report_id, code)
            }
            InterfaceReleaseFailed(interface: u8, direction: Direction, report_id: u8, code: i32) {
                description("could not release interface")
                display("Could not release interface {} after {} transfer of report {}: status {}", interface, direction, report_id, code)
            }
            TransferFailed(direction: Direction, report_id: u8, code: i32) {
                description("control transfer failed")
                display("{} transfer of report {} failed with status {}", direction, report_id, code)
            }
            TransferTimeout(direction: Direction, report_id: u8, timeout_ms: u64, code: i32) {
                description("control transfer timed out")
                display("{} transfer of report {} timed out after {} ms (status {})", direction, report_id, timeout_ms, code)
            }
            MalformedPacket(expected: usize, actual: usize) {
                description("malformed packet")
                display("Malformed packet: expected at least {} bytes, got {}", expected, actual)
            }
            ProtocolViolation(list: &'static str, limit: usize) {
                description("device broke the enumeration protocol")
                display("{} pattern list exceeded {} entries without an end-of-list marker", list, limit)
            }
        }
    }

    impl Error {
        /// True when discovery simply found no siren on the bus.
        pub fn is_not_found(&self) -> bool {
            match *self.kind() {
                ErrorKind::DeviceNotFound => true,
                _ => false,
            }
        }
    }
}

pub mod backends;
pub mod config;
pub mod devices;
pub mod discovery;
pub mod phy;
pub mod protocol;

pub use config::{BackendKind, Config};
pub use devices::siren::{Device, DeviceSummary};
pub use discovery::{connect, find_device};
pub use errors::{Error, ErrorKind, Result};
pub use protocol::usbhid::{ControlOverrides, ControlPacket, InfoReport, PatternEntry};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::Direction;

    #[test]
    fn not_found_is_recognised() {
        let err: Error = ErrorKind::DeviceNotFound.into();
        assert!(err.is_not_found());

        let err: Error = ErrorKind::MalformedPacket(15, 3).into();
        assert!(!err.is_not_found());
    }

    #[test]
    fn transfer_errors_carry_context() {
        let err: Error = ErrorKind::TransferFailed(Direction::In, 3, -9).into();
        assert_eq!(err.to_string(), "IN transfer of report 3 failed with status -9");

        let err: Error = ErrorKind::TransferTimeout(Direction::Out, 1, 10_000, -7).into();
        assert_eq!(
            err.to_string(),
            "OUT transfer of report 1 timed out after 10000 ms (status -7)"
        );
    }

    #[test]
    fn interface_errors_name_the_transfer() {
        let err: Error = ErrorKind::InterfaceClaimFailed(0, Direction::In, 3, -6).into();
        assert_eq!(err.to_string(), "Could not claim interface 0 for IN transfer of report 3: status -6");

        let err: Error = ErrorKind::InterfaceReleaseFailed(0, Direction::Out, 1, -4).into();
        assert_eq!(err.to_string(), "Could not release interface 0 after OUT transfer of report 1: status -4");
    }

    #[test]
    fn foreign_usb_error_converts() {
        let err: Error = rusb::Error::Access.into();
        match *err.kind() {
            ErrorKind::Usb(rusb::Error::Access) => (),
            ref other => panic!("unexpected kind {:?}", other),
        }
    }
}
