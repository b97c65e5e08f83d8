//! # Siren of Shame over USB HID
//!
//! The siren exposes a single HID interface. The host talks to it with
//! GET_REPORT / SET_REPORT requests on the control endpoint; every report is
//! 38 bytes: a report-id byte followed by a fixed-layout struct, zero padded.
//!
//! All multi-byte values are little-endian. Durations on the wire count
//! ten-millisecond ticks: callers speak milliseconds, the device hears
//! `ms / 10`.
//!
//! One output report (`OUT_CONTROL`) carries every command:
//!
//! ```text
//!     [RID 0x00 AM LM ADlo ADhi LDlo LDhi RA RL M0 M1 M2 M3 M4 <zero padding>]
//!       |   |   |  |  \-------\---\----\---- audio / LED play duration (ticks)
//!       |   |   |  \------------------------ LED mode
//!       |   |   \--------------------------- audio mode
//!       |   \------------------------------- control byte, always zero
//!       \----------------------------------- report id slot
//!
//!     RA / RL: read-audio-index / read-LED-index
//!     M0..M4:  manual LED levels
//! ```
//!
//! Every field has a "leave unchanged" sentinel (0xff, or 0xffff for the
//! durations), so a packet with nothing set is a no-op. Setting RL or RA to
//! zero rewinds the device's read cursor for that list; each subsequent
//! GET_REPORT on `IN_READ_LED` / `IN_READ_AUDIO` returns the next entry:
//!
//! ```text
//!     [RID ID N N N ... N]
//!       |   |  \--------- name, 36 bytes, NUL terminated when shorter
//!       |   \------------ pattern id, 0xff ends the list
//!       \---------------- report id
//! ```
//!
//! The info report (`IN_INFO`) snapshots the device:
//!
//! ```text
//!     [RID Vlo Vhi HT HV E0 E1 E2 E3 AM ADlo ADhi LM LDlo LDhi]
//!           |       |  |  \--------/ |  \------/  |  \------/
//!           |       |  |  ext. mem.  |  audio dur |  LED dur (ticks)
//!           |       |  |  size       audio mode   LED mode
//!           |       |  \------------- hardware version
//!           |       \---------------- hardware type
//!           \------------------------ firmware version
//! ```

use std::fmt;

use byteorder::{ByteOrder, LittleEndian};

use crate::phy::{Decodable, Encodable, Report, REPORT_SIZE};

pub const VENDOR_ID: u16 = 5840;
pub const PRODUCT_ID: u16 = 1606;

/// Sentinel for one-byte fields: leave the device setting as it is.
pub const UNCHANGED: u8 = 0xff;
/// Sentinel for duration fields.
pub const UNCHANGED_DURATION: u16 = 0xffff;
/// Pattern id that terminates a pattern list.
pub const END_OF_LIST: u8 = 0xff;

/// Width of the name field in a pattern entry.
pub const PATTERN_NAME_LENGTH: usize = REPORT_SIZE - 2;

/// Number of manually driven LED channels.
pub const MANUAL_LED_COUNT: usize = 5;

/// Report ids, as defined by the firmware.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ReportId {
    Info,
    ReadAudio,
    ReadLed,
    Control,
}

impl ReportId {
    pub fn id(self) -> u8 {
        match self {
            ReportId::Info => 1,
            ReportId::ReadAudio => 2,
            ReportId::ReadLed => 3,
            ReportId::Control => 1,
        }
    }
}

fn duration_to_wire(ms: u16) -> u16 {
    ms / 10
}

fn duration_from_wire(ticks: u16) -> u32 {
    u32::from(ticks) * 10
}

/// The caller-facing half of a control packet. `None` leaves the device
/// setting untouched; durations are in milliseconds.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ControlOverrides {
    pub audio_mode: Option<u8>,
    pub audio_play_duration: Option<u16>,
    pub led_mode: Option<u8>,
    pub led_play_duration: Option<u16>,
    pub manual_leds: [Option<u8>; MANUAL_LED_COUNT],
}

impl ControlOverrides {
    pub fn new() -> ControlOverrides {
        ControlOverrides::default()
    }

    pub fn audio_mode(mut self, mode: u8) -> ControlOverrides {
        self.audio_mode = Some(mode);
        self
    }

    pub fn audio_play_duration(mut self, ms: u16) -> ControlOverrides {
        self.audio_play_duration = Some(ms);
        self
    }

    pub fn led_mode(mut self, mode: u8) -> ControlOverrides {
        self.led_mode = Some(mode);
        self
    }

    pub fn led_play_duration(mut self, ms: u16) -> ControlOverrides {
        self.led_play_duration = Some(ms);
        self
    }

    /// Sets manual LED channel `index` (0..5). Out-of-range indices are ignored.
    pub fn manual_led(mut self, index: usize, level: u8) -> ControlOverrides {
        if let Some(slot) = self.manual_leds.get_mut(index) {
            *slot = Some(level);
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == ControlOverrides::default()
    }
}

/// The full `OUT_CONTROL` struct as it goes over the wire.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ControlPacket {
    pub control_byte1: u8,
    pub audio_mode: u8,
    pub led_mode: u8,
    /// Ten-millisecond ticks, as sent.
    pub audio_play_duration: u16,
    pub led_play_duration: u16,
    pub read_audio_index: u8,
    pub read_led_index: u8,
    pub manual_leds: [u8; MANUAL_LED_COUNT],
}

impl Default for ControlPacket {
    /// The no-op packet: every field at its sentinel.
    fn default() -> ControlPacket {
        ControlPacket {
            control_byte1: 0,
            audio_mode: UNCHANGED,
            led_mode: UNCHANGED,
            audio_play_duration: UNCHANGED_DURATION,
            led_play_duration: UNCHANGED_DURATION,
            read_audio_index: UNCHANGED,
            read_led_index: UNCHANGED,
            manual_leds: [UNCHANGED; MANUAL_LED_COUNT],
        }
    }
}

impl ControlPacket {
    /// Builds the packet a caller's overrides describe.
    pub fn from_overrides(overrides: &ControlOverrides) -> ControlPacket {
        let mut packet = ControlPacket::default();
        packet.apply(overrides);
        packet
    }

    /// Writes every supplied override over the current field values.
    pub fn apply(&mut self, overrides: &ControlOverrides) {
        if let Some(mode) = overrides.audio_mode {
            self.audio_mode = mode;
        }
        if let Some(ms) = overrides.audio_play_duration {
            self.audio_play_duration = duration_to_wire(ms);
        }
        if let Some(mode) = overrides.led_mode {
            self.led_mode = mode;
        }
        if let Some(ms) = overrides.led_play_duration {
            self.led_play_duration = duration_to_wire(ms);
        }
        for (field, level) in self.manual_leds.iter_mut().zip(overrides.manual_leds.iter()) {
            if let Some(level) = *level {
                *field = level;
            }
        }
    }

    /// Packet that rewinds the device's LED pattern cursor.
    pub fn read_led_index(index: u8) -> ControlPacket {
        ControlPacket { read_led_index: index, ..ControlPacket::default() }
    }

    /// Packet that rewinds the device's audio pattern cursor.
    pub fn read_audio_index(index: u8) -> ControlPacket {
        ControlPacket { read_audio_index: index, ..ControlPacket::default() }
    }

    /// Maps the packet back to caller terms: sentinels become `None`,
    /// durations come back in milliseconds.
    pub fn overrides(&self) -> ControlOverrides {
        fn byte(v: u8) -> Option<u8> {
            if v == UNCHANGED { None } else { Some(v) }
        }
        fn duration(v: u16) -> Option<u16> {
            if v == UNCHANGED_DURATION {
                None
            } else {
                Some(v.saturating_mul(10))
            }
        }

        let mut manual_leds = [None; MANUAL_LED_COUNT];
        for (slot, &level) in manual_leds.iter_mut().zip(self.manual_leds.iter()) {
            *slot = byte(level);
        }

        ControlOverrides {
            audio_mode: byte(self.audio_mode),
            audio_play_duration: duration(self.audio_play_duration),
            led_mode: byte(self.led_mode),
            led_play_duration: duration(self.led_play_duration),
            manual_leds,
        }
    }
}

impl Encodable for ControlPacket {
    fn encode_into(&self, buf: &mut Report) {
        buf[1] = self.control_byte1;
        buf[2] = self.audio_mode;
        buf[3] = self.led_mode;
        LittleEndian::write_u16(&mut buf[4..6], self.audio_play_duration);
        LittleEndian::write_u16(&mut buf[6..8], self.led_play_duration);
        buf[8] = self.read_audio_index;
        buf[9] = self.read_led_index;
        buf[10..15].copy_from_slice(&self.manual_leds);
    }
}

impl Decodable for ControlPacket {
    const SIZE: usize = 15;

    fn decode_unchecked(buf: &[u8]) -> ControlPacket {
        let mut manual_leds = [0u8; MANUAL_LED_COUNT];
        manual_leds.copy_from_slice(&buf[10..15]);

        ControlPacket {
            control_byte1: buf[1],
            audio_mode: buf[2],
            led_mode: buf[3],
            audio_play_duration: LittleEndian::read_u16(&buf[4..6]),
            led_play_duration: LittleEndian::read_u16(&buf[6..8]),
            read_audio_index: buf[8],
            read_led_index: buf[9],
            manual_leds,
        }
    }
}

/// The device's `IN_INFO` snapshot. Durations are kept as sent (10 ms ticks).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct InfoReport {
    pub version: u16,
    pub hardware_type: u8,
    pub hardware_version: u8,
    pub external_memory_size: u32,
    pub audio_mode: u8,
    pub audio_play_duration: u16,
    pub led_mode: u8,
    pub led_play_duration: u16,
}

impl InfoReport {
    pub fn audio_play_duration_ms(&self) -> u32 {
        duration_from_wire(self.audio_play_duration)
    }

    pub fn led_play_duration_ms(&self) -> u32 {
        duration_from_wire(self.led_play_duration)
    }
}

impl Decodable for InfoReport {
    const SIZE: usize = 15;

    fn decode_unchecked(buf: &[u8]) -> InfoReport {
        InfoReport {
            version: LittleEndian::read_u16(&buf[1..3]),
            hardware_type: buf[3],
            hardware_version: buf[4],
            external_memory_size: LittleEndian::read_u32(&buf[5..9]),
            audio_mode: buf[9],
            audio_play_duration: LittleEndian::read_u16(&buf[10..12]),
            led_mode: buf[12],
            led_play_duration: LittleEndian::read_u16(&buf[13..15]),
        }
    }
}

impl fmt::Display for InfoReport {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Firmware version:     {}", self.version)?;
        writeln!(f, "Hardware type:        {}", self.hardware_type)?;
        writeln!(f, "Hardware version:     {}", self.hardware_version)?;
        writeln!(f, "External memory size: {}", self.external_memory_size)?;
        writeln!(f, "Audio mode:           {}", self.audio_mode)?;
        writeln!(f, "Audio play duration:  {} ms", self.audio_play_duration_ms())?;
        writeln!(f, "LED mode:             {}", self.led_mode)?;
        write!(f, "LED play duration:    {} ms", self.led_play_duration_ms())
    }
}

/// One entry of a pattern list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PatternEntry {
    pub id: u8,
    pub name: String,
}

impl PatternEntry {
    pub fn is_end_of_list(&self) -> bool {
        self.id == END_OF_LIST
    }
}

/// Reads a NUL-terminated name out of a fixed-width field.
fn parse_name(field: &[u8]) -> String {
    let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
    String::from_utf8_lossy(&field[..end]).into_owned()
}

impl Decodable for PatternEntry {
    const SIZE: usize = REPORT_SIZE;

    fn decode_unchecked(buf: &[u8]) -> PatternEntry {
        PatternEntry {
            id: buf[1],
            name: parse_name(&buf[2..REPORT_SIZE]),
        }
    }
}

impl fmt::Display for PatternEntry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:3}: {}", self.id, self.name)
    }
}

#[cfg(test)]
pub(crate) fn pattern_report(id: u8, name: &str) -> Report {
    let mut report = [0u8; REPORT_SIZE];
    report[1] = id;
    report[2..2 + name.len()].copy_from_slice(name.as_bytes());
    report
}
