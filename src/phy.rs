//! Report framing shared by the codec and the transports.
//!
//! Every report exchanged with the siren is a fixed 38-byte buffer: one
//! report-id byte followed by 37 bytes of payload. Byte 0 is reserved for the
//! report id on both directions; the codec never writes it.

use crate::errors::*;

/// 1 report-id byte + 37 payload bytes.
pub const REPORT_SIZE: usize = 1 + 37;

pub type Report = [u8; REPORT_SIZE];

/// A packet that can be written into a report buffer.
pub trait Encodable {
    /// Writes the packet's fields into `buf`, leaving the report-id slot alone.
    fn encode_into(&self, buf: &mut Report);

    fn encode(&self) -> Report {
        let mut report = [0u8; REPORT_SIZE];
        self.encode_into(&mut report);
        report
    }
}

/// A packet that can be read out of a report buffer.
pub trait Decodable: Sized {
    /// Number of leading bytes the layout occupies, report-id slot included.
    const SIZE: usize;

    /// Reads the fields from `buf`, which is at least `SIZE` bytes long.
    fn decode_unchecked(buf: &[u8]) -> Self;

    fn decode(buf: &[u8]) -> Result<Self> {
        if buf.len() < Self::SIZE {
            bail!(ErrorKind::MalformedPacket(Self::SIZE, buf.len()));
        }
        Ok(Self::decode_unchecked(buf))
    }
}

/// Lower-case hex rendering of a buffer for trace logging.
pub fn hex_dump(buf: &[u8]) -> String {
    hex::encode(buf)
}
