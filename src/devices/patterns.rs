//! Pattern list streaming.
//!
//! The device holds a read cursor per list. Writing a control packet with
//! only that list's read index set to zero rewinds it; every GET_REPORT on the
//! list's report id then returns the next entry and advances the cursor, until
//! an entry with id 0xff marks the end. The cursor cannot be inspected, so a
//! failed poll cannot be resumed: the whole listing is abandoned.

use std::time::Duration;

use crate::backends::Transport;
use crate::errors::*;
use crate::phy::{Decodable, Encodable};
use crate::protocol::usbhid::{ControlPacket, PatternEntry, ReportId};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PatternList {
    Led,
    Audio,
}

impl PatternList {
    pub fn name(self) -> &'static str {
        match self {
            PatternList::Led => "LED",
            PatternList::Audio => "audio",
        }
    }

    /// Input report the list's entries arrive on.
    pub fn report_id(self) -> ReportId {
        match self {
            PatternList::Led => ReportId::ReadLed,
            PatternList::Audio => ReportId::ReadAudio,
        }
    }

    /// Control packet that rewinds the list to its first entry.
    pub fn start_packet(self) -> ControlPacket {
        match self {
            PatternList::Led => ControlPacket::read_led_index(0),
            PatternList::Audio => ControlPacket::read_audio_index(0),
        }
    }
}

/// Reads a whole pattern list, in device order, without the terminator.
///
/// With `limit` set, a list that runs past `limit` entries without a
/// terminator fails with `ProtocolViolation`. Any failed transfer aborts the
/// listing; entries read so far are dropped.
pub fn read_patterns<T: Transport>(
    transport: &mut T,
    list: PatternList,
    timeout: Duration,
    limit: Option<usize>,
) -> Result<Vec<PatternEntry>> {
    let mut start = list.start_packet().encode();
    transport.set_output_report(ReportId::Control.id(), &mut start, timeout)?;

    let report_id = list.report_id().id();
    let mut entries = Vec::new();

    loop {
        let data = transport.get_input_report(report_id, timeout)?;
        let entry = PatternEntry::decode(&data)?;
        if entry.is_end_of_list() {
            break;
        }

        if let Some(limit) = limit {
            if entries.len() >= limit {
                bail!(ErrorKind::ProtocolViolation(list.name(), limit));
            }
        }

        trace!("{} pattern {}", list.name(), entry);
        entries.push(entry);
    }

    debug!("Read {} {} patterns", entries.len(), list.name());
    Ok(entries)
}
