use std::fmt;
use std::time::Duration;

use crate::backends::Transport;
use crate::config::Config;
use crate::errors::*;
use crate::phy::{Decodable, Encodable, Report};
use crate::protocol::usbhid::{ControlOverrides, ControlPacket, InfoReport, PatternEntry, ReportId};

use super::patterns::{self, PatternList};

/// Everything the siren can tell about itself.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeviceSummary {
    pub info: InfoReport,
    pub led_patterns: Vec<PatternEntry>,
    pub audio_patterns: Vec<PatternEntry>,
}

impl fmt::Display for DeviceSummary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.info)?;
        writeln!(f, "LED patterns:")?;
        for pattern in &self.led_patterns {
            writeln!(f, "  {}", pattern)?;
        }
        write!(f, "Audio patterns:")?;
        for pattern in &self.audio_patterns {
            write!(f, "\n  {}", pattern)?;
        }
        Ok(())
    }
}

/// An open siren.
///
/// Owns its transport for as long as it lives; dropping the device closes
/// the handle. Every operation takes `&mut self` and completes (or fails)
/// before returning, so calls are serialized by construction. Nothing is
/// retried: a failed operation is abandoned whole.
#[derive(Debug)]
pub struct Device<T> {
    transport: T,
    timeout: Duration,
    max_pattern_entries: Option<usize>,
}

impl<T: Transport> Device<T> {
    pub fn new(transport: T) -> Device<T> {
        Device::with_config(transport, &Config::default())
    }

    pub fn with_config(transport: T, config: &Config) -> Device<T> {
        Device {
            transport,
            timeout: config.transfer_timeout(),
            max_pattern_entries: config.max_pattern_entries,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Reads raw input report `report_id`.
    pub fn get_input_report(&mut self, report_id: u8) -> Result<Vec<u8>> {
        self.transport.get_input_report(report_id, self.timeout)
    }

    /// Writes raw output report `report_id`.
    pub fn set_output_report(&mut self, report_id: u8, report: &mut Report) -> Result<()> {
        self.transport.set_output_report(report_id, report, self.timeout)
    }

    pub fn read_info(&mut self) -> Result<InfoReport> {
        let data = self.get_input_report(ReportId::Info.id())?;
        InfoReport::decode(&data)
    }

    /// Sends one control packet carrying exactly the supplied overrides.
    pub fn send_control_packet(&mut self, overrides: &ControlOverrides) -> Result<()> {
        let mut report = ControlPacket::from_overrides(overrides).encode();
        debug!("Sending control packet {:?}", overrides);
        self.set_output_report(ReportId::Control.id(), &mut report)
    }

    pub fn read_led_patterns(&mut self) -> Result<Vec<PatternEntry>> {
        self.read_patterns(PatternList::Led)
    }

    pub fn read_audio_patterns(&mut self) -> Result<Vec<PatternEntry>> {
        self.read_patterns(PatternList::Audio)
    }

    fn read_patterns(&mut self, list: PatternList) -> Result<Vec<PatternEntry>> {
        patterns::read_patterns(&mut self.transport, list, self.timeout, self.max_pattern_entries)
    }

    /// Info block plus both pattern lists, or the first error.
    pub fn read_all_info(&mut self) -> Result<DeviceSummary> {
        let info = self.read_info()?;
        let led_patterns = self.read_led_patterns()?;
        let audio_patterns = self.read_audio_patterns()?;

        Ok(DeviceSummary { info, led_patterns, audio_patterns })
    }

    /// Gives the transport back, ending the session.
    pub fn into_inner(self) -> T {
        self.transport
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::mock::{Call, MockTransport, Reply};
    use crate::backends::Direction;
    use crate::phy::REPORT_SIZE;
    use crate::protocol::usbhid::{pattern_report, END_OF_LIST, UNCHANGED, UNCHANGED_DURATION};

    fn info_report() -> Vec<u8> {
        let mut buf = vec![0u8; REPORT_SIZE];
        buf[0] = ReportId::Info.id();
        buf[1] = 2;
        buf[3] = 1;
        buf[4] = 1;
        buf[9] = 4;
        buf[10] = 50;
        buf[12] = 5;
        buf[13] = 100;
        buf
    }

    #[test]
    fn read_info_decodes_info_report() {
        let mut t = MockTransport::new();
        t.push_input(ReportId::Info.id(), Reply::Data(info_report()));

        let info = Device::new(&mut t).read_info().unwrap();
        assert_eq!(info.version, 2);
        assert_eq!(info.audio_mode, 4);
        assert_eq!(info.audio_play_duration_ms(), 500);
        assert_eq!(info.led_mode, 5);
        assert_eq!(info.led_play_duration_ms(), 1000);
        assert_eq!(t.calls[1], Call::Transfer(Direction::In, 1));
    }

    #[test]
    fn send_control_packet_writes_one_report() {
        let mut t = MockTransport::new();
        {
            let mut siren = Device::new(&mut t);
            let overrides = ControlOverrides::new().led_mode(3).led_play_duration(500);
            siren.send_control_packet(&overrides).unwrap();
        }

        assert_eq!(t.outputs.len(), 1);
        let (report_id, report) = t.outputs[0];
        assert_eq!(report_id, ReportId::Control.id());

        let packet = ControlPacket::decode(&report[..]).unwrap();
        assert_eq!(packet.led_mode, 3);
        assert_eq!(packet.led_play_duration, 50);
        assert_eq!(packet.audio_mode, UNCHANGED);
        assert_eq!(packet.audio_play_duration, UNCHANGED_DURATION);
    }

    #[test]
    fn failed_send_is_reported() {
        let mut t = MockTransport::new();
        t.fail_output = Some(-1);

        let err = Device::new(&mut t).send_control_packet(&ControlOverrides::new()).unwrap_err();
        match *err.kind() {
            ErrorKind::TransferFailed(Direction::Out, 1, -1) => (),
            ref other => panic!("unexpected kind {:?}", other),
        }
    }

    #[test]
    fn read_all_info_collects_everything_in_order() {
        let mut t = MockTransport::new();
        t.push_input(ReportId::Info.id(), Reply::Data(info_report()));
        t.push_input(ReportId::ReadLed.id(), Reply::Data(pattern_report(0, "On").to_vec()));
        t.push_input(ReportId::ReadLed.id(), Reply::Data(pattern_report(END_OF_LIST, "").to_vec()));
        t.push_input(ReportId::ReadAudio.id(), Reply::Data(pattern_report(1, "Sad Trombone").to_vec()));
        t.push_input(ReportId::ReadAudio.id(), Reply::Data(pattern_report(END_OF_LIST, "").to_vec()));

        let summary = Device::new(&mut t).read_all_info().unwrap();
        assert_eq!(summary.info.version, 2);
        assert_eq!(summary.led_patterns, vec![PatternEntry { id: 0, name: "On".to_string() }]);
        assert_eq!(summary.audio_patterns, vec![PatternEntry { id: 1, name: "Sad Trombone".to_string() }]);

        let text = summary.to_string();
        assert!(text.contains("LED patterns:\n    0: On"));
        assert!(text.ends_with("Audio patterns:\n    1: Sad Trombone"));
    }

    #[test]
    fn read_all_info_fails_whole() {
        let mut t = MockTransport::new();
        t.push_input(ReportId::Info.id(), Reply::Data(info_report()));
        t.push_input(ReportId::ReadLed.id(), Reply::Data(pattern_report(0, "On").to_vec()));
        t.push_input(ReportId::ReadLed.id(), Reply::Timeout);

        let err = Device::new(&mut t).read_all_info().unwrap_err();
        match *err.kind() {
            ErrorKind::TransferTimeout(Direction::In, 3, 10_000, _) => (),
            ref other => panic!("unexpected kind {:?}", other),
        }
    }

    #[test]
    fn config_bounds_pattern_lists() {
        let mut t = MockTransport::new();
        t.push_input(ReportId::ReadAudio.id(), Reply::Data(pattern_report(0, "a").to_vec()));
        t.push_input(ReportId::ReadAudio.id(), Reply::Data(pattern_report(1, "b").to_vec()));

        let config = Config::default().with_max_pattern_entries(Some(1));
        let err = Device::with_config(&mut t, &config).read_audio_patterns().unwrap_err();
        match *err.kind() {
            ErrorKind::ProtocolViolation("audio", 1) => (),
            ref other => panic!("unexpected kind {:?}", other),
        }
    }

    #[test]
    fn timeout_comes_from_config() {
        let config = Config::default().with_timeout(Duration::from_millis(250));
        let siren = Device::with_config(MockTransport::new(), &config);
        assert_eq!(siren.timeout(), Duration::from_millis(250));
        assert!(siren.into_inner().calls.is_empty());
    }

    #[test]
    fn zero_timeout_is_raised_before_any_transfer() {
        let mut t = MockTransport::new();
        t.push_input(ReportId::Info.id(), Reply::Timeout);

        let config = Config { timeout: Duration::from_millis(0), ..Config::default() };
        let err = Device::with_config(&mut t, &config).read_info().unwrap_err();
        match *err.kind() {
            ErrorKind::TransferTimeout(Direction::In, 1, 1, _) => (),
            ref other => panic!("unexpected kind {:?}", other),
        }
    }
}
