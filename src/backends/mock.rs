//! Scripted transport for unit tests.

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use super::{Direction, Transport, INTERFACE_NUMBER};
use crate::errors::*;
use crate::phy::Report;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    Claim,
    Transfer(Direction, u8),
    Release,
}

#[derive(Debug)]
pub enum Reply {
    Data(Vec<u8>),
    Fail(i32),
    Timeout,
}

#[derive(Debug, Default)]
pub struct MockTransport {
    pub calls: Vec<Call>,
    pub outputs: Vec<(u8, Report)>,
    pub inputs: HashMap<u8, VecDeque<Reply>>,
    pub fail_claim: Option<i32>,
    pub fail_release: Option<i32>,
    pub fail_output: Option<i32>,
}

impl MockTransport {
    pub fn new() -> MockTransport {
        MockTransport::default()
    }

    pub fn push_input(&mut self, report_id: u8, reply: Reply) {
        self.inputs.entry(report_id).or_insert_with(VecDeque::new).push_back(reply);
    }

    pub fn transfers(&self) -> usize {
        self.calls.iter().filter(|c| matches!(c, Call::Transfer(..))).count()
    }
}

impl Transport for MockTransport {
    fn claim(&mut self, direction: Direction, report_id: u8) -> Result<()> {
        self.calls.push(Call::Claim);
        match self.fail_claim {
            Some(code) => bail!(ErrorKind::InterfaceClaimFailed(INTERFACE_NUMBER, direction, report_id, code)),
            None => Ok(()),
        }
    }

    fn release(&mut self, direction: Direction, report_id: u8) -> Result<()> {
        self.calls.push(Call::Release);
        match self.fail_release {
            Some(code) => bail!(ErrorKind::InterfaceReleaseFailed(INTERFACE_NUMBER, direction, report_id, code)),
            None => Ok(()),
        }
    }

    fn control_transfer(
        &mut self,
        direction: Direction,
        report_id: u8,
        buf: &mut Report,
        timeout: Duration,
    ) -> Result<usize> {
        self.calls.push(Call::Transfer(direction, report_id));

        match direction {
            Direction::Out => {
                self.outputs.push((report_id, *buf));
                match self.fail_output {
                    Some(code) => bail!(ErrorKind::TransferFailed(direction, report_id, code)),
                    None => Ok(buf.len()),
                }
            }
            Direction::In => {
                let reply = self
                    .inputs
                    .get_mut(&report_id)
                    .and_then(|queue| queue.pop_front())
                    .unwrap_or(Reply::Fail(-1));
                match reply {
                    Reply::Data(data) => {
                        let n = data.len().min(buf.len());
                        buf[..n].copy_from_slice(&data[..n]);
                        Ok(n)
                    }
                    Reply::Fail(code) => bail!(ErrorKind::TransferFailed(direction, report_id, code)),
                    Reply::Timeout => bail!(ErrorKind::TransferTimeout(
                        direction,
                        report_id,
                        timeout.as_millis() as u64,
                        -7
                    )),
                }
            }
        }
    }
}
