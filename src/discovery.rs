//! Finding and opening the siren.

use hidapi::HidApi;
use rusb::GlobalContext;

use crate::backends::{hidraw, usbhid, Backend, Transport};
use crate::config::{BackendKind, Config};
use crate::devices::siren::Device;
use crate::errors::*;
use crate::protocol::usbhid::{PRODUCT_ID, VENDOR_ID};

/// A device seen during enumeration.
pub trait Candidate {
    type Transport: Transport;

    fn vendor_id(&self) -> u16;
    fn product_id(&self) -> u16;

    /// Where the device sits, for logs.
    fn describe(&self) -> String;

    fn open(self) -> Result<Self::Transport>;
}

pub fn is_siren(vendor_id: u16, product_id: u16) -> bool {
    vendor_id == VENDOR_ID && product_id == PRODUCT_ID
}

/// Opens the first candidate that is a siren. Nothing else is opened; no
/// match is `DeviceNotFound`.
pub fn open_first<I>(candidates: I) -> Result<<I::Item as Candidate>::Transport>
where
    I: IntoIterator,
    I::Item: Candidate,
{
    for candidate in candidates {
        if is_siren(candidate.vendor_id(), candidate.product_id()) {
            debug!("Found Siren of Shame at {}", candidate.describe());
            return candidate.open();
        }
    }

    bail!(ErrorKind::DeviceNotFound)
}

pub struct UsbCandidate {
    device: rusb::Device<GlobalContext>,
    vendor_id: u16,
    product_id: u16,
}

impl Candidate for UsbCandidate {
    type Transport = usbhid::Device;

    fn vendor_id(&self) -> u16 {
        self.vendor_id
    }

    fn product_id(&self) -> u16 {
        self.product_id
    }

    fn describe(&self) -> String {
        format!("USB bus {:03} device {:03}", self.device.bus_number(), self.device.address())
    }

    fn open(self) -> Result<usbhid::Device> {
        usbhid::Device::open(&self.device)
    }
}

/// Every device on every USB bus whose descriptor could be read.
pub fn usb_candidates() -> Result<Vec<UsbCandidate>> {
    let mut candidates = Vec::new();

    for device in rusb::devices()?.iter() {
        let desc = match device.device_descriptor() {
            Ok(desc) => desc,
            Err(e) => {
                debug!("Skipping bus {:03} device {:03}: {}", device.bus_number(), device.address(), e);
                continue;
            }
        };

        candidates.push(UsbCandidate {
            vendor_id: desc.vendor_id(),
            product_id: desc.product_id(),
            device,
        });
    }

    Ok(candidates)
}

pub struct HidCandidate<'a> {
    api: &'a HidApi,
    info: &'a hidapi::DeviceInfo,
}

impl<'a> Candidate for HidCandidate<'a> {
    type Transport = hidraw::Device;

    fn vendor_id(&self) -> u16 {
        self.info.vendor_id()
    }

    fn product_id(&self) -> u16 {
        self.info.product_id()
    }

    fn describe(&self) -> String {
        self.info.path().to_string_lossy().into_owned()
    }

    fn open(self) -> Result<hidraw::Device> {
        hidraw::Device::open(self.api, self.info)
    }
}

/// Every HID device hidapi can see.
pub fn hid_candidates(api: &HidApi) -> impl Iterator<Item = HidCandidate<'_>> {
    api.device_list().map(move |info| HidCandidate { api, info })
}

/// Finds the siren and opens it with the configured backend.
pub fn find_device(config: &Config) -> Result<Device<Backend>> {
    let backend = match config.backend {
        BackendKind::Hid => {
            let api = HidApi::new()?;
            Backend::Hid(open_first(hid_candidates(&api))?)
        }
        BackendKind::Usb => Backend::Usb(open_first(usb_candidates()?)?),
    };

    info!("Opened Siren of Shame via {} backend", config.backend);
    Ok(Device::with_config(backend, config))
}

/// `find_device`, then confirms the siren answers an info request.
pub fn connect(config: &Config) -> Result<Device<Backend>> {
    let mut device = find_device(config)?;
    let info = device.read_info()?;
    info!(
        "Connected to Siren of Shame: firmware {}, hardware type {} version {}",
        info.version, info.hardware_type, info.hardware_version
    );
    Ok(device)
}
