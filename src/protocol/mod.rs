pub mod usbhid;
