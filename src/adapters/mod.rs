//! Adapters — concrete channel implementations behind [`ChannelAdapter`].
//!
//! | Adapter      | Channel                  | Inbound path               |
//! |--------------|--------------------------|----------------------------|
//! | `ble`        | BLE GATT write + notify  | event mailbox (BT task)    |
//! | `serial`     | any byte stream          | polled `BytePort` read     |
//! | `uart`       | ESP-IDF UART driver      | via `serial::SerialLink`   |
//! | `usb_jtag`   | USB-Serial-JTAG bridge   | via `serial::SerialLink`   |
//!
//! [`ChannelAdapter`]: crate::adapter::ChannelAdapter

pub mod ble;
pub mod serial;
#[cfg(target_os = "espidf")]
pub mod uart;
#[cfg(target_os = "espidf")]
pub mod usb_jtag;
