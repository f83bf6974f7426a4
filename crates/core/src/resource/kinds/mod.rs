// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Concrete resource kinds, one module per schema id.

pub mod image;
pub mod number;
pub mod numbers;
pub mod string;
pub mod unknown;
pub mod usb_device;
pub mod usb_devices;

pub use self::image::ImageResource;
pub use self::number::NumberResource;
pub use self::numbers::NumbersResource;
pub use self::string::StringResource;
pub use self::unknown::UnknownResource;
pub use self::usb_device::UsbDeviceResource;
pub use self::usb_devices::UsbDevicesResource;
