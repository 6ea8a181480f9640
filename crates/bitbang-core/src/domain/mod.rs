//! Domain types: the JTAG pin model and the device the bridge drives.

pub mod device;
pub mod pins;
pub mod tap;
