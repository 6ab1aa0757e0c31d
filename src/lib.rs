#![warn(clippy::pedantic)]

//! Emulation core for a handheld game console's cartridge peripheral bus.
//!
//! Four devices — a real-time clock, a gyroscope, a rumble motor, and a light sensor — share a
//! four-pin serial bus exposed through a small memory-mapped GPIO window. A fifth device, a tilt
//! sensor, is addressed through a separate memory window with its own byte-at-a-time protocol.
//! [`GpioBus`] is the single entry point: it owns every device's protocol state and dispatches
//! each GPIO write to the attached devices in a fixed order.
//!
//! Host integrations that drive real hardware (wall-clock time, a physical gyro, a rumble motor,
//! an ambient light sensor) implement the traits in [`capabilities`] and hand them to
//! [`GpioBus::new`]; any subset may be omitted; see [`capabilities::testing`] for in-memory
//! stand-ins used by this crate's own tests.

mod bcd;
pub mod capabilities;
mod bus;
mod error;
mod gyro;
mod light;
mod log;
mod pins;
mod rtc;
mod rumble;
mod snapshot;
mod tilt;

pub use bus::{AttachedDevices, Capabilities, Device, GpioBus};
pub use error::BusError;
pub use log::Log;
pub use snapshot::Snapshot;
