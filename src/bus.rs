/*
  cart-periph-bus, a cartridge peripheral bus emulation core.

  cart-periph-bus is free software: you can redistribute it and/or modify
  it under the terms of the GNU General Public License as published by
  the Free Software Foundation, either version 3 of the License, or
  (at your option) any later version.

  cart-periph-bus is distributed in the hope that it will be useful,
  but WITHOUT ANY WARRANTY; without even the implied warranty of
  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
  GNU General Public License for more details.

  You should have received a copy of the GNU General Public License
  along with this program.  If not, see <http://www.gnu.org/licenses/>.
*/

//! The GPIO bus: the dispatcher that owns all device state and the shared pin register.

use serde::{Deserialize, Serialize};

use crate::capabilities::{LuminanceSource, RotationSource, RumbleSink, TimeSource};
use crate::error::BusError;
use crate::gyro::Gyro;
use crate::light::Light;
use crate::log::Log;
use crate::pins::Pins;
use crate::rtc::Rtc;
use crate::rumble;
use crate::snapshot::Snapshot;
use crate::tilt::Tilt;

/// One of the five devices a cartridge may attach to this bus.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Device {
    Rtc,
    Gyro,
    Rumble,
    Light,
    Tilt,
}

/// Which devices are present on the current cartridge.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachedDevices {
    pub rtc: bool,
    pub gyro: bool,
    pub rumble: bool,
    pub light: bool,
    pub tilt: bool,
}

impl AttachedDevices {
    #[must_use]
    pub fn is_attached(self, device: Device) -> bool {
        match device {
            Device::Rtc => self.rtc,
            Device::Gyro => self.gyro,
            Device::Rumble => self.rumble,
            Device::Light => self.light,
            Device::Tilt => self.tilt,
        }
    }

    fn set(&mut self, device: Device, value: bool) {
        match device {
            Device::Rtc => self.rtc = value,
            Device::Gyro => self.gyro = value,
            Device::Rumble => self.rumble = value,
            Device::Light => self.light = value,
            Device::Tilt => self.tilt = value,
        }
    }
}

/// The host capabilities this bus consumes. Every field is optional; the bus tolerates any
/// subset being present.
#[derive(Default)]
pub struct Capabilities {
    pub time_source: Option<Box<dyn TimeSource>>,
    pub rotation_source: Option<Box<dyn RotationSource>>,
    pub rumble_sink: Option<Box<dyn RumbleSink>>,
    pub luminance_source: Option<Box<dyn LuminanceSource>>,
}

/// The cartridge peripheral bus: shared pin register, per-device state machines, and the
/// separately addressed tilt sensor.
pub struct GpioBus {
    pins: Pins,
    read_write_visible: bool,
    published: u16,
    attached: AttachedDevices,
    rtc: Rtc,
    gyro: Gyro,
    light: Light,
    tilt: Tilt,
    capabilities: Capabilities,
    log: Log,
}

impl GpioBus {
    /// Construct a bus with the given attached devices and host capabilities.
    #[must_use]
    pub fn new(attached: AttachedDevices, capabilities: Capabilities, log: Log) -> GpioBus {
        GpioBus {
            pins: Pins::default(),
            read_write_visible: false,
            published: 0,
            attached,
            rtc: Rtc::new(),
            gyro: Gyro::new(),
            light: Light::new(),
            tilt: Tilt::new(),
            capabilities,
            log,
        }
    }

    /// Attach a device to the cartridge.
    pub fn attach(&mut self, device: Device) {
        self.attached.set(device, true);
    }

    /// Detach a device from the cartridge.
    pub fn detach(&mut self, device: Device) {
        self.attached.set(device, false);
    }

    #[must_use]
    pub fn attached(&self) -> AttachedDevices {
        self.attached
    }

    /// Reset the bus to its power-on state: no devices attached, pins zeroed, each device's own
    /// state reinitialized to its documented defaults. Host capabilities are left untouched,
    /// mirroring a cartridge being swapped without tearing down the whole console.
    pub fn reset(&mut self) {
        self.pins = Pins::default();
        self.read_write_visible = false;
        self.published = 0;
        self.attached = AttachedDevices::default();
        self.rtc = Rtc::new();
        self.gyro = Gyro::new();
        self.light = Light::new();
        self.tilt = Tilt::new();
    }

    /// Write one of the three shared GPIO registers (offsets 0, 1, 2).
    pub fn write_register(&mut self, offset: u32, value: u16) {
        match offset {
            0 => self.write_data(value),
            1 => self.write_direction(value),
            2 => self.write_control(value),
            other => self.log.warn(&format!("GPIO: invalid register offset {other}")),
        }
        if offset <= 2 {
            self.publish();
        }
    }

    /// Read the published GPIO data register.
    #[must_use]
    pub fn read_data(&self) -> u16 {
        self.published
    }

    fn write_data(&mut self, value: u16) {
        self.pins.write_cpu((value & 0xF) as u8);
        self.dispatch();
    }

    fn write_direction(&mut self, value: u16) {
        self.pins.direction = (value & 0xF) as u8;
    }

    fn write_control(&mut self, value: u16) {
        self.read_write_visible = value & 1 != 0;
    }

    fn dispatch(&mut self) {
        if self.attached.rtc {
            self.rtc.on_pins_changed(
                &mut self.pins,
                self.capabilities.time_source.as_deref_mut(),
                &mut self.log,
            );
        }
        if self.attached.gyro {
            self.gyro
                .on_pins_changed(&mut self.pins, self.capabilities.rotation_source.as_deref_mut());
        }
        if self.attached.rumble {
            rumble::on_pins_changed(&self.pins, self.capabilities.rumble_sink.as_deref_mut());
        }
        if self.attached.light {
            self.light.on_pins_changed(
                &mut self.pins,
                self.capabilities.luminance_source.as_deref_mut(),
                &mut self.log,
            );
        }
    }

    fn publish(&mut self) {
        self.published = if self.read_write_visible {
            u16::from(self.pins.state)
        } else {
            0
        };
    }

    /// Write a byte into the tilt sensor's separate memory window.
    pub fn tilt_write(&mut self, address: u32, value: u8) {
        self.tilt.write(
            address,
            value,
            self.capabilities.rotation_source.as_deref_mut(),
            &mut self.log,
        );
    }

    /// Read a byte from the tilt sensor's separate memory window.
    pub fn tilt_read(&mut self, address: u32) -> u8 {
        self.tilt.read(address, &mut self.log)
    }

    /// Capture all device state into a serializable snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            read_write_visible: self.read_write_visible,
            pins: self.pins,
            attached: self.attached,
            rtc: self.rtc.clone(),
            gyro: self.gyro,
            light: self.light,
            tilt: self.tilt,
        }
    }

    /// Restore device state from a snapshot, trusting it to be internally consistent.
    ///
    /// Prefer [`GpioBus::restore_checked`] when the snapshot came from an untrusted or
    /// externally supplied container.
    pub fn restore(&mut self, snapshot: Snapshot) {
        self.read_write_visible = snapshot.read_write_visible;
        self.pins = snapshot.pins;
        self.attached = snapshot.attached;
        self.rtc = snapshot.rtc;
        self.gyro = snapshot.gyro;
        self.light = snapshot.light;
        self.tilt = snapshot.tilt;
        self.publish();
    }

    /// Restore device state from a snapshot, rejecting one whose fields cannot have arisen from
    /// this protocol.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::InconsistentRtcState`] if the snapshot's RTC state has `command_active`
    /// set without a decoded command header, or vice versa.
    pub fn restore_checked(&mut self, snapshot: Snapshot) -> Result<(), BusError> {
        if !snapshot.rtc.is_consistent() {
            return Err(BusError::InconsistentRtcState);
        }
        self.restore(snapshot);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::testing::{FixedLuminance, FixedTimeSource, RumbleRecorder, ScriptedRotation};

    fn bus(attached: AttachedDevices) -> GpioBus {
        GpioBus::new(attached, Capabilities::default(), Log::new(Vec::new()))
    }

    #[test]
    fn direction_gating_scenario() {
        let mut b = bus(AttachedDevices::default());
        b.write_register(1, 0x5); // DIRECTION
        b.write_register(2, 1); // CONTROL: visible
        b.write_register(0, 0xF); // DATA

        assert_eq!(b.read_data(), 0x5);
    }

    #[test]
    fn invisible_register_reads_zero() {
        let mut b = bus(AttachedDevices::default());
        b.write_register(1, 0xF);
        b.write_register(2, 0); // not visible
        b.write_register(0, 0xF);
        assert_eq!(b.read_data(), 0);
    }

    #[test]
    fn device_containment_without_sources() {
        let attached = AttachedDevices {
            rtc: true,
            gyro: true,
            rumble: true,
            light: true,
            tilt: true,
        };
        let mut b = bus(attached);
        b.write_register(1, 0x0); // all pins device-driven
        b.write_register(2, 1); // visible
        for value in 0..16u16 {
            b.write_register(0, value);
        }
        assert_eq!(b.read_data(), 0);
    }

    #[test]
    fn invalid_offset_is_ignored_and_warned() {
        let mut b = bus(AttachedDevices::default());
        b.write_register(2, 1);
        b.write_register(3, 0xFFFF);
        assert_eq!(b.read_data(), 0);
    }

    #[test]
    fn snapshot_round_trip_preserves_behaviour() {
        let attached = AttachedDevices {
            rtc: false,
            gyro: true,
            rumble: true,
            light: false,
            tilt: false,
        };
        let source = ScriptedRotation {
            gyro_z: 0x1000,
            ..Default::default()
        };
        let recorder = RumbleRecorder::default();
        let mut b = bus(attached);
        b.capabilities.rotation_source = Some(Box::new(source));
        b.capabilities.rumble_sink = Some(Box::new(recorder.clone()));

        b.write_register(1, 0x0);
        b.write_register(2, 1);
        b.write_register(0, 0b0001); // latch the gyro

        let snap = b.snapshot();
        let mut restored = bus(AttachedDevices::default());
        restored.capabilities.rotation_source = Some(Box::new(ScriptedRotation::default()));
        restored.capabilities.rumble_sink = Some(Box::new(recorder));
        restored.restore(snap);

        assert!(restored.attached().gyro);
    }

    #[test]
    fn restore_checked_accepts_consistent_snapshot() {
        let mut b = bus(AttachedDevices::default());
        let snapshot = b.snapshot();
        assert!(b.restore_checked(snapshot).is_ok());
    }

    #[test]
    fn restore_checked_rejects_inconsistent_rtc_state() {
        let mut b = bus(AttachedDevices::default());
        let mut snapshot = b.snapshot();
        snapshot.rtc = crate::rtc::Rtc::inconsistent_for_test();
        assert_eq!(
            b.restore_checked(snapshot),
            Err(BusError::InconsistentRtcState)
        );
    }

    #[test]
    fn tilt_memory_window_bypasses_shared_pins() {
        let mut b = bus(AttachedDevices {
            tilt: true,
            ..Default::default()
        });
        b.capabilities.rotation_source = Some(Box::new(ScriptedRotation {
            tilt: Some((0, 0)),
            ..Default::default()
        }));
        b.tilt_write(0x8000, 0x55);
        b.tilt_write(0x8100, 0xAA);
        assert_eq!(b.tilt_read(0x8200), 0xA0);
        assert_eq!(b.tilt_read(0x8300), 0x83);
    }

    #[test]
    fn luminance_and_time_sources_can_be_installed() {
        let mut b = bus(AttachedDevices {
            light: true,
            rtc: true,
            ..Default::default()
        });
        b.capabilities.luminance_source = Some(Box::new(FixedLuminance(10)));
        b.capabilities.time_source = Some(Box::new(FixedTimeSource(0)));
        b.write_register(1, 0);
        b.write_register(2, 1);
        b.write_register(0, 0b0010); // RESET high on light sensor
        assert_eq!(b.read_data(), 0);
    }
}
