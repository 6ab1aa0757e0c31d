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

//! Host capabilities: the external collaborators this crate consumes but never constructs.
//!
//! Each capability is optional. A cartridge that has no gyroscope leaves `rotation_source`
//! unset; the bus then skips the gyro's output path entirely rather than treating it as an
//! error.

/// A source of wall-clock time for the real-time clock.
pub trait TimeSource {
    /// Refresh whatever internal reading this source holds.
    fn sample(&mut self);

    /// Seconds since the UNIX epoch, as of the last `sample`.
    fn unix_time(&self) -> i64;
}

/// A source of gyroscope and/or tilt-sensor axis readings.
///
/// `read_gyro_z` is required: any cartridge that installs a rotation source to back its gyro
/// expects it to always answer. The tilt axes are genuinely optional — a source backing only a
/// gyroscope need not implement them, and the default is `None`, which the tilt sensor treats as
/// "no sample available this time."
pub trait RotationSource {
    /// Refresh whatever internal reading this source holds.
    fn sample(&mut self);

    /// The Z-axis angular rate, as a signed 32-bit value.
    fn read_gyro_z(&self) -> i32;

    /// The X-axis tilt reading, if this source exposes one.
    fn read_tilt_x(&self) -> Option<i32> {
        None
    }

    /// The Y-axis tilt reading, if this source exposes one.
    fn read_tilt_y(&self) -> Option<i32> {
        None
    }
}

/// A vibration motor (or other rumble actuator) driven by the cartridge.
pub trait RumbleSink {
    /// Set the actuator on or off.
    fn set(&mut self, on: bool);
}

/// A source of ambient luminance readings for the light sensor.
pub trait LuminanceSource {
    /// Refresh whatever internal reading this source holds.
    fn sample(&mut self);

    /// The most recent luminance reading, 0 (dark) to 255 (bright).
    fn read_luminance(&self) -> u8;
}

/// Test doubles for the host capability traits above.
///
/// These are not gated behind `#[cfg(test)]`: they are part of the crate's public surface so
/// that a downstream integration's own tests can drive this engine deterministically, the same
/// way `ListenerPin`-style fakes are used to test hand-rolled hardware drivers elsewhere in this
/// codebase.
pub mod testing {
    use super::{LuminanceSource, RotationSource, RumbleSink, TimeSource};
    use std::cell::RefCell;
    use std::io::{self, Write};
    use std::rc::Rc;

    /// A time source that always reports a fixed instant.
    #[derive(Clone, Copy, Debug)]
    pub struct FixedTimeSource(pub i64);

    impl TimeSource for FixedTimeSource {
        fn sample(&mut self) {}

        fn unix_time(&self) -> i64 {
            self.0
        }
    }

    /// A rotation source with a fixed gyro reading and optional fixed tilt readings.
    #[derive(Clone, Copy, Debug, Default)]
    pub struct ScriptedRotation {
        pub gyro_z: i32,
        pub tilt: Option<(i32, i32)>,
    }

    impl RotationSource for ScriptedRotation {
        fn sample(&mut self) {}

        fn read_gyro_z(&self) -> i32 {
            self.gyro_z
        }

        fn read_tilt_x(&self) -> Option<i32> {
            self.tilt.map(|(x, _)| x)
        }

        fn read_tilt_y(&self) -> Option<i32> {
            self.tilt.map(|(_, y)| y)
        }
    }

    /// A rumble sink that records every state it was set to, for later inspection.
    #[derive(Clone, Default)]
    pub struct RumbleRecorder(Rc<RefCell<Vec<bool>>>);

    impl RumbleRecorder {
        #[must_use]
        pub fn history(&self) -> Vec<bool> {
            self.0.borrow().clone()
        }
    }

    impl RumbleSink for RumbleRecorder {
        fn set(&mut self, on: bool) {
            self.0.borrow_mut().push(on);
        }
    }

    /// A luminance source that always reports a fixed reading.
    #[derive(Clone, Copy, Debug)]
    pub struct FixedLuminance(pub u8);

    impl LuminanceSource for FixedLuminance {
        fn sample(&mut self) {}

        fn read_luminance(&self) -> u8 {
            self.0
        }
    }

    /// An in-memory `Write` sink that can be inspected after being handed off to a `Log`.
    #[derive(Clone, Default)]
    pub struct RecordingSink(Rc<RefCell<Vec<u8>>>);

    impl RecordingSink {
        #[must_use]
        pub fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.borrow()).into_owned()
        }
    }

    impl Write for RecordingSink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }
}
