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

//! The gyroscope: a 16-bit shift register read out one bit per falling edge of the shift clock.
//!
//! Pins: CS = 0 (latch), CLK = 1 (shift clock), DATA-out = 2.

use serde::{Deserialize, Serialize};

use crate::capabilities::RotationSource;
use crate::pins::Pins;

/// Centers the compressed 16-bit sample on the gyroscope's neutral (not-rotating) position.
const NEUTRAL: i32 = 0x6C0;

/// The gyroscope's shift-register state.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct Gyro {
    sample: u16,
    edge: bool,
}

impl Gyro {
    #[must_use]
    pub fn new() -> Gyro {
        Gyro::default()
    }

    /// React to a change of the shared pin bus.
    ///
    /// Silent (no pin output, no sample change) if no rotation source is installed.
    pub(crate) fn on_pins_changed(&mut self, pins: &mut Pins, rotation: Option<&mut dyn RotationSource>) {
        let Some(source) = rotation else {
            return;
        };

        if pins.p0() {
            source.sample();
            let raw = source.read_gyro_z();
            self.sample = (raw >> 21).wrapping_add(NEUTRAL) as u16;
        }

        if self.edge && !pins.p1() {
            let bit = self.sample >> 15;
            pins.drive(u8::from(bit != 0) << 2);
            self.sample <<= 1;
        }

        self.edge = pins.p1();
    }
}
