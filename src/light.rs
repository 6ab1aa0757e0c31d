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

//! The light sensor: a counter that the CPU clocks until its output pin goes high, inferring
//! ambient luminance from how many clock pulses that took.
//!
//! Pins: CLK = 0, RESET = 1, CS = 2, DATA-out = 3.

use serde::{Deserialize, Serialize};

use crate::capabilities::LuminanceSource;
use crate::log::Log;
use crate::pins::Pins;

/// The light sensor's counter state.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Light {
    counter: u8,
    sample: u8,
    edge: bool,
}

impl Default for Light {
    fn default() -> Self {
        Light {
            counter: 0,
            sample: 0xFF,
            edge: false,
        }
    }
}

impl Light {
    #[must_use]
    pub fn new() -> Light {
        Light::default()
    }

    /// React to a change of the shared pin bus.
    pub(crate) fn on_pins_changed(
        &mut self,
        pins: &mut Pins,
        luminance: Option<&mut dyn LuminanceSource>,
        log: &mut Log,
    ) {
        if pins.p2() {
            // chip-select deasserted for this device: no output.
            return;
        }

        if pins.p1() {
            self.counter = 0;
            self.sample = match luminance {
                Some(source) => {
                    source.sample();
                    source.read_luminance()
                }
                None => 0xFF,
            };
            log.debug("light sensor: reset and resample");
        }

        if pins.p0() && self.edge {
            self.counter = self.counter.wrapping_add(1);
        }
        self.edge = !pins.p0();

        pins.drive(u8::from(self.counter >= self.sample) << 3);
    }
}
