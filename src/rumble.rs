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

//! The rumble motor: a stateless observer of pin 3.

use crate::capabilities::RumbleSink;
use crate::pins::Pins;

/// Forward the level of pin 3 to the rumble sink, if one is installed.
///
/// This device holds no state of its own; it simply mirrors the pin onto the actuator on every
/// bus update.
pub(crate) fn on_pins_changed(pins: &Pins, rumble: Option<&mut dyn RumbleSink>) {
    if let Some(sink) = rumble {
        sink.set(pins.p3());
    }
}
