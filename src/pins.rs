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

//! The shared four-pin register that the clock, gyro, rumble, and light sensor all observe.
//!
//! Pin numbering: 0 = clock (SCK-like), 1 = data in/out, 2 = chip-select, 3 = auxiliary.
//! A set bit in `direction` means the CPU is driving that pin; a clear bit means the attached
//! device is driving it.

use serde::{Deserialize, Serialize};

/// The live state of the shared pin bus: logical levels and per-pin direction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pins {
    /// Current logical level of each pin, one bit per pin (only the low 4 bits are meaningful).
    pub state: u8,
    /// Direction of each pin: set bit means CPU-driven, clear bit means device-driven.
    pub direction: u8,
}

impl Pins {
    /// Level of pin `index`.
    fn level(self, index: u8) -> bool {
        self.state & (1 << index) != 0
    }

    /// Direction bit of pin `index`; true means CPU-driven.
    fn dir(self, index: u8) -> bool {
        self.direction & (1 << index) != 0
    }

    #[must_use]
    pub fn p0(self) -> bool {
        self.level(0)
    }

    #[must_use]
    pub fn p1(self) -> bool {
        self.level(1)
    }

    #[must_use]
    pub fn p2(self) -> bool {
        self.level(2)
    }

    #[must_use]
    pub fn p3(self) -> bool {
        self.level(3)
    }

    #[must_use]
    pub fn dir0(self) -> bool {
        self.dir(0)
    }

    #[must_use]
    pub fn dir1(self) -> bool {
        self.dir(1)
    }

    #[must_use]
    pub fn dir2(self) -> bool {
        self.dir(2)
    }

    #[must_use]
    pub fn dir3(self) -> bool {
        self.dir(3)
    }

    /// Apply a CPU write of the low 4 bits of `value` to the CPU-driven pins.
    ///
    /// Device-driven pins are left untouched; only a device's own `drive` call (or another CPU
    /// write to DIRECTION) can change them.
    pub(crate) fn write_cpu(&mut self, value: u8) {
        self.state = (self.state & !self.direction) | (value & self.direction & 0xF);
    }

    /// A device proposes 4 bits of output. The CPU-driven bits of the live register are kept
    /// unchanged; the proposed bits are overlaid onto the non-CPU-driven pins only.
    pub(crate) fn drive(&mut self, bits: u8) {
        self.state = (self.state & self.direction) | (bits & !self.direction & 0xF);
    }
}
