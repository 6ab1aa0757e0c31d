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

//! The tilt sensor: architecturally separate from the shared pin bus. It occupies a distinct
//! memory window and is addressed byte-at-a-time rather than bit-serially.

use serde::{Deserialize, Serialize};

use crate::capabilities::RotationSource;
use crate::log::Log;

/// Compresses a signed 32-bit axis reading onto the tilt sensor's 12-bit scale.
const OFFSET: i32 = 0x3A0;

const UNLOCK_ADDRESS: u32 = 0x8000;
const SAMPLE_ADDRESS: u32 = 0x8100;
const X_LOW: u32 = 0x8200;
const X_HIGH: u32 = 0x8300;
const Y_LOW: u32 = 0x8400;
const Y_HIGH: u32 = 0x8500;

/// The tilt sensor's last-sampled readings and unlock state.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Tilt {
    x: u16,
    y: u16,
    unlocked: bool,
}

impl Default for Tilt {
    fn default() -> Self {
        Tilt {
            x: 0xFFF,
            y: 0xFFF,
            unlocked: false,
        }
    }
}

impl Tilt {
    #[must_use]
    pub fn new() -> Tilt {
        Tilt::default()
    }

    /// Handle a write into the tilt sensor's memory window.
    pub(crate) fn write(
        &mut self,
        address: u32,
        value: u8,
        rotation: Option<&mut dyn RotationSource>,
        log: &mut Log,
    ) {
        match address {
            UNLOCK_ADDRESS => {
                if value == 0x55 {
                    self.unlocked = true;
                } else {
                    log.game_error(&format!(
                        "tilt: unexpected unlock byte {value:#04x} at {address:#06x}"
                    ));
                }
            }
            SAMPLE_ADDRESS => {
                if value == 0xAA && self.unlocked {
                    self.unlocked = false;
                    if let Some(source) = rotation {
                        source.sample();
                        if let (Some(x), Some(y)) = (source.read_tilt_x(), source.read_tilt_y()) {
                            self.x = ((x >> 21).wrapping_add(OFFSET)) as u16 & 0xFFF;
                            self.y = ((y >> 21).wrapping_add(OFFSET)) as u16 & 0xFFF;
                        }
                    }
                } else {
                    log.game_error(&format!(
                        "tilt: unexpected sample byte {value:#04x} at {address:#06x} (unlocked={})",
                        self.unlocked
                    ));
                }
            }
            _ => log.game_error(&format!("tilt: invalid write address {address:#06x}")),
        }
    }

    /// Handle a read from the tilt sensor's memory window.
    pub(crate) fn read(&self, address: u32, log: &mut Log) -> u8 {
        match address {
            X_LOW => (self.x & 0xFF) as u8,
            X_HIGH => (((self.x >> 8) & 0xF) as u8) | 0x80,
            Y_LOW => (self.y & 0xFF) as u8,
            Y_HIGH => ((self.y >> 8) & 0xF) as u8,
            _ => {
                log.game_error(&format!("tilt: invalid read address {address:#06x}"));
                0xFF
            }
        }
    }
}
