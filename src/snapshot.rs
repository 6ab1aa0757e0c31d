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

//! A flat, serializable snapshot of everything the bus owns.
//!
//! Exact binary layout is the concern of whatever save-state container a host embeds this in;
//! this crate only guarantees that the fields below round-trip through `serde` and that
//! restoring a snapshot into a fresh bus reproduces the originating bus's subsequent behaviour.

use serde::{Deserialize, Serialize};

use crate::bus::AttachedDevices;
use crate::gyro::Gyro;
use crate::light::Light;
use crate::pins::Pins;
use crate::rtc::Rtc;
use crate::tilt::Tilt;

/// A point-in-time capture of a [`crate::GpioBus`]'s state.
///
/// The RTC's latched `time` array is not time-source-deterministic: on restore it may be stale
/// until the next `DATETIME`/`TIME` command re-samples the host clock.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Snapshot {
    pub(crate) read_write_visible: bool,
    pub(crate) pins: Pins,
    pub(crate) attached: AttachedDevices,
    pub(crate) rtc: Rtc,
    pub(crate) gyro: Gyro,
    pub(crate) light: Light,
    pub(crate) tilt: Tilt,
}
