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

//! The one error type in this crate.
//!
//! Everything else — malformed register writes, game protocol violations, unimplemented
//! commands, missing host capabilities — is handled locally and logged, never returned. The
//! single place a `Result` is warranted is restoring a `GpioBus` from a snapshot whose fields are
//! internally inconsistent.

use std::fmt::{self, Display, Formatter};

/// An error restoring a `GpioBus` from a snapshot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BusError {
    /// The snapshot's RTC state claims a command is active with no decoded command header, or
    /// vice versa.
    InconsistentRtcState,
}

impl Display for BusError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            BusError::InconsistentRtcState => {
                write!(f, "snapshot RTC state is internally inconsistent")
            }
        }
    }
}

impl std::error::Error for BusError {}
