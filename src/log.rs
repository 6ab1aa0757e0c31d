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

//! A small categorised log for diagnostics emitted by the bus and its devices.
//!
//! Unlike a general-purpose application log, nothing written here is ever allowed to turn into a
//! propagated error: every call site in this crate treats logging as fire-and-forget.

use std::fmt::Display;
use std::io::{self, Write};

/// The category of a logged message, used by a host log viewer to filter output.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Category {
    /// Diagnostic detail, not indicative of any problem.
    Debug,
    /// A malformed register write or unrecognized command byte.
    Warn,
    /// A protocol violation committed by the running game, not by this engine.
    GameError,
    /// An acknowledged-but-unimplemented command.
    Stub,
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Category::Debug => "DEBUG",
                Category::Warn => "WARN",
                Category::GameError => "GAME-ERROR",
                Category::Stub => "STUB",
            }
        )
    }
}

/// A leveled logger that copies every message to a single `Write` sink.
///
/// Logging failures (a full disk, a closed pipe) are swallowed rather than surfaced: per the
/// error-handling contract of this crate, nothing in the hot path may fail because a diagnostic
/// could not be written.
pub struct Log {
    sink: Box<dyn Write>,
}

impl Log {
    /// Construct a logger writing to `sink`.
    pub fn new(sink: impl Write + 'static) -> Log {
        Log {
            sink: Box::new(sink),
        }
    }

    /// Construct a logger writing to standard output.
    #[must_use]
    pub fn stdout() -> Log {
        Log::new(io::stdout())
    }

    pub fn debug(&mut self, message: &str) {
        self.write(Category::Debug, message);
    }

    pub fn warn(&mut self, message: &str) {
        self.write(Category::Warn, message);
    }

    pub fn game_error(&mut self, message: &str) {
        self.write(Category::GameError, message);
    }

    pub fn stub(&mut self, message: &str) {
        self.write(Category::Stub, message);
    }

    fn write(&mut self, category: Category, message: &str) {
        let _ = writeln!(self.sink, "[{category}] {message}");
    }
}

impl Default for Log {
    fn default() -> Self {
        Log::stdout()
    }
}
