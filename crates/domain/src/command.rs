//! Outgoing commands and their wire format.
//!
//! The command strings are the contract with the remote server and are
//! reproduced byte for byte: `ON`, `OFF`, a plain number, or `H,S,B` without
//! whitespace.

use std::fmt;

use crate::transform::format_number;

/// A command sent to a remote item.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    On,
    Off,
    /// A dimmer level, already corrected for the server's `99` ceiling.
    Level(f64),
    Hsb(Hsb),
}

impl Command {
    #[must_use]
    pub fn switch(on: bool) -> Self {
        if on { Self::On } else { Self::Off }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::On => f.write_str("ON"),
            Self::Off => f.write_str("OFF"),
            Self::Level(level) => f.write_str(&format_number(*level)),
            Self::Hsb(hsb) => hsb.fmt(f),
        }
    }
}

/// Hue, saturation and brightness of a color item.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsb {
    pub hue: f64,
    pub saturation: f64,
    pub brightness: f64,
}

impl fmt::Display for Hsb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{}",
            format_number(self.hue),
            format_number(self.saturation),
            format_number(self.brightness)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_format_switch_commands() {
        assert_eq!(Command::switch(true).to_string(), "ON");
        assert_eq!(Command::switch(false).to_string(), "OFF");
    }

    #[test]
    fn should_format_level_without_fraction() {
        assert_eq!(Command::Level(99.0).to_string(), "99");
        assert_eq!(Command::Level(12.5).to_string(), "12.5");
    }

    #[test]
    fn should_format_hsb_without_whitespace() {
        let cmd = Command::Hsb(Hsb {
            hue: 120.0,
            saturation: 50.0,
            brightness: 60.0,
        });
        assert_eq!(cmd.to_string(), "120,50,60");
    }
}
