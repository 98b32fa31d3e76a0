// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::*;

/// Hexadecimal rendering of raw frame bytes, e.g. `01 03 00 01 00 01 D5 CA`.
///
/// `{}` prints upper case digits, `{:x}` lower case ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HexFrame<'a>(pub &'a [u8]);

impl HexFrame<'_> {
    fn write_bytes(&self, f: &mut fmt::Formatter<'_>, upper: bool) -> fmt::Result {
        for (i, b) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            if upper {
                write!(f, "{b:02X}")?;
            } else {
                write!(f, "{b:02x}")?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for HexFrame<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_bytes(f, true)
    }
}

impl fmt::LowerHex for HexFrame<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_bytes(f, false)
    }
}

#[cfg(all(feature = "defmt", target_os = "none"))]
impl defmt::Format for HexFrame<'_> {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "{=[u8]:X}", self.0)
    }
}
