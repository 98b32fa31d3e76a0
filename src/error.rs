// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

use core::fmt;

use crate::frame::{ExceptionResponse, SlaveId};

/// modbus-rtu-codec Error
#[cfg_attr(all(feature = "defmt", target_os = "none"), derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Fewer bytes than the smallest possible frame (number of bytes received)
    ShortRead(usize),
    /// Received length is shorter than the declared byte count
    /// (declared byte count, number of bytes received)
    MalformedFrame(u8, usize),
    /// Invalid CRC (expected = trailing bytes, actual = recomputed)
    CrcMismatch(u16, u16),
    /// Invalid exception code
    ExceptionCode(u8),
    /// The server answered with an exception
    Exception(ExceptionResponse),
    /// Response from another slave (expected, actual)
    UnexpectedSlave(SlaveId, SlaveId),
    /// Response to another function (expected, actual)
    UnexpectedFnCode(u8, u8),
}

impl Error {
    /// `true` if the frame may simply not have arrived completely yet.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::ShortRead(_))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use Error::*;

        match self {
            ShortRead(received) => write!(f, "Short read: only {received} byte(s) received"),
            MalformedFrame(cnt, received) => write!(
                f,
                "Malformed frame: length shorter than declared byte count ({cnt} data byte(s), {received} byte(s) received)"
            ),
            CrcMismatch(expected, actual) => write!(
                f,
                "Invalid CRC: expected = 0x{expected:0>4X}, actual = 0x{actual:0>4X}"
            ),
            ExceptionCode(code) => write!(f, "Invalid exception code: 0x{code:0>2X}"),
            Exception(rsp) => write!(
                f,
                "Modbus exception for function 0x{:0>2X}: {}",
                rsp.function.value(),
                rsp.exception
            ),
            UnexpectedSlave(expected, actual) => {
                write!(f, "Unexpected slave: expected {expected}, received {actual}")
            }
            UnexpectedFnCode(expected, actual) => write!(
                f,
                "Unexpected function code: expected 0x{expected:0>2X}, received 0x{actual:0>2X}"
            ),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}
