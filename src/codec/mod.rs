// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{error::*, frame::*};
use core::convert::TryFrom;

pub mod rtu;

type Result<T> = core::result::Result<T, Error>;

/// Bit set in the function code of an exception response.
pub(crate) const EXCEPTION_FLAG: u8 = 0x80;

impl TryFrom<u8> for Exception {
    type Error = Error;

    fn try_from(code: u8) -> Result<Self> {
        use crate::frame::Exception::*;
        let ex = match code {
            0x01 => IllegalFunction,
            0x02 => IllegalDataAddress,
            0x03 => IllegalDataValue,
            0x04 => ServerDeviceFailure,
            0x05 => Acknowledge,
            0x06 => ServerDeviceBusy,
            0x08 => MemoryParityError,
            0x0A => GatewayPathUnavailable,
            0x0B => GatewayTargetDevice,
            _ => {
                return Err(Error::ExceptionCode(code));
            }
        };
        Ok(ex)
    }
}

/// Parse the exception PDU `[function | 0x80, exception code]`.
impl TryFrom<&[u8]> for ExceptionResponse {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self> {
        let (&fn_err_code, rest) = bytes.split_first().ok_or(Error::ShortRead(0))?;
        debug_assert!(fn_err_code & EXCEPTION_FLAG != 0);
        let function = FunctionCode::new(fn_err_code & !EXCEPTION_FLAG);
        let &code = rest.first().ok_or(Error::ShortRead(1))?;
        let exception = Exception::try_from(code)?;
        Ok(ExceptionResponse {
            function,
            exception,
        })
    }
}
