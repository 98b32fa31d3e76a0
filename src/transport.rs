// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Blocking RTU client over an injected byte transport.
//!
//! The serial driver is not part of this crate. Anything that can write
//! a buffer and read with a timeout implements [`Transport`].

use core::fmt;

use crate::{
    error::Error,
    frame::{Address, FunctionCode, Quantity, RequestAdu, ResponseAdu, SlaveId},
    rtu::{
        MAX_FRAME_LEN,
        client::{decode_response, encode_request},
        response_frame_len,
    },
};

#[cfg(feature = "log")]
use crate::frame::HexFrame;

/// A byte oriented, blocking transport such as a serial line.
pub trait Transport {
    type Error;

    /// Write the whole buffer.
    fn write_all(&mut self, buf: &[u8]) -> Result<(), Self::Error>;

    /// Read up to `buf.len()` bytes, blocking until some arrive.
    ///
    /// Returns `Ok(0)` if nothing arrived before the transport's timeout.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;

    /// Number of received bytes waiting in the input queue, if known.
    fn bytes_to_read(&mut self) -> Option<usize> {
        None
    }

    /// Number of bytes waiting in the output queue, if known.
    fn bytes_to_write(&mut self) -> Option<usize> {
        None
    }
}

impl<T: Transport + ?Sized> Transport for &mut T {
    type Error = T::Error;

    fn write_all(&mut self, buf: &[u8]) -> Result<(), Self::Error> {
        (**self).write_all(buf)
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        (**self).read(buf)
    }

    fn bytes_to_read(&mut self) -> Option<usize> {
        (**self).bytes_to_read()
    }

    fn bytes_to_write(&mut self) -> Option<usize> {
        (**self).bytes_to_write()
    }
}

/// Client error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientError<E> {
    /// The transport failed
    Transport(E),
    /// The response could not be decoded
    Codec(Error),
}

impl<E> ClientError<E> {
    /// `true` if requesting a fresh response may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) => false,
            Self::Codec(err) => err.is_retryable(),
        }
    }
}

impl<E> From<Error> for ClientError<E> {
    fn from(err: Error) -> Self {
        Self::Codec(err)
    }
}

impl<E: fmt::Display> fmt::Display for ClientError<E> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Transport(err) => write!(f, "Transport error: {err}"),
            Self::Codec(err) => err.fmt(f),
        }
    }
}

#[cfg(feature = "std")]
impl<E> std::error::Error for ClientError<E>
where
    E: std::error::Error + 'static,
{
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Transport(err) => Some(err),
            Self::Codec(err) => Some(err),
        }
    }
}

/// A Modbus RTU client (master) talking to one transport.
///
/// Every call sends one request and waits for one response. Nothing is
/// retried: a [`Error::ShortRead`] means the transport timed out before
/// the frame was complete.
#[derive(Debug)]
pub struct Client<T> {
    transport: T,
    buf: [u8; MAX_FRAME_LEN],
}

impl<T: Transport> Client<T> {
    pub const fn new(transport: T) -> Self {
        Self {
            transport,
            buf: [0; MAX_FRAME_LEN],
        }
    }

    pub const fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn into_inner(self) -> T {
        self.transport
    }

    /// Read `quantity` items starting at `address`.
    ///
    /// The returned registers borrow the client's receive buffer.
    pub fn read_registers(
        &mut self,
        slave: SlaveId,
        function: impl Into<FunctionCode>,
        address: Address,
        quantity: Quantity,
    ) -> Result<ResponseAdu<'_>, ClientError<T::Error>> {
        let function = function.into();
        let request = encode_request(RequestAdu::new(slave, function, address, quantity));
        #[cfg(feature = "log")]
        log::debug!("Sending request: {}", HexFrame(&request));
        self.transport
            .write_all(&request)
            .map_err(ClientError::Transport)?;

        let received = self.receive_frame()?;
        let rsp = &self.buf[..received];
        #[cfg(feature = "log")]
        log::debug!("Received {received} byte(s): {}", HexFrame(rsp));
        let adu = match decode_response(rsp) {
            // An exception passed the CRC check, so its header bytes are valid.
            Err(Error::Exception(_)) if rsp[0] != slave => {
                return Err(Error::UnexpectedSlave(slave, rsp[0]).into());
            }
            Err(Error::Exception(ex)) if ex.function != function => {
                return Err(Error::UnexpectedFnCode(function.value(), rsp[1]).into());
            }
            res => res?,
        };
        if adu.hdr.slave != slave {
            return Err(Error::UnexpectedSlave(slave, adu.hdr.slave).into());
        }
        if adu.function != function {
            return Err(Error::UnexpectedFnCode(function.value(), adu.function.value()).into());
        }
        Ok(adu)
    }

    /// Read until one complete frame is buffered.
    fn receive_frame(&mut self) -> Result<usize, ClientError<T::Error>> {
        let mut received = 0;
        loop {
            let cnt = self
                .transport
                .read(&mut self.buf[received..])
                .map_err(ClientError::Transport)?;
            if cnt == 0 {
                #[cfg(feature = "log")]
                log::warn!(
                    "Timed out after {received} byte(s): {}",
                    HexFrame(&self.buf[..received])
                );
                return Err(Error::ShortRead(received).into());
            }
            received += cnt;
            if let Some(frame_len) = response_frame_len(&self.buf[..received]) {
                if received >= frame_len {
                    return Ok(received);
                }
            }
            if received == self.buf.len() {
                return Ok(received);
            }
        }
    }
}

/// [`Transport`] over any blocking [`std::io::Read`] + [`std::io::Write`],
/// e.g. an opened serial port.
///
/// Timeouts reported by the reader are mapped to an empty read.
#[cfg(feature = "std")]
#[derive(Debug)]
pub struct IoTransport<T>(pub T);

#[cfg(feature = "std")]
impl<T> Transport for IoTransport<T>
where
    T: std::io::Read + std::io::Write,
{
    type Error = std::io::Error;

    fn write_all(&mut self, buf: &[u8]) -> Result<(), Self::Error> {
        self.0.write_all(buf)?;
        self.0.flush()
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        use std::io::ErrorKind;
        loop {
            match self.0.read(buf) {
                Ok(cnt) => return Ok(cnt),
                Err(err) if err.kind() == ErrorKind::Interrupted => {}
                Err(err)
                    if matches!(err.kind(), ErrorKind::TimedOut | ErrorKind::WouldBlock) =>
                {
                    return Ok(0);
                }
                Err(err) => return Err(err),
            }
        }
    }
}
