// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::*;

/// Slave ID
pub type SlaveId = u8;

/// RTU header
#[cfg_attr(all(feature = "defmt", target_os = "none"), derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub slave: SlaveId,
}

/// RTU Request ADU
#[cfg_attr(all(feature = "defmt", target_os = "none"), derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestAdu {
    pub hdr: Header,
    pub pdu: ReadRequest,
}

impl RequestAdu {
    /// A read request for `quantity` items starting at `address`.
    #[must_use]
    pub fn new(
        slave: SlaveId,
        function: impl Into<FunctionCode>,
        address: Address,
        quantity: Quantity,
    ) -> Self {
        Self {
            hdr: Header { slave },
            pdu: ReadRequest {
                function: function.into(),
                address,
                quantity,
            },
        }
    }
}

/// RTU Response ADU
#[cfg_attr(all(feature = "defmt", target_os = "none"), derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseAdu<'r> {
    pub hdr: Header,
    pub function: FunctionCode,
    pub data: Data<'r>,
}
