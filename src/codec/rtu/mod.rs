// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Modbus RTU

use super::*;
use byteorder::{ByteOrder, LittleEndian};

pub mod client;
pub use crate::frame::rtu::*;

// [MODBUS over Serial Line Specification and Implementation Guide V1.02](http://modbus.org/docs/Modbus_over_serial_line_V1_02.pdf), page 13
// "The maximum size of a MODBUS RTU frame is 256 bytes."
pub const MAX_FRAME_LEN: usize = 256;

/// Size of an encoded read request: slave, function, address, quantity and CRC.
pub const REQUEST_FRAME_LEN: usize = 8;

/// The smallest response: slave, function, byte count (or exception code) and CRC.
pub const MIN_RESPONSE_LEN: usize = 5;

const CRC_LEN: usize = 2;

/// An encoded RTU read request.
pub type RequestFrame = [u8; REQUEST_FRAME_LEN];

/// An extracted RTU PDU frame.
#[cfg_attr(all(feature = "defmt", target_os = "none"), derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedFrame<'a> {
    pub slave: SlaveId,
    pub pdu: &'a [u8],
}

/// Calculate the CRC (Cyclic Redundancy Check) sum.
///
/// The result is sent low byte first.
#[must_use]
pub fn crc16(data: &[u8]) -> u16 {
    let mut crc = 0xFFFF;
    for x in data {
        crc ^= u16::from(*x);
        for _ in 0..8 {
            // if we followed clippy's suggestion to move out the crc >>= 1, the condition may not be met any more
            // the recommended action therefore makes no sense and it is better to allow this lint
            #[allow(clippy::branches_sharing_code)]
            if (crc & 0x0001) != 0 {
                crc >>= 1;
                crc ^= 0xA001;
            } else {
                crc >>= 1;
            }
        }
    }
    crc
}

/// Total size of the response frame at the start of `adu_buf`.
///
/// Returns `None` until the byte count (or exception) header has arrived.
#[must_use]
pub const fn response_frame_len(adu_buf: &[u8]) -> Option<usize> {
    if adu_buf.len() < 3 {
        // incomplete frame
        return None;
    }
    if adu_buf[1] & EXCEPTION_FLAG != 0 {
        return Some(MIN_RESPONSE_LEN);
    }
    Some(adu_buf[2] as usize + MIN_RESPONSE_LEN)
}

/// Extract a PDU frame of `frame_len` bytes out of a buffer.
///
/// The trailing CRC is verified against the preceding bytes. Bytes after
/// the frame are not inspected.
#[allow(clippy::similar_names)]
pub fn extract_frame(buf: &[u8], frame_len: usize) -> Result<DecodedFrame<'_>> {
    debug_assert!(frame_len >= MIN_RESPONSE_LEN);
    if buf.len() < frame_len {
        return Err(Error::ShortRead(buf.len()));
    }
    let (adu_buf, crc_buf) = buf[..frame_len].split_at(frame_len - CRC_LEN);
    // Read trailing CRC and verify ADU
    let expected_crc = LittleEndian::read_u16(crc_buf);
    let actual_crc = crc16(adu_buf);
    if expected_crc != actual_crc {
        return Err(Error::CrcMismatch(expected_crc, actual_crc));
    }
    let (slave_id, pdu_data) = adu_buf.split_at(1);
    Ok(DecodedFrame {
        slave: slave_id[0],
        pdu: pdu_data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calc_crc16() {
        let msg = &[0x01, 0x03, 0x00, 0x01, 0x00, 0x01];
        assert_eq!(crc16(msg), 0xCAD5);

        let msg = &[0x01, 0x03, 0x08, 0x2B, 0x00, 0x02];
        assert_eq!(crc16(msg), 0x63B6);

        let msg = &[0x01, 0x03, 0x04, 0x00, 0x20, 0x00, 0x00];
        assert_eq!(crc16(msg), 0xF9FB);

        let msg = &[0x01, 0x03, 0x00, 0x00, 0x00, 0x0A];
        assert_eq!(crc16(msg), 0xCDC5);
    }

    #[test]
    fn crc16_of_empty_input_is_the_seed() {
        assert_eq!(crc16(&[]), 0xFFFF);
    }

    #[test]
    fn crc16_is_deterministic() {
        let msg = &[0x11, 0x03, 0x00, 0x6B, 0x00, 0x03];
        assert_eq!(crc16(msg), crc16(msg));
        assert_eq!(crc16(msg), 0x8776);
    }

    #[test]
    fn test_response_frame_len() {
        assert_eq!(response_frame_len(&[]), None);
        assert_eq!(response_frame_len(&[0x01, 0x03]), None);
        assert_eq!(response_frame_len(&[0x01, 0x03, 0x02]), Some(7));
        assert_eq!(response_frame_len(&[0x01, 0x03, 0x00]), Some(5));
        assert_eq!(response_frame_len(&[0x01, 0x04, 0xFA]), Some(255));
        assert_eq!(response_frame_len(&[0x01, 0x83, 0x02]), Some(5));
    }

    mod frame_decoder {

        use super::*;

        #[test]
        fn extract_usual_rtu_response_frame() {
            let buf = &[
                0x01, // slave address
                0x03, // function code
                0x04, // byte count
                0x89, //
                0x02, //
                0x42, //
                0xC7, //
                0x00, // crc lo
                0x9D, // crc hi
                0x03, // -- start of next frame
            ];
            let frame_len = response_frame_len(buf).unwrap();
            assert_eq!(frame_len, 9);
            let DecodedFrame { slave, pdu } = extract_frame(buf, frame_len).unwrap();
            assert_eq!(slave, 0x01);
            assert_eq!(pdu, &[0x03, 0x04, 0x89, 0x02, 0x42, 0xC7]);
        }

        #[test]
        fn extract_frame_with_swapped_crc_bytes() {
            let buf = &[0x01, 0x03, 0x04, 0x89, 0x02, 0x42, 0xC7, 0x9D, 0x00];
            assert_eq!(
                extract_frame(buf, 9).err().unwrap(),
                Error::CrcMismatch(0x009D, 0x9D00)
            );
        }

        #[test]
        fn extract_partly_received_rtu_frame() {
            let buf = &[0x01, 0x03, 0x04, 0x89, 0x02, 0x42, 0xC7, 0x00];
            assert_eq!(extract_frame(buf, 9).err().unwrap(), Error::ShortRead(8));
        }
    }
}
