// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Modbus RTU client (master) specific functions.
use super::*;

/// Encode an RTU request.
///
/// Any slave address and function code is accepted as is.
#[must_use]
pub fn encode_request(adu: RequestAdu) -> RequestFrame {
    let RequestAdu { hdr, pdu } = adu;
    let mut buf = [0; REQUEST_FRAME_LEN];
    buf[0] = hdr.slave;
    buf[1..=ReadRequest::PDU_LEN].copy_from_slice(&pdu.encode());
    let crc = crc16(&buf[..=ReadRequest::PDU_LEN]);
    LittleEndian::write_u16(&mut buf[ReadRequest::PDU_LEN + 1..], crc);
    buf
}

/// Decode an RTU response.
///
/// `buf` holds exactly the bytes received. It must be at least
/// `byte count + 5` bytes long and its last two bytes are the CRC of all
/// preceding bytes, so trailing garbage fails the CRC check. Exception
/// responses are returned as [`Error::Exception`].
pub fn decode_response(buf: &[u8]) -> Result<ResponseAdu<'_>> {
    let res = decode_frame(buf);
    #[cfg(feature = "log")]
    if let Err(err) = &res {
        log::warn!("Failed to decode response frame [{}]: {err}", HexFrame(buf));
    }
    res
}

fn decode_frame(buf: &[u8]) -> Result<ResponseAdu<'_>> {
    if buf.len() < MIN_RESPONSE_LEN {
        return Err(Error::ShortRead(buf.len()));
    }
    let frame_len = response_frame_len(buf).ok_or(Error::ShortRead(buf.len()))?;
    if buf.len() < frame_len {
        return Err(Error::MalformedFrame(buf[2], buf.len()));
    }
    let DecodedFrame { slave, pdu } = extract_frame(buf, buf.len())?;
    if pdu[0] & EXCEPTION_FLAG != 0 {
        let ex = ExceptionResponse::try_from(pdu)?;
        return Err(Error::Exception(ex));
    }
    let cnt = usize::from(pdu[1]);
    Ok(ResponseAdu {
        hdr: Header { slave },
        function: FunctionCode::new(pdu[0]),
        data: Data::from_bytes(&pdu[2..2 + cnt]),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::vec::Vec;

    #[test]
    fn encode_read_holding_registers_request() {
        let req = encode_request(RequestAdu::new(
            0x01,
            FunctionCode::ReadHoldingRegisters,
            0x0001,
            0x0001,
        ));
        assert_eq!(
            req,
            [
                0x01, // slave address
                0x03, // function code
                0x00, // addr
                0x01, // addr
                0x00, // quantity
                0x01, // quantity
                0xD5, // crc lo
                0xCA, // crc hi
            ]
        );
    }

    #[test]
    fn encode_custom_function_code_request() {
        let req = encode_request(RequestAdu::new(0x12, 0x06_u8, 0x2222, 0xABCD));
        assert_eq!(req, [0x12, 0x06, 0x22, 0x22, 0xAB, 0xCD, 0x9F, 0xBE]);
    }

    #[test]
    fn encoded_request_carries_crc_of_its_payload() {
        let samples: [(u8, u8, u16, u16); 5] = [
            (0x00, 0x00, 0x0000, 0x0000),
            (0x01, 0x03, 0x0001, 0x0001),
            (0x11, 0x04, 0x006B, 0x0003),
            (0xF7, 0x2B, 0xFFFF, 0x8000),
            (0xFF, 0xFF, 0xFFFF, 0xFFFF),
        ];
        for (slave, function, address, quantity) in samples {
            let req = encode_request(RequestAdu::new(slave, function, address, quantity));
            let crc = u16::from(req[6]) | (u16::from(req[7]) << 8);
            assert_eq!(crc, crc16(&req[..6]));
            assert_eq!(req[0], slave);
            assert_eq!(req[1], function);
            assert_eq!(&req[2..4], &address.to_be_bytes());
            assert_eq!(&req[4..6], &quantity.to_be_bytes());
        }
    }

    #[test]
    fn distinct_requests_produce_distinct_frames() {
        let mut frames = Vec::new();
        for slave in [0x00_u8, 0x01, 0xFF] {
            for function in [0x01_u8, 0x03, 0x04, 0x83] {
                for address in [0x0000_u16, 0x0001, 0x0100, 0xFFFF] {
                    for quantity in [0x0000_u16, 0x0001, 0x0100, 0xFFFF] {
                        frames.push(encode_request(RequestAdu::new(
                            slave, function, address, quantity,
                        )));
                    }
                }
            }
        }
        let total = frames.len();
        frames.sort_unstable();
        frames.dedup();
        assert_eq!(frames.len(), total);
    }

    #[test]
    fn decode_single_register_response() {
        let rsp = &[0x01, 0x03, 0x02, 0x00, 0x7B, 0xF8, 0x67];
        let ResponseAdu {
            hdr,
            function,
            data,
        } = decode_response(rsp).unwrap();
        assert_eq!(hdr.slave, 0x01);
        assert_eq!(function, FunctionCode::ReadHoldingRegisters);
        assert_eq!(data.len(), 1);
        assert_eq!(data.into_iter().collect::<Vec<_>>(), [123]);
    }

    #[test]
    fn decode_multiple_registers_in_order() {
        let rsp = &[0x01, 0x04, 0x04, 0x00, 0xC8, 0x01, 0x2C, 0x7A, 0x37];
        let adu = decode_response(rsp).unwrap();
        assert_eq!(adu.function, FunctionCode::ReadInputRegisters);
        assert_eq!(adu.data.into_iter().collect::<Vec<_>>(), [200, 300]);
    }

    #[test]
    fn decode_odd_byte_count_truncates_last_byte() {
        let rsp = &[0x01, 0x03, 0x03, 0x00, 0x7B, 0x10, 0x66, 0xB2];
        let adu = decode_response(rsp).unwrap();
        assert_eq!(adu.data.len(), 1);
        assert_eq!(adu.data.get(0), Some(123));
        assert_eq!(adu.data.payload(), &[0x00, 0x7B, 0x10]);
    }

    #[test]
    fn decode_empty_data_response() {
        let crc = crc16(&[0x01, 0x03, 0x00]).to_le_bytes();
        let rsp = &[0x01, 0x03, 0x00, crc[0], crc[1]];
        let adu = decode_response(rsp).unwrap();
        assert!(adu.data.is_empty());
    }

    #[test]
    fn decode_rejects_bytes_after_the_frame() {
        let rsp = &[0x01, 0x03, 0x02, 0x00, 0x7B, 0xF8, 0x67, 0x00, 0x00];
        assert!(matches!(
            decode_response(rsp),
            Err(Error::CrcMismatch(0x0000, _))
        ));
    }

    #[test]
    fn decode_checks_crc_over_the_whole_received_length() {
        let mut rsp = [0x01, 0x03, 0x02, 0x00, 0x7B, 0x99, 0x00, 0x00];
        let crc = crc16(&rsp[..6]).to_le_bytes();
        rsp[6] = crc[0];
        rsp[7] = crc[1];
        let adu = decode_response(&rsp).unwrap();
        assert_eq!(adu.data.payload(), &[0x00, 0x7B]);
        assert_eq!(adu.data.get(0), Some(123));
    }

    #[test]
    fn decode_empty_response() {
        assert_eq!(decode_response(&[]).err().unwrap(), Error::ShortRead(0));
    }

    #[test]
    fn decode_partly_received_header() {
        let rsp = &[
            0x01, // slave address
            0x03, // function code
            0x02, // byte count
        ];
        assert_eq!(decode_response(rsp).err().unwrap(), Error::ShortRead(3));
    }

    #[test]
    fn decode_response_shorter_than_declared_byte_count() {
        let rsp = &[0x01, 0x03, 0x04, 0x00, 0x7B, 0xF8, 0x67];
        assert_eq!(
            decode_response(rsp).err().unwrap(),
            Error::MalformedFrame(4, 7)
        );
        let rsp = &[0x01, 0x03, 0xFF, 0x00, 0x7B, 0xF8];
        assert_eq!(
            decode_response(rsp).err().unwrap(),
            Error::MalformedFrame(0xFF, 6)
        );
    }

    #[test]
    fn decode_never_accepts_truncated_frames() {
        let rsp = [0x01, 0x04, 0x04, 0x00, 0xC8, 0x01, 0x2C, 0x7A, 0x37];
        for len in 0..rsp.len() {
            let err = decode_response(&rsp[..len]).err().unwrap();
            assert!(matches!(
                err,
                Error::ShortRead(_) | Error::MalformedFrame(_, _)
            ));
        }
    }

    #[test]
    fn decode_bad_crc_response() {
        let rsp = &[0x01, 0x03, 0x02, 0x00, 0x7B, 0xF8, 0x68];
        assert_eq!(
            decode_response(rsp).err().unwrap(),
            Error::CrcMismatch(0x68F8, 0x67F8)
        );
    }

    #[test]
    fn decode_detects_every_single_bit_flip_in_crc() {
        let rsp = [0x01, 0x03, 0x02, 0x00, 0x7B, 0xF8, 0x67];
        for idx in 5..7 {
            for bit in 0..8 {
                let mut corrupted = rsp;
                corrupted[idx] ^= 1 << bit;
                assert!(matches!(
                    decode_response(&corrupted),
                    Err(Error::CrcMismatch(_, 0x67F8))
                ));
            }
        }
    }

    #[test]
    fn decode_corrupted_data_register() {
        let rsp = &[0x01, 0x03, 0x02, 0x00, 0x7C, 0xF8, 0x67];
        assert!(matches!(
            decode_response(rsp),
            Err(Error::CrcMismatch(0x67F8, _))
        ));
    }

    #[test]
    fn decode_exception_response() {
        let rsp = &[0x01, 0x83, 0x02, 0xC0, 0xF1];
        assert_eq!(
            decode_response(rsp).err().unwrap(),
            Error::Exception(ExceptionResponse {
                function: FunctionCode::ReadHoldingRegisters,
                exception: Exception::IllegalDataAddress,
            })
        );
    }

    #[test]
    fn decode_exception_response_with_bad_crc() {
        let rsp = &[0x01, 0x83, 0x02, 0xC0, 0xF0];
        assert!(matches!(
            decode_response(rsp),
            Err(Error::CrcMismatch(0xF0C0, 0xF1C0))
        ));
    }
}
