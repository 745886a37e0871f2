//! MH-Z16 UART frame codec.
//!
//! Every exchange is a fixed 9-byte command followed by a fixed 9-byte
//! response. Only the "read gas concentration" command (`0x86`) is spoken.
//!
//! ```text
//! command:  FF 01 86 00 00 00 00 00 CS
//! response: FF 86 HH LL xx xx xx xx CS      ppm = HH * 256 + LL
//! ```
//!
//! `CS` is the two's complement of the sum of bytes 1 through 7.

use crate::error::ReadError;

/// Length of every command and response frame.
pub const FRAME_LEN: usize = 9;

const START_BYTE: u8 = 0xFF;
const SENSOR_NUMBER: u8 = 0x01;
const CMD_READ_CO2: u8 = 0x86;

/// Checksum over the payload bytes `1..=7` of a frame.
pub fn checksum(frame: &[u8; FRAME_LEN]) -> u8 {
    let sum = frame[1..FRAME_LEN - 1]
        .iter()
        .fold(0u8, |acc, b| acc.wrapping_add(*b));
    (!sum).wrapping_add(1)
}

/// Build the "read gas concentration" request.
pub fn read_co2_command() -> [u8; FRAME_LEN] {
    let mut frame = [0u8; FRAME_LEN];
    frame[0] = START_BYTE;
    frame[1] = SENSOR_NUMBER;
    frame[2] = CMD_READ_CO2;
    frame[FRAME_LEN - 1] = checksum(&frame);
    frame
}

/// Decode a concentration response into a raw ppm value.
pub fn decode_co2_response(frame: &[u8; FRAME_LEN]) -> Result<u16, ReadError> {
    if frame[0] != START_BYTE {
        return Err(ReadError::BadStartByte(frame[0]));
    }
    if frame[1] != CMD_READ_CO2 {
        return Err(ReadError::BadCommand(frame[1]));
    }

    let expected = checksum(frame);
    let actual = frame[FRAME_LEN - 1];
    if expected != actual {
        return Err(ReadError::Checksum { expected, actual });
    }

    Ok(u16::from_be_bytes([frame[2], frame[3]]))
}

/// Encode a well-formed response carrying `ppm`.
///
/// The sensor side of the exchange; used by the in-memory port.
pub fn encode_co2_response(ppm: u16) -> [u8; FRAME_LEN] {
    let [high, low] = ppm.to_be_bytes();
    let mut frame = [START_BYTE, CMD_READ_CO2, high, low, 0, 0, 0, 0, 0];
    frame[FRAME_LEN - 1] = checksum(&frame);
    frame
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn read_command_matches_datasheet() {
        assert_eq!(
            read_co2_command(),
            [0xFF, 0x01, 0x86, 0x00, 0x00, 0x00, 0x00, 0x00, 0x79]
        );
    }

    #[test]
    fn decodes_response_with_status_bytes() {
        // 0x01A0 = 416 ppm; bytes 4..=7 carry temperature/status noise.
        let frame = [0xFF, 0x86, 0x01, 0xA0, 0x44, 0x00, 0x00, 0x00, 0x95];
        assert_eq!(decode_co2_response(&frame).unwrap(), 416);
    }

    #[test]
    fn high_byte_is_most_significant() {
        let frame = encode_co2_response(0x1388);
        assert_eq!(frame[2], 0x13);
        assert_eq!(frame[3], 0x88);
        assert_eq!(decode_co2_response(&frame).unwrap(), 5000);
    }

    #[test]
    fn rejects_bad_start_byte() {
        let mut frame = encode_co2_response(415);
        frame[0] = 0x00;
        assert_matches!(
            decode_co2_response(&frame),
            Err(ReadError::BadStartByte(0x00))
        );
    }

    #[test]
    fn rejects_other_command_echo() {
        let mut frame = encode_co2_response(415);
        frame[1] = 0x87;
        assert_matches!(decode_co2_response(&frame), Err(ReadError::BadCommand(0x87)));
    }

    #[test]
    fn rejects_corrupted_payload() {
        let mut frame = encode_co2_response(415);
        frame[3] ^= 0x01;
        assert_matches!(
            decode_co2_response(&frame),
            Err(ReadError::Checksum { .. })
        );
    }
}
