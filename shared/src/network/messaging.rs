//! Report frames.
//!
//! ```text
//! [u16 protocol version]
//! [u16 len][len bytes report name]
//! [u16 len][len bytes report text]
//! [u16 len][len bytes sender name]
//! [u16 len][len bytes sender e-mail]
//! [u16 len][len bytes game name]
//! [u16 len][len bytes game version]
//! ```
//!
//! The answer is a single `[u16 answer code]`. All integers are little-endian
//! (`bincode` default encoding).

// Std.
use std::io::prelude::*;
use std::io::ErrorKind;

// External.
use strum::IntoEnumIterator;

// Custom.
use crate::misc::error::WireError;
use crate::misc::report::{GameReport, ReportField};

const U16_SIZE: usize = std::mem::size_of::<u16>();

/// Answer that the collector sends after receiving a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerCode {
    Ok,
    WrongProtocol,
    /// Answer code that this version does not know about.
    Unknown(u16),
}

impl AnswerCode {
    pub fn from_value(value: u16) -> Self {
        match value {
            0 => AnswerCode::Ok,
            1 => AnswerCode::WrongProtocol,
            other => AnswerCode::Unknown(other),
        }
    }
    pub fn value(&self) -> u16 {
        match *self {
            AnswerCode::Ok => 0,
            AnswerCode::WrongProtocol => 1,
            AnswerCode::Unknown(value) => value,
        }
    }
}

/// Writes protocol version and then all report fields in their order.
pub fn write_report<W: Write>(
    writer: &mut W,
    protocol_version: u16,
    report: &GameReport,
) -> Result<(), WireError> {
    write_u16(writer, protocol_version)?;

    for field in ReportField::iter() {
        write_string(writer, report.field(field))?;
    }

    Ok(())
}

/// Reads all report fields (after the protocol version was read).
pub fn read_report<R: Read>(reader: &mut R) -> Result<GameReport, WireError> {
    Ok(GameReport {
        report_name: read_string(reader, ReportField::ReportName)?,
        report_text: read_string(reader, ReportField::ReportText)?,
        sender_name: read_string(reader, ReportField::SenderName)?,
        sender_email: read_string(reader, ReportField::SenderEmail)?,
        game_name: read_string(reader, ReportField::GameName)?,
        game_version: read_string(reader, ReportField::GameVersion)?,
    })
}

pub fn write_answer<W: Write>(writer: &mut W, answer: AnswerCode) -> Result<(), WireError> {
    write_u16(writer, answer.value())
}

pub fn read_answer<R: Read>(reader: &mut R) -> Result<AnswerCode, WireError> {
    Ok(AnswerCode::from_value(read_u16(reader)?))
}

/// Writes string size and then the string itself.
///
/// Empty strings are sent as a zero size without a body.
pub fn write_string<W: Write>(writer: &mut W, text: &str) -> Result<(), WireError> {
    let Ok(len) = u16::try_from(text.len()) else {
        return Err(WireError::Io(std::io::Error::new(
            ErrorKind::InvalidInput,
            format!("string of {} bytes does not fit in a frame", text.len()),
        )));
    };

    write_u16(writer, len)?;

    if len == 0 {
        return Ok(());
    }

    write_to_socket(writer, text.as_bytes())
}

/// Reads string size and then the string itself.
///
/// The size is checked against the field's limit before the body is read.
pub fn read_string<R: Read>(reader: &mut R, field: ReportField) -> Result<String, WireError> {
    let data_size = read_u16(reader)? as usize;

    if data_size > field.max_size_in_bytes() {
        return Err(WireError::FieldTooLong {
            field,
            size: data_size,
            limit: field.max_size_in_bytes(),
        });
    }

    if data_size == 0 {
        return Ok(String::new()); // this can happen for sender name/e-mail, because they are optional
    }

    let mut data_buf = vec![0u8; data_size];
    read_from_socket_fill_buf(reader, &mut data_buf)?;

    String::from_utf8(data_buf).map_err(|_| WireError::InvalidUtf8(field))
}

pub fn write_u16<W: Write>(writer: &mut W, value: u16) -> Result<(), WireError> {
    let buf = bincode::serialize(&value)
        .map_err(|e| WireError::Io(std::io::Error::new(ErrorKind::InvalidData, e)))?;

    write_to_socket(writer, &buf)
}

pub fn read_u16<R: Read>(reader: &mut R) -> Result<u16, WireError> {
    let mut buf = [0u8; U16_SIZE];
    read_from_socket_fill_buf(reader, &mut buf)?;

    bincode::deserialize::<u16>(&buf)
        .map_err(|e| WireError::Io(std::io::Error::new(ErrorKind::InvalidData, e)))
}

/// Writes the buffer with a single write.
///
/// A partial write is an error: frames are never resumed.
fn write_to_socket<W: Write>(writer: &mut W, buf: &[u8]) -> Result<(), WireError> {
    loop {
        match writer.write(buf) {
            Ok(sent) if sent == buf.len() => return Ok(()),
            Ok(sent) => {
                return Err(WireError::ShortWrite {
                    sent,
                    expected: buf.len(),
                })
            }
            Err(ref e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(WireError::Io(e)),
        }
    }
}

/// Reads until the buffer is filled, a FIN before that is a short read.
fn read_from_socket_fill_buf<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<(), WireError> {
    let mut filled_buf_count: usize = 0;

    while filled_buf_count < buf.len() {
        match reader.read(&mut buf[filled_buf_count..]) {
            Ok(0) => {
                return Err(WireError::ShortRead {
                    received: filled_buf_count,
                    expected: buf.len(),
                });
            }
            Ok(n) => filled_buf_count += n,
            Err(ref e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(WireError::Io(e)),
        }
    }

    Ok(())
}
