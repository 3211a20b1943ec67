use std::io::Read;

/// `"WAL!"` in ASCII, read as a little-endian `u32`.
pub const MAGIC: u32 = 0x5741_4C21;

/// Bytes from the start of a record up to (not including) the key bytes.
const HEADER_SIZE: usize = 24;
/// The trailing CRC32C field.
const CRC_SIZE: usize = 4;

/// The kind of mutation a record represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Put = 1,
    Delete = 2,
    Commit = 3,
}

impl TryFrom<u8> for RecordKind {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Put),
            2 => Ok(Self::Delete),
            3 => Ok(Self::Commit),
            _ => Err(()),
        }
    }
}

/// A single logical record as read back from a segment file.
#[derive(Debug, Clone)]
pub struct Record {
    pub kind: RecordKind,
    pub sequence: u64,
    pub key: Vec<u8>,
    pub value: Vec<u8>,
}

/// Appends the on-disk encoding of one record (§6.1) to `buf`.
pub fn encode_record(buf: &mut Vec<u8>, kind: RecordKind, sequence: u64, key: &[u8], value: &[u8]) {
    let start = buf.len();
    buf.extend_from_slice(&MAGIC.to_le_bytes());
    buf.push(kind as u8);
    buf.extend_from_slice(&[0_u8; 3]);
    buf.extend_from_slice(&sequence.to_le_bytes());
    #[expect(clippy::unwrap_used, reason = "keys/values are never close to u32::MAX bytes")]
    buf.extend_from_slice(&u32::try_from(key.len()).unwrap().to_le_bytes());
    #[expect(clippy::unwrap_used, reason = "keys/values are never close to u32::MAX bytes")]
    buf.extend_from_slice(&u32::try_from(value.len()).unwrap().to_le_bytes());
    buf.extend_from_slice(key);
    buf.extend_from_slice(value);
    let crc = crc32c::crc32c(&buf[start..]);
    buf.extend_from_slice(&crc.to_le_bytes());
}

/// Reasons [`read_record`] stops reading: either a well-formed record, or a
/// condition that must be treated as end-of-log rather than an error (§4.4.1).
pub enum ReadOutcome {
    Record(Record),
    EndOfLog,
}

/// Reads one record from `reader`. Any deviation from the expected format —
/// a short read, bad magic, or CRC mismatch — is reported as
/// [`ReadOutcome::EndOfLog`], never as an [`io::Error`](std::io::Error):
/// that's the crash-tolerance contract a log writer that died mid-record
/// relies on.
pub fn read_record<R: Read>(reader: &mut R) -> ReadOutcome {
    let mut header = [0_u8; HEADER_SIZE];
    if !fill_exact(reader, &mut header) {
        return ReadOutcome::EndOfLog;
    }

    #[expect(clippy::indexing_slicing, reason = "header has fixed length HEADER_SIZE")]
    let magic = u32::from_le_bytes([header[0], header[1], header[2], header[3]]);
    if magic != MAGIC {
        return ReadOutcome::EndOfLog;
    }
    #[expect(clippy::indexing_slicing, reason = "header has fixed length HEADER_SIZE")]
    let Ok(kind) = RecordKind::try_from(header[4]) else {
        return ReadOutcome::EndOfLog;
    };
    #[expect(clippy::indexing_slicing, reason = "header has fixed length HEADER_SIZE")]
    let sequence = u64::from_le_bytes(header[8..16].try_into().unwrap_or_default());
    #[expect(clippy::indexing_slicing, reason = "header has fixed length HEADER_SIZE")]
    let key_len = u32::from_le_bytes(header[16..20].try_into().unwrap_or_default()) as usize;
    #[expect(clippy::indexing_slicing, reason = "header has fixed length HEADER_SIZE")]
    let value_len = u32::from_le_bytes(header[20..24].try_into().unwrap_or_default()) as usize;

    let mut key = vec![0_u8; key_len];
    if !fill_exact(reader, &mut key) {
        return ReadOutcome::EndOfLog;
    }
    let mut value = vec![0_u8; value_len];
    if !fill_exact(reader, &mut value) {
        return ReadOutcome::EndOfLog;
    }
    let mut crc_bytes = [0_u8; CRC_SIZE];
    if !fill_exact(reader, &mut crc_bytes) {
        return ReadOutcome::EndOfLog;
    }
    let expected_crc = u32::from_le_bytes(crc_bytes);

    let mut body = Vec::with_capacity(HEADER_SIZE + key_len + value_len);
    body.extend_from_slice(&header);
    body.extend_from_slice(&key);
    body.extend_from_slice(&value);
    if crc32c::crc32c(&body) != expected_crc {
        return ReadOutcome::EndOfLog;
    }

    ReadOutcome::Record(Record { kind, sequence, key, value })
}

/// Like `Read::read_exact`, but a short read (including zero bytes at a clean
/// EOF) is reported as `false` instead of an error — every caller here treats
/// a truncated tail as end-of-log.
fn fill_exact<R: Read>(reader: &mut R, buf: &mut [u8]) -> bool {
    let mut filled = 0;
    while filled < buf.len() {
        #[expect(clippy::indexing_slicing, reason = "filled <= buf.len() by loop condition")]
        match reader.read(&mut buf[filled..]) {
            Ok(0) => return false,
            Ok(n) => filled += n,
            Err(err) if err.kind() == std::io::ErrorKind::Interrupted => {}
            Err(_) => return false,
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_a_put_record() {
        let mut buf = Vec::new();
        encode_record(&mut buf, RecordKind::Put, 7, b"key", b"value");

        let mut cursor = std::io::Cursor::new(buf);
        let ReadOutcome::Record(record) = read_record(&mut cursor) else {
            panic!("expected a record");
        };
        assert_eq!(record.kind, RecordKind::Put);
        assert_eq!(record.sequence, 7);
        assert_eq!(record.key, b"key");
        assert_eq!(record.value, b"value");
    }

    #[test]
    fn empty_value_round_trips_for_delete() {
        let mut buf = Vec::new();
        encode_record(&mut buf, RecordKind::Delete, 1, b"key", b"");
        let mut cursor = std::io::Cursor::new(buf);
        let ReadOutcome::Record(record) = read_record(&mut cursor) else {
            panic!("expected a record");
        };
        assert!(record.value.is_empty());
    }

    #[test]
    fn truncated_tail_is_end_of_log_not_an_error() {
        let mut buf = Vec::new();
        encode_record(&mut buf, RecordKind::Put, 1, b"key", b"value");
        buf.truncate(buf.len() - 2);
        let mut cursor = std::io::Cursor::new(buf);
        assert!(matches!(read_record(&mut cursor), ReadOutcome::EndOfLog));
    }

    #[test]
    fn bit_flip_in_payload_is_caught_by_crc() {
        let mut buf = Vec::new();
        encode_record(&mut buf, RecordKind::Put, 1, b"key", b"value");
        let last_key_byte = HEADER_SIZE + 1;
        buf[last_key_byte] ^= 0xFF;
        let mut cursor = std::io::Cursor::new(buf);
        assert!(matches!(read_record(&mut cursor), ReadOutcome::EndOfLog));
    }

    #[test]
    fn bad_magic_is_end_of_log() {
        let mut buf = Vec::new();
        encode_record(&mut buf, RecordKind::Put, 1, b"key", b"value");
        buf[0] = 0;
        let mut cursor = std::io::Cursor::new(buf);
        assert!(matches!(read_record(&mut cursor), ReadOutcome::EndOfLog));
    }
}
