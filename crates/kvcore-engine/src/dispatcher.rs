use std::io::{self, ErrorKind, Read, Write};

use kvcore_vfs::Filesystem;

use crate::engine::Engine;
use crate::error::EngineError;

/// A decoded request (spec §4.6, §6.2). `op` codes on the wire: 1=Get,
/// 2=Put, 3=Delete, 4=Stats.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Get { key: Vec<u8> },
    Put { key: Vec<u8>, value: Vec<u8> },
    Delete { key: Vec<u8> },
    Stats,
}

/// Wire status codes (spec §4.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok = 0,
    NotFound = 1,
    ClientError = 2,
    ServerError = 3,
}

enum DecodedFrame {
    Valid(Request),
    /// Unknown op code or a payload that doesn't match its op's shape.
    /// Not a transport error: the connection stays open and gets a
    /// `ClientError` response (spec §7: InvalidArgument-class input
    /// errors "do not perturb engine state").
    Invalid,
}

fn take_u32(buf: &[u8]) -> Option<(u32, &[u8])> {
    if buf.len() < 4 {
        return None;
    }
    let (head, tail) = buf.split_at(4);
    #[expect(clippy::unwrap_used, reason = "head is exactly 4 bytes by construction")]
    Some((u32::from_le_bytes(head.try_into().unwrap()), tail))
}

fn decode_length_prefixed(payload: &[u8]) -> Option<&[u8]> {
    let (len, rest) = take_u32(payload)?;
    (rest.len() == len as usize).then_some(rest)
}

fn decode_get_or_delete(payload: &[u8]) -> Option<Vec<u8>> {
    decode_length_prefixed(payload).map(<[u8]>::to_vec)
}

fn decode_put(payload: &[u8]) -> Option<(Vec<u8>, Vec<u8>)> {
    let (key_len, rest) = take_u32(payload)?;
    let key_len = key_len as usize;
    if rest.len() < key_len {
        return None;
    }
    let (key, rest) = rest.split_at(key_len);
    let value = decode_length_prefixed(rest)?;
    Some((key.to_vec(), value.to_vec()))
}

fn decode_frame(op: u8, payload: &[u8]) -> DecodedFrame {
    let request = match op {
        1 => decode_get_or_delete(payload).map(|key| Request::Get { key }),
        2 => decode_put(payload).map(|(key, value)| Request::Put { key, value }),
        3 => decode_get_or_delete(payload).map(|key| Request::Delete { key }),
        4 => payload.is_empty().then_some(Request::Stats),
        _ => None,
    };
    request.map_or(DecodedFrame::Invalid, DecodedFrame::Valid)
}

/// Reads one length-framed request record (`[u32 length][u8 op][payload]`,
/// spec §4.6), where `length` covers the `op` byte and everything after
/// it. Returns `Ok(None)` on a clean end-of-stream before the next frame's
/// length prefix, matching the WAL reader's "truncation is not an error"
/// stance at a transport boundary instead of a storage one.
fn read_request(reader: &mut impl Read) -> io::Result<Option<DecodedFrame>> {
    let mut len_buf = [0_u8; 4];
    match reader.read_exact(&mut len_buf) {
        Ok(()) => {}
        Err(err) if err.kind() == ErrorKind::UnexpectedEof => return Ok(None),
        Err(err) => return Err(err),
    }
    let len = u32::from_le_bytes(len_buf) as usize;
    if len == 0 {
        return Ok(Some(DecodedFrame::Invalid));
    }
    let mut frame = vec![0_u8; len];
    reader.read_exact(&mut frame)?;
    #[expect(clippy::indexing_slicing, reason = "len == 0 was handled above")]
    let (op, payload) = (frame[0], &frame[1..]);
    Ok(Some(decode_frame(op, payload)))
}

fn write_response(writer: &mut impl Write, status: Status, payload: &[u8]) -> io::Result<()> {
    #[expect(clippy::cast_possible_truncation, reason = "responses never approach u32::MAX bytes")]
    let len = 1 + payload.len() as u32;
    writer.write_all(&len.to_le_bytes())?;
    writer.write_all(&[status as u8])?;
    writer.write_all(payload)?;
    Ok(())
}

fn encode_value(value: &[u8]) -> Vec<u8> {
    #[expect(clippy::cast_possible_truncation, reason = "values never approach u32::MAX bytes")]
    let len = value.len() as u32;
    let mut out = Vec::with_capacity(4 + value.len());
    out.extend_from_slice(&len.to_le_bytes());
    out.extend_from_slice(value);
    out
}

fn status_for(err: &EngineError) -> Status {
    match err {
        EngineError::InvalidArgument => Status::ClientError,
        EngineError::IoFailed(_)
        | EngineError::Corrupted(_)
        | EngineError::Busy
        | EngineError::Cancelled
        | EngineError::Timeout
        | EngineError::Closed
        | EngineError::Internal(_) => Status::ServerError,
    }
}

/// Binds one [`Engine`] to the wire protocol (spec §4.6): decodes request
/// frames, invokes the matching engine operation, encodes response
/// frames. Single-threaded per connection; a process serves many
/// connections concurrently by running one [`Dispatcher::handle_one`]
/// loop per connection, e.g. one task per connection on a
/// `kvcore-runtime` `Runtime`.
pub struct Dispatcher<'engine, F: Filesystem> {
    engine: &'engine Engine<F>,
}

impl<'engine, F: Filesystem> Dispatcher<'engine, F> {
    #[must_use]
    pub fn new(engine: &'engine Engine<F>) -> Self {
        Self { engine }
    }

    /// Runs `request` against the engine and returns the response it
    /// produces. Pure function of engine state; callers own all I/O.
    #[must_use]
    pub fn dispatch(&self, request: Request) -> (Status, Vec<u8>) {
        match request {
            Request::Get { key } => match self.engine.get(&key) {
                Ok(Some(value)) => (Status::Ok, encode_value(&value)),
                Ok(None) => (Status::NotFound, Vec::new()),
                Err(err) => (status_for(&err), Vec::new()),
            },
            Request::Put { key, value } => match self.engine.put(&key, &value) {
                Ok(()) => (Status::Ok, Vec::new()),
                Err(err) => (status_for(&err), Vec::new()),
            },
            Request::Delete { key } => match self.engine.delete(&key) {
                Ok(()) => (Status::Ok, Vec::new()),
                Err(err) => (status_for(&err), Vec::new()),
            },
            Request::Stats => match self.engine.stats() {
                Ok(stats) => (Status::Ok, stats.to_string().into_bytes()),
                Err(err) => (status_for(&err), Vec::new()),
            },
        }
    }

    /// Async wrapper around [`Self::dispatch`] for a task running on a
    /// `kvcore-runtime` `Runtime` (spec §1(c), §4.7). Engine operations
    /// are non-suspending from the runtime's point of view (spec §5): the
    /// returned future never actually parks, it only gives callers on the
    /// runtime a uniform `.await`-able surface over what is otherwise a
    /// synchronous, briefly-blocking call.
    pub async fn dispatch_async(&self, request: Request) -> (Status, Vec<u8>) {
        self.dispatch(request)
    }

    /// One request/response round trip over any byte stream (spec §4.6:
    /// "requests on one connection are processed strictly in receive
    /// order; responses are emitted in request order"). Returns `Ok(false)`
    /// once the peer has closed the connection before a next request.
    pub fn handle_one(&self, reader: &mut impl Read, writer: &mut impl Write) -> io::Result<bool> {
        let Some(frame) = read_request(reader)? else { return Ok(false) };
        let (status, payload) = match frame {
            DecodedFrame::Valid(request) => self.dispatch(request),
            DecodedFrame::Invalid => (Status::ClientError, Vec::new()),
        };
        write_response(writer, status, &payload)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_frame_rejects_a_put_with_a_truncated_value_length() {
        let mut payload = Vec::new();
        payload.extend_from_slice(&3_u32.to_le_bytes());
        payload.extend_from_slice(b"key");
        payload.extend_from_slice(&99_u32.to_le_bytes()); // claims far more value bytes than are present
        assert!(matches!(decode_frame(2, &payload), DecodedFrame::Invalid));
    }

    #[test]
    fn decode_frame_rejects_an_unknown_op_code() {
        assert!(matches!(decode_frame(9, &[]), DecodedFrame::Invalid));
    }

    #[test]
    fn decode_frame_rejects_a_non_empty_stats_payload() {
        assert!(matches!(decode_frame(4, b"unexpected"), DecodedFrame::Invalid));
    }

    #[test]
    fn decode_frame_accepts_a_well_formed_get() {
        let mut payload = Vec::new();
        payload.extend_from_slice(&3_u32.to_le_bytes());
        payload.extend_from_slice(b"key");
        let DecodedFrame::Valid(Request::Get { key }) = decode_frame(1, &payload) else {
            panic!("expected a valid Get request");
        };
        assert_eq!(key.as_slice(), b"key".as_slice());
    }

    #[test]
    fn encode_value_prefixes_the_length_as_little_endian_u32() {
        assert_eq!(encode_value(b"hi"), vec![2, 0, 0, 0, b'h', b'i']);
    }
}
