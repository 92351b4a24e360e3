use crate::protocol::text::decoder::DecodeError;
use bytes::{BufMut, Bytes, BytesMut};

/// Snapshot emitted for one key of a retrieval command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueEntry {
    pub key: Bytes,
    pub flags: u32,
    pub cas: u64,
    pub data: Bytes,
}

/// Server reply, one variant per reply line family
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextResponse {
    Stored,
    NotStored,
    Exists,
    NotFound,
    Deleted,
    Touched,
    /// VALUE blocks in request order followed by END; gets adds the cas
    /// column.
    Values {
        entries: Vec<ValueEntry>,
        with_cas: bool,
    },
    /// New numeric value after incr/decr.
    Counter(u64),
    Error,
    ClientError(String),
    ServerError(String),
}

impl TextResponse {
    /// Protocol level errors are written even when the command carried
    /// noreply.
    pub fn is_protocol_error(&self) -> bool {
        matches!(
            self,
            TextResponse::Error | TextResponse::ClientError(_) | TextResponse::ServerError(_)
        )
    }
}

pub struct ResponseMessage {
    pub data: BytesMut,
}

#[derive(Default)]
pub struct TextEncoder {}

impl TextEncoder {
    pub fn new() -> TextEncoder {
        TextEncoder {}
    }

    pub fn encode_message(&self, msg: &TextResponse) -> ResponseMessage {
        let mut data = BytesMut::with_capacity(self.response_capacity(msg));
        match msg {
            TextResponse::Stored => data.put_slice(b"STORED\r\n"),
            TextResponse::NotStored => data.put_slice(b"NOT_STORED\r\n"),
            TextResponse::Exists => data.put_slice(b"EXISTS\r\n"),
            TextResponse::NotFound => data.put_slice(b"NOT_FOUND\r\n"),
            TextResponse::Deleted => data.put_slice(b"DELETED\r\n"),
            TextResponse::Touched => data.put_slice(b"TOUCHED\r\n"),
            TextResponse::Values { entries, with_cas } => {
                for entry in entries {
                    data.put_slice(b"VALUE ");
                    data.put_slice(&entry.key);
                    data.put_u8(b' ');
                    data.put_slice(entry.flags.to_string().as_bytes());
                    data.put_u8(b' ');
                    data.put_slice(entry.data.len().to_string().as_bytes());
                    if *with_cas {
                        data.put_u8(b' ');
                        data.put_slice(entry.cas.to_string().as_bytes());
                    }
                    data.put_slice(b"\r\n");
                    data.put_slice(&entry.data);
                    data.put_slice(b"\r\n");
                }
                data.put_slice(b"END\r\n");
            }
            TextResponse::Counter(value) => {
                data.put_slice(value.to_string().as_bytes());
                data.put_slice(b"\r\n");
            }
            TextResponse::Error => data.put_slice(b"ERROR\r\n"),
            TextResponse::ClientError(reason) => {
                data.put_slice(b"CLIENT_ERROR ");
                data.put_slice(reason.as_bytes());
                data.put_slice(b"\r\n");
            }
            TextResponse::ServerError(reason) => {
                data.put_slice(b"SERVER_ERROR ");
                data.put_slice(reason.as_bytes());
                data.put_slice(b"\r\n");
            }
        }
        ResponseMessage { data }
    }

    fn response_capacity(&self, msg: &TextResponse) -> usize {
        match msg {
            TextResponse::Values { entries, .. } => {
                entries
                    .iter()
                    .map(|entry| entry.key.len() + entry.data.len() + 64)
                    .sum::<usize>()
                    + 8
            }
            _ => 64,
        }
    }
}

/// Maps a decoder failure onto the reply written to the client.
pub fn decode_error_to_response(err: &DecodeError) -> TextResponse {
    match err {
        DecodeError::UnknownCommand => TextResponse::Error,
        DecodeError::LineTooLong => TextResponse::ClientError(String::from("bad command line")),
        DecodeError::BadCommandLine => {
            TextResponse::ClientError(String::from("bad command line format"))
        }
        DecodeError::KeyTooLong => TextResponse::ClientError(String::from("key too long")),
        DecodeError::BadDataChunk => TextResponse::ClientError(String::from("bad data chunk")),
        DecodeError::ItemTooLarge => {
            TextResponse::ServerError(String::from("object too large for cache"))
        }
        DecodeError::Io(err) => TextResponse::ServerError(err.to_string()),
    }
}
