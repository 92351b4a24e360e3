use bytes::{Bytes, BytesMut};
use std::str;
use thiserror::Error;
use tokio_util::codec::Decoder;

/// Longest accepted command line, terminator included.
pub const MAX_LINE_LENGTH: usize = 1024;

/// Client request, one variant per opcode
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextRequest {
    Get(RetrievalRequest),
    Gets(RetrievalRequest),
    Set(StoreRequest),
    Add(StoreRequest),
    Replace(StoreRequest),
    Append(StoreRequest),
    Prepend(StoreRequest),
    Cas(StoreRequest),
    Delete(DeleteRequest),
    Increment(CounterRequest),
    Decrement(CounterRequest),
    Touch(TouchRequest),
}

impl TextRequest {
    pub fn is_noreply(&self) -> bool {
        match self {
            TextRequest::Get(_) | TextRequest::Gets(_) => false,

            TextRequest::Set(request)
            | TextRequest::Add(request)
            | TextRequest::Replace(request)
            | TextRequest::Append(request)
            | TextRequest::Prepend(request)
            | TextRequest::Cas(request) => request.noreply,

            TextRequest::Delete(request) => request.noreply,

            TextRequest::Increment(request) | TextRequest::Decrement(request) => request.noreply,

            TextRequest::Touch(request) => request.noreply,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrievalRequest {
    pub keys: Vec<Bytes>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreRequest {
    pub key: Bytes,
    pub flags: u32,
    pub exp_time: i64,
    pub data_size: usize,
    pub cas_unique: u64,
    pub noreply: bool,
    pub data: Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteRequest {
    pub key: Bytes,
    pub noreply: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CounterRequest {
    pub key: Bytes,
    pub delta: u64,
    pub noreply: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TouchRequest {
    pub key: Bytes,
    pub exp_time: i64,
    pub noreply: bool,
}

#[derive(Debug, Error)]
pub enum DecodeError {
    /// Opcode not in the command table, answered with ERROR.
    #[error("unknown command")]
    UnknownCommand,

    /// Command line longer than MAX_LINE_LENGTH. The stream offset is
    /// unknown afterwards, so this one closes the connection.
    #[error("bad command line")]
    LineTooLong,

    /// Wrong arity, malformed integer, stray carriage return, misplaced
    /// noreply or surplus tokens.
    #[error("bad command line format")]
    BadCommandLine,

    #[error("key too long")]
    KeyTooLong,

    /// Data block not terminated by CRLF. The block itself has been
    /// consumed, decoding resumes at the next line.
    #[error("bad data chunk")]
    BadDataChunk,

    /// Declared data size above the configured item limit.
    #[error("object too large for cache")]
    ItemTooLarge,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl DecodeError {
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            DecodeError::LineTooLong | DecodeError::ItemTooLarge | DecodeError::Io(_)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StorageOpcode {
    Set,
    Add,
    Replace,
    Append,
    Prepend,
    Cas,
}

#[derive(Debug)]
enum DecoderState {
    AwaitingCommand,
    ReadingData {
        opcode: StorageOpcode,
        request: StoreRequest,
    },
}

/// Streaming decoder for the memcached text protocol.
///
/// Lines are extracted up to the CRLF terminator and dispatched on the
/// opcode token; storage commands switch the decoder into a second state
/// that reads the raw data block of `data_size + 2` bytes. Whenever a
/// recoverable error is returned the offending bytes have already been
/// consumed, so the caller can keep decoding from the next line.
pub struct TextDecoder {
    state: DecoderState,
    item_size_limit: usize,
    key_size_limit: usize,
}

impl TextDecoder {
    pub fn new(item_size_limit: usize, key_size_limit: usize) -> TextDecoder {
        TextDecoder {
            state: DecoderState::AwaitingCommand,
            item_size_limit,
            key_size_limit,
        }
    }

    /// True when no partially decoded command is pending.
    pub fn is_idle(&self) -> bool {
        matches!(self.state, DecoderState::AwaitingCommand)
    }

    fn take_line(&mut self, src: &mut BytesMut) -> Result<Option<Bytes>, DecodeError> {
        match src.iter().position(|&byte| byte == b'\n') {
            Some(position) => {
                if position + 1 > MAX_LINE_LENGTH {
                    return Err(DecodeError::LineTooLong);
                }
                let mut line = src.split_to(position + 1);
                line.truncate(position);
                if line.last() != Some(&b'\r') {
                    return Err(DecodeError::BadCommandLine);
                }
                line.truncate(position - 1);
                if line.iter().any(|&byte| byte == b'\r') {
                    return Err(DecodeError::BadCommandLine);
                }
                Ok(Some(line.freeze()))
            }
            None => {
                if src.len() > MAX_LINE_LENGTH {
                    return Err(DecodeError::LineTooLong);
                }
                Ok(None)
            }
        }
    }

    fn split_tokens(line: &Bytes) -> Result<Vec<Bytes>, DecodeError> {
        let mut tokens = Vec::new();
        let mut start = 0;
        for (index, &byte) in line.iter().enumerate() {
            if byte == b' ' {
                if index == start {
                    return Err(DecodeError::BadCommandLine);
                }
                tokens.push(line.slice(start..index));
                start = index + 1;
            }
        }
        if start < line.len() {
            tokens.push(line.slice(start..));
        } else if !line.is_empty() {
            // trailing space
            return Err(DecodeError::BadCommandLine);
        }
        Ok(tokens)
    }

    fn parse_line(
        &mut self,
        line: Bytes,
        src: &mut BytesMut,
    ) -> Result<Option<TextRequest>, DecodeError> {
        let tokens = TextDecoder::split_tokens(&line)?;
        let opcode = match tokens.first() {
            Some(opcode) => opcode,
            None => return Err(DecodeError::UnknownCommand),
        };
        match opcode.as_ref() {
            b"get" => self.build_retrieval(&tokens, false).map(Some),
            b"gets" => self.build_retrieval(&tokens, true).map(Some),
            b"set" => self.begin_storage(StorageOpcode::Set, &tokens, src),
            b"add" => self.begin_storage(StorageOpcode::Add, &tokens, src),
            b"replace" => self.begin_storage(StorageOpcode::Replace, &tokens, src),
            b"append" => self.begin_storage(StorageOpcode::Append, &tokens, src),
            b"prepend" => self.begin_storage(StorageOpcode::Prepend, &tokens, src),
            b"cas" => self.begin_storage(StorageOpcode::Cas, &tokens, src),
            b"delete" => self.build_delete(&tokens).map(Some),
            b"incr" => self.build_counter(&tokens, true).map(Some),
            b"decr" => self.build_counter(&tokens, false).map(Some),
            b"touch" => self.build_touch(&tokens).map(Some),
            _ => Err(DecodeError::UnknownCommand),
        }
    }

    fn build_retrieval(
        &self,
        tokens: &[Bytes],
        with_cas: bool,
    ) -> Result<TextRequest, DecodeError> {
        if tokens.len() < 2 {
            return Err(DecodeError::BadCommandLine);
        }
        let mut keys = Vec::with_capacity(tokens.len() - 1);
        for token in &tokens[1..] {
            keys.push(self.parse_key(token)?);
        }
        let request = RetrievalRequest { keys };
        if with_cas {
            Ok(TextRequest::Gets(request))
        } else {
            Ok(TextRequest::Get(request))
        }
    }

    fn begin_storage(
        &mut self,
        opcode: StorageOpcode,
        tokens: &[Bytes],
        src: &mut BytesMut,
    ) -> Result<Option<TextRequest>, DecodeError> {
        let required = if opcode == StorageOpcode::Cas { 6 } else { 5 };
        if tokens.len() < required {
            return Err(DecodeError::BadCommandLine);
        }
        let noreply = parse_noreply(tokens, required)?;
        let key = self.parse_key(&tokens[1])?;
        let flags = parse_unsigned::<u32>(&tokens[2])?;
        let exp_time = parse_exp_time(&tokens[3])?;
        let data_size = parse_unsigned::<usize>(&tokens[4])?;
        let cas_unique = if opcode == StorageOpcode::Cas {
            parse_unsigned::<u64>(&tokens[5])?
        } else {
            0
        };
        if data_size > self.item_size_limit {
            return Err(DecodeError::ItemTooLarge);
        }
        let request = StoreRequest {
            key,
            flags,
            exp_time,
            data_size,
            cas_unique,
            noreply,
            data: Bytes::new(),
        };
        self.state = DecoderState::ReadingData { opcode, request };
        // the data block may already be buffered
        self.take_data(src)
    }

    fn take_data(&mut self, src: &mut BytesMut) -> Result<Option<TextRequest>, DecodeError> {
        let state = std::mem::replace(&mut self.state, DecoderState::AwaitingCommand);
        let (opcode, mut request) = match state {
            DecoderState::ReadingData { opcode, request } => (opcode, request),
            DecoderState::AwaitingCommand => unreachable!(),
        };
        let total = request.data_size + 2;
        if src.len() < total {
            src.reserve(total - src.len());
            self.state = DecoderState::ReadingData { opcode, request };
            return Ok(None);
        }
        let mut block = src.split_to(total);
        if &block[request.data_size..] != b"\r\n" {
            return Err(DecodeError::BadDataChunk);
        }
        block.truncate(request.data_size);
        request.data = block.freeze();
        let request = match opcode {
            StorageOpcode::Set => TextRequest::Set(request),
            StorageOpcode::Add => TextRequest::Add(request),
            StorageOpcode::Replace => TextRequest::Replace(request),
            StorageOpcode::Append => TextRequest::Append(request),
            StorageOpcode::Prepend => TextRequest::Prepend(request),
            StorageOpcode::Cas => TextRequest::Cas(request),
        };
        Ok(Some(request))
    }

    fn build_delete(&self, tokens: &[Bytes]) -> Result<TextRequest, DecodeError> {
        if tokens.len() < 2 {
            return Err(DecodeError::BadCommandLine);
        }
        let noreply = parse_noreply(tokens, 2)?;
        let key = self.parse_key(&tokens[1])?;
        Ok(TextRequest::Delete(DeleteRequest { key, noreply }))
    }

    fn build_counter(&self, tokens: &[Bytes], increment: bool) -> Result<TextRequest, DecodeError> {
        if tokens.len() < 3 {
            return Err(DecodeError::BadCommandLine);
        }
        let noreply = parse_noreply(tokens, 3)?;
        let key = self.parse_key(&tokens[1])?;
        let delta = parse_unsigned::<u64>(&tokens[2])?;
        let request = CounterRequest {
            key,
            delta,
            noreply,
        };
        if increment {
            Ok(TextRequest::Increment(request))
        } else {
            Ok(TextRequest::Decrement(request))
        }
    }

    fn build_touch(&self, tokens: &[Bytes]) -> Result<TextRequest, DecodeError> {
        if tokens.len() < 3 {
            return Err(DecodeError::BadCommandLine);
        }
        let noreply = parse_noreply(tokens, 3)?;
        let key = self.parse_key(&tokens[1])?;
        let exp_time = parse_exp_time(&tokens[2])?;
        Ok(TextRequest::Touch(TouchRequest {
            key,
            exp_time,
            noreply,
        }))
    }

    fn parse_key(&self, token: &Bytes) -> Result<Bytes, DecodeError> {
        if token.len() > self.key_size_limit {
            return Err(DecodeError::KeyTooLong);
        }
        if token.iter().any(|&byte| byte <= 0x20 || byte == 0x7f) {
            return Err(DecodeError::BadCommandLine);
        }
        Ok(token.clone())
    }
}

impl Decoder for TextDecoder {
    type Item = TextRequest;
    type Error = DecodeError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<TextRequest>, DecodeError> {
        if self.is_idle() {
            let line = match self.take_line(src)? {
                Some(line) => line,
                None => return Ok(None),
            };
            self.parse_line(line, src)
        } else {
            self.take_data(src)
        }
    }
}

/// Integers on the wire are unsigned decimal, a leading sign is not
/// accepted.
fn parse_unsigned<T: str::FromStr>(token: &Bytes) -> Result<T, DecodeError> {
    if token.is_empty() || !token.iter().all(|byte| byte.is_ascii_digit()) {
        return Err(DecodeError::BadCommandLine);
    }
    str::from_utf8(token)
        .ok()
        .and_then(|token| token.parse::<T>().ok())
        .ok_or(DecodeError::BadCommandLine)
}

/// exp_time is the only integer allowed to be negative.
fn parse_exp_time(token: &Bytes) -> Result<i64, DecodeError> {
    match token.first() {
        Some(b'-') if token.len() > 1 => {
            let magnitude = parse_unsigned::<i64>(&token.slice(1..))?;
            Ok(-magnitude)
        }
        _ => parse_unsigned::<i64>(token),
    }
}

/// noreply, when present, must be the final token.
fn parse_noreply(tokens: &[Bytes], required_len: usize) -> Result<bool, DecodeError> {
    if tokens.len() == required_len {
        Ok(false)
    } else if tokens.len() == required_len + 1 {
        if tokens[required_len].as_ref() == b"noreply" {
            Ok(true)
        } else {
            Err(DecodeError::BadCommandLine)
        }
    } else {
        Err(DecodeError::BadCommandLine)
    }
}
