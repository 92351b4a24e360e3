use crate::protocol::text::decoder::{DecodeError, TextDecoder, TextRequest};
use crate::protocol::text::encoder::{ResponseMessage, TextEncoder, TextResponse};
use bytes::BytesMut;
use std::io;
use std::io::{Error, ErrorKind};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio_util::codec::Decoder;

const READ_BUFFER_SIZE: usize = 4096;

pub struct MemcacheTextConnection {
    stream: TcpStream,
    decoder: TextDecoder,
    encoder: TextEncoder,
    buffer: BytesMut,
}

impl MemcacheTextConnection {
    pub fn new(socket: TcpStream, item_size_limit: usize, key_size_limit: usize) -> Self {
        MemcacheTextConnection {
            stream: socket,
            decoder: TextDecoder::new(item_size_limit, key_size_limit),
            encoder: TextEncoder::new(),
            buffer: BytesMut::with_capacity(READ_BUFFER_SIZE),
        }
    }

    /// Pulls the next request out of the stream. Buffered bytes are
    /// drained before the socket is read again, so pipelined commands
    /// are decoded without extra reads.
    pub async fn read_request(&mut self) -> Result<Option<TextRequest>, DecodeError> {
        loop {
            // Attempt to parse a request from the buffered data. If
            // enough data has been buffered, the request is returned.
            if let Some(request) = self.decoder.decode(&mut self.buffer)? {
                return Ok(Some(request));
            }

            // There is not enough buffered data to read a request.
            // Attempt to read more data from the socket.
            //
            // On success, the number of bytes is returned. `0` indicates
            // "end of stream".
            if 0 == self.stream.read_buf(&mut self.buffer).await? {
                // The remote closed the connection. For this to be a
                // clean shutdown, there should be no data in the read
                // buffer and no partially decoded command.
                if self.buffer.is_empty() && self.decoder.is_idle() {
                    return Ok(None);
                }
                return Err(Error::new(
                    ErrorKind::ConnectionReset,
                    "connection reset by peer",
                )
                .into());
            }
        }
    }

    pub async fn write(&mut self, msg: &TextResponse) -> io::Result<()> {
        let message = self.encoder.encode_message(msg);
        self.write_data_to_stream(message).await?;
        Ok(())
    }

    async fn write_data_to_stream(&mut self, msg: ResponseMessage) -> io::Result<()> {
        self.stream.write_all(&msg.data[..]).await?;
        Ok(())
    }

    pub async fn shutdown(&mut self) -> io::Result<()> {
        self.stream.shutdown().await?;
        Ok(())
    }
}
