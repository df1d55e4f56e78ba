use bytes::{BufMut, BytesMut};
use std::io;
use thiserror::Error as ThisError;
use tokio_util::codec::{Decoder, Encoder};

use crate::config::MAX_BATCH_SIZE;
use crate::response::Line;

const CRLF: &[u8; 2] = b"\r\n";

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("batch of {0} bytes without a line break exceeds the limit")]
    TooLarge(usize),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Frames a connection into command batches.
///
/// Inbound, everything up to and including the last line break in the buffer is one batch; a
/// trailing partial line waits for more data. Outbound, each [`Line`] is terminated with CR LF.
pub struct BatchCodec {
    max_batch_size: usize,
}

impl BatchCodec {
    pub fn new(max_batch_size: usize) -> BatchCodec {
        BatchCodec { max_batch_size }
    }
}

impl Default for BatchCodec {
    fn default() -> Self {
        Self::new(MAX_BATCH_SIZE)
    }
}

impl Decoder for BatchCodec {
    type Item = String;
    type Error = Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let Some(end) = src.iter().rposition(|&b| b == b'\n') else {
            if src.len() > self.max_batch_size {
                return Err(Error::TooLarge(src.len()));
            }
            return Ok(None); // Not a single complete line yet.
        };

        let batch = src.split_to(end + 1);
        Ok(Some(String::from_utf8_lossy(&batch).into_owned()))
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(batch) = self.decode(src)? {
            return Ok(Some(batch));
        }

        if src.is_empty() {
            return Ok(None);
        }

        let batch = src.split();
        Ok(Some(String::from_utf8_lossy(&batch).into_owned()))
    }
}

impl Encoder<Line> for BatchCodec {
    type Error = Error;

    fn encode(&mut self, line: Line, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let line = line.to_string();
        dst.reserve(line.len() + CRLF.len());
        dst.put_slice(line.as_bytes());
        dst.put_slice(CRLF);
        Ok(())
    }
}
