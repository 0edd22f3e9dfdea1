//! Raw Frame Reading
//!
//! Reads one command/response cycle from an adapter channel, byte by byte,
//! up to and including the prompt byte the adapter sends when it is ready
//! for the next command.

use crate::error::DecodeError;
use std::io::{self, Read};
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::debug;

/// ELM327 prompt character
pub const DEFAULT_PROMPT: u8 = b'>';

/// Bytes read from the channel for a single response
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawFrame {
    bytes: Vec<u8>,
    terminated: bool,
}

impl RawFrame {
    /// Build a frame from bytes already read off the channel
    pub fn new(bytes: Vec<u8>, prompt: u8) -> Self {
        let terminated = bytes.last() == Some(&prompt);
        Self { bytes, terminated }
    }

    /// Raw bytes, prompt included
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Whether the prompt byte was seen before the channel ended
    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Finite iterator over a channel's bytes.
///
/// Yields every byte up to and including `prompt`, then ends. Also ends
/// after the source reports end-of-stream or a read error. A fresh
/// iterator is needed for each command cycle.
pub struct FrameBytes<R> {
    bytes: io::Bytes<R>,
    prompt: u8,
    done: bool,
}

impl<R: Read> FrameBytes<R> {
    pub fn new(source: R, prompt: u8) -> Self {
        Self {
            bytes: source.bytes(),
            prompt,
            done: false,
        }
    }
}

impl<R: Read> Iterator for FrameBytes<R> {
    type Item = io::Result<u8>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.bytes.next() {
            Some(Ok(byte)) => {
                if byte == self.prompt {
                    self.done = true;
                }
                Some(Ok(byte))
            }
            Some(Err(err)) => {
                self.done = true;
                Some(Err(err))
            }
            None => {
                self.done = true;
                None
            }
        }
    }
}

/// Read one response frame from a blocking channel
pub fn read_frame<R: Read>(source: R, prompt: u8) -> Result<RawFrame, DecodeError> {
    let bytes = FrameBytes::new(source, prompt).collect::<io::Result<Vec<u8>>>()?;
    let frame = RawFrame::new(bytes, prompt);
    debug!(
        "Read frame of {} bytes (terminated: {})",
        frame.len(),
        frame.is_terminated()
    );
    Ok(frame)
}

/// Read one response frame from an async channel
pub async fn read_frame_async<R>(source: &mut R, prompt: u8) -> Result<RawFrame, DecodeError>
where
    R: AsyncRead + Unpin,
{
    let mut bytes = Vec::new();
    loop {
        match source.read_u8().await {
            Ok(byte) => {
                bytes.push(byte);
                if byte == prompt {
                    break;
                }
            }
            Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => break,
            Err(err) => return Err(DecodeError::Channel(err)),
        }
    }

    let frame = RawFrame::new(bytes, prompt);
    debug!(
        "Read frame of {} bytes (terminated: {})",
        frame.len(),
        frame.is_terminated()
    );
    Ok(frame)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Source that hands out a few bytes and then fails
    struct FailingSource {
        data: Vec<u8>,
        pos: usize,
    }

    impl Read for FailingSource {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.pos < self.data.len() && !buf.is_empty() {
                buf[0] = self.data[self.pos];
                self.pos += 1;
                Ok(1)
            } else {
                Err(io::Error::new(io::ErrorKind::TimedOut, "port timed out"))
            }
        }
    }

    #[test]
    fn test_stops_at_prompt() {
        let mut source: &[u8] = b"41 0F 40>41 0C";
        let frame = read_frame(&mut source, DEFAULT_PROMPT).unwrap();
        assert_eq!(frame.as_bytes(), b"41 0F 40>");
        assert!(frame.is_terminated());
        // next cycle's bytes stay in the channel
        assert_eq!(source, b"41 0C");
    }

    #[test]
    fn test_stops_at_end_of_stream() {
        let frame = read_frame(&b"41 0F"[..], DEFAULT_PROMPT).unwrap();
        assert_eq!(frame.as_bytes(), b"41 0F");
        assert!(!frame.is_terminated());
    }

    #[test]
    fn test_empty_source() {
        let frame = read_frame(&b""[..], DEFAULT_PROMPT).unwrap();
        assert!(frame.is_empty());
        assert!(!frame.is_terminated());
    }

    #[test]
    fn test_read_error_is_channel_error() {
        let source = FailingSource {
            data: b"41".to_vec(),
            pos: 0,
        };
        let err = read_frame(source, DEFAULT_PROMPT).unwrap_err();
        assert!(matches!(err, DecodeError::Channel(_)));
    }

    #[test]
    fn test_iterator_is_not_restartable() {
        let mut bytes = FrameBytes::new(&b"0>1"[..], DEFAULT_PROMPT);
        assert_eq!(bytes.next().unwrap().unwrap(), b'0');
        assert_eq!(bytes.next().unwrap().unwrap(), b'>');
        assert!(bytes.next().is_none());
        assert!(bytes.next().is_none());
    }

    #[test]
    fn test_custom_prompt() {
        let frame = read_frame(&b"OK\r#rest"[..], b'#').unwrap();
        assert_eq!(frame.as_bytes(), b"OK\r#");
    }

    #[tokio::test]
    async fn test_async_stops_at_prompt() {
        let mut source: &[u8] = b"41 0F 28>tail";
        let frame = read_frame_async(&mut source, DEFAULT_PROMPT).await.unwrap();
        assert_eq!(frame.as_bytes(), b"41 0F 28>");
        assert_eq!(source, b"tail");
    }

    #[tokio::test]
    async fn test_async_end_of_stream() {
        let mut source: &[u8] = b"NO DATA";
        let frame = read_frame_async(&mut source, DEFAULT_PROMPT).await.unwrap();
        assert_eq!(frame.as_bytes(), b"NO DATA");
        assert!(!frame.is_terminated());
    }
}
