//! Newline-delimited JSON-RPC framing.
//!
//! - Messages are UTF-8 JSON, one per line, without embedded newlines
//! - The process transport reads stdin and writes stdout
//! - stderr is reserved for logs
//!
//! The framing is generic over any buffered reader and writer so the server
//! loop can be driven in memory.

use std::io;

use serde::Serialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use crate::mcp::protocol::{JsonRpcError, JsonRpcResponse};

/// Line-framed JSON-RPC transport over a reader/writer pair.
pub struct LineTransport<R, W> {
    reader: R,
    writer: W,
}

/// The process transport: stdin in, stdout out.
pub type StdioTransport = LineTransport<BufReader<tokio::io::Stdin>, tokio::io::Stdout>;

impl StdioTransport {
    /// Creates a transport over the process's standard streams.
    #[must_use]
    pub fn stdio() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
    }
}

impl<R, W> LineTransport<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    /// Wraps a reader and writer.
    pub const fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    /// The underlying writer.
    pub const fn writer(&self) -> &W {
        &self.writer
    }

    /// Reads the next message line.
    ///
    /// Returns `None` once the reader is closed.
    ///
    /// # Errors
    ///
    /// Returns an error if reading fails.
    pub async fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        let bytes_read = self.reader.read_line(&mut line).await?;

        if bytes_read == 0 {
            return Ok(None);
        }

        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }

        Ok(Some(line))
    }

    /// Writes a success response.
    ///
    /// # Errors
    ///
    /// Returns an error if serialisation or writing fails.
    pub async fn write_response(&mut self, response: &JsonRpcResponse) -> io::Result<()> {
        self.write_message(response).await
    }

    /// Writes an error response.
    ///
    /// # Errors
    ///
    /// Returns an error if serialisation or writing fails.
    pub async fn write_error(&mut self, error: &JsonRpcError) -> io::Result<()> {
        self.write_message(error).await
    }

    async fn write_message<T: Serialize + Sync>(&mut self, message: &T) -> io::Result<()> {
        let json = serde_json::to_string(message)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        debug_assert!(
            !json.contains('\n'),
            "JSON message must not contain embedded newlines"
        );

        self.writer.write_all(json.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mcp::protocol::RequestId;

    #[tokio::test]
    async fn reads_lines_and_strips_crlf() {
        let input: &[u8] = b"{\"a\":1}\r\n{\"b\":2}\n";
        let mut transport = LineTransport::new(input, Vec::new());

        assert_eq!(transport.read_line().await.unwrap().as_deref(), Some("{\"a\":1}"));
        assert_eq!(transport.read_line().await.unwrap().as_deref(), Some("{\"b\":2}"));
        assert_eq!(transport.read_line().await.unwrap(), None);
    }

    #[tokio::test]
    async fn writes_one_message_per_line() {
        let mut transport = LineTransport::new(&b""[..], Vec::new());
        let response = JsonRpcResponse::success(
            RequestId::Number(1),
            serde_json::json!({"message": "line one\nline two", "nested": {"key": "value"}}),
        );
        transport.write_response(&response).await.unwrap();
        transport
            .write_error(&JsonRpcError::method_not_found(RequestId::Number(2), "nope"))
            .await
            .unwrap();

        let written = String::from_utf8(transport.writer).unwrap();
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains(r#""id":1"#));
        assert!(lines[1].contains("-32601"));
    }
}
