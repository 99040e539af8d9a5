use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::http::response::{Body, Response};

const HTTP_VERSION: &str = "HTTP/1.1";

/// Buffer size for streaming file bodies
const FILE_CHUNK_SIZE: usize = 8192;

fn serialize_head(resp: &Response) -> Vec<u8> {
    let mut buf = Vec::new();

    // Status line
    let status_line = format!(
        "{} {} {}\r\n",
        HTTP_VERSION,
        resp.status.as_u16(),
        resp.status.reason_phrase()
    );
    buf.extend_from_slice(status_line.as_bytes());

    // Headers
    for (k, v) in &resp.headers {
        buf.extend_from_slice(k.as_bytes());
        buf.extend_from_slice(b": ");
        buf.extend_from_slice(v.as_bytes());
        buf.extend_from_slice(b"\r\n");
    }

    // Header/body separator
    buf.extend_from_slice(b"\r\n");

    buf
}

/// Serializes a response onto a connection: head first, then the body
/// according to its variant. One write path for all body kinds.
pub struct ResponseWriter {
    response: Response,
}

impl ResponseWriter {
    pub fn new(response: Response) -> Self {
        Self { response }
    }

    pub async fn write_to_stream(
        mut self,
        stream: &mut TcpStream,
    ) -> anyhow::Result<()> {
        let head = serialize_head(&self.response);
        stream.write_all(&head).await?;

        match &mut self.response.body {
            Body::Bytes(bytes) => {
                stream.write_all(bytes).await?;
            }
            Body::File { file, .. } => {
                let mut chunk = [0u8; FILE_CHUNK_SIZE];
                loop {
                    let n = file.read(&mut chunk).await?;
                    if n == 0 {
                        break;
                    }
                    stream.write_all(&chunk[..n]).await?;
                }
            }
            Body::Empty => {}
        }

        stream.flush().await?;
        Ok(())
    }
}
