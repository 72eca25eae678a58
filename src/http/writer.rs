use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::http::response::{Response, StatusCode};

const HTTP_VERSION: &str = "HTTP/1.0";

/// Status line plus the blank line that ends the (empty) header block.
pub fn serialize_head(status: StatusCode) -> Vec<u8> {
    format!("{} {}\r\n\r\n", HTTP_VERSION, status).into_bytes()
}

fn serialize_response(resp: &Response) -> Vec<u8> {
    let mut buf = serialize_head(resp.status);
    buf.extend_from_slice(&resp.body);
    buf
}

pub struct ResponseWriter {
    buffer: Vec<u8>,
    written: usize,
}

impl ResponseWriter {
    pub fn new(response: &Response) -> Self {
        Self {
            buffer: serialize_response(response),
            written: 0,
        }
    }

    pub fn head(status: StatusCode) -> Self {
        Self {
            buffer: serialize_head(status),
            written: 0,
        }
    }

    pub async fn write_to_stream<W>(&mut self, stream: &mut W) -> anyhow::Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        while self.written < self.buffer.len() {
            let n = stream.write(&self.buffer[self.written..]).await?;

            if n == 0 {
                return Err(anyhow::anyhow!("connection closed while writing"));
            }

            self.written += n;
        }

        stream.flush().await?;
        Ok(())
    }
}

/// Copies `source` to `stream` in `chunk_size` pieces until end of file.
///
/// A failed send aborts the copy; nothing is retried. Returns the number of
/// body bytes written.
pub async fn stream_file<R, W>(
    source: &mut R,
    stream: &mut W,
    chunk_size: usize,
) -> anyhow::Result<u64>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut chunk = vec![0u8; chunk_size];
    let mut total = 0u64;

    loop {
        let n = source.read(&mut chunk).await?;
        if n == 0 {
            break;
        }

        stream.write_all(&chunk[..n]).await?;
        total += n as u64;
    }

    stream.flush().await?;
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn head_has_no_headers() {
        assert_eq!(
            serialize_head(StatusCode::NotFound),
            b"HTTP/1.0 404 Not Found\r\n\r\n".to_vec()
        );
    }

    #[tokio::test]
    async fn streams_in_small_chunks() {
        let data: Vec<u8> = (0..=255u8).cycle().take(10_000).collect();
        let mut source = &data[..];
        let mut sink = Vec::new();

        let n = stream_file(&mut source, &mut sink, 7).await.unwrap();

        assert_eq!(n, 10_000);
        assert_eq!(sink, data);
    }
}
