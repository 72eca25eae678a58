use std::net::SocketAddr;

use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::config::Config;
use crate::http::access_log::{AccessRecord, log_access};
use crate::http::parser::{ParseError, PartialLine, parse_request_line, parse_unterminated};
use crate::http::request::{Request, RequestTarget};
use crate::http::resolve::resolve_path;
use crate::http::response::{Response, StatusCode};
use crate::http::static_files::open_static;
use crate::http::writer::{ResponseWriter, stream_file};
use crate::proxy::{QueryOutcome, QueryProxy};

/// Handles exactly one request on one client connection, then closes it.
pub struct Connection<'a, S> {
    stream: S,
    peer: SocketAddr,
    config: &'a Config,
    buffer: Vec<u8>,
    state: ConnectionState,
}

pub enum ConnectionState {
    Reading,
    Processing(Request),
    Writing(Reply, AccessRecord),
    Closed,
}

/// A response ready to go out.
pub enum Reply {
    Buffered(ResponseWriter),
    File(File),
}

enum ReadOutcome {
    Request(Request),
    Malformed(PartialLine),
    Closed,
}

impl<'a, S> Connection<'a, S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, peer: SocketAddr, config: &'a Config) -> Self {
        Self {
            stream,
            peer,
            config,
            buffer: Vec::with_capacity(1024),
            state: ConnectionState::Reading,
        }
    }

    pub async fn run(&mut self) -> anyhow::Result<()> {
        let result = self.drive().await;
        let _ = self.stream.shutdown().await;
        result
    }

    async fn drive(&mut self) -> anyhow::Result<()> {
        loop {
            match std::mem::replace(&mut self.state, ConnectionState::Closed) {
                ConnectionState::Reading => {
                    self.state = match self.read_request().await? {
                        ReadOutcome::Request(req) => ConnectionState::Processing(req),
                        ReadOutcome::Malformed(partial) => {
                            let status = StatusCode::BadRequest;
                            ConnectionState::Writing(
                                Self::error_reply(status),
                                AccessRecord::for_partial(self.peer.ip(), partial, status),
                            )
                        }
                        ReadOutcome::Closed => ConnectionState::Closed,
                    };
                }

                ConnectionState::Processing(req) => {
                    if let Some((reply, status)) = self.handle_request(&req).await {
                        let record = AccessRecord::for_request(self.peer.ip(), &req, status);
                        self.state = ConnectionState::Writing(reply, record);
                    }
                }

                ConnectionState::Writing(reply, record) => {
                    let sent = self.send(reply).await;
                    log_access(&record);
                    sent?;
                }

                ConnectionState::Closed => break,
            }
        }

        Ok(())
    }

    /// Buffers until the request line is terminated, the peer stops
    /// sending, or `max_request_bytes` is reached.
    async fn read_request(&mut self) -> anyhow::Result<ReadOutcome> {
        let limit = self.config.max_request_bytes;

        loop {
            match parse_request_line(&self.buffer) {
                Ok((request, _consumed)) => return Ok(ReadOutcome::Request(request)),
                Err(ParseError::MissingToken(partial)) => {
                    return Ok(ReadOutcome::Malformed(partial));
                }
                Err(ParseError::Incomplete) => {}
            }

            if self.buffer.len() >= limit {
                return Ok(self.finish_unterminated());
            }

            let mut temp = [0u8; 1024];
            let want = temp.len().min(limit - self.buffer.len());
            let n = self.stream.read(&mut temp[..want]).await?;

            if n == 0 {
                if self.buffer.is_empty() {
                    return Ok(ReadOutcome::Closed);
                }
                return Ok(self.finish_unterminated());
            }

            self.buffer.extend_from_slice(&temp[..n]);
        }
    }

    fn finish_unterminated(&self) -> ReadOutcome {
        match parse_unterminated(&self.buffer) {
            Ok(request) => ReadOutcome::Request(request),
            Err(ParseError::MissingToken(partial)) => ReadOutcome::Malformed(partial),
            Err(ParseError::Incomplete) => ReadOutcome::Malformed(PartialLine::default()),
        }
    }

    /// Routes the request. `None` means the connection is dropped without
    /// a response.
    async fn handle_request(&self, req: &Request) -> Option<(Reply, StatusCode)> {
        let uri = match &req.target {
            RequestTarget::DynamicQuery(term) => return self.handle_query(req, term).await,
            RequestTarget::Static(uri) => uri,
        };

        if !req.is_get() {
            return Some((Self::error_reply(StatusCode::NotImplemented), StatusCode::NotImplemented));
        }

        let path = match resolve_path(&self.config.doc_root, uri).await {
            Ok(path) => path,
            Err(status) => return Some((Self::error_reply(status), status)),
        };

        let root = self.config.strict_paths.then_some(self.config.doc_root.as_path());
        match open_static(&path, root).await {
            Some(file) => Some((Reply::File(file), StatusCode::Ok)),
            None => Some((Self::error_reply(StatusCode::NotFound), StatusCode::NotFound)),
        }
    }

    async fn handle_query(&self, req: &Request, term: &[u8]) -> Option<(Reply, StatusCode)> {
        let proxy = QueryProxy::new(
            self.config.backend_addr.clone(),
            self.config.query_timeout,
            self.config.max_reply_bytes,
        );

        match proxy.query(term).await {
            QueryOutcome::Reply(body) => {
                let writer = ResponseWriter::new(&Response::ok(body.to_vec()));
                Some((Reply::Buffered(writer), StatusCode::Ok))
            }
            QueryOutcome::TimedOut => Some((
                Self::error_reply(StatusCode::RequestTimeout),
                StatusCode::RequestTimeout,
            )),
            QueryOutcome::Failed(e) => {
                tracing::error!(
                    peer = %self.peer,
                    method = %req.method,
                    uri = %req.uri,
                    version = %req.version,
                    backend = proxy.backend_addr(),
                    error = %e,
                    "backend query failed, dropping connection"
                );
                None
            }
        }
    }

    async fn send(&mut self, reply: Reply) -> anyhow::Result<()> {
        match reply {
            Reply::Buffered(mut writer) => writer.write_to_stream(&mut self.stream).await,
            Reply::File(mut file) => {
                ResponseWriter::head(StatusCode::Ok)
                    .write_to_stream(&mut self.stream)
                    .await?;
                stream_file(&mut file, &mut self.stream, self.config.chunk_size).await?;
                Ok(())
            }
        }
    }

    fn error_reply(status: StatusCode) -> Reply {
        Reply::Buffered(ResponseWriter::new(&Response::error(status)))
    }
}
