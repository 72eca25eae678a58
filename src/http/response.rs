use std::fmt;

/// HTTP status codes the server can answer with.
///
/// - `Ok` (200): file or backend reply follows
/// - `BadRequest` (400): malformed request line or unsafe URI
/// - `NotFound` (404): no readable file at the resolved path
/// - `RequestTimeout` (408): the backend did not answer in time
/// - `NotImplemented` (501): non-GET method on a static path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 200 OK
    Ok,
    /// 400 Bad Request
    BadRequest,
    /// 404 Not Found
    NotFound,
    /// 408 Request Timeout
    RequestTimeout,
    /// 501 Not Implemented
    NotImplemented,
}

impl StatusCode {
    /// Returns the numeric HTTP status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use keyhttpd::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.as_u16(), 200);
    /// assert_eq!(StatusCode::RequestTimeout.as_u16(), 408);
    /// ```
    pub fn as_u16(&self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::BadRequest => 400,
            StatusCode::NotFound => 404,
            StatusCode::RequestTimeout => 408,
            StatusCode::NotImplemented => 501,
        }
    }

    /// Returns the standard HTTP reason phrase for this status code.
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::NotFound => "Not Found",
            StatusCode::RequestTimeout => "Request Timeout",
            StatusCode::NotImplemented => "Not Implemented",
        }
    }
}

/// Formats as `200 OK`, the form used in status lines and the access log.
impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.as_u16(), self.reason_phrase())
    }
}

/// A response whose body is fully in memory.
///
/// No entity headers are ever sent; the body ends when the connection closes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

impl Response {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            body: Vec::new(),
        }
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// A 200 OK response carrying `body`.
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self::new(StatusCode::Ok).with_body(body)
    }

    /// An error response. Protocol rejections (400, 501) carry a short HTML
    /// page; 404 and 408 are head-only.
    pub fn error(status: StatusCode) -> Self {
        match status {
            StatusCode::BadRequest | StatusCode::NotImplemented => Self::new(status)
                .with_body(format!("<html><body><h1>{}</h1></body></html>", status)),
            _ => Self::new(status),
        }
    }
}
