use crate::http::request::{Method, Request};

/// Whatever tokens a malformed request line did carry, kept for the access log.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialLine {
    pub method: Option<String>,
    pub uri: Option<String>,
    pub version: Option<String>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum ParseError {
    /// No line terminator yet; more bytes may complete the request line
    Incomplete,
    /// Fewer than three tokens on the request line
    MissingToken(PartialLine),
}

/// Parses the request line at the start of `buf`.
///
/// Returns the request and the number of bytes consumed (through the `\n`).
/// Yields `ParseError::Incomplete` until a line terminator has been received.
pub fn parse_request_line(buf: &[u8]) -> Result<(Request, usize), ParseError> {
    let line_end = buf
        .iter()
        .position(|&b| b == b'\n')
        .ok_or(ParseError::Incomplete)?;

    let request = tokenize(&buf[..line_end])?;
    Ok((request, line_end + 1))
}

/// Parses `buf` as a request line that will never be terminated, either
/// because the peer stopped sending or the buffer limit was reached.
pub fn parse_unterminated(buf: &[u8]) -> Result<Request, ParseError> {
    tokenize(buf)
}

fn tokenize(line: &[u8]) -> Result<Request, ParseError> {
    let mut parts = line
        .split(|b| b.is_ascii_whitespace())
        .filter(|token| !token.is_empty());

    let method = parts.next();
    let uri = parts.next();
    let version = parts.next();

    match (method, uri, version) {
        (Some(method), Some(uri), Some(version)) => Ok(Request::from_raw_uri(
            Method::parse(&String::from_utf8_lossy(method)),
            uri,
            String::from_utf8_lossy(version),
        )),
        (method, uri, version) => Err(ParseError::MissingToken(PartialLine {
            method: method.map(lossy),
            uri: uri.map(lossy),
            version: version.map(lossy),
        })),
    }
}

fn lossy(token: &[u8]) -> String {
    String::from_utf8_lossy(token).into_owned()
}
