use std::fmt;

/// Marker that routes a request to the lookup backend instead of the filesystem.
pub const QUERY_MARKER: &str = "?key=";

/// HTTP request methods.
///
/// Only GET is served for static paths; anything else is answered with
/// 501 Not Implemented. Unknown tokens are kept verbatim so they can be
/// logged exactly as received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    /// GET - Retrieve a resource
    GET,
    /// POST - Create or submit data
    POST,
    /// PUT - Replace a resource
    PUT,
    /// DELETE - Delete a resource
    DELETE,
    /// HEAD - Like GET but without the response body
    HEAD,
    /// OPTIONS - Describe communication options
    OPTIONS,
    /// PATCH - Partial modification of a resource
    PATCH,
    /// Any other token, case preserved
    Other(String),
}

impl Method {
    /// Parses an HTTP method token. Matching is case-sensitive, so `get`
    /// becomes `Method::Other("get")`.
    ///
    /// # Example
    ///
    /// ```
    /// # use keyhttpd::http::request::Method;
    /// assert_eq!(Method::parse("GET"), Method::GET);
    /// assert_eq!(Method::parse("get"), Method::Other("get".to_string()));
    /// ```
    pub fn parse(s: &str) -> Self {
        match s {
            "GET" => Method::GET,
            "POST" => Method::POST,
            "PUT" => Method::PUT,
            "DELETE" => Method::DELETE,
            "HEAD" => Method::HEAD,
            "OPTIONS" => Method::OPTIONS,
            "PATCH" => Method::PATCH,
            other => Method::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Method::GET => "GET",
            Method::POST => "POST",
            Method::PUT => "PUT",
            Method::DELETE => "DELETE",
            Method::HEAD => "HEAD",
            Method::OPTIONS => "OPTIONS",
            Method::PATCH => "PATCH",
            Method::Other(s) => s,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a request is answered from, decided once when the request line is parsed.
///
/// Both variants keep the raw URI bytes so that names which are not valid
/// UTF-8 still reach the filesystem and the backend untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestTarget {
    /// Served from the document root; holds the URI
    Static(Vec<u8>),
    /// Forwarded to the UDP backend; holds the decoded lookup term
    DynamicQuery(Vec<u8>),
}

impl RequestTarget {
    /// Classifies a URI.
    ///
    /// A URI containing `?key=` is a lookup. The term is everything after the
    /// first `=` in the URI, with `+` decoded to a space. No percent-decoding
    /// is done.
    pub fn from_uri(uri: impl AsRef<[u8]>) -> Self {
        let uri = uri.as_ref();
        let marker = QUERY_MARKER.as_bytes();

        if !uri.windows(marker.len()).any(|w| w == marker) {
            return RequestTarget::Static(uri.to_vec());
        }

        let term = match uri.iter().position(|&b| b == b'=') {
            Some(eq) => &uri[eq + 1..],
            None => &[][..],
        };
        let decoded = term
            .iter()
            .map(|&b| if b == b'+' { b' ' } else { b })
            .collect();
        RequestTarget::DynamicQuery(decoded)
    }

    pub fn is_dynamic(&self) -> bool {
        matches!(self, RequestTarget::DynamicQuery(_))
    }
}

/// A parsed request line: `METHOD URI VERSION`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// The HTTP method token
    pub method: Method,
    /// The request URI, lossily decoded for logging
    pub uri: String,
    /// Protocol version token (not validated)
    pub version: String,
    /// Routing decision derived from the raw URI bytes
    pub target: RequestTarget,
}

impl Request {
    pub fn new(method: Method, uri: impl Into<String>, version: impl Into<String>) -> Self {
        let uri = uri.into();
        let target = RequestTarget::from_uri(&uri);
        Self {
            method,
            uri,
            version: version.into(),
            target,
        }
    }

    /// Builds a request from the URI exactly as it arrived on the wire.
    pub fn from_raw_uri(method: Method, uri: &[u8], version: impl Into<String>) -> Self {
        Self {
            method,
            uri: String::from_utf8_lossy(uri).into_owned(),
            version: version.into(),
            target: RequestTarget::from_uri(uri),
        }
    }

    pub fn is_get(&self) -> bool {
        self.method == Method::GET
    }
}
