use keyhttpd::http::parser::{ParseError, PartialLine, parse_request_line, parse_unterminated};
use keyhttpd::http::request::{Method, RequestTarget};

#[test]
fn test_parse_simple_get_request() {
    let req = b"GET /index.html HTTP/1.0\r\n\r\n";
    let (parsed, consumed) = parse_request_line(req).unwrap();

    assert_eq!(parsed.method, Method::GET);
    assert_eq!(parsed.uri, "/index.html");
    assert_eq!(parsed.version, "HTTP/1.0");
    assert_eq!(consumed, b"GET /index.html HTTP/1.0\r\n".len());
}

#[test]
fn test_parse_bare_newline_terminator() {
    let (parsed, _) = parse_request_line(b"GET / HTTP/1.1\n").unwrap();

    assert_eq!(parsed.version, "HTTP/1.1");
}

#[test]
fn test_parse_tabs_separate_tokens() {
    let (parsed, _) = parse_request_line(b"GET\t/a.txt\tHTTP/1.0\r\n").unwrap();

    assert_eq!(parsed.uri, "/a.txt");
}

#[test]
fn test_parse_incomplete_without_line_end() {
    let result = parse_request_line(b"GET / HTTP/1.0");

    assert!(matches!(result, Err(ParseError::Incomplete)));
}

#[test]
fn test_parse_unterminated_line() {
    let parsed = parse_unterminated(b"GET / HTTP/1.0").unwrap();

    assert_eq!(parsed.method, Method::GET);
    assert_eq!(parsed.uri, "/");
}

#[test]
fn test_parse_missing_version() {
    let result = parse_request_line(b"GET /\r\n\r\n");

    assert_eq!(
        result.unwrap_err(),
        ParseError::MissingToken(PartialLine {
            method: Some("GET".to_string()),
            uri: Some("/".to_string()),
            version: None,
        })
    );
}

#[test]
fn test_parse_blank_line() {
    let result = parse_request_line(b"\r\n");

    assert_eq!(
        result.unwrap_err(),
        ParseError::MissingToken(PartialLine::default())
    );
}

#[test]
fn test_parse_unknown_method_is_kept() {
    let (parsed, _) = parse_request_line(b"BREW /pot HTTP/1.0\r\n").unwrap();

    assert_eq!(parsed.method, Method::Other("BREW".to_string()));
    assert!(!parsed.is_get());
}

#[test]
fn test_parse_extra_tokens_are_ignored() {
    let (parsed, _) = parse_request_line(b"GET / HTTP/1.0 trailing junk\r\n").unwrap();

    assert_eq!(parsed.version, "HTTP/1.0");
}

#[test]
fn test_parse_routes_lookup_at_parse_time() {
    let (parsed, _) = parse_request_line(b"GET /search?key=red+fox HTTP/1.0\r\n").unwrap();

    assert_eq!(parsed.target, RequestTarget::DynamicQuery(b"red fox".to_vec()));
}

#[test]
fn test_parse_non_utf8_uri_keeps_raw_bytes() {
    let (parsed, _) = parse_request_line(b"GET /\xff\xfe HTTP/1.0\r\n").unwrap();

    assert!(parsed.uri.starts_with('/'));
    assert_eq!(parsed.target, RequestTarget::Static(b"/\xff\xfe".to_vec()));
}
