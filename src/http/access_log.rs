use std::fmt;
use std::net::IpAddr;

use crate::http::parser::PartialLine;
use crate::http::request::Request;
use crate::http::response::StatusCode;

/// Placeholder printed for request line tokens that never arrived.
const MISSING: &str = "-";

/// One access log line: `<peer-ip> "<method> <uri> <version>" <status>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessRecord {
    pub peer: IpAddr,
    pub method: Option<String>,
    pub uri: Option<String>,
    pub version: Option<String>,
    pub status: StatusCode,
}

impl AccessRecord {
    pub fn for_request(peer: IpAddr, req: &Request, status: StatusCode) -> Self {
        Self {
            peer,
            method: Some(req.method.to_string()),
            uri: Some(req.uri.clone()),
            version: Some(req.version.clone()),
            status,
        }
    }

    pub fn for_partial(peer: IpAddr, line: PartialLine, status: StatusCode) -> Self {
        Self {
            peer,
            method: line.method,
            uri: line.uri,
            version: line.version,
            status,
        }
    }
}

impl fmt::Display for AccessRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let version = self
            .version
            .as_deref()
            .map(|v| v.replace('\r', ""))
            .unwrap_or_else(|| MISSING.to_string());

        write!(
            f,
            "{} \"{} {} {}\" {}",
            self.peer,
            self.method.as_deref().unwrap_or(MISSING),
            self.uri.as_deref().unwrap_or(MISSING),
            version,
            self.status
        )
    }
}

pub fn log_access(record: &AccessRecord) {
    tracing::info!(target: "access", "{}", record);
}
