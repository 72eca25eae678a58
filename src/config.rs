use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

const DEFAULT_DOC_ROOT: &str = "Webpage";
const DEFAULT_DB_HOST: &str = "127.0.0.1";

/// Process-wide startup configuration. Read-only once the server is running.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Address the TCP listener binds (all interfaces by default)
    pub listen_addr: String,
    /// Directory static URIs are resolved under
    pub doc_root: PathBuf,
    /// UDP address of the lookup backend
    pub backend_addr: String,
    /// Upper bound on each wait for a backend datagram
    pub query_timeout: Duration,
    /// Largest backend reply forwarded to the client; excess bytes are dropped
    pub max_reply_bytes: usize,
    /// Size of each read when streaming a static file
    pub chunk_size: usize,
    /// Largest request head buffered before parsing
    pub max_request_bytes: usize,
    /// Canonicalize resolved paths and require them to stay under `doc_root`
    pub strict_paths: bool,
    /// Pending connection queue length passed to listen(2)
    pub backlog: u32,
}

/// Optional overrides read from a YAML file.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileConfig {
    listen_addr: Option<String>,
    doc_root: Option<PathBuf>,
    backend_addr: Option<String>,
    query_timeout_ms: Option<u64>,
    max_reply_bytes: Option<usize>,
    chunk_size: Option<usize>,
    max_request_bytes: Option<usize>,
    strict_paths: Option<bool>,
    backlog: Option<u32>,
}

impl Config {
    pub fn new(server_port: u16, backend_port: u16) -> Self {
        Self {
            listen_addr: format!("0.0.0.0:{}", server_port),
            doc_root: PathBuf::from(DEFAULT_DOC_ROOT),
            backend_addr: format!("{}:{}", DEFAULT_DB_HOST, backend_port),
            query_timeout: Duration::from_secs(5),
            max_reply_bytes: 64 * 1024,
            chunk_size: 4096,
            max_request_bytes: 8192,
            strict_paths: false,
            backlog: 50,
        }
    }

    /// Builds the configuration from the command-line ports, applying
    /// `DOC_ROOT` and `DB_ADDR` from the environment when set.
    pub fn load(server_port: u16, backend_port: u16) -> Self {
        let mut cfg = Self::new(server_port, backend_port);

        if let Ok(root) = std::env::var("DOC_ROOT") {
            cfg.doc_root = PathBuf::from(root);
        }
        if let Ok(host) = std::env::var("DB_ADDR") {
            cfg.backend_addr = format!("{}:{}", host, backend_port);
        }

        cfg
    }

    /// Layers a YAML document over this configuration.
    pub fn merge_yaml_str(mut self, yaml: &str) -> anyhow::Result<Self> {
        let file: FileConfig = serde_yaml::from_str(yaml).context("invalid configuration")?;

        if let Some(v) = file.listen_addr {
            self.listen_addr = v;
        }
        if let Some(v) = file.doc_root {
            self.doc_root = v;
        }
        if let Some(v) = file.backend_addr {
            self.backend_addr = v;
        }
        if let Some(ms) = file.query_timeout_ms {
            self.query_timeout = Duration::from_millis(ms);
        }
        if let Some(v) = file.max_reply_bytes {
            self.max_reply_bytes = v;
        }
        if let Some(v) = file.chunk_size {
            self.chunk_size = v;
        }
        if let Some(v) = file.max_request_bytes {
            self.max_request_bytes = v;
        }
        if let Some(v) = file.strict_paths {
            self.strict_paths = v;
        }
        if let Some(v) = file.backlog {
            self.backlog = v;
        }

        self.validate()?;
        Ok(self)
    }

    pub fn merge_file(self, path: &Path) -> anyhow::Result<Self> {
        let yaml = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        self.merge_yaml_str(&yaml)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.chunk_size == 0 {
            anyhow::bail!("chunk_size must be greater than zero");
        }
        if self.max_request_bytes == 0 {
            anyhow::bail!("max_request_bytes must be greater than zero");
        }
        if self.query_timeout.is_zero() {
            anyhow::bail!("query_timeout_ms must be greater than zero");
        }
        Ok(())
    }
}
