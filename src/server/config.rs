use std::{net::SocketAddr, time::Duration};

use crate::FontgateError;

const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;
const DEFAULT_MAX_FONT_BYTES: usize = 32 * 1024 * 1024;

/// Start-up settings for the HTTP gateway
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Address to listen on
    pub bind: SocketAddr,
    /// Origins allowed to make cross-origin requests; empty means any
    pub allowed_origins: Vec<String>,
    /// Upper bound on fetching a remote font
    pub fetch_timeout: Duration,
    /// Largest font accepted, by URL or upload
    pub max_font_bytes: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        ServiceConfig {
            bind: SocketAddr::from(([127, 0, 0, 1], 5000)),
            allowed_origins: vec![],
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
            max_font_bytes: DEFAULT_MAX_FONT_BYTES,
        }
    }
}

impl ServiceConfig {
    /// Whether any origin may call the gateway
    pub fn allows_any_origin(&self) -> bool {
        self.allowed_origins.is_empty() || self.allowed_origins.iter().any(|o| o == "*")
    }
}

/// Command line options for `fontgate serve`
#[derive(clap::Args, Debug, Clone)]
pub struct ServeArgs {
    /// Address to listen on
    #[arg(long, env = "FONTGATE_BIND", default_value = "127.0.0.1:5000")]
    pub bind: SocketAddr,

    /// Comma-separated list of allowed CORS origins, or '*' for any
    #[arg(
        long,
        env = "FONTGATE_ALLOWED_ORIGINS",
        default_value = "*",
        value_delimiter = ','
    )]
    pub allowed_origins: Vec<String>,

    /// Timeout for fetching a remote font, in seconds
    #[arg(long, env = "FONTGATE_FETCH_TIMEOUT_SECS", default_value_t = DEFAULT_FETCH_TIMEOUT_SECS)]
    pub fetch_timeout_secs: u64,

    /// Largest font accepted, in bytes
    #[arg(long, env = "FONTGATE_MAX_FONT_BYTES", default_value_t = DEFAULT_MAX_FONT_BYTES)]
    pub max_font_bytes: usize,
}

impl TryFrom<ServeArgs> for ServiceConfig {
    type Error = FontgateError;

    fn try_from(args: ServeArgs) -> Result<Self, Self::Error> {
        if args.fetch_timeout_secs == 0 {
            return Err(FontgateError::Config(
                "fetch timeout must be at least one second".to_string(),
            ));
        }
        if args.max_font_bytes == 0 {
            return Err(FontgateError::Config(
                "maximum font size must not be zero".to_string(),
            ));
        }
        let allowed_origins = args
            .allowed_origins
            .into_iter()
            .map(|origin| origin.trim().trim_end_matches('/').to_string())
            .filter(|origin| !origin.is_empty())
            .collect();
        Ok(ServiceConfig {
            bind: args.bind,
            allowed_origins,
            fetch_timeout: Duration::from_secs(args.fetch_timeout_secs),
            max_font_bytes: args.max_font_bytes,
        })
    }
}
