//! Transport configuration, one-time initialization, and connection handles.

use std::sync::OnceLock;
use std::time::Duration;

use bytes::{Bytes, BytesMut};
use reqwest::{Client, redirect};
use tracing::{debug, trace};

use crate::{FetchError, TransferOutcome, Url};

/// Configuration for the HTTP transport shared by every handle.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Maximum time to establish a connection.
    pub connect_timeout: Duration,
    /// Maximum time for a whole transfer.
    pub request_timeout: Duration,
    /// How long an idle connection is kept for reuse.
    pub pool_idle_timeout: Duration,
    /// Follow up to this many redirects. Zero disables redirects.
    pub max_redirects: usize,
    /// Negotiate gzip content encoding.
    pub gzip: bool,
    /// User agent string.
    pub user_agent: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(60),
            pool_idle_timeout: Duration::from_secs(90),
            max_redirects: 10,
            gzip: true,
            user_agent: format!("iexcloud/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl TransportConfig {
    /// Builds a client with this configuration.
    pub(crate) fn build_client(&self) -> Result<Client, reqwest::Error> {
        let redirects = if self.max_redirects == 0 {
            redirect::Policy::none()
        } else {
            redirect::Policy::limited(self.max_redirects)
        };

        Client::builder()
            // One handle drives one transfer at a time
            .pool_max_idle_per_host(1)
            .pool_idle_timeout(self.pool_idle_timeout)
            .tcp_nodelay(true)
            .timeout(self.request_timeout)
            .connect_timeout(self.connect_timeout)
            .redirect(redirects)
            .user_agent(&self.user_agent)
            .gzip(self.gzip)
            .build()
    }
}

/// The installed transport configuration, or the reason installation failed.
static TRANSPORT: OnceLock<Result<TransportConfig, String>> = OnceLock::new();

/// Initializes the transport with default settings.
///
/// Call once at startup, before spawning threads that fetch. Calling it again
/// is harmless and returns the first result.
///
/// # Errors
///
/// Returns [`FetchError::Init`] if no HTTP client can be built (for example,
/// the TLS backend failed to load).
pub fn init() -> Result<(), FetchError> {
    init_with(TransportConfig::default())
}

/// Initializes the transport with the given settings.
///
/// Only the first call installs a configuration; later calls return the
/// cached outcome of that first call and ignore `config`.
///
/// # Errors
///
/// Returns [`FetchError::Init`] if no HTTP client can be built.
pub fn init_with(config: TransportConfig) -> Result<(), FetchError> {
    install(|| config)
        .map(|_| ())
        .map_err(|msg| FetchError::Init(msg.to_string()))
}

/// Returns the installed configuration, installing defaults if needed.
pub(crate) fn transport_config() -> Result<&'static TransportConfig, &'static str> {
    install(TransportConfig::default)
}

fn install(
    config: impl FnOnce() -> TransportConfig,
) -> Result<&'static TransportConfig, &'static str> {
    let installed = TRANSPORT.get_or_init(|| {
        let config = config();
        config
            .build_client()
            .map(|_| {
                debug!(user_agent = %config.user_agent, "transport initialized");
                config
            })
            .map_err(|e| format!("failed to build HTTP client: {e}"))
    });
    installed.as_ref().map_err(String::as_str)
}

/// How a transfer ended.
#[derive(Debug)]
pub(crate) enum Completion {
    /// A success status was received and the body fully read.
    Done,
    /// The request failed or the server returned an error status.
    Failed(reqwest::Error),
}

/// A reusable connection context bound to one URL at a time, with a buffer
/// that accumulates the response body.
///
/// A handle keeps its own connection cache, so rebinding it to another URL on
/// the same host reuses the open connection.
#[derive(Debug)]
pub(crate) struct Handle {
    id: usize,
    url: Url,
    client: Client,
    buffer: BytesMut,
}

impl Handle {
    /// Creates a handle bound to `url`.
    pub(crate) fn new(
        id: usize,
        url: Url,
        config: &TransportConfig,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self {
            id,
            url,
            client: config.build_client()?,
            buffer: BytesMut::new(),
        })
    }

    /// Pool-assigned identity, stable for the handle's lifetime.
    pub(crate) const fn id(&self) -> usize {
        self.id
    }

    /// The URL this handle is bound to.
    pub(crate) const fn url(&self) -> &Url {
        &self.url
    }

    /// Binds the handle to a new URL, discarding any buffered data.
    pub(crate) fn rebind(&mut self, url: Url) {
        self.url = url;
        self.buffer.clear();
    }

    /// Discards any buffered data.
    pub(crate) fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Removes and returns the buffered body.
    pub(crate) fn take_body(&mut self) -> Bytes {
        self.buffer.split().freeze()
    }

    /// Classifies a completion for the retry policy.
    pub(crate) fn outcome(&self, completion: &Completion) -> TransferOutcome {
        match completion {
            Completion::Done => TransferOutcome::Received {
                empty: self.buffer.is_empty(),
            },
            Completion::Failed(e) => e.status().map_or(TransferOutcome::TransportError, |s| {
                TransferOutcome::HttpError(s.as_u16())
            }),
        }
    }

    /// Performs one GET, appending the body to the buffer as it arrives.
    ///
    /// Error statuses (>= 400) fail the transfer without reading the body.
    pub(crate) async fn perform(&mut self) -> Completion {
        match self.transfer().await {
            Ok(()) => Completion::Done,
            Err(e) => {
                trace!(url = %self.url, error = %e, "transfer failed");
                Completion::Failed(e)
            }
        }
    }

    async fn transfer(&mut self) -> Result<(), reqwest::Error> {
        let mut response = self
            .client
            .get(self.url.as_str())
            .send()
            .await?
            .error_for_status()?;

        while let Some(chunk) = response.chunk().await? {
            self.buffer.extend_from_slice(&chunk);
        }
        trace!(url = %self.url, bytes = self.buffer.len(), "transfer complete");
        Ok(())
    }
}
