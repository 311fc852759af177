use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Method;
use reqwest::cookie::CookieStore;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue, REFERER, USER_AGENT};
use serde::{Serialize, de::DeserializeOwned};
use url::Url;

use super::cookies::{CookieJar, SharedJar};
use super::http::{HttpRequest, HttpTransport, LogHook, LoggingTransport, ReqwestTransport};
use crate::errors::{BuildError, RequestError, Result};
use crate::path::{ResolvedPath, resolve};
use crate::session::SessionInit;
use crate::util::check_http_status;

/// User agent sent when none is configured.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/108.0.0.0 Safari/537.36";

/// Configures a [`Client`] before construction.
///
/// Every recognized option is a named field; setters are provided for chaining.
///
/// # Defaults
/// - User-agent: [`DEFAULT_USER_AGENT`]. `None` (or an empty string) sends no header.
/// - Transport: reqwest with a fresh [`CookieJar`] and no global timeout.
/// - Log hook: none; exchanges are still traced at `debug` level.
///
/// # Precedence
/// `transport` beats `http_client`, which beats the built-in reqwest client.
/// `cookie_jar` and `request_timeout` only apply to the built-in client.
///
/// # Example
/// ```no_run
/// use std::time::Duration;
/// # use h5ai::ClientConfig;
/// let client = ClientConfig::new("https://larsjung.de/h5ai/demo/")
///     .user_agent("h5ai-mirror/0.1")
///     .request_timeout(Duration::from_secs(10))
///     .build()?;
/// # Ok::<_, h5ai::BuildError>(())
/// ```
#[derive(Clone)]
#[must_use]
pub struct ClientConfig {
    /// Base URL every path is resolved against.
    pub base_url: String,
    /// `User-Agent` header value.
    pub user_agent: Option<String>,
    /// Replaces the whole HTTP stack.
    pub transport: Option<Arc<dyn HttpTransport>>,
    /// Cookie store for the built-in client.
    pub cookie_jar: Option<Arc<dyn CookieStore>>,
    /// Receives one formatted line per request and response.
    pub log_hook: Option<LogHook>,
    /// Pre-built reqwest client to send through.
    pub http_client: Option<reqwest::Client>,
    /// Per-request timeout for the built-in client.
    pub request_timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            user_agent: Some(DEFAULT_USER_AGENT.to_string()),
            transport: None,
            cookie_jar: None,
            log_hook: None,
            http_client: None,
            request_timeout: None,
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("user_agent", &self.user_agent)
            .field("transport", &self.transport.is_some())
            .field("cookie_jar", &self.cookie_jar.is_some())
            .field("log_hook", &self.log_hook.is_some())
            .field("http_client", &self.http_client)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl ClientConfig {
    /// Defaults, rooted at `base_url`.
    pub fn new<S: Into<String>>(base_url: S) -> Self {
        Self::default().base_url(base_url)
    }

    /// Set the base URL.
    pub fn base_url<S: Into<String>>(mut self, base_url: S) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the user agent. An empty string disables the header.
    pub fn user_agent<S: Into<String>>(mut self, user_agent: S) -> Self {
        let user_agent = user_agent.into();
        self.user_agent = (!user_agent.is_empty()).then_some(user_agent);
        self
    }

    /// Send requests through `transport` instead of reqwest.
    pub fn transport<T: HttpTransport + 'static>(mut self, transport: Arc<T>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Use `jar` for session cookies.
    pub fn cookie_jar<C: CookieStore + 'static>(mut self, jar: Arc<C>) -> Self {
        self.cookie_jar = Some(jar);
        self
    }

    /// Forward exchange log lines to `hook`.
    pub fn log_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.log_hook = Some(Arc::new(hook));
        self
    }

    /// Send through an existing reqwest client.
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Set HTTP request timeout.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Build [`Client`].
    pub fn build(self) -> std::result::Result<Client, BuildError> {
        let base = Url::parse(&self.base_url)?;
        let user_agent = self
            .user_agent
            .as_deref()
            .map(HeaderValue::from_str)
            .transpose()?;

        let inner: Arc<dyn HttpTransport> = match (self.transport, self.http_client) {
            (Some(transport), _) => transport,
            (None, Some(http)) => Arc::new(ReqwestTransport::new(http)),
            (None, None) => {
                let jar = self
                    .cookie_jar
                    .unwrap_or_else(|| Arc::new(CookieJar::default()));
                let mut builder = reqwest::Client::builder().cookie_provider(Arc::new(SharedJar(jar)));
                if let Some(timeout) = self.request_timeout {
                    builder = builder.timeout(timeout);
                }
                Arc::new(ReqwestTransport::new(builder.build()?))
            }
        };

        Ok(Client {
            base,
            user_agent,
            transport: Arc::new(LoggingTransport::new(inner, self.log_hook)),
            session: Arc::new(SessionInit::default()),
        })
    }
}

/// Client for one h5ai-served directory tree.
///
/// Clones share the transport and the session handshake outcome.
///
/// ### Examples
/// ```no_run
/// # async fn run() -> h5ai::Result<()> {
/// let client = h5ai::Client::new("https://larsjung.de/h5ai/demo/")?;
/// for item in client.items(&["file preview/"]).await? {
///     println!("{} {}", item.href(), item.file_size());
/// }
/// # Ok(()) }
/// ```
#[derive(Clone)]
pub struct Client {
    pub(crate) base: Url,
    pub(crate) user_agent: Option<HeaderValue>,
    pub(crate) transport: Arc<dyn HttpTransport>,
    pub(crate) session: Arc<SessionInit>,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("base", &self.base.as_str())
            .field("user_agent", &self.user_agent)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Client with default settings rooted at `base_url`.
    pub fn new<S: Into<String>>(base_url: S) -> std::result::Result<Client, BuildError> {
        ClientConfig::new(base_url).build()
    }

    /// Returns a config to edit settings before creating a [`Client`].
    pub fn config<S: Into<String>>(base_url: S) -> ClientConfig {
        ClientConfig::new(base_url)
    }

    /// The base URL paths are resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Resolve `paths` against the base URL.
    pub fn href<S: AsRef<str>>(&self, paths: &[S]) -> Result<ResolvedPath> {
        Ok(resolve(&self.base, paths)?)
    }

    /// Compose a request with the headers h5ai expects: JSON content type, a
    /// `Referer` of `<scheme>://<host>` and the configured user agent.
    pub fn build_request(&self, method: Method, url: Url, body: Option<Vec<u8>>) -> HttpRequest {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Ok(referer) = HeaderValue::from_str(&origin(&url)) {
            headers.insert(REFERER, referer);
        }
        if let Some(user_agent) = &self.user_agent {
            headers.insert(USER_AGENT, user_agent.clone());
        }
        HttpRequest {
            method,
            url,
            headers,
            body,
        }
    }

    /// JSON request/response exchange against `url`, after the session handshake.
    ///
    /// Any status other than `200 OK` is an error. The response must decode into
    /// `T`; unknown fields fail when `T` denies them.
    pub async fn request<B, T>(&self, method: Method, url: &Url, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.ensure_session(url).await?;

        let request = self.build_request(method, url.clone(), Some(serde_json::to_vec(body)?));
        let response = check_http_status(self.transport.send(request).await?)?;

        serde_json::from_slice(&response.body).map_err(|e| {
            RequestError::DecodeJson {
                message: e.to_string(),
            }
            .into()
        })
    }
}

/// `<scheme>://<host>[:port]`, as sent in the `Referer` header.
fn origin(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    match url.port() {
        Some(port) => format!("{}://{host}:{port}", url.scheme()),
        None => format!("{}://{host}", url.scheme()),
    }
}
