use std::{
    fmt::{self, Display, Formatter},
    num::NonZeroU32,
    sync::OnceLock,
    time::{Duration, Instant},
};

use governor::{
    clock::{QuantaClock, QuantaInstant},
    middleware::NoOpMiddleware,
    state::InMemoryState,
};
use reqwest::{
    header::{self, HeaderMap, HeaderValue},
    Client,
};
use tracing::{instrument, Level};
use url::Url;

use crate::{menu::SourceId, sources::Source};

static USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
    (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

pub fn make_client(timeout: Duration) -> crate::Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::ACCEPT,
        HeaderValue::from_static("text/html,application/xhtml+xml;q=0.9,*/*;q=0.8"),
    );
    headers.insert(
        header::ACCEPT_LANGUAGE,
        HeaderValue::from_static("en-US,en;q=0.9"),
    );
    let client = Client::builder()
        .user_agent(USER_AGENT)
        .default_headers(headers)
        .gzip(true)
        .timeout(timeout)
        .build()?;
    Ok(client)
}

/// Page body as served, along with the URL that finally answered.
#[derive(Debug)]
pub struct RawDocument {
    url: Url,
    html: String,
}

impl RawDocument {
    pub const fn url(&self) -> &Url {
        &self.url
    }

    pub fn html(&self) -> &str {
        &self.html
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchFailure {
    /// The server answered with a non-success status.
    Status(u16),
    /// Connection, TLS, body or timeout error.
    Transport(String),
    /// The scrape deadline passed before the source finished.
    Cancelled,
}

impl From<reqwest::Error> for FetchFailure {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(e.to_string())
    }
}

impl Display for FetchFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status(code) => write!(f, "HTTP status {code}"),
            Self::Transport(msg) => write!(f, "{msg}"),
            Self::Cancelled => write!(f, "cancelled at the scrape deadline"),
        }
    }
}

/// A source that could not be retrieved. Only ever affects that one source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchError {
    source: SourceId,
    url: Url,
    failure: FetchFailure,
}

impl FetchError {
    pub const fn new(source: SourceId, url: Url, failure: FetchFailure) -> Self {
        Self {
            source,
            url,
            failure,
        }
    }

    pub fn cancelled(source: &Source) -> Self {
        Self::new(source.id().clone(), source.url().clone(), FetchFailure::Cancelled)
    }

    pub const fn source(&self) -> &SourceId {
        &self.source
    }

    /// The last URL attempted.
    pub const fn url(&self) -> &Url {
        &self.url
    }

    pub const fn failure(&self) -> &FetchFailure {
        &self.failure
    }
}

impl Display for FetchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}: GET {} failed: {}", self.source, self.url, self.failure)
    }
}

impl std::error::Error for FetchError {}

static RATE_LIMIT: u32 = 20;
static DELAY_JITTER: Duration = Duration::from_millis(250);
static RATE_LIMITER: OnceLock<
    governor::RateLimiter<
        governor::state::NotKeyed,
        InMemoryState,
        QuantaClock,
        NoOpMiddleware<QuantaInstant>,
    >,
> = OnceLock::new();

/// Downloads a source's menu page. A failed first attempt is retried once against the source's
/// fallback URL; if that fails too, or the source has no fallback, the error is returned.
#[instrument(skip(client, source), fields(
    source = %source.id(),
    url = %source.url(),
), level = Level::TRACE)]
pub async fn fetch(client: &Client, source: &Source) -> Result<RawDocument, FetchError> {
    let failure = match fetch_once(client, source.id(), source.url()).await {
        Ok(html) => {
            return Ok(RawDocument {
                url: source.url().clone(),
                html,
            })
        }
        Err(failure) => failure,
    };
    let Some(retry_url) = source.fallback_url() else {
        let err = FetchError::new(source.id().clone(), source.url().clone(), failure);
        log::error!("{err}");
        return Err(err);
    };
    log::warn!(
        "{}: GET {} failed ({failure}), retrying with {retry_url}",
        source.id(),
        source.url()
    );
    match fetch_once(client, source.id(), &retry_url).await {
        Ok(html) => Ok(RawDocument {
            url: retry_url,
            html,
        }),
        Err(failure) => {
            let err = FetchError::new(source.id().clone(), retry_url, failure);
            log::error!("{err}");
            Err(err)
        }
    }
}

async fn fetch_once(client: &Client, source: &SourceId, url: &Url) -> Result<String, FetchFailure> {
    let rate_limiter = RATE_LIMITER.get_or_init(|| {
        governor::RateLimiter::direct(governor::Quota::per_second(
            NonZeroU32::new(RATE_LIMIT).expect("rate limit should be non-zero"),
        ))
    });
    let jitter = governor::Jitter::new(Duration::ZERO, DELAY_JITTER);
    rate_limiter.until_ready_with_jitter(jitter).await;

    let start = Instant::now();
    let res = client.get(url.clone()).send().await?;
    let status = res.status();
    if !status.is_success() {
        return Err(FetchFailure::Status(status.as_u16()));
    }
    let text = res.text().await?;
    log::info!(
        "{source}: GET {url} -> {status}, {} bytes in {:?}",
        text.len(),
        start.elapsed()
    );
    Ok(text)
}
