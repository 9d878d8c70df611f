use std::{collections::HashSet, path::Path};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::{error::Error, menu::SourceId};

/// Query parameter appended to a source's URL for the single retry after a failed request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fallback {
    key: String,
    value: String,
}

impl Default for Fallback {
    fn default() -> Self {
        Self::new("nocache", "1")
    }
}

impl Fallback {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn apply(&self, url: &Url) -> Url {
        let mut url = url.clone();
        url.query_pairs_mut().append_pair(&self.key, &self.value);
        url
    }
}

/// One dining location and the page its weekly menu is published on.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawSource")]
pub struct Source {
    id: SourceId,
    url: Url,
    fallback: Option<Fallback>,
}

#[derive(Deserialize)]
struct RawSource {
    name: String,
    url: String,
    // `"fallback": null` opts a source out of the retry
    #[serde(default = "default_fallback")]
    fallback: Option<Fallback>,
}

#[allow(clippy::unnecessary_wraps)]
fn default_fallback() -> Option<Fallback> {
    Some(Fallback::default())
}

impl TryFrom<RawSource> for Source {
    type Error = String;

    fn try_from(raw: RawSource) -> Result<Self, Self::Error> {
        let url = Url::parse(&raw.url).map_err(|e| format!("{}: invalid url {:?}: {e}", raw.name, raw.url))?;
        Ok(Self::new(SourceId::new(raw.name), url, raw.fallback))
    }
}

impl Source {
    pub const fn new(id: SourceId, url: Url, fallback: Option<Fallback>) -> Self {
        Self { id, url, fallback }
    }

    pub const fn id(&self) -> &SourceId {
        &self.id
    }

    pub const fn url(&self) -> &Url {
        &self.url
    }

    /// The URL for the retry, if this source has one.
    pub fn fallback_url(&self) -> Option<Url> {
        self.fallback.as_ref().map(|f| f.apply(&self.url))
    }
}

/// Rice serveries. The list order only decides fetch order; merged menus list sources by name.
pub fn default_registry() -> Vec<Source> {
    [
        ("Seibel Servery", "https://dining.rice.edu/seibel-servery"),
        ("Baker Servery", "https://dining.rice.edu/baker-college-kitchen"),
        ("South Servery", "https://dining.rice.edu/south-servery"),
        ("North Servery", "https://dining.rice.edu/north-servery"),
        ("West Servery", "https://dining.rice.edu/west-servery"),
    ]
    .into_iter()
    .map(|(name, url)| {
        let url = Url::parse(url).expect("built-in source url should be valid");
        Source::new(SourceId::new(name), url, Some(Fallback::default()))
    })
    .collect()
}

/// Reads a JSON array of `{"name", "url", "fallback"}` objects.
pub fn load_registry(path: impl AsRef<Path>) -> crate::Result<Vec<Source>> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)?;
    let sources: Vec<Source> = serde_json::from_str(&text)?;
    validate(&sources)
        .map_err(|msg| Error::config_error(format!("{}: {msg}", path.display())))?;
    Ok(sources)
}

fn validate(sources: &[Source]) -> Result<(), String> {
    if sources.is_empty() {
        return Err("no sources configured".into());
    }
    let mut seen = HashSet::with_capacity(sources.len());
    match sources.iter().find(|s| !seen.insert(s.id())) {
        Some(dup) => Err(format!("source {:?} is listed twice", dup.id().as_str())),
        None => Ok(()),
    }
}
