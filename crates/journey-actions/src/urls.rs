//! URL resolution and equivalence for navigation and expectations.

use journey_core::Options;
use url::Url;

use crate::errors::ActionError;

/// One or more acceptable URLs for an expectation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlSet(Vec<String>);

impl UrlSet {
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for UrlSet {
    fn from(url: &str) -> Self {
        Self(vec![url.to_string()])
    }
}

impl From<String> for UrlSet {
    fn from(url: String) -> Self {
        Self(vec![url])
    }
}

impl From<Vec<&str>> for UrlSet {
    fn from(urls: Vec<&str>) -> Self {
        Self(urls.into_iter().map(str::to_string).collect())
    }
}

impl From<Vec<String>> for UrlSet {
    fn from(urls: Vec<String>) -> Self {
        Self(urls)
    }
}

impl<const N: usize> From<[&str; N]> for UrlSet {
    fn from(urls: [&str; N]) -> Self {
        Self(urls.iter().map(|u| u.to_string()).collect())
    }
}

impl From<&str> for crate::resolver::Resolver<UrlSet> {
    fn from(url: &str) -> Self {
        Self::Literal(url.into())
    }
}

impl From<String> for crate::resolver::Resolver<UrlSet> {
    fn from(url: String) -> Self {
        Self::Literal(url.into())
    }
}

impl From<Vec<&str>> for crate::resolver::Resolver<UrlSet> {
    fn from(urls: Vec<&str>) -> Self {
        Self::Literal(urls.into())
    }
}

impl From<Vec<String>> for crate::resolver::Resolver<UrlSet> {
    fn from(urls: Vec<String>) -> Self {
        Self::Literal(urls.into())
    }
}

impl<const N: usize> From<[&str; N]> for crate::resolver::Resolver<UrlSet> {
    fn from(urls: [&str; N]) -> Self {
        Self::Literal(urls.into())
    }
}

/// Turn a raw target into an absolute URL: parse as-is, or join a relative
/// path against the configured base.
pub fn resolve_url(raw: &str, options: &Options) -> Result<Url, ActionError> {
    match Url::parse(raw) {
        Ok(url) => Ok(url),
        Err(url::ParseError::RelativeUrlWithoutBase) => match options.base_url() {
            Some(base) => base.join(raw).map_err(|err| ActionError::BadUrl {
                url: raw.to_string(),
                detail: err.to_string(),
            }),
            None => Err(ActionError::BadUrl {
                url: raw.to_string(),
                detail: "relative URL but no base_url configured".to_string(),
            }),
        },
        Err(err) => Err(ActionError::BadUrl {
            url: raw.to_string(),
            detail: err.to_string(),
        }),
    }
}

/// Default expectation equivalence: ignore query string and fragment.
pub fn strip_query_and_fragment(url: &Url) -> Url {
    let mut stripped = url.clone();
    stripped.set_query(None);
    stripped.set_fragment(None);
    stripped
}
