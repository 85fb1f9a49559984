//! The action primitive type.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use journey_core::{BoxFuture, Context, UploadFile};
use url::Url;

use crate::errors::ActionError;
use crate::perform;
use crate::quiescence::QuiescenceConfig;
use crate::resolver::Resolver;
use crate::urls::{self, UrlSet};

/// Async page-content predicate for the assert primitive.
pub type AssertFn =
    Arc<dyn Fn(Context) -> BoxFuture<'static, Result<bool, ActionError>> + Send + Sync>;

/// Redefines URL equivalence for expectations. The default strips query
/// string and fragment from both sides before comparing.
pub type UrlNormalizer = Arc<dyn Fn(&Url) -> Url + Send + Sync>;

/// Discriminant for introspection and testing; dispatch goes through the
/// enum itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Navigate,
    Click,
    TypeText,
    Select,
    Submit,
    Upload,
    ExpectUrl,
    Assert,
}

/// One browser interaction, described ahead of time and performed against
/// a concrete context. All lazy arguments resolve inside [`Action::perform`].
#[derive(Clone)]
pub enum Action {
    Navigate {
        url: Resolver<String>,
    },
    Click {
        selector: Resolver<String>,
    },
    TypeText {
        selector: Resolver<String>,
        text: Resolver<String>,
    },
    Select {
        selector: Resolver<String>,
        value: Resolver<String>,
    },
    Submit {
        selector: Option<Resolver<String>>,
        quiescence: QuiescenceConfig,
    },
    Upload {
        selector: Resolver<String>,
        file: Resolver<UploadFile>,
    },
    ExpectUrl {
        expected: Resolver<UrlSet>,
        normalizer: UrlNormalizer,
    },
    Assert {
        description: String,
        check: AssertFn,
    },
}

impl Action {
    pub fn navigate(url: impl Into<Resolver<String>>) -> Self {
        Action::Navigate { url: url.into() }
    }

    pub fn click(selector: impl Into<Resolver<String>>) -> Self {
        Action::Click {
            selector: selector.into(),
        }
    }

    pub fn type_text(
        selector: impl Into<Resolver<String>>,
        text: impl Into<Resolver<String>>,
    ) -> Self {
        Action::TypeText {
            selector: selector.into(),
            text: text.into(),
        }
    }

    pub fn select(
        selector: impl Into<Resolver<String>>,
        value: impl Into<Resolver<String>>,
    ) -> Self {
        Action::Select {
            selector: selector.into(),
            value: value.into(),
        }
    }

    pub fn submit(selector: Option<Resolver<String>>, quiescence: QuiescenceConfig) -> Self {
        Action::Submit {
            selector,
            quiescence,
        }
    }

    pub fn upload(
        selector: impl Into<Resolver<String>>,
        file: impl Into<Resolver<UploadFile>>,
    ) -> Self {
        Action::Upload {
            selector: selector.into(),
            file: file.into(),
        }
    }

    pub fn expect_url(expected: impl Into<Resolver<UrlSet>>) -> Self {
        Action::ExpectUrl {
            expected: expected.into(),
            normalizer: Arc::new(urls::strip_query_and_fragment),
        }
    }

    pub fn expect_url_with<N>(expected: impl Into<Resolver<UrlSet>>, normalizer: N) -> Self
    where
        N: Fn(&Url) -> Url + Send + Sync + 'static,
    {
        Action::ExpectUrl {
            expected: expected.into(),
            normalizer: Arc::new(normalizer),
        }
    }

    pub fn assert_that<F, Fut>(description: impl Into<String>, check: F) -> Self
    where
        F: Fn(Context) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<bool, ActionError>> + Send + 'static,
    {
        Action::Assert {
            description: description.into(),
            check: Arc::new(move |ctx| Box::pin(check(ctx))),
        }
    }

    pub fn kind(&self) -> ActionKind {
        match self {
            Action::Navigate { .. } => ActionKind::Navigate,
            Action::Click { .. } => ActionKind::Click,
            Action::TypeText { .. } => ActionKind::TypeText,
            Action::Select { .. } => ActionKind::Select,
            Action::Submit { .. } => ActionKind::Submit,
            Action::Upload { .. } => ActionKind::Upload,
            Action::ExpectUrl { .. } => ActionKind::ExpectUrl,
            Action::Assert { .. } => ActionKind::Assert,
        }
    }

    /// Resolve arguments against the context and execute the interaction.
    pub async fn perform(&self, ctx: &Context) -> Result<(), ActionError> {
        match self {
            Action::Navigate { url } => perform::navigate::execute(url, ctx).await,
            Action::Click { selector } => perform::click::execute(selector, ctx).await,
            Action::TypeText { selector, text } => {
                perform::type_text::execute(selector, text, ctx).await
            }
            Action::Select { selector, value } => {
                perform::select::execute(selector, value, ctx).await
            }
            Action::Submit {
                selector,
                quiescence,
            } => perform::submit::execute(selector.as_ref(), quiescence, ctx).await,
            Action::Upload { selector, file } => {
                perform::upload::execute(selector, file, ctx).await
            }
            Action::ExpectUrl {
                expected,
                normalizer,
            } => perform::expect_url::execute(expected, normalizer, ctx).await,
            Action::Assert { description, check } => {
                perform::assert::execute(description, check, ctx).await
            }
        }
    }
}

// Closures prevent a derived Debug; the discriminant is what tests and
// logs care about.
impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Action").field(&self.kind()).finish()
    }
}
