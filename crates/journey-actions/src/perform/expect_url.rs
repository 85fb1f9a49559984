//! Expect-URL primitive.

use journey_core::Context;
use tracing::debug;

use crate::action::UrlNormalizer;
use crate::errors::ActionError;
use crate::resolver::Resolver;
use crate::urls::{resolve_url, UrlSet};

/// Normalize the actual location and every candidate, pass on any match,
/// fail with both sides otherwise.
pub(crate) async fn execute(
    expected: &Resolver<UrlSet>,
    normalizer: &UrlNormalizer,
    ctx: &Context,
) -> Result<(), ActionError> {
    let candidates = expected.resolve(ctx).await?;
    let actual = normalizer(&ctx.session.current_url().await?);

    let mut normalized = Vec::new();
    for raw in candidates.iter() {
        normalized.push(normalizer(&resolve_url(raw, &ctx.options)?));
    }

    if normalized.iter().any(|candidate| *candidate == actual) {
        debug!(url = %actual, "location matches expectation");
        return Ok(());
    }

    Err(ActionError::ExpectationFailed {
        expected: normalized
            .iter()
            .map(|u| u.to_string())
            .collect::<Vec<_>>()
            .join(" | "),
        actual: actual.to_string(),
    })
}
