//! Submit primitive.
//!
//! A submit is a click followed by the quiescence wait: the next step must
//! not run until the navigation and/or request burst the submit triggered
//! has settled, and a fixed sleep is either too short or too slow.

use journey_core::Context;
use tracing::debug;

use crate::errors::ActionError;
use crate::quiescence::{self, QuiescenceConfig};
use crate::resolver::Resolver;

const DEFAULT_SUBMIT_SELECTOR: &str = "[type=\"submit\"]";

pub(crate) async fn execute(
    selector: Option<&Resolver<String>>,
    quiescence: &QuiescenceConfig,
    ctx: &Context,
) -> Result<(), ActionError> {
    let selector = match selector {
        Some(resolver) => resolver.resolve(ctx).await?,
        None => DEFAULT_SUBMIT_SELECTOR.to_string(),
    };

    debug!(selector, "submitting");
    ctx.session.click(&selector).await?;
    quiescence::settle(ctx.session.as_ref(), quiescence).await;
    Ok(())
}
