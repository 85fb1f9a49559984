//! Navigate primitive.

use journey_core::Context;
use tracing::debug;

use crate::errors::ActionError;
use crate::resolver::Resolver;
use crate::urls::resolve_url;

/// Resolve the target (absolute, or relative against the configured base)
/// and ask the session to go there. Session failures bubble unchanged.
pub(crate) async fn execute(url: &Resolver<String>, ctx: &Context) -> Result<(), ActionError> {
    let raw = url.resolve(ctx).await?;
    let target = resolve_url(&raw, &ctx.options)?;

    debug!(url = %target, "navigating");
    ctx.session.navigate(&target).await?;
    Ok(())
}
