//! Select primitive.

use journey_core::Context;
use tracing::debug;

use crate::errors::ActionError;
use crate::resolver::Resolver;

pub(crate) async fn execute(
    selector: &Resolver<String>,
    value: &Resolver<String>,
    ctx: &Context,
) -> Result<(), ActionError> {
    let selector = selector.resolve(ctx).await?;
    let value = value.resolve(ctx).await?;

    debug!(selector, value, "selecting option");
    ctx.session.select(&selector, &value).await?;
    Ok(())
}
