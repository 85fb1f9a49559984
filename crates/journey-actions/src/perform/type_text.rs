//! Type primitive.

use journey_core::Context;
use serde_json::Value;
use tracing::debug;

use crate::errors::ActionError;
use crate::resolver::Resolver;

/// Typing must not accumulate onto a previous value, so the field is
/// emptied first.
const CLEAR_FIELD: &str =
    "(selector) => { const el = document.querySelector(selector); if (el) el.value = ''; }";

pub(crate) async fn execute(
    selector: &Resolver<String>,
    text: &Resolver<String>,
    ctx: &Context,
) -> Result<(), ActionError> {
    let selector = selector.resolve(ctx).await?;
    let text = text.resolve(ctx).await?;

    debug!(selector, chars = text.len(), "typing");
    let args = [Value::String(selector.clone())];
    ctx.session.evaluate_script(CLEAR_FIELD, &args).await?;
    ctx.session.type_text(&selector, &text).await?;
    Ok(())
}
