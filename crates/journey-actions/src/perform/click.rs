//! Click primitive with the legacy-page fallback.

use journey_core::{Context, SessionError};
use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::ActionError;
use crate::resolver::Resolver;

/// Script-level click for pages whose targets the driver refuses as not
/// clickable (overlays, synthetic widgets on legacy markup).
const SCRIPTED_CLICK: &str = "(selector) => document.querySelector(selector).click()";

pub(crate) async fn execute(selector: &Resolver<String>, ctx: &Context) -> Result<(), ActionError> {
    let selector = selector.resolve(ctx).await?;

    debug!(selector, "clicking");
    match ctx.session.click(&selector).await {
        Ok(()) => Ok(()),
        Err(SessionError::NotClickable(detail)) => {
            warn!(
                selector,
                detail, "native click refused; retrying once via scripted click"
            );
            let args = [Value::String(selector.clone())];
            ctx.session
                .evaluate_script(SCRIPTED_CLICK, &args)
                .await
                .map(|_| ())
                .map_err(ActionError::from)
        }
        Err(other) => Err(other.into()),
    }
}
