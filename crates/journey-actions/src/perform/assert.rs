//! Assert primitive.

use journey_core::Context;
use tracing::debug;

use crate::action::AssertFn;
use crate::errors::ActionError;

pub(crate) async fn execute(
    description: &str,
    check: &AssertFn,
    ctx: &Context,
) -> Result<(), ActionError> {
    if check(ctx.clone()).await? {
        debug!(description, "assertion holds");
        return Ok(());
    }

    Err(ActionError::ExpectationFailed {
        expected: description.to_string(),
        actual: "assertion evaluated to false".to_string(),
    })
}
