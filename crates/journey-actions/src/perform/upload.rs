//! Upload primitive.

use journey_core::{Context, UploadFile};
use tracing::debug;

use crate::errors::ActionError;
use crate::resolver::Resolver;

pub(crate) async fn execute(
    selector: &Resolver<String>,
    file: &Resolver<UploadFile>,
    ctx: &Context,
) -> Result<(), ActionError> {
    let selector = selector.resolve(ctx).await?;
    let file = file.resolve(ctx).await?;

    debug!(selector, file = file.name, bytes = file.contents.len(), "uploading");
    ctx.session.upload(&selector, &file).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{context_with, FakeSession};
    use journey_core::{Options, State};
    use std::sync::Arc;

    #[tokio::test]
    async fn delegates_to_the_session() {
        let session = Arc::new(FakeSession::new());
        let ctx = context_with(session.clone(), Options::new(), State::new());

        let file = UploadFile::new("passport.png", b"fake-png".to_vec());
        execute(&"#document".into(), &file.into(), &ctx).await.unwrap();
        assert_eq!(session.ops(), vec!["upload #document passport.png"]);
    }
}
