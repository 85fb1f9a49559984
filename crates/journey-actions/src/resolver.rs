//! Literal-or-lazy action arguments.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use journey_core::{BoxFuture, Context};

use crate::errors::ActionError;

type ResolveFn<T> = Arc<dyn Fn(Context) -> BoxFuture<'static, Result<T, ActionError>> + Send + Sync>;

/// An action argument that is either a literal value or a function of the
/// execution context.
///
/// Lazy resolvers run inside `perform`, never at build time: an action
/// built once can be executed repeatedly against different states and will
/// see each run's current values.
#[derive(Clone)]
pub enum Resolver<T> {
    Literal(T),
    Lazy(ResolveFn<T>),
}

impl<T: Clone + Send + Sync> Resolver<T> {
    pub async fn resolve(&self, ctx: &Context) -> Result<T, ActionError> {
        match self {
            Resolver::Literal(value) => Ok(value.clone()),
            Resolver::Lazy(resolve) => resolve(ctx.clone()).await,
        }
    }
}

impl<T> Resolver<T> {
    /// Defer resolution to `resolve`, invoked with the context current at
    /// execution time.
    pub fn lazy<F, Fut>(resolve: F) -> Self
    where
        F: Fn(Context) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, ActionError>> + Send + 'static,
    {
        Resolver::Lazy(Arc::new(move |ctx| Box::pin(resolve(ctx))))
    }
}

impl Resolver<String> {
    /// Resolver that reads a string value generated earlier into state.
    pub fn from_state(key: impl Into<String>) -> Self {
        let key = key.into();
        Resolver::lazy(move |ctx: Context| {
            let key = key.clone();
            async move { Ok(ctx.state.require_str(&key)?.to_string()) }
        })
    }
}

impl<T> From<T> for Resolver<T> {
    fn from(value: T) -> Self {
        Resolver::Literal(value)
    }
}

impl From<&str> for Resolver<String> {
    fn from(value: &str) -> Self {
        Resolver::Literal(value.to_string())
    }
}

impl<T: fmt::Debug> fmt::Debug for Resolver<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolver::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            Resolver::Lazy(_) => f.write_str("Lazy(..)"),
        }
    }
}
