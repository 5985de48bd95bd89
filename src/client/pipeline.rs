//! Dispatch pipeline boundary
//!
//! The bot code under test is reached through [`DispatchPipeline`]. Two
//! adapters are provided: [`HandlerPipeline`] runs a teloxide `dptree`
//! handler tree the same way `Dispatcher` would, and [`FnPipeline`] wraps a
//! plain async function.

use std::future::Future;
use std::ops::ControlFlow;

use futures::future::{self, BoxFuture, FutureExt};
use teloxide::dispatching::UpdateHandler;
use teloxide::dptree::di::DependencyMap;
use teloxide::types::{Me, Update};
use teloxide::Bot;
use tracing::debug;

use crate::utils::errors::BoxError;

/// Externally supplied handler/middleware chain
pub trait DispatchPipeline: Send + Sync {
    /// Handle one update; resolves once every outgoing call it triggers has completed
    fn feed_update(&self, bot: Bot, me: Me, update: Update) -> BoxFuture<'_, Result<(), BoxError>>;

    /// Called when a test context opens
    fn startup(&self) -> BoxFuture<'_, Result<(), BoxError>> {
        future::ok(()).boxed()
    }

    /// Called when a test context closes
    fn shutdown(&self) -> BoxFuture<'_, Result<(), BoxError>> {
        future::ok(()).boxed()
    }
}

/// Runs a teloxide handler tree with `Bot`, `Me` and `Update` injected
pub struct HandlerPipeline<E> {
    handler: UpdateHandler<E>,
    dependencies: DependencyMap,
}

impl<E> HandlerPipeline<E> {
    pub fn new(handler: UpdateHandler<E>) -> Self {
        Self {
            handler,
            dependencies: DependencyMap::new(),
        }
    }

    /// Extra dependencies the handlers expect, as passed to `Dispatcher::builder(..).dependencies(..)`
    pub fn with_dependencies(mut self, dependencies: DependencyMap) -> Self {
        self.dependencies = dependencies;
        self
    }
}

impl<E> DispatchPipeline for HandlerPipeline<E>
where
    E: Into<BoxError> + Send + Sync + 'static,
{
    fn feed_update(&self, bot: Bot, me: Me, update: Update) -> BoxFuture<'_, Result<(), BoxError>> {
        let mut dependencies = self.dependencies.clone();
        dependencies.insert(bot);
        dependencies.insert(me);
        dependencies.insert(update);

        async move {
            match self.handler.dispatch(dependencies).await {
                ControlFlow::Break(result) => result.map_err(Into::into),
                ControlFlow::Continue(_) => {
                    debug!("No handler matched the update");
                    Ok(())
                }
            }
        }
        .boxed()
    }
}

/// Adapter for `async fn(Bot, Update) -> Result<(), E>`
pub struct FnPipeline<F> {
    handler: F,
}

impl<F> FnPipeline<F> {
    pub fn new(handler: F) -> Self {
        Self { handler }
    }
}

impl<F, Fut, E> DispatchPipeline for FnPipeline<F>
where
    F: Fn(Bot, Update) -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), E>> + Send + 'static,
    E: Into<BoxError>,
{
    fn feed_update(&self, bot: Bot, _me: Me, update: Update) -> BoxFuture<'_, Result<(), BoxError>> {
        let dispatched = (self.handler)(bot, update);
        async move { dispatched.await.map_err(Into::into) }.boxed()
    }
}
