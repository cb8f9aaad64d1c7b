//! `FnTask` — adapts a plain async closure into a `Task`, so trivial task
//! bodies don't need a hand-written struct.

use async_trait::async_trait;
use futures::future::BoxFuture;

use model::Context;

use crate::traits::{Task, TaskHandle};

pub struct FnTask<F>
where
    F: Fn(&TaskHandle, Context) -> BoxFuture<'static, i32> + Send + Sync,
{
    func: F,
}

impl<F> FnTask<F>
where
    F: Fn(&TaskHandle, Context) -> BoxFuture<'static, i32> + Send + Sync,
{
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

#[async_trait]
impl<F> Task for FnTask<F>
where
    F: Fn(&TaskHandle, Context) -> BoxFuture<'static, i32> + Send + Sync,
{
    async fn run(&self, handle: &TaskHandle, context: Context) -> i32 {
        (self.func)(handle, context).await
    }
}
