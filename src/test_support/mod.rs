//! In-memory transports for unit tests: a response script and a stateful
//! fake of the trade application with its identity stub.
mod fake_app;
mod scripted;

pub(crate) use fake_app::{APP_BASE, FakeTradeApp, Fault, Route, STUB_BASE};
pub(crate) use scripted::ScriptedTransport;

use std::future::Future;

use crate::error::ValidationError;

pub(crate) fn run_async_test<F>(future: F) -> Result<(), ValidationError>
where
    F: Future<Output = Result<(), ValidationError>>,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| ValidationError::from(format!("Failed to build runtime: {}", err)))?;
    runtime.block_on(future)
}
