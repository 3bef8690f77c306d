// SPDX-License-Identifier: MPL-2.0

//! Shared async runtime for the command-line front end.
//!
//! Library types never create a runtime of their own; they spawn onto whatever
//! runtime drives them. The binary uses this one.

use once_cell::sync::Lazy;
use std::future::Future;
use tokio::runtime::Runtime;

/// Two workers cover the handful of concurrent lookups a render or search makes.
static RUNTIME: Lazy<Runtime> = Lazy::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .thread_name("giglink-async")
        .build()
        .expect("failed to create async runtime")
});

/// Execute a future on the shared runtime, blocking until completion.
pub fn block_on<F: Future>(future: F) -> F::Output {
    RUNTIME.block_on(future)
}
