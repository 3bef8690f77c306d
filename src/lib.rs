// SPDX-License-Identifier: MPL-2.0

//! GigLink's mention pipeline: `@mention` capture while typing, rendering of
//! stored content into text/link/mention segments, and best-effort
//! resolution of bare `@Name` text.

pub mod api;
pub mod config;
pub mod mentions;
pub mod runtime;
pub mod state;
