// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Runtime metrics: a registry of instruments and a periodic collector that
//! feeds them to a [`crate::Writer`].

pub mod collector;
pub mod process;
pub mod registry;

pub use collector::{RuntimeCollector, RUNTIME_MEASUREMENT};
pub use process::ProcessStats;
pub use registry::{Counter, Gauge, Instrument, Registry};
