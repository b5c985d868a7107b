// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Named gauges and counters.
//!
//! A [`Registry`] is an ordinary value: create one, register instruments in
//! it, and hand it to whatever reads it. Nothing is global.

use crate::error::RegistryError;
use crate::line_protocol::FieldValue;
use crate::metric::{Fields, Sample};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

/// An `i64` value that can be set arbitrarily.
#[derive(Debug, Default)]
pub struct Gauge {
    value: AtomicI64,
}

impl Gauge {
    /// Set the value.
    pub fn update(&self, v: i64) {
        self.value.store(v, Ordering::Relaxed);
    }

    /// Current value.
    pub fn value(&self) -> i64 {
        self.value.load(Ordering::Relaxed)
    }
}

/// A monotonic-by-convention `i64` counter.
#[derive(Debug, Default)]
pub struct Counter {
    count: AtomicI64,
}

impl Counter {
    /// Add `n`.
    pub fn inc(&self, n: i64) {
        self.count.fetch_add(n, Ordering::Relaxed);
    }

    /// Subtract `n`.
    pub fn dec(&self, n: i64) {
        self.count.fetch_sub(n, Ordering::Relaxed);
    }

    /// Reset to zero.
    pub fn clear(&self) {
        self.count.store(0, Ordering::Relaxed);
    }

    /// Current count.
    pub fn count(&self) -> i64 {
        self.count.load(Ordering::Relaxed)
    }
}

/// A registered instrument.
#[derive(Debug, Clone)]
pub enum Instrument {
    /// Point-in-time value.
    Gauge(Arc<Gauge>),
    /// Accumulated count.
    Counter(Arc<Counter>),
}

impl Instrument {
    /// Current reading.
    pub fn value(&self) -> i64 {
        match self {
            Instrument::Gauge(g) => g.value(),
            Instrument::Counter(c) => c.count(),
        }
    }
}

/// Collection of named instruments.
#[derive(Debug, Default)]
pub struct Registry {
    instruments: RwLock<BTreeMap<String, Instrument>>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `instrument` under `name`.
    pub fn register(&self, name: impl Into<String>, instrument: Instrument) -> Result<(), RegistryError> {
        let name = name.into();
        let mut instruments = self.instruments.write();
        if instruments.contains_key(&name) {
            return Err(RegistryError::Duplicate(name));
        }
        instruments.insert(name, instrument);
        Ok(())
    }

    /// Create and register a gauge.
    pub fn new_gauge(&self, name: impl Into<String>) -> Result<Arc<Gauge>, RegistryError> {
        let gauge = Arc::new(Gauge::default());
        self.register(name, Instrument::Gauge(gauge.clone()))?;
        Ok(gauge)
    }

    /// Create and register a counter.
    pub fn new_counter(&self, name: impl Into<String>) -> Result<Arc<Counter>, RegistryError> {
        let counter = Arc::new(Counter::default());
        self.register(name, Instrument::Counter(counter.clone()))?;
        Ok(counter)
    }

    /// Look up an instrument.
    pub fn get(&self, name: &str) -> Option<Instrument> {
        self.instruments.read().get(name).cloned()
    }

    /// Remove an instrument, returning it.
    pub fn unregister(&self, name: &str) -> Option<Instrument> {
        self.instruments.write().remove(name)
    }

    /// Visit every instrument in name order.
    pub fn each(&self, mut f: impl FnMut(&str, &Instrument)) {
        for (name, instrument) in self.instruments.read().iter() {
            f(name, instrument);
        }
    }

    /// Number of registered instruments.
    pub fn len(&self) -> usize {
        self.instruments.read().len()
    }

    /// True when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.instruments.read().is_empty()
    }

    /// Current readings as integer fields.
    pub fn fields(&self) -> Fields {
        let mut fields = Fields::new();
        self.each(|name, instrument| {
            fields.insert(name.to_string(), FieldValue::Integer(instrument.value()));
        });
        fields
    }

    /// Current readings as one untagged sample, stamped now.
    pub fn sample(&self, measurement: &str) -> Sample {
        Sample::new(measurement).with_fields(self.fields())
    }
}
