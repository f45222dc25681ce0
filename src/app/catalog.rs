//! Message catalog.
//!
//! An ordered, fixed-size list of [`MessageProvider`]s. The catalog is
//! built once at startup and never changes afterwards; its length is what
//! the rotation arithmetic wraps around.

use core::num::NonZeroUsize;

use crate::error::{ConfigError, Result};

use super::payload::Payload;

/// Produces a payload on demand. May read sensors or drive the indicator
/// as a side effect; the controller treats it as stateless.
pub trait MessageProvider {
    fn produce(&mut self) -> Result<Payload>;

    /// Short name used in logs and events.
    fn label(&self) -> &'static str {
        "message"
    }
}

/// Provider backed by a closure.
pub struct FnProvider<F> {
    label: &'static str,
    f: F,
}

impl<F> MessageProvider for FnProvider<F>
where
    F: FnMut() -> Result<Payload>,
{
    fn produce(&mut self) -> Result<Payload> {
        (self.f)()
    }

    fn label(&self) -> &'static str {
        self.label
    }
}

/// Wrap a closure as a labelled provider.
pub fn from_fn<F>(label: &'static str, f: F) -> FnProvider<F>
where
    F: FnMut() -> Result<Payload>,
{
    FnProvider { label, f }
}

/// Wrap fixed text as a provider.
pub fn fixed(label: &'static str, payload: Payload) -> impl MessageProvider {
    from_fn(label, move || Ok(payload.clone()))
}

pub struct MessageCatalog {
    providers: Vec<Box<dyn MessageProvider>>,
    len: NonZeroUsize,
}

impl MessageCatalog {
    /// Build the catalog. An empty list is a fatal configuration error.
    pub fn new(providers: Vec<Box<dyn MessageProvider>>) -> core::result::Result<Self, ConfigError> {
        let len = NonZeroUsize::new(providers.len()).ok_or(ConfigError::EmptyCatalog)?;
        Ok(Self { providers, len })
    }

    pub fn len(&self) -> NonZeroUsize {
        self.len
    }

    /// Label of the provider at `index` (wrapped into range).
    pub fn label(&self, index: usize) -> &'static str {
        self.providers[index % self.len].label()
    }

    /// Invoke the provider at `index` (wrapped into range).
    pub fn produce(&mut self, index: usize) -> Result<Payload> {
        self.providers[index % self.len].produce()
    }
}

impl core::fmt::Debug for MessageCatalog {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_list()
            .entries(self.providers.iter().map(|p| p.label()))
            .finish()
    }
}
