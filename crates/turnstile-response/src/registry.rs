//! Factory registration and the frozen plan.
//!
//! Registration happens during a single-threaded composition phase at
//! startup. `finalize` freezes the ordered factory list into an immutable
//! [`ResponsePlan`]; any registration after that fails with
//! `CompositionClosed` and leaves the existing plan untouched.

use crate::factory::ResponseFactory;
use std::sync::Arc;
use turnstile_core::{Result, TurnstileError};

/// Collects response factories during the composition phase.
#[derive(Default)]
pub struct ResponseFactoryRegistry {
    factories: Vec<Arc<dyn ResponseFactory>>,
    default: Option<Arc<dyn ResponseFactory>>,
    closed: bool,
}

impl ResponseFactoryRegistry {
    /// Empty, open registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a factory to the plan.
    ///
    /// Resolution is first-match-wins in registration order: register more
    /// specific factories before more general ones. Misordering does not
    /// raise an error — it silently changes which factory answers.
    pub fn register(&mut self, factory: Arc<dyn ResponseFactory>) -> Result<()> {
        self.ensure_open(factory.id())?;
        tracing::debug!(factory = factory.id(), "registering response factory");
        self.factories.push(factory);
        Ok(())
    }

    /// Install the designated fallback factory.
    ///
    /// The default is consulted only when no registered factory supports the
    /// request; it does not occupy a position in the ordered list.
    pub fn register_default(&mut self, factory: Arc<dyn ResponseFactory>) -> Result<()> {
        self.ensure_open(factory.id())?;
        tracing::debug!(factory = factory.id(), "registering default response factory");
        self.default = Some(factory);
        Ok(())
    }

    /// Freeze the registry into an immutable plan.
    ///
    /// A missing default factory is a startup-time configuration error; it
    /// never surfaces at request time.
    pub fn finalize(&mut self) -> Result<ResponsePlan> {
        let default = self.default.clone().ok_or_else(|| {
            TurnstileError::configuration("no default response factory was registered")
        })?;
        self.closed = true;
        Ok(ResponsePlan {
            factories: self.factories.clone().into(),
            default,
        })
    }

    fn ensure_open(&self, factory_id: &str) -> Result<()> {
        if self.closed {
            return Err(TurnstileError::composition_closed(format!(
                "cannot register response factory '{factory_id}' after the plan was finalized"
            )));
        }
        Ok(())
    }
}

/// The finalized, immutable, ordered collection of factories.
///
/// Cheap to clone and safe to share across unlimited concurrent requests
/// without locking.
#[derive(Clone)]
pub struct ResponsePlan {
    factories: Arc<[Arc<dyn ResponseFactory>]>,
    default: Arc<dyn ResponseFactory>,
}

impl ResponsePlan {
    /// Factories in registration order.
    pub fn factories(&self) -> &[Arc<dyn ResponseFactory>] {
        &self.factories
    }

    /// The designated fallback factory.
    pub fn default_factory(&self) -> &Arc<dyn ResponseFactory> {
        &self.default
    }

    /// Run a set of configurers against a fresh registry and finalize.
    ///
    /// This is the whole composition phase in one call: configurers run in
    /// the order given, single-threaded, and the resulting plan is frozen
    /// before any request sees it.
    pub fn compose(configurers: &[&dyn ResponsePlanConfigurer]) -> Result<Self> {
        let mut registry = ResponseFactoryRegistry::new();
        for configurer in configurers {
            configurer.configure(&mut registry)?;
        }
        registry.finalize()
    }
}

impl std::fmt::Debug for ResponsePlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let ids: Vec<&str> = self.factories.iter().map(|fac| fac.id()).collect();
        f.debug_struct("ResponsePlan")
            .field("factories", &ids)
            .field("default", &self.default.id())
            .finish()
    }
}

/// A contribution of factories to the plan.
///
/// Each independently-developed module implements this once; the host hands
/// all configurers to [`ResponsePlan::compose`] during startup.
pub trait ResponsePlanConfigurer {
    /// Register this module's factories.
    fn configure(&self, registry: &mut ResponseFactoryRegistry) -> Result<()>;
}
