//! First-match-wins resolution over the frozen plan.

use crate::factory::ResponseFactory;
use crate::registry::ResponsePlan;
use std::sync::Arc;
use turnstile_core::{RequestContext, ResponsePayload, Result, Ticket, TurnstileError};

/// Selects and invokes the response factory for each request.
///
/// Resolution walks the plan in registration order and returns the first
/// factory whose `supports` answers true; when none does, the plan's
/// designated default answers. The ordering contract is load-bearing:
/// registering a general factory ahead of a specific one silently shadows
/// the specific one, so composition must order specific-first.
#[derive(Debug, Clone)]
pub struct CompositeResponseResolver {
    plan: ResponsePlan,
}

impl CompositeResponseResolver {
    /// Build a resolver over a finalized plan.
    pub fn new(plan: ResponsePlan) -> Self {
        Self { plan }
    }

    /// Resolve the factory for a request.
    pub fn resolve(&self, request: &RequestContext) -> Arc<dyn ResponseFactory> {
        for factory in self.plan.factories() {
            if factory.supports(request) {
                tracing::debug!(factory = factory.id(), "resolved response factory");
                return Arc::clone(factory);
            }
        }
        tracing::debug!(
            factory = self.plan.default_factory().id(),
            "no registered factory supports the request; using default"
        );
        Arc::clone(self.plan.default_factory())
    }

    /// Resolve and build in one step.
    ///
    /// Factory failures are wrapped as `ResponseBuild` with the factory
    /// identity and ticket id attached.
    pub fn build(&self, ticket: &Ticket, request: &RequestContext) -> Result<ResponsePayload> {
        let factory = self.resolve(request);
        factory.build(ticket, request).map_err(|err| match err {
            already @ TurnstileError::ResponseBuild { .. } => already,
            other => {
                TurnstileError::response_build(factory.id(), ticket.id.as_str(), other.to_string())
            }
        })
    }
}
