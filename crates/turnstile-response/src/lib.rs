//! Turnstile Response
//!
//! Pluggable ticket-response resolution. Independently-developed configurers
//! contribute [`ResponseFactory`] implementations to a
//! [`ResponseFactoryRegistry`] during a single-threaded composition phase;
//! the registry freezes into an immutable [`ResponsePlan`] shared read-only
//! across concurrent requests, and a [`CompositeResponseResolver`] picks the
//! first factory (in registration order) that supports each request, falling
//! back to a designated default.

#![forbid(unsafe_code)]

pub mod factories;
pub mod factory;
pub mod registry;
pub mod resolver;

pub use factories::{CasProtocolResponseFactory, PlainTextResponseFactory};
pub use factory::ResponseFactory;
pub use registry::{ResponseFactoryRegistry, ResponsePlan, ResponsePlanConfigurer};
pub use resolver::CompositeResponseResolver;
