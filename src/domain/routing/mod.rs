//! Routing domain module
//!
//! The per-call machinery: cascade expansion under the error policy, the
//! decorator pipeline, the invocation contracts, and the orchestrating
//! router.

mod cascade;
mod decorator;
mod invocation;
mod router;

pub use cascade::{build_candidates, CandidateList};
pub use decorator::{
    compose, DecoratorFactory, ErrorLoggingDecorator, ErrorLoggingDecoratorFactory,
    InvocationDecorator, InvocationFuture, TimingDecorator, TimingDecoratorFactory,
};
pub use invocation::{
    ImplementationResolver, InvocationContext, RouteRequest, TrialImplementation,
};
pub use router::InvocationRouter;
