//! Actor identity - who is calling
//!
//! Session issuance and token validation belong to the gateway in front of
//! this service; by the time a request lands here the gateway has resolved
//! the principal and injected identity headers.

mod extractor;

pub use extractor::CurrentActor;
