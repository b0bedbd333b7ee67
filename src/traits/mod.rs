//! Trait definitions for dependency injection
//!
//! The secure credential service is abstracted behind a trait so the facade
//! can be exercised without touching a real store.

mod data_provider;

pub use data_provider::SecuredDataProvider;

#[cfg(test)]
pub use data_provider::MockSecuredDataProvider;
