//! SecuredStorage - typed key/value facade over the platform secure credential store
//!
//! The facade turns add/update/search/remove requests into queries for a
//! [`SecuredDataProvider`], organized around trait-based dependency injection
//! for testability.

pub mod accessibility;
pub mod config;
pub mod mocks;
pub mod production;
pub mod query;
pub mod result;
pub mod status;
pub mod storage;
pub mod traits;

mod item_table;

use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub use accessibility::Accessibility;
pub use config::{ConfigError, ProviderKind, StorageConfig};
pub use query::{Attribute, Attributes, ItemValue, Query, QueryValue};
pub use result::{AddingResult, SearchResult, StorageError, UpdateResult};
pub use status::OsStatus;
pub use storage::SecuredStorage;
pub use traits::SecuredDataProvider;

/// Install a stdout subscriber filtered by `RUST_LOG`
///
/// For host applications without their own subscriber. Fails if one is
/// already installed.
pub fn init_logging() -> Result<(), TryInitError> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "secured_storage=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .try_init()
}
