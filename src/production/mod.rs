//! Production implementations of traits

use std::sync::Arc;

mod dev_file_provider;
#[cfg(target_vendor = "apple")]
mod keychain_provider;
mod keyring_provider;

pub use dev_file_provider::DevFileDataProvider;
#[cfg(target_vendor = "apple")]
pub use keychain_provider::KeychainDataProvider;
pub use keyring_provider::KeyringDataProvider;

use crate::traits::SecuredDataProvider;

/// Binding to the host's secure credential service
///
/// Apple targets talk to the Keychain directly; everything else goes through
/// the `keyring` crate. Hosts without a native `keyring` backend get a
/// provider that reports `NOT_AVAILABLE` for every request.
pub fn platform_provider() -> Arc<dyn SecuredDataProvider> {
    #[cfg(target_vendor = "apple")]
    {
        Arc::new(KeychainDataProvider::new())
    }
    #[cfg(not(target_vendor = "apple"))]
    {
        Arc::new(KeyringDataProvider::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(any(target_os = "linux", target_os = "windows"))]
    fn test_platform_provider_uses_native_keyring() {
        assert!(KeyringDataProvider::has_native_backend());
    }
}
