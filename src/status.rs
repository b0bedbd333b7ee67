//! Status codes returned by the secure credential service

use std::fmt;

/// Raw status code of a single secure-store request.
///
/// Codes outside the well-known set are carried verbatim so callers can look
/// them up themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OsStatus(pub i32);

impl OsStatus {
    pub const SUCCESS: Self = Self(0);
    pub const UNIMPLEMENTED: Self = Self(-4);
    pub const IO: Self = Self(-36);
    pub const PARAM: Self = Self(-50);
    pub const ALLOCATE: Self = Self(-108);
    pub const INTERNAL_COMPONENT: Self = Self(-2070);
    pub const NOT_AVAILABLE: Self = Self(-25291);
    pub const AUTH_FAILED: Self = Self(-25293);
    pub const DUPLICATE_ITEM: Self = Self(-25299);
    pub const ITEM_NOT_FOUND: Self = Self(-25300);
    pub const INTERACTION_NOT_ALLOWED: Self = Self(-25308);
    pub const DECODE: Self = Self(-26275);
    pub const MISSING_ENTITLEMENT: Self = Self(-34018);
    pub const MEMORY_ERROR: Self = Self(-67672);

    pub const fn code(self) -> i32 {
        self.0
    }

    pub const fn is_success(self) -> bool {
        self.0 == Self::SUCCESS.0
    }

    /// Short human-readable description of a well-known code
    pub fn message(self) -> &'static str {
        match self {
            Self::SUCCESS => "No error",
            Self::UNIMPLEMENTED => "Function or operation not implemented",
            Self::IO => "I/O error",
            Self::PARAM => "One or more parameters passed to the function were not valid",
            Self::ALLOCATE => "Failed to allocate memory",
            Self::INTERNAL_COMPONENT => "An internal component failed",
            Self::NOT_AVAILABLE => "No keychain is available",
            Self::AUTH_FAILED => "The user name or passphrase you entered is not correct",
            Self::DUPLICATE_ITEM => "The specified item already exists in the keychain",
            Self::ITEM_NOT_FOUND => "The specified item could not be found in the keychain",
            Self::INTERACTION_NOT_ALLOWED => {
                "User interaction is not allowed (item may be locked by its accessibility)"
            }
            Self::DECODE => "Unable to decode the provided data",
            Self::MISSING_ENTITLEMENT => "A required entitlement isn't present",
            Self::MEMORY_ERROR => "A memory error occurred",
            _ => "Unknown status",
        }
    }
}

impl From<i32> for OsStatus {
    fn from(code: i32) -> Self {
        Self(code)
    }
}

impl From<OsStatus> for i32 {
    fn from(status: OsStatus) -> Self {
        status.0
    }
}

impl fmt::Display for OsStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message(), self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_well_known_codes() {
        assert_eq!(OsStatus::DUPLICATE_ITEM.code(), -25299);
        assert_eq!(OsStatus::ITEM_NOT_FOUND.code(), -25300);
        assert!(OsStatus::SUCCESS.is_success());
        assert!(!OsStatus::PARAM.is_success());
    }

    #[test]
    fn test_display_includes_code() {
        let text = OsStatus::ITEM_NOT_FOUND.to_string();
        assert!(text.contains("could not be found"));
        assert!(text.ends_with("(-25300)"));
    }

    #[test]
    fn test_unknown_code_is_preserved() {
        let status = OsStatus::from(-99999);
        assert_eq!(status.message(), "Unknown status");
        assert_eq!(i32::from(status), -99999);
        assert_eq!(status.to_string(), "Unknown status (-99999)");
    }
}
