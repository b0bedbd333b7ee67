//! Accessibility policies for stored secrets

use crate::query::constants;

/// When a stored secret may be read by the owning process.
///
/// Searching, updating or removing an item requires the same accessibility
/// the item was stored with. Reading an item whose data is currently
/// unavailable under its accessibility fails with
/// [`OsStatus::INTERACTION_NOT_ALLOWED`](crate::OsStatus::INTERACTION_NOT_ALLOWED).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Accessibility {
    /// Readable only while the device is unlocked. Suited to items needed in
    /// the foreground. Migrated items move to a new device with encrypted
    /// backups.
    WhenUnlocked { should_be_migrated: bool },
    /// Readable once the device has been unlocked after a restart. Suited to
    /// items needed by background work.
    AfterFirstUnlock { should_be_migrated: bool },
    /// Readable only while unlocked and only when a passcode is set. Never
    /// migrates; removing the passcode deletes these items.
    WhenPasscodeSet,
}

impl Accessibility {
    /// Platform constant for the accessible attribute
    pub const fn query_value(self) -> &'static str {
        match self {
            Accessibility::WhenUnlocked { should_be_migrated: true } => {
                constants::ACCESSIBLE_WHEN_UNLOCKED
            }
            Accessibility::WhenUnlocked { should_be_migrated: false } => {
                constants::ACCESSIBLE_WHEN_UNLOCKED_THIS_DEVICE_ONLY
            }
            Accessibility::AfterFirstUnlock { should_be_migrated: true } => {
                constants::ACCESSIBLE_AFTER_FIRST_UNLOCK
            }
            Accessibility::AfterFirstUnlock { should_be_migrated: false } => {
                constants::ACCESSIBLE_AFTER_FIRST_UNLOCK_THIS_DEVICE_ONLY
            }
            Accessibility::WhenPasscodeSet => constants::ACCESSIBLE_WHEN_PASSCODE_SET_THIS_DEVICE_ONLY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mapping_is_fixed() {
        let cases = [
            (Accessibility::WhenUnlocked { should_be_migrated: true }, "ak"),
            (Accessibility::WhenUnlocked { should_be_migrated: false }, "aku"),
            (Accessibility::AfterFirstUnlock { should_be_migrated: true }, "ck"),
            (Accessibility::AfterFirstUnlock { should_be_migrated: false }, "cku"),
            (Accessibility::WhenPasscodeSet, "akpu"),
        ];

        for (accessibility, expected) in cases {
            assert_eq!(accessibility.query_value(), expected, "{:?}", accessibility);
        }
    }
}
