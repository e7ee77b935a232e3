//! Upgrade-type classification
//!
//! Any hint of a development build (the `0.0.0` null version or a `-dirty`
//! working-tree suffix) makes the upgrade `Unknown`, which drives the more
//! cautious advice downstream.

use std::fmt;

use crate::unpack::ReleasePair;

const NULL_VERSION: &str = "0.0.0";
const DIRTY_SUFFIX: &str = "-dirty";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UpgradeType {
    #[default]
    Unknown,
    ReleaseToRelease,
}

impl UpgradeType {
    pub fn classify(previous: Option<&str>, new: Option<&str>) -> Self {
        match (previous, new) {
            (Some(previous), Some(new)) if is_release(previous) && is_release(new) => {
                UpgradeType::ReleaseToRelease
            }
            _ => UpgradeType::Unknown,
        }
    }

    pub fn from_releases(releases: &ReleasePair) -> Self {
        Self::classify(releases.previous.as_deref(), releases.new.as_deref())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UpgradeType::Unknown => "unknown",
            UpgradeType::ReleaseToRelease => "release-to-release",
        }
    }
}

impl fmt::Display for UpgradeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn is_release(version: &str) -> bool {
    !version.contains(NULL_VERSION) && !version.contains(DIRTY_SUFFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_markers() {
        assert_eq!(UpgradeType::classify(None, Some("1.3.0")), UpgradeType::Unknown);
        assert_eq!(UpgradeType::classify(Some("1.2.0"), None), UpgradeType::Unknown);
        assert_eq!(UpgradeType::classify(None, None), UpgradeType::Unknown);
    }

    #[test]
    fn test_development_builds() {
        let dev = ["0.0.0", "v0.0.0-12-gabcdef", "1.2.0-dirty", "v1.2.0-3-g1234-dirty"];
        for version in dev {
            assert_eq!(
                UpgradeType::classify(Some(version), Some("1.3.0")),
                UpgradeType::Unknown,
                "previous {version}"
            );
            assert_eq!(
                UpgradeType::classify(Some("1.3.0"), Some(version)),
                UpgradeType::Unknown,
                "new {version}"
            );
        }
    }

    #[test]
    fn test_release_to_release() {
        assert_eq!(
            UpgradeType::classify(Some("1.2.0"), Some("1.3.0")),
            UpgradeType::ReleaseToRelease
        );
        assert_eq!(
            UpgradeType::classify(Some("v0.1.9"), Some("v0.1.9")),
            UpgradeType::ReleaseToRelease
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(UpgradeType::ReleaseToRelease.to_string(), "release-to-release");
        assert_eq!(UpgradeType::default().to_string(), "unknown");
    }
}
