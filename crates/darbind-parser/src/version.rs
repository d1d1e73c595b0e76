//! SDK-version to decoder selection.

use darbind_core::ExternalPackages;

use crate::error::ParserError;
use crate::v3::V3Decoder;
use crate::LfDecoder;

/// Dotted-version prefixes of the known SDK families.
pub const V1: &str = "1.";
pub const V2: &str = "2.";
pub const V3: &str = "3.";

/// Pick a decoder implementation by the leading digit of the SDK version.
///
/// Only the "3." family is implemented; the legacy "1."/"2." families are
/// recognised but rejected.
pub fn decoder_for_version(
    sdk_version: &str,
    payload: Vec<u8>,
    external_packages: ExternalPackages,
) -> Result<Box<dyn LfDecoder>, ParserError> {
    if sdk_version.starts_with(V3) {
        Ok(Box::new(V3Decoder::new(payload, external_packages)))
    } else if sdk_version.starts_with(V1) || sdk_version.starts_with(V2) {
        Err(ParserError::UnsupportedVersion(format!(
            "{sdk_version} (legacy SDK family)"
        )))
    } else {
        Err(ParserError::UnsupportedVersion(sdk_version.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_v3_family_selected() {
        assert!(decoder_for_version("3.3.0", Vec::new(), ExternalPackages::default()).is_ok());
        assert!(decoder_for_version(
            "3.3.0-snapshot.20250417.0",
            Vec::new(),
            ExternalPackages::default()
        )
        .is_ok());
    }

    #[test]
    fn test_legacy_and_unknown_families_rejected() {
        for version in ["1.18.0", "2.9.1", "0.13.55", "garbage"] {
            match decoder_for_version(version, Vec::new(), ExternalPackages::default()) {
                Err(ParserError::UnsupportedVersion(v)) => {
                    assert!(v.starts_with(version), "message should name {version}: {v}")
                }
                _ => panic!("expected UnsupportedVersion for {version}"),
            }
        }
    }
}
