//! Helpers for the naming conventions encoded in DALF paths.
//!
//! A DALF's base name is `<package-name>-<version>-<64-hex-package-id>`;
//! any of the leading parts may be missing in hand-built archives.

use regex::Regex;

/// A trailing `-<digit>(.<digit>+)*` version group.
const VERSION_SUFFIX_PATTERN: &str = r"-\d+(\.\d+)*$";

/// True for a 64-character hex string, the shape of a package ID.
pub fn is_package_hash(s: &str) -> bool {
    s.len() == 64 && s.chars().all(|c| c.is_ascii_hexdigit())
}

fn base_name(dalf: &str) -> &str {
    let file = dalf.rsplit('/').next().unwrap_or(dalf);
    file.strip_suffix(".dalf").unwrap_or(file)
}

/// The package ID: the segment after the last `-` of the base name, if it
/// is a 64-hex content hash.
pub fn package_id_from_path(dalf: &str) -> Option<String> {
    let name = base_name(dalf);
    let (_, candidate) = name.rsplit_once('-')?;
    is_package_hash(candidate).then(|| candidate.to_string())
}

/// Strip a trailing version group like `-1.0.0` or `-2.9.1`.
pub fn strip_version_suffix(name: &str) -> String {
    match Regex::new(VERSION_SUFFIX_PATTERN) {
        Ok(pattern) => pattern.replace(name, "").into_owned(),
        Err(_) => name.to_string(),
    }
}

/// The package name derived from a DALF path: base name minus the trailing
/// package hash and version group, lowercased.
pub fn package_name_from_path(dalf: &str) -> String {
    let mut name = base_name(dalf).to_string();
    if let Some((head, candidate)) = name.rsplit_once('-') {
        if is_package_hash(candidate) {
            name = head.to_string();
        }
    }
    strip_version_suffix(&name).to_lowercase()
}

/// The output file base name for a DALF: base name minus the trailing
/// package hash, lowercased, with `.` and `-` mapped to `_`.
pub fn output_basename(dalf: &str) -> String {
    let mut name = base_name(dalf).to_string();
    if let Some((head, candidate)) = name.rsplit_once('-') {
        if is_package_hash(candidate) {
            name = head.to_string();
        }
    }
    name.to_lowercase().replace(['.', '-'], "_")
}
