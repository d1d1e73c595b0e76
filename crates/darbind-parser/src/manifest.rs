//! `META-INF/MANIFEST.MF` parsing.
//!
//! The manifest is a line-oriented `Key: Value` format. Long values are
//! wrapped across lines, each continuation line starting with a single
//! space. Values may contain incidental whitespace; it is stripped wholesale.

use darbind_core::Manifest;

use crate::archive::DarReader;
use crate::error::ParserError;

pub const MANIFEST_PATH: &str = "META-INF/MANIFEST.MF";

/// Read and parse the manifest entry of a DAR.
pub fn read_manifest(dar: &mut DarReader) -> Result<Manifest, ParserError> {
    let bytes = dar.open(MANIFEST_PATH).map_err(|err| match err {
        ParserError::MissingEntry(_) => ParserError::ManifestMissing,
        other => other,
    })?;
    let text = String::from_utf8(bytes)
        .map_err(|err| ParserError::ManifestMalformed(err.to_string()))?;
    parse_manifest(&text)
}

/// Parse manifest text into a [`Manifest`]. Fails with `ManifestMalformed`
/// on a non-empty line without a `Key: Value` shape and with `NoMainDalf`
/// when the `Main-Dalf` field is absent or empty.
pub fn parse_manifest(text: &str) -> Result<Manifest, ParserError> {
    let mut manifest = Manifest::default();

    for line in unfold_lines(text) {
        if line.is_empty() {
            continue;
        }
        let (key, value) = line
            .split_once(':')
            .ok_or_else(|| ParserError::ManifestMalformed(format!("line without ':': {line}")))?;
        let value: String = value.chars().filter(|c| !c.is_whitespace()).collect();

        match key.trim() {
            "Manifest-Version" => manifest.version = value,
            "Created-By" => manifest.created_by = value,
            "Name" => manifest.name = value,
            "Sdk-Version" => manifest.sdk_version = value,
            "Main-Dalf" => manifest.main_dalf = value,
            "Dalfs" => {
                manifest.dalfs = value
                    .split(',')
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            }
            "Format" => manifest.format = value,
            "Encryption" => manifest.encryption = value,
            // Manifests may carry fields we do not consume.
            _ => {}
        }
    }

    if manifest.main_dalf.is_empty() {
        return Err(ParserError::NoMainDalf);
    }

    Ok(manifest)
}

/// Join wrapped manifest lines: a line starting with a single space
/// continues the previous logical line.
fn unfold_lines(text: &str) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    for line in text.lines() {
        if let Some(rest) = line.strip_prefix(' ') {
            if let Some(last) = lines.last_mut() {
                last.push_str(rest);
                continue;
            }
        }
        lines.push(line.to_string());
    }
    lines
}
