use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParserError {
    #[error("failed to open archive: {0}")]
    BadArchive(zip::result::ZipError),

    #[error("archive entry '{0}' not found")]
    MissingEntry(String),

    #[error("archive manifest META-INF/MANIFEST.MF is missing")]
    ManifestMissing,

    #[error("malformed manifest: {0}")]
    ManifestMalformed(String),

    #[error("manifest has no Main-Dalf entry")]
    NoMainDalf,

    #[error("unsupported SDK version '{0}'")]
    UnsupportedVersion(String),

    #[error("malformed DALF payload: {0}")]
    Decode(#[from] prost::DecodeError),

    #[error("malformed DALF: {0}")]
    MalformedDalf(String),

    #[error("interned {kind} index {index} out of range")]
    InternedIndex { kind: &'static str, index: i32 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
