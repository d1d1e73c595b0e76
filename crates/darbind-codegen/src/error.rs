use thiserror::Error;

use darbind_parser::ParserError;

#[derive(Error, Debug)]
pub enum CodegenError {
    #[error(transparent)]
    Parser(#[from] ParserError),

    #[error("could not extract package ID from main DALF path '{0}'")]
    MissingPackageId(String),

    #[error("template input serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}
