//! DAR archive, manifest, and DAML-LF decoders

pub mod archive;
pub mod daml_lf;
pub mod error;
pub mod manifest;
pub mod v3;
pub mod version;

use std::collections::BTreeMap;

use darbind_core::{ExternalPackages, InterfaceMap, TmplStruct};

pub use archive::DarReader;
pub use error::ParserError;
pub use manifest::{parse_manifest, read_manifest, MANIFEST_PATH};
pub use version::decoder_for_version;

/// A versioned decoder over one DALF's byte payload.
///
/// `interfaces` is the pass-1 operation: it yields only the interface
/// declarations. `template_structs` is the full pass-2 decode; it takes the
/// cross-DALF interface index and returns the declarations plus the set of
/// external packages the DALF actually referenced.
pub trait LfDecoder {
    fn interfaces(&mut self) -> Result<InterfaceMap, ParserError>;

    fn template_structs(
        &mut self,
        interfaces_by_module: &BTreeMap<String, InterfaceMap>,
    ) -> Result<(BTreeMap<String, TmplStruct>, ExternalPackages), ParserError>;
}
