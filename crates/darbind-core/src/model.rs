//! Language-neutral model of a decoded DAML package.
//!
//! The decoder materialises everything it hands out into these owned values;
//! no interning indices or protobuf references survive past decoding.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::DamlType;

/// An external package under which cross-package type references are
/// emitted: the import path plus the alias used to qualify names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalPackage {
    pub import: String,
    pub alias: String,
}

/// External packages keyed by the 64-hex package ID they are published under.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExternalPackages {
    pub packages: BTreeMap<String, ExternalPackage>,
}

/// The parsed `META-INF/MANIFEST.MF` of a DAR archive.
///
/// All values have inner whitespace stripped. `dalfs` is the full list from
/// the manifest; [`Manifest::dalf_worklist`] applies the stdlib filter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Manifest {
    pub version: String,
    pub created_by: String,
    pub name: String,
    pub sdk_version: String,
    pub main_dalf: String,
    pub dalfs: Vec<String>,
    pub format: String,
    pub encryption: String,
}

impl Manifest {
    /// The DALFs to process: the main DALF plus every auxiliary DALF whose
    /// path does not contain `prim` or `stdlib` (case-insensitive).
    pub fn dalf_worklist(&self) -> Vec<String> {
        let mut worklist = vec![self.main_dalf.clone()];
        for dalf in &self.dalfs {
            if dalf == &self.main_dalf {
                continue;
            }
            let lower = dalf.to_lowercase();
            if lower.contains("prim") || lower.contains("stdlib") {
                continue;
            }
            worklist.push(dalf.clone());
        }
        worklist
    }
}

/// What a top-level declaration is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StructKind {
    Record,
    Variant,
    Enum,
    Template,
    Interface,
}

/// A field of a record, variant, or template.
///
/// Variant constructors are modelled as fields with `is_optional` forced on,
/// so the struct shape stays uniform with records; emitters re-interpret.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TmplField {
    pub name: String,
    pub ty: DamlType,
    /// Debug rendering of the protobuf node the field was decoded from.
    pub raw_form: String,
    pub is_optional: bool,
    pub is_enum: bool,
}

/// A choice exercisable on a template or declared by an interface.
///
/// `interface_name`/`interface_daml_name` are set only on choices copied
/// onto a template from an interface it implements.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TmplChoice {
    pub name: String,
    pub arg_type: Option<DamlType>,
    pub interface_name: Option<String>,
    pub interface_daml_name: Option<String>,
}

/// A top-level declaration of a package: record, variant, enum, template,
/// or interface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TmplStruct {
    pub name: String,
    /// The declaration's name as written in DAML, before any `I` prefix or
    /// collision rename. Empty for plain data types.
    pub daml_name: String,
    pub module_name: String,
    pub kind: StructKind,
    pub fields: Vec<TmplField>,
    pub choices: Vec<TmplChoice>,
    /// Interfaces this template implements, as lattice references.
    pub implements: Vec<DamlType>,
    pub key: Option<TmplField>,
    /// Last segment of the defining module, for interfaces.
    pub location: String,
    pub is_template: bool,
    pub is_interface: bool,
}

impl TmplStruct {
    pub fn new(name: impl Into<String>, module_name: impl Into<String>, kind: StructKind) -> Self {
        Self {
            name: name.into(),
            daml_name: String::new(),
            module_name: module_name.into(),
            kind,
            fields: Vec::new(),
            choices: Vec::new(),
            implements: Vec::new(),
            key: None,
            location: String::new(),
            is_template: kind == StructKind::Template,
            is_interface: kind == StructKind::Interface,
        }
    }

    pub fn has_choice(&self, name: &str) -> bool {
        self.choices.iter().any(|c| c.name == name)
    }
}

/// Interfaces of one module, keyed by their (possibly renamed) `I`-name.
pub type InterfaceMap = BTreeMap<String, TmplStruct>;

/// A finalized package, ready for the emission adapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Package {
    pub name: String,
    pub package_id: String,
    pub structs: BTreeMap<String, TmplStruct>,
    /// External packages actually referenced by this DALF, sorted by
    /// import path.
    pub imported_packages: Vec<ExternalPackage>,
    pub sdk_version: String,
    pub is_main_dalf: bool,
}
