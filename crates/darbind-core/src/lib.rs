//! Language-neutral model and type lattice for DAR binding generation

pub mod model;
pub mod naming;
pub mod types;

pub use model::{
    ExternalPackage, ExternalPackages, InterfaceMap, Manifest, Package, StructKind, TmplChoice,
    TmplField, TmplStruct,
};
pub use types::DamlType;
