//! The closed lattice of DAML types the decoder maps onto.
//!
//! Every type a DALF can mention is collapsed into one of these variants.
//! The lattice is a pure value domain: type values are owned trees, two
//! structurally equal trees are equal, and nothing here refers back into
//! the decoder's interning tables.

use serde::{Deserialize, Serialize};

use crate::model::ExternalPackage;

/// A DAML type as seen by the emitter.
///
/// `List` and `Optional` wrap their element type recursively. `Imported`
/// marks a type that lives in another package and carries the import under
/// which the emitter must qualify it. `Unknown` is the fallback for
/// user-defined types of the current package; its payload is the raw DAML
/// type constructor name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DamlType {
    Unit,
    Bool,
    Int64,
    Text,
    Party,
    Date,
    Timestamp,
    Numeric,
    BigNumeric,
    Decimal,
    ContractId,
    GenMap,
    TextMap,
    RoundingMode,
    RelTime,
    Any,
    /// An enum data type; emitted as the target language's string type.
    Enum,
    /// Sentinel for set-typed choice arguments, resolved by the emitter
    /// to a struct named after the choice.
    Set,
    List(Box<DamlType>),
    Optional(Box<DamlType>),
    Imported {
        inner: Box<DamlType>,
        package: ExternalPackage,
    },
    Unknown(String),
}

impl DamlType {
    /// The canonical, language-neutral spelling of this type.
    ///
    /// Wrappers render as `list of <inner>` and `nullable <inner>`; imported
    /// types as `<alias>.<inner>`. Underscores in `Unknown` names are
    /// dropped to match the emitter's camel-case policy.
    pub fn canonical_name(&self) -> String {
        match self {
            DamlType::Unit => "Unit".to_string(),
            DamlType::Bool => "Bool".to_string(),
            DamlType::Int64 => "Int64".to_string(),
            DamlType::Text => "Text".to_string(),
            DamlType::Party => "Party".to_string(),
            DamlType::Date => "Date".to_string(),
            DamlType::Timestamp => "Timestamp".to_string(),
            DamlType::Numeric => "Numeric".to_string(),
            DamlType::BigNumeric => "BigNumeric".to_string(),
            DamlType::Decimal => "Decimal".to_string(),
            DamlType::ContractId => "ContractId".to_string(),
            DamlType::GenMap => "GenMap".to_string(),
            DamlType::TextMap => "TextMap".to_string(),
            DamlType::RoundingMode => "RoundingMode".to_string(),
            DamlType::RelTime => "RelTime".to_string(),
            DamlType::Any => "Any".to_string(),
            DamlType::Enum => "string".to_string(),
            DamlType::Set => "SET".to_string(),
            DamlType::List(inner) => format!("list of {}", inner.canonical_name()),
            DamlType::Optional(inner) => format!("nullable {}", inner.canonical_name()),
            DamlType::Imported { inner, package } => {
                format!("{}.{}", package.alias, inner.canonical_name())
            }
            DamlType::Unknown(name) => name.replace('_', ""),
        }
    }

    /// The external package this type pulls in, if any.
    ///
    /// Only `Imported` (possibly below a `List`/`Optional` wrapper) answers
    /// with a package; everything else resolves locally.
    pub fn external_package(&self) -> Option<&ExternalPackage> {
        match self {
            DamlType::List(inner) | DamlType::Optional(inner) => inner.external_package(),
            DamlType::Imported { package, .. } => Some(package),
            _ => None,
        }
    }

    pub fn is_optional(&self) -> bool {
        matches!(self, DamlType::Optional(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ext(import: &str, alias: &str) -> ExternalPackage {
        ExternalPackage {
            import: import.to_string(),
            alias: alias.to_string(),
        }
    }

    #[test]
    fn test_primitive_canonical_names() {
        assert_eq!(DamlType::Unit.canonical_name(), "Unit");
        assert_eq!(DamlType::Int64.canonical_name(), "Int64");
        assert_eq!(DamlType::Party.canonical_name(), "Party");
        assert_eq!(DamlType::ContractId.canonical_name(), "ContractId");
        assert_eq!(DamlType::RoundingMode.canonical_name(), "RoundingMode");
        assert_eq!(DamlType::Enum.canonical_name(), "string");
        assert_eq!(DamlType::Set.canonical_name(), "SET");
    }

    #[test]
    fn test_wrappers_compose_recursively() {
        let ty = DamlType::List(Box::new(DamlType::Optional(Box::new(DamlType::Unknown(
            "Foo".to_string(),
        )))));
        assert_eq!(ty.canonical_name(), "list of nullable Foo");
    }

    #[test]
    fn test_unknown_strips_underscores() {
        let ty = DamlType::Unknown("My_Type_Name".to_string());
        assert_eq!(ty.canonical_name(), "MyTypeName");
    }

    #[test]
    fn test_imported_qualifies_with_alias() {
        let ty = DamlType::Imported {
            inner: Box::new(DamlType::Unknown("IFoo".to_string())),
            package: ext("my/imports/a", "a"),
        };
        assert_eq!(ty.canonical_name(), "a.IFoo");
        assert_eq!(ty.external_package().unwrap().alias, "a");
    }

    #[test]
    fn test_external_package_propagates_through_wrappers() {
        let imported = DamlType::Imported {
            inner: Box::new(DamlType::Int64),
            package: ext("my/imports/a", "a"),
        };
        let wrapped = DamlType::Optional(Box::new(DamlType::List(Box::new(imported))));
        assert_eq!(wrapped.external_package().unwrap().import, "my/imports/a");

        assert!(DamlType::Int64.external_package().is_none());
        assert!(DamlType::Unknown("Local".to_string())
            .external_package()
            .is_none());
    }

    #[test]
    fn test_is_optional() {
        assert!(DamlType::Optional(Box::new(DamlType::Text)).is_optional());
        assert!(!DamlType::List(Box::new(DamlType::Text)).is_optional());
        assert!(!DamlType::Text.is_optional());
    }
}
