//! Assembly of the template-input value handed to the text templating layer.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use darbind_core::naming::capitalize;
use darbind_core::{ExternalPackage, Package, TmplStruct};

use crate::error::CodegenError;

/// Everything a text template needs to render one package's source file.
#[derive(Debug, Clone, Serialize)]
pub struct TemplateData {
    /// The generator's target-package identifier, passed through verbatim.
    pub package: String,
    pub package_name: String,
    pub sdk_version: String,
    pub structs: BTreeMap<String, TmplStruct>,
    pub is_main_dalf: bool,
    pub generate_hex_codec: bool,
    /// Canonical names of the types appearing as choice arguments; the
    /// emitter keys its helper-function generation off this set.
    pub choice_arg_types: BTreeSet<String>,
    pub imported_packages: Vec<ExternalPackage>,
}

impl TemplateData {
    pub fn assemble(target_package: &str, pkg: &Package, generate_hex_codec: bool) -> Self {
        Self {
            package: target_package.to_string(),
            package_name: pkg.name.clone(),
            sdk_version: pkg.sdk_version.clone(),
            structs: pkg.structs.clone(),
            is_main_dalf: pkg.is_main_dalf,
            generate_hex_codec,
            choice_arg_types: choice_arg_types(pkg),
            imported_packages: pkg.imported_packages.clone(),
        }
    }
}

/// Scan every template's choices for argument types. Unit-typed arguments
/// carry no payload and are skipped; the `SET` sentinel stands for a struct
/// named after the choice.
fn choice_arg_types(pkg: &Package) -> BTreeSet<String> {
    let mut types = BTreeSet::new();
    for tmpl in pkg.structs.values() {
        if !tmpl.is_template {
            continue;
        }
        for choice in &tmpl.choices {
            let Some(arg) = &choice.arg_type else {
                continue;
            };
            let mut name = arg.canonical_name();
            if name.is_empty() || name == "Unit" {
                continue;
            }
            if name == "SET" {
                name = capitalize(&choice.name);
            }
            types.insert(name);
        }
    }
    types
}

/// The template-filler hook: turns a finalized template input into the text
/// of one output file. Actual host-language templates live outside this
/// crate; [`JsonFiller`] renders the neutral form for tooling and tests.
pub trait TemplateFiller {
    fn fill(&mut self, data: &TemplateData) -> Result<String, CodegenError>;
}

/// Renders the template input as pretty-printed JSON.
#[derive(Debug, Default)]
pub struct JsonFiller;

impl JsonFiller {
    pub fn new() -> Self {
        Self
    }
}

impl TemplateFiller for JsonFiller {
    fn fill(&mut self, data: &TemplateData) -> Result<String, CodegenError> {
        Ok(serde_json::to_string_pretty(data)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use darbind_core::{DamlType, StructKind, TmplChoice};

    fn choice(name: &str, arg: Option<DamlType>) -> TmplChoice {
        TmplChoice {
            name: name.to_string(),
            arg_type: arg,
            interface_name: None,
            interface_daml_name: None,
        }
    }

    fn package_with(structs: Vec<TmplStruct>) -> Package {
        Package {
            name: "demo".to_string(),
            package_id: "0".repeat(64),
            structs: structs.into_iter().map(|s| (s.name.clone(), s)).collect(),
            imported_packages: Vec::new(),
            sdk_version: "3.3.0".to_string(),
            is_main_dalf: true,
        }
    }

    #[test]
    fn test_choice_arg_scan_skips_unit_and_empty() {
        let mut tmpl = TmplStruct::new("W", "Main", StructKind::Template);
        tmpl.choices.push(choice("Archive", Some(DamlType::Unit)));
        tmpl.choices
            .push(choice("Accept", Some(DamlType::Unknown("Offer".to_string()))));
        tmpl.choices.push(choice("Noop", None));

        let data = TemplateData::assemble("bindings", &package_with(vec![tmpl]), false);
        assert_eq!(
            data.choice_arg_types.iter().collect::<Vec<_>>(),
            vec!["Offer"]
        );
    }

    #[test]
    fn test_set_sentinel_uses_capitalized_choice_name() {
        let mut tmpl = TmplStruct::new("W", "Main", StructKind::Template);
        tmpl.choices.push(choice("add_members", Some(DamlType::Set)));

        let data = TemplateData::assemble("bindings", &package_with(vec![tmpl]), false);
        assert!(data.choice_arg_types.contains("AddMembers"));
        assert!(!data.choice_arg_types.contains("SET"));
    }

    #[test]
    fn test_non_templates_do_not_contribute_choice_args() {
        let mut rec = TmplStruct::new("R", "Main", StructKind::Record);
        rec.choices
            .push(choice("Phantom", Some(DamlType::Unknown("X".to_string()))));

        let data = TemplateData::assemble("bindings", &package_with(vec![rec]), false);
        assert!(data.choice_arg_types.is_empty());
    }

    #[test]
    fn test_assemble_passes_flags_through() {
        let data = TemplateData::assemble("bindings", &package_with(Vec::new()), true);
        assert_eq!(data.package, "bindings");
        assert_eq!(data.package_name, "demo");
        assert!(data.is_main_dalf);
        assert!(data.generate_hex_codec);
    }

    #[test]
    fn test_json_filler_renders() {
        let data = TemplateData::assemble("bindings", &package_with(Vec::new()), false);
        let out = JsonFiller::new().fill(&data).unwrap();
        assert!(out.contains("\"package\": \"bindings\""));
        assert!(out.contains("\"package_name\": \"demo\""));
    }
}
