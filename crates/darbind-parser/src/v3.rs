//! Decoder for the "3." SDK family (`daml-lf-2` payloads).
//!
//! All names and types handed out are materialised from the package's
//! interning tables into owned values; nothing downstream sees an interning
//! index.

use std::collections::BTreeMap;

use prost::Message;
use tracing::{debug, info, warn};

use darbind_core::{
    DamlType, ExternalPackage, ExternalPackages, InterfaceMap, StructKind, TmplChoice, TmplField,
    TmplStruct,
};

use crate::daml_lf::{
    self, archive_payload, def_data_type::DataCons, self_or_imported_package_id, BuiltinType,
    ExprSum, TypeSum,
};
use crate::error::ParserError;
use crate::LfDecoder;

/// Canonical-name sentinel of the implicit archive choice's argument.
const ARCHIVE_SENTINEL: &str = "Archive";
const ARCHIVE_CHOICE: &str = "Archive";
/// Stdlib type constructors with a dedicated lattice variant.
const RELTIME_SYNONYM: &str = "RelTime";

pub struct V3Decoder {
    payload: Vec<u8>,
    /// External packages the caller allows referencing, keyed by package ID.
    external_packages: ExternalPackages,
    /// Packages actually referenced while decoding the current DALF. Starts
    /// empty and grows as type references resolve externally, so the
    /// emitted import list stays minimal.
    imported: BTreeMap<String, ExternalPackage>,
}

impl V3Decoder {
    pub fn new(payload: Vec<u8>, external_packages: ExternalPackages) -> Self {
        Self {
            payload,
            external_packages,
            imported: BTreeMap::new(),
        }
    }

    /// Unwrap the two-level envelope down to the `daml_lf_2` package.
    fn decode_package(&self) -> Result<daml_lf::Package, ParserError> {
        let archive = daml_lf::Archive::decode(self.payload.as_slice())?;
        let payload = daml_lf::ArchivePayload::decode(archive.payload.as_slice())?;
        match payload.sum {
            Some(archive_payload::Sum::DamlLf2(bytes)) => {
                Ok(daml_lf::Package::decode(bytes.as_slice())?)
            }
            _ => Err(ParserError::UnsupportedVersion(
                "archive payload is not daml-lf-2".to_string(),
            )),
        }
    }

    fn interfaces_of_module(
        &mut self,
        lf: &daml_lf::Package,
        module: &daml_lf::Module,
        module_name: &str,
    ) -> Result<InterfaceMap, ParserError> {
        let mut structs = InterfaceMap::new();

        for iface in &module.interfaces {
            let original_name = last_segment(lf, iface.tycon_interned_dname)?;
            let interface_name = format!("I{original_name}");
            let location_id = iface
                .location
                .as_ref()
                .and_then(|l| l.module.as_ref())
                .map(|m| m.module_name_interned_dname)
                .unwrap_or(0);
            let location = last_segment(lf, location_id)?;
            debug!(
                "processing interface: {interface_name}, original name {original_name} \
                 location {location}"
            );

            let mut tmpl = TmplStruct::new(interface_name.clone(), module_name, StructKind::Interface);
            tmpl.daml_name = original_name;
            tmpl.location = location;
            tmpl.choices = self.choices(lf, &iface.choices)?;

            structs.insert(interface_name, tmpl);
        }

        Ok(structs)
    }

    fn data_types(
        &mut self,
        lf: &daml_lf::Package,
        module: &daml_lf::Module,
        module_name: &str,
    ) -> Result<BTreeMap<String, TmplStruct>, ParserError> {
        let mut structs = BTreeMap::new();

        for data_type in &module.data_types {
            if !data_type.serializable {
                continue;
            }

            let name = last_segment(lf, data_type.name_interned_dname)?;
            let mut tmpl = TmplStruct::new(name.clone(), module_name, StructKind::Record);

            match &data_type.data_cons {
                Some(DataCons::Record(record)) => {
                    for field in &record.fields {
                        let (field_name, ty, raw_form) = self.extract_field(lf, field)?;
                        let is_optional = ty.is_optional();
                        tmpl.fields.push(TmplField {
                            name: field_name,
                            ty,
                            raw_form,
                            is_optional,
                            is_enum: false,
                        });
                    }
                }
                Some(DataCons::Variant(variant)) => {
                    tmpl.kind = StructKind::Variant;
                    for field in &variant.fields {
                        let (field_name, ty, raw_form) = self.extract_field(lf, field)?;
                        tmpl.fields.push(TmplField {
                            name: field_name,
                            ty,
                            raw_form,
                            is_optional: true,
                            is_enum: false,
                        });
                    }
                }
                Some(DataCons::Enum(constructors)) => {
                    tmpl.kind = StructKind::Enum;
                    for idx in &constructors.constructors_interned_str {
                        let constructor = interned_string(lf, *idx)?.to_string();
                        tmpl.fields.push(TmplField {
                            name: constructor,
                            ty: DamlType::Enum,
                            raw_form: String::new(),
                            is_optional: false,
                            is_enum: false,
                        });
                    }
                }
                Some(DataCons::Interface(_)) => {
                    // Interfaces are decoded from the module's interface
                    // list; the data-type placeholder carries nothing.
                    debug!("skipping interface placeholder data type {name}");
                    continue;
                }
                None => {
                    warn!("unknown data constructor for data type {name}");
                }
            }

            structs.insert(name, tmpl);
        }

        Ok(structs)
    }

    fn templates(
        &mut self,
        lf: &daml_lf::Package,
        module: &daml_lf::Module,
        module_name: &str,
        interfaces_by_module: &BTreeMap<String, InterfaceMap>,
    ) -> Result<BTreeMap<String, TmplStruct>, ParserError> {
        let mut structs = BTreeMap::new();

        for template in &module.templates {
            let template_name = last_segment(lf, template.tycon_interned_dname)?;
            debug!("processing template: {template_name}");

            let mut template_data_type = None;
            for data_type in &module.data_types {
                if last_segment(lf, data_type.name_interned_dname)? == template_name {
                    template_data_type = Some(data_type);
                    break;
                }
            }
            let Some(template_data_type) = template_data_type else {
                debug!("could not find data type for template: {template_name}");
                continue;
            };

            let mut tmpl = TmplStruct::new(template_name.clone(), module_name, StructKind::Template);

            match &template_data_type.data_cons {
                Some(DataCons::Record(record)) => {
                    for field in &record.fields {
                        let (field_name, ty, raw_form) = self.extract_field(lf, field)?;
                        let is_optional = ty.is_optional();
                        let is_enum = is_enum_type(lf, &ty)?;
                        tmpl.fields.push(TmplField {
                            name: field_name,
                            ty,
                            raw_form,
                            is_optional,
                            is_enum,
                        });
                    }
                }
                _ => {
                    debug!("template {template_name} has a non-record data type");
                }
            }

            tmpl.choices.extend(self.choices(lf, &template.choices)?);
            // Every template is archivable; guarantee the choice even when a
            // payload omits it.
            if !tmpl.has_choice(ARCHIVE_CHOICE) {
                tmpl.choices.push(TmplChoice {
                    name: ARCHIVE_CHOICE.to_string(),
                    arg_type: Some(DamlType::Unit),
                    interface_name: None,
                    interface_daml_name: None,
                });
            }

            if let Some(key) = &template.key {
                self.extract_key(lf, key, &mut tmpl)?;
            }

            self.resolve_implements(lf, template, &mut tmpl, interfaces_by_module)?;

            structs.insert(template_name, tmpl);
        }

        Ok(structs)
    }

    /// Walk the key expression, take the first field name it yields, and
    /// match it against the template's fields. Composite keys collapse to
    /// their first field.
    fn extract_key(
        &mut self,
        lf: &daml_lf::Package,
        key: &daml_lf::DefKey,
        tmpl: &mut TmplStruct,
    ) -> Result<(), ParserError> {
        let raw_key_type = format!("{:?}", key.r#type);
        debug!("template {} has key of type: {raw_key_type}", tmpl.name);

        let field_names = key_field_names(lf, key.key_expr.as_ref())?;
        if field_names.is_empty() {
            warn!("could not extract fields from key expression");
            return Ok(());
        }

        let key_field_name = &field_names[0];
        if let Some(field) = tmpl.fields.iter().find(|f| &f.name == key_field_name) {
            tmpl.key = Some(TmplField {
                name: field.name.clone(),
                ty: field.ty.clone(),
                raw_form: raw_key_type,
                is_optional: false,
                is_enum: false,
            });
            debug!("template {} key field: {key_field_name}", tmpl.name);
        }

        Ok(())
    }

    fn resolve_implements(
        &mut self,
        lf: &daml_lf::Package,
        template: &daml_lf::DefTemplate,
        tmpl: &mut TmplStruct,
        interfaces_by_module: &BTreeMap<String, InterfaceMap>,
    ) -> Result<(), ParserError> {
        for implement in &template.implements {
            let Some(ifc_id) = &implement.interface else {
                continue;
            };

            let interface_name = format!("I{}", last_segment(lf, ifc_id.name_interned_dname)?);
            let package_sum = ifc_id
                .module
                .as_ref()
                .and_then(|m| m.package_id.as_ref())
                .and_then(|p| p.sum.as_ref());

            let mut ext_pkg = None;
            let implements = match package_sum {
                Some(self_or_imported_package_id::Sum::SelfPackageId(_)) => {
                    DamlType::Unknown(interface_name.clone())
                }
                Some(self_or_imported_package_id::Sum::ImportedPackageIdInternedStr(idx)) => {
                    let package_id = interned_string(lf, *idx)?.to_string();
                    self.imported_interface(&package_id, &interface_name, &mut ext_pkg)
                }
                Some(self_or_imported_package_id::Sum::PackageImportId(idx)) => {
                    let package_id = package_import(lf, *idx)?.to_string();
                    self.imported_interface(&package_id, &interface_name, &mut ext_pkg)
                }
                None => {
                    warn!("unknown package ID for interface implementation on {}", tmpl.name);
                    continue;
                }
            };
            tmpl.implements.push(implements);

            let module_name_id = ifc_id
                .module
                .as_ref()
                .map(|m| m.module_name_interned_dname)
                .unwrap_or(0);
            let ifc_module_name = dotted_name(lf, module_name_id)?;
            debug!(
                "template {} implements interface: {interface_name} location {ifc_module_name}",
                tmpl.name
            );

            let Some(interface_struct) = interfaces_by_module
                .get(&ifc_module_name)
                .and_then(|m| m.get(&interface_name))
            else {
                continue;
            };
            debug!(
                "found interface {interface_name} in index with {} choices",
                interface_struct.choices.len()
            );

            for ifc_choice in &interface_struct.choices {
                if tmpl.has_choice(&ifc_choice.name) {
                    continue;
                }
                debug!(
                    "adding interface choice {} to template {}",
                    ifc_choice.name, tmpl.name
                );
                let arg_type = match (&ext_pkg, &ifc_choice.arg_type) {
                    (Some(ext), Some(arg)) => Some(DamlType::Imported {
                        inner: Box::new(arg.clone()),
                        package: ext.clone(),
                    }),
                    (_, arg) => arg.clone(),
                };
                tmpl.choices.push(TmplChoice {
                    name: ifc_choice.name.clone(),
                    arg_type,
                    interface_name: Some(interface_name.clone()),
                    interface_daml_name: Some(interface_struct.daml_name.clone()),
                });
            }
        }

        Ok(())
    }

    /// Resolve an interface reference that lives in another package,
    /// registering the import when the package is known.
    fn imported_interface(
        &mut self,
        package_id: &str,
        interface_name: &str,
        ext_pkg: &mut Option<ExternalPackage>,
    ) -> DamlType {
        if let Some(ext) = self.external_packages.packages.get(package_id) {
            let ext = ext.clone();
            self.imported.insert(package_id.to_string(), ext.clone());
            *ext_pkg = Some(ext.clone());
            DamlType::Imported {
                inner: Box::new(DamlType::Unknown(interface_name.to_string())),
                package: ext,
            }
        } else {
            DamlType::Unknown(interface_name.to_string())
        }
    }

    fn choices(
        &mut self,
        lf: &daml_lf::Package,
        choices: &[daml_lf::TemplateChoice],
    ) -> Result<Vec<TmplChoice>, ParserError> {
        let mut res = Vec::with_capacity(choices.len());

        for choice in choices {
            let name = interned_string(lf, choice.name_interned_str)?.to_string();
            let mut arg_type = None;

            if let Some(ty) = choice.arg_binder.as_ref().and_then(|b| b.r#type.as_ref()) {
                let mut extracted = self.extract_type(lf, ty)?;
                // The archive choice's declared argument is the sentinel
                // record; rewrite it so emitters see a zero-arg choice.
                if extracted.canonical_name() == ARCHIVE_SENTINEL {
                    extracted = DamlType::Unit;
                }
                arg_type = Some(extracted);
            }

            res.push(TmplChoice {
                name,
                arg_type,
                interface_name: None,
                interface_daml_name: None,
            });
        }

        Ok(res)
    }

    fn extract_field(
        &mut self,
        lf: &daml_lf::Package,
        field: &daml_lf::FieldWithType,
    ) -> Result<(String, DamlType, String), ParserError> {
        let name = interned_string(lf, field.field_interned_str)?.to_string();
        let Some(ty) = &field.r#type else {
            return Err(ParserError::MalformedDalf(format!(
                "field {name} has no type"
            )));
        };
        let extracted = self.extract_type(lf, ty)?;
        Ok((name, extracted, format!("{field:?}")))
    }

    fn extract_type(
        &mut self,
        lf: &daml_lf::Package,
        ty: &daml_lf::Type,
    ) -> Result<DamlType, ParserError> {
        let Some(sum) = &ty.sum else {
            warn!("unknown type discriminant, emitting best-effort name");
            return Ok(DamlType::Unknown("unknown_type".to_string()));
        };

        match sum {
            TypeSum::InternedType(index) => {
                let inner = lf
                    .interned_types
                    .get(*index as usize)
                    .ok_or(ParserError::InternedIndex {
                        kind: "type",
                        index: *index,
                    })?
                    .clone();
                self.extract_type(lf, &inner)
            }
            TypeSum::Tapp(tapp) => self.extract_tapp(lf, tapp),
            TypeSum::Builtin(builtin) => self.extract_builtin(lf, builtin),
            TypeSum::Con(con) => self.extract_con(lf, con),
            // Type variables cannot be mapped further at this layer.
            TypeSum::Var(_) => Ok(DamlType::Any),
            TypeSum::Syn(syn) => match &syn.tysyn {
                Some(tysyn) => Ok(DamlType::Unknown(last_segment(
                    lf,
                    tysyn.name_interned_dname,
                )?)),
                None => Ok(DamlType::Unknown("syn_without_name".to_string())),
            },
        }
    }

    fn extract_tapp(
        &mut self,
        lf: &daml_lf::Package,
        tapp: &daml_lf::TypeApp,
    ) -> Result<DamlType, ParserError> {
        let lhs = match &tapp.lhs {
            Some(lhs) => self.extract_type(lf, lhs)?,
            None => DamlType::Unknown("unknown_tapp".to_string()),
        };

        match lhs {
            DamlType::List(_) => {
                let rhs = self.extract_rhs(lf, tapp)?;
                Ok(DamlType::List(Box::new(rhs)))
            }
            DamlType::Optional(_) => {
                let rhs = self.extract_rhs(lf, tapp)?;
                Ok(DamlType::Optional(Box::new(rhs)))
            }
            // ContractId X collapses to ContractId. The argument is not
            // decoded, so a contract id of an external type never drags that
            // package into the imports set.
            DamlType::ContractId => Ok(lhs),
            other => Ok(other),
        }
    }

    fn extract_rhs(
        &mut self,
        lf: &daml_lf::Package,
        tapp: &daml_lf::TypeApp,
    ) -> Result<DamlType, ParserError> {
        match &tapp.rhs {
            Some(rhs) => self.extract_type(lf, rhs),
            None => Ok(DamlType::Unknown("unknown_tapp".to_string())),
        }
    }

    fn extract_builtin(
        &mut self,
        lf: &daml_lf::Package,
        builtin: &daml_lf::TypeBuiltin,
    ) -> Result<DamlType, ParserError> {
        let ty = match BuiltinType::try_from(builtin.builtin) {
            Ok(BuiltinType::Unit) => DamlType::Unit,
            Ok(BuiltinType::Bool) => DamlType::Bool,
            Ok(BuiltinType::Int64) => DamlType::Int64,
            Ok(BuiltinType::Date) => DamlType::Date,
            Ok(BuiltinType::Timestamp) => DamlType::Timestamp,
            Ok(BuiltinType::Numeric) => DamlType::Numeric,
            Ok(BuiltinType::Party) => DamlType::Party,
            Ok(BuiltinType::Text) => DamlType::Text,
            Ok(BuiltinType::ContractId) => DamlType::ContractId,
            Ok(BuiltinType::Optional) => {
                let inner = match builtin.args.first() {
                    Some(arg) => self.extract_type(lf, arg)?,
                    None => DamlType::Unknown("optional_without_arg".to_string()),
                };
                DamlType::Optional(Box::new(inner))
            }
            Ok(BuiltinType::List) => {
                let inner = match builtin.args.first() {
                    Some(arg) => self.extract_type(lf, arg)?,
                    None => DamlType::Unknown("list_without_arg".to_string()),
                };
                DamlType::List(Box::new(inner))
            }
            Ok(BuiltinType::Genmap) => DamlType::GenMap,
            Ok(BuiltinType::Textmap) => DamlType::TextMap,
            Ok(BuiltinType::Bignumeric) => DamlType::BigNumeric,
            Ok(BuiltinType::RoundingMode) => DamlType::RoundingMode,
            Ok(BuiltinType::Any) => DamlType::Any,
            Ok(
                BuiltinType::AnyException
                | BuiltinType::TypeRep
                | BuiltinType::Arrow
                | BuiltinType::Update
                | BuiltinType::FailureCategory,
            ) => DamlType::Unknown(String::new()),
            Err(_) => DamlType::Unknown(String::new()),
        };
        Ok(ty)
    }

    fn extract_con(
        &mut self,
        lf: &daml_lf::Package,
        con: &daml_lf::TypeCon,
    ) -> Result<DamlType, ParserError> {
        let Some(tycon) = &con.tycon else {
            return Ok(DamlType::Unknown("con_without_tycon".to_string()));
        };
        let package_sum = tycon
            .module
            .as_ref()
            .and_then(|m| m.package_id.as_ref())
            .and_then(|p| p.sum.as_ref());

        match package_sum {
            // Local constructor, generated as part of this DALF's output.
            Some(self_or_imported_package_id::Sum::SelfPackageId(_)) => Ok(DamlType::Unknown(
                last_segment(lf, tycon.name_interned_dname)?,
            )),
            Some(self_or_imported_package_id::Sum::ImportedPackageIdInternedStr(idx)) => {
                let package_id = interned_string(lf, *idx)?.to_string();
                let name = last_segment(lf, tycon.name_interned_dname)?;
                Ok(self.imported_con(&package_id, name, true))
            }
            Some(self_or_imported_package_id::Sum::PackageImportId(idx)) => {
                let package_id = package_import(lf, *idx)?.to_string();
                let name = last_segment(lf, tycon.name_interned_dname)?;
                Ok(self.imported_con(&package_id, name, false))
            }
            None => Ok(DamlType::Unknown("con_without_tycon".to_string())),
        }
    }

    /// A constructor from another package: wrap as `Imported` when the
    /// caller supplied that package, otherwise fall back to a bare name.
    /// The interned-string mode also recognises stdlib synonyms.
    fn imported_con(&mut self, package_id: &str, name: String, stdlib_synonyms: bool) -> DamlType {
        if let Some(ext) = self.external_packages.packages.get(package_id) {
            let ext = ext.clone();
            self.imported.insert(package_id.to_string(), ext.clone());
            return DamlType::Imported {
                inner: Box::new(DamlType::Unknown(name)),
                package: ext,
            };
        }

        if stdlib_synonyms && name == RELTIME_SYNONYM {
            return DamlType::RelTime;
        }

        DamlType::Unknown(name)
    }
}

impl LfDecoder for V3Decoder {
    fn interfaces(&mut self) -> Result<InterfaceMap, ParserError> {
        let lf = self.decode_package()?;
        let mut interface_map = InterfaceMap::new();

        for module in &lf.modules {
            if lf.interned_strings.is_empty() {
                continue;
            }
            let module_name = dotted_name(&lf, module.name_interned_dname)?;
            let interfaces = self.interfaces_of_module(&lf, module, &module_name)?;
            interface_map.extend(interfaces);
        }

        Ok(interface_map)
    }

    fn template_structs(
        &mut self,
        interfaces_by_module: &BTreeMap<String, InterfaceMap>,
    ) -> Result<(BTreeMap<String, TmplStruct>, ExternalPackages), ParserError> {
        // Reset so the snapshot covers only packages this DALF references.
        self.imported.clear();

        let lf = self.decode_package()?;
        let mut structs = BTreeMap::new();

        for module in &lf.modules {
            if lf.interned_strings.is_empty() {
                continue;
            }
            let module_name = dotted_name(&lf, module.name_interned_dname)?;
            info!("processing module {module_name}");

            structs.extend(self.data_types(&lf, module, &module_name)?);
            structs.extend(self.templates(&lf, module, &module_name, interfaces_by_module)?);
        }

        let imported = ExternalPackages {
            packages: std::mem::take(&mut self.imported),
        };
        Ok((structs, imported))
    }
}

/// True when `ty` names an enum data type of this package.
fn is_enum_type(lf: &daml_lf::Package, ty: &DamlType) -> Result<bool, ParserError> {
    let type_name = ty.canonical_name();
    for module in &lf.modules {
        for data_type in &module.data_types {
            if !data_type.serializable {
                continue;
            }
            if last_segment(lf, data_type.name_interned_dname)? == type_name
                && matches!(data_type.data_cons, Some(DataCons::Enum(_)))
            {
                return Ok(true);
            }
        }
    }
    Ok(false)
}

/// Field names referenced by a key expression. Record projections and
/// constructions give reliable names; variable references are included as
/// they often name the keyed field.
fn key_field_names(
    lf: &daml_lf::Package,
    expr: Option<&daml_lf::Expr>,
) -> Result<Vec<String>, ParserError> {
    let mut names = Vec::new();
    collect_key_fields(lf, expr, &mut names)?;
    Ok(names)
}

fn collect_key_fields(
    lf: &daml_lf::Package,
    expr: Option<&daml_lf::Expr>,
    out: &mut Vec<String>,
) -> Result<(), ParserError> {
    let Some(expr) = expr else {
        return Ok(());
    };

    match &expr.sum {
        Some(ExprSum::RecProj(proj)) => {
            if proj.field_interned_str != 0 {
                out.push(interned_string(lf, proj.field_interned_str)?.to_string());
            }
            collect_key_fields(lf, proj.record.as_deref(), out)?;
        }
        Some(ExprSum::RecCon(con)) => {
            for field in &con.fields {
                if field.field_interned_str != 0 {
                    out.push(interned_string(lf, field.field_interned_str)?.to_string());
                }
            }
        }
        Some(ExprSum::VarInternedStr(idx)) => {
            if *idx != 0 {
                out.push(interned_string(lf, *idx)?.to_string());
            }
        }
        Some(ExprSum::Builtin(_)) => {}
        None => {
            debug!("unhandled expression node in key parsing");
        }
    }

    Ok(())
}

fn interned_string(lf: &daml_lf::Package, index: i32) -> Result<&str, ParserError> {
    lf.interned_strings
        .get(index as usize)
        .map(String::as_str)
        .ok_or(ParserError::InternedIndex {
            kind: "string",
            index,
        })
}

/// Package ID referenced through the package-imports table.
fn package_import(lf: &daml_lf::Package, index: i32) -> Result<&str, ParserError> {
    lf.package_imports
        .as_ref()
        .and_then(|imports| imports.imported_packages.get(index as usize))
        .map(String::as_str)
        .ok_or(ParserError::InternedIndex {
            kind: "package import",
            index,
        })
}

/// Last segment of an interned dotted name.
fn last_segment(lf: &daml_lf::Package, index: i32) -> Result<String, ParserError> {
    let dotted = lf
        .interned_dotted_names
        .get(index as usize)
        .ok_or(ParserError::InternedIndex {
            kind: "dotted name",
            index,
        })?;
    let last = dotted
        .segments_interned_str
        .last()
        .ok_or(ParserError::InternedIndex {
            kind: "dotted name",
            index,
        })?;
    Ok(interned_string(lf, *last)?.to_string())
}

/// Full dotted name, segments joined with `.`.
fn dotted_name(lf: &daml_lf::Package, index: i32) -> Result<String, ParserError> {
    let dotted = lf
        .interned_dotted_names
        .get(index as usize)
        .ok_or(ParserError::InternedIndex {
            kind: "dotted name",
            index,
        })?;
    let mut parts = Vec::with_capacity(dotted.segments_interned_str.len());
    for segment in &dotted.segments_interned_str {
        parts.push(interned_string(lf, *segment)?);
    }
    Ok(parts.join("."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::daml_lf::{
        Expr, ExprRecProj, ModuleId, SelfOrImportedPackageId, Type, TypeApp, TypeBuiltin, TypeCon,
        TypeConId, Unit as LfUnit,
    };

    fn lf_with_strings(strings: &[&str]) -> daml_lf::Package {
        daml_lf::Package {
            interned_strings: strings.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    fn builtin(kind: BuiltinType, args: Vec<Type>) -> Type {
        Type {
            sum: Some(TypeSum::Builtin(TypeBuiltin {
                builtin: kind as i32,
                args,
            })),
        }
    }

    fn tapp(lhs: Type, rhs: Type) -> Type {
        Type {
            sum: Some(TypeSum::Tapp(TypeApp {
                lhs: Some(Box::new(lhs)),
                rhs: Some(Box::new(rhs)),
            })),
        }
    }

    fn con(package_sum: self_or_imported_package_id::Sum, name_dname: i32) -> Type {
        Type {
            sum: Some(TypeSum::Con(TypeCon {
                tycon: Some(TypeConId {
                    module: Some(ModuleId {
                        package_id: Some(SelfOrImportedPackageId {
                            sum: Some(package_sum),
                        }),
                        module_name_interned_dname: 0,
                    }),
                    name_interned_dname: name_dname,
                }),
                args: Vec::new(),
            })),
        }
    }

    fn dotted(segments: &[i32]) -> daml_lf::InternedDottedName {
        daml_lf::InternedDottedName {
            segments_interned_str: segments.to_vec(),
        }
    }

    fn external(package_id: &str) -> ExternalPackages {
        let mut packages = BTreeMap::new();
        packages.insert(
            package_id.to_string(),
            ExternalPackage {
                import: "my/imports/a".to_string(),
                alias: "a".to_string(),
            },
        );
        ExternalPackages { packages }
    }

    #[test]
    fn test_builtin_types_map_onto_lattice() {
        let lf = lf_with_strings(&[]);
        let mut dec = V3Decoder::new(Vec::new(), ExternalPackages::default());

        let cases = [
            (BuiltinType::Unit, DamlType::Unit),
            (BuiltinType::Bool, DamlType::Bool),
            (BuiltinType::Int64, DamlType::Int64),
            (BuiltinType::Party, DamlType::Party),
            (BuiltinType::Text, DamlType::Text),
            (BuiltinType::Genmap, DamlType::GenMap),
            (BuiltinType::Textmap, DamlType::TextMap),
            (BuiltinType::Bignumeric, DamlType::BigNumeric),
            (BuiltinType::RoundingMode, DamlType::RoundingMode),
            (BuiltinType::Any, DamlType::Any),
        ];
        for (raw, expected) in cases {
            let got = dec.extract_type(&lf, &builtin(raw, Vec::new())).unwrap();
            assert_eq!(got, expected, "builtin {raw:?}");
        }
    }

    #[test]
    fn test_builtin_optional_and_list_decode_their_argument() {
        let lf = lf_with_strings(&[]);
        let mut dec = V3Decoder::new(Vec::new(), ExternalPackages::default());

        let opt = builtin(
            BuiltinType::Optional,
            vec![builtin(BuiltinType::Int64, Vec::new())],
        );
        assert_eq!(
            dec.extract_type(&lf, &opt).unwrap(),
            DamlType::Optional(Box::new(DamlType::Int64))
        );

        let list = builtin(
            BuiltinType::List,
            vec![builtin(BuiltinType::Text, Vec::new())],
        );
        assert_eq!(
            dec.extract_type(&lf, &list).unwrap(),
            DamlType::List(Box::new(DamlType::Text))
        );
    }

    #[test]
    fn test_tapp_list_and_optional_heads_take_rhs() {
        let lf = lf_with_strings(&[]);
        let mut dec = V3Decoder::new(Vec::new(), ExternalPackages::default());

        let applied = tapp(
            builtin(BuiltinType::List, Vec::new()),
            builtin(BuiltinType::Party, Vec::new()),
        );
        assert_eq!(
            dec.extract_type(&lf, &applied).unwrap(),
            DamlType::List(Box::new(DamlType::Party))
        );

        let applied = tapp(
            builtin(BuiltinType::Optional, Vec::new()),
            builtin(BuiltinType::Date, Vec::new()),
        );
        assert_eq!(
            dec.extract_type(&lf, &applied).unwrap(),
            DamlType::Optional(Box::new(DamlType::Date))
        );
    }

    #[test]
    fn test_contract_id_application_never_registers_an_import() {
        // ContractId External.X: the argument must not be decoded, so the
        // external package stays out of the imports snapshot.
        let hash = "a".repeat(64);
        let mut lf = lf_with_strings(&["unused", hash.as_str(), "X"]);
        lf.interned_dotted_names = vec![dotted(&[2])];

        let mut dec = V3Decoder::new(Vec::new(), external(&hash));
        let applied = tapp(
            builtin(BuiltinType::ContractId, Vec::new()),
            con(
                self_or_imported_package_id::Sum::ImportedPackageIdInternedStr(1),
                0,
            ),
        );
        assert_eq!(dec.extract_type(&lf, &applied).unwrap(), DamlType::ContractId);
        assert!(dec.imported.is_empty());
    }

    #[test]
    fn test_con_self_package_yields_unknown() {
        let mut lf = lf_with_strings(&["unused", "Asset"]);
        lf.interned_dotted_names = vec![dotted(&[1])];

        let mut dec = V3Decoder::new(Vec::new(), ExternalPackages::default());
        let ty = con(
            self_or_imported_package_id::Sum::SelfPackageId(LfUnit {}),
            0,
        );
        assert_eq!(
            dec.extract_type(&lf, &ty).unwrap(),
            DamlType::Unknown("Asset".to_string())
        );
        assert!(dec.imported.is_empty());
    }

    #[test]
    fn test_con_imported_known_package_registers_import() {
        let hash = "b".repeat(64);
        let mut lf = lf_with_strings(&["unused", hash.as_str(), "Price"]);
        lf.interned_dotted_names = vec![dotted(&[2])];

        let mut dec = V3Decoder::new(Vec::new(), external(&hash));
        let ty = con(
            self_or_imported_package_id::Sum::ImportedPackageIdInternedStr(1),
            0,
        );
        let got = dec.extract_type(&lf, &ty).unwrap();
        assert_eq!(got.canonical_name(), "a.Price");
        assert_eq!(dec.imported.len(), 1);
        assert!(dec.imported.contains_key(&hash));
    }

    #[test]
    fn test_con_imported_unknown_package_falls_back_to_unknown() {
        let hash = "c".repeat(64);
        let mut lf = lf_with_strings(&["unused", hash.as_str(), "Price"]);
        lf.interned_dotted_names = vec![dotted(&[2])];

        let mut dec = V3Decoder::new(Vec::new(), ExternalPackages::default());
        let ty = con(
            self_or_imported_package_id::Sum::ImportedPackageIdInternedStr(1),
            0,
        );
        assert_eq!(
            dec.extract_type(&lf, &ty).unwrap(),
            DamlType::Unknown("Price".to_string())
        );
        assert!(dec.imported.is_empty());
    }

    #[test]
    fn test_reltime_stdlib_synonym() {
        let hash = "d".repeat(64);
        let mut lf = lf_with_strings(&["unused", hash.as_str(), "RelTime"]);
        lf.interned_dotted_names = vec![dotted(&[2])];

        let mut dec = V3Decoder::new(Vec::new(), ExternalPackages::default());
        let ty = con(
            self_or_imported_package_id::Sum::ImportedPackageIdInternedStr(1),
            0,
        );
        assert_eq!(dec.extract_type(&lf, &ty).unwrap(), DamlType::RelTime);
    }

    #[test]
    fn test_con_via_package_import_table() {
        let hash = "e".repeat(64);
        let mut lf = lf_with_strings(&["unused", "Quote"]);
        lf.interned_dotted_names = vec![dotted(&[1])];
        lf.package_imports = Some(daml_lf::PackageImports {
            imported_packages: vec![hash.clone()],
        });

        let mut dec = V3Decoder::new(Vec::new(), external(&hash));
        let ty = con(self_or_imported_package_id::Sum::PackageImportId(0), 0);
        assert_eq!(dec.extract_type(&lf, &ty).unwrap().canonical_name(), "a.Quote");
        assert!(dec.imported.contains_key(&hash));
    }

    #[test]
    fn test_type_variables_map_to_any() {
        let lf = lf_with_strings(&[]);
        let mut dec = V3Decoder::new(Vec::new(), ExternalPackages::default());
        let ty = Type {
            sum: Some(TypeSum::Var(daml_lf::TypeVar {
                var_interned_str: 0,
            })),
        };
        assert_eq!(dec.extract_type(&lf, &ty).unwrap(), DamlType::Any);
    }

    #[test]
    fn test_interned_type_reference_is_chased() {
        let mut lf = lf_with_strings(&[]);
        lf.interned_types = vec![builtin(BuiltinType::Timestamp, Vec::new())];

        let mut dec = V3Decoder::new(Vec::new(), ExternalPackages::default());
        let ty = Type {
            sum: Some(TypeSum::InternedType(0)),
        };
        assert_eq!(dec.extract_type(&lf, &ty).unwrap(), DamlType::Timestamp);

        let oob = Type {
            sum: Some(TypeSum::InternedType(7)),
        };
        assert!(matches!(
            dec.extract_type(&lf, &oob),
            Err(ParserError::InternedIndex { kind: "type", .. })
        ));
    }

    #[test]
    fn test_key_walk_collects_projection_then_record() {
        let lf = lf_with_strings(&["", "owner", "operator"]);
        let expr = Expr {
            sum: Some(ExprSum::RecProj(Box::new(ExprRecProj {
                field_interned_str: 1,
                record: Some(Box::new(Expr {
                    sum: Some(ExprSum::VarInternedStr(2)),
                })),
            }))),
        };
        let names = key_field_names(&lf, Some(&expr)).unwrap();
        assert_eq!(names, vec!["owner".to_string(), "operator".to_string()]);
    }

    #[test]
    fn test_key_walk_ignores_builtins_and_zero_indices() {
        let lf = lf_with_strings(&["", "owner"]);
        let expr = Expr {
            sum: Some(ExprSum::Builtin(3)),
        };
        assert!(key_field_names(&lf, Some(&expr)).unwrap().is_empty());

        let zero_var = Expr {
            sum: Some(ExprSum::VarInternedStr(0)),
        };
        assert!(key_field_names(&lf, Some(&zero_var)).unwrap().is_empty());
        assert!(key_field_names(&lf, None).unwrap().is_empty());
    }

    #[test]
    fn test_dotted_name_helpers() {
        let mut lf = lf_with_strings(&["Com", "Acme", "Main"]);
        lf.interned_dotted_names = vec![dotted(&[0, 1, 2])];

        assert_eq!(dotted_name(&lf, 0).unwrap(), "Com.Acme.Main");
        assert_eq!(last_segment(&lf, 0).unwrap(), "Main");
        assert!(matches!(
            dotted_name(&lf, 5),
            Err(ParserError::InternedIndex { .. })
        ));
    }
}
