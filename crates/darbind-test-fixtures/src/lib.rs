//! Test fixtures for the DAR pipeline: build DAML-LF packages, DALF
//! payloads, and whole DAR archives in memory, without storing binary
//! test data in the tree.

use std::collections::HashMap;
use std::io::{Cursor, Write};

use prost::Message;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use darbind_parser::daml_lf::{
    self, archive_payload, def_data_type::DataCons, self_or_imported_package_id, BuiltinType,
    DefDataType, DefInterface, DefKey, DefTemplate, EnumConstructors, Expr, ExprRecProj, ExprSum,
    FieldWithType, Fields, InternedDottedName, Location, Module, ModuleId, PackageImports,
    SelfOrImportedPackageId, TemplateChoice, TemplateImplements, Type, TypeApp, TypeBuiltin,
    TypeCon, TypeConId, TypeSum, TypeVar, VarWithType,
};

/// Which package a type or interface reference points into.
#[derive(Debug, Clone)]
pub enum PkgRef {
    SelfPkg,
    /// Referenced by interned package-ID string.
    Interned(String),
    /// Referenced through the package-imports table.
    ImportIndex(String),
}

/// Incrementally builds a `daml_lf_2` package with proper interning tables.
///
/// `start_module` opens a module; the declaration helpers append to the
/// most recently opened one. `build` closes the builder.
pub struct LfBuilder {
    strings: Vec<String>,
    string_index: HashMap<String, i32>,
    dotted: Vec<Vec<i32>>,
    interned_types: Vec<Type>,
    package_imports: Vec<String>,
    modules: Vec<Module>,
}

impl Default for LfBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl LfBuilder {
    pub fn new() -> Self {
        let mut builder = Self {
            strings: Vec::new(),
            string_index: HashMap::new(),
            dotted: Vec::new(),
            interned_types: Vec::new(),
            package_imports: Vec::new(),
            modules: Vec::new(),
        };
        // Index 0 stays empty so zero-valued proto fields resolve to "unset".
        builder.intern("");
        builder
    }

    pub fn intern(&mut self, s: &str) -> i32 {
        if let Some(&idx) = self.string_index.get(s) {
            return idx;
        }
        let idx = self.strings.len() as i32;
        self.strings.push(s.to_string());
        self.string_index.insert(s.to_string(), idx);
        idx
    }

    pub fn intern_dotted(&mut self, segments: &[&str]) -> i32 {
        let ids: Vec<i32> = segments.iter().map(|s| self.intern(s)).collect();
        if let Some(idx) = self.dotted.iter().position(|d| *d == ids) {
            return idx as i32;
        }
        self.dotted.push(ids);
        (self.dotted.len() - 1) as i32
    }

    /// Register a package in the package-imports table, returning its index.
    pub fn add_package_import(&mut self, package_id: &str) -> i32 {
        self.package_imports.push(package_id.to_string());
        (self.package_imports.len() - 1) as i32
    }

    /// Intern a type node and return a reference to it.
    pub fn intern_type(&mut self, ty: Type) -> Type {
        self.interned_types.push(ty);
        Type {
            sum: Some(TypeSum::InternedType((self.interned_types.len() - 1) as i32)),
        }
    }

    pub fn start_module(&mut self, segments: &[&str]) {
        let name = self.intern_dotted(segments);
        self.modules.push(Module {
            name_interned_dname: name,
            data_types: Vec::new(),
            templates: Vec::new(),
            interfaces: Vec::new(),
        });
    }

    fn current_module(&mut self) -> &mut Module {
        self.modules.last_mut().expect("start_module first")
    }

    fn fields(&mut self, fields: Vec<(&str, Type)>) -> Fields {
        let fields = fields
            .into_iter()
            .map(|(name, ty)| FieldWithType {
                field_interned_str: self.intern(name),
                r#type: Some(ty),
            })
            .collect();
        Fields { fields }
    }

    pub fn record(&mut self, name: &str, fields: Vec<(&str, Type)>) {
        let name_id = self.intern_dotted(&[name]);
        let fields = self.fields(fields);
        self.current_module().data_types.push(DefDataType {
            name_interned_dname: name_id,
            serializable: true,
            data_cons: Some(DataCons::Record(fields)),
        });
    }

    pub fn variant(&mut self, name: &str, constructors: Vec<(&str, Type)>) {
        let name_id = self.intern_dotted(&[name]);
        let fields = self.fields(constructors);
        self.current_module().data_types.push(DefDataType {
            name_interned_dname: name_id,
            serializable: true,
            data_cons: Some(DataCons::Variant(fields)),
        });
    }

    pub fn enumeration(&mut self, name: &str, constructors: &[&str]) {
        let name_id = self.intern_dotted(&[name]);
        let constructors = constructors.iter().map(|c| self.intern(c)).collect();
        self.current_module().data_types.push(DefDataType {
            name_interned_dname: name_id,
            serializable: true,
            data_cons: Some(DataCons::Enum(EnumConstructors {
                constructors_interned_str: constructors,
            })),
        });
    }

    pub fn non_serializable_record(&mut self, name: &str) {
        let name_id = self.intern_dotted(&[name]);
        self.current_module().data_types.push(DefDataType {
            name_interned_dname: name_id,
            serializable: false,
            data_cons: Some(DataCons::Record(Fields { fields: Vec::new() })),
        });
    }

    /// A template plus its backing record data type of the same name.
    pub fn template(&mut self, name: &str, fields: Vec<(&str, Type)>, spec: TemplateSpec) {
        self.record(name, fields);
        let tycon = self.intern_dotted(&[name]);
        let param = self.intern("this");

        let choices = spec
            .choices
            .into_iter()
            .map(|(choice_name, arg)| self.choice(choice_name, arg))
            .collect();

        let key = spec.key_field.map(|field| {
            let field_id = self.intern(field);
            DefKey {
                r#type: Some(builtin(BuiltinType::Party)),
                key_expr: Some(Expr {
                    sum: Some(ExprSum::RecProj(Box::new(ExprRecProj {
                        field_interned_str: field_id,
                        record: None,
                    }))),
                }),
            }
        });

        let implements = spec
            .implements
            .into_iter()
            .map(|(pkg_ref, module_segments, daml_name)| TemplateImplements {
                interface: Some(self.type_con_id(&pkg_ref, &module_segments, &daml_name)),
            })
            .collect();

        self.current_module().templates.push(DefTemplate {
            tycon_interned_dname: tycon,
            param_interned_str: param,
            choices,
            key,
            implements,
        });
    }

    pub fn interface(&mut self, name: &str, location: &[&str], choices: Vec<(&str, Option<Type>)>) {
        let tycon = self.intern_dotted(&[name]);
        let location_module = self.intern_dotted(location);
        let choices = choices
            .into_iter()
            .map(|(choice_name, arg)| self.choice(choice_name, arg))
            .collect();

        self.current_module().interfaces.push(DefInterface {
            tycon_interned_dname: tycon,
            choices,
            location: Some(Location {
                module: Some(ModuleId {
                    package_id: Some(self_package_id()),
                    module_name_interned_dname: location_module,
                }),
            }),
            view: None,
        });
    }

    fn choice(&mut self, name: &str, arg: Option<Type>) -> TemplateChoice {
        let name_id = self.intern(name);
        let arg_binder = arg.map(|ty| VarWithType {
            var_interned_str: self.intern("arg"),
            r#type: Some(ty),
        });
        TemplateChoice {
            name_interned_str: name_id,
            consuming: true,
            arg_binder,
            ret_type: None,
        }
    }

    fn type_con_id(&mut self, pkg_ref: &PkgRef, module_segments: &[&str], name: &str) -> TypeConId {
        let package_id = match pkg_ref {
            PkgRef::SelfPkg => self_package_id(),
            PkgRef::Interned(hash) => SelfOrImportedPackageId {
                sum: Some(
                    self_or_imported_package_id::Sum::ImportedPackageIdInternedStr(
                        self.intern(hash),
                    ),
                ),
            },
            PkgRef::ImportIndex(hash) => {
                let idx = self.add_package_import(hash);
                SelfOrImportedPackageId {
                    sum: Some(self_or_imported_package_id::Sum::PackageImportId(idx)),
                }
            }
        };
        let module = self.intern_dotted(module_segments);
        TypeConId {
            module: Some(ModuleId {
                package_id: Some(package_id),
                module_name_interned_dname: module,
            }),
            name_interned_dname: self.intern_dotted(&[name]),
        }
    }

    /// A constructor type referencing `name` in `module_segments` of the
    /// given package.
    pub fn con(&mut self, pkg_ref: PkgRef, module_segments: &[&str], name: &str) -> Type {
        let tycon = self.type_con_id(&pkg_ref, module_segments, name);
        Type {
            sum: Some(TypeSum::Con(TypeCon {
                tycon: Some(tycon),
                args: Vec::new(),
            })),
        }
    }

    pub fn build(self) -> daml_lf::Package {
        daml_lf::Package {
            modules: self.modules,
            interned_strings: self.strings,
            interned_dotted_names: self
                .dotted
                .into_iter()
                .map(|segments_interned_str| InternedDottedName {
                    segments_interned_str,
                })
                .collect(),
            interned_types: self.interned_types,
            package_imports: if self.package_imports.is_empty() {
                None
            } else {
                Some(PackageImports {
                    imported_packages: self.package_imports,
                })
            },
        }
    }
}

/// Extra template pieces beyond name and fields.
#[derive(Default)]
pub struct TemplateSpec {
    pub choices: Vec<(&'static str, Option<Type>)>,
    pub key_field: Option<&'static str>,
    pub implements: Vec<(PkgRef, Vec<&'static str>, String)>,
}

fn self_package_id() -> SelfOrImportedPackageId {
    SelfOrImportedPackageId {
        sum: Some(self_or_imported_package_id::Sum::SelfPackageId(
            daml_lf::Unit {},
        )),
    }
}

pub fn builtin(kind: BuiltinType) -> Type {
    Type {
        sum: Some(TypeSum::Builtin(TypeBuiltin {
            builtin: kind as i32,
            args: Vec::new(),
        })),
    }
}

pub fn builtin_of(kind: BuiltinType, args: Vec<Type>) -> Type {
    Type {
        sum: Some(TypeSum::Builtin(TypeBuiltin {
            builtin: kind as i32,
            args,
        })),
    }
}

pub fn type_var() -> Type {
    Type {
        sum: Some(TypeSum::Var(TypeVar {
            var_interned_str: 0,
        })),
    }
}

pub fn applied(lhs: Type, rhs: Type) -> Type {
    Type {
        sum: Some(TypeSum::Tapp(TypeApp {
            lhs: Some(Box::new(lhs)),
            rhs: Some(Box::new(rhs)),
        })),
    }
}

/// Wrap a `daml_lf_2` package into DALF bytes: the archive envelope around
/// the version-tagged payload.
pub fn encode_dalf(package: &daml_lf::Package) -> Vec<u8> {
    let payload = daml_lf::ArchivePayload {
        minor: "2".to_string(),
        sum: Some(archive_payload::Sum::DamlLf2(package.encode_to_vec())),
    };
    let archive = daml_lf::Archive {
        hash_function: 0,
        payload: payload.encode_to_vec(),
        hash: String::new(),
    };
    archive.encode_to_vec()
}

/// DALF bytes whose payload carries the wrong version tag.
pub fn encode_legacy_dalf(bytes: &[u8]) -> Vec<u8> {
    let payload = daml_lf::ArchivePayload {
        minor: "17".to_string(),
        sum: Some(archive_payload::Sum::DamlLf1(bytes.to_vec())),
    };
    let archive = daml_lf::Archive {
        hash_function: 0,
        payload: payload.encode_to_vec(),
        hash: String::new(),
    };
    archive.encode_to_vec()
}

/// A manifest in the `META-INF/MANIFEST.MF` key-value format.
pub fn manifest_text(sdk_version: &str, main_dalf: &str, dalfs: &[&str]) -> String {
    format!(
        "Manifest-Version: 1.0\nCreated-By: damlc\nSdk-Version: {sdk_version}\n\
         Main-Dalf: {main_dalf}\nDalfs: {}\nFormat: daml-lf\nEncryption: non-encrypted\n",
        dalfs.join(", ")
    )
}

/// A DAR (ZIP) holding the given entries.
pub fn dar_bytes(entries: &[(&str, Vec<u8>)]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (path, bytes) in entries {
        writer
            .start_file(path.to_string(), SimpleFileOptions::default())
            .expect("start zip entry");
        writer.write_all(bytes).expect("write zip entry");
    }
    writer.finish().expect("finish zip").into_inner()
}

/// A complete DAR: manifest plus encoded DALF packages.
pub fn dar_with_packages(
    sdk_version: &str,
    main_dalf: &str,
    packages: &[(&str, daml_lf::Package)],
) -> Vec<u8> {
    let dalf_paths: Vec<&str> = packages.iter().map(|(path, _)| *path).collect();
    let manifest = manifest_text(sdk_version, main_dalf, &dalf_paths);

    let mut entries: Vec<(&str, Vec<u8>)> = vec![("META-INF/MANIFEST.MF", manifest.into_bytes())];
    for (path, package) in packages {
        entries.push((*path, encode_dalf(package)));
    }
    dar_bytes(&entries)
}
