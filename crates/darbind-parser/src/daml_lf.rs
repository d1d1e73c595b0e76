//! Hand-maintained prost bindings for the DAML-LF archive format.
//!
//! Covers the subset of the `daml_lf_2` schema the decoder consumes: the
//! outer envelope, the interning tables, and the module/data-type/template/
//! interface tree. Fields the generator never reads are omitted; protobuf
//! skips unknown fields, so the subset decodes real payloads.

/// Outer envelope, one per `.dalf` entry.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Archive {
    #[prost(enumeration = "HashFunction", tag = "1")]
    pub hash_function: i32,
    #[prost(bytes = "vec", tag = "2")]
    pub payload: Vec<u8>,
    #[prost(string, tag = "3")]
    pub hash: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum HashFunction {
    Sha256 = 0,
}

/// Version-tagged payload inside [`Archive`].
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ArchivePayload {
    #[prost(string, tag = "1")]
    pub minor: String,
    #[prost(oneof = "archive_payload::Sum", tags = "3, 4")]
    pub sum: Option<archive_payload::Sum>,
}

pub mod archive_payload {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Sum {
        #[prost(bytes, tag = "3")]
        DamlLf1(Vec<u8>),
        #[prost(bytes, tag = "4")]
        DamlLf2(Vec<u8>),
    }
}

/// A `daml_lf_2` package: interning tables plus modules.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Package {
    #[prost(message, repeated, tag = "1")]
    pub modules: Vec<Module>,
    #[prost(string, repeated, tag = "2")]
    pub interned_strings: Vec<String>,
    #[prost(message, repeated, tag = "3")]
    pub interned_dotted_names: Vec<InternedDottedName>,
    #[prost(message, repeated, tag = "4")]
    pub interned_types: Vec<Type>,
    #[prost(message, optional, tag = "5")]
    pub package_imports: Option<PackageImports>,
}

/// A dotted name as a sequence of interned-string indices.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct InternedDottedName {
    #[prost(int32, repeated, tag = "1")]
    pub segments_interned_str: Vec<i32>,
}

/// Package IDs referenced via `package_import_id` indices.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PackageImports {
    #[prost(string, repeated, tag = "1")]
    pub imported_packages: Vec<String>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Module {
    #[prost(int32, tag = "1")]
    pub name_interned_dname: i32,
    #[prost(message, repeated, tag = "2")]
    pub data_types: Vec<DefDataType>,
    #[prost(message, repeated, tag = "3")]
    pub templates: Vec<DefTemplate>,
    #[prost(message, repeated, tag = "4")]
    pub interfaces: Vec<DefInterface>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DefDataType {
    #[prost(int32, tag = "1")]
    pub name_interned_dname: i32,
    #[prost(bool, tag = "2")]
    pub serializable: bool,
    #[prost(oneof = "def_data_type::DataCons", tags = "3, 4, 5, 6")]
    pub data_cons: Option<def_data_type::DataCons>,
}

pub mod def_data_type {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum DataCons {
        #[prost(message, tag = "3")]
        Record(super::Fields),
        #[prost(message, tag = "4")]
        Variant(super::Fields),
        #[prost(message, tag = "5")]
        Enum(super::EnumConstructors),
        #[prost(message, tag = "6")]
        Interface(super::Unit),
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Fields {
    #[prost(message, repeated, tag = "1")]
    pub fields: Vec<FieldWithType>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct EnumConstructors {
    #[prost(int32, repeated, tag = "1")]
    pub constructors_interned_str: Vec<i32>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Unit {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FieldWithType {
    #[prost(int32, tag = "1")]
    pub field_interned_str: i32,
    #[prost(message, optional, tag = "2")]
    pub r#type: Option<Type>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Type {
    #[prost(oneof = "TypeSum", tags = "1, 2, 3, 4, 5, 9")]
    pub sum: Option<TypeSum>,
}

#[derive(Clone, PartialEq, ::prost::Oneof)]
pub enum TypeSum {
    #[prost(message, tag = "1")]
    Var(TypeVar),
    #[prost(message, tag = "2")]
    Con(TypeCon),
    #[prost(message, tag = "3")]
    Builtin(TypeBuiltin),
    #[prost(message, tag = "4")]
    Tapp(TypeApp),
    #[prost(message, tag = "5")]
    Syn(TypeSyn),
    /// Reference into the package's interned-types table.
    #[prost(int32, tag = "9")]
    InternedType(i32),
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TypeVar {
    #[prost(int32, tag = "1")]
    pub var_interned_str: i32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TypeCon {
    #[prost(message, optional, tag = "1")]
    pub tycon: Option<TypeConId>,
    #[prost(message, repeated, tag = "2")]
    pub args: Vec<Type>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TypeBuiltin {
    #[prost(enumeration = "BuiltinType", tag = "1")]
    pub builtin: i32,
    #[prost(message, repeated, tag = "2")]
    pub args: Vec<Type>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TypeApp {
    #[prost(message, optional, boxed, tag = "1")]
    pub lhs: Option<Box<Type>>,
    #[prost(message, optional, boxed, tag = "2")]
    pub rhs: Option<Box<Type>>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TypeSyn {
    #[prost(message, optional, tag = "1")]
    pub tysyn: Option<TypeSynId>,
    #[prost(message, repeated, tag = "2")]
    pub args: Vec<Type>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TypeConId {
    #[prost(message, optional, tag = "1")]
    pub module: Option<ModuleId>,
    #[prost(int32, tag = "2")]
    pub name_interned_dname: i32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TypeSynId {
    #[prost(message, optional, tag = "1")]
    pub module: Option<ModuleId>,
    #[prost(int32, tag = "2")]
    pub name_interned_dname: i32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ModuleId {
    #[prost(message, optional, tag = "1")]
    pub package_id: Option<SelfOrImportedPackageId>,
    #[prost(int32, tag = "2")]
    pub module_name_interned_dname: i32,
}

/// Which package a reference points into: the current one, or an imported
/// one addressed by interned string or by package-import index.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SelfOrImportedPackageId {
    #[prost(oneof = "self_or_imported_package_id::Sum", tags = "1, 2, 3")]
    pub sum: Option<self_or_imported_package_id::Sum>,
}

pub mod self_or_imported_package_id {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Sum {
        #[prost(message, tag = "1")]
        SelfPackageId(super::Unit),
        #[prost(int32, tag = "2")]
        ImportedPackageIdInternedStr(i32),
        #[prost(int32, tag = "3")]
        PackageImportId(i32),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum BuiltinType {
    Unit = 0,
    Bool = 1,
    Int64 = 2,
    Date = 3,
    Timestamp = 4,
    Numeric = 5,
    Party = 6,
    Text = 7,
    ContractId = 8,
    Optional = 9,
    List = 10,
    Textmap = 11,
    Genmap = 12,
    Any = 13,
    TypeRep = 14,
    Bignumeric = 15,
    RoundingMode = 16,
    AnyException = 17,
    Update = 18,
    Arrow = 19,
    FailureCategory = 20,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DefTemplate {
    #[prost(int32, tag = "1")]
    pub tycon_interned_dname: i32,
    #[prost(int32, tag = "2")]
    pub param_interned_str: i32,
    #[prost(message, repeated, tag = "3")]
    pub choices: Vec<TemplateChoice>,
    #[prost(message, optional, tag = "4")]
    pub key: Option<DefKey>,
    #[prost(message, repeated, tag = "5")]
    pub implements: Vec<TemplateImplements>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DefKey {
    #[prost(message, optional, tag = "1")]
    pub r#type: Option<Type>,
    #[prost(message, optional, tag = "2")]
    pub key_expr: Option<Expr>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TemplateImplements {
    #[prost(message, optional, tag = "1")]
    pub interface: Option<TypeConId>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TemplateChoice {
    #[prost(int32, tag = "1")]
    pub name_interned_str: i32,
    #[prost(bool, tag = "2")]
    pub consuming: bool,
    #[prost(message, optional, tag = "3")]
    pub arg_binder: Option<VarWithType>,
    #[prost(message, optional, tag = "4")]
    pub ret_type: Option<Type>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct VarWithType {
    #[prost(int32, tag = "1")]
    pub var_interned_str: i32,
    #[prost(message, optional, tag = "2")]
    pub r#type: Option<Type>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DefInterface {
    #[prost(int32, tag = "1")]
    pub tycon_interned_dname: i32,
    #[prost(message, repeated, tag = "2")]
    pub choices: Vec<TemplateChoice>,
    #[prost(message, optional, tag = "3")]
    pub location: Option<Location>,
    #[prost(message, optional, tag = "4")]
    pub view: Option<Type>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Location {
    #[prost(message, optional, tag = "1")]
    pub module: Option<ModuleId>,
}

/// The slice of the expression language the key-field walk needs.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Expr {
    #[prost(oneof = "ExprSum", tags = "1, 2, 3, 4")]
    pub sum: Option<ExprSum>,
}

#[derive(Clone, PartialEq, ::prost::Oneof)]
pub enum ExprSum {
    #[prost(int32, tag = "1")]
    VarInternedStr(i32),
    #[prost(message, tag = "2")]
    RecCon(ExprRecCon),
    #[prost(message, boxed, tag = "3")]
    RecProj(Box<ExprRecProj>),
    /// Builtin function tag; the key walk does not descend into builtins.
    #[prost(int32, tag = "4")]
    Builtin(i32),
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ExprRecCon {
    #[prost(message, repeated, tag = "1")]
    pub fields: Vec<FieldWithExpr>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ExprRecProj {
    #[prost(int32, tag = "1")]
    pub field_interned_str: i32,
    #[prost(message, optional, boxed, tag = "2")]
    pub record: Option<Box<Expr>>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FieldWithExpr {
    #[prost(int32, tag = "1")]
    pub field_interned_str: i32,
    #[prost(message, optional, tag = "2")]
    pub expr: Option<Expr>,
}
