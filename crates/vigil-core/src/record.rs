//! # Record Declarations & Directives
//!
//! A [`Record`] declares its validated fields once, with a directive string
//! per field. The declaration is compiled into rules the first time a type
//! is validated and cached per [`TypeId`] for the life of the process.
//!
//! ```
//! use serde::Serialize;
//! use vigil_core::{FieldSet, Record};
//!
//! #[derive(Serialize)]
//! struct Signup {
//!     email: String,
//!     age: u32,
//!     nickname: Option<String>,
//! }
//!
//! impl Record for Signup {
//!     fn describe(fields: &mut FieldSet) {
//!         fields
//!             .field::<String>("email", "required,email")
//!             .field::<u32>("age", "required,min=18,max=130")
//!             .field::<Option<String>>("nickname", "min=2,max=20");
//!     }
//! }
//! ```
//!
//! ## Directive Language
//!
//! Comma-separated tokens, trimmed; empty tokens are ignored.
//!
//! | Token | String field | Numeric field |
//! |---|---|---|
//! | `required` | [`Required`] | [`Required`] |
//! | `min=N` | [`MinLength`] | [`MinValue`] |
//! | `max=N` | [`MaxLength`] | [`MaxValue`] |
//! | `email` | [`Email`] | not applicable |
//! | `pattern=RE` | [`Pattern`] | not applicable |
//!
//! `pattern=` takes the rest of its token, so a pattern cannot contain a
//! comma. A token that is unknown, malformed or not applicable to the
//! field's kind compiles into a [`Misconfigured`] rule that always fails.
//!
//! Field values are read by serializing the record with `serde_json`, so
//! field names are the serialized names (after any `#[serde(rename)]`).
//! Fields the record does not declare are never validated.

use std::any::TypeId;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use serde::Serialize;

use crate::error::DirectiveError;
use crate::rules::{
    Email, MaxLength, MaxValue, MinLength, MinValue, Misconfigured, Pattern, Required, SharedRule,
};

/// Broad kind of a declared field, used to pick type-aware rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    String,
    Integer,
    Float,
    Bool,
    Collection,
    Other,
}

impl FieldKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::String => "string",
            FieldKind::Integer => "integer",
            FieldKind::Float => "float",
            FieldKind::Bool => "bool",
            FieldKind::Collection => "collection",
            FieldKind::Other => "other",
        }
    }

    fn is_numeric(&self) -> bool {
        matches!(self, FieldKind::Integer | FieldKind::Float)
    }
}

/// Maps a Rust field type to its [`FieldKind`].
pub trait FieldType {
    const KIND: FieldKind;
    /// Whether the type can be absent (`Option<T>`).
    const NULLABLE: bool = false;
}

macro_rules! field_kind {
    ($kind:expr => $($t:ty),*) => {
        $(impl FieldType for $t { const KIND: FieldKind = $kind; })*
    };
}

field_kind!(FieldKind::String => String, str, char, uuid::Uuid, chrono::NaiveDate, chrono::NaiveDateTime, chrono::NaiveTime);
field_kind!(FieldKind::Integer => i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);
field_kind!(FieldKind::Float => f32, f64);
field_kind!(FieldKind::Bool => bool);
field_kind!(FieldKind::Other => serde_json::Value);

impl<Tz: chrono::TimeZone> FieldType for chrono::DateTime<Tz> {
    const KIND: FieldKind = FieldKind::String;
}

impl<T: FieldType + ?Sized> FieldType for &T {
    const KIND: FieldKind = T::KIND;
    const NULLABLE: bool = T::NULLABLE;
}

impl<T: FieldType + ?Sized> FieldType for Box<T> {
    const KIND: FieldKind = T::KIND;
    const NULLABLE: bool = T::NULLABLE;
}

impl<T: FieldType> FieldType for Option<T> {
    const KIND: FieldKind = T::KIND;
    const NULLABLE: bool = true;
}

impl<T> FieldType for Vec<T> {
    const KIND: FieldKind = FieldKind::Collection;
}

impl<T> FieldType for [T] {
    const KIND: FieldKind = FieldKind::Collection;
}

impl<T> FieldType for VecDeque<T> {
    const KIND: FieldKind = FieldKind::Collection;
}

impl<T, S> FieldType for HashSet<T, S> {
    const KIND: FieldKind = FieldKind::Collection;
}

impl<T> FieldType for BTreeSet<T> {
    const KIND: FieldKind = FieldKind::Collection;
}

impl<K, V, S> FieldType for HashMap<K, V, S> {
    const KIND: FieldKind = FieldKind::Collection;
}

impl<K, V> FieldType for BTreeMap<K, V> {
    const KIND: FieldKind = FieldKind::Collection;
}

/// One declared field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    name: String,
    kind: FieldKind,
    nullable: bool,
    directives: String,
}

impl FieldSpec {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn nullable(&self) -> bool {
        self.nullable
    }

    pub fn directives(&self) -> &str {
        &self.directives
    }
}

/// Field declarations collected by [`Record::describe`].
#[derive(Debug, Clone, Default)]
pub struct FieldSet {
    fields: Vec<FieldSpec>,
}

impl FieldSet {
    /// Declare a field, inferring its kind from `T`.
    pub fn field<T: FieldType + ?Sized>(&mut self, name: &str, directives: &str) -> &mut Self {
        self.fields.push(FieldSpec {
            name: name.to_string(),
            kind: T::KIND,
            nullable: T::NULLABLE,
            directives: directives.to_string(),
        });
        self
    }

    /// Declare a field with an explicit kind.
    pub fn field_of_kind(&mut self, name: &str, kind: FieldKind, directives: &str) -> &mut Self {
        self.fields.push(FieldSpec {
            name: name.to_string(),
            kind,
            nullable: false,
            directives: directives.to_string(),
        });
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A type whose fields carry validation directives.
pub trait Record: Serialize + 'static {
    /// Declare the validated fields, in validation order.
    fn describe(fields: &mut FieldSet);
}

// ---------------------------------------------------------------------------
// Directive parsing
// ---------------------------------------------------------------------------

/// A parsed directive token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    Required,
    Min(i64),
    Max(i64),
    Email,
    Pattern(String),
}

impl Directive {
    /// Parse one trimmed, non-empty token.
    pub fn parse(token: &str) -> Result<Self, DirectiveError> {
        let (name, arg) = match token.split_once('=') {
            Some((name, arg)) => (name.trim(), Some(arg.trim())),
            None => (token.trim(), None),
        };
        match (name, arg) {
            ("required", None) => Ok(Directive::Required),
            ("email", None) => Ok(Directive::Email),
            ("min", Some(arg)) => parse_bound(name, arg).map(Directive::Min),
            ("max", Some(arg)) => parse_bound(name, arg).map(Directive::Max),
            ("pattern", Some(arg)) if !arg.is_empty() => Ok(Directive::Pattern(arg.to_string())),
            ("min" | "max" | "pattern", _) => Err(DirectiveError::MissingArgument(name.to_string())),
            ("required" | "email", Some(arg)) => Err(DirectiveError::InvalidArgument {
                name: name.to_string(),
                value: arg.to_string(),
            }),
            _ => Err(DirectiveError::Unknown(token.to_string())),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Directive::Required => "required",
            Directive::Min(_) => "min",
            Directive::Max(_) => "max",
            Directive::Email => "email",
            Directive::Pattern(_) => "pattern",
        }
    }
}

fn parse_bound(name: &str, arg: &str) -> Result<i64, DirectiveError> {
    arg.parse::<i64>().map_err(|_| DirectiveError::InvalidArgument {
        name: name.to_string(),
        value: arg.to_string(),
    })
}

/// Split and parse a directive string. Empty tokens are skipped.
pub fn parse_directives(directives: &str) -> Vec<Result<Directive, DirectiveError>> {
    directives
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(Directive::parse)
        .collect()
}

/// Turn a directive into the rule for a field of `kind`.
fn directive_rule(directive: &Directive, kind: FieldKind) -> Result<SharedRule, DirectiveError> {
    let not_applicable = || DirectiveError::NotApplicable {
        directive: directive.name().to_string(),
        kind: kind.as_str(),
    };
    let length = |n: i64| {
        usize::try_from(n).map_err(|_| DirectiveError::InvalidArgument {
            name: directive.name().to_string(),
            value: n.to_string(),
        })
    };
    let rule: SharedRule = match (directive, kind) {
        (Directive::Required, _) => Arc::new(Required),
        (Directive::Min(n), FieldKind::String) => Arc::new(MinLength(length(*n)?)),
        (Directive::Max(n), FieldKind::String) => Arc::new(MaxLength(length(*n)?)),
        (Directive::Min(n), k) if k.is_numeric() => Arc::new(MinValue::new(*n)),
        (Directive::Max(n), k) if k.is_numeric() => Arc::new(MaxValue::new(*n)),
        (Directive::Email, FieldKind::String | FieldKind::Other) => Arc::new(Email),
        (Directive::Pattern(p), FieldKind::String | FieldKind::Other) => Arc::new(Pattern::new(p)),
        _ => return Err(not_applicable()),
    };
    Ok(rule)
}

// ---------------------------------------------------------------------------
// Compiled schemas
// ---------------------------------------------------------------------------

/// A declared field with its directive rules resolved.
#[derive(Debug)]
pub(crate) struct CompiledField {
    pub(crate) name: String,
    pub(crate) required: bool,
    pub(crate) rules: Vec<SharedRule>,
}

/// All declared fields of one record type.
#[derive(Debug)]
pub(crate) struct CompiledRecord {
    pub(crate) type_name: &'static str,
    pub(crate) fields: Vec<CompiledField>,
}

impl CompiledRecord {
    pub(crate) fn declares(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f.name == field)
    }
}

fn compile_field(type_name: &str, spec: &FieldSpec) -> CompiledField {
    let mut required = false;
    let mut rules = Vec::new();
    for parsed in parse_directives(&spec.directives) {
        let rule = parsed.and_then(|directive| {
            required |= directive == Directive::Required;
            directive_rule(&directive, spec.kind)
        });
        match rule {
            Ok(rule) => rules.push(rule),
            Err(e) => {
                tracing::warn!(
                    record = type_name,
                    field = %spec.name,
                    error = %e,
                    "invalid validation directive; field will always fail"
                );
                rules.push(Arc::new(Misconfigured::new(e.to_string())) as SharedRule);
            }
        }
    }
    CompiledField {
        name: spec.name.clone(),
        required,
        rules,
    }
}

fn compile<R: Record>() -> CompiledRecord {
    let type_name = std::any::type_name::<R>();
    let mut fields = FieldSet::default();
    R::describe(&mut fields);
    tracing::debug!(record = type_name, fields = fields.len(), "compiled record schema");
    CompiledRecord {
        type_name,
        fields: fields.iter().map(|spec| compile_field(type_name, spec)).collect(),
    }
}

static SCHEMAS: Lazy<RwLock<HashMap<TypeId, Arc<CompiledRecord>>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// The cached compiled schema for `R`, compiling it on first use.
pub(crate) fn compiled<R: Record>() -> Arc<CompiledRecord> {
    let id = TypeId::of::<R>();
    if let Some(schema) = SCHEMAS.read().get(&id) {
        return Arc::clone(schema);
    }
    let schema = Arc::new(compile::<R>());
    Arc::clone(SCHEMAS.write().entry(id).or_insert(schema))
}

/// The declared fields of `R`, in declaration order.
pub fn declared_fields<R: Record>() -> Vec<FieldSpec> {
    let mut fields = FieldSet::default();
    R::describe(&mut fields);
    fields.fields
}
