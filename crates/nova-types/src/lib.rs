//! Java type model shared across Nova crates.
//!
//! Types are plain values ([`Type`]) that refer to class and type-parameter
//! declarations by id. Declarations live in a [`TypeEnv`]; [`TypeStore`] is the
//! in-memory implementation used by the IDE layer and by tests.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

pub mod java;

pub use java::format::{format_type, TypeFormatter};
pub use java::helpers::{
    all_type_vars_resolved, class_and_supertypes, find_field_by_name, find_methods_by_name,
    instantiate_as_supertype, is_denotable, is_valid_type, resolve_class_in_type, type_vars_in,
};
pub use java::subtyping::{is_assignable, is_subtype};

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClassId(u32);

impl ClassId {
    pub(crate) fn from_raw(raw: u32) -> Self {
        ClassId(raw)
    }

    #[must_use]
    pub fn idx(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClassId({})", self.0)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeVarId(u32);

impl TypeVarId {
    pub(crate) fn from_raw(raw: u32) -> Self {
        TypeVarId(raw)
    }

    #[must_use]
    pub fn idx(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for TypeVarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeVarId({})", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PrimitiveType {
    Boolean,
    Byte,
    Short,
    Char,
    Int,
    Long,
    Float,
    Double,
}

impl PrimitiveType {
    pub const ALL: [PrimitiveType; 8] = [
        PrimitiveType::Boolean,
        PrimitiveType::Byte,
        PrimitiveType::Short,
        PrimitiveType::Char,
        PrimitiveType::Int,
        PrimitiveType::Long,
        PrimitiveType::Float,
        PrimitiveType::Double,
    ];

    #[must_use]
    pub fn keyword(self) -> &'static str {
        match self {
            PrimitiveType::Boolean => "boolean",
            PrimitiveType::Byte => "byte",
            PrimitiveType::Short => "short",
            PrimitiveType::Char => "char",
            PrimitiveType::Int => "int",
            PrimitiveType::Long => "long",
            PrimitiveType::Float => "float",
            PrimitiveType::Double => "double",
        }
    }

    /// Identity or widening primitive conversion (JLS 5.1.2).
    #[must_use]
    pub fn widens_to(self, target: PrimitiveType) -> bool {
        use PrimitiveType::*;

        if self == target {
            return true;
        }
        match self {
            Byte => matches!(target, Short | Int | Long | Float | Double),
            Short | Char => matches!(target, Int | Long | Float | Double),
            Int => matches!(target, Long | Float | Double),
            Long => matches!(target, Float | Double),
            Float => matches!(target, Double),
            Double | Boolean => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum WildcardBound {
    Unbounded,
    Extends(Box<Type>),
    Super(Box<Type>),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClassType {
    pub def: ClassId,
    pub args: Vec<Type>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Void,
    /// The type of the `null` literal.
    Null,
    Primitive(PrimitiveType),
    Class(ClassType),
    Array(Box<Type>),
    /// Variadic parameter type (`T...`); equivalent to `T[]` everywhere but in signatures.
    Ellipsis(Box<Type>),
    TypeVar(TypeVarId),
    Wildcard(WildcardBound),
    Intersection(Vec<Type>),
    /// A type the analysis could not determine.
    Unknown,
}

impl Type {
    #[must_use]
    pub fn class(def: ClassId, args: Vec<Type>) -> Self {
        Type::Class(ClassType { def, args })
    }

    #[must_use]
    pub fn array(elem: Type) -> Self {
        Type::Array(Box::new(elem))
    }

    #[must_use]
    pub fn ellipsis(elem: Type) -> Self {
        Type::Ellipsis(Box::new(elem))
    }

    #[must_use]
    pub fn is_primitive(&self) -> bool {
        matches!(self, Type::Primitive(_))
    }

    #[must_use]
    pub fn is_reference(&self) -> bool {
        matches!(
            self,
            Type::Class(_)
                | Type::Array(_)
                | Type::Ellipsis(_)
                | Type::TypeVar(_)
                | Type::Intersection(_)
                | Type::Null
        )
    }

    /// `T...` becomes `T[]`; every other type is returned unchanged.
    #[must_use]
    pub fn to_array_type(&self) -> Type {
        match self {
            Type::Ellipsis(elem) => Type::Array(elem.clone()),
            other => other.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassKind {
    Class,
    Interface,
    /// Anonymous class bodies. They have a binary name but no source name.
    Anonymous,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    pub name: String,
    pub ty: Type,
    pub is_static: bool,
    pub is_final: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDef {
    pub name: String,
    pub type_params: Vec<TypeVarId>,
    pub params: Vec<Type>,
    pub return_type: Type,
    pub is_static: bool,
    pub is_varargs: bool,
    pub is_abstract: bool,
}

impl MethodDef {
    /// An instance method with no type parameters.
    pub fn new(name: impl Into<String>, params: Vec<Type>, return_type: Type) -> Self {
        Self {
            name: name.into(),
            type_params: Vec::new(),
            params,
            return_type,
            is_static: false,
            is_varargs: false,
            is_abstract: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstructorDef {
    pub params: Vec<Type>,
    pub is_varargs: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeParamDef {
    pub name: String,
    pub upper_bounds: Vec<Type>,
    pub lower_bound: Option<Type>,
}

impl TypeParamDef {
    /// Capture variables (JLS 5.1.10) have no source representation.
    #[must_use]
    pub fn is_capture(&self) -> bool {
        self.name.starts_with("CAP#")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDef {
    /// Binary name, e.g. `java.util.Map$Entry`.
    pub name: String,
    pub kind: ClassKind,
    pub type_params: Vec<TypeVarId>,
    pub super_class: Option<Type>,
    pub interfaces: Vec<Type>,
    pub fields: Vec<FieldDef>,
    pub constructors: Vec<ConstructorDef>,
    pub methods: Vec<MethodDef>,
}

impl ClassDef {
    pub fn new(name: impl Into<String>, kind: ClassKind) -> Self {
        Self {
            name: name.into(),
            kind,
            type_params: Vec::new(),
            super_class: None,
            interfaces: Vec::new(),
            fields: Vec::new(),
            constructors: Vec::new(),
            methods: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WellKnownTypes {
    pub object: ClassId,
    pub string: ClassId,
    pub char_sequence: ClassId,
    pub number: ClassId,
    pub comparable: ClassId,
    pub cloneable: ClassId,
    pub serializable: ClassId,
    pub boolean: ClassId,
    pub byte: ClassId,
    pub short: ClassId,
    pub character: ClassId,
    pub integer: ClassId,
    pub long: ClassId,
    pub float: ClassId,
    pub double: ClassId,
}

impl WellKnownTypes {
    #[must_use]
    pub fn boxed(&self, prim: PrimitiveType) -> ClassId {
        match prim {
            PrimitiveType::Boolean => self.boolean,
            PrimitiveType::Byte => self.byte,
            PrimitiveType::Short => self.short,
            PrimitiveType::Char => self.character,
            PrimitiveType::Int => self.integer,
            PrimitiveType::Long => self.long,
            PrimitiveType::Float => self.float,
            PrimitiveType::Double => self.double,
        }
    }

    #[must_use]
    pub fn unboxed(&self, class: ClassId) -> Option<PrimitiveType> {
        PrimitiveType::ALL
            .into_iter()
            .find(|prim| self.boxed(*prim) == class)
    }
}

/// Read access to class and type-parameter declarations.
pub trait TypeEnv {
    fn class(&self, id: ClassId) -> Option<&ClassDef>;
    fn type_param(&self, id: TypeVarId) -> Option<&TypeParamDef>;
    fn lookup_class(&self, name: &str) -> Option<ClassId>;
    fn well_known(&self) -> &WellKnownTypes;
}

/// In-memory [`TypeEnv`].
///
/// Removing a class leaves a tombstone: its id stays allocated but no longer
/// resolves, so previously built [`Type`] values that mention it become invalid
/// instead of silently pointing at a different declaration.
#[derive(Debug, Clone)]
pub struct TypeStore {
    classes: Vec<Option<ClassDef>>,
    class_by_name: HashMap<String, ClassId>,
    type_params: Vec<TypeParamDef>,
    well_known: WellKnownTypes,
}

impl Default for TypeStore {
    fn default() -> Self {
        Self::with_minimal_jdk()
    }
}

impl TypeStore {
    /// A store pre-populated with the handful of `java.lang`/`java.io` types the
    /// conversion rules depend on.
    pub fn with_minimal_jdk() -> Self {
        const NAMES: [(&str, ClassKind); 15] = [
            ("java.lang.Object", ClassKind::Class),
            ("java.lang.String", ClassKind::Class),
            ("java.lang.CharSequence", ClassKind::Interface),
            ("java.lang.Number", ClassKind::Class),
            ("java.lang.Comparable", ClassKind::Interface),
            ("java.lang.Cloneable", ClassKind::Interface),
            ("java.io.Serializable", ClassKind::Interface),
            ("java.lang.Boolean", ClassKind::Class),
            ("java.lang.Byte", ClassKind::Class),
            ("java.lang.Short", ClassKind::Class),
            ("java.lang.Character", ClassKind::Class),
            ("java.lang.Integer", ClassKind::Class),
            ("java.lang.Long", ClassKind::Class),
            ("java.lang.Float", ClassKind::Class),
            ("java.lang.Double", ClassKind::Class),
        ];

        let ids: Vec<ClassId> = (0..NAMES.len() as u32).map(ClassId::from_raw).collect();
        let well_known = WellKnownTypes {
            object: ids[0],
            string: ids[1],
            char_sequence: ids[2],
            number: ids[3],
            comparable: ids[4],
            cloneable: ids[5],
            serializable: ids[6],
            boolean: ids[7],
            byte: ids[8],
            short: ids[9],
            character: ids[10],
            integer: ids[11],
            long: ids[12],
            float: ids[13],
            double: ids[14],
        };

        let mut store = TypeStore {
            classes: Vec::new(),
            class_by_name: HashMap::new(),
            type_params: Vec::new(),
            well_known,
        };
        for (name, kind) in NAMES {
            store.upsert_class(ClassDef::new(name, kind));
        }

        let wk = store.well_known.clone();
        let object = Type::class(wk.object, vec![]);
        let int = Type::Primitive(PrimitiveType::Int);
        let serializable = Type::class(wk.serializable, vec![]);
        let comparable_of = |id: ClassId| Type::class(wk.comparable, vec![Type::class(id, vec![])]);

        let t = store.add_type_param("T", vec![object.clone()]);
        store.upsert_class(ClassDef {
            type_params: vec![t],
            methods: vec![{
                let mut m = MethodDef::new("compareTo", vec![Type::TypeVar(t)], int.clone());
                m.is_abstract = true;
                m
            }],
            ..ClassDef::new("java.lang.Comparable", ClassKind::Interface)
        });

        store.upsert_class(ClassDef {
            methods: vec![
                MethodDef::new("toString", vec![], Type::class(wk.string, vec![])),
                MethodDef::new("hashCode", vec![], int.clone()),
                MethodDef::new(
                    "equals",
                    vec![object.clone()],
                    Type::Primitive(PrimitiveType::Boolean),
                ),
            ],
            ..ClassDef::new("java.lang.Object", ClassKind::Class)
        });

        store.upsert_class(ClassDef {
            methods: vec![
                MethodDef::new("length", vec![], int.clone()),
                MethodDef::new(
                    "charAt",
                    vec![int.clone()],
                    Type::Primitive(PrimitiveType::Char),
                ),
            ],
            ..ClassDef::new("java.lang.CharSequence", ClassKind::Interface)
        });

        store.upsert_class(ClassDef {
            super_class: Some(object.clone()),
            interfaces: vec![
                Type::class(wk.char_sequence, vec![]),
                comparable_of(wk.string),
                serializable.clone(),
            ],
            methods: vec![
                MethodDef::new("length", vec![], int.clone()),
                MethodDef::new("isEmpty", vec![], Type::Primitive(PrimitiveType::Boolean)),
                MethodDef::new(
                    "charAt",
                    vec![int.clone()],
                    Type::Primitive(PrimitiveType::Char),
                ),
            ],
            ..ClassDef::new("java.lang.String", ClassKind::Class)
        });

        store.upsert_class(ClassDef {
            super_class: Some(object.clone()),
            interfaces: vec![serializable.clone()],
            methods: vec![
                MethodDef::new("intValue", vec![], int.clone()),
                MethodDef::new("longValue", vec![], Type::Primitive(PrimitiveType::Long)),
                MethodDef::new("doubleValue", vec![], Type::Primitive(PrimitiveType::Double)),
            ],
            ..ClassDef::new("java.lang.Number", ClassKind::Class)
        });

        for prim in PrimitiveType::ALL {
            let id = wk.boxed(prim);
            let name = store.classes[id.idx()]
                .as_ref()
                .map(|def| def.name.clone())
                .unwrap_or_default();
            let numeric = !matches!(prim, PrimitiveType::Boolean | PrimitiveType::Char);
            let super_class = if numeric {
                Type::class(wk.number, vec![])
            } else {
                object.clone()
            };
            let mut interfaces = vec![comparable_of(id)];
            let mut fields = Vec::new();
            if numeric {
                fields.push(FieldDef {
                    name: "MAX_VALUE".to_string(),
                    ty: Type::Primitive(prim),
                    is_static: true,
                    is_final: true,
                });
            } else {
                interfaces.push(serializable.clone());
            }
            store.upsert_class(ClassDef {
                super_class: Some(super_class),
                interfaces,
                fields,
                ..ClassDef::new(name, ClassKind::Class)
            });
        }

        store
    }

    /// Insert `def`, replacing (and reviving) any class with the same binary name.
    pub fn upsert_class(&mut self, def: ClassDef) -> ClassId {
        if let Some(&id) = self.class_by_name.get(&def.name) {
            self.classes[id.idx()] = Some(def);
            return id;
        }

        let id = ClassId::from_raw(self.classes.len() as u32);
        self.class_by_name.insert(def.name.clone(), id);
        self.classes.push(Some(def));
        id
    }

    /// Remove the class with binary name `name`, leaving a tombstone behind.
    pub fn remove_class(&mut self, name: &str) -> Option<ClassId> {
        let id = *self.class_by_name.get(name)?;
        let slot = self.classes.get_mut(id.idx())?;
        slot.take().map(|_| id)
    }

    pub fn add_type_param(&mut self, name: impl Into<String>, upper_bounds: Vec<Type>) -> TypeVarId {
        let id = TypeVarId::from_raw(self.type_params.len() as u32);
        self.type_params.push(TypeParamDef {
            name: name.into(),
            upper_bounds,
            lower_bound: None,
        });
        id
    }

    /// Allocate a fresh capture variable (`CAP#n`).
    pub fn add_capture_type_param(
        &mut self,
        upper_bounds: Vec<Type>,
        lower_bound: Option<Type>,
    ) -> TypeVarId {
        let captures = self.type_params.iter().filter(|tp| tp.is_capture()).count();
        let id = TypeVarId::from_raw(self.type_params.len() as u32);
        self.type_params.push(TypeParamDef {
            name: format!("CAP#{}", captures + 1),
            upper_bounds,
            lower_bound,
        });
        id
    }

    #[must_use]
    pub fn type_param_count(&self) -> usize {
        self.type_params.len()
    }

    /// Mutable access to a live class definition (e.g. to add members after creation).
    pub fn class_mut(&mut self, id: ClassId) -> Option<&mut ClassDef> {
        self.classes.get_mut(id.idx()).and_then(Option::as_mut)
    }
}

impl TypeEnv for TypeStore {
    fn class(&self, id: ClassId) -> Option<&ClassDef> {
        self.classes.get(id.idx()).and_then(Option::as_ref)
    }

    fn type_param(&self, id: TypeVarId) -> Option<&TypeParamDef> {
        self.type_params.get(id.idx())
    }

    fn lookup_class(&self, name: &str) -> Option<ClassId> {
        let live = |id: &ClassId| self.class(*id).is_some();
        if let Some(id) = self.class_by_name.get(name).filter(|id| live(id)) {
            return Some(*id);
        }
        if name.contains('.') {
            return None;
        }
        // Implicit `java.lang.*`.
        self.class_by_name
            .get(&format!("java.lang.{name}"))
            .copied()
            .filter(live)
    }

    fn well_known(&self) -> &WellKnownTypes {
        &self.well_known
    }
}

/// Replace type variables according to `subst`.
#[must_use]
pub fn substitute(ty: &Type, subst: &HashMap<TypeVarId, Type>) -> Type {
    match ty {
        Type::TypeVar(id) => subst.get(id).cloned().unwrap_or_else(|| ty.clone()),
        Type::Class(ClassType { def, args }) => Type::class(
            *def,
            args.iter().map(|arg| substitute(arg, subst)).collect(),
        ),
        Type::Array(elem) => Type::array(substitute(elem, subst)),
        Type::Ellipsis(elem) => Type::ellipsis(substitute(elem, subst)),
        Type::Wildcard(WildcardBound::Extends(upper)) => {
            Type::Wildcard(WildcardBound::Extends(Box::new(substitute(upper, subst))))
        }
        Type::Wildcard(WildcardBound::Super(lower)) => {
            Type::Wildcard(WildcardBound::Super(Box::new(substitute(lower, subst))))
        }
        Type::Intersection(parts) => {
            Type::Intersection(parts.iter().map(|part| substitute(part, subst)).collect())
        }
        Type::Void
        | Type::Null
        | Type::Primitive(_)
        | Type::Wildcard(WildcardBound::Unbounded)
        | Type::Unknown => ty.clone(),
    }
}
