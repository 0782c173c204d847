//! Domain model: types, properties, inheritance hierarchies and projections.
//!
//! A [`ModelDocument`] is the raw JSON snapshot supplied by a model provider.
//! [`DomainModel`] is the checked, indexed form the generator runs against.

use std::borrow::Borrow;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ModelError;
use crate::standard::ScalarKind;

/// Unique identity of a type within a model.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeId(String);

impl TypeId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The universal hyperlink type.
    pub fn link() -> Self {
        Self(ScalarKind::Link.name().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last `.`-separated segment.
    pub fn simple_name(&self) -> &str {
        self.0.rsplit('.').next().unwrap_or(&self.0)
    }
}

impl From<&str> for TypeId {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<String> for TypeId {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl Borrow<str> for TypeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    #[default]
    Entity,
    ValueObject,
    Enum,
    Standard,
}

/// Declared nullability of a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Nullability {
    Yes,
    No,
    /// Nothing declared; treated as nullable.
    #[default]
    Unknown,
}

impl Nullability {
    /// `Yes` or `Unknown`.
    pub fn allows_null(&self) -> bool {
        !matches!(self, Nullability::No)
    }
}

/// JSON null-inclusion policy of a host type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NullSerialization {
    /// Null fields are always written: every field is present.
    Always,
    /// Null fields are left out: a present field is never null.
    Omitted,
    #[default]
    Unspecified,
}

/// The value type of a property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "TypeRefRepr", into = "TypeRefRepr")]
pub enum TypeRef {
    /// A declared type or a built-in scalar.
    Named(TypeId),
    Array(Box<TypeRef>),
    /// A generic collection. The explicit element hint wins over the generic argument.
    Collection {
        element: Option<Box<TypeRef>>,
        type_argument: Option<Box<TypeRef>>,
    },
    /// String-keyed map; `None` when the value type is unknown.
    Map(Option<Box<TypeRef>>),
    /// Any JSON value.
    Any,
}

impl TypeRef {
    pub fn named(name: impl Into<TypeId>) -> Self {
        TypeRef::Named(name.into())
    }

    pub fn array(item: TypeRef) -> Self {
        TypeRef::Array(Box::new(item))
    }

    /// Collection with a generic argument and no explicit element hint.
    pub fn collection_of(item: TypeRef) -> Self {
        TypeRef::Collection {
            element: None,
            type_argument: Some(Box::new(item)),
        }
    }

    pub fn map_of(values: TypeRef) -> Self {
        TypeRef::Map(Some(Box::new(values)))
    }

    pub fn is_collection(&self) -> bool {
        matches!(self, TypeRef::Array(_) | TypeRef::Collection { .. })
    }

    /// Element type of an array or collection.
    pub fn element_type(&self) -> Option<&TypeRef> {
        match self {
            TypeRef::Array(item) => Some(item),
            TypeRef::Collection {
                element,
                type_argument,
            } => element.as_deref().or(type_argument.as_deref()),
            _ => None,
        }
    }

    /// The named type this reference points at, directly or through collections.
    pub fn target(&self) -> Option<&TypeId> {
        match self {
            TypeRef::Named(id) => Some(id),
            TypeRef::Array(_) | TypeRef::Collection { .. } => {
                self.element_type().and_then(TypeRef::target)
            }
            _ => None,
        }
    }

    /// Every named type mentioned anywhere in this reference.
    pub fn named_types(&self) -> Vec<&TypeId> {
        let mut names = Vec::new();
        self.collect_names(&mut names);
        names
    }

    fn collect_names<'a>(&'a self, names: &mut Vec<&'a TypeId>) {
        match self {
            TypeRef::Named(id) => names.push(id),
            TypeRef::Array(item) => item.collect_names(names),
            TypeRef::Collection {
                element,
                type_argument,
            } => {
                for inner in [element, type_argument].into_iter().flatten() {
                    inner.collect_names(names);
                }
            }
            TypeRef::Map(values) => {
                if let Some(values) = values {
                    values.collect_names(names);
                }
            }
            TypeRef::Any => {}
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Named(id) => write!(f, "{}", id),
            TypeRef::Array(item) => write!(f, "{}[]", item),
            TypeRef::Collection { .. } => match self.element_type() {
                Some(item) => write!(f, "collection<{}>", item),
                None => f.write_str("collection"),
            },
            TypeRef::Map(Some(values)) => write!(f, "map<{}>", values),
            TypeRef::Map(None) => f.write_str("map"),
            TypeRef::Any => f.write_str("any"),
        }
    }
}

// Wire shape: a bare name, or a single-key object naming the container.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum TypeRefRepr {
    Name(String),
    Compound(CompoundRepr),
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
enum CompoundRepr {
    Array(Box<TypeRef>),
    Collection(CollectionRepr),
    Map(MapRepr),
}

#[derive(Serialize, Deserialize)]
struct CollectionRepr {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    of: Option<Box<TypeRef>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    element: Option<Box<TypeRef>>,
}

#[derive(Serialize, Deserialize)]
struct MapRepr {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    values: Option<Box<TypeRef>>,
}

const ANY: &str = "any";

impl From<TypeRefRepr> for TypeRef {
    fn from(repr: TypeRefRepr) -> Self {
        match repr {
            TypeRefRepr::Name(name) if name == ANY => TypeRef::Any,
            TypeRefRepr::Name(name) => TypeRef::Named(TypeId(name)),
            TypeRefRepr::Compound(CompoundRepr::Array(item)) => TypeRef::Array(item),
            TypeRefRepr::Compound(CompoundRepr::Collection(c)) => TypeRef::Collection {
                element: c.element,
                type_argument: c.of,
            },
            TypeRefRepr::Compound(CompoundRepr::Map(m)) => TypeRef::Map(m.values),
        }
    }
}

impl From<TypeRef> for TypeRefRepr {
    fn from(ty: TypeRef) -> Self {
        match ty {
            TypeRef::Named(id) => TypeRefRepr::Name(id.0),
            TypeRef::Any => TypeRefRepr::Name(ANY.to_string()),
            TypeRef::Array(item) => TypeRefRepr::Compound(CompoundRepr::Array(item)),
            TypeRef::Collection {
                element,
                type_argument,
            } => TypeRefRepr::Compound(CompoundRepr::Collection(CollectionRepr {
                of: type_argument,
                element,
            })),
            TypeRef::Map(values) => TypeRefRepr::Compound(CompoundRepr::Map(MapRepr { values })),
        }
    }
}

/// Numeric and length hints copied onto inline field schemas.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Constraints {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
}

impl Constraints {
    pub fn is_empty(&self) -> bool {
        self.minimum.is_none()
            && self.maximum.is_none()
            && self.min_length.is_none()
            && self.max_length.is_none()
    }
}

fn default_true() -> bool {
    true
}

fn is_true(value: &bool) -> bool {
    *value
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// A single property of an entity or value object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub value_type: TypeRef,
    #[serde(default)]
    pub nullable: Nullability,
    /// Assigned by the server (identity, auto timestamp).
    #[serde(default, skip_serializing_if = "is_false")]
    pub generated: bool,
    /// Computed from other state (formula).
    #[serde(default, skip_serializing_if = "is_false")]
    pub derived: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub identifier: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub embedded_identifier: bool,
    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    pub insertable: bool,
    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    pub updatable: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub json_ignored: bool,
    #[serde(flatten)]
    pub constraints: Constraints,
    /// Storage column; derived from `name` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    /// `x-…` metadata copied onto the field schema.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub extensions: Map<String, Value>,
}

impl PropertyDescriptor {
    pub fn new(name: impl Into<String>, value_type: TypeRef) -> Self {
        Self {
            name: name.into(),
            value_type,
            nullable: Nullability::Unknown,
            generated: false,
            derived: false,
            identifier: false,
            embedded_identifier: false,
            insertable: true,
            updatable: true,
            json_ignored: false,
            constraints: Constraints::default(),
            column: None,
            extensions: Map::new(),
        }
    }

    pub fn nullable(mut self, nullable: Nullability) -> Self {
        self.nullable = nullable;
        self
    }

    pub fn not_null(self) -> Self {
        self.nullable(Nullability::No)
    }

    pub fn generated(mut self) -> Self {
        self.generated = true;
        self
    }

    pub fn derived(mut self) -> Self {
        self.derived = true;
        self
    }

    /// Marks the property as the identifier.
    pub fn id(mut self) -> Self {
        self.identifier = true;
        self
    }

    pub fn read_only(mut self) -> Self {
        self.insertable = false;
        self.updatable = false;
        self
    }

    pub fn json_ignored(mut self) -> Self {
        self.json_ignored = true;
        self
    }

    pub fn column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }

    pub fn constraints(mut self, constraints: Constraints) -> Self {
        self.constraints = constraints;
        self
    }

    pub fn extension(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extensions.insert(key.into(), value);
        self
    }

    /// Generated or derived: never client-supplied.
    pub fn is_server_computed(&self) -> bool {
        self.generated || self.derived
    }

    /// Explicit column, else the name with `_` between a lower-case letter
    /// and an upper-case letter that starts a new lower-case word.
    pub fn column_name(&self) -> String {
        if let Some(column) = &self.column {
            return column.clone();
        }
        let chars: Vec<char> = self.name.chars().collect();
        let mut column = String::with_capacity(self.name.len() + 4);
        for (i, c) in chars.iter().enumerate() {
            if i > 0
                && i + 1 < chars.len()
                && chars[i - 1].is_lowercase()
                && c.is_uppercase()
                && chars[i + 1].is_lowercase()
            {
                column.push('_');
            }
            column.push(*c);
        }
        column
    }
}

/// A domain type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDescriptor {
    pub name: TypeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub simple_name: Option<String>,
    #[serde(default)]
    pub kind: TypeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supertype: Option<TypeId>,
    /// Interface-like type; only projections are structural.
    #[serde(default, skip_serializing_if = "is_false")]
    pub structural: bool,
    #[serde(default)]
    pub null_serialization: NullSerialization,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constants: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<PropertyDescriptor>,
    /// Template used by a `standard` type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scalar: Option<ScalarKind>,
}

impl TypeDescriptor {
    fn with_kind(name: impl Into<TypeId>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            simple_name: None,
            kind,
            supertype: None,
            structural: false,
            null_serialization: NullSerialization::Unspecified,
            constants: Vec::new(),
            properties: Vec::new(),
            scalar: None,
        }
    }

    pub fn entity(name: impl Into<TypeId>) -> Self {
        Self::with_kind(name, TypeKind::Entity)
    }

    pub fn value_object(name: impl Into<TypeId>) -> Self {
        Self::with_kind(name, TypeKind::ValueObject)
    }

    pub fn enumeration<I, S>(name: impl Into<TypeId>, constants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut ty = Self::with_kind(name, TypeKind::Enum);
        ty.constants = constants.into_iter().map(Into::into).collect();
        ty
    }

    pub fn standard(name: impl Into<TypeId>, scalar: ScalarKind) -> Self {
        let mut ty = Self::with_kind(name, TypeKind::Standard);
        ty.scalar = Some(scalar);
        ty
    }

    /// A structural (interface-like) type used as a projection.
    pub fn projection(name: impl Into<TypeId>) -> Self {
        let mut ty = Self::with_kind(name, TypeKind::ValueObject);
        ty.structural = true;
        ty
    }

    pub fn property(mut self, property: PropertyDescriptor) -> Self {
        self.properties.push(property);
        self
    }

    pub fn extends(mut self, supertype: impl Into<TypeId>) -> Self {
        self.supertype = Some(supertype.into());
        self
    }

    pub fn null_serialization(mut self, policy: NullSerialization) -> Self {
        self.null_serialization = policy;
        self
    }

    pub fn simple_name(&self) -> &str {
        self.simple_name
            .as_deref()
            .unwrap_or_else(|| self.name.simple_name())
    }

    pub fn is_enum(&self) -> bool {
        self.kind == TypeKind::Enum
    }

    pub fn is_standard(&self) -> bool {
        self.kind == TypeKind::Standard
    }

    pub fn is_link(&self) -> bool {
        self.scalar.map_or(false, |s| s.is_link())
    }
}

/// One member of an inheritance hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InheritanceMember {
    #[serde(rename = "type")]
    pub type_id: TypeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discriminator_value: Option<String>,
}

/// Default discriminator column when a hierarchy names none.
pub const DEFAULT_DISCRIMINATOR_COLUMN: &str = "DTYPE";

/// A hierarchy root and its closure of concrete members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InheritanceTree {
    pub base: TypeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discriminator_column: Option<String>,
    #[serde(default)]
    pub members: Vec<InheritanceMember>,
}

impl InheritanceTree {
    pub fn new(base: impl Into<TypeId>) -> Self {
        Self {
            base: base.into(),
            discriminator_column: None,
            members: Vec::new(),
        }
    }

    pub fn member(mut self, type_id: impl Into<TypeId>, discriminator: Option<&str>) -> Self {
        self.members.push(InheritanceMember {
            type_id: type_id.into(),
            discriminator_value: discriminator.map(str::to_string),
        });
        self
    }

    pub fn discriminator_column(&self) -> &str {
        self.discriminator_column
            .as_deref()
            .unwrap_or(DEFAULT_DISCRIMINATOR_COLUMN)
    }

    /// Members in closure order, base first.
    pub fn closure(&self) -> impl Iterator<Item = &InheritanceMember> {
        self.members.iter()
    }

    fn normalized(mut self) -> Self {
        if !self.members.iter().any(|m| m.type_id == self.base) {
            self.members.insert(
                0,
                InheritanceMember {
                    type_id: self.base.clone(),
                    discriminator_value: None,
                },
            );
        }
        self
    }
}

/// A named projection of one or more entities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectionDescriptor {
    pub name: String,
    /// The structural type describing the projected shape.
    pub projection: TypeId,
    pub targets: Vec<TypeId>,
}

/// Raw model snapshot as supplied by a provider.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelDocument {
    pub types: Vec<TypeDescriptor>,
    pub exposed: Vec<TypeId>,
    pub inheritance: Vec<InheritanceTree>,
    pub projections: Vec<ProjectionDescriptor>,
}

impl ModelDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_type(mut self, ty: TypeDescriptor) -> Self {
        self.types.push(ty);
        self
    }

    pub fn expose(mut self, type_id: impl Into<TypeId>) -> Self {
        self.exposed.push(type_id.into());
        self
    }

    pub fn with_hierarchy(mut self, tree: InheritanceTree) -> Self {
        self.inheritance.push(tree);
        self
    }

    pub fn with_projection(
        mut self,
        name: impl Into<String>,
        projection: impl Into<TypeId>,
        targets: &[&str],
    ) -> Self {
        self.projections.push(ProjectionDescriptor {
            name: name.into(),
            projection: projection.into(),
            targets: targets.iter().map(|t| TypeId::from(*t)).collect(),
        });
        self
    }

    /// All integrity problems, in document order.
    ///
    /// Empty when the document builds into a [`DomainModel`].
    pub fn issues(&self) -> Vec<ModelError> {
        let mut issues = Vec::new();
        let mut declared: HashMap<&str, &TypeDescriptor> = HashMap::new();

        for ty in &self.types {
            if declared.insert(ty.name.as_str(), ty).is_some() {
                issues.push(ModelError::DuplicateType {
                    name: ty.name.to_string(),
                });
            }
        }

        let known = |id: &TypeId| {
            declared.contains_key(id.as_str()) || ScalarKind::from_name(id.as_str()).is_some()
        };
        let unknown = |context: String, id: &TypeId, issues: &mut Vec<ModelError>| {
            if !known(id) {
                issues.push(ModelError::UnknownType {
                    context,
                    name: id.to_string(),
                });
            }
        };

        for ty in &self.types {
            if let Some(supertype) = &ty.supertype {
                unknown(format!("supertype of '{}'", ty.name), supertype, &mut issues);
            }
            for property in &ty.properties {
                for id in property.value_type.named_types() {
                    unknown(
                        format!("property '{}.{}'", ty.name, property.name),
                        id,
                        &mut issues,
                    );
                }
            }
            if ty.is_standard() && ty.scalar.is_none() {
                issues.push(ModelError::MissingScalar {
                    name: ty.name.to_string(),
                });
            }
        }

        for id in &self.exposed {
            unknown("exposed set".to_string(), id, &mut issues);
        }

        for ty in &self.types {
            let mut seen = HashSet::new();
            let mut current = Some(ty);
            while let Some(t) = current {
                if !seen.insert(t.name.as_str()) {
                    issues.push(ModelError::SupertypeCycle {
                        name: ty.name.to_string(),
                    });
                    break;
                }
                current = t
                    .supertype
                    .as_ref()
                    .and_then(|s| declared.get(s.as_str()).copied());
            }
        }

        let mut owner: HashMap<&str, &str> = HashMap::new();
        for tree in &self.inheritance {
            unknown("hierarchy base".to_string(), &tree.base, &mut issues);
            let mut members: Vec<&TypeId> = vec![&tree.base];
            members.extend(
                tree.members
                    .iter()
                    .map(|m| &m.type_id)
                    .filter(|id| **id != tree.base),
            );
            for member in members {
                if let Some(first) = owner.insert(member.as_str(), tree.base.as_str()) {
                    issues.push(ModelError::OverlappingHierarchy {
                        name: member.to_string(),
                        first: first.to_string(),
                        second: tree.base.to_string(),
                    });
                }
                if *member == tree.base {
                    continue;
                }
                unknown(
                    format!("hierarchy '{}'", tree.base),
                    member,
                    &mut issues,
                );
                if declared.contains_key(member.as_str())
                    && !extends(&declared, member, &tree.base)
                {
                    issues.push(ModelError::NotASubtype {
                        member: member.to_string(),
                        base: tree.base.to_string(),
                    });
                }
            }
        }

        for projection in &self.projections {
            unknown(
                format!("projection '{}'", projection.name),
                &projection.projection,
                &mut issues,
            );
            if let Some(ty) = declared.get(projection.projection.as_str()) {
                if !ty.structural {
                    issues.push(ModelError::ProjectionNotStructural {
                        projection: projection.name.clone(),
                    });
                }
            }
            for target in &projection.targets {
                unknown(
                    format!("projection '{}'", projection.name),
                    target,
                    &mut issues,
                );
            }
        }

        issues
    }
}

fn extends(declared: &HashMap<&str, &TypeDescriptor>, member: &TypeId, base: &TypeId) -> bool {
    let mut seen = HashSet::new();
    let mut current = declared.get(member.as_str()).and_then(|t| t.supertype.as_ref());
    while let Some(id) = current {
        if id == base {
            return true;
        }
        if !seen.insert(id.as_str()) {
            return false;
        }
        current = declared.get(id.as_str()).and_then(|t| t.supertype.as_ref());
    }
    false
}

/// A checked, indexed domain model.
///
/// Built-in scalars resolve by name unless the model declares a type of the
/// same name.
#[derive(Debug, Clone)]
pub struct DomainModel {
    types: HashMap<TypeId, TypeDescriptor>,
    order: Vec<TypeId>,
    builtins: HashMap<TypeId, TypeDescriptor>,
    exposed: HashSet<TypeId>,
    exposed_order: Vec<TypeId>,
    hierarchies: Vec<InheritanceTree>,
    hierarchy_of: HashMap<TypeId, usize>,
    projections: BTreeMap<TypeId, Vec<ProjectionDescriptor>>,
}

impl DomainModel {
    /// Check a document and index it. Fails with the first integrity issue.
    pub fn new(document: ModelDocument) -> Result<Self, ModelError> {
        if let Some(issue) = document.issues().into_iter().next() {
            return Err(issue);
        }

        let builtins = ScalarKind::ALL
            .into_iter()
            .map(|kind| {
                let id = TypeId::from(kind.name());
                let mut ty = TypeDescriptor::standard(id.clone(), kind);
                ty.simple_name = Some(kind.simple_name().to_string());
                (id, ty)
            })
            .collect();

        let order: Vec<TypeId> = document.types.iter().map(|t| t.name.clone()).collect();
        let types = document
            .types
            .into_iter()
            .map(|t| (t.name.clone(), t))
            .collect();

        let mut exposed = HashSet::new();
        let mut exposed_order = Vec::new();
        for id in document.exposed {
            if exposed.insert(id.clone()) {
                exposed_order.push(id);
            }
        }

        let hierarchies: Vec<InheritanceTree> = document
            .inheritance
            .into_iter()
            .map(InheritanceTree::normalized)
            .collect();
        let mut hierarchy_of = HashMap::new();
        for (index, tree) in hierarchies.iter().enumerate() {
            for member in tree.closure() {
                hierarchy_of.insert(member.type_id.clone(), index);
            }
        }

        let mut projections: BTreeMap<TypeId, Vec<ProjectionDescriptor>> = BTreeMap::new();
        for projection in document.projections {
            for target in &projection.targets {
                projections
                    .entry(target.clone())
                    .or_default()
                    .push(projection.clone());
            }
        }

        Ok(Self {
            types,
            order,
            builtins,
            exposed,
            exposed_order,
            hierarchies,
            hierarchy_of,
            projections,
        })
    }

    /// Look up a declared type or a built-in scalar.
    pub fn get(&self, id: &TypeId) -> Option<&TypeDescriptor> {
        self.types.get(id).or_else(|| self.builtins.get(id))
    }

    /// Declared types in document order.
    pub fn types(&self) -> impl Iterator<Item = &TypeDescriptor> {
        self.order.iter().filter_map(|id| self.types.get(id))
    }

    /// Roots of the exposed set, in declaration order.
    pub fn exposed(&self) -> impl Iterator<Item = &TypeId> {
        self.exposed_order.iter()
    }

    /// Whether the type or any of its supertypes is exposed.
    pub fn is_exposed(&self, id: &TypeId) -> bool {
        self.supertype_chain(id).any(|t| self.exposed.contains(&t.name))
    }

    /// The type followed by its supertypes, nearest first.
    pub fn supertype_chain<'a>(&'a self, id: &TypeId) -> impl Iterator<Item = &'a TypeDescriptor> {
        let mut current = self.get(id);
        std::iter::from_fn(move || {
            let ty = current?;
            current = ty.supertype.as_ref().and_then(|s| self.get(s));
            Some(ty)
        })
    }

    /// All properties of a type, inherited ones first.
    pub fn properties_of(&self, id: &TypeId) -> Vec<&PropertyDescriptor> {
        let chain: Vec<&TypeDescriptor> = self.supertype_chain(id).collect();
        chain
            .into_iter()
            .rev()
            .flat_map(|t| t.properties.iter())
            .collect()
    }

    /// Properties declared on `id` or on supertypes strictly below `base`.
    pub fn properties_below(&self, id: &TypeId, base: &TypeId) -> Vec<&PropertyDescriptor> {
        let chain: Vec<&TypeDescriptor> = self
            .supertype_chain(id)
            .take_while(|t| t.name != *base)
            .collect();
        chain
            .into_iter()
            .rev()
            .flat_map(|t| t.properties.iter())
            .collect()
    }

    /// The hierarchy a type is a member of.
    pub fn hierarchy_of(&self, id: &TypeId) -> Option<&InheritanceTree> {
        self.hierarchy_of.get(id).map(|&index| &self.hierarchies[index])
    }

    /// The hierarchy rooted at `id`, if `id` is a base.
    pub fn hierarchy_rooted_at(&self, id: &TypeId) -> Option<&InheritanceTree> {
        self.hierarchy_of(id).filter(|tree| tree.base == *id)
    }

    pub fn hierarchies(&self) -> &[InheritanceTree] {
        &self.hierarchies
    }

    /// Projections that target the type.
    pub fn projections_of(&self, id: &TypeId) -> &[ProjectionDescriptor] {
        self.projections.get(id).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl TryFrom<ModelDocument> for DomainModel {
    type Error = ModelError;

    fn try_from(document: ModelDocument) -> Result<Self, Self::Error> {
        DomainModel::new(document)
    }
}
