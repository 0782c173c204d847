//! Schema registry and the work queue that fills it.
//!
//! Generation is breadth-first over schema keys. Every key the mapper
//! references is enqueued the first time it is seen and mapped exactly once,
//! so cyclic type graphs terminate after at most
//! `types × modes × request types` steps.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};

use serde_json::{json, Map, Value};
use tracing::{debug, info, warn};

use crate::config::MappingConfig;
use crate::error::MappingError;
use crate::mapper::SchemaMapper;
use crate::model::{DomainModel, TypeId};
use crate::naming::{canonical_key, canonical_name, referenced_names, ReferenceResolver};
use crate::types::{MappingMode, RequestType, SchemaKey};

/// A key that failed to map while failures were being isolated.
#[derive(Debug, Clone, PartialEq)]
pub struct Failure {
    pub key: SchemaKey,
    pub error: MappingError,
}

/// Generated schemas by canonical name, in first-discovery order.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: Map<String, Value>,
    keys: HashMap<String, SchemaKey>,
    failures: Vec<Failure>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&mut self, name: String, key: SchemaKey, schema: Value) {
        self.keys.insert(name.clone(), key);
        self.schemas.insert(name, schema);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.schemas.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }

    /// The key a schema was generated from.
    pub fn key_of(&self, name: &str) -> Option<&SchemaKey> {
        self.keys.get(name)
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Names in first-discovery order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.schemas.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.schemas.iter().map(|(name, schema)| (name.as_str(), schema))
    }

    /// Schemas ordered by name.
    pub fn sorted(&self) -> BTreeMap<&str, &Value> {
        self.iter().collect()
    }

    pub fn failures(&self) -> &[Failure] {
        &self.failures
    }

    /// Referenced names that have no schema.
    ///
    /// Empty after a run without failures.
    pub fn unresolved_references(&self) -> BTreeSet<String> {
        self.schemas
            .values()
            .flat_map(referenced_names)
            .filter(|name| !self.schemas.contains_key(name))
            .collect()
    }

    /// `{"components": {"schemas": {...}}}` with schemas sorted by name.
    pub fn to_document(&self) -> Value {
        let schemas: Map<String, Value> = self
            .sorted()
            .into_iter()
            .map(|(name, schema)| (name.to_string(), schema.clone()))
            .collect();
        json!({ "components": { "schemas": schemas } })
    }
}

#[derive(Debug, Default)]
struct WorkQueue {
    queued: HashSet<SchemaKey>,
    pending: VecDeque<SchemaKey>,
    names: HashMap<String, SchemaKey>,
}

impl WorkQueue {
    /// Claim `name` for `key` and schedule the key if it is new.
    fn register(&mut self, name: &str, key: SchemaKey) -> Result<(), MappingError> {
        match self.names.get(name) {
            Some(owner) if *owner != key => {
                return Err(MappingError::NameCollision {
                    name: name.to_string(),
                    first: owner.clone(),
                    second: key,
                });
            }
            Some(_) => {}
            None => {
                self.names.insert(name.to_string(), key.clone());
            }
        }
        if self.queued.insert(key.clone()) {
            debug!(schema = name, key = %key, "queued");
            self.pending.push_back(key);
        }
        Ok(())
    }
}

/// The registering resolver: names a key and schedules it.
struct Registrar<'q, 'a> {
    model: &'a DomainModel,
    config: &'a MappingConfig,
    queue: &'q mut WorkQueue,
}

impl ReferenceResolver for Registrar<'_, '_> {
    fn resolve(&mut self, key: &SchemaKey) -> Result<String, MappingError> {
        let key = canonical_key(self.model, key)?;
        let name = canonical_name(self.model, self.config, &key)?;
        self.queue.register(&name, key)?;
        Ok(name)
    }
}

/// Drives the work queue until every reachable key is mapped.
///
/// The generator stays usable after [`run`](Self::run): callers can mint
/// more references and run again to fill them in.
pub struct SchemaGenerator<'a> {
    mapper: SchemaMapper<'a>,
    queue: WorkQueue,
    registry: SchemaRegistry,
}

impl<'a> SchemaGenerator<'a> {
    pub fn new(model: &'a DomainModel, config: &'a MappingConfig) -> Self {
        Self {
            mapper: SchemaMapper::new(model, config),
            queue: WorkQueue::default(),
            registry: SchemaRegistry::new(),
        }
    }

    fn registrar(&mut self) -> Registrar<'_, 'a> {
        Registrar {
            model: self.mapper.model(),
            config: self.mapper.config(),
            queue: &mut self.queue,
        }
    }

    /// Top-level keys for one exposed root.
    pub fn root_keys(&self, id: &TypeId) -> Vec<SchemaKey> {
        let response = |mode| SchemaKey::new(id.clone(), mode, RequestType::Response);
        let mut keys = vec![
            response(MappingMode::Exposed),
            response(MappingMode::Links),
            response(MappingMode::WithLinks),
        ];
        if !self.mapper.model().projections_of(id).is_empty() {
            keys.push(response(MappingMode::WithProjections));
        }
        if self.mapper.config().include_write_schemas {
            for request in [RequestType::Create, RequestType::Update, RequestType::Patch] {
                keys.push(SchemaKey::new(id.clone(), MappingMode::Exposed, request));
            }
        }
        keys
    }

    /// Seed the queue with the top-level keys of every exposed root.
    pub fn seed_roots(&mut self) -> Result<(), MappingError> {
        let model = self.mapper.model();
        for id in model.exposed() {
            for key in self.root_keys(id) {
                if let Err(error) = self.seed(&key) {
                    self.fail(key, error)?;
                }
            }
        }
        Ok(())
    }

    /// Schedule a key and return its name.
    pub fn seed(&mut self, key: &SchemaKey) -> Result<String, MappingError> {
        self.registrar().resolve(key)
    }

    /// Pop and map keys until the queue is empty.
    pub fn run(&mut self) -> Result<(), MappingError> {
        while let Some(key) = self.queue.pending.pop_front() {
            match self.map_key(&key) {
                Ok((name, schema)) => {
                    debug!(schema = %name, key = %key, "mapped");
                    self.registry.insert(name, key, schema);
                }
                Err(error) => self.fail(key, error)?,
            }
        }
        info!(
            schemas = self.registry.len(),
            failures = self.registry.failures.len(),
            "schema generation finished"
        );
        Ok(())
    }

    fn map_key(&mut self, key: &SchemaKey) -> Result<(String, Value), MappingError> {
        let mapper = self.mapper;
        let name = canonical_name(mapper.model(), mapper.config(), key)?;
        let schema = mapper.map_type(key, &mut self.registrar())?;
        Ok((name, schema))
    }

    fn fail(&mut self, key: SchemaKey, error: MappingError) -> Result<(), MappingError> {
        if !self.mapper.config().isolate_failures {
            return Err(error);
        }
        warn!(key = %key, error = %error, "skipping schema");
        self.registry.failures.push(Failure { key, error });
        Ok(())
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// Number of keys still waiting to be mapped.
    pub fn pending(&self) -> usize {
        self.queue.pending.len()
    }

    pub fn finish(self) -> SchemaRegistry {
        self.registry
    }
}

impl ReferenceResolver for SchemaGenerator<'_> {
    fn resolve(&mut self, key: &SchemaKey) -> Result<String, MappingError> {
        self.seed(key)
    }
}

/// Seed every exposed root, run to completion and return the registry.
pub fn generate(model: &DomainModel, config: &MappingConfig) -> Result<SchemaRegistry, MappingError> {
    let mut generator = SchemaGenerator::new(model, config);
    generator.seed_roots()?;
    generator.run()?;
    Ok(generator.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ModelDocument, Nullability, PropertyDescriptor, TypeDescriptor, TypeRef};

    fn tree_model() -> DomainModel {
        DomainModel::new(
            ModelDocument::new()
                .with_type(
                    TypeDescriptor::entity("Node")
                        .property(PropertyDescriptor::new("id", TypeRef::named("uuid")).generated())
                        .property(
                            PropertyDescriptor::new("parent", TypeRef::named("Node"))
                                .nullable(Nullability::Yes),
                        )
                        .property(PropertyDescriptor::new(
                            "children",
                            TypeRef::array(TypeRef::named("Node")),
                        )),
                )
                .expose("Node"),
        )
        .unwrap()
    }

    #[test]
    fn seeds_root_keys() {
        let model = tree_model();
        let config = MappingConfig::default();
        let mut generator = SchemaGenerator::new(&model, &config);
        generator.seed_roots().unwrap();
        assert_eq!(generator.pending(), 6);

        generator.run().unwrap();
        let names: Vec<_> = generator.registry().names().collect();
        assert_eq!(
            names,
            vec![
                "Node",
                "NodeLinks",
                "NodeWithLinks",
                "NewNodeRequest",
                "NodeRequest",
                "NodePatch",
                "Link"
            ]
        );
        assert!(generator.registry().unresolved_references().is_empty());
    }

    #[test]
    fn repeated_references_share_one_entry() {
        let model = tree_model();
        let config = MappingConfig::default().write_schemas(false);
        let mut generator = SchemaGenerator::new(&model, &config);
        let key = SchemaKey::new("Node", MappingMode::Value, RequestType::Response);
        assert_eq!(generator.seed(&key).unwrap(), "NodeData");
        assert_eq!(generator.seed(&key).unwrap(), "NodeData");
        assert_eq!(generator.pending(), 1);
        generator.run().unwrap();
        assert_eq!(generator.registry().len(), 1);
        assert_eq!(generator.registry().key_of("NodeData"), Some(&key));
    }

    #[test]
    fn reference_after_run_is_filled_by_next_run() {
        let model = tree_model();
        let config = MappingConfig::default().write_schemas(false);
        let mut generator = SchemaGenerator::new(&model, &config);
        generator.seed_roots().unwrap();
        generator.run().unwrap();
        assert!(!generator.registry().contains("NodeDataParameter"));

        let reference = generator
            .reference(&SchemaKey::new("Node", MappingMode::Value, RequestType::Parameter))
            .unwrap();
        assert_eq!(reference, json!({ "$ref": "#/components/schemas/NodeDataParameter" }));
        generator.run().unwrap();
        assert!(generator.registry().contains("NodeDataParameter"));
    }

    #[test]
    fn name_collision_is_fatal() {
        let model = DomainModel::new(
            ModelDocument::new()
                .with_type(TypeDescriptor::entity("a.Node"))
                .with_type(TypeDescriptor::entity("b.Node"))
                .expose("a.Node")
                .expose("b.Node"),
        )
        .unwrap();
        let config = MappingConfig::default();
        let err = generate(&model, &config).unwrap_err();
        assert!(matches!(err, MappingError::NameCollision { ref name, .. } if name == "Node"));
    }

    #[test]
    fn isolated_failures_are_recorded() {
        let model = DomainModel::new(
            ModelDocument::new()
                .with_type(TypeDescriptor::entity("Good"))
                .with_type(TypeDescriptor::projection("Shape"))
                .expose("Good")
                .expose("Shape"),
        )
        .unwrap();

        let config = MappingConfig::default();
        assert!(matches!(
            generate(&model, &config),
            Err(MappingError::IncompatibleMode { .. })
        ));

        let config = MappingConfig::default().isolate_failures(true);
        let registry = generate(&model, &config).unwrap();
        assert!(registry.contains("Good"));
        assert!(!registry.failures().is_empty());
        assert!(registry
            .failures()
            .iter()
            .all(|f| f.key.type_id == TypeId::from("Shape")));
    }

    #[test]
    fn document_is_sorted() {
        let model = tree_model();
        let registry = generate(&model, &MappingConfig::default()).unwrap();
        let document = registry.to_document();
        let names: Vec<_> = document["components"]["schemas"]
            .as_object()
            .unwrap()
            .keys()
            .cloned()
            .collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
        assert_eq!(names.len(), registry.len());
    }
}
