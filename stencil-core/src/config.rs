use crate::{
    Entity, EntitySchema, GenericSqlWriter, KeyKind, Result, SnowflakeGenerator, Value,
    new_guid, writer::SqlWriter,
};
use parking_lot::RwLock;
use std::{any::TypeId, collections::HashMap, sync::Arc};
use uuid::Uuid;

/// Rewrites the schema declared by an entity before it gets cached.
pub trait Mapper: Send + Sync {
    fn map(&self, schema: EntitySchema) -> Result<EntitySchema>;
}

/// Uses the declared schema as is.
#[derive(Default, Debug, Clone, Copy)]
pub struct ExplicitMapper;

impl Mapper for ExplicitMapper {
    fn map(&self, schema: EntitySchema) -> Result<EntitySchema> {
        Ok(schema)
    }
}

/// When no key is declared, the property named `id` (any case) becomes the key: an
/// `Identity` for integers, a `Guid` for UUIDs and `Assigned` otherwise.
#[derive(Default, Debug, Clone, Copy)]
pub struct AutoMapper;

impl Mapper for AutoMapper {
    fn map(&self, mut schema: EntitySchema) -> Result<EntitySchema> {
        if schema.keys().next().is_some() {
            return Ok(schema);
        }
        if let Some(property) = schema
            .find_property_mut("id")
            .filter(|p| !p.ignored)
        {
            property.key_kind = match property.value {
                ref v if v.is_integer() => KeyKind::Identity,
                Value::Uuid(..) => KeyKind::Guid,
                _ => KeyKind::Assigned,
            };
            log::trace!(
                "Property `{}` mapped as {:?} key",
                property.name,
                property.key_kind
            );
        }
        Ok(schema)
    }
}

/// Supplementary schemas registered at startup, taking precedence over the mapper.
pub trait SchemaSource: Send + Sync {
    fn schema(&self, entity: TypeId) -> Option<EntitySchema>;
}

/// Explicit schema replacements for individual entity types.
#[derive(Default, Debug, Clone)]
pub struct SchemaOverrides {
    schemas: HashMap<TypeId, EntitySchema>,
}

impl SchemaOverrides {
    pub fn new() -> Self {
        Default::default()
    }
    pub fn with<E: Entity>(mut self, schema: EntitySchema) -> Self {
        self.schemas.insert(TypeId::of::<E>(), schema);
        self
    }
}

impl SchemaSource for SchemaOverrides {
    fn schema(&self, entity: TypeId) -> Option<EntitySchema> {
        self.schemas.get(&entity).cloned()
    }
}

/// Immutable settings shared by every repository operation.
///
/// Entity schemas are resolved lazily and cached for the lifetime of the value.
pub struct Configuration {
    dialect: Arc<dyn SqlWriter>,
    mapper: Arc<dyn Mapper>,
    sources: Vec<Arc<dyn SchemaSource>>,
    id_generator: Arc<SnowflakeGenerator>,
    batch_warning_threshold: usize,
    schemas: RwLock<HashMap<TypeId, Arc<EntitySchema>>>,
}

impl Configuration {
    pub const DEFAULT_BATCH_WARNING_THRESHOLD: usize = 1_000_000;

    pub fn builder() -> ConfigurationBuilder {
        Default::default()
    }

    pub fn dialect(&self) -> &dyn SqlWriter {
        self.dialect.as_ref()
    }
    pub fn id_generator(&self) -> &Arc<SnowflakeGenerator> {
        &self.id_generator
    }
    pub fn batch_warning_threshold(&self) -> usize {
        self.batch_warning_threshold
    }

    /// Schema of `E`: the first schema source providing one, otherwise the declared
    /// schema rewritten by the mapper. Validated once, then cached.
    pub fn schema<E: Entity>(&self) -> Result<Arc<EntitySchema>> {
        let id = TypeId::of::<E>();
        if let Some(schema) = self.schemas.read().get(&id) {
            return Ok(schema.clone());
        }
        let schema = match self.sources.iter().find_map(|s| s.schema(id)) {
            Some(schema) => schema,
            None => self.mapper.map(E::describe())?,
        };
        schema.validate()?;
        Ok(self
            .schemas
            .write()
            .entry(id)
            .or_insert_with(|| Arc::new(schema))
            .clone())
    }

    /// Forget every cached schema.
    pub fn clear_cache(&self) {
        self.schemas.write().clear();
    }

    pub fn next_id(&self) -> Result<String> {
        self.id_generator.next_id_string()
    }

    pub fn new_guid(&self) -> Uuid {
        new_guid()
    }
}

impl Default for Configuration {
    fn default() -> Self {
        ConfigurationBuilder::default().build()
    }
}

pub struct ConfigurationBuilder {
    dialect: Arc<dyn SqlWriter>,
    mapper: Arc<dyn Mapper>,
    sources: Vec<Arc<dyn SchemaSource>>,
    id_generator: Option<Arc<SnowflakeGenerator>>,
    batch_warning_threshold: usize,
}

impl Default for ConfigurationBuilder {
    fn default() -> Self {
        Self {
            dialect: Arc::new(GenericSqlWriter::new()),
            mapper: Arc::new(AutoMapper),
            sources: Vec::new(),
            id_generator: None,
            batch_warning_threshold: Configuration::DEFAULT_BATCH_WARNING_THRESHOLD,
        }
    }
}

impl ConfigurationBuilder {
    pub fn dialect(mut self, dialect: impl SqlWriter + 'static) -> Self {
        self.dialect = Arc::new(dialect);
        self
    }
    pub fn mapper(mut self, mapper: impl Mapper + 'static) -> Self {
        self.mapper = Arc::new(mapper);
        self
    }
    pub fn source(mut self, source: impl SchemaSource + 'static) -> Self {
        self.sources.push(Arc::new(source));
        self
    }
    /// Defaults to the process wide [`SnowflakeGenerator::shared`].
    pub fn id_generator(mut self, generator: Arc<SnowflakeGenerator>) -> Self {
        self.id_generator = Some(generator);
        self
    }
    /// Size in characters above which a batch statement is logged as a warning.
    pub fn batch_warning_threshold(mut self, threshold: usize) -> Self {
        self.batch_warning_threshold = threshold;
        self
    }
    pub fn build(self) -> Configuration {
        Configuration {
            dialect: self.dialect,
            mapper: self.mapper,
            sources: self.sources,
            id_generator: self
                .id_generator
                .unwrap_or_else(SnowflakeGenerator::shared),
            batch_warning_threshold: self.batch_warning_threshold,
            schemas: Default::default(),
        }
    }
}
