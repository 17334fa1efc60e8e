use crate::{Result, StencilError, TableRef, Value};
use std::borrow::Cow;

/// How the value of a key property is produced.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyKind {
    /// Plain column, not part of the key.
    #[default]
    NotAKey,
    /// Provided by the caller, a distributed identifier is generated when missing.
    Assigned,
    /// Random UUID generated when missing.
    Guid,
    /// Auto increment column, the value is fetched after the insert.
    Identity,
    /// Value produced by a database trigger and returned through an output parameter.
    TriggerIdentity,
}

impl KeyKind {
    pub fn is_key(&self) -> bool {
        *self != KeyKind::NotAKey
    }
    /// The database produces the value, the column never appears in an INSERT list.
    pub fn is_database_generated(&self) -> bool {
        matches!(self, KeyKind::Identity | KeyKind::TriggerIdentity)
    }
}

/// Mapping of one entity property onto a column.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDescriptor {
    pub name: Cow<'static, str>,
    pub column_name: Cow<'static, str>,
    pub key_kind: KeyKind,
    pub ignored: bool,
    pub read_only: bool,
    /// Type prototype (typed NULL).
    pub value: Value,
}

impl PropertyDescriptor {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        let name = name.into();
        Self {
            column_name: name.clone(),
            name,
            key_kind: KeyKind::NotAKey,
            ignored: false,
            read_only: false,
            value: Value::Null,
        }
    }
    pub fn column(mut self, column_name: impl Into<Cow<'static, str>>) -> Self {
        self.column_name = column_name.into();
        self
    }
    pub fn key(mut self, key_kind: KeyKind) -> Self {
        self.key_kind = key_kind;
        self
    }
    pub fn ignored(mut self, ignored: bool) -> Self {
        self.ignored = ignored;
        self
    }
    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }
    pub fn value(mut self, value: Value) -> Self {
        self.value = value;
        self
    }
    pub fn is_key(&self) -> bool {
        self.key_kind.is_key()
    }
    /// The column name differs from the property name and needs an alias in projections.
    pub fn is_aliased(&self) -> bool {
        self.column_name != self.name
    }
}

/// Mapping metadata of an entity type: target table and ordered properties.
#[derive(Debug, Clone, PartialEq)]
pub struct EntitySchema {
    pub table: TableRef,
    pub properties: Vec<PropertyDescriptor>,
}

impl EntitySchema {
    pub fn new(table_name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            table: TableRef::new(table_name),
            properties: Vec::new(),
        }
    }
    pub fn schema_name(mut self, schema: impl Into<Cow<'static, str>>) -> Self {
        self.table.schema = schema.into();
        self
    }
    pub fn property(mut self, property: PropertyDescriptor) -> Self {
        self.properties.push(property);
        self
    }

    /// Name used in error messages.
    pub fn entity_name(&self) -> String {
        self.table.full_name()
    }

    /// Case insensitive lookup by property name.
    pub fn find_property(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.properties
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }
    pub fn find_property_mut(&mut self, name: &str) -> Option<&mut PropertyDescriptor> {
        self.properties
            .iter_mut()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }
    /// Lookup of a mapped (not ignored) property, failing with
    /// [`StencilError::UnmappedProperty`] naming the table.
    pub fn require_property(&self, name: &str) -> Result<&PropertyDescriptor> {
        self.find_property(name)
            .filter(|p| !p.ignored)
            .ok_or_else(|| StencilError::unmapped(self.entity_name(), name))
    }

    /// Properties that map to a column.
    pub fn mapped(&self) -> impl Iterator<Item = &PropertyDescriptor> + Clone {
        self.properties.iter().filter(|p| !p.ignored)
    }
    /// Key properties in declaration order.
    pub fn keys(&self) -> impl Iterator<Item = &PropertyDescriptor> + Clone {
        self.mapped().filter(|p| p.is_key())
    }
    /// The `Identity` or `TriggerIdentity` property, if any.
    pub fn generated_key(&self) -> Option<&PropertyDescriptor> {
        self.keys().find(|p| p.key_kind.is_database_generated())
    }

    /// Checks the key layout: at most one database generated key.
    pub fn validate(&self) -> Result<()> {
        let generated = self
            .keys()
            .filter(|p| p.key_kind.is_database_generated())
            .count();
        if generated > 1 {
            return Err(StencilError::key_misconfiguration(
                self.entity_name(),
                format!(
                    "{} properties are declared Identity or TriggerIdentity, at most one is allowed",
                    generated
                ),
            ));
        }
        if let Some(p) = self
            .properties
            .iter()
            .find(|p| p.ignored && p.is_key())
        {
            return Err(StencilError::key_misconfiguration(
                self.entity_name(),
                format!("key property `{}` cannot be ignored", p.name),
            ));
        }
        Ok(())
    }
}
