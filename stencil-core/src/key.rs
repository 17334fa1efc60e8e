use crate::{AsValue, Entity, EntitySchema, Value};

/// Key of an entity after an insert, or the identifier used to look one up.
#[derive(Debug, Clone, PartialEq)]
pub enum KeyValue {
    /// The entity has exactly one key property.
    Scalar(Value),
    /// One value per key property, in schema order. Empty when the entity has no key.
    Composite(Vec<(String, Value)>),
}

impl KeyValue {
    pub fn scalar(value: impl AsValue) -> Self {
        KeyValue::Scalar(value.as_value())
    }
    pub fn composite<N: Into<String>, V: Into<Value>>(
        values: impl IntoIterator<Item = (N, V)>,
    ) -> Self {
        KeyValue::Composite(
            values
                .into_iter()
                .map(|(n, v)| (n.into(), v.into()))
                .collect(),
        )
    }

    /// Read the key of `entity` as described by `schema`.
    pub fn of<E: Entity>(entity: &E, schema: &EntitySchema) -> Self {
        let values = entity.values();
        let keys = schema
            .keys()
            .map(|p| {
                let value = values
                    .iter()
                    .find(|(name, _)| p.name.eq_ignore_ascii_case(name))
                    .map(|(_, v)| v.clone())
                    .unwrap_or_else(|| p.value.clone());
                (p.name.to_string(), value)
            })
            .collect::<Vec<_>>();
        match <[_; 1]>::try_from(keys) {
            Ok([(_, value)]) => KeyValue::Scalar(value),
            Err(keys) => KeyValue::Composite(keys),
        }
    }

    /// The scalar value, or the single element of a composite key.
    pub fn as_scalar(&self) -> Option<&Value> {
        match self {
            KeyValue::Scalar(v) => Some(v),
            KeyValue::Composite(v) if v.len() == 1 => v.first().map(|(_, v)| v),
            KeyValue::Composite(..) => None,
        }
    }

    pub fn get(&self, property: &str) -> Option<&Value> {
        match self {
            KeyValue::Scalar(..) => None,
            KeyValue::Composite(v) => v
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(property))
                .map(|(_, v)| v),
        }
    }
}

impl From<Value> for KeyValue {
    fn from(value: Value) -> Self {
        KeyValue::Scalar(value)
    }
}
