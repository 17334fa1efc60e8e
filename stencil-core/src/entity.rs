use crate::{EntitySchema, Result, RowLabeled, Value};

/// A type persisted through the repository.
///
/// Usually implemented with `#[derive(Entity)]`, which also produces the schema from
/// the `#[stencil(...)]` attributes.
pub trait Entity: Send + Sync + 'static {
    /// Mapping metadata as declared on the type. The configuration caches the result
    /// (possibly rewritten by a mapper or a schema source), callers should go through
    /// `Configuration::schema` instead of calling this directly.
    fn describe() -> EntitySchema
    where
        Self: Sized;

    /// Current value of every mapped property, in declaration order.
    fn values(&self) -> Box<[(&'static str, Value)]>;

    /// Assign a property from a dynamic value (used to write generated keys back).
    fn set_value(&mut self, property: &str, value: Value) -> Result<()>;

    fn from_row(row: RowLabeled) -> Result<Self>
    where
        Self: Sized;

    /// Value of a single property, matched case insensitively.
    fn value_of(&self, property: &str) -> Option<Value> {
        self.values()
            .into_iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(property))
            .map(|(_, value)| value)
    }
}
