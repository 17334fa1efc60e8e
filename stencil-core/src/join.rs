use crate::{
    Configuration, Entity, EntitySchema, Result, RowLabeled, Value, writer::relational_label,
};
use std::{borrow::Cow, sync::Arc};

#[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
pub enum JoinType {
    #[default]
    Default,
    Inner,
    Left,
    Right,
    /// `FULL OUTER JOIN`.
    Outer,
}

pub(crate) type SchemaResolver = fn(&Configuration) -> Result<Arc<EntitySchema>>;

/// Entities joined to the main one, each through a foreign key property of the main
/// entity referencing the first key of the related entity.
///
/// ```rust,ignore
/// let relations = Relations::new().with::<Author>("AuthorId");
/// ```
#[derive(Default, Clone, Debug)]
pub struct Relations {
    related: Vec<(Cow<'static, str>, SchemaResolver)>,
}

impl Relations {
    pub fn new() -> Self {
        Default::default()
    }
    /// Join `E` on the `foreign_key` property of the main entity.
    pub fn with<E: Entity>(mut self, foreign_key: impl Into<Cow<'static, str>>) -> Self {
        self.related
            .push((foreign_key.into(), |config: &Configuration| config.schema::<E>()));
        self
    }
    pub fn len(&self) -> usize {
        self.related.len()
    }
    pub fn is_empty(&self) -> bool {
        self.related.is_empty()
    }
    /// Schemas of the related entities as resolved by `config`, paired with their
    /// foreign key.
    pub fn resolve(
        &self,
        config: &Configuration,
    ) -> Result<Vec<(Cow<'static, str>, Arc<EntitySchema>)>> {
        self.related
            .iter()
            .map(|(fk, resolver)| Ok((fk.clone(), resolver(config)?)))
            .collect()
    }
}

/// Row of a relational select, split back into the entities it joins.
///
/// Position 0 is the main entity, the related entities follow in the order of their
/// [`Relations`].
#[derive(Debug, Clone, PartialEq)]
pub struct JoinedRow {
    row: RowLabeled,
}

impl JoinedRow {
    pub fn new(row: RowLabeled) -> Self {
        Self { row }
    }
    pub fn row(&self) -> &RowLabeled {
        &self.row
    }
    pub fn into_row(self) -> RowLabeled {
        self.row
    }
    /// Columns of the table at `position`, labeled with their own column name.
    pub fn part(&self, position: usize) -> RowLabeled {
        let prefix = relational_label(position, "");
        let (labels, values): (Vec<String>, Vec<Value>) = self
            .row
            .labels
            .iter()
            .zip(self.row.values.iter())
            .filter(|(label, _)| {
                label
                    .get(..prefix.len())
                    .is_some_and(|v| v.eq_ignore_ascii_case(&prefix))
            })
            .map(|(label, value)| (label[prefix.len()..].to_string(), value.clone()))
            .unzip();
        RowLabeled::new(labels.into(), values.into_boxed_slice())
    }
    pub fn main<E: Entity>(&self) -> Result<E> {
        E::from_row(self.part(0))
    }
    /// The `index`-th related entity, `None` when every one of its columns is NULL
    /// (outer join without match).
    pub fn related<E: Entity>(&self, index: usize) -> Result<Option<E>> {
        let part = self.part(index + 1);
        if part.values.iter().all(Value::is_null) {
            return Ok(None);
        }
        E::from_row(part).map(Some)
    }
}
