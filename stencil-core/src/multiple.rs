use crate::{Configuration, Entity, Predicate, Result, RowLabeled, Sort, StencilError, join::SchemaResolver};
use std::{
    any::{TypeId, type_name},
    collections::VecDeque,
};

pub(crate) struct MultipleItem {
    pub(crate) entity: TypeId,
    pub(crate) entity_name: &'static str,
    pub(crate) schema: SchemaResolver,
    pub(crate) predicate: Option<Predicate>,
    pub(crate) sort: Vec<Sort>,
}

/// Several selects, possibly over different entities, executed together.
#[derive(Default)]
pub struct MultipleQuery {
    pub(crate) items: Vec<MultipleItem>,
}

impl MultipleQuery {
    pub fn new() -> Self {
        Default::default()
    }
    /// Append a select of `E`. Results are read back in the same order.
    pub fn add<E: Entity>(mut self, predicate: Option<Predicate>, sort: Vec<Sort>) -> Self {
        self.items.push(MultipleItem {
            entity: TypeId::of::<E>(),
            entity_name: type_name::<E>(),
            schema: |config: &Configuration| config.schema::<E>(),
            predicate,
            sort,
        });
        self
    }
    pub fn len(&self) -> usize {
        self.items.len()
    }
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

struct ResultSet {
    entity: TypeId,
    entity_name: &'static str,
    rows: Vec<RowLabeled>,
}

/// Result sets of a [`MultipleQuery`], consumed in declaration order.
pub struct MultipleResultReader {
    sets: VecDeque<ResultSet>,
}

impl MultipleResultReader {
    pub(crate) fn new(query: &MultipleQuery, mut rows: Vec<Vec<RowLabeled>>) -> Result<Self> {
        if rows.len() < query.items.len() {
            return Err(StencilError::invalid_state(format!(
                "expected {} result sets, the query produced {}",
                query.items.len(),
                rows.len()
            )));
        }
        rows.truncate(query.items.len());
        Ok(Self {
            sets: query
                .items
                .iter()
                .zip(rows)
                .map(|(item, rows)| ResultSet {
                    entity: item.entity,
                    entity_name: item.entity_name,
                    rows,
                })
                .collect(),
        })
    }

    /// Number of result sets not yet read.
    pub fn remaining(&self) -> usize {
        self.sets.len()
    }

    /// Next result set, decoded lazily as `E`. Fails without consuming anything when
    /// the set belongs to another entity, or when every set was already read.
    pub fn read<E: Entity>(&mut self) -> Result<impl Iterator<Item = Result<E>> + use<E>> {
        let Some(set) = self.sets.front() else {
            return Err(StencilError::invalid_state(format!(
                "no result set left to read as {}",
                type_name::<E>()
            )));
        };
        if set.entity != TypeId::of::<E>() {
            return Err(StencilError::invalid_state(format!(
                "the next result set holds {}, it cannot be read as {}",
                set.entity_name,
                type_name::<E>()
            )));
        }
        let rows = self.sets.pop_front().map(|v| v.rows).unwrap_or_default();
        Ok(rows.into_iter().map(E::from_row))
    }
}
