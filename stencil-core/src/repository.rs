use crate::{
    AsValue, Configuration, Entity, EntitySchema, Executor, JoinType, JoinedRow, KeyKind, KeyValue,
    MultipleQuery, MultipleResultReader, Predicate, PropertyDescriptor, Query, QueryResult,
    Relations, Result, RowLabeled, RowsAffected, Sort, StencilError, Value, is_unset_assigned,
    is_unset_guid, new_guid,
    stream::{Stream, StreamExt, TryStreamExt},
    writer::{Aggregate, ID_OUT_PARAM, SqlWriter, value_for},
};
use anyhow::Context;
use futures::{FutureExt, TryFutureExt};
use log::Level;
use std::{pin::pin, sync::Arc};

/// One page of a paged select with the total number of rows matching the predicate.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<E> {
    pub items: Vec<E>,
    pub total: u64,
}

/// Entity operations over any [`Executor`], generating SQL with the configured dialect.
#[derive(Clone)]
pub struct Repository {
    config: Arc<Configuration>,
}

impl Repository {
    pub fn new(config: Arc<Configuration>) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Arc<Configuration> {
        &self.config
    }

    fn dialect(&self) -> &dyn SqlWriter {
        self.config.dialect()
    }

    /// Entity with the given key, `None` when no row matches.
    pub async fn get<E: Entity, Exec: Executor>(
        &self,
        executor: &mut Exec,
        id: impl Into<KeyValue>,
    ) -> Result<Option<E>> {
        let schema = self.config.schema::<E>()?;
        let predicate = Predicate::by_id(&id.into(), &schema)?;
        let mut query = Query::default();
        self.dialect().write_select(
            &mut query.sql,
            &mut query.params,
            &schema,
            None,
            Some(&predicate),
            &[],
        )?;
        pin!(decode(executor, Ok(query))).try_next().await
    }

    /// Every entity matching `predicate`, in `sort` order.
    pub fn get_list<'e, E: Entity, Exec: Executor>(
        &self,
        executor: &'e mut Exec,
        predicate: Option<&Predicate>,
        sort: &[Sort],
    ) -> impl Stream<Item = Result<E>> + Send + use<'e, E, Exec> {
        self.get_list_columns(executor, &[], predicate, sort)
    }

    /// Same as [`Repository::get_list`] reading only `columns`. Properties left out
    /// keep their default value when the entity supports it.
    pub fn get_list_columns<'e, E: Entity, Exec: Executor>(
        &self,
        executor: &'e mut Exec,
        columns: &[&str],
        predicate: Option<&Predicate>,
        sort: &[Sort],
    ) -> impl Stream<Item = Result<E>> + Send + use<'e, E, Exec> {
        let query = self.config.schema::<E>().and_then(|schema| {
            let mut query = Query::default();
            self.dialect().write_select(
                &mut query.sql,
                &mut query.params,
                &schema,
                Some(columns),
                predicate,
                sort,
            )?;
            Ok(query)
        });
        decode(executor, query)
    }

    /// The 1-based `page` of `page_size` entities with the total number of matches.
    pub async fn get_page<E: Entity, Exec: Executor>(
        &self,
        executor: &mut Exec,
        predicate: Option<&Predicate>,
        sort: &[Sort],
        page: u64,
        page_size: u64,
    ) -> Result<Page<E>> {
        let schema = self.config.schema::<E>()?;
        let dialect = self.dialect();
        let mut query = Query::default();
        dialect.write_select_paged(
            &mut query.sql,
            &mut query.params,
            &schema,
            predicate,
            sort,
            page,
            page_size,
        )?;
        if dialect.supports_multiple_statements() {
            let mut sets = split_result_sets(run(executor, query).await?).into_iter();
            let items = sets
                .next()
                .unwrap_or_default()
                .into_iter()
                .map(E::from_row)
                .collect::<Result<Vec<_>>>()?;
            let total = sets
                .next()
                .and_then(|rows| rows.into_iter().next())
                .and_then(RowLabeled::into_first)
                .map(count_from_value)
                .transpose()?
                .ok_or_else(|| {
                    StencilError::invalid_state("the paged query did not return the total count")
                })?;
            return Ok(Page { items, total });
        }
        let items = decode(executor, Ok(query)).try_collect::<Vec<E>>().await?;
        let mut count = Query::default();
        dialect.write_count(&mut count.sql, &mut count.params, &schema, predicate)?;
        let total = scalar(executor, count)
            .await?
            .map(count_from_value)
            .transpose()?
            .ok_or_else(|| {
                StencilError::invalid_state("the count query of the page returned no row")
            })?;
        Ok(Page { items, total })
    }

    /// At most `max_results` entities starting from the zero based `first_result`.
    pub fn get_set<'e, E: Entity, Exec: Executor>(
        &self,
        executor: &'e mut Exec,
        predicate: Option<&Predicate>,
        sort: &[Sort],
        first_result: u64,
        max_results: u64,
    ) -> impl Stream<Item = Result<E>> + Send + use<'e, E, Exec> {
        let query = self.config.schema::<E>().and_then(|schema| {
            let mut query = Query::default();
            self.dialect().write_select_set(
                &mut query.sql,
                &mut query.params,
                &schema,
                predicate,
                sort,
                first_result,
                max_results,
            )?;
            Ok(query)
        });
        decode(executor, query)
    }

    pub async fn count<E: Entity, Exec: Executor>(
        &self,
        executor: &mut Exec,
        predicate: Option<&Predicate>,
    ) -> Result<u64> {
        let schema = self.config.schema::<E>()?;
        let mut query = Query::default();
        self.dialect()
            .write_count(&mut query.sql, &mut query.params, &schema, predicate)?;
        scalar(executor, query)
            .await?
            .map(count_from_value)
            .transpose()?
            .ok_or_else(|| StencilError::invalid_state("the count query returned no row"))
    }

    pub async fn max<E: Entity, Exec: Executor>(
        &self,
        executor: &mut Exec,
        property: &str,
        predicate: Option<&Predicate>,
    ) -> Result<Value> {
        self.aggregate::<E, _>(executor, Aggregate::Max, property, predicate)
            .await
    }

    pub async fn min<E: Entity, Exec: Executor>(
        &self,
        executor: &mut Exec,
        property: &str,
        predicate: Option<&Predicate>,
    ) -> Result<Value> {
        self.aggregate::<E, _>(executor, Aggregate::Min, property, predicate)
            .await
    }

    pub async fn sum<E: Entity, Exec: Executor>(
        &self,
        executor: &mut Exec,
        property: &str,
        predicate: Option<&Predicate>,
    ) -> Result<Value> {
        self.aggregate::<E, _>(executor, Aggregate::Sum, property, predicate)
            .await
    }

    pub async fn avg<E: Entity, Exec: Executor>(
        &self,
        executor: &mut Exec,
        property: &str,
        predicate: Option<&Predicate>,
    ) -> Result<Value> {
        self.aggregate::<E, _>(executor, Aggregate::Avg, property, predicate)
            .await
    }

    async fn aggregate<E: Entity, Exec: Executor>(
        &self,
        executor: &mut Exec,
        aggregate: Aggregate,
        property: &str,
        predicate: Option<&Predicate>,
    ) -> Result<Value> {
        let schema = self.config.schema::<E>()?;
        let mut query = Query::default();
        self.dialect().write_aggregate(
            &mut query.sql,
            &mut query.params,
            &schema,
            aggregate,
            Some(property),
            predicate,
        )?;
        Ok(scalar(executor, query).await?.unwrap_or_default())
    }

    /// Insert `entity`, filling in generated keys, and return its key.
    pub async fn insert<E: Entity, Exec: Executor>(
        &self,
        executor: &mut Exec,
        entity: &mut E,
    ) -> Result<KeyValue> {
        let schema = self.config.schema::<E>()?;
        let generated = self.assign_keys(&schema, entity)?;
        let dialect = self.dialect();
        let mut query = Query::default();
        dialect.write_insert(&mut query.sql, &mut query.params, &schema, &entity.values())?;
        match generated.map(|p| (p, p.key_kind)) {
            Some((property, KeyKind::Identity)) => {
                let mut identity = String::new();
                dialect.write_identity(&mut identity, &schema)?;
                let value = if dialect.supports_multiple_statements() {
                    query.sql.push_str(dialect.batch_separator());
                    query.sql.push('\n');
                    query.sql.push_str(&identity);
                    run(executor, query)
                        .await?
                        .into_iter()
                        .find_map(|v| match v {
                            QueryResult::Row(row) => Some(row),
                            _ => None,
                        })
                        .and_then(RowLabeled::into_first)
                } else {
                    execute(executor, query).await?;
                    scalar(executor, Query::from(identity)).await?
                };
                let Some(value) = value else {
                    return Err(StencilError::invalid_state(format!(
                        "the identity of `{}` could not be retrieved after the insert",
                        schema.entity_name()
                    )));
                };
                entity.set_value(&property.name, value)?;
            }
            Some((property, KeyKind::TriggerIdentity)) => {
                let value = run(executor, query)
                    .await?
                    .into_iter()
                    .find_map(|v| match v {
                        QueryResult::Output(name, value) if name == ID_OUT_PARAM => Some(value),
                        _ => None,
                    });
                let Some(value) = value else {
                    return Err(StencilError::invalid_state(format!(
                        "the output parameter {} of `{}` was not returned",
                        ID_OUT_PARAM,
                        schema.entity_name()
                    )));
                };
                entity.set_value(&property.name, value)?;
            }
            Some((_, KeyKind::NotAKey | KeyKind::Assigned | KeyKind::Guid)) | None => {
                execute(executor, query).await?;
            }
        }
        Ok(KeyValue::of(entity, &schema))
    }

    /// Insert every entity with one statement, `upsert` updates the rows whose key
    /// already exists. Client side keys are generated and written back first.
    pub async fn insert_many<E: Entity, Exec: Executor>(
        &self,
        executor: &mut Exec,
        entities: &mut [E],
        upsert: bool,
    ) -> Result<RowsAffected> {
        if entities.is_empty() {
            return Ok(Default::default());
        }
        let schema = self.config.schema::<E>()?;
        let rows = entities
            .iter_mut()
            .map(|entity| {
                self.assign_keys(&schema, entity)?;
                Ok(entity.values())
            })
            .collect::<Result<Vec<_>>>()?;
        let mut query = Query::default();
        self.dialect()
            .write_insert_many(&mut query.sql, &mut query.params, &schema, &rows, upsert)?;
        if query.sql.len() > self.config.batch_warning_threshold() {
            log::warn!(
                "Batch insert of {} rows into {} produced {} characters of SQL, above the threshold of {}",
                rows.len(),
                schema.entity_name(),
                query.sql.len(),
                self.config.batch_warning_threshold()
            );
        }
        execute(executor, query).await
    }

    /// Update the row with the key of `entity`, returns whether a row changed.
    pub async fn update<E: Entity, Exec: Executor>(
        &self,
        executor: &mut Exec,
        entity: &E,
        ignore_all_keys: bool,
    ) -> Result<bool> {
        let schema = self.config.schema::<E>()?;
        let predicate = Predicate::by_key(entity, &schema)?;
        self.update_matching(executor, &schema, entity, &predicate, ignore_all_keys)
            .await
            .map(|v| v > 0)
    }

    /// Write the values of `entity` into every row matching `predicate`.
    pub async fn update_where<E: Entity, Exec: Executor>(
        &self,
        executor: &mut Exec,
        entity: &E,
        predicate: &Predicate,
        ignore_all_keys: bool,
    ) -> Result<u64> {
        let schema = self.config.schema::<E>()?;
        self.update_matching(executor, &schema, entity, predicate, ignore_all_keys)
            .await
    }

    async fn update_matching<E: Entity, Exec: Executor>(
        &self,
        executor: &mut Exec,
        schema: &EntitySchema,
        entity: &E,
        predicate: &Predicate,
        ignore_all_keys: bool,
    ) -> Result<u64> {
        let mut query = Query::default();
        self.dialect().write_update(
            &mut query.sql,
            &mut query.params,
            schema,
            &entity.values(),
            Some(predicate),
            ignore_all_keys,
        )?;
        Ok(execute(executor, query).await?.rows_affected)
    }

    /// Delete the row with the key of `entity`, returns whether a row was removed.
    pub async fn delete<E: Entity, Exec: Executor>(
        &self,
        executor: &mut Exec,
        entity: &E,
    ) -> Result<bool> {
        let schema = self.config.schema::<E>()?;
        let predicate = Predicate::by_key(entity, &schema)?;
        let rows_affected = self.delete_matching(executor, &schema, &predicate).await?;
        if rows_affected != 1 {
            log::log!(
                if rows_affected == 0 {
                    Level::Info
                } else {
                    Level::Error
                },
                "The query deleted {} rows of {} instead of the expected 1",
                rows_affected,
                schema.entity_name()
            );
        }
        Ok(rows_affected > 0)
    }

    pub async fn delete_where<E: Entity, Exec: Executor>(
        &self,
        executor: &mut Exec,
        predicate: &Predicate,
    ) -> Result<u64> {
        let schema = self.config.schema::<E>()?;
        self.delete_matching(executor, &schema, predicate).await
    }

    async fn delete_matching<Exec: Executor>(
        &self,
        executor: &mut Exec,
        schema: &EntitySchema,
        predicate: &Predicate,
    ) -> Result<u64> {
        let mut query = Query::default();
        self.dialect()
            .write_delete(&mut query.sql, &mut query.params, schema, Some(predicate))?;
        Ok(execute(executor, query).await?.rows_affected)
    }

    /// Rows of `E` joined with `relations`, left undecoded since they span several
    /// entities.
    pub fn select_join<'e, E: Entity, Exec: Executor>(
        &self,
        executor: &'e mut Exec,
        relations: &Relations,
        join: JoinType,
        predicate: Option<&Predicate>,
        sort: &[Sort],
    ) -> impl Stream<Item = Result<RowLabeled>> + Send + use<'e, E, Exec> {
        let query = self.join_query::<E>(relations, join, predicate, sort, false);
        fetch(executor, query)
    }

    /// Rows of `E` joined with `relations`, every table projected under its own labels
    /// so that [`JoinedRow`] decodes each entity separately.
    pub fn select_relational<'e, E: Entity, Exec: Executor>(
        &self,
        executor: &'e mut Exec,
        relations: &Relations,
        join: JoinType,
        predicate: Option<&Predicate>,
        sort: &[Sort],
    ) -> impl Stream<Item = Result<JoinedRow>> + Send + use<'e, E, Exec> {
        let query = self.join_query::<E>(relations, join, predicate, sort, true);
        fetch(executor, query).map_ok(JoinedRow::new)
    }

    /// `E` joined with `R` through the `foreign_key` property of `E`. The related
    /// entity is `None` where an outer join found no match.
    pub fn select_join_as<'e, E: Entity, R: Entity, Exec: Executor>(
        &self,
        executor: &'e mut Exec,
        foreign_key: &str,
        join: JoinType,
        predicate: Option<&Predicate>,
        sort: &[Sort],
    ) -> impl Stream<Item = Result<(E, Option<R>)>> + Send + use<'e, E, R, Exec> {
        let relations = Relations::new().with::<R>(foreign_key.to_owned());
        self.select_relational::<E, _>(executor, &relations, join, predicate, sort)
            .and_then(|row| async move { Ok((row.main::<E>()?, row.related::<R>(0)?)) })
    }

    fn join_query<E: Entity>(
        &self,
        relations: &Relations,
        join: JoinType,
        predicate: Option<&Predicate>,
        sort: &[Sort],
        relational: bool,
    ) -> Result<Query> {
        let schema = self.config.schema::<E>()?;
        let related = relations.resolve(&self.config)?;
        let related = related
            .iter()
            .map(|(fk, schema)| (fk.as_ref(), schema.as_ref()))
            .collect::<Vec<_>>();
        let mut query = Query::default();
        let dialect = self.dialect();
        if relational {
            dialect.write_select_relational(
                &mut query.sql,
                &mut query.params,
                &schema,
                &related,
                join,
                predicate,
                sort,
            )?;
        } else {
            dialect.write_select_join(
                &mut query.sql,
                &mut query.params,
                &schema,
                &related,
                join,
                predicate,
                sort,
            )?;
        }
        Ok(query)
    }

    /// Run every select of `query`, in one round trip when the dialect allows it.
    pub async fn get_multiple<Exec: Executor>(
        &self,
        executor: &mut Exec,
        query: &MultipleQuery,
    ) -> Result<MultipleResultReader> {
        let dialect = self.dialect();
        let selects = query
            .items
            .iter()
            .map(|item| Ok(((item.schema)(self.config.as_ref())?, item)))
            .collect::<Result<Vec<_>>>()?
            .into_iter();
        let sets = if dialect.supports_multiple_statements() {
            let mut batch = Query::default();
            for (i, (schema, item)) in selects.enumerate() {
                if i > 0 {
                    batch.sql.push_str(dialect.batch_separator());
                }
                dialect.write_select(
                    &mut batch.sql,
                    &mut batch.params,
                    &schema,
                    None,
                    item.predicate.as_ref(),
                    &item.sort,
                )?;
            }
            if batch.sql.is_empty() {
                Vec::new()
            } else {
                split_result_sets(run(executor, batch).await?)
            }
        } else {
            let mut sets = Vec::with_capacity(query.len());
            for (schema, item) in selects {
                let mut select = Query::default();
                dialect.write_select(
                    &mut select.sql,
                    &mut select.params,
                    &schema,
                    None,
                    item.predicate.as_ref(),
                    &item.sort,
                )?;
                log_query(&select);
                sets.push(executor.fetch(select).try_collect::<Vec<_>>().await?);
            }
            sets
        };
        MultipleResultReader::new(query, sets)
    }

    /// New distributed identifier as decimal text.
    pub fn next_id(&self) -> Result<String> {
        self.config.next_id()
    }

    /// Fill in the client generated keys of `entity` and return the key the database
    /// will produce, if any.
    fn assign_keys<'s, E: Entity>(
        &self,
        schema: &'s EntitySchema,
        entity: &mut E,
    ) -> Result<Option<&'s PropertyDescriptor>> {
        let values = entity.values();
        let mut generated = None;
        for property in schema.keys() {
            let current = value_for(&values, property);
            match property.key_kind {
                KeyKind::Guid if is_unset_guid(&current) => {
                    let guid = new_guid();
                    let value = match property.value {
                        Value::Varchar(..) => Value::Varchar(Some(guid.hyphenated().to_string())),
                        _ => guid.as_value(),
                    };
                    entity.set_value(&property.name, value)?;
                }
                KeyKind::Assigned if is_unset_assigned(&current) => {
                    let id = self.config.id_generator().next_id()?;
                    let value = if property.value.is_integer() {
                        id.as_value()
                    } else {
                        id.to_string().as_value()
                    };
                    entity.set_value(&property.name, value)?;
                }
                KeyKind::Identity | KeyKind::TriggerIdentity => generated = Some(property),
                KeyKind::Guid | KeyKind::Assigned | KeyKind::NotAKey => {}
            }
        }
        Ok(generated)
    }
}

fn log_query(query: &Query) {
    log::debug!("Executing: {}", query);
}

/// Rows of `query`, a failed `query` surfaces as the only item.
fn fetch<'e, Exec: Executor>(
    executor: &'e mut Exec,
    query: Result<Query>,
) -> impl Stream<Item = Result<RowLabeled>> + Send + 'e {
    async move {
        let query = query?;
        log_query(&query);
        Ok(executor.fetch(query))
    }
    .try_flatten_stream()
}

/// Rows of `query` decoded as `E`.
fn decode<'e, E: Entity, Exec: Executor>(
    executor: &'e mut Exec,
    query: Result<Query>,
) -> impl Stream<Item = Result<E>> + Send + 'e {
    fetch(executor, query).map(|row| row.and_then(E::from_row))
}

async fn run<Exec: Executor>(executor: &mut Exec, query: Query) -> Result<Vec<QueryResult>> {
    log_query(&query);
    executor.collect(query).await
}

async fn execute<Exec: Executor>(executor: &mut Exec, query: Query) -> Result<RowsAffected> {
    log_query(&query);
    executor.execute(query).await
}

/// First column of the first row.
async fn scalar<Exec: Executor>(executor: &mut Exec, query: Query) -> Result<Option<Value>> {
    log_query(&query);
    let stream = executor.fetch(query);
    pin!(stream)
        .try_next()
        .map(|row| row.map(|row| row.and_then(RowLabeled::into_first)))
        .await
}

/// Rows grouped by statement, each statement closes its set with `Affected`.
fn split_result_sets(results: Vec<QueryResult>) -> Vec<Vec<RowLabeled>> {
    let mut sets = Vec::new();
    let mut current = Vec::new();
    for result in results {
        match result {
            QueryResult::Row(row) => current.push(row),
            QueryResult::Affected(..) => sets.push(std::mem::take(&mut current)),
            QueryResult::Output(..) => {}
        }
    }
    if !current.is_empty() {
        sets.push(current);
    }
    sets
}

fn count_from_value(value: Value) -> Result<u64> {
    if value.is_null() {
        return Ok(0);
    }
    u64::try_from_value(value).context("Could not read the row count")
}
