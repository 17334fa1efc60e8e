use crate::{
    BoolOp, EntitySchema, FieldPredicate, JoinType, Operator, Order, ParameterBag, Predicate,
    PredicateGroup, PropertyDescriptor, Result, Sort, StencilError, TableRef, Value,
    separated_by, try_separated_by,
    writer::{Context, Fragment},
};

/// Name of the output parameter receiving trigger generated keys.
pub const ID_OUT_PARAM: &str = "IdOutParam";

/// Aggregate functions supported by [`SqlWriter::write_aggregate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregate {
    Count,
    Max,
    Min,
    Sum,
    Avg,
}

impl Aggregate {
    pub fn function(&self) -> &'static str {
        match self {
            Aggregate::Count => "COUNT",
            Aggregate::Max => "MAX",
            Aggregate::Min => "MIN",
            Aggregate::Sum => "SUM",
            Aggregate::Avg => "AVG",
        }
    }
    /// Label of the single result column.
    pub fn alias(&self) -> &'static str {
        match self {
            Aggregate::Count => "TOTAL",
            Aggregate::Max => "MAXVAL",
            Aggregate::Min => "MINVAL",
            Aggregate::Sum => "SUMVAL",
            Aggregate::Avg => "AVGVAL",
        }
    }
}

/// Dialect printer converting entity operations into concrete SQL strings.
///
/// Every statement writer is a provided method built on the dialect primitives at the
/// top of the trait, so a dialect usually overrides a handful of them: quoting,
/// parameter prefix, paging, identity retrieval, upsert. Writers are pure: they append
/// to `out`, bind values into `params` and never touch the database.
pub trait SqlWriter: Send + Sync {
    /// Opening and closing identifier quotes, `None` writes identifiers verbatim.
    fn quote_chars(&self) -> Option<(char, char)> {
        Some(('"', '"'))
    }

    /// Character introducing a named parameter.
    fn parameter_prefix(&self) -> char {
        '@'
    }

    /// Separator between statements of a batch.
    fn batch_separator(&self) -> &str {
        ";"
    }

    /// Whether several statements can be sent in one round trip.
    fn supports_multiple_statements(&self) -> bool {
        true
    }

    /// Whether the current fragment context allows alias declaration.
    fn alias_declaration(&self, context: &Context) -> bool {
        matches!(context.fragment, Fragment::SqlSelectFrom | Fragment::SqlJoin)
    }

    /// Quote identifiers doubling inner closing quotes.
    fn write_identifier_quoted(&self, _context: &Context, out: &mut String, value: &str) {
        let Some((open, close)) = self.quote_chars() else {
            out.push_str(value);
            return;
        };
        out.push(open);
        for c in value.chars() {
            if c == close {
                out.push(close);
            }
            out.push(c);
        }
        out.push(close);
    }

    /// Render a table reference with optional alias.
    fn write_table_ref(&self, context: &Context, out: &mut String, value: &TableRef) {
        if self.alias_declaration(context) || value.alias.is_empty() {
            if !value.schema.is_empty() {
                self.write_identifier_quoted(context, out, &value.schema);
                out.push('.');
            }
            self.write_identifier_quoted(context, out, &value.name);
        }
        if !value.alias.is_empty() {
            if self.alias_declaration(context) {
                out.push(' ');
            }
            self.write_identifier_quoted(context, out, &value.alias);
        }
    }

    /// Render a column optionally qualified with its table.
    fn write_column_ref(
        &self,
        context: &Context,
        out: &mut String,
        table: &TableRef,
        property: &PropertyDescriptor,
    ) {
        if context.qualify_columns {
            self.write_table_ref(&context.switch_fragment(Fragment::None), out, table);
            out.push('.');
        }
        self.write_identifier_quoted(context, out, &property.column_name);
    }

    /// Render a parameter reference.
    fn write_parameter_name(&self, _context: &Context, out: &mut String, name: &str) {
        out.push(self.parameter_prefix());
        out.push_str(name);
    }

    /// Bind `value` under a position suffixed name and reference it.
    fn write_parameter(
        &self,
        context: &Context,
        out: &mut String,
        params: &mut ParameterBag,
        property: &str,
        value: Value,
    ) -> Result<()> {
        let name = params.add_positional(property, value)?;
        self.write_parameter_name(context, out, &name);
        Ok(())
    }

    fn operator_symbol(&self, operator: Operator) -> &'static str {
        match operator {
            Operator::Eq => "=",
            Operator::Ne => "<>",
            Operator::Gt => ">",
            Operator::Ge => ">=",
            Operator::Lt => "<",
            Operator::Le => "<=",
            Operator::Like => "LIKE",
            Operator::In => "IN",
            Operator::Between => "BETWEEN",
            Operator::IsNull => "IS NULL",
        }
    }

    /// Lower a predicate tree.
    fn write_predicate(
        &self,
        context: &Context,
        out: &mut String,
        params: &mut ParameterBag,
        schema: &EntitySchema,
        predicate: &Predicate,
    ) -> Result<()> {
        match predicate {
            Predicate::Field(v) => self.write_predicate_field(context, out, params, schema, v),
            Predicate::Group(v) => self.write_predicate_group(context, out, params, schema, v),
        }
    }

    /// `(a AND b)`. A group of one renders as its child, an empty group as a constant.
    fn write_predicate_group(
        &self,
        context: &Context,
        out: &mut String,
        params: &mut ParameterBag,
        schema: &EntitySchema,
        group: &PredicateGroup,
    ) -> Result<()> {
        match group.predicates.as_slice() {
            [] => out.push_str(match group.operator {
                BoolOp::And => "(1=1)",
                BoolOp::Or => "(1=0)",
            }),
            [single] => self.write_predicate(context, out, params, schema, single)?,
            predicates => {
                out.push('(');
                try_separated_by(
                    out,
                    predicates,
                    |out, v| self.write_predicate(context, out, params, schema, v),
                    match group.operator {
                        BoolOp::And => " AND ",
                        BoolOp::Or => " OR ",
                    },
                )?;
                out.push(')');
            }
        }
        Ok(())
    }

    fn write_predicate_field(
        &self,
        context: &Context,
        out: &mut String,
        params: &mut ParameterBag,
        schema: &EntitySchema,
        field: &FieldPredicate,
    ) -> Result<()> {
        let property = schema.require_property(&field.property)?;
        let inverse = field.operator.inverse();
        let operator = match (field.negate, inverse) {
            (true, Some(inverse)) => inverse,
            _ => field.operator,
        };
        // Operators without inverse are wrapped, IS NULL has its own negated form
        let wrap = field.negate && inverse.is_none() && field.operator != Operator::IsNull;
        let elements = match operator {
            Operator::In | Operator::Between => {
                Some(field.value.as_list().ok_or_else(|| {
                    StencilError::missing_input(format!(
                        "the {:?} predicate on `{}` requires a list value, found {:?}",
                        operator, field.property, field.value
                    ))
                })?)
            }
            _ => None,
        };
        if let (Operator::In, Some([])) = (operator, elements) {
            out.push_str(if field.negate { "(1=1)" } else { "(1=0)" });
            return Ok(());
        }
        if wrap {
            out.push_str("NOT (");
        }
        self.write_column_ref(context, out, &schema.table, property);
        match (operator, elements) {
            (Operator::IsNull, _) => {
                out.push_str(if field.negate {
                    " IS NOT NULL"
                } else {
                    " IS NULL"
                });
            }
            (Operator::Eq, _) if field.value.is_null() => out.push_str(" IS NULL"),
            (Operator::Ne, _) if field.value.is_null() => out.push_str(" IS NOT NULL"),
            (Operator::In, Some(elements)) => {
                out.push(' ');
                out.push_str(self.operator_symbol(operator));
                out.push_str(" (");
                try_separated_by(
                    out,
                    elements,
                    |out, v| self.write_parameter(context, out, params, &property.name, v.clone()),
                    ", ",
                )?;
                out.push(')');
            }
            (Operator::Between, Some([low, high])) => {
                out.push(' ');
                out.push_str(self.operator_symbol(operator));
                out.push(' ');
                self.write_parameter(context, out, params, &property.name, low.clone())?;
                out.push_str(" AND ");
                self.write_parameter(context, out, params, &property.name, high.clone())?;
            }
            (Operator::Between, _) => {
                return Err(StencilError::missing_input(format!(
                    "the Between predicate on `{}` requires exactly two values",
                    field.property
                )));
            }
            _ => {
                out.push(' ');
                out.push_str(self.operator_symbol(operator));
                out.push(' ');
                self.write_parameter(context, out, params, &property.name, field.value.clone())?;
            }
        }
        if wrap {
            out.push(')');
        }
        Ok(())
    }

    /// ORDER BY terms.
    fn write_sort(
        &self,
        context: &Context,
        out: &mut String,
        schema: &EntitySchema,
        sort: &[Sort],
    ) -> Result<()> {
        try_separated_by(
            out,
            sort,
            |out, v| {
                let property = schema.require_property(&v.property)?;
                self.write_column_ref(context, out, &schema.table, property);
                out.push_str(match v.order {
                    Order::Asc => " ASC",
                    Order::Desc => " DESC",
                });
                Ok(())
            },
            ", ",
        )
    }

    /// Column list of a select: every mapped property, or the requested subset.
    fn write_projection(
        &self,
        context: &Context,
        out: &mut String,
        schema: &EntitySchema,
        columns: Option<&[&str]>,
    ) -> Result<()> {
        let properties = match columns {
            Some(columns) if !columns.is_empty() => columns
                .iter()
                .map(|c| schema.require_property(c))
                .collect::<Result<Vec<_>>>()?,
            _ => schema.mapped().collect(),
        };
        if properties.is_empty() {
            return Err(StencilError::NoColumns(schema.entity_name()).into());
        }
        separated_by(
            out,
            properties,
            |out, p| {
                self.write_column_ref(context, out, &schema.table, p);
                if p.is_aliased() {
                    out.push_str(" AS ");
                    self.write_identifier_quoted(context, out, &p.name);
                }
            },
            ", ",
        );
        Ok(())
    }

    /// Emit SELECT statement (projection, FROM, WHERE, ORDER BY).
    fn write_select(
        &self,
        out: &mut String,
        params: &mut ParameterBag,
        schema: &EntitySchema,
        columns: Option<&[&str]>,
        predicate: Option<&Predicate>,
        sort: &[Sort],
    ) -> Result<()> {
        out.reserve(128 + schema.properties.len() * 32);
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str("SELECT ");
        let context = Context::new(Fragment::SqlSelect, false);
        self.write_projection(&context, out, schema, columns)?;
        out.push_str("\nFROM ");
        self.write_table_ref(
            &context.switch_fragment(Fragment::SqlSelectFrom),
            out,
            &schema.table,
        );
        if let Some(predicate) = predicate {
            out.push_str("\nWHERE ");
            self.write_predicate(
                &context.switch_fragment(Fragment::SqlSelectWhere),
                out,
                params,
                schema,
                predicate,
            )?;
        }
        if !sort.is_empty() {
            out.push_str("\nORDER BY ");
            self.write_sort(
                &context.switch_fragment(Fragment::SqlSelectOrderBy),
                out,
                schema,
                sort,
            )?;
        }
        Ok(())
    }

    /// Restrict `sql` to `max_results` rows starting at the zero based `first_result`.
    fn write_window(
        &self,
        out: &mut String,
        sql: &str,
        first_result: u64,
        max_results: u64,
        params: &mut ParameterBag,
    ) -> Result<()> {
        params.add("maxResults", max_results.into())?;
        params.add("firstResult", first_result.into())?;
        let context = Context::default();
        out.push_str(sql);
        out.push_str("\nLIMIT ");
        self.write_parameter_name(&context, out, "maxResults");
        out.push_str(" OFFSET ");
        self.write_parameter_name(&context, out, "firstResult");
        Ok(())
    }

    /// Restrict `sql` to the 1-based `page` (page 0 is treated as page 1). When the
    /// dialect supports batches a second statement returning the total row count of
    /// `sql` follows the page.
    fn write_paging(
        &self,
        out: &mut String,
        sql: &str,
        page: u64,
        page_size: u64,
        params: &mut ParameterBag,
    ) -> Result<()> {
        let first_result = page.saturating_sub(1).saturating_mul(page_size);
        self.write_window(out, sql, first_result, page_size, params)?;
        if self.supports_multiple_statements() {
            out.push_str(self.batch_separator());
            self.write_count_of(out, sql);
        }
        Ok(())
    }

    /// Total row count of an arbitrary select.
    fn write_count_of(&self, out: &mut String, sql: &str) {
        let context = Context::new(Fragment::SqlAggregate, false);
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str("SELECT COUNT(*) AS ");
        self.write_identifier_quoted(&context, out, Aggregate::Count.alias());
        out.push_str(" FROM (");
        out.push_str(sql);
        out.push_str(") AS ");
        self.write_identifier_quoted(&context, out, "counted");
    }

    /// Ordered select restricted to one page.
    fn write_select_paged(
        &self,
        out: &mut String,
        params: &mut ParameterBag,
        schema: &EntitySchema,
        predicate: Option<&Predicate>,
        sort: &[Sort],
        page: u64,
        page_size: u64,
    ) -> Result<()> {
        if sort.is_empty() {
            return Err(StencilError::missing_input(
                "a paged select requires at least one sort term",
            ));
        }
        let mut sql = String::new();
        self.write_select(&mut sql, params, schema, None, predicate, sort)?;
        if !out.is_empty() {
            out.push('\n');
        }
        self.write_paging(out, &sql, page, page_size, params)
    }

    /// Ordered select restricted to a window of rows.
    fn write_select_set(
        &self,
        out: &mut String,
        params: &mut ParameterBag,
        schema: &EntitySchema,
        predicate: Option<&Predicate>,
        sort: &[Sort],
        first_result: u64,
        max_results: u64,
    ) -> Result<()> {
        if sort.is_empty() {
            return Err(StencilError::missing_input(
                "a windowed select requires at least one sort term",
            ));
        }
        let mut sql = String::new();
        self.write_select(&mut sql, params, schema, None, predicate, sort)?;
        if !out.is_empty() {
            out.push('\n');
        }
        self.write_window(out, &sql, first_result, max_results, params)
    }

    /// `SELECT <AGG>(<column>) AS <alias> FROM <table> [WHERE ...]`.
    fn write_aggregate(
        &self,
        out: &mut String,
        params: &mut ParameterBag,
        schema: &EntitySchema,
        aggregate: Aggregate,
        property: Option<&str>,
        predicate: Option<&Predicate>,
    ) -> Result<()> {
        let context = Context::new(Fragment::SqlAggregate, false);
        let property = match (aggregate, property) {
            (Aggregate::Count, _) => None,
            (_, Some(property)) => Some(schema.require_property(property)?),
            (_, None) => {
                return Err(StencilError::missing_input(format!(
                    "{} requires a property of `{}`",
                    aggregate.function(),
                    schema.entity_name()
                )));
            }
        };
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str("SELECT ");
        out.push_str(aggregate.function());
        out.push('(');
        match property {
            Some(property) => self.write_column_ref(&context, out, &schema.table, property),
            None => out.push('*'),
        }
        out.push_str(") AS ");
        self.write_identifier_quoted(&context, out, aggregate.alias());
        out.push_str("\nFROM ");
        self.write_table_ref(
            &context.switch_fragment(Fragment::SqlSelectFrom),
            out,
            &schema.table,
        );
        if let Some(predicate) = predicate {
            out.push_str("\nWHERE ");
            self.write_predicate(
                &context.switch_fragment(Fragment::SqlSelectWhere),
                out,
                params,
                schema,
                predicate,
            )?;
        }
        Ok(())
    }

    fn write_count(
        &self,
        out: &mut String,
        params: &mut ParameterBag,
        schema: &EntitySchema,
        predicate: Option<&Predicate>,
    ) -> Result<()> {
        self.write_aggregate(out, params, schema, Aggregate::Count, None, predicate)
    }

    /// Properties written by an INSERT: mapped, writable, not produced by the database.
    fn insert_columns<'s>(&self, schema: &'s EntitySchema) -> Vec<&'s PropertyDescriptor> {
        schema
            .mapped()
            .filter(|p| !p.read_only && !p.key_kind.is_database_generated())
            .collect()
    }

    /// Emit a single row INSERT binding `<prefix><property>`. A trigger generated key
    /// is returned through the [`ID_OUT_PARAM`] output parameter.
    fn write_insert(
        &self,
        out: &mut String,
        params: &mut ParameterBag,
        schema: &EntitySchema,
        values: &[(&str, Value)],
    ) -> Result<()> {
        let columns = self.insert_columns(schema);
        if columns.is_empty() {
            return Err(StencilError::NoColumns(schema.entity_name()).into());
        }
        let trigger = schema
            .keys()
            .filter(|p| p.key_kind == crate::KeyKind::TriggerIdentity)
            .collect::<Vec<_>>();
        if trigger.len() > 1 {
            return Err(StencilError::key_misconfiguration(
                schema.entity_name(),
                "only one TriggerIdentity property is allowed",
            ));
        }
        out.reserve(64 + columns.len() * 48);
        if !out.is_empty() {
            out.push('\n');
        }
        let context = Context::new(Fragment::SqlInsertInto, false);
        out.push_str("INSERT INTO ");
        self.write_table_ref(&context, out, &schema.table);
        out.push_str(" (");
        separated_by(
            out,
            columns.iter(),
            |out, p| self.write_identifier_quoted(&context, out, &p.column_name),
            ", ",
        );
        out.push_str(") VALUES\n(");
        let context = context.switch_fragment(Fragment::SqlInsertIntoValues);
        try_separated_by(
            out,
            columns.iter(),
            |out, p| {
                params.add(p.name.clone(), value_for(values, p))?;
                self.write_parameter_name(&context, out, &p.name);
                Ok(())
            },
            ", ",
        )?;
        out.push(')');
        if let Some(property) = trigger.first() {
            params.add_output(ID_OUT_PARAM, value_for(values, property))?;
            self.write_trigger_identity_returning(
                &context.switch_fragment(Fragment::SqlInsertIntoReturning),
                out,
                property,
            )?;
        }
        Ok(())
    }

    /// Clause returning a trigger generated key into [`ID_OUT_PARAM`].
    fn write_trigger_identity_returning(
        &self,
        context: &Context,
        out: &mut String,
        property: &PropertyDescriptor,
    ) -> Result<()> {
        out.push_str("\nRETURNING ");
        self.write_identifier_quoted(context, out, &property.column_name);
        out.push_str(" INTO ");
        self.write_parameter_name(context, out, ID_OUT_PARAM);
        Ok(())
    }

    /// Emit a multi row INSERT binding `<prefix><property>_<rowIndex>`, optionally
    /// rewritten into an upsert.
    fn write_insert_many(
        &self,
        out: &mut String,
        params: &mut ParameterBag,
        schema: &EntitySchema,
        rows: &[Box<[(&'static str, Value)]>],
        upsert: bool,
    ) -> Result<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let columns = self.insert_columns(schema);
        if columns.is_empty() {
            return Err(StencilError::NoColumns(schema.entity_name()).into());
        }
        out.reserve(64 + columns.len() * 16 * (rows.len() + 1));
        if !out.is_empty() {
            out.push('\n');
        }
        let context = Context::new(Fragment::SqlInsertInto, false);
        out.push_str("INSERT INTO ");
        self.write_table_ref(&context, out, &schema.table);
        out.push_str(" (");
        separated_by(
            out,
            columns.iter(),
            |out, p| self.write_identifier_quoted(&context, out, &p.column_name),
            ", ",
        );
        out.push_str(") VALUES\n");
        let values_context = context.switch_fragment(Fragment::SqlInsertIntoValues);
        try_separated_by(
            out,
            rows.iter().enumerate(),
            |out, (i, row)| {
                out.push('(');
                try_separated_by(
                    out,
                    columns.iter(),
                    |out, p| {
                        let name = format!("{}_{}", p.name, i);
                        self.write_parameter_name(&values_context, out, &name);
                        params.add(name, value_for(row, p))
                    },
                    ", ",
                )?;
                out.push(')');
                Ok(())
            },
            ",\n",
        )?;
        if upsert {
            self.write_insert_update_fragment(
                &context.switch_fragment(Fragment::SqlInsertIntoOnConflict),
                out,
                schema,
                &columns,
            )?;
        }
        Ok(())
    }

    /// Emit ON CONFLICT DO UPDATE fragment for upsert, DO NOTHING when only keys are
    /// inserted.
    fn write_insert_update_fragment(
        &self,
        context: &Context,
        out: &mut String,
        schema: &EntitySchema,
        columns: &[&PropertyDescriptor],
    ) -> Result<()> {
        let keys = schema.keys().collect::<Vec<_>>();
        if keys.is_empty() {
            return Err(StencilError::key_misconfiguration(
                schema.entity_name(),
                "an upsert requires at least one key property",
            ));
        }
        out.push_str("\nON CONFLICT (");
        separated_by(
            out,
            keys,
            |out, v| self.write_identifier_quoted(context, out, &v.column_name),
            ", ",
        );
        let updated = columns.iter().filter(|c| !c.is_key()).collect::<Vec<_>>();
        if updated.is_empty() {
            out.push_str(") DO NOTHING");
            return Ok(());
        }
        out.push_str(") DO UPDATE SET\n");
        separated_by(
            out,
            updated,
            |out, v| {
                self.write_identifier_quoted(context, out, &v.column_name);
                out.push_str(" = EXCLUDED.");
                self.write_identifier_quoted(context, out, &v.column_name);
            },
            ",\n",
        );
        Ok(())
    }

    /// Emit UPDATE statement. With `ignore_all_keys` only non key properties are set,
    /// otherwise every property but `Identity` and `Assigned` keys.
    fn write_update(
        &self,
        out: &mut String,
        params: &mut ParameterBag,
        schema: &EntitySchema,
        values: &[(&str, Value)],
        predicate: Option<&Predicate>,
        ignore_all_keys: bool,
    ) -> Result<()> {
        let Some(predicate) = predicate else {
            return Err(StencilError::missing_input("an update requires a predicate"));
        };
        let columns = schema
            .mapped()
            .filter(|p| !p.read_only)
            .filter(|p| {
                if ignore_all_keys {
                    !p.is_key()
                } else {
                    !matches!(
                        p.key_kind,
                        crate::KeyKind::Identity | crate::KeyKind::Assigned
                    )
                }
            })
            .collect::<Vec<_>>();
        if columns.is_empty() {
            return Err(StencilError::NoColumns(schema.entity_name()).into());
        }
        if !out.is_empty() {
            out.push('\n');
        }
        let context = Context::new(Fragment::SqlUpdate, false);
        out.push_str("UPDATE ");
        self.write_table_ref(&context, out, &schema.table);
        out.push_str("\nSET ");
        let set_context = context.switch_fragment(Fragment::SqlUpdateSet);
        try_separated_by(
            out,
            columns,
            |out, p| {
                self.write_identifier_quoted(&set_context, out, &p.column_name);
                out.push_str(" = ");
                params.add(p.name.clone(), value_for(values, p))?;
                self.write_parameter_name(&set_context, out, &p.name);
                Ok(())
            },
            ", ",
        )?;
        out.push_str("\nWHERE ");
        self.write_predicate(
            &context.switch_fragment(Fragment::SqlUpdateWhere),
            out,
            params,
            schema,
            predicate,
        )
    }

    /// Emit DELETE statement with WHERE clause.
    fn write_delete(
        &self,
        out: &mut String,
        params: &mut ParameterBag,
        schema: &EntitySchema,
        predicate: Option<&Predicate>,
    ) -> Result<()> {
        let Some(predicate) = predicate else {
            return Err(StencilError::missing_input("a delete requires a predicate"));
        };
        out.reserve(128);
        if !out.is_empty() {
            out.push('\n');
        }
        let context = Context::new(Fragment::SqlDeleteFrom, false);
        out.push_str("DELETE FROM ");
        self.write_table_ref(&context, out, &schema.table);
        out.push_str("\nWHERE ");
        self.write_predicate(
            &context.switch_fragment(Fragment::SqlDeleteFromWhere),
            out,
            params,
            schema,
            predicate,
        )
    }

    fn write_join_type(&self, _context: &Context, out: &mut String, join: JoinType) {
        out.push_str(match join {
            JoinType::Default => "JOIN",
            JoinType::Inner => "INNER JOIN",
            JoinType::Left => "LEFT JOIN",
            JoinType::Right => "RIGHT JOIN",
            JoinType::Outer => "FULL OUTER JOIN",
        });
    }

    /// Emit `SELECT *` over the entity table joined with each related table on
    /// `<table>.<foreign key> = <related>.<first key>`.
    fn write_select_join(
        &self,
        out: &mut String,
        params: &mut ParameterBag,
        schema: &EntitySchema,
        relations: &[(&str, &EntitySchema)],
        join: JoinType,
        predicate: Option<&Predicate>,
        sort: &[Sort],
    ) -> Result<()> {
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str("SELECT *");
        self.write_join_source(out, params, schema, relations, join, predicate, sort)
    }

    /// Same join as [`SqlWriter::write_select_join`] projecting the mapped columns of
    /// every table. Each column is labeled with [`relational_label`] of the table
    /// position: 0 for `schema`, then the relations in order.
    fn write_select_relational(
        &self,
        out: &mut String,
        params: &mut ParameterBag,
        schema: &EntitySchema,
        relations: &[(&str, &EntitySchema)],
        join: JoinType,
        predicate: Option<&Predicate>,
        sort: &[Sort],
    ) -> Result<()> {
        if !out.is_empty() {
            out.push('\n');
        }
        let context = Context::new(Fragment::SqlSelect, true);
        out.push_str("SELECT ");
        let tables = std::iter::once(schema).chain(relations.iter().map(|(_, v)| *v));
        separated_by(
            out,
            tables
                .enumerate()
                .flat_map(|(i, table)| table.mapped().map(move |p| (i, table, p))),
            |out, (i, table, p)| {
                self.write_column_ref(&context, out, &table.table, p);
                out.push_str(" AS ");
                self.write_identifier_quoted(&context, out, &relational_label(i, &p.column_name));
            },
            ",\n",
        );
        self.write_join_source(out, params, schema, relations, join, predicate, sort)
    }

    /// `FROM` clause of a join followed by its filter and order.
    fn write_join_source(
        &self,
        out: &mut String,
        params: &mut ParameterBag,
        schema: &EntitySchema,
        relations: &[(&str, &EntitySchema)],
        join: JoinType,
        predicate: Option<&Predicate>,
        sort: &[Sort],
    ) -> Result<()> {
        let context = Context::new(Fragment::SqlSelect, true);
        out.push_str("\nFROM ");
        let join_context = context.switch_fragment(Fragment::SqlJoin);
        self.write_table_ref(&join_context, out, &schema.table);
        for (foreign_key, related) in relations {
            let foreign_key = schema.require_property(foreign_key)?;
            let Some(related_key) = related.keys().next() else {
                return Err(StencilError::key_misconfiguration(
                    related.entity_name(),
                    "a joined entity requires a key property",
                ));
            };
            out.push('\n');
            self.write_join_type(&join_context, out, join);
            out.push(' ');
            self.write_table_ref(&join_context, out, &related.table);
            out.push_str(" ON ");
            self.write_column_ref(&context, out, &schema.table, foreign_key);
            out.push_str(" = ");
            self.write_column_ref(&context, out, &related.table, related_key);
        }
        if let Some(predicate) = predicate {
            out.push_str("\nWHERE ");
            self.write_predicate(
                &context.switch_fragment(Fragment::SqlSelectWhere),
                out,
                params,
                schema,
                predicate,
            )?;
        }
        if !sort.is_empty() {
            out.push_str("\nORDER BY ");
            self.write_sort(
                &context.switch_fragment(Fragment::SqlSelectOrderBy),
                out,
                schema,
                sort,
            )?;
        }
        Ok(())
    }

    /// Identity select for the table of `schema`.
    fn write_identity(&self, out: &mut String, schema: &EntitySchema) -> Result<()> {
        self.write_identity_select(out, &schema.table)
    }

    /// Statement reading the identity generated by the last insert on `table`.
    fn write_identity_select(&self, out: &mut String, _table: &TableRef) -> Result<()> {
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str("SELECT LASTVAL() AS ");
        self.write_identifier_quoted(&Context::default(), out, "ID");
        Ok(())
    }
}

/// Label of `column` projected from the table at `position` of a relational select.
pub fn relational_label(position: usize, column: &str) -> String {
    format!("t{position}_{column}")
}

/// Value of `property` in an entity row, the typed NULL when absent.
pub fn value_for(values: &[(&str, Value)], property: &PropertyDescriptor) -> Value {
    values
        .iter()
        .find(|(name, _)| property.name.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.clone())
        .unwrap_or_else(|| property.value.clone())
}

/// Fallback generic SQL writer (closest to PostgreSQL conventions).
#[derive(Default, Debug, Clone, Copy)]
pub struct GenericSqlWriter;

impl GenericSqlWriter {
    /// Construct a new generic writer.
    pub const fn new() -> Self {
        Self {}
    }
}

impl SqlWriter for GenericSqlWriter {}
