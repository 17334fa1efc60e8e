use stencil_core::{
    EntitySchema, ParameterBag, PropertyDescriptor, Result, SqlWriter, StencilError, TableRef,
    separated_by,
    writer::{Context, Fragment},
};

/// SQL writer for MySQL and MariaDB.
#[derive(Default, Debug, Clone, Copy)]
pub struct MySQLSqlWriter;

impl MySQLSqlWriter {
    pub const fn new() -> Self {
        Self {}
    }
}

impl SqlWriter for MySQLSqlWriter {
    fn quote_chars(&self) -> Option<(char, char)> {
        Some(('`', '`'))
    }

    fn write_window(
        &self,
        out: &mut String,
        sql: &str,
        first_result: u64,
        max_results: u64,
        params: &mut ParameterBag,
    ) -> Result<()> {
        params.add("firstResult", first_result.into())?;
        params.add("maxResults", max_results.into())?;
        let context = Context::default();
        out.push_str(sql);
        out.push_str("\nLIMIT ");
        self.write_parameter_name(&context, out, "firstResult");
        out.push_str(", ");
        self.write_parameter_name(&context, out, "maxResults");
        Ok(())
    }

    /// The page is computed with `SQL_CALC_FOUND_ROWS` and the total read back through
    /// `FOUND_ROWS()` in the same batch.
    fn write_paging(
        &self,
        out: &mut String,
        sql: &str,
        page: u64,
        page_size: u64,
        params: &mut ParameterBag,
    ) -> Result<()> {
        let first_result = page.saturating_sub(1).saturating_mul(page_size);
        let sql = match sql.get(..7) {
            Some(head) if head.eq_ignore_ascii_case("SELECT ") => {
                format!("SELECT SQL_CALC_FOUND_ROWS {}", &sql[7..])
            }
            _ => sql.to_string(),
        };
        self.write_window(out, &sql, first_result, page_size, params)?;
        out.push_str(self.batch_separator());
        out.push_str("\nSELECT FOUND_ROWS() AS ");
        self.write_identifier_quoted(
            &Context::new(Fragment::SqlAggregate, false),
            out,
            "TOTAL",
        );
        Ok(())
    }

    fn write_insert_update_fragment(
        &self,
        context: &Context,
        out: &mut String,
        schema: &EntitySchema,
        columns: &[&PropertyDescriptor],
    ) -> Result<()> {
        if schema.keys().next().is_none() {
            return Err(StencilError::key_misconfiguration(
                schema.entity_name(),
                "an upsert requires at least one key property",
            ));
        }
        let mut updated = columns.iter().filter(|c| !c.is_key()).collect::<Vec<_>>();
        if updated.is_empty() {
            // Keys only, a no-op assignment keeps the existing row
            updated.extend(columns.first());
        }
        out.push_str("\nON DUPLICATE KEY UPDATE\n");
        separated_by(
            out,
            updated,
            |out, v| {
                self.write_identifier_quoted(context, out, &v.column_name);
                out.push_str(" = VALUES(");
                self.write_identifier_quoted(context, out, &v.column_name);
                out.push(')');
            },
            ",\n",
        );
        Ok(())
    }

    fn write_identity_select(&self, out: &mut String, _table: &TableRef) -> Result<()> {
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str("SELECT CONVERT(LAST_INSERT_ID(), SIGNED INTEGER) AS ");
        self.write_identifier_quoted(&Context::default(), out, "ID");
        Ok(())
    }
}
