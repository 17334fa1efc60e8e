use stencil_core::{
    EntitySchema, ParameterBag, PropertyDescriptor, Result, SqlWriter, StencilError, TableRef,
    writer::Context,
};

/// SQL writer for Oracle.
///
/// Identifiers are written verbatim and parameters use the `:` prefix. Oracle drivers
/// run a single statement per command, so paged totals are read with a second query
/// and generated identities can only be returned through trigger output parameters.
#[derive(Default, Debug, Clone, Copy)]
pub struct OracleSqlWriter;

impl OracleSqlWriter {
    pub const fn new() -> Self {
        Self {}
    }
}

impl SqlWriter for OracleSqlWriter {
    fn quote_chars(&self) -> Option<(char, char)> {
        None
    }

    fn parameter_prefix(&self) -> char {
        ':'
    }

    fn supports_multiple_statements(&self) -> bool {
        false
    }

    /// Rows `(first_result, first_result + max_results]` counted by `ROWNUM`.
    fn write_window(
        &self,
        out: &mut String,
        sql: &str,
        first_result: u64,
        max_results: u64,
        params: &mut ParameterBag,
    ) -> Result<()> {
        params.add("topLimit", first_result.saturating_add(max_results).into())?;
        params.add("toSkip", first_result.into())?;
        let context = Context::default();
        out.push_str("SELECT * FROM (\nSELECT page_rows.*, ROWNUM RNUM FROM (\n");
        out.push_str(sql);
        out.push_str("\n) page_rows\nWHERE ROWNUM <= ");
        self.write_parameter_name(&context, out, "topLimit");
        out.push_str(") page_window\nWHERE page_window.RNUM > ");
        self.write_parameter_name(&context, out, "toSkip");
        Ok(())
    }

    fn write_insert_update_fragment(
        &self,
        _context: &Context,
        _out: &mut String,
        _schema: &EntitySchema,
        _columns: &[&PropertyDescriptor],
    ) -> Result<()> {
        Err(StencilError::unsupported(
            "Oracle batch inserts cannot be turned into upserts",
        ))
    }

    fn write_identity_select(&self, _out: &mut String, _table: &TableRef) -> Result<()> {
        Err(StencilError::unsupported(
            "Oracle does not expose the last inserted identity, use a trigger identity key",
        ))
    }
}
