use stencil_core::{EntitySchema, Result, SqlWriter, writer::Context};

/// SQL writer for PostgreSQL.
#[derive(Default, Debug, Clone, Copy)]
pub struct PostgresSqlWriter;

impl PostgresSqlWriter {
    pub const fn new() -> Self {
        Self {}
    }
}

impl SqlWriter for PostgresSqlWriter {
    /// Reads the sequence owned by the generated key column, falling back to `LASTVAL()`
    /// when the entity has none.
    fn write_identity(&self, out: &mut String, schema: &EntitySchema) -> Result<()> {
        let Some(key) = schema.generated_key() else {
            return self.write_identity_select(out, &schema.table);
        };
        let context = Context::default();
        let mut table = String::new();
        self.write_table_ref(&context, &mut table, &schema.table);
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str("SELECT CURRVAL(PG_GET_SERIAL_SEQUENCE('");
        out.push_str(&table.replace('\'', "''"));
        out.push_str("', '");
        out.push_str(&key.column_name.replace('\'', "''"));
        out.push_str("')) AS ");
        self.write_identifier_quoted(&context, out, "ID");
        Ok(())
    }
}
