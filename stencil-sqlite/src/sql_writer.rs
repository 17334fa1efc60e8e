use stencil_core::{Result, SqlWriter, TableRef, writer::Context};

/// SQL writer for SQLite.
#[derive(Default, Debug, Clone, Copy)]
pub struct SqliteSqlWriter;

impl SqliteSqlWriter {
    pub const fn new() -> Self {
        Self {}
    }
}

impl SqlWriter for SqliteSqlWriter {
    fn write_identity_select(&self, out: &mut String, _table: &TableRef) -> Result<()> {
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str("SELECT LAST_INSERT_ROWID() AS ");
        self.write_identifier_quoted(&Context::default(), out, "ID");
        Ok(())
    }
}
