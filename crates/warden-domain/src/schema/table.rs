use super::column::ColumnDef;

/// A named, possibly multi-column index.
#[derive(Debug, Clone)]
pub struct IndexDef {
    /// Index name.
    pub name: &'static str,
    /// Columns covered, in order.
    pub columns: &'static [&'static str],
    /// Whether the index enforces uniqueness.
    pub unique: bool,
}

/// A foreign-key reference from one table's column to another table's
/// primary key.
#[derive(Debug, Clone)]
pub struct ForeignKeyDef {
    /// Local column name.
    pub column: &'static str,
    /// Referenced table name.
    pub references_table: &'static str,
    /// Referenced column name.
    pub references_column: &'static str,
}

/// A named multi-column uniqueness constraint.
#[derive(Debug, Clone)]
pub struct UniqueConstraintDef {
    /// Constraint name.
    pub name: &'static str,
    /// Columns covered.
    pub columns: &'static [&'static str],
}

/// A table declaration: the columns, indexes, foreign keys, and unique
/// constraints needed to render `CREATE TABLE`/`CREATE INDEX` DDL.
#[derive(Debug, Clone)]
pub struct TableDef {
    /// Table name.
    pub name: &'static str,
    /// Column declarations.
    pub columns: Vec<ColumnDef>,
    /// Index declarations.
    pub indexes: Vec<IndexDef>,
    /// Foreign key declarations.
    pub foreign_keys: Vec<ForeignKeyDef>,
    /// Unique-constraint declarations beyond single-column ones already
    /// expressed via an index.
    pub unique_constraints: Vec<UniqueConstraintDef>,
}

/// Declares a named index. Mirrors the teacher's `index!` macro as a
/// plain constructor, since this crate forgoes the teacher's proc-macro
/// plugin-registry machinery (see `DESIGN.md`).
#[must_use]
pub fn index(name: &'static str, columns: &'static [&'static str], unique: bool) -> IndexDef {
    IndexDef { name, columns, unique }
}

/// Declares a named foreign key. Mirrors the teacher's `fk!` macro as a
/// plain constructor.
#[must_use]
pub fn fk(column: &'static str, references_table: &'static str, references_column: &'static str) -> ForeignKeyDef {
    ForeignKeyDef {
        column,
        references_table,
        references_column,
    }
}

impl TableDef {
    /// Renders the table's `CREATE TABLE IF NOT EXISTS` statement,
    /// including inline primary-key and foreign-key clauses.
    #[must_use]
    pub fn create_table_ddl(&self) -> String {
        let mut parts: Vec<String> = self.columns.iter().map(ColumnDef::to_ddl_fragment).collect();

        let pk_cols: Vec<&str> = self
            .columns
            .iter()
            .filter(|c| c.primary_key)
            .map(|c| c.name)
            .collect();
        if !pk_cols.is_empty() {
            parts.push(format!("PRIMARY KEY ({})", pk_cols.join(", ")));
        }

        for uc in &self.unique_constraints {
            parts.push(format!("UNIQUE ({})", uc.columns.join(", ")));
        }

        for fk_def in &self.foreign_keys {
            parts.push(format!(
                "FOREIGN KEY ({}) REFERENCES {}({})",
                fk_def.column, fk_def.references_table, fk_def.references_column
            ));
        }

        format!(
            "CREATE TABLE IF NOT EXISTS {} (\n  {}\n)",
            self.name,
            parts.join(",\n  ")
        )
    }

    /// Renders one `CREATE [UNIQUE] INDEX IF NOT EXISTS` statement per
    /// declared index.
    #[must_use]
    pub fn create_index_ddl(&self) -> Vec<String> {
        self.indexes
            .iter()
            .map(|idx| {
                let unique = if idx.unique { "UNIQUE " } else { "" };
                format!(
                    "CREATE {unique}INDEX IF NOT EXISTS {} ON {}({})",
                    idx.name,
                    self.name,
                    idx.columns.join(", ")
                )
            })
            .collect()
    }
}
