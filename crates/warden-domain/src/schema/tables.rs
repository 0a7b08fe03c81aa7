use super::column::{ColumnDef, ColumnType};
use super::table::{fk, index, TableDef};

/// `projects` table: the subset of [`crate::entities::Project`] the
/// pipeline itself persists.
#[must_use]
pub fn projects_table() -> TableDef {
    TableDef {
        name: "projects",
        columns: vec![
            ColumnDef::new("id", ColumnType::Uuid).primary_key(),
            ColumnDef::new("name", ColumnType::Text),
            ColumnDef::new("source_kind", ColumnType::Text),
            ColumnDef::new("storage_path", ColumnType::Text).nullable(),
            ColumnDef::new("status", ColumnType::Text),
            ColumnDef::new("error_message", ColumnType::Text).nullable(),
            ColumnDef::new("started_at", ColumnType::Timestamp).nullable(),
            ColumnDef::new("completed_at", ColumnType::Timestamp).nullable(),
            ColumnDef::new("file_count", ColumnType::BigInt),
            ColumnDef::new("lines_of_code", ColumnType::BigInt),
        ],
        indexes: vec![index("idx_projects_status", &["status"], false)],
        foreign_keys: vec![],
        unique_constraints: vec![],
    }
}

/// `chunks` table: one row per persisted [`crate::entities::Chunk`].
#[must_use]
pub fn chunks_table() -> TableDef {
    TableDef {
        name: "chunks",
        columns: vec![
            ColumnDef::new("chunk_hash", ColumnType::Text).primary_key(),
            ColumnDef::new("project_id", ColumnType::Uuid).primary_key(),
            ColumnDef::new("file_path", ColumnType::Text),
            ColumnDef::new("start_line", ColumnType::BigInt),
            ColumnDef::new("end_line", ColumnType::BigInt),
            ColumnDef::new("token_count", ColumnType::BigInt),
            ColumnDef::new("language", ColumnType::Text),
            ColumnDef::new("text_hash", ColumnType::Text),
            ColumnDef::new("content", ColumnType::Text).nullable(),
            ColumnDef::new("semantic_type", ColumnType::Text).nullable(),
            ColumnDef::new("semantic_name", ColumnType::Text).nullable(),
            ColumnDef::new("chunk_index", ColumnType::BigInt),
            ColumnDef::new("total_chunks", ColumnType::BigInt),
        ],
        indexes: vec![index("idx_chunks_project", &["project_id"], false)],
        foreign_keys: vec![fk("project_id", "projects", "id")],
        unique_constraints: vec![],
    }
}

/// `job_checkpoints` table: one active row per project.
#[must_use]
pub fn job_checkpoints_table() -> TableDef {
    TableDef {
        name: "job_checkpoints",
        columns: vec![
            ColumnDef::new("project_id", ColumnType::Uuid).primary_key(),
            ColumnDef::new("phase", ColumnType::Text),
            ColumnDef::new("last_processed_file_index", ColumnType::BigInt),
            ColumnDef::new("files_processed", ColumnType::BigInt),
            ColumnDef::new("chunks_indexed", ColumnType::BigInt),
            ColumnDef::new("embeddings_created", ColumnType::BigInt),
            ColumnDef::new("chunks_skipped", ColumnType::BigInt),
            ColumnDef::new("total_tokens_processed", ColumnType::BigInt),
            ColumnDef::new("status", ColumnType::Text),
            ColumnDef::new("retry_count", ColumnType::BigInt),
            ColumnDef::new("last_checkpoint_at", ColumnType::Timestamp),
            ColumnDef::new("serialized_state", ColumnType::Blob).nullable(),
            ColumnDef::new("error_message", ColumnType::Text).nullable(),
            ColumnDef::new("created_at", ColumnType::Timestamp),
        ],
        indexes: vec![index("idx_checkpoints_status", &["status"], false)],
        foreign_keys: vec![fk("project_id", "projects", "id")],
        unique_constraints: vec![],
    }
}

/// `review_findings` table.
#[must_use]
pub fn review_findings_table() -> TableDef {
    TableDef {
        name: "review_findings",
        columns: vec![
            ColumnDef::new("id", ColumnType::Uuid).primary_key(),
            ColumnDef::new("project_id", ColumnType::Uuid),
            ColumnDef::new("report_id", ColumnType::Uuid).nullable(),
            ColumnDef::new("category", ColumnType::Text),
            ColumnDef::new("severity", ColumnType::Text),
            ColumnDef::new("agent_type", ColumnType::Text),
            ColumnDef::new("description", ColumnType::Text),
            ColumnDef::new("explanation", ColumnType::Text),
            ColumnDef::new("file_path", ColumnType::Text).nullable(),
            ColumnDef::new("line_start", ColumnType::BigInt).nullable(),
            ColumnDef::new("line_end", ColumnType::BigInt).nullable(),
            ColumnDef::new("symbol", ColumnType::Text).nullable(),
            ColumnDef::new("suggested_fix", ColumnType::Text).nullable(),
            ColumnDef::new("original_snippet", ColumnType::Text).nullable(),
            ColumnDef::new("fixed_snippet", ColumnType::Text).nullable(),
            ColumnDef::new("confidence", ColumnType::Double),
        ],
        indexes: vec![index("idx_findings_project", &["project_id"], false)],
        foreign_keys: vec![fk("project_id", "projects", "id")],
        unique_constraints: vec![],
    }
}

/// `reports` table. At most one row per project, enforced via the unique
/// constraint on `project_id`.
#[must_use]
pub fn reports_table() -> TableDef {
    TableDef {
        name: "reports",
        columns: vec![
            ColumnDef::new("id", ColumnType::Uuid).primary_key(),
            ColumnDef::new("project_id", ColumnType::Uuid),
            ColumnDef::new("health_score", ColumnType::BigInt),
            ColumnDef::new("summary", ColumnType::Text),
            ColumnDef::new("recommendations", ColumnType::Json),
            ColumnDef::new("critical_count", ColumnType::BigInt),
            ColumnDef::new("high_count", ColumnType::BigInt),
            ColumnDef::new("medium_count", ColumnType::BigInt),
            ColumnDef::new("low_count", ColumnType::BigInt),
            ColumnDef::new("info_count", ColumnType::BigInt),
            ColumnDef::new("duration_seconds", ColumnType::Double),
        ],
        indexes: vec![],
        foreign_keys: vec![fk("project_id", "projects", "id")],
        unique_constraints: vec![super::table::UniqueConstraintDef {
            name: "uq_reports_project",
            columns: &["project_id"],
        }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn projects_ddl_includes_primary_key() {
        let ddl = projects_table().create_table_ddl();
        assert!(ddl.contains("PRIMARY KEY (id)"));
    }

    #[test]
    fn chunks_ddl_includes_composite_primary_key() {
        let ddl = chunks_table().create_table_ddl();
        assert!(ddl.contains("PRIMARY KEY (chunk_hash, project_id)"));
    }

    #[test]
    fn reports_ddl_includes_unique_constraint() {
        let ddl = reports_table().create_table_ddl();
        assert!(ddl.contains("UNIQUE (project_id)"));
    }
}
