//! Schema-as-code definitions for the tables this pipeline actually
//! persists, grounded on the teacher's `mcb-domain::schema` module. Used
//! by `warden-infrastructure::checkpoint` and
//! `warden-providers::vectorstore`'s metadata store to generate
//! `CREATE TABLE` DDL at startup instead of shipping separate migration
//! files.

mod column;
mod table;
mod tables;

pub use column::{ColumnDef, ColumnType};
pub use table::{ForeignKeyDef, IndexDef, TableDef, UniqueConstraintDef};
pub use tables::{chunks_table, job_checkpoints_table, projects_table, review_findings_table, reports_table};
