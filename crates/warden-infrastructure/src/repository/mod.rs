//! Project/Chunk/Finding/Report persistence: SQLite-backed, sharing the
//! same schema-as-code DDL approach as [`crate::checkpoint`]. One pool
//! serves all four tables since they're always migrated together.

use async_trait::async_trait;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Row, SqlitePool};
use warden_domain::entities::{
    Chunk, ChunkHash, Project, ProjectId, ProjectStatus, Report, ReviewFinding, Severity, SourceKind,
};
use warden_domain::error::{Error, Result};
use warden_domain::ports::{ChunkRepository, FindingRepository, ProjectRepository, ReportRepository};
use warden_domain::schema::{chunks_table, projects_table, reports_table, review_findings_table};

fn status_to_str(status: ProjectStatus) -> &'static str {
    match status {
        ProjectStatus::Created => "Created",
        ProjectStatus::FilesReady => "FilesReady",
        ProjectStatus::Queued => "Queued",
        ProjectStatus::Analyzing => "Analyzing",
        ProjectStatus::Completed => "Completed",
        ProjectStatus::Failed => "Failed",
    }
}

fn status_from_str(s: &str) -> Result<ProjectStatus> {
    match s {
        "Created" => Ok(ProjectStatus::Created),
        "FilesReady" => Ok(ProjectStatus::FilesReady),
        "Queued" => Ok(ProjectStatus::Queued),
        "Analyzing" => Ok(ProjectStatus::Analyzing),
        "Completed" => Ok(ProjectStatus::Completed),
        "Failed" => Ok(ProjectStatus::Failed),
        other => Err(Error::Fatal(format!("unknown project status {other:?} in storage"))),
    }
}

fn severity_to_str(severity: Severity) -> &'static str {
    match severity {
        Severity::Info => "Info",
        Severity::Low => "Low",
        Severity::Medium => "Medium",
        Severity::High => "High",
        Severity::Critical => "Critical",
    }
}

fn severity_from_str(s: &str) -> Result<Severity> {
    match s {
        "Info" => Ok(Severity::Info),
        "Low" => Ok(Severity::Low),
        "Medium" => Ok(Severity::Medium),
        "High" => Ok(Severity::High),
        "Critical" => Ok(Severity::Critical),
        other => Err(Error::Fatal(format!("unknown severity {other:?} in storage"))),
    }
}

/// Shared SQLite storage for projects, chunks, findings, and reports.
pub struct SqliteRepositories {
    pool: SqlitePool,
}

impl SqliteRepositories {
    /// Connects to `database_url` and ensures all four tables (and their
    /// indexes/constraints) exist.
    ///
    /// # Errors
    /// Returns an error if the connection or schema migration fails.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| Error::Config(format!("failed to connect to repository store: {e}")))?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    async fn migrate(&self) -> Result<()> {
        for table in [projects_table(), chunks_table(), review_findings_table(), reports_table()] {
            sqlx::query(&table.create_table_ddl())
                .execute(&self.pool)
                .await
                .map_err(|e| Error::Fatal(format!("failed to create {} table: {e}", table.name)))?;
            for ddl in table.create_index_ddl() {
                sqlx::query(&ddl)
                    .execute(&self.pool)
                    .await
                    .map_err(|e| Error::Fatal(format!("failed to create index on {}: {e}", table.name)))?;
            }
        }
        Ok(())
    }

    fn row_to_project(row: &sqlx::sqlite::SqliteRow) -> Result<Project> {
        let id: uuid::Uuid = row.try_get("id").map_err(|e| Error::Fatal(e.to_string()))?;
        let status: String = row.try_get("status").map_err(|e| Error::Fatal(e.to_string()))?;
        let source_kind_json: String = row.try_get("source_kind").map_err(|e| Error::Fatal(e.to_string()))?;
        let source_kind: SourceKind =
            serde_json::from_str(&source_kind_json).map_err(|e| Error::Fatal(format!("corrupt source_kind: {e}")))?;

        Ok(Project {
            id: ProjectId(id),
            name: row.try_get("name").map_err(|e| Error::Fatal(e.to_string()))?,
            source_kind,
            storage_path: row.try_get("storage_path").map_err(|e| Error::Fatal(e.to_string()))?,
            status: status_from_str(&status)?,
            error_message: row.try_get("error_message").map_err(|e| Error::Fatal(e.to_string()))?,
            started_at: row.try_get("started_at").map_err(|e| Error::Fatal(e.to_string()))?,
            completed_at: row.try_get("completed_at").map_err(|e| Error::Fatal(e.to_string()))?,
            file_count: row.try_get::<i64, _>("file_count").map_err(|e| Error::Fatal(e.to_string()))? as u64,
            lines_of_code: row.try_get::<i64, _>("lines_of_code").map_err(|e| Error::Fatal(e.to_string()))? as u64,
        })
    }

    fn row_to_chunk(row: &sqlx::sqlite::SqliteRow) -> Result<Chunk> {
        let chunk_hash_hex: String = row.try_get("chunk_hash").map_err(|e| Error::Fatal(e.to_string()))?;
        let chunk_hash_bytes = hex::decode(&chunk_hash_hex).map_err(|e| Error::Fatal(format!("corrupt chunk_hash: {e}")))?;
        let mut chunk_hash_array = [0u8; 32];
        if chunk_hash_bytes.len() != 32 {
            return Err(Error::Fatal("chunk_hash column is not 32 bytes".to_string()));
        }
        chunk_hash_array.copy_from_slice(&chunk_hash_bytes);

        let project_id: uuid::Uuid = row.try_get("project_id").map_err(|e| Error::Fatal(e.to_string()))?;
        let semantic_type: Option<String> = row.try_get("semantic_type").map_err(|e| Error::Fatal(e.to_string()))?;

        Ok(Chunk {
            chunk_hash: ChunkHash(chunk_hash_array),
            project_id: ProjectId(project_id),
            file_path: row.try_get("file_path").map_err(|e| Error::Fatal(e.to_string()))?,
            start_line: row.try_get::<i64, _>("start_line").map_err(|e| Error::Fatal(e.to_string()))? as u32,
            end_line: row.try_get::<i64, _>("end_line").map_err(|e| Error::Fatal(e.to_string()))? as u32,
            token_count: row.try_get::<i64, _>("token_count").map_err(|e| Error::Fatal(e.to_string()))? as u32,
            language: row.try_get("language").map_err(|e| Error::Fatal(e.to_string()))?,
            text_hash: row.try_get("text_hash").map_err(|e| Error::Fatal(e.to_string()))?,
            content: row.try_get("content").map_err(|e| Error::Fatal(e.to_string()))?,
            semantic_type: semantic_type.map(|s| parse_semantic_type(&s)).transpose()?,
            semantic_name: row.try_get("semantic_name").map_err(|e| Error::Fatal(e.to_string()))?,
            chunk_index: row.try_get::<i64, _>("chunk_index").map_err(|e| Error::Fatal(e.to_string()))? as u32,
            total_chunks: row.try_get::<i64, _>("total_chunks").map_err(|e| Error::Fatal(e.to_string()))? as u32,
        })
    }

    fn row_to_finding(row: &sqlx::sqlite::SqliteRow) -> Result<ReviewFinding> {
        let id: uuid::Uuid = row.try_get("id").map_err(|e| Error::Fatal(e.to_string()))?;
        let project_id: uuid::Uuid = row.try_get("project_id").map_err(|e| Error::Fatal(e.to_string()))?;
        let severity: String = row.try_get("severity").map_err(|e| Error::Fatal(e.to_string()))?;
        let line_start: Option<i64> = row.try_get("line_start").map_err(|e| Error::Fatal(e.to_string()))?;
        let line_end: Option<i64> = row.try_get("line_end").map_err(|e| Error::Fatal(e.to_string()))?;

        Ok(ReviewFinding {
            id,
            project_id: ProjectId(project_id),
            report_id: row.try_get("report_id").map_err(|e| Error::Fatal(e.to_string()))?,
            category: row.try_get("category").map_err(|e| Error::Fatal(e.to_string()))?,
            severity: severity_from_str(&severity)?,
            agent_type: row.try_get("agent_type").map_err(|e| Error::Fatal(e.to_string()))?,
            description: row.try_get("description").map_err(|e| Error::Fatal(e.to_string()))?,
            explanation: row.try_get("explanation").map_err(|e| Error::Fatal(e.to_string()))?,
            file_path: row.try_get("file_path").map_err(|e| Error::Fatal(e.to_string()))?,
            line_range: line_start.zip(line_end).map(|(s, e)| (s as u32, e as u32)),
            symbol: row.try_get("symbol").map_err(|e| Error::Fatal(e.to_string()))?,
            suggested_fix: row.try_get("suggested_fix").map_err(|e| Error::Fatal(e.to_string()))?,
            original_snippet: row.try_get("original_snippet").map_err(|e| Error::Fatal(e.to_string()))?,
            fixed_snippet: row.try_get("fixed_snippet").map_err(|e| Error::Fatal(e.to_string()))?,
            confidence: row.try_get("confidence").map_err(|e| Error::Fatal(e.to_string()))?,
        })
    }

    fn row_to_report(row: &sqlx::sqlite::SqliteRow) -> Result<Report> {
        let id: uuid::Uuid = row.try_get("id").map_err(|e| Error::Fatal(e.to_string()))?;
        let project_id: uuid::Uuid = row.try_get("project_id").map_err(|e| Error::Fatal(e.to_string()))?;
        let recommendations_json: String = row.try_get("recommendations").map_err(|e| Error::Fatal(e.to_string()))?;
        let recommendations: Vec<String> =
            serde_json::from_str(&recommendations_json).map_err(|e| Error::Fatal(format!("corrupt recommendations: {e}")))?;

        Ok(Report {
            id,
            project_id: ProjectId(project_id),
            health_score: row.try_get::<i64, _>("health_score").map_err(|e| Error::Fatal(e.to_string()))? as u8,
            summary: row.try_get("summary").map_err(|e| Error::Fatal(e.to_string()))?,
            recommendations,
            critical_count: row.try_get::<i64, _>("critical_count").map_err(|e| Error::Fatal(e.to_string()))? as u32,
            high_count: row.try_get::<i64, _>("high_count").map_err(|e| Error::Fatal(e.to_string()))? as u32,
            medium_count: row.try_get::<i64, _>("medium_count").map_err(|e| Error::Fatal(e.to_string()))? as u32,
            low_count: row.try_get::<i64, _>("low_count").map_err(|e| Error::Fatal(e.to_string()))? as u32,
            info_count: row.try_get::<i64, _>("info_count").map_err(|e| Error::Fatal(e.to_string()))? as u32,
            duration_seconds: row.try_get("duration_seconds").map_err(|e| Error::Fatal(e.to_string()))?,
        })
    }
}

fn semantic_type_to_str(semantic_type: warden_domain::entities::SemanticType) -> &'static str {
    use warden_domain::entities::SemanticType::{Class, Enum, Interface, Method, Namespace, Other, Record, Struct};
    match semantic_type {
        Namespace => "Namespace",
        Class => "Class",
        Interface => "Interface",
        Record => "Record",
        Struct => "Struct",
        Enum => "Enum",
        Method => "Method",
        Other => "Other",
    }
}

fn parse_semantic_type(s: &str) -> Result<warden_domain::entities::SemanticType> {
    use warden_domain::entities::SemanticType;
    match s {
        "Namespace" => Ok(SemanticType::Namespace),
        "Class" => Ok(SemanticType::Class),
        "Interface" => Ok(SemanticType::Interface),
        "Record" => Ok(SemanticType::Record),
        "Struct" => Ok(SemanticType::Struct),
        "Enum" => Ok(SemanticType::Enum),
        "Method" => Ok(SemanticType::Method),
        "Other" => Ok(SemanticType::Other),
        other => Err(Error::Fatal(format!("unknown semantic_type {other:?} in storage"))),
    }
}

#[async_trait]
impl ProjectRepository for SqliteRepositories {
    async fn get(&self, id: ProjectId) -> Result<Option<Project>> {
        let row = sqlx::query("SELECT * FROM projects WHERE id = ?")
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| Error::Fatal(format!("failed to fetch project: {e}")))?;
        row.as_ref().map(Self::row_to_project).transpose()
    }

    async fn save(&self, project: &Project) -> Result<()> {
        let source_kind_json = serde_json::to_string(&project.source_kind).map_err(|e| Error::Fatal(e.to_string()))?;
        sqlx::query(
            "INSERT INTO projects (\
                id, name, source_kind, storage_path, status, error_message, started_at, completed_at, \
                file_count, lines_of_code\
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)\
            ON CONFLICT(id) DO UPDATE SET \
                name = excluded.name, source_kind = excluded.source_kind, storage_path = excluded.storage_path, \
                status = excluded.status, error_message = excluded.error_message, started_at = excluded.started_at, \
                completed_at = excluded.completed_at, file_count = excluded.file_count, \
                lines_of_code = excluded.lines_of_code",
        )
        .bind(project.id.0)
        .bind(&project.name)
        .bind(source_kind_json)
        .bind(&project.storage_path)
        .bind(status_to_str(project.status))
        .bind(&project.error_message)
        .bind(project.started_at)
        .bind(project.completed_at)
        .bind(project.file_count as i64)
        .bind(project.lines_of_code as i64)
        .execute(&self.pool)
        .await
        .map_err(|e| Error::Fatal(format!("failed to persist project: {e}")))?;
        Ok(())
    }
}

#[async_trait]
impl ChunkRepository for SqliteRepositories {
    async fn existing_hashes(&self, project_id: ProjectId, hashes: &[ChunkHash]) -> Result<Vec<ChunkHash>> {
        if hashes.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders = vec!["?"; hashes.len()].join(", ");
        let query_str = format!("SELECT chunk_hash FROM chunks WHERE project_id = ? AND chunk_hash IN ({placeholders})");
        let mut query = sqlx::query(&query_str).bind(project_id.0);
        for hash in hashes {
            query = query.bind(hash.to_hex());
        }
        let rows = query.fetch_all(&self.pool).await.map_err(|e| Error::Fatal(format!("failed to query existing hashes: {e}")))?;
        rows.iter()
            .map(|row| {
                let hex_str: String = row.try_get("chunk_hash").map_err(|e| Error::Fatal(e.to_string()))?;
                let bytes = hex::decode(&hex_str).map_err(|e| Error::Fatal(e.to_string()))?;
                let mut array = [0u8; 32];
                if bytes.len() != 32 {
                    return Err(Error::Fatal("chunk_hash column is not 32 bytes".to_string()));
                }
                array.copy_from_slice(&bytes);
                Ok(ChunkHash(array))
            })
            .collect()
    }

    async fn save_batch(&self, chunks: &[Chunk]) -> Result<()> {
        for chunk in chunks {
            let semantic_type = chunk.semantic_type.map(semantic_type_to_str);
            sqlx::query(
                "INSERT INTO chunks (\
                    chunk_hash, project_id, file_path, start_line, end_line, token_count, language, \
                    text_hash, content, semantic_type, semantic_name, chunk_index, total_chunks\
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)\
                ON CONFLICT(chunk_hash, project_id) DO UPDATE SET \
                    file_path = excluded.file_path, start_line = excluded.start_line, end_line = excluded.end_line, \
                    token_count = excluded.token_count, language = excluded.language, text_hash = excluded.text_hash, \
                    content = excluded.content, semantic_type = excluded.semantic_type, \
                    semantic_name = excluded.semantic_name, chunk_index = excluded.chunk_index, \
                    total_chunks = excluded.total_chunks",
            )
            .bind(chunk.chunk_hash.to_hex())
            .bind(chunk.project_id.0)
            .bind(&chunk.file_path)
            .bind(chunk.start_line as i64)
            .bind(chunk.end_line as i64)
            .bind(chunk.token_count as i64)
            .bind(&chunk.language)
            .bind(&chunk.text_hash)
            .bind(&chunk.content)
            .bind(semantic_type)
            .bind(&chunk.semantic_name)
            .bind(chunk.chunk_index as i64)
            .bind(chunk.total_chunks as i64)
            .execute(&self.pool)
            .await
            .map_err(|e| Error::Fatal(format!("failed to persist chunk: {e}")))?;
        }
        Ok(())
    }

    async fn delete_chunk(&self, project_id: ProjectId, hash: ChunkHash) -> Result<()> {
        sqlx::query("DELETE FROM chunks WHERE project_id = ? AND chunk_hash = ?")
            .bind(project_id.0)
            .bind(hash.to_hex())
            .execute(&self.pool)
            .await
            .map_err(|e| Error::Fatal(format!("failed to delete chunk: {e}")))?;
        Ok(())
    }

    async fn count(&self, project_id: ProjectId) -> Result<u64> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM chunks WHERE project_id = ?")
            .bind(project_id.0)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| Error::Fatal(format!("failed to count chunks: {e}")))?;
        Ok(row.try_get::<i64, _>("n").map_err(|e| Error::Fatal(e.to_string()))? as u64)
    }
}

#[async_trait]
impl FindingRepository for SqliteRepositories {
    async fn save_batch(&self, findings: &[ReviewFinding]) -> Result<()> {
        for finding in findings {
            let (line_start, line_end) = finding.line_range.map_or((None, None), |(s, e)| (Some(s as i64), Some(e as i64)));
            sqlx::query(
                "INSERT INTO review_findings (\
                    id, project_id, report_id, category, severity, agent_type, description, explanation, \
                    file_path, line_start, line_end, symbol, suggested_fix, original_snippet, fixed_snippet, confidence\
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)\
                ON CONFLICT(id) DO UPDATE SET \
                    report_id = excluded.report_id, category = excluded.category, severity = excluded.severity, \
                    agent_type = excluded.agent_type, description = excluded.description, \
                    explanation = excluded.explanation, file_path = excluded.file_path, \
                    line_start = excluded.line_start, line_end = excluded.line_end, symbol = excluded.symbol, \
                    suggested_fix = excluded.suggested_fix, original_snippet = excluded.original_snippet, \
                    fixed_snippet = excluded.fixed_snippet, confidence = excluded.confidence",
            )
            .bind(finding.id)
            .bind(finding.project_id.0)
            .bind(finding.report_id)
            .bind(&finding.category)
            .bind(severity_to_str(finding.severity))
            .bind(&finding.agent_type)
            .bind(&finding.description)
            .bind(&finding.explanation)
            .bind(&finding.file_path)
            .bind(line_start)
            .bind(line_end)
            .bind(&finding.symbol)
            .bind(&finding.suggested_fix)
            .bind(&finding.original_snippet)
            .bind(&finding.fixed_snippet)
            .bind(finding.confidence)
            .execute(&self.pool)
            .await
            .map_err(|e| Error::Fatal(format!("failed to persist finding: {e}")))?;
        }
        Ok(())
    }

    async fn list_for_project(&self, project_id: ProjectId) -> Result<Vec<ReviewFinding>> {
        let rows = sqlx::query("SELECT * FROM review_findings WHERE project_id = ?")
            .bind(project_id.0)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| Error::Fatal(format!("failed to list findings: {e}")))?;
        rows.iter().map(Self::row_to_finding).collect()
    }
}

#[async_trait]
impl ReportRepository for SqliteRepositories {
    async fn save(&self, report: &Report) -> Result<()> {
        let recommendations_json = serde_json::to_string(&report.recommendations).map_err(|e| Error::Fatal(e.to_string()))?;
        sqlx::query(
            "INSERT INTO reports (\
                id, project_id, health_score, summary, recommendations, critical_count, high_count, \
                medium_count, low_count, info_count, duration_seconds\
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)\
            ON CONFLICT(project_id) DO UPDATE SET \
                id = excluded.id, health_score = excluded.health_score, summary = excluded.summary, \
                recommendations = excluded.recommendations, critical_count = excluded.critical_count, \
                high_count = excluded.high_count, medium_count = excluded.medium_count, \
                low_count = excluded.low_count, info_count = excluded.info_count, \
                duration_seconds = excluded.duration_seconds",
        )
        .bind(report.id)
        .bind(report.project_id.0)
        .bind(i64::from(report.health_score))
        .bind(&report.summary)
        .bind(recommendations_json)
        .bind(report.critical_count as i64)
        .bind(report.high_count as i64)
        .bind(report.medium_count as i64)
        .bind(report.low_count as i64)
        .bind(report.info_count as i64)
        .bind(report.duration_seconds)
        .execute(&self.pool)
        .await
        .map_err(|e| Error::Fatal(format!("failed to persist report: {e}")))?;
        Ok(())
    }

    async fn get_for_project(&self, project_id: ProjectId) -> Result<Option<Report>> {
        let row = sqlx::query("SELECT * FROM reports WHERE project_id = ?")
            .bind(project_id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| Error::Fatal(format!("failed to fetch report: {e}")))?;
        row.as_ref().map(Self::row_to_report).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warden_domain::entities::Chunk;

    async fn store() -> SqliteRepositories {
        SqliteRepositories::connect("sqlite::memory:", 1).await.unwrap()
    }

    #[tokio::test]
    async fn round_trips_a_project() {
        let store = store().await;
        let project = Project::new("demo", SourceKind::Archive);
        store.save(&project).await.unwrap();

        let fetched = ProjectRepository::get(&store, project.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "demo");
        assert_eq!(fetched.status, ProjectStatus::Created);
    }

    #[tokio::test]
    async fn save_is_an_upsert() {
        let store = store().await;
        let mut project = Project::new("demo", SourceKind::Archive);
        store.save(&project).await.unwrap();

        project.transition_to(ProjectStatus::FilesReady).unwrap();
        store.save(&project).await.unwrap();

        let fetched = ProjectRepository::get(&store, project.id).await.unwrap().unwrap();
        assert_eq!(fetched.status, ProjectStatus::FilesReady);
    }

    fn chunk(project_id: ProjectId, file_path: &str) -> Chunk {
        Chunk {
            chunk_hash: ChunkHash::compute(project_id, file_path, "fn a() {}", 1, 1),
            project_id,
            file_path: file_path.to_string(),
            start_line: 1,
            end_line: 1,
            token_count: 5,
            language: "rust".to_string(),
            text_hash: "abc".to_string(),
            content: Some("fn a() {}".to_string()),
            semantic_type: Some(warden_domain::entities::SemanticType::Method),
            semantic_name: Some("a".to_string()),
            chunk_index: 0,
            total_chunks: 1,
        }
    }

    #[tokio::test]
    async fn existing_hashes_reports_only_stored_ones() {
        let store = store().await;
        let project_id = ProjectId::new();
        let c = chunk(project_id, "a.rs");
        store.save_batch(std::slice::from_ref(&c)).await.unwrap();

        let other_hash = ChunkHash::compute(project_id, "b.rs", "fn b() {}", 1, 1);
        let existing = store.existing_hashes(project_id, &[c.chunk_hash, other_hash]).await.unwrap();
        assert_eq!(existing, vec![c.chunk_hash]);
    }

    #[tokio::test]
    async fn chunk_count_reflects_saved_batch() {
        let store = store().await;
        let project_id = ProjectId::new();
        store.save_batch(&[chunk(project_id, "a.rs"), chunk(project_id, "b.rs")]).await.unwrap();
        assert_eq!(store.count(project_id).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn round_trips_a_finding() {
        let store = store().await;
        let project_id = ProjectId::new();
        let finding = ReviewFinding {
            id: uuid::Uuid::new_v4(),
            project_id,
            report_id: None,
            category: "security".to_string(),
            severity: Severity::High,
            agent_type: "security-agent".to_string(),
            description: "hardcoded secret".to_string(),
            explanation: "explanation".to_string(),
            file_path: Some("src/main.rs".to_string()),
            line_range: Some((10, 12)),
            symbol: None,
            suggested_fix: None,
            original_snippet: None,
            fixed_snippet: None,
            confidence: 0.9,
        };
        store.save_batch(std::slice::from_ref(&finding)).await.unwrap();

        let findings = store.list_for_project(project_id).await.unwrap();
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].line_range, Some((10, 12)));
    }

    #[tokio::test]
    async fn round_trips_a_report() {
        let store = store().await;
        let project_id = ProjectId::new();
        let report = Report {
            id: uuid::Uuid::new_v4(),
            project_id,
            health_score: 87,
            summary: "summary".to_string(),
            recommendations: vec!["fix it".to_string()],
            critical_count: 0,
            high_count: 1,
            medium_count: 2,
            low_count: 3,
            info_count: 0,
            duration_seconds: 12.5,
        };
        store.save(&report).await.unwrap();

        let fetched = store.get_for_project(project_id).await.unwrap().unwrap();
        assert_eq!(fetched.health_score, 87);
        assert_eq!(fetched.recommendations, vec!["fix it".to_string()]);
    }
}
