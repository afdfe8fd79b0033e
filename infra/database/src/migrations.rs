use crate::error::{DatabaseError, DatabaseErrorExt};
use crate::manifest::builtin_migrations;
use fxhash::FxHashMap;
use sha2::{Digest, Sha256};
use surrealdb::Surreal;
use surrealdb::engine::any::Any;
use surrealdb::types::SurrealValue;

/// Idempotent; creates the bookkeeping table before anything is read from it.
const BOOTSTRAP: &str = include_str!("../migrations/0000-bootstrap.surql");

/// One embedded `SurrealQL` script owned by a slice.
#[derive(Debug, Clone, Copy)]
pub struct Migration {
    pub slice: &'static str,
    pub version: &'static str,
    pub script: &'static str,
}

impl Migration {
    #[must_use]
    pub const fn new(slice: &'static str, version: &'static str, script: &'static str) -> Self {
        Self { slice, version, script }
    }

    /// Hex encoded SHA-256 of the script text.
    #[must_use]
    pub fn checksum(&self) -> String {
        hex::encode(Sha256::digest(self.script.as_bytes()))
    }

    fn key(&self) -> String {
        format!("{}:{}", self.slice, self.version)
    }

    fn to_applied(self) -> AppliedMigration {
        AppliedMigration {
            slice: self.slice.to_owned(),
            version: self.version.to_owned(),
            checksum: self.checksum(),
        }
    }
}

#[derive(Debug, Default)]
pub struct MigrationReport {
    pub applied: Vec<AppliedMigration>,
    pub skipped: Vec<AppliedMigration>,
}

#[derive(Debug, Clone, PartialEq, Eq, SurrealValue)]
pub struct AppliedMigration {
    pub slice: String,
    pub version: String,
    pub checksum: String,
}

#[derive(Debug)]
pub(crate) struct MigrationRunner {
    db: Surreal<Any>,
    migrations: Vec<Migration>,
}

impl MigrationRunner {
    pub(crate) fn new(db: Surreal<Any>) -> Self {
        Self { db, migrations: builtin_migrations() }
    }

    #[cfg(test)]
    pub(crate) const fn with_migrations(db: Surreal<Any>, migrations: Vec<Migration>) -> Self {
        Self { db, migrations }
    }

    pub(crate) async fn run(&self) -> Result<MigrationReport, DatabaseError> {
        self.db
            .query(BOOTSTRAP)
            .await
            .context("Bootstrapping migration table")?
            .check()
            .map_err(surrealdb::Error::from)?;

        let mut report = MigrationReport::default();
        let applied = self.applied_migrations().await?;

        for migration in &self.migrations {
            if let Some(existing) = applied.get(&migration.key()) {
                ensure_checksum_match(migration, &existing.checksum)?;
                report.skipped.push(migration.to_applied());
                continue;
            }

            self.apply(migration).await?;
            report.applied.push(migration.to_applied());
        }

        Ok(report)
    }

    async fn apply(&self, migration: &Migration) -> Result<(), DatabaseError> {
        let query = format!(
            "BEGIN TRANSACTION;
            {}
            CREATE migration CONTENT {{
                slice: $slice,
                version: $version,
                checksum: $checksum,
                applied_at: $applied_at
            }};
            COMMIT TRANSACTION;",
            migration.script,
        );

        self.db
            .query(query)
            .bind(("slice", migration.slice))
            .bind(("version", migration.version))
            .bind(("checksum", migration.checksum()))
            .bind(("applied_at", chrono::Utc::now().timestamp_millis()))
            .await
            .context(format!("SQL execution failed at {}", migration.key()))?
            .check()
            .map_err(|e| DatabaseError::Migration {
                message: surrealdb::Error::from(e).to_string().into(),
                context: Some(migration.key().into()),
            })?;

        Ok(())
    }

    async fn applied_migrations(&self) -> Result<FxHashMap<String, AppliedMigration>, DatabaseError> {
        let entries = self
            .db
            .query("SELECT slice, version, checksum FROM migration")
            .await
            .context("Loading applied migrations")?
            .take::<Vec<AppliedMigration>>(0)
            .context("Parsing applied migrations")?;

        Ok(entries
            .into_iter()
            .map(|entry| (format!("{}:{}", entry.slice, entry.version), entry))
            .collect())
    }
}

fn ensure_checksum_match(migration: &Migration, existing: &str) -> Result<(), DatabaseError> {
    let checksum = migration.checksum();
    if existing != checksum {
        return Err(DatabaseError::Migration {
            message: format!(
                "Checksum mismatch for {} (recorded {existing}, embedded {checksum})",
                migration.key()
            )
            .into(),
            context: Some("Migration already applied with different content".into()),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use surrealdb::engine::any::connect;

    async fn memory() -> Surreal<Any> {
        let db = connect("mem://").await.unwrap();
        db.use_ns("test").use_db("migrations").await.unwrap();
        db
    }

    const NOTES_V1: Migration =
        Migration::new("notes", "0001-init", "DEFINE TABLE note SCHEMAFULL; DEFINE FIELD body ON note TYPE string;");

    #[test]
    fn checksum_is_sha256_hex() {
        let migration = Migration::new("notes", "0001", "");
        assert_eq!(
            migration.checksum(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[tokio::test]
    async fn second_run_skips_applied_scripts() {
        let db = memory().await;

        let first = MigrationRunner::with_migrations(db.clone(), vec![NOTES_V1]).run().await.unwrap();
        assert_eq!(first.applied.len(), 1);
        assert!(first.skipped.is_empty());

        let second = MigrationRunner::with_migrations(db, vec![NOTES_V1]).run().await.unwrap();
        assert!(second.applied.is_empty());
        assert_eq!(second.skipped, vec![NOTES_V1.to_applied()]);
    }

    #[tokio::test]
    async fn edited_script_is_rejected() {
        let db = memory().await;
        MigrationRunner::with_migrations(db.clone(), vec![NOTES_V1]).run().await.unwrap();

        let edited = Migration::new("notes", "0001-init", "DEFINE TABLE note SCHEMALESS;");
        let err = MigrationRunner::with_migrations(db, vec![edited]).run().await.unwrap_err();
        assert!(matches!(err, DatabaseError::Migration { .. }));
    }

    #[tokio::test]
    async fn failing_script_leaves_no_record() {
        let db = memory().await;
        let broken = Migration::new("notes", "0002-broken", "THIS IS NOT SURREALQL;");

        let err = MigrationRunner::with_migrations(db.clone(), vec![broken]).run().await;
        assert!(err.is_err());

        let applied = MigrationRunner::with_migrations(db, vec![]).applied_migrations().await.unwrap();
        assert!(applied.is_empty());
    }
}
