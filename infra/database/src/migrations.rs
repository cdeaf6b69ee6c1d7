use crate::error::{DatabaseError, DatabaseErrorExt};
use fxhash::{FxHashMap, FxHashSet};
use sha2::{Digest, Sha256};
use surrealdb::Surreal;
use surrealdb::engine::any::Any;
use surrealdb::types::SurrealValue;

/// Ledger of applied migrations, created before anything else runs.
const BOOTSTRAP: &str = "
    DEFINE TABLE OVERWRITE migration SCHEMAFULL;
    DEFINE FIELD OVERWRITE slice ON migration TYPE string;
    DEFINE FIELD OVERWRITE version ON migration TYPE string;
    DEFINE FIELD OVERWRITE checksum ON migration TYPE string;
    DEFINE INDEX OVERWRITE migration_key ON migration FIELDS slice, version UNIQUE;
";

/// A versioned schema script owned by a feature slice.
///
/// Scripts are applied once, in the order given, inside a transaction together with
/// their ledger entry. Editing an applied script is detected through its checksum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
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

    /// Hex-encoded SHA-256 of the script.
    #[must_use]
    pub fn checksum(&self) -> String {
        hex::encode(Sha256::digest(self.script.as_bytes()))
    }

    fn ledger_key(&self) -> String {
        format!("{}:{}", self.slice, self.version)
    }
}

/// Outcome of a migration run.
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

impl From<&Migration> for AppliedMigration {
    fn from(m: &Migration) -> Self {
        Self { slice: m.slice.to_owned(), version: m.version.to_owned(), checksum: m.checksum() }
    }
}

#[derive(Debug)]
pub(crate) struct MigrationRunner<'a> {
    db: &'a Surreal<Any>,
}

impl<'a> MigrationRunner<'a> {
    #[must_use]
    pub(crate) const fn new(db: &'a Surreal<Any>) -> Self {
        Self { db }
    }

    pub(crate) async fn run(&self, migrations: &[Migration]) -> Result<MigrationReport, DatabaseError> {
        ensure_unique(migrations)?;

        self.db
            .query(BOOTSTRAP)
            .await
            .context("Bootstrapping migration ledger")?
            .check()
            .map_err(surrealdb::Error::from)
            .context("Bootstrapping migration ledger")?;

        let applied = self.applied_map().await?;
        let mut report = MigrationReport::default();

        for migration in migrations {
            if let Some(existing) = applied.get(&migration.ledger_key()) {
                ensure_checksum_match(migration, &existing.checksum)?;
                report.skipped.push(migration.into());
                continue;
            }

            self.apply(migration).await?;
            report.applied.push(migration.into());
        }

        Ok(report)
    }

    async fn apply(&self, migration: &Migration) -> Result<(), DatabaseError> {
        let query = format!(
            "BEGIN TRANSACTION;
            {}
            CREATE migration CONTENT {{ slice: $slice, version: $version, checksum: $checksum }} RETURN NONE;
            COMMIT TRANSACTION;",
            migration.script,
        );

        self.db
            .query(&query)
            .bind(("slice", migration.slice))
            .bind(("version", migration.version))
            .bind(("checksum", migration.checksum()))
            .await
            .context(format!("SQL execution failed at {}", migration.ledger_key()))?
            .check()
            .map_err(surrealdb::Error::from)
            .context(format!("Migration {} rejected", migration.ledger_key()))?;

        Ok(())
    }

    async fn applied_map(&self) -> Result<FxHashMap<String, AppliedMigration>, DatabaseError> {
        let entries = self
            .db
            .query("SELECT slice, version, checksum FROM migration")
            .await
            .context("Loading applied migrations")?
            .take::<Vec<AppliedMigration>>(0)
            .context("Parsing migrations ledger")?;

        Ok(entries
            .into_iter()
            .map(|entry| (format!("{}:{}", entry.slice, entry.version), entry))
            .collect())
    }
}

fn ensure_unique(migrations: &[Migration]) -> Result<(), DatabaseError> {
    let mut seen = FxHashSet::default();
    for migration in migrations {
        if !seen.insert(migration.ledger_key()) {
            return Err(DatabaseError::Migration {
                message: format!("Duplicate migration {}", migration.ledger_key()).into(),
                context: Some("Validating migration set".into()),
            });
        }
    }
    Ok(())
}

fn ensure_checksum_match(migration: &Migration, existing: &str) -> Result<(), DatabaseError> {
    let expected = migration.checksum();
    if existing != expected {
        return Err(DatabaseError::Migration {
            message: format!(
                "Checksum mismatch for {} (applied {existing}, now {expected})",
                migration.ledger_key()
            )
            .into(),
            context: Some("Migration already applied with different checksum".into()),
        });
    }
    Ok(())
}
