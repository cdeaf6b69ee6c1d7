use crate::error::{PlanError, PlanErrorExt};
use crate::validation::Validate;
use cplan_database::{Database, DatabaseErrorExt};
use cplan_domain::plan::Document;
use cplan_domain::{Plan, PlanDraft, PlanId, PlanPatch, Record, SchoolId, UserId};
use cplan_kernel::safe_nanoid;
use cplan_kernel::security::resource::ResourceGuard;
use serde_json::Value;
use surrealdb::types::SurrealValue;
use tracing::{debug, instrument};

/// Explicit projection; the engine-assigned record id never leaves the store.
const COLUMNS: &str = "uid, title, details, tags, years, colorscheme, public, school, owner";

/// Stored shape of a plan.
///
/// `uid` is the bare key of the [`PlanId`]; `owner` and `school` keep the qualified form.
/// Schema-less fields are JSON text so nested structures round-trip untouched.
#[derive(Debug, Clone, SurrealValue)]
struct PlanRecord {
    uid: String,
    title: String,
    details: Option<String>,
    tags: String,
    years: Option<String>,
    colorscheme: Option<String>,
    public: Option<bool>,
    school: Option<String>,
    owner: String,
}

impl PlanRecord {
    fn from_plan(plan: &Plan) -> Result<Self, PlanError> {
        Ok(Self {
            uid: plan.id.key().to_owned(),
            title: plan.title.clone(),
            details: plan.details.clone(),
            tags: encode_tags(&plan.tags)?,
            years: encode_document(plan.years.as_ref())?,
            colorscheme: encode_document(plan.colorscheme.as_ref())?,
            public: plan.public,
            school: plan.school.as_ref().map(SchoolId::qualified),
            owner: plan.user.qualified(),
        })
    }

    fn into_plan(self) -> Result<Plan, PlanError> {
        Ok(Plan {
            id: ResourceGuard::verify::<PlanId>(&self.uid).context("Stored plan id")?,
            title: self.title,
            details: self.details,
            tags: serde_json::from_str::<Vec<Value>>(&self.tags).context("Decoding tags")?,
            years: decode_document(self.years.as_deref()).context("Decoding years")?,
            colorscheme: decode_document(self.colorscheme.as_deref())
                .context("Decoding colorscheme")?,
            public: self.public,
            school: self
                .school
                .as_deref()
                .map(ResourceGuard::verify::<SchoolId>)
                .transpose()
                .context("Stored school id")?,
            user: ResourceGuard::verify::<UserId>(&self.owner).context("Stored owner")?,
        })
    }
}

/// SurrealDB-backed store of [`Plan`] documents.
///
/// Cheap to clone; every clone shares the same connection.
#[derive(Debug, Clone)]
pub struct PlanRepository {
    db: Database,
}

impl PlanRepository {
    #[must_use]
    pub const fn new(db: Database) -> Self {
        Self { db }
    }

    /// Validates the draft, issues a fresh id and persists the plan.
    ///
    /// # Errors
    /// * [`PlanError::Validation`] if the title is missing or blank, or the owner is missing.
    /// * [`PlanError::Database`] if the store rejects the write.
    #[instrument(skip_all, fields(title = draft.title.as_deref()))]
    pub async fn insert(&self, draft: PlanDraft) -> Result<Plan, PlanError> {
        let plan = draft.validate()?.into_plan(PlanId::from_key_unchecked(safe_nanoid!()));
        let record = PlanRecord::from_plan(&plan)?;

        self.db
            .query("CREATE plan CONTENT $record RETURN NONE")
            .bind(("record", record))
            .await
            .context("Creating plan")?
            .check()
            .map_err(surrealdb::Error::from)
            .context("Plan rejected by store")?;

        debug!(id = %plan.id, user = %plan.user, "Plan created");
        Ok(plan)
    }

    /// # Errors
    /// Returns an error if the query fails or the stored document no longer decodes.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn get(&self, id: &PlanId) -> Result<Option<Plan>, PlanError> {
        let sql = format!("SELECT {COLUMNS} FROM plan WHERE uid = $uid LIMIT 1");
        let records = self
            .db
            .query(&sql)
            .bind(("uid", id.key().to_owned()))
            .await
            .context("Loading plan")?
            .take::<Vec<PlanRecord>>(0)
            .context("Parsing plan")?;

        records.into_iter().next().map(PlanRecord::into_plan).transpose()
    }

    /// Applies an edit in a single statement and returns the updated plan.
    ///
    /// # Errors
    /// * [`PlanError::Validation`] if the edit blanks the title.
    /// * [`PlanError::NotFound`] if no plan has this id.
    /// * [`PlanError::Database`] if the store rejects the write.
    #[instrument(skip(self, patch), fields(id = %id))]
    pub async fn update(&self, id: &PlanId, patch: PlanPatch) -> Result<Plan, PlanError> {
        patch.validate()?;

        let assignments = assignments(&patch);
        if assignments.is_empty() {
            return self.get(id).await?.ok_or_else(|| not_found(id));
        }

        let PlanPatch { title, details, tags, years, colorscheme, public, school } = patch;
        let tags = tags.as_deref().map(encode_tags).transpose()?;
        let years = years.flatten();
        let colorscheme = colorscheme.flatten();

        let sql = format!(
            "UPDATE plan SET {} WHERE uid = $uid RETURN NONE;
            SELECT {COLUMNS} FROM plan WHERE uid = $uid LIMIT 1;",
            assignments.join(", "),
        );

        let records = self
            .db
            .query(&sql)
            .bind(("uid", id.key().to_owned()))
            .bind(("title", title))
            .bind(("details", details.flatten()))
            .bind(("tags", tags))
            .bind(("years", encode_document(years.as_ref())?))
            .bind(("colorscheme", encode_document(colorscheme.as_ref())?))
            .bind(("public", public.flatten()))
            .bind(("school", school.flatten().as_ref().map(SchoolId::qualified)))
            .await
            .context("Updating plan")?
            .check()
            .map_err(surrealdb::Error::from)
            .context("Plan update rejected by store")?
            .take::<Vec<PlanRecord>>(1)
            .context("Parsing updated plan")?;

        let plan = records.into_iter().next().ok_or_else(|| not_found(id))?.into_plan()?;
        debug!(fields = ?assignments, "Plan updated");
        Ok(plan)
    }

    /// Returns `true` when a plan was removed.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn delete(&self, id: &PlanId) -> Result<bool, PlanError> {
        let removed = self
            .db
            .query(
                "SELECT VALUE uid FROM plan WHERE uid = $uid;
                DELETE plan WHERE uid = $uid RETURN NONE;",
            )
            .bind(("uid", id.key().to_owned()))
            .await
            .context("Deleting plan")?
            .check()
            .map_err(surrealdb::Error::from)
            .context("Plan delete rejected by store")?
            .take::<Vec<String>>(0)
            .context("Parsing deleted plan")?;

        debug!(removed = !removed.is_empty(), "Plan delete finished");
        Ok(!removed.is_empty())
    }

    /// All plans owned by `user`, ordered by title.
    ///
    /// # Errors
    /// Returns an error if the query fails or a stored document no longer decodes.
    #[instrument(skip(self), fields(user = %user))]
    pub async fn list_by_user(&self, user: &UserId) -> Result<Vec<Plan>, PlanError> {
        let sql = format!("SELECT {COLUMNS} FROM plan WHERE owner = $owner ORDER BY title");
        let records = self
            .db
            .query(&sql)
            .bind(("owner", user.qualified()))
            .await
            .context("Listing plans by owner")?
            .take::<Vec<PlanRecord>>(0)
            .context("Parsing plans")?;

        records.into_iter().map(PlanRecord::into_plan).collect()
    }

    /// All plans flagged public, ordered by title. Plans with an unset flag are private.
    ///
    /// # Errors
    /// Returns an error if the query fails or a stored document no longer decodes.
    #[instrument(skip(self))]
    pub async fn list_public(&self) -> Result<Vec<Plan>, PlanError> {
        let sql = format!("SELECT {COLUMNS} FROM plan WHERE public = true ORDER BY title");
        let records = self
            .db
            .query(&sql)
            .await
            .context("Listing public plans")?
            .take::<Vec<PlanRecord>>(0)
            .context("Parsing plans")?;

        records.into_iter().map(PlanRecord::into_plan).collect()
    }
}

/// `SET` clauses for the fields an edit touches.
fn assignments(patch: &PlanPatch) -> Vec<&'static str> {
    [
        (patch.title.is_some(), "title = $title"),
        (patch.details.is_some(), "details = $details"),
        (patch.tags.is_some(), "tags = $tags"),
        (patch.years.is_some(), "years = $years"),
        (patch.colorscheme.is_some(), "colorscheme = $colorscheme"),
        (patch.public.is_some(), "public = $public"),
        (patch.school.is_some(), "school = $school"),
    ]
    .into_iter()
    .filter_map(|(touched, clause)| touched.then_some(clause))
    .collect()
}

fn not_found(id: &PlanId) -> PlanError {
    PlanError::NotFound { id: id.to_string(), context: None }
}

fn encode_tags(tags: &[Value]) -> Result<String, PlanError> {
    serde_json::to_string(tags).context("Encoding tags")
}

fn encode_document(document: Option<&Document>) -> Result<Option<String>, PlanError> {
    document.map(serde_json::to_string).transpose().context("Encoding document")
}

fn decode_document(raw: Option<&str>) -> Result<Option<Document>, serde_json::Error> {
    raw.map(serde_json::from_str::<Document>).transpose()
}
