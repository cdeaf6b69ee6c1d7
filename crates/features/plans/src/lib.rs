//! Plan feature slice: the validation contract for course plans and their
//! SurrealDB-backed repository.
//!
//! ```rust,no_run
//! use cplan_database::Database;
//! use cplan_domain::{PlanDraft, Record, UserId};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let db = Database::builder()
//!     .url("mem://")
//!     .session("planner", "course-planner")
//!     .migrations(cplan_plans::MIGRATIONS)
//!     .init()
//!     .await?;
//!
//! let plans = cplan_plans::init(db);
//! let plan = plans.repository.insert(PlanDraft::new("CS Major", UserId::parse("u1")?)).await?;
//! assert!(!plan.is_public());
//! # Ok(())
//! # }
//! ```

mod error;
mod repository;
mod validation;

pub use error::{PlanError, PlanErrorExt};
pub use repository::PlanRepository;
pub use validation::{Validate, ValidPlan};

use cplan_database::{Database, Migration};
use std::ops::Deref;
use std::sync::Arc;

/// Schema owned by this slice, in application order.
pub const MIGRATIONS: [Migration; 1] =
    [Migration::new("plans", "0001", include_str!("../migrations/0001_plan.surql"))];

/// Plans feature state.
#[derive(Debug, Clone)]
pub struct PlansInner {
    pub repository: PlanRepository,
}

#[derive(Debug, Clone)]
pub struct Plans {
    inner: Arc<PlansInner>,
}

impl Plans {
    #[must_use]
    pub fn new(inner: PlansInner) -> Self {
        Self { inner: Arc::new(inner) }
    }
}

impl Deref for Plans {
    type Target = PlansInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

/// Initialize the plans feature over an open database.
///
/// The database must have been initialized with [`MIGRATIONS`].
#[must_use]
pub fn init(database: Database) -> Plans {
    tracing::info!(
        namespace = database.namespace(),
        database = database.name(),
        "Plans slice initialized"
    );

    Plans::new(PlansInner { repository: PlanRepository::new(database) })
}
