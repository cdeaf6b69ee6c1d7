//! Table names and well-known configuration values.

pub const PLAN: &str = "plan";
pub const USER: &str = "user";
pub const SCHOOL: &str = "school";

/// Database used by regular deployments.
pub const DEFAULT_DATABASE_NAME: &str = "course-planner";
/// Database selected when the `TEST` environment flag is present.
pub const TEST_DATABASE_NAME: &str = "test";
