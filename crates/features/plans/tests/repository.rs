use cplan_database::Database;
use cplan_domain::{PlanDraft, PlanId, PlanPatch, Record, SchoolId, UserId};
use cplan_plans::{PlanError, PlanRepository, Plans};
use serde_json::json;

async fn plans(name: &str) -> Plans {
    let db = Database::builder()
        .url("mem://")
        .session("planner", name)
        .migrations(cplan_plans::MIGRATIONS)
        .init()
        .await
        .expect("connect to mem://");
    cplan_plans::init(db)
}

fn user(key: &str) -> UserId {
    UserId::parse(key).unwrap()
}

#[tokio::test]
async fn insert_then_get_round_trips_nested_fields() {
    let plans = plans("round_trip").await;
    let draft = PlanDraft {
        details: Some("Four year plan".to_owned()),
        tags: vec![json!("cs"), json!({ "minor": ["math", { "credits": 18 }] }), json!(null)],
        years: json!({ "2025": { "fall": ["CS101", "MATH120"], "spring": [] } })
            .as_object()
            .cloned(),
        colorscheme: json!({ "primary": "#0a84ff", "dark": true }).as_object().cloned(),
        public: Some(true),
        school: Some(SchoolId::parse("school:mit").unwrap()),
        ..PlanDraft::new("CS Major", user("u1"))
    };

    let created = plans.repository.insert(draft.clone()).await.unwrap();
    assert_eq!(created.title, "CS Major");
    assert_eq!(created.tags, draft.tags);

    let loaded = plans.repository.get(&created.id).await.unwrap().expect("stored plan");
    assert_eq!(loaded, created);
    assert_eq!(loaded.years, draft.years);
    assert_eq!(loaded.colorscheme, draft.colorscheme);
    assert_eq!(loaded.school.unwrap().to_string(), "school:mit");
}

#[tokio::test]
async fn optional_fields_may_be_omitted() {
    let plans = plans("minimal").await;
    let created = plans.repository.insert(PlanDraft::new("Undeclared", user("u1"))).await.unwrap();

    let loaded = plans.repository.get(&created.id).await.unwrap().unwrap();
    assert_eq!(loaded.details, None);
    assert!(loaded.tags.is_empty());
    assert_eq!(loaded.years, None);
    assert_eq!(loaded.public, None);
    assert!(!loaded.is_public());
    assert_eq!(loaded.user, user("u1"));
}

#[tokio::test]
async fn empty_and_missing_titles_are_rejected_alike() {
    let plans = plans("titles").await;

    let missing = PlanDraft { user: Some(user("u1")), ..PlanDraft::default() };
    let missing = plans.repository.insert(missing).await.unwrap_err();
    let empty = plans.repository.insert(PlanDraft::new("", user("u1"))).await.unwrap_err();

    assert!(matches!(missing, PlanError::Validation { field: "title", .. }));
    assert_eq!(missing.to_string(), empty.to_string());
    assert!(plans.repository.list_by_user(&user("u1")).await.unwrap().is_empty());
}

#[tokio::test]
async fn missing_owner_is_rejected() {
    let plans = plans("owner").await;
    let draft = PlanDraft { title: Some("Orphan".to_owned()), ..PlanDraft::default() };
    let err = plans.repository.insert(draft).await.unwrap_err();
    assert!(matches!(err, PlanError::Validation { field: "user", .. }));
}

#[tokio::test]
async fn store_rejects_writes_that_bypass_validation() {
    let db = Database::builder()
        .url("mem://")
        .session("planner", "raw")
        .migrations(cplan_plans::MIGRATIONS)
        .init()
        .await
        .unwrap();

    let blank = db
        .query("CREATE plan SET uid = 'a', title = '   ', tags = '[]', owner = 'user:u1'")
        .await
        .unwrap()
        .check();
    assert!(blank.is_err());

    let orphan =
        db.query("CREATE plan SET uid = 'b', title = 'Plan', tags = '[]'").await.unwrap().check();
    assert!(orphan.is_err());

    // The same data through the repository is fine.
    let repository = PlanRepository::new(db);
    assert!(repository.insert(PlanDraft::new("Plan", user("u1"))).await.is_ok());
}

#[tokio::test]
async fn update_applies_only_touched_fields() {
    let plans = plans("update").await;
    let draft = PlanDraft {
        details: Some("draft".to_owned()),
        tags: vec![json!("cs")],
        public: Some(true),
        school: Some(SchoolId::parse("mit").unwrap()),
        ..PlanDraft::new("CS Major", user("u1"))
    };
    let created = plans.repository.insert(draft).await.unwrap();

    let patch = PlanPatch {
        title: Some("CS + Math".to_owned()),
        details: Some(None),
        years: Some(json!({ "2026": ["MATH201"] }).as_object().cloned()),
        school: Some(None),
        ..PlanPatch::default()
    };
    let updated = plans.repository.update(&created.id, patch.clone()).await.unwrap();

    let mut expected = created.clone();
    expected.apply(patch);
    assert_eq!(updated, expected);
    assert_eq!(updated.details, None);
    assert_eq!(updated.school, None);
    assert_eq!(updated.tags, vec![json!("cs")]);
    assert!(updated.is_public());

    let loaded = plans.repository.get(&created.id).await.unwrap().unwrap();
    assert_eq!(loaded, updated);
}

#[tokio::test]
async fn update_rejects_blank_title_and_unknown_ids() {
    let plans = plans("update_errors").await;
    let created = plans.repository.insert(PlanDraft::new("Kept", user("u1"))).await.unwrap();

    let blank = PlanPatch { title: Some(String::new()), ..PlanPatch::default() };
    let err = plans.repository.update(&created.id, blank).await.unwrap_err();
    assert!(matches!(err, PlanError::Validation { field: "title", .. }));
    assert_eq!(plans.repository.get(&created.id).await.unwrap().unwrap().title, "Kept");

    let unknown = PlanId::parse("missing").unwrap();
    let patch = PlanPatch { public: Some(Some(true)), ..PlanPatch::default() };
    let err = plans.repository.update(&unknown, patch).await.unwrap_err();
    assert!(matches!(err, PlanError::NotFound { .. }));
    assert!(err.to_string().contains("plan:missing"));

    let err = plans.repository.update(&unknown, PlanPatch::default()).await.unwrap_err();
    assert_eq!(err.kind(), "not_found");
}

#[tokio::test]
async fn delete_reports_whether_a_plan_was_removed() {
    let plans = plans("delete").await;
    let created = plans.repository.insert(PlanDraft::new("Gone soon", user("u1"))).await.unwrap();

    assert!(plans.repository.delete(&created.id).await.unwrap());
    assert!(plans.repository.get(&created.id).await.unwrap().is_none());
    assert!(!plans.repository.delete(&created.id).await.unwrap());
    assert!(!plans.repository.delete(&PlanId::parse("never").unwrap()).await.unwrap());
}

#[tokio::test]
async fn listings_filter_by_owner_and_visibility() {
    let plans = plans("listings").await;
    let repo = &plans.repository;

    repo.insert(PlanDraft { public: Some(true), ..PlanDraft::new("Zoology", user("u1")) })
        .await
        .unwrap();
    repo.insert(PlanDraft::new("Art History", user("u1"))).await.unwrap();
    repo.insert(PlanDraft { public: Some(false), ..PlanDraft::new("Biology", user("u2")) })
        .await
        .unwrap();
    repo.insert(PlanDraft { public: Some(true), ..PlanDraft::new("Chemistry", user("u2")) })
        .await
        .unwrap();

    let titles = |plans: Vec<cplan_domain::Plan>| -> Vec<String> {
        plans.into_iter().map(|p| p.title).collect()
    };

    assert_eq!(titles(repo.list_by_user(&user("u1")).await.unwrap()), ["Art History", "Zoology"]);
    assert_eq!(titles(repo.list_by_user(&user("u2")).await.unwrap()), ["Biology", "Chemistry"]);
    assert!(repo.list_by_user(&user("nobody")).await.unwrap().is_empty());
    assert_eq!(titles(repo.list_public().await.unwrap()), ["Chemistry", "Zoology"]);
}

#[tokio::test]
async fn issued_ids_are_unique_and_qualified() {
    let plans = plans("ids").await;
    let a = plans.repository.insert(PlanDraft::new("A", user("u1"))).await.unwrap();
    let b = plans.repository.insert(PlanDraft::new("B", user("u1"))).await.unwrap();

    assert_ne!(a.id, b.id);
    assert!(a.id.to_string().starts_with("plan:"));
    assert_eq!(a.id.key().len(), 12);
}
