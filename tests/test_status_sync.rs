mod helpers;

use feedbackdesk::errors::MessagingError;
use feedbackdesk::models::{NewTemplate, TemplateCategory, TemplateStatus};
use feedbackdesk::services::{StatusSyncer, SyncResult};
use helpers::*;
use std::sync::Arc;

fn spec(name: &str) -> NewTemplate {
    NewTemplate {
        name: name.to_string(),
        language: Some("en".to_string()),
        category: TemplateCategory::Utility,
        header: None,
        body: format!("Body of {}", name),
        footer: None,
        buttons: Vec::new(),
        automation_trigger: None,
    }
}

#[tokio::test]
async fn successful_registration_links_and_approves() {
    let test_db = setup_test_db().await;
    let db = test_db.db().clone();
    let provider = Arc::new(FakeProvider::new());
    let syncer = StatusSyncer::new(db.clone(), provider.clone());

    db.create_template(spec("greeting")).await.unwrap();
    let (template, provider_error) = syncer.register_with_provider("greeting").await.unwrap();

    assert!(provider_error.is_none());
    assert_eq!(template.status, TemplateStatus::Approved);
    assert_eq!(template.provider_template_name.as_deref(), Some("greeting"));
    assert_eq!(template.provider_template_id.as_deref(), Some("pid-greeting"));

    teardown_test_db(test_db).await;
}

#[tokio::test]
async fn failed_registration_leaves_pending_and_unlinked() {
    let test_db = setup_test_db().await;
    let db = test_db.db().clone();
    let provider = Arc::new(FakeProvider::new());
    provider.fail_create(FakeFailure::Rejected(400, "invalid body".to_string()));
    let syncer = StatusSyncer::new(db.clone(), provider.clone());

    db.create_template(spec("broken")).await.unwrap();
    let (template, provider_error) = syncer.register_with_provider("broken").await.unwrap();

    assert!(provider_error.is_some());
    assert_eq!(template.status, TemplateStatus::Pending);
    // A partial or wrong provider name is never recorded on failure.
    assert!(template.provider_template_name.is_none());
    assert!(template.provider_template_id.is_none());

    teardown_test_db(test_db).await;
}

#[tokio::test]
async fn sync_overwrites_local_status_with_provider_authority() {
    let test_db = setup_test_db().await;
    let db = test_db.db().clone();
    let provider = Arc::new(FakeProvider::new());
    let syncer = StatusSyncer::new(db.clone(), provider.clone());

    db.create_template(spec("contested")).await.unwrap();
    syncer.register_with_provider("contested").await.unwrap();
    assert_eq!(
        db.get_template("contested").await.unwrap().unwrap().status,
        TemplateStatus::Approved
    );

    // Provider later rejects the template.
    provider.remote.lock().unwrap().clear();
    provider.add_remote("contested", "pid-contested", "REJECTED");

    let outcomes = syncer.sync_all().await.unwrap();
    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].outcome, SyncResult::Updated);
    assert_eq!(outcomes[0].detail.as_deref(), Some("REJECTED"));

    let local = db.get_template("contested").await.unwrap().unwrap();
    assert_eq!(local.status, TemplateStatus::Rejected);

    teardown_test_db(test_db).await;
}

#[tokio::test]
async fn sync_matches_unlinked_templates_by_local_name() {
    let test_db = setup_test_db().await;
    let db = test_db.db().clone();
    let provider = Arc::new(FakeProvider::new());
    let syncer = StatusSyncer::new(db.clone(), provider.clone());

    // Created locally, never registered, but present remotely (e.g. created
    // through the provider's own console).
    db.create_template(spec("console_made")).await.unwrap();
    provider.add_remote("console_made", "pid-42", "APPROVED");

    let outcomes = syncer.sync_all().await.unwrap();
    assert_eq!(outcomes[0].outcome, SyncResult::Updated);

    let local = db.get_template("console_made").await.unwrap().unwrap();
    assert_eq!(local.provider_template_name.as_deref(), Some("console_made"));
    assert_eq!(local.provider_template_id.as_deref(), Some("pid-42"));
    assert_eq!(local.status, TemplateStatus::Approved);

    teardown_test_db(test_db).await;
}

#[tokio::test]
async fn sync_reports_templates_missing_from_provider_without_touching_them() {
    let test_db = setup_test_db().await;
    let db = test_db.db().clone();
    let provider = Arc::new(FakeProvider::new());
    let syncer = StatusSyncer::new(db.clone(), provider.clone());

    db.create_template(spec("orphan")).await.unwrap();

    let outcomes = syncer.sync_all().await.unwrap();
    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].outcome, SyncResult::NotFoundInProvider);

    let local = db.get_template("orphan").await.unwrap().unwrap();
    assert_eq!(local.status, TemplateStatus::Unset);
    assert!(local.provider_template_name.is_none());

    teardown_test_db(test_db).await;
}

#[tokio::test]
async fn sync_fails_as_a_whole_only_when_provider_is_unreachable() {
    let test_db = setup_test_db().await;
    let db = test_db.db().clone();
    let provider = Arc::new(FakeProvider::new());
    provider.fail_list(FakeFailure::Network);
    let syncer = StatusSyncer::new(db.clone(), provider.clone());

    db.create_template(spec("whatever")).await.unwrap();

    let err = syncer.sync_all().await.unwrap_err();
    assert!(matches!(err, MessagingError::Network(_)));

    teardown_test_db(test_db).await;
}

#[tokio::test]
async fn repair_links_unlinked_templates_to_their_own_name() {
    let test_db = setup_test_db().await;
    let db = test_db.db().clone();
    let provider = Arc::new(FakeProvider::new());
    let syncer = StatusSyncer::new(db.clone(), provider.clone());

    db.create_template(spec("fixme")).await.unwrap();
    db.create_template(spec("already_linked")).await.unwrap();
    syncer.register_with_provider("already_linked").await.unwrap();

    let outcomes = syncer.repair_missing_linkage().await.unwrap();
    // Only the unlinked template is repaired.
    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].name, "fixme");
    assert_eq!(outcomes[0].outcome, SyncResult::Repaired);

    let repaired = db.get_template("fixme").await.unwrap().unwrap();
    assert_eq!(repaired.provider_template_name.as_deref(), Some("fixme"));
    assert_eq!(repaired.status, TemplateStatus::Approved);

    teardown_test_db(test_db).await;
}
