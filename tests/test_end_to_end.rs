mod helpers;

use feedbackdesk::models::{NewTemplate, SendStatus, TemplateButton, TemplateCategory};
use feedbackdesk::services::composer::preview;
use feedbackdesk::services::{SendPipeline, StatusSyncer, TriggerRegistry};
use helpers::*;
use std::collections::HashMap;
use std::sync::Arc;

fn values(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[tokio::test]
async fn order_update_lifecycle() {
    let test_db = setup_test_db().await;
    let db = test_db.db().clone();
    let provider = Arc::new(FakeProvider::new());
    let syncer = StatusSyncer::new(db.clone(), provider.clone());
    let pipeline = SendPipeline::new(db.clone(), provider.clone());

    // Create: variables are derived from body and button URL.
    let template = db
        .create_template(NewTemplate {
            name: "order_update".to_string(),
            language: Some("en".to_string()),
            category: TemplateCategory::Utility,
            header: None,
            body: "Order {{order_id}} is {{status}}".to_string(),
            footer: None,
            buttons: vec![TemplateButton {
                text: "Track".to_string(),
                url: "https://t/{{order_id}}".to_string(),
            }],
            automation_trigger: Some("order_status_changed".to_string()),
        })
        .await
        .unwrap();
    assert_eq!(template.variables, vec!["order_id", "status"]);

    // Register and approve remotely.
    let (template, provider_error) = syncer.register_with_provider("order_update").await.unwrap();
    assert!(provider_error.is_none());
    assert!(template.is_sendable());

    // Preview renders body and button with substitutions.
    let vars = values(&[("order_id", "42"), ("status", "shipped")]);
    assert_eq!(
        preview(&template, &vars),
        "Order 42 is shipped\n\nTrack: https://t/42"
    );

    // Send: BODY parameters follow template variable order.
    let record = pipeline
        .send_template("15551234", "order_update", &vars, false)
        .await
        .unwrap();
    assert_eq!(record.status, SendStatus::Sent);

    let call = provider.sent.lock().unwrap()[0].clone();
    let body = call
        .components
        .iter()
        .find(|c| c.component_type == "BODY")
        .unwrap();
    let params: Vec<&str> = body.parameters.iter().map(|p| p.text.as_str()).collect();
    assert_eq!(params, vec!["42", "shipped"]);

    teardown_test_db(test_db).await;
}

#[tokio::test]
async fn automation_trigger_resolves_and_sends() {
    let test_db = setup_test_db().await;
    let db = test_db.db().clone();
    let provider = Arc::new(FakeProvider::new());
    let syncer = StatusSyncer::new(db.clone(), provider.clone());
    let pipeline = SendPipeline::new(db.clone(), provider.clone());
    let triggers = TriggerRegistry::new(db.clone());

    db.create_template(NewTemplate {
        name: "review_nudge".to_string(),
        language: Some("en".to_string()),
        category: TemplateCategory::Marketing,
        header: None,
        body: "Hi {{name}}, tell us how it went".to_string(),
        footer: None,
        buttons: Vec::new(),
        automation_trigger: Some("feedback_requested".to_string()),
    })
    .await
    .unwrap();
    syncer.register_with_provider("review_nudge").await.unwrap();

    let resolved = triggers.resolve("feedback_requested").await.unwrap();
    assert_eq!(resolved.name, "review_nudge");

    let (record, template_used) = triggers
        .send_for_trigger(
            &pipeline,
            "feedback_requested",
            "15559999",
            &values(&[("name", "Asha")]),
        )
        .await
        .unwrap();

    assert_eq!(template_used, "review_nudge");
    assert_eq!(record.status, SendStatus::Sent);
    assert_eq!(provider.sent_count(), 1);

    let err = triggers.resolve("unknown_trigger").await.unwrap_err();
    assert!(matches!(
        err,
        feedbackdesk::errors::MessagingError::NotFound(_)
    ));

    teardown_test_db(test_db).await;
}
