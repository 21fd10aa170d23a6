use crate::helpers::TestApp;
use fake::faker::internet::en::SafeEmail;
use fake::Fake;

#[tokio::test]
async fn unsubscribe_returns_200_and_persists_the_email() {
    let test_app = TestApp::spawn_app().await;
    let body = [("email", "Jane@Lab.org"), ("reason", "Too many emails")];

    let response = test_app.post_unsubscribe(&body).await;

    assert_eq!(200, response.status().as_u16());
    assert!(response
        .text()
        .await
        .unwrap()
        .contains("You have been unsubscribed"));

    let stored = test_app.stored_csv();
    assert!(stored.starts_with("email,reason,timestamp"));
    assert!(stored.contains("jane@lab.org,Too many emails,"));
}

#[tokio::test]
async fn unsubscribe_writes_every_configured_location() {
    let test_app = TestApp::spawn_app().await;
    let email: String = SafeEmail().fake();

    test_app.post_unsubscribe(&[("email", email.as_str())]).await;

    assert!(test_app.primary_path().exists());
    assert!(test_app.fallback_path().exists());

    let mirror = std::fs::read_to_string(test_app.json_mirror_path()).unwrap();
    let records: serde_json::Value = serde_json::from_str(&mirror).unwrap();
    assert_eq!(records[0]["email"], email.to_lowercase());
    assert_eq!(records[0]["reason"], "Not specified");
}

#[tokio::test]
async fn unsubscribing_twice_keeps_a_single_record() {
    let test_app = TestApp::spawn_app().await;

    test_app.post_unsubscribe(&[("email", "jane@lab.org")]).await;
    let response = test_app
        .post_unsubscribe(&[("email", "  JANE@lab.org ")])
        .await;

    assert_eq!(200, response.status().as_u16());
    assert!(response
        .text()
        .await
        .unwrap()
        .contains("already unsubscribed"));
    assert_eq!(test_app.stored_csv().matches("jane@lab.org").count(), 1);
}

#[tokio::test]
async fn unsubscribe_returns_400_when_email_is_invalid() {
    let test_app = TestApp::spawn_app().await;
    let test_cases = vec![
        (vec![("email", "")], "empty email"),
        (vec![("email", "definitely-not-an-email")], "invalid email"),
        (vec![("reason", "no email at all")], "missing email"),
    ];

    for (body, description) in test_cases {
        let response = test_app.post_unsubscribe(&body).await;

        assert_eq!(
            400,
            response.status().as_u16(),
            "The API did not fail with 400 Bad Request when the payload was {}.",
            description
        );
    }

    assert!(!test_app.primary_path().exists());
}

#[tokio::test]
async fn existing_fallback_records_survive_a_new_unsubscribe() {
    let test_app = TestApp::spawn_app().await;
    std::fs::create_dir_all(test_app.fallback_path().parent().unwrap()).unwrap();
    std::fs::write(
        test_app.fallback_path(),
        "email,reason,timestamp\nold@lab.org,Moved on,2024-01-01 09:00:00\n",
    )
    .unwrap();

    test_app.post_unsubscribe(&[("email", "new@lab.org")]).await;

    let stored = test_app.stored_csv();
    assert!(stored.contains("old@lab.org,Moved on,2024-01-01 09:00:00"));
    assert!(stored.contains("new@lab.org"));
}
