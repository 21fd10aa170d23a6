use std::path::Path;

use crate::helpers::TestApp;

#[tokio::test]
async fn admin_rejects_a_wrong_password() {
    let test_app = TestApp::spawn_app().await;
    test_app.post_unsubscribe(&[("email", "jane@lab.org")]).await;

    let response = test_app
        .post_form("/admin", &[("password", "guess")])
        .await;

    assert_eq!(401, response.status().as_u16());
    let body = response.text().await.unwrap();
    assert!(body.contains("Incorrect password."));
    assert!(!body.contains("jane@lab.org"));
}

#[tokio::test]
async fn every_admin_action_requires_the_password() {
    let test_app = TestApp::spawn_app().await;
    let endpoints = vec![
        ("/admin/add", vec![("email", "a@lab.org")]),
        ("/admin/remove", vec![("emails", "a@lab.org")]),
        ("/admin/clear", vec![("confirm", "yes")]),
        ("/admin/import", vec![("csv", "email\na@lab.org\n")]),
        ("/admin/export", vec![("format", "csv")]),
    ];

    for (path, mut body) in endpoints {
        body.push(("password", "guess"));
        let response = test_app.post_form(path, &body).await;

        assert_eq!(401, response.status().as_u16(), "{} accepted a wrong password", path);
    }

    assert!(!test_app.primary_path().exists());
}

#[tokio::test]
async fn admin_dashboard_lists_unsubscribed_emails() {
    let test_app = TestApp::spawn_app().await;
    test_app
        .post_unsubscribe(&[("email", "jane@lab.org"), ("reason", "Too many")])
        .await;

    let response = test_app.post_admin("/admin", &[]).await;

    assert_eq!(200, response.status().as_u16());
    let body = response.text().await.unwrap();
    assert!(body.contains("Unsubscribed emails (1)"));
    assert!(body.contains("jane@lab.org"));
    assert!(body.contains("Too many"));
}

#[tokio::test]
async fn admin_can_add_and_remove_emails() {
    let test_app = TestApp::spawn_app().await;

    let added = test_app
        .post_admin("/admin/add", &[("email", "a@lab.org"), ("reason", "")])
        .await;
    assert_eq!(200, added.status().as_u16());
    test_app.post_admin("/admin/add", &[("email", "b@lab.org")]).await;

    let removed = test_app
        .post_admin("/admin/remove", &[("emails", "A@lab.org, missing@lab.org")])
        .await
        .text()
        .await
        .unwrap();

    assert!(removed.contains("Removed 1 emails."));
    assert!(removed.contains("Unsubscribed emails (1)"));
    let stored = test_app.stored_csv();
    assert!(!stored.contains("a@lab.org"));
    assert!(stored.contains("b@lab.org,Not specified,"));
}

#[tokio::test]
async fn clear_needs_the_confirmation_box() {
    let test_app = TestApp::spawn_app().await;
    test_app.post_unsubscribe(&[("email", "jane@lab.org")]).await;

    let unconfirmed = test_app.post_admin("/admin/clear", &[]).await;
    assert_eq!(200, unconfirmed.status().as_u16());
    assert!(test_app.stored_csv().contains("jane@lab.org"));

    let confirmed = test_app
        .post_admin("/admin/clear", &[("confirm", "yes")])
        .await
        .text()
        .await
        .unwrap();
    assert!(confirmed.contains("Unsubscribed emails (0)"));
    assert_eq!(test_app.stored_csv().trim(), "email,reason,timestamp");
}

#[tokio::test]
async fn import_merges_only_new_valid_emails() {
    let test_app = TestApp::spawn_app().await;
    test_app.post_unsubscribe(&[("email", "jane@lab.org")]).await;
    let csv = "name,contact\nJane,JANE@lab.org\nJohn,john@lab.org\nAnn,ann@lab.org\nBob,n/a\n";

    let body = test_app
        .post_admin("/admin/import", &[("csv", csv)])
        .await
        .text()
        .await
        .unwrap();

    assert!(body.contains("Imported 2 new emails from column"));
    assert!(body.contains("contact"));
    assert!(body.contains("Unsubscribed emails (3)"));
    assert!(test_app.stored_csv().contains("ann@lab.org,imported,"));
}

#[tokio::test]
async fn import_without_an_email_column_leaves_the_list_alone() {
    let test_app = TestApp::spawn_app().await;
    test_app.post_unsubscribe(&[("email", "jane@lab.org")]).await;

    let response = test_app
        .post_admin("/admin/import", &[("csv", "name,city\nJane,Paris\n")])
        .await;

    assert_eq!(200, response.status().as_u16());
    assert!(response
        .text()
        .await
        .unwrap()
        .contains("Unsubscribed emails (1)"));
}

#[tokio::test]
async fn export_downloads_the_list_as_csv_or_json() {
    let test_app = TestApp::spawn_app().await;
    test_app
        .post_unsubscribe(&[("email", "jane@lab.org"), ("reason", "Done")])
        .await;

    let csv = test_app
        .post_admin("/admin/export", &[("format", "csv")])
        .await;
    assert_eq!(200, csv.status().as_u16());
    assert_eq!(
        csv.headers()["content-type"].to_str().unwrap(),
        "text/csv; charset=utf-8"
    );
    assert!(csv.headers()["content-disposition"]
        .to_str()
        .unwrap()
        .contains("unsubscribed.csv"));
    let csv_body = csv.text().await.unwrap();
    assert!(csv_body.starts_with("email,reason,timestamp\njane@lab.org,Done,"));

    let json = test_app
        .post_admin("/admin/export", &[("format", "json")])
        .await;
    assert_eq!(json.headers()["content-type"].to_str().unwrap(), "application/json");
    let records: serde_json::Value = json.json().await.unwrap();
    assert_eq!(records[0]["email"], "jane@lab.org");
    assert_eq!(records[0]["reason"], "Done");
}

#[tokio::test]
async fn dashboard_escapes_submitted_reasons() {
    let test_app = TestApp::spawn_app().await;
    test_app
        .post_unsubscribe(&[("email", "jane@lab.org"), ("reason", "<script>alert(1)</script>")])
        .await;

    let body = test_app.post_admin("/admin", &[]).await.text().await.unwrap();

    assert!(body.contains("&lt;script&gt;alert(1)"));
    assert!(!body.contains("<script>alert(1)"));
}

#[tokio::test]
async fn failed_save_shows_the_list_as_stored() {
    let test_app = TestApp::spawn_with(|config| {
        // A regular file where the primary's directory should be makes every save fail
        let dir = Path::new(&config.storage.primary)
            .parent()
            .unwrap()
            .to_path_buf();
        std::fs::write(dir.join("blocker"), "not a directory").unwrap();
        config.storage.primary = dir
            .join("blocker")
            .join("unsubscribed.csv")
            .to_string_lossy()
            .into_owned();
    })
    .await;
    std::fs::create_dir_all(test_app.fallback_path().parent().unwrap()).unwrap();
    std::fs::write(
        test_app.fallback_path(),
        "email,reason,timestamp\njane@lab.org,Moved on,2024-01-01 09:00:00\n",
    )
    .unwrap();

    let body = test_app
        .post_admin("/admin/clear", &[("confirm", "yes")])
        .await
        .text()
        .await
        .unwrap();

    assert!(body.contains("Failed to save the unsubscribe list."));
    assert!(body.contains("Unsubscribed emails (1)"));
    assert!(body.contains("jane@lab.org"));
}
