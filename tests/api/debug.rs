use crate::helpers::TestApp;

#[tokio::test]
async fn debug_view_shows_storage_locations_and_records() {
    let test_app = TestApp::spawn_app().await;
    test_app.post_unsubscribe(&[("email", "jane@lab.org")]).await;

    let response = test_app.get_page("?debug").await;

    assert_eq!(200, response.status().as_u16());
    let body = response.text().await.unwrap();
    assert!(body.contains("Working directory"));
    assert!(body.contains("unsubscribed.json"));
    assert!(body.contains("Records (1)"));
    assert!(body.contains("jane@lab.org"));
}

#[tokio::test]
async fn debug_view_is_hidden_when_disabled() {
    let test_app = TestApp::spawn_with(|config| config.set_debug_view(false)).await;

    assert_eq!(404, test_app.get_page("?debug").await.status().as_u16());

    for path in ["/debug/save", "/debug/delete", "/debug/add", "/debug/upload"] {
        let response = test_app
            .post_form(path, &[("csv", "email\na@lab.org\n"), ("email", "a@lab.org")])
            .await;

        assert_eq!(404, response.status().as_u16(), "{} was reachable", path);
    }

    assert!(!test_app.primary_path().exists());
}

#[tokio::test]
async fn debug_save_replaces_the_whole_list() {
    let test_app = TestApp::spawn_app().await;
    test_app.post_unsubscribe(&[("email", "jane@lab.org")]).await;
    let edited = "email,reason,timestamp\njohn@lab.org,Edited,2024-05-01 10:00:00\n";

    let body = test_app
        .post_form("/debug/save", &[("csv", edited)])
        .await
        .text()
        .await
        .unwrap();

    assert!(body.contains("Saved 1 records."));
    let stored = test_app.stored_csv();
    assert!(!stored.contains("jane@lab.org"));
    assert!(stored.contains("john@lab.org,Edited,2024-05-01 10:00:00"));
}

#[tokio::test]
async fn debug_save_refuses_an_empty_table() {
    let test_app = TestApp::spawn_app().await;
    test_app.post_unsubscribe(&[("email", "jane@lab.org")]).await;

    test_app
        .post_form("/debug/save", &[("csv", "email,reason,timestamp\n")])
        .await;

    assert!(test_app.stored_csv().contains("jane@lab.org"));
}

#[tokio::test]
async fn debug_add_and_delete_rows() {
    let test_app = TestApp::spawn_app().await;

    test_app
        .post_form("/debug/add", &[("email", "a@lab.org"), ("reason", "Testing")])
        .await;
    test_app.post_form("/debug/add", &[("email", "b@lab.org")]).await;
    let body = test_app
        .post_form("/debug/delete", &[("email", "A@LAB.ORG")])
        .await
        .text()
        .await
        .unwrap();

    assert!(body.contains("Deleted a@lab.org."));
    let stored = test_app.stored_csv();
    assert!(!stored.contains("a@lab.org"));
    assert!(stored.contains("b@lab.org"));
}

#[tokio::test]
async fn debug_upload_merges_a_table() {
    let test_app = TestApp::spawn_app().await;
    test_app.post_unsubscribe(&[("email", "jane@lab.org")]).await;

    let body = test_app
        .post_form(
            "/debug/upload",
            &[("csv", "Email\njane@lab.org\nann@lab.org\n")],
        )
        .await
        .text()
        .await
        .unwrap();

    assert!(body.contains("Merged 1 new emails"));
    assert!(body.contains("Records (2)"));
}
