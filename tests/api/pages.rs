use crate::helpers::TestApp;

#[tokio::test]
async fn landing_page_is_the_default_view() {
    let test_app = TestApp::spawn_app().await;

    let response = test_app.get_page("").await;

    assert_eq!(200, response.status().as_u16());
    let body = response.text().await.unwrap();
    assert!(body.contains("Welcome to CellAI"));
    assert!(body.contains("How It Works"));
}

#[tokio::test]
async fn unsubscribe_form_is_served_for_every_spelling() {
    let test_app = TestApp::spawn_app().await;

    // This is a common practice and it is called table-driven tests.
    let test_cases = vec![
        ("?unsubscribe", "bare flag"),
        ("?unsubscribe=1", "flag with a value"),
        ("?page=unsubscribe", "page parameter"),
    ];

    for (query, description) in test_cases {
        let body = test_app.get_page(query).await.text().await.unwrap();

        assert!(
            body.contains(r#"action="/unsubscribe""#),
            "The unsubscribe form was not served for the {}",
            description
        );
    }
}

#[tokio::test]
async fn admin_page_asks_for_the_password_first() {
    let test_app = TestApp::spawn_app().await;
    test_app
        .post_unsubscribe(&[("email", "jane@lab.org")])
        .await;

    let body = test_app.get_page("?page=admin").await.text().await.unwrap();

    assert!(body.contains(r#"name="password""#));
    assert!(!body.contains("jane@lab.org"));
}

#[tokio::test]
async fn unknown_page_falls_back_to_landing() {
    let test_app = TestApp::spawn_app().await;

    let body = test_app.get_page("?page=pricing").await.text().await.unwrap();

    assert!(body.contains("Welcome to CellAI"));
}
