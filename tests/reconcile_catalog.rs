use mealie_import::config::MealieConfig;
use mealie_import::mealie::MealieClient;
use mealie_import::reconcile::CatalogResolver;
use mockito::Matcher;

fn test_client(base_url: &str) -> MealieClient {
    MealieClient::new(&MealieConfig {
        base_url: base_url.to_string(),
        api_token: "test-token".to_string(),
        timeout: 5,
    })
    .unwrap()
}

fn empty_page() -> &'static str {
    r#"{"items": []}"#
}

/// A new name referenced by several ingredients of one recipe is created
/// exactly once: the check-then-create happens once per distinct name per
/// publish call.
#[tokio::test]
async fn unknown_unit_is_created_exactly_once_per_publish() {
    let mut server = mockito::Server::new_async().await;

    let search = server
        .mock("GET", "/api/units")
        .match_query(Matcher::UrlEncoded("search".into(), "cup".into()))
        .with_status(200)
        .with_body(empty_page())
        .expect(1)
        .create_async()
        .await;

    let create = server
        .mock("POST", "/api/units")
        .match_body(Matcher::PartialJson(serde_json::json!({"name": "cup"})))
        .with_status(201)
        .with_body(r#"{"id": "u-1", "name": "cup", "abbreviation": "cup"}"#)
        .expect(1)
        .create_async()
        .await;

    let client = test_client(&server.url());
    let mut resolver = CatalogResolver::new(&client);

    // Same new name three times, differing case included
    let first = resolver.resolve_unit(Some("cup")).await.unwrap().unwrap();
    let second = resolver.resolve_unit(Some("cup")).await.unwrap().unwrap();
    let third = resolver.resolve_unit(Some("CUP")).await.unwrap().unwrap();

    assert_eq!(first.id, "u-1");
    assert_eq!(second.id, "u-1");
    assert_eq!(third.id, "u-1");

    search.assert_async().await;
    create.assert_async().await;
}

/// Names already in the catalog never trigger a create, even with differing
/// case.
#[tokio::test]
async fn existing_entries_are_matched_case_insensitively() {
    let mut server = mockito::Server::new_async().await;

    let _search = server
        .mock("GET", "/api/foods")
        .match_query(Matcher::UrlEncoded("search".into(), "FLOUR".into()))
        .with_status(200)
        .with_body(r#"{"items": [{"id": "f-7", "name": "Flour"}]}"#)
        .create_async()
        .await;

    let create = server
        .mock("POST", "/api/foods")
        .with_status(201)
        .with_body(r#"{"id": "f-99", "name": "FLOUR"}"#)
        .expect(0)
        .create_async()
        .await;

    let client = test_client(&server.url());
    let mut resolver = CatalogResolver::new(&client);

    let resolved = resolver.resolve_food(Some("FLOUR")).await.unwrap().unwrap();
    assert_eq!(resolved.id, "f-7");
    assert_eq!(resolved.name, "Flour");

    create.assert_async().await;
}

/// Units also match by abbreviation ("g" vs name "Gram").
#[tokio::test]
async fn unit_matches_by_abbreviation() {
    let mut server = mockito::Server::new_async().await;

    let _search = server
        .mock("GET", "/api/units")
        .match_query(Matcher::UrlEncoded("search".into(), "g".into()))
        .with_status(200)
        .with_body(r#"{"items": [{"id": "u-2", "name": "Gram", "abbreviation": "g"}]}"#)
        .create_async()
        .await;

    let create = server
        .mock("POST", "/api/units")
        .with_status(201)
        .expect(0)
        .create_async()
        .await;

    let client = test_client(&server.url());
    let mut resolver = CatalogResolver::new(&client);

    let resolved = resolver.resolve_unit(Some("g")).await.unwrap().unwrap();
    assert_eq!(resolved.id, "u-2");
    assert_eq!(resolved.name, "Gram");

    create.assert_async().await;
}

/// Empty and absent names resolve to nothing without touching the backend; a
/// blank catalog entry must never be created.
#[tokio::test]
async fn blank_names_issue_no_backend_traffic() {
    let mut server = mockito::Server::new_async().await;

    let any_units = server
        .mock("GET", "/api/units")
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;
    let any_create = server
        .mock("POST", "/api/units")
        .expect(0)
        .create_async()
        .await;

    let client = test_client(&server.url());
    let mut resolver = CatalogResolver::new(&client);

    assert!(resolver.resolve_unit(None).await.unwrap().is_none());
    assert!(resolver.resolve_unit(Some("")).await.unwrap().is_none());
    assert!(resolver.resolve_unit(Some("   ")).await.unwrap().is_none());
    assert!(resolver.resolve_food(Some(" ")).await.unwrap().is_none());

    any_units.assert_async().await;
    any_create.assert_async().await;
}

/// A search hit that only partially matches (substring, not exact) still
/// creates the new entry.
#[tokio::test]
async fn partial_search_hits_do_not_count_as_matches() {
    let mut server = mockito::Server::new_async().await;

    let _search = server
        .mock("GET", "/api/foods")
        .match_query(Matcher::UrlEncoded("search".into(), "bean".into()))
        .with_status(200)
        .with_body(r#"{"items": [{"id": "f-1", "name": "green bean"}]}"#)
        .create_async()
        .await;

    let create = server
        .mock("POST", "/api/foods")
        .match_body(Matcher::PartialJson(serde_json::json!({"name": "bean"})))
        .with_status(201)
        .with_body(r#"{"id": "f-2", "name": "bean"}"#)
        .expect(1)
        .create_async()
        .await;

    let client = test_client(&server.url());
    let mut resolver = CatalogResolver::new(&client);

    let resolved = resolver.resolve_food(Some("bean")).await.unwrap().unwrap();
    assert_eq!(resolved.id, "f-2");

    create.assert_async().await;
}
