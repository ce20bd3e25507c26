//! Client and index facades: paths, verbs, bodies and query strings

use chrono::{TimeZone, Utc};
use meili_rs::{
    Client, ClientConfig, CoreError, DocumentQuery, DocumentsQuery, DocumentsResults, Error,
    ErrorKind, IndexSearchQuery, KeyCreation, MinWordSizeForTypos, MultiSearchQuery, SearchQuery,
    TaskStatus, TaskType, TasksFilter, TasksQuery, TypoTolerance,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{body_json, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Movie {
    id: u32,
    title: String,
}

fn enqueued(task_uid: u32, task_type: &str) -> ResponseTemplate {
    ResponseTemplate::new(202).set_body_json(json!({
        "taskUid": task_uid,
        "indexUid": "movies",
        "status": "enqueued",
        "type": task_type,
        "enqueuedAt": "2024-01-01T00:00:00Z"
    }))
}

async fn setup() -> (MockServer, Client) {
    let server = MockServer::start().await;
    let client = Client::new(ClientConfig::new(server.uri()).api_key("masterKey")).unwrap();
    (server, client)
}

#[tokio::test]
async fn test_search_get_sends_query_string() {
    let (server, client) = setup().await;
    Mock::given(method("GET"))
        .and(path("/indexes/movies/search"))
        .and(query_param("q", "prince"))
        .and(query_param("limit", "5"))
        .and(query_param("filter", "genre = fantasy"))
        .and(query_param("attributesToRetrieve", "id,title"))
        .and(query_param_is_missing("attributesToSearchOn"))
        .and(query_param_is_missing("offset"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "hits": [{"id": 1, "title": "The Little Prince"}],
            "offset": 0,
            "limit": 5,
            "estimatedTotalHits": 1,
            "processingTimeMs": 3,
            "query": "prince"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let query = SearchQuery::new("prince")
        .with_limit(5)
        .with_filter("genre = fantasy")
        .with_attributes_to_retrieve(["id", "title"]);
    let response = client
        .index("movies")
        .search_get::<Movie>(&query)
        .await
        .unwrap();

    assert_eq!(response.hits.len(), 1);
    assert_eq!(response.hits[0].result.title, "The Little Prince");
    assert_eq!(response.estimated_total_hits, Some(1));
}

#[tokio::test]
async fn test_search_posts_body() {
    let (server, client) = setup().await;
    Mock::given(method("POST"))
        .and(path("/indexes/movies/search"))
        .and(body_json(json!({"q": "alice", "sort": ["year:desc"]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "hits": [],
            "processingTimeMs": 0,
            "query": "alice"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = client
        .index("movies")
        .search::<Movie>(&SearchQuery::new("alice").with_sort(["year:desc"]))
        .await
        .unwrap();
    assert!(response.hits.is_empty());
}

#[tokio::test]
async fn test_get_tasks_renders_filters() {
    let (server, client) = setup().await;
    Mock::given(method("GET"))
        .and(path("/tasks"))
        .and(query_param("statuses", "succeeded,failed"))
        .and(query_param("indexUids", "movies,books"))
        .and(query_param("afterEnqueuedAt", "2024-05-06T07:08:09Z"))
        .and(query_param("limit", "20"))
        .and(query_param_is_missing("uids"))
        .and(query_param_is_missing("from"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{
                "uid": 1,
                "indexUid": "movies",
                "status": "succeeded",
                "type": "indexCreation",
                "enqueuedAt": "2024-05-06T07:08:10Z",
                "startedAt": "2024-05-06T07:08:11Z",
                "finishedAt": "2024-05-06T07:08:12Z",
                "duration": "PT1S"
            }],
            "total": 1,
            "limit": 20,
            "from": 1,
            "next": null
        })))
        .expect(1)
        .mount(&server)
        .await;

    let after = Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap();
    let query = TasksQuery::new()
        .with_filter(
            TasksFilter::new()
                .with_statuses([TaskStatus::Succeeded, TaskStatus::Failed])
                .with_index_uids(["movies", "books"])
                .with_enqueued_between(Some(after), None),
        )
        .with_limit(20);

    let page = client.get_tasks(&query).await.unwrap();
    assert_eq!(page.results.len(), 1);
    assert_eq!(page.results[0].task_type, TaskType::IndexCreation);
    assert!(page.next.is_none());
}

#[tokio::test]
async fn test_index_get_tasks_scopes_to_index() {
    let (server, client) = setup().await;
    Mock::given(method("GET"))
        .and(path("/tasks"))
        .and(query_param("indexUids", "movies"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [],
            "limit": 20
        })))
        .expect(1)
        .mount(&server)
        .await;

    let query = TasksQuery::new().with_filter(TasksFilter::new().with_index_uids(["books"]));
    let page = client.index("movies").get_tasks(&query).await.unwrap();
    assert!(page.results.is_empty());
}

#[tokio::test]
async fn test_cancel_and_delete_tasks() {
    let (server, client) = setup().await;
    Mock::given(method("POST"))
        .and(path("/tasks/cancel"))
        .and(query_param("uids", "1,2"))
        .respond_with(enqueued(3, "taskCancelation"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/tasks"))
        .and(query_param("types", "documentAdditionOrUpdate"))
        .respond_with(enqueued(4, "taskDeletion"))
        .expect(1)
        .mount(&server)
        .await;

    let canceled = client
        .cancel_tasks(&TasksFilter::new().with_uids([1, 2]))
        .await
        .unwrap();
    assert_eq!(canceled.task_type, TaskType::TaskCancelation);

    let deleted = client
        .delete_tasks(&TasksFilter::new().with_types([TaskType::DocumentAdditionOrUpdate]))
        .await
        .unwrap();
    assert_eq!(deleted.task_uid, 4);

    let requests = server.received_requests().await.unwrap();
    assert!(requests[0].body.is_empty());
}

#[tokio::test]
async fn test_index_lifecycle_bodies() {
    let (server, client) = setup().await;
    Mock::given(method("POST"))
        .and(path("/indexes"))
        .and(body_json(json!({"uid": "movies", "primaryKey": "id"})))
        .respond_with(enqueued(0, "indexCreation"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/indexes/movies"))
        .and(body_json(json!({"primaryKey": null})))
        .respond_with(enqueued(1, "indexUpdate"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/swap-indexes"))
        .and(body_json(json!([{"indexes": ["movies", "movies_new"]}])))
        .respond_with(enqueued(2, "indexSwap"))
        .expect(1)
        .mount(&server)
        .await;

    client.create_index("movies", Some("id")).await.unwrap();
    client.update_index("movies", None).await.unwrap();
    client
        .swap_indexes(&[meili_rs::IndexSwap::new("movies", "movies_new")])
        .await
        .unwrap();
}

#[tokio::test]
async fn test_document_operations() {
    let (server, client) = setup().await;
    let movies = vec![
        Movie { id: 1, title: "Alice".to_string() },
        Movie { id: 2, title: "Bob".to_string() },
    ];

    Mock::given(method("POST"))
        .and(path("/indexes/movies/documents"))
        .and(query_param("primaryKey", "id"))
        .and(body_json(json!([{"id": 1, "title": "Alice"}, {"id": 2, "title": "Bob"}])))
        .respond_with(enqueued(5, "documentAdditionOrUpdate"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/indexes/movies/documents"))
        .and(query_param_is_missing("primaryKey"))
        .respond_with(enqueued(6, "documentAdditionOrUpdate"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/indexes/movies/documents/delete-batch"))
        .and(body_json(json!([1, 2])))
        .respond_with(enqueued(7, "documentDeletion"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/indexes/movies/documents/delete"))
        .and(body_json(json!({"filter": "year < 1990"})))
        .respond_with(enqueued(8, "documentDeletion"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/indexes/movies/documents"))
        .and(query_param("fields", "id,title"))
        .and(query_param("limit", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"id": 1, "title": "Alice"}, {"id": 2, "title": "Bob"}],
            "offset": 0,
            "limit": 2,
            "total": 2
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/indexes/movies/documents/2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 2, "title": "Bob"})))
        .expect(1)
        .mount(&server)
        .await;

    let index = client.index("movies");
    assert_eq!(index.add_documents(&movies, Some("id")).await.unwrap().task_uid, 5);
    assert_eq!(index.update_documents(&movies, None).await.unwrap().task_uid, 6);
    assert_eq!(index.delete_documents(&[1, 2]).await.unwrap().task_uid, 7);
    assert_eq!(
        index
            .delete_documents_by_filter(&meili_rs::DocumentDeletionFilter::new("year < 1990"))
            .await
            .unwrap()
            .task_uid,
        8
    );

    let page: DocumentsResults<Movie> = index
        .get_documents(&DocumentsQuery::new().with_fields(["id", "title"]).with_limit(2))
        .await
        .unwrap();
    assert_eq!(page.results, movies);

    let bob: Movie = index.get_document("2", &DocumentQuery::default()).await.unwrap();
    assert_eq!(bob.title, "Bob");
}

#[tokio::test]
async fn test_identifiers_stay_inside_their_path_segment() {
    let (server, client) = setup().await;
    Mock::given(method("GET"))
        .and(path("/indexes/a%3Fb/documents/x%23y%2F.."))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 9, "title": "Odd"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/indexes/my%20index"))
        .respond_with(enqueued(12, "indexDeletion"))
        .expect(1)
        .mount(&server)
        .await;

    let odd: Movie = client
        .index("a?b")
        .get_document("x#y/..", &DocumentQuery::default())
        .await
        .unwrap();
    assert_eq!(odd.id, 9);

    let task = client.delete_index("my index").await.unwrap();
    assert_eq!(task.task_uid, 12);

    // `..` cannot be escaped, so it never leaves the client
    let err = client.index("..").get_stats().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Config);
    let err = client.delete_key("..").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Config);
}

#[tokio::test]
async fn test_invalid_settings_never_reach_the_server() {
    let (server, client) = setup().await;
    let index = client.index("movies");

    let err = index
        .update_ranking_rules(&vec!["words".to_string(), "year:up".to_string()])
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Config);
    assert!(matches!(err, Error::Core(CoreError::InvalidSettings(_))));

    let typo = TypoTolerance {
        min_word_size_for_typos: Some(MinWordSizeForTypos {
            one_typo: Some(9),
            two_typos: Some(4),
        }),
        ..TypoTolerance::default()
    };
    assert!(index.update_typo_tolerance(&typo).await.is_err());

    let requests = server.received_requests().await.unwrap();
    assert!(requests.is_empty());
}

#[tokio::test]
async fn test_settings_verbs() {
    let (server, client) = setup().await;
    Mock::given(method("PUT"))
        .and(path("/indexes/movies/settings/ranking-rules"))
        .and(body_json(json!(["words", "typo", "year:desc"])))
        .respond_with(enqueued(9, "settingsUpdate"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/indexes/movies/settings/typo-tolerance"))
        .and(body_json(json!({"enabled": false})))
        .respond_with(enqueued(10, "settingsUpdate"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/indexes/movies/settings/stop-words"))
        .respond_with(enqueued(11, "settingsUpdate"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/indexes/movies/settings/distinct-attribute"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(null)))
        .expect(1)
        .mount(&server)
        .await;

    let index = client.index("movies");
    let rules = vec!["words".to_string(), "typo".to_string(), "year:desc".to_string()];
    index.update_ranking_rules(&rules).await.unwrap();

    let typo = TypoTolerance {
        enabled: Some(false),
        ..TypoTolerance::default()
    };
    index.update_typo_tolerance(&typo).await.unwrap();
    index.reset_stop_words().await.unwrap();
    assert_eq!(index.get_distinct_attribute().await.unwrap(), None);
}

#[tokio::test]
async fn test_create_key_sends_null_expiry() {
    let (server, client) = setup().await;
    let uid = Uuid::new_v4();
    Mock::given(method("POST"))
        .and(path("/keys"))
        .and(body_json(json!({
            "uid": uid,
            "actions": ["search"],
            "indexes": ["movies"],
            "expiresAt": null
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "uid": uid,
            "key": "d0552b41536279a0ad88bd595327b96f01176a60c2243e906c52ac02375f9bc4",
            "name": null,
            "description": null,
            "actions": ["search"],
            "indexes": ["movies"],
            "expiresAt": null,
            "createdAt": "2024-01-01T00:00:00Z",
            "updatedAt": "2024-01-01T00:00:00Z"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let key = client
        .create_key(&KeyCreation::new(["search"], ["movies"]).with_uid(uid))
        .await
        .unwrap();
    assert_eq!(key.uid, uid);
    assert!(key.expires_at.is_none());
}

#[tokio::test]
async fn test_multi_search() {
    let (server, client) = setup().await;
    Mock::given(method("POST"))
        .and(path("/multi-search"))
        .and(body_json(json!({"queries": [
            {"indexUid": "movies", "q": "alice"},
            {"indexUid": "books", "q": "alice", "limit": 1}
        ]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": [
            {"indexUid": "movies", "hits": [{"id": 1, "title": "Alice"}], "processingTimeMs": 1, "query": "alice"},
            {"indexUid": "books", "hits": [], "processingTimeMs": 1, "query": "alice"}
        ]})))
        .expect(1)
        .mount(&server)
        .await;

    let batch = MultiSearchQuery {
        queries: vec![
            IndexSearchQuery::new("movies", SearchQuery::new("alice")),
            IndexSearchQuery::new("books", SearchQuery::new("alice").with_limit(1)),
        ],
    };
    let response = client.multi_search::<Movie>(&batch).await.unwrap();

    assert_eq!(response.results.len(), 2);
    assert_eq!(response.results[0].index_uid, "movies");
    assert_eq!(response.results[0].response.hits[0].result.id, 1);
}
