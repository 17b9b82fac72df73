use std::sync::Arc;
use std::time::Duration;

use httpmock::prelude::*;
use serde_json::{Value, json};

use imarch::cse::{SearchClient, SearchParams};
use imarch::error::SearchError;

const API_PATH: &str = "/customsearch/v1/";

mod test_helpers {
    use super::*;

    pub fn client_for(server: &MockServer) -> SearchClient {
        SearchClient::builder("test-key", "test-cx")
            .base_url(server.url(API_PATH))
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap()
    }

    pub fn image_block(n: u32) -> Value {
        json!({
            "contextLink": format!("https://site{n}.test/page"),
            "height": 600 + n,
            "width": 800 + n,
            "byteSize": 50_000 + n as u64,
            "thumbnailLink": format!("https://thumbs.test/{n}"),
            "thumbnailHeight": 60 + n,
            "thumbnailWidth": 80 + n
        })
    }

    pub fn item(n: u32, with_image: bool) -> Value {
        let mut item = json!({
            "kind": "customsearch#result",
            "title": format!("Cat {n}"),
            "htmlTitle": format!("<b>Cat</b> {n}"),
            "link": format!("https://img{n}.test/cat.jpg"),
            "displayLink": format!("img{n}.test"),
            "snippet": "a cat",
            "htmlSnippet": "a <b>cat</b>",
            "mime": "image/jpeg",
            "fileFormat": "image/jpeg"
        });
        if with_image {
            item["image"] = image_block(n);
        }
        item
    }

    pub fn payload(items: Option<Vec<Value>>) -> Value {
        let mut body = json!({
            "kind": "customsearch#search",
            "url": {
                "type": "application/json",
                "template": "https://www.googleapis.com/customsearch/v1?q={searchTerms}"
            },
            "queries": {"request": [{"searchTerms": "cat", "startIndex": 1}]},
            "context": {"title": "imarch"},
            "searchInformation": {"searchTime": 0.31, "totalResults": "4000"}
        });
        if let Some(items) = items {
            body["items"] = Value::Array(items);
        }
        body
    }
}

use test_helpers::*;

#[cfg(test)]
mod request_building {
    use super::*;

    #[tokio::test]
    async fn test_sends_credentials_and_defaults() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path(API_PATH)
                    .query_param("key", "test-key")
                    .query_param("cx", "test-cx")
                    .query_param("q", "cat")
                    .query_param("start", "1")
                    .query_param("safe", "off");
                then.status(200).json_body(payload(None));
            })
            .await;

        let client = client_for(&server);
        client.search(&SearchParams::new("cat")).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_second_page_and_image_flags() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path(API_PATH)
                    .query_param("start", "11")
                    .query_param("safe", "active")
                    .query_param("num", "5")
                    .query_param("searchType", "image");
                then.status(200).json_body(payload(None));
            })
            .await;

        let client = client_for(&server);
        let params = SearchParams::new("cat")
            .page(2)
            .per_page(5)
            .safe_search(true)
            .only_image(true);
        client.search(&params).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_non_positive_page_clamped() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path(API_PATH).query_param("start", "1");
                then.status(200).json_body(payload(None));
            })
            .await;

        let client = client_for(&server);
        client.search(&SearchParams::new("cat").page(0)).await.unwrap();
        client.search(&SearchParams::new("cat").page(-1)).await.unwrap();
        assert_eq!(mock.hits_async().await, 2);
    }

    #[tokio::test]
    async fn test_out_of_range_per_page_not_sent() {
        let server = MockServer::start_async().await;
        let with_num = server
            .mock_async(|when, then| {
                when.method(GET).path(API_PATH).query_param_exists("num");
                then.status(500).body("num must not be sent");
            })
            .await;
        let without_num = server
            .mock_async(|when, then| {
                when.method(GET).path(API_PATH);
                then.status(200).json_body(payload(None));
            })
            .await;

        let client = client_for(&server);
        for per_page in [0, 11, -5] {
            client
                .search(&SearchParams::new("cat").per_page(per_page))
                .await
                .unwrap();
        }
        assert_eq!(with_num.hits_async().await, 0);
        assert_eq!(without_num.hits_async().await, 3);
    }
}

#[cfg(test)]
mod response_mapping {
    use super::*;

    #[tokio::test]
    async fn test_zero_items_is_empty_list() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path(API_PATH);
                then.status(200).json_body(payload(None));
            })
            .await;

        let result = client_for(&server)
            .search(&SearchParams::new("zzzqqq"))
            .await
            .unwrap();
        assert!(result.items.is_empty());
        assert_eq!(result.kind, "customsearch#search");
        assert_eq!(result.total_results(), Some(4000));
    }

    #[tokio::test]
    async fn test_image_metadata_copied_verbatim() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path(API_PATH).query_param("searchType", "image");
                then.status(200)
                    .json_body(payload(Some(vec![item(1, true), item(2, true)])));
            })
            .await;

        let result = client_for(&server)
            .search(&SearchParams::new("cat").only_image(true))
            .await
            .unwrap();

        assert_eq!(result.items.len(), 2);
        assert_eq!(result.items[0].title, "Cat 1");
        assert_eq!(result.items[1].title, "Cat 2");

        let image = result.items[0].image.as_ref().unwrap();
        assert_eq!(image.context_link, "https://site1.test/page");
        assert_eq!(image.height, 601);
        assert_eq!(image.width, 801);
        assert_eq!(image.byte_size, 50_001);
        assert_eq!(image.thumbnail_link, "https://thumbs.test/1");
        assert_eq!(image.thumbnail_height, 61);
        assert_eq!(image.thumbnail_width, 81);
        assert_eq!(result.items[0].mime.as_deref(), Some("image/jpeg"));
        assert!(result.items[0].cache_id.is_none());
    }

    #[tokio::test]
    async fn test_spelling_correction() {
        let server = MockServer::start_async().await;
        let mut body = payload(Some(vec![item(1, false)]));
        body["spelling"] = json!({"correctedQuery": "cat", "htmlCorrectedQuery": "<b>cat</b>"});
        server
            .mock_async(move |when, then| {
                when.method(GET).path(API_PATH);
                then.status(200).json_body(body);
            })
            .await;

        let result = client_for(&server)
            .search(&SearchParams::new("catt"))
            .await
            .unwrap();
        assert_eq!(result.corrected_query(), Some("cat"));
        assert!(result.items[0].image.is_none());
    }

    #[tokio::test]
    async fn test_raw_returns_provider_json() {
        let server = MockServer::start_async().await;
        let body = payload(Some(vec![item(3, true)]));
        let expected = body.clone();
        server
            .mock_async(move |when, then| {
                when.method(GET).path(API_PATH);
                then.status(200).json_body(body);
            })
            .await;

        let raw = client_for(&server)
            .search_raw(&SearchParams::new("cat"))
            .await
            .unwrap();
        assert_eq!(raw, expected);
    }

    #[tokio::test]
    async fn test_missing_required_field_is_malformed() {
        let server = MockServer::start_async().await;
        let mut body = payload(Some(vec![item(1, false)]));
        body["items"][0].as_object_mut().unwrap().remove("htmlSnippet");
        server
            .mock_async(move |when, then| {
                when.method(GET).path(API_PATH);
                then.status(200).json_body(body);
            })
            .await;

        let err = client_for(&server)
            .search(&SearchParams::new("cat"))
            .await
            .unwrap_err();
        assert!(matches!(err, SearchError::MalformedResponse(_)), "{err:?}");
    }

    #[tokio::test]
    async fn test_non_json_body_is_malformed() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path(API_PATH);
                then.status(200).body("<html>captcha</html>");
            })
            .await;

        let err = client_for(&server)
            .search(&SearchParams::new("cat"))
            .await
            .unwrap_err();
        assert!(matches!(err, SearchError::MalformedResponse(_)), "{err:?}");
    }
}

#[cfg(test)]
mod failure_classification {
    use super::*;

    async fn search_with_status(status: u16, body: &'static str) -> SearchError {
        let server = MockServer::start_async().await;
        server
            .mock_async(move |when, then| {
                when.method(GET).path(API_PATH);
                then.status(status).body(body);
            })
            .await;
        client_for(&server)
            .search(&SearchParams::new("cat"))
            .await
            .unwrap_err()
    }

    #[tokio::test]
    async fn test_unauthorized_and_forbidden_are_authentication_errors() {
        for status in [401, 403] {
            match search_with_status(status, r#"{"error":"API key not valid"}"#).await {
                SearchError::Authentication { status: got, body } => {
                    assert_eq!(got, status);
                    assert!(body.contains("API key not valid"));
                }
                other => panic!("expected authentication error, got {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn test_other_statuses_are_provider_errors() {
        for status in [400, 404, 429, 500, 503] {
            let err = search_with_status(status, "nope").await;
            assert!(!err.is_fatal());
            match err {
                SearchError::Provider { status: got, body } => {
                    assert_eq!(got, status);
                    assert_eq!(body, "nope");
                }
                other => panic!("expected provider error, got {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        let client = SearchClient::builder("k", "cx")
            .base_url("http://127.0.0.1:1/customsearch/v1/")
            .timeout(Duration::from_secs(2))
            .build()
            .unwrap();
        let err = client.search(&SearchParams::new("cat")).await.unwrap_err();
        assert!(matches!(err, SearchError::Transport(_)), "{err:?}");
        assert!(err.status().is_none());
    }

    #[tokio::test]
    async fn test_transport_error_does_not_leak_api_key() {
        let client = SearchClient::builder("SUPER-SECRET-KEY", "cx")
            .base_url("http://127.0.0.1:1/customsearch/v1/")
            .timeout(Duration::from_secs(2))
            .build()
            .unwrap();
        let err = client.search(&SearchParams::new("cat")).await.unwrap_err();
        assert!(matches!(err, SearchError::Transport(_)), "{err:?}");
        assert!(!format!("{err}").contains("SUPER-SECRET-KEY"));
        assert!(!format!("{err:?}").contains("SUPER-SECRET-KEY"));
    }

    #[tokio::test]
    async fn test_timeout_is_transport_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path(API_PATH);
                then.status(200)
                    .delay(Duration::from_millis(800))
                    .json_body(payload(None));
            })
            .await;

        let client = SearchClient::builder("k", "cx")
            .base_url(server.url(API_PATH))
            .timeout(Duration::from_millis(100))
            .build()
            .unwrap();
        match client.search(&SearchParams::new("cat")).await.unwrap_err() {
            SearchError::Transport(e) => assert!(e.is_timeout()),
            other => panic!("expected transport error, got {other:?}"),
        }
    }
}

#[cfg(test)]
mod lifecycle {
    use super::*;

    #[tokio::test]
    async fn test_close_is_idempotent_and_blocks_search() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path(API_PATH);
                then.status(200).json_body(payload(None));
            })
            .await;

        let client = client_for(&server);
        assert!(!client.is_closed());
        client.search(&SearchParams::new("cat")).await.unwrap();

        client.close();
        client.close();
        assert!(client.is_closed());

        let err = client.search(&SearchParams::new("cat")).await.unwrap_err();
        assert!(matches!(err, SearchError::Closed));
        let err = client.search_raw(&SearchParams::new("cat")).await.unwrap_err();
        assert!(matches!(err, SearchError::Closed));
        assert_eq!(mock.hits_async().await, 1);
    }

    #[tokio::test]
    async fn test_close_lets_in_flight_request_finish() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path(API_PATH);
                then.status(200)
                    .delay(Duration::from_millis(300))
                    .json_body(payload(None));
            })
            .await;

        let client = Arc::new(client_for(&server));
        let in_flight = {
            let client = client.clone();
            tokio::spawn(async move { client.search(&SearchParams::new("cat")).await })
        };
        tokio::time::sleep(Duration::from_millis(100)).await;
        client.close();

        let err = client.search(&SearchParams::new("cat")).await.unwrap_err();
        assert!(matches!(err, SearchError::Closed));
        assert!(in_flight.await.unwrap().is_ok());
        assert_eq!(mock.hits_async().await, 1);
    }

    #[tokio::test]
    async fn test_concurrent_searches_share_client() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path(API_PATH);
                then.status(200)
                    .json_body(payload(Some(vec![item(1, true)])));
            })
            .await;

        let client = Arc::new(client_for(&server));
        let mut handles = Vec::new();
        for page in 1..=8 {
            let client = client.clone();
            handles.push(tokio::spawn(async move {
                client
                    .search(&SearchParams::new("cat").page(page).only_image(true))
                    .await
            }));
        }
        for handle in handles {
            let result = handle.await.unwrap().unwrap();
            assert_eq!(result.items.len(), 1);
        }
        assert_eq!(mock.hits_async().await, 8);
    }
}
