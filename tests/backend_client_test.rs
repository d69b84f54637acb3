use kmeans_viz::backend::{
    GenerateParams, InitializeRequest, IterateRequest,
};
use kmeans_viz::domain::{InitMethod, Point};
use kmeans_viz::{Backend, BackendClient, ClientConfig, ClientError};
use serde_json::json;
use std::time::Duration;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_json, method, path, query_param},
};

fn client_for(server: &MockServer) -> BackendClient {
    let config = ClientConfig {
        endpoint: server.uri(),
        timeout: Duration::from_secs(5),
        connection_timeout: Duration::from_secs(2),
        user_agent: "kmeans-viz-test/1.0".to_string(),
        ..Default::default()
    };
    BackendClient::new(config).unwrap()
}

#[tokio::test]
async fn test_generate_sends_query_and_decodes_points() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/generate"))
        .and(query_param("centers", "3"))
        .and(query_param("samples", "4"))
        .and(query_param("random_state", "7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [[0.0, 1.0], [2.5, -1.0], [3.0, 3.0], [-4.0, 0.5]],
            "k": 3
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let response = client
        .generate(GenerateParams {
            centers: 3,
            samples: 4,
            random_state: 7,
        })
        .await
        .unwrap();

    assert_eq!(response.k, 3);
    assert_eq!(response.data.len(), 4);
    assert_eq!(response.data[1], Point::new(2.5, -1.0));
}

#[tokio::test]
async fn test_initialize_posts_method_and_manual_centroids() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/initialize"))
        .and(body_json(json!({
            "initialization": "manual",
            "manual_centroids": [[1.0, 2.0], [3.0, 4.0]]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "centroids": [[1.0, 2.0], [3.0, 4.0]]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let response = client
        .initialize(InitializeRequest {
            initialization: InitMethod::Manual,
            manual_centroids: Some(vec![Point::new(1.0, 2.0), Point::new(3.0, 4.0)]),
        })
        .await
        .unwrap();

    assert_eq!(response.centroids.len(), 2);
    assert!(response.assignments.is_none());
}

#[tokio::test]
async fn test_initialize_omits_manual_centroids_for_automatic_methods() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/initialize"))
        .and(body_json(json!({ "initialization": "kmeans++" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "centroids": [[0.0, 0.0]],
            "assignments": [0, 0],
            "iteration": 0
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let response = client
        .initialize(InitializeRequest {
            initialization: InitMethod::KMeansPlusPlus,
            manual_centroids: None,
        })
        .await
        .unwrap();

    assert_eq!(response.assignments, Some(vec![0, 0]));
}

#[tokio::test]
async fn test_step_sends_null_manual_centroids() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/step"))
        .and(body_json(json!({
            "manual_centroids": null,
            "current_centroids": [[0.0, 0.0], [5.0, 5.0]]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "centroids": [[0.5, 0.5], [5.5, 5.5]],
            "clusters": { "0": [[0.0, 1.0]], "1": [[5.0, 6.0]] },
            "iteration": 1,
            "converged": false
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let response = client
        .step(IterateRequest {
            manual_centroids: None,
            current_centroids: vec![Point::new(0.0, 0.0), Point::new(5.0, 5.0)],
        })
        .await
        .unwrap();

    assert_eq!(response.iteration, 1);
    assert!(!response.converged);
    assert!(response.assignments.is_none());
    assert_eq!(response.clusters.map(|c| c.len()), Some(2));
}

#[tokio::test]
async fn test_run_reports_convergence() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/run"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "centroids": [[1.0, 1.0]],
            "assignments": [0, 0, 0],
            "iteration": 4,
            "converged": true
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let response = client
        .run(IterateRequest {
            manual_centroids: Some(vec![Point::new(1.0, 1.0)]),
            current_centroids: vec![Point::new(1.0, 1.0)],
        })
        .await
        .unwrap();

    assert!(response.converged);
    assert_eq!(response.iteration, 4);
}

#[tokio::test]
async fn test_reset_returns_message() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/reset"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "message": "KMeans instance has been reset." })),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let response = client.reset().await.unwrap();
    assert_eq!(response.message, "KMeans instance has been reset.");
}

#[tokio::test]
async fn test_error_body_message_is_surfaced() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/step"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({ "error": "KMeans not initialized." })),
        )
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let result = client
        .step(IterateRequest {
            manual_centroids: None,
            current_centroids: vec![],
        })
        .await;

    match result.unwrap_err() {
        ClientError::Backend { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "KMeans not initialized.");
        }
        other => panic!("Expected Backend error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_non_json_failure_falls_back_to_status_text() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/reset"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    match client.reset().await.unwrap_err() {
        ClientError::Backend { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "HTTP 500 Internal Server Error");
        }
        other => panic!("Expected Backend error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_success_payload_is_rejected() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [[1.0, 2.0, 3.0]],
            "k": 2
        })))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let result = client.generate(GenerateParams::default()).await;
    assert!(matches!(result, Err(ClientError::MalformedResponse(_))));
}

#[tokio::test]
async fn test_slow_backend_times_out() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/run"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "centroids": [] }))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&mock_server)
        .await;

    let config = ClientConfig {
        endpoint: mock_server.uri(),
        timeout: Duration::from_millis(200),
        ..Default::default()
    };
    let client = BackendClient::new(config).unwrap();

    let result = client
        .run(IterateRequest {
            manual_centroids: None,
            current_centroids: vec![],
        })
        .await;
    assert!(result.is_err());

    let stats = client.connection_stats();
    assert_eq!(stats.total_requests, 1);
    assert_eq!(stats.failed_requests, 1);
}

#[tokio::test]
async fn test_health_check_and_stats() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/test"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Test route is working!"))
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/reset"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    assert!(client.health_check().await.is_ok());
    assert!(client.reset().await.is_err());

    let stats = client.connection_stats();
    assert_eq!(stats.total_requests, 2);
    assert_eq!(stats.successful_requests, 1);
    assert_eq!(stats.failed_requests, 1);
}

#[tokio::test]
async fn test_health_check_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/test"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    match client.health_check().await.unwrap_err() {
        ClientError::Backend { status, .. } => assert_eq!(status, 404),
        other => panic!("Expected Backend error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unreachable_health_check_counts_as_failure() {
    // Port 9 (discard) has no listener on a test machine; the connection is refused.
    let config = ClientConfig {
        endpoint: "http://127.0.0.1:9".to_string(),
        timeout: Duration::from_secs(2),
        connection_timeout: Duration::from_secs(1),
        ..Default::default()
    };
    let client = BackendClient::new(config).unwrap();

    assert!(client.health_check().await.is_err());

    let stats = client.connection_stats();
    assert_eq!(stats.total_requests, 1);
    assert_eq!(stats.successful_requests, 0);
    assert_eq!(stats.failed_requests, 1);
}

#[tokio::test]
async fn test_slow_health_check_counts_as_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/test"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&mock_server)
        .await;

    let config = ClientConfig {
        endpoint: mock_server.uri(),
        timeout: Duration::from_millis(200),
        ..Default::default()
    };
    let client = BackendClient::new(config).unwrap();

    assert!(matches!(
        client.health_check().await,
        Err(ClientError::RequestTimeout(_))
    ));
    assert_eq!(client.connection_stats().failed_requests, 1);
}
