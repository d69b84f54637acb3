use kmeans_viz::App;
use kmeans_viz::app::Config;
use serde_json::json;
use serial_test::serial;
use std::io::Write;
use tempfile::NamedTempFile;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

async fn mount_backend(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [[0.0, 0.0], [1.0, 0.0], [5.0, 5.0], [6.0, 5.0]],
            "k": 2
        })))
        .expect(1)
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/initialize"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "centroids": [[0.0, 0.0], [5.0, 5.0]]
        })))
        .expect(1)
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/run"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "centroids": [[0.5, 0.0], [5.5, 5.0]],
            "assignments": [0, 0, 1, 1],
            "iteration": 2,
            "converged": true
        })))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
#[serial]
async fn test_script_drives_backend_and_writes_plot() {
    let mock_server = MockServer::start().await;
    mount_backend(&mock_server).await;

    let mut script = NamedTempFile::new().unwrap();
    writeln!(script, "# manual picks on the generated dataset").unwrap();
    writeln!(script, "generate 2 4").unwrap();
    writeln!(script, "method manual").unwrap();
    writeln!(script, "pick 0").unwrap();
    writeln!(script, "click 5 5").unwrap();
    writeln!(script, "init").unwrap();
    writeln!(script, "run").unwrap();
    writeln!(script, "quit").unwrap();
    writeln!(script, "reset").unwrap();

    let dir = tempfile::tempdir().unwrap();
    let plot = dir.path().join("kmeans.svg");

    let uri = mock_server.uri();
    let config = Config::from_args([
        "kmeans-viz",
        "--backend-url",
        uri.as_str(),
        "--centers",
        "2",
        "--samples",
        "4",
        "--script",
        script.path().to_str().unwrap(),
        "--svg-output",
        plot.to_str().unwrap(),
    ])
    .unwrap();

    App::from_config(config).unwrap().run().await.unwrap();

    let svg = std::fs::read_to_string(&plot).unwrap();
    assert!(svg.contains(r#"data-series="Centroids""#));
    assert!(svg.contains(r#"data-series="Cluster 1""#));
}

#[tokio::test]
#[serial]
async fn test_missing_script_is_reported() {
    let config = Config::from_args([
        "kmeans-viz",
        "--script",
        "/nonexistent/commands.txt",
    ])
    .unwrap();

    let result = App::from_config(config).unwrap().run().await;
    assert!(result.is_err());
}
