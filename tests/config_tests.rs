use std::io::Write;

use deckhand::config::{Config, CLUSTER_TOKEN_ENV};

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn minimal_file_loads_with_defaults() {
    let file = write_config("[cluster]\napi_url = \"https://cluster.example.com\"\n");
    let config = Config::load(file.path()).unwrap();

    assert_eq!(config.cluster.api_url, "https://cluster.example.com");
    assert!(config.event_stream.is_none(), "no-op consumer selected");
    assert_eq!(config.resync.interval_secs, 300);
    assert_eq!(config.http.port, 5000);
}

#[test]
fn event_stream_section_selects_the_real_consumer() {
    let file = write_config(
        "[cluster]\napi_url = \"https://cluster.example.com\"\n\n\
         [event_stream]\nws_url = \"wss://events.example.com/specs\"\n",
    );
    let config = Config::load(file.path()).unwrap();
    let stream = config.event_stream.expect("event stream configured");
    assert_eq!(stream.ws_url, "wss://events.example.com/specs");
    assert_eq!(stream.reconnect.max_consecutive_failures, 5);
}

#[test]
fn token_env_var_overrides_the_file() {
    let file = write_config(
        "[cluster]\napi_url = \"https://cluster.example.com\"\ntoken = \"from-file\"\n",
    );
    std::env::set_var(CLUSTER_TOKEN_ENV, "from-env");
    let config = Config::load(file.path());
    std::env::remove_var(CLUSTER_TOKEN_ENV);

    assert_eq!(config.unwrap().cluster.token.as_deref(), Some("from-env"));
}

#[test]
fn missing_file_is_a_read_error() {
    let result = Config::load("/nonexistent/deckhand.toml");
    assert!(result.is_err());
}

#[test]
fn malformed_toml_is_a_parse_error() {
    let file = write_config("[cluster\napi_url = ");
    assert!(Config::load(file.path()).is_err());
}

#[test]
fn invalid_ws_url_fails_validation() {
    let file = write_config(
        "[cluster]\napi_url = \"https://cluster.example.com\"\n\n\
         [event_stream]\nws_url = \"not a url\"\n",
    );
    assert!(Config::load(file.path()).is_err());
}
