//! End-to-end tests of the reqwest backend against a mock server
//!
//! The client is blocking, so every call runs on `spawn_blocking` while the
//! mock server keeps running on the test runtime.

use pretty_assertions::assert_eq;
use std::net::{SocketAddr, TcpListener};
use std::time::Duration;
use wazo_rest_client::{
    ClientBuilder, ClientError, ClientResult, EntryPoints, ExampleClient, HttpCommand, PluginCache,
    TransportError,
};
use wiremock::matchers::{basic_auth, header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn example_client(
    address: SocketAddr,
    configure: impl FnOnce(ClientBuilder) -> ClientBuilder,
) -> ClientResult<ExampleClient> {
    let entry_points = EntryPoints::new();
    ExampleClient::register(&entry_points);
    let cache = PluginCache::new(entry_points);

    let builder = ExampleClient::builder()
        .with_host(address.ip().to_string())
        .with_port(address.port())
        .with_version("1.0")
        .with_https(false);
    configure(builder).build(&cache).map(ExampleClient::from)
}

#[tokio::test(flavor = "multi_thread")]
async fn test_example_command_sends_session_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/1.0/test"))
        .and(header("x-auth-token", "the-one-ring"))
        .and(header("wazo-tenant", "tenant-uuid"))
        .and(header("user-agent", "wazo-live-tests"))
        .respond_with(ResponseTemplate::new(200).set_body_string("hello"))
        .expect(1)
        .mount(&server)
        .await;

    let address = *server.address();
    let body = tokio::task::spawn_blocking(move || {
        let client = example_client(address, |b| {
            b.with_token("the-one-ring")
                .with_tenant("tenant-uuid")
                .with_user_agent("wazo-live-tests")
        })?;
        client.example().expect("example command bound").test()
    })
    .await
    .unwrap()
    .unwrap();

    assert_eq!(&body[..], b"hello");

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].headers.get("connection").unwrap(), "close");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_basic_auth_credentials_are_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/1.0/test"))
        .and(basic_auth("alice", "secret"))
        .respond_with(ResponseTemplate::new(200).set_body_string("authenticated"))
        .expect(1)
        .mount(&server)
        .await;

    let address = *server.address();
    let body = tokio::task::spawn_blocking(move || {
        let client = example_client(address, |b| b.with_credentials("alice", "secret"))?;
        client.example().expect("example command bound").test()
    })
    .await
    .unwrap()
    .unwrap();

    assert_eq!(&body[..], b"authenticated");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_digest_challenge_is_answered() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/1.0/test"))
        .and(header_exists("authorization"))
        .respond_with(ResponseTemplate::new(200).set_body_string("digest ok"))
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/1.0/test"))
        .respond_with(ResponseTemplate::new(401).insert_header(
            "www-authenticate",
            r#"Digest realm="wazo", nonce="dcd98b7102dd2f0e8b11d0f600bfb0c093", qop="auth", algorithm=MD5"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let address = *server.address();
    let body = tokio::task::spawn_blocking(move || {
        let client = example_client(address, |b| b.with_digest_credentials("alice", "secret"))?;
        client.example().expect("example command bound").test()
    })
    .await
    .unwrap()
    .unwrap();

    assert_eq!(&body[..], b"digest ok");

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
    assert!(requests[0].headers.get("authorization").is_none());
    let authorization = requests[1].headers.get("authorization").unwrap().to_str().unwrap();
    assert!(authorization.starts_with("Digest "));
    assert!(authorization.contains(r#"username="alice""#));
    assert!(authorization.contains(r#"uri="/1.0/test""#));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_basic_credentials_do_not_answer_digest_challenge() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/1.0/test"))
        .respond_with(
            ResponseTemplate::new(401)
                .insert_header("www-authenticate", r#"Digest realm="wazo", nonce="abc""#)
                .set_body_string("denied"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let address = *server.address();
    let body = tokio::task::spawn_blocking(move || {
        let client = example_client(address, |b| b.with_credentials("alice", "secret"))?;
        client.example().expect("example command bound").test()
    })
    .await
    .unwrap()
    .unwrap();

    assert_eq!(&body[..], b"denied");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_example_command_returns_error_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/1.0/test"))
        .respond_with(ResponseTemplate::new(404).set_body_string("missing"))
        .mount(&server)
        .await;

    let address = *server.address();
    let body = tokio::task::spawn_blocking(move || {
        let client = example_client(address, |b| b)?;
        client.example().expect("example command bound").test()
    })
    .await
    .unwrap()
    .unwrap();

    assert_eq!(&body[..], b"missing");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_error_status_uses_json_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/1.0/test"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(serde_json::json!({"message": "No such test"})),
        )
        .mount(&server)
        .await;

    let address = *server.address();
    let result = tokio::task::spawn_blocking(move || {
        let client = example_client(address, |b| b)?;
        let session = client.session()?;
        HttpCommand::raise_from_response(session.get(&client.url(["test"]))?)
    })
    .await
    .unwrap();

    match result {
        Err(ClientError::Http(err)) => {
            assert_eq!(err.status.as_u16(), 404);
            assert_eq!(err.reason, "No such test");
            assert_eq!(err.url, format!("http://{address}/1.0/test"));
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_timeout_is_enforced() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/1.0/test"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    let address = *server.address();
    let result = tokio::task::spawn_blocking(move || {
        let client =
            example_client(address, |b| b.with_timeout(Some(Duration::from_millis(200))))?;
        client.example().expect("example command bound").test()
    })
    .await
    .unwrap();

    assert!(matches!(
        result,
        Err(ClientError::Transport(TransportError::Timeout))
    ));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_reachable_server_even_on_not_found() {
    let server = MockServer::start().await;

    let address = *server.address();
    let reachable = tokio::task::spawn_blocking(move || {
        example_client(address, |b| b).map(|client| client.is_server_reachable())
    })
    .await
    .unwrap()
    .unwrap();

    assert!(reachable);
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests[0].method.as_str(), "HEAD");
    assert_eq!(requests[0].url.path(), "/1.0");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_closed_port_is_unreachable() {
    let address = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };

    let reachable = tokio::task::spawn_blocking(move || {
        example_client(address, |b| b.with_timeout(Some(Duration::from_secs(2))))
            .map(|client| client.is_server_reachable())
    })
    .await
    .unwrap()
    .unwrap();

    assert!(!reachable);
}
