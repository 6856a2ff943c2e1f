//! Integration tests against a real instrument.
//!
//! These tests are gated by environment variables:
//! - `BONE_TEST_HOST`: instrument host (e.g., `10.0.0.5`); `BONE_TEST_PORT` overrides 6450
//! - `BONE_TEST_USER`, `BONE_TEST_PASSWORD`: login credentials

use std::pin::pin;
use std::time::Duration;

use bone_rs_client::protocol::command::{DEFAULT_KS_SYNC_FILTER, DEFAULT_SYNC_FILTER};
use bone_rs_client::{
    BoneClient, ClientConfig, ClientError, Credentials, DEFAULT_PORT, Position, SessionState,
    socket_addr,
};
use tokio_stream::StreamExt;

fn instrument() -> Option<String> {
    let host = std::env::var("BONE_TEST_HOST").ok()?;
    let port = std::env::var("BONE_TEST_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(DEFAULT_PORT);
    Some(socket_addr(&host, port))
}

fn credentials() -> Option<Credentials> {
    let user = std::env::var("BONE_TEST_USER").ok()?;
    let password = std::env::var("BONE_TEST_PASSWORD").ok()?;
    Some(Credentials::new(user, password))
}

async fn logged_in(addr: &str) -> Option<BoneClient> {
    let credentials = credentials()?;
    let config = ClientConfig {
        credentials: Some(credentials),
        read_timeout: Some(Duration::from_secs(15)),
        ..ClientConfig::default()
    };
    Some(BoneClient::connect_with_config(addr, config).await.unwrap())
}

#[tokio::test]
async fn login() {
    let Some(addr) = instrument() else {
        eprintln!("skipping: BONE_TEST_HOST not set");
        return;
    };
    let Some(client) = logged_in(&addr).await else {
        eprintln!("skipping: BONE_TEST_USER/BONE_TEST_PASSWORD not set");
        return;
    };
    assert_eq!(client.state(), SessionState::Authenticated);
    client.close().await.unwrap();
}

#[tokio::test]
async fn login_wrong_password() {
    let Some(addr) = instrument() else {
        eprintln!("skipping: BONE_TEST_HOST not set");
        return;
    };
    let Some(credentials) = credentials() else {
        eprintln!("skipping: BONE_TEST_USER not set");
        return;
    };

    let mut client = BoneClient::connect(&addr).await.unwrap();
    let result = client
        .login(&credentials.username, "definitely-not-the-password")
        .await;
    assert!(matches!(result, Err(ClientError::Auth(_))));
    assert_eq!(client.state(), SessionState::Unauthenticated);
}

#[tokio::test]
async fn streaming_commands() {
    let Some(addr) = instrument() else {
        eprintln!("skipping: BONE_TEST_HOST not set");
        return;
    };
    let Some(client) = logged_in(&addr).await else {
        eprintln!("skipping: BONE_TEST_USER/BONE_TEST_PASSWORD not set");
        return;
    };

    let volts = client.dv_data().await.unwrap();
    eprintln!("dv_data: {} channels", volts.len());
    assert!(volts.iter().all(|v| (-2.5..2.5).contains(v)));

    let (next, samples) = client.ks(0, 100, Position::ZERO).await.unwrap();
    eprintln!("ks: next={next}, {} samples", samples.len());

    let (next, matrix) = client
        .ks_sync_default_unit(100, Position::ZERO, &DEFAULT_KS_SYNC_FILTER)
        .await
        .unwrap();
    eprintln!(
        "ks_sync: next={next}, {}x{}",
        matrix.channel_count(),
        matrix.sample_count()
    );
    assert_eq!(matrix.channel_count(), DEFAULT_KS_SYNC_FILTER.len());

    let (next, sync) = client
        .sync(100, Position::ZERO, &DEFAULT_SYNC_FILTER)
        .await
        .unwrap();
    eprintln!("sync: next={next}, keys={:?}", sync.keys());
    assert_eq!(sync.runtime().map(<[f64]>::len), sync.amplitude().map(<[f64]>::len));
}

#[tokio::test]
async fn sync_stream_advances() {
    let Some(addr) = instrument() else {
        eprintln!("skipping: BONE_TEST_HOST not set");
        return;
    };
    let Some(client) = logged_in(&addr).await else {
        eprintln!("skipping: BONE_TEST_USER/BONE_TEST_PASSWORD not set");
        return;
    };

    let mut stream = pin!(client.sync_stream(
        100,
        Position::ZERO,
        &["saw", "int"],
        Duration::from_millis(100),
    ));
    for i in 0..3 {
        let (pos, data) = stream.next().await.unwrap().unwrap();
        eprintln!("block {i}: pos={pos}, keys={:?}", data.keys());
    }
}
