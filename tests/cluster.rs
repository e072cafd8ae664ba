//! End-to-end tests: a tonic coordinator and axum storage nodes on loopback
//! ports, driven through the networked client.

use bytes::Bytes;
use shardfs::client::{ChunkTransport, CoordClient, HttpTransport};
use shardfs::common::ClientConfig;
use shardfs::coordinator::grpc::CoordGrpcService;
use shardfs::coordinator::CoordinatorHandle;
use shardfs::storage::http::{create_router, NodeState};
use shardfs::storage::MemoryChunkStore;
use shardfs::{Client, Error};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::TcpListenerStream;

const TIMEOUT: Duration = Duration::from_secs(5);

async fn start_coordinator() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let service = CoordGrpcService::new(CoordinatorHandle::new(2));

    tokio::spawn(async move {
        tonic::transport::Server::builder()
            .add_service(service.into_server())
            .serve_with_incoming(TcpListenerStream::new(listener))
            .await
            .unwrap();
    });

    format!("http://{}", addr)
}

/// Start a storage node and register it the way `StorageServer` does.
async fn start_node(coordinator: &str) -> (String, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    let router = create_router(
        NodeState {
            store: Arc::new(MemoryChunkStore::new()),
        },
        1024 * 1024,
    );

    let handle = tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    CoordClient::connect(coordinator, TIMEOUT)
        .await
        .unwrap()
        .register_node(&addr)
        .await
        .unwrap();

    (addr, handle)
}

/// Start a node that accepts connections but never answers, and register it.
async fn start_unresponsive_node(coordinator: &str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    let router = axum::Router::new().fallback(|| async {
        tokio::time::sleep(Duration::from_secs(60)).await;
        axum::http::StatusCode::OK
    });

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    CoordClient::connect(coordinator, TIMEOUT)
        .await
        .unwrap()
        .register_node(&addr)
        .await
        .unwrap();

    addr
}

fn client_config(coordinator: &str, output_dir: &TempDir, chunk_size: u64) -> ClientConfig {
    ClientConfig {
        coordinator: coordinator.to_string(),
        chunk_size,
        rpc_timeout_ms: 5_000,
        http_timeout_ms: 2_000,
        output_dir: output_dir.path().to_path_buf(),
    }
}

fn payload(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 7 % 256) as u8).collect()
}

#[tokio::test]
async fn test_upload_download_over_network() {
    let coordinator = start_coordinator().await;
    let mut nodes = Vec::new();
    for _ in 0..3 {
        nodes.push(start_node(&coordinator).await);
    }

    let dir = TempDir::new().unwrap();
    let data = payload(50_000);
    let input = dir.path().join("archive.tar");
    std::fs::write(&input, &data).unwrap();

    let out = TempDir::new().unwrap();
    let client = Client::connect(client_config(&coordinator, &out, 8192))
        .await
        .unwrap();

    let summary = client.upload(&input, "archive").await.unwrap();
    assert_eq!(summary.total_chunks, 7);
    assert_eq!(summary.replica_writes, 14);

    let locations = client.locate("archive").await.unwrap();
    assert_eq!(locations.file_type, "tar");
    assert_eq!(locations.chunk_size, Some(8192));
    assert_eq!(locations.chunks.len(), 7);
    assert_eq!(locations.chunks[0].replicas, vec![nodes[0].0.clone(), nodes[1].0.clone()]);
    assert_eq!(locations.chunks[2].replicas, vec![nodes[2].0.clone(), nodes[0].0.clone()]);

    let output = client.download("archive").await.unwrap();
    assert_eq!(output, out.path().join("output.tar"));
    assert_eq!(std::fs::read(output).unwrap(), data);
}

#[tokio::test]
async fn test_download_survives_stopped_node() {
    let coordinator = start_coordinator().await;
    let (_first, first_handle) = start_node(&coordinator).await;
    let (_second, _second_handle) = start_node(&coordinator).await;

    let dir = TempDir::new().unwrap();
    let data = payload(20_000);
    let input = dir.path().join("photo.raw");
    std::fs::write(&input, &data).unwrap();

    let out = TempDir::new().unwrap();
    let client = Client::connect(client_config(&coordinator, &out, 4096))
        .await
        .unwrap();
    client.upload(&input, "photo").await.unwrap();

    first_handle.abort();
    let _ = first_handle.await;

    // fresh client so no pooled connection reaches the stopped node
    let client = Client::connect(client_config(&coordinator, &out, 4096))
        .await
        .unwrap();
    let output = client.download("photo").await.unwrap();
    assert_eq!(std::fs::read(output).unwrap(), data);
}

#[tokio::test]
async fn test_coordinator_errors_keep_their_kind() {
    let coordinator = start_coordinator().await;
    let out = TempDir::new().unwrap();
    let client = Client::connect(client_config(&coordinator, &out, 1024))
        .await
        .unwrap();

    let dir = TempDir::new().unwrap();
    let input = dir.path().join("early.txt");
    std::fs::write(&input, b"no nodes yet").unwrap();
    assert!(matches!(
        client.upload(&input, "early").await,
        Err(Error::NoNodesAvailable)
    ));

    match client.download("missing").await {
        Err(Error::FileNotFound(id)) => assert_eq!(id, "missing"),
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn test_unresponsive_replica_times_out() {
    let coordinator = start_coordinator().await;
    let stalled = start_unresponsive_node(&coordinator).await;
    let (healthy, _healthy_handle) = start_node(&coordinator).await;

    let dir = TempDir::new().unwrap();
    let data = payload(3_000);
    let input = dir.path().join("ledger.csv");
    std::fs::write(&input, &data).unwrap();

    let out = TempDir::new().unwrap();
    let mut config = client_config(&coordinator, &out, 1024);
    config.http_timeout_ms = 300;
    let client = Client::connect(config).await.unwrap();

    match client.upload(&input, "ledger").await {
        Err(Error::ReplicaWriteFailed { chunk, node, .. }) => {
            assert_eq!(chunk, 0);
            assert_eq!(node, stalled);
        }
        other => panic!("unexpected result: {:?}", other),
    }

    // the placement was recorded; fill in the healthy replica directly
    let transport = HttpTransport::new(TIMEOUT).unwrap();
    for (chunk_id, window) in data.chunks(1024).enumerate() {
        transport
            .put_chunk(&healthy, "ledger", chunk_id as u32, Bytes::copy_from_slice(window))
            .await
            .unwrap();
    }

    let locations = client.locate("ledger").await.unwrap();
    assert_eq!(locations.chunks[0].replicas, vec![stalled.clone(), healthy.clone()]);

    let output = client.download("ledger").await.unwrap();
    assert_eq!(output, out.path().join("output.csv"));
    assert_eq!(std::fs::read(output).unwrap(), data);
}
