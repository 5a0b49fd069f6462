//! Mock HTTP servers for remote provider tests

use mockito::{Matcher, Mock, Server, ServerGuard};
use std::net::SocketAddr;
use tokio::net::TcpListener;

pub const OPENAI_PATH: &str = "/v1/audio/speech";
pub const YANDEX_PATH: &str = "/speech/v1/tts:synthesize";

pub fn elevenlabs_path(voice: &str) -> String {
    format!("/v1/text-to-speech/{}", voice)
}

/// Test fixture that owns a mockito server
pub struct MockServerFixture {
    pub server: ServerGuard,
    pub base_url: String,
}

impl MockServerFixture {
    pub async fn new() -> Self {
        let server = Server::new_async().await;
        let base_url = server.url();
        Self { server, base_url }
    }

    /// Successful audio response
    pub async fn mock_audio(&mut self, path: &str, body: &[u8]) -> Mock {
        self.server
            .mock("POST", path)
            .with_status(200)
            .with_header("content-type", "audio/mpeg")
            .with_body(body)
            .create_async()
            .await
    }

    /// JSON response that must be requested exactly `hits` times
    pub async fn mock_json_response(&mut self, path: &str, status: usize, body: &str, hits: usize) -> Mock {
        self.server
            .mock("POST", path)
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(body)
            .expect(hits)
            .create_async()
            .await
    }

    /// Any request to any path; asserting it proves the network was never touched
    pub async fn mock_untouched(&mut self) -> Mock {
        self.server
            .mock("POST", Matcher::Any)
            .with_status(200)
            .expect(0)
            .create_async()
            .await
    }
}

/// A server that accepts connections and never answers, keeping a request
/// in flight until the client gives up on it.
pub async fn hanging_server() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    addr
}
