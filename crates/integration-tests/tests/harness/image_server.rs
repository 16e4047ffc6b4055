//! HTTP image host backed by `wiremock`

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Serves fixed image bodies under `/images/<name>`
pub struct ImageServer {
    server: MockServer,
}

impl ImageServer {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Serve `body` at `/images/<name>`, expecting exactly `hits` requests
    pub async fn serve(&self, name: &str, body: &[u8], hits: u64) -> String {
        Mock::given(method("GET"))
            .and(path(format!("/images/{name}")))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(body.to_vec()))
            .expect(hits)
            .mount(&self.server)
            .await;

        self.url(name)
    }

    /// Answer `/images/<name>` with the given status
    pub async fn fail(&self, name: &str, status: u16) -> String {
        Mock::given(method("GET"))
            .and(path(format!("/images/{name}")))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.server)
            .await;

        self.url(name)
    }

    pub fn url(&self, name: &str) -> String {
        format!("{}/images/{name}", self.server.uri())
    }

    /// Check the `expect` counts
    pub async fn verify(&self) {
        self.server.verify().await;
    }
}
