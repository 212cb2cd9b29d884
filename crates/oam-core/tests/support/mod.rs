//! Shared HTTP fixture for integration tests.
//!
//! Serves a minimal stand-in for the release-metadata and artifact
//! download endpoints on a loopback port.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tiny_http::{Response, Server};

pub struct ReleaseFixture {
    server: Arc<Server>,
    base_url: String,
    handle: Option<JoinHandle<()>>,
}

impl ReleaseFixture {
    /// Serve `tag` from the metadata route and deterministic jar bodies
    /// from the download route.
    pub fn with_tag(tag: &str) -> Self {
        Self::new(200, format!(r#"{{"tag_name":"{tag}"}}"#))
    }

    /// Serve an arbitrary metadata response. Download requests for a
    /// version starting with "404" return HTTP 404.
    pub fn new(metadata_status: u16, metadata_body: String) -> Self {
        let server = Arc::new(Server::http("127.0.0.1:0").expect("bind fixture server"));
        let addr = server.server_addr().to_ip().expect("fixture server address");
        let base_url = format!("http://{addr}");

        let srv = Arc::clone(&server);
        let handle = thread::spawn(move || {
            for request in srv.incoming_requests() {
                let url = request.url().to_string();
                let response = if url.ends_with("/releases/latest") {
                    Response::from_string(metadata_body.clone())
                        .with_status_code(metadata_status)
                } else if let Some(version) = download_version(&url) {
                    if version.starts_with("404") {
                        Response::from_string("not found").with_status_code(404)
                    } else {
                        Response::from_string(jar_body(&version))
                    }
                } else {
                    Response::from_string("no route").with_status_code(404)
                };
                let _ = request.respond(response);
            }
        });

        ReleaseFixture {
            server,
            base_url,
            handle: Some(handle),
        }
    }

    pub fn metadata_url(&self) -> String {
        format!("{}/releases/latest", self.base_url)
    }

    pub fn download_base(&self) -> String {
        format!("{}/download", self.base_url)
    }
}

impl Drop for ReleaseFixture {
    fn drop(&mut self) {
        self.server.unblock();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// Body served for a given version; tests assert on these bytes.
pub fn jar_body(version: &str) -> String {
    format!("agent-bytes-{version}")
}

fn download_version(url: &str) -> Option<String> {
    // /download/v<version>/splunk-otel-javaagent.jar
    let rest = url.strip_prefix("/download/v")?;
    let (version, _) = rest.split_once('/')?;
    Some(version.to_string())
}
