//! Master playlist fetching over HTTP

use super::MasterPlaylist;
use crate::{
    error::Error,
    types::{MediaId, PlayerConfig},
    Result,
};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

/// Where master playlists come from
#[async_trait]
pub trait ManifestSource: Send + Sync {
    /// Fetch and parse the master playlist at `url`
    async fn fetch_master(&self, url: &Url) -> Result<MasterPlaylist>;

    /// Fetch the master playlist of `media_id` from the configured service
    async fn fetch_for(&self, config: &PlayerConfig, media_id: &MediaId) -> Result<MasterPlaylist> {
        let url = config.stream_url(media_id)?;
        self.fetch_master(&url).await
    }
}

/// [`ManifestSource`] backed by `reqwest`
pub struct HttpManifestSource {
    client: Client,
}

impl HttpManifestSource {
    pub fn new() -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ManifestSource for HttpManifestSource {
    #[instrument(skip(self), fields(url = %url))]
    async fn fetch_master(&self, url: &Url) -> Result<MasterPlaylist> {
        debug!("Fetching master playlist");

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| Error::ManifestFetch(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::ManifestFetch(format!("{} returned {}", url, status)));
        }

        let content = response
            .text()
            .await
            .map_err(|e| Error::ManifestFetch(e.to_string()))?;

        MasterPlaylist::parse(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::tests::UPLOAD_MASTER;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve one HTTP response on a local port
    async fn serve_once(status: &'static str, body: &'static str) -> Url {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await;
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/vnd.apple.mpegurl\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
        });
        Url::parse(&format!("http://{}/", addr)).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_for_media() {
        let base = serve_once("200 OK", UPLOAD_MASTER).await;
        let config = PlayerConfig::default().with_stream_base(base.as_str()).unwrap();
        let source = HttpManifestSource::new().unwrap();

        let playlist = source
            .fetch_for(&config, &MediaId::new("15").unwrap())
            .await
            .unwrap();
        assert_eq!(playlist.variants.len(), 4);
    }

    #[tokio::test]
    async fn test_fetch_not_found() {
        let url = serve_once("404 Not Found", "").await;
        let source = HttpManifestSource::new().unwrap();

        let err = source.fetch_master(&url).await.unwrap_err();
        assert!(matches!(err, Error::ManifestFetch(_)));
    }

    #[test]
    fn test_fetch_unreachable() {
        let source = HttpManifestSource::new().unwrap();
        let url = Url::parse("http://127.0.0.1:9/master.m3u8").unwrap();
        let result = tokio_test::block_on(source.fetch_master(&url));
        assert!(matches!(result, Err(Error::ManifestFetch(_))));
    }
}
