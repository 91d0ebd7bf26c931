use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, error, info};

use crate::config;
use crate::host::Host;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("unsupported source scheme '{scheme}' in {source_url}")]
    UnsupportedScheme { scheme: String, source_url: String },

    #[error("failed to build HTTP client: {source}")]
    ClientBuild {
        #[source]
        source: reqwest::Error,
    },

    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("request to {url} returned status {status}")]
    Status { url: String, status: u16 },

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse hosts from {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DataSource {
    Url(reqwest::Url),
    File(PathBuf),
}

impl DataSource {
    pub fn parse(value: &str) -> Result<DataSource, LoadError> {
        let trimmed = value.trim();
        match reqwest::Url::parse(trimmed) {
            Ok(url) => match url.scheme() {
                "http" | "https" => Ok(DataSource::Url(url)),
                "file" => url
                    .to_file_path()
                    .map(DataSource::File)
                    .map_err(|_| LoadError::UnsupportedScheme {
                        scheme: "file".to_string(),
                        source_url: trimmed.to_string(),
                    }),
                // a bare drive letter (C:\hosts.json) parses as a one-letter scheme
                scheme if scheme.len() == 1 => Ok(DataSource::File(PathBuf::from(trimmed))),
                scheme => Err(LoadError::UnsupportedScheme {
                    scheme: scheme.to_string(),
                    source_url: trimmed.to_string(),
                }),
            },
            Err(_) => Ok(DataSource::File(config::expand_tilde(trimmed))),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            DataSource::Url(url) => url.to_string(),
            DataSource::File(path) => path.display().to_string(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Loader {
    source: DataSource,
    timeout: Duration,
}

impl Loader {
    pub fn new(source: DataSource) -> Self {
        Self {
            source,
            timeout: Duration::from_secs(config::LOAD_TIMEOUT_SECS),
        }
    }

    pub fn from_source(value: &str) -> Result<Self, LoadError> {
        Ok(Self::new(DataSource::parse(value)?))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn source(&self) -> &DataSource {
        &self.source
    }

    pub async fn fetch(&self) -> Result<Vec<Host>, LoadError> {
        let origin = self.source.describe();
        let body = match &self.source {
            DataSource::Url(url) => self.fetch_url(url).await?,
            DataSource::File(path) => {
                tokio::fs::read(path)
                    .await
                    .map_err(|e| LoadError::Io {
                        path: origin.clone(),
                        source: e,
                    })?
            }
        };
        debug!(source = %origin, bytes = body.len(), "hosts document retrieved");
        parse_hosts(&body, &origin)
    }

    async fn fetch_url(&self, url: &reqwest::Url) -> Result<Vec<u8>, LoadError> {
        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| LoadError::ClientBuild { source: e })?;
        let response = client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| LoadError::Http {
                url: url.to_string(),
                source: e,
            })?;
        let status = response.status();
        if !status.is_success() {
            return Err(LoadError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        let bytes = response.bytes().await.map_err(|e| LoadError::Http {
            url: url.to_string(),
            source: e,
        })?;
        Ok(bytes.to_vec())
    }

    /// Fetches the hosts and hands them to `on_load`.
    ///
    /// Failures are logged and yield `None`; `on_load` is not called then.
    pub async fn load<T, F>(&self, on_load: F) -> Option<T>
    where
        F: FnOnce(Vec<Host>) -> T,
    {
        match self.fetch().await {
            Ok(hosts) => {
                info!(source = %self.source.describe(), count = hosts.len(), "hosts loaded");
                Some(on_load(hosts))
            }
            Err(e) => {
                error!(source = %self.source.describe(), error = %e, "failed to load hosts");
                None
            }
        }
    }
}

pub fn parse_hosts(body: &[u8], origin: &str) -> Result<Vec<Host>, LoadError> {
    serde_json::from_slice::<Vec<Host>>(body).map_err(|e| LoadError::Parse {
        origin: origin.to_string(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_file(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("hostlist-{}-{name}", std::process::id()));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn source_parsing() {
        assert!(matches!(
            DataSource::parse("https://example.com/data/hosts.json").unwrap(),
            DataSource::Url(_)
        ));
        assert_eq!(
            DataSource::parse("data/hosts.json").unwrap(),
            DataSource::File(PathBuf::from("data/hosts.json"))
        );
        assert!(matches!(
            DataSource::parse("ftp://example.com/hosts.json"),
            Err(LoadError::UnsupportedScheme { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn file_urls_become_paths() {
        assert_eq!(
            DataSource::parse("file:///srv/hosts.json").unwrap(),
            DataSource::File(PathBuf::from("/srv/hosts.json"))
        );
    }

    #[tokio::test]
    async fn fetch_reads_a_json_array_from_disk() {
        let path = temp_file(
            "ok.json",
            r#"[{"name":"Casa Azul","rating":8.6,"price":120,"stars":4},{"name":"Villa"}]"#,
        );
        let loader = Loader::new(DataSource::File(path.clone()));
        let hosts = loader.fetch().await.unwrap();
        assert_eq!(hosts.len(), 2);
        assert_eq!(hosts[0].name, "Casa Azul");
        assert_eq!(hosts[1].price, 0);
        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn mixed_field_types_do_not_fail_the_load() {
        let path = temp_file(
            "mixed.json",
            r#"[
                {"name":"Casa Azul","price":120,"rating":8.6,"stars":4},
                {"name":"Riad","price":99.5,"rating":null,"stars":"5"},
                {"name":null,"price":"75","rating":"8.1","stars":4.0,"location":42}
            ]"#,
        );
        let loader = Loader::new(DataSource::File(path.clone()));
        let hosts = loader.fetch().await.unwrap();
        assert_eq!(hosts.len(), 3);

        assert_eq!(hosts[1].price, 100);
        assert_eq!(hosts[1].rating, 0.0);
        assert_eq!(hosts[1].stars, 5);

        assert_eq!(hosts[2].name, "");
        assert_eq!(hosts[2].location, "42");
        assert_eq!(hosts[2].price, 75);
        assert!((hosts[2].rating - 8.1).abs() < 1e-6);
        assert_eq!(hosts[2].stars, 4);
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn negative_and_oversized_numbers_are_clamped() {
        let hosts = parse_hosts(br#"[{"price":-3,"stars":900}]"#, "inline").unwrap();
        assert_eq!(hosts[0].price, 0);
        assert_eq!(hosts[0].stars, 255);
    }

    #[tokio::test]
    async fn load_invokes_callback_only_on_success() {
        let path = temp_file("cb.json", r#"[{"name":"a"},{"name":"b"},{"name":"c"}]"#);
        let loader = Loader::new(DataSource::File(path.clone()));
        let count = loader.load(|hosts| hosts.len()).await;
        assert_eq!(count, Some(3));
        let _ = std::fs::remove_file(path);

        let missing = Loader::new(DataSource::File(PathBuf::from(
            "/definitely/not/here/hosts.json",
        )));
        let mut called = false;
        let result = missing.load(|_| called = true).await;
        assert!(result.is_none());
        assert!(!called);
    }

    #[tokio::test]
    async fn malformed_documents_are_parse_errors() {
        let path = temp_file("bad.json", r#"{"name":"not an array"}"#);
        let loader = Loader::new(DataSource::File(path.clone()));
        assert!(matches!(loader.fetch().await, Err(LoadError::Parse { .. })));
        let _ = std::fs::remove_file(path);

        let path = temp_file("truncated.json", r#"[{"name":"#);
        let loader = Loader::new(DataSource::File(path.clone()));
        assert!(matches!(loader.fetch().await, Err(LoadError::Parse { .. })));
        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn missing_file_is_an_io_error() {
        let loader = Loader::new(DataSource::File(PathBuf::from(
            "/definitely/not/here/hosts.json",
        )));
        assert!(matches!(loader.fetch().await, Err(LoadError::Io { .. })));
    }
}
