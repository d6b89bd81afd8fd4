use fc_core::{Error, Result};
use reqwest::{Client, Response};

use crate::config::SourceConfig;

pub mod arxiv;
pub mod books;

/// Common utilities for fetchers
pub(crate) mod utils {
    use super::*;

    /// One pooled client per fetcher; the timeout bounds every request it makes.
    pub fn build_client(config: &SourceConfig) -> Result<Client> {
        Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout)
            .pool_max_idle_per_host(4)
            .build()
            .map_err(Error::from)
    }

    pub fn endpoint(base: &str, path: &str) -> String {
        format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
    }

    pub fn ensure_success(provider: &str, response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            Err(Error::Provider {
                provider: provider.to_string(),
                status: status.as_u16(),
            })
        }
    }

    pub fn collapse_whitespace(text: &str) -> String {
        text.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

#[cfg(test)]
pub(crate) mod test_server {
    use axum::Router;

    /// Serves `router` on an ephemeral local port and returns its base URL.
    pub async fn spawn(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }
}

#[cfg(test)]
mod tests {
    use super::utils;

    #[test]
    fn test_endpoint() {
        assert_eq!(utils::endpoint("http://h/api/", "/query"), "http://h/api/query");
        assert_eq!(utils::endpoint("http://h/books/v1", "volumes"), "http://h/books/v1/volumes");
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(utils::collapse_whitespace("  Deep\n   Learning\tfor X "), "Deep Learning for X");
    }
}
