//! Remote user source: the trait the cache talks to and its HTTP implementation.

use std::time::Duration;

use async_trait::async_trait;
use color_eyre::{eyre::eyre, Result};
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::error::SourceError;
use super::types::User;
use crate::config::ApiConfig;

/// Read and write access to the remote user directory.
#[async_trait]
pub trait UserSource: Send + Sync {
  /// Fetch every user, in server order.
  async fn fetch_all(&self) -> std::result::Result<Vec<User>, SourceError>;

  /// Replace the full record for `user.id`, returning the server's version.
  async fn replace(&self, user: &User) -> std::result::Result<User, SourceError>;
}

/// `UserSource` backed by a JSON REST API (`GET /users`, `PUT /users/{id}`).
#[derive(Clone)]
pub struct HttpUserSource {
  client: Client,
  users_url: Url,
}

impl HttpUserSource {
  pub fn new(config: &ApiConfig) -> Result<Self> {
    let users_url = users_url(&config.base_url)?;
    let client = Client::builder()
      .timeout(Duration::from_secs(config.timeout_secs))
      .user_agent(concat!("roster/", env!("CARGO_PKG_VERSION")))
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    Ok(Self { client, users_url })
  }

  fn user_url(&self, id: u64) -> Url {
    let mut url = self.users_url.clone();
    if let Ok(mut segments) = url.path_segments_mut() {
      segments.push(&id.to_string());
    }
    url
  }
}

#[async_trait]
impl UserSource for HttpUserSource {
  async fn fetch_all(&self) -> std::result::Result<Vec<User>, SourceError> {
    debug!(url = %self.users_url, "fetching users");

    let response = self
      .client
      .get(self.users_url.clone())
      .send()
      .await
      .map_err(transport_error)?;

    decode(response).await
  }

  async fn replace(&self, user: &User) -> std::result::Result<User, SourceError> {
    let url = self.user_url(user.id);
    debug!(%url, id = user.id, "replacing user");

    let response = self
      .client
      .put(url)
      .json(user)
      .send()
      .await
      .map_err(transport_error)?;

    decode(response).await
  }
}

/// Build `{base}/users`, tolerating a trailing slash on the base.
fn users_url(base_url: &str) -> Result<Url> {
  let raw = format!("{}/users", base_url.trim_end_matches('/'));
  Url::parse(&raw).map_err(|e| eyre!("Invalid API base URL {}: {}", base_url, e))
}

fn transport_error(e: reqwest::Error) -> SourceError {
  SourceError::Transport(e.to_string())
}

async fn decode<T: DeserializeOwned>(response: Response) -> std::result::Result<T, SourceError> {
  let status = response.status();
  if !status.is_success() {
    return Err(SourceError::Status {
      status: status.as_u16(),
      url: response.url().to_string(),
    });
  }

  let body = response.bytes().await.map_err(transport_error)?;
  serde_json::from_slice(&body).map_err(|e| SourceError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
  use super::*;
  use tokio::io::{AsyncReadExt, AsyncWriteExt};
  use tokio::net::TcpListener;
  use tokio::task::JoinHandle;

  const USERS_JSON: &str = r#"[
    {"id":1,"name":"Leanne Graham","username":"Bret","email":"Sincere@april.biz",
     "phone":"1-770-736-8031 x56442","website":"hildegard.org","company":{"name":"Romaguera-Crona"}},
    {"id":2,"name":"Ervin Howell","username":"Antonette","email":"Shanna@melissa.tv",
     "phone":"010-692-6593 x09125","website":"anastasia.net"}
  ]"#;

  /// Serve a single canned HTTP response and hand back the raw request.
  async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
      let (mut socket, _) = listener.accept().await.unwrap();
      let request = read_request(&mut socket).await;
      let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
      );
      socket.write_all(response.as_bytes()).await.unwrap();
      socket.shutdown().await.ok();
      request
    });

    (format!("http://{}", addr), handle)
  }

  async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
      let n = socket.read(&mut chunk).await.unwrap();
      if n == 0 {
        break;
      }
      buf.extend_from_slice(&chunk[..n]);

      let text = String::from_utf8_lossy(&buf).to_string();
      if let Some(header_end) = text.find("\r\n\r\n") {
        let content_length = text[..header_end]
          .lines()
          .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            name
              .eq_ignore_ascii_case("content-length")
              .then(|| value.trim().parse::<usize>().ok())
              .flatten()
          })
          .unwrap_or(0);
        if buf.len() >= header_end + 4 + content_length {
          break;
        }
      }
    }
    String::from_utf8_lossy(&buf).to_string()
  }

  fn source_for(base_url: &str) -> HttpUserSource {
    HttpUserSource::new(&ApiConfig {
      base_url: base_url.to_string(),
      timeout_secs: 5,
    })
    .unwrap()
  }

  fn sample_user() -> User {
    User {
      id: 2,
      name: "Ervin Howell".to_string(),
      username: "Antonette".to_string(),
      email: "shanna@melissa.tv".to_string(),
      phone: "010-692-6593".to_string(),
      website: "https://anastasia.net".to_string(),
    }
  }

  #[test]
  fn test_users_url_trailing_slash() {
    assert_eq!(
      users_url("https://example.com/").unwrap().as_str(),
      "https://example.com/users"
    );
    assert_eq!(
      users_url("https://example.com/api").unwrap().as_str(),
      "https://example.com/api/users"
    );
  }

  #[test]
  fn test_users_url_rejects_garbage() {
    assert!(users_url("not a url").is_err());
  }

  #[test]
  fn test_user_url_appends_id() {
    let source = source_for("https://example.com");
    assert_eq!(source.user_url(42).as_str(), "https://example.com/users/42");
  }

  #[tokio::test]
  async fn test_fetch_all_decodes_users() {
    let (base, server) = serve_once("200 OK", USERS_JSON).await;
    let users = source_for(&base).fetch_all().await.unwrap();

    assert_eq!(users.len(), 2);
    assert_eq!(users[0].name, "Leanne Graham");
    assert_eq!(users[1].id, 2);

    let request = server.await.unwrap();
    assert!(request.starts_with("GET /users HTTP/1.1"));
  }

  #[tokio::test]
  async fn test_fetch_all_maps_status_error() {
    let (base, server) = serve_once("503 Service Unavailable", "").await;
    let err = source_for(&base).fetch_all().await.unwrap_err();

    assert!(matches!(err, SourceError::Status { status: 503, .. }));
    server.await.unwrap();
  }

  #[tokio::test]
  async fn test_fetch_all_maps_decode_error() {
    let (base, server) = serve_once("200 OK", r#"{"not":"a list"}"#).await;
    let err = source_for(&base).fetch_all().await.unwrap_err();

    assert!(matches!(err, SourceError::Decode(_)));
    server.await.unwrap();
  }

  #[tokio::test]
  async fn test_fetch_all_maps_transport_error() {
    // Bind then drop to get a port with nothing listening.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = source_for(&format!("http://{}", addr))
      .fetch_all()
      .await
      .unwrap_err();
    assert!(matches!(err, SourceError::Transport(_)));
  }

  #[tokio::test]
  async fn test_replace_puts_json_body() {
    let body = r#"{"id":2,"name":"Ervin Howell","username":"Antonette","email":"shanna@melissa.tv","phone":"010-692-6593","website":"https://anastasia.net"}"#;
    let (base, server) = serve_once("200 OK", body).await;

    let user = sample_user();
    let returned = source_for(&base).replace(&user).await.unwrap();
    assert_eq!(returned, user);

    let request = server.await.unwrap();
    assert!(request.starts_with("PUT /users/2 HTTP/1.1"));
    assert!(request.contains(r#""username":"Antonette""#));
  }

  #[tokio::test]
  async fn test_replace_maps_status_error() {
    let (base, server) = serve_once("404 Not Found", "{}").await;
    let err = source_for(&base).replace(&sample_user()).await.unwrap_err();

    assert!(matches!(err, SourceError::Status { status: 404, .. }));
    server.await.unwrap();
  }
}
