use std::collections::HashMap;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, StatusCode};
use serde_json::Value;
use tracing::{debug, error};
use void_errors::{VoidError, VoidResult};

/// 外部 HTTP 调用配置
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub default_headers: HashMap<String, String>,
}

impl HttpClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(30),
            default_headers: HashMap::new(),
        }
    }
}

/// 单次请求的可选参数：查询参数、附加请求头、超时覆盖
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub params: Vec<(String, String)>,
    pub headers: HashMap<String, String>,
    pub timeout: Option<Duration>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// 面向外部 JSON API 的出站 HTTP 客户端
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
    default_headers: HeaderMap,
}

impl HttpClient {
    pub fn new(config: HttpClientConfig) -> VoidResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| VoidError::internal(format!("创建 HTTP 客户端失败: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url,
            default_headers: to_header_map(&config.default_headers)?,
        })
    }

    /// 绝对地址原样返回，否则拼接到 base_url 之后
    pub fn build_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// 单次请求头覆盖默认请求头
    pub fn merge_headers(&self, headers: Option<&HashMap<String, String>>) -> VoidResult<HeaderMap> {
        let mut merged = self.default_headers.clone();
        if let Some(headers) = headers {
            for (name, value) in to_header_map(headers)? {
                if let Some(name) = name {
                    merged.insert(name, value);
                }
            }
        }
        Ok(merged)
    }

    pub async fn get_json(&self, path: &str, options: RequestOptions) -> VoidResult<Value> {
        let response = self.request(Method::GET, path, None, options).await?;
        require_body(Method::GET, path, response)
    }

    pub async fn post_json(
        &self,
        path: &str,
        body: &Value,
        options: RequestOptions,
    ) -> VoidResult<Value> {
        let response = self.request(Method::POST, path, Some(body), options).await?;
        require_body(Method::POST, path, response)
    }

    pub async fn put_json(
        &self,
        path: &str,
        body: &Value,
        options: RequestOptions,
    ) -> VoidResult<Value> {
        let response = self.request(Method::PUT, path, Some(body), options).await?;
        require_body(Method::PUT, path, response)
    }

    /// 204 No Content 返回 `None`
    pub async fn delete(&self, path: &str, options: RequestOptions) -> VoidResult<Option<Value>> {
        self.request(Method::DELETE, path, None, options).await
    }

    /// 通用请求；响应为 204 No Content 时返回 `None`
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        options: RequestOptions,
    ) -> VoidResult<Option<Value>> {
        let url = self.build_url(path);
        let mut request = self
            .client
            .request(method.clone(), &url)
            .headers(self.merge_headers(Some(&options.headers))?);
        if !options.params.is_empty() {
            request = request.query(&options.params);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        if let Some(timeout) = options.timeout {
            request = request.timeout(timeout);
        }

        debug!("{} {}", method, url);
        let response = request
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| {
                error!("HTTP {} {} 失败: {}", method, url, e);
                VoidError::network_error(format!("{method} {url} failed: {e}"))
            })?;

        if response.status() == StatusCode::NO_CONTENT {
            return Ok(None);
        }

        response.json::<Value>().await.map(Some).map_err(|e| {
            error!("解析 {} 响应失败: {}", url, e);
            VoidError::network_error(format!("Invalid JSON from {url}: {e}"))
        })
    }
}

fn require_body(method: Method, path: &str, response: Option<Value>) -> VoidResult<Value> {
    response.ok_or_else(|| {
        VoidError::network_error(format!("{method} {path} returned no content"))
    })
}

fn to_header_map(headers: &HashMap<String, String>) -> VoidResult<HeaderMap> {
    let mut map = HeaderMap::new();
    for (name, value) in headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| VoidError::validation_error(format!("无效的请求头 {name}: {e}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| VoidError::validation_error(format!("无效的请求头值 {name}: {e}")))?;
        map.insert(name, value);
    }
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> HttpClient {
        let mut config = HttpClientConfig::new(server.uri());
        config
            .default_headers
            .insert("x-api-key".to_string(), "default-key".to_string());
        HttpClient::new(config).unwrap()
    }

    #[test]
    fn test_build_url() {
        let client = HttpClient::new(HttpClientConfig::new("https://api.example.com/v1/")).unwrap();
        assert_eq!(client.build_url("/items"), "https://api.example.com/v1/items");
        assert_eq!(client.build_url("items/1"), "https://api.example.com/v1/items/1");
        assert_eq!(
            client.build_url("http://other.example.com/x"),
            "http://other.example.com/x"
        );
    }

    #[test]
    fn test_merge_headers_overrides_defaults() {
        let mut config = HttpClientConfig::new("https://api.example.com");
        config
            .default_headers
            .insert("x-api-key".to_string(), "default".to_string());
        config
            .default_headers
            .insert("accept".to_string(), "application/json".to_string());
        let client = HttpClient::new(config).unwrap();

        let extra = HashMap::from([("x-api-key".to_string(), "override".to_string())]);
        let merged = client.merge_headers(Some(&extra)).unwrap();
        assert_eq!(merged.get("x-api-key").unwrap(), "override");
        assert_eq!(merged.get("accept").unwrap(), "application/json");
    }

    #[tokio::test]
    async fn test_get_json() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/items"))
            .and(query_param("page", "2"))
            .and(header("x-api-key", "default-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let body = client
            .get_json("/items", RequestOptions::new().param("page", "2"))
            .await
            .unwrap();
        assert_eq!(body, json!({"items": []}));
    }

    #[tokio::test]
    async fn test_post_json() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/items"))
            .and(body_json(json!({"name": "Widget"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "1"})))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let body = client
            .post_json("items", &json!({"name": "Widget"}), RequestOptions::new())
            .await
            .unwrap();
        assert_eq!(body["id"], "1");
    }

    #[tokio::test]
    async fn test_error_status_is_network_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client
            .get_json("/down", RequestOptions::new())
            .await
            .unwrap_err();
        assert!(matches!(err, VoidError::Network(_)));
    }

    #[tokio::test]
    async fn test_put_json_with_header_override() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/items/1"))
            .and(header("x-api-key", "per-call"))
            .and(body_json(json!({"status": "archived"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "1"})))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let body = client
            .put_json(
                "/items/1",
                &json!({"status": "archived"}),
                RequestOptions::new().header("x-api-key", "per-call"),
            )
            .await
            .unwrap();
        assert_eq!(body["id"], "1");
    }

    #[tokio::test]
    async fn test_delete_no_content_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/items/1"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/items/2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"deleted": true})))
            .mount(&server)
            .await;

        let client = client_for(&server);
        assert_eq!(client.delete("/items/1", RequestOptions::new()).await.unwrap(), None);
        assert_eq!(
            client.delete("/items/2", RequestOptions::new()).await.unwrap(),
            Some(json!({"deleted": true}))
        );
    }

    #[tokio::test]
    async fn test_request_with_arbitrary_method() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/items/1"))
            .and(query_param("notify", "false"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let response = client
            .request(
                Method::PATCH,
                "/items/1",
                Some(&json!({"name": "Gadget"})),
                RequestOptions::new().param("notify", "false"),
            )
            .await
            .unwrap();
        assert!(response.is_none());
    }

    #[tokio::test]
    async fn test_json_call_without_content_is_network_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client
            .get_json("/empty", RequestOptions::new())
            .await
            .unwrap_err();
        assert!(matches!(err, VoidError::Network(_)));
    }

    #[tokio::test]
    async fn test_per_call_timeout_overrides_default() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({}))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client
            .get_json(
                "/slow",
                RequestOptions::new().timeout(Duration::from_millis(50)),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, VoidError::Network(_)));
    }
}
