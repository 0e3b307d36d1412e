//! Prediction Service REST Client
//!
//! HTTP client for the external prediction service.

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::types::{
    CityRequest, FeatureImportance, Hotspot, Prediction, PredictionRequest, StatusResponse,
    StrategiesResponse,
};
use super::{PredictionService, ServiceError};

/// Default base URL of the prediction service
pub const DEFAULT_SERVICE_URL: &str = "http://localhost:8000";

/// Configuration for the prediction service client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL for the service API (e.g., "http://localhost:8000")
    pub base_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_SERVICE_URL.to_string(),
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

/// reqwest-backed prediction service client
pub struct PredictionClient {
    client: Client,
    config: ClientConfig,
}

impl PredictionClient {
    /// Create a new client with the given configuration
    pub fn new(config: ClientConfig) -> Result<Self, ServiceError> {
        let client = Client::builder()
            .user_agent(concat!("aidscro/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client, config })
    }

    /// Get the current configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ServiceError> {
        let url = self.url(path);
        tracing::debug!(url = %url, "GET prediction service");

        let response = self.client.get(&url).send().await.map_err(classify)?;
        read_json(response).await
    }

    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ServiceError> {
        let url = self.url(path);
        tracing::debug!(url = %url, "POST prediction service");

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(classify)?;
        read_json(response).await
    }
}

#[async_trait]
impl PredictionService for PredictionClient {
    async fn feature_importance(&self) -> Result<FeatureImportance, ServiceError> {
        self.get_json("/feature_importance").await
    }

    async fn predict(&self, request: &PredictionRequest) -> Result<Prediction, ServiceError> {
        let body: serde_json::Value = self.post_json("/predict", request).await?;
        Prediction::from_body(&body)
            .ok_or_else(|| ServiceError::Decode("response has no numeric prediction".to_string()))
    }

    async fn predict_city(&self, request: &CityRequest) -> Result<Vec<Hotspot>, ServiceError> {
        self.post_json("/api/predict", request).await
    }

    async fn optimization_strategies(&self) -> Result<Vec<String>, ServiceError> {
        let body: StrategiesResponse = self.get_json("/optimize").await?;
        Ok(body.optimization_strategies)
    }

    async fn status(&self) -> Result<String, ServiceError> {
        let body: StatusResponse = self.get_json("/").await?;
        Ok(body.message)
    }
}

fn classify(e: reqwest::Error) -> ServiceError {
    if e.is_timeout() {
        ServiceError::Timeout
    } else if e.is_connect() {
        ServiceError::Unavailable
    } else {
        ServiceError::Request(e)
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ServiceError> {
    let status = response.status();

    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        return Err(ServiceError::Api {
            status: status.as_u16(),
            message: text,
        });
    }

    response
        .json()
        .await
        .map_err(|e| ServiceError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        http::StatusCode,
        routing::{get, post},
        Json, Router,
    };
    use serde_json::{json, Value};

    /// Serve a throwaway mock of the prediction service on an ephemeral port
    async fn spawn_service(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn client_for(base_url: &str) -> PredictionClient {
        PredictionClient::new(ClientConfig::new(base_url)).unwrap()
    }

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "http://localhost:8000");
    }

    #[test]
    fn test_url_trims_trailing_slash() {
        let client = client_for("http://localhost:8000/");
        assert_eq!(client.url("/predict"), "http://localhost:8000/predict");
    }

    #[tokio::test]
    async fn test_feature_importance_roundtrip() {
        let router = Router::new().route(
            "/feature_importance",
            get(|| async { r#"{"traffic_density": 0.6, "hour": 0.3}"# }),
        );
        let base = spawn_service(router).await;

        let importance = client_for(&base).feature_importance().await.unwrap();
        assert_eq!(importance.len(), 2);
        assert_eq!(importance.entries()[0].0, "traffic_density");
    }

    #[tokio::test]
    async fn test_predict_posts_form_fields() {
        let router = Router::new().route(
            "/predict",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["origin"], json!("Mitte"));
                assert_eq!(body["is_holiday"], json!(1));
                Json(json!({"predicted_duration": 18.5}))
            }),
        );
        let base = spawn_service(router).await;

        let request = PredictionRequest {
            origin: "Mitte".to_string(),
            is_holiday: true,
            ..Default::default()
        };
        let prediction = client_for(&base).predict(&request).await.unwrap();
        assert_eq!(prediction.predicted, 18.5);
    }

    #[tokio::test]
    async fn test_predict_city() {
        let router = Router::new().route(
            "/api/predict",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body, json!({"city": "Berlin"}));
                Json(json!([{"lat": 52.5, "lon": 13.4, "jam_factor": 3}]))
            }),
        );
        let base = spawn_service(router).await;

        let hotspots = client_for(&base)
            .predict_city(&CityRequest {
                city: "Berlin".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(
            hotspots,
            vec![Hotspot {
                lat: 52.5,
                lon: 13.4,
                jam_factor: 3.0
            }]
        );
    }

    #[tokio::test]
    async fn test_non_success_status_is_api_error() {
        let router = Router::new().route(
            "/predict",
            post(|| async { (StatusCode::BAD_REQUEST, "model not trained") }),
        );
        let base = spawn_service(router).await;

        let err = client_for(&base)
            .predict(&PredictionRequest::default())
            .await
            .unwrap_err();
        match err {
            ServiceError::Api { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "model not trained");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_body_is_decode_error() {
        let router = Router::new().route("/predict", post(|| async { Json(json!({"ok": true})) }));
        let base = spawn_service(router).await;

        let err = client_for(&base)
            .predict(&PredictionRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Decode(_)));
    }

    #[tokio::test]
    async fn test_strategies_and_status() {
        let router = Router::new()
            .route(
                "/",
                get(|| async { Json(json!({"message": "Welcome to AIDSCRO API"})) }),
            )
            .route(
                "/optimize",
                get(|| async {
                    Json(json!({"optimization_strategies": ["Shift load to off-peak hours"]}))
                }),
            );
        let base = spawn_service(router).await;
        let client = client_for(&base);

        assert_eq!(client.status().await.unwrap(), "Welcome to AIDSCRO API");
        assert_eq!(
            client.optimization_strategies().await.unwrap(),
            vec!["Shift load to off-peak hours".to_string()]
        );
    }

    #[tokio::test]
    async fn test_unreachable_service() {
        // Bind then drop to get a port with nothing listening
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = client_for(&format!("http://{}", addr))
            .feature_importance()
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Unavailable));
    }
}
