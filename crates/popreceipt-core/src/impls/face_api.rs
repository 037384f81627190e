//! FaceApiClient - 顔検出 REST API のクライアント
//!
//! `POST {endpoint}/face/v1.0/detect` に画像をそのまま送り、
//! 推定年齢だけを取り出します。
//!
//! エラー時のレスポンスは `{"error": {"code": "...", "message": "..."}}` の形。

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use tracing::debug;

use crate::domain::{ClassifyError, Detection, FaceAttribute};
use crate::ports::FaceDetector;

pub const DEFAULT_FACE_ENDPOINT: &str = "https://westus.api.cognitive.microsoft.com";

const DETECT_PATH: &str = "/face/v1.0/detect";
const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DetectedFace {
    #[serde(default)]
    face_attributes: Option<DetectedAttributes>,
}

#[derive(Debug, Deserialize)]
struct DetectedAttributes {
    age: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    code: String,
    message: String,
}

#[derive(Clone)]
pub struct FaceApiClient {
    http: reqwest::Client,
    endpoint: String,
    subscription_key: String,
}

impl FaceApiClient {
    pub fn new(endpoint: impl Into<String>, subscription_key: impl Into<String>) -> Self {
        Self::with_http_client(reqwest::Client::new(), endpoint, subscription_key)
    }

    pub fn with_http_client(
        http: reqwest::Client,
        endpoint: impl Into<String>,
        subscription_key: impl Into<String>,
    ) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
            subscription_key: subscription_key.into(),
        }
    }

    fn detect_url(&self) -> String {
        format!("{}{}", self.endpoint.trim_end_matches('/'), DETECT_PATH)
    }
}

impl std::fmt::Debug for FaceApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // subscription key は出さない
        f.debug_struct("FaceApiClient")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl FaceDetector for FaceApiClient {
    async fn detect(
        &self,
        content: Bytes,
        attributes: &[FaceAttribute],
    ) -> Result<Vec<Detection>, ClassifyError> {
        let requested = attributes
            .iter()
            .map(FaceAttribute::as_str)
            .collect::<Vec<_>>()
            .join(",");

        let response = self
            .http
            .post(self.detect_url())
            .query(&[
                ("returnFaceId", "false"),
                ("returnFaceLandmarks", "false"),
                ("returnFaceAttributes", requested.as_str()),
            ])
            .header(SUBSCRIPTION_KEY_HEADER, &self.subscription_key)
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(content)
            .send()
            .await
            .map_err(|e| ClassifyError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .map_err(|e| ClassifyError::Transport(e.to_string()))?;
            return Err(match serde_json::from_str::<ErrorEnvelope>(&body) {
                Ok(envelope) => ClassifyError::Service {
                    status: status.as_u16(),
                    code: envelope.error.code,
                    message: envelope.error.message,
                },
                Err(_) => ClassifyError::Service {
                    status: status.as_u16(),
                    code: status.as_str().to_string(),
                    message: body,
                },
            });
        }

        let faces: Vec<DetectedFace> = response
            .json()
            .await
            .map_err(|e| ClassifyError::Decode(e.to_string()))?;
        debug!(faces = faces.len(), "face API responded");

        faces
            .into_iter()
            .enumerate()
            .map(|(index, face)| {
                face.face_attributes
                    .and_then(|attributes| attributes.age)
                    .map(Detection::with_age)
                    .ok_or_else(|| {
                        ClassifyError::Decode(format!("face #{} has no age estimate", index + 1))
                    })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    const KEY: &str = "test-key";

    #[tokio::test]
    async fn detect_sends_image_and_reads_ages() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/face/v1.0/detect")
                    .query_param("returnFaceId", "false")
                    .query_param("returnFaceAttributes", "age")
                    .header("ocp-apim-subscription-key", KEY)
                    .header("content-type", "application/octet-stream")
                    .body("jpeg-bytes");
                then.status(200).json_body(json!([
                    {
                        "faceRectangle": {"top": 10, "left": 20, "width": 30, "height": 30},
                        "faceAttributes": {"age": 34.0}
                    },
                    {
                        "faceRectangle": {"top": 50, "left": 60, "width": 30, "height": 30},
                        "faceAttributes": {"age": 6.5}
                    }
                ]));
            })
            .await;

        let client = FaceApiClient::new(server.base_url(), KEY);
        let faces = client
            .detect(Bytes::from_static(b"jpeg-bytes"), &[FaceAttribute::Age])
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(faces, vec![Detection::with_age(34.0), Detection::with_age(6.5)]);
    }

    #[tokio::test]
    async fn no_faces_is_an_empty_list() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/face/v1.0/detect");
                then.status(200).json_body(json!([]));
            })
            .await;

        let client = FaceApiClient::new(format!("{}/", server.base_url()), KEY);
        let faces = client
            .detect(Bytes::from_static(b"landscape"), &[FaceAttribute::Age])
            .await
            .unwrap();
        assert!(faces.is_empty());
    }

    #[tokio::test]
    async fn service_error_carries_code_and_message() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/face/v1.0/detect");
                then.status(401).json_body(json!({
                    "error": {"code": "Unspecified", "message": "Access denied due to invalid subscription key."}
                }));
            })
            .await;

        let client = FaceApiClient::new(server.base_url(), "wrong");
        let err = client
            .detect(Bytes::from_static(b"jpeg-bytes"), &[FaceAttribute::Age])
            .await
            .unwrap_err();

        assert_eq!(
            err,
            ClassifyError::Service {
                status: 401,
                code: "Unspecified".to_string(),
                message: "Access denied due to invalid subscription key.".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn non_json_error_falls_back_to_status() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/face/v1.0/detect");
                then.status(503).body("upstream unavailable");
            })
            .await;

        let client = FaceApiClient::new(server.base_url(), KEY);
        let err = client
            .detect(Bytes::from_static(b"jpeg-bytes"), &[FaceAttribute::Age])
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ClassifyError::Service { status: 503, ref code, ref message }
                if code == "503" && message == "upstream unavailable"
        ));
    }

    #[tokio::test]
    async fn face_without_age_is_a_decode_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/face/v1.0/detect");
                then.status(200).json_body(json!([{ "faceRectangle": {} }]));
            })
            .await;

        let client = FaceApiClient::new(server.base_url(), KEY);
        let err = client
            .detect(Bytes::from_static(b"jpeg-bytes"), &[FaceAttribute::Age])
            .await
            .unwrap_err();
        assert!(matches!(err, ClassifyError::Decode(_)));
    }
}
