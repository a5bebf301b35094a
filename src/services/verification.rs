use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Single detection rejected below this score.
pub const MIN_CONFIDENCE: f64 = 0.5;
/// Above this score the face is assumed frontal (heuristic; no landmark
/// based pose estimation).
pub const FRONTAL_CONFIDENCE: f64 = 0.6;

/// Expected verification failure modes. Each maps to a distinct category so
/// callers can branch without string matching; the gateway never errors for
/// these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationFailure {
    NoFaceDetected,
    MultipleFaces,
    LowConfidence,
    ServiceUnavailable,
    InvalidCredential,
    Timeout,
}

impl VerificationFailure {
    /// Whether the caller may reasonably retry later.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            VerificationFailure::ServiceUnavailable | VerificationFailure::Timeout
        )
    }
}

/// Structured verdict for one submitted photo. Always returned, never thrown:
/// rejection reasons live in `error`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationVerdict {
    #[serde(rename = "hasFace")]
    pub has_face: bool,
    #[serde(rename = "isFrontal")]
    pub is_frontal: bool,
    #[serde(rename = "isVisible")]
    pub is_visible: bool,
    #[serde(rename = "faceCount")]
    pub face_count: usize,
    pub confidence: f64,
    #[serde(default)]
    pub error: Option<VerificationFailure>,
}

impl VerificationVerdict {
    pub fn accepted(&self) -> bool {
        self.error.is_none()
    }

    fn failed(error: VerificationFailure) -> Self {
        Self {
            has_face: false,
            is_frontal: false,
            is_visible: false,
            face_count: 0,
            confidence: 0.0,
            error: Some(error),
        }
    }
}

/// One normalized face detection from the inference response.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
    pub score: f64,
    pub label: Option<String>,
}

/// Retry policy for the inference call.
///
/// The model endpoint answers 503 while warming up; that is the only status
/// the gateway retries, and only once, after a fixed delay and with a longer
/// timeout. Timeouts are classified transient for the caller but never
/// trigger another internal attempt.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub retry_delay: Duration,
    pub initial_timeout: Duration,
    pub retry_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            retry_delay: Duration::from_secs(15),
            initial_timeout: Duration::from_secs(30),
            retry_timeout: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    /// Statuses and outcomes the policy treats as transient.
    pub fn is_retryable_status(status: StatusCode) -> bool {
        status == StatusCode::SERVICE_UNAVAILABLE
    }
}

/// Configuration problems surfaced before any call is attempted.
#[derive(Debug, Error)]
pub enum GatewayConfigError {
    #[error("no API token configured for the face detection endpoint")]
    MissingToken,

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

enum CallFailure {
    Unauthorized,
    Unavailable,
    Timeout,
    Network(String),
}

/// Boundary component for the external face-detection inference endpoint.
///
/// Encodes the image, posts it with a bearer token, normalizes the
/// heterogeneous response shapes into a detection list, and turns that into
/// an accept/reject verdict. Images are not retained.
pub struct PhotoVerificationGateway {
    endpoint: String,
    token: String,
    policy: RetryPolicy,
    client: Client,
}

impl PhotoVerificationGateway {
    pub fn new(
        endpoint: String,
        token: Option<String>,
        policy: RetryPolicy,
    ) -> Result<Self, GatewayConfigError> {
        let token = token
            .filter(|t| !t.is_empty())
            .ok_or(GatewayConfigError::MissingToken)?;
        let client = Client::builder().build()?;

        Ok(Self {
            endpoint,
            token,
            policy,
            client,
        })
    }

    /// Verify one photo. Worst case this blocks for the first timeout plus
    /// the retry delay plus the retry timeout; callers own any harder cap
    /// and user-visible cancellation.
    pub async fn verify(&self, image: &[u8]) -> VerificationVerdict {
        let payload = serde_json::json!({ "inputs": BASE64.encode(image) });

        let mut attempt = 0;
        let mut timeout = self.policy.initial_timeout;
        loop {
            attempt += 1;
            match self.call(&payload, timeout).await {
                Ok(body) => {
                    let detections = parse_detections(&body);
                    return decide(&detections);
                }
                Err(CallFailure::Unauthorized) => {
                    tracing::error!("face detection endpoint rejected credentials");
                    return VerificationVerdict::failed(VerificationFailure::InvalidCredential);
                }
                Err(CallFailure::Unavailable) => {
                    if attempt < self.policy.max_attempts {
                        tracing::warn!(
                            "face detection model warming up (503), retrying once in {:?}",
                            self.policy.retry_delay
                        );
                        tokio::time::sleep(self.policy.retry_delay).await;
                        timeout = self.policy.retry_timeout;
                        continue;
                    }
                    tracing::warn!("face detection still unavailable after retry");
                    return VerificationVerdict::failed(VerificationFailure::ServiceUnavailable);
                }
                Err(CallFailure::Timeout) => {
                    tracing::warn!("face detection call timed out after {:?}", timeout);
                    return VerificationVerdict::failed(VerificationFailure::Timeout);
                }
                Err(CallFailure::Network(msg)) => {
                    tracing::error!("face detection call failed: {}", msg);
                    return VerificationVerdict::failed(VerificationFailure::ServiceUnavailable);
                }
            }
        }
    }

    async fn call(&self, payload: &Value, timeout: Duration) -> Result<Value, CallFailure> {
        let result = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.token)
            .timeout(timeout)
            .json(payload)
            .send()
            .await;

        let response = match result {
            Ok(r) => r,
            Err(e) if e.is_timeout() => return Err(CallFailure::Timeout),
            Err(e) => return Err(CallFailure::Network(e.to_string())),
        };

        match response.status() {
            StatusCode::UNAUTHORIZED => Err(CallFailure::Unauthorized),
            s if RetryPolicy::is_retryable_status(s) => Err(CallFailure::Unavailable),
            s if !s.is_success() => Err(CallFailure::Network(format!("unexpected status {}", s))),
            _ => response
                .json()
                .await
                .map_err(|e| CallFailure::Network(e.to_string())),
        }
    }
}

/// Turn a normalized detection list into the final verdict, in rule order:
/// no detections, then multiple faces, then low confidence, then accept.
fn decide(detections: &[Detection]) -> VerificationVerdict {
    match detections {
        [] => VerificationVerdict {
            has_face: false,
            is_frontal: false,
            is_visible: false,
            face_count: 0,
            confidence: 0.0,
            error: Some(VerificationFailure::NoFaceDetected),
        },
        [single] => {
            if single.score < MIN_CONFIDENCE {
                VerificationVerdict {
                    has_face: true,
                    is_frontal: false,
                    is_visible: true,
                    face_count: 1,
                    confidence: single.score,
                    error: Some(VerificationFailure::LowConfidence),
                }
            } else {
                VerificationVerdict {
                    has_face: true,
                    is_frontal: single.score > FRONTAL_CONFIDENCE,
                    is_visible: true,
                    face_count: 1,
                    confidence: single.score,
                    error: None,
                }
            }
        }
        many => {
            let confidence = many.iter().map(|d| d.score).fold(0.0, f64::max);
            VerificationVerdict {
                has_face: true,
                is_frontal: false,
                is_visible: false,
                face_count: many.len(),
                confidence,
                error: Some(VerificationFailure::MultipleFaces),
            }
        }
    }
}

/// Normalize the inference response into a detection list.
///
/// Accepts a flat array of box objects, an object with a `predictions`
/// array, or an object with parallel `boxes`/`scores` arrays. Anything else
/// degrades to a single-element list built from the whole payload instead of
/// failing hard.
pub fn parse_detections(body: &Value) -> Vec<Detection> {
    if let Some(items) = body.as_array() {
        return items.iter().map(parse_box).collect();
    }

    if let Some(items) = body.get("predictions").and_then(|p| p.as_array()) {
        return items.iter().map(parse_box).collect();
    }

    if let (Some(boxes), Some(scores)) = (
        body.get("boxes").and_then(|b| b.as_array()),
        body.get("scores").and_then(|s| s.as_array()),
    ) {
        return boxes
            .iter()
            .zip(scores.iter())
            .map(|(coords, score)| {
                let mut detection = parse_box(coords);
                if let Some(s) = score.as_f64() {
                    detection.score = s;
                }
                detection
            })
            .collect();
    }

    tracing::debug!("unrecognized detection response shape, degrading to single detection");
    vec![parse_box(body)]
}

/// Read one detection out of a JSON value. Coordinates may be flat fields,
/// nested under `box`, or a `[xmin, ymin, xmax, ymax]` array; a missing
/// score counts as fully confident rather than silently rejecting.
fn parse_box(value: &Value) -> Detection {
    let coords = value.get("box").unwrap_or(value);

    let coord = |key: &str, index: usize| -> f64 {
        coords
            .get(key)
            .and_then(|v| v.as_f64())
            .or_else(|| coords.get(index).and_then(|v| v.as_f64()))
            .unwrap_or(0.0)
    };

    let score = value
        .get("score")
        .or_else(|| value.get("confidence"))
        .and_then(|v| v.as_f64())
        .unwrap_or(1.0);

    Detection {
        xmin: coord("xmin", 0),
        ymin: coord("ymin", 1),
        xmax: coord("xmax", 2),
        ymax: coord("ymax", 3),
        score,
        label: value
            .get("label")
            .and_then(|v| v.as_str())
            .map(str::to_string),
    }
}
