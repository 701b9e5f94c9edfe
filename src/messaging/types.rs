use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct SessionStatusResponse {
    pub is_ready: bool,
}

#[derive(Debug, Deserialize)]
pub struct SendTextResponse {
    #[serde(default)]
    pub message_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}
