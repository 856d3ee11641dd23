use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonRequest {
    #[serde(default)]
    pub id: String,
    #[serde(flatten)]
    pub body: RequestBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RequestBody {
    Correct(TextRequest),
    Suggest(TextRequest),
    Gloss(TextRequest),
    Ping,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextRequest {
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonResponse {
    #[serde(default)]
    pub id: String,
    #[serde(flatten)]
    pub body: ResponseBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponseBody {
    Correct(CorrectResponse),
    Suggest(SuggestResponse),
    Gloss(GlossResponse),
    Pong,
    Error(ErrorResponse),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrectResponse {
    pub text: String,
    pub elapsed_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestResponse {
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlossResponse {
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: ErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    InvalidRequest,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_correct_request() {
        let raw = r#"{"id":"abc","type":"correct","text":"ame kmn acho"}"#;
        let request: DaemonRequest = serde_json::from_str(raw).unwrap();
        assert_eq!(request.id, "abc");
        match request.body {
            RequestBody::Correct(payload) => assert_eq!(payload.text, "ame kmn acho"),
            _ => panic!("expected correct request"),
        }
    }

    #[test]
    fn parse_ping_without_id() {
        let request: DaemonRequest = serde_json::from_str(r#"{"type":"ping"}"#).unwrap();
        assert!(request.id.is_empty());
        assert!(matches!(request.body, RequestBody::Ping));
    }

    #[test]
    fn text_is_required() {
        assert!(serde_json::from_str::<DaemonRequest>(r#"{"id":"1","type":"suggest"}"#).is_err());
    }

    #[test]
    fn serializes_flat_response() {
        let response = DaemonResponse {
            id: "7".to_string(),
            body: ResponseBody::Suggest(SuggestResponse {
                suggestions: vec!["kemon bhalo".to_string()],
            }),
        };
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["id"], "7");
        assert_eq!(value["type"], "suggest");
        assert_eq!(value["suggestions"][0], "kemon bhalo");

        let error = DaemonResponse {
            id: String::new(),
            body: ResponseBody::Error(ErrorResponse {
                code: ErrorCode::InvalidRequest,
                message: "bad".to_string(),
            }),
        };
        let value = serde_json::to_value(&error).unwrap();
        assert_eq!(value["type"], "error");
        assert_eq!(value["code"], "invalid_request");
        assert!(serde_json::from_str::<ErrorCode>(r#""timeout""#).is_err());
    }
}
