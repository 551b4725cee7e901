use serde::{Deserialize, Serialize};

use crate::domain::DogId;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub name: String,
    pub email: String,
}

/// Id-search response. The service occasionally omits fields on odd
/// responses; missing `resultIds`/`total` are treated as empty/zero.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    #[serde(default)]
    pub result_ids: Vec<DogId>,
    #[serde(default)]
    pub total: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchResponse {
    #[serde(rename = "match")]
    pub matched_id: DogId,
}

/// Error body some endpoints attach to non-2xx responses.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_response_defaults_missing_fields() {
        let parsed: SearchResponse = serde_json::from_str("{}").expect("parse");
        assert!(parsed.result_ids.is_empty());
        assert_eq!(parsed.total, 0);

        let parsed: SearchResponse =
            serde_json::from_str(r#"{"resultIds":["a","b"],"total":2}"#).expect("parse");
        assert_eq!(parsed.result_ids, vec![DogId::from("a"), DogId::from("b")]);
        assert_eq!(parsed.total, 2);
    }

    #[test]
    fn match_response_reads_reserved_word_field() {
        let parsed: MatchResponse = serde_json::from_str(r#"{"match":"d2"}"#).expect("parse");
        assert_eq!(parsed.matched_id, DogId::from("d2"));
    }
}
