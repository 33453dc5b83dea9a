use serde::{Deserialize, Serialize};

// POST /extract body. Anything that does not deserialize is treated as "no url".
#[derive(Deserialize, Debug, Default)]
pub struct ExtractRequest {
    #[serde(default)]
    pub url: Option<String>,
}

// Result of one successful extraction; shared read-only by cache and responses
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct ExtractionResult {
    pub url: String,       // as requested (the cache key)
    pub final_url: String, // after redirects
    pub status_code: u16,
    pub content_type: String,
    pub html_length: usize,
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
}

// Wire format for 200 responses: the result fields plus `cached`
#[derive(Serialize, Debug)]
pub struct ExtractResponse<'a> {
    #[serde(flatten)]
    pub result: &'a ExtractionResult,
    pub cached: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_flattens_result_and_keeps_nulls() {
        let result = ExtractionResult {
            url: "https://example.com".to_string(),
            final_url: "https://example.com/".to_string(),
            status_code: 200,
            content_type: "text/html".to_string(),
            html_length: 42,
            title: Some("Example".to_string()),
            description: None,
            image: None,
        };
        let json = serde_json::to_value(ExtractResponse {
            result: &result,
            cached: true,
        })
        .unwrap();

        assert_eq!(json["final_url"], "https://example.com/");
        assert_eq!(json["title"], "Example");
        assert!(json["description"].is_null());
        assert_eq!(json["cached"], true);
    }

    #[test]
    fn request_with_non_string_url_fails_to_parse() {
        assert!(serde_json::from_str::<ExtractRequest>(r#"{"url": 5}"#).is_err());
        let empty: ExtractRequest = serde_json::from_str("{}").unwrap();
        assert!(empty.url.is_none());
    }
}
