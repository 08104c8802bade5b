//! Request records for the dispatcher protocol
//!
//! Numeric fields arrive either as JSON numbers or as string-encoded numbers
//! (existing clients send strings), so they go through a lenient
//! deserializer.

use serde::{Deserialize, Deserializer};

/// One request line: an id, an optional timeout in seconds, and the typed
/// operation.
#[derive(Debug, Clone, Deserialize)]
pub struct WireRequest {
    /// Client-chosen identifier echoed back in the response
    pub id: String,
    /// Maximum seconds to wait for the operation before failing it
    #[serde(default, deserialize_with = "lenient_opt_u64")]
    pub timeout: Option<u64>,
    /// The operation to execute
    #[serde(flatten)]
    pub op: Operation,
}

/// The operation kinds the dispatcher serves.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum Operation {
    #[serde(rename = "simpleSearch")]
    SimpleSearch {
        query: String,
        #[serde(deserialize_with = "lenient_u64")]
        limit: u64,
    },
    #[serde(rename = "getPage")]
    GetPage {
        #[serde(rename = "pageTitle")]
        page_title: String,
    },
    #[serde(rename = "getConnectedPages")]
    GetConnectedPages {
        #[serde(rename = "pageTitle")]
        page_title: String,
        #[serde(deserialize_with = "lenient_u64")]
        hops: u64,
    },
    #[serde(rename = "zeitgeist")]
    Zeitgeist {
        #[serde(deserialize_with = "lenient_u64")]
        limit: u64,
    },
    #[serde(rename = "trending")]
    Trending {
        #[serde(deserialize_with = "lenient_u64")]
        limit: u64,
    },
    #[serde(rename = "peakLoad30s")]
    PeakLoad30s,
}

/// Accepts `5` or `"5"`.
fn lenient_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(u64),
        Text(String),
    }

    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => Ok(n),
        NumberOrString::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

fn lenient_opt_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Maybe {
        Number(u64),
        Text(String),
        Nothing,
    }

    match Option::<Maybe>::deserialize(deserializer)? {
        Some(Maybe::Number(n)) => Ok(Some(n)),
        Some(Maybe::Text(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(serde::de::Error::custom),
        Some(Maybe::Nothing) | None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_search_with_string_numbers() {
        let json = r#"{"id":"1","type":"simpleSearch","query":"rust","limit":"12","timeout":"3"}"#;
        let req: WireRequest = serde_json::from_str(json).unwrap();

        assert_eq!(req.id, "1");
        assert_eq!(req.timeout, Some(3));
        match req.op {
            Operation::SimpleSearch { query, limit } => {
                assert_eq!(query, "rust");
                assert_eq!(limit, 12);
            }
            other => panic!("wrong operation: {other:?}"),
        }
    }

    #[test]
    fn test_numeric_fields_accept_numbers() {
        let json = r#"{"id":"2","type":"getConnectedPages","pageTitle":"Rust","hops":2}"#;
        let req: WireRequest = serde_json::from_str(json).unwrap();

        assert!(req.timeout.is_none());
        match req.op {
            Operation::GetConnectedPages { page_title, hops } => {
                assert_eq!(page_title, "Rust");
                assert_eq!(hops, 2);
            }
            other => panic!("wrong operation: {other:?}"),
        }
    }

    #[test]
    fn test_peak_load_has_no_extra_fields() {
        let json = r#"{"id":"3","type":"peakLoad30s"}"#;
        let req: WireRequest = serde_json::from_str(json).unwrap();
        assert!(matches!(req.op, Operation::PeakLoad30s));
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        let json = r#"{"id":"4","type":"shutdown"}"#;
        assert!(serde_json::from_str::<WireRequest>(json).is_err());
    }

    #[test]
    fn test_unparseable_limit_is_rejected() {
        let json = r#"{"id":"5","type":"trending","limit":"lots"}"#;
        assert!(serde_json::from_str::<WireRequest>(json).is_err());
    }
}
