//! Parsing for agent-browser `--json` output
//!
//! Every JSON reply is wrapped as `{"success": .., "data": .., "error": ..}`.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::core::{ArchiverError, Result};

/// Envelope around every agent-browser JSON reply
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reply {
    /// Whether the operation succeeded
    #[serde(default)]
    pub success: bool,
    /// Command-specific payload
    #[serde(default)]
    pub data: Option<serde_json::Value>,
    /// Error message on failure
    #[serde(default)]
    pub error: Option<String>,
}

/// Payload of an `eval` reply
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalData {
    /// Value the script evaluated to
    #[serde(default)]
    pub result: serde_json::Value,
}

/// Result of the album probe script
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AlbumProbe {
    /// Number of visible info regions
    pub regions: usize,
    /// Whether the single region carries an album marker
    #[serde(default)]
    pub marker: bool,
}

impl Reply {
    /// Turn a failed reply into an error
    pub fn into_result(self) -> Result<Option<serde_json::Value>> {
        if self.success {
            Ok(self.data)
        } else {
            Err(ArchiverError::browser(
                self.error
                    .unwrap_or_else(|| "agent-browser reported failure".to_string()),
            ))
        }
    }
}

/// Extract and decode the value an `eval` command produced.
///
/// Accepts both the `{"data": {"result": ..}}` envelope and a bare JSON value,
/// since older agent-browser builds print the latter.
pub fn eval_value<T: DeserializeOwned>(output: &str) -> Result<T> {
    let raw: serde_json::Value = serde_json::from_str(output.trim())?;

    let value = match serde_json::from_value::<Reply>(raw.clone()) {
        Ok(reply) if reply.data.is_some() || reply.error.is_some() => {
            let data = reply.into_result()?.unwrap_or(serde_json::Value::Null);
            match serde_json::from_value::<EvalData>(data.clone()) {
                Ok(eval) if data.get("result").is_some() => eval.result,
                _ => data,
            }
        }
        _ => raw,
    };

    Ok(serde_json::from_value(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eval_value_from_envelope() {
        let out = r#"{"success":true,"data":{"result":true}}"#;
        let v: bool = eval_value(out).unwrap();
        assert!(v);
    }

    #[test]
    fn test_eval_value_bare() {
        let v: Option<String> = eval_value("\"https://x/photo/1\"\n").unwrap();
        assert_eq!(v.as_deref(), Some("https://x/photo/1"));
    }

    #[test]
    fn test_eval_album_probe() {
        let out = r#"{"success":true,"data":{"result":{"regions":1,"marker":true}}}"#;
        let probe: AlbumProbe = eval_value(out).unwrap();
        assert_eq!(probe.regions, 1);
        assert!(probe.marker);
    }

    #[test]
    fn test_eval_failure_is_browser_error() {
        let out = r#"{"success":false,"error":"Execution context was destroyed"}"#;
        let err = eval_value::<bool>(out).unwrap_err();
        assert!(err.to_string().contains("Execution context"));
    }

    #[test]
    fn test_reply_parse() {
        let reply = serde_json::from_str::<Reply>(r#"{"success":true,"data":{"url":"https://x"}}"#).unwrap();
        let data = reply.into_result().unwrap().unwrap();
        assert_eq!(data["url"], "https://x");
    }
}
