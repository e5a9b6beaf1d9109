//! Signed client for the Polygon HTTP API.
//!
//! Every call is a `POST {api_url}/{method}` carrying the method parameters
//! plus `apiKey`, `time` and an `apiSig` derived from all of them.

use async_trait::async_trait;
use rand::RngExt;
use reqwest::multipart::Form;
use reqwest::Client;
use serde::de::DeserializeOwned;
use sha2::{Digest, Sha512};
use std::collections::BTreeMap;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use super::types::{Envelope, PolygonProblem, Statement};
use crate::config::PolygonConfig;
use crate::error::PolygonError;

const REQUEST_TIMEOUT_SECS: u64 = 120;

const SIG_PREFIX_LEN: usize = 6;
const SIG_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Operations the tools need from Polygon.
#[async_trait]
pub trait PolygonApi: Send + Sync {
    /// Problems of a contest keyed by their letter.
    async fn contest_problems(
        &self,
        contest_id: i64,
    ) -> Result<BTreeMap<String, PolygonProblem>, PolygonError>;

    /// Statements of a problem keyed by language.
    async fn problem_statements(
        &self,
        problem_id: i64,
    ) -> Result<BTreeMap<String, Statement>, PolygonError>;

    /// Name of the current validator file; empty when none is set.
    async fn problem_validator(&self, problem_id: i64) -> Result<String, PolygonError>;

    async fn problem_test_input(
        &self,
        problem_id: i64,
        testset: &str,
        test_index: u32,
    ) -> Result<String, PolygonError>;

    async fn update_working_copy(&self, problem_id: i64) -> Result<(), PolygonError>;

    /// Stores `content` as a source file named `name`.
    async fn save_source_file(
        &self,
        problem_id: i64,
        name: &str,
        content: &str,
    ) -> Result<(), PolygonError>;

    async fn set_validator(&self, problem_id: i64, name: &str) -> Result<(), PolygonError>;

    async fn commit_changes(
        &self,
        problem_id: i64,
        minor_changes: bool,
        message: &str,
    ) -> Result<(), PolygonError>;
}

/// Computes `apiSig` for a call.
///
/// The signed text is `prefix/method?k1=v1&k2=v2#secret` with the pairs
/// sorted by key, then by value; the signature is the prefix followed by the
/// hex SHA-512 of that text.
pub fn sign(method: &str, params: &[(String, String)], secret: &str, prefix: &str) -> String {
    let mut sorted: Vec<&(String, String)> = params.iter().collect();
    sorted.sort();

    let query = sorted
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha512::new();
    hasher.update(format!("{}/{}?{}#{}", prefix, method, query, secret).as_bytes());
    format!("{}{}", prefix, hex::encode(hasher.finalize()))
}

fn random_prefix() -> String {
    let mut rng = rand::rng();
    (0..SIG_PREFIX_LEN)
        .map(|_| SIG_ALPHABET[rng.random_range(0..SIG_ALPHABET.len())] as char)
        .collect()
}

fn unix_time() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// HTTP implementation of [`PolygonApi`].
pub struct PolygonClient {
    api_url: String,
    api_key: String,
    api_secret: String,
    http_client: Client,
}

impl PolygonClient {
    pub fn new(config: &PolygonConfig) -> Result<Self, PolygonError> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| PolygonError::ClientBuild(e.to_string()))?;

        Ok(Self {
            api_url: config.api_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            api_secret: config.api_secret.clone(),
            http_client,
        })
    }

    /// Base URL methods are appended to, without a trailing slash.
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    fn signed_params(&self, method: &str, mut params: Vec<(String, String)>) -> Vec<(String, String)> {
        params.push(("apiKey".to_string(), self.api_key.clone()));
        params.push(("time".to_string(), unix_time().to_string()));
        let signature = sign(method, &params, &self.api_secret, &random_prefix());
        params.push(("apiSig".to_string(), signature));
        params
    }

    /// Sends a call and returns the HTTP status with the raw body.
    async fn post(
        &self,
        method: &str,
        params: Vec<(String, String)>,
    ) -> Result<(u16, String), PolygonError> {
        let form = self
            .signed_params(method, params)
            .into_iter()
            .fold(Form::new(), |form, (k, v)| form.text(k, v));

        tracing::debug!(method, "Polygon request");

        let response = self
            .http_client
            .post(format!("{}/{}", self.api_url, method))
            .multipart(form)
            .send()
            .await
            .map_err(|e| PolygonError::RequestFailed {
                method: method.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| PolygonError::RequestFailed {
                method: method.to_string(),
                message: e.to_string(),
            })?;
        Ok((status, body))
    }

    /// Calls a JSON method and unwraps the `result` of its envelope.
    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Vec<(String, String)>,
    ) -> Result<Option<T>, PolygonError> {
        let (status, body) = self.post(method, params).await?;
        let envelope = parse_envelope::<T>(method, status, &body)?;
        Ok(envelope.result)
    }

    /// Calls a method whose success body is plain text.
    async fn call_text(
        &self,
        method: &str,
        params: Vec<(String, String)>,
    ) -> Result<String, PolygonError> {
        let (status, body) = self.post(method, params).await?;
        if let Ok(envelope) = serde_json::from_str::<Envelope<serde_json::Value>>(&body) {
            check_status(method, &envelope)?;
        }
        if !(200..300).contains(&status) {
            return Err(PolygonError::Http {
                method: method.to_string(),
                code: status,
                body,
            });
        }
        Ok(body)
    }
}

fn check_status<T>(method: &str, envelope: &Envelope<T>) -> Result<(), PolygonError> {
    if envelope.status == "OK" {
        Ok(())
    } else {
        Err(PolygonError::Failed {
            method: method.to_string(),
            comment: envelope
                .comment
                .clone()
                .unwrap_or_else(|| envelope.status.clone()),
        })
    }
}

fn parse_envelope<T: DeserializeOwned>(
    method: &str,
    status: u16,
    body: &str,
) -> Result<Envelope<T>, PolygonError> {
    match serde_json::from_str::<Envelope<T>>(body) {
        Ok(envelope) => {
            check_status(method, &envelope)?;
            Ok(envelope)
        }
        Err(_) if !(200..300).contains(&status) => Err(PolygonError::Http {
            method: method.to_string(),
            code: status,
            body: body.to_string(),
        }),
        Err(e) => Err(PolygonError::ParseError {
            method: method.to_string(),
            message: e.to_string(),
        }),
    }
}

fn require<T>(method: &str, result: Option<T>) -> Result<T, PolygonError> {
    result.ok_or_else(|| PolygonError::ParseError {
        method: method.to_string(),
        message: "response has no result".to_string(),
    })
}

fn param(key: &str, value: impl ToString) -> (String, String) {
    (key.to_string(), value.to_string())
}

#[async_trait]
impl PolygonApi for PolygonClient {
    async fn contest_problems(
        &self,
        contest_id: i64,
    ) -> Result<BTreeMap<String, PolygonProblem>, PolygonError> {
        const METHOD: &str = "contest.problems";
        let result = self.call(METHOD, vec![param("contestId", contest_id)]).await?;
        require(METHOD, result)
    }

    async fn problem_statements(
        &self,
        problem_id: i64,
    ) -> Result<BTreeMap<String, Statement>, PolygonError> {
        const METHOD: &str = "problem.statements";
        let result = self.call(METHOD, vec![param("problemId", problem_id)]).await?;
        require(METHOD, result)
    }

    async fn problem_validator(&self, problem_id: i64) -> Result<String, PolygonError> {
        let result: Option<String> = self
            .call("problem.validator", vec![param("problemId", problem_id)])
            .await?;
        Ok(result.unwrap_or_default())
    }

    async fn problem_test_input(
        &self,
        problem_id: i64,
        testset: &str,
        test_index: u32,
    ) -> Result<String, PolygonError> {
        self.call_text(
            "problem.testInput",
            vec![
                param("problemId", problem_id),
                param("testset", testset),
                param("testIndex", test_index),
            ],
        )
        .await
    }

    async fn update_working_copy(&self, problem_id: i64) -> Result<(), PolygonError> {
        self.call::<serde_json::Value>(
            "problem.updateWorkingCopy",
            vec![param("problemId", problem_id)],
        )
        .await?;
        Ok(())
    }

    async fn save_source_file(
        &self,
        problem_id: i64,
        name: &str,
        content: &str,
    ) -> Result<(), PolygonError> {
        self.call::<serde_json::Value>(
            "problem.saveFile",
            vec![
                param("problemId", problem_id),
                param("type", "source"),
                param("name", name),
                param("file", content),
            ],
        )
        .await?;
        Ok(())
    }

    async fn set_validator(&self, problem_id: i64, name: &str) -> Result<(), PolygonError> {
        self.call::<serde_json::Value>(
            "problem.setValidator",
            vec![param("problemId", problem_id), param("validator", name)],
        )
        .await?;
        Ok(())
    }

    async fn commit_changes(
        &self,
        problem_id: i64,
        minor_changes: bool,
        message: &str,
    ) -> Result<(), PolygonError> {
        self.call::<serde_json::Value>(
            "problem.commitChanges",
            vec![
                param("problemId", problem_id),
                param("minorChanges", minor_changes),
                param("message", message),
            ],
        )
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items.iter().map(|(k, v)| param(k, v)).collect()
    }

    #[test]
    fn test_sign_matches_reference_digest() {
        let params = pairs(&[("time", "1234567890"), ("apiKey", "xxx"), ("contestId", "1")]);
        assert_eq!(
            sign("contest.problems", &params, "secret", "123456"),
            "123456\
             02614024d96daa60ac4d59ca69b07caec64284cb69fbc738d70c43162daf7931\
             f6d3d5d5a5e420f11fb27506fc76a71238cc61b60dc83f9815d8b4340e3c4b07"
        );
    }

    #[test]
    fn test_sign_sorts_by_key_then_value() {
        let params = pairs(&[("b", "x"), ("a", "2"), ("a", "1")]);
        assert_eq!(
            sign("problem.saveFile", &params, "s3", "abcdef"),
            "abcdef\
             90854e5895e162f61f6741cd7577b81b9bd324ea58470d7c2f1491141c443dae\
             c008ef6b4d6fe00badfadb3b38c4e7cde6d5fbd98aa2a7c5823f2c5da586c26c"
        );
    }

    #[test]
    fn test_random_prefix_shape() {
        let prefix = random_prefix();
        assert_eq!(prefix.len(), SIG_PREFIX_LEN);
        assert!(prefix.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_signed_params_append_credentials() {
        let client = PolygonClient::new(&PolygonConfig {
            api_url: "http://localhost/".to_string(),
            api_key: "key".to_string(),
            api_secret: "secret".to_string(),
        })
        .unwrap();

        assert_eq!(client.api_url(), "http://localhost");

        let params = client.signed_params("problem.info", vec![param("problemId", 3)]);
        let keys: Vec<&str> = params.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["problemId", "apiKey", "time", "apiSig"]);
        assert_eq!(params[3].1.len(), SIG_PREFIX_LEN + 128);
    }

    #[test]
    fn test_parse_envelope_outcomes() {
        let ok: Envelope<i64> = parse_envelope("m", 200, r#"{"status":"OK","result":5}"#).unwrap();
        assert_eq!(ok.result, Some(5));

        let err = parse_envelope::<i64>("m", 400, r#"{"status":"FAILED","comment":"bad id"}"#)
            .unwrap_err();
        assert!(matches!(err, PolygonError::Failed { ref comment, .. } if comment == "bad id"));

        let err = parse_envelope::<i64>("m", 502, "<html>gateway</html>").unwrap_err();
        assert!(matches!(err, PolygonError::Http { code: 502, .. }));

        let err = parse_envelope::<i64>("m", 200, "garbage").unwrap_err();
        assert!(matches!(err, PolygonError::ParseError { .. }));
    }

    #[tokio::test]
    async fn test_connection_error() {
        let client = PolygonClient::new(&PolygonConfig {
            api_url: "http://localhost:65535".to_string(),
            api_key: "key".to_string(),
            api_secret: "secret".to_string(),
        })
        .unwrap();

        let err = client.contest_problems(1).await.unwrap_err();
        assert!(matches!(err, PolygonError::RequestFailed { .. }));
    }
}
