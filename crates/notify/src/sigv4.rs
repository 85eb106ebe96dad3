//! AWS Signature Version 4 request signing.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

use crate::transport::SendError;

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "AWS4-HMAC-SHA256";

/// AWS access credentials.
#[derive(Clone)]
pub struct Credentials {
    /// Access key id
    pub access_key_id: String,

    /// Secret access key
    pub secret_access_key: String,

    /// Session token for temporary credentials
    pub session_token: Option<String>,
}

impl Credentials {
    /// Long-term credentials without a session token.
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            session_token: None,
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"***")
            .field("session_token", &self.session_token.as_ref().map(|_| "***"))
            .finish()
    }
}

/// The parts of an HTTP request covered by the signature.
#[derive(Debug, Clone)]
pub struct SigningRequest<'a> {
    /// HTTP method
    pub method: &'a str,

    /// Host header value, port included when non-default
    pub host: &'a str,

    /// Absolute path, already URI-encoded
    pub path: &'a str,

    /// Additional headers to sign, e.g. content-type
    pub headers: &'a [(&'a str, &'a str)],

    /// Request body
    pub payload: &'a [u8],
}

/// Sign a request and return the headers to attach to it:
/// `x-amz-date`, `authorization` and, for temporary credentials,
/// `x-amz-security-token`.
pub fn sign(
    credentials: &Credentials,
    region: &str,
    service: &str,
    request: &SigningRequest<'_>,
    at: DateTime<Utc>,
) -> Result<Vec<(String, String)>, SendError> {
    let amz_date = at.format("%Y%m%dT%H%M%SZ").to_string();
    let date_stamp = at.format("%Y%m%d").to_string();

    let mut headers: Vec<(String, String)> = request
        .headers
        .iter()
        .map(|(k, v)| (k.to_ascii_lowercase(), v.trim().to_string()))
        .collect();
    headers.push(("host".to_string(), request.host.to_string()));
    headers.push(("x-amz-date".to_string(), amz_date.clone()));
    if let Some(token) = &credentials.session_token {
        headers.push(("x-amz-security-token".to_string(), token.clone()));
    }
    headers.sort();

    let canonical_headers: String = headers
        .iter()
        .map(|(k, v)| format!("{}:{}\n", k, v))
        .collect();
    let signed_headers = headers
        .iter()
        .map(|(k, _)| k.as_str())
        .collect::<Vec<_>>()
        .join(";");

    let canonical_request = format!(
        "{}\n{}\n{}\n{}\n{}\n{}",
        request.method,
        request.path,
        "",
        canonical_headers,
        signed_headers,
        hex::encode(Sha256::digest(request.payload)),
    );

    let scope = format!("{}/{}/{}/aws4_request", date_stamp, region, service);
    let string_to_sign = format!(
        "{}\n{}\n{}\n{}",
        ALGORITHM,
        amz_date,
        scope,
        hex::encode(Sha256::digest(canonical_request.as_bytes())),
    );

    let key = signing_key(&credentials.secret_access_key, &date_stamp, region, service)?;
    let signature = hex::encode(hmac(&key, string_to_sign.as_bytes())?);

    let mut out = vec![
        ("x-amz-date".to_string(), amz_date),
        (
            "authorization".to_string(),
            format!(
                "{} Credential={}/{}, SignedHeaders={}, Signature={}",
                ALGORITHM, credentials.access_key_id, scope, signed_headers, signature
            ),
        ),
    ];
    if let Some(token) = &credentials.session_token {
        out.push(("x-amz-security-token".to_string(), token.clone()));
    }
    Ok(out)
}

/// Derive the request signing key for a day, region and service.
pub fn signing_key(
    secret: &str,
    date_stamp: &str,
    region: &str,
    service: &str,
) -> Result<Vec<u8>, SendError> {
    let k_date = hmac(format!("AWS4{}", secret).as_bytes(), date_stamp.as_bytes())?;
    let k_region = hmac(&k_date, region.as_bytes())?;
    let k_service = hmac(&k_region, service.as_bytes())?;
    hmac(&k_service, b"aws4_request")
}

fn hmac(key: &[u8], data: &[u8]) -> Result<Vec<u8>, SendError> {
    let mut mac =
        HmacSha256::new_from_slice(key).map_err(|e| SendError::Signing(e.to_string()))?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}
