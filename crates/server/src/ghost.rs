//! Newsletter CMS admin API client.
//!
//! Every call carries a freshly minted admin token: a compact HS256 JWS
//! keyed by the admin key id, valid for five minutes, scoped to the admin
//! audience.

use anyhow::Context;
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use rankbee_core::GhostConfig;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

pub const TOKEN_TTL_SECS: u64 = 300;
pub const ADMIN_AUDIENCE: &str = "/admin/";
const ACCEPT_VERSION: &str = "v5.0";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
pub enum AdminKeyError {
    #[error("admin API key must have the form <id>:<secret>")]
    Malformed,

    #[error("admin API key secret is not valid hex")]
    InvalidSecret,
}

/// Parsed `<id>:<hex secret>` admin key.
#[derive(Clone)]
pub struct AdminKey {
    id: String,
    secret: Vec<u8>,
}

impl AdminKey {
    pub fn parse(raw: &str) -> Result<Self, AdminKeyError> {
        let (id, secret) = raw.trim().split_once(':').ok_or(AdminKeyError::Malformed)?;
        if id.is_empty() || secret.is_empty() {
            return Err(AdminKeyError::Malformed);
        }

        let secret = hex::decode(secret).map_err(|_| AdminKeyError::InvalidSecret)?;

        Ok(Self {
            id: id.to_string(),
            secret,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Debug for AdminKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminKey")
            .field("id", &self.id)
            .field("secret", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AdminClaims {
    pub iat: u64,
    pub exp: u64,
    pub aud: String,
}

/// Mint an admin token issued at `now` (seconds since the epoch).
pub fn mint_admin_token(key: &AdminKey, now: u64) -> jsonwebtoken::errors::Result<String> {
    let mut header = Header::new(Algorithm::HS256);
    header.kid = Some(key.id.clone());

    let claims = AdminClaims {
        iat: now,
        exp: now + TOKEN_TTL_SECS,
        aud: ADMIN_AUDIENCE.to_string(),
    };

    encode(&header, &claims, &EncodingKey::from_secret(&key.secret))
}

/// Result of a create-member call that reached the CMS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberOutcome {
    Created,
    /// 422: the address is already a member.
    AlreadyExists,
    Rejected(StatusCode),
}

#[derive(Serialize)]
struct MembersRequest<'a> {
    members: [NewMember<'a>; 1],
}

#[derive(Serialize)]
struct NewMember<'a> {
    email: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
}

#[derive(Debug, Clone)]
pub struct GhostClient {
    http: reqwest::Client,
    members_url: String,
    key: AdminKey,
}

impl GhostClient {
    pub fn new(config: &GhostConfig) -> anyhow::Result<Self> {
        let key = AdminKey::parse(&config.admin_api_key)?;
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            members_url: format!(
                "{}/ghost/api/admin/members/",
                config.admin_url.trim_end_matches('/')
            ),
            key,
        })
    }

    pub async fn create_member(
        &self,
        email: &str,
        name: Option<&str>,
    ) -> anyhow::Result<MemberOutcome> {
        let now = u64::try_from(chrono::Utc::now().timestamp())
            .context("System clock before epoch")?;
        let token = mint_admin_token(&self.key, now).context("Failed to sign admin token")?;

        let body = MembersRequest {
            members: [NewMember { email, name }],
        };

        let response = self
            .http
            .post(&self.members_url)
            .header(reqwest::header::AUTHORIZATION, format!("Ghost {}", token))
            .header("Accept-Version", ACCEPT_VERSION)
            .json(&body)
            .send()
            .await
            .context("Members API request failed")?;

        let status = response.status();
        tracing::debug!(status = status.as_u16(), "members API responded");

        Ok(if status.is_success() {
            MemberOutcome::Created
        } else if status == StatusCode::UNPROCESSABLE_ENTITY {
            MemberOutcome::AlreadyExists
        } else {
            let detail = response.text().await.unwrap_or_default();
            tracing::warn!(
                status = status.as_u16(),
                body = %detail,
                "members API rejected request"
            );
            MemberOutcome::Rejected(status)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{DecodingKey, Validation, decode, decode_header};
    use wiremock::matchers::{body_json, header, header_regex, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const SECRET_HEX: &str = "00112233445566778899aabbccddeeff";

    fn key() -> AdminKey {
        AdminKey::parse(&format!("64fa1c:{}", SECRET_HEX)).unwrap()
    }

    fn now() -> u64 {
        u64::try_from(chrono::Utc::now().timestamp()).unwrap()
    }

    #[test]
    fn test_parse_admin_key() {
        let key = key();
        assert_eq!(key.id(), "64fa1c");
        assert_eq!(key.secret, hex::decode(SECRET_HEX).unwrap());
    }

    #[test]
    fn test_parse_admin_key_rejects_bad_input() {
        assert!(matches!(AdminKey::parse("nocolon"), Err(AdminKeyError::Malformed)));
        assert!(matches!(AdminKey::parse(":abcd"), Err(AdminKeyError::Malformed)));
        assert!(matches!(AdminKey::parse("id:"), Err(AdminKeyError::Malformed)));
        assert!(matches!(AdminKey::parse("id:xyz"), Err(AdminKeyError::InvalidSecret)));
    }

    #[test]
    fn test_debug_hides_secret() {
        let printed = format!("{:?}", key());
        assert!(!printed.contains("112233"));
    }

    #[test]
    fn test_token_shape_and_claims() {
        let issued = now();
        let token = mint_admin_token(&key(), issued).unwrap();

        assert_eq!(token.split('.').count(), 3);

        let header = decode_header(&token).unwrap();
        assert_eq!(header.alg, Algorithm::HS256);
        assert_eq!(header.kid.as_deref(), Some("64fa1c"));
        assert_eq!(header.typ.as_deref(), Some("JWT"));

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[ADMIN_AUDIENCE]);
        let secret = hex::decode(SECRET_HEX).unwrap();
        let data =
            decode::<AdminClaims>(&token, &DecodingKey::from_secret(&secret), &validation)
                .unwrap();

        assert_eq!(data.claims.iat, issued);
        assert_eq!(data.claims.exp, issued + 300);
        assert_eq!(data.claims.aud, "/admin/");
    }

    #[test]
    fn test_token_rejected_with_wrong_secret() {
        let token = mint_admin_token(&key(), now()).unwrap();
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[ADMIN_AUDIENCE]);

        let result =
            decode::<AdminClaims>(&token, &DecodingKey::from_secret(b"other"), &validation);
        assert!(result.is_err());
    }

    fn client_for(server: &MockServer) -> GhostClient {
        GhostClient::new(&GhostConfig {
            admin_url: format!("{}/", server.uri()),
            admin_api_key: format!("64fa1c:{}", SECRET_HEX),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_create_member_request() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/ghost/api/admin/members/"))
            .and(header("accept-version", "v5.0"))
            .and(header_regex("authorization", r"^Ghost [\w-]+\.[\w-]+\.[\w-]+$"))
            .and(body_json(serde_json::json!({
                "members": [{"email": "a@b.com", "name": "Ada"}]
            })))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&mock_server)
            .await;

        let outcome = client_for(&mock_server)
            .create_member("a@b.com", Some("Ada"))
            .await
            .unwrap();
        assert_eq!(outcome, MemberOutcome::Created);
    }

    #[tokio::test]
    async fn test_create_member_omits_missing_name() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_json(serde_json::json!({"members": [{"email": "a@b.com"}]})))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&mock_server)
            .await;

        let outcome = client_for(&mock_server).create_member("a@b.com", None).await.unwrap();
        assert_eq!(outcome, MemberOutcome::Created);
    }

    #[tokio::test]
    async fn test_create_member_status_mapping() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(422))
            .up_to_n_times(1)
            .mount(&mock_server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        assert_eq!(
            client.create_member("a@b.com", None).await.unwrap(),
            MemberOutcome::AlreadyExists
        );
        assert_eq!(
            client.create_member("a@b.com", None).await.unwrap(),
            MemberOutcome::Rejected(StatusCode::SERVICE_UNAVAILABLE)
        );
    }
}
