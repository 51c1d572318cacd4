use anyhow::Result;
use serde::Deserialize;
use serde::Serialize;

/// Access and refresh token pair. Either both are held or neither is.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub access_token: String,
    pub refresh_token: String,
}

impl Credential {
    pub fn new(access_token: &str, refresh_token: &str) -> Credential {
        return Credential {
            access_token: access_token.to_string(),
            refresh_token: refresh_token.to_string(),
        };
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub token_type: String,
}

impl From<TokenResponse> for Credential {
    fn from(res: TokenResponse) -> Credential {
        return Credential {
            access_token: res.access_token,
            refresh_token: res.refresh_token,
        };
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Opaque key-value capability that keeps a token pair across runs.
pub trait CredentialPersistence: Send + Sync {
    fn load(&self) -> Result<Option<Credential>>;
    fn store(&self, credential: &Credential) -> Result<()>;
    fn clear(&self) -> Result<()>;
}
