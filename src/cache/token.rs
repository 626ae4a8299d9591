use serde::{Deserialize, Serialize};

/// Token as issued by the upstream and served to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    pub id_token: String,
    pub access_token: String,
    pub auth_type: String,
}

impl Token {
    pub fn new(
        id_token: impl Into<String>,
        access_token: impl Into<String>,
        auth_type: impl Into<String>,
    ) -> Self {
        Self {
            id_token: id_token.into(),
            access_token: access_token.into(),
            auth_type: auth_type.into(),
        }
    }
}
