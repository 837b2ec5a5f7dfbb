use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Claims {
    pub sub: Uuid,
    pub exp: i64,
    pub iss: String,
    pub aud: String,
    pub given_name: Option<String>,
    pub family_name: Option<String>,
}

/// The authenticated student behind a request.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: Uuid,
    pub given_name: Option<String>,
    pub family_name: Option<String>,
}

impl From<Claims> for CurrentUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            given_name: claims.given_name,
            family_name: claims.family_name,
        }
    }
}

impl CurrentUser {
    pub fn display_name(&self) -> String {
        [self.given_name.as_deref(), self.family_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|part| !part.trim().is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn farewell(&self) -> String {
        format!("Thank you {}, Have a good day.", self.display_name())
    }
}
