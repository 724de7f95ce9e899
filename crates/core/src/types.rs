use serde::{Deserialize, Serialize};

/// Identity of the signed-in administrator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Admin {
    pub admin_id: i64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Access token issued by phone verification or refresh
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    pub admin_id: i64,
    pub admin_name: String,
}

impl TokenGrant {
    /// Admin identity carried by the grant
    pub fn admin(&self, phone: Option<&str>) -> Admin {
        Admin {
            admin_id: self.admin_id,
            name: self.admin_name.clone(),
            phone: phone.map(str::to_string),
        }
    }
}

/// Snapshot of the observable session values
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub is_authenticated: bool,
    pub admin: Option<Admin>,
    pub access_token: Option<String>,
    pub is_loading: bool,
}
