//! Request bodies of the admin auth API

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyPhoneRequest {
    pub phone: String,
}
