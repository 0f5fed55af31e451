use serde::{Deserialize, Serialize};

/// Credentials for `POST /login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginInput {
    pub email: String,
    /// The backend hashes this itself; the field name is part of its API.
    #[serde(rename = "encrypted_password")]
    pub password: String,
}

/// Account record for `POST /createEmployee`.
///
/// The password confirmation is checked locally and never sent.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SignupInput {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(rename = "encrypted_password")]
    pub password: String,
    pub company: String,
    #[serde(rename = "job_role")]
    pub job_role: String,
    pub skills: Vec<String>,
    pub years_of_experience: String,
}
