use serde::{Deserialize, Serialize};

/// Company settings, persisted under the `companyInfo` snapshot key.
///
/// `remote_url` and `remote_key` configure the sync gateway; when either is
/// missing the application runs purely local.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyInfo {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub tax_number: String,
    pub currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_key: Option<String>,
}

impl CompanyInfo {
    /// Remote credentials, when both halves are configured.
    pub fn remote_credentials(&self) -> Option<(&str, &str)> {
        match (&self.remote_url, &self.remote_key) {
            (Some(url), Some(key)) if !url.is_empty() && !key.is_empty() => {
                Some((url.as_str(), key.as_str()))
            }
            _ => None,
        }
    }
}
