//! Records returned by the WeSign API.
//!
//! Field names follow the upstream camelCase JSON. Every field is defaulted
//! so partial payloads decode; the gateway relabels these records for
//! display but never mutates them.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Token triple issued by `POST /users/login`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoginResponse {
    /// JWT access token; absent on rejected logins.
    pub token: Option<String>,
    /// Refresh token.
    pub refresh_token: Option<String>,
    /// Secondary auth token some deployments issue.
    pub auth_token: Option<String>,
    /// Upstream message.
    pub message: Option<String>,
}

/// The account behind the current session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company_id: String,
    pub company_name: String,
    pub group_name: Option<String>,
    #[serde(rename = "type")]
    pub user_type: i64,
    pub status: i64,
    pub user_configuration: UserConfiguration,
    pub program: ProfileProgram,
}

/// Per-user preferences.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserConfiguration {
    /// 1 = English, 2 = Hebrew.
    pub language: i64,
}

/// Subscription details.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfileProgram {
    pub expired_time: Option<String>,
    pub remaining_documents_for_month: i64,
}

/// A document collection: one or more documents sent together.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DocumentCollection {
    pub id: String,
    pub name: String,
    pub status: i64,
    pub creation_time: String,
    pub documents: Vec<Document>,
    pub signers: Vec<Signer>,
}

/// A single document inside a collection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Document {
    pub id: String,
    pub name: String,
    pub pages_count: i64,
    pub status: i64,
}

/// A signer attached to a collection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Signer {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub signing_order: i64,
    pub status: i64,
}

impl Signer {
    /// First and last name joined by a space.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// A reusable template.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Template {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub status: i64,
    pub creation_time: String,
    pub base64_file: Option<String>,
}

/// Shape of the `POST /templates` response.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct CreatedTemplate {
    pub template_id: String,
    pub template_name: String,
    pub description: Option<String>,
    pub status: Option<i64>,
    pub creation_time: String,
    pub base64_file: Option<String>,
}

impl From<CreatedTemplate> for Template {
    fn from(created: CreatedTemplate) -> Self {
        Self {
            id: created.template_id,
            name: created.template_name,
            description: created.description,
            status: created.status.unwrap_or(1),
            creation_time: created.creation_time,
            base64_file: created.base64_file,
        }
    }
}

/// Result of creating a self-sign document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SelfSignDocument {
    pub document_collection_id: String,
    pub document_id: String,
    pub name: String,
    pub pages_count: i64,
}

/// Result of updating a self-sign document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SelfSignUpdateResult {
    pub success: bool,
    pub download_link: Option<String>,
    pub message: Option<String>,
}

/// A downloaded document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DownloadedFile {
    /// Base64 payload, sometimes with a `data:` URL prefix.
    pub base64_file: String,
    pub file_name: String,
}

/// Generic acknowledgement returned by mutating endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BaseResult {
    pub success: bool,
    pub message: Option<String>,
    pub errors: Vec<String>,
}

impl Default for BaseResult {
    fn default() -> Self {
        Self {
            success: true,
            message: None,
            errors: Vec::new(),
        }
    }
}

impl BaseResult {
    /// Interprets a 2xx body. Endpoints that answer with an empty or
    /// non-object body are treated as successful.
    #[must_use]
    pub fn from_body(body: Value) -> Self {
        if body.is_object() {
            serde_json::from_value(body).unwrap_or_default()
        } else {
            Self::default()
        }
    }
}

/// A live link for watching a signer's session.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LiveLink {
    pub live_link: String,
}

/// An address-book contact.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Contact {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creation_time: Option<String>,
}

/// A named group of contacts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactGroup {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contacts_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creation_time: Option<String>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn partial_collection_decodes() {
        let collection: DocumentCollection =
            serde_json::from_value(json!({"id": "c1", "status": 2})).unwrap();
        assert_eq!(collection.id, "c1");
        assert_eq!(collection.status, 2);
        assert!(collection.documents.is_empty());
        assert!(collection.signers.is_empty());
    }

    #[test]
    fn created_template_maps_ids() {
        let created: CreatedTemplate = serde_json::from_value(json!({
            "templateId": "t1",
            "templateName": "NDA",
            "creationTime": "2024-01-01T00:00:00"
        }))
        .unwrap();
        let template = Template::from(created);
        assert_eq!(template.id, "t1");
        assert_eq!(template.name, "NDA");
        assert_eq!(template.status, 1);
    }

    #[test]
    fn base_result_from_empty_body() {
        assert!(BaseResult::from_body(Value::Null).success);
        assert!(!BaseResult::from_body(json!({"success": false})).success);
    }

    #[test]
    fn user_type_field_renamed() {
        let user: User = serde_json::from_value(json!({"type": 3, "name": "Dana"})).unwrap();
        assert_eq!(user.user_type, 3);
    }

    #[test]
    fn signer_full_name_trims() {
        let signer = Signer {
            first_name: "Dana".to_string(),
            ..Signer::default()
        };
        assert_eq!(signer.full_name(), "Dana");
    }
}
