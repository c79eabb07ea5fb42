//! WeSign operations exposed as tools.
//!
//! Tools are grouped by area. Each group module provides a static catalog
//! (`definitions`) and a dispatcher (`call`). The [`ToolRegistry`] routes a
//! tool name to its group by prefix, validates the arguments against the
//! tool's input schema, then hands off to the group.
//!
//! | Group | Module |
//! |-------|--------|
//! | Authentication | [`auth`] |
//! | Documents | [`documents`] |
//! | Self-signing | [`signing`] |
//! | Templates and account | [`templates`] |
//! | Multi-party signing | [`multi_party`] |
//! | Contacts | [`contacts`] |
//! | Smart field placement | [`smart_fields`] |

pub mod auth;
pub mod contacts;
pub mod documents;
pub mod error;
pub mod files;
pub mod labels;
pub mod multi_party;
pub mod schema;
pub mod signing;
pub mod smart_fields;
pub mod templates;
mod workflow;

pub use error::ToolError;

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::mcp::protocol::ToolDefinition;
use crate::wesign::WeSignClient;

/// Tool groups, in routing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolGroup {
    /// Login, logout, token refresh.
    Auth,
    /// Uploading, listing and downloading documents.
    Documents,
    /// Self-sign documents and their fields.
    Signing,
    /// Templates, account and Excel signer extraction.
    Templates,
    /// Collections sent to other signers.
    MultiParty,
    /// Address book.
    Contacts,
    /// Natural-language field placement on templates.
    SmartFields,
}

/// Name prefixes per group. Checked top to bottom; smart fields come first
/// because `wesign_add_signature_preset` also starts with the signing
/// group's `wesign_add_signature`.
const ROUTES: &[(ToolGroup, &[&str])] = &[
    (
        ToolGroup::SmartFields,
        &["wesign_add_field_smart", "wesign_add_signature_preset"],
    ),
    (
        ToolGroup::Auth,
        &["wesign_login", "wesign_logout", "wesign_refresh"],
    ),
    (
        ToolGroup::Documents,
        &[
            "wesign_upload",
            "wesign_create_document",
            "wesign_get_document",
            "wesign_list_documents",
            "wesign_download",
            "wesign_search_documents",
            "wesign_merge_documents",
        ],
    ),
    (
        ToolGroup::Signing,
        &[
            "wesign_create_self",
            "wesign_add_signature",
            "wesign_add_fields_by_position",
            "wesign_complete_signing",
            "wesign_save_draft",
            "wesign_decline",
            "wesign_get_signing_status",
        ],
    ),
    (
        ToolGroup::Templates,
        &[
            "wesign_create_template",
            "wesign_list_templates",
            "wesign_get_template",
            "wesign_use_template",
            "wesign_update_template",
            "wesign_get_user",
            "wesign_update_user",
            "wesign_extract_signers",
            "wesign_check_auth",
            "wesign_send_document_for_signing",
        ],
    ),
    (
        ToolGroup::MultiParty,
        &[
            "wesign_send_for_signature",
            "wesign_send_simple",
            "wesign_resend",
            "wesign_replace_signer",
            "wesign_cancel",
            "wesign_reactivate",
            "wesign_share",
            "wesign_get_signer",
        ],
    ),
    (
        ToolGroup::Contacts,
        &[
            "wesign_create_contact",
            "wesign_list_contact",
            "wesign_get_contact",
            "wesign_update_contact",
            "wesign_delete_contact",
        ],
    ),
];

/// Upper bound on page counts accepted by the field-placement tools.
pub const MAX_PAGE_COUNT: u32 = 500;

/// Tools callable without a session.
pub const AUTH_EXEMPT: &[&str] = &["wesign_login", "wesign_logout", "wesign_check_auth_status"];

impl ToolGroup {
    /// Every group, in routing order.
    pub const ALL: [Self; 7] = [
        Self::SmartFields,
        Self::Auth,
        Self::Documents,
        Self::Signing,
        Self::Templates,
        Self::MultiParty,
        Self::Contacts,
    ];

    /// Finds the group whose prefix matches `name`.
    #[must_use]
    pub fn route(name: &str) -> Option<Self> {
        ROUTES
            .iter()
            .find(|(_, prefixes)| prefixes.iter().any(|p| name.starts_with(p)))
            .map(|(group, _)| *group)
    }

    /// The group's tool catalog.
    #[must_use]
    pub fn definitions(self) -> Vec<ToolDefinition> {
        match self {
            Self::Auth => auth::definitions(),
            Self::Documents => documents::definitions(),
            Self::Signing => signing::definitions(),
            Self::Templates => templates::definitions(),
            Self::MultiParty => multi_party::definitions(),
            Self::Contacts => contacts::definitions(),
            Self::SmartFields => smart_fields::definitions(),
        }
    }
}

/// The full tool catalog bound to one upstream client.
#[derive(Debug)]
pub struct ToolRegistry {
    client: Arc<WeSignClient>,
    definitions: Vec<ToolDefinition>,
}

impl ToolRegistry {
    /// Builds the catalog for `client`.
    #[must_use]
    pub fn new(client: Arc<WeSignClient>) -> Self {
        let definitions = ToolGroup::ALL
            .into_iter()
            .flat_map(ToolGroup::definitions)
            .collect();
        Self {
            client,
            definitions,
        }
    }

    /// The shared upstream client.
    #[must_use]
    pub fn client(&self) -> &Arc<WeSignClient> {
        &self.client
    }

    /// Every tool definition.
    #[must_use]
    pub fn definitions(&self) -> &[ToolDefinition] {
        &self.definitions
    }

    /// Looks up one tool definition.
    #[must_use]
    pub fn definition(&self, name: &str) -> Option<&ToolDefinition> {
        self.definitions.iter().find(|d| d.name == name)
    }

    /// Validates and executes a tool call. `null` arguments are treated as
    /// an empty object.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::UnknownTool`] for names outside the catalog,
    /// [`ToolError::InvalidArguments`] for schema violations, and the
    /// tool's own error otherwise.
    pub async fn call(&self, name: &str, arguments: Value) -> Result<Value, ToolError> {
        let unknown = || ToolError::UnknownTool(name.to_string());
        let group = ToolGroup::route(name).ok_or_else(unknown)?;
        let definition = self.definition(name).ok_or_else(unknown)?;

        let arguments = if arguments.is_null() {
            Value::Object(Map::new())
        } else {
            arguments
        };
        schema::validate(&definition.input_schema, &arguments)?;
        if !AUTH_EXEMPT.contains(&name) {
            require_session(&self.client).await?;
        }

        tracing::debug!(tool = name, group = ?group, "executing tool");
        let client = self.client.as_ref();

        let result = match group {
            ToolGroup::Auth => auth::call(client, name, &arguments).await,
            ToolGroup::Documents => documents::call(client, name, &arguments).await,
            ToolGroup::Signing => signing::call(client, name, &arguments).await,
            ToolGroup::Templates => templates::call(client, name, &arguments).await,
            ToolGroup::MultiParty => multi_party::call(client, name, &arguments).await,
            ToolGroup::Contacts => contacts::call(client, name, &arguments).await,
            ToolGroup::SmartFields => smart_fields::call(client, name, &arguments).await,
        };

        if let Err(ref e) = result {
            tracing::warn!(tool = name, error = %e, "tool failed");
        }
        result
    }
}

/// Builds a catalog entry.
pub(crate) fn define(name: &str, description: &str, input_schema: Value) -> ToolDefinition {
    ToolDefinition {
        name: name.to_string(),
        description: Some(description.to_string()),
        input_schema,
    }
}

/// Deserialises validated arguments into a typed struct.
pub(crate) fn parse_args<T: DeserializeOwned>(arguments: &Value) -> Result<T, ToolError> {
    T::deserialize(arguments).map_err(|e| ToolError::invalid(e.to_string()))
}

/// Reads a required string argument.
pub(crate) fn required_str<'a>(arguments: &'a Value, key: &str) -> Result<&'a str, ToolError> {
    arguments
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| ToolError::invalid(format!("missing required parameter: {key}")))
}

/// Fails with [`ToolError::NotAuthenticated`] when no session is held.
async fn require_session(client: &WeSignClient) -> Result<(), ToolError> {
    if client.is_authenticated().await {
        Ok(())
    } else {
        Err(ToolError::NotAuthenticated)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::time::Duration;

    use serde_json::json;

    use super::*;

    fn registry() -> ToolRegistry {
        let client = WeSignClient::new("http://127.0.0.1:9", Duration::from_secs(1)).unwrap();
        ToolRegistry::new(Arc::new(client))
    }

    #[test]
    fn every_tool_routes_to_its_own_group() {
        for group in ToolGroup::ALL {
            for definition in group.definitions() {
                assert_eq!(
                    ToolGroup::route(&definition.name),
                    Some(group),
                    "{} routed to the wrong group",
                    definition.name
                );
            }
        }
    }

    #[test]
    fn preset_is_not_captured_by_signing_prefix() {
        assert_eq!(
            ToolGroup::route("wesign_add_signature_preset"),
            Some(ToolGroup::SmartFields)
        );
        assert_eq!(
            ToolGroup::route("wesign_add_signature_fields"),
            Some(ToolGroup::Signing)
        );
    }

    #[test]
    fn catalog_names_are_unique_and_complete() {
        let registry = registry();
        let names: HashSet<&str> = registry
            .definitions()
            .iter()
            .map(|d| d.name.as_str())
            .collect();
        assert_eq!(names.len(), registry.definitions().len());
        assert_eq!(names.len(), 49);
        for definition in registry.definitions() {
            assert_eq!(definition.input_schema["type"], "object", "{}", definition.name);
            assert!(definition.description.is_some());
        }
    }

    #[test]
    fn unmatched_name_has_no_route() {
        assert_eq!(ToolGroup::route("wesign_teleport"), None);
        assert_eq!(ToolGroup::route("read_document"), None);
    }

    #[tokio::test]
    async fn unknown_tool_is_reported() {
        let err = registry().call("wesign_teleport", json!({})).await.unwrap_err();
        assert!(matches!(err, ToolError::UnknownTool(_)));
    }

    #[tokio::test]
    async fn prefix_match_without_definition_is_unknown() {
        let err = registry().call("wesign_login_twice", json!({})).await.unwrap_err();
        assert!(matches!(err, ToolError::UnknownTool(_)));
    }

    #[tokio::test]
    async fn arguments_validated_before_dispatch() {
        let err = registry()
            .call("wesign_get_document_info", json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }

    #[tokio::test]
    async fn oversized_page_counts_are_rejected() {
        let registry = registry();
        let calls = [
            (
                "wesign_add_fields_by_position",
                json!({
                    "documentCollectionId": "c-1",
                    "documentId": "d-1",
                    "position": "bottom-right",
                    "numPages": u32::MAX
                }),
            ),
            (
                "wesign_add_signature_preset",
                json!({
                    "templateId": "t-1",
                    "preset": "signature-bottom-all-pages",
                    "pageCount": u32::MAX
                }),
            ),
            (
                "wesign_send_document_for_signing",
                json!({
                    "filePath": "/tmp/lease.pdf",
                    "signerName": "Dana",
                    "signerPhone": "0501234567",
                    "pageCount": MAX_PAGE_COUNT + 1
                }),
            ),
            (
                "wesign_send_for_signature",
                json!({
                    "filePath": "/tmp/lease.pdf",
                    "documentName": "Lease",
                    "signers": [],
                    "pageCount": u32::MAX
                }),
            ),
        ];
        for (name, arguments) in calls {
            let err = registry.call(name, arguments).await.unwrap_err();
            match err {
                ToolError::InvalidArguments(message) => {
                    assert!(message.contains("must be at most"), "{name}: {message}");
                }
                other => panic!("{name}: unexpected error {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn authenticated_tool_fails_fast_without_session() {
        let err = registry()
            .call("wesign_list_templates", Value::Null)
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::NotAuthenticated));
    }
}
