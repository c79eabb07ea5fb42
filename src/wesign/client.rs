//! HTTP client for the WeSign `userapi/v3` REST API.
//!
//! One client owns one session. The access token is read from the token slot
//! at dispatch time, so a refresh performed by one request is picked up by
//! every request dispatched after it.
//!
//! # Refresh policy
//!
//! An authenticated request answered with 401 while a refresh token is held
//! triggers exactly one refresh and one retry. A failed refresh clears the
//! session. Concurrent requests that all receive 401 may each refresh; the
//! last writer wins the token slot.

use std::time::Duration;

use reqwest::header::ACCEPT;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use tokio::sync::RwLock;

use super::error::{ApiError, ApiResult};
use super::models::{
    BaseResult, Contact, ContactGroup, CreatedTemplate, DocumentCollection, DownloadedFile,
    LiveLink, LoginResponse, SelfSignDocument, SelfSignUpdateResult, Template, User,
};
use super::requests::{
    ContactDraft, ContactGroupDraft, CreateSelfSign, DocumentOperation, ReplacementSigner,
    SignatureField, SignatureRequest, SimpleDocument, TemplateFields, UpdateSelfSign, UserUpdate,
};
use super::session::SessionTokens;
use crate::position::PageSize;

/// Path prefix appended to the configured API root.
const API_PREFIX: &str = "/userapi/v3";

/// Outcome of a login attempt that reached the upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOutcome {
    /// True when a token was issued and stored.
    pub success: bool,
    /// Human-readable status.
    pub message: String,
}

/// Client for the WeSign REST API.
#[derive(Debug)]
pub struct WeSignClient {
    base_url: String,
    http: reqwest::Client,
    tokens: RwLock<Option<SessionTokens>>,
}

impl WeSignClient {
    /// Creates a client for `api_url` (the deployment root, trailing slashes
    /// ignored) with a fixed per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(api_url: &str, timeout: Duration) -> ApiResult<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: format!("{}{API_PREFIX}", api_url.trim_end_matches('/')),
            http,
            tokens: RwLock::new(None),
        })
    }

    /// The resolved `.../userapi/v3` base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ---------------------------------------------------------------------
    // Session
    // ---------------------------------------------------------------------

    /// True when an access token is held.
    pub async fn is_authenticated(&self) -> bool {
        self.tokens.read().await.is_some()
    }

    /// Returns a copy of the current tokens.
    pub async fn tokens(&self) -> Option<SessionTokens> {
        self.tokens.read().await.clone()
    }

    /// Installs tokens obtained elsewhere.
    pub async fn set_tokens(&self, tokens: SessionTokens) {
        *self.tokens.write().await = Some(tokens);
    }

    /// Drops the current session.
    pub async fn clear_tokens(&self) {
        *self.tokens.write().await = None;
    }

    async fn can_refresh(&self) -> bool {
        self.tokens
            .read()
            .await
            .as_ref()
            .is_some_and(SessionTokens::can_refresh)
    }

    /// Logs in with email and password.
    ///
    /// A response without a token is reported as an unsuccessful outcome,
    /// not an error.
    ///
    /// # Errors
    ///
    /// Returns an error when the upstream rejects the request or cannot be
    /// reached.
    pub async fn login(&self, email: &str, password: &str) -> ApiResult<LoginOutcome> {
        let body = json!({ "Email": email, "Password": password });
        let response = self
            .dispatch(&Method::POST, "/users/login", &[], Some(&body))
            .await?;
        let login: LoginResponse = decode(read_body(response).await?)?;

        match login.token.filter(|t| !t.is_empty()) {
            Some(access_token) => {
                self.set_tokens(SessionTokens {
                    access_token,
                    refresh_token: login.refresh_token.unwrap_or_default(),
                    auth_token: login.auth_token,
                })
                .await;
                tracing::info!("WeSign session established");
                Ok(LoginOutcome {
                    success: true,
                    message: "Login successful".to_string(),
                })
            }
            None => {
                tracing::warn!("WeSign login returned no token");
                Ok(LoginOutcome {
                    success: false,
                    message: login
                        .message
                        .unwrap_or_else(|| "Login failed: no token received".to_string()),
                })
            }
        }
    }

    /// Exchanges the refresh token for a new access token.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NoRefreshToken`] when no refresh token is held, or
    /// [`ApiError::RefreshFailed`] when the exchange fails. In the latter
    /// case the session is cleared.
    pub async fn refresh_token(&self) -> ApiResult<()> {
        let Some(tokens) = self.tokens().await.filter(SessionTokens::can_refresh) else {
            return Err(ApiError::NoRefreshToken);
        };

        let body = json!({
            "JwtToken": tokens.access_token,
            "RefreshToken": tokens.refresh_token,
            "AuthToken": tokens.auth_token,
        });

        let outcome = match self
            .dispatch(&Method::POST, "/users/refresh", &[], Some(&body))
            .await
        {
            Ok(response) => read_body(response).await.and_then(decode::<LoginResponse>),
            Err(e) => Err(e),
        };

        match outcome {
            Ok(refreshed) => {
                let mut slot = self.tokens.write().await;
                if let (Some(current), Some(access_token)) = (slot.as_mut(), refreshed.token) {
                    current.access_token = access_token;
                    if let Some(refresh_token) = refreshed.refresh_token {
                        current.refresh_token = refresh_token;
                    }
                    if refreshed.auth_token.is_some() {
                        current.auth_token = refreshed.auth_token;
                    }
                }
                tracing::debug!("WeSign access token refreshed");
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "token refresh failed, clearing session");
                self.clear_tokens().await;
                Err(ApiError::RefreshFailed(Box::new(e)))
            }
        }
    }

    /// Ends the session. The upstream call is best effort; local tokens are
    /// cleared whatever happens.
    pub async fn logout(&self) {
        if self.is_authenticated().await {
            match self
                .dispatch(&Method::GET, "/users/Logout", &[], None)
                .await
            {
                Ok(response) if response.status().is_success() => {}
                Ok(response) => {
                    tracing::warn!(status = %response.status(), "upstream logout rejected");
                }
                Err(e) => tracing::warn!(error = %e, "upstream logout failed"),
            }
        }
        self.clear_tokens().await;
    }

    // ---------------------------------------------------------------------
    // Request plumbing
    // ---------------------------------------------------------------------

    async fn dispatch(
        &self,
        method: &Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> ApiResult<reqwest::Response> {
        let mut request = self
            .http
            .request(method.clone(), format!("{}{path}", self.base_url))
            .header(ACCEPT, "application/json");

        if !query.is_empty() {
            request = request.query(query);
        }

        let token = self
            .tokens
            .read()
            .await
            .as_ref()
            .map(|t| t.access_token.clone());
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }

        if let Some(body) = body {
            request = request.json(body);
        }

        Ok(request.send().await?)
    }

    /// Sends an authenticated request, refreshing once on 401.
    async fn call(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<Value>,
    ) -> ApiResult<Value> {
        if !self.is_authenticated().await {
            return Err(ApiError::NotAuthenticated);
        }

        tracing::debug!(%method, path, "WeSign request");
        let response = self.dispatch(&method, path, query, body.as_ref()).await?;

        if response.status() != StatusCode::UNAUTHORIZED || !self.can_refresh().await {
            return read_body(response).await;
        }

        tracing::debug!(path, "access token rejected, refreshing and retrying once");
        self.refresh_token().await?;

        let retried = self.dispatch(&method, path, query, body.as_ref()).await?;
        read_body(retried).await
    }

    async fn get(&self, path: &str) -> ApiResult<Value> {
        self.call(Method::GET, path, &[], None).await
    }

    async fn get_paged(&self, path: &str, query: &[(&str, String)]) -> ApiResult<Value> {
        self.call(Method::GET, path, query, None).await
    }

    async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> ApiResult<Value> {
        let body = serde_json::to_value(body).map_err(ApiError::Encode)?;
        self.call(Method::POST, path, &[], Some(body)).await
    }

    async fn put<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> ApiResult<Value> {
        let body = serde_json::to_value(body).map_err(ApiError::Encode)?;
        self.call(Method::PUT, path, &[], Some(body)).await
    }

    async fn delete(&self, path: &str) -> ApiResult<Value> {
        self.call(Method::DELETE, path, &[], None).await
    }

    // ---------------------------------------------------------------------
    // Users
    // ---------------------------------------------------------------------

    /// Fetches the current account.
    ///
    /// # Errors
    ///
    /// Returns an error if the upstream call fails.
    pub async fn current_user(&self) -> ApiResult<User> {
        decode(self.get("/users").await?)
    }

    /// Updates the current account.
    ///
    /// # Errors
    ///
    /// Returns an error if the upstream call fails.
    pub async fn update_user(&self, update: &UserUpdate) -> ApiResult<BaseResult> {
        Ok(BaseResult::from_body(self.put("/users", update).await?))
    }

    // ---------------------------------------------------------------------
    // Self-sign
    // ---------------------------------------------------------------------

    /// Creates a self-sign document from a data-URL encoded file.
    ///
    /// # Errors
    ///
    /// Returns an error if the upstream call fails.
    pub async fn create_self_sign(
        &self,
        name: &str,
        base64_file: &str,
        source_template_id: Option<&str>,
    ) -> ApiResult<SelfSignDocument> {
        let body = CreateSelfSign {
            name,
            base64_file,
            source_template_id,
        };
        decode(self.post("/selfsign", &body).await?)
    }

    /// Saves fields on, declines, or finalises a self-sign document.
    ///
    /// # Errors
    ///
    /// Returns an error if the upstream call fails.
    pub async fn update_self_sign(
        &self,
        document_collection_id: &str,
        document_id: &str,
        fields: Option<&[SignatureField]>,
        operation: DocumentOperation,
    ) -> ApiResult<SelfSignUpdateResult> {
        let body = UpdateSelfSign {
            document_collection_id,
            document_id,
            fields,
            operation: operation.code(),
        };
        decode(self.put("/selfsign", &body).await?)
    }

    /// Fetches a self-sign document collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the upstream call fails.
    pub async fn self_sign_document(&self, id: &str) -> ApiResult<DocumentCollection> {
        decode(self.get(&format!("/selfsign/{id}")).await?)
    }

    // ---------------------------------------------------------------------
    // Document collections
    // ---------------------------------------------------------------------

    /// Lists document collections.
    ///
    /// # Errors
    ///
    /// Returns an error if the upstream call fails.
    pub async fn document_collections(
        &self,
        offset: u32,
        limit: u32,
    ) -> ApiResult<Vec<DocumentCollection>> {
        let query = [("offset", offset.to_string()), ("limit", limit.to_string())];
        decode_list(self.get_paged("/documentcollections", &query).await?)
    }

    /// Fetches one document collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the upstream call fails.
    pub async fn document_collection(&self, id: &str) -> ApiResult<DocumentCollection> {
        decode(self.get(&format!("/documentcollections/{id}")).await?)
    }

    /// Creates a document collection from data-URL encoded files.
    ///
    /// # Errors
    ///
    /// Returns an error if the upstream call fails.
    pub async fn create_document_collection(
        &self,
        name: &str,
        base64_files: &[String],
    ) -> ApiResult<DocumentCollection> {
        let body = json!({ "Name": name, "Base64Files": base64_files });
        decode(self.post("/documentcollections", &body).await?)
    }

    /// Downloads one document of a collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the upstream call fails.
    pub async fn download_document(
        &self,
        collection_id: &str,
        document_id: &str,
    ) -> ApiResult<DownloadedFile> {
        decode(
            self.get(&format!(
                "/documentcollections/{collection_id}/documents/{document_id}/download"
            ))
            .await?,
        )
    }

    /// Sends a multi-party collection built from templates.
    ///
    /// # Errors
    ///
    /// Returns an error if the upstream call fails.
    pub async fn send_document_for_signature(
        &self,
        request: &SignatureRequest,
    ) -> ApiResult<DocumentCollection> {
        decode(self.post("/documentcollections", &request.to_wire()).await?)
    }

    /// Sends a template to a single signer.
    ///
    /// # Errors
    ///
    /// Returns an error if the upstream call fails.
    pub async fn send_simple_document(
        &self,
        request: &SimpleDocument,
    ) -> ApiResult<DocumentCollection> {
        decode(self.post("/documentcollections/simple", request).await?)
    }

    /// Re-sends the signing link to a signer.
    ///
    /// # Errors
    ///
    /// Returns an error if the upstream call fails.
    pub async fn resend_to_signer(
        &self,
        collection_id: &str,
        signer_id: &str,
        sending_method: u8,
    ) -> ApiResult<BaseResult> {
        let path =
            format!("/documentcollections/{collection_id}/signers/{signer_id}/method/{sending_method}");
        Ok(BaseResult::from_body(self.get(&path).await?))
    }

    /// Replaces a signer who has not signed yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the upstream call fails.
    pub async fn replace_signer(
        &self,
        collection_id: &str,
        signer_id: &str,
        signer: &ReplacementSigner,
    ) -> ApiResult<BaseResult> {
        let path = format!("/documentcollections/{collection_id}/signer/{signer_id}/replace");
        Ok(BaseResult::from_body(self.put(&path, signer).await?))
    }

    /// Cancels a pending collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the upstream call fails.
    pub async fn cancel_document_collection(&self, collection_id: &str) -> ApiResult<BaseResult> {
        let path = format!("/documentcollections/{collection_id}/cancel");
        Ok(BaseResult::from_body(self.put(&path, "").await?))
    }

    /// Reactivates a cancelled or expired collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the upstream call fails.
    pub async fn reactivate_document_collection(
        &self,
        collection_id: &str,
    ) -> ApiResult<BaseResult> {
        let path = format!("/documentcollections/{collection_id}/reactivate");
        Ok(BaseResult::from_body(self.get(&path).await?))
    }

    /// Shares a collection with additional recipients.
    ///
    /// # Errors
    ///
    /// Returns an error if the upstream call fails.
    pub async fn share_document(
        &self,
        collection_id: &str,
        emails: &[String],
        message: Option<&str>,
    ) -> ApiResult<BaseResult> {
        let body = json!({
            "documentCollectionId": collection_id,
            "emails": emails,
            "message": message.unwrap_or_default(),
        });
        Ok(BaseResult::from_body(
            self.post("/documentcollections/share", &body).await?,
        ))
    }

    /// Fetches the sender's live link for a signer.
    ///
    /// # Errors
    ///
    /// Returns an error if the upstream call fails.
    pub async fn sender_live_link(
        &self,
        collection_id: &str,
        signer_id: &str,
    ) -> ApiResult<LiveLink> {
        decode(
            self.get(&format!(
                "/documentcollections/{collection_id}/senderLink/{signer_id}"
            ))
            .await?,
        )
    }

    // ---------------------------------------------------------------------
    // Templates
    // ---------------------------------------------------------------------

    /// Lists templates. Accepts `{Templates: [...]}`, `{templates: [...]}`
    /// or a bare array.
    ///
    /// # Errors
    ///
    /// Returns an error if the upstream call fails.
    pub async fn templates(&self, offset: u32, limit: u32) -> ApiResult<Vec<Template>> {
        let query = [("offset", offset.to_string()), ("limit", limit.to_string())];
        let body = self.get_paged("/templates", &query).await?;
        let list = match body {
            Value::Array(_) => body,
            Value::Object(mut map) => map
                .remove("Templates")
                .or_else(|| map.remove("templates"))
                .unwrap_or(Value::Null),
            _ => Value::Null,
        };
        decode_list(list)
    }

    /// Fetches one template.
    ///
    /// # Errors
    ///
    /// Returns an error if the upstream call fails.
    pub async fn template(&self, id: &str) -> ApiResult<Template> {
        decode(self.get(&format!("/templates/{id}")).await?)
    }

    /// Creates a template from a data-URL encoded file.
    ///
    /// # Errors
    ///
    /// Returns an error if the upstream call fails.
    pub async fn create_template(
        &self,
        name: &str,
        base64_file: &str,
        description: Option<&str>,
    ) -> ApiResult<Template> {
        let body = json!({
            "Name": name,
            "Base64File": base64_file,
            "Description": description,
        });
        let created: CreatedTemplate = decode(self.post("/templates", &body).await?)?;
        Ok(created.into())
    }

    /// Replaces the fields of a template. Coordinates are given in page
    /// points and sent as page fractions.
    ///
    /// # Errors
    ///
    /// Returns an error if the upstream call fails.
    pub async fn update_template_fields(
        &self,
        template_id: &str,
        fields: &TemplateFields,
    ) -> ApiResult<()> {
        let body = fields.to_wire(PageSize::LETTER);
        self.put(&format!("/templates/{template_id}"), &body)
            .await?;
        Ok(())
    }

    /// Extracts signer rows from a data-URL encoded Excel file.
    ///
    /// # Errors
    ///
    /// Returns an error if the upstream call fails.
    pub async fn extract_signers_from_excel(&self, base64_file: &str) -> ApiResult<Vec<Value>> {
        let body = json!({ "Base64File": base64_file });
        let response = self.post("/distribution/signers", &body).await?;
        decode_list(response.get("signers").cloned().unwrap_or(Value::Null))
    }

    // ---------------------------------------------------------------------
    // Contacts
    // ---------------------------------------------------------------------

    /// Creates a contact.
    ///
    /// # Errors
    ///
    /// Returns an error if the upstream call fails.
    pub async fn create_contact(&self, contact: &ContactDraft) -> ApiResult<Contact> {
        decode(self.post("/contacts", contact).await?)
    }

    /// Creates several contacts in one call.
    ///
    /// # Errors
    ///
    /// Returns an error if the upstream call fails.
    pub async fn create_contacts_bulk(&self, contacts: &[ContactDraft]) -> ApiResult<Vec<Contact>> {
        let body = json!({ "contacts": contacts });
        decode_list(self.post("/contacts/bulk", &body).await?)
    }

    /// Lists contacts, optionally filtered by free text or group.
    ///
    /// # Errors
    ///
    /// Returns an error if the upstream call fails.
    pub async fn contacts(
        &self,
        search: Option<&str>,
        group_id: Option<&str>,
        offset: u32,
        limit: u32,
    ) -> ApiResult<Vec<Contact>> {
        let mut query = vec![("offset", offset.to_string()), ("limit", limit.to_string())];
        if let Some(search) = search {
            query.push(("query", search.to_string()));
        }
        if let Some(group_id) = group_id {
            query.push(("groupId", group_id.to_string()));
        }
        decode_list(self.get_paged("/contacts", &query).await?)
    }

    /// Fetches one contact.
    ///
    /// # Errors
    ///
    /// Returns an error if the upstream call fails.
    pub async fn contact(&self, id: &str) -> ApiResult<Contact> {
        decode(self.get(&format!("/contacts/{id}")).await?)
    }

    /// Updates a contact.
    ///
    /// # Errors
    ///
    /// Returns an error if the upstream call fails.
    pub async fn update_contact(&self, id: &str, contact: &ContactDraft) -> ApiResult<Contact> {
        decode(self.put(&format!("/contacts/{id}"), contact).await?)
    }

    /// Deletes a contact.
    ///
    /// # Errors
    ///
    /// Returns an error if the upstream call fails.
    pub async fn delete_contact(&self, id: &str) -> ApiResult<()> {
        self.delete(&format!("/contacts/{id}")).await?;
        Ok(())
    }

    /// Deletes several contacts in one call.
    ///
    /// # Errors
    ///
    /// Returns an error if the upstream call fails.
    pub async fn delete_contacts_batch(&self, ids: &[String]) -> ApiResult<()> {
        let body = json!({ "contactIds": ids });
        self.post("/contacts/batch-delete", &body).await?;
        Ok(())
    }

    /// Lists contact groups.
    ///
    /// # Errors
    ///
    /// Returns an error if the upstream call fails.
    pub async fn contact_groups(&self, offset: u32, limit: u32) -> ApiResult<Vec<ContactGroup>> {
        let query = [("offset", offset.to_string()), ("limit", limit.to_string())];
        decode_list(self.get_paged("/contacts/group", &query).await?)
    }

    /// Fetches one contact group.
    ///
    /// # Errors
    ///
    /// Returns an error if the upstream call fails.
    pub async fn contact_group(&self, id: &str) -> ApiResult<ContactGroup> {
        decode(self.get(&format!("/contacts/group/{id}")).await?)
    }

    /// Creates a contact group.
    ///
    /// # Errors
    ///
    /// Returns an error if the upstream call fails.
    pub async fn create_contact_group(&self, group: &ContactGroupDraft) -> ApiResult<ContactGroup> {
        decode(self.post("/contacts/group", group).await?)
    }

    /// Updates a contact group.
    ///
    /// # Errors
    ///
    /// Returns an error if the upstream call fails.
    pub async fn update_contact_group(
        &self,
        id: &str,
        group: &ContactGroupDraft,
    ) -> ApiResult<ContactGroup> {
        decode(self.put(&format!("/contacts/group/{id}"), group).await?)
    }

    /// Deletes a contact group.
    ///
    /// # Errors
    ///
    /// Returns an error if the upstream call fails.
    pub async fn delete_contact_group(&self, id: &str) -> ApiResult<()> {
        self.delete(&format!("/contacts/group/{id}")).await?;
        Ok(())
    }
}

/// Reads a response body, mapping non-2xx statuses to [`ApiError::Status`].
async fn read_body(response: reqwest::Response) -> ApiResult<Value> {
    let status = response.status();
    let bytes = response.bytes().await?;

    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };

    if status.is_success() {
        return Ok(body);
    }

    let message = body
        .get("message")
        .or_else(|| body.get("Message"))
        .and_then(Value::as_str)
        .map_or_else(
            || format!("Request failed with status code {}", status.as_u16()),
            str::to_string,
        );

    Err(ApiError::Status {
        status: status.as_u16(),
        message,
    })
}

/// Decodes an object body. An empty body decodes as `{}`.
fn decode<T: DeserializeOwned>(value: Value) -> ApiResult<T> {
    let value = if value.is_null() { json!({}) } else { value };
    serde_json::from_value(value).map_err(ApiError::Decode)
}

/// Decodes an array body. An empty body decodes as `[]`.
fn decode_list<T: DeserializeOwned>(value: Value) -> ApiResult<Vec<T>> {
    if value.is_null() {
        return Ok(Vec::new());
    }
    serde_json::from_value(value).map_err(ApiError::Decode)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trims_trailing_slash() {
        let client = WeSignClient::new("https://wse.example.com///", Duration::from_secs(5)).unwrap();
        assert_eq!(client.base_url(), "https://wse.example.com/userapi/v3");
    }

    #[test]
    fn decode_list_accepts_null() {
        let list: Vec<Template> = decode_list(Value::Null).unwrap();
        assert!(list.is_empty());
    }

    #[test]
    fn decode_rejects_wrong_shape() {
        let result: ApiResult<Vec<Template>> = decode_list(json!({"not": "a list"}));
        assert!(matches!(result, Err(ApiError::Decode(_))));
    }

    #[tokio::test]
    async fn unauthenticated_call_fails_fast() {
        let client = WeSignClient::new("http://127.0.0.1:9", Duration::from_secs(1)).unwrap();
        let err = client.templates(0, 10).await.unwrap_err();
        assert!(matches!(err, ApiError::NotAuthenticated));
    }

    #[tokio::test]
    async fn refresh_without_session_is_rejected() {
        let client = WeSignClient::new("http://127.0.0.1:9", Duration::from_secs(1)).unwrap();
        assert!(matches!(
            client.refresh_token().await,
            Err(ApiError::NoRefreshToken)
        ));
    }

    #[tokio::test]
    async fn logout_clears_tokens_even_when_unreachable() {
        let client = WeSignClient::new("http://127.0.0.1:9", Duration::from_secs(1)).unwrap();
        client
            .set_tokens(SessionTokens {
                access_token: "a".to_string(),
                refresh_token: "r".to_string(),
                auth_token: None,
            })
            .await;
        assert!(client.is_authenticated().await);

        client.logout().await;
        assert!(!client.is_authenticated().await);
    }
}
