//! Request bodies sent to the WeSign API.
//!
//! The upstream mixes casing conventions: self-sign, contact and user calls
//! take camelCase, while template field updates and document collection
//! creation take PascalCase. Each struct pins its casing with serde so the
//! wire names stay exact, including the upstream's `RediretUrl` spelling.

use serde::Serialize;

use crate::position::PageSize;

/// Placeholder contact id the upstream expects for ad-hoc signers.
pub const EMPTY_CONTACT_ID: &str = "00000000-0000-0000-0000-000000000000";

/// Phone extension assumed when none is given.
pub const DEFAULT_PHONE_EXTENSION: &str = "+972";

/// Signing link lifetime assumed when none is given.
pub const DEFAULT_LINK_EXPIRATION_HOURS: u32 = 168;

/// Action applied by a self-sign update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentOperation {
    /// Keep the document open with the new fields.
    Save,
    /// Decline to sign.
    Decline,
    /// Finalise the signed document.
    Close,
}

impl DocumentOperation {
    /// Upstream numeric code.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Save => 1,
            Self::Decline => 2,
            Self::Close => 3,
        }
    }
}

/// Signing mode for multi-party collections. Only the ordered flow is used.
pub const SIGN_MODE_SIGNING_FLOW: u8 = 1;

/// Field on a self-sign document, in page points.
#[derive(Debug, Clone, PartialEq, Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureField {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub page_number: u32,
    pub field_type: u8,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateSelfSign<'a> {
    pub name: &'a str,
    pub base64_file: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_template_id: Option<&'a str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UpdateSelfSign<'a> {
    pub document_collection_id: &'a str,
    pub document_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<&'a [SignatureField]>,
    pub operation: u8,
}

/// Account fields accepted by `PUT /users`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub user_configuration: UserLanguage,
}

/// Language preference wrapper.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct UserLanguage {
    /// 1 = English, 2 = Hebrew.
    pub language: i64,
}

/// Template fields in page points. Converted to page fractions on the wire.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemplateFields {
    pub signature_fields: Vec<TemplateSignatureField>,
    pub text_fields: Vec<TemplateTextField>,
    pub checkbox_fields: Vec<TemplateCheckboxField>,
}

impl TemplateFields {
    /// Total number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.signature_fields.len() + self.text_fields.len() + self.checkbox_fields.len()
    }

    /// True when no fields are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Position and size shared by every template field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// 1-based page number.
    pub page: u32,
}

/// Signature or initials box on a template.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateSignatureField {
    pub name: String,
    pub bounds: FieldBox,
    pub mandatory: bool,
}

/// Text or date box on a template. `text_field_type` 3 = text, 4 = date.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateTextField {
    pub name: String,
    pub bounds: FieldBox,
    pub mandatory: bool,
    pub text_field_type: u8,
}

/// Checkbox on a template.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateCheckboxField {
    pub name: String,
    pub bounds: FieldBox,
    pub mandatory: bool,
}

/// Graphic signing, the upstream default for signature fields.
const SIGNING_TYPE_GRAPHIC: u8 = 3;

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct TemplateUpdateWire {
    pub name: &'static str,
    pub fields: FieldsWire,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct FieldsWire {
    pub text_fields: Vec<TextFieldWire>,
    pub signature_fields: Vec<SignatureFieldWire>,
    pub radio_group_fields: Vec<serde_json::Value>,
    pub check_box_fields: Vec<CheckBoxFieldWire>,
    pub choice_fields: Vec<serde_json::Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct BoxWire {
    pub name: String,
    pub description: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub mandatory: bool,
    pub page: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct TextFieldWire {
    #[serde(flatten)]
    pub bounds: BoxWire,
    pub value: String,
    pub text_field_type: u8,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct SignatureFieldWire {
    #[serde(flatten)]
    pub bounds: BoxWire,
    pub image: String,
    pub signing_type: u8,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct CheckBoxFieldWire {
    #[serde(flatten)]
    pub bounds: BoxWire,
    pub is_checked: bool,
}

fn fraction(value: f64, dimension: f64) -> f64 {
    (value / dimension).clamp(0.0, 1.0)
}

fn box_wire(name: &str, bounds: FieldBox, mandatory: bool, page: PageSize) -> BoxWire {
    BoxWire {
        name: name.to_string(),
        description: String::new(),
        x: fraction(bounds.x, page.width),
        y: fraction(bounds.y, page.height),
        width: fraction(bounds.width, page.width),
        height: fraction(bounds.height, page.height),
        mandatory,
        page: bounds.page,
    }
}

impl TemplateFields {
    /// Builds the `PUT /templates/{id}` body, normalising coordinates to
    /// fractions of the page and clamping them to `0..=1`.
    pub(crate) fn to_wire(&self, page: PageSize) -> TemplateUpdateWire {
        TemplateUpdateWire {
            name: "Updated Template",
            fields: FieldsWire {
                text_fields: self
                    .text_fields
                    .iter()
                    .map(|f| TextFieldWire {
                        bounds: box_wire(&f.name, f.bounds, f.mandatory, page),
                        value: String::new(),
                        text_field_type: f.text_field_type,
                    })
                    .collect(),
                signature_fields: self
                    .signature_fields
                    .iter()
                    .map(|f| SignatureFieldWire {
                        bounds: box_wire(&f.name, f.bounds, f.mandatory, page),
                        image: String::new(),
                        signing_type: SIGNING_TYPE_GRAPHIC,
                    })
                    .collect(),
                radio_group_fields: Vec::new(),
                check_box_fields: self
                    .checkbox_fields
                    .iter()
                    .map(|f| CheckBoxFieldWire {
                        bounds: box_wire(&f.name, f.bounds, f.mandatory, page),
                        is_checked: false,
                    })
                    .collect(),
                choice_fields: Vec::new(),
            },
        }
    }
}

/// A recipient of a multi-party collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSigner {
    pub contact_name: String,
    pub contact_means: String,
    /// 1 = SMS, 2 = Email, 3 = WhatsApp.
    pub sending_method: u8,
    pub contact_id: Option<String>,
    pub phone_extension: Option<String>,
    pub link_expiration_hours: Option<u32>,
    pub sender_note: Option<String>,
}

/// Input for `POST /documentcollections` in signing-flow mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureRequest {
    pub document_name: String,
    pub template_ids: Vec<String>,
    pub signers: Vec<NewSigner>,
    pub sender_note: Option<String>,
    pub redirect_url: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct SignatureRequestWire<'a> {
    pub document_mode: u8,
    pub document_name: &'a str,
    pub templates: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender_note: Option<&'a str>,
    #[serde(rename = "RediretUrl", skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<&'a str>,
    pub signers: Vec<SignerWire<'a>>,
    pub should_sign_using_signer1_after_document_signing_flow: bool,
    pub should_enable_meaning_of_signature: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct SignerWire<'a> {
    pub contact_id: &'a str,
    pub sending_method: u8,
    pub contact_means: &'a str,
    pub contact_name: &'a str,
    pub phone_extension: &'a str,
    pub link_expiration_in_hours: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender_note: Option<&'a str>,
}

impl SignatureRequest {
    pub(crate) fn to_wire(&self) -> SignatureRequestWire<'_> {
        SignatureRequestWire {
            document_mode: SIGN_MODE_SIGNING_FLOW,
            document_name: &self.document_name,
            templates: &self.template_ids,
            sender_note: self.sender_note.as_deref(),
            redirect_url: self.redirect_url.as_deref(),
            signers: self
                .signers
                .iter()
                .map(|s| SignerWire {
                    contact_id: s.contact_id.as_deref().unwrap_or(EMPTY_CONTACT_ID),
                    sending_method: s.sending_method,
                    contact_means: &s.contact_means,
                    contact_name: &s.contact_name,
                    phone_extension: s
                        .phone_extension
                        .as_deref()
                        .unwrap_or(DEFAULT_PHONE_EXTENSION),
                    link_expiration_in_hours: s
                        .link_expiration_hours
                        .unwrap_or(DEFAULT_LINK_EXPIRATION_HOURS),
                    sender_note: s.sender_note.as_deref(),
                })
                .collect(),
            should_sign_using_signer1_after_document_signing_flow: false,
            should_enable_meaning_of_signature: false,
        }
    }
}

/// Single-signer shortcut body for `POST /documentcollections/simple`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimpleDocument {
    pub template_id: String,
    pub document_name: String,
    pub signer_means: String,
    pub signer_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<String>,
}

/// Replacement signer for `PUT .../signer/{id}/replace`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplacementSigner {
    pub contact_name: String,
    pub contact_means: String,
    pub sending_method: u8,
}

/// Contact fields for create and update.
#[derive(Debug, Clone, Default, Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactDraft {
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub group_id: Option<String>,
}

/// Contact group fields for create and update.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactGroupDraft {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_ids: Option<Vec<String>>,
}
