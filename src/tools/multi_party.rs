//! Multi-party tools: send collections to signers and manage them afterwards.

use serde::Deserialize;
use serde_json::{json, Value};

use super::workflow::{self, FieldPlacement, SendPlan};
use super::{define, labels, parse_args, ToolError, MAX_PAGE_COUNT};
use crate::mcp::protocol::ToolDefinition;
use crate::wesign::requests::{NewSigner, ReplacementSigner, SimpleDocument};
use crate::wesign::WeSignClient;

const DEFAULT_FIELD_POSITION: &str = "bottom right";

fn sending_method_schema() -> Value {
    json!({
        "type": "number",
        "enum": [1, 2, 3],
        "description": "How to send the signing link: 1=SMS, 2=Email, 3=WhatsApp"
    })
}

fn collection_only_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "documentCollectionId": { "type": "string", "description": "ID of the document collection" }
        },
        "required": ["documentCollectionId"]
    })
}

/// Catalog entries for the multi-party tools.
#[must_use]
pub fn definitions() -> Vec<ToolDefinition> {
    vec![
        define(
            "wesign_send_for_signature",
            "Send a document to one or more signers. Creates a template from the file, adds a signature field to each page, then sends it",
            json!({
                "type": "object",
                "properties": {
                    "filePath": { "type": "string", "description": "Path to the document file" },
                    "documentName": { "type": "string", "description": "Name of the document" },
                    "signers": {
                        "type": "array",
                        "description": "Signers in signing order",
                        "items": {
                            "type": "object",
                            "properties": {
                                "contactName": { "type": "string", "description": "Full name of the signer" },
                                "contactMeans": { "type": "string", "description": "Email or phone number" },
                                "sendingMethod": sending_method_schema(),
                                "linkExpirationInHours": {
                                    "type": "number",
                                    "minimum": 1,
                                    "description": "Link expiration in hours (default: 168)"
                                },
                                "senderNote": { "type": "string", "description": "Personal note for this signer" }
                            },
                            "required": ["contactName", "contactMeans", "sendingMethod"]
                        }
                    },
                    "senderNote": { "type": "string", "description": "Note shown to every signer" },
                    "redirectUrl": { "type": "string", "description": "URL to open after signing" },
                    "fieldPosition": {
                        "type": "string",
                        "description": "Where to place the signature field, e.g. \"bottom right\" (default)"
                    },
                    "pageCount": {
                        "type": "number",
                        "minimum": 1,
                        "maximum": MAX_PAGE_COUNT,
                        "description": "Number of pages to place a signature field on (default: 1)"
                    }
                },
                "required": ["filePath", "documentName", "signers"]
            }),
        ),
        define(
            "wesign_send_simple_document",
            "Send an existing template to a single signer",
            json!({
                "type": "object",
                "properties": {
                    "templateId": { "type": "string", "description": "ID of the template to send" },
                    "documentName": { "type": "string", "description": "Name of the document" },
                    "signerName": { "type": "string", "description": "Full name of the signer" },
                    "signerMeans": { "type": "string", "description": "Email or phone number of the signer" },
                    "redirectUrl": { "type": "string", "description": "URL to open after signing" }
                },
                "required": ["templateId", "documentName", "signerName", "signerMeans"]
            }),
        ),
        define(
            "wesign_resend_to_signer",
            "Resend the signing link to a signer",
            json!({
                "type": "object",
                "properties": {
                    "documentCollectionId": { "type": "string", "description": "ID of the document collection" },
                    "signerId": { "type": "string", "description": "ID of the signer" },
                    "sendingMethod": sending_method_schema()
                },
                "required": ["documentCollectionId", "signerId", "sendingMethod"]
            }),
        ),
        define(
            "wesign_replace_signer",
            "Replace a signer on a sent document",
            json!({
                "type": "object",
                "properties": {
                    "documentCollectionId": { "type": "string", "description": "ID of the document collection" },
                    "signerId": { "type": "string", "description": "ID of the signer to replace" },
                    "newSigner": {
                        "type": "object",
                        "properties": {
                            "contactName": { "type": "string", "description": "Full name of the new signer" },
                            "contactMeans": { "type": "string", "description": "Email or phone number" },
                            "sendingMethod": sending_method_schema()
                        },
                        "required": ["contactName", "contactMeans", "sendingMethod"]
                    }
                },
                "required": ["documentCollectionId", "signerId", "newSigner"]
            }),
        ),
        define(
            "wesign_cancel_document",
            "Cancel a document collection that is out for signing",
            collection_only_schema(),
        ),
        define(
            "wesign_reactivate_document",
            "Reactivate a cancelled or expired document collection",
            collection_only_schema(),
        ),
        define(
            "wesign_share_document",
            "Share a document collection with additional email recipients",
            json!({
                "type": "object",
                "properties": {
                    "documentCollectionId": { "type": "string", "description": "ID of the document collection" },
                    "emails": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Email addresses to share with"
                    },
                    "message": { "type": "string", "description": "Optional message for the recipients" }
                },
                "required": ["documentCollectionId", "emails"]
            }),
        ),
        define(
            "wesign_get_signer_link",
            "Get the live link for watching a signer's session",
            json!({
                "type": "object",
                "properties": {
                    "documentCollectionId": { "type": "string", "description": "ID of the document collection" },
                    "signerId": { "type": "string", "description": "ID of the signer" }
                },
                "required": ["documentCollectionId", "signerId"]
            }),
        ),
    ]
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignerArg {
    contact_name: String,
    contact_means: String,
    sending_method: u8,
    link_expiration_in_hours: Option<u32>,
    sender_note: Option<String>,
}

impl From<SignerArg> for NewSigner {
    fn from(arg: SignerArg) -> Self {
        Self {
            contact_name: arg.contact_name,
            contact_means: arg.contact_means,
            sending_method: arg.sending_method,
            contact_id: None,
            phone_extension: None,
            link_expiration_hours: arg.link_expiration_in_hours,
            sender_note: arg.sender_note,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SendArgs {
    file_path: String,
    document_name: String,
    signers: Vec<SignerArg>,
    sender_note: Option<String>,
    redirect_url: Option<String>,
    field_position: Option<String>,
    page_count: Option<u32>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SimpleArgs {
    template_id: String,
    document_name: String,
    signer_name: String,
    signer_means: String,
    redirect_url: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResendArgs {
    document_collection_id: String,
    signer_id: String,
    sending_method: u8,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReplaceArgs {
    document_collection_id: String,
    signer_id: String,
    new_signer: ReplacementArg,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReplacementArg {
    contact_name: String,
    contact_means: String,
    sending_method: u8,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ShareArgs {
    document_collection_id: String,
    emails: Vec<String>,
    message: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignerRefArgs {
    document_collection_id: String,
    signer_id: String,
}

/// Executes a multi-party tool.
///
/// # Errors
///
/// Returns argument, local file, workflow or upstream errors.
pub async fn call(client: &WeSignClient, name: &str, arguments: &Value) -> Result<Value, ToolError> {
    match name {
        "wesign_send_for_signature" => send(client, parse_args(arguments)?).await,
        "wesign_send_simple_document" => send_simple(client, parse_args(arguments)?).await,
        "wesign_resend_to_signer" => resend(client, parse_args(arguments)?).await,
        "wesign_replace_signer" => replace(client, parse_args(arguments)?).await,
        "wesign_cancel_document" => {
            let id = super::required_str(arguments, "documentCollectionId")?;
            let result = client
                .cancel_document_collection(id)
                .await
                .map_err(ToolError::upstream("Failed to cancel document"))?;
            Ok(json!({
                "success": result.success,
                "message": "Document collection cancelled successfully",
                "documentCollectionId": id,
            }))
        }
        "wesign_reactivate_document" => {
            let id = super::required_str(arguments, "documentCollectionId")?;
            let result = client
                .reactivate_document_collection(id)
                .await
                .map_err(ToolError::upstream("Failed to reactivate document"))?;
            Ok(json!({
                "success": result.success,
                "message": "Document collection reactivated successfully",
                "documentCollectionId": id,
            }))
        }
        "wesign_share_document" => share(client, parse_args(arguments)?).await,
        "wesign_get_signer_link" => signer_link(client, parse_args(arguments)?).await,
        _ => Err(ToolError::UnknownTool(name.to_string())),
    }
}

async fn send(client: &WeSignClient, args: SendArgs) -> Result<Value, ToolError> {
    if args.signers.is_empty() {
        return Err(ToolError::invalid("at least one signer is required"));
    }
    let signers_count = args.signers.len();

    let plan = SendPlan {
        file_path: args.file_path,
        template_name: args.document_name.clone(),
        template_description: format!("Template for multi-party signing: {}", args.document_name),
        document_name: args.document_name.clone(),
        placement: FieldPlacement::Phrase(
            args.field_position
                .filter(|p| !p.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_FIELD_POSITION.to_string()),
        ),
        page_count: args.page_count.unwrap_or(1),
        signers: args.signers.into_iter().map(NewSigner::from).collect(),
        sender_note: args.sender_note,
        redirect_url: args.redirect_url,
    };

    let outcome = workflow::send(client, plan).await?;
    let collection = outcome.collection;

    let signers: Vec<Value> = collection
        .signers
        .iter()
        .map(|s| {
            json!({
                "id": s.id,
                "name": s.full_name(),
                "email": s.email,
                "phone": s.phone,
                "status": s.status,
                "statusName": labels::signer_status(s.status),
                "signingOrder": s.signing_order,
            })
        })
        .collect();

    Ok(json!({
        "success": true,
        "message": format!(
            "Document \"{}\" sent to {signers_count} signers successfully",
            args.document_name
        ),
        "documentCollectionId": collection.id,
        "documentName": collection.name,
        "status": collection.status,
        "creationTime": collection.creation_time,
        "templateId": outcome.template.id,
        "templateName": outcome.template.name,
        "fieldsAdded": outcome.fields.len(),
        "signersCount": signers_count,
        "signers": signers,
        "originalFileName": outcome.file.file_name,
        "fileSize": outcome.file.size,
        "mimeType": outcome.file.mime,
        "workflow": "template-based multi-party signing",
    }))
}

async fn send_simple(client: &WeSignClient, args: SimpleArgs) -> Result<Value, ToolError> {
    let request = SimpleDocument {
        template_id: args.template_id.clone(),
        document_name: args.document_name.clone(),
        signer_means: args.signer_means.clone(),
        signer_name: args.signer_name.clone(),
        redirect_url: args.redirect_url,
    };
    let collection = client
        .send_simple_document(&request)
        .await
        .map_err(ToolError::upstream("Failed to send simple document"))?;

    Ok(json!({
        "success": true,
        "message": format!(
            "Simple document \"{}\" sent to {} successfully",
            args.document_name, args.signer_name
        ),
        "documentCollectionId": collection.id,
        "documentName": collection.name,
        "status": collection.status,
        "creationTime": collection.creation_time,
        "signer": { "name": args.signer_name, "contact": args.signer_means },
        "templateUsed": args.template_id,
    }))
}

async fn resend(client: &WeSignClient, args: ResendArgs) -> Result<Value, ToolError> {
    let result = client
        .resend_to_signer(&args.document_collection_id, &args.signer_id, args.sending_method)
        .await
        .map_err(ToolError::upstream("Failed to resend to signer"))?;
    let method = labels::sending_method(i64::from(args.sending_method));

    Ok(json!({
        "success": result.success,
        "message": format!("Document resent to signer successfully via {method}"),
        "sendingMethod": method,
        "documentCollectionId": args.document_collection_id,
        "signerId": args.signer_id,
    }))
}

async fn replace(client: &WeSignClient, args: ReplaceArgs) -> Result<Value, ToolError> {
    let signer = ReplacementSigner {
        contact_name: args.new_signer.contact_name,
        contact_means: args.new_signer.contact_means,
        sending_method: args.new_signer.sending_method,
    };
    let result = client
        .replace_signer(&args.document_collection_id, &args.signer_id, &signer)
        .await
        .map_err(ToolError::upstream("Failed to replace signer"))?;

    Ok(json!({
        "success": result.success,
        "message": "Signer replaced successfully",
        "documentCollectionId": args.document_collection_id,
        "oldSignerId": args.signer_id,
        "newSigner": {
            "name": signer.contact_name,
            "contact": signer.contact_means,
            "sendingMethod": labels::sending_method(i64::from(signer.sending_method)),
        }
    }))
}

async fn share(client: &WeSignClient, args: ShareArgs) -> Result<Value, ToolError> {
    let result = client
        .share_document(&args.document_collection_id, &args.emails, args.message.as_deref())
        .await
        .map_err(ToolError::upstream("Failed to share document"))?;

    Ok(json!({
        "success": result.success,
        "message": format!("Document shared with {} recipients successfully", args.emails.len()),
        "documentCollectionId": args.document_collection_id,
        "recipientsCount": args.emails.len(),
        "sharedWith": args.emails,
        "shareMessage": args.message.unwrap_or_else(|| "No custom message".to_string()),
    }))
}

async fn signer_link(client: &WeSignClient, args: SignerRefArgs) -> Result<Value, ToolError> {
    let link = client
        .sender_live_link(&args.document_collection_id, &args.signer_id)
        .await
        .map_err(ToolError::upstream("Failed to get signer link"))?;

    Ok(json!({
        "success": true,
        "message": "Signer link retrieved successfully",
        "documentCollectionId": args.document_collection_id,
        "signerId": args.signer_id,
        "liveLink": link.live_link,
    }))
}
