//! Template, account and bulk tools.

use std::path::Path;

use serde::Deserialize;
use serde_json::{json, Value};

use super::workflow::{self, FieldPlacement, SendPlan};
use super::{define, files, labels, parse_args, ToolError, MAX_PAGE_COUNT};
use crate::mcp::protocol::ToolDefinition;
use crate::wesign::requests::{
    FieldBox, NewSigner, TemplateFields, TemplateSignatureField, UserLanguage, UserUpdate,
};
use crate::wesign::WeSignClient;

/// Pages assumed when the page count of the uploaded file is unknown.
const ASSUMED_PAGE_COUNT: u32 = 10;

/// Catalog entries for the template and account tools.
#[must_use]
pub fn definitions() -> Vec<ToolDefinition> {
    vec![
        define(
            "wesign_create_template",
            "Create a reusable template from a document file",
            json!({
                "type": "object",
                "properties": {
                    "filePath": { "type": "string", "description": "Path to the document file" },
                    "name": { "type": "string", "description": "Name for the template" },
                    "description": { "type": "string", "description": "Optional template description" }
                },
                "required": ["filePath", "name"]
            }),
        ),
        define(
            "wesign_list_templates",
            "List available templates",
            json!({
                "type": "object",
                "properties": {
                    "offset": { "type": "number", "minimum": 0, "description": "Number of records to skip (default: 0)" },
                    "limit": { "type": "number", "minimum": 1, "description": "Maximum number of records to return (default: 50)" }
                }
            }),
        ),
        define(
            "wesign_get_template",
            "Get details of a specific template",
            json!({
                "type": "object",
                "properties": {
                    "templateId": { "type": "string", "description": "ID of the template" }
                },
                "required": ["templateId"]
            }),
        ),
        define(
            "wesign_use_template",
            "Create a new self-sign document from an existing template",
            json!({
                "type": "object",
                "properties": {
                    "templateId": { "type": "string", "description": "ID of the template to use" },
                    "documentName": { "type": "string", "description": "Name for the new document" }
                },
                "required": ["templateId", "documentName"]
            }),
        ),
        define(
            "wesign_update_template_fields",
            "Add signature fields to a template at explicit coordinates",
            json!({
                "type": "object",
                "properties": {
                    "templateId": { "type": "string", "description": "ID of the template" },
                    "signatureFields": {
                        "type": "array",
                        "description": "Signature fields to add",
                        "items": {
                            "type": "object",
                            "properties": {
                                "name": { "type": "string", "description": "Unique field name" },
                                "x": { "type": "number", "description": "X coordinate" },
                                "y": { "type": "number", "description": "Y coordinate" },
                                "width": { "type": "number", "description": "Field width" },
                                "height": { "type": "number", "description": "Field height" },
                                "page": { "type": "number", "minimum": 1, "description": "Page number (1-based)" },
                                "mandatory": { "type": "boolean", "description": "Is field required (default: true)" }
                            },
                            "required": ["name", "x", "y", "width", "height", "page"]
                        }
                    }
                },
                "required": ["templateId", "signatureFields"]
            }),
        ),
        define(
            "wesign_get_user_info",
            "Get information about the current user account",
            json!({ "type": "object", "properties": {} }),
        ),
        define(
            "wesign_update_user_info",
            "Update the current user's account information",
            json!({
                "type": "object",
                "properties": {
                    "name": { "type": "string", "description": "Full name" },
                    "email": { "type": "string", "description": "Email address" },
                    "phone": { "type": "string", "description": "Phone number" },
                    "language": { "type": "number", "enum": [1, 2], "description": "1=English, 2=Hebrew" }
                },
                "required": ["name", "email"]
            }),
        ),
        define(
            "wesign_extract_signers_from_excel",
            "Extract a list of signers from an Excel file (.xls or .xlsx)",
            json!({
                "type": "object",
                "properties": {
                    "filePath": { "type": "string", "description": "Path to the Excel file" }
                },
                "required": ["filePath"]
            }),
        ),
        define(
            "wesign_check_auth_status",
            "Check whether a WeSign session is active",
            json!({ "type": "object", "properties": {} }),
        ),
        define(
            "wesign_send_document_for_signing",
            "Send a document to a single signer in one call: creates a template, adds a signature field to each page and sends it",
            json!({
                "type": "object",
                "properties": {
                    "filePath": { "type": "string", "description": "Path to the document file" },
                    "signerName": { "type": "string", "description": "Full name of the signer" },
                    "signerPhone": { "type": "string", "description": "Phone number of the signer" },
                    "signerEmail": { "type": "string", "description": "Email of the signer (optional, for email delivery)" },
                    "sendingMethod": {
                        "type": "number",
                        "enum": [1, 2, 3],
                        "description": "How to send: 1=SMS, 2=Email, 3=WhatsApp (default: 1)"
                    },
                    "pageCount": {
                        "type": "number",
                        "minimum": 1,
                        "maximum": MAX_PAGE_COUNT,
                        "description": "Number of pages to place a signature field on (default: 10)"
                    },
                    "fieldPosition": {
                        "type": "object",
                        "description": "Custom box for the signature fields (default: x=100, y=700, 200x50)",
                        "properties": {
                            "x": { "type": "number" },
                            "y": { "type": "number" },
                            "width": { "type": "number" },
                            "height": { "type": "number" }
                        }
                    }
                },
                "required": ["filePath", "signerName", "signerPhone"]
            }),
        ),
    ]
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateArgs {
    file_path: String,
    name: String,
    description: Option<String>,
}

#[derive(Deserialize)]
struct ListArgs {
    #[serde(default)]
    offset: u32,
    limit: Option<u32>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UseArgs {
    template_id: String,
    document_name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FieldsArgs {
    template_id: String,
    signature_fields: Vec<FieldArg>,
}

#[derive(Deserialize)]
struct FieldArg {
    name: String,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    page: u32,
    mandatory: Option<bool>,
}

#[derive(Deserialize)]
struct UserArgs {
    name: String,
    email: String,
    phone: Option<String>,
    language: Option<i64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SendArgs {
    file_path: String,
    signer_name: String,
    signer_phone: String,
    signer_email: Option<String>,
    sending_method: Option<u8>,
    page_count: Option<u32>,
    #[serde(default)]
    field_position: BoxArg,
}

#[derive(Deserialize)]
#[serde(default)]
struct BoxArg {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
}

impl Default for BoxArg {
    fn default() -> Self {
        Self {
            x: 100.0,
            y: 700.0,
            width: 200.0,
            height: 50.0,
        }
    }
}

/// Executes a template or account tool.
///
/// # Errors
///
/// Returns argument, local file or upstream errors.
pub async fn call(client: &WeSignClient, name: &str, arguments: &Value) -> Result<Value, ToolError> {
    match name {
        "wesign_create_template" => create(client, parse_args(arguments)?).await,
        "wesign_list_templates" => list(client, parse_args(arguments)?).await,
        "wesign_get_template" => {
            let id = super::required_str(arguments, "templateId")?;
            get(client, id).await
        }
        "wesign_use_template" => use_template(client, parse_args(arguments)?).await,
        "wesign_update_template_fields" => update_fields(client, parse_args(arguments)?).await,
        "wesign_get_user_info" => user_info(client).await,
        "wesign_update_user_info" => update_user(client, parse_args(arguments)?).await,
        "wesign_extract_signers_from_excel" => {
            let path = super::required_str(arguments, "filePath")?;
            extract_signers(client, path).await
        }
        "wesign_check_auth_status" => Ok(auth_status(client).await),
        "wesign_send_document_for_signing" => send_for_signing(client, parse_args(arguments)?).await,
        _ => Err(ToolError::UnknownTool(name.to_string())),
    }
}

async fn create(client: &WeSignClient, args: CreateArgs) -> Result<Value, ToolError> {
    let file = files::read_as_data_url(&args.file_path).await?;
    let template = client
        .create_template(&args.name, &file.data_url, args.description.as_deref())
        .await
        .map_err(ToolError::upstream("Failed to create template"))?;

    Ok(json!({
        "success": true,
        "message": format!("Template \"{}\" created successfully", args.name),
        "template": {
            "id": template.id,
            "name": template.name,
            "description": template.description,
            "status": template.status,
            "creationTime": template.creation_time,
        },
        "originalFileName": file.file_name,
        "fileSize": file.size,
        "mimeType": file.mime,
    }))
}

async fn list(client: &WeSignClient, args: ListArgs) -> Result<Value, ToolError> {
    let limit = args.limit.unwrap_or(50);
    let templates = client
        .templates(args.offset, limit)
        .await
        .map_err(ToolError::upstream("Failed to list templates"))?;

    let entries: Vec<Value> = templates
        .iter()
        .map(|t| {
            json!({
                "id": t.id,
                "name": t.name,
                "description": t.description,
                "status": t.status,
                "statusName": labels::template_status(t.status),
                "creationTime": t.creation_time,
            })
        })
        .collect();

    Ok(json!({
        "success": true,
        "templates": entries,
        "pagination": { "offset": args.offset, "limit": limit, "count": templates.len() },
    }))
}

async fn get(client: &WeSignClient, id: &str) -> Result<Value, ToolError> {
    let template = client
        .template(id)
        .await
        .map_err(ToolError::upstream("Failed to get template"))?;

    Ok(json!({
        "success": true,
        "template": {
            "id": template.id,
            "name": template.name,
            "description": template.description,
            "status": template.status,
            "statusName": labels::template_status(template.status),
            "creationTime": template.creation_time,
            "hasFile": template.base64_file.as_deref().is_some_and(|f| !f.is_empty()),
        }
    }))
}

async fn use_template(client: &WeSignClient, args: UseArgs) -> Result<Value, ToolError> {
    let context = "Failed to use template";
    let template = client
        .template(&args.template_id)
        .await
        .map_err(ToolError::upstream(context))?;
    let Some(file) = template.base64_file.as_deref().filter(|f| !f.is_empty()) else {
        return Err(ToolError::invalid("Template file not available"));
    };

    let document = client
        .create_self_sign(&args.document_name, file, Some(&args.template_id))
        .await
        .map_err(ToolError::upstream(context))?;

    Ok(json!({
        "success": true,
        "message": format!(
            "Document \"{}\" created from template \"{}\"",
            args.document_name, template.name
        ),
        "documentCollectionId": document.document_collection_id,
        "documentId": document.document_id,
        "documentName": document.name,
        "pagesCount": document.pages_count,
        "sourceTemplate": { "id": template.id, "name": template.name },
    }))
}

async fn update_fields(client: &WeSignClient, args: FieldsArgs) -> Result<Value, ToolError> {
    let fields = TemplateFields {
        signature_fields: args
            .signature_fields
            .iter()
            .map(|f| TemplateSignatureField {
                name: f.name.clone(),
                bounds: FieldBox {
                    x: f.x,
                    y: f.y,
                    width: f.width,
                    height: f.height,
                    page: f.page,
                },
                mandatory: f.mandatory.unwrap_or(true),
            })
            .collect(),
        ..TemplateFields::default()
    };

    client
        .update_template_fields(&args.template_id, &fields)
        .await
        .map_err(ToolError::upstream("Failed to update template fields"))?;

    let summary: Vec<Value> = args
        .signature_fields
        .iter()
        .enumerate()
        .map(|(i, f)| {
            json!({
                "index": i + 1,
                "name": f.name,
                "page": f.page,
                "position": { "x": f.x, "y": f.y },
                "size": { "width": f.width, "height": f.height },
                "mandatory": f.mandatory.unwrap_or(true),
            })
        })
        .collect();

    Ok(json!({
        "success": true,
        "message": format!("Added {} signature fields to template", fields.len()),
        "templateId": args.template_id,
        "fieldsAdded": fields.len(),
        "fields": summary,
    }))
}

async fn user_info(client: &WeSignClient) -> Result<Value, ToolError> {
    let user = client
        .current_user()
        .await
        .map_err(ToolError::upstream("Failed to get user info"))?;

    let language = user.user_configuration.language;
    Ok(json!({
        "success": true,
        "user": {
            "id": user.id,
            "name": user.name,
            "email": user.email,
            "phone": user.phone,
            "companyId": user.company_id,
            "companyName": user.company_name,
            "groupName": user.group_name,
            "type": user.user_type,
            "typeName": labels::user_type(user.user_type),
            "status": user.status,
            "statusName": labels::user_status(user.status),
            "language": language,
            "languageName": labels::language(language),
            "program": {
                "expiredTime": user.program.expired_time,
                "remainingDocuments": user.program.remaining_documents_for_month,
            }
        }
    }))
}

async fn update_user(client: &WeSignClient, args: UserArgs) -> Result<Value, ToolError> {
    let language = args.language.unwrap_or(1);
    let update = UserUpdate {
        name: args.name.clone(),
        email: args.email.clone(),
        phone: args.phone.clone(),
        user_configuration: UserLanguage { language },
    };

    let result = client
        .update_user(&update)
        .await
        .map_err(ToolError::upstream("Failed to update user info"))?;

    Ok(json!({
        "success": result.success,
        "message": if result.success {
            "User information updated successfully"
        } else {
            "Failed to update user information"
        },
        "updatedFields": {
            "name": args.name,
            "email": args.email,
            "phone": args.phone,
            "language": language,
        }
    }))
}

async fn extract_signers(client: &WeSignClient, path: &str) -> Result<Value, ToolError> {
    let is_excel = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("xls") || e.eq_ignore_ascii_case("xlsx"));
    if !is_excel {
        return Err(ToolError::invalid("File must be an Excel file (.xls or .xlsx)"));
    }

    let file = files::read_as_data_url(path).await?;
    let signers = client
        .extract_signers_from_excel(&file.data_url)
        .await
        .map_err(ToolError::upstream("Failed to extract signers from Excel"))?;

    let entries: Vec<Value> = signers
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let contact = s
                .get("email")
                .filter(|v| v.as_str().is_some_and(|e| !e.is_empty()))
                .or_else(|| s.get("phone"))
                .cloned()
                .unwrap_or(Value::Null);
            json!({
                "index": i + 1,
                "firstName": s.get("firstName"),
                "lastName": s.get("lastName"),
                "contact": contact,
                "additionalFields": s.get("additionalFields").cloned().unwrap_or_else(|| json!([])),
            })
        })
        .collect();

    Ok(json!({
        "success": true,
        "message": format!("Extracted {} signers from Excel file", entries.len()),
        "signersCount": entries.len(),
        "signers": entries,
        "fileName": file.file_name,
        "fileSize": file.size,
    }))
}

async fn auth_status(client: &WeSignClient) -> Value {
    let tokens = client.tokens().await;
    json!({
        "success": true,
        "authenticated": tokens.is_some(),
        "hasTokens": tokens.is_some(),
        "tokenInfo": tokens.map(|t| json!({
            "hasAccessToken": !t.access_token.is_empty(),
            "hasRefreshToken": !t.refresh_token.is_empty(),
            "hasAuthToken": t.auth_token.is_some(),
        })),
    })
}

async fn send_for_signing(client: &WeSignClient, args: SendArgs) -> Result<Value, ToolError> {
    let stem = Path::new(&args.file_path)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    let template_name = format!("{stem}_{}", chrono::Utc::now().timestamp_millis());
    let sending_method = args.sending_method.unwrap_or(1);
    let contact = args
        .signer_email
        .filter(|e| !e.is_empty())
        .unwrap_or(args.signer_phone);
    let page_count = args.page_count.unwrap_or(ASSUMED_PAGE_COUNT);

    let plan = SendPlan {
        file_path: args.file_path,
        template_name: template_name.clone(),
        template_description: "Auto-generated template for signing".to_string(),
        document_name: template_name,
        placement: FieldPlacement::Fixed {
            x: args.field_position.x,
            y: args.field_position.y,
            width: args.field_position.width,
            height: args.field_position.height,
        },
        page_count,
        signers: vec![NewSigner {
            contact_name: args.signer_name.clone(),
            contact_means: contact.clone(),
            sending_method,
            contact_id: None,
            phone_extension: None,
            link_expiration_hours: None,
            sender_note: None,
        }],
        sender_note: None,
        redirect_url: None,
    };

    let outcome = workflow::send(client, plan).await?;
    let collection = outcome.collection;

    Ok(json!({
        "success": true,
        "message": format!("Document sent successfully to {}", args.signer_name),
        "workflow": {
            "step1_template": {
                "templateId": outcome.template.id,
                "templateName": outcome.template.name,
                "originalFile": outcome.file.file_name,
                "fileSize": outcome.file.size,
            },
            "step2_fields": {
                "fieldsAdded": outcome.fields.len(),
                "pagesWithFields": page_count,
            },
            "step3_sending": {
                "documentCollectionId": collection.id,
                "documentName": collection.name,
                "status": collection.status,
                "creationTime": collection.creation_time,
                "signer": {
                    "name": args.signer_name,
                    "contact": contact,
                    "sendingMethod": labels::sending_method(i64::from(sending_method)),
                }
            }
        }
    }))
}
