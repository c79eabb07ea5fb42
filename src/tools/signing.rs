//! Self-sign tools.
//!
//! A self-sign document is created from a local file, given fields, then
//! closed (signed), saved as a draft or declined.

use serde::Deserialize;
use serde_json::{json, Value};

use super::{define, files, labels, parse_args, ToolError, MAX_PAGE_COUNT};
use crate::mcp::protocol::ToolDefinition;
use crate::position::{FieldKind, GridAnchor, PageSize};
use crate::wesign::requests::{DocumentOperation, SignatureField};
use crate::wesign::WeSignClient;

/// Positions accepted by `wesign_add_fields_by_position`.
const POSITIONS: [&str; 6] = [
    "top-left",
    "center-left",
    "bottom-left",
    "top-right",
    "center-right",
    "bottom-right",
];

fn field_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "x": { "type": "number", "description": "X coordinate in points" },
            "y": { "type": "number", "description": "Y coordinate in points" },
            "width": { "type": "number", "description": "Width in points" },
            "height": { "type": "number", "description": "Height in points" },
            "pageNumber": { "type": "number", "minimum": 1, "description": "Page number (1-based)" },
            "fieldType": {
                "type": "number",
                "enum": [1, 2, 3, 4, 5],
                "description": "Field type: 1=Signature, 2=Initial, 3=Text, 4=Date, 5=Checkbox"
            }
        },
        "required": ["x", "y", "width", "height", "pageNumber", "fieldType"]
    })
}

fn document_ref_properties() -> serde_json::Map<String, Value> {
    let mut properties = serde_json::Map::new();
    properties.insert(
        "documentCollectionId".to_string(),
        json!({ "type": "string", "description": "ID of the document collection" }),
    );
    properties.insert(
        "documentId".to_string(),
        json!({ "type": "string", "description": "ID of the specific document" }),
    );
    properties
}

fn document_ref_schema(extra: &[(&str, Value)]) -> Value {
    let mut properties = document_ref_properties();
    for (key, schema) in extra {
        properties.insert((*key).to_string(), schema.clone());
    }
    json!({
        "type": "object",
        "properties": properties,
        "required": ["documentCollectionId", "documentId"]
    })
}

/// Catalog entries for the self-sign tools.
#[must_use]
pub fn definitions() -> Vec<ToolDefinition> {
    vec![
        define(
            "wesign_create_self_sign",
            "Create a self-signing document that you can sign yourself",
            json!({
                "type": "object",
                "properties": {
                    "filePath": { "type": "string", "description": "Path to the document file to be signed" },
                    "name": {
                        "type": "string",
                        "description": "Optional custom name for the document. If not provided, uses filename"
                    },
                    "sourceTemplateId": { "type": "string", "description": "Optional ID of template to use as source" }
                },
                "required": ["filePath"]
            }),
        ),
        define(
            "wesign_add_signature_fields",
            "Add signature fields to a self-sign document at explicit coordinates",
            {
                let mut schema = document_ref_schema(&[(
                    "fields",
                    json!({
                        "type": "array",
                        "items": field_schema(),
                        "description": "Array of signature fields to add"
                    }),
                )]);
                schema["required"] = json!(["documentCollectionId", "documentId", "fields"]);
                schema
            },
        ),
        define(
            "wesign_add_fields_by_position",
            "Add fields at a predefined page position (top/center/bottom, left/right) on pages 1 to numPages",
            {
                let mut schema = document_ref_schema(&[
                    (
                        "position",
                        json!({
                            "type": "string",
                            "enum": POSITIONS,
                            "description": "Predefined position on the page"
                        }),
                    ),
                    (
                        "numPages",
                        json!({
                            "type": "number",
                            "minimum": 1,
                            "maximum": MAX_PAGE_COUNT,
                            "description": "Number of pages to add fields to (starting from page 1)"
                        }),
                    ),
                    (
                        "fieldType",
                        json!({
                            "type": "number",
                            "enum": [1, 2, 3, 4, 5],
                            "description": "Field type: 1=Signature (default), 2=Initial, 3=Text, 4=Date, 5=Checkbox"
                        }),
                    ),
                ]);
                schema["required"] =
                    json!(["documentCollectionId", "documentId", "position", "numPages"]);
                schema
            },
        ),
        define(
            "wesign_complete_signing",
            "Complete the signing process for a self-sign document",
            document_ref_schema(&[(
                "savePath",
                json!({ "type": "string", "description": "Optional path to save the signed document" }),
            )]),
        ),
        define(
            "wesign_save_draft",
            "Save the current state of a self-sign document as draft",
            document_ref_schema(&[(
                "fields",
                json!({
                    "type": "array",
                    "items": field_schema(),
                    "description": "Optional array of signature fields to save with draft"
                }),
            )]),
        ),
        define(
            "wesign_decline_document",
            "Decline to sign a document",
            document_ref_schema(&[(
                "reason",
                json!({ "type": "string", "description": "Optional reason for declining" }),
            )]),
        ),
        define(
            "wesign_get_signing_status",
            "Get the current signing status of a document",
            json!({
                "type": "object",
                "properties": {
                    "documentCollectionId": { "type": "string", "description": "ID of the document collection" }
                },
                "required": ["documentCollectionId"]
            }),
        ),
    ]
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateArgs {
    file_path: String,
    name: Option<String>,
    source_template_id: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FieldsArgs {
    document_collection_id: String,
    document_id: String,
    #[serde(default)]
    fields: Vec<SignatureField>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PositionArgs {
    document_collection_id: String,
    document_id: String,
    position: String,
    num_pages: u32,
    field_type: Option<i64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CompleteArgs {
    document_collection_id: String,
    document_id: String,
    save_path: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeclineArgs {
    document_collection_id: String,
    document_id: String,
    reason: Option<String>,
}

/// Executes a self-sign tool.
///
/// # Errors
///
/// Returns argument, local file or upstream errors.
pub async fn call(client: &WeSignClient, name: &str, arguments: &Value) -> Result<Value, ToolError> {
    match name {
        "wesign_create_self_sign" => create(client, parse_args(arguments)?).await,
        "wesign_add_signature_fields" => add_fields(client, parse_args(arguments)?).await,
        "wesign_add_fields_by_position" => add_by_position(client, parse_args(arguments)?).await,
        "wesign_complete_signing" => complete(client, parse_args(arguments)?).await,
        "wesign_save_draft" => save_draft(client, parse_args(arguments)?).await,
        "wesign_decline_document" => decline(client, parse_args(arguments)?).await,
        "wesign_get_signing_status" => {
            let id = super::required_str(arguments, "documentCollectionId")?;
            status(client, id).await
        }
        _ => Err(ToolError::UnknownTool(name.to_string())),
    }
}

/// One field of `kind` at `anchor` on each page from 1 to `pages`.
pub(crate) fn fields_for_pages(anchor: GridAnchor, kind: FieldKind, pages: u32) -> Vec<SignatureField> {
    let size = kind.size();
    let (x, y) = anchor.locate(size, PageSize::LETTER);
    (1..=pages)
        .map(|page_number| SignatureField {
            x,
            y,
            width: size.width,
            height: size.height,
            page_number,
            field_type: kind.code(),
        })
        .collect()
}

fn kind_label(code: u8) -> &'static str {
    FieldKind::from_code(i64::from(code)).map_or("Unknown", FieldKind::label)
}

fn check_fields(fields: &[SignatureField]) -> Result<(), ToolError> {
    for field in fields {
        if FieldKind::from_code(i64::from(field.field_type)).is_none() {
            return Err(ToolError::invalid(format!(
                "Invalid field type: {}. Must be 1-5 (Signature, Initial, Text, Date, Checkbox)",
                field.field_type
            )));
        }
        if field.page_number < 1 {
            return Err(ToolError::invalid(format!(
                "Invalid page number: {}. Must be 1 or greater",
                field.page_number
            )));
        }
    }
    Ok(())
}

async fn create(client: &WeSignClient, args: CreateArgs) -> Result<Value, ToolError> {
    let file = files::read_as_data_url(&args.file_path).await?;
    let name = args.name.unwrap_or_else(|| file.stem.clone());

    let document = client
        .create_self_sign(&name, &file.data_url, args.source_template_id.as_deref())
        .await
        .map_err(ToolError::upstream("Failed to create self-sign document"))?;

    Ok(json!({
        "success": true,
        "message": format!("Self-sign document \"{name}\" created successfully"),
        "documentCollectionId": document.document_collection_id,
        "documentId": document.document_id,
        "name": document.name,
        "pagesCount": document.pages_count,
        "originalFileName": file.file_name,
        "fileSize": file.size,
        "mimeType": file.mime,
    }))
}

async fn add_fields(client: &WeSignClient, args: FieldsArgs) -> Result<Value, ToolError> {
    check_fields(&args.fields)?;

    let result = client
        .update_self_sign(
            &args.document_collection_id,
            &args.document_id,
            Some(&args.fields),
            DocumentOperation::Save,
        )
        .await
        .map_err(ToolError::upstream("Failed to add signature fields"))?;

    let summary: Vec<Value> = args
        .fields
        .iter()
        .map(|f| {
            json!({
                "type": kind_label(f.field_type),
                "position": format!("({}, {})", f.x, f.y),
                "size": format!("{}x{}", f.width, f.height),
                "page": f.page_number,
            })
        })
        .collect();

    Ok(json!({
        "success": result.success,
        "message": format!("Added {} signature fields to document", args.fields.len()),
        "fieldsAdded": args.fields.len(),
        "fields": summary,
    }))
}

async fn add_by_position(client: &WeSignClient, args: PositionArgs) -> Result<Value, ToolError> {
    let anchor = POSITIONS
        .contains(&args.position.as_str())
        .then(|| GridAnchor::named(&args.position))
        .flatten()
        .ok_or_else(|| {
            ToolError::invalid(format!(
                "Invalid position: {}. Valid positions: {}",
                args.position,
                POSITIONS.join(", ")
            ))
        })?;
    let code = args.field_type.unwrap_or(1);
    let kind = FieldKind::from_code(code).ok_or_else(|| {
        ToolError::invalid(format!(
            "Invalid field type: {code}. Must be 1-5 (Signature, Initial, Text, Date, Checkbox)"
        ))
    })?;
    if !(1..=MAX_PAGE_COUNT).contains(&args.num_pages) {
        return Err(ToolError::invalid(format!(
            "Number of pages must be between 1 and {MAX_PAGE_COUNT}"
        )));
    }

    let fields = fields_for_pages(anchor, kind, args.num_pages);
    let result = client
        .update_self_sign(
            &args.document_collection_id,
            &args.document_id,
            Some(&fields),
            DocumentOperation::Save,
        )
        .await
        .map_err(ToolError::upstream("Failed to add fields by position"))?;

    let label = position_label(&args.position);
    let (x, y) = fields.first().map_or((0.0, 0.0), |f| (f.x, f.y));
    let summary: Vec<Value> = fields
        .iter()
        .map(|f| {
            json!({
                "type": kind.label(),
                "position": format!("{label} ({}, {})", f.x, f.y),
                "size": format!("{}x{}", f.width, f.height),
                "page": f.page_number,
            })
        })
        .collect();

    Ok(json!({
        "success": result.success,
        "message": format!(
            "Added {} {} fields at {label} position",
            fields.len(),
            kind.label().to_lowercase()
        ),
        "position": label,
        "positionKey": args.position,
        "coordinates": { "x": x, "y": y },
        "fieldsAdded": fields.len(),
        "fieldType": kind.label(),
        "pages": args.num_pages,
        "fields": summary,
    }))
}

/// `bottom-right` → `Bottom Right`.
fn position_label(key: &str) -> String {
    key.split('-')
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars).collect()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

async fn complete(client: &WeSignClient, args: CompleteArgs) -> Result<Value, ToolError> {
    let result = client
        .update_self_sign(
            &args.document_collection_id,
            &args.document_id,
            None,
            DocumentOperation::Close,
        )
        .await
        .map_err(ToolError::upstream("Failed to complete signing"))?;

    let mut response = json!({
        "success": result.success,
        "message": "Document signing completed successfully",
        "downloadLink": result.download_link,
    });

    // A failed save does not undo the signing; it is reported alongside.
    if let (Some(path), Some(_)) = (args.save_path, result.download_link.as_ref()) {
        let saved = match client
            .download_document(&args.document_collection_id, &args.document_id)
            .await
        {
            Ok(file) => files::write_base64(&path, &file.base64_file).await,
            Err(e) => Err(ToolError::upstream("download failed")(e)),
        };
        match saved {
            Ok(size) => {
                response["savedPath"] = json!(path);
                response["fileSize"] = json!(size);
                response["message"] =
                    json!(format!("Document signing completed successfully and saved to {path}"));
            }
            Err(e) => {
                tracing::warn!(error = %e, "signed document could not be saved");
                response["downloadError"] = json!(format!("Failed to save signed document: {e}"));
            }
        }
    }

    Ok(response)
}

async fn save_draft(client: &WeSignClient, args: FieldsArgs) -> Result<Value, ToolError> {
    check_fields(&args.fields)?;
    let fields = (!args.fields.is_empty()).then_some(args.fields.as_slice());

    let result = client
        .update_self_sign(
            &args.document_collection_id,
            &args.document_id,
            fields,
            DocumentOperation::Save,
        )
        .await
        .map_err(ToolError::upstream("Failed to save draft"))?;

    Ok(json!({
        "success": result.success,
        "message": "Document draft saved successfully",
        "fieldsCount": args.fields.len(),
    }))
}

async fn decline(client: &WeSignClient, args: DeclineArgs) -> Result<Value, ToolError> {
    let result = client
        .update_self_sign(
            &args.document_collection_id,
            &args.document_id,
            None,
            DocumentOperation::Decline,
        )
        .await
        .map_err(ToolError::upstream("Failed to decline document"))?;

    Ok(json!({
        "success": result.success,
        "message": "Document declined successfully",
        "reason": args.reason.unwrap_or_else(|| "No reason provided".to_string()),
    }))
}

async fn status(client: &WeSignClient, id: &str) -> Result<Value, ToolError> {
    let collection = client
        .self_sign_document(id)
        .await
        .map_err(ToolError::upstream("Failed to get signing status"))?;

    Ok(json!({
        "success": true,
        "documentCollection": {
            "id": collection.id,
            "name": collection.name,
            "status": collection.status,
            "statusName": labels::document_status(collection.status),
            "creationTime": collection.creation_time,
            "documents": collection.documents.iter().map(|d| json!({
                "id": d.id,
                "name": d.name,
                "pagesCount": d.pages_count,
                "status": d.status,
                "statusName": labels::document_status(d.status),
            })).collect::<Vec<_>>(),
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bottom_right_signatures_on_every_page() {
        let anchor = GridAnchor::named("bottom-right").unwrap();
        let fields = fields_for_pages(anchor, FieldKind::Signature, 3);
        assert_eq!(fields.len(), 3);
        for (i, field) in fields.iter().enumerate() {
            assert_eq!(field.page_number, i as u32 + 1);
            assert_eq!((field.x, field.y), (362.0, 692.0));
            assert_eq!((field.width, field.height), (200.0, 50.0));
            assert_eq!(field.field_type, 1);
        }
    }

    #[test]
    fn field_size_follows_kind() {
        let anchor = GridAnchor::named("top-left").unwrap();
        let fields = fields_for_pages(anchor, FieldKind::Date, 1);
        assert_eq!((fields[0].x, fields[0].y), (50.0, 50.0));
        assert_eq!((fields[0].width, fields[0].height), (150.0, 30.0));
        assert_eq!(fields[0].field_type, 4);
    }

    #[test]
    fn every_position_resolves_on_the_grid() {
        for position in POSITIONS {
            assert!(GridAnchor::named(position).is_some(), "{position}");
        }
    }

    #[test]
    fn labels_title_case_positions() {
        assert_eq!(position_label("center-left"), "Center Left");
        assert_eq!(position_label("bottom-right"), "Bottom Right");
    }

    #[test]
    fn rejects_bad_field_codes() {
        let field = SignatureField {
            x: 0.0,
            y: 0.0,
            width: 10.0,
            height: 10.0,
            page_number: 1,
            field_type: 9,
        };
        assert!(check_fields(&[field]).is_err());
    }
}
