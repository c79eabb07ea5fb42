//! Template fields placed from natural-language positions.

use serde::Deserialize;
use serde_json::{json, Value};

use super::{define, parse_args, ToolError, MAX_PAGE_COUNT};
use crate::mcp::protocol::ToolDefinition;
use crate::position::{
    parse_position_sized, validate_coordinates, Confidence, FieldKind, FieldSize, PageSize,
};
use crate::wesign::requests::{
    FieldBox, TemplateCheckboxField, TemplateFields, TemplateSignatureField, TemplateTextField,
};
use crate::wesign::WeSignClient;

const PRESETS: [&str; 6] = [
    "signature-bottom-all-pages",
    "signature-bottom-first-page",
    "signature-bottom-last-page",
    "initials-bottom-right-all-pages",
    "signature-and-date-bottom",
    "signature-initials-date-bottom",
];

/// Catalog entries for the smart field tools.
#[must_use]
pub fn definitions() -> Vec<ToolDefinition> {
    vec![
        define(
            "wesign_add_field_smart",
            "Add fields to a template using natural-language positions such as \"bottom right\" or \"below 'Signature:'\"",
            json!({
                "type": "object",
                "properties": {
                    "templateId": { "type": "string", "description": "ID of the template" },
                    "fields": {
                        "type": "array",
                        "description": "Fields to add",
                        "items": {
                            "type": "object",
                            "properties": {
                                "type": {
                                    "type": "string",
                                    "enum": ["signature", "initials", "date", "text", "checkbox"],
                                    "description": "Kind of field"
                                },
                                "name": { "type": "string", "description": "Unique field name" },
                                "page": { "type": "number", "minimum": 1, "description": "Page number (1-based)" },
                                "position": { "type": "string", "description": "Where to place the field, e.g. \"top left\"" },
                                "referenceText": {
                                    "type": "string",
                                    "description": "Text on the page the position is relative to"
                                },
                                "mandatory": { "type": "boolean", "description": "Is field required (default: true)" },
                                "width": { "type": "number", "description": "Custom width in points" },
                                "height": { "type": "number", "description": "Custom height in points" }
                            },
                            "required": ["type", "name", "page", "position"]
                        }
                    }
                },
                "required": ["templateId", "fields"]
            }),
        ),
        define(
            "wesign_add_signature_preset",
            "Add a common signature layout to a template",
            json!({
                "type": "object",
                "properties": {
                    "templateId": { "type": "string", "description": "ID of the template" },
                    "preset": { "type": "string", "enum": PRESETS, "description": "Layout to apply" },
                    "pageCount": {
                        "type": "number",
                        "minimum": 1,
                        "maximum": MAX_PAGE_COUNT,
                        "description": "Number of pages in the document (default: 1)"
                    }
                },
                "required": ["templateId", "preset"]
            }),
        ),
    ]
}

/// One requested field.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldRequest {
    /// `signature`, `initials`, `date`, `text` or `checkbox`.
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub page: u32,
    pub position: String,
    pub reference_text: Option<String>,
    pub mandatory: Option<bool>,
    pub width: Option<f64>,
    pub height: Option<f64>,
}

impl FieldRequest {
    fn new(kind: FieldKind, name: String, page: u32, position: &str) -> Self {
        Self {
            kind: kind.to_string(),
            name,
            page,
            position: position.to_string(),
            reference_text: None,
            mandatory: None,
            width: None,
            height: None,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SmartArgs {
    template_id: String,
    fields: Vec<FieldRequest>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PresetArgs {
    template_id: String,
    preset: String,
    page_count: Option<u32>,
}

/// A field after its position has been resolved.
#[derive(Debug, Clone)]
pub struct PlacedField {
    pub kind: FieldKind,
    pub name: String,
    pub position: String,
    pub bounds: FieldBox,
    pub mandatory: bool,
    pub confidence: Confidence,
}

/// Resolves every request on a letter page. Returns the placed fields and
/// the warnings raised for uncertain or out-of-page placements.
#[must_use]
pub fn place_fields(requests: &[FieldRequest]) -> (Vec<PlacedField>, Vec<String>) {
    let page = PageSize::LETTER;
    let mut warnings = Vec::new();

    let placed = requests
        .iter()
        .map(|request| {
            let kind = FieldKind::from_name(&request.kind);
            let size = match (request.width, request.height) {
                (Some(width), Some(height)) => FieldSize::new(width, height),
                _ => kind.size(),
            };
            let placement = parse_position_sized(
                &request.position,
                size,
                page,
                request.reference_text.as_deref(),
            );

            if !validate_coordinates(placement.x, placement.y, size, page) {
                warnings.push(format!(
                    "Field \"{}\" coordinates may be out of bounds. Position: {}, Coordinates: ({}, {})",
                    request.name, request.position, placement.x, placement.y
                ));
            }
            if placement.confidence != Confidence::High {
                let detail = placement
                    .explanation
                    .clone()
                    .unwrap_or_else(|| format!("Confidence: {}", placement.confidence));
                warnings.push(format!("Field \"{}\": {detail}", request.name));
            }

            PlacedField {
                kind,
                name: request.name.clone(),
                position: request.position.clone(),
                bounds: FieldBox {
                    x: placement.x,
                    y: placement.y,
                    width: size.width,
                    height: size.height,
                    page: request.page,
                },
                mandatory: request.mandatory.unwrap_or(true),
                confidence: placement.confidence,
            }
        })
        .collect();

    (placed, warnings)
}

/// Sorts placed fields into the template's signature, text and checkbox
/// lists.
#[must_use]
pub fn template_fields(placed: &[PlacedField]) -> TemplateFields {
    let mut fields = TemplateFields::default();
    for field in placed {
        match field.kind {
            FieldKind::Signature | FieldKind::Initials => {
                fields.signature_fields.push(TemplateSignatureField {
                    name: field.name.clone(),
                    bounds: field.bounds,
                    mandatory: field.mandatory,
                });
            }
            FieldKind::Text | FieldKind::Date => fields.text_fields.push(TemplateTextField {
                name: field.name.clone(),
                bounds: field.bounds,
                mandatory: field.mandatory,
                text_field_type: field.kind.code(),
            }),
            FieldKind::Checkbox => fields.checkbox_fields.push(TemplateCheckboxField {
                name: field.name.clone(),
                bounds: field.bounds,
                mandatory: field.mandatory,
            }),
        }
    }
    fields
}

/// Expands a preset into field requests.
///
/// # Errors
///
/// Returns [`ToolError::InvalidArguments`] for an unknown preset.
pub fn preset_fields(preset: &str, page_count: u32) -> Result<Vec<FieldRequest>, ToolError> {
    let pages = page_count.clamp(1, MAX_PAGE_COUNT);
    let single = |kind, name: &str, page, position| {
        FieldRequest::new(kind, name.to_string(), page, position)
    };

    let fields = match preset {
        "signature-bottom-all-pages" => (1..=pages)
            .map(|p| {
                FieldRequest::new(
                    FieldKind::Signature,
                    format!("Signature_Page_{p}"),
                    p,
                    "bottom center",
                )
            })
            .collect(),
        "signature-bottom-first-page" => {
            vec![single(FieldKind::Signature, "Signature", 1, "bottom center")]
        }
        "signature-bottom-last-page" => {
            vec![single(FieldKind::Signature, "Signature", pages, "bottom center")]
        }
        "initials-bottom-right-all-pages" => (1..=pages)
            .map(|p| {
                FieldRequest::new(
                    FieldKind::Initials,
                    format!("Initials_Page_{p}"),
                    p,
                    "bottom right",
                )
            })
            .collect(),
        "signature-and-date-bottom" => vec![
            single(FieldKind::Signature, "Signature", 1, "bottom left"),
            single(FieldKind::Date, "Date", 1, "bottom right"),
        ],
        "signature-initials-date-bottom" => vec![
            single(FieldKind::Signature, "Signature", 1, "bottom left"),
            single(FieldKind::Initials, "Initials", 1, "bottom center"),
            single(FieldKind::Date, "Date", 1, "bottom right"),
        ],
        other => {
            return Err(ToolError::invalid(format!(
                "Unknown preset: {other}. Valid presets: {}",
                PRESETS.join(", ")
            )))
        }
    };
    Ok(fields)
}

/// Executes a smart field tool.
///
/// # Errors
///
/// Returns argument or upstream errors.
pub async fn call(client: &WeSignClient, name: &str, arguments: &Value) -> Result<Value, ToolError> {
    match name {
        "wesign_add_field_smart" => {
            let args: SmartArgs = parse_args(arguments)?;
            apply(client, &args.template_id, &args.fields).await
        }
        "wesign_add_signature_preset" => {
            let args: PresetArgs = parse_args(arguments)?;
            let fields = preset_fields(&args.preset, args.page_count.unwrap_or(1))?;
            let mut result = apply(client, &args.template_id, &fields).await?;
            result["preset"] = json!(args.preset);
            Ok(result)
        }
        _ => Err(ToolError::UnknownTool(name.to_string())),
    }
}

async fn apply(
    client: &WeSignClient,
    template_id: &str,
    requests: &[FieldRequest],
) -> Result<Value, ToolError> {
    if requests.is_empty() {
        return Err(ToolError::invalid("at least one field is required"));
    }

    let (placed, warnings) = place_fields(requests);
    let fields = template_fields(&placed);

    client
        .update_template_fields(template_id, &fields)
        .await
        .map_err(ToolError::upstream("Failed to add fields"))?;

    let summary: Vec<Value> = placed
        .iter()
        .enumerate()
        .map(|(i, f)| {
            json!({
                "index": i + 1,
                "name": f.name,
                "type": f.kind.to_string(),
                "page": f.bounds.page,
                "position": f.position,
                "coordinates": { "x": f.bounds.x, "y": f.bounds.y },
                "size": { "width": f.bounds.width, "height": f.bounds.height },
                "confidence": f.confidence,
            })
        })
        .collect();

    let mut response = json!({
        "success": true,
        "message": format!("Added {} field(s) using natural language positioning", placed.len()),
        "templateId": template_id,
        "fieldsAdded": placed.len(),
        "fields": summary,
    });
    if !warnings.is_empty() {
        response["warnings"] = json!(warnings);
    }
    Ok(response)
}
