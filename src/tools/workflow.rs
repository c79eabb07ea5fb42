//! The three-step send flow shared by the multi-party and simple send tools.
//!
//! 1. create a template from a local file
//! 2. attach one signature field per page to the template
//! 3. create a document collection from the template for the signers
//!
//! A failing step stops the flow. Upstream artifacts from earlier steps are
//! left in place and named in the error.

use crate::position::{parse_position, FieldKind, PageSize};
use crate::wesign::models::{DocumentCollection, Template};
use crate::wesign::requests::{
    FieldBox, NewSigner, SignatureRequest, TemplateFields, TemplateSignatureField,
};
use crate::wesign::WeSignClient;

use super::files::{self, EncodedFile};
use super::{ToolError, MAX_PAGE_COUNT};

/// Where the per-page signature field goes.
#[derive(Debug, Clone)]
pub(crate) enum FieldPlacement {
    /// Natural-language phrase resolved on a letter page.
    Phrase(String),
    /// Explicit box in page points.
    Fixed {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
}

impl FieldPlacement {
    fn field_box(&self, page: u32) -> FieldBox {
        match self {
            Self::Phrase(phrase) => {
                let kind = FieldKind::Signature;
                let size = kind.size();
                let placement = parse_position(phrase, kind, PageSize::LETTER, None);
                FieldBox {
                    x: placement.x,
                    y: placement.y,
                    width: size.width,
                    height: size.height,
                    page,
                }
            }
            Self::Fixed {
                x,
                y,
                width,
                height,
            } => FieldBox {
                x: *x,
                y: *y,
                width: *width,
                height: *height,
                page,
            },
        }
    }
}

/// Everything needed to run the flow.
#[derive(Debug, Clone)]
pub(crate) struct SendPlan {
    pub file_path: String,
    pub template_name: String,
    pub template_description: String,
    pub document_name: String,
    pub placement: FieldPlacement,
    pub page_count: u32,
    pub signers: Vec<NewSigner>,
    pub sender_note: Option<String>,
    pub redirect_url: Option<String>,
}

/// Artifacts produced by a completed flow.
#[derive(Debug)]
pub(crate) struct SendOutcome {
    pub file: EncodedFile,
    pub template: Template,
    pub fields: TemplateFields,
    pub collection: DocumentCollection,
}

/// One mandatory signature field per page, capped at [`MAX_PAGE_COUNT`].
pub(crate) fn signature_fields(placement: &FieldPlacement, page_count: u32) -> TemplateFields {
    TemplateFields {
        signature_fields: (1..=page_count.min(MAX_PAGE_COUNT))
            .map(|page| TemplateSignatureField {
                name: format!("Signature_Page_{page}"),
                bounds: placement.field_box(page),
                mandatory: true,
            })
            .collect(),
        ..TemplateFields::default()
    }
}

/// Runs the flow.
///
/// # Errors
///
/// Local file errors are returned as is; upstream failures are wrapped in
/// [`ToolError::WorkflowStep`].
pub(crate) async fn send(client: &WeSignClient, plan: SendPlan) -> Result<SendOutcome, ToolError> {
    let file = files::read_as_data_url(&plan.file_path).await?;

    tracing::info!(file = %file.file_name, "workflow step 1: creating template");
    let template = client
        .create_template(
            &plan.template_name,
            &file.data_url,
            Some(&plan.template_description),
        )
        .await
        .map_err(|e| ToolError::WorkflowStep {
            step: 1,
            label: "create template",
            template_id: None,
            source: Box::new(ToolError::upstream("Failed to create template")(e)),
        })?;

    let fields = signature_fields(&plan.placement, plan.page_count);
    tracing::info!(
        template = %template.id,
        fields = fields.len(),
        "workflow step 2: attaching signature fields"
    );
    client
        .update_template_fields(&template.id, &fields)
        .await
        .map_err(|e| ToolError::WorkflowStep {
            step: 2,
            label: "attach signature fields",
            template_id: Some(template.id.clone()),
            source: Box::new(ToolError::upstream("Failed to update template fields")(e)),
        })?;

    tracing::info!(
        template = %template.id,
        signers = plan.signers.len(),
        "workflow step 3: creating document collection"
    );
    let request = SignatureRequest {
        document_name: plan.document_name,
        template_ids: vec![template.id.clone()],
        signers: plan.signers,
        sender_note: plan.sender_note,
        redirect_url: plan.redirect_url,
    };
    let collection = client
        .send_document_for_signature(&request)
        .await
        .map_err(|e| ToolError::WorkflowStep {
            step: 3,
            label: "create document collection",
            template_id: Some(template.id.clone()),
            source: Box::new(ToolError::upstream("Failed to send document for signature")(e)),
        })?;

    Ok(SendOutcome {
        file,
        template,
        fields,
        collection,
    })
}
