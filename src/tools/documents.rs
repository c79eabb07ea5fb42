//! Document tools: upload, collections, download, search and merge.

use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{define, files, labels, parse_args, ToolError};
use crate::mcp::protocol::ToolDefinition;
use crate::wesign::models::{DocumentCollection, Signer};
use crate::wesign::WeSignClient;

const DEFAULT_LIST_LIMIT: u32 = 50;
const DEFAULT_SEARCH_LIMIT: u32 = 100;

/// Catalog entries for the document tools.
#[must_use]
pub fn definitions() -> Vec<ToolDefinition> {
    vec![
        define(
            "wesign_upload_document",
            "Upload a document to WeSign for signing workflow. Supports PDF, Word, Excel, and image formats.",
            json!({
                "type": "object",
                "properties": {
                    "filePath": { "type": "string", "description": "Path to the document file to upload" },
                    "name": {
                        "type": "string",
                        "description": "Optional custom name for the document. If not provided, uses the filename"
                    }
                },
                "required": ["filePath"]
            }),
        ),
        define(
            "wesign_create_document_collection",
            "Create a new document collection with one or more documents",
            json!({
                "type": "object",
                "properties": {
                    "name": { "type": "string", "description": "Name for the document collection" },
                    "filePaths": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Array of file paths to include in the collection"
                    }
                },
                "required": ["name", "filePaths"]
            }),
        ),
        define(
            "wesign_get_document_info",
            "Get detailed information about a document or document collection",
            json!({
                "type": "object",
                "properties": {
                    "documentCollectionId": { "type": "string", "description": "ID of the document collection" }
                },
                "required": ["documentCollectionId"]
            }),
        ),
        define(
            "wesign_list_documents",
            "List user's documents with optional filtering",
            json!({
                "type": "object",
                "properties": {
                    "offset": { "type": "number", "minimum": 0, "description": "Number of records to skip (default: 0)" },
                    "limit": { "type": "number", "minimum": 1, "description": "Maximum number of records to return (default: 50)" }
                }
            }),
        ),
        define(
            "wesign_download_document",
            "Download a signed or unsigned document",
            json!({
                "type": "object",
                "properties": {
                    "documentCollectionId": { "type": "string", "description": "ID of the document collection" },
                    "documentId": { "type": "string", "description": "ID of the specific document to download" },
                    "savePath": {
                        "type": "string",
                        "description": "Optional path to save the downloaded file. If not provided, returns base64 content"
                    }
                },
                "required": ["documentCollectionId", "documentId"]
            }),
        ),
        define(
            "wesign_search_documents",
            "Search documents by status, date, signer name/email, or keywords in document name",
            json!({
                "type": "object",
                "properties": {
                    "query": { "type": "string", "description": "Searches document names, signer names and emails" },
                    "status": {
                        "type": "number",
                        "description": "Filter by document status: 0=Draft, 1=Pending, 2=Completed, 3=Cancelled, 4=Expired"
                    },
                    "fromDate": { "type": "string", "description": "Created on or after this date (YYYY-MM-DD)" },
                    "toDate": { "type": "string", "description": "Created on or before this date (YYYY-MM-DD)" },
                    "signerEmail": { "type": "string", "description": "Filter by signer email address" },
                    "signerName": { "type": "string", "description": "Filter by signer name (partial match)" },
                    "limit": { "type": "number", "minimum": 1, "description": "Maximum number of documents to scan (default: 100)" }
                }
            }),
        ),
        define(
            "wesign_merge_documents",
            "Combine multiple existing documents into a single document collection",
            json!({
                "type": "object",
                "properties": {
                    "name": { "type": "string", "description": "Name for the merged document collection" },
                    "documentCollectionIds": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Array of document collection IDs to merge (at least 2)"
                    }
                },
                "required": ["name", "documentCollectionIds"]
            }),
        ),
    ]
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadArgs {
    file_path: String,
    name: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CollectionArgs {
    name: String,
    file_paths: Vec<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListArgs {
    #[serde(default)]
    offset: u32,
    limit: Option<u32>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DownloadArgs {
    document_collection_id: String,
    document_id: String,
    save_path: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MergeArgs {
    name: String,
    document_collection_ids: Vec<String>,
}

/// Client-side search criteria. Every present criterion must match.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchFilter {
    /// Free text over document name, signer names and emails.
    pub query: Option<String>,
    /// Exact collection status code.
    pub status: Option<i64>,
    /// Inclusive lower bound on the creation date.
    pub from_date: Option<String>,
    /// Inclusive upper bound on the creation date.
    pub to_date: Option<String>,
    /// Substring of any signer's email.
    pub signer_email: Option<String>,
    /// Substring of any signer's full name.
    pub signer_name: Option<String>,
    /// How many collections to fetch before filtering.
    pub limit: Option<u32>,
}

impl SearchFilter {
    /// Keeps the collections matching every criterion.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::InvalidArguments`] when a date bound is not
    /// `YYYY-MM-DD`.
    pub fn apply(
        &self,
        collections: Vec<DocumentCollection>,
    ) -> Result<Vec<DocumentCollection>, ToolError> {
        let from = self.from_date.as_deref().map(parse_date).transpose()?;
        let to = self.to_date.as_deref().map(parse_date).transpose()?;
        let query = lowercase(self.query.as_deref());
        let signer_email = lowercase(self.signer_email.as_deref());
        let signer_name = lowercase(self.signer_name.as_deref());

        Ok(collections
            .into_iter()
            .filter(|c| self.status.map_or(true, |s| c.status == s))
            .filter(|c| {
                if from.is_none() && to.is_none() {
                    return true;
                }
                creation_date(&c.creation_time).is_some_and(|date| {
                    from.map_or(true, |f| date >= f) && to.map_or(true, |t| date <= t)
                })
            })
            .filter(|c| {
                signer_email.as_deref().map_or(true, |needle| {
                    c.signers.iter().any(|s| email_contains(s, needle))
                })
            })
            .filter(|c| {
                signer_name.as_deref().map_or(true, |needle| {
                    c.signers.iter().any(|s| name_contains(s, needle))
                })
            })
            .filter(|c| {
                query.as_deref().map_or(true, |needle| {
                    c.name.to_lowercase().contains(needle)
                        || c.signers
                            .iter()
                            .any(|s| email_contains(s, needle) || name_contains(s, needle))
                })
            })
            .collect())
    }
}

fn lowercase(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_lowercase)
}

fn email_contains(signer: &Signer, needle: &str) -> bool {
    signer
        .email
        .as_deref()
        .is_some_and(|e| e.to_lowercase().contains(needle))
}

fn name_contains(signer: &Signer, needle: &str) -> bool {
    signer.full_name().to_lowercase().contains(needle)
}

fn parse_date(value: &str) -> Result<NaiveDate, ToolError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| ToolError::invalid(format!("invalid date '{value}', expected YYYY-MM-DD")))
}

/// Calendar date of an upstream timestamp such as `2024-03-01T10:15:00Z`.
fn creation_date(timestamp: &str) -> Option<NaiveDate> {
    timestamp
        .get(..10)
        .and_then(|day| NaiveDate::parse_from_str(day, "%Y-%m-%d").ok())
}

/// Executes a document tool.
///
/// # Errors
///
/// Returns local file errors or upstream errors.
pub async fn call(client: &WeSignClient, name: &str, arguments: &Value) -> Result<Value, ToolError> {
    match name {
        "wesign_upload_document" => upload(client, parse_args(arguments)?).await,
        "wesign_create_document_collection" => create_collection(client, parse_args(arguments)?).await,
        "wesign_get_document_info" => {
            let id = super::required_str(arguments, "documentCollectionId")?;
            document_info(client, id).await
        }
        "wesign_list_documents" => list(client, parse_args(arguments)?).await,
        "wesign_download_document" => download(client, parse_args(arguments)?).await,
        "wesign_search_documents" => search(client, parse_args(arguments)?).await,
        "wesign_merge_documents" => merge(client, parse_args(arguments)?).await,
        _ => Err(ToolError::UnknownTool(name.to_string())),
    }
}

async fn upload(client: &WeSignClient, args: UploadArgs) -> Result<Value, ToolError> {
    let file = files::read_as_data_url(&args.file_path).await?;
    let name = args.name.unwrap_or_else(|| file.file_name.clone());

    let collection = client
        .create_document_collection(&name, std::slice::from_ref(&file.data_url))
        .await
        .map_err(ToolError::upstream("Failed to upload document"))?;

    tracing::info!(collection = %collection.id, bytes = file.size, "document uploaded");

    Ok(json!({
        "success": true,
        "message": format!("Document \"{name}\" uploaded successfully"),
        "documentCollectionId": collection.id,
        "documentCollection": collection,
        "fileName": name,
        "fileSize": file.size,
        "mimeType": file.mime,
    }))
}

async fn create_collection(client: &WeSignClient, args: CollectionArgs) -> Result<Value, ToolError> {
    let mut payloads = Vec::with_capacity(args.file_paths.len());
    let mut infos = Vec::with_capacity(args.file_paths.len());
    for path in &args.file_paths {
        let file = files::read_as_data_url(path).await?;
        infos.push(json!({ "name": file.file_name, "size": file.size, "type": file.mime }));
        payloads.push(file.data_url);
    }

    let collection = client
        .create_document_collection(&args.name, &payloads)
        .await
        .map_err(ToolError::upstream("Failed to create document collection"))?;

    Ok(json!({
        "success": true,
        "message": format!(
            "Document collection \"{}\" created with {} documents",
            args.name,
            payloads.len()
        ),
        "documentCollectionId": collection.id,
        "documentCollection": collection,
        "files": infos,
    }))
}

async fn document_info(client: &WeSignClient, id: &str) -> Result<Value, ToolError> {
    let collection = client
        .document_collection(id)
        .await
        .map_err(ToolError::upstream("Failed to get document info"))?;

    Ok(json!({
        "success": true,
        "documentCollection": {
            "id": collection.id,
            "name": collection.name,
            "status": collection.status,
            "statusText": labels::document_status(collection.status),
            "creationTime": collection.creation_time,
            "documentsCount": collection.documents.len(),
            "documents": collection.documents.iter().map(|d| json!({
                "id": d.id,
                "name": d.name,
                "pagesCount": d.pages_count,
                "status": d.status,
            })).collect::<Vec<_>>(),
            "signersCount": collection.signers.len(),
            "signers": collection.signers.iter().map(|s| json!({
                "id": s.id,
                "name": s.full_name(),
                "email": s.email,
                "phone": s.phone,
                "status": s.status,
                "statusText": labels::signer_status(s.status),
                "signingOrder": s.signing_order,
            })).collect::<Vec<_>>(),
        }
    }))
}

fn completed_signers(collection: &DocumentCollection) -> usize {
    collection.signers.iter().filter(|s| s.status == 2).count()
}

async fn list(client: &WeSignClient, args: ListArgs) -> Result<Value, ToolError> {
    let limit = args.limit.unwrap_or(DEFAULT_LIST_LIMIT);
    let collections = client
        .document_collections(args.offset, limit)
        .await
        .map_err(ToolError::upstream("Failed to list documents"))?;

    let documents: Vec<Value> = collections
        .iter()
        .map(|c| {
            json!({
                "id": c.id,
                "name": c.name,
                "status": c.status,
                "statusText": labels::document_status(c.status),
                "creationTime": c.creation_time,
                "documentsCount": c.documents.len(),
                "signersCount": c.signers.len(),
                "completedSigners": completed_signers(c),
            })
        })
        .collect();

    Ok(json!({
        "success": true,
        "documents": documents,
        "pagination": { "offset": args.offset, "limit": limit, "count": collections.len() },
    }))
}

async fn download(client: &WeSignClient, args: DownloadArgs) -> Result<Value, ToolError> {
    let file = client
        .download_document(&args.document_collection_id, &args.document_id)
        .await
        .map_err(ToolError::upstream("Failed to download document"))?;

    match args.save_path {
        Some(path) => {
            let size = files::write_base64(&path, &file.base64_file).await?;
            Ok(json!({
                "success": true,
                "message": format!("Document downloaded and saved to {path}"),
                "filePath": path,
                "fileName": file.file_name,
                "fileSize": size,
            }))
        }
        None => Ok(json!({
            "success": true,
            "message": "Document downloaded successfully",
            "fileName": file.file_name,
            "contentLength": file.base64_file.len(),
            "base64File": file.base64_file,
        })),
    }
}

async fn search(client: &WeSignClient, filter: SearchFilter) -> Result<Value, ToolError> {
    let collections = client
        .document_collections(0, filter.limit.unwrap_or(DEFAULT_SEARCH_LIMIT))
        .await
        .map_err(ToolError::upstream("Failed to search documents"))?;
    let matches = filter.apply(collections)?;

    let or_none = |v: &Option<String>| v.clone().unwrap_or_else(|| "none".to_string());
    let documents: Vec<Value> = matches
        .iter()
        .map(|c| {
            json!({
                "id": c.id,
                "name": c.name,
                "status": c.status,
                "statusText": labels::document_status(c.status),
                "creationTime": c.creation_time,
                "documentsCount": c.documents.len(),
                "signersCount": c.signers.len(),
                "completedSigners": completed_signers(c),
                "signers": c.signers.iter().map(|s| json!({
                    "name": s.full_name(),
                    "email": s.email,
                    "phone": s.phone,
                    "status": s.status,
                })).collect::<Vec<_>>(),
            })
        })
        .collect();

    Ok(json!({
        "success": true,
        "message": format!("Found {} document(s) matching criteria", matches.len()),
        "count": matches.len(),
        "filters": {
            "query": or_none(&filter.query),
            "status": filter.status.map_or_else(|| json!("any"), |s| json!(s)),
            "fromDate": or_none(&filter.from_date),
            "toDate": or_none(&filter.to_date),
            "signerEmail": or_none(&filter.signer_email),
            "signerName": or_none(&filter.signer_name),
        },
        "documents": documents,
    }))
}

async fn merge(client: &WeSignClient, args: MergeArgs) -> Result<Value, ToolError> {
    if args.document_collection_ids.len() < 2 {
        return Err(ToolError::invalid(
            "At least 2 document collections are required for merging",
        ));
    }
    let context = "Failed to merge documents";

    let mut payloads = Vec::new();
    let mut details = Vec::new();
    for collection_id in &args.document_collection_ids {
        let collection = client
            .document_collection(collection_id)
            .await
            .map_err(ToolError::upstream(context))?;
        if collection.documents.is_empty() {
            return Err(ToolError::invalid(format!(
                "Document collection {collection_id} has no documents"
            )));
        }

        for document in &collection.documents {
            let file = client
                .download_document(collection_id, &document.id)
                .await
                .map_err(ToolError::upstream(context))?;
            payloads.push(file.base64_file);
            details.push(json!({
                "sourceCollection": collection.name,
                "sourceCollectionId": collection_id,
                "documentName": document.name,
                "documentId": document.id,
                "pagesCount": document.pages_count,
            }));
        }
    }

    let merged = client
        .create_document_collection(&args.name, &payloads)
        .await
        .map_err(ToolError::upstream(context))?;

    Ok(json!({
        "success": true,
        "message": format!(
            "Merged {} document collections into \"{}\"",
            args.document_collection_ids.len(),
            args.name
        ),
        "mergedCollectionId": merged.id,
        "mergedCollectionName": merged.name,
        "totalDocuments": payloads.len(),
        "sourceCollections": args.document_collection_ids.len(),
        "documentsDetails": details,
    }))
}
