//! Multi-step tools against a mock upstream: the three-step send flow,
//! listing, searching and downloading collections.

mod common;

use std::sync::atomic::Ordering;

use serde_json::{json, Value};
use tempfile::TempDir;

use common::MockUpstream;
use wesign_mcp::tools::{ToolError, ToolRegistry};

const PAGE_WIDTH: f64 = 612.0;
const PAGE_HEIGHT: f64 = 792.0;

fn approx(value: &Value, expected: f64) -> bool {
    value.as_f64().is_some_and(|v| (v - expected).abs() < 1e-9)
}

async fn pdf_in(dir: &TempDir, name: &str) -> String {
    let path = dir.path().join(name);
    tokio::fs::write(&path, b"%PDF-1.4\n%test\n").await.unwrap();
    path.to_string_lossy().into_owned()
}

#[tokio::test]
async fn send_document_runs_three_steps_in_order() {
    let upstream = MockUpstream::start().await;
    let registry = ToolRegistry::new(upstream.logged_in_client().await);
    let dir = TempDir::new().unwrap();
    let file = pdf_in(&dir, "contract.pdf").await;

    let result = registry
        .call(
            "wesign_send_document_for_signing",
            json!({
                "filePath": file,
                "signerName": "Avi Cohen",
                "signerPhone": "0501234567",
                "signerEmail": "avi@example.com",
                "sendingMethod": 2,
                "pageCount": 2
            }),
        )
        .await
        .unwrap();

    assert_eq!(
        upstream.calls(),
        vec![
            "POST /templates",
            "PUT /templates/tpl-1",
            "POST /documentcollections"
        ]
    );

    let workflow = &result["workflow"];
    assert_eq!(workflow["step1_template"]["templateId"], "tpl-1");
    assert_eq!(workflow["step1_template"]["originalFile"], "contract.pdf");
    assert_eq!(workflow["step2_fields"]["fieldsAdded"], 2);
    assert_eq!(workflow["step3_sending"]["documentCollectionId"], "col-9");
    assert_eq!(workflow["step3_sending"]["signer"]["contact"], "avi@example.com");
    assert_eq!(workflow["step3_sending"]["signer"]["sendingMethod"], "Email");

    let requests = upstream.requests();

    let create = &requests[0].body;
    assert!(create["Name"].as_str().unwrap().starts_with("contract_"));
    assert!(create["Base64File"]
        .as_str()
        .unwrap()
        .starts_with("data:application/pdf;base64,"));

    let update = &requests[1].body;
    assert_eq!(update["Name"], "Updated Template");
    let fields = update["Fields"]["SignatureFields"].as_array().unwrap();
    assert_eq!(fields.len(), 2);
    assert_eq!(fields[1]["Page"], 2);
    assert_eq!(fields[1]["Mandatory"], true);
    assert!(approx(&fields[0]["X"], 100.0 / PAGE_WIDTH));
    assert!(approx(&fields[0]["Y"], 700.0 / PAGE_HEIGHT));
    assert!(approx(&fields[0]["Width"], 200.0 / PAGE_WIDTH));

    let send = &requests[2].body;
    assert_eq!(send["DocumentMode"], 1);
    assert_eq!(send["Templates"], json!(["tpl-1"]));
    let signer = &send["Signers"][0];
    assert_eq!(signer["ContactName"], "Avi Cohen");
    assert_eq!(signer["ContactMeans"], "avi@example.com");
    assert_eq!(signer["SendingMethod"], 2);
    assert_eq!(signer["ContactId"], "00000000-0000-0000-0000-000000000000");
    assert_eq!(signer["PhoneExtension"], "+972");
}

#[tokio::test]
async fn send_document_uses_phone_when_email_is_blank() {
    let upstream = MockUpstream::start().await;
    let registry = ToolRegistry::new(upstream.logged_in_client().await);
    let dir = TempDir::new().unwrap();
    let file = pdf_in(&dir, "lease.pdf").await;

    let result = registry
        .call(
            "wesign_send_document_for_signing",
            json!({
                "filePath": file,
                "signerName": "Avi Cohen",
                "signerPhone": "0501234567",
                "signerEmail": ""
            }),
        )
        .await
        .unwrap();

    let signer = &result["workflow"]["step3_sending"]["signer"];
    assert_eq!(signer["contact"], "0501234567");
    assert_eq!(signer["sendingMethod"], "SMS");
    assert_eq!(result["workflow"]["step2_fields"]["fieldsAdded"], 10);
}

#[tokio::test]
async fn failed_field_step_stops_the_flow_and_names_the_template() {
    let upstream = MockUpstream::start().await;
    upstream
        .behaviour
        .template_fields_fail
        .store(true, Ordering::SeqCst);
    let registry = ToolRegistry::new(upstream.logged_in_client().await);
    let dir = TempDir::new().unwrap();
    let file = pdf_in(&dir, "contract.pdf").await;

    let err = registry
        .call(
            "wesign_send_document_for_signing",
            json!({
                "filePath": file,
                "signerName": "Avi Cohen",
                "signerPhone": "0501234567"
            }),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, ToolError::WorkflowStep { step: 2, .. }));
    let message = err.to_string();
    assert!(message.starts_with("Step 2 of 3 (attach signature fields) failed"));
    assert!(message.contains("Template tpl-1"));
    assert_eq!(
        upstream.calls(),
        vec!["POST /templates", "PUT /templates/tpl-1"]
    );
}

#[tokio::test]
async fn missing_file_fails_before_any_upstream_call() {
    let upstream = MockUpstream::start().await;
    let registry = ToolRegistry::new(upstream.logged_in_client().await);

    let err = registry
        .call(
            "wesign_send_document_for_signing",
            json!({
                "filePath": "/definitely/not/here.pdf",
                "signerName": "Avi Cohen",
                "signerPhone": "0501234567"
            }),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, ToolError::FileNotFound { .. }));
    assert!(upstream.calls().is_empty());
}

#[tokio::test]
async fn multi_party_send_places_fields_from_a_phrase() {
    let upstream = MockUpstream::start().await;
    let registry = ToolRegistry::new(upstream.logged_in_client().await);
    let dir = TempDir::new().unwrap();
    let file = pdf_in(&dir, "board.pdf").await;

    let result = registry
        .call(
            "wesign_send_for_signature",
            json!({
                "filePath": file,
                "documentName": "Board resolution",
                "fieldPosition": "bottom right",
                "signers": [
                    { "contactName": "Dana Levi", "contactMeans": "dana@example.com", "sendingMethod": 2 },
                    { "contactName": "Avi Cohen", "contactMeans": "0501234567", "sendingMethod": 1, "linkExpirationInHours": 24 }
                ]
            }),
        )
        .await
        .unwrap();

    assert_eq!(result["documentCollectionId"], "col-9");

    let requests = upstream.requests();
    let field = &requests[1].body["Fields"]["SignatureFields"][0];
    assert!(approx(&field["X"], 362.0 / PAGE_WIDTH));
    assert!(approx(&field["Y"], 692.0 / PAGE_HEIGHT));

    let signers = requests[2].body["Signers"].as_array().unwrap().clone();
    assert_eq!(signers.len(), 2);
    assert_eq!(signers[0]["LinkExpirationInHours"], 168);
    assert_eq!(signers[1]["LinkExpirationInHours"], 24);
    assert_eq!(requests[2].body["DocumentName"], "Board resolution");
}

#[tokio::test]
async fn multi_party_send_requires_signers() {
    let upstream = MockUpstream::start().await;
    let registry = ToolRegistry::new(upstream.logged_in_client().await);

    let err = registry
        .call(
            "wesign_send_for_signature",
            json!({ "filePath": "/tmp/x.pdf", "documentName": "Empty", "signers": [] }),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, ToolError::InvalidArguments(_)));
    assert!(upstream.calls().is_empty());
}

#[tokio::test]
async fn list_documents_summarises_collections() {
    let upstream = MockUpstream::start().await;
    let registry = ToolRegistry::new(upstream.logged_in_client().await);

    let result = registry
        .call("wesign_list_documents", json!({}))
        .await
        .unwrap();

    let documents = result["documents"].as_array().unwrap();
    assert_eq!(documents.len(), 2);
    assert_eq!(documents[0]["statusText"], "Completed");
    assert_eq!(documents[0]["signersCount"], 2);
    assert_eq!(documents[0]["completedSigners"], 1);
    assert_eq!(documents[1]["statusText"], "Pending");
    assert_eq!(result["pagination"]["count"], 2);
}

#[tokio::test]
async fn search_filters_by_status_and_date() {
    let upstream = MockUpstream::start().await;
    let registry = ToolRegistry::new(upstream.logged_in_client().await);

    let pending = registry
        .call("wesign_search_documents", json!({ "status": 1 }))
        .await
        .unwrap();
    assert_eq!(pending["count"], 1);
    assert_eq!(pending["documents"][0]["id"], "col-2");
    assert_eq!(pending["filters"]["query"], "none");

    let march = registry
        .call(
            "wesign_search_documents",
            json!({ "fromDate": "2024-03-01", "toDate": "2024-03-31" }),
        )
        .await
        .unwrap();
    assert_eq!(march["count"], 1);
    assert_eq!(march["documents"][0]["name"], "NDA");

    let by_signer = registry
        .call("wesign_search_documents", json!({ "signerName": "cohen" }))
        .await
        .unwrap();
    assert_eq!(by_signer["count"], 1);

    let err = registry
        .call("wesign_search_documents", json!({ "fromDate": "March" }))
        .await
        .unwrap_err();
    assert!(matches!(err, ToolError::InvalidArguments(_)));
}

#[tokio::test]
async fn download_writes_the_decoded_file() {
    let upstream = MockUpstream::start().await;
    let registry = ToolRegistry::new(upstream.logged_in_client().await);
    let dir = TempDir::new().unwrap();
    let target = dir.path().join("out").join("nda.pdf");

    let result = registry
        .call(
            "wesign_download_document",
            json!({
                "documentCollectionId": "col-1",
                "documentId": "doc-1",
                "savePath": target.to_string_lossy()
            }),
        )
        .await
        .unwrap();

    assert_eq!(result["fileName"], "nda.pdf");
    assert_eq!(result["fileSize"], 8);
    assert_eq!(tokio::fs::read(&target).await.unwrap(), b"%PDF-1.4");
    assert_eq!(
        upstream.calls(),
        vec!["GET /documentcollections/col-1/documents/doc-1/download"]
    );
}

#[tokio::test]
async fn download_without_path_returns_the_payload() {
    let upstream = MockUpstream::start().await;
    let registry = ToolRegistry::new(upstream.logged_in_client().await);

    let result = registry
        .call(
            "wesign_download_document",
            json!({ "documentCollectionId": "col-1", "documentId": "doc-1" }),
        )
        .await
        .unwrap();

    assert_eq!(
        result["base64File"],
        "data:application/pdf;base64,JVBERi0xLjQ="
    );
}
