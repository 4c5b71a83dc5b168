//! Shared fixtures for ga4gh-client integration tests

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query},
    http::StatusCode,
    routing::get,
};
use ga4gh_client::{
    DEFAULT_SEQREPO_URL, SeqRepoRestDataProxy, Translator, TranslatorOptions,
};
use serde::Deserialize;
use serde_json::{Value, json};

/// Computed identifier of GRCh38 chromosome 19
pub const CHR19_DIGEST: &str = "ga4gh:SQ.IIB53T8CNeJJdUqzn9V_JnRtQadwWCbl";

/// Residues served for every sequence by the fake service
pub const FAKE_SEQUENCE: &str = "ACGTACGTNNACGT";

/// Base URL of the seqrepo service used by live tests
pub fn seqrepo_url() -> String {
    std::env::var("SEQREPO_REST_URL").unwrap_or_else(|_| DEFAULT_SEQREPO_URL.to_string())
}

/// Data proxy for the seqrepo service used by live tests
pub fn dataproxy() -> Arc<SeqRepoRestDataProxy> {
    Arc::new(SeqRepoRestDataProxy::new(seqrepo_url()).expect("seqrepo URL is valid"))
}

/// Translator options shared by every fixture translator
pub fn tlr_options() -> TranslatorOptions {
    TranslatorOptions {
        identify: true,
        translate_sequence_identifiers: true,
        default_assembly_name: "GRCh38".to_string(),
    }
}

/// Translator over [`dataproxy`]
pub fn tlr() -> Translator<SeqRepoRestDataProxy> {
    Translator::new(dataproxy(), tlr_options()).expect("fixture options are valid")
}

#[derive(Debug, Deserialize)]
struct Range {
    start: Option<usize>,
    end: Option<usize>,
}

fn chr19_aliases() -> Value {
    json!(["GRCh38:19", CHR19_DIGEST, "refseq:NC_000019.10"])
}

fn is_chr19(identifier: &str) -> bool {
    matches!(identifier, "GRCh38:19" | "refseq:NC_000019.10") || identifier == CHR19_DIGEST
}

async fn metadata(Path(identifier): Path<String>) -> Result<Json<Value>, StatusCode> {
    match identifier.as_str() {
        id if is_chr19(id) => Ok(Json(json!({
            "added": "2016-08-27T21:23:35Z",
            "aliases": chr19_aliases(),
            "alphabet": "ACGMNRT",
            "length": 58_617_616
        }))),
        "broken" => Ok(Json(json!({"aliases": "not-a-list"}))),
        "unstable" => Err(StatusCode::SERVICE_UNAVAILABLE),
        _ => Err(StatusCode::NOT_FOUND),
    }
}

async fn sequence(
    Path(identifier): Path<String>,
    Query(range): Query<Range>,
) -> Result<String, StatusCode> {
    if !is_chr19(&identifier) {
        return Err(StatusCode::NOT_FOUND);
    }
    let start = range.start.unwrap_or(0);
    let end = range.end.unwrap_or(FAKE_SEQUENCE.len());
    FAKE_SEQUENCE
        .get(start..end)
        .map(str::to_string)
        .ok_or(StatusCode::UNPROCESSABLE_ENTITY)
}

/// Route library tracing to the test output, filtered by `RUST_LOG`
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Start an in-process seqrepo service and return its base URL
pub async fn spawn_fake_seqrepo() -> String {
    init_tracing();
    let app = Router::new()
        .route("/seqrepo/1/metadata/{identifier}", get(metadata))
        .route("/seqrepo/1/sequence/{identifier}", get(sequence));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind fake seqrepo");
    let addr = listener.local_addr().expect("fake seqrepo address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("fake seqrepo serves");
    });
    format!("http://{addr}/seqrepo")
}

/// Translator over a fake seqrepo service
pub async fn fake_tlr() -> Translator<SeqRepoRestDataProxy> {
    let proxy = SeqRepoRestDataProxy::new(spawn_fake_seqrepo().await)
        .expect("fake seqrepo URL is valid");
    Translator::new(Arc::new(proxy), tlr_options()).expect("fixture options are valid")
}
