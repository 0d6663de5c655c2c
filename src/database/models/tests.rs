use super::*;
use serde_json::json;

#[test]
fn new_chunk_record_serializes_store_columns() {
    let source_id = Uuid::new_v4();
    let record = NewChunkRecord {
        source_id,
        chunk_index: 3,
        content: "Some text".to_string(),
        embedding: vec![0.5, -0.25],
        token_count: Some(3),
        metadata: json!({}),
    };

    let value = serde_json::to_value(&record).expect("record should serialize");
    assert_eq!(
        value,
        json!({
            "source_id": source_id.to_string(),
            "chunk_index": 3,
            "content": "Some text",
            "embedding": [0.5, -0.25],
            "token_count": 3,
            "metadata": {}
        })
    );
}

#[test]
fn chunk_record_ignores_embedding_column() {
    let row = json!({
        "id": "6f1c1c9e-1f1b-4c8e-9f55-2b7f0c1d2e3f",
        "source_id": "0b9e0c8a-6a39-4b8e-8d7e-7c2a9f4e5d61",
        "chunk_index": 0,
        "content": "Hello",
        "embedding": "[0.1,0.2]",
        "token_count": null,
        "metadata": {},
        "created_at": "2025-03-01T12:30:00.123456+00:00"
    });

    let record: ChunkRecord = serde_json::from_value(row).expect("row should parse");
    assert_eq!(record.chunk_index, 0);
    assert_eq!(record.token_count, None);
    assert!(record.created_at.is_some());
}

#[test]
fn chunk_match_optional_columns_default() {
    let row = json!({
        "id": "6f1c1c9e-1f1b-4c8e-9f55-2b7f0c1d2e3f",
        "source_id": "0b9e0c8a-6a39-4b8e-8d7e-7c2a9f4e5d61",
        "content": "Hello",
        "similarity": 0.87
    });

    let matched: ChunkMatch = serde_json::from_value(row).expect("row should parse");
    assert_eq!(matched.chunk_index, None);
    assert!(matched.metadata.is_null());
    assert!((matched.similarity - 0.87).abs() < f64::EPSILON);
}

#[test]
fn source_status_parsing() {
    let parse = |s: &str| -> SourceStatus {
        serde_json::from_value(json!(s)).expect("status should parse")
    };

    assert_eq!(parse("ready"), SourceStatus::Ready);
    assert_eq!(parse("processing"), SourceStatus::Processing);
    assert_eq!(parse("archived"), SourceStatus::Unknown);
    assert_eq!(SourceStatus::Ready.to_string(), "ready");
}

#[test]
fn source_text_content_and_summary() {
    let text_source: Source = serde_json::from_value(json!({
        "id": "0b9e0c8a-6a39-4b8e-8d7e-7c2a9f4e5d61",
        "name": "Notes",
        "type": "text",
        "status": "ready",
        "metadata": {"content": "Pasted notes"},
        "source_guide": {"summary": "   "}
    }))
    .expect("source should parse");

    assert_eq!(text_source.text_content(), Some("Pasted notes"));
    assert_eq!(text_source.summary(), None);

    let pdf_source: Source = serde_json::from_value(json!({
        "id": "6f1c1c9e-1f1b-4c8e-9f55-2b7f0c1d2e3f",
        "name": "Paper.pdf",
        "type": "pdf",
        "metadata": {"content": "ignored for non-text sources"},
        "source_guide": {"summary": "A paper about things."}
    }))
    .expect("source should parse");

    assert_eq!(pdf_source.status, SourceStatus::Pending);
    assert_eq!(pdf_source.text_content(), None);
    assert_eq!(pdf_source.summary(), Some("A paper about things."));
}
