use crate::errors::DbError;

/// Convert a `serde_json::Value` that must be an object into a `bson::Document`.
///
/// # Errors
/// Returns `InvalidDocument` when the value is not a JSON object or cannot be represented as BSON.
pub fn json_value_to_bson_document(val: &serde_json::Value) -> Result<bson::Document, DbError> {
    let obj = val
        .as_object()
        .ok_or_else(|| DbError::InvalidDocument("expected JSON object".into()))?;
    bson::Document::try_from(obj.clone()).map_err(|e| DbError::InvalidDocument(e.to_string()))
}

/// Parse a JSON string into a `bson::Document`. The JSON must be a top-level object.
///
/// # Errors
/// Returns `Json` on malformed input and `InvalidDocument` for non-object values.
pub fn parse_json_to_bson_document(json: &str) -> Result<bson::Document, DbError> {
    let val: serde_json::Value = serde_json::from_str(json)?;
    json_value_to_bson_document(&val)
}

/// Parse any JSON value into a `Bson` by wrapping it in a single-key document.
///
/// # Errors
/// Returns `Json` on malformed input.
pub fn parse_json_to_bson(json: &str) -> Result<bson::Bson, DbError> {
    let val: serde_json::Value = serde_json::from_str(json)?;
    let mut wrapper = serde_json::Map::new();
    wrapper.insert("v".to_string(), val);
    let doc = json_value_to_bson_document(&serde_json::Value::Object(wrapper))?;
    doc.get("v").cloned().ok_or_else(|| DbError::InvalidDocument("empty JSON value".into()))
}

/// Render a document as a single line of JSON.
///
/// # Errors
/// Returns `Json` if the document contains values serde_json cannot encode.
pub fn bson_document_to_json_line(doc: &bson::Document) -> Result<String, DbError> {
    Ok(serde_json::to_string(doc)?)
}
