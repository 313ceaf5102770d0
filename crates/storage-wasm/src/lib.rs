use serde::Serialize;
use storage_core::curve::{check_point_count, AhvRow};
use storage_core::{resolve_histogram, AhvTable, HistogramPoint, InundationRequest};
use wasm_bindgen::prelude::*;

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

fn parse_histogram(histogram_json: &str) -> Result<Vec<HistogramPoint>, String> {
    serde_json::from_str(histogram_json).map_err(|e| format!("Invalid histogram: {e}"))
}

/// AHV rows for a histogram given as `[{"elevation", "area"}, ...]`.
pub fn curve_rows(histogram_json: &str) -> Result<Vec<AhvRow>, String> {
    let points = parse_histogram(histogram_json)?;
    let table = AhvTable::build(&points).map_err(|e| e.to_string())?;
    check_point_count(&table).map_err(|e| e.to_string())?;
    Ok(table.rows().collect())
}

/// Threshold and attributes for a histogram plus a request JSON
/// (`{"parameter", "value", "vertical_spacing"}`).
pub fn resolve_json(histogram_json: &str, request_json: &str) -> Result<storage_core::ThresholdExport, String> {
    let points = parse_histogram(histogram_json)?;
    let request = InundationRequest::from_json_str(request_json).map_err(|e| format!("Invalid request: {e}"))?;
    resolve_histogram(&points, &request).map_err(|e| e.to_string())
}

#[wasm_bindgen]
pub fn curve(histogram_json: &str) -> Result<JsValue, JsValue> {
    let rows = curve_rows(histogram_json).map_err(|e| JsValue::from_str(&e))?;
    to_js(&rows)
}

#[wasm_bindgen]
pub fn resolve(histogram_json: &str, request_json: &str) -> Result<JsValue, JsValue> {
    let export = resolve_json(histogram_json, request_json).map_err(|e| JsValue::from_str(&e))?;
    to_js(&export)
}
