use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

#[derive(Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RenderOptions {
    sanitize: Option<bool>,
    highlight: Option<bool>,
    intraline: Option<bool>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RenderResult {
    html: String,
    diagnostics: Vec<JsDiagnostic>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsDiagnostic {
    code: String,
    message: String,
    severity: String,
    range: JsRange,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsRange {
    start_line: usize,
    start_col: usize,
    end_line: usize,
    end_col: usize,
}

#[wasm_bindgen]
pub fn render_html(source: &str) -> Result<JsValue, JsValue> {
    render_html_with_options(source, JsValue::UNDEFINED)
}

#[wasm_bindgen]
pub fn render_html_with_options(source: &str, options: JsValue) -> Result<JsValue, JsValue> {
    let options = options_from_js(options)?;
    let result = render(source, &options);
    serde_wasm_bindgen::to_value(&result).map_err(|err| JsValue::from_str(&err.to_string()))
}

fn render(source: &str, options: &gfmark_core::RenderOptions) -> RenderResult {
    let rendered = gfmark_core::render_with_options(source, options);
    let diagnostics = rendered
        .diagnostics
        .into_iter()
        .map(|diag| JsDiagnostic {
            code: diag.code.to_string(),
            message: diag.message,
            severity: diag.severity.label().to_string(),
            range: JsRange {
                start_line: diag.range.start.line,
                start_col: diag.range.start.character,
                end_line: diag.range.end.line,
                end_col: diag.range.end.character,
            },
        })
        .collect();
    RenderResult {
        html: rendered.html,
        diagnostics,
    }
}

fn options_from_js(value: JsValue) -> Result<gfmark_core::RenderOptions, JsValue> {
    if value.is_null() || value.is_undefined() {
        return Ok(gfmark_core::RenderOptions::default());
    }
    let parsed: RenderOptions =
        serde_wasm_bindgen::from_value(value).map_err(|err| JsValue::from_str(&err.to_string()))?;
    Ok(merge_options(parsed))
}

fn merge_options(parsed: RenderOptions) -> gfmark_core::RenderOptions {
    let mut out = gfmark_core::RenderOptions::default();
    if let Some(sanitize) = parsed.sanitize {
        out.sanitize = sanitize;
    }
    if let Some(highlight) = parsed.highlight {
        out.highlight = highlight;
    }
    if let Some(intraline) = parsed.intraline {
        out.intraline = intraline;
    }
    out
}
