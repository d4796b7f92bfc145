// ABOUTME: Handlebars helper functions for prompt rendering
// ABOUTME: Implements JSON pretty-printing and timestamp helpers

use chrono::Utc;
use handlebars::{
    Context, Handlebars, Helper, HelperResult, Output, RenderContext, RenderErrorReason,
};

/// JSON helper - pretty-prints any context value
pub fn json_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _rc: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let value = h
        .param(0)
        .ok_or(RenderErrorReason::ParamNotFoundForIndex("json", 0))?
        .value();

    let rendered = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
    out.write(&rendered)?;
    Ok(())
}

/// Timestamp helper - current UTC time, RFC 3339 unless a format is given
pub fn timestamp_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _rc: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let now = Utc::now();
    let formatted = match h.param(0).and_then(|v| v.value().as_str()) {
        Some(format) => now.format(format).to_string(),
        None => now.to_rfc3339(),
    };
    out.write(&formatted)?;
    Ok(())
}

pub fn register_helpers(handlebars: &mut Handlebars) {
    handlebars.register_helper("json", Box::new(json_helper));
    handlebars.register_helper("timestamp", Box::new(timestamp_helper));
}
