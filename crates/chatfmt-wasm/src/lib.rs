use std::collections::HashSet;

use chatfmt_core::{FormatOptions, Formatter};
use serde::Deserialize;
use wasm_bindgen::prelude::*;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FormatRequest {
    search_term: Option<String>,
    mention_highlight: Option<bool>,
    singleline: Option<bool>,
    markdown: Option<bool>,
    #[serde(default)]
    users: Vec<String>,
    #[serde(default)]
    mention_keys: Vec<String>,
}

impl FormatRequest {
    fn options(&self) -> FormatOptions {
        let mut out = FormatOptions {
            search_term: self.search_term.clone(),
            ..FormatOptions::default()
        };
        if let Some(mention_highlight) = self.mention_highlight {
            out.mention_highlight = mention_highlight;
        }
        if let Some(singleline) = self.singleline {
            out.singleline = singleline;
        }
        if let Some(markdown) = self.markdown {
            out.markdown = markdown;
        }
        out
    }

    fn directory(&self) -> HashSet<String> {
        self.users
            .iter()
            .map(|user| user.trim_start_matches('@').to_lowercase())
            .collect()
    }
}

fn format_request(text: &str, request: &FormatRequest) -> Result<String, String> {
    let users = request.directory();
    let formatter = Formatter::builder()
        .users(&users)
        .mention_keys(&request.mention_keys)
        .build()
        .map_err(|err| err.to_string())?;
    Ok(formatter.format_text(text, &request.options()))
}

/// Formats one chat message. `options` is `{ searchTerm, mentionHighlight, singleline,
/// markdown, users, mentionKeys }`; every field is optional.
#[wasm_bindgen(js_name = formatText)]
pub fn format_text(text: &str, options: JsValue) -> Result<String, JsValue> {
    let request = request_from_js(options)?;
    format_request(text, &request).map_err(|err| JsValue::from_str(&err))
}

#[wasm_bindgen(js_name = sanitizeHtml)]
pub fn sanitize_html(text: &str) -> String {
    chatfmt_core::sanitize_html(text)
}

/// Search term for a click on a formatted mention or hashtag, from the element's
/// `data-mention` and `data-hashtag` attributes.
#[wasm_bindgen(js_name = clickSearchTerm)]
pub fn click_search_term(mention: Option<String>, hashtag: Option<String>) -> Option<String> {
    let mut attributes = std::collections::BTreeMap::new();
    if let Some(mention) = mention {
        attributes.insert(chatfmt_core::ATTR_MENTION.to_string(), mention);
    }
    if let Some(hashtag) = hashtag {
        attributes.insert(chatfmt_core::ATTR_HASHTAG.to_string(), hashtag);
    }
    chatfmt_core::click_search_term(&attributes)
}

fn request_from_js(value: JsValue) -> Result<FormatRequest, JsValue> {
    if value.is_null() || value.is_undefined() {
        return Ok(FormatRequest::default());
    }
    serde_wasm_bindgen::from_value(value).map_err(|err| JsValue::from_str(&err.to_string()))
}
