use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub type JsonMap = Map<String, Value>;

/// Image block attached to an item when the search was restricted to images.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ImageMeta {
    pub context_link: String,
    pub height: u32,
    pub width: u32,
    pub byte_size: u64,
    pub thumbnail_link: String,
    pub thumbnail_height: u32,
    pub thumbnail_width: u32,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResultItem {
    pub kind: String,
    pub title: String,
    pub html_title: String,
    pub link: String,
    pub display_link: String,
    pub snippet: String,
    pub html_snippet: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatted_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html_formatted_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagemap: Option<JsonMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageMeta>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Spelling {
    pub corrected_query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html_corrected_query: Option<String>,
}

/// One page of results from the provider, items in rank order.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub kind: String,
    pub url: JsonMap,
    pub queries: JsonMap,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<JsonMap>,
    pub search_information: JsonMap,
    // the provider omits `items` entirely when nothing matched
    #[serde(default, deserialize_with = "items_or_empty")]
    pub items: Vec<ResultItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spelling: Option<Spelling>,
}

fn items_or_empty<'de, D>(deserializer: D) -> Result<Vec<ResultItem>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let items: Option<Vec<ResultItem>> = Option::deserialize(deserializer)?;
    Ok(items.unwrap_or_default())
}

impl SearchResult {
    /// Builds a typed result from a provider payload.
    ///
    /// Image blocks are only kept when the search asked for images.
    pub fn from_value(value: Value, only_image: bool) -> Result<Self, serde_json::Error> {
        let mut result: SearchResult = serde_json::from_value(value)?;
        if !only_image {
            for item in &mut result.items {
                item.image = None;
            }
        }
        Ok(result)
    }

    pub fn to_value(&self) -> Value {
        // every field is a plain string, number or json map
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    pub fn corrected_query(&self) -> Option<&str> {
        self.spelling.as_ref().map(|s| s.corrected_query.as_str())
    }

    /// Provider's total result estimate, when it reports one.
    pub fn total_results(&self) -> Option<u64> {
        self.search_information
            .get("totalResults")
            .and_then(|v| match v {
                Value::String(s) => s.parse().ok(),
                Value::Number(n) => n.as_u64(),
                _ => None,
            })
    }
}
