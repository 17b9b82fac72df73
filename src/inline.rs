use std::sync::Arc;

use serde::Serialize;

use crate::cse::{SearchClient, SearchParams};
use crate::data_models::SearchResult;
use crate::error::SearchError;
use crate::query_parser::{self, ParsedQuery};
use crate::texts;

pub const PHOTO_CACHE_TIME: u32 = 60;
pub const PAGE_DIRECTIVE: &str = "page";

/// An image result ready to be turned into a platform inline photo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhotoResult {
    pub id: String,
    pub photo_url: String,
    pub thumb_url: String,
    pub photo_width: u32,
    pub photo_height: u32,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InlineAnswer {
    Photos {
        results: Vec<PhotoResult>,
        cache_time: u32,
        #[serde(skip_serializing_if = "Option::is_none")]
        spelling_hint: Option<String>,
    },
    NotFound {
        id: String,
        title: String,
        description: String,
        message_text: String,
        cache_time: u32,
    },
}

impl InlineAnswer {
    pub fn not_found() -> Self {
        InlineAnswer::NotFound {
            id: nanoid::nanoid!(),
            title: texts::NOT_FOUND_TITLE.to_string(),
            description: texts::NOT_FOUND_MSG.to_string(),
            message_text: texts::NOT_FOUND_RESULT.to_string(),
            cache_time: 0,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, InlineAnswer::NotFound { .. })
    }
}

/// Page requested through `page:<n>` directives.
///
/// Values that are empty or not integers are ignored; among the valid ones
/// the last wins.
pub fn select_page(parsed: &ParsedQuery) -> Option<i64> {
    parsed
        .directives_named(PAGE_DIRECTIVE)
        .filter_map(|d| d.value.parse::<i64>().ok())
        .last()
}

/// Every item carrying an image block, in rank order.
pub fn photo_results(result: &SearchResult) -> Vec<PhotoResult> {
    result
        .items
        .iter()
        .filter_map(|item| {
            item.image.as_ref().map(|image| PhotoResult {
                id: nanoid::nanoid!(),
                photo_url: item.link.clone(),
                thumb_url: image.thumbnail_link.clone(),
                photo_width: image.width,
                photo_height: image.height,
                title: item.title.clone(),
            })
        })
        .collect()
}

/// Turns inline query text into an answer for the messaging front end.
pub struct InlineService {
    client: Arc<SearchClient>,
    safe_search: bool,
}

impl InlineService {
    pub fn new(client: Arc<SearchClient>) -> Self {
        Self {
            client,
            safe_search: false,
        }
    }

    pub fn with_safe_search(mut self, on: bool) -> Self {
        self.safe_search = on;
        self
    }

    pub fn client(&self) -> &SearchClient {
        &self.client
    }

    /// Only credential failures come back as `Err`; provider and network
    /// failures are logged and answered with the not-found placeholder.
    pub async fn answer(&self, text: &str) -> Result<InlineAnswer, SearchError> {
        let parsed = query_parser::parse(text);
        if parsed.clean_text.is_empty() {
            return Ok(InlineAnswer::not_found());
        }

        let mut params = SearchParams::new(parsed.clean_text.as_str())
            .safe_search(self.safe_search)
            .only_image(true);
        if let Some(page) = select_page(&parsed) {
            params = params.page(page);
        }

        let result = match self.client.search(&params).await {
            Ok(result) => result,
            Err(e) if e.is_fatal() => {
                log::error!("search provider rejected credentials: {e}");
                return Err(e);
            }
            Err(e) => {
                log::error!("error while searching for {:?}: {e}", parsed.clean_text);
                return Ok(InlineAnswer::not_found());
            }
        };

        let results = photo_results(&result);
        if results.is_empty() {
            return Ok(InlineAnswer::not_found());
        }
        Ok(InlineAnswer::Photos {
            results,
            cache_time: PHOTO_CACHE_TIME,
            spelling_hint: result.corrected_query().map(texts::spelling_message),
        })
    }
}
