//! Grounding chunk normalization.

use std::collections::HashSet;

use crate::api::{GenerateContentResponse, GroundingChunk};
use crate::core::message::Source;

/// Maps raw grounding chunks to citable sources.
///
/// Chunks without a web link are dropped, order of first appearance is kept,
/// and a link seen twice keeps the title of its first occurrence.
pub fn normalize_sources(chunks: &[GroundingChunk]) -> Vec<Source> {
    let mut seen = HashSet::new();
    let mut sources = Vec::new();

    for chunk in chunks {
        let Some(web) = chunk.web.as_ref() else {
            continue;
        };
        let Some(uri) = web
            .uri
            .as_deref()
            .map(str::trim)
            .filter(|uri| !uri.is_empty())
        else {
            continue;
        };
        if !seen.insert(uri) {
            continue;
        }
        sources.push(Source::new(uri, web.title.as_deref()));
    }

    sources
}

/// Sources cited by the first candidate of a response.
pub fn sources_from_response(response: &GenerateContentResponse) -> Vec<Source> {
    response
        .first_candidate()
        .and_then(|candidate| candidate.grounding_metadata.as_ref())
        .map(|metadata| normalize_sources(&metadata.grounding_chunks))
        .unwrap_or_default()
}
