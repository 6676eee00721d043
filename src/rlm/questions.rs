//! Fixed RLM screening question catalog.
//!
//! Callers answer questions by key (`"1"`..`"5"`); the RLM API expects each
//! answer together with its numeric id and the full question text.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use tracing::debug;

use super::types::RlmQuestion;

/// A screening question known to the RLM API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogQuestion {
    /// Numeric id expected upstream.
    pub id: u32,
    /// Question text expected upstream.
    pub description: &'static str,
}

static CATALOG: Lazy<BTreeMap<&'static str, CatalogQuestion>> = Lazy::new(|| {
    BTreeMap::from([
        (
            "1",
            CatalogQuestion {
                id: 1,
                description: "Is this delivery being made within a gated community, a military installation, or any location with controlled or limited access?",
            },
        ),
        (
            "2",
            CatalogQuestion {
                id: 2,
                description: "If your order is set for Deluxe, White Glove, or Room of Choice service level, will the delivery team be going up or down MORE THAN 2 flights of stairs?  If you have any other service level please respond No as stairs will not apply.",
            },
        ),
        (
            "3",
            CatalogQuestion {
                id: 3,
                description: "Do you reside in a building or complex that requires a Certificate of Insurance for deliveries?",
            },
        ),
        (
            "4",
            CatalogQuestion {
                id: 4,
                description: "Are there any obstacles or tight turns that would require more than a 2-man team to complete your delivery?.",
            },
        ),
        (
            "5",
            CatalogQuestion {
                id: 5,
                description: "Does your order require an exchange of merchandise where we would be both delivering and picking up product from your home?",
            },
        ),
    ])
});

/// Look up a question by its caller-facing key.
pub fn lookup(key: &str) -> Option<CatalogQuestion> {
    CATALOG.get(key).copied()
}

/// Convert caller answers into the RLM question list.
///
/// Unknown keys are dropped. Answers are lowercased.
pub fn transform(answers: &BTreeMap<String, String>) -> Vec<RlmQuestion> {
    answers
        .iter()
        .filter_map(|(key, response)| match lookup(key) {
            Some(question) => Some(RlmQuestion {
                question_description: question.description.to_string(),
                question_id: question.id,
                question_response: response.to_lowercase(),
            }),
            None => {
                debug!(key = %key, "Dropping answer for unknown question");
                None
            }
        })
        .collect()
}
