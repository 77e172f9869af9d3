//! Share payloads for narratives.
//!
//! Building the payload is all the core does. Handing it to a native share
//! sheet or the clipboard is up to the presentation layer.

use crate::model::{Exhibition, Narrative};

/// What a share action hands to the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharePayload {
    pub title: String,
    pub text: String,
    pub url: String,
}

impl SharePayload {
    /// Payload for one narrative. `base_url` is the page origin plus path,
    /// e.g. `https://example.org/gallery`; any query string is dropped.
    pub fn for_narrative(base_url: &str, exhibition: &Exhibition, narrative: &Narrative) -> Self {
        let base = base_url.split(['?', '#']).next().unwrap_or(base_url);
        Self {
            title: format!("{}: {}", exhibition.context.name, narrative.title),
            text: format!(
                "اكتشف سردية \"{}\" في معرض {}: ما لا يرى في الزيت.",
                narrative.title, exhibition.context.name
            ),
            url: format!("{base}?item={}", narrative.id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::default_exhibition;

    #[test]
    fn test_share_url_points_at_item() {
        let ex = default_exhibition();
        let item = &ex.items[2];
        let payload = SharePayload::for_narrative("https://zaitouna.tn/app?item=9#x", &ex, item);

        assert_eq!(payload.url, "https://zaitouna.tn/app?item=3");
        assert!(payload.title.contains(&item.title));
        assert!(payload.text.contains(&item.title));
    }
}
