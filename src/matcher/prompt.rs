// src/matcher/prompt.rs
// =============================================================================
// Builds the prompt sent to the text-generation service for one label.
// =============================================================================

use crate::crawl::LinkMap;

// The prompt lists every (text, url) pair, names the label, and asks for
// the href alone so the answer can be used as-is.
pub fn build_prompt(links: &LinkMap, label: &str) -> String {
    format!(
        "Given the following webpage link texts and their hrefs:\n\
         \n\
         {listing}\n\
         Which one is the best match for '{label}'?\n\
         Return only the href.\n",
        listing = links.to_listing(),
        label = label,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    #[test]
    fn test_prompt_contains_links_and_label() {
        let mut links = LinkMap::new();
        links.insert("Contact", Url::parse("https://example.com/contact").unwrap());
        links.insert("Privacy", Url::parse("https://example.com/privacy").unwrap());

        let prompt = build_prompt(&links, "Privacy Policy");

        assert!(prompt.contains("\"Contact\" -> https://example.com/contact"));
        assert!(prompt.contains("\"Privacy\" -> https://example.com/privacy"));
        assert!(prompt.contains("best match for 'Privacy Policy'"));
        assert!(prompt.ends_with("Return only the href.\n"));

        let contact_at = prompt.find("Contact").unwrap();
        let privacy_at = prompt.find("\"Privacy\"").unwrap();
        assert!(contact_at < privacy_at);
    }

    #[test]
    fn test_prompt_with_no_links() {
        let prompt = build_prompt(&LinkMap::new(), "Contact Us");
        assert!(prompt.starts_with("Given the following webpage link texts"));
        assert!(prompt.contains("'Contact Us'"));
    }
}
