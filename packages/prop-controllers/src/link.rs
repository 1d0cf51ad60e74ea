//! Resolve a `Link` prop value into anchor attributes.

use crate::descriptors::{LinkValue, ScrollBlock};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkTarget {
    Blank,
    SelfFrame,
}

impl LinkTarget {
    fn from_new_tab(open_in_new_tab: bool) -> Self {
        if open_in_new_tab {
            LinkTarget::Blank
        } else {
            LinkTarget::SelfFrame
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LinkTarget::Blank => "_blank",
            LinkTarget::SelfFrame => "_self",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedLink {
    pub href: Option<String>,
    pub target: Option<LinkTarget>,
    pub block: Option<ScrollBlock>,
    /// Navigate with the host router instead of a plain anchor
    pub client_navigation: bool,
}

/// Resolve a link. `page_pathname` maps a page id to its pathname and
/// `element_id` maps an element key to the DOM id it renders with.
pub fn resolve_link(
    link: &LinkValue,
    page_pathname: impl Fn(&str) -> Option<String>,
    element_id: impl Fn(&str) -> Option<String>,
) -> ResolvedLink {
    match link {
        LinkValue::OpenPage {
            page_id,
            open_in_new_tab,
        } => {
            let pathname = page_id.as_deref().and_then(&page_pathname);

            ResolvedLink {
                client_navigation: pathname.is_some(),
                href: pathname.map(|pathname| format!("/{}", pathname)),
                target: Some(LinkTarget::from_new_tab(*open_in_new_tab)),
                block: None,
            }
        }

        LinkValue::OpenUrl {
            url,
            open_in_new_tab,
        } => ResolvedLink {
            href: Some(url.clone()),
            target: Some(LinkTarget::from_new_tab(*open_in_new_tab)),
            block: None,
            client_navigation: true,
        },

        LinkValue::SendEmail { to, subject, body } => ResolvedLink {
            href: to.as_ref().map(|to| {
                format!(
                    "mailto:{}?subject={}&body={}",
                    to,
                    subject.as_deref().unwrap_or(""),
                    body.as_deref().unwrap_or("")
                )
            }),
            ..ResolvedLink::default()
        },

        LinkValue::CallPhone { phone_number } => ResolvedLink {
            href: Some(format!("tel:{}", phone_number)),
            ..ResolvedLink::default()
        },

        LinkValue::ScrollToElement {
            element_id_config,
            block,
        } => {
            let id = element_id_config
                .as_ref()
                .and_then(|config| element_id(&config.element_key))
                .unwrap_or_default();

            ResolvedLink {
                href: Some(format!("#{}", id)),
                block: *block,
                ..ResolvedLink::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptors::ElementIdConfig;

    fn no_pages(_: &str) -> Option<String> {
        None
    }

    fn no_ids(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_open_page_uses_pathname() {
        let link = LinkValue::OpenPage {
            page_id: Some("page-1".to_string()),
            open_in_new_tab: true,
        };

        let resolved = resolve_link(
            &link,
            |id| (id == "page-1").then(|| "pricing".to_string()),
            no_ids,
        );

        assert_eq!(resolved.href.as_deref(), Some("/pricing"));
        assert_eq!(resolved.target, Some(LinkTarget::Blank));
        assert!(resolved.client_navigation);
    }

    #[test]
    fn test_open_page_without_known_page_has_no_href() {
        let link = LinkValue::OpenPage {
            page_id: Some("missing".to_string()),
            open_in_new_tab: false,
        };

        let resolved = resolve_link(&link, no_pages, no_ids);

        assert_eq!(resolved.href, None);
        assert_eq!(resolved.target, Some(LinkTarget::SelfFrame));
        assert!(!resolved.client_navigation);
    }

    #[test]
    fn test_send_email() {
        let link = LinkValue::SendEmail {
            to: Some("hi@example.com".to_string()),
            subject: Some("Hello".to_string()),
            body: None,
        };

        let resolved = resolve_link(&link, no_pages, no_ids);

        assert_eq!(
            resolved.href.as_deref(),
            Some("mailto:hi@example.com?subject=Hello&body=")
        );
        assert_eq!(resolved.target, None);
    }

    #[test]
    fn test_call_phone() {
        let link = LinkValue::CallPhone {
            phone_number: "+15555550100".to_string(),
        };

        let resolved = resolve_link(&link, no_pages, no_ids);
        assert_eq!(resolved.href.as_deref(), Some("tel:+15555550100"));
    }

    #[test]
    fn test_scroll_to_element() {
        let link = LinkValue::ScrollToElement {
            element_id_config: Some(ElementIdConfig {
                element_key: "e1".to_string(),
                prop_name: "id".to_string(),
            }),
            block: Some(ScrollBlock::Center),
        };

        let resolved = resolve_link(&link, no_pages, |key| {
            (key == "e1").then(|| "features".to_string())
        });

        assert_eq!(resolved.href.as_deref(), Some("#features"));
        assert_eq!(resolved.block, Some(ScrollBlock::Center));

        let unresolved = resolve_link(&link, no_pages, no_ids);
        assert_eq!(unresolved.href.as_deref(), Some("#"));
    }
}
