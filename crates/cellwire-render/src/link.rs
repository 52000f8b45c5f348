#![forbid(unsafe_code)]

//! OSC 8 hyperlinks.

/// A hyperlink attached to a cell. Both fields empty means "no link".
///
/// The `id` is the OSC 8 `id=` parameter: terminals use it to treat
/// separately-emitted fragments (a link broken across styled runs or lines)
/// as one logical link for hover and click purposes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Link {
    pub url: String,
    pub id: String,
}

impl Link {
    /// The absent link.
    pub const NONE: Link = Link {
        url: String::new(),
        id: String::new(),
    };

    pub fn new(url: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            id: id.into(),
        }
    }

    #[inline]
    pub fn is_none(&self) -> bool {
        self.url.is_empty() && self.id.is_empty()
    }

    /// Build a link from the two OSC 8 payload fields: the colon-separated
    /// `key=value` parameter list and the URI. An empty URI closes the link.
    pub fn from_osc8(params: &str, url: &str) -> Self {
        if url.is_empty() {
            return Link::NONE;
        }
        Self {
            url: url.to_string(),
            id: id_param(params).unwrap_or("").to_string(),
        }
    }
}

/// Extract the `id=` value from an OSC 8 parameter list.
fn id_param(params: &str) -> Option<&str> {
    params
        .split(':')
        .find_map(|kv| kv.strip_prefix("id="))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_is_none() {
        assert!(Link::NONE.is_none());
        assert!(Link::default().is_none());
        assert!(!Link::new("https://example.com", "").is_none());
    }

    #[test]
    fn osc8_id_extraction() {
        let link = Link::from_osc8("id=xyz:foo=1", "https://example.com");
        assert_eq!(link.id, "xyz");
        assert_eq!(link.url, "https://example.com");

        let link = Link::from_osc8("foo=1", "https://example.com");
        assert_eq!(link.id, "");
    }

    #[test]
    fn empty_url_closes() {
        assert!(Link::from_osc8("id=xyz", "").is_none());
    }
}
