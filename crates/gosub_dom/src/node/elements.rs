use crate::node::{MATHML_NAMESPACE, SVG_NAMESPACE};

/// Elements of the HTML namespace that have their own interface or are plain `HTMLElement`s
pub static KNOWN_HTML_ELEMENTS: &[&str] = &[
    "a", "abbr", "address", "area", "article", "aside", "audio", "b", "base", "bdi", "bdo",
    "blockquote", "body", "br", "button", "canvas", "caption", "cite", "code", "col", "colgroup",
    "data", "datalist", "dd", "del", "details", "dfn", "dialog", "div", "dl", "dt", "em", "embed",
    "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6",
    "head", "header", "hgroup", "hr", "html", "i", "iframe", "img", "input", "ins", "kbd", "label",
    "legend", "li", "link", "main", "map", "mark", "menu", "meta", "meter", "nav", "noscript",
    "object", "ol", "optgroup", "option", "output", "p", "picture", "pre", "progress", "q", "rp",
    "rt", "ruby", "s", "samp", "script", "search", "section", "select", "slot", "small", "source",
    "span", "strong", "style", "sub", "summary", "sup", "table", "tbody", "td", "template",
    "textarea", "tfoot", "th", "thead", "time", "title", "tr", "track", "u", "ul", "var", "video",
    "wbr",
];

/// Elements that may host a shadow root, besides autonomous custom elements
pub static VALID_SHADOW_HOST_NAMES: &[&str] = &[
    "article",
    "aside",
    "blockquote",
    "body",
    "div",
    "footer",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "header",
    "main",
    "nav",
    "p",
    "section",
    "span",
];

/// Hyphenated names that are not valid custom element names
static RESERVED_CUSTOM_ELEMENT_NAMES: &[&str] = &[
    "annotation-xml",
    "color-profile",
    "font-face",
    "font-face-src",
    "font-face-uri",
    "font-face-format",
    "font-face-name",
    "missing-glyph",
];

/// Interface that governs an element, resolved from its namespace and local name
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ElementInterface {
    HtmlSlotElement,
    HtmlTemplateElement,
    HtmlElement,
    HtmlUnknownElement,
    SvgElement,
    MathMlElement,
    Element,
}

impl ElementInterface {
    /// `namespace` is `None` for the HTML namespace
    pub fn resolve(namespace: Option<&str>, local_name: &str) -> Self {
        match namespace {
            None => match local_name {
                "slot" => ElementInterface::HtmlSlotElement,
                "template" => ElementInterface::HtmlTemplateElement,
                name if KNOWN_HTML_ELEMENTS.contains(&name) => ElementInterface::HtmlElement,
                name if is_valid_custom_element_name(name) => ElementInterface::HtmlElement,
                _ => ElementInterface::HtmlUnknownElement,
            },
            Some(SVG_NAMESPACE) => ElementInterface::SvgElement,
            Some(MATHML_NAMESPACE) => ElementInterface::MathMlElement,
            Some(_) => ElementInterface::Element,
        }
    }

    /// Returns true for every interface that inherits from `HTMLElement`
    pub fn is_html(self) -> bool {
        matches!(
            self,
            ElementInterface::HtmlSlotElement
                | ElementInterface::HtmlTemplateElement
                | ElementInterface::HtmlElement
                | ElementInterface::HtmlUnknownElement
        )
    }
}

/// See: https://html.spec.whatwg.org/multipage/custom-elements.html#valid-custom-element-name
pub fn is_valid_custom_element_name(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };

    first.is_ascii_lowercase()
        && name.contains('-')
        && !name.chars().any(|c| c.is_ascii_uppercase())
        && chars.all(|c| {
            c.is_ascii_lowercase()
                || c.is_ascii_digit()
                || matches!(c, '-' | '.' | '_')
                || !c.is_ascii()
        })
        && !RESERVED_CUSTOM_ELEMENT_NAMES.contains(&name)
}

/// Returns true when an element with this local name may get a shadow root attached
pub fn is_valid_shadow_host_name(name: &str) -> bool {
    VALID_SHADOW_HOST_NAMES.contains(&name) || is_valid_custom_element_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(None, "slot", ElementInterface::HtmlSlotElement ; "html slot")]
    #[test_case(None, "template", ElementInterface::HtmlTemplateElement ; "template")]
    #[test_case(None, "div", ElementInterface::HtmlElement ; "div")]
    #[test_case(None, "my-widget", ElementInterface::HtmlElement ; "custom")]
    #[test_case(None, "blink", ElementInterface::HtmlUnknownElement ; "unknown")]
    #[test_case(Some(SVG_NAMESPACE), "slot", ElementInterface::SvgElement ; "svg slot")]
    #[test_case(Some(MATHML_NAMESPACE), "mi", ElementInterface::MathMlElement ; "mathml")]
    #[test_case(Some("urn:x"), "div", ElementInterface::Element ; "other namespace")]
    fn resolve(namespace: Option<&str>, name: &str, expected: ElementInterface) {
        assert_eq!(ElementInterface::resolve(namespace, name), expected);
    }

    #[test_case("my-element", true ; "simple")]
    #[test_case("x-1", true ; "digit after hyphen")]
    #[test_case("my-élément", true ; "non ascii")]
    #[test_case("My-element", false ; "uppercase start")]
    #[test_case("myelement", false ; "no hyphen")]
    #[test_case("1-element", false ; "digit start")]
    #[test_case("font-face", false ; "reserved")]
    #[test_case("my-Element", false ; "uppercase inside")]
    fn custom_element_names(name: &str, valid: bool) {
        assert_eq!(is_valid_custom_element_name(name), valid);
    }

    #[test]
    fn shadow_hosts() {
        assert!(is_valid_shadow_host_name("div"));
        assert!(is_valid_shadow_host_name("x-host"));
        assert!(!is_valid_shadow_host_name("img"));
        assert!(!is_valid_shadow_host_name("slot"));
    }
}
