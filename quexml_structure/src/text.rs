// Text cleaning and small helpers to navigate the XML tree.

use html_escape::decode_html_entities;
use regex::Regex;
use roxmltree::Node;
use std::sync::LazyLock;

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)</?[A-Za-z!][^<>]*>").unwrap());
static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Turns a raw text fragment into a single line of display text.
///
/// Markup (LimeSurvey ships escaped HTML inside the text nodes) is removed,
/// each tag counting as a separator, then HTML entities are decoded. Runs of
/// whitespace, including tabs, newlines and non-breaking spaces, collapse to
/// one space and the result is trimmed.
///
/// ```
/// use quexml_structure::clean_text;
///
/// assert_eq!(clean_text("<p>How old\n\tare&nbsp;you?</p>"), "How old are you?");
/// assert_eq!(clean_text("Fish &amp; chips"), "Fish & chips");
/// assert_eq!(clean_text(""), "");
/// ```
pub fn clean_text(raw: &str) -> String {
    let without_tags = TAG_RE.replace_all(raw, " ");
    let decoded = decode_html_entities(&without_tags);
    WHITESPACE_RE
        .replace_all(decoded.trim(), " ")
        .trim()
        .to_string()
}

/// All the text content below a node, cleaned.
///
/// Text nodes are separated by a space, so that real child elements split
/// words the same way escaped tags do.
pub(crate) fn node_text(node: Node) -> String {
    let raw: Vec<&str> = node
        .descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect();
    clean_text(&raw.join(" "))
}

/// The direct element children with the given tag name, in document order.
pub(crate) fn children_named<'a, 'input: 'a>(
    node: Node<'a, 'input>,
    name: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    node.children()
        .filter(move |n| n.is_element() && n.tag_name().name() == name)
}

pub(crate) fn first_child<'a, 'input: 'a>(
    node: Node<'a, 'input>,
    name: &'a str,
) -> Option<Node<'a, 'input>> {
    children_named(node, name).next()
}

/// Cleaned text of the first child with that name, if there is one.
pub(crate) fn child_text(node: Node, name: &str) -> Option<String> {
    first_child(node, name).map(node_text)
}

/// Space-joined text of all the children with that name, skipping empty ones.
pub(crate) fn joined_child_text(node: Node, name: &str) -> String {
    children_named(node, name)
        .map(node_text)
        .filter(|s| !s.is_empty())
        .collect::<Vec<String>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_markup_and_collapses_whitespace() {
        assert_eq!(
            clean_text("  <p>Please <b>rate</b>\r\n the service.</p> "),
            "Please rate the service."
        );
        assert_eq!(clean_text("Line one<br />Line two"), "Line one Line two");
        assert_eq!(clean_text("a\u{a0}\u{a0}b\t\tc"), "a b c");
    }

    #[test]
    fn empty_and_blank_input() {
        assert_eq!(clean_text(""), "");
        assert_eq!(clean_text(" \n\t "), "");
        assert_eq!(clean_text("<p></p>"), "");
    }

    #[test]
    fn decodes_entities() {
        assert_eq!(
            clean_text("<p>Fish &amp; chips, &quot;Gr&uuml;&szlig;e&quot; &#8211; ok</p>"),
            "Fish & chips, \"Grüße\" – ok"
        );
        assert_eq!(clean_text("caf&#233; &#x263A;"), "café ☺");
        assert_eq!(clean_text("a&nbsp;&nbsp;b"), "a b");
    }

    #[test]
    fn decoded_brackets_are_not_stripped() {
        assert_eq!(clean_text("1 &lt; 2"), "1 < 2");
    }

    #[test]
    fn child_elements_split_words() {
        let doc = roxmltree::Document::parse("<text><p>First</p><p>Second</p></text>").unwrap();
        assert_eq!(node_text(doc.root_element()), "First Second");
    }

    #[test]
    fn lone_angle_brackets_are_kept() {
        assert_eq!(clean_text("a < b and c > d"), "a < b and c > d");
    }

    #[test]
    fn node_text_reads_nested_elements() {
        let doc = roxmltree::Document::parse(
            "<question><text>How <b>often</b>\n do you   travel?</text><text>Again</text></question>",
        )
        .unwrap();
        let question = doc.root_element();
        let first = first_child(question, "text").unwrap();
        assert_eq!(node_text(first), "How often do you travel?");
        assert_eq!(children_named(question, "text").count(), 2);
        assert_eq!(joined_child_text(question, "text"), "How often do you travel? Again");
        assert_eq!(child_text(question, "missing"), None);
    }

    #[test]
    fn escaped_markup_inside_text_nodes() {
        let doc =
            roxmltree::Document::parse("<text>&lt;p&gt;Hello&amp;nbsp;world&lt;/p&gt;</text>")
                .unwrap();
        assert_eq!(node_text(doc.root_element()), "Hello world");
    }
}
