//! HTML tokenization and DOM construction.

mod charset;
mod tokenizer;

use pk_dom::Document;
use pk_dom::NodeId;
use tokenizer::Token;

pub use charset::decode_page_bytes;

/// Parses raw HTML into a DOM document.
#[derive(Debug, Default)]
pub struct HtmlParser;

impl HtmlParser {
    pub fn parse(&self, input: &str) -> Document {
        let mut document = Document::empty();
        let mut stack: Vec<(NodeId, String)> = vec![(document.root(), String::new())];

        for token in tokenizer::tokenize(input) {
            match token {
                Token::Text(text) => {
                    let Some((parent, parent_tag)) = stack.last() else {
                        continue;
                    };
                    if text.trim().is_empty() {
                        continue;
                    }
                    let text = if matches!(parent_tag.as_str(), "script" | "style") {
                        text
                    } else {
                        tokenizer::decode_entities(&text)
                    };
                    let parent = *parent;
                    let node = document.create_text(text);
                    let _ = document.append_child(parent, node);
                }
                Token::Start {
                    element,
                    self_closing,
                } => {
                    let Some((parent, _)) = stack.last() else {
                        continue;
                    };
                    let parent = *parent;
                    let tag = element.tag.clone();
                    let node = document.create_element(element);
                    let _ = document.append_child(parent, node);
                    if !self_closing && !tokenizer::is_void(&tag) {
                        stack.push((node, tag));
                    }
                }
                Token::End(name) => {
                    // Unmatched end tags are dropped; matched ones close
                    // every element opened after their start tag.
                    if let Some(position) = stack.iter().skip(1).rposition(|(_, tag)| *tag == name)
                    {
                        stack.truncate(position + 1);
                    }
                }
            }
        }

        document.title = find_title(&document);
        document
    }
}

fn find_title(document: &Document) -> String {
    document
        .descendants(document.root())
        .into_iter()
        .find(|node| {
            document
                .element(*node)
                .is_some_and(|element| element.tag == "title")
        })
        .map(|node| collapse_whitespace(&document.text_content(node)))
        .unwrap_or_default()
}

fn collapse_whitespace(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::HtmlParser;

    #[test]
    fn parses_title_and_root() {
        let doc = HtmlParser
            .parse("<html><head><title> Hostel   Desk </title></head><body>Hi</body></html>");
        assert_eq!(doc.title, "Hostel Desk");
        assert!(
            doc.node(doc.root())
                .is_some_and(|root| !root.children.is_empty())
        );
    }

    #[test]
    fn handles_documents_without_title() {
        let doc = HtmlParser.parse("plain text only");
        assert_eq!(doc.title, "");
        assert!(
            doc.node(doc.root())
                .is_some_and(|root| !root.children.is_empty())
        );
        assert_eq!(doc.text_content(doc.root()), "plain text only");
    }

    #[test]
    fn builds_nested_elements_with_classes_and_ids() {
        let doc = HtmlParser.parse(
            r#"<div class="issue"><button class="reaction-btn" id="r1">Like <span class="count">4</span></button></div>"#,
        );
        let Some(button) = doc.get_element_by_id("r1") else {
            panic!("button should be found by id");
        };
        assert_eq!(doc.get_elements_by_class_name("reaction-btn"), vec![button]);
        let Some(count) = doc.find_descendant_by_class(button, "count") else {
            panic!("count span should be nested in the button");
        };
        assert_eq!(doc.text_content(count), "4");
    }

    #[test]
    fn void_elements_do_not_swallow_siblings() {
        let doc = HtmlParser.parse(
            r#"<form><input id="captcha-input" value="abc"><span id="captcha-code"></span></form>"#,
        );
        let (Some(input), Some(code)) = (
            doc.get_element_by_id("captcha-input"),
            doc.get_element_by_id("captcha-code"),
        ) else {
            panic!("both elements should be present");
        };
        assert!(
            doc.element(input)
                .is_some_and(|element| element.value() == "abc")
        );
        assert_eq!(
            doc.node(code).and_then(|node| node.parent),
            doc.node(input).and_then(|node| node.parent)
        );
    }

    #[test]
    fn unmatched_end_tags_are_ignored() {
        let doc = HtmlParser.parse("<div id='a'></span><p id='b'>x</p></div>");
        let (Some(div), Some(p)) = (doc.get_element_by_id("a"), doc.get_element_by_id("b")) else {
            panic!("both elements should be present");
        };
        assert_eq!(doc.node(p).and_then(|node| node.parent), Some(div));
    }

    #[test]
    fn inline_styles_are_parsed() {
        let doc = HtmlParser.parse(r#"<div class="flash-message" style="display: block">Saved</div>"#);
        let nodes = doc.get_elements_by_class_name("flash-message");
        assert_eq!(nodes.len(), 1);
        assert!(
            nodes
                .first()
                .and_then(|node| doc.element(*node))
                .is_some_and(|element| !element.is_hidden())
        );
    }
}
