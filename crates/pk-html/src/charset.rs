use crate::tokenizer::Token;
use crate::tokenizer::tokenize;
use encoding_rs::Encoding;
use pk_dom::Element;

/// Bytes searched for a `<meta>` charset declaration.
const SNIFF_BYTES: usize = 8192;

/// Decodes page bytes using the charset a `<meta>` tag declares near the top
/// of the page, falling back to lossy UTF-8.
pub fn decode_page_bytes(body: &[u8]) -> String {
    let encoding = declared_charset(body).and_then(|label| Encoding::for_label(label.as_bytes()));
    match encoding {
        Some(encoding) => encoding.decode(body).0.into_owned(),
        None => String::from_utf8_lossy(body).into_owned(),
    }
}

fn declared_charset(body: &[u8]) -> Option<String> {
    let prefix = String::from_utf8_lossy(&body[..body.len().min(SNIFF_BYTES)]);
    tokenize(&prefix).into_iter().find_map(|token| match token {
        Token::Start { element, .. } if element.tag == "meta" => meta_charset(&element),
        _ => None,
    })
}

/// Reads `<meta charset=...>` or the `charset=` parameter of
/// `<meta http-equiv="content-type" content=...>`.
fn meta_charset(meta: &Element) -> Option<String> {
    if let Some(label) = meta
        .attribute("charset")
        .map(str::trim)
        .filter(|label| !label.is_empty())
    {
        return Some(label.to_ascii_lowercase());
    }

    let content = meta.attribute("content")?.to_ascii_lowercase();
    let (_, parameter) = content.split_once("charset=")?;
    let label = parameter.trim_start().trim_start_matches(['"', '\'']);
    let end = label
        .find(|ch: char| ch.is_whitespace() || matches!(ch, ';' | '"' | '\''))
        .unwrap_or(label.len());
    (end > 0).then(|| label[..end].to_owned())
}

#[cfg(test)]
mod tests {
    use super::decode_page_bytes;
    use super::declared_charset;

    #[test]
    fn reads_charset_and_http_equiv_declarations() {
        let direct = b"<head><meta charset=\"Windows-1252\"></head>";
        let equiv = b"<meta http-equiv=content-type content=text/html;charset=ISO-8859-1>";
        let unrelated = b"<meta name=\"viewport\" content=\"width=device-width\">";
        assert_eq!(declared_charset(direct).as_deref(), Some("windows-1252"));
        assert_eq!(declared_charset(equiv).as_deref(), Some("iso-8859-1"));
        assert_eq!(declared_charset(unrelated), None);
    }

    #[test]
    fn decodes_legacy_single_byte_pages() {
        let page = b"<meta charset=\"windows-1252\"><p>caf\xE9</p>";
        assert!(decode_page_bytes(page).contains("caf\u{e9}"));
    }

    #[test]
    fn falls_back_to_utf8_without_declaration() {
        let page = "<p>\u{20AC}</p>".as_bytes();
        assert_eq!(decode_page_bytes(page), "<p>\u{20AC}</p>");
    }
}
