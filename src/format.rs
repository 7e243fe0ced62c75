//! Rendering of the `char` instruction.

/// Render a number as a decimal numeric character reference.
///
/// No range check is made; `-1` renders as `&#-1;`.
pub fn format_char(value: i64) -> String {
    format!("&#{value};")
}

/// Wrap arbitrary text in reference delimiters, as the classic `char` does
/// when the top of the stack is not a number.
pub fn format_reference(text: &str) -> String {
    format!("&#{text};")
}

/// Replace every well-formed `&#N;` reference with the character it denotes.
///
/// References that do not name a valid Unicode scalar value are left as they
/// are, as is any other text.
pub fn decode_references(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find("&#") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let decoded = after.find(';').and_then(|end| {
            let digits = &after[..end];
            if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            let c = digits.parse::<u32>().ok().and_then(char::from_u32)?;
            Some((c, end))
        });
        match decoded {
            Some((c, end)) => {
                out.push(c);
                rest = &after[end + 1..];
            }
            None => {
                out.push_str("&#");
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_char() {
        assert_eq!(format_char(65), "&#65;");
        assert_eq!(format_char(0), "&#0;");
        assert_eq!(format_char(-12), "&#-12;");
        assert_eq!(format_char(1_114_112), "&#1114112;");
    }

    #[test]
    fn test_format_reference() {
        assert_eq!(format_reference("NaN"), "&#NaN;");
        assert_eq!(format_reference(""), "&#;");
        assert_eq!(decode_references(&format_reference("65")), "A");
    }

    #[test]
    fn test_decode() {
        assert_eq!(decode_references("&#72;&#105;"), "Hi");
        assert_eq!(decode_references("n&#111; chicken&#115;&#10;"), "no chickens\n");
        assert_eq!(decode_references("plain"), "plain");
        assert_eq!(decode_references(""), "");
    }

    #[test]
    fn test_decode_leaves_malformed() {
        assert_eq!(decode_references("&#-1;"), "&#-1;");
        assert_eq!(decode_references("&#;"), "&#;");
        assert_eq!(decode_references("&#65"), "&#65");
        assert_eq!(decode_references("&#1114112;"), "&#1114112;");
        assert_eq!(decode_references("&#55296;&#66;"), "&#55296;B");
    }
}
