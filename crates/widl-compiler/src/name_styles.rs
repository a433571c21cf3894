//! Identifier case conversion for generated artifact names.

/// `HTMLHtmlElement` to `html_html_element`, `CSSStyleSheet2` to
/// `css_style_sheet_2`. Acronym runs stay together; the last capital of a
/// run starts the next word when a lowercase letter follows.
pub fn snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 8);
    for (index, &c) in chars.iter().enumerate() {
        let prev = index.checked_sub(1).map(|i| chars[i]);
        let next = chars.get(index + 1);
        let starts_word = match prev {
            None => false,
            Some(prev) => {
                (c.is_ascii_uppercase()
                    && (prev.is_ascii_lowercase()
                        || prev.is_ascii_digit()
                        || next.is_some_and(|next| next.is_ascii_lowercase())))
                    || (c.is_ascii_digit() && !prev.is_ascii_digit())
            }
        };
        if starts_word && !out.ends_with('_') {
            out.push('_');
        }
        out.push(c.to_ascii_lowercase());
    }
    out
}

/// The default header filename for an implementation class.
pub fn header_basename(class_name: &str) -> String {
    format!("{}.h", snake_case(class_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snake_case_handles_acronym_runs() {
        assert_eq!(snake_case("HTMLHtmlElement"), "html_html_element");
        assert_eq!(snake_case("CSSStyleSheet"), "css_style_sheet");
        assert_eq!(snake_case("Window"), "window");
        assert_eq!(snake_case("XMLHttpRequest"), "xml_http_request");
        assert_eq!(snake_case("AudioWorkletNode2"), "audio_worklet_node_2");
    }

    #[test]
    fn header_basename_appends_suffix() {
        assert_eq!(header_basename("HTMLAudioElement"), "html_audio_element.h");
    }
}
