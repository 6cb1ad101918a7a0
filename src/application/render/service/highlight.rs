use syntect::{
    html::{ClassStyle, ClassedHTMLGenerator},
    parsing::{SyntaxReference, SyntaxSet},
    util::LinesWithEndings,
};

use crate::application::render::types::RenderError;

pub(crate) fn highlight_code(
    language: Option<&str>,
    meta: Option<&str>,
    code: &str,
    syntax_set: &SyntaxSet,
    class_style: &ClassStyle,
) -> Result<String, RenderError> {
    let lang_token = language.filter(|lang| !lang.is_empty()).unwrap_or("text");
    let syntax =
        find_syntax(syntax_set, lang_token).unwrap_or_else(|| syntax_set.find_syntax_plain_text());

    let mut code_with_newline = code.to_string();
    if !code_with_newline.ends_with('\n') {
        code_with_newline.push('\n');
    }

    let mut generator =
        ClassedHTMLGenerator::new_with_class_style(syntax, syntax_set, *class_style);

    for line in LinesWithEndings::from(code_with_newline.as_str()) {
        generator
            .parse_html_for_line_which_includes_newline(line)
            .map_err(|err| RenderError::Highlighting {
                language: lang_token.to_string(),
                message: err.to_string(),
            })?;
    }

    let highlighted = generator.finalize();
    let lang_lower = escape_token(&lang_token.to_ascii_lowercase());

    let meta_attr = meta
        .filter(|m| !m.is_empty())
        .map(|m| format!(" data-meta=\"{}\"", ammonia::clean_text(m)))
        .unwrap_or_default();

    Ok(format!(
        "<pre class=\"syntax-highlight syntax-lang-{lang_lower}\" data-language=\"{lang_lower}\"><code class=\"language-{lang_lower} syntax-code\"{meta_attr}>{highlighted}</code></pre>"
    ))
}

fn find_syntax<'a>(syntax_set: &'a SyntaxSet, token: &str) -> Option<&'a SyntaxReference> {
    let lowercase = token.to_ascii_lowercase();
    syntax_set
        .find_syntax_by_token(&lowercase)
        .or_else(|| syntax_set.find_syntax_by_name(&lowercase))
        .or_else(|| syntax_set.find_syntax_by_extension(&lowercase))
}

// Info strings are author input; keep only characters that are safe in a class list.
fn escape_token(token: &str) -> String {
    token
        .chars()
        .filter(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '+' | '#'))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn highlights_known_language_with_prefixed_classes() {
        let syntax_set = SyntaxSet::load_defaults_newlines();
        let style = ClassStyle::SpacedPrefixed { prefix: "syntax-" };
        let html = highlight_code(Some("rust"), None, "fn main() {}", &syntax_set, &style)
            .expect("highlight");
        assert!(html.starts_with("<pre class=\"syntax-highlight syntax-lang-rust\""));
        assert!(html.contains("syntax-"));
        assert!(html.ends_with("</code></pre>"));
    }

    #[test]
    fn unknown_language_falls_back_to_plain_text() {
        let syntax_set = SyntaxSet::load_defaults_newlines();
        let style = ClassStyle::SpacedPrefixed { prefix: "syntax-" };
        let html = highlight_code(Some("klingon\"><script>"), None, "qapla'", &syntax_set, &style)
            .expect("highlight");
        assert!(!html.contains("<script>"));
        assert!(html.contains("qapla"));
    }
}
