//! Markup tokenizer built on [Logos].
//!
//! The lexer never drops input: every byte lands in exactly one
//! token, and anything Logos cannot classify (a stray `<`) comes back as
//! [`TokenKind::Text`].
//!
//! [Logos]: https://docs.rs/logos

use std::ops::Range;

use logos::Logos;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"")]
pub enum TokenKind {
    /// `<!-- ... -->`
    #[regex(r"<!--([^-]|-[^-])*-->")]
    Comment,

    /// `<!DOCTYPE ...>` and other declarations
    #[regex(r"<![A-Za-z][^>]*>")]
    Declaration,

    /// `</tag>`
    #[regex(r"</[A-Za-z][^>]*>")]
    EndTag,

    /// `<tag ...>` or `<tag .../>`
    #[regex(r"<[A-Za-z][^>]*>")]
    StartTag,

    /// Character data up to the next `<`
    #[regex(r"[^<]+")]
    Text,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    pub span: Range<usize>,
}

/// Tokenize `input`. Concatenating the token texts reproduces the input.
pub fn lex(input: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut lexer = TokenKind::lexer(input);

    while let Some(result) = lexer.next() {
        let kind = result.unwrap_or(TokenKind::Text);
        tokens.push(Token {
            kind,
            text: lexer.slice(),
            span: lexer.span(),
        });
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(input: &str) -> Vec<(TokenKind, &str)> {
        lex(input).into_iter().map(|t| (t.kind, t.text)).collect()
    }

    #[test]
    fn lex_empty_input() {
        assert_eq!(lex(""), vec![]);
    }

    #[test]
    fn lex_tags_and_text() {
        assert_eq!(
            kinds(r#"<p class="a">Hi</p>"#),
            vec![
                (TokenKind::StartTag, r#"<p class="a">"#),
                (TokenKind::Text, "Hi"),
                (TokenKind::EndTag, "</p>"),
            ]
        );
    }

    #[test]
    fn lex_comment_and_declaration() {
        assert_eq!(
            kinds("<!DOCTYPE html><!-- note -->x"),
            vec![
                (TokenKind::Declaration, "<!DOCTYPE html>"),
                (TokenKind::Comment, "<!-- note -->"),
                (TokenKind::Text, "x"),
            ]
        );
    }

    #[test]
    fn stray_angle_bracket_is_text() {
        let tokens = lex("a < b");
        let rebuilt: String = tokens.iter().map(|t| t.text).collect();
        assert_eq!(rebuilt, "a < b");
        assert!(tokens.iter().all(|t| t.kind == TokenKind::Text));
    }

    #[test]
    fn all_bytes_preserved() {
        let input = "<div><img src=x.png><span class='m'>t&amp;t</span><!--c--></div>";
        let rebuilt: String = lex(input).iter().map(|t| t.text).collect();
        assert_eq!(rebuilt, input);
    }
}
