//! This module contains the tokenizer that splits a single line of a TEAL
//! listing into its whitespace-separated tokens.
//!
//! # Implementation Note
//!
//! The lexer recognises pieces of a token rather than whole tokens, since a
//! single slash may belong to an opcode such as `b/` while two of them begin a
//! comment. Pieces that touch are joined back into one token.

use logos::Logos;

use crate::error::parse::Error;

/// The pieces of text out of which the tokens of a line are made.
#[derive(Logos, Clone, Copy, Debug, Eq, PartialEq)]
enum Piece {
    #[regex(r"\s+", logos::skip)]
    Whitespace,

    #[regex(r"//.*")]
    Comment,

    /// A string literal, with its quotes and escape sequences.
    #[regex(r#""([^"\\]|\\.)*""#)]
    Literal,

    #[token("/")]
    Slash,

    #[regex(r#"[^\s"/]+"#)]
    Text,
}

/// Splits `line` into tokens, discarding any trailing comment.
///
/// String literals are returned as single tokens including their surrounding
/// quotes and with their escape sequences left untouched.
///
/// # Errors
///
/// Returns [`Err`] if a string literal is not terminated before the end of the
/// line.
pub fn tokenize(line: &str) -> Result<Vec<String>, Error> {
    let mut tokens: Vec<String> = Vec::new();
    let mut lexer = Piece::lexer(line);
    let mut last_end = None;

    while let Some(piece) = lexer.next() {
        // Every character starts some piece except a quote that is never closed
        let piece = piece.map_err(|()| Error::UnterminatedString)?;
        if piece == Piece::Comment {
            break;
        }

        let span = lexer.span();
        match tokens.last_mut() {
            Some(token) if last_end == Some(span.start) => token.push_str(lexer.slice()),
            _ => tokens.push(lexer.slice().to_string()),
        }
        last_end = Some(span.end);
    }

    Ok(tokens)
}

#[cfg(test)]
mod test {
    use crate::{error::parse::Error, parser::tokenizer::tokenize};

    #[test]
    fn splits_on_whitespace() -> anyhow::Result<()> {
        let tokens = tokenize("  gtxn 0\tReceiver  ")?;
        assert_eq!(tokens, vec!["gtxn", "0", "Receiver"]);

        Ok(())
    }

    #[test]
    fn strips_comments() -> anyhow::Result<()> {
        assert_eq!(tokenize("int 1 // the answer")?, vec!["int", "1"]);
        assert_eq!(tokenize("// only a comment")?, Vec::<String>::new());
        assert_eq!(tokenize("int 1//tight")?, vec!["int", "1"]);

        Ok(())
    }

    #[test]
    fn keeps_strings_whole() -> anyhow::Result<()> {
        let tokens = tokenize(r#"byte "a // b \" c" // comment"#)?;
        assert_eq!(tokens, vec!["byte", r#""a // b \" c""#]);

        Ok(())
    }

    #[test]
    fn keeps_division_operator() -> anyhow::Result<()> {
        assert_eq!(tokenize("/")?, vec!["/"]);
        assert_eq!(tokenize("b/ // bytes")?, vec!["b/"]);

        Ok(())
    }

    #[test]
    fn joins_pieces_that_touch() -> anyhow::Result<()> {
        assert_eq!(tokenize(r#"method "f(uint64)void""#)?, vec!["method", r#""f(uint64)void""#]);
        assert_eq!(tokenize("a/b/c d")?, vec!["a/b/c", "d"]);
        assert_eq!(tokenize(r#"x"y z"w"#)?, vec![r#"x"y z"w"#]);

        Ok(())
    }

    #[test]
    fn rejects_unterminated_strings() {
        assert_eq!(tokenize(r#"byte "oops"#), Err(Error::UnterminatedString));
    }
}
