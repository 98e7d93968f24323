//! Tokenizer for genome listings.

use crate::error::AsmError;

/// Scope-opener marker written by the indented printer.
pub(crate) const OPEN_MARKER: &str = "-->";
/// Sibling-scope separator line written by the indented printer.
pub(crate) const SIBLING_MARKER: &str = "----";

/// A single token from a listing line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token {
    /// An instruction or symbolic argument name, case preserved.
    Ident(String),
    /// A numeric literal (decimal or hex).
    Number(u64),
}

/// Tokenize a single line.
///
/// Returns an empty Vec for blank lines, comment-only lines and separator
/// lines. Comments start with `;` and extend to end of line.
pub(crate) fn tokenize_line(line: &str, line_num: usize) -> Result<Vec<Token>, AsmError> {
    let line = match line.find(';') {
        Some(pos) => &line[..pos],
        None => line,
    };
    if line.trim() == SIBLING_MARKER {
        return Ok(Vec::new());
    }

    let mut tokens = Vec::new();
    for word in line.split_whitespace() {
        if word == OPEN_MARKER {
            continue;
        }
        let token = if let Some(hex) = word.strip_prefix("0x").or_else(|| word.strip_prefix("0X")) {
            let value = u64::from_str_radix(hex, 16).map_err(|_| AsmError::InvalidNumber {
                line: line_num,
                token: word.to_string(),
            })?;
            Token::Number(value)
        } else if word.as_bytes().first().is_some_and(|b| b.is_ascii_digit()) {
            let value: u64 = word.parse().map_err(|_| AsmError::InvalidNumber {
                line: line_num,
                token: word.to_string(),
            })?;
            Token::Number(value)
        } else {
            Token::Ident(word.to_string())
        };
        tokens.push(token);
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(s: &str) -> Token {
        Token::Ident(s.to_string())
    }

    #[test]
    fn blank_and_comment_lines() {
        assert_eq!(tokenize_line("", 1).unwrap(), vec![]);
        assert_eq!(tokenize_line("  \t ", 1).unwrap(), vec![]);
        assert_eq!(tokenize_line("; loop body", 1).unwrap(), vec![]);
    }

    #[test]
    fn name_and_args() {
        assert_eq!(
            tokenize_line("SetReg 3 12", 1).unwrap(),
            vec![ident("SetReg"), Token::Number(3), Token::Number(12)]
        );
    }

    #[test]
    fn case_is_preserved() {
        assert_eq!(tokenize_line("setreg", 1).unwrap(), vec![ident("setreg")]);
    }

    #[test]
    fn trailing_comment_stripped() {
        assert_eq!(
            tokenize_line("Inc 2 ; bump counter", 1).unwrap(),
            vec![ident("Inc"), Token::Number(2)]
        );
    }

    #[test]
    fn hex_and_symbolic_args() {
        assert_eq!(
            tokenize_line("Add 0x0a RegB 0X1", 1).unwrap(),
            vec![
                ident("Add"),
                Token::Number(10),
                ident("RegB"),
                Token::Number(1)
            ]
        );
    }

    #[test]
    fn printer_markers_ignored() {
        assert_eq!(
            tokenize_line("  While 1 0 --> ", 1).unwrap(),
            vec![ident("While"), Token::Number(1), Token::Number(0)]
        );
        assert_eq!(tokenize_line("   ----", 1).unwrap(), vec![]);
    }

    #[test]
    fn invalid_numbers() {
        assert_eq!(
            tokenize_line("Inc 0xZZ", 3).unwrap_err(),
            AsmError::InvalidNumber {
                line: 3,
                token: "0xZZ".to_string()
            }
        );
        assert_eq!(
            tokenize_line("Inc 4abc", 5).unwrap_err(),
            AsmError::InvalidNumber {
                line: 5,
                token: "4abc".to_string()
            }
        );
    }
}
