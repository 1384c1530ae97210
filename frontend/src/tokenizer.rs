use kernel::diagnostics::Span;
use std::iter::Peekable;
use std::str::Chars;

/// Relational/logical symbols that arrive already in Unicode form.
/// The tokenizer passes them through as identifiers; the parser is
/// what assigns them operator meaning.
const SYMBOLIC_IDENTS: [char; 19] = [
    '∀', '∃', '∈', '∉', '⊆', '≤', '≥', '≠', '∧', '∨', '¬', '→', '↔', '⇒', '⇔', '≡', '·', '×',
    '∞',
];

/// Single-character punctuation and operator tokens.
const PUNCTUATION: [char; 18] = [
    '(', ')', '{', '}', '[', ']', '+', '-', '*', '/', '^', '_', '=', '<', '>', ',', '.', '|',
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// Digit run with at most one decimal point, kept verbatim.
    Number(String),
    /// LaTeX command without its backslash: `\frac` → `frac`,
    /// `\{` → `{`.
    Command(String),
    /// Identifier: alphabetic start (Greek and the blackboard-bold
    /// ℕ/ℤ/ℝ/ℂ glyphs included), alphanumeric continuation, optional
    /// trailing prime marks. Unicode operator glyphs also land here.
    Ident(String),
    /// Fixed single-character punctuation.
    Symbol(char),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Lexer {
            chars: input.chars().peekable(),
            pos: 0,
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn next(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        self.pos += c.len_utf8();
        Some(c)
    }
}

/// Lex a LaTeX-flavored math string into a flat token stream.
/// Whitespace is discarded; unrecognized characters are silently
/// skipped, never an error.
pub fn tokenize(input: &str) -> Vec<Token> {
    let mut lexer = Lexer::new(input);
    let mut tokens = Vec::new();

    while let Some(c) = lexer.peek() {
        let start = lexer.pos;

        if c.is_whitespace() {
            lexer.next();
            continue;
        }

        if c.is_ascii_digit() {
            let mut text = String::new();
            let mut seen_dot = false;
            while let Some(d) = lexer.peek() {
                if d.is_ascii_digit() {
                    text.push(d);
                    lexer.next();
                } else if d == '.' && !seen_dot {
                    seen_dot = true;
                    text.push(d);
                    lexer.next();
                } else {
                    break;
                }
            }
            tokens.push(Token {
                kind: TokenKind::Number(text),
                span: Span::new(start, lexer.pos),
            });
            continue;
        }

        if c == '\\' {
            lexer.next();
            match lexer.peek() {
                Some(d) if d.is_alphabetic() => {
                    let mut word = String::new();
                    while let Some(d) = lexer.peek() {
                        if d.is_alphabetic() {
                            word.push(d);
                            lexer.next();
                        } else {
                            break;
                        }
                    }
                    tokens.push(Token {
                        kind: TokenKind::Command(word),
                        span: Span::new(start, lexer.pos),
                    });
                }
                Some(d) => {
                    // Symbolic command such as `\{` or `\,`.
                    lexer.next();
                    tokens.push(Token {
                        kind: TokenKind::Command(d.to_string()),
                        span: Span::new(start, lexer.pos),
                    });
                }
                None => {}
            }
            continue;
        }

        if SYMBOLIC_IDENTS.contains(&c) {
            lexer.next();
            tokens.push(Token {
                kind: TokenKind::Ident(c.to_string()),
                span: Span::new(start, lexer.pos),
            });
            continue;
        }

        if c.is_alphabetic() {
            let mut name = String::new();
            while let Some(d) = lexer.peek() {
                if d.is_alphanumeric() {
                    name.push(d);
                    lexer.next();
                } else {
                    break;
                }
            }
            // Trailing prime marks belong to the identifier.
            while lexer.peek() == Some('\'') {
                name.push('\'');
                lexer.next();
            }
            tokens.push(Token {
                kind: TokenKind::Ident(name),
                span: Span::new(start, lexer.pos),
            });
            continue;
        }

        if PUNCTUATION.contains(&c) {
            lexer.next();
            tokens.push(Token {
                kind: TokenKind::Symbol(c),
                span: Span::new(start, lexer.pos),
            });
            continue;
        }

        // Unknown character: skip it, never abort.
        lexer.next();
    }

    tokens
}
