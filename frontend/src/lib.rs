//! LaTeX-flavored surface syntax for kernel terms: a tokenizer and a
//! precedence-climbing expression parser with error recovery.

pub mod parser;
pub mod tokenizer;

pub use parser::{parse_expression, ParseError};
pub use tokenizer::{tokenize, Token, TokenKind};

#[cfg(test)]
mod tests {
    use super::*;
    use kernel::ast::{BinOp, Term};

    #[test]
    fn clean_input_parses_without_errors() {
        let (term, errors) = parse_expression("a + b");
        assert!(errors.is_empty());
        assert!(matches!(&*term, Term::BinOp(BinOp::Add, _, _)));
    }

    #[test]
    fn garbage_still_yields_a_term() {
        let (term, errors) = parse_expression(") )");
        assert!(!errors.is_empty());
        assert!(matches!(&*term, Term::Hole(_, _)));
    }
}
