use crate::tokenizer::{tokenize, Token, TokenKind};
use kernel::ast::{BinOp, LiteralKind, Term, UnaryOp};
use kernel::diagnostics::Span;
use std::rc::Rc;
use thiserror::Error;

/// Recursion guard for adversarially deep input. Exceeding it records
/// a structured error instead of overflowing the call stack.
const MAX_DEPTH: usize = 256;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("unexpected end of input")]
    UnexpectedEof(Span),
    #[error("unexpected token `{0}`")]
    UnexpectedToken(String, Span),
    #[error("expected {0}")]
    Expected(String, Span),
    #[error("expression nesting exceeds the depth limit")]
    TooDeep(Span),
}

impl ParseError {
    pub fn span(&self) -> Span {
        match self {
            ParseError::UnexpectedEof(span)
            | ParseError::UnexpectedToken(_, span)
            | ParseError::Expected(_, span)
            | ParseError::TooDeep(span) => *span,
        }
    }
}

/// Parse a LaTeX-flavored math string into a kernel term.
///
/// Never fails outright: malformed input records errors and the
/// parser advances past the offending token, so the caller always
/// receives a best-effort term plus the error list.
pub fn parse_expression(input: &str) -> (Rc<Term>, Vec<ParseError>) {
    let mut parser = Parser::new(input);
    let term = parser.expr();
    if let Some(token) = parser.peek() {
        let rendered = render_token(&token.kind);
        let span = token.span;
        parser
            .errors
            .push(ParseError::UnexpectedToken(rendered, span));
    }
    (term, parser.errors)
}

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    end: usize,
    depth: usize,
    hole_counter: usize,
    errors: Vec<ParseError>,
}

impl Parser {
    pub fn new(input: &str) -> Self {
        Parser {
            tokens: tokenize(input),
            pos: 0,
            end: input.len(),
            depth: 0,
            hole_counter: 0,
            errors: Vec::new(),
        }
    }

    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    // -- token plumbing -----------------------------------------------------

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_at(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.pos + offset)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn current_span(&self) -> Span {
        match self.peek() {
            Some(token) => token.span,
            None => Span::new(self.end, self.end),
        }
    }

    fn record(&mut self, error: ParseError) {
        self.errors.push(error);
    }

    /// Best-effort stand-in for an unparseable fragment.
    fn error_hole(&mut self) -> Rc<Term> {
        let id = format!("parse{}", self.hole_counter);
        self.hole_counter += 1;
        Term::hole(id, None)
    }

    /// Canonical operator spelling of the current token, if any.
    fn op(&self) -> Option<&'static str> {
        self.peek().and_then(|t| canonical_op(&t.kind))
    }

    fn eat_op(&mut self, expected: &str) -> bool {
        if self.op() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn at_symbol(&self, c: char) -> bool {
        matches!(self.peek(), Some(t) if t.kind == TokenKind::Symbol(c))
    }

    fn eat_symbol(&mut self, c: char) -> bool {
        if self.at_symbol(c) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect_symbol(&mut self, c: char, what: &str) {
        if !self.eat_symbol(c) {
            let span = self.current_span();
            self.record(ParseError::Expected(what.to_string(), span));
        }
    }

    // -- grammar, lowest precedence first -----------------------------------

    /// Run one production under the depth counter. Every recursion
    /// cycle in the grammar goes through here, so flat operator
    /// chains are cut off the same way nested groups are.
    fn guarded<F>(&mut self, production: F) -> Rc<Term>
    where
        F: FnOnce(&mut Self) -> Rc<Term>,
    {
        if self.depth >= MAX_DEPTH {
            let span = self.current_span();
            self.record(ParseError::TooDeep(span));
            return self.error_hole();
        }
        self.depth += 1;
        let term = production(self);
        self.depth -= 1;
        term
    }

    pub fn expr(&mut self) -> Rc<Term> {
        self.guarded(Self::quantifier)
    }

    /// `∀ x ∈ D, body` / `∃ x ∈ D, body`. The domain is optional; a
    /// quantifier without one ranges over an unrestricted `Type 0`.
    fn quantifier(&mut self) -> Rc<Term> {
        let universal = match self.op() {
            Some("∀") => true,
            Some("∃") => false,
            _ => return self.iff(),
        };
        self.advance();

        let name = match self.peek() {
            Some(Token {
                kind: TokenKind::Ident(n),
                ..
            }) if canonical_op(&TokenKind::Ident(n.clone())).is_none() => {
                let n = n.clone();
                self.advance();
                n
            }
            _ => {
                let span = self.current_span();
                self.record(ParseError::Expected(
                    "a bound name after the quantifier".to_string(),
                    span,
                ));
                "_".to_string()
            }
        };

        let domain = if self.eat_op("∈") {
            self.comparison()
        } else {
            Term::type_at(0)
        };

        if !self.eat_symbol(',') {
            let span = self.current_span();
            self.record(ParseError::Expected(
                "`,` after the quantifier binder".to_string(),
                span,
            ));
        }

        let body = self.expr();
        if universal {
            Term::forall(name, domain, body)
        } else {
            Term::exists(name, domain, body)
        }
    }

    fn iff(&mut self) -> Rc<Term> {
        let mut lhs = self.implication();
        while self.eat_op("↔") {
            let rhs = self.implication();
            lhs = Term::binop(BinOp::Iff, lhs, rhs);
        }
        lhs
    }

    fn implication(&mut self) -> Rc<Term> {
        let lhs = self.disjunction();
        if self.eat_op("→") {
            // Right-associative: a → b → c is a → (b → c).
            let rhs = self.guarded(Self::implication);
            Term::binop(BinOp::Implies, lhs, rhs)
        } else {
            lhs
        }
    }

    fn disjunction(&mut self) -> Rc<Term> {
        let mut lhs = self.conjunction();
        while self.eat_op("∨") {
            let rhs = self.conjunction();
            lhs = Term::binop(BinOp::Or, lhs, rhs);
        }
        lhs
    }

    fn conjunction(&mut self) -> Rc<Term> {
        let mut lhs = self.relation();
        while self.eat_op("∧") {
            let rhs = self.relation();
            lhs = Term::binop(BinOp::And, lhs, rhs);
        }
        lhs
    }

    /// Modular congruence and set relations.
    fn relation(&mut self) -> Rc<Term> {
        let lhs = self.comparison();
        if self.eat_op("≡") {
            let rhs = self.comparison();
            let modulus = self.modulus_suffix();
            return Term::equiv(lhs, rhs, modulus);
        }
        if self.eat_op("∈") {
            let rhs = self.comparison();
            return Term::binop(BinOp::In, lhs, rhs);
        }
        if self.eat_op("∉") {
            let rhs = self.comparison();
            return Term::binop(BinOp::NotIn, lhs, rhs);
        }
        if self.eat_op("⊆") {
            let rhs = self.comparison();
            return Term::binop(BinOp::Subset, lhs, rhs);
        }
        lhs
    }

    /// `(\bmod ...)` belongs to an enclosing congruence, never to
    /// function application.
    fn at_bmod_group(&self) -> bool {
        matches!(self.peek_at(1), Some(t) if t.kind == TokenKind::Command("bmod".to_string()))
    }

    /// `\pmod{m}` or `(\bmod m)` after a congruence.
    fn modulus_suffix(&mut self) -> Option<Rc<Term>> {
        if matches!(self.peek(), Some(t) if t.kind == TokenKind::Command("pmod".to_string())) {
            self.advance();
            self.expect_symbol('{', "`{` after \\pmod");
            let modulus = self.expr();
            self.expect_symbol('}', "`}` closing \\pmod");
            return Some(modulus);
        }
        if self.at_symbol('(') && self.at_bmod_group() {
            self.advance(); // (
            self.advance(); // \bmod
            let modulus = self.comparison();
            self.expect_symbol(')', "`)` closing (\\bmod ...)");
            return Some(modulus);
        }
        None
    }

    fn comparison(&mut self) -> Rc<Term> {
        let lhs = self.additive();
        let op = match self.op() {
            Some("=") => BinOp::Eq,
            Some("<") => BinOp::Lt,
            Some(">") => BinOp::Gt,
            Some("≤") => BinOp::Le,
            Some("≥") => BinOp::Ge,
            _ => return lhs,
        };
        self.advance();
        let rhs = self.additive();
        Term::binop(op, lhs, rhs)
    }

    fn additive(&mut self) -> Rc<Term> {
        let mut lhs = self.multiplicative();
        loop {
            let op = match self.op() {
                Some("+") => BinOp::Add,
                Some("-") => BinOp::Sub,
                _ => break,
            };
            self.advance();
            let rhs = self.multiplicative();
            lhs = Term::binop(op, lhs, rhs);
        }
        lhs
    }

    fn multiplicative(&mut self) -> Rc<Term> {
        let mut lhs = self.unary();
        loop {
            let op = match self.op() {
                Some("*") => BinOp::Mul,
                Some("/") => BinOp::Div,
                Some("mod") => BinOp::Mod,
                _ => break,
            };
            self.advance();
            let rhs = self.unary();
            lhs = Term::binop(op, lhs, rhs);
        }
        lhs
    }

    fn unary(&mut self) -> Rc<Term> {
        if self.eat_op("¬") {
            let operand = self.guarded(Self::unary);
            return Term::unary(UnaryOp::Not, operand);
        }
        if self.eat_op("-") {
            let operand = self.guarded(Self::unary);
            // A digit run preceded by unary minus is an Int literal.
            if let Term::Literal(LiteralKind::Nat, value) | Term::Literal(LiteralKind::Int, value) =
                &*operand
            {
                return Term::int_lit(format!("-{}", value));
            }
            return Term::unary(UnaryOp::Neg, operand);
        }
        self.power()
    }

    fn power(&mut self) -> Rc<Term> {
        let base = self.application();
        if self.eat_op("^") {
            // Right-associative; the exponent is either a braced
            // group or a single token.
            let exponent = if self.eat_symbol('{') {
                let e = self.expr();
                self.expect_symbol('}', "`}` closing the exponent");
                e
            } else {
                self.guarded(Self::power)
            };
            return Term::binop(BinOp::Pow, base, exponent);
        }
        base
    }

    /// Juxtaposed parenthesized arguments, left-associative, curried:
    /// `f(a, b)` is `f(a)(b)`. Simple subscripts fold into the name.
    fn application(&mut self) -> Rc<Term> {
        let mut term = self.atom();
        loop {
            if self.at_symbol('(') && !self.at_bmod_group() {
                self.advance();
                let first = self.expr();
                term = Term::app(term, first);
                while self.eat_symbol(',') {
                    let next = self.expr();
                    term = Term::app(term, next);
                }
                self.expect_symbol(')', "`)` closing the argument list");
                continue;
            }
            if self.at_symbol('_') {
                self.advance();
                let sub = if self.eat_symbol('{') {
                    let s = self.expr();
                    self.expect_symbol('}', "`}` closing the subscript");
                    s
                } else {
                    self.atom()
                };
                term = merge_subscript(term, sub);
                continue;
            }
            break;
        }
        term
    }

    fn atom(&mut self) -> Rc<Term> {
        let token = match self.peek().cloned() {
            Some(t) => t,
            None => {
                let span = self.current_span();
                self.record(ParseError::UnexpectedEof(span));
                return self.error_hole();
            }
        };

        match token.kind {
            TokenKind::Number(text) => {
                self.advance();
                if text.contains('.') {
                    // Compatibility quirk carried over from the
                    // original pipeline: decimal literals are tagged
                    // Int while keeping the full decimal text, so the
                    // kind and the value string disagree. Downstream
                    // consumers depend on seeing exactly this shape.
                    Term::int_lit(text)
                } else {
                    Term::nat_lit(text)
                }
            }
            TokenKind::Ident(name) => {
                if canonical_op(&TokenKind::Ident(name.clone())).is_some() {
                    self.advance();
                    self.record(ParseError::UnexpectedToken(name, token.span));
                    return self.error_hole();
                }
                self.advance();
                domain_name(&name).unwrap_or_else(|| Term::var(name))
            }
            TokenKind::Symbol('(') => {
                self.advance();
                let first = self.expr();
                if self.at_symbol(',') {
                    // Tuple notation builds right-nested pairs.
                    let mut components = vec![first];
                    while self.eat_symbol(',') {
                        components.push(self.expr());
                    }
                    self.expect_symbol(')', "`)` closing the pair");
                    let mut iter = components.into_iter().rev();
                    let last = iter.next().unwrap_or_else(|| self.error_hole());
                    iter.fold(last, |acc, c| Term::pair(c, acc))
                } else {
                    self.expect_symbol(')', "`)` closing the group");
                    first
                }
            }
            TokenKind::Symbol('{') => {
                self.advance();
                let inner = self.expr();
                self.expect_symbol('}', "`}` closing the group");
                inner
            }
            TokenKind::Command(word) => {
                self.advance();
                self.command_atom(&word, token.span)
            }
            TokenKind::Symbol(c) => {
                self.advance();
                self.record(ParseError::UnexpectedToken(c.to_string(), token.span));
                self.error_hole()
            }
        }
    }

    /// Dedicated construction rules for the closed set of recognized
    /// LaTeX commands; anything unrecognized conservatively becomes a
    /// free variable named after the command word.
    fn command_atom(&mut self, word: &str, span: Span) -> Rc<Term> {
        match word {
            "mathbb" => {
                let name = self.braced_ident("\\mathbb");
                match name {
                    Some(n) => domain_name(&n).unwrap_or_else(|| Term::var(n)),
                    None => self.error_hole(),
                }
            }
            "frac" => {
                let numerator = self.braced_group("\\frac");
                let denominator = self.braced_group("\\frac");
                Term::binop(BinOp::Div, numerator, denominator)
            }
            "sqrt" => {
                let radicand = self.braced_group("\\sqrt");
                Term::app(Term::var("sqrt"), radicand)
            }
            "binom" => {
                let upper = self.braced_group("\\binom");
                let lower = self.braced_group("\\binom");
                Term::app(Term::app(Term::var("binom"), upper), lower)
            }
            "operatorname" => match self.braced_ident("\\operatorname") {
                Some(n) => Term::var(n),
                None => self.error_hole(),
            },
            "text" | "textrm" | "mathrm" | "mathit" | "mathbf" | "mathsf" | "mathcal" => {
                self.braced_group(word)
            }
            "infty" => Term::var("∞"),
            "dots" | "ldots" | "cdots" | "vdots" => Term::var("…"),
            "left" => {
                // Skip the delimiter, parse the wrapped expression,
                // then consume the matching \right and its delimiter.
                self.advance();
                let inner = self.expr();
                if matches!(self.peek(), Some(t) if t.kind == TokenKind::Command("right".to_string()))
                {
                    self.advance();
                    self.advance();
                } else {
                    let span = self.current_span();
                    self.record(ParseError::Expected("\\right".to_string(), span));
                }
                inner
            }
            "sum" | "prod" | "int" | "lim" => self.big_operator(word),
            _ => {
                if let Some(glyph) = greek_glyph(word) {
                    Term::var(glyph)
                } else if canonical_op(&TokenKind::Command(word.to_string())).is_some() {
                    // An operator command in atom position is a
                    // grammar error, not a variable.
                    self.record(ParseError::UnexpectedToken(format!("\\{}", word), span));
                    self.error_hole()
                } else {
                    Term::var(word)
                }
            }
        }
    }

    /// `\sum`, `\prod`, `\int`, `\lim`: optional subscript and
    /// superscript groups, then the summand/integrand, all applied to
    /// the operator head.
    fn big_operator(&mut self, word: &str) -> Rc<Term> {
        let head = match word {
            "sum" => "sum",
            "prod" => "prod",
            "int" => "integral",
            _ => "lim",
        };
        let mut term = Term::var(head);
        if self.eat_symbol('_') {
            let lower = if self.eat_symbol('{') {
                let t = self.expr();
                self.expect_symbol('}', "`}` closing the subscript");
                t
            } else {
                self.atom()
            };
            term = Term::app(term, lower);
        }
        if self.eat_symbol('^') {
            let upper = if self.eat_symbol('{') {
                let t = self.expr();
                self.expect_symbol('}', "`}` closing the superscript");
                t
            } else {
                self.atom()
            };
            term = Term::app(term, upper);
        }
        let operand = self.multiplicative();
        Term::app(term, operand)
    }

    fn braced_group(&mut self, what: &str) -> Rc<Term> {
        if self.eat_symbol('{') {
            let inner = self.expr();
            self.expect_symbol('}', &format!("`}}` closing {}", what));
            inner
        } else {
            let span = self.current_span();
            self.record(ParseError::Expected(format!("`{{` after {}", what), span));
            self.error_hole()
        }
    }

    fn braced_ident(&mut self, what: &str) -> Option<String> {
        if !self.eat_symbol('{') {
            let span = self.current_span();
            self.record(ParseError::Expected(format!("`{{` after {}", what), span));
            return None;
        }
        let name = match self.peek() {
            Some(Token {
                kind: TokenKind::Ident(n),
                ..
            }) => {
                let n = n.clone();
                self.advance();
                Some(n)
            }
            _ => {
                let span = self.current_span();
                self.record(ParseError::Expected(
                    format!("a name inside {}", what),
                    span,
                ));
                None
            }
        };
        self.expect_symbol('}', &format!("`}}` closing {}", what));
        name
    }
}

/// Fold a simple subscript into the base variable's name: `x_1`
/// becomes the variable `x_1`. A structured subscript, or one on a
/// non-variable base, becomes an application so the consumed input
/// still shows up in the result.
fn merge_subscript(base: Rc<Term>, sub: Rc<Term>) -> Rc<Term> {
    if let Term::Var(name) = &*base {
        match &*sub {
            Term::Var(s) => return Term::var(format!("{}_{}", name, s)),
            Term::Literal(_, v) => return Term::var(format!("{}_{}", name, v)),
            _ => {}
        }
    }
    Term::app(base, sub)
}

/// Fixed domain-name table consulted before an identifier falls back
/// to a free variable.
fn domain_name(name: &str) -> Option<Rc<Term>> {
    match name {
        "N" | "ℕ" | "Nat" => Some(Term::var("ℕ")),
        "Z" | "ℤ" | "Int" => Some(Term::var("ℤ")),
        "R" | "ℝ" | "Real" => Some(Term::var("ℝ")),
        "C" | "ℂ" | "Complex" => Some(Term::var("ℂ")),
        "true" => Some(Term::bool_lit(true)),
        "false" => Some(Term::bool_lit(false)),
        "Prop" => Some(Term::prop()),
        "Type" => Some(Term::type_at(0)),
        _ => None,
    }
}

/// Canonical spelling of an operator token, covering both the
/// Unicode glyphs and their LaTeX command forms.
fn canonical_op(kind: &TokenKind) -> Option<&'static str> {
    match kind {
        TokenKind::Ident(s) => match s.as_str() {
            "∀" => Some("∀"),
            "∃" => Some("∃"),
            "∈" => Some("∈"),
            "∉" => Some("∉"),
            "⊆" => Some("⊆"),
            "≤" => Some("≤"),
            "≥" => Some("≥"),
            "∧" => Some("∧"),
            "∨" => Some("∨"),
            "¬" => Some("¬"),
            "→" | "⇒" => Some("→"),
            "↔" | "⇔" => Some("↔"),
            "≡" => Some("≡"),
            "·" | "×" => Some("*"),
            "mod" => Some("mod"),
            _ => None,
        },
        TokenKind::Command(c) => match c.as_str() {
            "forall" => Some("∀"),
            "exists" => Some("∃"),
            "in" => Some("∈"),
            "notin" => Some("∉"),
            "subseteq" | "subset" => Some("⊆"),
            "leq" | "le" => Some("≤"),
            "geq" | "ge" => Some("≥"),
            "land" | "wedge" => Some("∧"),
            "lor" | "vee" => Some("∨"),
            "neg" | "lnot" => Some("¬"),
            "to" | "rightarrow" | "implies" | "Rightarrow" => Some("→"),
            "iff" | "leftrightarrow" | "Leftrightarrow" => Some("↔"),
            "equiv" | "cong" => Some("≡"),
            "cdot" | "times" => Some("*"),
            "bmod" => Some("mod"),
            _ => None,
        },
        TokenKind::Symbol(c) => match c {
            '+' => Some("+"),
            '-' => Some("-"),
            '*' => Some("*"),
            '/' => Some("/"),
            '^' => Some("^"),
            '=' => Some("="),
            '<' => Some("<"),
            '>' => Some(">"),
            _ => None,
        },
        TokenKind::Number(_) => None,
    }
}

fn greek_glyph(word: &str) -> Option<&'static str> {
    let glyph = match word {
        "alpha" => "α",
        "beta" => "β",
        "gamma" => "γ",
        "delta" => "δ",
        "epsilon" | "varepsilon" => "ε",
        "zeta" => "ζ",
        "eta" => "η",
        "theta" => "θ",
        "iota" => "ι",
        "kappa" => "κ",
        "lambda" => "λ",
        "mu" => "μ",
        "nu" => "ν",
        "xi" => "ξ",
        "pi" => "π",
        "rho" => "ρ",
        "sigma" => "σ",
        "tau" => "τ",
        "upsilon" => "υ",
        "phi" | "varphi" => "φ",
        "chi" => "χ",
        "psi" => "ψ",
        "omega" => "ω",
        "Gamma" => "Γ",
        "Delta" => "Δ",
        "Theta" => "Θ",
        "Lambda" => "Λ",
        "Xi" => "Ξ",
        "Pi" => "Π",
        "Sigma" => "Σ",
        "Phi" => "Φ",
        "Psi" => "Ψ",
        "Omega" => "Ω",
        _ => return None,
    };
    Some(glyph)
}

fn render_token(kind: &TokenKind) -> String {
    match kind {
        TokenKind::Number(n) => n.clone(),
        TokenKind::Command(c) => format!("\\{}", c),
        TokenKind::Ident(i) => i.clone(),
        TokenKind::Symbol(s) => s.to_string(),
    }
}
