//! Lexer and recursive-descent parser for the expression language.
//!
//! Precedence (lowest to highest):
//!   or  →  and  →  not  →  comparison  →  additive  →
//!   multiplicative  →  unary  →  power  →  primary
//!
//! Comparisons chain (`a < b < c`) and `**` is right-associative and binds
//! tighter than a unary minus on its left, so `-2 ** 2` is `-4`.

use super::EvalError;
use super::value::Value;

/// Deepest nesting of parentheses and unary operators accepted.
const MAX_DEPTH: usize = 200;

/// Longest expression accepted, in tokens. Bounds the depth of left-leaning
/// operator chains, which the evaluator walks recursively.
const MAX_TOKENS: usize = 1024;

// ── Token ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Int(i64),
    Float(f64),
    Str(String),
    Ident(String),

    Plus,
    Minus,
    Star,
    DoubleStar,
    Slash,
    DoubleSlash,
    Percent,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    LParen,
    RParen,
    Comma,

    Eof,
}

// ── Lexer ─────────────────────────────────────────────────────────────────────

struct Lexer<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn new(src: &'a str) -> Self {
        Lexer { src, pos: 0 }
    }

    fn peek(&self) -> Option<u8> {
        self.src.as_bytes().get(self.pos).copied()
    }

    fn eat(&mut self, ch: u8) -> bool {
        if self.peek() == Some(ch) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn skip_digits(&mut self) {
        while matches!(self.peek(), Some(b'0'..=b'9')) {
            self.pos += 1;
        }
    }

    fn read_number(&mut self, start: usize) -> Result<Token, EvalError> {
        let mut is_float = self.src.as_bytes()[start] == b'.';
        self.skip_digits();
        if !is_float && self.peek() == Some(b'.') {
            is_float = true;
            self.pos += 1;
            self.skip_digits();
        }
        if matches!(self.peek(), Some(b'e' | b'E')) {
            let mark = self.pos;
            self.pos += 1;
            if matches!(self.peek(), Some(b'+' | b'-')) {
                self.pos += 1;
            }
            if matches!(self.peek(), Some(b'0'..=b'9')) {
                is_float = true;
                self.skip_digits();
            } else {
                self.pos = mark;
            }
        }

        let text = &self.src[start..self.pos];
        if is_float {
            text.parse()
                .map(Token::Float)
                .map_err(|_| EvalError::Syntax(format!("invalid number '{text}'")))
        } else {
            text.parse()
                .map(Token::Int)
                .map_err(|_| EvalError::Value(format!("integer literal too large: {text}")))
        }
    }

    fn read_string(&mut self, quote: u8) -> Result<Token, EvalError> {
        let mut s = String::new();
        let mut chars = self.src[self.pos..].char_indices();
        while let Some((i, c)) = chars.next() {
            match c {
                '\\' => match chars.next() {
                    Some((_, 'n')) => s.push('\n'),
                    Some((_, 't')) => s.push('\t'),
                    Some((_, c)) => s.push(c),
                    None => break,
                },
                c if c as u32 == u32::from(quote) => {
                    self.pos += i + 1;
                    return Ok(Token::Str(s));
                }
                c => s.push(c),
            }
        }
        Err(EvalError::Syntax("unterminated string literal".into()))
    }

    fn read_ident(&mut self, start: usize) -> Token {
        while matches!(
            self.peek(),
            Some(b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'_')
        ) {
            self.pos += 1;
        }
        Token::Ident(self.src[start..self.pos].to_string())
    }

    fn next_token(&mut self) -> Result<Token, EvalError> {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\r' | b'\n')) {
            self.pos += 1;
        }
        let start = self.pos;
        let Some(ch) = self.peek() else {
            return Ok(Token::Eof);
        };
        self.pos += 1;

        let tok = match ch {
            b'0'..=b'9' => return self.read_number(start),
            b'.' if matches!(self.peek(), Some(b'0'..=b'9')) => return self.read_number(start),
            b'"' | b'\'' => return self.read_string(ch),
            b'a'..=b'z' | b'A'..=b'Z' | b'_' => return Ok(self.read_ident(start)),
            b'+' => Token::Plus,
            b'-' => Token::Minus,
            b'*' if self.eat(b'*') => Token::DoubleStar,
            b'*' => Token::Star,
            b'/' if self.eat(b'/') => Token::DoubleSlash,
            b'/' => Token::Slash,
            b'%' => Token::Percent,
            b'=' if self.eat(b'=') => Token::Eq,
            b'!' if self.eat(b'=') => Token::Ne,
            b'<' if self.eat(b'=') => Token::Le,
            b'<' => Token::Lt,
            b'>' if self.eat(b'=') => Token::Ge,
            b'>' => Token::Gt,
            b'(' => Token::LParen,
            b')' => Token::RParen,
            b',' => Token::Comma,
            _ => {
                let c = self.src[start..].chars().next().unwrap_or('?');
                return Err(EvalError::Syntax(format!("unexpected character '{c}'")));
            }
        };
        Ok(tok)
    }

    fn tokenize(mut self) -> Result<Vec<Token>, EvalError> {
        let mut tokens = Vec::new();
        loop {
            let tok = self.next_token()?;
            if tok == Token::Eof {
                break;
            }
            if tokens.len() == MAX_TOKENS {
                return Err(EvalError::Syntax("expression is too long".into()));
            }
            tokens.push(tok);
        }
        Ok(tokens)
    }
}

// ── AST ───────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    FloorDiv,
    Rem,
    Pow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Pos,
    Not,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Value),
    Var(String),
    Unary(UnaryOp, Box<Expr>),
    Binary(BinOp, Box<Expr>, Box<Expr>),
    /// `first op1 e1 op2 e2 ...`, true when every adjacent pair holds.
    Compare(Box<Expr>, Vec<(CmpOp, Expr)>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Call(String, Vec<Expr>),
}

// ── Parser ────────────────────────────────────────────────────────────────────

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Parser {
            tokens,
            pos: 0,
            depth: 0,
        }
    }

    fn peek(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&Token::Eof)
    }

    fn advance(&mut self) -> Token {
        let t = self.tokens.get(self.pos).cloned().unwrap_or(Token::Eof);
        self.pos += 1;
        t
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == expected {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn eat_keyword(&mut self, word: &str) -> bool {
        if matches!(self.peek(), Token::Ident(w) if w == word) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn descend(&mut self) -> Result<(), EvalError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(EvalError::Syntax("expression is nested too deeply".into()));
        }
        Ok(())
    }

    // ── Grammar ───────────────────────────────────────────────────────────────

    fn parse_or(&mut self) -> Result<Expr, EvalError> {
        let mut lhs = self.parse_and()?;
        while self.eat_keyword("or") {
            let rhs = self.parse_and()?;
            lhs = Expr::Or(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_and(&mut self) -> Result<Expr, EvalError> {
        let mut lhs = self.parse_not()?;
        while self.eat_keyword("and") {
            let rhs = self.parse_not()?;
            lhs = Expr::And(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_not(&mut self) -> Result<Expr, EvalError> {
        if self.eat_keyword("not") {
            self.descend()?;
            let inner = self.parse_not()?;
            self.depth -= 1;
            return Ok(Expr::Unary(UnaryOp::Not, Box::new(inner)));
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> Result<Expr, EvalError> {
        let first = self.parse_additive()?;
        let mut rest = Vec::new();
        loop {
            let op = match self.peek() {
                Token::Eq => CmpOp::Eq,
                Token::Ne => CmpOp::Ne,
                Token::Lt => CmpOp::Lt,
                Token::Le => CmpOp::Le,
                Token::Gt => CmpOp::Gt,
                Token::Ge => CmpOp::Ge,
                _ => break,
            };
            self.pos += 1;
            rest.push((op, self.parse_additive()?));
        }
        if rest.is_empty() {
            Ok(first)
        } else {
            Ok(Expr::Compare(Box::new(first), rest))
        }
    }

    fn parse_additive(&mut self) -> Result<Expr, EvalError> {
        let mut lhs = self.parse_multiplicative()?;
        loop {
            let op = match self.peek() {
                Token::Plus => BinOp::Add,
                Token::Minus => BinOp::Sub,
                _ => break,
            };
            self.pos += 1;
            let rhs = self.parse_multiplicative()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, EvalError> {
        let mut lhs = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                Token::Star => BinOp::Mul,
                Token::Slash => BinOp::Div,
                Token::DoubleSlash => BinOp::FloorDiv,
                Token::Percent => BinOp::Rem,
                _ => break,
            };
            self.pos += 1;
            let rhs = self.parse_unary()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<Expr, EvalError> {
        let op = match self.peek() {
            Token::Minus => UnaryOp::Neg,
            Token::Plus => UnaryOp::Pos,
            _ => return self.parse_power(),
        };
        self.pos += 1;
        self.descend()?;
        let inner = self.parse_unary()?;
        self.depth -= 1;
        Ok(Expr::Unary(op, Box::new(inner)))
    }

    fn parse_power(&mut self) -> Result<Expr, EvalError> {
        let base = self.parse_primary()?;
        if self.eat(&Token::DoubleStar) {
            self.descend()?;
            let exp = self.parse_unary()?;
            self.depth -= 1;
            return Ok(Expr::Binary(BinOp::Pow, Box::new(base), Box::new(exp)));
        }
        Ok(base)
    }

    fn parse_primary(&mut self) -> Result<Expr, EvalError> {
        match self.advance() {
            Token::Int(n) => Ok(Expr::Literal(Value::Int(n))),
            Token::Float(x) => Ok(Expr::Literal(Value::Float(x))),
            Token::Str(s) => Ok(Expr::Literal(Value::Str(s))),
            Token::Ident(name) => match name.as_str() {
                "True" => Ok(Expr::Literal(Value::Bool(true))),
                "False" => Ok(Expr::Literal(Value::Bool(false))),
                "and" | "or" | "not" => Err(EvalError::Syntax(format!("unexpected '{name}'"))),
                _ if self.eat(&Token::LParen) => {
                    self.descend()?;
                    let mut args = Vec::new();
                    if self.peek() != &Token::RParen {
                        args.push(self.parse_or()?);
                        while self.eat(&Token::Comma) {
                            args.push(self.parse_or()?);
                        }
                    }
                    if !self.eat(&Token::RParen) {
                        return Err(EvalError::Syntax(format!(
                            "expected ')' after arguments to {name}"
                        )));
                    }
                    self.depth -= 1;
                    Ok(Expr::Call(name, args))
                }
                _ => Ok(Expr::Var(name)),
            },
            Token::LParen => {
                self.descend()?;
                let inner = self.parse_or()?;
                if !self.eat(&Token::RParen) {
                    return Err(EvalError::Syntax("expected ')'".into()));
                }
                self.depth -= 1;
                Ok(inner)
            }
            Token::Eof => Err(EvalError::Syntax("unexpected end of expression".into())),
            other => Err(EvalError::Syntax(format!("unexpected token {other:?}"))),
        }
    }
}

/// Parse a complete expression; trailing tokens are a syntax error.
pub fn parse(src: &str) -> Result<Expr, EvalError> {
    let tokens = Lexer::new(src).tokenize()?;
    let mut parser = Parser::new(tokens);
    let expr = parser.parse_or()?;
    if parser.peek() != &Token::Eof {
        return Err(EvalError::Syntax(format!(
            "unexpected token {:?}",
            parser.peek()
        )));
    }
    Ok(expr)
}
