//! Evaluator for the query subset understood by the in-memory store.
//!
//! ```text
//! query      := SELECT ( '*' | VALUE path ) FROM alias [ WHERE or ]
//! or         := and ( OR and )*
//! and        := unary ( AND unary )*
//! unary      := NOT unary | '(' or ')' | operand cmp operand
//! operand    := path | literal | @param
//! path       := alias ( '.' field )*
//! cmp        := '=' | '!=' | '<' | '<=' | '>' | '>='
//! ```
//!
//! Keywords are case-insensitive. A comparison touching an undefined path is
//! false, and `SELECT VALUE` skips documents where the path is undefined.

use crate::model::QueryDefinition;
use serde_json::Value;
use std::cmp::Ordering;

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    Param(String),
    Str(String),
    Num(f64),
    Star,
    Dot,
    LParen,
    RParen,
    Cmp(CmpOp),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

#[derive(Debug, Clone, PartialEq)]
enum Operand {
    Path(Vec<String>),
    Literal(Value),
    Param(String),
}

#[derive(Debug, Clone, PartialEq)]
enum Expr {
    Compare(Operand, CmpOp, Operand),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Not(Box<Expr>),
}

#[derive(Debug, Clone, PartialEq)]
enum Projection {
    All,
    Value(Vec<String>),
}

/// A parsed, parameter-checked query.
#[derive(Debug, Clone)]
pub(crate) struct CompiledQuery {
    projection: Projection,
    filter: Option<Expr>,
    parameters: Vec<(String, Value)>,
}

impl CompiledQuery {
    pub(crate) fn compile(query: &QueryDefinition) -> Result<Self, String> {
        let tokens = tokenize(query.text())?;
        let mut parser = Parser { tokens, pos: 0 };
        let (projection, filter) = parser.parse_select()?;

        let compiled = Self {
            projection,
            filter,
            parameters: query.parameters().to_vec(),
        };
        if let Some(filter) = &compiled.filter {
            compiled.check_params(filter)?;
        }
        Ok(compiled)
    }

    /// Applies the filter and projection to one document.
    pub(crate) fn apply(&self, doc: &Value) -> Option<Value> {
        if let Some(filter) = &self.filter {
            if !self.eval(filter, doc) {
                return None;
            }
        }
        match &self.projection {
            Projection::All => Some(doc.clone()),
            Projection::Value(path) => resolve(doc, path).cloned(),
        }
    }

    fn check_params(&self, expr: &Expr) -> Result<(), String> {
        let check = |operand: &Operand| match operand {
            Operand::Param(name) if self.param(name).is_none() => {
                Err(format!("parameter {name} is not bound"))
            }
            _ => Ok(()),
        };
        match expr {
            Expr::Compare(left, _, right) => {
                check(left)?;
                check(right)
            }
            Expr::And(l, r) | Expr::Or(l, r) => {
                self.check_params(l)?;
                self.check_params(r)
            }
            Expr::Not(inner) => self.check_params(inner),
        }
    }

    fn param(&self, name: &str) -> Option<&Value> {
        self.parameters
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    fn operand<'a>(&'a self, operand: &'a Operand, doc: &'a Value) -> Option<&'a Value> {
        match operand {
            Operand::Path(path) => resolve(doc, path),
            Operand::Literal(value) => Some(value),
            Operand::Param(name) => self.param(name),
        }
    }

    fn eval(&self, expr: &Expr, doc: &Value) -> bool {
        match expr {
            Expr::Compare(left, op, right) => {
                match (self.operand(left, doc), self.operand(right, doc)) {
                    (Some(l), Some(r)) => compare(l, *op, r),
                    _ => false,
                }
            }
            Expr::And(l, r) => self.eval(l, doc) && self.eval(r, doc),
            Expr::Or(l, r) => self.eval(l, doc) || self.eval(r, doc),
            Expr::Not(inner) => !self.eval(inner, doc),
        }
    }
}

fn resolve<'a>(doc: &'a Value, path: &[String]) -> Option<&'a Value> {
    path.iter().try_fold(doc, |value, field| value.get(field))
}

fn compare(left: &Value, op: CmpOp, right: &Value) -> bool {
    let ordering = match (left, right) {
        (Value::Number(l), Value::Number(r)) => match (l.as_f64(), r.as_f64()) {
            (Some(l), Some(r)) => l.partial_cmp(&r),
            _ => None,
        },
        (Value::String(l), Value::String(r)) => Some(l.cmp(r)),
        (Value::Bool(l), Value::Bool(r)) => Some(l.cmp(r)),
        (Value::Null, Value::Null) => Some(Ordering::Equal),
        _ => None,
    };

    match (op, ordering) {
        (CmpOp::Eq, Some(ord)) => ord == Ordering::Equal,
        (CmpOp::Eq, None) => left == right,
        (CmpOp::Ne, Some(ord)) => ord != Ordering::Equal,
        (CmpOp::Ne, None) => left != right,
        (_, None) => false,
        (CmpOp::Lt, Some(ord)) => ord == Ordering::Less,
        (CmpOp::Le, Some(ord)) => ord != Ordering::Greater,
        (CmpOp::Gt, Some(ord)) => ord == Ordering::Greater,
        (CmpOp::Ge, Some(ord)) => ord != Ordering::Less,
    }
}

fn tokenize(text: &str) -> Result<Vec<Token>, String> {
    let chars: Vec<char> = text.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            c if c.is_whitespace() => i += 1,
            '*' => {
                tokens.push(Token::Star);
                i += 1;
            }
            '.' => {
                tokens.push(Token::Dot);
                i += 1;
            }
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            '=' => {
                tokens.push(Token::Cmp(CmpOp::Eq));
                i += 1;
            }
            '!' if chars.get(i + 1) == Some(&'=') => {
                tokens.push(Token::Cmp(CmpOp::Ne));
                i += 2;
            }
            '<' => {
                if chars.get(i + 1) == Some(&'=') {
                    tokens.push(Token::Cmp(CmpOp::Le));
                    i += 2;
                } else {
                    tokens.push(Token::Cmp(CmpOp::Lt));
                    i += 1;
                }
            }
            '>' => {
                if chars.get(i + 1) == Some(&'=') {
                    tokens.push(Token::Cmp(CmpOp::Ge));
                    i += 2;
                } else {
                    tokens.push(Token::Cmp(CmpOp::Gt));
                    i += 1;
                }
            }
            '\'' | '"' => {
                let quote = c;
                let mut literal = String::new();
                i += 1;
                loop {
                    match chars.get(i) {
                        None => return Err("unterminated string literal".to_string()),
                        Some('\\') => {
                            let escaped = chars
                                .get(i + 1)
                                .ok_or_else(|| "unterminated string literal".to_string())?;
                            literal.push(*escaped);
                            i += 2;
                        }
                        Some(&ch) if ch == quote => {
                            i += 1;
                            break;
                        }
                        Some(&ch) => {
                            literal.push(ch);
                            i += 1;
                        }
                    }
                }
                tokens.push(Token::Str(literal));
            }
            '@' => {
                let start = i;
                i += 1;
                while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                if i == start + 1 {
                    return Err("empty parameter name".to_string());
                }
                tokens.push(Token::Param(chars[start..i].iter().collect()));
            }
            c if c.is_ascii_digit()
                || (c == '-' && chars.get(i + 1).is_some_and(char::is_ascii_digit)) =>
            {
                let start = i;
                i += 1;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                let raw: String = chars[start..i].iter().collect();
                let num = raw
                    .parse::<f64>()
                    .map_err(|_| format!("invalid number literal `{raw}`"))?;
                tokens.push(Token::Num(num));
            }
            c if c.is_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                tokens.push(Token::Ident(chars[start..i].iter().collect()));
            }
            other => return Err(format!("unexpected character `{other}`")),
        }
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn parse_select(&mut self) -> Result<(Projection, Option<Expr>), String> {
        self.expect_keyword("SELECT")?;

        let projection = if self.eat(&Token::Star) {
            Projection::All
        } else if self.eat_keyword("VALUE") {
            Projection::Value(self.parse_raw_path()?)
        } else {
            return Err("expected `*` or `VALUE` after SELECT".to_string());
        };

        self.expect_keyword("FROM")?;
        let alias = match self.next() {
            Some(Token::Ident(name)) if !is_keyword(&name) => name,
            _ => return Err("expected container alias after FROM".to_string()),
        };

        let projection = match projection {
            Projection::Value(path) => Projection::Value(strip_alias(path, &alias)?),
            Projection::All => Projection::All,
        };

        let filter = if self.eat_keyword("WHERE") {
            Some(self.parse_or(&alias)?)
        } else {
            None
        };

        if let Some(token) = self.peek() {
            return Err(format!("unexpected token {token:?}"));
        }
        Ok((projection, filter))
    }

    fn parse_or(&mut self, alias: &str) -> Result<Expr, String> {
        let mut expr = self.parse_and(alias)?;
        while self.eat_keyword("OR") {
            let rhs = self.parse_and(alias)?;
            expr = Expr::Or(Box::new(expr), Box::new(rhs));
        }
        Ok(expr)
    }

    fn parse_and(&mut self, alias: &str) -> Result<Expr, String> {
        let mut expr = self.parse_unary(alias)?;
        while self.eat_keyword("AND") {
            let rhs = self.parse_unary(alias)?;
            expr = Expr::And(Box::new(expr), Box::new(rhs));
        }
        Ok(expr)
    }

    fn parse_unary(&mut self, alias: &str) -> Result<Expr, String> {
        if self.eat_keyword("NOT") {
            return Ok(Expr::Not(Box::new(self.parse_unary(alias)?)));
        }
        if self.eat(&Token::LParen) {
            let inner = self.parse_or(alias)?;
            if !self.eat(&Token::RParen) {
                return Err("expected `)`".to_string());
            }
            return Ok(inner);
        }

        let left = self.parse_operand(alias)?;
        let op = match self.next() {
            Some(Token::Cmp(op)) => op,
            _ => return Err("expected a comparison operator".to_string()),
        };
        let right = self.parse_operand(alias)?;
        Ok(Expr::Compare(left, op, right))
    }

    fn parse_operand(&mut self, alias: &str) -> Result<Operand, String> {
        match self.peek().cloned() {
            Some(Token::Str(s)) => {
                self.pos += 1;
                Ok(Operand::Literal(Value::String(s)))
            }
            Some(Token::Num(n)) => {
                self.pos += 1;
                serde_json::Number::from_f64(n)
                    .map(|n| Operand::Literal(Value::Number(n)))
                    .ok_or_else(|| format!("invalid number literal `{n}`"))
            }
            Some(Token::Param(name)) => {
                self.pos += 1;
                Ok(Operand::Param(name))
            }
            Some(Token::Ident(word)) if word.eq_ignore_ascii_case("true") => {
                self.pos += 1;
                Ok(Operand::Literal(Value::Bool(true)))
            }
            Some(Token::Ident(word)) if word.eq_ignore_ascii_case("false") => {
                self.pos += 1;
                Ok(Operand::Literal(Value::Bool(false)))
            }
            Some(Token::Ident(word)) if word.eq_ignore_ascii_case("null") => {
                self.pos += 1;
                Ok(Operand::Literal(Value::Null))
            }
            Some(Token::Ident(_)) => {
                let path = self.parse_raw_path()?;
                Ok(Operand::Path(strip_alias(path, alias)?))
            }
            Some(other) => Err(format!("unexpected token {other:?}")),
            None => Err("unexpected end of query".to_string()),
        }
    }

    /// Parses `ident ( '.' ident )*`, alias included.
    fn parse_raw_path(&mut self) -> Result<Vec<String>, String> {
        let mut path = Vec::new();
        match self.next() {
            Some(Token::Ident(name)) if !is_keyword(&name) => path.push(name),
            _ => return Err("expected a property path".to_string()),
        }
        while self.eat(&Token::Dot) {
            match self.next() {
                Some(Token::Ident(name)) => path.push(name),
                _ => return Err("expected a property name after `.`".to_string()),
            }
        }
        Ok(path)
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        match self.peek() {
            Some(Token::Ident(word)) if word.eq_ignore_ascii_case(keyword) => {
                self.pos += 1;
                true
            }
            _ => false,
        }
    }

    fn expect_keyword(&mut self, keyword: &str) -> Result<(), String> {
        if self.eat_keyword(keyword) {
            Ok(())
        } else {
            Err(format!("expected {keyword}"))
        }
    }
}

const KEYWORDS: [&str; 10] = [
    "SELECT", "VALUE", "FROM", "WHERE", "AND", "OR", "NOT", "TRUE", "FALSE", "NULL",
];

fn is_keyword(word: &str) -> bool {
    KEYWORDS.iter().any(|k| k.eq_ignore_ascii_case(word))
}

fn strip_alias(mut path: Vec<String>, alias: &str) -> Result<Vec<String>, String> {
    if path.first().map(String::as_str) != Some(alias) {
        return Err(format!(
            "property path `{}` must start with alias `{alias}`",
            path.join(".")
        ));
    }
    path.remove(0);
    Ok(path)
}
