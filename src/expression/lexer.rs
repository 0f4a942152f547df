use crate::expression::error::ExprError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Span {
    pub(crate) start: usize,
    pub(crate) end: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Token {
    pub(crate) kind: TokenKind,
    pub(crate) span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TokenKind {
    Ident(String),
    Number(f64),
    True,
    False,
    Return,

    LBrace,
    RBrace,
    LParen,
    RParen,
    Comma,
    Dot,
    Semicolon,

    Plus,
    Minus,
    Star,
    Slash,
    Percent,

    Bang,

    EqEq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,

    AndAnd,
    OrOr,

    Question,
    Colon,

    Eof,
}

struct Cursor<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            bytes: src.as_bytes(),
            pos: 0,
        }
    }

    fn peek_at(&self, ahead: usize) -> Option<u8> {
        self.bytes.get(self.pos + ahead).copied()
    }

    fn eat_while(&mut self, pred: impl Fn(u8) -> bool) {
        while self.peek_at(0).is_some_and(&pred) {
            self.pos += 1;
        }
    }

    fn number(&mut self, start: usize) -> Result<TokenKind, ExprError> {
        self.eat_while(|b| b.is_ascii_digit());
        if self.peek_at(0) == Some(b'.') && self.peek_at(1).is_some_and(|b| b.is_ascii_digit()) {
            self.pos += 1;
            self.eat_while(|b| b.is_ascii_digit());
        }

        if matches!(self.peek_at(0), Some(b'e' | b'E')) {
            let e_pos = self.pos;
            self.pos += 1;
            if matches!(self.peek_at(0), Some(b'+' | b'-')) {
                self.pos += 1;
            }
            let digits = self.pos;
            self.eat_while(|b| b.is_ascii_digit());
            if digits == self.pos {
                return Err(ExprError::new(
                    e_pos,
                    "invalid number exponent (expected digits)",
                ));
            }
        }

        self.src[start..self.pos]
            .parse()
            .map(TokenKind::Number)
            .map_err(|_| ExprError::new(start, "invalid number"))
    }

    fn word(&mut self, start: usize) -> TokenKind {
        self.eat_while(|b| b.is_ascii_alphanumeric() || b == b'_');
        match &self.src[start..self.pos] {
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            "return" => TokenKind::Return,
            s => TokenKind::Ident(s.to_owned()),
        }
    }

    fn operator(&mut self, start: usize) -> Result<TokenKind, ExprError> {
        let two = self.src.get(self.pos..self.pos + 2).and_then(|two| match two {
            "&&" => Some(TokenKind::AndAnd),
            "||" => Some(TokenKind::OrOr),
            "==" => Some(TokenKind::EqEq),
            "!=" => Some(TokenKind::Ne),
            "<=" => Some(TokenKind::Le),
            ">=" => Some(TokenKind::Ge),
            _ => None,
        });
        if let Some(kind) = two {
            self.pos += 2;
            return Ok(kind);
        }

        let c = self.src[self.pos..].chars().next().unwrap_or('\0');
        let kind = match c {
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            ',' => TokenKind::Comma,
            '.' => TokenKind::Dot,
            ';' => TokenKind::Semicolon,
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '%' => TokenKind::Percent,
            '!' => TokenKind::Bang,
            '<' => TokenKind::Lt,
            '>' => TokenKind::Gt,
            '?' => TokenKind::Question,
            ':' => TokenKind::Colon,
            _ => {
                return Err(ExprError::new(start, format!("unexpected character '{c}'")));
            }
        };
        self.pos += 1;
        Ok(kind)
    }
}

pub(crate) fn lex(input: &str) -> Result<Vec<Token>, ExprError> {
    let mut out = Vec::new();
    let mut cur = Cursor::new(input);

    while let Some(b) = cur.peek_at(0) {
        if b.is_ascii_whitespace() {
            cur.pos += 1;
            continue;
        }

        let start = cur.pos;
        let kind = if b.is_ascii_digit()
            || (b == b'.' && cur.peek_at(1).is_some_and(|n| n.is_ascii_digit()))
        {
            cur.number(start)?
        } else if b.is_ascii_alphabetic() || b == b'_' {
            cur.word(start)
        } else {
            cur.operator(start)?
        };
        out.push(Token {
            kind,
            span: Span {
                start,
                end: cur.pos,
            },
        });
    }

    out.push(Token {
        kind: TokenKind::Eof,
        span: Span {
            start: input.len(),
            end: input.len(),
        },
    });

    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/expression/lexer.rs"]
mod tests;
