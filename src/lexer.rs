use std::iter::Peekable;
use std::ops::Range;
use std::str::CharIndices;

/// Block-level tokens. Field lines are never tokenized; the parser slices
/// their raw text out of the source using token spans.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Ident(String),
    LBrace, // {
    RBrace, // }
    Symbol(char),
    Eof,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub span: Range<usize>,
}

/// Characters that may appear in identifiers: table names, field names and
/// reference targets all share this rule.
pub fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

pub struct Lexer<'a> {
    input: &'a str,
    chars: Peekable<CharIndices<'a>>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.char_indices().peekable(),
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(&(_, c)) = self.chars.peek() {
            if c.is_whitespace() {
                self.chars.next();
            } else {
                break;
            }
        }
    }

    fn read_ident(&mut self, start: usize) -> (String, usize) {
        let mut end = self.input.len();
        while let Some(&(i, c)) = self.chars.peek() {
            if is_ident_char(c) {
                self.chars.next();
            } else {
                end = i;
                break;
            }
        }
        (self.input[start..end].to_string(), end)
    }

    pub fn next_token(&mut self) -> Spanned {
        self.skip_whitespace();

        let (start, c) = match self.chars.next() {
            Some(next) => next,
            None => {
                let end = self.input.len();
                return Spanned {
                    token: Token::Eof,
                    span: end..end,
                };
            }
        };

        let single = |token| Spanned {
            token,
            span: start..start + c.len_utf8(),
        };

        match c {
            '{' => single(Token::LBrace),
            '}' => single(Token::RBrace),
            c if is_ident_char(c) => {
                let (name, end) = self.read_ident(start);
                Spanned {
                    token: Token::Ident(name),
                    span: start..end,
                }
            }
            c => single(Token::Symbol(c)),
        }
    }

    pub fn tokenize(mut self) -> Vec<Spanned> {
        let mut tokens = Vec::new();
        loop {
            let tok = self.next_token();
            let done = tok.token == Token::Eof;
            tokens.push(tok);
            if done {
                break;
            }
        }
        tokens
    }
}
