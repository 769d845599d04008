//! XPath tokenizer

use crate::XPathError;

/// XPath token
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token {
    Slash,
    DoubleSlash,
    LBracket,
    RBracket,
    LParen,
    RParen,
    At,
    Comma,
    Dot,
    DotDot,
    Pipe,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Plus,
    Minus,
    Star,
    DoubleColon,
    Literal(String),
    Number(f64),
    Name(String),
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Slash => f.write_str("/"),
            Token::DoubleSlash => f.write_str("//"),
            Token::LBracket => f.write_str("["),
            Token::RBracket => f.write_str("]"),
            Token::LParen => f.write_str("("),
            Token::RParen => f.write_str(")"),
            Token::At => f.write_str("@"),
            Token::Comma => f.write_str(","),
            Token::Dot => f.write_str("."),
            Token::DotDot => f.write_str(".."),
            Token::Pipe => f.write_str("|"),
            Token::Eq => f.write_str("="),
            Token::NotEq => f.write_str("!="),
            Token::Lt => f.write_str("<"),
            Token::LtEq => f.write_str("<="),
            Token::Gt => f.write_str(">"),
            Token::GtEq => f.write_str(">="),
            Token::Plus => f.write_str("+"),
            Token::Minus => f.write_str("-"),
            Token::Star => f.write_str("*"),
            Token::DoubleColon => f.write_str("::"),
            Token::Literal(s) => write!(f, "\"{}\"", s),
            Token::Number(n) => write!(f, "{}", n),
            Token::Name(n) => f.write_str(n),
        }
    }
}

/// Token with its byte offset in the source
pub(crate) type Spanned = (usize, Token);

struct Lexer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn current(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek(&self, n: usize) -> Option<char> {
        self.input[self.pos..].chars().nth(n)
    }

    fn advance(&mut self) {
        if let Some(c) = self.current() {
            self.pos += c.len_utf8();
        }
    }

    fn skip_whitespace(&mut self) {
        while self.current().is_some_and(char::is_whitespace) {
            self.advance();
        }
    }

    fn consume_literal(&mut self, quote: char) -> Result<String, XPathError> {
        let start = self.pos;
        self.advance(); // opening quote
        let mut result = String::new();
        while let Some(c) = self.current() {
            self.advance();
            if c == quote {
                return Ok(result);
            }
            result.push(c);
        }
        Err(XPathError::UnterminatedLiteral { offset: start })
    }

    fn consume_number(&mut self) -> Result<f64, XPathError> {
        let start = self.pos;
        while self.current().is_some_and(|c| c.is_ascii_digit() || c == '.') {
            self.advance();
        }
        self.input[start..self.pos]
            .parse()
            .map_err(|_| XPathError::InvalidNumber {
                offset: start,
                text: self.input[start..self.pos].to_string(),
            })
    }

    fn consume_name(&mut self) -> String {
        let start = self.pos;
        while self
            .current()
            .is_some_and(|c| c.is_alphanumeric() || c == '-' || c == '_' || c == '.')
        {
            self.advance();
        }
        self.input[start..self.pos].to_string()
    }

    fn next_token(&mut self) -> Result<Option<Spanned>, XPathError> {
        self.skip_whitespace();
        let start = self.pos;
        let Some(c) = self.current() else {
            return Ok(None);
        };

        let two = |lexer: &mut Self, token: Token| {
            lexer.advance();
            lexer.advance();
            token
        };
        let one = |lexer: &mut Self, token: Token| {
            lexer.advance();
            token
        };

        let token = match c {
            '/' if self.peek(1) == Some('/') => two(self, Token::DoubleSlash),
            '/' => one(self, Token::Slash),
            '[' => one(self, Token::LBracket),
            ']' => one(self, Token::RBracket),
            '(' => one(self, Token::LParen),
            ')' => one(self, Token::RParen),
            '@' => one(self, Token::At),
            ',' => one(self, Token::Comma),
            '|' => one(self, Token::Pipe),
            '=' => one(self, Token::Eq),
            '!' if self.peek(1) == Some('=') => two(self, Token::NotEq),
            '<' if self.peek(1) == Some('=') => two(self, Token::LtEq),
            '<' => one(self, Token::Lt),
            '>' if self.peek(1) == Some('=') => two(self, Token::GtEq),
            '>' => one(self, Token::Gt),
            '+' => one(self, Token::Plus),
            '-' => one(self, Token::Minus),
            '*' => one(self, Token::Star),
            ':' if self.peek(1) == Some(':') => two(self, Token::DoubleColon),
            '.' if self.peek(1) == Some('.') => two(self, Token::DotDot),
            '.' if self.peek(1).is_some_and(|d| d.is_ascii_digit()) => {
                Token::Number(self.consume_number()?)
            }
            '.' => one(self, Token::Dot),
            '"' | '\'' => Token::Literal(self.consume_literal(c)?),
            d if d.is_ascii_digit() => Token::Number(self.consume_number()?),
            n if n.is_alphabetic() || n == '_' => Token::Name(self.consume_name()),
            other => {
                return Err(XPathError::UnexpectedChar {
                    offset: start,
                    found: other,
                });
            }
        };
        Ok(Some((start, token)))
    }
}

/// Split an expression into tokens
pub(crate) fn tokenize(input: &str) -> Result<Vec<Spanned>, XPathError> {
    let mut lexer = Lexer::new(input);
    let mut tokens = Vec::new();
    while let Some(token) = lexer.next_token()? {
        tokens.push(token);
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<Token> {
        tokenize(input)
            .expect("tokenize")
            .into_iter()
            .map(|(_, t)| t)
            .collect()
    }

    #[test]
    fn test_attribute_predicate() {
        assert_eq!(
            kinds(r#"//*[@data-testid="submit"]"#),
            vec![
                Token::DoubleSlash,
                Token::Star,
                Token::LBracket,
                Token::At,
                Token::Name("data-testid".into()),
                Token::Eq,
                Token::Literal("submit".into()),
                Token::RBracket,
            ]
        );
    }

    #[test]
    fn test_axis_and_numbers() {
        assert_eq!(
            kinds("following-sibling::li[1.5]"),
            vec![
                Token::Name("following-sibling".into()),
                Token::DoubleColon,
                Token::Name("li".into()),
                Token::LBracket,
                Token::Number(1.5),
                Token::RBracket,
            ]
        );
        assert_eq!(kinds("..//.")[..2], [Token::DotDot, Token::DoubleSlash]);
    }

    #[test]
    fn test_single_quoted_literal_keeps_double_quotes() {
        assert_eq!(kinds(r#"'say "hi"'"#), vec![Token::Literal(r#"say "hi""#.into())]);
    }

    #[test]
    fn test_unterminated_literal() {
        assert!(matches!(
            tokenize(r#"//a[@x="oops]"#),
            Err(XPathError::UnterminatedLiteral { offset: 7 })
        ));
    }

    #[test]
    fn test_unexpected_char() {
        assert!(matches!(
            tokenize("//a#b"),
            Err(XPathError::UnexpectedChar { found: '#', .. })
        ));
    }
}
