//! Recursive-descent XPath parser

use crate::ast::{ArithOp, Axis, CompareOp, Expr, Function, LocationPath, NodeTest, Step};
use crate::lexer::{tokenize, Spanned, Token};
use crate::XPathError;

/// Parse an expression into a syntax tree
pub(crate) fn parse(input: &str) -> Result<Expr, XPathError> {
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Err(XPathError::Empty);
    }

    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.parse_or()?;
    if let Some((offset, token)) = parser.tokens.get(parser.pos) {
        return Err(XPathError::UnexpectedToken {
            offset: *offset,
            found: token.to_string(),
        });
    }
    Ok(expr)
}

struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.peek_at(0)
    }

    fn peek_at(&self, n: usize) -> Option<&Token> {
        self.tokens.get(self.pos + n).map(|(_, t)| t)
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    fn at_keyword(&self, keyword: &str) -> bool {
        matches!(self.peek(), Some(Token::Name(n)) if n == keyword)
    }

    fn error(&self) -> XPathError {
        match self.tokens.get(self.pos) {
            Some((offset, token)) => XPathError::UnexpectedToken {
                offset: *offset,
                found: token.to_string(),
            },
            None => XPathError::UnexpectedEnd,
        }
    }

    fn expect(&mut self, expected: Token) -> Result<(), XPathError> {
        if self.peek() == Some(&expected) {
            self.advance();
            Ok(())
        } else {
            Err(self.error())
        }
    }

    fn parse_or(&mut self) -> Result<Expr, XPathError> {
        let mut left = self.parse_and()?;
        while self.at_keyword("or") {
            self.advance();
            let right = self.parse_and()?;
            left = Expr::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, XPathError> {
        let mut left = self.parse_equality()?;
        while self.at_keyword("and") {
            self.advance();
            let right = self.parse_equality()?;
            left = Expr::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_equality(&mut self) -> Result<Expr, XPathError> {
        let mut left = self.parse_relational()?;
        loop {
            let op = match self.peek() {
                Some(Token::Eq) => CompareOp::Eq,
                Some(Token::NotEq) => CompareOp::NotEq,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_relational()?;
            left = Expr::Compare(op, Box::new(left), Box::new(right));
        }
    }

    fn parse_relational(&mut self) -> Result<Expr, XPathError> {
        let mut left = self.parse_additive()?;
        loop {
            let op = match self.peek() {
                Some(Token::Lt) => CompareOp::Lt,
                Some(Token::LtEq) => CompareOp::LtEq,
                Some(Token::Gt) => CompareOp::Gt,
                Some(Token::GtEq) => CompareOp::GtEq,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_additive()?;
            left = Expr::Compare(op, Box::new(left), Box::new(right));
        }
    }

    fn parse_additive(&mut self) -> Result<Expr, XPathError> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => ArithOp::Add,
                Some(Token::Minus) => ArithOp::Sub,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_unary()?;
            left = Expr::Arith(op, Box::new(left), Box::new(right));
        }
    }

    fn parse_unary(&mut self) -> Result<Expr, XPathError> {
        if self.peek() == Some(&Token::Minus) {
            self.advance();
            return Ok(Expr::Negate(Box::new(self.parse_unary()?)));
        }
        self.parse_union()
    }

    fn parse_union(&mut self) -> Result<Expr, XPathError> {
        let mut left = self.parse_path()?;
        while self.peek() == Some(&Token::Pipe) {
            self.advance();
            let right = self.parse_path()?;
            left = Expr::Union(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn starts_step(token: Option<&Token>) -> bool {
        matches!(
            token,
            Some(Token::Dot | Token::DotDot | Token::At | Token::Star | Token::Name(_))
        )
    }

    fn parse_path(&mut self) -> Result<Expr, XPathError> {
        match self.peek() {
            Some(Token::Slash) => {
                self.advance();
                let steps = if Self::starts_step(self.peek()) {
                    self.parse_relative_steps()?
                } else {
                    Vec::new()
                };
                Ok(Expr::Path(LocationPath { absolute: true, steps }))
            }
            Some(Token::DoubleSlash) => {
                self.advance();
                let mut steps = vec![Step::descendant_or_self()];
                steps.extend(self.parse_relative_steps()?);
                Ok(Expr::Path(LocationPath { absolute: true, steps }))
            }
            Some(Token::LParen | Token::Literal(_) | Token::Number(_)) => self.parse_filter(),
            Some(Token::Name(name))
                if self.peek_at(1) == Some(&Token::LParen) && NodeTest::node_type(name).is_none() =>
            {
                self.parse_filter()
            }
            _ => {
                let steps = self.parse_relative_steps()?;
                Ok(Expr::Path(LocationPath { absolute: false, steps }))
            }
        }
    }

    fn parse_filter(&mut self) -> Result<Expr, XPathError> {
        let primary = self.parse_primary()?;
        let predicates = self.parse_predicates()?;

        let mut steps = Vec::new();
        loop {
            match self.peek() {
                Some(Token::Slash) => {
                    self.advance();
                    steps.push(self.parse_step()?);
                }
                Some(Token::DoubleSlash) => {
                    self.advance();
                    steps.push(Step::descendant_or_self());
                    steps.push(self.parse_step()?);
                }
                _ => break,
            }
        }

        if predicates.is_empty() && steps.is_empty() {
            return Ok(primary);
        }
        Ok(Expr::Filter {
            primary: Box::new(primary),
            predicates,
            steps,
        })
    }

    fn parse_relative_steps(&mut self) -> Result<Vec<Step>, XPathError> {
        let mut steps = vec![self.parse_step()?];
        loop {
            match self.peek() {
                Some(Token::Slash) => {
                    self.advance();
                    steps.push(self.parse_step()?);
                }
                Some(Token::DoubleSlash) => {
                    self.advance();
                    steps.push(Step::descendant_or_self());
                    steps.push(self.parse_step()?);
                }
                _ => return Ok(steps),
            }
        }
    }

    fn parse_step(&mut self) -> Result<Step, XPathError> {
        let axis = match (self.peek(), self.peek_at(1)) {
            (Some(Token::Dot), _) => {
                self.advance();
                return Ok(Step {
                    axis: Axis::SelfAxis,
                    test: NodeTest::Node,
                    predicates: self.parse_predicates()?,
                });
            }
            (Some(Token::DotDot), _) => {
                self.advance();
                return Ok(Step {
                    axis: Axis::Parent,
                    test: NodeTest::Node,
                    predicates: self.parse_predicates()?,
                });
            }
            (Some(Token::At), _) => {
                self.advance();
                Axis::Attribute
            }
            (Some(Token::Name(name)), Some(Token::DoubleColon)) => {
                let axis = Axis::parse(name).ok_or_else(|| XPathError::UnsupportedAxis(name.clone()))?;
                self.advance();
                self.advance();
                axis
            }
            _ => Axis::Child,
        };

        let test = self.parse_node_test()?;
        let predicates = self.parse_predicates()?;
        Ok(Step { axis, test, predicates })
    }

    fn parse_node_test(&mut self) -> Result<NodeTest, XPathError> {
        match self.peek() {
            Some(Token::Star) => {
                self.advance();
                Ok(NodeTest::Any)
            }
            Some(Token::Name(name)) => {
                let name = name.clone();
                self.advance();
                if self.peek() == Some(&Token::LParen) {
                    let test = NodeTest::node_type(&name).ok_or_else(|| self.error())?;
                    self.advance();
                    self.expect(Token::RParen)?;
                    Ok(test)
                } else {
                    Ok(NodeTest::Name(name))
                }
            }
            _ => Err(self.error()),
        }
    }

    fn parse_predicates(&mut self) -> Result<Vec<Expr>, XPathError> {
        let mut predicates = Vec::new();
        while self.peek() == Some(&Token::LBracket) {
            self.advance();
            predicates.push(self.parse_or()?);
            self.expect(Token::RBracket)?;
        }
        Ok(predicates)
    }

    fn parse_primary(&mut self) -> Result<Expr, XPathError> {
        let expr = match self.peek() {
            Some(Token::LParen) => {
                self.advance();
                let inner = self.parse_or()?;
                self.expect(Token::RParen)?;
                return Ok(inner);
            }
            Some(Token::Literal(s)) => Expr::Literal(s.clone()),
            Some(Token::Number(n)) => Expr::Number(*n),
            Some(Token::Name(name)) => {
                let name = name.clone();
                return self.parse_call(name);
            }
            _ => return Err(self.error()),
        };
        self.advance();
        Ok(expr)
    }

    fn parse_call(&mut self, name: String) -> Result<Expr, XPathError> {
        let function = Function::parse(&name).ok_or_else(|| XPathError::UnknownFunction(name.clone()))?;
        self.advance(); // name
        self.expect(Token::LParen)?;

        let mut args = Vec::new();
        if self.peek() != Some(&Token::RParen) {
            loop {
                args.push(self.parse_or()?);
                if self.peek() == Some(&Token::Comma) {
                    self.advance();
                } else {
                    break;
                }
            }
        }
        self.expect(Token::RParen)?;

        let (min, max) = function.arity();
        if args.len() < min || max.is_some_and(|max| args.len() > max) {
            let expected = match max {
                Some(max) if max == min => min.to_string(),
                Some(max) => format!("{}..={}", min, max),
                None => format!("{} or more", min),
            };
            return Err(XPathError::ArityMismatch {
                name,
                expected,
                found: args.len(),
            });
        }
        Ok(Expr::Call(function, args))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_abbreviated_descendant() {
        let expr = parse("//li").expect("parse");
        let Expr::Path(path) = expr else {
            panic!("expected path");
        };
        assert!(path.absolute);
        assert_eq!(path.steps.len(), 2);
        assert_eq!(path.steps[0].axis, Axis::DescendantOrSelf);
        assert_eq!(path.steps[1].test, NodeTest::Name("li".into()));
    }

    #[test]
    fn test_root_only() {
        assert_eq!(
            parse("/").expect("parse"),
            Expr::Path(LocationPath { absolute: true, steps: vec![] })
        );
    }

    #[test]
    fn test_predicate_with_and() {
        let expr = parse(r#"//input[@type="text" and @name="q"]"#).expect("parse");
        let Expr::Path(path) = expr else {
            panic!("expected path");
        };
        assert!(matches!(path.steps[1].predicates[0], Expr::And(_, _)));
    }

    #[test]
    fn test_filter_expression() {
        let expr = parse("(//li)[2]").expect("parse");
        assert!(matches!(expr, Expr::Filter { ref predicates, .. } if predicates.len() == 1));
    }

    #[test]
    fn test_text_node_test_is_not_a_function() {
        let expr = parse("//p/text()").expect("parse");
        let Expr::Path(path) = expr else {
            panic!("expected path");
        };
        assert_eq!(path.steps[2].test, NodeTest::Text);
    }

    #[test]
    fn test_errors() {
        assert_eq!(parse(""), Err(XPathError::Empty));
        assert_eq!(parse("//a["), Err(XPathError::UnexpectedEnd));
        assert_eq!(parse("//a[frob(1)]"), Err(XPathError::UnknownFunction("frob".into())));
        assert_eq!(parse("following::a"), Err(XPathError::UnsupportedAxis("following".into())));
        assert!(matches!(
            parse("//a[contains(@x)]"),
            Err(XPathError::ArityMismatch { found: 1, .. })
        ));
        assert!(matches!(parse("//a]"), Err(XPathError::UnexpectedToken { offset: 3, .. })));
    }
}
