/// Recursive descent parser for SQL/JSON path expressions.
///
/// Grammar (simplified):
///   path       = ("lax" | "strict")? expr
///   expr       = and ("||" and)*
///   and        = cmp ("&&" cmp)*
///   cmp        = add (cmpop add | "starts" "with" add
///                    | "like_regex" STRING ("flag" STRING)?)?
///                ("is" "unknown")*
///   add        = mul (("+" | "-") mul)*
///   mul        = unary (("*" | "/" | "%") unary)*
///   unary      = ("+" | "-" | "!") unary | postfix
///   postfix    = primary accessor*
///   accessor   = "." (key | "*" | "**" bounds? | method "(" args ")")
///              | "[" "*" "]" | "[" subscripts "]" | "?" "(" expr ")"
///   primary    = "$" | "@" | "$name" | "last" | literal | "(" expr ")"
///              | "exists" "(" expr ")"
use anyhow::{Result, bail};

use super::lexer::Token;
use super::{ArithOp, CmpOp, Method, Mode, Node, NodeKind, Path, Subscript, UNBOUNDED};

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

pub fn parse(tokens: &[Token]) -> Result<Path> {
    let mut parser = Parser { tokens, pos: 0 };
    let mode = match parser.peek() {
        Some(Token::Lax) => {
            parser.advance();
            Mode::Lax
        }
        Some(Token::Strict) => {
            parser.advance();
            Mode::Strict
        }
        _ => Mode::Lax,
    };
    let root = parser.parse_expr()?;
    if let Some(tok) = parser.peek() {
        bail!("unexpected {tok:?} after end of path expression");
    }
    Ok(Path { mode, root })
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek2(&self) -> Option<&Token> {
        self.tokens.get(self.pos + 1)
    }

    fn advance(&mut self) -> Option<&Token> {
        let tok = self.tokens.get(self.pos);
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn expect(&mut self, expected: &Token) -> Result<()> {
        match self.advance() {
            Some(tok) if tok == expected => Ok(()),
            Some(tok) => bail!("expected {expected:?}, got {tok:?}"),
            None => bail!("expected {expected:?}, got end of input"),
        }
    }

    // expr = and ("||" and)*
    fn parse_expr(&mut self) -> Result<Node> {
        let mut left = self.parse_and()?;
        while self.peek() == Some(&Token::OrOr) {
            self.advance();
            let right = self.parse_and()?;
            left = Node::new(NodeKind::Or(Box::new(left), Box::new(right)));
        }
        Ok(left)
    }

    // and = cmp ("&&" cmp)*
    fn parse_and(&mut self) -> Result<Node> {
        let mut left = self.parse_cmp()?;
        while self.peek() == Some(&Token::AndAnd) {
            self.advance();
            let right = self.parse_cmp()?;
            left = Node::new(NodeKind::And(Box::new(left), Box::new(right)));
        }
        Ok(left)
    }

    fn parse_cmp(&mut self) -> Result<Node> {
        let left = self.parse_add()?;
        let op = match self.peek() {
            Some(Token::Eq) => Some(CmpOp::Eq),
            Some(Token::Ne) => Some(CmpOp::Ne),
            Some(Token::Lt) => Some(CmpOp::Lt),
            Some(Token::Le) => Some(CmpOp::Le),
            Some(Token::Gt) => Some(CmpOp::Gt),
            Some(Token::Ge) => Some(CmpOp::Ge),
            _ => None,
        };
        let mut node = if let Some(op) = op {
            self.advance();
            let right = self.parse_add()?;
            Node::new(NodeKind::Compare(op, Box::new(left), Box::new(right)))
        } else if self.peek() == Some(&Token::Starts) {
            self.advance();
            self.expect(&Token::With)?;
            let right = self.parse_add()?;
            Node::new(NodeKind::StartsWith(Box::new(left), Box::new(right)))
        } else if self.peek() == Some(&Token::LikeRegex) {
            self.advance();
            let pattern = match self.advance() {
                Some(Token::Str(s)) => s.clone(),
                Some(tok) => bail!("expected string pattern after like_regex, got {tok:?}"),
                None => bail!("expected string pattern after like_regex"),
            };
            let flags = if self.peek() == Some(&Token::Flag) {
                self.advance();
                match self.advance() {
                    Some(Token::Str(s)) => s.clone(),
                    Some(tok) => bail!("expected string after flag, got {tok:?}"),
                    None => bail!("expected string after flag"),
                }
            } else {
                String::new()
            };
            Node::new(NodeKind::LikeRegex {
                expr: Box::new(left),
                pattern,
                flags,
            })
        } else {
            left
        };
        while self.peek() == Some(&Token::Is) {
            self.advance();
            self.expect(&Token::Unknown)?;
            if !node.is_predicate() {
                bail!("operand of 'is unknown' must be a predicate");
            }
            node = Node::new(NodeKind::IsUnknown(Box::new(node)));
        }
        Ok(node)
    }

    // add = mul (("+" | "-") mul)*
    fn parse_add(&mut self) -> Result<Node> {
        let mut left = self.parse_mul()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => ArithOp::Add,
                Some(Token::Minus) => ArithOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_mul()?;
            left = Node::new(NodeKind::Arith(op, Box::new(left), Box::new(right)));
        }
        Ok(left)
    }

    // mul = unary (("*" | "/" | "%") unary)*
    fn parse_mul(&mut self) -> Result<Node> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => ArithOp::Mul,
                Some(Token::Slash) => ArithOp::Div,
                Some(Token::Percent) => ArithOp::Mod,
                _ => break,
            };
            self.advance();
            let right = self.parse_unary()?;
            left = Node::new(NodeKind::Arith(op, Box::new(left), Box::new(right)));
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Node> {
        match self.peek() {
            Some(Token::Plus) => {
                self.advance();
                let operand = self.parse_unary()?;
                Ok(Node::new(NodeKind::Plus(Box::new(operand))))
            }
            Some(Token::Minus) => {
                self.advance();
                let operand = self.parse_unary()?;
                Ok(Node::new(NodeKind::Minus(Box::new(operand))))
            }
            Some(Token::Bang) => {
                self.advance();
                let operand = self.parse_unary()?;
                if !operand.is_predicate() {
                    bail!("operand of '!' must be a predicate");
                }
                Ok(Node::new(NodeKind::Not(Box::new(operand))))
            }
            _ => self.parse_postfix(),
        }
    }

    // postfix = primary accessor*
    fn parse_postfix(&mut self) -> Result<Node> {
        let mut node = self.parse_primary()?;
        loop {
            match self.peek() {
                Some(Token::Dot) => {
                    self.advance();
                    node.append(self.parse_dot_accessor()?);
                }
                Some(Token::LBrack) => {
                    self.advance();
                    node.append(self.parse_subscripts()?);
                }
                Some(Token::Question) => {
                    self.advance();
                    self.expect(&Token::LParen)?;
                    let pred = self.parse_expr()?;
                    self.expect(&Token::RParen)?;
                    if !pred.is_predicate() {
                        bail!("filter expression must be a predicate");
                    }
                    node.append(Node::new(NodeKind::Filter(Box::new(pred))));
                }
                _ => break,
            }
        }
        Ok(node)
    }

    /// Accessor after `.`: wildcard, recursive descent, key, or method.
    fn parse_dot_accessor(&mut self) -> Result<Node> {
        match self.peek() {
            Some(Token::Star) => {
                self.advance();
                Ok(Node::new(NodeKind::AnyKey))
            }
            Some(Token::StarStar) => {
                self.advance();
                let (first, last) = self.parse_any_bounds()?;
                Ok(Node::new(NodeKind::Any { first, last }))
            }
            Some(Token::Ident(name)) if self.peek2() == Some(&Token::LParen) => {
                let name = name.clone();
                self.advance();
                self.advance();
                let Some(method) = Method::from_name(&name) else {
                    bail!("unknown jsonpath item method .{name}()");
                };
                let args = self.parse_method_args()?;
                check_arity(method, &args)?;
                Ok(Node::new(NodeKind::Method(method, args)))
            }
            Some(Token::Str(name)) => {
                let name = name.clone();
                self.advance();
                Ok(Node::new(NodeKind::Key(name)))
            }
            Some(tok) => match key_name(tok) {
                Some(name) => {
                    self.advance();
                    Ok(Node::new(NodeKind::Key(name)))
                }
                None => bail!("expected key name or method after '.', got {tok:?}"),
            },
            None => bail!("expected key name or method after '.'"),
        }
    }

    /// Optional `{n}` / `{n to m}` depth bounds after `.**`.
    fn parse_any_bounds(&mut self) -> Result<(u32, u32)> {
        if self.peek() != Some(&Token::LBrace) {
            return Ok((0, UNBOUNDED));
        }
        self.advance();
        let first = self.parse_any_bound()?;
        let last = if self.peek() == Some(&Token::To) {
            self.advance();
            self.parse_any_bound()?
        } else {
            first
        };
        self.expect(&Token::RBrace)?;
        Ok((first, last))
    }

    fn parse_any_bound(&mut self) -> Result<u32> {
        match self.advance() {
            Some(Token::Int(n)) if *n >= 0 => Ok((*n).min(UNBOUNDED as i64) as u32),
            Some(Token::Last) => Ok(UNBOUNDED),
            Some(tok) => bail!("expected depth bound in '.**{{}}', got {tok:?}"),
            None => bail!("expected depth bound in '.**{{}}'"),
        }
    }

    fn parse_method_args(&mut self) -> Result<Vec<Node>> {
        let mut args = Vec::new();
        if self.peek() == Some(&Token::RParen) {
            self.advance();
            return Ok(args);
        }
        loop {
            args.push(self.parse_expr()?);
            match self.advance() {
                Some(Token::Comma) => continue,
                Some(Token::RParen) => break,
                Some(tok) => bail!("expected ',' or ')' in method arguments, got {tok:?}"),
                None => bail!("unterminated method argument list"),
            }
        }
        Ok(args)
    }

    /// Subscript list after `[`: either `*` or `expr (to expr)?` pairs.
    fn parse_subscripts(&mut self) -> Result<Node> {
        if self.peek() == Some(&Token::Star) {
            self.advance();
            self.expect(&Token::RBrack)?;
            return Ok(Node::new(NodeKind::AnyArray));
        }
        let mut subscripts = Vec::new();
        loop {
            let from = self.parse_expr()?;
            let to = if self.peek() == Some(&Token::To) {
                self.advance();
                Some(self.parse_expr()?)
            } else {
                None
            };
            subscripts.push(Subscript { from, to });
            match self.advance() {
                Some(Token::Comma) => continue,
                Some(Token::RBrack) => break,
                Some(tok) => bail!("expected ',' or ']' in array subscript, got {tok:?}"),
                None => bail!("unterminated array subscript"),
            }
        }
        Ok(Node::new(NodeKind::IndexArray(subscripts)))
    }

    fn parse_primary(&mut self) -> Result<Node> {
        let kind = match self.advance() {
            Some(Token::Dollar) => NodeKind::Root,
            Some(Token::At) => NodeKind::Current,
            Some(Token::Var(name)) => NodeKind::Variable(name.clone()),
            Some(Token::Last) => NodeKind::Last,
            Some(Token::Int(n)) => NodeKind::Int(*n),
            Some(Token::Numeric(s)) => NodeKind::Numeric(s.clone()),
            Some(Token::Str(s)) => NodeKind::String(s.clone()),
            Some(Token::True) => NodeKind::Bool(true),
            Some(Token::False) => NodeKind::Bool(false),
            Some(Token::Null) => NodeKind::Null,
            Some(Token::Exists) => {
                self.expect(&Token::LParen)?;
                let arg = self.parse_expr()?;
                self.expect(&Token::RParen)?;
                NodeKind::Exists(Box::new(arg))
            }
            Some(Token::LParen) => {
                let inner = self.parse_expr()?;
                self.expect(&Token::RParen)?;
                return Ok(inner);
            }
            Some(tok) => bail!("unexpected {tok:?} in path expression"),
            None => bail!("unexpected end of path expression"),
        };
        Ok(Node::new(kind))
    }
}

/// Keywords double as key names after `.` (e.g. `$.to`, `$.last`).
fn key_name(tok: &Token) -> Option<String> {
    let name = match tok {
        Token::Ident(s) => return Some(s.clone()),
        Token::Lax => "lax",
        Token::Strict => "strict",
        Token::True => "true",
        Token::False => "false",
        Token::Null => "null",
        Token::To => "to",
        Token::Last => "last",
        Token::Exists => "exists",
        Token::Is => "is",
        Token::Unknown => "unknown",
        Token::Starts => "starts",
        Token::With => "with",
        Token::LikeRegex => "like_regex",
        Token::Flag => "flag",
        _ => return None,
    };
    Some(name.to_string())
}

fn check_arity(method: Method, args: &[Node]) -> Result<()> {
    let max = match method {
        Method::Decimal => 2,
        Method::Time
        | Method::TimeTz
        | Method::Timestamp
        | Method::TimestampTz
        | Method::Datetime => 1,
        _ => 0,
    };
    if args.len() > max {
        bail!(
            ".{}() takes at most {max} argument{}",
            method.name(),
            if max == 1 { "" } else { "s" }
        );
    }
    Ok(())
}
