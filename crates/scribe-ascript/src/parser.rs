//! Recursive-descent parser with Pratt-style binary expressions.
//!
//! Parsing is fail-fast: the first mismatch is returned and no partial tree is built.
//!
//! Nesting is bounded by [`MAX_NESTING`]. Blocks, `else if` chains, groups, call arguments,
//! unary operands and each operator folded into a binary chain count as one level, which keeps
//! the recursion of the parser, the highlighting visitor and the tree's destructor shallow.

use crate::ast::{
    BinaryOp, Block, ElseClause, Expr, ExprKind, FunctionDecl, Location, ParamType, Parameter,
    Program, Stmt, StmtKind, Symbol, UnaryOp,
};
use crate::error::{ParseError, Production};
use crate::token::{Token, TokenKind};

type ParseResult<T> = Result<T, ParseError>;

/// Deepest nesting the parser accepts before failing with [`ParseError::NestingTooDeep`].
pub const MAX_NESTING: usize = 128;

/// Build a [`Program`] from a token sequence.
pub fn parse(tokens: &[Token]) -> ParseResult<Program> {
    if let Some(token) = tokens.iter().find(|t| t.kind == TokenKind::Error) {
        return Err(ParseError::Lexical {
            offset: token.span.start,
        });
    }

    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let mut statements = Vec::new();
    while !parser.at_end() {
        statements.push(parser.statement()?);
    }
    Ok(Program { statements })
}

fn binary_op(kind: TokenKind) -> Option<BinaryOp> {
    let op = match kind {
        TokenKind::OrOr => BinaryOp::Or,
        TokenKind::AndAnd => BinaryOp::And,
        TokenKind::EqualEqual => BinaryOp::Equal,
        TokenKind::NotEqual => BinaryOp::NotEqual,
        TokenKind::Less => BinaryOp::Less,
        TokenKind::LessEqual => BinaryOp::LessEqual,
        TokenKind::Greater => BinaryOp::Greater,
        TokenKind::GreaterEqual => BinaryOp::GreaterEqual,
        TokenKind::Plus => BinaryOp::Add,
        TokenKind::Minus => BinaryOp::Subtract,
        TokenKind::Star => BinaryOp::Multiply,
        TokenKind::Slash => BinaryOp::Divide,
        TokenKind::Percent => BinaryOp::Remainder,
        _ => return None,
    };
    Some(op)
}

struct Parser<'t> {
    tokens: &'t [Token],
    pos: usize,
    depth: usize,
}

impl<'t> Parser<'t> {
    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn peek_kind(&self) -> Option<TokenKind> {
        self.tokens.get(self.pos).map(|t| t.kind)
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek_kind() == Some(kind)
    }

    /// Character offset of the current token, or the end of the last token at end of input.
    fn offset(&self) -> usize {
        match self.tokens.get(self.pos) {
            Some(token) => token.span.start,
            None => self.tokens.last().map_or(0, |t| t.span.end),
        }
    }

    /// Enter one nesting level at the current token. Callers step back out with
    /// `self.depth -= 1`; on error the parser is abandoned, so no unwinding is needed.
    fn descend(&mut self) -> ParseResult<()> {
        if self.depth >= MAX_NESTING {
            return Err(ParseError::NestingTooDeep {
                limit: MAX_NESTING,
                offset: self.offset(),
            });
        }
        self.depth += 1;
        Ok(())
    }

    /// Consume the current token if it has kind `kind`.
    fn eat(&mut self, kind: TokenKind) -> Option<usize> {
        if self.check(kind) {
            self.pos += 1;
            Some(self.pos - 1)
        } else {
            None
        }
    }

    /// Consume a token of kind `kind` and return its index.
    fn expect(&mut self, kind: TokenKind) -> ParseResult<usize> {
        self.eat(kind).ok_or_else(|| ParseError::ExpectedToken {
            expected: kind,
            found: self.peek_kind(),
            offset: self.offset(),
        })
    }

    fn symbol(&mut self) -> ParseResult<Symbol> {
        let index = self.expect(TokenKind::Identifier)?;
        Ok(self.symbol_at(index))
    }

    fn symbol_at(&self, index: usize) -> Symbol {
        Symbol {
            name: self.tokens[index].value.clone().unwrap_or_default(),
            location: Location::token(index),
        }
    }

    fn statement(&mut self) -> ParseResult<Stmt> {
        let start = self.pos;
        let Some(kind) = self.peek_kind() else {
            return Err(ParseError::ExpectedExpression {
                expected: Production::Statement,
                offset: self.offset(),
            });
        };

        let kind = match kind {
            TokenKind::Var => {
                self.pos += 1;
                let symbol = self.symbol()?;
                self.expect(TokenKind::Assign)?;
                let expr = self.expression()?;
                self.expect(TokenKind::Semicolon)?;
                StmtKind::VarDeclaration { symbol, expr }
            }
            TokenKind::If => return self.if_statement(),
            TokenKind::While => {
                self.pos += 1;
                let condition = self.expression()?;
                let block = self.block()?;
                StmtKind::While { condition, block }
            }
            TokenKind::Print => {
                self.pos += 1;
                let expr = self.expression()?;
                self.expect(TokenKind::Semicolon)?;
                StmtKind::Print(expr)
            }
            TokenKind::Return => {
                self.pos += 1;
                let expr = if self.check(TokenKind::Semicolon) {
                    None
                } else {
                    Some(self.expression()?)
                };
                self.expect(TokenKind::Semicolon)?;
                StmtKind::Return(expr)
            }
            TokenKind::Func => {
                self.pos += 1;
                StmtKind::FuncDeclaration(self.function_decl()?)
            }
            TokenKind::Proc => {
                self.pos += 1;
                StmtKind::ProcDeclaration(self.function_decl()?)
            }
            TokenKind::LeftBrace => StmtKind::Block(self.block()?),
            _ if self.starts_expression() => return self.expression_statement(),
            _ => {
                return Err(ParseError::ExpectedExpression {
                    expected: Production::Statement,
                    offset: self.offset(),
                });
            }
        };

        Ok(Stmt {
            kind,
            location: Location::new(start, self.pos - 1),
        })
    }

    fn if_statement(&mut self) -> ParseResult<Stmt> {
        let start = self.expect(TokenKind::If)?;
        let condition = self.expression()?;
        let then_block = self.block()?;

        let else_clause = match self.eat(TokenKind::Else) {
            Some(keyword) => {
                let body = if self.check(TokenKind::If) {
                    self.descend()?;
                    let body = self.if_statement()?;
                    self.depth -= 1;
                    body
                } else {
                    let block = self.block()?;
                    Stmt {
                        location: block.location,
                        kind: StmtKind::Block(block),
                    }
                };
                Some(ElseClause {
                    keyword,
                    body: Box::new(body),
                })
            }
            None => None,
        };

        Ok(Stmt {
            kind: StmtKind::If {
                condition,
                then_block,
                else_clause,
            },
            location: Location::new(start, self.pos - 1),
        })
    }

    /// Assignment or procedure call; anything else is an unexpected expression.
    fn expression_statement(&mut self) -> ParseResult<Stmt> {
        let start = self.pos;
        let target = self.expression()?;

        let unexpected = self.unexpected(&target);

        let kind = if self.eat(TokenKind::Assign).is_some() {
            let ExprKind::Symbol(symbol) = target.kind else {
                return Err(unexpected);
            };
            let expr = self.expression()?;
            self.expect(TokenKind::Semicolon)?;
            StmtKind::Assignment { symbol, expr }
        } else {
            let ExprKind::Call { symbol, arguments } = target.kind else {
                return Err(unexpected);
            };
            self.expect(TokenKind::Semicolon)?;
            StmtKind::ProcCall { symbol, arguments }
        };

        Ok(Stmt {
            kind,
            location: Location::new(start, self.pos - 1),
        })
    }

    fn unexpected(&self, expr: &Expr) -> ParseError {
        ParseError::UnexpectedExpression {
            location: expr.location,
            offset: self.tokens[expr.location.start].span.start,
        }
    }

    fn block(&mut self) -> ParseResult<Block> {
        self.descend()?;
        let open = self.expect(TokenKind::LeftBrace)?;
        let mut statements = Vec::new();
        while !self.at_end() && !self.check(TokenKind::RightBrace) {
            statements.push(self.statement()?);
        }
        let close = self.expect(TokenKind::RightBrace)?;
        self.depth -= 1;
        Ok(Block {
            statements,
            location: Location::new(open, close),
        })
    }

    /// `name ( params? ) block`, after the `func`/`proc` keyword.
    fn function_decl(&mut self) -> ParseResult<FunctionDecl> {
        let symbol = self.symbol()?;
        self.expect(TokenKind::LeftParen)?;
        let mut parameters = Vec::new();
        if !self.check(TokenKind::RightParen) {
            loop {
                parameters.push(self.parameter()?);
                if self.eat(TokenKind::Comma).is_none() {
                    break;
                }
            }
        }
        self.expect(TokenKind::RightParen)?;
        let block = self.block()?;
        Ok(FunctionDecl {
            symbol,
            parameters,
            block,
        })
    }

    fn parameter(&mut self) -> ParseResult<Parameter> {
        let symbol = self.symbol()?;
        self.expect(TokenKind::Colon)?;
        let ty = match self.peek_kind() {
            Some(TokenKind::BoolType) => ParamType::Bool,
            Some(TokenKind::StringType) => ParamType::String,
            Some(TokenKind::NumberType) => ParamType::Number,
            _ => {
                return Err(ParseError::ExpectedExpression {
                    expected: Production::ParameterType,
                    offset: self.offset(),
                });
            }
        };
        self.pos += 1;
        Ok(Parameter {
            symbol,
            ty,
            type_location: Location::token(self.pos - 1),
        })
    }

    fn arguments(&mut self) -> ParseResult<(Vec<Expr>, usize)> {
        let mut arguments = Vec::new();
        if !self.check(TokenKind::RightParen) {
            loop {
                arguments.push(self.expression()?);
                if self.eat(TokenKind::Comma).is_none() {
                    break;
                }
            }
        }
        let close = self.expect(TokenKind::RightParen)?;
        Ok((arguments, close))
    }

    fn starts_expression(&self) -> bool {
        matches!(
            self.peek_kind(),
            Some(
                TokenKind::Identifier
                    | TokenKind::Number
                    | TokenKind::String
                    | TokenKind::True
                    | TokenKind::False
                    | TokenKind::LeftParen
                    | TokenKind::Minus
                    | TokenKind::Bang
            )
        )
    }

    fn expression(&mut self) -> ParseResult<Expr> {
        self.binary(1)
    }

    /// Pratt loop: fold operators whose precedence is at least `min_precedence`.
    fn binary(&mut self, min_precedence: u8) -> ParseResult<Expr> {
        let depth = self.depth;
        let mut left = self.unary()?;

        while let Some(op) = self.peek_kind().and_then(binary_op) {
            let precedence = op.precedence();
            if precedence < min_precedence {
                break;
            }
            // Every fold makes the tree one level deeper on the left.
            self.descend()?;
            let op_token = self.pos;
            self.pos += 1;
            let right = self.binary(precedence + 1)?;
            let location = left.location.to(right.location);
            left = Expr {
                kind: ExprKind::Binary {
                    left: Box::new(left),
                    op,
                    op_token,
                    right: Box::new(right),
                },
                location,
            };
        }

        self.depth = depth;
        Ok(left)
    }

    fn unary(&mut self) -> ParseResult<Expr> {
        let op = match self.peek_kind() {
            Some(TokenKind::Minus) => UnaryOp::Negate,
            Some(TokenKind::Bang) => UnaryOp::Not,
            _ => return self.primary(),
        };
        self.descend()?;
        let start = self.pos;
        self.pos += 1;
        let expr = self.unary()?;
        self.depth -= 1;
        Ok(Expr {
            location: Location::new(start, expr.location.end),
            kind: ExprKind::Unary {
                op,
                expr: Box::new(expr),
            },
        })
    }

    fn primary(&mut self) -> ParseResult<Expr> {
        let start = self.pos;
        let tokens = self.tokens;
        let Some(token) = tokens.get(start) else {
            return Err(ParseError::ExpectedExpression {
                expected: Production::Expression,
                offset: self.offset(),
            });
        };

        let kind = match token.kind {
            TokenKind::Number => ExprKind::Number(token.value.clone().unwrap_or_default()),
            TokenKind::String => ExprKind::String(token.value.clone().unwrap_or_default()),
            TokenKind::True => ExprKind::Boolean(true),
            TokenKind::False => ExprKind::Boolean(false),
            TokenKind::Identifier => {
                self.pos += 1;
                let symbol = self.symbol_at(start);
                if self.eat(TokenKind::LeftParen).is_none() {
                    return Ok(Expr {
                        kind: ExprKind::Symbol(symbol),
                        location: Location::token(start),
                    });
                }
                self.descend()?;
                let (arguments, close) = self.arguments()?;
                self.depth -= 1;
                return Ok(Expr {
                    kind: ExprKind::Call { symbol, arguments },
                    location: Location::new(start, close),
                });
            }
            TokenKind::LeftParen => {
                self.descend()?;
                self.pos += 1;
                let inner = self.expression()?;
                let close = self.expect(TokenKind::RightParen)?;
                self.depth -= 1;
                return Ok(Expr {
                    kind: ExprKind::Grouping(Box::new(inner)),
                    location: Location::new(start, close),
                });
            }
            _ => {
                return Err(ParseError::ExpectedExpression {
                    expected: Production::Expression,
                    offset: token.span.start,
                });
            }
        };

        self.pos += 1;
        Ok(Expr {
            kind,
            location: Location::token(start),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;

    fn parse_text(text: &str) -> ParseResult<Program> {
        parse(&Lexer::new().unwrap().tokenize(text))
    }

    #[test]
    fn test_precedence_and_associativity() {
        let program = parse_text("var x = 1 - 2 - 3 * 4;").unwrap();
        let StmtKind::VarDeclaration { expr, .. } = &program.statements[0].kind else {
            panic!("expected var declaration");
        };

        // (1 - 2) - (3 * 4)
        let ExprKind::Binary { left, op, right, .. } = &expr.kind else {
            panic!("expected binary expression");
        };
        assert_eq!(*op, BinaryOp::Subtract);
        assert!(matches!(left.kind, ExprKind::Binary { op: BinaryOp::Subtract, .. }));
        assert!(matches!(right.kind, ExprKind::Binary { op: BinaryOp::Multiply, .. }));
        assert_eq!(expr.location, Location::new(3, 9));
    }

    #[test]
    fn test_unary_binds_tighter_than_binary() {
        let program = parse_text("print -a + !b;").unwrap();
        let StmtKind::Print(expr) = &program.statements[0].kind else {
            panic!("expected print");
        };
        let ExprKind::Binary { left, right, .. } = &expr.kind else {
            panic!("expected binary expression");
        };
        assert!(matches!(left.kind, ExprKind::Unary { op: UnaryOp::Negate, .. }));
        assert!(matches!(right.kind, ExprKind::Unary { op: UnaryOp::Not, .. }));
    }

    #[test]
    fn test_missing_semicolon_at_end() {
        assert_eq!(
            parse_text("print 1"),
            Err(ParseError::ExpectedToken {
                expected: TokenKind::Semicolon,
                found: None,
                offset: 7,
            })
        );
    }

    #[test]
    fn test_else_if_chain() {
        let program = parse_text("if a { } else if b { } else { }").unwrap();
        let StmtKind::If { else_clause, .. } = &program.statements[0].kind else {
            panic!("expected if");
        };
        let clause = else_clause.as_ref().unwrap();
        assert_eq!(clause.keyword, 4);
        assert!(matches!(
            clause.body.kind,
            StmtKind::If {
                else_clause: Some(_),
                ..
            }
        ));
        assert_eq!(program.statements[0].location, Location::new(0, 11));
    }

    fn nesting_error(text: &str) -> ParseError {
        match parse_text(text) {
            Err(err @ ParseError::NestingTooDeep { .. }) => err,
            other => panic!("expected nesting error, got {other:?}"),
        }
    }

    #[test]
    fn test_nesting_up_to_the_limit_parses() {
        let n = MAX_NESTING;
        let text = format!("print {}1{};", "(".repeat(n), ")".repeat(n));
        assert!(parse_text(&text).is_ok());

        let text = format!("print {}1;", "-".repeat(n));
        assert!(parse_text(&text).is_ok());
    }

    #[test]
    fn test_nested_groups_and_unary_chains_are_bounded() {
        let n = MAX_NESTING + 10;
        // `print ` is six characters; the first rejected token follows MAX_NESTING accepted ones.
        let offset = 6 + MAX_NESTING;

        let text = format!("print {}1{};", "(".repeat(n), ")".repeat(n));
        assert_eq!(
            nesting_error(&text),
            ParseError::NestingTooDeep {
                limit: MAX_NESTING,
                offset
            }
        );

        let text = format!("print {}1;", "!".repeat(n));
        assert_eq!(nesting_error(&text).offset(), offset);
    }

    #[test]
    fn test_nested_blocks_and_calls_are_bounded() {
        let n = MAX_NESTING + 1;
        let text = format!("{}{}", "{".repeat(n), "}".repeat(n));
        assert_eq!(nesting_error(&text).offset(), MAX_NESTING);

        let text = format!("print {}1{};", "f(".repeat(n), ")".repeat(n));
        nesting_error(&text);

        let text = format!("if a {{ }}{}", " else if a { }".repeat(n));
        nesting_error(&text);
    }

    #[test]
    fn test_long_operator_chains_are_bounded() {
        let ok = format!("print 1{};", " + 1".repeat(MAX_NESTING));
        assert!(parse_text(&ok).is_ok());

        let too_long = format!("print 1{};", " + 1".repeat(MAX_NESTING + 1));
        let err = nesting_error(&too_long);
        // The rejected `+` is the last one.
        assert_eq!(err.offset(), 7 + 4 * MAX_NESTING + 1);
    }
}
