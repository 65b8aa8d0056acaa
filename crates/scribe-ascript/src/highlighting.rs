//! Highlighting visitor: maps the syntax tree back onto token spans.
//!
//! Pre-order per construct: a keyword comes before its children, an opening bracket before the
//! block body, the closing bracket after it. Absent optional children (no `else`, a bare
//! `return;`) emit nothing.

use crate::ast::{Block, Expr, ExprKind, FunctionDecl, ParamType, Program, Stmt, StmtKind, Symbol};
use crate::token::Token;
use scribe_lang::{HighlightCategory, HighlightToken, Keyword, Markup, TypeKind, ValueKind};

/// Emit the highlight tokens of `program`, which must have been parsed from `tokens`.
pub fn generate_highlighting(program: &Program, tokens: &[Token]) -> Vec<HighlightToken> {
    let mut visitor = HighlightingVisitor {
        tokens,
        out: Vec::with_capacity(tokens.len()),
    };
    for stmt in &program.statements {
        visitor.stmt(stmt);
    }
    visitor.out
}

struct HighlightingVisitor<'t> {
    tokens: &'t [Token],
    out: Vec<HighlightToken>,
}

impl HighlightingVisitor<'_> {
    fn emit(&mut self, index: usize, category: HighlightCategory) {
        // Locations always come from `tokens`; a mismatched pair just drops the token.
        if let Some(token) = self.tokens.get(index) {
            self.out.push(HighlightToken::new(token.span, category));
        }
    }

    fn keyword(&mut self, index: usize, keyword: Keyword) {
        self.emit(index, HighlightCategory::Keyword(keyword));
    }

    fn symbol(&mut self, symbol: &Symbol) {
        self.emit(
            symbol.location.start,
            HighlightCategory::SymbolName(symbol.name.clone()),
        );
    }

    fn stmt(&mut self, stmt: &Stmt) {
        let start = stmt.location.start;
        match &stmt.kind {
            StmtKind::VarDeclaration { symbol, expr } => {
                self.keyword(start, Keyword::Var);
                self.symbol(symbol);
                self.expr(expr);
            }
            StmtKind::Assignment { symbol, expr } => {
                self.symbol(symbol);
                self.expr(expr);
            }
            StmtKind::If {
                condition,
                then_block,
                else_clause,
            } => {
                self.keyword(start, Keyword::If);
                self.expr(condition);
                self.block(then_block);
                if let Some(clause) = else_clause {
                    self.keyword(clause.keyword, Keyword::Else);
                    self.stmt(&clause.body);
                }
            }
            StmtKind::While { condition, block } => {
                self.keyword(start, Keyword::While);
                self.expr(condition);
                self.block(block);
            }
            StmtKind::Block(block) => self.block(block),
            StmtKind::Print(expr) => {
                self.keyword(start, Keyword::Print);
                self.expr(expr);
            }
            StmtKind::Return(expr) => {
                self.keyword(start, Keyword::Return);
                if let Some(expr) = expr {
                    self.expr(expr);
                }
            }
            StmtKind::FuncDeclaration(decl) => {
                self.keyword(start, Keyword::Func);
                self.function(decl);
            }
            StmtKind::ProcDeclaration(decl) => {
                self.keyword(start, Keyword::Proc);
                self.function(decl);
            }
            StmtKind::ProcCall { symbol, arguments } => {
                self.symbol(symbol);
                for argument in arguments {
                    self.expr(argument);
                }
            }
        }
    }

    fn function(&mut self, decl: &FunctionDecl) {
        self.symbol(&decl.symbol);
        for parameter in &decl.parameters {
            self.symbol(&parameter.symbol);
            let ty = match parameter.ty {
                ParamType::Bool => TypeKind::Bool,
                ParamType::String => TypeKind::String,
                ParamType::Number => TypeKind::Number,
            };
            self.emit(parameter.type_location.start, HighlightCategory::Type(ty));
        }
        self.block(&decl.block);
    }

    fn block(&mut self, block: &Block) {
        self.emit(block.location.start, HighlightCategory::Markup(Markup::Bracket));
        for stmt in &block.statements {
            self.stmt(stmt);
        }
        self.emit(block.location.end, HighlightCategory::Markup(Markup::Bracket));
    }

    fn expr(&mut self, expr: &Expr) {
        let start = expr.location.start;
        match &expr.kind {
            ExprKind::Binary {
                left,
                op_token,
                right,
                ..
            } => {
                self.expr(left);
                self.emit(*op_token, HighlightCategory::Operator);
                self.expr(right);
            }
            ExprKind::Unary { expr, .. } => {
                self.emit(start, HighlightCategory::Operator);
                self.expr(expr);
            }
            ExprKind::Call { symbol, arguments } => {
                self.symbol(symbol);
                for argument in arguments {
                    self.expr(argument);
                }
            }
            ExprKind::Boolean(_) => self.emit(start, HighlightCategory::Value(ValueKind::Boolean)),
            ExprKind::Number(_) => self.emit(start, HighlightCategory::Value(ValueKind::Number)),
            ExprKind::String(_) => self.emit(start, HighlightCategory::Value(ValueKind::String)),
            ExprKind::Symbol(symbol) => self.symbol(symbol),
            ExprKind::Grouping(inner) => self.expr(inner),
        }
    }
}
