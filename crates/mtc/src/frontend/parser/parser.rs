//! Python recursive descent parser

use crate::common::{CheckError, CheckResult, Span};
use crate::frontend::ast::*;
use crate::frontend::lexer::{PyLexer, PyToken, PyTokenKind};

/// Python parser for the supported subset
pub struct PyParser<'a> {
    lexer: PyLexer<'a>,
    source: &'a str,
    /// End offset of the last consumed token
    prev_end: usize,
}

impl<'a> PyParser<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            lexer: PyLexer::new(source),
            source,
            prev_end: 0,
        }
    }

    /// Parse a complete module (file)
    pub fn parse_module(&mut self) -> CheckResult<Module> {
        let mut body = Vec::new();

        loop {
            if self.check(&PyTokenKind::Eof)? {
                break;
            }
            if self.match_token(&PyTokenKind::Newline)? {
                continue;
            }
            if self.check(&PyTokenKind::Indent)? {
                return Err(self.error_at_next("unexpected indent"));
            }
            body.extend(self.parse_statement()?);
        }

        Ok(Module::new(body, Span::new(0, self.source.len())))
    }

    // ==================== Statements ====================

    fn parse_statement(&mut self) -> CheckResult<Vec<Stmt>> {
        let token = self.lexer.peek()?.clone();
        match &token.kind {
            PyTokenKind::Def => Ok(vec![self.parse_function_def()?]),
            PyTokenKind::Class => Ok(vec![self.parse_class_def()?]),
            PyTokenKind::At => Err(CheckError::parser(
                "unsupported syntax: decorators",
                token.span,
                token.line,
            )),
            kind if kind.is_unsupported_keyword() => Err(CheckError::parser(
                format!("unsupported syntax: '{}' statement", kind),
                token.span,
                token.line,
            )),
            _ => self.parse_simple_line(),
        }
    }

    /// One physical line of `;`-separated simple statements
    fn parse_simple_line(&mut self) -> CheckResult<Vec<Stmt>> {
        let mut stmts = vec![self.parse_small_stmt()?];
        while self.match_token(&PyTokenKind::Semi)? {
            if self.check(&PyTokenKind::Newline)? {
                break;
            }
            stmts.push(self.parse_small_stmt()?);
        }
        self.expect(PyTokenKind::Newline)?;
        Ok(stmts)
    }

    fn parse_small_stmt(&mut self) -> CheckResult<Stmt> {
        let start = self.lexer.peek()?.clone();

        let kind = match &start.kind {
            PyTokenKind::Pass => {
                self.advance()?;
                StmtKind::Pass
            }
            PyTokenKind::Return => {
                self.advance()?;
                if self.check(&PyTokenKind::Newline)? || self.check(&PyTokenKind::Semi)? {
                    StmtKind::Return(None)
                } else {
                    StmtKind::Return(Some(self.parse_expr()?))
                }
            }
            PyTokenKind::Import => self.parse_import()?,
            PyTokenKind::From => self.parse_from_import()?,
            kind if kind.is_unsupported_keyword() => {
                return Err(CheckError::parser(
                    format!("unsupported syntax: '{}' statement", kind),
                    start.span,
                    start.line,
                ));
            }
            _ => self.parse_expr_stmt()?,
        };

        Ok(Stmt::new(kind, Span::new(start.span.start, self.prev_end), start.line))
    }

    /// Expression statement, assignment, annotated or augmented assignment
    fn parse_expr_stmt(&mut self) -> CheckResult<StmtKind> {
        let target = self.parse_expr()?;

        if self.check(&PyTokenKind::Colon)? {
            let colon = self.advance()?;
            Self::check_target(&target, "illegal target for annotation", colon.line)?;
            let annotation = self.parse_annotation()?;
            let value = if self.match_token(&PyTokenKind::Eq)? {
                Some(self.parse_expr()?)
            } else {
                None
            };
            return Ok(StmtKind::AnnAssign { target, annotation, value });
        }

        if self.check(&PyTokenKind::Eq)? {
            let eq = self.advance()?;
            Self::check_target(&target, "cannot assign to expression here", eq.line)?;
            let value = self.parse_expr()?;
            if self.check(&PyTokenKind::Eq)? {
                return Err(self.error_at_next("unsupported syntax: chained assignment"));
            }
            return Ok(StmtKind::Assign { target, value });
        }

        if let Some(op) = self.peek_augmented_op()? {
            let token = self.advance()?;
            Self::check_target(&target, "'expression' is an illegal expression for augmented assignment", token.line)?;
            let value = self.parse_expr()?;
            let span = target.span.to(value.span);
            let line = target.line;
            let value = Expr::new(
                ExprKind::BinOp {
                    left: Box::new(target.clone()),
                    op,
                    right: Box::new(value),
                },
                span,
                line,
            );
            return Ok(StmtKind::Assign { target, value });
        }

        Ok(StmtKind::Expr(target))
    }

    fn check_target(target: &Expr, message: &str, line: usize) -> CheckResult<()> {
        match &target.kind {
            ExprKind::Name(_) | ExprKind::Attribute { .. } => Ok(()),
            _ => Err(CheckError::parser(message, target.span, line)),
        }
    }

    fn peek_augmented_op(&mut self) -> CheckResult<Option<BinOp>> {
        Ok(match &self.lexer.peek()?.kind {
            PyTokenKind::PlusEq => Some(BinOp::Add),
            PyTokenKind::MinusEq => Some(BinOp::Sub),
            PyTokenKind::StarEq => Some(BinOp::Mul),
            PyTokenKind::SlashEq => Some(BinOp::Div),
            PyTokenKind::PercentEq => Some(BinOp::Mod),
            _ => None,
        })
    }

    fn parse_import(&mut self) -> CheckResult<StmtKind> {
        self.expect(PyTokenKind::Import)?;
        let mut names = Vec::new();
        loop {
            let path = self.parse_dotted_name()?;
            let binding = if self.match_token(&PyTokenKind::As)? {
                self.expect_identifier()?
            } else {
                // `import a.b` binds `a`
                path.split('.').next().unwrap_or(&path).to_string()
            };
            names.push(ImportedName { path, binding });
            if !self.match_token(&PyTokenKind::Comma)? {
                break;
            }
        }
        Ok(StmtKind::Import(names))
    }

    fn parse_from_import(&mut self) -> CheckResult<StmtKind> {
        self.expect(PyTokenKind::From)?;
        let mut module = String::new();
        while self.check(&PyTokenKind::Dot)? || self.check(&PyTokenKind::Ellipsis)? {
            let token = self.advance()?;
            module.push_str(&token.kind.to_string());
        }
        if !self.check(&PyTokenKind::Import)? {
            module.push_str(&self.parse_dotted_name()?);
        }
        self.expect(PyTokenKind::Import)?;

        if self.match_token(&PyTokenKind::Star)? {
            return Ok(StmtKind::Import(Vec::new()));
        }

        let parenthesized = self.match_token(&PyTokenKind::LParen)?;
        let mut names = Vec::new();
        loop {
            if parenthesized && self.check(&PyTokenKind::RParen)? {
                break;
            }
            let name = self.expect_identifier()?;
            let binding = if self.match_token(&PyTokenKind::As)? {
                self.expect_identifier()?
            } else {
                name.clone()
            };
            names.push(ImportedName {
                path: format!("{}.{}", module, name),
                binding,
            });
            if !self.match_token(&PyTokenKind::Comma)? {
                break;
            }
        }
        if parenthesized {
            self.expect(PyTokenKind::RParen)?;
        }
        Ok(StmtKind::Import(names))
    }

    fn parse_dotted_name(&mut self) -> CheckResult<String> {
        let mut path = self.expect_identifier()?;
        while self.match_token(&PyTokenKind::Dot)? {
            path.push('.');
            path.push_str(&self.expect_identifier()?);
        }
        Ok(path)
    }

    // ==================== Definitions ====================

    fn parse_function_def(&mut self) -> CheckResult<Stmt> {
        let def = self.expect(PyTokenKind::Def)?;
        let name = self.expect_identifier()?;
        self.expect(PyTokenKind::LParen)?;
        let params = self.parse_params()?;
        self.expect(PyTokenKind::RParen)?;

        let returns = if self.match_token(&PyTokenKind::Arrow)? {
            Some(self.parse_annotation()?)
        } else {
            None
        };
        self.expect(PyTokenKind::Colon)?;
        let body = self.parse_block("function definition", def.line)?;

        let span = Span::new(def.span.start, self.prev_end);
        let func = FunctionDef { name, params, returns, body, span };
        Ok(Stmt::new(StmtKind::FunctionDef(func), span, def.line))
    }

    fn parse_params(&mut self) -> CheckResult<Vec<Param>> {
        let mut params: Vec<Param> = Vec::new();

        while !self.check(&PyTokenKind::RParen)? {
            let token = self.lexer.peek()?.clone();
            if matches!(token.kind, PyTokenKind::Star | PyTokenKind::StarStar | PyTokenKind::Slash) {
                return Err(CheckError::parser(
                    "unsupported syntax: variadic or positional-only parameters",
                    token.span,
                    token.line,
                ));
            }

            let name = self.expect_identifier()?;
            let annotation = if self.match_token(&PyTokenKind::Colon)? {
                Some(self.parse_annotation()?)
            } else {
                None
            };
            let default = if self.match_token(&PyTokenKind::Eq)? {
                Some(self.parse_expr()?)
            } else {
                None
            };

            if default.is_none() && params.last().is_some_and(|p| p.default.is_some()) {
                return Err(CheckError::parser(
                    "non-default argument follows default argument",
                    token.span,
                    token.line,
                ));
            }

            params.push(Param {
                name,
                annotation,
                default,
                span: Span::new(token.span.start, self.prev_end),
                line: token.line,
            });

            if !self.match_token(&PyTokenKind::Comma)? {
                break;
            }
        }

        Ok(params)
    }

    fn parse_class_def(&mut self) -> CheckResult<Stmt> {
        let class = self.expect(PyTokenKind::Class)?;
        let name = self.expect_identifier()?;

        let mut bases = Vec::new();
        if self.match_token(&PyTokenKind::LParen)? {
            while !self.check(&PyTokenKind::RParen)? {
                if self.lexer.check_lookahead(&PyTokenKind::Eq)? {
                    return Err(self.error_at_next("unsupported syntax: class keyword arguments"));
                }
                bases.push(self.parse_expr()?);
                if !self.match_token(&PyTokenKind::Comma)? {
                    break;
                }
            }
            self.expect(PyTokenKind::RParen)?;
        }

        self.expect(PyTokenKind::Colon)?;
        let body = self.parse_block("class definition", class.line)?;

        let span = Span::new(class.span.start, self.prev_end);
        let def = ClassDef { name, bases, body, span };
        Ok(Stmt::new(StmtKind::ClassDef(def), span, class.line))
    }

    /// Body after a `:`, either an indented suite or statements on the same line
    fn parse_block(&mut self, owner: &str, owner_line: usize) -> CheckResult<Vec<Stmt>> {
        if !self.match_token(&PyTokenKind::Newline)? {
            return self.parse_simple_line();
        }

        if !self.check(&PyTokenKind::Indent)? {
            return Err(self.error_at_next(&format!(
                "expected an indented block after {} on line {}",
                owner, owner_line
            )));
        }
        self.advance()?;

        let mut body = Vec::new();
        while !self.match_token(&PyTokenKind::Dedent)? {
            if self.check(&PyTokenKind::Eof)? {
                break;
            }
            if self.check(&PyTokenKind::Indent)? {
                return Err(self.error_at_next("unexpected indent"));
            }
            body.extend(self.parse_statement()?);
        }
        Ok(body)
    }

    // ==================== Annotations ====================

    fn parse_annotation(&mut self) -> CheckResult<Annotation> {
        let start = self.lexer.peek()?.span.start;
        let expr = self.parse_type_union()?;
        let text = self.source[start..self.prev_end].to_string();
        Ok(Annotation {
            text,
            expr,
            span: Span::new(start, self.prev_end),
        })
    }

    fn parse_type_union(&mut self) -> CheckResult<TypeExpr> {
        let mut members = vec![self.parse_type_atom()?];
        while self.match_token(&PyTokenKind::Pipe)? {
            members.push(self.parse_type_atom()?);
        }
        if members.len() == 1 {
            Ok(members.remove(0))
        } else {
            Ok(TypeExpr::Union(members))
        }
    }

    fn parse_type_atom(&mut self) -> CheckResult<TypeExpr> {
        let token = self.advance()?;
        match token.kind {
            PyTokenKind::NoneLit => Ok(TypeExpr::None),
            PyTokenKind::Ellipsis => Ok(TypeExpr::Other),
            PyTokenKind::StringLiteral(raw) => {
                let content = decode_string(&raw);
                let parsed = PyParser::new(&content).parse_type_only();
                Ok(parsed.unwrap_or(TypeExpr::Str(content)))
            }
            PyTokenKind::LBracket => {
                // Callable[[int, str], int] parameter lists
                while !self.check(&PyTokenKind::RBracket)? {
                    self.parse_type_union()?;
                    if !self.match_token(&PyTokenKind::Comma)? {
                        break;
                    }
                }
                self.expect(PyTokenKind::RBracket)?;
                Ok(TypeExpr::Other)
            }
            PyTokenKind::Identifier(first) => {
                let mut name = first;
                while self.match_token(&PyTokenKind::Dot)? {
                    name.push('.');
                    name.push_str(&self.expect_identifier()?);
                }
                if !self.match_token(&PyTokenKind::LBracket)? {
                    return Ok(TypeExpr::Name(name));
                }
                let mut args = Vec::new();
                while !self.check(&PyTokenKind::RBracket)? {
                    args.push(self.parse_type_union()?);
                    if !self.match_token(&PyTokenKind::Comma)? {
                        break;
                    }
                }
                self.expect(PyTokenKind::RBracket)?;
                Ok(TypeExpr::Subscript { base: name, args })
            }
            _ => Err(CheckError::parser("invalid syntax", token.span, token.line)),
        }
    }

    /// Parse a whole source string as a single annotation (string forward references)
    fn parse_type_only(&mut self) -> CheckResult<TypeExpr> {
        let expr = self.parse_type_union()?;
        self.expect(PyTokenKind::Newline)?;
        self.expect(PyTokenKind::Eof)?;
        Ok(expr)
    }

    // ==================== Expressions ====================

    fn parse_expr(&mut self) -> CheckResult<Expr> {
        self.parse_expr_with_precedence(0)
    }

    fn parse_expr_with_precedence(&mut self, min_prec: u8) -> CheckResult<Expr> {
        const NOT_PRECEDENCE: u8 = 3;

        let mut left = if self.check(&PyTokenKind::Not)? {
            if min_prec > NOT_PRECEDENCE {
                return Err(self.error_at_next("invalid syntax"));
            }
            let not = self.advance()?;
            let operand = self.parse_expr_with_precedence(NOT_PRECEDENCE)?;
            Expr::new(
                ExprKind::UnaryOp { op: UnaryOp::Not, operand: Box::new(operand) },
                Span::new(not.span.start, self.prev_end),
                not.line,
            )
        } else {
            self.parse_unary_expr()?
        };

        while let Some(op) = self.peek_binary_op()? {
            let prec = op.precedence();
            if prec < min_prec {
                break;
            }

            self.advance()?; // consume operator
            let next_min = if op.is_right_assoc() { prec } else { prec + 1 };
            let right = self.parse_expr_with_precedence(next_min)?;

            let span = left.span.to(right.span);
            let line = left.line;
            left = Expr::new(
                ExprKind::BinOp {
                    left: Box::new(left),
                    op,
                    right: Box::new(right),
                },
                span,
                line,
            );
        }

        Ok(left)
    }

    fn peek_binary_op(&mut self) -> CheckResult<Option<BinOp>> {
        Ok(match &self.lexer.peek()?.kind {
            PyTokenKind::Plus => Some(BinOp::Add),
            PyTokenKind::Minus => Some(BinOp::Sub),
            PyTokenKind::Star => Some(BinOp::Mul),
            PyTokenKind::Slash => Some(BinOp::Div),
            PyTokenKind::SlashSlash => Some(BinOp::FloorDiv),
            PyTokenKind::Percent => Some(BinOp::Mod),
            PyTokenKind::StarStar => Some(BinOp::Pow),
            PyTokenKind::Pipe => Some(BinOp::BitOr),
            PyTokenKind::Amp => Some(BinOp::BitAnd),
            PyTokenKind::Caret => Some(BinOp::BitXor),
            PyTokenKind::EqEq => Some(BinOp::Eq),
            PyTokenKind::NotEq => Some(BinOp::NotEq),
            PyTokenKind::Lt => Some(BinOp::Lt),
            PyTokenKind::LtEq => Some(BinOp::LtEq),
            PyTokenKind::Gt => Some(BinOp::Gt),
            PyTokenKind::GtEq => Some(BinOp::GtEq),
            PyTokenKind::And => Some(BinOp::And),
            PyTokenKind::Or => Some(BinOp::Or),
            _ => None,
        })
    }

    fn parse_unary_expr(&mut self) -> CheckResult<Expr> {
        const UNARY_PRECEDENCE: u8 = 10;

        let op = match &self.lexer.peek()?.kind {
            PyTokenKind::Minus => Some(UnaryOp::Neg),
            PyTokenKind::Plus => Some(UnaryOp::Pos),
            PyTokenKind::Tilde => Some(UnaryOp::Invert),
            _ => None,
        };

        let Some(op) = op else {
            return self.parse_postfix_expr();
        };

        let token = self.advance()?;
        let operand = self.parse_expr_with_precedence(UNARY_PRECEDENCE)?;
        Ok(Expr::new(
            ExprKind::UnaryOp { op, operand: Box::new(operand) },
            Span::new(token.span.start, self.prev_end),
            token.line,
        ))
    }

    fn parse_postfix_expr(&mut self) -> CheckResult<Expr> {
        let mut expr = self.parse_primary_expr()?;

        loop {
            if self.match_token(&PyTokenKind::Dot)? {
                let attr = self.expect_identifier()?;
                let span = Span::new(expr.span.start, self.prev_end);
                let line = expr.line;
                expr = Expr::new(
                    ExprKind::Attribute { value: Box::new(expr), attr },
                    span,
                    line,
                );
            } else if self.match_token(&PyTokenKind::LParen)? {
                let (args, keywords) = self.parse_call_args()?;
                self.expect(PyTokenKind::RParen)?;
                let span = Span::new(expr.span.start, self.prev_end);
                let line = expr.line;
                expr = Self::make_call(expr, args, keywords, span, line);
            } else if self.check(&PyTokenKind::LBracket)? {
                return Err(self.error_at_next("unsupported syntax: subscript expressions"));
            } else {
                break;
            }
        }

        Ok(expr)
    }

    /// Build a call node, recognizing the `reveal_type(expr)` pseudo-call
    fn make_call(func: Expr, mut args: Vec<Expr>, keywords: Vec<Keyword>, span: Span, line: usize) -> Expr {
        if func.as_name() == Some("reveal_type") && args.len() == 1 && keywords.is_empty() {
            if let Some(arg) = args.pop() {
                return Expr::new(ExprKind::RevealType(Box::new(arg)), span, line);
            }
        }
        Expr::new(
            ExprKind::Call { func: Box::new(func), args, keywords },
            span,
            line,
        )
    }

    fn parse_call_args(&mut self) -> CheckResult<(Vec<Expr>, Vec<Keyword>)> {
        let mut args = Vec::new();
        let mut keywords: Vec<Keyword> = Vec::new();

        while !self.check(&PyTokenKind::RParen)? {
            let token = self.lexer.peek()?.clone();
            if matches!(token.kind, PyTokenKind::Star | PyTokenKind::StarStar) {
                return Err(CheckError::parser(
                    "unsupported syntax: argument unpacking",
                    token.span,
                    token.line,
                ));
            }

            let is_keyword = matches!(token.kind, PyTokenKind::Identifier(_))
                && self.lexer.check_lookahead(&PyTokenKind::Eq)?;

            if is_keyword {
                let name = self.expect_identifier()?;
                self.expect(PyTokenKind::Eq)?;
                let value = self.parse_expr()?;
                keywords.push(Keyword {
                    name,
                    value,
                    span: Span::new(token.span.start, self.prev_end),
                });
            } else {
                if !keywords.is_empty() {
                    return Err(CheckError::parser(
                        "positional argument follows keyword argument",
                        token.span,
                        token.line,
                    ));
                }
                args.push(self.parse_expr()?);
            }

            if !self.match_token(&PyTokenKind::Comma)? {
                break;
            }
        }

        Ok((args, keywords))
    }

    fn parse_primary_expr(&mut self) -> CheckResult<Expr> {
        let token = self.advance()?;
        let start = token.span;
        let line = token.line;

        let kind = match token.kind {
            PyTokenKind::Identifier(name) => ExprKind::Name(name),
            PyTokenKind::IntLiteral(s)
            | PyTokenKind::HexLiteral(s)
            | PyTokenKind::OctLiteral(s)
            | PyTokenKind::BinLiteral(s) => ExprKind::Constant(Constant::Int(s)),
            PyTokenKind::FloatLiteral(s) => {
                let value = s.replace('_', "").parse::<f64>().map_err(|_| {
                    CheckError::parser("invalid float literal", start, line)
                })?;
                ExprKind::Constant(Constant::Float(value))
            }
            PyTokenKind::StringLiteral(raw) => {
                let mut value = decode_string(&raw);
                // implicit concatenation: "a" "b"
                while let PyTokenKind::StringLiteral(next) = &self.lexer.peek()?.kind {
                    value.push_str(&decode_string(next));
                    self.advance()?;
                }
                ExprKind::Constant(Constant::Str(value))
            }
            PyTokenKind::BytesLiteral(raw) => {
                ExprKind::Constant(Constant::Bytes(decode_string(&raw).into_bytes()))
            }
            PyTokenKind::True => ExprKind::Constant(Constant::Bool(true)),
            PyTokenKind::False => ExprKind::Constant(Constant::Bool(false)),
            PyTokenKind::NoneLit => ExprKind::Constant(Constant::None),
            PyTokenKind::Ellipsis => ExprKind::Constant(Constant::Ellipsis),
            PyTokenKind::LParen => {
                if self.check(&PyTokenKind::RParen)? {
                    return Err(CheckError::parser("unsupported syntax: tuple expressions", start, line));
                }
                let inner = self.parse_expr()?;
                if self.check(&PyTokenKind::Comma)? {
                    return Err(self.error_at_next("unsupported syntax: tuple expressions"));
                }
                self.expect(PyTokenKind::RParen)?;
                return Ok(inner);
            }
            PyTokenKind::LBracket | PyTokenKind::LBrace => {
                return Err(CheckError::parser(
                    "unsupported syntax: collection displays",
                    start,
                    line,
                ));
            }
            kind if kind.is_unsupported_keyword() => {
                return Err(CheckError::parser(
                    format!("unsupported syntax: '{}' expression", kind),
                    start,
                    line,
                ));
            }
            _ => return Err(CheckError::parser("invalid syntax", start, line)),
        };

        Ok(Expr::new(kind, Span::new(start.start, self.prev_end), line))
    }

    // ==================== Helpers ====================

    fn advance(&mut self) -> CheckResult<PyToken> {
        let token = self.lexer.next_token()?;
        if !matches!(
            token.kind,
            PyTokenKind::Newline | PyTokenKind::Indent | PyTokenKind::Dedent | PyTokenKind::Eof
        ) {
            self.prev_end = token.span.end;
        }
        Ok(token)
    }

    fn check(&mut self, expected: &PyTokenKind) -> CheckResult<bool> {
        self.lexer.check(expected)
    }

    fn match_token(&mut self, expected: &PyTokenKind) -> CheckResult<bool> {
        if self.check(expected)? {
            self.advance()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn expect(&mut self, expected: PyTokenKind) -> CheckResult<PyToken> {
        if self.check(&expected)? {
            self.advance()
        } else {
            Err(self.error_at_next("invalid syntax"))
        }
    }

    fn expect_identifier(&mut self) -> CheckResult<String> {
        let token = self.advance()?;
        match token.kind {
            PyTokenKind::Identifier(name) => Ok(name),
            _ => Err(CheckError::parser("invalid syntax", token.span, token.line)),
        }
    }

    /// Parse error located at the next token
    fn error_at_next(&mut self, message: &str) -> CheckError {
        match self.lexer.peek() {
            Ok(token) => CheckError::parser(message, token.span, token.line),
            Err(err) => err,
        }
    }
}

/// Strip prefix and quotes from a string token and process escapes
fn decode_string(raw: &str) -> String {
    let quote = raw.find(['"', '\'']).unwrap_or(0);
    let prefix = &raw[..quote];
    let body = raw.get(quote + 1..raw.len().saturating_sub(1)).unwrap_or("");

    if prefix.contains(['r', 'R']) {
        return body.to_string();
    }

    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some(c @ ('\\' | '\'' | '"')) => out.push(c),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}
