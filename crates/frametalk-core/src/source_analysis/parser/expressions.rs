// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Condition and transform-expression grammars.
//!
//! Two small expression languages live here:
//!
//! - **Conditions** back `filter .. where`. Precedence from loosest to
//!   tightest is `or`, `and`, `not`, then the atomic forms (comparison,
//!   `between`, `in`, string matches, `is null`). In `x between a and b`
//!   the `and` is the range separator, not a conjunction; a second `and`
//!   after the high bound starts one.
//! - **Transform expressions** back `apply .. with transform` and the
//!   expression arm of `map`. Precedence from loosest to tightest:
//!   conditional (`value where cond else other`, right-associative), `or`,
//!   `and`, comparison (non-chaining), `+ -`, `* / %`, `**`
//!   (right-associative), unary `-`/`not`, then primaries (literals, column
//!   references, calls, parentheses).
//!
//! Both grammars recurse only through parentheses (and the conditional
//! tail), so the nesting guard and `stacker::maybe_grow` sit at those entry
//! points.

use ecow::EcoString;

use crate::ast::{BinOp, CompareOp, Condition, Expr, Identifier, StringMatchMode, UnaryOp, Value};
use crate::source_analysis::{ParseError, TokenKind, token::Keyword};

use super::Parser;

impl Parser {
    // ------------------------------------------------------------------
    // Conditions
    // ------------------------------------------------------------------

    /// Parses a `where` condition.
    ///
    /// Recursive entry point: parenthesised conditions come back through
    /// here, so the nesting guard lives here. The stack is extended on the
    /// heap when the remaining space falls below the 32 KiB red zone.
    pub(super) fn parse_condition(&mut self) -> Result<Condition, ParseError> {
        stacker::maybe_grow(32 * 1024, 256 * 1024, || {
            self.enter_nesting()?;
            let result = self.parse_or_condition();
            self.exit_nesting();
            result
        })
    }

    fn parse_or_condition(&mut self) -> Result<Condition, ParseError> {
        let mut left = self.parse_and_condition()?;
        while self.eat_keyword(Keyword::Or) {
            let right = self.parse_and_condition()?;
            left = Condition::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_and_condition(&mut self) -> Result<Condition, ParseError> {
        let mut left = self.parse_not_condition()?;
        while self.eat_keyword(Keyword::And) {
            let right = self.parse_not_condition()?;
            left = Condition::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    /// `not` chains are folded iteratively so they cannot recurse.
    fn parse_not_condition(&mut self) -> Result<Condition, ParseError> {
        let mut negations = 0_usize;
        while self.eat_keyword(Keyword::Not) {
            negations += 1;
        }
        let mut condition = self.parse_primary_condition()?;
        for _ in 0..negations {
            condition = Condition::Not(Box::new(condition));
        }
        Ok(condition)
    }

    fn parse_primary_condition(&mut self) -> Result<Condition, ParseError> {
        if self.eat(&TokenKind::LParen) {
            let condition = self.parse_condition()?;
            self.expect(&TokenKind::RParen)?;
            return Ok(condition);
        }

        // Clause words (`value`, `min`, ...) are legal column names here,
        // same as everywhere the grammar expects a column.
        let column = self.expect_column_name()?;

        match self.current_kind() {
            TokenKind::Keyword(Keyword::Between) => {
                self.advance();
                let low = self.parse_value()?;
                self.expect_keyword(Keyword::And)?;
                let high = self.parse_value()?;
                Ok(Condition::Between { column, low, high })
            }
            TokenKind::Keyword(Keyword::In) => {
                self.advance();
                let values = self.parse_list_value()?;
                Ok(Condition::In { column, values })
            }
            TokenKind::Keyword(Keyword::Contains) => {
                self.advance();
                let (pattern, _) = self.expect_str()?;
                Ok(Condition::StringMatch {
                    column,
                    mode: StringMatchMode::Contains,
                    pattern,
                })
            }
            TokenKind::Keyword(Keyword::StartsWith) => {
                self.advance();
                let (pattern, _) = self.expect_str()?;
                Ok(Condition::StringMatch {
                    column,
                    mode: StringMatchMode::StartsWith,
                    pattern,
                })
            }
            TokenKind::Keyword(Keyword::EndsWith) => {
                self.advance();
                let (pattern, _) = self.expect_str()?;
                Ok(Condition::StringMatch {
                    column,
                    mode: StringMatchMode::EndsWith,
                    pattern,
                })
            }
            TokenKind::Keyword(Keyword::Matches) => {
                self.advance();
                let (pattern, _) = self.expect_str()?;
                Ok(Condition::StringMatch {
                    column,
                    mode: StringMatchMode::Matches,
                    pattern,
                })
            }
            TokenKind::Keyword(Keyword::Is) => {
                self.advance();
                let negated = self.eat_keyword(Keyword::Not);
                self.expect_keyword(Keyword::Null)?;
                Ok(Condition::IsNull { column, negated })
            }
            _ => {
                let op = self.parse_compare_op()?;
                let value = self.parse_value()?;
                Ok(Condition::Comparison { column, op, value })
            }
        }
    }

    fn parse_compare_op(&mut self) -> Result<CompareOp, ParseError> {
        let op = match self.current_kind() {
            TokenKind::EqEq => CompareOp::Eq,
            TokenKind::BangEq => CompareOp::Ne,
            TokenKind::Lt => CompareOp::Lt,
            TokenKind::Gt => CompareOp::Gt,
            TokenKind::LtEq => CompareOp::Le,
            TokenKind::GtEq => CompareOp::Ge,
            kind => {
                return Err(ParseError::expected(
                    "a comparison operator",
                    kind,
                    self.current_span(),
                ));
            }
        };
        self.advance();
        Ok(op)
    }

    // ------------------------------------------------------------------
    // Transform expressions
    // ------------------------------------------------------------------

    /// Parses a transform expression.
    ///
    /// Recursive entry point; same stack discipline as
    /// [`Parser::parse_condition`].
    pub(super) fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        stacker::maybe_grow(32 * 1024, 256 * 1024, || {
            self.enter_nesting()?;
            let result = self.parse_conditional_expr();
            self.exit_nesting();
            result
        })
    }

    /// `value where condition else otherwise`, right-associative through the
    /// `else` branch.
    fn parse_conditional_expr(&mut self) -> Result<Expr, ParseError> {
        let value = self.parse_or_expr()?;
        if !self.eat_keyword(Keyword::Where) {
            return Ok(value);
        }
        let condition = self.parse_or_expr()?;
        self.expect_keyword(Keyword::Else)?;
        let otherwise = self.parse_conditional_expr()?;
        let span = value.span().merge(otherwise.span());
        Ok(Expr::Conditional {
            value: Box::new(value),
            condition: Box::new(condition),
            otherwise: Box::new(otherwise),
            span,
        })
    }

    fn parse_or_expr(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_and_expr()?;
        while self.eat_keyword(Keyword::Or) {
            let right = self.parse_and_expr()?;
            let span = left.span().merge(right.span());
            left = Expr::Binary {
                left: Box::new(left),
                op: BinOp::Or,
                right: Box::new(right),
                span,
            };
        }
        Ok(left)
    }

    fn parse_and_expr(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_comparison_expr()?;
        while self.eat_keyword(Keyword::And) {
            let right = self.parse_comparison_expr()?;
            let span = left.span().merge(right.span());
            left = Expr::Binary {
                left: Box::new(left),
                op: BinOp::And,
                right: Box::new(right),
                span,
            };
        }
        Ok(left)
    }

    /// Comparisons do not chain: `a < b < c` parses as `(a < b)` and then
    /// fails on the second operator in whatever context called us.
    fn parse_comparison_expr(&mut self) -> Result<Expr, ParseError> {
        let left = self.parse_additive_expr()?;
        let op = match self.current_kind() {
            TokenKind::EqEq => BinOp::Eq,
            TokenKind::BangEq => BinOp::Ne,
            TokenKind::Lt => BinOp::Lt,
            TokenKind::Gt => BinOp::Gt,
            TokenKind::LtEq => BinOp::Le,
            TokenKind::GtEq => BinOp::Ge,
            _ => return Ok(left),
        };
        self.advance();
        let right = self.parse_additive_expr()?;
        let span = left.span().merge(right.span());
        Ok(Expr::Binary {
            left: Box::new(left),
            op,
            right: Box::new(right),
            span,
        })
    }

    fn parse_additive_expr(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_multiplicative_expr()?;
        loop {
            let op = match self.current_kind() {
                TokenKind::Plus => BinOp::Add,
                TokenKind::Minus => BinOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_multiplicative_expr()?;
            let span = left.span().merge(right.span());
            left = Expr::Binary {
                left: Box::new(left),
                op,
                right: Box::new(right),
                span,
            };
        }
        Ok(left)
    }

    fn parse_multiplicative_expr(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_power_expr()?;
        loop {
            let op = match self.current_kind() {
                TokenKind::Star => BinOp::Mul,
                TokenKind::Slash => BinOp::Div,
                TokenKind::Percent => BinOp::Mod,
                _ => break,
            };
            self.advance();
            let right = self.parse_power_expr()?;
            let span = left.span().merge(right.span());
            left = Expr::Binary {
                left: Box::new(left),
                op,
                right: Box::new(right),
                span,
            };
        }
        Ok(left)
    }

    /// `**` is right-associative: `2 ** 3 ** 2` is `2 ** (3 ** 2)`.
    fn parse_power_expr(&mut self) -> Result<Expr, ParseError> {
        let base = self.parse_unary_expr()?;
        if !self.eat(&TokenKind::StarStar) {
            return Ok(base);
        }
        let exponent = self.parse_power_expr()?;
        let span = base.span().merge(exponent.span());
        Ok(Expr::Binary {
            left: Box::new(base),
            op: BinOp::Pow,
            right: Box::new(exponent),
            span,
        })
    }

    /// Unary prefixes are folded iteratively so they cannot recurse.
    fn parse_unary_expr(&mut self) -> Result<Expr, ParseError> {
        let mut prefixes = Vec::new();
        loop {
            match self.current_kind() {
                TokenKind::Minus => {
                    prefixes.push((UnaryOp::Neg, self.current_span()));
                    self.advance();
                }
                TokenKind::Keyword(Keyword::Not) => {
                    prefixes.push((UnaryOp::Not, self.current_span()));
                    self.advance();
                }
                _ => break,
            }
        }
        let mut expr = self.parse_primary_expr()?;
        for (op, op_span) in prefixes.into_iter().rev() {
            let span = op_span.merge(expr.span());
            expr = Expr::Unary {
                op,
                operand: Box::new(expr),
                span,
            };
        }
        Ok(expr)
    }

    fn parse_primary_expr(&mut self) -> Result<Expr, ParseError> {
        let span = self.current_span();
        match self.current_kind() {
            TokenKind::Int(text) => {
                let value = text
                    .parse::<i64>()
                    .map_err(|_| ParseError::new("Integer literal out of range", span))?;
                self.advance();
                Ok(Expr::Literal(Value::Int(value), span))
            }
            TokenKind::Float(text) => {
                let value = text
                    .parse::<f64>()
                    .map_err(|_| ParseError::new("Malformed numeric literal", span))?;
                self.advance();
                Ok(Expr::Literal(Value::Float(value), span))
            }
            TokenKind::Str(text) => {
                let value = Value::Str(text.clone());
                self.advance();
                Ok(Expr::Literal(value, span))
            }
            TokenKind::Bool(b) => {
                let value = Value::Bool(*b);
                self.advance();
                Ok(Expr::Literal(value, span))
            }
            TokenKind::Keyword(Keyword::Null) => {
                self.advance();
                Ok(Expr::Literal(Value::Null, span))
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expr()?;
                self.expect(&TokenKind::RParen)?;
                Ok(inner)
            }
            TokenKind::Ident(name) => {
                let name = name.clone();
                let token = self.advance();
                let ident = Identifier::new(name, token.span);
                if self.eat(&TokenKind::LParen) {
                    self.parse_call_tail(ident)
                } else {
                    Ok(Expr::Column(ident))
                }
            }
            // Clause words (`x`, `min`, `value`, ...) are column references;
            // statement heads (`round`, `abs`, ...) double as function names
            // when a call follows.
            TokenKind::Keyword(kw)
                if !kw.is_statement_head()
                    || matches!(self.peek_kind(), Some(TokenKind::LParen)) =>
            {
                let name = EcoString::from(kw.as_str());
                let token = self.advance();
                let ident = Identifier::new(name, token.span);
                if self.eat(&TokenKind::LParen) {
                    self.parse_call_tail(ident)
                } else {
                    Ok(Expr::Column(ident))
                }
            }
            kind => Err(ParseError::expected(
                "an expression",
                kind,
                self.current_span(),
            )),
        }
    }

    /// Parses call arguments after the opening parenthesis was consumed.
    fn parse_call_tail(&mut self, function: Identifier) -> Result<Expr, ParseError> {
        let mut args = Vec::new();
        if !self.eat(&TokenKind::RParen) {
            loop {
                args.push(self.parse_expr()?);
                if self.eat(&TokenKind::Comma) {
                    continue;
                }
                self.expect(&TokenKind::RParen)?;
                break;
            }
        }
        let span = function.span.merge(self.previous_span());
        Ok(Expr::Call {
            function,
            args,
            span,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Statement;
    use crate::source_analysis::tokenize;

    fn parse_filter_condition(source: &str) -> Condition {
        let program = super::super::parse(tokenize(source).expect("lexes")).expect("parses");
        match program.into_iter().next().expect("one statement") {
            Statement::Filter { condition, .. } => condition,
            other => panic!("expected filter, got {other:?}"),
        }
    }

    fn parse_transform(source: &str) -> Expr {
        let program = super::super::parse(tokenize(source).expect("lexes")).expect("parses");
        match program.into_iter().next().expect("one statement") {
            Statement::Apply { transform, .. } => transform,
            other => panic!("expected apply, got {other:?}"),
        }
    }

    #[test]
    fn comparison_condition() {
        let cond = parse_filter_condition("filter sales where price > 100");
        match cond {
            Condition::Comparison { column, op, value } => {
                assert_eq!(column.name, "price");
                assert_eq!(op, CompareOp::Gt);
                assert_eq!(value, Value::Int(100));
            }
            other => panic!("unexpected condition: {other:?}"),
        }
    }

    #[test]
    fn and_binds_tighter_than_or() {
        let cond =
            parse_filter_condition("filter sales where a > 1 or b > 2 and c > 3 as matched");
        match cond {
            Condition::Or(left, right) => {
                assert!(matches!(*left, Condition::Comparison { .. }));
                assert!(matches!(*right, Condition::And(_, _)));
            }
            other => panic!("unexpected condition: {other:?}"),
        }
    }

    #[test]
    fn parentheses_override_precedence() {
        let cond = parse_filter_condition("filter sales where (a > 1 or b > 2) and c > 3");
        match cond {
            Condition::And(left, _) => assert!(matches!(*left, Condition::Or(_, _))),
            other => panic!("unexpected condition: {other:?}"),
        }
    }

    #[test]
    fn between_consumes_its_own_and() {
        let cond = parse_filter_condition("filter sales where price between 10 and 20 and qty > 5");
        match cond {
            Condition::And(left, right) => {
                assert!(matches!(
                    *left,
                    Condition::Between {
                        low: Value::Int(10),
                        high: Value::Int(20),
                        ..
                    }
                ));
                assert!(matches!(*right, Condition::Comparison { .. }));
            }
            other => panic!("unexpected condition: {other:?}"),
        }
    }

    #[test]
    fn in_condition_takes_a_list() {
        let cond = parse_filter_condition(r#"filter sales where city in ["NYC", "LA"]"#);
        match cond {
            Condition::In { values, .. } => assert_eq!(values.len(), 2),
            other => panic!("unexpected condition: {other:?}"),
        }
    }

    #[test]
    fn string_match_and_null_checks() {
        let cond = parse_filter_condition(r#"filter sales where name starts_with "Mc""#);
        assert!(matches!(
            cond,
            Condition::StringMatch {
                mode: StringMatchMode::StartsWith,
                ..
            }
        ));

        let cond = parse_filter_condition("filter sales where discount is not null");
        assert!(matches!(cond, Condition::IsNull { negated: true, .. }));

        let cond = parse_filter_condition("filter sales where discount is null");
        assert!(matches!(cond, Condition::IsNull { negated: false, .. }));
    }

    #[test]
    fn not_is_iterative_and_stacks() {
        let cond = parse_filter_condition("filter sales where not not a > 1");
        match cond {
            Condition::Not(inner) => assert!(matches!(*inner, Condition::Not(_))),
            other => panic!("unexpected condition: {other:?}"),
        }
    }

    #[test]
    fn missing_operator_is_a_syntax_error() {
        let tokens = tokenize("filter sales where price").expect("lexes");
        let err = super::super::parse(tokens).unwrap_err();
        assert!(err.message.contains("comparison operator"));
    }

    #[test]
    fn arithmetic_precedence_in_transforms() {
        let expr = parse_transform("apply sales column price with transform price + tax * 2");
        match expr {
            Expr::Binary {
                op: BinOp::Add,
                right,
                ..
            } => assert!(matches!(*right, Expr::Binary { op: BinOp::Mul, .. })),
            other => panic!("unexpected expr: {other:?}"),
        }
    }

    #[test]
    fn power_is_right_associative() {
        let expr = parse_transform("apply sales column x with transform x ** 3 ** 2");
        match expr {
            Expr::Binary {
                op: BinOp::Pow,
                right,
                ..
            } => assert!(matches!(*right, Expr::Binary { op: BinOp::Pow, .. })),
            other => panic!("unexpected expr: {other:?}"),
        }
    }

    #[test]
    fn conditional_expression_round_trip() {
        let expr = parse_transform(
            "apply sales column price with transform price * 0.9 where price > 100 else price",
        );
        match expr {
            Expr::Conditional {
                value, condition, ..
            } => {
                assert!(matches!(*value, Expr::Binary { op: BinOp::Mul, .. }));
                assert!(matches!(*condition, Expr::Binary { op: BinOp::Gt, .. }));
            }
            other => panic!("unexpected expr: {other:?}"),
        }
    }

    #[test]
    fn call_arguments_parse() {
        let expr = parse_transform("apply sales column x with transform round(x * 1.1, 2)");
        match expr {
            Expr::Call { function, args, .. } => {
                assert_eq!(function.name, "round");
                assert_eq!(args.len(), 2);
            }
            other => panic!("unexpected expr: {other:?}"),
        }
    }

    #[test]
    fn clause_words_read_as_columns_in_expressions() {
        let condition = parse_filter_condition("filter sales where value > 10");
        match condition {
            Condition::Comparison { column, .. } => assert_eq!(column.name, "value"),
            other => panic!("unexpected condition: {other:?}"),
        }
        let expr = parse_transform("apply sales column price with transform min + max");
        match expr {
            Expr::Binary { op: BinOp::Add, left, right, .. } => {
                assert!(matches!(*left, Expr::Column(ref c) if c.name == "min"));
                assert!(matches!(*right, Expr::Column(ref c) if c.name == "max"));
            }
            other => panic!("unexpected expr: {other:?}"),
        }
    }

    #[test]
    fn unary_minus_folds() {
        let expr = parse_transform("apply sales column x with transform -x + 1");
        match expr {
            Expr::Binary { op: BinOp::Add, left, .. } => {
                assert!(matches!(*left, Expr::Unary { op: UnaryOp::Neg, .. }));
            }
            other => panic!("unexpected expr: {other:?}"),
        }
    }

    #[test]
    fn deep_nesting_is_rejected_not_a_crash() {
        let mut source = String::from("filter sales where ");
        for _ in 0..200 {
            source.push('(');
        }
        source.push_str("a > 1");
        for _ in 0..200 {
            source.push(')');
        }
        let tokens = tokenize(&source).expect("lexes");
        let err = super::super::parse(tokens).unwrap_err();
        assert!(err.message.contains("nested too deeply"));
    }
}
