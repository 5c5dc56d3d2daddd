//! Parser for the textual rule encoding.
//!
//! The runtime re-parses rule text on its own, independent of how the text was
//! produced. Grammar, loosest binding first:
//!
//! ```text
//! expr   := and ("OR" and)*
//! and    := unary ("AND" unary)*
//! unary  := "NOT" unary | "AT" step unary | atom
//! atom   := "G:" name "=" ("0" | "1") | ">" int | "<" int | "IN" "D:" region
//! ```
//!
//! Binary operators are left-associative. Cell-contact qualifiers
//! (`IN CC D:<region>`) are recognized and rejected as unsupported.

use crate::error::{RuntimeError, RuntimeResult};
use crate::logic::LogicId;
use crate::model::TargetModel;

/// Parse `text` into the model's logic arena and return the root.
pub fn parse_rule(model: &mut TargetModel, text: &str) -> RuntimeResult<LogicId> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    let mut parser = RuleParser {
        tokens,
        pos: 0,
        model,
    };
    let root = parser.expr()?;
    match parser.peek() {
        None => Ok(root),
        Some("IN") => Err(RuntimeError::UnsupportedToken {
            token: "modifier".to_string(),
        }),
        Some(token) => Err(parser.error(format!("unexpected token '{token}'"))),
    }
}

struct RuleParser<'a, 't> {
    tokens: Vec<&'t str>,
    pos: usize,
    model: &'a mut TargetModel,
}

impl<'a, 't> RuleParser<'a, 't> {
    fn peek(&self) -> Option<&'t str> {
        self.tokens.get(self.pos).copied()
    }

    fn next(&mut self) -> RuntimeResult<&'t str> {
        let token = self
            .peek()
            .ok_or_else(|| self.error("unexpected end of rule".to_string()))?;
        self.pos += 1;
        Ok(token)
    }

    fn error(&self, message: String) -> RuntimeError {
        RuntimeError::Parse {
            position: self.pos,
            message,
        }
    }

    fn expr(&mut self) -> RuntimeResult<LogicId> {
        let mut left = self.and()?;
        while self.peek() == Some("OR") {
            self.pos += 1;
            let right = self.and()?;
            left = self.model.logic_mut().or(left, right)?;
        }
        Ok(left)
    }

    fn and(&mut self) -> RuntimeResult<LogicId> {
        let mut left = self.unary()?;
        while self.peek() == Some("AND") {
            self.pos += 1;
            let right = self.unary()?;
            left = self.model.logic_mut().and(left, right)?;
        }
        Ok(left)
    }

    fn unary(&mut self) -> RuntimeResult<LogicId> {
        let token = self.next()?;
        if token == "NOT" {
            let child = self.unary()?;
            return self.model.logic_mut().not(child);
        }
        if let Some(step) = token.strip_prefix("AT") {
            let step: i64 = step
                .parse()
                .map_err(|_| self.error(format!("invalid time step '{token}'")))?;
            let child = self.unary()?;
            return self.model.logic_mut().at(step, child);
        }
        self.atom(token)
    }

    fn atom(&mut self, token: &'t str) -> RuntimeResult<LogicId> {
        if let Some(body) = token.strip_prefix("G:") {
            let (name, value) = body
                .rsplit_once('=')
                .ok_or_else(|| self.error(format!("missing gene value in '{token}'")))?;
            let value = match value {
                "1" => true,
                "0" => false,
                other => return Err(self.error(format!("invalid gene value '{other}'"))),
            };
            let gene = self.model.require_gene(name)?;
            return self.model.logic_mut().gene(gene, value);
        }
        if let Some(time) = token.strip_prefix('>') {
            let time = self.parse_time(time)?;
            return self.model.logic_mut().after(time);
        }
        if let Some(time) = token.strip_prefix('<') {
            let time = self.parse_time(time)?;
            return self.model.logic_mut().before(time);
        }
        if token == "IN" {
            let target = self.next()?;
            if target == "CC" {
                return Err(RuntimeError::UnsupportedToken {
                    token: "IN CC".to_string(),
                });
            }
            let region = target
                .strip_prefix("D:")
                .ok_or_else(|| self.error(format!("expected 'D:<region>', found '{target}'")))?;
            if self.model.region(region).is_none() {
                return Err(RuntimeError::UnknownRegion {
                    name: region.to_string(),
                });
            }
            return self.model.logic_mut().in_region(region);
        }
        Err(self.error(format!("unexpected token '{token}'")))
    }

    fn parse_time(&self, raw: &str) -> RuntimeResult<i64> {
        raw.parse()
            .map_err(|_| self.error(format!("invalid time '{raw}'")))
    }
}
