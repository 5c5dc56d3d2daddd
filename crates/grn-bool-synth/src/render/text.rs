//! Canonical text encoding of equations.
//!
//! This is the interchange format the target runtime parses, so the output is
//! byte-exact:
//!
//! | Node | Encoding |
//! |---|---|
//! | `GeneValue(name, v)` | `G:<name>=<1\|0>` |
//! | `Not(c)` | `NOT <c>` |
//! | `And(l, r)` / `Or(l, r)` | `<l> AND <r>` / `<l> OR <r>` |
//! | `TimeShift(c, dt)` | `AT<+\|-\|><\|dt\|> <c>` |
//! | `GreaterThanTime(t)` / `LessThanTime(t)` | `>t` / `<t` |
//! | `InRegion(r)` | `IN D:<r>` |
//! | `ImmediateCellContact(r)` | `IN CC D:<r>` |
//! | `Modifier(l, r)` | `<l> <r>` |

use std::fmt;

use crate::equation::{EquationNode, EquationRenderer};

/// Renders equations to their text encoding.
#[derive(Debug, Default, Clone)]
pub struct TextRenderer {
    buf: String,
}

impl TextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    fn write(&mut self, node: &EquationNode) {
        match node {
            EquationNode::GeneValue { name, value, .. } => {
                self.buf.push_str("G:");
                self.buf.push_str(name);
                self.buf.push('=');
                self.buf.push(if *value { '1' } else { '0' });
            }
            EquationNode::Not(child) => {
                self.buf.push_str("NOT ");
                self.write(child);
            }
            EquationNode::And(left, right) => self.binary(left, " AND ", right),
            EquationNode::Or(left, right) => self.binary(left, " OR ", right),
            EquationNode::Modifier(left, right) => self.binary(left, " ", right),
            EquationNode::TimeShift { child, delta } => {
                self.buf.push_str("AT");
                if *delta > 0 {
                    self.buf.push('+');
                } else if *delta < 0 {
                    self.buf.push('-');
                }
                self.buf.push_str(&delta.unsigned_abs().to_string());
                self.buf.push(' ');
                self.write(child);
            }
            EquationNode::GreaterThanTime(t) => {
                self.buf.push('>');
                self.buf.push_str(&t.to_string());
            }
            EquationNode::LessThanTime(t) => {
                self.buf.push('<');
                self.buf.push_str(&t.to_string());
            }
            EquationNode::InRegion(region) => {
                self.buf.push_str("IN D:");
                self.buf.push_str(region);
            }
            EquationNode::ImmediateCellContact(region) => {
                self.buf.push_str("IN CC D:");
                self.buf.push_str(region);
            }
        }
    }

    fn binary(&mut self, left: &EquationNode, op: &str, right: &EquationNode) {
        self.write(left);
        self.buf.push_str(op);
        self.write(right);
    }
}

impl EquationRenderer for TextRenderer {
    type Output = String;

    fn render(&mut self, node: &EquationNode) -> String {
        self.buf.clear();
        self.write(node);
        std::mem::take(&mut self.buf)
    }
}

/// Render one equation to text.
pub fn to_text(node: &EquationNode) -> String {
    TextRenderer::new().render(node)
}

impl fmt::Display for EquationNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&to_text(self))
    }
}
