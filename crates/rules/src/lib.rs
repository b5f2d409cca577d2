//! Conditional module rules: a tiny, closed expression language.
//!
//! Level-specific modules may carry a condition such as
//! `intensity >= 7 && level == 3`. Expressions are parsed into a tree and
//! evaluated against exactly two bound numbers; nothing else is reachable,
//! so a malformed or hostile rule can only fail to parse.
//!
//! # Example
//!
//! ```
//! use eco_rules::{Bindings, evaluate};
//!
//! let active = evaluate("intensidade >= 7 && nivel == 3", Bindings::new(8.0, 3.0)).unwrap();
//! assert!(active);
//! ```

mod parser;

pub use parser::{Bindings, CmpOp, Comparison, Condition, Operand, Variable, evaluate, parse_condition};
