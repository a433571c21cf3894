//! Literal values of constants and default values of arguments and
//! dictionary members.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum LiteralValue {
    Boolean(bool),
    Integer(i64),
    FloatingPoint(f64),
    String(String),
    Null,
    /// `[]`, the only sequence literal IDL allows.
    EmptySequence,
    /// `{}`, the only dictionary literal IDL allows.
    EmptyDictionary,
    Undefined,
}

/// A literal together with the exact spelling it had in source, which is
/// what code generators emit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LiteralConstant {
    pub value: LiteralValue,
    pub literal: String,
}

impl LiteralConstant {
    pub fn boolean(value: bool) -> Self {
        LiteralConstant {
            value: LiteralValue::Boolean(value),
            literal: if value { "true" } else { "false" }.to_string(),
        }
    }

    pub fn integer(value: i64, literal: impl Into<String>) -> Self {
        LiteralConstant {
            value: LiteralValue::Integer(value),
            literal: literal.into(),
        }
    }

    pub fn floating_point(value: f64, literal: impl Into<String>) -> Self {
        LiteralConstant {
            value: LiteralValue::FloatingPoint(value),
            literal: literal.into(),
        }
    }

    pub fn string(value: impl Into<String>) -> Self {
        let value = value.into();
        let literal = format!("\"{value}\"");
        LiteralConstant {
            value: LiteralValue::String(value),
            literal,
        }
    }

    pub fn null() -> Self {
        LiteralConstant {
            value: LiteralValue::Null,
            literal: "null".to_string(),
        }
    }

    pub fn empty_sequence() -> Self {
        LiteralConstant {
            value: LiteralValue::EmptySequence,
            literal: "[]".to_string(),
        }
    }

    pub fn empty_dictionary() -> Self {
        LiteralConstant {
            value: LiteralValue::EmptyDictionary,
            literal: "{}".to_string(),
        }
    }

    pub fn undefined() -> Self {
        LiteralConstant {
            value: LiteralValue::Undefined,
            literal: "undefined".to_string(),
        }
    }
}

impl fmt::Display for LiteralConstant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.literal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literals_keep_their_spelling() {
        assert_eq!(LiteralConstant::integer(255, "0xFF").to_string(), "0xFF");
        assert_eq!(LiteralConstant::boolean(true).to_string(), "true");
        assert_eq!(LiteralConstant::string("en-US").to_string(), "\"en-US\"");
        assert_eq!(LiteralConstant::null().to_string(), "null");
    }
}
