//! Variable types known to the semantic checker.

use ksharp_ast::token::TokenKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum VarType {
    Int,
    Float,
    Bool,
    Char,
    /// `void`, string literals, and anything not resolvable.
    Unknown,
}

impl VarType {
    /// Type named by a reserved-type lexeme. Only the four value types map;
    /// `void` and anything else is `Unknown`. The first letter may be
    /// uppercase (`Int`).
    pub fn from_type_lexeme(lexeme: &str) -> Self {
        let mut chars = lexeme.chars();
        let Some(first) = chars.next() else {
            return VarType::Unknown;
        };
        let lowered = format!("{}{}", first.to_ascii_lowercase(), chars.as_str());
        match lowered.as_str() {
            "int" => VarType::Int,
            "float" => VarType::Float,
            "bool" => VarType::Bool,
            "char" => VarType::Char,
            _ => VarType::Unknown,
        }
    }

    /// Type of a literal token kind, or `None` if `kind` is not a constant.
    pub fn of_constant(kind: TokenKind) -> Option<Self> {
        match kind {
            TokenKind::IntConst => Some(VarType::Int),
            TokenKind::FloatConst => Some(VarType::Float),
            TokenKind::BoolConst => Some(VarType::Bool),
            TokenKind::CharConst => Some(VarType::Char),
            TokenKind::StringConst => Some(VarType::Unknown),
            _ => None,
        }
    }

    pub fn is_known(self) -> bool {
        self != VarType::Unknown
    }
}

impl std::fmt::Display for VarType {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let s = match self {
            VarType::Int => "int",
            VarType::Float => "float",
            VarType::Bool => "bool",
            VarType::Char => "char",
            VarType::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_lexemes() {
        assert_eq!(VarType::from_type_lexeme("float"), VarType::Float);
        assert_eq!(VarType::from_type_lexeme("void"), VarType::Unknown);
        assert_eq!(VarType::from_type_lexeme("Int"), VarType::Int);
        assert_eq!(VarType::from_type_lexeme("INT"), VarType::Unknown);
    }

    #[test]
    fn constants_and_non_constants() {
        assert_eq!(VarType::of_constant(TokenKind::CharConst), Some(VarType::Char));
        assert_eq!(
            VarType::of_constant(TokenKind::StringConst),
            Some(VarType::Unknown)
        );
        assert_eq!(VarType::of_constant(TokenKind::Identifier), None);
    }
}
