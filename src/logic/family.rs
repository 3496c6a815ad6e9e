use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of value families an expression can be classified into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeFamily {
    Any,
    Boolean,
    Date,
    DateTime,
    List,
    Numeric,
    String,
    Time,
    /// The literal `null`; only accepted where an expression of any family is.
    Null,
}

impl TypeFamily {
    /// The declared order of the families inside a `jsonLogic` slot.
    pub const DECLARED: [TypeFamily; 8] = [
        TypeFamily::Any,
        TypeFamily::Boolean,
        TypeFamily::Date,
        TypeFamily::DateTime,
        TypeFamily::List,
        TypeFamily::Numeric,
        TypeFamily::String,
        TypeFamily::Time,
    ];

    /// Families whose values can be ordered with `>`, `>=`, `<` and `<=`.
    pub const ORDERED: [TypeFamily; 4] = [
        TypeFamily::Date,
        TypeFamily::DateTime,
        TypeFamily::Numeric,
        TypeFamily::Time,
    ];

    const fn bit(self) -> u16 {
        1 << self as u16
    }
}

impl fmt::Display for TypeFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// The set of families an expression is a member of.
///
/// Family unions overlap: a string literal is a Date, a DateTime, a String and a
/// Time at once, and a variable lookup belongs to every family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FamilySet(u16);

impl FamilySet {
    pub const EMPTY: FamilySet = FamilySet(0);

    pub const fn of(family: TypeFamily) -> Self {
        FamilySet(family.bit())
    }

    pub fn with(self, family: TypeFamily) -> Self {
        FamilySet(self.0 | family.bit())
    }

    pub fn union(self, other: FamilySet) -> Self {
        FamilySet(self.0 | other.0)
    }

    pub fn contains(self, family: TypeFamily) -> bool {
        self.0 & family.bit() != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = TypeFamily> {
        TypeFamily::DECLARED
            .into_iter()
            .chain([TypeFamily::Null])
            .filter(move |f| self.contains(*f))
    }

    /// The family an expression is reported as when no expectation narrows it.
    ///
    /// Any-arm shapes are `Any`; string literals are `String`; everything else
    /// belongs to exactly one family.
    pub fn primary(self) -> Option<TypeFamily> {
        const PRIORITY: [TypeFamily; 9] = [
            TypeFamily::Any,
            TypeFamily::Boolean,
            TypeFamily::Numeric,
            TypeFamily::String,
            TypeFamily::Date,
            TypeFamily::DateTime,
            TypeFamily::Time,
            TypeFamily::List,
            TypeFamily::Null,
        ];
        PRIORITY.into_iter().find(|f| self.contains(*f))
    }
}

/// What a use site demands from an expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Expectation {
    /// A `jsonLogic` slot: any family, or `null`.
    Logic,
    Family(TypeFamily),
}

impl Expectation {
    pub fn accepts(self, members: FamilySet) -> bool {
        match self {
            Expectation::Logic => !members.is_empty(),
            Expectation::Family(family) => members.contains(family),
        }
    }
}

impl fmt::Display for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expectation::Logic => write!(f, "an expression"),
            Expectation::Family(family) => write!(f, "a {} expression", family),
        }
    }
}

/// The JSON primitive of a literal expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralKind {
    Bool,
    Number,
    Text,
    Null,
}

/// The outcome of analysing one expression node, before family membership is decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Literal(LiteralKind),
    /// An operator or method call producing the given family.
    Call(TypeFamily),
    /// `var`, `current`, `if` or `getItem`: members of the generic Any family.
    AnyArm,
}

/// Decides whether an analysed expression belongs to one family.
///
/// Implementors describe only their own arms; the default `classify` falls back
/// to the Any family once those are exhausted, which every family union ends with.
pub trait FamilyChecker: Send + Sync {
    fn family(&self) -> TypeFamily;

    fn matches_own_arm(&self, shape: Shape) -> bool;

    fn classify(&self, shape: Shape) -> bool {
        self.matches_own_arm(shape) || AnyFamily.matches_own_arm(shape)
    }
}

/// The generic family every other family delegates to.
pub struct AnyFamily;

impl FamilyChecker for AnyFamily {
    fn family(&self) -> TypeFamily {
        TypeFamily::Any
    }

    fn matches_own_arm(&self, shape: Shape) -> bool {
        shape == Shape::AnyArm
    }
}

/// Defines the concrete family checkers and their registration.
macro_rules! define_families {
    ( $( ($struct_name:ident, $family:expr, [ $( $literal:ident ),* ]) ),* $(,)? ) => {
        $(
            pub struct $struct_name;
            impl FamilyChecker for $struct_name {
                fn family(&self) -> TypeFamily { $family }
                fn matches_own_arm(&self, shape: Shape) -> bool {
                    match shape {
                        Shape::Literal(kind) => [$( LiteralKind::$literal ),*].contains(&kind),
                        Shape::Call(result) => result == $family,
                        Shape::AnyArm => false,
                    }
                }
            }
        )*

        pub(super) fn register_default_families(registry: &mut Vec<Box<dyn FamilyChecker>>) {
            registry.push(Box::new(AnyFamily));
            $( registry.push(Box::new($struct_name)); )*
        }
    };
}

define_families! {
    (BooleanFamily, TypeFamily::Boolean, [Bool]),
    (DateFamily, TypeFamily::Date, [Text]),
    (DateTimeFamily, TypeFamily::DateTime, [Text]),
    (ListFamily, TypeFamily::List, []),
    (NumericFamily, TypeFamily::Numeric, [Number]),
    (StringFamily, TypeFamily::String, [Text]),
    (TimeFamily, TypeFamily::Time, [Text]),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn any_arm_belongs_to_every_family() {
        assert!(ListFamily.classify(Shape::AnyArm));
        assert!(BooleanFamily.classify(Shape::AnyArm));
        assert!(!ListFamily.classify(Shape::Literal(LiteralKind::Text)));
    }

    #[test]
    fn primary_prefers_string_for_text_literals() {
        let text = FamilySet::of(TypeFamily::Date)
            .with(TypeFamily::DateTime)
            .with(TypeFamily::String)
            .with(TypeFamily::Time);
        assert_eq!(text.primary(), Some(TypeFamily::String));
        assert_eq!(FamilySet::EMPTY.primary(), None);
    }
}
