use super::family::{
    Expectation, FamilyChecker, FamilySet, LiteralKind, Shape, TypeFamily,
    register_default_families,
};
use ahash::AHashMap;
use itertools::Itertools;
use std::fmt;

/// How many operands an operator or method accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arity {
    pub min: usize,
    pub max: Option<usize>,
}

impl Arity {
    pub const fn exactly(n: usize) -> Self {
        Self {
            min: n,
            max: Some(n),
        }
    }

    pub const fn at_least(n: usize) -> Self {
        Self { min: n, max: None }
    }

    pub const fn between(min: usize, max: usize) -> Self {
        Self {
            min,
            max: Some(max),
        }
    }

    pub fn admits(&self, count: usize) -> bool {
        count >= self.min && self.max.is_none_or(|max| count <= max)
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max {
            Some(max) if max == self.min => write!(f, "exactly {}", max),
            Some(max) => write!(f, "{} to {}", self.min, max),
            None => write!(f, "at least {}", self.min),
        }
    }
}

/// Allowed characters of a date or date-time format string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatClass {
    Date,
    DateTime,
}

impl FormatClass {
    pub fn admits(self, format: &str) -> bool {
        !format.is_empty() && format.chars().all(|c| self.allows(c))
    }

    fn allows(self, c: char) -> bool {
        let date = matches!(c, 'y' | 'M' | 'd' | 'o' | 't' | '-' | '/') || c.is_whitespace();
        match self {
            FormatClass::Date => date,
            FormatClass::DateTime => date || matches!(c, 'H' | 'h' | 'm' | 's' | ':'),
        }
    }

    pub fn pattern(self) -> &'static str {
        match self {
            FormatClass::Date => "^[yMdot\\s-/]+$",
            FormatClass::DateTime => "^[yMdotHhms\\s-/:]+$",
        }
    }
}

/// The rule for a single operand position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    Expr(Expectation),
    Format(FormatClass),
    /// A bare string naming the loop variable of `filter`.
    Binding,
}

/// The rule for an operator's whole operand list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operands {
    /// Every operand is held to the same expectation.
    Uniform(Expectation),
    /// Operand `i` is held to `layout[i]`.
    Positional(&'static [Operand]),
    /// The layout whose length equals the operand count applies.
    ByArity(&'static [&'static [Operand]]),
    /// Two operands that share one of the ordered families.
    Ordered,
    /// A bare expression, or an array wrapping exactly one.
    Unary,
}

/// A single-key operator such as `{"==": [a, b]}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signature {
    pub name: &'static str,
    pub result: TypeFamily,
    pub arity: Arity,
    pub operands: Operands,
}

/// What a method is invoked on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Receiver {
    Family(TypeFamily),
    /// A literal `{"var": ...}` lookup.
    Variable,
}

/// One overload of a `{"method": [receiver, name, args]}` call.
///
/// Overloads sharing a name differ only in receiver and result family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MethodSignature {
    pub receiver: Receiver,
    pub result: TypeFamily,
    /// `None` for methods invoked without an argument array.
    pub args: Option<(Arity, Operands)>,
}

const LOGIC: Operand = Operand::Expr(Expectation::Logic);
const NUMERIC: Operand = Operand::Expr(Expectation::Family(TypeFamily::Numeric));
const STRING: Operand = Operand::Expr(Expectation::Family(TypeFamily::String));
const DATE: Operand = Operand::Expr(Expectation::Family(TypeFamily::Date));
const DATE_TIME: Operand = Operand::Expr(Expectation::Family(TypeFamily::DateTime));
const TIME: Operand = Operand::Expr(Expectation::Family(TypeFamily::Time));

const ANY_OPERANDS: Operands = Operands::Uniform(Expectation::Logic);
const NUMERIC_OPERANDS: Operands = Operands::Uniform(Expectation::Family(TypeFamily::Numeric));
const NO_OPERANDS: Operands = Operands::Positional(&[]);
const FROM_UTC: Operands = Operands::Positional(&[STRING, STRING]);
const SUBSTR: Operands = Operands::Positional(&[STRING, NUMERIC, NUMERIC]);
const DATE_FORMAT: Operands = Operands::Positional(&[DATE, Operand::Format(FormatClass::Date)]);
const DATE_TIME_FORMAT: Operands =
    Operands::Positional(&[DATE_TIME, Operand::Format(FormatClass::DateTime)]);
const TO_UTC: Operands = Operands::ByArity(&[&[DATE_TIME, STRING], &[DATE, TIME, STRING]]);

const ONE_NUMERIC: Operands = Operands::Positional(&[NUMERIC]);
const ONE_STRING: Operands = Operands::Positional(&[STRING]);
const INDEX_OF: Operands = Operands::Positional(&[STRING, NUMERIC]);
const FILTER: Operands = Operands::ByArity(&[&[LOGIC], &[Operand::Binding, LOGIC]]);
const UPDATE_ITEM: Operands = Operands::Positional(&[NUMERIC, LOGIC]);

/// Defines the default operator table.
macro_rules! define_operators {
    ( $( ($name:expr, $result:ident, $arity:expr, $operands:expr) ),* $(,)? ) => {
        fn register_default_operators(registry: &mut AHashMap<&'static str, Signature>) {
            $(
                registry.insert($name, Signature {
                    name: $name,
                    result: TypeFamily::$result,
                    arity: $arity,
                    operands: $operands,
                });
            )*
        }
    };
}

define_operators! {
    // Equality and logic
    ("==", Boolean, Arity::exactly(2), ANY_OPERANDS),
    ("===", Boolean, Arity::exactly(2), ANY_OPERANDS),
    ("!=", Boolean, Arity::exactly(2), ANY_OPERANDS),
    ("!==", Boolean, Arity::exactly(2), ANY_OPERANDS),
    ("and", Boolean, Arity::at_least(2), ANY_OPERANDS),
    ("or", Boolean, Arity::at_least(2), ANY_OPERANDS),
    ("!", Boolean, Arity::exactly(1), Operands::Unary),
    ("!!", Boolean, Arity::exactly(1), Operands::Unary),

    // Ordering
    (">", Boolean, Arity::exactly(2), Operands::Ordered),
    (">=", Boolean, Arity::exactly(2), Operands::Ordered),
    ("<", Boolean, Arity::exactly(2), Operands::Ordered),
    ("<=", Boolean, Arity::exactly(2), Operands::Ordered),

    // Arithmetic
    ("+", Numeric, Arity::at_least(1), NUMERIC_OPERANDS),
    ("-", Numeric, Arity::at_least(1), NUMERIC_OPERANDS),
    ("*", Numeric, Arity::at_least(2), NUMERIC_OPERANDS),
    ("/", Numeric, Arity::exactly(2), NUMERIC_OPERANDS),
    ("%", Numeric, Arity::exactly(2), NUMERIC_OPERANDS),
    ("Date.currentYear", Numeric, Arity::exactly(0), NO_OPERANDS),
    ("Date.currentMonth", Numeric, Arity::exactly(0), NO_OPERANDS),
    ("Date.currentDay", Numeric, Arity::exactly(0), NO_OPERANDS),
    ("Time.currentHour", Numeric, Arity::exactly(0), NO_OPERANDS),
    ("Time.currentMinute", Numeric, Arity::exactly(0), NO_OPERANDS),
    ("Time.currentSecond", Numeric, Arity::exactly(0), NO_OPERANDS),

    // Text
    ("cat", String, Arity::at_least(2), ANY_OPERANDS),
    ("substr", String, Arity::between(2, 3), SUBSTR),
    ("Date.format", String, Arity::exactly(2), DATE_FORMAT),
    ("DateTime.format", String, Arity::exactly(2), DATE_TIME_FORMAT),
    ("DateTime.toUTC", String, Arity::between(2, 3), TO_UTC),

    // Temporal constructors
    ("Date.currentDate", Date, Arity::exactly(0), NO_OPERANDS),
    ("Date.fromUTC", Date, Arity::exactly(2), FROM_UTC),
    ("DateTime.currentDateTime", DateTime, Arity::exactly(0), NO_OPERANDS),
    ("DateTime.fromUTC", DateTime, Arity::exactly(2), FROM_UTC),
    ("Time.currentTime", Time, Arity::exactly(0), NO_OPERANDS),
    ("Time.fromUTC", Time, Arity::exactly(2), FROM_UTC),

    // Any
    ("if", Any, Arity::at_least(3), ANY_OPERANDS),
}

const DATE_UNITS: &[&str] = &["Days", "Weeks", "Months", "Years"];
const DATE_TIME_UNITS: &[&str] = &[
    "Seconds", "Minutes", "Hours", "Days", "Weeks", "Months", "Years",
];
const TIME_UNITS: &[&str] = &["Seconds", "Minutes", "Hours"];

fn register_default_methods(registry: &mut AHashMap<String, Vec<MethodSignature>>) {
    let mut add = |name: &str, receiver: Receiver, result: TypeFamily, args| {
        registry
            .entry(name.to_string())
            .or_default()
            .push(MethodSignature {
                receiver,
                result,
                args,
            });
    };
    use Receiver::Family;
    use TypeFamily::*;

    add("getItem", Family(List), Any, Some((Arity::exactly(1), ONE_NUMERIC)));
    add(
        "matchesPattern",
        Family(String),
        Boolean,
        Some((Arity::exactly(1), ONE_STRING)),
    );
    add("getCount", Receiver::Variable, Numeric, None);
    add("indexOf", Family(String), Numeric, Some((Arity::between(1, 2), INDEX_OF)));
    add("length", Family(String), Numeric, None);
    add("round", Family(Numeric), Numeric, Some((Arity::exactly(1), ONE_NUMERIC)));
    add("addItem", Family(List), List, Some((Arity::at_least(1), ANY_OPERANDS)));
    add("filter", Family(List), List, Some((Arity::between(1, 2), FILTER)));
    add("split", Family(String), List, Some((Arity::exactly(1), ONE_STRING)));
    add("sort", Family(List), List, Some((Arity::at_least(0), ANY_OPERANDS)));
    add("removeItem", Family(List), List, Some((Arity::between(0, 1), ONE_NUMERIC)));
    add("updateItem", Family(List), List, Some((Arity::exactly(2), UPDATE_ITEM)));

    for (family, units) in [(Date, DATE_UNITS), (DateTime, DATE_TIME_UNITS), (Time, TIME_UNITS)] {
        for (verb, unit) in ["add", "subtract"].into_iter().cartesian_product(units) {
            add(
                &format!("{}{}", verb, unit),
                Family(family),
                family,
                Some((Arity::exactly(1), ONE_NUMERIC)),
            );
        }
    }
}

/// The immutable operator, method and family tables shared by every validation.
pub struct Grammar {
    operators: AHashMap<&'static str, Signature>,
    methods: AHashMap<String, Vec<MethodSignature>>,
    families: Vec<Box<dyn FamilyChecker>>,
}

impl Grammar {
    pub fn new() -> Self {
        let mut operators = AHashMap::new();
        register_default_operators(&mut operators);
        let mut methods = AHashMap::new();
        register_default_methods(&mut methods);
        let mut families = Vec::new();
        register_default_families(&mut families);
        Self {
            operators,
            methods,
            families,
        }
    }

    pub fn operator(&self, key: &str) -> Option<&Signature> {
        self.operators.get(key)
    }

    pub fn methods(&self, name: &str) -> Option<&[MethodSignature]> {
        self.methods.get(name).map(Vec::as_slice)
    }

    /// Every family the analysed shape is a member of, in declared order.
    pub fn members(&self, shape: Shape) -> FamilySet {
        if shape == Shape::Literal(LiteralKind::Null) {
            return FamilySet::of(TypeFamily::Null);
        }
        self.families
            .iter()
            .filter(|checker| checker.classify(shape))
            .fold(FamilySet::EMPTY, |set, checker| set.with(checker.family()))
    }

    /// The members of the value produced by an operator or method of `result` family.
    pub fn members_of_result(&self, result: TypeFamily) -> FamilySet {
        let shape = match result {
            TypeFamily::Any => Shape::AnyArm,
            family => Shape::Call(family),
        };
        self.members(shape)
    }
}

impl Default for Grammar {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Grammar")
            .field("operators", &self.operators.len())
            .field("methods", &self.methods.len())
            .field("families", &self.families.len())
            .finish()
    }
}
