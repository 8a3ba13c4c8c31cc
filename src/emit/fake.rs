//! Faker expressions for seed rows.
//!
//! Columns are matched against [`RULES`] by name, first match wins. A rule is
//! skipped when its values do not fit the column type, e.g. an email for a
//! timestamp. When no rule applies, the expression is derived from the column
//! type.

use super::php::php_list;
use super::types::{is_boolean, is_fractional, is_integral, is_string, is_temporal, is_text};
use crate::ast::Column;

#[derive(Debug, Clone, Copy)]
pub enum Matcher {
    /// Lowercased name equals one of the keywords.
    Exact(&'static [&'static str]),
    /// Lowercased name contains one of the keywords.
    Contains(&'static [&'static str]),
}

#[derive(Clone, Copy)]
pub enum FakeValue {
    Expr(&'static str),
    With(fn(&Column) -> String),
}

#[derive(Clone, Copy)]
pub struct FakeRule {
    pub category: &'static str,
    pub matcher: Matcher,
    pub value: FakeValue,
    /// Longest string the expression usually yields.
    pub longest: u32,
}

/// Kind of value a rule category yields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Yields {
    Text,
    Number,
    Temporal,
}

impl Matcher {
    pub fn matches(&self, name: &str) -> bool {
        match self {
            Self::Exact(words) => words.contains(&name),
            Self::Contains(words) => words.iter().any(|w| name.contains(w)),
        }
    }
}

impl FakeValue {
    fn render(&self, col: &Column) -> String {
        match self {
            Self::Expr(e) => e.to_string(),
            Self::With(f) => f(col),
        }
    }
}

const fn rule(category: &'static str, matcher: Matcher, value: FakeValue) -> FakeRule {
    FakeRule {
        category,
        matcher,
        value,
        longest: 32,
    }
}

impl FakeRule {
    const fn longest(mut self, n: u32) -> Self {
        self.longest = n;
        self
    }

    fn yields(&self) -> Yields {
        match self.category {
            "money" | "rating" | "count" => Yields::Number,
            "birth" | "start" | "end" | "date" | "time" => Yields::Temporal,
            _ => Yields::Text,
        }
    }

    /// Whether the rule's values can be stored in a column of type `base`.
    fn fits(&self, base: &str) -> bool {
        let numeric = is_integral(base) || is_fractional(base);
        match self.yields() {
            Yields::Text => !(numeric || is_temporal(base) || is_boolean(base)),
            Yields::Number => !(is_temporal(base) || is_boolean(base)),
            Yields::Temporal => !(numeric || is_boolean(base)),
        }
    }
}

use FakeValue::{Expr, With};
use Matcher::{Contains, Exact};

pub static RULES: &[FakeRule] = &[
    // Person names
    rule("person", Contains(&["first_name", "firstname"]), Expr("fake()->firstName()")),
    rule("person", Exact(&["nombre", "nombres"]), Expr("fake()->firstName()")),
    rule("person", Contains(&["last_name", "lastname", "apellido"]), Expr("fake()->lastName()")),
    rule("person", Exact(&["name", "full_name", "nombre_completo"]), Expr("fake()->name()")).longest(40),
    // Contact
    rule("contact", Contains(&["email", "correo"]), Expr("fake()->unique()->safeEmail()")).longest(40),
    rule("contact", Contains(&["phone", "telefono", "celular", "mobile"]), Expr("fake()->phoneNumber()")),
    // Address
    rule("address", Contains(&["address", "direccion", "street", "calle"]), Expr("fake()->streetAddress()")).longest(48),
    rule("address", Contains(&["city", "ciudad"]), Expr("fake()->city()")),
    rule("address", Exact(&["state", "province", "provincia"]), Expr("fake()->state()")),
    rule("address", Contains(&["country", "pais"]), Expr("fake()->country()")).longest(48),
    rule("address", Contains(&["zip", "postal"]), Expr("fake()->postcode()")),
    // Credentials
    rule("credentials", Contains(&["password", "contrasena", "clave"]), Expr("bcrypt('password')")).longest(60),
    rule("credentials", Contains(&["username", "usuario"]), Expr("fake()->unique()->userName()")),
    rule("credentials", Contains(&["token"]), Expr("fake()->sha256()")).longest(64),
    // Money
    rule(
        "money",
        Contains(&["price", "precio", "cost", "costo", "amount", "monto", "total", "salary", "salario"]),
        Expr("fake()->randomFloat(2, 1, 1000)"),
    ),
    // Dates
    rule("birth", Contains(&["birth", "nacimiento"]), With(birth_date)),
    rule("start", Contains(&["start", "inicio"]), With(start_date)),
    rule("end", Contains(&["end_", "_end", "fecha_fin", "ends_at", "finish"]), With(end_date)),
    rule("date", Contains(&["date", "fecha"]), With(any_date)),
    // Times
    rule("time", Contains(&["hora", "time"]), Expr("fake()->time('H:i:s')")),
    // Counts and ratings
    rule("rating", Contains(&["rating", "calificacion", "score", "puntuacion", "stars"]), Expr("fake()->numberBetween(1, 5)")),
    rule("count", Contains(&["quantity", "cantidad", "stock", "count"]), Expr("fake()->numberBetween(1, 100)")),
    rule("count", Exact(&["age", "edad", "years"]), Expr("fake()->numberBetween(18, 80)")),
    // Descriptive text
    rule(
        "text",
        Contains(&["description", "descripcion", "notes", "notas", "comment", "comentario", "observacion", "bio"]),
        Expr("fake()->paragraph()"),
    )
    .longest(400),
    rule("text", Contains(&["title", "titulo", "subject", "asunto"]), Expr("fake()->sentence(4)")).longest(64),
    // Categorical
    rule("enum", Contains(&["status", "estatus", "estado"]), With(status)),
    rule("enum", Contains(&["type", "tipo", "category", "categoria"]), With(category)),
    // Media and identifiers
    rule("media", Contains(&["image", "imagen", "photo", "foto", "avatar", "logo"]), Expr("fake()->imageUrl()")).longest(80),
    rule("media", Contains(&["url", "website", "sitio_web"]), Expr("fake()->url()")).longest(64),
    rule("identifier", Contains(&["uuid"]), Expr("fake()->uuid()")).longest(36),
    rule("identifier", Contains(&["code", "codigo", "sku"]), Expr("fake()->unique()->bothify('??-####')")),
];

/// The first rule a column name matches, regardless of the column type.
pub fn rule_for(name: &str) -> Option<&'static FakeRule> {
    let lower = name.to_lowercase();
    RULES.iter().find(|r| r.matcher.matches(&lower))
}

/// Faker expression for a plain (non foreign key) column.
pub fn fake_value(col: &Column) -> String {
    let values = col.enum_values();
    if col.base_type() == "enum" && !values.is_empty() {
        return format!("fake()->randomElement({})", php_list(&values));
    }
    let base = col.base_type();
    let lower = col.name.to_lowercase();
    let rule = RULES
        .iter()
        .filter(|r| r.matcher.matches(&lower))
        .find(|r| r.fits(&base));
    match rule {
        Some(rule) => bounded(rule, col, rule.value.render(col)),
        None => by_type(col),
    }
}

/// Shortens text rule output for a string column declared narrower than
/// what the rule yields.
fn bounded(rule: &FakeRule, col: &Column, expr: String) -> String {
    let base = col.base_type();
    if rule.yields() != Yields::Text || !is_string(&base) {
        return expr;
    }
    match col.declared_length() {
        Some(n) if n < rule.longest && rule.category == "text" => sized_text(Some(n)),
        Some(n) if n < rule.longest => format!("substr({expr}, 0, {n})"),
        _ => expr,
    }
}

/// Fallback when no name rule matches.
pub fn by_type(col: &Column) -> String {
    let base = col.base_type();
    match base.as_str() {
        "tinyint" => "fake()->numberBetween(0, 100)".to_string(),
        "smallint" => "fake()->numberBetween(1, 1000)".to_string(),
        "bigint" => "fake()->numberBetween(1, 100000)".to_string(),
        b if is_integral(b) => "fake()->numberBetween(1, 10000)".to_string(),
        b if is_fractional(b) => "fake()->randomFloat(2, 0, 1000)".to_string(),
        "boolean" | "bool" => "fake()->boolean()".to_string(),
        "date" | "datetime" | "timestamp" => any_date(col),
        "time" => "fake()->time('H:i:s')".to_string(),
        "year" => "fake()->year()".to_string(),
        "json" => "json_encode(['key' => fake()->word(), 'value' => fake()->word()])".to_string(),
        b if is_text(b) => "fake()->paragraph()".to_string(),
        b if is_string(b) => sized_text(col.declared_length()),
        _ => "fake()->word()".to_string(),
    }
}

/// Text sized to the declared length.
fn sized_text(length: Option<u32>) -> String {
    match length {
        Some(n) if n < 10 => format!("substr(fake()->word(), 0, {n})"),
        Some(n) if n <= 30 => "fake()->word()".to_string(),
        Some(n) if n <= 100 => "fake()->sentence(3)".to_string(),
        Some(n) => format!("fake()->text({})", n.min(200)),
        None => "fake()->sentence(3)".to_string(),
    }
}

fn date_format(col: &Column) -> &'static str {
    match col.base_type().as_str() {
        "datetime" | "timestamp" => "Y-m-d H:i:s",
        "time" => "H:i:s",
        _ => "Y-m-d",
    }
}

fn birth_date(col: &Column) -> String {
    format!("fake()->dateTimeBetween('-80 years', '-18 years')->format('{}')", date_format(col))
}

fn start_date(col: &Column) -> String {
    format!("fake()->dateTimeBetween('-1 month', '+1 week')->format('{}')", date_format(col))
}

fn end_date(col: &Column) -> String {
    format!("fake()->dateTimeBetween('+1 week', '+2 months')->format('{}')", date_format(col))
}

fn any_date(col: &Column) -> String {
    format!("fake()->dateTimeBetween('-1 year', 'now')->format('{}')", date_format(col))
}

fn status(col: &Column) -> String {
    let values = col.enum_values();
    if values.is_empty() {
        "fake()->randomElement(['active', 'inactive'])".to_string()
    } else {
        format!("fake()->randomElement({})", php_list(&values))
    }
}

fn category(col: &Column) -> String {
    let values = col.enum_values();
    if values.is_empty() {
        "fake()->word()".to_string()
    } else {
        format!("fake()->randomElement({})", php_list(&values))
    }
}
