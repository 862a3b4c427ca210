//! Line emitter for generated programs.
//!
//! Generators describe statements (`init`, `set`, `if`, `for`, ...) and the
//! emitter renders each through the language's templates, tracking the block
//! depth so indentation comes from the `indent` template alone. Expressions
//! are built as plain strings by the helper methods (`var`, `at`, `call`,
//! ...) and fed back in as bindings.

use std::cell::Cell;

use crate::bind;
use crate::error::Result;
use crate::language::LanguageDefinition;
use crate::literal::{format_double, format_int};
use crate::pack::{DataArray, Method, NumberKind, Numbers, PackagingMode};
use crate::template::{render, Bindings};

pub struct Emitter<'l> {
    lang: &'l LanguageDefinition,
    mode: PackagingMode,
    method: Method,
    precision: Option<usize>,
    depth: usize,
    lines: Vec<String>,
    /// Set when a math call is rendered; decides whether `import_math` is emitted.
    uses_math: Cell<bool>,
}

impl<'l> Emitter<'l> {
    pub fn new(lang: &'l LanguageDefinition, mode: PackagingMode, precision: Option<usize>) -> Self {
        Self {
            lang,
            mode,
            method: Method::Predict,
            precision,
            depth: 0,
            lines: Vec::new(),
            uses_math: Cell::new(false),
        }
    }

    /// Start writing at a given block depth.
    pub fn at_depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn language(&self) -> &'l LanguageDefinition {
        self.lang
    }

    pub fn mode(&self) -> PackagingMode {
        self.mode
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn uses_math(&self) -> bool {
        self.uses_math.get()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }

    // ── Raw output ─────────────────────────────────────────────────

    pub fn render(&self, key: &str, bindings: &Bindings<'_>) -> Result<String> {
        render(key, self.lang, bindings)
    }

    /// Write rendered text at the current depth. Empty text writes nothing,
    /// so optional template slots can be left blank in a language table.
    pub fn line(&mut self, text: &str) -> Result<()> {
        if text.is_empty() {
            return Ok(());
        }
        let indent = self.lang.template("indent")?.repeat(self.depth);
        for line in text.lines() {
            if line.is_empty() {
                self.lines.push(String::new());
            } else {
                self.lines.push(format!("{}{}", indent, line));
            }
        }
        Ok(())
    }

    /// Write text verbatim, ignoring the current depth.
    pub fn raw(&mut self, text: &str) {
        self.lines.extend(text.lines().map(|l| l.to_string()));
    }

    /// Append lines produced by another emitter.
    pub fn extend(&mut self, lines: Vec<String>) {
        self.lines.extend(lines);
    }

    /// Separate sections with one blank line; never doubles up.
    pub fn blank(&mut self) {
        if self.lines.last().is_some_and(|l| !l.is_empty()) {
            self.lines.push(String::new());
        }
    }

    pub fn stmt(&mut self, key: &str, bindings: &Bindings<'_>) -> Result<()> {
        let text = self.render(key, bindings)?;
        self.line(&text)
    }

    /// Write a block opener and indent what follows.
    pub fn open(&mut self, key: &str, bindings: &Bindings<'_>) -> Result<()> {
        self.stmt(key, bindings)?;
        self.depth += 1;
        Ok(())
    }

    /// Dedent and write a block closer.
    pub fn close(&mut self, key: &str) -> Result<()> {
        self.depth = self.depth.saturating_sub(1);
        self.stmt(key, &Bindings::new())
    }

    /// A simple statement followed by the language's joiner.
    fn terminated(&mut self, key: &str, bindings: &Bindings<'_>) -> Result<()> {
        let text = self.render(key, bindings)?;
        let join = self.lang.template("join")?;
        self.line(&format!("{}{}", text, join))
    }

    // ── Statements ─────────────────────────────────────────────────

    pub fn init(&mut self, name: &str, kind: NumberKind, value: &str) -> Result<()> {
        let ty = self.type_name(kind)?;
        self.stmt("init", &bind!("name" => name, "type" => ty, "value" => value))
    }

    pub fn init_int(&mut self, name: &str, value: i64) -> Result<()> {
        let literal = self.int(value)?;
        self.init(name, NumberKind::Int, &literal)
    }

    /// Structural double variable; the initial value is written exactly.
    pub fn init_double(&mut self, name: &str, value: f64) -> Result<()> {
        let literal = self.exact(value)?;
        self.init(name, NumberKind::Double, &literal)
    }

    pub fn set(&mut self, target: &str, value: &str) -> Result<()> {
        self.terminated("set", &bind!("target" => target, "value" => value))
    }

    pub fn ret(&mut self, value: &str) -> Result<()> {
        self.terminated("return", &bind!("value" => value))
    }

    /// A fresh local array of `n` zeros.
    pub fn zeros(&mut self, name: &str, kind: NumberKind, n: usize) -> Result<()> {
        let ty = self.type_name(kind)?;
        let zero = match kind {
            NumberKind::Int => self.int(0)?,
            NumberKind::Double => self.exact(0.0)?,
        };
        let n = self.count(n)?;
        self.stmt(
            "zeros[]",
            &bind!("name" => name, "type" => ty, "n" => n, "zero" => zero),
        )
    }

    /// The zeroed probability array a function returns. Unlike a `zeros`
    /// local it stays valid after the call in every language.
    pub fn result(&mut self, name: &str, n: usize) -> Result<()> {
        let ty = self.type_name(NumberKind::Double)?;
        let zero = self.exact(0.0)?;
        let n = self.count(n)?;
        self.stmt(
            "result[]",
            &bind!("name" => name, "type" => ty, "n" => n, "zero" => zero),
        )
    }

    pub fn if_(&mut self, a: &str, op: &str, b: &str) -> Result<()> {
        self.open("if", &bind!("a" => a, "op" => op, "b" => b))
    }

    pub fn else_(&mut self) -> Result<()> {
        self.depth = self.depth.saturating_sub(1);
        self.stmt("else", &Bindings::new())?;
        self.depth += 1;
        Ok(())
    }

    pub fn end_if(&mut self) -> Result<()> {
        self.close("endif")
    }

    /// Counting loop over `start..end`; `i` is the raw loop variable name and
    /// the bounds are expressions.
    pub fn for_(&mut self, i: &str, start: &str, end: &str) -> Result<()> {
        self.open("for", &bind!("i" => i, "start" => start, "end" => end))
    }

    /// Counting loop with literal bounds.
    pub fn for_n(&mut self, i: &str, start: usize, end: usize) -> Result<()> {
        let start = self.count(start)?;
        let end = self.count(end)?;
        self.for_(i, &start, &end)
    }

    pub fn end_for(&mut self) -> Result<()> {
        self.close("endfor")
    }

    pub fn while_(&mut self, a: &str, op: &str, b: &str) -> Result<()> {
        self.open("while", &bind!("a" => a, "op" => op, "b" => b))
    }

    pub fn end_while(&mut self) -> Result<()> {
        self.close("endwhile")
    }

    /// Declare `array` through `base` (`arr`, `global_arr` or `decl`), picking
    /// the template of matching rank.
    pub fn declare(&mut self, base: &str, array: &DataArray) -> Result<()> {
        let key = format!("{}{}", base, "[]".repeat(array.rank()));
        let values = if base == "decl" {
            String::new()
        } else {
            self.literal(array)?
        };
        let ty = self.type_name(array.kind())?;
        let dim = |i: usize| array.shape.get(i).map(|d| d.to_string()).unwrap_or_default();
        self.stmt(
            &key,
            &bind!(
                "name" => array.name.as_str(),
                "type" => ty,
                "values" => values,
                "n" => dim(0),
                "m" => dim(1),
                "k" => dim(2),
            ),
        )
    }

    // ── Expressions ────────────────────────────────────────────────

    /// Reference to a local variable.
    pub fn var(&self, name: &str) -> Result<String> {
        self.render("ref", &bind!("name" => name))
    }

    /// Reference to a parameter array: local when embedded, top-level otherwise.
    pub fn data(&self, name: &str) -> Result<String> {
        match self.mode {
            PackagingMode::Embedded => self.var(name),
            PackagingMode::Split | PackagingMode::Externalized => {
                self.render("global_ref", &bind!("name" => name))
            }
        }
    }

    pub fn at(&self, array: &str, i: &str) -> Result<String> {
        self.render("index", &bind!("array" => array, "i" => i))
    }

    pub fn at2(&self, array: &str, i: &str, j: &str) -> Result<String> {
        let row = self.at(array, i)?;
        self.at(&row, j)
    }

    pub fn double(&self, value: f64) -> Result<String> {
        format_double(value, self.precision, self.lang)
    }

    /// A structural constant (`0.5`, `1.0`, ...), never rounded.
    pub fn exact(&self, value: f64) -> Result<String> {
        format_double(value, None, self.lang)
    }

    /// A parameter literal usable as an operand: negative values are
    /// parenthesized so they can follow any binary operator.
    pub fn term(&self, value: f64) -> Result<String> {
        let literal = self.double(value)?;
        if literal.starts_with('-') {
            Ok(format!("({})", literal))
        } else {
            Ok(literal)
        }
    }

    pub fn int(&self, value: i64) -> Result<String> {
        format_int(value, self.lang)
    }

    /// An index or size literal.
    pub fn count(&self, n: usize) -> Result<String> {
        self.int(n as i64)
    }

    /// One-argument math function (`exp`, `log`, `sqrt`, `abs`, `tanh`).
    pub fn call(&self, func: &str, x: &str) -> Result<String> {
        self.uses_math.set(true);
        self.render(func, &bind!("x" => x))
    }

    pub fn pow(&self, a: &str, b: &str) -> Result<String> {
        self.uses_math.set(true);
        self.render("pow", &bind!("a" => a, "b" => b))
    }

    pub fn type_name(&self, kind: NumberKind) -> Result<String> {
        let primitive = self.render(kind.key(), &Bindings::new())?;
        self.render("type", &bind!("value" => primitive))
    }

    /// Nested bracket literal of an array's values.
    pub fn literal(&self, array: &DataArray) -> Result<String> {
        let items = match &array.values {
            Numbers::Int(values) => values
                .iter()
                .map(|v| self.int(*v))
                .collect::<Result<Vec<_>>>()?,
            Numbers::Double(values) => values
                .iter()
                .map(|v| self.double(*v))
                .collect::<Result<Vec<_>>>()?,
        };
        self.nest(&items, &array.shape)
    }

    fn nest(&self, items: &[String], shape: &[usize]) -> Result<String> {
        if shape.len() <= 1 {
            return self.render("in_brackets", &bind!("value" => items.join(", ")));
        }
        let stride = shape[1..].iter().product::<usize>().max(1);
        let parts = items
            .chunks(stride)
            .map(|chunk| self.nest(chunk, &shape[1..]))
            .collect::<Result<Vec<_>>>()?;
        self.render("in_brackets", &bind!("value" => parts.join(", ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::registry;

    fn emitter(key: &str, mode: PackagingMode) -> Emitter<'static> {
        Emitter::new(registry().get(key).unwrap(), mode, None)
    }

    #[test]
    fn test_blocks_indent_with_language_unit() {
        let mut e = emitter("go", PackagingMode::Embedded);
        let x = e.var("x").unwrap();
        e.if_(&x, ">", "0.0").unwrap();
        e.ret("1").unwrap();
        e.else_().unwrap();
        e.ret("0").unwrap();
        e.end_if().unwrap();
        assert_eq!(
            e.lines(),
            ["if x > 0.0 {", "\treturn 1", "} else {", "\treturn 0", "}"]
        );
    }

    #[test]
    fn test_joiner_terminates_simple_statements() {
        let mut c = emitter("c", PackagingMode::Embedded);
        c.set("a", "b").unwrap();
        let mut ruby = emitter("ruby", PackagingMode::Embedded);
        ruby.set("a", "b").unwrap();
        assert_eq!(c.lines(), ["a = b;"]);
        assert_eq!(ruby.lines(), ["a = b"]);
    }

    #[test]
    fn test_typed_and_untyped_init() {
        let mut c = emitter("c", PackagingMode::Embedded);
        c.init_double("acc", 0.5).unwrap();
        let mut php = emitter("php", PackagingMode::Embedded);
        php.init_int("best", 0).unwrap();
        assert_eq!(c.lines(), ["double acc = 0.5;"]);
        assert_eq!(php.lines(), ["$best = 0;"]);
    }

    #[test]
    fn test_data_reference_follows_mode() {
        let embedded = emitter("ruby", PackagingMode::Embedded);
        let split = emitter("ruby", PackagingMode::Split);
        assert_eq!(embedded.data("priors").unwrap(), "priors");
        assert_eq!(split.data("priors").unwrap(), "$priors");
    }

    #[test]
    fn test_math_usage_tracked() {
        let e = emitter("go", PackagingMode::Embedded);
        assert!(!e.uses_math());
        assert_eq!(e.call("exp", "x").unwrap(), "math.Exp(x)");
        assert!(e.uses_math());
    }

    #[test]
    fn test_literal_ranks() {
        let e = emitter("java", PackagingMode::Embedded);
        let flat = DataArray::ints("a", vec![1, 2, 3]);
        let matrix = DataArray::matrix("b", &[vec![1.0, 2.0], vec![3.0, 4.0]]);
        let cube = DataArray::cube("c", &[vec![vec![1.0], vec![2.0]], vec![vec![3.0], vec![4.0]]]);
        insta::assert_snapshot!(e.literal(&flat).unwrap(), @"{1, 2, 3}");
        insta::assert_snapshot!(e.literal(&matrix).unwrap(), @"{{1.0, 2.0}, {3.0, 4.0}}");
        insta::assert_snapshot!(e.literal(&cube).unwrap(), @"{{{1.0}, {2.0}}, {{3.0}, {4.0}}}");
    }

    #[test]
    fn test_declare_picks_rank_template() {
        let mut e = emitter("c", PackagingMode::Split);
        e.declare("global_arr", &DataArray::matrix("w", &[vec![1.0], vec![2.0]]))
            .unwrap();
        assert_eq!(e.lines(), ["double w[2][1] = {{1.0}, {2.0}};"]);
    }

    #[test]
    fn test_zeros_uses_typed_zero() {
        let mut js = emitter("js", PackagingMode::Embedded);
        js.zeros("proba", NumberKind::Double, 3).unwrap();
        assert_eq!(js.lines(), ["let proba = new Array(3).fill(0.0);"]);
    }

    #[test]
    fn test_result_array_outlives_the_call() {
        let mut c = emitter("c", PackagingMode::Embedded).at_depth(1);
        c.result("proba", 2).unwrap();
        assert_eq!(
            c.lines(),
            [
                "    static double proba[2];",
                "    for (int i = 0; i < 2; i++) proba[i] = 0.0;",
            ]
        );
        let mut go = emitter("go", PackagingMode::Split).with_method(Method::PredictProba);
        assert_eq!(go.method(), Method::PredictProba);
        go.result("proba", 2).unwrap();
        assert_eq!(go.lines(), ["proba := make([]float64, 2)"]);
    }
}
