//! Built-in math functions (Rust) and their metadata.
//!
//! Conventions:
//! - Formula-facing names are lowercase (`sum`, `sqrt`), matching the usual
//!   math-expression vocabulary.
//! - Variadic functions take any number of arguments. Rhai has no variadic
//!   registration, so formula preprocessing packs the arguments of a call to
//!   one of [`VARIADIC`] into a single array; nested arrays (including
//!   expanded ranges like `A1:A3`) are flattened.
//! - If you add a built-in, list it in `BUILTINS` so arity failures are
//!   reported as argument errors rather than unknown functions.

use rhai::{Dynamic, Engine, EvalAltResult, Position};

pub struct Builtin {
    pub name: &'static str,
    pub description: &'static str,
}

/// Functions whose call arguments are packed into one array before evaluation.
pub const VARIADIC: [&str; 5] = ["sum", "mean", "min", "max", "count"];

pub const BUILTINS: &[Builtin] = &[
    Builtin { name: "sum", description: "Sum of all arguments" },
    Builtin { name: "mean", description: "Arithmetic mean of all arguments" },
    Builtin { name: "min", description: "Smallest argument" },
    Builtin { name: "max", description: "Largest argument" },
    Builtin { name: "count", description: "Number of values, arrays flattened" },
    Builtin { name: "abs", description: "Absolute value" },
    Builtin { name: "sqrt", description: "Square root" },
    Builtin { name: "pow", description: "x raised to the power y" },
    Builtin { name: "round", description: "Round to the nearest integer, or to n decimals" },
    Builtin { name: "floor", description: "Round down" },
    Builtin { name: "ceil", description: "Round up" },
    Builtin { name: "exp", description: "e raised to the power x" },
    Builtin { name: "log", description: "Natural logarithm, or logarithm in a given base" },
    Builtin { name: "log10", description: "Base-10 logarithm" },
    Builtin { name: "sin", description: "Sine (radians)" },
    Builtin { name: "cos", description: "Cosine (radians)" },
    Builtin { name: "tan", description: "Tangent (radians)" },
    Builtin { name: "asin", description: "Arcsine" },
    Builtin { name: "acos", description: "Arccosine" },
    Builtin { name: "atan", description: "Arctangent" },
    Builtin { name: "atan2", description: "Arctangent of y/x using both signs" },
    Builtin { name: "mod", description: "Remainder with the sign of the divisor" },
    Builtin { name: "pi", description: "The constant pi" },
    Builtin { name: "e", description: "Euler's number" },
    Builtin { name: "random", description: "Uniform random number in [0, 1)" },
];

pub fn is_builtin(name: &str) -> bool {
    BUILTINS.iter().any(|b| b.name == name)
}

pub fn is_variadic(name: &str) -> bool {
    VARIADIC.iter().any(|n| *n == name)
}

fn invalid_arg(message: &str) -> Box<EvalAltResult> {
    EvalAltResult::ErrorRuntime(message.into(), Position::NONE).into()
}

fn to_number(value: &Dynamic) -> Result<f64, Box<EvalAltResult>> {
    if let Ok(n) = value.as_float() {
        return Ok(n);
    }
    if let Ok(n) = value.as_int() {
        return Ok(n as f64);
    }
    if let Ok(b) = value.as_bool() {
        return Ok(if b { 1.0 } else { 0.0 });
    }
    Err(invalid_arg(&format!(
        "expected a number, got {}",
        value.type_name()
    )))
}

fn flatten_into(value: &Dynamic, out: &mut Vec<Dynamic>) {
    match value.clone().try_cast::<rhai::Array>() {
        Some(items) => items.iter().for_each(|item| flatten_into(item, out)),
        None => out.push(value.clone()),
    }
}

fn flatten_numbers(args: &[Dynamic]) -> Result<Vec<f64>, Box<EvalAltResult>> {
    let mut flat = Vec::new();
    for arg in args {
        flatten_into(arg, &mut flat);
    }
    flat.iter().map(to_number).collect()
}

fn sum(args: &[Dynamic]) -> Result<f64, Box<EvalAltResult>> {
    Ok(flatten_numbers(args)?.iter().sum())
}

fn mean(args: &[Dynamic]) -> Result<f64, Box<EvalAltResult>> {
    let values = flatten_numbers(args)?;
    if values.is_empty() {
        return Err(invalid_arg("mean of an empty set"));
    }
    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

fn min(args: &[Dynamic]) -> Result<f64, Box<EvalAltResult>> {
    flatten_numbers(args)?
        .into_iter()
        .reduce(f64::min)
        .ok_or_else(|| invalid_arg("min of an empty set"))
}

fn max(args: &[Dynamic]) -> Result<f64, Box<EvalAltResult>> {
    flatten_numbers(args)?
        .into_iter()
        .reduce(f64::max)
        .ok_or_else(|| invalid_arg("max of an empty set"))
}

fn count(args: &[Dynamic]) -> Result<f64, Box<EvalAltResult>> {
    let mut flat = Vec::new();
    for arg in args {
        flatten_into(arg, &mut flat);
    }
    Ok(flat.len() as f64)
}

type Variadic = fn(&[Dynamic]) -> Result<f64, Box<EvalAltResult>>;

fn register_variadic(engine: &mut Engine, name: &'static str, f: Variadic) {
    engine.register_fn(name, move |args: Dynamic| f(&[args]));
}

/// Unary functions are registered for both numeric types so they win over
/// Rhai's own same-named package functions (Rhai's `log` is base 10).
fn register_unary(engine: &mut Engine, name: &'static str, f: fn(f64) -> f64) {
    engine.register_fn(name, move |x: f64| f(x));
    engine.register_fn(name, move |x: i64| f(x as f64));
    engine.register_fn(name, move |x: Dynamic| -> Result<f64, Box<EvalAltResult>> {
        Ok(f(to_number(&x)?))
    });
}

fn register_binary(engine: &mut Engine, name: &'static str, f: fn(f64, f64) -> f64) {
    engine.register_fn(name, move |x: f64, y: f64| f(x, y));
    engine.register_fn(
        name,
        move |x: Dynamic, y: Dynamic| -> Result<f64, Box<EvalAltResult>> {
            Ok(f(to_number(&x)?, to_number(&y)?))
        },
    );
}

fn round_to(x: f64, decimals: f64) -> f64 {
    let factor = 10f64.powi(decimals.clamp(0.0, 15.0) as i32);
    (x * factor).round() / factor
}

fn floor_mod(x: f64, y: f64) -> f64 {
    x - y * (x / y).floor()
}

/// Register all built-in functions into the Rhai engine.
pub fn register_builtins(engine: &mut Engine) {
    register_variadic(engine, "sum", sum);
    register_variadic(engine, "mean", mean);
    register_variadic(engine, "min", min);
    register_variadic(engine, "max", max);
    register_variadic(engine, "count", count);

    register_unary(engine, "abs", f64::abs);
    register_unary(engine, "sqrt", f64::sqrt);
    register_unary(engine, "round", f64::round);
    register_unary(engine, "floor", f64::floor);
    register_unary(engine, "ceil", f64::ceil);
    register_unary(engine, "exp", f64::exp);
    register_unary(engine, "log", f64::ln);
    register_unary(engine, "log10", f64::log10);
    register_unary(engine, "sin", f64::sin);
    register_unary(engine, "cos", f64::cos);
    register_unary(engine, "tan", f64::tan);
    register_unary(engine, "asin", f64::asin);
    register_unary(engine, "acos", f64::acos);
    register_unary(engine, "atan", f64::atan);

    register_binary(engine, "pow", f64::powf);
    register_binary(engine, "round", round_to);
    register_binary(engine, "log", |x, base| x.ln() / base.ln());
    register_binary(engine, "atan2", f64::atan2);
    register_binary(engine, "mod", floor_mod);

    engine.register_fn("pi", || std::f64::consts::PI);
    engine.register_fn("e", || std::f64::consts::E);
    engine.register_fn("random", rand::random::<f64>);
}
