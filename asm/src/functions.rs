use crate::context::Context;
use crate::error::ParseError;
use crate::value::Value;

/// Dispatches a recognized function call by name over already-evaluated argument values.
pub fn call(name: &str, args: Vec<Value>, ctx: &Context) -> Result<Value, ParseError> {
    match name {
        "make" => make(args),
        "is_lt" => is_lt(args),
        "is_eq" => is_eq(args),
        "is_pow_of_two" => is_pow_of_two(args),
        "not" => not_fn(args),
        "plus" => plus(args),
        "minus" => minus(args),
        "zero_extend_numeric" => zero_extend_numeric(args),
        "concat_ident" => concat_ident(args),
        "read_var" => read_var(args, ctx),
        "hi" => hi(args),
        "mod" => modulo(args),
        other => Err(ParseError::new(format!("unknown function `{other}`"))),
    }
}

fn as_numeric(v: &Value) -> Result<(u64, usize), ParseError> {
    match v {
        Value::ConstantNumeric { value, num_words } => Ok((*value, *num_words)),
        other => Err(ParseError::new(format!("expected a numeric argument, got {other:?}"))),
    }
}

fn as_identifier(v: &Value) -> Result<&str, ParseError> {
    match v {
        Value::Identifier(name) => Ok(name),
        other => Err(ParseError::new(format!("expected an identifier argument, got {other:?}"))),
    }
}

fn expect_arity(args: &[Value], n: usize, name: &str) -> Result<(), ParseError> {
    if args.len() != n {
        return Err(ParseError::new(format!(
            "{name} expects {n} argument(s), got {}",
            args.len()
        )));
    }
    Ok(())
}

fn make(mut args: Vec<Value>) -> Result<Value, ParseError> {
    if args.is_empty() {
        return Err(ParseError::new("make requires at least 1 argument"));
    }
    let (n, _) = as_numeric(&args.remove(0))?;
    let rest = args;
    let total: usize = rest.iter().map(Value::num_words).sum();
    if total as u64 != n {
        return Err(ParseError::new(format!(
            "make: declared width {n} does not match concatenated width {total}"
        )));
    }
    Ok(Value::MakeResult(rest))
}

fn is_lt(args: Vec<Value>) -> Result<Value, ParseError> {
    expect_arity(&args, 2, "is_lt")?;
    let (a, _) = as_numeric(&args[0])?;
    let (b, _) = as_numeric(&args[1])?;
    Ok(Value::ConstantNumeric { value: (a < b) as u64, num_words: 1 })
}

fn is_eq(args: Vec<Value>) -> Result<Value, ParseError> {
    expect_arity(&args, 2, "is_eq")?;
    let eq = match (&args[0], &args[1]) {
        (Value::Identifier(a), Value::Identifier(b)) => a == b,
        _ => {
            let (a, _) = as_numeric(&args[0])?;
            let (b, _) = as_numeric(&args[1])?;
            a == b
        }
    };
    Ok(Value::ConstantNumeric { value: eq as u64, num_words: 1 })
}

fn is_pow_of_two(args: Vec<Value>) -> Result<Value, ParseError> {
    expect_arity(&args, 1, "is_pow_of_two")?;
    let (a, _) = as_numeric(&args[0])?;
    let result = a > 1 && (a & (a - 1)) == 0;
    Ok(Value::ConstantNumeric { value: result as u64, num_words: 1 })
}

fn not_fn(args: Vec<Value>) -> Result<Value, ParseError> {
    expect_arity(&args, 1, "not")?;
    let (a, _) = as_numeric(&args[0])?;
    Ok(Value::ConstantNumeric { value: (a == 0) as u64, num_words: 1 })
}

fn plus(args: Vec<Value>) -> Result<Value, ParseError> {
    expect_arity(&args, 2, "plus")?;
    let (a, wa) = as_numeric(&args[0])?;
    let (b, wb) = as_numeric(&args[1])?;
    let num_words = wa.max(wb);
    let sum = a.checked_add(b).ok_or_else(|| ParseError::new("plus overflowed"))?;
    if sum >= 64u64.pow(num_words as u32) {
        return Err(ParseError::new(format!("plus: {a} + {b} overflows {num_words} word(s)")));
    }
    Ok(Value::ConstantNumeric { value: sum, num_words })
}

fn minus(args: Vec<Value>) -> Result<Value, ParseError> {
    expect_arity(&args, 2, "minus")?;
    let (a, wa) = as_numeric(&args[0])?;
    let (b, wb) = as_numeric(&args[1])?;
    if b > a {
        return Err(ParseError::new(format!("minus: {a} - {b} is negative")));
    }
    Ok(Value::ConstantNumeric { value: a - b, num_words: wa.max(wb) })
}

fn zero_extend_numeric(args: Vec<Value>) -> Result<Value, ParseError> {
    expect_arity(&args, 2, "zero_extend_numeric")?;
    let (value, current_width) = as_numeric(&args[0])?;
    let (new_width, _) = as_numeric(&args[1])?;
    let new_width = new_width as usize;
    if new_width < current_width {
        return Err(ParseError::new("zero_extend_numeric: new width is narrower than the value"));
    }
    Ok(Value::ConstantNumeric { value, num_words: new_width })
}

fn concat_ident(args: Vec<Value>) -> Result<Value, ParseError> {
    if args.len() < 2 {
        return Err(ParseError::new("concat_ident requires at least 2 arguments"));
    }
    let mut joined = String::new();
    for arg in &args {
        joined.push_str(as_identifier(arg)?);
    }
    Ok(Value::Identifier(joined))
}

fn read_var(args: Vec<Value>, ctx: &Context) -> Result<Value, ParseError> {
    expect_arity(&args, 1, "read_var")?;
    let name = as_identifier(&args[0])?;
    ctx.find_variable(name)
        .ok_or_else(|| ParseError::new(format!("can't find variable `{name}`")))
}

fn hi(args: Vec<Value>) -> Result<Value, ParseError> {
    expect_arity(&args, 1, "hi")?;
    let (value, num_words) = as_numeric(&args[0])?;
    if num_words < 2 {
        return Err(ParseError::new("hi: value is not multi-word"));
    }
    let high = value / 64u64.pow((num_words - 1) as u32);
    Ok(Value::ConstantNumeric { value: high % 64, num_words: 1 })
}

fn modulo(args: Vec<Value>) -> Result<Value, ParseError> {
    expect_arity(&args, 2, "mod")?;
    let (a, _) = as_numeric(&args[0])?;
    let (b, _) = as_numeric(&args[1])?;
    if b == 0 {
        return Err(ParseError::new("mod by zero"));
    }
    Ok(Value::ConstantNumeric { value: a % b, num_words: 1 })
}
