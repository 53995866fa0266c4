use std::rc::Rc;

use crate::assembler::Assembler;
use crate::context::{Context, InstructionMacro};
use crate::error::ParseError;
use crate::parser::Parser;
use crate::traceback::ProgramTraceback;
use crate::value::Value;

/// Runs a captured code block in `ctx`: re-lexes its lines as a nested program and parses them
/// there, threading `caller` as the enclosing traceback frame for anything it places or errors on.
pub fn execute_code_block(
    code: &Value,
    assembler: &mut Assembler,
    ctx: &Rc<Context>,
    caller: Option<ProgramTraceback>,
) -> Result<(), ParseError> {
    let (lines, origin) = match code {
        Value::Code { lines, origin, .. } => (lines.clone(), origin.clone()),
        other => return Err(ParseError::new(format!("expected a code block, got {other:?}"))),
    };
    let mut parser = Parser::new(origin, lines.join("\n"));
    parser.parse_program(assembler, ctx, caller)
}

/// `DATA`: place one or more already-evaluated values at the current address.
pub fn run_data(
    values: Vec<Value>,
    assembler: &mut Assembler,
    traceback: ProgramTraceback,
) -> Result<(), ParseError> {
    for value in values {
        assembler.run_data_command(value, traceback.clone())?;
    }
    Ok(())
}

/// `SKIP_DATA count`: reserves `count` words without writing anything into them, leaving them free
/// for a later `DATA` at that address.
pub fn run_skip_data(count: &Value, assembler: &mut Assembler) -> Result<(), ParseError> {
    let count = match count {
        Value::ConstantNumeric { value, .. } => *value as usize,
        other => return Err(ParseError::new(format!("SKIP_DATA expects a number, got {other:?}"))),
    };
    assembler.skip(count);
    Ok(())
}

/// `DEFINE COMMAND` / `DEFINE INTERNAL_COMMAND`: registers a user macro in `ctx`.
pub fn run_define_command(
    name: String,
    params: Vec<String>,
    body: Value,
    ctx: &Rc<Context>,
    is_internal: bool,
) -> Result<(), ParseError> {
    if !matches!(body, Value::Code { .. }) {
        return Err(ParseError::new("DEFINE COMMAND body must be a code block"));
    }
    ctx.define_command(InstructionMacro { name, params, body, context: ctx.clone(), is_internal })
}

/// `DEFINE VARIABLE name value`: binds a new variable in `ctx`.
pub fn run_define_variable(name: String, value: Value, ctx: &Context) -> Result<(), ParseError> {
    ctx.define_variable(name, value)
}

/// `SET VARIABLE name value`: rebinds an existing variable, walking outward to find it.
pub fn run_set_variable(name: &str, value: Value, ctx: &Context) -> Result<(), ParseError> {
    ctx.set_variable(name, value)
}

/// Invokes a user-defined command: binds `args` to its formal parameters in a fresh scope nested
/// under the macro's *defining* context (lexical scoping, not the call site's), then runs its body.
pub fn run_invoke(
    instruction: &InstructionMacro,
    args: Vec<Value>,
    assembler: &mut Assembler,
    caller: Option<ProgramTraceback>,
) -> Result<(), ParseError> {
    if args.len() != instruction.params.len() {
        return Err(ParseError::new(format!(
            "command `{}` expects {} argument(s), got {}",
            instruction.name,
            instruction.params.len(),
            args.len()
        )));
    }
    let call_scope = Context::child(&instruction.context);
    for (param, arg) in instruction.params.iter().zip(args) {
        call_scope.define_variable(param.clone(), arg)?;
    }
    execute_code_block(&instruction.body, assembler, &call_scope, caller)
}

/// `IF cond block`: runs `block` in a fresh child scope when `cond` is nonzero.
pub fn run_if(
    cond: &Value,
    block: &Value,
    assembler: &mut Assembler,
    ctx: &Rc<Context>,
    caller: Option<ProgramTraceback>,
) -> Result<(), ParseError> {
    if cond_is_true(cond)? {
        let child_ctx = Context::child(ctx);
        execute_code_block(block, assembler, &child_ctx, caller)?;
    }
    Ok(())
}

/// `LOOP cond_var cond_block body_block`: re-evaluates `cond_block` in a fresh scope on every
/// iteration (so `DEFINE VARIABLE cond_var` never collides with a previous iteration's binding),
/// looks up `cond_var` there, and stops when it's unset or zero.
pub fn run_loop(
    cond_var: &str,
    cond_block: &Value,
    body_block: &Value,
    assembler: &mut Assembler,
    ctx: &Rc<Context>,
    caller: Option<ProgramTraceback>,
) -> Result<(), ParseError> {
    let loop_ctx = Context::child(ctx);
    loop {
        let cond_scope = Context::child(&loop_ctx);
        execute_code_block(cond_block, assembler, &cond_scope, caller.clone())?;
        let cond_value = cond_scope.find_variable(cond_var).ok_or_else(|| {
            ParseError::new(format!("LOOP condition variable `{cond_var}` was never set"))
        })?;
        if !cond_is_true(&cond_value)? {
            break;
        }
        let body_scope = Context::child(&loop_ctx);
        execute_code_block(body_block, assembler, &body_scope, caller.clone())?;
    }
    Ok(())
}

/// `UP block`: runs `block` in the parent of its own lexically captured context, not the caller's
/// context — used by macro bodies to mutate their invoker's scope.
pub fn run_up(
    block: &Value,
    assembler: &mut Assembler,
    caller: Option<ProgramTraceback>,
) -> Result<(), ParseError> {
    let captured = match block {
        Value::Code { context, .. } => context.clone(),
        other => return Err(ParseError::new(format!("expected a code block, got {other:?}"))),
    };
    let parent = captured
        .parent()
        .ok_or_else(|| ParseError::new("UP used at the top-level context"))?
        .clone();
    execute_code_block(block, assembler, &parent, caller)
}

/// `ASSERT cond`: raises a `ParseError` if `cond` is zero.
pub fn run_assert(cond: &Value, message: Option<&str>) -> Result<(), ParseError> {
    if !cond_is_true(cond)? {
        return Err(ParseError::new(
            message.map(str::to_string).unwrap_or_else(|| "assertion failed".to_string()),
        ));
    }
    Ok(())
}

/// `DEBUG_OUT value`: logs a diagnostic value at build time without affecting output.
pub fn run_debug_out(value: &Value, traceback: &ProgramTraceback) {
    log::debug!("{}:{}: {:?}", traceback.frame().origin, traceback.frame().line_number, value);
}

/// `INCLUDE name`: resolves `name.xasm` against the primary source directory, the bundled library
/// directory, then the current working directory, in that order, and parses it into `ctx`.
pub fn run_include(
    name: &str,
    assembler: &mut Assembler,
    ctx: &Rc<Context>,
    caller: Option<ProgramTraceback>,
) -> Result<(), ParseError> {
    let filename = format!("{name}.xasm");
    let mut candidates = Vec::new();
    if let Some(dir) = assembler.source_dir() {
        candidates.push(dir.join(&filename));
    }
    if let Some(dir) = assembler.lib_dir() {
        candidates.push(dir.join(&filename));
    }
    candidates.push(std::path::PathBuf::from(&filename));

    let raw = candidates
        .iter()
        .find_map(|path| std::fs::read_to_string(path).ok())
        .ok_or_else(|| ParseError::new(format!("can't find include file `{filename}`")))?;
    let source: String = raw.chars().filter(|&c| c != '\r').collect();

    let mut parser = Parser::new(filename, source);
    parser.parse_program(assembler, ctx, caller)
}

fn cond_is_true(value: &Value) -> Result<bool, ParseError> {
    match value {
        Value::ConstantNumeric { value, .. } => Ok(*value != 0),
        other => Err(ParseError::new(format!("expected a numeric condition, got {other:?}"))),
    }
}
