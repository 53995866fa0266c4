use std::rc::Rc;
use std::sync::OnceLock;

use regex::Regex;

use crate::assembler::Assembler;
use crate::commands;
use crate::context::Context;
use crate::error::ParseError;
use crate::functions;
use crate::traceback::ProgramTraceback;
use crate::value::Value;

fn identifier_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z_0-9]*").unwrap())
}

fn numeric_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(0b[01]+|0x[0-9A-Fa-f]+|[0-9]+)(_([0-9]+))?").unwrap())
}

fn whitespace_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[ \t]+").unwrap())
}

/// A recursive-descent lexer/parser over one source's text. Holds only lexer position state: the
/// active [`Assembler`], [`Context`], and enclosing traceback are threaded as parameters through
/// every parsing method rather than stored as fields, since parsing a macro body, an `INCLUDE`d
/// file, or a `{ ... }` block all recurse back into a fresh `Parser` over different text while
/// needing the *same* assembler and a *nested* context.
pub struct Parser {
    origin: String,
    chars: Vec<char>,
    pos: usize,
    line_number: usize,
    line_start: usize,
}

impl Parser {
    /// Builds a parser over `source`, reporting `origin` as the file/macro name in tracebacks.
    pub fn new(origin: impl Into<String>, source: String) -> Self {
        Parser {
            origin: origin.into(),
            chars: source.chars().collect(),
            pos: 0,
            line_number: 1,
            line_start: 0,
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn rest(&self) -> String {
        self.chars[self.pos..].iter().collect()
    }

    fn current_line_text(&self) -> String {
        let mut end = self.line_start;
        while end < self.chars.len() && self.chars[end] != '\n' {
            end += 1;
        }
        self.chars[self.line_start..end].iter().collect()
    }

    fn advance(&mut self, n: usize) {
        for _ in 0..n {
            if self.pos >= self.chars.len() {
                break;
            }
            if self.chars[self.pos] == '\n' {
                self.line_number += 1;
                self.line_start = self.pos + 1;
            }
            self.pos += 1;
        }
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            if let Some(m) = whitespace_regex().find(&self.rest()) {
                self.advance(m.end());
                continue;
            }
            if !self.at_end() && self.chars[self.pos] == '\n' {
                self.advance(1);
                continue;
            }
            if !self.at_end() && self.chars[self.pos] == '#' {
                while !self.at_end() && self.chars[self.pos] != '\n' {
                    self.advance(1);
                }
                continue;
            }
            break;
        }
    }

    fn skip_inline_whitespace(&mut self) {
        if let Some(m) = whitespace_regex().find(&self.rest()) {
            self.advance(m.end());
        }
    }

    fn accept(&mut self, literal: &str) -> bool {
        self.skip_inline_whitespace();
        if self.rest().starts_with(literal) {
            self.advance(literal.chars().count());
            true
        } else {
            false
        }
    }

    fn expect(&mut self, literal: &str) -> Result<(), ParseError> {
        if self.accept(literal) {
            Ok(())
        } else {
            Err(self.error(format!("expected `{literal}`")))
        }
    }

    fn accept_identifier(&mut self) -> Option<String> {
        self.skip_inline_whitespace();
        let m = identifier_regex().find(&self.rest())?;
        let text = m.as_str().to_string();
        self.advance(m.end());
        Some(text)
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError::new(format!(
            "{}:{}: {}",
            self.origin,
            self.line_number,
            message.into()
        ))
    }

    fn frame(&self, global_label: Option<String>, caller: Option<ProgramTraceback>) -> ProgramTraceback {
        ProgramTraceback::new(
            self.origin.clone(),
            self.current_line_text(),
            self.line_number,
            false,
            global_label,
            caller,
        )
    }

    /// Parses every statement until end of input.
    pub fn parse_program(
        &mut self,
        assembler: &mut Assembler,
        ctx: &Rc<Context>,
        caller: Option<ProgramTraceback>,
    ) -> Result<(), ParseError> {
        loop {
            self.skip_whitespace_and_comments();
            if self.at_end() {
                return Ok(());
            }
            self.parse_command(assembler, ctx, caller.clone())?;
        }
    }

    fn parse_command(
        &mut self,
        assembler: &mut Assembler,
        ctx: &Rc<Context>,
        caller: Option<ProgramTraceback>,
    ) -> Result<(), ParseError> {
        let tb = self.frame(ctx.last_global_label(), caller.clone());
        let name = self
            .accept_identifier()
            .ok_or_else(|| self.error("expected a command name"))?;

        match name.as_str() {
            "DATA" => {
                let values = self.parse_arg_list(assembler, ctx, caller)?;
                commands::run_data(values, assembler, tb)
            }
            "SKIP_DATA" => {
                let count = self.parse_arg(assembler, ctx, caller)?;
                commands::run_skip_data(&count, assembler)
            }
            "DEFINE" => self.parse_define(assembler, ctx, caller, tb),
            "SET" => {
                self.expect("VARIABLE")?;
                let name = self
                    .accept_identifier()
                    .ok_or_else(|| self.error("expected a variable name"))?;
                self.expect(",")?;
                let value = self.parse_arg(assembler, ctx, caller)?;
                commands::run_set_variable(&name, value, ctx)
            }
            "INCLUDE" => {
                let target = self
                    .accept_identifier()
                    .ok_or_else(|| self.error("expected an include target"))?;
                commands::run_include(&target, assembler, ctx, Some(tb))
            }
            "IF" => {
                let cond = self.parse_arg(assembler, ctx, caller.clone())?;
                self.expect(",")?;
                let block = self.parse_arg(assembler, ctx, caller.clone())?;
                commands::run_if(&cond, &block, assembler, ctx, Some(tb))
            }
            "LOOP" => {
                let cond_var = self
                    .accept_identifier()
                    .ok_or_else(|| self.error("expected a condition variable name"))?;
                self.expect(",")?;
                let cond_block = self.parse_arg(assembler, ctx, caller.clone())?;
                self.expect(",")?;
                let body_block = self.parse_arg(assembler, ctx, caller.clone())?;
                commands::run_loop(&cond_var, &cond_block, &body_block, assembler, ctx, Some(tb))
            }
            "UP" => {
                let block = self.parse_arg(assembler, ctx, caller.clone())?;
                commands::run_up(&block, assembler, Some(tb))
            }
            "ASSERT" => {
                let cond = self.parse_arg(assembler, ctx, caller)?;
                commands::run_assert(&cond, None)
            }
            "DEBUG_OUT" => {
                let value = self.parse_arg(assembler, ctx, caller)?;
                commands::run_debug_out(&value, &tb);
                Ok(())
            }
            name => {
                if let Some(instruction) = ctx.find_command(name) {
                    let args = self.parse_arg_list(assembler, ctx, caller)?;
                    return commands::run_invoke(&instruction, args, assembler, Some(tb));
                }
                if name.chars().next().is_some_and(|c| c.is_ascii_uppercase()) {
                    ctx.set_last_global_label(name.to_string());
                    assembler.declare_label(name.to_string(), assembler.ip());
                    return Ok(());
                }
                Err(self.error(format!("unknown command `{name}`")))
            }
        }
    }

    fn parse_define(
        &mut self,
        assembler: &mut Assembler,
        ctx: &Rc<Context>,
        caller: Option<ProgramTraceback>,
        tb: ProgramTraceback,
    ) -> Result<(), ParseError> {
        if self.accept("VARIABLE") {
            let name = self
                .accept_identifier()
                .ok_or_else(|| self.error("expected a variable name"))?;
            self.expect(",")?;
            let value = self.parse_arg(assembler, ctx, caller)?;
            return commands::run_define_variable(name, value, ctx);
        }
        let is_internal = self.accept("INTERNAL_COMMAND");
        if !is_internal {
            self.expect("COMMAND")?;
        }
        let name = self
            .accept_identifier()
            .ok_or_else(|| self.error("expected a command name"))?;
        let mut params = Vec::new();
        loop {
            self.expect(",")?;
            self.skip_inline_whitespace();
            if self.rest().starts_with('{') {
                break;
            }
            params.push(
                self.accept_identifier()
                    .ok_or_else(|| self.error("expected a parameter name"))?,
            );
        }
        let body = self.parse_arg(assembler, ctx, Some(tb))?;
        commands::run_define_command(name, params, body, ctx, is_internal)
    }

    fn parse_arg_list(
        &mut self,
        assembler: &mut Assembler,
        ctx: &Rc<Context>,
        caller: Option<ProgramTraceback>,
    ) -> Result<Vec<Value>, ParseError> {
        let mut values = vec![self.parse_arg(assembler, ctx, caller.clone())?];
        while self.accept(",") {
            values.push(self.parse_arg(assembler, ctx, caller.clone())?);
        }
        Ok(values)
    }

    fn parse_arg(
        &mut self,
        assembler: &mut Assembler,
        ctx: &Rc<Context>,
        caller: Option<ProgramTraceback>,
    ) -> Result<Value, ParseError> {
        self.skip_inline_whitespace();

        if self.accept("{") {
            return self.parse_code_block(ctx);
        }
        if self.accept("$") {
            if let Some(name) = self.accept_identifier() {
                return ctx
                    .find_variable(&name)
                    .ok_or_else(|| self.error(format!("can't find variable `{name}`")));
            }
            return Ok(Value::ConstantNumeric { value: assembler.ip() as u64, num_words: 3 });
        }
        if self.accept(":") {
            let name = self
                .accept_identifier()
                .ok_or_else(|| self.error("expected a label name"))?;
            return Ok(Value::Label { name, traceback: Some(self.frame(ctx.last_global_label(), caller)) });
        }
        if self.rest().starts_with('.') {
            self.advance(1);
            let local = self
                .accept_identifier()
                .ok_or_else(|| self.error("expected a local label name"))?;
            let global = ctx
                .last_global_label()
                .ok_or_else(|| self.error("local label reference with no enclosing global label"))?;
            let name = format!("{global}.{local}");
            return Ok(Value::Label { name, traceback: Some(self.frame(ctx.last_global_label(), caller)) });
        }
        if self.rest().starts_with("%.") {
            self.advance(2);
            let local = self
                .accept_identifier()
                .ok_or_else(|| self.error("expected a label name"))?;
            let global = ctx.last_global_label();
            let name = match &global {
                Some(g) => format!("{g}.{local}"),
                None => local,
            };
            let initial = if self.accept("=") {
                Box::new(self.parse_arg(assembler, ctx, caller)?)
            } else {
                Box::new(Value::ConstantNumeric { value: 0, num_words: 1 })
            };
            return Ok(Value::InlineLabelDeclaration { name, initial });
        }
        if let Some(m) = numeric_regex().find(&self.rest()) {
            return self.parse_numeric(m.as_str());
        }
        if let Some(name) = self.accept_identifier() {
            self.skip_inline_whitespace();
            if self.accept("(") {
                let mut args = Vec::new();
                if !self.accept(")") {
                    args.push(self.parse_arg(assembler, ctx, caller.clone())?);
                    while self.accept(",") {
                        args.push(self.parse_arg(assembler, ctx, caller.clone())?);
                    }
                    self.expect(")")?;
                }
                return functions::call(&name, args, ctx);
            }
            return Ok(Value::Identifier(name));
        }

        Err(self.error("expected an argument"))
    }

    fn parse_numeric(&mut self, matched: &str) -> Result<Value, ParseError> {
        self.advance(matched.chars().count());
        let (digits, explicit_width) = match matched.split_once('_') {
            Some((digits, width)) => (digits, Some(width.parse::<usize>().unwrap_or(1))),
            None => (matched, None),
        };
        let value = if let Some(hex) = digits.strip_prefix("0x") {
            u64::from_str_radix(hex, 16)
        } else if let Some(bin) = digits.strip_prefix("0b") {
            u64::from_str_radix(bin, 2)
        } else {
            digits.parse::<u64>()
        }
        .map_err(|_| self.error(format!("malformed numeric literal `{matched}`")))?;

        let num_words = explicit_width.unwrap_or_else(|| minimal_words(value));
        Ok(Value::ConstantNumeric { value, num_words })
    }

    fn parse_code_block(&mut self, ctx: &Rc<Context>) -> Result<Value, ParseError> {
        let start = self.pos;
        let mut depth = 1usize;
        while depth > 0 {
            if self.at_end() {
                return Err(self.error("unterminated code block"));
            }
            match self.chars[self.pos] {
                '{' => depth += 1,
                '}' => depth -= 1,
                _ => {}
            }
            self.advance(1);
        }
        let end = self.pos - 1;
        let text: String = self.chars[start..end].iter().collect();
        let lines = text.lines().map(str::to_string).collect();
        Ok(Value::Code { lines, origin: format!("{}:block@{}", self.origin, self.line_number), context: ctx.clone() })
    }
}

fn minimal_words(value: u64) -> usize {
    let mut words = 1;
    let mut max = 64u64;
    while value >= max {
        words += 1;
        match max.checked_mul(64) {
            Some(next) => max = next,
            None => break,
        }
    }
    words
}
