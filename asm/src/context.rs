use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::ParseError;
use crate::value::Value;

/// A user-defined command: its formal parameters, its captured code body, the context it closes
/// over (so it can see variables/commands visible at its definition site), and whether it was
/// declared `INTERNAL_COMMAND` (its expansion frames are hidden from default tracebacks).
pub struct InstructionMacro {
    /// The command name it's invoked as.
    pub name: String,
    /// Formal parameter names, bound to argument values on each invocation.
    pub params: Vec<String>,
    /// The macro body, always a [`Value::Code`].
    pub body: Value,
    /// The context active where `DEFINE COMMAND` ran.
    pub context: Rc<Context>,
    /// Whether this macro's expansion frames should be skipped when picking a user-facing frame.
    pub is_internal: bool,
}

/// A parent-linked lexical scope: variable bindings, user-defined commands, and the nearest
/// enclosing global label, all resolved by walking outward through `parent` on a miss.
pub struct Context {
    parent: Option<Rc<Context>>,
    variables: RefCell<HashMap<String, Value>>,
    commands: RefCell<HashMap<String, Rc<InstructionMacro>>>,
    last_global_label: RefCell<Option<String>>,
}

impl std::fmt::Debug for Context {
    /// Prints just an opaque marker: scopes can hold a captured code block whose own `Context`
    /// field is itself, so a field-by-field derive would recurse into the whole parent chain.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Context { .. }")
    }
}

impl Context {
    /// Creates the top-level context with no parent.
    pub fn root() -> Rc<Context> {
        Rc::new(Context {
            parent: None,
            variables: RefCell::new(HashMap::new()),
            commands: RefCell::new(HashMap::new()),
            last_global_label: RefCell::new(None),
        })
    }

    /// Creates a new scope nested under `parent`.
    pub fn child(parent: &Rc<Context>) -> Rc<Context> {
        Rc::new(Context {
            parent: Some(parent.clone()),
            variables: RefCell::new(HashMap::new()),
            commands: RefCell::new(HashMap::new()),
            last_global_label: RefCell::new(None),
        })
    }

    /// This context's parent, if any.
    pub fn parent(&self) -> Option<&Rc<Context>> {
        self.parent.as_ref()
    }

    /// Looks up a variable, walking outward through enclosing scopes.
    pub fn find_variable(&self, name: &str) -> Option<Value> {
        if let Some(v) = self.variables.borrow().get(name) {
            return Some(v.clone());
        }
        self.parent.as_ref().and_then(|p| p.find_variable(name))
    }

    /// Defines a new variable in this scope. Shadowing an outer scope's variable of the same name
    /// is allowed; redefining one already bound in this exact scope is not.
    pub fn define_variable(&self, name: impl Into<String>, value: Value) -> Result<(), ParseError> {
        let name = name.into();
        let mut vars = self.variables.borrow_mut();
        if vars.contains_key(&name) {
            return Err(ParseError::new(format!("variable `{name}` already defined in this scope")));
        }
        vars.insert(name, value);
        Ok(())
    }

    /// Rebinds an existing variable, walking outward to find where it was defined.
    pub fn set_variable(&self, name: &str, value: Value) -> Result<(), ParseError> {
        if self.variables.borrow().contains_key(name) {
            self.variables.borrow_mut().insert(name.to_string(), value);
            return Ok(());
        }
        match &self.parent {
            Some(parent) => parent.set_variable(name, value),
            None => Err(ParseError::new(format!("no such variable `{name}` to set"))),
        }
    }

    /// Looks up a user-defined command, walking outward through enclosing scopes.
    pub fn find_command(&self, name: &str) -> Option<Rc<InstructionMacro>> {
        if let Some(c) = self.commands.borrow().get(name) {
            return Some(c.clone());
        }
        self.parent.as_ref().and_then(|p| p.find_command(name))
    }

    /// Defines a new command in this scope.
    pub fn define_command(&self, instruction: InstructionMacro) -> Result<(), ParseError> {
        let mut commands = self.commands.borrow_mut();
        if commands.contains_key(&instruction.name) {
            return Err(ParseError::new(format!(
                "command `{}` already defined in this scope",
                instruction.name
            )));
        }
        commands.insert(instruction.name.clone(), Rc::new(instruction));
        Ok(())
    }

    /// The nearest enclosing global label, walking outward if this scope hasn't seen one of its
    /// own yet.
    pub fn last_global_label(&self) -> Option<String> {
        if let Some(label) = self.last_global_label.borrow().clone() {
            return Some(label);
        }
        self.parent.as_ref().and_then(|p| p.last_global_label())
    }

    /// Records a global label declaration as the nearest one in this scope.
    pub fn set_last_global_label(&self, label: impl Into<String>) {
        *self.last_global_label.borrow_mut() = Some(label.into());
    }
}
