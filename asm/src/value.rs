use std::collections::HashMap;
use std::rc::Rc;

use crate::assembler::Assembler;
use crate::context::Context;
use crate::traceback::ProgramTraceback;

/// A compile-time value: the result of evaluating an expression, a macro argument, or a captured
/// code block. Numeric values carry their word width alongside the integer so `as_word_array` can
/// be total without re-deriving it.
#[derive(Debug, Clone)]
pub enum Value {
    /// A bare identifier, e.g. a `DEFINE COMMAND`/`DEFINE VARIABLE` name. Not itself placeable.
    Identifier(String),
    /// A resolved integer of a known word width.
    ConstantNumeric { value: u64, num_words: usize },
    /// An unresolved reference to a label; always 3 words once linked.
    Label { name: String, traceback: Option<ProgramTraceback> },
    /// An inline label declared at the address this value is ultimately placed at; evaluates to
    /// `initial` but also registers `name` in the label table via `place_value`.
    InlineLabelDeclaration { name: String, initial: Box<Value> },
    /// One word of a wider value, selected by index (0 = highest word).
    Extracted { inner: Box<Value>, word_index: usize },
    /// The concatenation of several values, in order.
    MakeResult(Vec<Value>),
    /// A captured `{ ... }` code block: its source lines, the context it was lexically defined
    /// in (for `UP`), and the origin name used in tracebacks for lines inside it.
    Code { lines: Vec<String>, origin: String, context: Rc<Context> },
}

/// Why `as_word_array` could not produce words for a value.
pub enum ResolveError {
    /// The value depends on a label that hasn't been placed yet (or never will be); the caller
    /// the link pass is the only place allowed to treat this as a real error.
    NotReady,
    /// Any other failure: overflow, out-of-range word index, asking a non-numeric for its words.
    Invalid(String),
}

impl Value {
    /// The number of 6-bit words this value occupies once resolved.
    pub fn num_words(&self) -> usize {
        match self {
            Value::Identifier(_) => 0,
            Value::ConstantNumeric { num_words, .. } => *num_words,
            Value::Label { .. } => 3,
            Value::InlineLabelDeclaration { initial, .. } => initial.num_words(),
            Value::Extracted { .. } => 1,
            Value::MakeResult(parts) => parts.iter().map(Value::num_words).sum(),
            Value::Code { .. } => 0,
        }
    }

    /// The value's own traceback, if it carries one independent of its placement site. Only
    /// labels do — preserving where they were *referenced*, so a link failure can point there
    /// instead of at the `DATA` line that happened to place them.
    pub fn own_traceback(&self) -> Option<ProgramTraceback> {
        match self {
            Value::Label { traceback, .. } => traceback.clone(),
            Value::InlineLabelDeclaration { initial, .. } => initial.own_traceback(),
            _ => None,
        }
    }

    /// Resolves this value to its big-endian word array.
    pub fn as_word_array(&self, labels: &HashMap<String, usize>) -> Result<Vec<u8>, ResolveError> {
        match self {
            Value::Identifier(name) => {
                Err(ResolveError::Invalid(format!("identifier `{name}` has no numeric value")))
            }
            Value::ConstantNumeric { value, num_words } => int_to_words(*value, *num_words),
            Value::Label { name, .. } => {
                let address = labels.get(name).ok_or(ResolveError::NotReady)?;
                int_to_words(*address as u64, 3)
            }
            Value::InlineLabelDeclaration { initial, .. } => initial.as_word_array(labels),
            Value::Extracted { inner, word_index } => {
                let words = inner.as_word_array(labels)?;
                words
                    .get(*word_index)
                    .copied()
                    .map(|w| vec![w])
                    .ok_or_else(|| ResolveError::Invalid("word index out of range".to_string()))
            }
            Value::MakeResult(parts) => {
                let mut out = Vec::new();
                for part in parts {
                    out.extend(part.as_word_array(labels)?);
                }
                Ok(out)
            }
            Value::Code { .. } => {
                Err(ResolveError::Invalid("code block is not a placeable value".to_string()))
            }
        }
    }

    /// The placement hook run over every `DATA` argument once it has a final address: only
    /// inline label declarations (directly, or nested inside a `MakeResult`) do anything, walking
    /// into each concatenated part at its own offset to enter it into the label table.
    pub fn place_value(&self, start_address: usize, assembler: &mut Assembler) {
        match self {
            Value::InlineLabelDeclaration { name, .. } => {
                assembler.declare_label(name.clone(), start_address);
            }
            Value::MakeResult(parts) => {
                let mut offset = 0;
                for part in parts {
                    part.place_value(start_address + offset, assembler);
                    offset += part.num_words();
                }
            }
            _ => {}
        }
    }
}

fn int_to_words(mut value: u64, num_words: usize) -> Result<Vec<u8>, ResolveError> {
    let mut reversed = Vec::new();
    while value > 0 {
        reversed.push((value % 64) as u8);
        value /= 64;
    }
    if reversed.len() > num_words {
        return Err(ResolveError::Invalid("number too big for its declared width".to_string()));
    }
    while reversed.len() < num_words {
        reversed.push(0);
    }
    reversed.reverse();
    Ok(reversed)
}

/// Inverse of [`int_to_words`]: big-endian base-64 digits back to an integer.
pub fn words_to_int(words: &[u8]) -> u64 {
    words.iter().fold(0u64, |acc, &w| acc * 64 + w as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_to_words_round_trips() {
        for num_words in 1..=3 {
            let max = 64u64.pow(num_words as u32);
            for value in [0, 1, 5, max / 2, max - 1] {
                let words = int_to_words(value, num_words).ok().unwrap();
                assert_eq!(words.len(), num_words);
                assert_eq!(words_to_int(&words), value);
            }
        }
    }

    #[test]
    fn overflow_is_rejected() {
        assert!(int_to_words(64, 1).is_err());
    }
}
