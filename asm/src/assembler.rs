use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::compiled_program::{CompiledProgram, CompiledWord, ADDRESS_SPACE};
use crate::context::Context;
use crate::error::{AssemblyError, LinkTimeError, ParseError};
use crate::parser::Parser;
use crate::traceback::ProgramTraceback;
use crate::value::{ResolveError, Value};

/// Build-time state threaded through a parse: the write-once memory map, the current instruction
/// pointer, the label table, and every placed value awaiting the link pass.
pub struct Assembler {
    written: Vec<bool>,
    ip: usize,
    labels: HashMap<String, usize>,
    placements: Vec<(usize, Value, ProgramTraceback)>,
    source_dir: Option<PathBuf>,
    lib_dir: Option<PathBuf>,
}

impl Assembler {
    /// Builds an empty assembler with no lib directory configured.
    pub fn new() -> Self {
        Assembler {
            written: vec![false; ADDRESS_SPACE],
            ip: 0,
            labels: HashMap::new(),
            placements: Vec::new(),
            source_dir: None,
            lib_dir: None,
        }
    }

    /// Sets the directory `INCLUDE` searches after the primary source's own directory.
    pub fn with_lib_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.lib_dir = Some(dir.into());
        self
    }

    /// The current instruction pointer.
    pub fn ip(&self) -> usize {
        self.ip
    }

    /// The directory `INCLUDE` should search first: the primary source file's own directory.
    pub fn source_dir(&self) -> Option<&Path> {
        self.source_dir.as_deref()
    }

    /// The bundled library directory `INCLUDE` falls back to.
    pub fn lib_dir(&self) -> Option<&Path> {
        self.lib_dir.as_deref()
    }

    /// Assembles a file from disk, using its parent directory for `INCLUDE` resolution. Source is
    /// read as UTF-8 with `\r` stripped, so CRLF-saved files assemble the same as LF ones.
    pub fn assemble_file(&mut self, path: &Path) -> Result<(), AssemblyError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| AssemblyError::Parse(ParseError::new(format!("can't read `{}`: {e}", path.display()))))?;
        let source: String = raw.chars().filter(|&c| c != '\r').collect();
        self.source_dir = path.parent().map(Path::to_path_buf);
        let origin = path.display().to_string();
        self.assemble_source(&origin, &source)
    }

    /// Assembles already-loaded source text under the given origin name.
    pub fn assemble_source(&mut self, origin: &str, source: &str) -> Result<(), AssemblyError> {
        let root = Context::root();
        let mut parser = Parser::new(origin.to_string(), source.to_string());
        parser.parse_program(self, &root, None)?;
        Ok(())
    }

    /// Records a global or local label at `address`.
    pub fn declare_label(&mut self, name: String, address: usize) {
        self.labels.insert(name, address);
    }

    /// Advances the instruction pointer by `count` words without writing or reserving anything.
    pub fn skip(&mut self, count: usize) {
        self.ip += count;
    }

    /// Places one `DATA` argument at the current instruction pointer: checks the address range and
    /// write-once invariant, writes any inline labels it carries into the label table, records it
    /// for the link pass, then advances the instruction pointer past it.
    pub fn run_data_command(&mut self, value: Value, traceback: ProgramTraceback) -> Result<(), ParseError> {
        let start = self.ip;
        let n = value.num_words();
        if start + n > ADDRESS_SPACE {
            return Err(ParseError::new("DATA placement runs past the end of the address space")
                .with_traceback(traceback));
        }
        for addr in start..start + n {
            if self.written[addr] {
                return Err(ParseError::new(format!("invalid rewrite of data at address {addr}"))
                    .with_traceback(traceback));
            }
        }
        value.place_value(start, self);
        for addr in start..start + n {
            self.written[addr] = true;
        }
        self.ip += n;
        self.placements.push((start, value, traceback));
        Ok(())
    }

    /// Resolves every placed value to its final words, producing a linked program. An unresolved
    /// label is reported at its own reference-site traceback if it carries one, otherwise at the
    /// `DATA` site that placed it.
    pub fn link_data(self) -> Result<CompiledProgram, LinkTimeError> {
        let mut data: Vec<Option<CompiledWord>> = (0..ADDRESS_SPACE).map(|_| None).collect();
        for (start, value, traceback) in &self.placements {
            match value.as_word_array(&self.labels) {
                Ok(words) => {
                    for (i, word) in words.into_iter().enumerate() {
                        data[start + i] = Some(CompiledWord::new(word, traceback.clone()));
                    }
                }
                Err(ResolveError::NotReady) => {
                    let site = value.own_traceback().unwrap_or_else(|| traceback.clone());
                    return Err(LinkTimeError::new("unresolved label", site));
                }
                Err(ResolveError::Invalid(message)) => {
                    return Err(LinkTimeError::new(message, traceback.clone()));
                }
            }
        }
        Ok(CompiledProgram::new(data, self.labels))
    }
}

impl Default for Assembler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(value: u64, num_words: usize) -> Value {
        Value::ConstantNumeric { value, num_words }
    }

    fn frame() -> ProgramTraceback {
        ProgramTraceback::new("test", "DATA", 1, false, None, None)
    }

    #[test]
    fn rewriting_an_already_placed_address_is_rejected() {
        let mut assembler = Assembler::new();
        assembler.run_data_command(word(1, 1), frame()).unwrap();
        assembler.ip = 0;
        let err = assembler.run_data_command(word(2, 1), frame()).unwrap_err();
        assert!(err.message.contains("rewrite"));
    }

    #[test]
    fn placement_past_the_address_space_is_rejected() {
        let mut assembler = Assembler::new();
        assembler.ip = ADDRESS_SPACE - 1;
        let err = assembler.run_data_command(word(0, 2), frame()).unwrap_err();
        assert!(err.message.contains("end of the address space"));
    }
}
