use std::collections::HashMap;

use crate::traceback::ProgramTraceback;

/// One linked 6-bit word: its value, where it came from, and which of the three access modes the
/// emulator may use it under. A `DATA`-only word used as an instruction, or vice versa, is a
/// programmer error the emulator catches at the access site using these flags.
#[derive(Debug, Clone)]
pub struct CompiledWord {
    /// The word's value, always in `0..64`.
    pub value: u8,
    /// Where this word was placed, for runtime error reports.
    pub traceback: ProgramTraceback,
    /// Whether the emulator may fetch this word as an instruction.
    pub for_execution: bool,
    /// Whether the emulator may read this word as data.
    pub for_reading: bool,
    /// Whether the emulator may overwrite this word as data.
    pub for_writing: bool,
}

impl CompiledWord {
    /// Builds a word with all three access modes granted, the state every linked placement
    /// produces (the assembler draws no distinction between code and data addresses; any word may
    /// be branched to, read, or written).
    pub fn new(value: u8, traceback: ProgramTraceback) -> Self {
        debug_assert!(value < 64, "word value out of range: {value}");
        CompiledWord { value, traceback, for_execution: true, for_reading: true, for_writing: true }
    }
}

/// Total addressable words: an 18-bit address space of 6-bit words.
pub const ADDRESS_SPACE: usize = 1 << 18;

/// The output of a successful link pass: a sparse memory image plus the label table needed to
/// decode addresses back into names for the debugger.
pub struct CompiledProgram {
    /// The memory image; `None` for addresses nothing was ever placed at.
    pub data: Vec<Option<CompiledWord>>,
    /// Every declared label's address.
    pub labels: HashMap<String, usize>,
    /// The inverse of `labels`: every label (if any) known to sit at a given address.
    pub address_to_labels: HashMap<usize, Vec<String>>,
}

impl CompiledProgram {
    /// Builds a program from a memory image and label table, computing the address-to-labels
    /// index once up front.
    pub fn new(data: Vec<Option<CompiledWord>>, labels: HashMap<String, usize>) -> Self {
        let mut address_to_labels: HashMap<usize, Vec<String>> = HashMap::new();
        for (name, &address) in &labels {
            address_to_labels.entry(address).or_default().push(name.clone());
        }
        CompiledProgram { data, labels, address_to_labels }
    }
}
