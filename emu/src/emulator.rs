use asm::{CompiledProgram, CompiledWord, ProgramTraceback, ADDRESS_SPACE};

use crate::error::EmulatorError;

/// The fixed output alphabet for `OUTPUT` mode 0: each 6-bit value selects one character.
pub const STRING_CHARS: &[u8; 37] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789\n";

/// One item the emulator has emitted: either a single decoded character/integer, or a
/// partial-output buffer flushed as one concatenated string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputItem {
    /// A single character (mode 0) or an integer rendered as text (mode 1).
    Text(String),
    /// A `partial_output` buffer flushed by mode 3.
    Concatenated(String),
}

/// Instruction width in words: `opcode, a1, a2, a3`.
pub const INSTRUCTION_WORDS: usize = 4;

fn missing_word_traceback(address: usize) -> ProgramTraceback {
    ProgramTraceback::new(
        "<unplaced>",
        format!("no word was ever placed at address {address}"),
        0,
        false,
        None,
        None,
    )
}

/// Executes a [`CompiledProgram`] one instruction at a time.
///
/// Holds the architectural registers (`program_counter`, `a_register`,
/// `memory_address_register`, `input_register`, `input_ready_flag`) plus the emitted output log
/// and the in-progress `partial_output` buffer used by `OUTPUT` modes 2/3.
pub struct Emulator {
    program: CompiledProgram,
    program_counter: usize,
    a_register: u8,
    memory_address_register: usize,
    input_register: u8,
    input_ready_flag: bool,
    outputs: Vec<OutputItem>,
    partial_output: String,
}

impl Emulator {
    /// Loads a linked program with every register at its reset state.
    pub fn new(program: CompiledProgram) -> Self {
        Emulator {
            program,
            program_counter: 0,
            a_register: 0,
            memory_address_register: 0,
            input_register: 0,
            input_ready_flag: false,
            outputs: Vec::new(),
            partial_output: String::new(),
        }
    }

    /// The current program counter; always a multiple of 4 between instructions.
    pub fn program_counter(&self) -> usize {
        self.program_counter
    }

    /// The accumulator register.
    pub fn a_register(&self) -> u8 {
        self.a_register
    }

    /// Every item emitted so far by `OUTPUT`, in emission order.
    pub fn outputs(&self) -> &[OutputItem] {
        &self.outputs
    }

    /// The linked program this emulator is executing, for the debugger's label/traceback lookups.
    pub fn program(&self) -> &CompiledProgram {
        &self.program
    }

    /// Sets the input register and marks it ready, simulating an external input device.
    pub fn feed_input(&mut self, value: u8) {
        self.input_register = value;
        self.input_ready_flag = true;
    }

    fn word_at(&self, address: usize) -> Option<&CompiledWord> {
        self.program.data.get(address).and_then(Option::as_ref)
    }

    fn word_traceback(&self, address: usize) -> ProgramTraceback {
        self.word_at(address).map(|w| w.traceback.clone()).unwrap_or_else(|| missing_word_traceback(address))
    }

    /// Reads a data word, asserting `for_reading`.
    pub fn read_ram(&self, address: usize) -> Result<u8, EmulatorError> {
        let word = self
            .word_at(address)
            .ok_or_else(|| EmulatorError::new(format!("read of unplaced address {address}"), missing_word_traceback(address)))?;
        if !word.for_reading {
            return Err(EmulatorError::new(
                format!("address {address} is not readable"),
                word.traceback.clone(),
            ));
        }
        Ok(word.value)
    }

    /// Writes a data word, asserting `for_writing`.
    pub fn write_ram(&mut self, address: usize, value: u8) -> Result<(), EmulatorError> {
        let traceback = self.word_traceback(address);
        let word = self
            .program
            .data
            .get_mut(address)
            .ok_or_else(|| EmulatorError::new(format!("write to unplaced address {address}"), traceback.clone()))?;
        match word {
            Some(w) if w.for_writing => {
                w.value = value;
                Ok(())
            }
            Some(w) => Err(EmulatorError::new(format!("address {address} is not writable"), w.traceback.clone())),
            None => Err(EmulatorError::new(format!("write to unplaced address {address}"), traceback)),
        }
    }

    /// Fetches a word relative to the program counter, asserting `for_execution`.
    fn read_ram_from_pc(&self, offset: usize) -> Result<u8, EmulatorError> {
        let address = self.program_counter + offset;
        let word = self
            .word_at(address)
            .ok_or_else(|| EmulatorError::new(format!("fetch of unplaced address {address}"), missing_word_traceback(address)))?;
        if !word.for_execution {
            return Err(EmulatorError::new(
                format!("address {address} is not executable"),
                word.traceback.clone(),
            ));
        }
        Ok(word.value)
    }

    fn current_instruction_traceback(&self) -> ProgramTraceback {
        self.word_traceback(self.program_counter)
    }

    fn address_operand(a1: u8, a2: u8, a3: u8) -> usize {
        (a1 as usize) * 64 * 64 + (a2 as usize) * 64 + (a3 as usize)
    }

    /// Executes one instruction. On a non-jump opcode the program counter advances by
    /// [`INSTRUCTION_WORDS`]; jump opcodes set it directly (and `JUMP` does not advance further).
    pub fn step(&mut self) -> Result<(), EmulatorError> {
        let opcode = self.read_ram_from_pc(0)?;
        let a1 = self.read_ram_from_pc(1)?;
        let a2 = self.read_ram_from_pc(2)?;
        let a3 = self.read_ram_from_pc(3)?;

        let mut jumped = false;

        if opcode & 0b100000 != 0 {
            if opcode & 0b010000 != 0 {
                // STORE_A
                let addr = Self::address_operand(a1, a2, a3);
                self.write_ram(addr, self.a_register)?;
            } else if opcode & 0b001000 != 0 {
                // LOAD_A_WITH_A
                let addr = Self::address_operand(a1, a2, self.a_register);
                self.a_register = self.read_ram(addr)?;
            } else {
                // LOAD_A
                let addr = Self::address_operand(a1, a2, a3);
                self.a_register = self.read_ram(addr)?;
            }
        } else if opcode & 0b010000 != 0 {
            self.a_register = (self.a_register + 1) % 64;
        } else if opcode & 0b001000 != 0 {
            let addr = Self::address_operand(a1, a2, a3);
            if opcode & 0b000100 != 0 {
                self.program_counter = addr;
                jumped = true;
            } else if opcode & 0b000010 != 0 {
                if self.a_register == 0 {
                    self.program_counter = addr;
                    jumped = true;
                }
            } else if opcode & 0b000001 != 0 {
                if self.input_ready_flag {
                    self.program_counter = addr;
                    jumped = true;
                }
            } else {
                return Err(EmulatorError::new(
                    format!("unknown opcode {opcode:#08b}"),
                    self.current_instruction_traceback(),
                ));
            }
        } else if opcode & 0b000010 != 0 {
            self.perform_output(a1)?;
        } else if opcode & 0b000001 != 0 {
            self.a_register = self.input_register;
            self.input_ready_flag = false;
        } else {
            return Err(EmulatorError::new(
                format!("unknown opcode {opcode:#08b}"),
                self.current_instruction_traceback(),
            ));
        }

        if !jumped {
            self.program_counter += INSTRUCTION_WORDS;
        }
        Ok(())
    }

    fn perform_output(&mut self, mode: u8) -> Result<(), EmulatorError> {
        match mode {
            0 => {
                let ch = STRING_CHARS[self.a_register as usize % STRING_CHARS.len()] as char;
                self.outputs.push(OutputItem::Text(ch.to_string()));
            }
            1 => {
                self.outputs.push(OutputItem::Text(self.a_register.to_string()));
            }
            2 => {
                self.partial_output.push_str(&self.a_register.to_string());
            }
            3 => {
                let flushed = std::mem::take(&mut self.partial_output);
                self.outputs.push(OutputItem::Concatenated(flushed));
            }
            other => {
                return Err(EmulatorError::new(
                    format!("unknown OUTPUT mode {other}"),
                    self.current_instruction_traceback(),
                ));
            }
        }
        Ok(())
    }

    /// The debugger's halt-detection heuristic: a `JUMP` (not a conditional jump) whose target
    /// equals the current program counter, i.e. an infinite self-loop with no architectural HLT.
    pub fn is_self_jump(&self) -> bool {
        let Ok(opcode) = self.read_ram_from_pc(0) else { return false };
        if opcode & 0b100000 != 0 || opcode & 0b010000 != 0 {
            return false;
        }
        if opcode & 0b001000 == 0 || opcode & 0b000100 == 0 {
            return false;
        }
        let (Ok(a1), Ok(a2), Ok(a3)) = (self.read_ram_from_pc(1), self.read_ram_from_pc(2), self.read_ram_from_pc(3)) else {
            return false;
        };
        Self::address_operand(a1, a2, a3) == self.program_counter
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use asm::ProgramTraceback;

    fn program_from_words(words: &[u8]) -> CompiledProgram {
        let tb = ProgramTraceback::new("test", "", 1, false, None, None);
        let mut data: Vec<Option<CompiledWord>> = (0..ADDRESS_SPACE).map(|_| None).collect();
        for (i, &w) in words.iter().enumerate() {
            data[i] = Some(CompiledWord::new(w, tb.clone()));
        }
        CompiledProgram::new(data, Default::default())
    }

    #[test]
    fn inc_a_advances_pc_by_four_and_increments_a() {
        let program = program_from_words(&[0b010000, 0, 0, 0]);
        let mut emu = Emulator::new(program);
        emu.step().unwrap();
        assert_eq!(emu.program_counter(), 4);
        assert_eq!(emu.a_register(), 1);
    }

    #[test]
    fn jump_sets_pc_to_the_encoded_target_without_further_advance() {
        let program = program_from_words(&[0b001100, 0, 0, 8]);
        let mut emu = Emulator::new(program);
        emu.step().unwrap();
        assert_eq!(emu.program_counter(), 8);
    }

    #[test]
    fn self_jump_is_detected_as_halted() {
        let program = program_from_words(&[0b001100, 0, 0, 0]);
        let emu = Emulator::new(program);
        assert!(emu.is_self_jump());
    }

    #[test]
    fn output_mode_one_emits_the_accumulator_as_text() {
        let program = program_from_words(&[0b010000, 0, 0, 0, 0b000010, 1, 0, 0]);
        let mut emu = Emulator::new(program);
        emu.step().unwrap();
        emu.step().unwrap();
        assert_eq!(emu.outputs(), &[OutputItem::Text("1".to_string())]);
    }

    #[test]
    fn unknown_opcode_is_a_fatal_error() {
        let program = program_from_words(&[0b000000, 0, 0, 0]);
        let mut emu = Emulator::new(program);
        assert!(emu.step().is_err());
    }
}
