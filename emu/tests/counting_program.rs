use asm::Assembler;
use emu::{Emulator, OutputItem};

/// Counts `A` from 0 to 63 via `INC_A`/`OUTPUT` mode 1, then halts by jumping to itself once `A`
/// wraps back to 0.
const SOURCE: &str = "\
LOOP
DATA 2,1,0,0
DATA 16,0,0,0
DATA 10,:HALT
DATA 12,:LOOP
HALT
DATA 12,:HALT
";

#[test]
fn counts_from_zero_to_sixty_three_then_halts() {
    let mut assembler = Assembler::new();
    assembler.assemble_source("test", SOURCE).unwrap();
    let program = assembler.link_data().unwrap();

    let mut emulator = Emulator::new(program);
    let mut steps = 0;
    while !emulator.is_self_jump() {
        emulator.step().unwrap();
        steps += 1;
        assert!(steps < 10_000, "program never reached its halting self-jump");
    }

    let expected: Vec<OutputItem> = (0..64u8).map(|n| OutputItem::Text(n.to_string())).collect();
    assert_eq!(emulator.outputs(), expected.as_slice());
    assert_eq!(emulator.a_register(), 0);
}
