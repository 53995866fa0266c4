use asm::Assembler;

fn word_at(program: &asm::CompiledProgram, address: usize) -> u8 {
    program.data[address]
        .as_ref()
        .unwrap_or_else(|| panic!("address {address} was never placed"))
        .value
}

#[test]
fn single_word_data_placement() {
    let mut assembler = Assembler::new();
    assembler.assemble_source("test", "DATA 0\n").unwrap();
    let program = assembler.link_data().unwrap();
    assert_eq!(word_at(&program, 0), 0);
    assert!(program.data[1].is_none());
}

#[test]
fn sequential_data_placement_advances_the_instruction_pointer() {
    let mut assembler = Assembler::new();
    assembler.assemble_source("test", "DATA 4,3\nDATA 5,6\n").unwrap();
    let program = assembler.link_data().unwrap();
    assert_eq!(word_at(&program, 0), 4);
    assert_eq!(word_at(&program, 1), 3);
    assert_eq!(word_at(&program, 2), 5);
    assert_eq!(word_at(&program, 3), 6);
}


#[test]
fn macro_invocation_expands_its_body_in_the_caller_context() {
    let source = "DEFINE COMMAND DO_SOMETHING, a, b, {\nDATA $a, 3, $b\n}\nDO_SOMETHING 8, 9\n";
    let mut assembler = Assembler::new();
    assembler.assemble_source("test", source).unwrap();
    let program = assembler.link_data().unwrap();
    assert_eq!(word_at(&program, 0), 8);
    assert_eq!(word_at(&program, 1), 3);
    assert_eq!(word_at(&program, 2), 9);
}

#[test]
fn global_and_local_labels_resolve_to_their_declared_address() {
    let source = "DATA 0\nSTART\nDATA :START\n";
    let mut assembler = Assembler::new();
    assembler.assemble_source("test", source).unwrap();
    let program = assembler.link_data().unwrap();
    assert_eq!(program.labels.get("START"), Some(&1));
    assert_eq!(word_at(&program, 1), 0);
    assert_eq!(word_at(&program, 2), 0);
    assert_eq!(word_at(&program, 3), 1);
}

#[test]
fn set_variable_without_a_prior_definition_is_a_parse_error() {
    let mut assembler = Assembler::new();
    let err = assembler.assemble_source("test", "SET VARIABLE x, 1\n").unwrap_err();
    assert!(err.render().contains("no such variable"));
}

#[test]
fn loop_whose_condition_variable_is_never_set_is_a_parse_error() {
    let source = "LOOP cond, { }, { }\n";
    let mut assembler = Assembler::new();
    let err = assembler.assemble_source("test", source).unwrap_err();
    assert!(err.render().contains("never set"));
}

#[test]
fn loop_runs_its_body_until_the_condition_goes_to_zero() {
    let source = "\
DEFINE VARIABLE counter, 3
LOOP cond, { DEFINE VARIABLE cond, is_lt(0, read_var(counter)) }, {
DATA read_var(counter)
SET VARIABLE counter, minus(read_var(counter), 1)
}
";
    let mut assembler = Assembler::new();
    assembler.assemble_source("test", source).unwrap();
    let program = assembler.link_data().unwrap();
    assert_eq!(word_at(&program, 0), 3);
    assert_eq!(word_at(&program, 1), 2);
    assert_eq!(word_at(&program, 2), 1);
    assert!(program.data[3].is_none());
}
