mod common;

use common::{compile, run, Machine};
use logo::{
    compile::{BranchTargets, CodeGen, Instruction, Value},
    compile_with, parse_str, CompilerConf,
};

const SQUARE: &str = include_str!("square.logo");
const BRANCHES: &str = include_str!("branches.logo");

fn main_code(source: &str) -> Vec<Instruction> {
    compile(source).entry_function().unwrap().code.clone()
}

#[test]
fn test_assign_and_branch() {
    let machine = run("X = 3\nY = :X + 2\nIF (:Y > 4) THEN\n  Z = 1\nEND");
    assert_eq!(machine.number("global.MAIN_var_X"), 3.0);
    assert_eq!(machine.number("global.MAIN_var_Y"), 5.0);
    assert_eq!(machine.number("global.MAIN.if_1_var_Z"), 1.0);
}

#[test]
fn test_assignment_code() {
    assert_eq!(
        main_code("X = 3\nY = :X + 2"),
        vec![
            Instruction::Push(Value::Number(3.0)),
            Instruction::Store("global.MAIN_var_X".into()),
            Instruction::Load("global.MAIN_var_X".into()),
            Instruction::Push(Value::Number(2.0)),
            Instruction::Add,
            Instruction::Store("global.MAIN_var_Y".into()),
            Instruction::Return,
        ]
    );
}

#[test]
fn test_materialized_connective() {
    let machine = run("C = true and false\nD = true or false\nE = NOT 1 == 2");
    assert_eq!(machine.number("global.MAIN_var_C"), 0.0);
    assert_eq!(machine.number("global.MAIN_var_D"), 1.0);
    assert_eq!(machine.number("global.MAIN_var_E"), 1.0);
}

#[test]
fn test_materialize_layout() {
    let code = main_code("C = 1 < 2");
    let labels: Vec<&str> = code
        .iter()
        .filter_map(|instruction| match instruction {
            Instruction::Label { name, .. } => Some(name.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(
        labels,
        [
            "global.MAIN_label_true_1",
            "global.MAIN_label_false_2",
            "global.MAIN_label_end_bool_3"
        ]
    );
    assert_eq!(
        code[code.len() - 2],
        Instruction::label(
            "global.MAIN_label_end_bool_3",
            vec![Instruction::Store("global.MAIN_var_C".into())]
        )
    );
}

#[test]
fn test_infinite_loop() {
    assert_eq!(
        main_code("WHILE (TRUE) END"),
        vec![
            Instruction::label(
                "global.MAIN_label_while_2",
                vec![Instruction::Jump("global.MAIN_label_while_2".into())]
            ),
            Instruction::label("global.MAIN_label_end_while_4", vec![]),
            Instruction::Return,
        ]
    );
}

#[test]
fn test_constant_conditions() {
    assert_eq!(main_code("WHILE (FALSE)\n  PRINT 1\nEND"), vec![Instruction::Return]);

    let code = main_code("IF (FALSE) THEN\n  PRINT 1\nELSE\n  PRINT 2\nEND");
    assert_eq!(
        code,
        vec![
            Instruction::Push(Value::Number(2.0)),
            Instruction::Call("PRINT".into()),
            Instruction::Return,
        ]
    );

    let machine = run("X = 0\nIF (TRUE) THEN\n  X = 1\nELSE\n  X = 2\nEND");
    assert_eq!(machine.number("global.MAIN_var_X"), 1.0);
}

#[test]
fn test_comparison_jumps() {
    let code = main_code("A = 1\nIF (:A >= 2) THEN END");
    let jumps: Vec<&Instruction> = code
        .iter()
        .skip_while(|instruction| !matches!(instruction, Instruction::Cmp(_)))
        .skip(1)
        .take(3)
        .collect();
    assert!(matches!(
        jumps.as_slice(),
        [Instruction::JumpMore(t), Instruction::JumpZero(z), Instruction::Jump(_)] if t == z
    ));
}

#[test]
fn test_comparison_operators() {
    #[rustfmt::skip]
    let cases = [
        (">",  [false, false, true]),
        (">=", [false, true,  true]),
        ("<",  [true,  false, false]),
        ("<=", [true,  true,  false]),
        ("==", [false, true,  false]),
        ("<>", [true,  false, true]),
    ];

    for (op, expected) in cases {
        for (a, taken) in [1.0, 2.0, 3.0].into_iter().zip(expected) {
            let source = format!("A = {}\nR = 0\nIF (:A {} 2) THEN\n  R = 1\nEND", a, op);
            let machine = run(&source);
            assert_eq!(machine.number("global.MAIN_var_R") == 1.0, taken, "{}", source);
        }
    }
}

#[test]
fn test_short_circuit() {
    // Reading input with none queued panics, so the right operand must be skipped.
    let machine = run("R = 0\nIF (1 == 1 OR :TYPEIN > 0) THEN\n  R = 1\nEND");
    assert_eq!(machine.number("global.MAIN_var_R"), 1.0);

    let machine = run("R = 0\nIF (1 == 2 AND :TYPEIN > 0) THEN\n  R = 1\nEND");
    assert_eq!(machine.number("global.MAIN_var_R"), 0.0);

    let artifact = compile("R = 0\nIF (1 == 2 OR :TYPEIN > 0) THEN\n  R = 1\nEND");
    let mut machine = Machine::new(&artifact);
    machine.input.push_back(5.0);
    machine.execute();
    assert_eq!(machine.number("global.MAIN_var_R"), 1.0);
    assert!(machine.input.is_empty());
}

#[test]
fn test_negated_condition() {
    let machine = run("R = 0\nIF (NOT :R == 1 AND NOT FALSE) THEN\n  R = 2\nEND");
    assert_eq!(machine.number("global.MAIN_var_R"), 2.0);
}

#[test]
fn test_value_conditions() {
    let machine = run("X = 0\nY = 3\nR = 0\nIF (:X) THEN\n  R = 1\nEND\nIF (:Y) THEN\n  R = :R + 10\nEND");
    assert_eq!(machine.number("global.MAIN_var_R"), 10.0);
}

#[test]
fn test_while_counting() {
    let machine = run("N = 0\nS = 0\nWHILE (:N < 5)\n  N = :N + 1\n  S = :S + :N\nEND");
    assert_eq!(machine.number("global.MAIN_var_N"), 5.0);
    assert_eq!(machine.number("global.MAIN_var_S"), 15.0);
}

#[test]
fn test_function_parameters() {
    let machine = run("TO DIFF :a :b\n  PRINT :a - :b\nEND\nDIFF 10 3");
    assert_eq!(machine.output_numbers(), vec![7.0]);
}

#[test]
fn test_function_declaration_emits_nothing_inline() {
    let artifact = compile("TO NOOP\nEND");
    assert_eq!(artifact.entry_function().unwrap().code, vec![Instruction::Return]);
    assert_eq!(artifact.function("NOOP").unwrap().code, vec![Instruction::Return]);
}

#[test]
fn test_recursion() {
    let machine = run("TO COUNT :n\n  IF (:n > 0) THEN\n    PRINT :n\n    COUNT :n - 1\n  END\nEND\nCOUNT 3");
    assert_eq!(machine.output_numbers(), vec![3.0, 2.0, 1.0]);
}

#[test]
fn test_variadic_write() {
    let machine = run("WRITE 'a' 1 2\nWRITE");
    assert_eq!(
        machine.output,
        vec![Value::Str("a".into()), Value::Number(1.0), Value::Number(2.0)]
    );
}

#[test]
fn test_builtin_reads() {
    let artifact = compile("X = :RANDOM\nY = :TYPEIN * 2");
    let code = &artifact.entry_function().unwrap().code;
    assert_eq!(code[0], Instruction::Rand);
    assert_eq!(code[2], Instruction::Read);

    let mut machine = Machine::new(&artifact);
    machine.input.push_back(21.0);
    machine.execute();
    assert_eq!(machine.number("global.MAIN_var_Y"), 42.0);
}

#[test]
fn test_square_fixture() {
    let machine = run(SQUARE);
    let forward: Vec<f64> = machine
        .moves
        .iter()
        .filter(|(heading, _)| *heading == 0.0)
        .map(|(_, distance)| *distance)
        .collect();
    assert_eq!(forward, vec![50.0; 4]);
    assert_eq!(machine.moves.len(), 8);
    assert!(!machine.pen);
    assert_eq!(machine.number("global.MAIN.SQUARE_var_SIDES"), 4.0);
}

#[test]
fn test_branches_fixture() {
    let machine = run(BRANCHES);
    assert_eq!(machine.number("global.MAIN_var_N"), 7.0);
    assert_eq!(machine.number("global.MAIN_var_DONE"), 0.0);
    assert_eq!(
        machine.output,
        vec![
            Value::Str("evens".into()),
            Value::Number(4.0),
            Value::Str("odds".into()),
            Value::Number(3.0),
        ]
    );
}

#[test]
fn test_turtle_builtins() {
    let machine = run("PD\nSETXY 3 4\nCS\nHOME");
    assert!(machine.pen);
    assert_eq!(machine.clears, 1);
    assert_eq!(machine.position, Some((0.0, 0.0)));
}

#[test]
fn test_artifact_contents() {
    let artifact = compile("X = 1");
    for name in ["FORWARD", "WRITE", "CLEARSCREEN", "MAIN"] {
        assert!(artifact.function(name).is_some(), "missing {}", name);
    }
    assert!(artifact.function("FO").is_none());
    for slot in ["global_var_RANDOM", "global_var_TYPEIN", "builtin_var_num", "global.MAIN_var_X"] {
        assert_eq!(artifact.variables.get(slot), Some(&Value::Number(0.0)), "{}", slot);
    }
}

#[test]
fn test_custom_entry() {
    let conf = CompilerConf {
        entry: "START".into(),
        ..CompilerConf::default()
    };
    let artifact = compile_with("X = 1", &conf).unwrap();
    assert_eq!(artifact.entry, "START");
    assert!(artifact.variables.contains_key("global.START_var_X"));
}

#[test]
fn test_listing() {
    let listing = compile("FORWARD 10").to_string();
    assert!(listing.starts_with(".START MAIN\n\n.DATA\n"));
    assert!(listing.contains("\n.CODE\n"));
    assert!(listing.contains("\nDEF MAIN:\n  PUSH 10\n  CALL FORWARD\n  RET\n"));
    assert!(listing.contains("\nDEF FORWARD:\n  STORE builtin_var_num\n"));
}

#[test]
fn test_branch_targets() {
    let targets = BranchTargets::new("yes", "no");
    assert_eq!(targets.swapped(), BranchTargets::new("no", "yes"));
    assert_eq!(targets.with_true("next".into()), BranchTargets::new("next", "no"));
    assert_eq!(targets.with_false("next".into()), BranchTargets::new("yes", "next"));
}

#[test]
fn test_failed_generation_has_no_artifact() {
    let program = parse_str("X = 1\nPRINT :Y").unwrap();
    assert!(CodeGen::new().generate(&program).is_err());
}
