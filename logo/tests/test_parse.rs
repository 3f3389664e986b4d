use logo::{
    lex::{debug_print_lexer, Lexer},
    parse_str,
    parsing::{BooleanShapeError, Expr, Operator, ParseError, Program, Stmt},
    LogoError,
};

const SQUARE: &str = include_str!("square.logo");
const BRANCHES: &str = include_str!("branches.logo");

fn parse(source: &str) -> Program {
    match parse_str(source) {
        Ok(program) => program,
        Err(err) => panic!("{}\n{}", err, source),
    }
}

fn parse_err(source: &str) -> ParseError {
    match parse_str(source) {
        Err(LogoError::Parse(err)) => err,
        other => panic!("expected a parse error, found {:?}", other),
    }
}

/// Printing a program and parsing it again yields the same tree.
fn assert_round_trip(source: &str) {
    let program = parse(source);
    let printed = program.to_string();
    let reparsed = parse(&printed);
    assert_eq!(program, reparsed, "printed as:\n{}", printed);
}

#[test]
fn test_lex_fixtures() {
    debug_print_lexer(Lexer::new(SQUARE));
    debug_print_lexer(Lexer::new(BRANCHES));
}

#[test]
fn test_parse_fixtures() {
    let square = parse(SQUARE);
    assert_eq!(square.stmts.len(), 4);
    assert!(matches!(&square.stmts[0], Stmt::Func(func) if func.name == "SQUARE" && func.params == ["size"]));

    let branches = parse(BRANCHES);
    assert!(matches!(branches.stmts[5], Stmt::While(_)));
    assert!(matches!(branches.stmts.last(), Some(Stmt::Invoke(invoke)) if invoke.args.len() == 4));
}

#[test]
fn test_round_trip_fixtures() {
    assert_round_trip(SQUARE);
    assert_round_trip(BRANCHES);
}

#[test]
fn test_round_trip_precedence() {
    assert_round_trip("X = (1 + 2) * 3 - 4 / (5 - 6)");
    assert_round_trip("X = 2 ^ (3 ^ 2)");
    assert_round_trip("X = (2 ^ 3) ^ 2");
    assert_round_trip("X = 1 - (2 - 3)");
    assert_round_trip("B = NOT (:A > 1 OR :A < -1) AND TRUE");
    assert_round_trip("IF ((:A + 1) * 2 >= 3) THEN PRINT :A ELSE PRINT -1 END");
    assert_round_trip("SETXY :X - 1 (:Y + 1) * 2");
}

#[test]
fn test_pow_does_not_chain() {
    let program = parse("X = 2 ^ (3 ^ 2)");
    let expected = Expr::binary(
        Operator::Pow,
        Expr::Number(2.0),
        Expr::binary(Operator::Pow, Expr::Number(3.0), Expr::Number(2.0)),
    );
    assert!(matches!(&program.stmts[0], Stmt::Assign(assign) if assign.value == expected));

    assert!(matches!(parse_err("X = 2 ^ 3 ^ 2"), ParseError::Syntax(_)));
}

#[test]
fn test_arguments_split_on_negative_numbers() {
    let program = parse("SETXY 10 -5\nSETXY 10 - 5 1");
    match (&program.stmts[0], &program.stmts[1]) {
        (Stmt::Invoke(first), Stmt::Invoke(second)) => {
            assert_eq!(first.args, vec![Expr::Number(10.0), Expr::Number(-5.0)]);
            assert_eq!(
                second.args,
                vec![
                    Expr::binary(Operator::Sub, Expr::Number(10.0), Expr::Number(5.0)),
                    Expr::Number(1.0)
                ]
            );
        }
        other => panic!("unexpected statements {:?}", other),
    }
}

#[test]
fn test_condition_must_be_boolean() {
    assert!(matches!(
        parse_err("IF (:X + 1) THEN END"),
        ParseError::BooleanShape(BooleanShapeError::NotBoolean { .. })
    ));
    assert!(matches!(
        parse_err("WHILE ('text') END"),
        ParseError::BooleanShape(BooleanShapeError::NotBoolean { .. })
    ));
}

#[test]
fn test_numbers_as_booleans() {
    let program = parse("IF (1) THEN END\nB = 0 OR :X > 2");
    assert!(matches!(&program.stmts[0], Stmt::If(stmt) if stmt.condition == Expr::Bool(true)));

    assert!(matches!(parse_err("IF (2) THEN END"), ParseError::Value(_)));
    assert!(matches!(parse_err("B = 5 AND TRUE"), ParseError::Value(_)));
}

#[test]
fn test_connective_chain_limit() {
    parse("B = TRUE AND FALSE OR TRUE");
    assert!(matches!(
        parse_err("B = TRUE AND FALSE OR TRUE AND TRUE"),
        ParseError::BooleanShape(BooleanShapeError::ChainTooLong { operator: Operator::And })
    ));
}

#[test]
fn test_syntax_errors() {
    assert!(matches!(parse_err("IF (TRUE) PRINT 1 END"), ParseError::Syntax(_)));
    assert!(matches!(parse_err("TO F :a PRINT :a"), ParseError::Syntax(_) | ParseError::Token(_)));
    assert!(matches!(parse_err("PRINT 1\nEND"), ParseError::Syntax(_)));
    assert!(matches!(parse_err("X = "), ParseError::Syntax(_) | ParseError::Token(_)));
}

#[test]
fn test_comments_and_keyword_case() {
    let program = parse("; heading\nif (true) then\n  set X = 1 ; trailing\nelse\n  X = 2\nend");
    match &program.stmts[0] {
        Stmt::If(stmt) => {
            assert_eq!(stmt.body.len(), 1);
            assert_eq!(stmt.else_body.as_ref().map(Vec::len), Some(1));
        }
        other => panic!("unexpected statement {:?}", other),
    }
}
