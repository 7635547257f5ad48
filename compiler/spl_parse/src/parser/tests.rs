use pretty_assertions::assert_eq;

use crate::{parse_source, ParseErrorKind, SourceError};

fn shape(src: &str) -> String {
    match parse_source(src, "test.sp") {
        Ok(block) => block.to_string(),
        Err(e) => panic!("parse failed: {e}"),
    }
}

fn parse_error(src: &str) -> ParseErrorKind {
    match parse_source(src, "test.sp") {
        Ok(block) => panic!("expected a parse error, got {block}"),
        Err(SourceError::Parse(e)) => e.kind,
        Err(e) => panic!("expected a parse error, got {e}"),
    }
}

#[test]
fn test_arithmetic_precedence() {
    assert_eq!(shape("3+2*5+4"), "{((3 + (2 * 5)) + 4)}");
    assert_eq!(shape("(3+2)*5"), "{((3 + 2) * 5)}");
    assert_eq!(shape("2 * (3 + (4 - 1))"), "{(2 * (3 + (4 - 1)))}");
}

#[test]
fn test_comparison_and_logic() {
    assert_eq!(
        shape("a < b && b >= c || !d"),
        "{(((a < b) && (b >= c)) || (! d))}"
    );
    assert_eq!(shape("x is null and y"), "{((x is null) && y)}");
}

#[test]
fn test_unary_minus_context() {
    assert_eq!(shape("a - -b"), "{(a - (neg b))}");
    assert_eq!(shape("return -1"), "{(return (neg 1))}");
    assert_eq!(shape("f(-x)"), "{f((neg x))}");
}

#[test]
fn test_declarations() {
    assert_eq!(shape("var x = 1"), "{(var x = 1)}");
    assert_eq!(shape("const K = 2"), "{(const K = 2)}");
    assert_eq!(shape("var a"), "{(var a = undefined)}");
    assert_eq!(
        shape("var a, b = 2, c"),
        "{(var a = undefined); (var b = 2); (var c = undefined)}"
    );
    assert_eq!(shape("var a = b, c = 3"), "{(var a = b); (var c = 3)}");
}

#[test]
fn test_assignment_targets() {
    assert_eq!(shape("a.b = 1"), "{((a.b) = 1)}");
    assert_eq!(shape("x[0] = y"), "{((x.__getitem__(0)) = y)}");
    assert_eq!(shape("x += 2 * 3"), "{(x += (2 * 3))}");
}

#[test]
fn test_calls_and_members() {
    assert_eq!(shape("f(1, g(2))"), "{f(1, g(2))}");
    assert_eq!(shape("a.b.c(1)"), "{((a.b).c(1))}");
    assert_eq!(shape("f(1)(2)"), "{f(1)(2)}");
    assert_eq!(shape("print(x, sep = 1)"), "{print(x, (sep = 1))}");
}

#[test]
fn test_lists_and_indexing() {
    assert_eq!(shape("[1, 2]"), "{list(1, 2)}");
    assert_eq!(shape("~[1]"), "{i_list(1)}");
    assert_eq!(shape("x[1][2]"), "{((x.__getitem__(1)).__getitem__(2))}");
    assert_eq!(shape("[1][0]"), "{(list(1).__getitem__(0))}");
}

#[test]
fn test_dict_literal() {
    assert_eq!(shape("var d = {\"a\": 1, \"b\": 2}"), "{(var d = dict{\"a\": 1, \"b\": 2})}");
    assert_eq!(shape("var e = {}"), "{(var e = dict{})}");
}

#[test]
fn test_dict_after_clause_separator() {
    assert_eq!(
        shape("for (var k; {\"a\": 1}) print(k)"),
        "{for {(var k = undefined); dict{\"a\": 1}} print(k)}"
    );
    assert_eq!(shape("f(1,\n{\"b\": 2})"), "{f(1, dict{\"b\": 2})}");
}

#[test]
fn test_ternary() {
    assert_eq!(shape("x = c ? a + 1 : b"), "{(x = (c ? (a + 1) : b))}");
}

#[test]
fn test_inc_dec() {
    assert_eq!(shape("i++"), "{(i++)}");
    assert_eq!(shape("--i"), "{(--i)}");
    assert_eq!(shape("a.n++"), "{((a.n)++)}");
}

#[test]
fn test_if_else_chain() {
    assert_eq!(
        shape("if (a) {\n x = 1\n} else if (b) {\n x = 2\n} else {\n x = 3\n}"),
        "{if {a} {(x = 1)} else if {b} {(x = 2)} else {(x = 3)}}"
    );
    assert_eq!(shape("if (a) x = 1 else x = 2"), "{if {a} (x = 1) else (x = 2)}");
}

#[test]
fn test_loops() {
    assert_eq!(
        shape("for (var i = 0; i < 3; i++) {\n print(i)\n}"),
        "{for {(var i = 0); (i < 3); (i++)} {print(i)}}"
    );
    assert_eq!(
        shape("for (var x; items) print(x)"),
        "{for {(var x = undefined); items} print(x)}"
    );
    assert_eq!(shape("while (true) break"), "{while {true} break}");
}

#[test]
fn test_functions() {
    assert_eq!(
        shape("function add(a, b = 2) {\n return a + b\n}"),
        "{(fn add = function{a; (b = 2)} {(return (a + b))})}"
    );
    assert_eq!(
        shape("var f = function(*args, **kw) { return }"),
        "{(var f = function{(unpack args); (kw_unpack kw)} {(return)})}"
    );
    assert_eq!(
        shape("def operator +(other) { return 1 }"),
        "{(fn __add__ = function{other} {(return 1)})}"
    );
}

#[test]
fn test_classes() {
    assert_eq!(
        shape("class A extends B, C {\n var x = 1\n}"),
        "{class A extends B, C, Object {(var x = 1)}}"
    );
    assert_eq!(
        shape("abstract class Shape {\n abstract function area();\n}"),
        "{abstract class Shape extends Object {(fn area = abstract function{})}}"
    );
    assert_eq!(shape("var a = new A(1)"), "{(var a = new A(1))}");
}

#[test]
fn test_try_catch_finally() {
    assert_eq!(
        shape("try {\n f()\n} catch (e: Exception) {\n g()\n} finally {\n h()\n}"),
        "{try {f()} catch {e: Exception} {g()} finally {h()}}"
    );
}

#[test]
fn test_allman_braces() {
    assert_eq!(
        shape("function f()\n{\n return 1\n}\nif (x)\n{\n y\n}\nelse\n{\n z\n}"),
        "{(fn f = function{} {(return 1)}); if {x} {y} else {z}}"
    );
}

#[test]
fn test_doc_and_tags_reach_function() {
    let block = match parse_source(
        "/** Adds one. */\n@Override\nfunction inc(x) { return x + 1 }",
        "t.sp",
    ) {
        Ok(b) => b,
        Err(e) => panic!("{e}"),
    };
    let spl_ir::NodeKind::Assignment { right: Some(def), .. } = &block.lines[0].kind else {
        panic!("expected a function definition, got {block}");
    };
    let spl_ir::NodeKind::FuncDef(def) = &def.kind else {
        panic!("expected FuncDef");
    };
    assert_eq!(def.doc, "Adds one.");
    assert_eq!(def.tags, vec!["Override".to_string()]);
}

#[test]
fn test_error_unclosed_paren() {
    assert_eq!(parse_error("(1 + 2"), ParseErrorKind::Unmatched("("));
    assert_eq!(parse_error("f(1"), ParseErrorKind::Unmatched("("));
}

#[test]
fn test_error_stray_closer() {
    assert_eq!(parse_error("1 + 2)"), ParseErrorKind::Unmatched(")"));
    assert_eq!(parse_error("}"), ParseErrorKind::Unmatched("}"));
}

#[test]
fn test_error_missing_operand() {
    assert_eq!(
        parse_error("x = 1 *;"),
        ParseErrorKind::MissingOperand("*".into())
    );
}

#[test]
fn test_error_illegal_names() {
    assert!(matches!(
        parse_error("function if() {}"),
        ParseErrorKind::IllegalName { what: "function", .. }
    ));
    assert!(matches!(
        parse_error("new 3"),
        ParseErrorKind::IllegalName { what: "class", .. }
    ));
}

#[test]
fn test_error_misplaced_abstract() {
    assert_eq!(parse_error("abstract var x = 1"), ParseErrorKind::MisplacedAbstract);
}

#[test]
fn test_error_carries_location() {
    let Err(err) = parse_source("var a = 1\nvar b = (2", "prog.sp") else {
        panic!("expected an error");
    };
    assert_eq!(err.loc().line, 2);
    assert_eq!(err.to_string(), "unmatched '(', in file 'prog.sp', at line 2");
}
