use pretty_assertions::assert_eq;

use super::*;
use crate::errors::{EvalError, EvalErrorKind};
use crate::print_handler::buffer_handler;

fn interpreter() -> Interpreter {
    match Interpreter::builder().print_handler(buffer_handler()).build() {
        Ok(interp) => interp,
        Err(e) => panic!("prelude failed: {e}"),
    }
}

fn run_in(interp: &mut Interpreter, src: &str) -> Result<Value, EvalError> {
    interp.eval_source(src, "test.sp")
}

/// `repr` of the last statement's value.
fn shown(src: &str) -> String {
    match run_in(&mut interpreter(), src) {
        Ok(v) => v.repr(),
        Err(e) => panic!("{src}\n  failed: {e}"),
    }
}

fn fault(src: &str) -> EvalError {
    match run_in(&mut interpreter(), src) {
        Ok(v) => panic!("{src}\n  unexpectedly gave {v}"),
        Err(e) => e,
    }
}

fn output(src: &str) -> String {
    let mut interp = interpreter();
    if let Err(e) = run_in(&mut interp, src) {
        panic!("{src}\n  failed: {e}");
    }
    interp.print_handler().get_output()
}

// Expressions

#[test]
fn test_precedence() {
    assert_eq!(shown("3 + 2 * 5 + 4"), "17");
    assert_eq!(shown("(3 + 2) * 5"), "25");
    assert_eq!(shown("2 * (3 + 4) - 1"), "13");
    assert_eq!(shown("1 + 2 == 3 && 4 > 3"), "true");
}

#[test]
fn test_numeric_semantics() {
    assert_eq!(shown("7 / 2"), "3");
    assert_eq!(shown("-7 % 3"), "2");
    assert_eq!(shown("7 / 2.0"), "3.5");
    assert!(matches!(fault("1 / 0").kind, EvalErrorKind::Arithmetic));
}

#[test]
fn test_lazy_logic() {
    assert_eq!(shown("false && undefined_name()"), "false");
    assert_eq!(shown("true || undefined_name()"), "true");
    assert_eq!(shown("1 && 5"), "5");
    assert_eq!(shown("0 || \"x\""), "\"x\"");
}

#[test]
fn test_ternary_evaluates_one_branch() {
    assert_eq!(shown("true ? 1 : missing()"), "1");
    assert_eq!(shown("false ? missing() : 2"), "2");
    assert_eq!(shown("false ? 1 : true ? 2 : 3"), "2");
}

#[test]
fn test_inc_dec() {
    assert_eq!(shown("var i = 1\nvar a = i++\nvar b = ++i\n[a, b, i]"), "[1, 3, 3]");
    assert_eq!(shown("var l = [5]\nl[0]--\nl"), "[4]");
    assert!(matches!(fault("var s = \"a\"\ns++").kind, EvalErrorKind::Type));
}

#[test]
fn test_string_concatenation_needs_strings() {
    assert_eq!(shown("\"a\" + \"b\""), "\"ab\"");
    assert!(matches!(fault("\"a\" + 1").kind, EvalErrorKind::Type));
    assert_eq!(shown("\"a\" + string(1)"), "\"a1\"");
}

// Scopes

#[test]
fn test_var_in_if_block_is_visible_after() {
    assert_eq!(shown("if (true) {\n var x = 1\n}\nx"), "1");
}

#[test]
fn test_function_locals_do_not_leak() {
    let err = fault("function f() {\n var y = 2\n}\nf()\ny");
    assert!(matches!(err.kind, EvalErrorKind::Name));
}

#[test]
fn test_redeclaration_in_same_scope() {
    assert!(matches!(fault("var a = 1\nvar a = 2").kind, EvalErrorKind::Name));
    assert_eq!(
        shown("var a = 1\nfunction f() {\n var a = 2\n return a\n}\n[f(), a]"),
        "[2, 1]"
    );
}

#[test]
fn test_constants_cannot_be_reassigned() {
    assert!(matches!(fault("const c = 1\nc = 2").kind, EvalErrorKind::Type));
}

#[test]
fn test_closures_keep_their_frame() {
    let src = "function counter() {
    var n = 0
    return function() {
        n += 1
        return n
    }
}
var c = counter()
c()
c()";
    assert_eq!(shown(src), "2");
}

// Loops

#[test]
fn test_inner_break_leaves_outer_loop_running() {
    let src = "var out = []
for (var i = 0; i < 3; i++) {
    for (var j = 0; j < 3; j++) {
        if (j == 1) break
        out.append([i, j])
    }
}
out";
    assert_eq!(shown(src), "[[0, 0], [1, 0], [2, 0]]");
}

#[test]
fn test_continue_skips_rest_of_iteration() {
    let src = "var out = []
for (var i = 0; i < 5; i++) {
    if (i % 2 == 0) continue
    out.append(i)
}
out";
    assert_eq!(shown(src), "[1, 3]");
}

#[test]
fn test_inner_continue_leaves_outer_loop_running() {
    let src = "var out = []
for (var i = 0; i < 3; i++) {
    for (var j = 0; j < 3; j++) {
        if (j == 1) continue
        out.append(j)
    }
    out.append(i * 10)
}
out";
    assert_eq!(shown(src), "[0, 2, 0, 0, 2, 10, 0, 2, 20]");
}

#[test]
fn test_while_and_for_each() {
    assert_eq!(shown("var n = 0\nwhile (n < 10) {\n n += 3\n}\nn"), "12");
    let src = r#"var keys = []
for (var k; {"a": 1, "b": 2}) {
    keys.append(k)
}
for (var c; "xy") keys.append(c)
keys"#;
    assert_eq!(shown(src), r#"["a", "b", "x", "y"]"#);
}

#[test]
fn test_return_inside_loop_leaves_function() {
    let src = "function first_even(l) {
    for (var x; l) {
        if (x % 2 == 0) {
            return x
        }
    }
    return -1
}
[first_even([1, 3, 4, 6]), first_even([1])]";
    assert_eq!(shown(src), "[4, -1]");
}

#[test]
fn test_break_outside_loop() {
    assert!(matches!(fault("break").kind, EvalErrorKind::Structural));
}

// Calls

#[test]
fn test_parameter_binding() {
    let src = "function f(a, b = 2, *rest, **kw) {
    return [a, b, rest, kw]
}
[f(1), f(1, 3, 4, 5, k = 6)]";
    assert_eq!(shown(src), r#"[[1, 2, [], {}], [1, 3, [4, 5], {"k": 6}]]"#);
}

#[test]
fn test_missing_argument_message() {
    let err = fault("function f(a) {\n return a\n}\nf()");
    assert!(matches!(err.kind, EvalErrorKind::Argument));
    assert!(err.message.contains("'f'"), "{}", err.message);
    assert!(err.message.contains("'a'"), "{}", err.message);
}

#[test]
fn test_surplus_arguments() {
    assert!(matches!(fault("function f() {}\nf(1)").kind, EvalErrorKind::Argument));
    assert!(matches!(fault("function f() {}\nf(x = 1)").kind, EvalErrorKind::Argument));
}

#[test]
fn test_defaults_are_evaluated_once() {
    let src = "var count = 0
function tick() {
    count += 1
    return count
}
function f(x = tick()) {
    return x
}
f()
f()
f(10)
count";
    assert_eq!(shown(src), "1");

    let src = "function g(l = []) {
    l.append(1)
    return l.size()
}
g()
g()";
    assert_eq!(shown(src), "2");
}

#[test]
fn test_spread_arguments() {
    let src = r#"function f(a, b, c) {
    return a + b + c
}
var args = [1, 2]
var kw = {"c": 3}
f(*args, **kw)"#;
    assert_eq!(shown(src), "6");
}

#[test]
fn test_call_depth_guard() {
    let mut interp = match Interpreter::builder()
        .print_handler(buffer_handler())
        .max_call_depth(50)
        .build()
    {
        Ok(interp) => interp,
        Err(e) => panic!("{e}"),
    };
    let result = run_in(&mut interp, "function r(n) {\n return r(n + 1)\n}\nr(0)");
    match result {
        Err(e) => assert!(matches!(e.kind, EvalErrorKind::StackOverflow { depth: 50 })),
        Ok(v) => panic!("expected overflow, got {v}"),
    }
    let caught = run_in(
        &mut interp,
        "var ok = false\ntry {\n r(0)\n} catch (e: Exception) {\n ok = true\n}\nok",
    );
    assert_eq!(caught.ok(), Some(Value::Bool(true)));
}

#[test]
fn test_backtrace_lists_live_calls() {
    let err = fault("function a() {\n return b()\n}\nfunction b() {\n return 1 / 0\n}\na()");
    let names: Vec<String> = err
        .backtrace
        .iter()
        .flat_map(|bt| bt.frames().iter().map(|f| f.name.clone()))
        .collect();
    assert_eq!(names, vec!["b".to_string(), "a".to_string()]);
    assert_eq!(err.loc.map(|l| l.line), Some(5));
}

// Classes

#[test]
fn test_method_override_is_seen_by_base_methods() {
    let src = r#"class Animal {
    function speak() {
        return "..."
    }
    function greet() {
        return "I say " + speak()
    }
}
class Dog extends Animal {
    @Override
    function speak() {
        return "woof"
    }
}
var d = new Dog()
d.greet()"#;
    assert_eq!(shown(src), r#""I say woof""#);
}

#[test]
fn test_constructor_and_fields() {
    let src = "class Point {
    var x
    var y
    function Point(a, b) {
        x = a
        this.y = b
    }
    function sum() {
        return x + y
    }
}
var p = new Point(2, 3)
p.x = 10
[p.sum(), p.y]";
    assert_eq!(shown(src), "[13, 3]");
}

#[test]
fn test_class_without_constructor_refuses_arguments() {
    assert!(matches!(fault("class A {}\nnew A(1)").kind, EvalErrorKind::Argument));
    assert!(matches!(
        fault("abstract class S {}\nnew S()").kind,
        EvalErrorKind::AbstractMethod
    ));
}

#[test]
fn test_member_access_errors() {
    assert!(matches!(
        fault("var o = new Object()\no.missing").kind,
        EvalErrorKind::Attribute
    ));
    assert!(matches!(
        fault("var o = new Object()\no.this").kind,
        EvalErrorKind::Unauthorized
    ));
    assert!(matches!(
        fault("var o = new Object()\no.nope = 1").kind,
        EvalErrorKind::Attribute
    ));
}

#[test]
fn test_operator_overloading() {
    let src = r#"class Vec {
    var x
    function Vec(v) {
        x = v
    }
    def operator +(other) {
        return new Vec(x + other.x)
    }
    function __str__() {
        return "Vec(" + string(x) + ")"
    }
}
var v = new Vec(1) + new Vec(2)
[string(v), v.x]"#;
    assert_eq!(shown(src), r#"["Vec(3)", 3]"#);
    assert!(matches!(
        fault("var o = new Object()\no * 2").kind,
        EvalErrorKind::Attribute
    ));
}

#[test]
fn test_default_equality_is_identity() {
    let src = "var a = new Object()\n[a == a, a == new Object(), a != new Object(), a === a]";
    assert_eq!(shown(src), "[true, false, true, true]");
}

#[test]
fn test_instanceof() {
    let src = "class A {}\nclass B extends A {}\nvar b = new B()\n[b instanceof A, b instanceof Object, new A() instanceof B, 1 instanceof int, null instanceof void]";
    assert_eq!(shown(src), "[true, true, false, true, true]");
}

#[test]
fn test_user_iterator_stops_at_stop_iteration() {
    let src = "class Range extends Iterable {
    var lo
    var hi
    function Range(a, b) {
        lo = a
        hi = b
    }
    function __iter__() {
        return this
    }
    function __next__() {
        if (lo >= hi) {
            return new StopIteration()
        }
        lo += 1
        return lo - 1
    }
}
var out = []
var r = new Range(0, 3)
for (var x; r) {
    out.append(x)
}
out";
    assert_eq!(shown(src), "[0, 1, 2]");
}

#[test]
fn test_for_each_needs_an_iterable() {
    let err = fault("class A {}\nfor (var x; new A()) {}");
    assert!(matches!(err.kind, EvalErrorKind::Type));
}

#[test]
fn test_diamond_and_cyclic_inheritance() {
    let src = "var runs = 0
class Base {
    runs += 1
}
class L extends Base {}
class R extends Base {}
class D extends L, R {}
var d = new D()
runs";
    assert_eq!(shown(src), "1");
    let err = fault("class A extends B {}\nclass B extends A {}\nnew A()");
    assert!(matches!(err.kind, EvalErrorKind::Structural));
}

// Exceptions

#[test]
fn test_catch_by_ancestor() {
    let src = r#"class MyError extends Error {
    function MyError(msg) {
        message = msg
    }
}
var caught = ""
try {
    throw new MyError("bad")
} catch (e: TypeException) {
    caught = "type"
} catch (e: Exception) {
    caught = e.message
}
caught"#;
    assert_eq!(shown(src), r#""bad""#);
}

#[test]
fn test_runtime_faults_match_their_kind() {
    let src = "var kind = null
try {
    1 / 0
} catch (e: ArithmeticException) {
    kind = e.kind
}
kind";
    assert_eq!(shown(src), "\"ArithmeticException\"");
    let err = fault("try {\n 1 / 0\n} catch (e: NameException) {\n}");
    assert!(matches!(err.kind, EvalErrorKind::Arithmetic));
}

#[test]
fn test_only_instances_are_thrown() {
    assert!(matches!(fault("throw 1").kind, EvalErrorKind::Type));
    let err = fault("throw new Exception(\"x\")");
    assert!(matches!(err.kind, EvalErrorKind::Thrown(_)));
}

#[test]
fn test_finally_return_overrides() {
    let src = "function f() {
    try {
        return 1
    } finally {
        return 2
    }
}
function h() {
    try {
        throw new Exception(\"lost\")
    } finally {
        return \"recovered\"
    }
}
[f(), h()]";
    assert_eq!(shown(src), r#"[2, "recovered"]"#);
}

#[test]
fn test_finally_without_return_keeps_outcome() {
    let src = r#"var log = []
function g() {
    try {
        return 1
    } finally {
        log.append("cleanup")
    }
}
[g(), log]"#;
    assert_eq!(shown(src), r#"[1, ["cleanup"]]"#);

    let err = fault("var log = []\ntry {\n 1 / 0\n} finally {\n log.append(1)\n}");
    assert!(matches!(err.kind, EvalErrorKind::Arithmetic));
}

#[test]
fn test_exit_is_never_caught() {
    let err = fault("try {\n exit(3)\n} catch (e: Exception) {\n}");
    assert!(matches!(err.kind, EvalErrorKind::Exit(3)));
}

#[test]
fn test_assert() {
    assert_eq!(shown("assert 1 + 1 == 2\n\"ok\""), "\"ok\"");
    assert!(matches!(fault("assert 1 == 2").kind, EvalErrorKind::Assertion));
}

// Built-ins

#[test]
fn test_print_and_println() {
    assert_eq!(output("print(\"a\", 1)\nprintln(\"!\")\nprintln([1, \"b\"])"), "a 1!\n[1, \"b\"]\n");
}

#[test]
fn test_exception_str() {
    assert_eq!(output("println(new Error(\"boom\"))"), "Error: boom\n");
}

#[test]
fn test_conversions() {
    assert_eq!(
        shown(r#"[int("42"), int(3.9), float("1.5"), string(2.0), boolean(""), type(null), type(1.0)]"#),
        r#"[42, 3, 1.5, "2.0", false, "void", "float"]"#
    );
    assert!(matches!(fault("int(\"x\")").kind, EvalErrorKind::Argument));
}

#[test]
fn test_eval_runs_in_caller_frame() {
    assert_eq!(shown("var x = 2\neval(\"x * 21\")"), "42");
    let src = "function f() {\n var local = 5\n return eval(\"local + 1\")\n}\nf()";
    assert_eq!(shown(src), "6");
    assert!(matches!(fault("eval(\"1 +\")").kind, EvalErrorKind::Structural));
}

#[test]
fn test_dir_of_class() {
    let src = "class P {\n var a = 1\n function m() {}\n}\ndir(P)";
    assert_eq!(shown(src), r#"["__eq__", "__ne__", "a", "m"]"#);
}

#[test]
fn test_help_of_class() {
    let text = output("/** A point. */\nclass P {\n var a = 1\n function m(x, y = 2) {}\n}\nhelp(P)");
    assert!(text.starts_with("Help on class P\n"), "{text}");
    assert!(text.contains("class P extends Object\n"), "{text}");
    assert!(text.contains("A point."), "{text}");
    assert!(text.contains("---------- Attributes ----------\n"), "{text}");
    assert!(text.contains("m(x, y=2)\n"), "{text}");
}

#[test]
fn test_input_reads_scripted_lines() {
    let mut interp = match Interpreter::builder()
        .print_handler(crate::print_handler::scripted_handler(["Ada"]))
        .build()
    {
        Ok(interp) => interp,
        Err(e) => panic!("{e}"),
    };
    let result = run_in(&mut interp, "var name = input(\"name? \")\n[name, input()]");
    assert_eq!(result.map(|v| v.repr()).ok().as_deref(), Some(r#"["Ada", null]"#));
    assert_eq!(interp.print_handler().get_output(), "name? ");
}

#[test]
fn test_main_is_false_in_workers() {
    let mut interp = match Interpreter::builder().print_handler(buffer_handler()).worker().build() {
        Ok(interp) => interp,
        Err(e) => panic!("{e}"),
    };
    assert_eq!(run_in(&mut interp, "main()").ok(), Some(Value::Bool(false)));
    assert_eq!(shown("main()"), "true");
}

#[test]
fn test_run_worker_calls_named_function() {
    let mut interp = interpreter();
    assert!(run_in(&mut interp, "function add(a, b) {\n return a + b\n}").is_ok());
    let result = crate::worker::run_worker(&mut interp, "add", &["1".to_string(), "2".to_string()]);
    assert_eq!(result.map(|v| v.repr()).ok().as_deref(), Some("3"));
}

#[test]
fn test_worker_arguments_keep_their_shape() {
    use crate::value::OrderedMap;
    use crate::worker::{run_worker, transferable_literal};

    let mut interp = interpreter();
    assert!(run_in(&mut interp, "function echo(x) {\n return x\n}").is_ok());
    let mut pair = OrderedMap::new();
    assert!(pair.insert(Value::str("k"), Value::Int(1)).is_ok());
    let sent = vec![
        Value::Null,
        Value::Bool(true),
        Value::Int(-3),
        Value::Float(2.5),
        Value::str("tab\there \"quoted\""),
        Value::list(vec![]),
        Value::list(vec![Value::Int(1), Value::list(vec![Value::str("x")])]),
        Value::pair(pair),
        Value::pair(OrderedMap::new()),
    ];
    for value in &sent {
        let literal = match transferable_literal(value) {
            Ok(literal) => literal,
            Err(e) => panic!("{} not transferable: {e}", value.repr()),
        };
        let echoed = run_worker(&mut interp, "echo", &[literal]);
        assert_eq!(echoed.map(|v| v.repr()).ok(), Some(value.repr()));
    }
}

#[test]
fn test_without_prelude_only_object_remains() {
    let mut interp = match Interpreter::builder()
        .print_handler(buffer_handler())
        .load_prelude(false)
        .build()
    {
        Ok(interp) => interp,
        Err(e) => panic!("{e}"),
    };
    assert!(run_in(&mut interp, "new Object()").is_ok());
    assert!(run_in(&mut interp, "new Exception()").is_err());
}

#[test]
fn test_fault_location_is_reported() {
    let err = fault("var a = 1\n\nmissing");
    let text = err.to_string();
    assert!(text.contains("in file 'test.sp', at line 3"), "{text}");
}
