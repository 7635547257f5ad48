//! Native method tables, exercised through SPL source.

use pretty_assertions::assert_eq;

use super::*;
use crate::errors::EvalErrorKind;
use crate::print_handler::buffer_handler;

fn interpreter() -> Interpreter {
    match Interpreter::builder().print_handler(buffer_handler()).build() {
        Ok(interp) => interp,
        Err(e) => panic!("prelude failed: {e}"),
    }
}

fn eval(src: &str) -> Value {
    match interpreter().eval_source(src, "methods.sp") {
        Ok(v) => v,
        Err(e) => panic!("{src}\n  failed: {e}"),
    }
}

/// `repr` of the program's last value.
fn shown(src: &str) -> String {
    eval(src).repr()
}

fn fault(src: &str) -> EvalErrorKind {
    match interpreter().eval_source(src, "methods.sp") {
        Ok(v) => panic!("{src}\n  unexpectedly gave {v}"),
        Err(e) => e.kind,
    }
}

// String methods

#[test]
fn test_length_counts_chars() {
    assert_eq!(eval(r#""héllo".length()"#), Value::Int(5));
    assert_eq!(eval(r#""".length()"#), Value::Int(0));
}

#[test]
fn test_indexing() {
    assert_eq!(shown(r#""abc"[1]"#), r#""b""#);
    assert_eq!(shown(r#""abc"[-1]"#), r#""c""#);
    assert!(matches!(fault(r#""abc"[3]"#), EvalErrorKind::IndexOutOfRange));
}

#[test]
fn test_substring_and_contains() {
    assert_eq!(shown(r#""hello".substring(1, 3)"#), r#""el""#);
    assert_eq!(shown(r#""hello".substring(2)"#), r#""llo""#);
    assert_eq!(eval(r#""hello".contains("ell")"#), Value::Bool(true));
    assert!(matches!(
        fault(r#""hello".substring(3, 1)"#),
        EvalErrorKind::IndexOutOfRange
    ));
}

#[test]
fn test_split() {
    assert_eq!(shown(r#""a,b,,c".split(",")"#), r#"["a", "b", "", "c"]"#);
    assert_eq!(shown(r#""  a  b ".split()"#), r#"["a", "b"]"#);
    assert!(matches!(fault(r#""a".split("")"#), EvalErrorKind::Argument));
}

#[test]
fn test_format_flags() {
    assert_eq!(
        shown(r#""%s has %d items".format("box", 3)"#),
        r#""box has 3 items""#
    );
    assert_eq!(shown(r#""%d".format(7.9)"#), r#""7""#);
    assert_eq!(shown(r#""%.2f".format(1.23456)"#), r#""1.23""#);
    assert_eq!(shown(r#""%f".format(2)"#), r#""2.0""#);
    assert_eq!(shown(r#""%r".format([1, "a"])"#), r#""[1, \"a\"]""#);
    assert_eq!(shown(r#""100%%".format()"#), r#""100%""#);
}

#[test]
fn test_format_errors() {
    assert!(matches!(fault(r#""%s".format(1)"#), EvalErrorKind::StringFormat));
    assert!(matches!(
        fault(r#""%d and %d".format(1)"#),
        EvalErrorKind::IndexOutOfRange
    ));
}

#[test]
fn test_unknown_flag_is_echoed() {
    assert_eq!(shown(r#""%q".format()"#), r#""%q""#);
}

// List methods

#[test]
fn test_append_pop_insert() {
    let src = "var l = [1, 2]\nl.append(3)\nl.insert(0, 0)\nl.insert(4, 4)\nvar last = l.pop()\n[l, last, l.pop(0)]";
    assert_eq!(shown(src), "[[1, 2, 3], 4, 0]");
}

#[test]
fn test_index_access_and_assignment() {
    let src = "var l = [1, 2, 3]\nl[0] = 10\nl[-1] += 5\n[l[0], l.get(1), l[2]]";
    assert_eq!(shown(src), "[10, 2, 8]");
}

#[test]
fn test_search() {
    assert_eq!(eval("[1, 2, 3].index_of(3)"), Value::Int(2));
    assert_eq!(eval("[1, 2, 3].index_of(9)"), Value::Int(-1));
    assert_eq!(eval(r#"[1, "a"].contains("a")"#), Value::Bool(true));
    assert_eq!(eval("[1, 2, 3].size()"), Value::Int(3));
}

#[test]
fn test_sort_reverse_sublist() {
    assert_eq!(shown("var l = [3, 1, 2]\nl.sort()\nl"), "[1, 2, 3]");
    assert_eq!(shown("var l = [1, 2.5, 0]\nl.sort()\nl"), "[0, 1, 2.5]");
    assert_eq!(shown("var l = [1, 2, 3]\nl.reverse()\nl"), "[3, 2, 1]");
    assert_eq!(shown("[1, 2, 3, 4].sublist(1, 3)"), "[2, 3]");
    assert!(matches!(
        fault(r#"var l = [1, "a"]
l.sort()"#),
        EvalErrorKind::Type
    ));
}

#[test]
fn test_extend_from_any_iterable() {
    assert_eq!(
        shown(r#"var l = [1]
l.extend(set(2))
l.extend("ab")
l"#),
        r#"[1, 2, "a", "b"]"#
    );
}

#[test]
fn test_immutable_list_refuses_mutation() {
    assert!(matches!(
        fault("var l = ~[1, 2]\nl.append(3)"),
        EvalErrorKind::IllegalOperation
    ));
    assert!(matches!(
        fault("var l = i_list(1)\nl[0] = 2"),
        EvalErrorKind::IllegalOperation
    ));
    assert_eq!(eval("~[1, 2].get(1)"), Value::Int(2));
}

#[test]
fn test_out_of_range() {
    assert!(matches!(fault("[1][5]"), EvalErrorKind::IndexOutOfRange));
    assert!(matches!(fault("[].pop()"), EvalErrorKind::IndexOutOfRange));
}

// Pair methods

#[test]
fn test_put_get_and_views() {
    let src = r#"var p = {"a": 1}
p.put("b", 2)
p["c"] = 3
[p.size(), p["b"], p.keys(), p.values(), p.contains("a")]"#;
    assert_eq!(shown(src), r#"[3, 2, ["a", "b", "c"], [1, 2, 3], true]"#);
}

#[test]
fn test_missing_key() {
    assert!(matches!(
        fault("var p = {\"a\": 1}\np.get(\"z\")"),
        EvalErrorKind::IndexOutOfRange
    ));
}

#[test]
fn test_pair_builtin_takes_keywords() {
    assert_eq!(shown("pair(x = 1, y = 2)"), r#"{"x": 1, "y": 2}"#);
}

// Set methods

#[test]
fn test_duplicates_collapse() {
    assert_eq!(eval("set(1, 2, 2, 1).size()"), Value::Int(2));
    assert_eq!(eval("set(1, 1.0).size()"), Value::Int(1));
}

#[test]
fn test_add_pop_contains() {
    let src = "var s = set(1)\ns.add(2)\nvar p = s.pop()\n[p, s.contains(1), s.contains(2)]";
    assert_eq!(shown(src), "[2, true, false]");
    assert!(matches!(fault("set().pop()"), EvalErrorKind::IllegalOperation));
}

#[test]
fn test_union_is_new_update_is_in_place() {
    let src = "var a = set(1)\nvar u = a.union([2])\na.update([3])\n[a.size(), u.size(), u.contains(3)]";
    assert_eq!(shown(src), "[2, 2, false]");
}

#[test]
fn test_unhashable_member() {
    assert!(matches!(fault("set([1])"), EvalErrorKind::Type));
}

// Host objects

#[test]
fn test_str_join_stringifies() {
    assert_eq!(
        shown(r#"natives.str_join(", ", [1, "a", null])"#),
        r#""1, a, null""#
    );
}

#[test]
fn test_system_and_os_attributes() {
    assert_eq!(shown("type(system.time())"), r#""int""#);
    assert_eq!(shown("system.encoding"), r#""utf-8""#);
    assert_eq!(
        eval("os.separator"),
        Value::str(std::path::MAIN_SEPARATOR_STR)
    );
    assert!(matches!(fault("system.nothing"), EvalErrorKind::Attribute));
}

#[test]
fn test_thread_target_must_be_named() {
    let src = "function outer() {\n function inner(x) { return x }\n return inner\n}\nnatives.thread(outer(), \"t\", [1])";
    assert!(matches!(fault(src), EvalErrorKind::Argument));
}

#[test]
fn test_thread_args_must_be_transferable() {
    let src = "function work(x) { return x }\nnatives.thread(work, \"t\", [new Object()])";
    assert!(matches!(fault(src), EvalErrorKind::Argument));
}

#[test]
fn test_file_round_trip() {
    let path = std::env::temp_dir().join(format!("spl-methods-{}.txt", std::process::id()));
    let path_literal = format!("{:?}", path.to_string_lossy());
    let src = format!(
        r#"var w = f_open({path_literal}, "w")
w.write("one\n")
w.write(2)
w.close()
var r = f_open({path_literal})
var first = r.readline()
var rest = r.read()
r.close()
[first, rest, r.path == {path_literal}]"#
    );
    let result = shown(&src);
    let _ = std::fs::remove_file(&path);
    assert_eq!(result, r#"["one\n", "2", true]"#);
}

#[test]
fn test_missing_file_is_io_fault() {
    assert!(matches!(
        fault(r#"f_open("/definitely/not/here.txt")"#),
        EvalErrorKind::Io
    ));
}

#[test]
fn test_fault_exposes_kind_and_message() {
    let src = "var k\ntry {\n [1][3]\n} catch (e: Exception) {\n k = [e.kind, type(e.message)]\n}\nk";
    assert_eq!(shown(src), r#"["IndexOutOfRangeException", "string"]"#);
}

#[test]
fn test_member_names_are_sorted_and_complete() {
    let names = member_names("set");
    assert_eq!(
        names,
        vec!["add", "clear", "contains", "pop", "size", "union", "update"]
    );
    assert!(member_names("system").contains(&"argv".to_string()));
    assert!(member_names("no such type").is_empty());
}

#[test]
fn test_dir_lists_native_members() {
    assert_eq!(eval(r#"dir(list).contains("append")"#), Value::Bool(true));
    assert_eq!(eval(r#"dir("text").contains("format")"#), Value::Bool(true));
}
