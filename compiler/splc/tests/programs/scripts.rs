//! Whole programs covering classes, exceptions, functions and iteration.

use pretty_assertions::assert_eq;

use super::common::output_of;

#[test]
fn test_shapes() {
    let output = output_of(include_str!("scripts/shapes.sp"));
    assert_eq!(output, "rect with area 6\nsquare with area 16\ntrue\n");
}

#[test]
fn test_bank_account_exceptions() {
    let output = output_of(include_str!("scripts/bank.sp"));
    assert_eq!(
        output,
        "ok 30\nattempt 1\nrefused: need 10\nattempt 2\nError: bad amount\nattempt 3\n"
    );
}

#[test]
fn test_functions() {
    let output = output_of(include_str!("scripts/functions.sp"));
    assert_eq!(
        output,
        concat!(
            "[0, 1, 1, 2, 3, 5, 8, 13, 21, 34]\n",
            "7\n",
            "1-2-3\n",
            "[\"brown\", \"fox\", \"quick\", \"the\"]\n",
            "n=5\n",
        )
    );
}

#[test]
fn test_countdown_iterator() {
    let output = output_of(include_str!("scripts/countdown.sp"));
    assert_eq!(output, "[5, 3, 2]\n{\"a\": 10, \"b\": 10}\n");
}

#[test]
fn test_precedence_and_scoping() {
    let src = "var r = 3 + 2 * 5 + 4
if (r > 10) {
    var inside = r * 2
}
println(r, inside)
function f() {
    var hidden = 1
    return hidden
}
f()
var visible = true
try {
    hidden
} catch (e: NameException) {
    visible = false
}
println(visible)";
    assert_eq!(output_of(src), "17 34\nfalse\n");
}
