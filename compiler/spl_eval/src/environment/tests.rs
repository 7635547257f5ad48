use pretty_assertions::assert_eq;

use super::*;
use crate::errors::EvalErrorKind;

#[test]
fn test_define_and_lookup() {
    let env = Environment::global();
    assert!(env.define_var("x", Value::Int(42)).is_ok());
    assert_eq!(env.lookup("x"), Some(Value::Int(42)));
    assert_eq!(env.lookup("y"), None);
    assert!(env.get("y").is_err());
}

#[test]
fn test_inner_frame_sees_outer() {
    let global = Environment::global();
    assert!(global.define_var("x", Value::Int(1)).is_ok());
    let func = Environment::function(&global);
    assert_eq!(func.lookup("x"), Some(Value::Int(1)));
    assert!(func.define_var("y", Value::Int(2)).is_ok());
    assert_eq!(global.lookup("y"), None);
}

#[test]
fn test_function_frame_may_shadow() {
    let global = Environment::global();
    assert!(global.define_var("x", Value::Int(1)).is_ok());
    let func = Environment::function(&global);
    assert!(func.define_var("x", Value::Int(2)).is_ok());
    assert_eq!(func.lookup("x"), Some(Value::Int(2)));
    assert_eq!(global.lookup("x"), Some(Value::Int(1)));
}

#[test]
fn test_loop_frame_cannot_shadow_enclosing_function_local() {
    let global = Environment::global();
    let func = Environment::function(&global);
    assert!(func.define_var("x", Value::Int(1)).is_ok());
    let body = Environment::loop_frame(&func);
    let err = body.define_var("x", Value::Int(2)).err();
    assert_eq!(err.map(|e| e.message), Some("Name 'x' is already defined in this scope".into()));
}

#[test]
fn test_sub_frame_forwards_definitions() {
    let global = Environment::global();
    let func = Environment::function(&global);
    let branch = Environment::sub(&func);
    assert!(branch.define_var("z", Value::Int(3)).is_ok());
    assert_eq!(func.own("z"), Some(Value::Int(3)));
    assert_eq!(branch.own("z"), None);
}

#[test]
fn test_constants_refuse_assignment() {
    let env = Environment::global();
    assert!(env.define_const("PI", Value::Float(2.5)).is_ok());
    let err = env.assign("PI", Value::Int(3)).err();
    assert!(matches!(err.map(|e| e.kind), Some(EvalErrorKind::Type)));
    assert!(env.define_const("PI", Value::Int(3)).is_err());
}

#[test]
fn test_assign_walks_outward() {
    let global = Environment::global();
    assert!(global.define_var("n", Value::Int(0)).is_ok());
    let func = Environment::function(&global);
    let inner = Environment::loop_frame(&func);
    assert!(inner.assign("n", Value::Int(5)).is_ok());
    assert_eq!(global.lookup("n"), Some(Value::Int(5)));
    assert!(inner.assign("missing", Value::Null).is_err());
}

#[test]
fn test_heap_is_shared_and_searched_last() {
    let global = Environment::global();
    global.add_heap("Thing", Value::Int(7));
    let func = Environment::function(&global);
    assert_eq!(func.lookup("Thing"), Some(Value::Int(7)));
    assert!(func.define_var("Thing", Value::Int(1)).is_err());
    assert!(func.heap().ptr_eq(&global.heap()));
}

#[test]
fn test_return_marks_function_and_loops() {
    let global = Environment::global();
    let func = Environment::function(&global);
    let title = Environment::loop_frame(&func);
    let body = Environment::loop_frame(&title);
    let branch = Environment::sub(&body);
    assert!(branch.terminate(Value::Int(9)).is_ok());
    assert!(func.is_terminated());
    assert!(branch.is_terminated());
    assert_eq!(func.terminate_value(), Value::Int(9));
    assert!(body.is_broken());
    assert!(title.is_broken());
}

#[test]
fn test_return_outside_function_fails() {
    let global = Environment::global();
    let branch = Environment::sub(&global);
    let err = branch.terminate(Value::Null).err();
    assert_eq!(err.map(|e| e.message), Some("Return outside function".into()));
}

#[test]
fn test_break_and_continue_stay_in_nearest_loop() {
    let global = Environment::global();
    let outer = Environment::loop_frame(&global);
    let inner = Environment::loop_frame(&outer);
    let branch = Environment::sub(&inner);
    assert!(branch.pause_loop().is_ok());
    assert!(inner.loop_interrupted());
    assert!(!inner.is_broken());
    assert!(!outer.loop_interrupted());
    branch.resume_loop();
    assert!(!inner.loop_interrupted());
    assert!(branch.break_loop().is_ok());
    assert!(inner.is_broken());
    assert!(!outer.is_broken());
}

#[test]
fn test_break_outside_loop_fails() {
    let global = Environment::global();
    let func = Environment::function(&global);
    assert!(Environment::sub(&func).break_loop().is_err());
    assert!(global.pause_loop().is_err());
}

#[test]
fn test_invalidate_clears_bindings() {
    let global = Environment::global();
    let body = Environment::loop_frame(&global);
    assert!(body.define_var("i", Value::Int(1)).is_ok());
    assert!(body.pause_loop().is_ok());
    body.invalidate();
    assert_eq!(body.own("i"), None);
    assert!(!body.loop_interrupted());
    assert!(body.define_var("i", Value::Int(2)).is_ok());
}

#[test]
fn test_suspend_and_restore_control() {
    let global = Environment::global();
    let func = Environment::function(&global);
    let body = Environment::loop_frame(&func);
    assert!(body.terminate(Value::Int(1)).is_ok());

    let saved = body.suspend_control();
    assert!(!func.is_terminated());
    assert!(!body.is_broken());

    assert!(body.restore_control(saved).is_ok());
    assert!(func.is_terminated());
    assert!(body.is_broken());
    assert_eq!(func.terminate_value(), Value::Int(1));
}

#[test]
fn test_attributes_sorted() {
    let global = Environment::global();
    let frame = Environment::class(&global);
    frame.bind_local("b", Value::Int(2));
    assert!(frame.define_const("a", Value::Int(1)).is_ok());
    let names: Vec<String> = frame.attributes().into_iter().map(|(k, _)| k).collect();
    assert_eq!(names, vec!["a", "b"]);
}

#[test]
fn test_define_function_overwrites() {
    let global = Environment::global();
    let loc = Loc::internal();
    global.define_function("f", Value::Int(1), &[], &loc);
    global.define_function("f", Value::Int(2), &["Override".to_string()], &loc);
    assert_eq!(global.lookup("f"), Some(Value::Int(2)));
}
