#![expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]

use super::*;

#[test]
fn buffer_handler_println_captures_with_newline() {
    let handler = BufferPrintHandler::new();
    handler.println("hello");
    assert_eq!(handler.get_output(), "hello\n");
}

#[test]
fn buffer_handler_print_captures_without_newline() {
    let handler = BufferPrintHandler::new();
    handler.print("hello");
    handler.print(" ");
    handler.println("world");
    assert_eq!(handler.get_output(), "hello world\n");
}

#[test]
fn buffer_handler_clear_empties_buffer() {
    let handler = buffer_handler();
    handler.println("hello");
    handler.clear();
    assert!(handler.get_output().is_empty());
}

#[test]
fn scripted_handler_replays_input() {
    let handler = scripted_handler(["first", "second"]);
    assert_eq!(handler.read_line().unwrap(), Some("first".to_string()));
    assert_eq!(handler.read_line().unwrap(), Some("second".to_string()));
    assert_eq!(handler.read_line().unwrap(), None);
}

#[test]
fn silent_handler_discards_output() {
    let handler = silent_handler();
    handler.println("hello");
    handler.print("world");
    assert_eq!(handler.get_output(), "");
    assert_eq!(handler.read_line().unwrap(), None);
}

#[test]
fn buffer_handler_is_thread_safe() {
    use std::thread;

    let handler = buffer_handler();
    let handler2 = handler.clone();

    let t1 = thread::spawn(move || {
        for _ in 0..100 {
            handler2.println("a");
        }
    });

    for _ in 0..100 {
        handler.println("b");
    }

    t1.join().unwrap();
    assert_eq!(handler.get_output().lines().count(), 200);
}
