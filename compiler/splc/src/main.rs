//! SPL command-line interface.

use spl_eval::DEFAULT_MAX_DEPTH;
use splc::commands::{
    lex_file, parse_file, run_file, worker_file, RunCommand, RunOptions, MAX_DEPTH_VAR,
};

fn main() {
    splc::init_tracing();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        print_usage();
        return;
    }

    let command = &args[1];
    let code = match command.as_str() {
        "run" => {
            let run = match RunCommand::parse(&args[2..]) {
                Ok(run) => run,
                Err(msg) => usage_error(&msg, "spl run [--max-depth=<n>] <file.sp> [args...]"),
            };
            run_file(&with_env_depth(run))
        }
        "parse" => {
            if args.len() < 3 {
                usage_error("missing file path", "spl parse <file.sp>");
            }
            parse_file(&args[2])
        }
        "lex" => {
            if args.len() < 3 {
                usage_error("missing file path", "spl lex <file.sp>");
            }
            lex_file(&args[2])
        }
        "worker" => {
            let mut options = RunOptions::default();
            let mut positional = Vec::new();
            for arg in &args[2..] {
                match options.parse_flag(arg) {
                    Ok(true) => {}
                    Ok(false) => positional.push(arg.clone()),
                    Err(msg) => usage_error(&msg, WORKER_USAGE),
                }
            }
            if positional.len() < 2 {
                usage_error("missing file path or function name", WORKER_USAGE);
            }
            let options = match options.with_depth_fallback(depth_var().as_deref()) {
                Ok(options) => options,
                Err(msg) => usage_error(&msg, WORKER_USAGE),
            };
            worker_file(&positional[0], &positional[1], &positional[2..], &options)
        }
        "help" | "--help" | "-h" => {
            print_usage();
            0
        }
        "version" | "--version" | "-v" => {
            println!("SPL {}", env!("CARGO_PKG_VERSION"));
            0
        }
        _ => {
            // A bare script path runs it.
            if std::path::Path::new(command)
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("sp"))
            {
                let run = match RunCommand::parse(&args[1..]) {
                    Ok(run) => run,
                    Err(msg) => usage_error(&msg, "spl <file.sp> [args...]"),
                };
                run_file(&with_env_depth(run))
            } else {
                eprintln!("Unknown command: {command}");
                eprintln!();
                print_usage();
                1
            }
        }
    };
    std::process::exit(code);
}

const WORKER_USAGE: &str = "spl worker [--max-depth=<n>] <file.sp> <function> [arg literals...]";

fn depth_var() -> Option<String> {
    std::env::var(MAX_DEPTH_VAR).ok()
}

fn with_env_depth(mut run: RunCommand) -> RunCommand {
    run.options = match run.options.with_depth_fallback(depth_var().as_deref()) {
        Ok(options) => options,
        Err(msg) => usage_error(&format!("{MAX_DEPTH_VAR}: {msg}"), "spl run <file.sp>"),
    };
    run
}

fn usage_error(msg: &str, usage: &str) -> ! {
    eprintln!("error: {msg}");
    eprintln!("Usage: {usage}");
    std::process::exit(1);
}

fn print_usage() {
    println!("SPL interpreter");
    println!();
    println!("Usage: spl <command> [options]");
    println!();
    println!("Commands:");
    println!("  run <file.sp> [args...]   Run an SPL script");
    println!("  parse <file.sp>           Parse and display the syntax tree");
    println!("  lex <file.sp>             Tokenize and display tokens");
    println!("  worker <file.sp> <fn>     Run one function of a script (used by threads)");
    println!("  help                      Show this help message");
    println!("  version                   Show version information");
    println!();
    println!("Run options:");
    println!("  --max-depth=<n>   Maximum call depth (default: {MAX_DEPTH_VAR}, else {DEFAULT_MAX_DEPTH})");
    println!();
    println!("Environment:");
    println!("  RUST_LOG          Enable tracing, e.g. RUST_LOG=spl_eval=debug");
    println!("  SPL_LOG_TREE      Render tracing spans as a tree");
    println!();
    println!("Examples:");
    println!("  spl run main.sp");
    println!("  spl main.sp first second");
    println!("  spl run --max-depth=200 deep.sp");
}
