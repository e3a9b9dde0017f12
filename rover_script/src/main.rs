//! CLI entry point for rover_script.
//! Usage: cargo run -p rover_script -- check scripts/patrol.rover [--bytes-per-char 8]

use std::{env, fs, process};

use rover_data::DEFAULT_BYTES_PER_CHAR;
use rover_script::Script;

fn main() {
    let args: Vec<String> = env::args().collect();

    let rest: &[String] = match args.as_slice() {
        [_, flag, cmd, tail @ ..] if flag == "--" && cmd == "check" => tail,
        [_, cmd, tail @ ..] if cmd == "check" => tail,
        _ => {
            eprintln!("Usage:\n  rover_script check <file> [--bytes-per-char <n>]");
            process::exit(2);
        },
    };
    run_check(rest);
}

fn run_check(args: &[String]) {
    let mut path: Option<&str> = None;
    let mut bytes_per_char = DEFAULT_BYTES_PER_CHAR;
    let mut i = 0;
    while i < args.len() {
        if args[i] == "--bytes-per-char" {
            let Some(raw) = args.get(i + 1) else {
                eprintln!("--bytes-per-char requires a number");
                process::exit(2);
            };
            bytes_per_char = raw.parse().unwrap_or_else(|_| {
                eprintln!("--bytes-per-char: '{raw}' is not a number");
                process::exit(2);
            });
            i += 2;
            continue;
        }
        if path.is_none() {
            path = Some(&args[i]);
        }
        i += 1;
    }
    let Some(path) = path else {
        eprintln!("Usage: rover_script check <file> [--bytes-per-char <n>]");
        process::exit(2);
    };
    let src = fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("error: unable to read '{path}': {e}");
        process::exit(1);
    });

    let script = Script::from_source(&src);
    let mut errors = 0usize;
    let mut ignored = 0usize;
    for line in script.compile() {
        match &line.parsed {
            Ok(Some(_)) => {},
            Ok(None) if line.source.trim().is_empty() => {},
            Ok(None) => {
                ignored += 1;
                println!("{path}:{}: warning: unrecognized line ignored: {}", line.number, line.source.trim());
            },
            Err(e) => {
                errors += 1;
                println!("{path}:{}: error: {e}", line.number);
            },
        }
    }
    if !script.is_terminated() {
        println!("{path}: warning: script has no 'end' line");
    }
    println!(
        "{path}: {} lines, {} bytes at {bytes_per_char} bytes/char, {errors} error(s), {ignored} ignored",
        script.lines().len(),
        script.size_in_bytes(bytes_per_char)
    );
    if errors > 0 {
        process::exit(1);
    }
}
