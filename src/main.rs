use std::{env, error::Error as _, fs, path::Path, process};

use cellflow::{
    ENTRY_POINT, Engine, ReadPolicy, Snapshot, StdPrimitives, Step,
    syntax::{Program, parse},
};
use tracing_subscriber::EnvFilter;

struct RunOptions {
    strict_reads: bool,
    leak_detector: bool,
    entry: String,
    max_steps: Option<u64>,
    checkpoint: Option<String>,
    resume: Option<String>,
}

fn main() {
    let mut args: Vec<String> = env::args().collect();
    let verbose = args.iter().any(|arg| arg == "--verbose");
    let trace = args.iter().any(|arg| arg == "--trace");
    let strict_reads = args.iter().any(|arg| arg == "--strict-reads");
    let leak_detector = args.iter().any(|arg| arg == "--leak-detector");
    args.retain(|arg| {
        !matches!(
            arg.as_str(),
            "--verbose" | "--trace" | "--strict-reads" | "--leak-detector"
        )
    });

    init_logging(verbose, trace);

    let entry = extract_value(&mut args, "--entry");
    let max_steps = match extract_value(&mut args, "--max-steps")
        .map(|raw| raw.parse::<u64>())
        .transpose()
    {
        Ok(value) => value,
        Err(_) => {
            eprintln!("Error: --max-steps expects a non-negative integer.");
            process::exit(2);
        }
    };
    let checkpoint = extract_value(&mut args, "--checkpoint");
    let resume = extract_value(&mut args, "--resume");

    let options = RunOptions {
        strict_reads,
        leak_detector,
        entry: entry.unwrap_or_else(|| ENTRY_POINT.to_string()),
        max_steps,
        checkpoint,
        resume,
    };

    if args.len() < 2 {
        print_help();
        return;
    }

    if is_cf_file(&args[1]) {
        run_file(&args[1], &options);
        return;
    }

    match args[1].as_str() {
        "-h" | "--help" | "help" => print_help(),
        "run" => {
            if args.len() < 3 {
                eprintln!("Usage: cellflow run <file.cf>");
                process::exit(2);
            }
            run_file(&args[2], &options);
        }
        "commands" => {
            if args.len() < 3 {
                eprintln!("Usage: cellflow commands <file.cf>");
                process::exit(2);
            }
            show_commands(&args[2]);
        }
        other => {
            eprintln!("Error: unknown command `{}`", other);
            print_help();
            process::exit(2);
        }
    }
}

fn print_help() {
    println!(
        "\
cellflow CLI

Usage:
  cellflow <file.cf>
  cellflow run <file.cf>
  cellflow commands <file.cf>

Flags:
  --verbose            Log task dispatch and collection (RUST_LOG overrides)
  --trace              Log every executed command
  --strict-reads       Fail on reads of unbound cells instead of reading 0
  --leak-detector      Print live cells and store counters after the run
  --entry <name>       Entry-point function (default: #main)
  --max-steps <n>      Stop after n steps
  --checkpoint <file>  Write the final engine state as JSON
  --resume <file>      Continue from a checkpoint instead of seeding the entry point
  -h, --help           Show this help message
"
    );
}

fn init_logging(verbose: bool, trace: bool) {
    let default = if trace {
        "trace"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Removes `flag <value>` from `args`.
///
/// A flag given without a value is a usage error and exits with status 2.
fn extract_value(args: &mut Vec<String>, flag: &str) -> Option<String> {
    let mut value = None;
    let mut i = 0;
    while i < args.len() {
        if args[i] == flag {
            if i + 1 >= args.len() {
                eprintln!("Usage: cellflow <file.cf> {} <value>", flag);
                process::exit(2);
            }
            value = Some(args.remove(i + 1));
            args.remove(i);
            continue;
        }
        i += 1;
    }
    value
}

fn is_cf_file(path: &str) -> bool {
    Path::new(path).extension().and_then(|ext| ext.to_str()) == Some("cf")
}

fn load_program(path: &str) -> Program {
    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("Error reading {}: {}", path, err);
            process::exit(1);
        }
    };
    match parse(&source) {
        Ok(program) => program,
        Err(err) => {
            eprintln!("{}: {}", path, err);
            process::exit(1);
        }
    }
}

fn run_file(path: &str, options: &RunOptions) {
    let program = load_program(path);

    let mut engine = match &options.resume {
        Some(checkpoint) => {
            let snapshot = fs::read_to_string(checkpoint)
                .map_err(|err| err.to_string())
                .and_then(|json| Snapshot::from_json(&json).map_err(|err| err.to_string()));
            let resumed = snapshot.and_then(|snapshot| {
                Engine::resume(program, StdPrimitives::new(), snapshot)
                    .map_err(|err| err.to_string())
            });
            match resumed {
                Ok(engine) => engine,
                Err(err) => {
                    eprintln!("Error resuming from {}: {}", checkpoint, err);
                    process::exit(1);
                }
            }
        }
        None => {
            let mut engine = Engine::new(program, StdPrimitives::new());
            engine.seed(&options.entry);
            engine
        }
    };
    if options.strict_reads {
        engine.set_read_policy(ReadPolicy::Strict);
    }

    let mut budget = options.max_steps;
    let result = loop {
        if budget == Some(0) {
            eprintln!("stopped after step budget ({} steps total)", engine.steps());
            break Ok(());
        }
        match engine.step() {
            Ok(Step::Done) => break Ok(()),
            Ok(Step::Stalled { pending }) => {
                eprintln!("stalled: {} task(s) can never become ready", pending);
                break Ok(());
            }
            Ok(_) => {}
            Err(err) => break Err(err),
        }
        budget = budget.map(|left| left - 1);
    };

    if let Some(checkpoint) = &options.checkpoint {
        write_checkpoint(&engine, checkpoint);
    }
    if options.leak_detector {
        print_leak_stats(&engine);
    }

    if let Err(err) = result {
        eprintln!("Error: {}", err);
        let mut source = err.source();
        while let Some(cause) = source {
            eprintln!("  caused by: {}", cause);
            source = cause.source();
        }
        process::exit(1);
    }
}

fn write_checkpoint(engine: &Engine, path: &str) {
    let written = engine
        .snapshot()
        .to_json()
        .map_err(|err| err.to_string())
        .and_then(|json| fs::write(path, json).map_err(|err| err.to_string()));
    if let Err(err) = written {
        eprintln!("Error writing checkpoint {}: {}", path, err);
        process::exit(1);
    }
}

fn print_leak_stats(engine: &Engine) {
    let memory = engine.memory();
    eprintln!(
        "Leak stats: live_cells={} allocations={} collections={} collected={} pending_tasks={}",
        memory.live_count(),
        memory.total_allocations(),
        memory.total_collections(),
        memory.total_collected(),
        engine.tasks().len(),
    );
    for (id, cell) in memory.cells() {
        eprintln!(
            "  cell {}: bound={} value={} refs={}",
            id, cell.bound, cell.value, cell.refs
        );
    }
}

fn show_commands(path: &str) {
    let program = load_program(path);
    print!("{}", program);
    println!("; fingerprint {}", program.fingerprint_hex());
}
