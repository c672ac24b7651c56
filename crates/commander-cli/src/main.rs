//! Commander — operator tooling for the budgeted mission engine.

use std::path::PathBuf;

use tracing_subscriber::EnvFilter;

mod commands;

fn usage() {
    println!("Commander — budgeted multi-phase mission engine");
    println!();
    println!("Usage: commander <command>");
    println!();
    println!("Commands:");
    println!("  budget [config.json]                     Show the effective budget and timeouts");
    println!("  reputation <feedback.json> <service-id>  Compute a worker's reputation");
    println!("  rank <services.json> <feedback.json> [task-type]");
    println!("                                           Rank workers for a task category");
    println!("  record <feedback.json> <service-id> <score>");
    println!("                                           Append a 0-100 rating to a feedback log");
    println!("  tool                                     Print the hire_agent tool schema");
    println!("  help                                     Show this help message");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        usage();
        std::process::exit(1);
    }

    let config = commander_core::CommanderConfig::from_env();
    let output = match args[1].as_str() {
        "budget" => match args.get(2) {
            Some(path) => commands::budget(&commander_core::CommanderConfig::from_file(
                &PathBuf::from(path),
            )?)?,
            None => commands::budget(&config)?,
        },
        "reputation" => {
            if args.len() < 4 {
                eprintln!("Usage: commander reputation <feedback.json> <service-id>");
                std::process::exit(1);
            }
            commands::reputation(
                &PathBuf::from(&args[2]),
                &args[3],
                config.min_feedback_samples,
                now(),
            )?
        }
        "rank" => {
            if args.len() < 4 {
                eprintln!("Usage: commander rank <services.json> <feedback.json> [task-type]");
                std::process::exit(1);
            }
            commands::rank(
                &PathBuf::from(&args[2]),
                &PathBuf::from(&args[3]),
                args.get(4).map(String::as_str),
                config.min_feedback_samples,
                now(),
            )?
        }
        "record" => {
            if args.len() < 5 {
                eprintln!("Usage: commander record <feedback.json> <service-id> <score>");
                std::process::exit(1);
            }
            commands::record(&PathBuf::from(&args[2]), &args[3], &args[4], now())?
        }
        "tool" => serde_json::to_string_pretty(&commander_runtime::tool::tool_definition())?,
        "--help" | "-h" | "help" => {
            usage();
            return Ok(());
        }
        other => {
            eprintln!("Unknown command: {}. Use 'commander help' for usage.", other);
            std::process::exit(1);
        }
    };

    println!("{}", output);
    Ok(())
}

fn now() -> i64 {
    chrono::Utc::now().timestamp()
}
