// Shadow-Instructor: Main Entry Point
// Headless CLI over the interview core. Every command prints JSON on stdout.

use anyhow::{bail, Context};
use shadow_instructor::llm::{CallContext, ModelSlot, ProviderAdapter, Task};
use shadow_instructor::schema::{Difficulty, Scenario};
use shadow_instructor::{
    AppConfig, ClientFactory, ConversationMessage, InterviewContext, InterviewCore, Persona, ResumeDocument,
};
use std::env;

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        print_help();
        std::process::exit(1);
    }

    let rest = &args[2..];
    let result = match args[1].as_str() {
        "--help" | "-h" => {
            print_help();
            Ok(())
        }
        "--version" | "-v" => {
            print_version();
            Ok(())
        }
        "report" => run_report(rest).await,
        "coach" => run_coach(rest).await,
        "turn" => run_turn(rest).await,
        "pacing" => run_pacing(rest).await,
        "frame" => run_frame(rest).await,
        "resume" => run_resume(rest).await,
        "check" => run_check().await,
        _ => {
            eprintln!("Unknown command: {}", args[1]);
            print_help();
            std::process::exit(1);
        }
    };

    if let Err(e) = result {
        eprintln!("❌ {:#}", e);
        std::process::exit(1);
    }
}

fn print_help() {
    println!(
        r#"
Shadow-Instructor: Interview Simulation Core
============================================

USAGE:
    shadow-instructor <COMMAND> [OPTIONS]

COMMANDS:
    report <transcript.json> --role <role>   Deep analysis report for a finished interview
    coach <transcript.json>                  Coaching on the candidate's latest answer
    turn <transcript.json> --role <role>     Next interviewer line (with coaching)
    pacing <text-file>                       Rambling check on a transcript chunk
    frame <image.jpg>                        Non-verbal check on one webcam frame
    resume <file.pdf> [--text <file.txt>]    Visual resume critique
    check                                    Probe the configured primary models

OPTIONS:
    --persona <friendly|tough|faang|roast>
    --difficulty <easy|medium|hard>
    --scenario <url_shortener|rate_limiter|notification_system|kv_store>
    -h, --help            Print this help message
    -v, --version         Print version information

CONFIGURATION:
    Read from the environment or a .env file: GEMINI_API_KEY or
    GOOGLE_APPLICATION_CREDENTIALS_JSON (+ GOOGLE_CLOUD_PROJECT), optional
    GROQ_API_KEY for fallback. Set RUST_LOG=debug for per-call logs.
"#
    );
}

fn print_version() {
    println!("Shadow-Instructor v{}", env!("CARGO_PKG_VERSION"));
}

/// Value following `--name`
fn option<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == name)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

/// First argument that is neither a flag nor a flag's value
fn positional(args: &[String]) -> Option<&str> {
    let mut skip = false;
    for arg in args {
        if skip {
            skip = false;
            continue;
        }
        if arg.starts_with("--") {
            skip = true;
            continue;
        }
        return Some(arg);
    }
    None
}

fn required_path<'a>(args: &'a [String], usage: &str) -> anyhow::Result<&'a str> {
    match positional(args) {
        Some(path) => Ok(path),
        None => bail!("missing file argument\nUsage: shadow-instructor {}", usage),
    }
}

fn persona(args: &[String]) -> anyhow::Result<Persona> {
    match option(args, "--persona") {
        Some(value) => Persona::parse(value).with_context(|| format!("unknown persona: {}", value)),
        None => Ok(Persona::default()),
    }
}

fn interview_context(args: &[String]) -> anyhow::Result<InterviewContext> {
    let role = option(args, "--role").context("--role is required")?;
    let difficulty = match option(args, "--difficulty") {
        Some(value) => Difficulty::parse(value).with_context(|| format!("unknown difficulty: {}", value))?,
        None => Difficulty::default(),
    };
    let scenario = option(args, "--scenario").map(Scenario::from_key).unwrap_or_default();

    Ok(InterviewContext::new(role)
        .with_persona(persona(args)?)
        .with_difficulty(difficulty)
        .with_scenario(scenario))
}

fn load_transcript(path: &str) -> anyhow::Result<Vec<ConversationMessage>> {
    let text = std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path))?;
    serde_json::from_str(&text).with_context(|| format!("{} is not a JSON array of messages", path))
}

fn load_core() -> anyhow::Result<InterviewCore> {
    let config = AppConfig::from_env();
    Ok(InterviewCore::from_config(&config)?)
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run_report(args: &[String]) -> anyhow::Result<()> {
    let path = required_path(args, "report <transcript.json> --role <role>")?;
    let ctx = interview_context(args)?;
    let history = load_transcript(path)?;

    let core = load_core()?;
    let report = core.generate_deep_report(&history, &ctx).await?;
    print_json(&report)
}

async fn run_coach(args: &[String]) -> anyhow::Result<()> {
    let path = required_path(args, "coach <transcript.json>")?;
    let history = load_transcript(path)?;

    let core = load_core()?;
    print_json(&core.generate_coaching(&history).await)
}

async fn run_turn(args: &[String]) -> anyhow::Result<()> {
    let path = required_path(args, "turn <transcript.json> --role <role>")?;
    let ctx = interview_context(args)?;
    let history = load_transcript(path)?;

    let core = load_core()?;
    print_json(&core.respond(&history, &ctx).await)
}

async fn run_pacing(args: &[String]) -> anyhow::Result<()> {
    let path = required_path(args, "pacing <text-file>")?;
    let text = std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path))?;

    let core = load_core()?;
    print_json(&core.analyze_pacing(&text, persona(args)?).await)
}

async fn run_frame(args: &[String]) -> anyhow::Result<()> {
    let path = required_path(args, "frame <image.jpg>")?;
    let image = std::fs::read(path).with_context(|| format!("Failed to read {}", path))?;

    let core = load_core()?;
    print_json(&core.analyze_frame(&image, persona(args)?).await)
}

async fn run_resume(args: &[String]) -> anyhow::Result<()> {
    let path = required_path(args, "resume <file.pdf> [--text <file.txt>]")?;
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read {}", path))?;

    let mut document = ResumeDocument::new(bytes);
    if let Some(text_path) = option(args, "--text") {
        let text = std::fs::read_to_string(text_path).with_context(|| format!("Failed to read {}", text_path))?;
        document = document.with_text(&text);
    }

    let core = load_core()?;
    print_json(&core.analyze_resume_visual(&document).await?)
}

async fn run_check() -> anyhow::Result<()> {
    let config = AppConfig::from_env();
    let factory = ClientFactory::new(&config)?;
    let client = factory.primary_client(None)?;

    println!("Primary provider: {}", client.name());
    println!("Fallback provider: {}", if config.has_fallback() { "groq" } else { "none" });

    let mut failures = 0;
    for slot in [ModelSlot::Interviewer, ModelSlot::Instructor, ModelSlot::Feedback, ModelSlot::Shadow] {
        let model = client.models().model_for(slot).to_string();
        let probe = CallContext::new(Task::InterviewTurn, slot, "", "Reply with the single word OK.").with_temperature(0.0);
        match client.generate(&model, &probe).await {
            Ok(_) => println!("✅ {:?}: {}", slot, model),
            Err(e) => {
                failures += 1;
                println!("❌ {:?}: {} ({})", slot, model, e);
            }
        }
    }

    if failures > 0 {
        bail!("{} model probe(s) failed", failures);
    }
    Ok(())
}
