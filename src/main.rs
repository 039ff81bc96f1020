use anyhow::{bail, Context, Result};
use std::{collections::BTreeMap, env};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};
use user_languages::UserLanguages;

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // ─── 2) parse args ───────────────────────────────────────────────
    let args: Vec<String> = env::args().skip(1).collect();
    let (language, limit) = match parse_args(&args) {
        Ok(parsed) => parsed,
        Err(e) => {
            eprintln!("{}", e);
            eprintln!("Usage: user-languages <LANG> [--limit N]");
            std::process::exit(1);
        }
    };

    // ─── 3) resolve file + version ───────────────────────────────────
    let table = UserLanguages::new(language);
    info!(path = %table.path().display(), "reading");
    let version = table
        .version()?
        .map(|v| v.to_rfc3339())
        .unwrap_or_else(|| "unknown".to_string());
    println!("# {} (version {})", table.filename(), version);

    // ─── 4) stream rows ──────────────────────────────────────────────
    let mut levels: BTreeMap<Option<u32>, usize> = BTreeMap::new();
    let mut printed = 0usize;
    let mut failed = 0usize;
    for item in &table {
        let row = match item {
            Ok(row) => row,
            Err(e) => {
                error!("{:#}", e);
                failed += 1;
                continue;
            }
        };
        match row.skill_level() {
            Ok(level) => *levels.entry(level).or_default() += 1,
            Err(e) => {
                error!(user = row.username(), "{:#}", e);
                failed += 1;
                continue;
            }
        }
        if limit.map_or(true, |n| printed < n) {
            println!(
                "{}\t{}\t{}\t{}",
                row.lang(),
                row.raw_skill_level(),
                row.username(),
                row.details()
            );
            printed += 1;
        }
    }

    // ─── 5) summary ──────────────────────────────────────────────────
    println!("# skill level counts");
    for (level, count) in &levels {
        match level {
            Some(l) => println!("{}\t{}", l, count),
            None => println!("unknown\t{}", count),
        }
    }
    let total: usize = levels.values().sum();
    info!(total, failed, "done");
    Ok(())
}

fn parse_args(args: &[String]) -> Result<(String, Option<usize>)> {
    let mut language = None;
    let mut limit = None;
    let mut it = args.iter();
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--limit" => {
                let n = it.next().context("--limit needs a value")?;
                limit = Some(
                    n.parse::<usize>()
                        .with_context(|| format!("invalid --limit {:?}", n))?,
                );
            }
            other if language.is_none() && !other.starts_with("--") => {
                language = Some(other.to_string())
            }
            other => bail!("unexpected argument {:?}", other),
        }
    }
    let language = language.context("missing language code")?;
    Ok((language, limit))
}
