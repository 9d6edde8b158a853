use std::path::PathBuf;

use ballot::database::RedisStore;
use clap::Parser;
use import::{ElectionFile, import_election, progress_bar};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// JSON file holding directors, roll, candidates and deadline
    file: PathBuf,

    #[arg(long, default_value = "redis://localhost:6379")]
    redis_url: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let election = ElectionFile::read(&args.file)?;
    println!("Loaded Directors: {}", election.directors.len());
    println!("Loaded Registrations: {}", election.registrations.len());
    println!("Loaded Candidates: {}\n", election.candidates.len());

    let store = RedisStore::connect(&args.redis_url).await?;
    let summary = import_election(&store, election, &progress_bar(0)?).await?;

    println!("\nImported Directors: {}", summary.directors);
    println!("Imported Registrations: {}", summary.registrations);
    println!("Imported Candidates: {}", summary.candidates);

    if summary.skipped > 0 {
        println!("Skipped Entries: {}", summary.skipped);
    }

    Ok(())
}
