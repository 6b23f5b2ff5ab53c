// fil-fuzzing/src/bin/fuzz_mpool.rs
//! Message Pool Fuzzer

use anyhow::Result;
use clap::Parser;

use fil_fuzzing::cli::FuzzArgs;
use fil_fuzzing::{run_target, FuzzTarget};

#[tokio::main]
async fn main() -> Result<()> {
    let args = FuzzArgs::parse();

    println!("=================================================================");
    println!("Filecoin Message Pool Fuzzer");
    println!("=================================================================");

    let (settings, node) = args.resolve()?;
    fil_fuzzing::init(&settings.mode);

    let summary = run_target(&settings, &node, FuzzTarget::Message).await?;

    fil_fuzzing::finalize(&summary);
    Ok(())
}
