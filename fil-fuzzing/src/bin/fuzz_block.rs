// fil-fuzzing/src/bin/fuzz_block.rs
//! Block Submission Fuzzer

use anyhow::Result;
use clap::Parser;

use fil_fuzzing::cli::FuzzArgs;
use fil_fuzzing::{run_target, FuzzTarget};

#[tokio::main]
async fn main() -> Result<()> {
    let args = FuzzArgs::parse();

    println!("=================================================================");
    println!("Filecoin Block Submission Fuzzer");
    println!("=================================================================");

    let (settings, node) = args.resolve()?;
    fil_fuzzing::init(&settings.mode);

    let summary = run_target(&settings, &node, FuzzTarget::Block).await?;

    fil_fuzzing::finalize(&summary);
    Ok(())
}
