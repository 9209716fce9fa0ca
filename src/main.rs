use anyhow::Context;
use cepsheet::logging;
use cepsheet::sample::{write_sample, OUTPUT_FILE, SUCCESS_MESSAGE};

fn main() -> anyhow::Result<()> {
    logging::init_logger();

    let path = write_sample(".").with_context(|| format!("failed to write {}", OUTPUT_FILE))?;
    tracing::debug!(path = %path.display(), "done");

    println!("{}", SUCCESS_MESSAGE);
    Ok(())
}
