use anyhow::Result;

fn main() -> Result<()> {
    rustscore::cli::run()
}
