use shimgen::cli;

fn main() -> anyhow::Result<()> {
    if let Err(e) = cli::run() {
        // Scan failures have already been reported as diagnostics.
        if e.to_string().contains("scanning failed") {
            std::process::exit(1);
        }
        eprintln!("Error: {e:?}");
        std::process::exit(1);
    }
    Ok(())
}
