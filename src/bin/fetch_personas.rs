use std::io::Write;

fn main() {
    let code = match personas::cli::run_fetch_personas(std::env::args().skip(1)) {
        Ok(()) => 0,
        Err(err) => personas::cli::report_error(err.as_ref()),
    };
    let _ = std::io::stdout().flush();
    let _ = std::io::stderr().flush();
    // Exit without running destructors.
    std::process::exit(code);
}
