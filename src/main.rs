fn main() {
    if let Err(e) = stacky::cli::run() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
