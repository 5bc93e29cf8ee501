fn main() {
    if let Err(err) = fencebox::cli::main() {
        eprintln!("❌ Error: {err}");
        std::process::exit(1);
    }
}
