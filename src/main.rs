fn main() {
    if let Err(err) = mediquery::cli::main() {
        eprintln!("❌ Error: {err}");
        std::process::exit(1);
    }
}
