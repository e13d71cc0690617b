fn main() {
    if let Err(error) = imagelab::run_cli() {
        eprintln!("{error}");
        std::process::exit(1);
    }
}
