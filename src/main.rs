fn main() {
    if let Err(e) = hostlist::app::run_cli() {
        eprintln!("{e}");
        std::process::exit(1);
    }
}
