fn main() {
    if let Err(err) = pinshelf::run() {
        eprintln!("pinshelf failed: {err}");
        std::process::exit(1);
    }
}
