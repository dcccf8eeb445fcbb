extern crate depparse;

fn main() {
    depparse::cli::run();
}
