fn main() {
    rewind::cli::run();
}
