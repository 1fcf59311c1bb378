fn main() {
    upm_yarn::cli::run();
}
