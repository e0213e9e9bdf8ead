fn main() {
    fluentreq::cli::run();
}
