fn main() {
    // ESP-IDF sysenv propagation is only meaningful for device builds;
    // host builds (tests, simulation) carry no espidf feature and no
    // exported IDF environment.
    if std::env::var("CARGO_FEATURE_ESPIDF").is_ok() {
        embuild::espidf::sysenv::output();
    }
}
