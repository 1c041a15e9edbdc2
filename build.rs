fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // Host test builds (`--no-default-features`) have no ESP-IDF toolchain.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
