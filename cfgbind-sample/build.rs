fn main() {
    cfgbind_build::generate_config()
        .scan_path("src/")
        .run()
        .expect("Failed to generate configuration bindings");
}
