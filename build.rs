fn main() {
    // Stamped into BUILD_DATE; the daemon logs it at connect so bridge logs
    // identify the build that served a print.
    let build_date = chrono::Utc::now()
        .format("%Y-%m-%d %H:%M:%S UTC")
        .to_string();
    println!("cargo:rustc-env=BUILD_DATE={}", build_date);
}
