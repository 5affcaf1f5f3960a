use std::env;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // Host builds only run the portable logic and its tests
    let target = env::var("TARGET").unwrap_or_default();
    if !target.contains("avr") {
        return;
    }

    // Configure for the SES board (ATmega128RFA1)
    println!("cargo:rustc-link-arg=-mmcu=atmega128rfa1");

    // Pass CPU frequency for timing calculations
    println!("cargo:rustc-env=MCU_FREQ_HZ=16000000");
}
