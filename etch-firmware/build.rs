//! Build script for etch-firmware
//!
//! - Sets up linker search paths and scripts for memory.x
//! - Parses and validates etch.toml, then bakes it into the binary as
//!   `CONFIG`

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use etch_core::config::{Config, ConfigError, NackPolicy};

fn main() {
    setup_linker();
    let config = load_config();
    generate_config(&config);
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
    if env::var_os("CARGO_FEATURE_DEFMT").is_some() {
        println!("cargo:rustc-link-arg-bins=-Tdefmt.x");
    }

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Read and validate etch.toml
fn load_config() -> Config {
    println!("cargo:rerun-if-changed=etch.toml");

    let config_path = Path::new("etch.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: etch.toml not found!                                     ║\n\
            ║                                                                  ║\n\
            ║  The firmware requires an etch.toml configuration file.          ║\n\
            ║  Please create one in the etch-firmware directory.               ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read etch.toml                                 ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    // Unknown keys and wrong types are reported by serde
    let config: Config = match toml::from_str(&config_content) {
        Ok(config) => config,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid etch.toml                                        ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&e.to_string())
            );
        }
    };

    if let Err(e) = config.validate() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid value in etch.toml                               ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            ║  • {:<62} ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            describe(e)
        );
    }

    println!(
        "cargo:warning=etch.toml validated successfully (I2C divisor {})",
        config.bus.clock_divisor().unwrap_or_default()
    );
    config
}

/// Human-readable reason for a rejected config
fn describe(error: ConfigError) -> &'static str {
    match error {
        ConfigError::ZeroSpeed => "[bus] speed_khz must be greater than 0",
        ConfigError::DivisorOutOfRange => {
            "[bus] speed_khz and core_clock_hz give a divisor outside 0-65535"
        }
        ConfigError::ZeroPollLimit => "[bus] poll_limit must be greater than 0",
        ConfigError::DeadzoneOutOfRange => "[cursor] midpoint ± deadzone must stay within 0-255",
        ConfigError::StartOutsideScreen => "[cursor] start_col/start_row must be within width/height",
        ConfigError::ZeroSamplePeriod => "sample_period_ms must be greater than 0",
    }
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.chars().count() > 64 {
                format!("{}...", line.chars().take(61).collect::<String>())
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Write `config.rs` into OUT_DIR for `include!` from main.rs
fn generate_config(config: &Config) {
    let nack_policy = match config.bus.nack_policy {
        NackPolicy::Continue => "Continue",
        NackPolicy::Abort => "Abort",
    };
    let source = format!(
        "/// Configuration from etch.toml\n\
         pub const CONFIG: etch_core::config::Config = etch_core::config::Config {{\n    \
             bus: etch_core::config::BusConfig {{\n        \
                 speed_khz: {speed_khz},\n        \
                 core_clock_hz: {core_clock_hz},\n        \
                 poll_limit: {poll_limit},\n        \
                 nack_policy: etch_core::config::NackPolicy::{nack_policy},\n    \
             }},\n    \
             cursor: etch_core::config::CursorConfig {{\n        \
                 midpoint: {midpoint},\n        \
                 deadzone: {deadzone},\n        \
                 width: {width},\n        \
                 height: {height},\n        \
                 start_col: {start_col},\n        \
                 start_row: {start_row},\n    \
             }},\n    \
             sample_period_ms: {sample_period_ms},\n\
         }};\n",
        speed_khz = config.bus.speed_khz,
        core_clock_hz = config.bus.core_clock_hz,
        poll_limit = config.bus.poll_limit,
        midpoint = config.cursor.midpoint,
        deadzone = config.cursor.deadzone,
        width = config.cursor.width,
        height = config.cursor.height,
        start_col = config.cursor.start_col,
        start_row = config.cursor.start_row,
        sample_period_ms = config.sample_period_ms,
    );

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    fs::write(out_dir.join("config.rs"), source).unwrap();
}
