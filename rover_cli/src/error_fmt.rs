//! Human-readable error descriptions and structured JSON error output.

use crate::cli::JSON_MODE;
use rover_core::error::{BuildError, ControlError};

/// Map an eyre::Report to a human-readable explanation with likely causes
/// and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    // Typed matches first
    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::MissingSensor => {
                "What happened: No range sensor was provided to the controller.\nLikely causes: The ADC front-end failed to initialize or was not wired into the builder.\nHow to fix: Ensure the analog front-end is created successfully and passed via with_sensor(...).".to_string()
            }
            BuildError::MissingDrive => {
                "What happened: No motor output was provided to the controller.\nLikely causes: The PWM driver failed to initialize or was not wired into the builder.\nHow to fix: Ensure the drive is created successfully and passed via with_drive(...).".to_string()
            }
            BuildError::MissingPanel => {
                "What happened: No status panel was provided to the controller.\nLikely causes: The display was not wired into the builder.\nHow to fix: Pass a panel via with_panel(...); the headless LogPanel works for rigs without a display.".to_string()
            }
            BuildError::MissingIndicator => {
                "What happened: No indicator was provided to the controller.\nLikely causes: The status LED was not wired into the builder.\nHow to fix: Pass an indicator via with_indicator(...); LogIndicator works for headless rigs.".to_string()
            }
            BuildError::InvalidConfig(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Missing or out-of-range values in the TOML.\nHow to fix: Edit the config file, then rerun."
            ),
        };
    }

    if let Some(ce) = err.downcast_ref::<ControlError>() {
        return match ce {
            ControlError::Hardware(s) | ControlError::HardwareFault(s) => format!(
                "What happened: A hardware collaborator failed ({s}).\nLikely causes: SPI/PWM wiring, power, or GPIO permissions.\nHow to fix: Check connections and rerun with --log-level=debug for detail."
            ),
            ControlError::Config(s) => format!(
                "What happened: Invalid configuration ({s}).\nLikely causes: Out-of-range values in the TOML.\nHow to fix: Edit the config file, then rerun."
            ),
            ControlError::State(s) => format!(
                "What happened: {s}.\nLikely causes: See logs.\nHow to fix: Re-run with --log-level=debug or set RUST_LOG for more detail."
            ),
        };
    }

    // Generic fallback with the root cause spelled out
    format!(
        "Something went wrong: {err}.\nCause: {root}\nHow to fix: Re-run with --log-level=debug for details.",
        root = err.root_cause()
    )
}

/// Print the error for the user; JSON object on stdout in `--json` mode,
/// humanized text on stderr otherwise.
pub fn emit(err: &eyre::Report) {
    let json = *JSON_MODE.get().unwrap_or(&false);
    if json {
        let obj = serde_json::json!({
            "ok": false,
            "error": err.to_string(),
            "cause": err.root_cause().to_string(),
            "detail": humanize(err),
        });
        println!("{obj}");
    } else {
        eprintln!("{}", humanize(err));
    }
}
