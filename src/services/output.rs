use crate::domain::models::{ErrorBody, JsonErr, JsonOut};
use crate::services::inventory::InventoryError;
use crate::services::policy::PolicyError;
use crate::services::tailscale::CredentialsError;
use serde::Serialize;

pub fn print_one<T: Serialize>(
    json: bool,
    data: T,
    row: impl Fn(&T) -> String,
) -> anyhow::Result<()> {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&JsonOut { ok: true, data })?
        );
    } else {
        println!("{}", row(&data));
    }
    Ok(())
}

/// Text-mode progress line; silent under `--json` so stdout stays parseable.
pub fn progress(json: bool, message: &str) {
    if !json {
        println!("{}", message);
    }
}

/// Stable machine code for the first classified error in the chain.
pub fn error_code(err: &anyhow::Error) -> &'static str {
    err.chain()
        .find_map(|cause| {
            if let Some(e) = cause.downcast_ref::<CredentialsError>() {
                Some(e.code())
            } else if let Some(e) = cause.downcast_ref::<InventoryError>() {
                Some(e.code())
            } else {
                cause.downcast_ref::<PolicyError>().map(PolicyError::code)
            }
        })
        .unwrap_or("INTERNAL")
}

pub fn print_error(json: bool, err: &anyhow::Error) {
    if json {
        let out = JsonErr {
            ok: false,
            error: ErrorBody {
                code: error_code(err).to_string(),
                message: format!("{err:#}"),
            },
        };
        match serde_json::to_string_pretty(&out) {
            Ok(text) => println!("{}", text),
            Err(_) => eprintln!("{err:#}"),
        }
    } else {
        eprintln!("{err:#}");
    }
}
