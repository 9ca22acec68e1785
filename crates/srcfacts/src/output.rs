//! Command results on stdout, failures on stderr
//!
//! Under `--json` every command prints one envelope, `{"ok": true, "data": ...}`
//! or `{"ok": false, "error": ...}`. Otherwise commands print text lines that
//! `--quiet` suppresses.

use serde::Serialize;

use libsrcfacts_core::SrcFactsError;

use crate::cli::Cli;

#[derive(Serialize)]
struct Envelope<'a, T: Serialize> {
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<&'a T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<Failure>,
}

#[derive(Serialize)]
struct Failure {
    code: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    suggestions: Vec<&'static str>,
}

/// Print a command result: the envelope under `--json`, else the lines `render` produces.
pub fn report<T, F>(cli: &Cli, data: &T, render: F) -> Result<(), SrcFactsError>
where
    T: Serialize,
    F: FnOnce(&T) -> Vec<String>,
{
    if cli.json {
        let envelope = Envelope {
            ok: true,
            data: Some(data),
            error: None,
        };
        println!("{}", serde_json::to_string_pretty(&envelope)?);
    } else if !cli.quiet {
        for line in render(data) {
            println!("{}", line);
        }
    }
    Ok(())
}

/// Print a failed command to stderr
pub fn report_error(cli: &Cli, err: &SrcFactsError) {
    let failure = Failure {
        code: err.error_code(),
        message: err.to_string(),
        suggestions: err.suggestions(),
    };

    if cli.json {
        let envelope: Envelope<'_, ()> = Envelope {
            ok: false,
            data: None,
            error: Some(failure),
        };
        match serde_json::to_string_pretty(&envelope) {
            Ok(json) => eprintln!("{}", json),
            Err(_) => eprintln!("error: {}", err),
        }
        return;
    }

    eprintln!("error: {}", failure.message);
    if !failure.suggestions.is_empty() {
        eprintln!();
        for suggestion in &failure.suggestions {
            eprintln!("  hint: {}", suggestion);
        }
    }
}
