//! Doctor command - verify system requirements and configuration.

use crate::cli::Output;
use crate::config::{Settings, TranscriptionProvider};
use console::style;
use std::process::Command;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

/// Run all diagnostic checks.
pub fn run_doctor(settings: &Settings) -> anyhow::Result<()> {
    Output::header("Quizly Doctor");
    println!();
    println!("Checking system requirements and configuration...\n");

    let mut checks = Vec::new();

    println!("{}", style("External Tools").bold());
    let mut tool_checks = vec![
        check_tool(
            "yt-dlp",
            &settings.acquisition.ytdlp_binary,
            "--version",
            install_hint_ytdlp(),
        ),
        check_tool("ffmpeg", "ffmpeg", "-version", install_hint_ffmpeg()),
    ];
    if settings.transcription.provider == TranscriptionProvider::WhisperApi {
        tool_checks.push(check_tool("ffprobe", "ffprobe", "-version", install_hint_ffmpeg()));
    }
    for check in &tool_checks {
        check.print();
    }
    checks.extend(tool_checks);

    println!();

    println!("{}", style("Backends").bold());
    let mut backend_checks = Vec::new();
    match settings.transcription.provider {
        TranscriptionProvider::WhisperApi => {
            backend_checks.push(check_api_key(
                "Transcription key",
                &settings.transcription.api_key_env,
            ));
        }
        TranscriptionProvider::Local => {
            backend_checks.push(check_local_model(settings));
        }
    }
    backend_checks.push(check_api_key("Synthesis key", &settings.synthesis.api_key_env));
    for check in &backend_checks {
        check.print();
    }
    checks.extend(backend_checks);

    println!();

    println!("{}", style("Directories").bold());
    let dir_check = check_temp_dir(settings);
    dir_check.print();
    checks.push(dir_check);

    println!();

    println!("{}", style("Configuration").bold());
    let config_checks = vec![check_config_file(), check_settings(settings)];
    for check in &config_checks {
        check.print();
    }
    checks.extend(config_checks);

    println!();

    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Please fix them before generating quizzes.",
            errors
        ));
        std::process::exit(1);
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed! Quizly is ready to use.");
    }

    Ok(())
}

/// Check if an external tool is available.
fn check_tool(name: &str, binary: &str, version_arg: &str, hint: &str) -> CheckResult {
    match Command::new(binary).arg(version_arg).output() {
        Ok(output) if output.status.success() => {
            let version = String::from_utf8_lossy(&output.stdout)
                .lines()
                .next()
                .unwrap_or("installed")
                .trim()
                .to_string();

            let version_display: String = if version.chars().count() > 50 {
                format!("{}...", version.chars().take(50).collect::<String>())
            } else {
                version
            };

            CheckResult::ok(name, &version_display)
        }
        Ok(_) => CheckResult::error(name, "installed but not working", hint),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            CheckResult::error(name, "not found", hint)
        }
        Err(e) => CheckResult::error(name, &format!("error: {}", e), hint),
    }
}

/// Check that the environment variable `env` holds an API key.
fn check_api_key(label: &str, env: &str) -> CheckResult {
    let name = format!("{} ({})", label, env);
    let hint = format!("Set with: export {}='...'", env);
    match std::env::var(env) {
        Ok(key) if key.trim().is_empty() => CheckResult::error(&name, "empty", &hint),
        Ok(key) => CheckResult::ok(&name, &format!("configured ({})", mask_key(&key))),
        Err(_) => CheckResult::error(&name, "not set", &hint),
    }
}

fn check_local_model(settings: &Settings) -> CheckResult {
    let path = settings.local_model_path();
    if !cfg!(feature = "local-whisper") {
        CheckResult::error(
            "Whisper model",
            "local transcription is not compiled in",
            "Rebuild with: cargo install quizly --features local-whisper",
        )
    } else if path.is_file() {
        CheckResult::ok("Whisper model", &path.display().to_string())
    } else {
        CheckResult::error(
            "Whisper model",
            &format!("{} not found", path.display()),
            "Download a ggml model or set transcription.model_path",
        )
    }
}

fn check_temp_dir(settings: &Settings) -> CheckResult {
    let temp_dir = settings.temp_dir();
    if temp_dir.exists() {
        CheckResult::ok("Scratch directory", &temp_dir.display().to_string())
    } else {
        CheckResult::warning(
            "Scratch directory",
            &format!("{} (will be created)", temp_dir.display()),
            "Directory will be created on first use",
        )
    }
}

/// Check if config file exists.
fn check_config_file() -> CheckResult {
    let config_path = Settings::default_config_path();
    if config_path.exists() {
        CheckResult::ok("Config file", &config_path.display().to_string())
    } else {
        CheckResult::warning(
            "Config file",
            "using defaults",
            "Create with: quizly config edit",
        )
    }
}

fn check_settings(settings: &Settings) -> CheckResult {
    match settings.validate() {
        Ok(()) => CheckResult::ok(
            "Quiz policy",
            &format!(
                "{} questions, transcript limit {} chars ({:?})",
                settings.quiz.question_count,
                settings.synthesis.max_transcript_chars,
                settings.synthesis.overflow
            ),
        ),
        Err(e) => CheckResult::error("Quiz policy", &e.to_string(), "Fix the value in the config file"),
    }
}

/// Show only the first and last few characters of a secret.
fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 12 {
        return "****".to_string();
    }
    let head: String = chars[..7].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

/// Platform-specific install hint for yt-dlp.
fn install_hint_ytdlp() -> &'static str {
    if cfg!(target_os = "macos") {
        "Install with: brew install yt-dlp"
    } else if cfg!(target_os = "linux") {
        "Install with: pip install yt-dlp (or your package manager)"
    } else {
        "Install from: https://github.com/yt-dlp/yt-dlp"
    }
}

/// Platform-specific install hint for ffmpeg.
fn install_hint_ffmpeg() -> &'static str {
    if cfg!(target_os = "macos") {
        "Install with: brew install ffmpeg"
    } else if cfg!(target_os = "linux") {
        "Install with: sudo apt install ffmpeg (or your package manager)"
    } else {
        "Install from: https://ffmpeg.org/download.html"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_result_error() {
        let result = CheckResult::error("test", "failed", "fix it");
        assert_eq!(result.status, CheckStatus::Error);
        assert_eq!(result.hint, Some("fix it".to_string()));
    }

    #[test]
    fn test_mask_key() {
        assert_eq!(mask_key("short"), "****");
        assert_eq!(mask_key("sk-proj-abcdefghijklmnop1234"), "sk-proj...1234");
    }

    #[test]
    fn test_missing_tool_is_error() {
        let result = check_tool("yt-dlp", "quizly-no-such-tool", "--version", "install it");
        assert_eq!(result.status, CheckStatus::Error);
        assert_eq!(result.message, "not found");
    }

    #[test]
    fn test_invalid_settings_are_reported() {
        let mut settings = Settings::default();
        settings.quiz.question_count = 0;
        assert_eq!(check_settings(&settings).status, CheckStatus::Error);
        assert_eq!(check_settings(&Settings::default()).status, CheckStatus::Ok);
    }
}
