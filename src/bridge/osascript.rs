//! `WindowBridge` implementation that shells the System Events primitives out
//! to `osascript`. Each call spawns one short-lived interpreter process; the
//! async boundary is the process I/O, nothing here blocks the runtime.

use async_trait::async_trait;
use log::{info, warn};
use tokio::process::Command;

use super::{
    app_id_for_process, candidate_processes, first_matching_window, CandidateWindow,
    FocusTarget, FrontmostWindow, WindowBridge,
};
use crate::error::FocusError;

/// Sentinel the list-windows script returns when the process is not running,
/// distinguishing "not running" from "running with zero windows".
const NOT_RUNNING_MARKER: &str = "#not-running";

#[derive(Debug, Default, Clone)]
pub struct OsaScriptBridge;

impl OsaScriptBridge {
    pub fn new() -> Self {
        Self
    }

    /// Window titles of a named process in System Events enumeration order,
    /// or `None` when the process is not running.
    async fn window_titles(&self, process_name: &str) -> Result<Option<Vec<String>>, FocusError> {
        let script = format!(
            "tell application \"System Events\"\n\
             \tif not (exists process \"{name}\") then return \"{marker}\"\n\
             \tset AppleScript's text item delimiters to linefeed\n\
             \treturn (name of windows of process \"{name}\") as text\n\
             end tell",
            name = applescript_quote(process_name),
            marker = NOT_RUNNING_MARKER,
        );
        let output = run_osascript(&script).await?;
        if output == NOT_RUNNING_MARKER {
            return Ok(None);
        }
        Ok(Some(
            output
                .lines()
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect(),
        ))
    }

    /// Raises one window of a named process by its exact title.
    async fn raise_window(&self, process_name: &str, title: &str) -> Result<(), FocusError> {
        let script = format!(
            "tell application \"System Events\"\n\
             \ttell process \"{name}\"\n\
             \t\tset frontmost to true\n\
             \t\tperform action \"AXRaise\" of (first window whose name is \"{title}\")\n\
             \tend tell\n\
             end tell",
            name = applescript_quote(process_name),
            title = applescript_quote(title),
        );
        run_osascript(&script).await.map(|_| ())
    }
}

#[async_trait]
impl WindowBridge for OsaScriptBridge {
    fn supports_automation(&self) -> bool {
        cfg!(target_os = "macos")
    }

    async fn frontmost_window(&self) -> Result<Option<FrontmostWindow>, FocusError> {
        if !self.supports_automation() {
            return Ok(None);
        }

        let script = "tell application \"System Events\"\n\
                      \tset frontProc to first application process whose frontmost is true\n\
                      \tif (count of windows of frontProc) is 0 then\n\
                      \t\treturn name of frontProc\n\
                      \tend if\n\
                      \treturn (name of frontProc) & linefeed & (name of front window of frontProc)\n\
                      end tell";
        let raw = match run_osascript(script).await {
            Ok(raw) => raw,
            Err(err) => {
                // Best-effort: a failed frontmost probe must not break focus
                // tracking, only skip this notification.
                warn!("frontmost-window query failed: {err}");
                return Ok(None);
            }
        };

        Ok(parse_frontmost_output(&raw))
    }

    async fn focus_window(&self, target: &FocusTarget) -> Result<(), FocusError> {
        if !self.supports_automation() {
            return Err(FocusError::PlatformUnsupported);
        }
        if target.title.is_none() && target.workspace_hint.is_none() {
            return Err(FocusError::NoMatchingWindow);
        }

        let mut saw_running_process = false;
        for (app_id, process_name) in candidate_processes(target.preferred_app_id.as_deref()) {
            let Some(titles) = self.window_titles(process_name).await? else {
                continue;
            };
            saw_running_process = true;

            let candidates: Vec<CandidateWindow> = titles
                .into_iter()
                .map(|title| CandidateWindow {
                    app_id: app_id.to_string(),
                    process_name: process_name.to_string(),
                    title,
                })
                .collect();

            if let Some(window) = first_matching_window(&candidates, target) {
                self.raise_window(process_name, &window.title).await?;
                info!("raised window '{}' of {}", window.title, window.app_id);
                return Ok(());
            }
        }

        if saw_running_process {
            Err(FocusError::NoMatchingWindow)
        } else {
            Err(FocusError::NoSupportedApplicationRunning)
        }
    }
}

/// First line is the frontmost process name, the remainder its front window
/// title. Unsupported process or missing title maps to `None`.
fn parse_frontmost_output(raw: &str) -> Option<FrontmostWindow> {
    let mut lines = raw.splitn(2, '\n');
    let process_name = lines.next().unwrap_or("").trim();
    let title = lines.next().unwrap_or("").trim();

    let app_id = app_id_for_process(process_name)?;
    if title.is_empty() {
        return None;
    }
    Some(FrontmostWindow {
        app_id: app_id.to_string(),
        title: title.to_string(),
    })
}

fn applescript_quote(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

async fn run_osascript(script: &str) -> Result<String, FocusError> {
    let output = Command::new("osascript")
        .arg("-e")
        .arg(script)
        .output()
        .await
        .map_err(|err| FocusError::Automation(format!("failed to run osascript: {err}")))?;

    if output.status.success() {
        Ok(String::from_utf8_lossy(&output.stdout)
            .trim_end_matches(['\r', '\n'])
            .to_string())
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        Err(classify_osascript_failure(stderr))
    }
}

/// System Events reports denied automation as error -1743 ("Not authorized to
/// send Apple events") or an assistive-access complaint. Everything else is a
/// plain automation failure carrying its raw diagnostic text.
fn classify_osascript_failure(stderr: String) -> FocusError {
    let lowered = stderr.to_lowercase();
    if stderr.contains("-1743")
        || lowered.contains("assistive access")
        || lowered.contains("not authorized")
        || lowered.contains("not authorised")
    {
        FocusError::PermissionDenied(stderr)
    } else {
        FocusError::Automation(stderr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_process_and_title() {
        let parsed = parse_frontmost_output("Code\nmain.rs — myrepo").unwrap();
        assert_eq!(parsed.app_id, "vscode");
        assert_eq!(parsed.title, "main.rs — myrepo");
    }

    #[test]
    fn unsupported_process_is_none() {
        assert!(parse_frontmost_output("Finder\nDownloads").is_none());
    }

    #[test]
    fn missing_title_is_none() {
        assert!(parse_frontmost_output("Code").is_none());
        assert!(parse_frontmost_output("Code\n").is_none());
    }

    #[test]
    fn quotes_are_escaped_for_applescript() {
        assert_eq!(applescript_quote(r#"a "b" \c"#), r#"a \"b\" \\c"#);
    }

    #[test]
    fn permission_errors_are_classified() {
        let err = classify_osascript_failure(
            "execution error: Not authorized to send Apple events to System Events. (-1743)"
                .to_string(),
        );
        assert!(matches!(err, FocusError::PermissionDenied(_)));

        let err = classify_osascript_failure("syntax error: whatever (-2741)".to_string());
        assert!(matches!(err, FocusError::Automation(_)));
    }
}
