use std::process::Stdio;

use tokio::process::Command;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictorRun {
    pub success: bool,
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

/// Runs the external predictor to completion and captures its output. Output
/// is decoded lossily since predictors print whatever their locale gives them.
pub async fn run_predictor(program: &str, args: &[String]) -> std::io::Result<PredictorRun> {
    debug!(program, ?args, "spawning predictor");
    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .kill_on_drop(true)
        .output()
        .await?;

    Ok(PredictorRun {
        success: output.status.success(),
        exit_code: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str) -> Vec<String> {
        vec!["-c".to_string(), script.to_string()]
    }

    #[tokio::test]
    async fn captures_stdout_of_successful_run() {
        let run = run_predictor("sh", &sh("echo predicted")).await.expect("run");
        assert!(run.success);
        assert_eq!(run.exit_code, Some(0));
        assert_eq!(run.stdout, "predicted\n");
    }

    #[tokio::test]
    async fn failing_run_keeps_stderr_and_exit_code() {
        let run = run_predictor("sh", &sh("echo 'model missing' >&2; exit 3"))
            .await
            .expect("run");
        assert!(!run.success);
        assert_eq!(run.exit_code, Some(3));
        assert_eq!(run.stderr, "model missing\n");
    }

    #[tokio::test]
    async fn invalid_utf8_is_replaced_not_rejected() {
        let run = run_predictor("sh", &sh("printf 'ok\\377'")).await.expect("run");
        assert!(run.stdout.starts_with("ok"));
        assert!(run.stdout.contains('\u{FFFD}'));
    }

    #[tokio::test]
    async fn missing_program_is_a_spawn_error() {
        let err = run_predictor("definitely-not-a-predictor-binary", &[])
            .await
            .expect_err("spawn should fail");
        assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
    }
}
