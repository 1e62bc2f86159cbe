use std::process::Command;

#[test]
fn invalid_config_is_reported_on_stderr() {
    let output = Command::new(env!("CARGO_BIN_EXE_todo_app"))
        .env_clear()
        .env("APP_AUTH__ACCESS_TTL_SECS", "0")
        .env("APP_AUTH__MFA__CODE_LENGTH", "2")
        .output()
        .expect("run server binary");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to load config"), "stderr: {stderr}");
    assert!(stderr.contains("auth.access_ttl_secs must be > 0"), "stderr: {stderr}");
    assert!(
        stderr.contains("auth.mfa.code_length must be between 4 and 10"),
        "stderr: {stderr}"
    );
}
