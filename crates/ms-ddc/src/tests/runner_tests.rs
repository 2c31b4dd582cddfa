use super::*;

fn args(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[cfg(unix)]
#[test]
fn captures_stdout() {
    let out = SystemRunner
        .output("sh", &args(&["-c", "echo hello"]), Duration::from_secs(5))
        .unwrap();
    assert_eq!(out.trim(), "hello");
}

#[cfg(unix)]
#[test]
fn non_zero_exit_carries_stderr() {
    let err = SystemRunner
        .output(
            "sh",
            &args(&["-c", "echo broken >&2; exit 3"]),
            Duration::from_secs(5),
        )
        .unwrap_err();
    match err {
        DdcError::CommandFailed { status, stderr, .. } => {
            assert_eq!(status, Some(3));
            assert_eq!(stderr, "broken");
        }
        other => panic!("expected CommandFailed, got {:?}", other),
    }
}

#[cfg(unix)]
#[test]
fn hung_helper_is_killed_at_deadline() {
    let start = Instant::now();
    let err = SystemRunner
        .output("sh", &args(&["-c", "sleep 10"]), Duration::from_millis(200))
        .unwrap_err();
    assert!(matches!(err, DdcError::Timeout { .. }));
    assert!(start.elapsed() < Duration::from_secs(5));
}

#[test]
fn missing_binary_is_a_spawn_error() {
    let err = SystemRunner
        .output(
            "monitorswitch-no-such-helper",
            &[],
            Duration::from_secs(1),
        )
        .unwrap_err();
    assert!(matches!(err, DdcError::Spawn { .. }));
}

#[cfg(unix)]
#[test]
fn inherited_pipe_does_not_outlive_deadline() {
    let start = Instant::now();
    let err = SystemRunner
        .output(
            "sh",
            &args(&["-c", "sleep 10 & echo started"]),
            Duration::from_millis(300),
        )
        .unwrap_err();
    assert!(matches!(err, DdcError::Timeout { .. }));
    assert!(start.elapsed() < Duration::from_secs(5));
}

#[test]
fn lookup_misses_unknown_programs() {
    assert!(SystemRunner.lookup("monitorswitch-no-such-helper").is_none());
}

#[cfg(unix)]
#[test]
fn lookup_finds_shell() {
    let path = SystemRunner.lookup("sh").expect("sh should be on PATH");
    assert!(path.ends_with("sh"));
}

#[cfg(unix)]
#[test]
fn lookup_requires_execute_bit() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let plain = dir.path().join("plain");
    std::fs::write(&plain, "#!/bin/sh\n").unwrap();
    std::fs::set_permissions(&plain, std::fs::Permissions::from_mode(0o644)).unwrap();
    assert!(SystemRunner.lookup(plain.to_str().unwrap()).is_none());

    std::fs::set_permissions(&plain, std::fs::Permissions::from_mode(0o755)).unwrap();
    assert!(SystemRunner.lookup(plain.to_str().unwrap()).is_some());
}
