use super::*;
use serial_test::serial;

#[test]
#[serial]
fn local_active_user_probe_reads_user_env_var() {
    std::env::set_var("USER", "alice");
    std::env::remove_var("USERNAME");
    assert_eq!(
        LocalActiveUserProbe.current_user(),
        Some("alice".to_string())
    );
    std::env::remove_var("USER");
}

#[test]
#[serial]
fn local_active_user_probe_falls_back_to_username_env_var() {
    std::env::remove_var("USER");
    std::env::set_var("USERNAME", "bob");
    assert_eq!(
        LocalActiveUserProbe.current_user(),
        Some("bob".to_string())
    );
    std::env::remove_var("USERNAME");
}

#[test]
#[serial]
fn local_active_user_probe_none_when_neither_var_set() {
    std::env::remove_var("USER");
    std::env::remove_var("USERNAME");
    assert_eq!(LocalActiveUserProbe.current_user(), None);
}

#[test]
fn null_foreground_window_probe_reports_nothing() {
    assert_eq!(NullForegroundWindowProbe.current(), None);
}

#[test]
fn null_screen_capture_always_errs() {
    let rect = Rect {
        x: 0,
        y: 0,
        w: 10,
        h: 10,
    };
    assert!(NullScreenCapture.capture(rect).is_err());
}

#[test]
fn null_process_launcher_always_errs() {
    let result = NullProcessLauncher
        .launch_as_interactive_user(std::path::Path::new("/bin/true"), &[]);
    assert!(result.is_err());
}
