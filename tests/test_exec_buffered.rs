//! Integration tests for the buffered command runner against real processes.

#![cfg(unix)]

use execkit::{
    CancellationToken, CommandSource, CommandSpec, ExecConfig, ExecError, Executor, ShellDialect,
    SpawnOptions,
};

fn sh_executor() -> Executor {
    Executor::new(ExecConfig::new().dialect(ShellDialect::Sh))
}

#[tokio::test]
async fn test_echo_multiword_argument_parses_back() {
    // The multi-word argument survives quoting and comes back verbatim.
    let cmd = CommandSpec::new("echo")
        .arg("hello world")
        .parsed(|text, _strict| Ok(text.trim().to_string()));
    let value = sh_executor().runner().run_parsed(cmd).await.unwrap();
    assert_eq!(value, "hello world");
}

#[tokio::test]
async fn test_void_command_resolves_to_unit() {
    sh_executor()
        .runner()
        .run(CommandSpec::new("true"))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_false_rejects_with_execution_failure() {
    let err = sh_executor()
        .runner()
        .run(CommandSpec::new("false"))
        .await
        .unwrap_err();
    match err {
        ExecError::NonZeroExit { program, code, .. } => {
            assert_eq!(program, "false");
            assert_eq!(code, Some(1));
        }
        other => panic!("Expected NonZeroExit, got {other:?}"),
    }
}

#[tokio::test]
async fn test_exit_code_propagates() {
    let err = sh_executor()
        .runner()
        .run(CommandSpec::new("exit").arg("42"))
        .await
        .unwrap_err();
    match err {
        ExecError::NonZeroExit { code, .. } => assert_eq!(code, Some(42)),
        other => panic!("Expected NonZeroExit, got {other:?}"),
    }
}

#[tokio::test]
async fn test_quoting_round_trips_through_a_real_shell() {
    // printf emits each argument on its own line; getting the originals back
    // proves every argument was quoted exactly once and decoded by the shell
    // to the raw argument list.
    let args = ["plain", "two words", "$(whoami)", "it's", "a\tb"];
    let cmd = CommandSpec::new("printf")
        .arg("%s\\n")
        .args(args)
        .parsed(|text, _strict| {
            Ok(text.lines().map(str::to_string).collect::<Vec<_>>())
        });
    let lines = sh_executor().runner().run_parsed(cmd).await.unwrap();
    assert_eq!(lines, args);
}

#[tokio::test]
async fn test_spawn_options_cwd_and_env() {
    let dir = tempfile::tempdir().unwrap();
    let config = ExecConfig::new().dialect(ShellDialect::Sh).spawn(
        SpawnOptions::new()
            .cwd(dir.path())
            .env("EXECKIT_INTEGRATION", "set"),
    );
    let cmd = CommandSpec::new("sh")
        .args(["-c", "printf '%s %s' \"$PWD\" \"$EXECKIT_INTEGRATION\""])
        .parsed(|text, _strict| Ok(text.to_string()));
    let output = Executor::new(config).runner().run_parsed(cmd).await.unwrap();

    let (pwd, var) = output.rsplit_once(' ').unwrap();
    assert_eq!(var, "set");
    assert_eq!(
        std::path::Path::new(pwd).canonicalize().unwrap(),
        dir.path().canonicalize().unwrap()
    );
}

#[tokio::test]
async fn test_pre_cancelled_token_rejects_without_running() {
    let token = CancellationToken::new();
    token.cancel();
    let executor = Executor::new(
        ExecConfig::new()
            .dialect(ShellDialect::Sh)
            .cancel(token),
    );
    let err = executor
        .runner()
        .run(CommandSpec::new("true"))
        .await
        .unwrap_err();
    assert!(err.is_cancelled());
}

#[tokio::test]
async fn test_deferred_description_runs() {
    let source = CommandSource::deferred(async {
        CommandSpec::new("echo")
            .arg("deferred")
            .parsed(|text, _strict| Ok(text.trim().to_string()))
    });
    let value = sh_executor().runner().run_parsed(source).await.unwrap();
    assert_eq!(value, "deferred");
}

#[tokio::test]
async fn test_parse_failure_reaches_caller_with_source() {
    let cmd = CommandSpec::new("echo")
        .arg("not-a-number")
        .parsed(|text, _strict| Ok(text.trim().parse::<i64>()?));
    let err = sh_executor().runner().run_parsed(cmd).await.unwrap_err();
    assert!(matches!(err, ExecError::Parse(_)));
}
