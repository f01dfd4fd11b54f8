//! Integration tests for buildinfo
//!
//! A shell script stands in for the build binary so the real process path
//! (spawn, pipe reads, exit status) is exercised end to end.

#![cfg(unix)]

mod process_tests {
    use buildinfo::{
        BuildContext, BuildSystemName, CacheState, ConfigManager, InfoError, InfoInvoker,
        InfoOnlyInvoker, InvocationError, UiContext, WaitError, WorkerPool,
    };
    use futures_util::future::join_all;
    use std::os::unix::fs::PermissionsExt;
    use std::path::{Path, PathBuf};
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::TempDir;

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::new("buildinfo=debug"))
            .with_test_writer()
            .try_init();
    }

    /// Write an executable script that appends to `calls` and runs `body`
    fn fake_binary(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("fake-bazel");
        let calls = dir.join("calls");
        let script = format!(
            "#!/bin/sh\necho \"$@\" >> '{}'\n{}\n",
            calls.display(),
            body
        );
        std::fs::write(&path, script).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    fn recorded_calls(dir: &Path) -> Vec<String> {
        std::fs::read_to_string(dir.join("calls"))
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    fn context() -> Arc<BuildContext> {
        Arc::new(BuildContext::new(UiContext::non_interactive()).with_progress(false))
    }

    fn invoker(binary: &Path, context: Arc<BuildContext>) -> InfoOnlyInvoker {
        InfoOnlyInvoker::new(
            binary.to_string_lossy(),
            BuildSystemName::Bazel,
            context,
            WorkerPool::current(),
        )
    }

    #[tokio::test]
    async fn parses_real_process_output() {
        init_tracing();
        let temp = TempDir::new().unwrap();
        let binary = fake_binary(
            temp.path(),
            "echo 'Starting local Bazel server and connecting to it...'\n\
             echo 'bazel-bin: /out/bin'\n\
             echo 'execution_root: /out/execroot/_main'\n\
             echo 'release: release 7.1.0'",
        );

        let invoker = invoker(&binary, context());
        let info = invoker.build_info().await.unwrap();

        assert_eq!(info.len(), 3);
        assert_eq!(info.bin_directory(), Some(Path::new("/out/bin")));
        assert_eq!(info.execution_root(), Some(Path::new("/out/execroot/_main")));
        assert_eq!(info.release(), Some("release 7.1.0"));
        assert_eq!(recorded_calls(temp.path()), vec!["info"]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_callers_spawn_one_process() {
        init_tracing();
        let temp = TempDir::new().unwrap();
        let binary = fake_binary(temp.path(), "sleep 0.2\necho 'output_base: /o'");
        let invoker = Arc::new(invoker(&binary, context()));

        let tasks = (0..8).map(|_| {
            let invoker = Arc::clone(&invoker);
            tokio::spawn(async move { invoker.build_info().await })
        });
        let results = join_all(tasks).await;

        for result in results {
            let info = result.unwrap().unwrap();
            assert_eq!(info.output_base(), Some(Path::new("/o")));
        }
        assert_eq!(recorded_calls(temp.path()).len(), 1);
        assert_eq!(invoker.cache_state(), CacheState::Ready);
    }

    #[tokio::test]
    async fn non_zero_exit_is_a_cached_sync_failure() {
        init_tracing();
        let temp = TempDir::new().unwrap();
        let binary = fake_binary(
            temp.path(),
            "echo 'ERROR: The info command is only supported from within a workspace' >&2\nexit 2",
        );
        let invoker = invoker(&binary, context());

        let err = invoker.build_info().await.unwrap_err();
        assert_eq!(
            err.to_string(),
            format!("Failed to run `{} info`", binary.display())
        );
        match err.wait_cause() {
            Some(WaitError::Invocation(InvocationError::Exit { code, stderr, .. })) => {
                assert_eq!(*code, 2);
                assert!(stderr.contains("only supported from within a workspace"));
            }
            other => panic!("unexpected cause: {other:?}"),
        }

        invoker.build_info().await.unwrap_err();
        assert_eq!(recorded_calls(temp.path()).len(), 1);
        assert_eq!(invoker.cache_state(), CacheState::Failed);
    }

    #[tokio::test]
    async fn missing_binary_is_a_sync_failure_with_hint() {
        let temp = TempDir::new().unwrap();
        let invoker = invoker(&temp.path().join("no-such-bazel"), context());

        let err = invoker.build_info().await.unwrap_err();
        assert!(matches!(err, InfoError::SyncFailed { .. }));
        assert!(err.hint().is_some());
    }

    #[tokio::test]
    async fn slow_binary_times_out() {
        init_tracing();
        let temp = TempDir::new().unwrap();
        let binary = fake_binary(temp.path(), "sleep 30\necho 'release: late'");
        let ctx = Arc::new(
            BuildContext::new(UiContext::non_interactive())
                .with_progress(false)
                .with_timeout(Duration::from_millis(200)),
        );
        let invoker = invoker(&binary, Arc::clone(&ctx));

        let err = invoker.build_info().await.unwrap_err();
        assert!(matches!(err.wait_cause(), Some(WaitError::TimedOut(_))));
        assert_eq!(invoker.cache_state(), CacheState::Failed);
        assert!(!ctx.timings()[0].success);
    }

    #[tokio::test]
    async fn config_flags_reach_the_binary() {
        let temp = TempDir::new().unwrap();
        let binary = fake_binary(temp.path(), "echo 'release: 7'");
        let config_path = temp.path().join("config.toml");
        std::fs::write(
            &config_path,
            format!(
                "binary_path = '{}'\nstartup_flags = [\"--nohome_rc\"]\ninfo_flags = [\"--tool_tag=ide\"]\nshow_progress = false\n",
                binary.display()
            ),
        )
        .unwrap();

        let config = ConfigManager::with_path(config_path).load().await.unwrap();
        let ctx = Arc::new(BuildContext::from_config(UiContext::non_interactive(), &config));
        let invoker = InfoOnlyInvoker::from_config(&config, ctx, WorkerPool::current())
            .with_working_dir(temp.path());

        let info = invoker.build_info().await.unwrap();
        assert_eq!(info.release(), Some("7"));
        assert_eq!(
            recorded_calls(temp.path()),
            vec!["--nohome_rc info --tool_tag=ide"]
        );
    }
}
