//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 合约快照测试（ProgressIndex 与配置的序列化形式）
//! - 配置 → 处理器 → 分发器 的端到端测试
//! - 分发器可验证性质：无缺口恢复、前缀拼接、取消、空输入

#[cfg(test)]
fn items(n: usize) -> Vec<contracts::Item> {
    (0..n).map(|i| contracts::Item::from(format!("item-{i}"))).collect()
}

#[cfg(test)]
mod contract_tests {
    use contracts::{DispatcherSettings, ProgressIndex};

    #[test]
    fn test_progress_index_wire_form() {
        assert_eq!(serde_json::to_string(&ProgressIndex::NONE).unwrap(), "-1");
        assert_eq!(serde_json::to_string(&ProgressIndex::at(41)).unwrap(), "41");

        let parsed: ProgressIndex = serde_json::from_str("-1").unwrap();
        assert_eq!(parsed, ProgressIndex::NONE);
        assert!(serde_json::from_str::<ProgressIndex>("-2").is_err());
    }

    #[test]
    fn test_dispatcher_settings_defaults() {
        let settings = DispatcherSettings::default();
        assert_eq!(settings.retry_delay_ms, 1000);
        assert_eq!(settings.max_empty_batches, None);
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::time::Duration;

    use config_loader::{ConfigFormat, ConfigLoader};
    use dispatcher::{create_processor, Cancellation, Dispatcher, QuotaProcessor};

    use super::items;

    /// End-to-end test: TOML config -> FileProcessor behind a quota -> Dispatcher
    ///
    /// 验证：
    /// 1. 配置加载并通过校验
    /// 2. 分发节奏满足处理器自身的配额，不触发 Blocked
    /// 3. 所有条目按顺序写入文件
    #[tokio::test(start_paused = true)]
    async fn test_e2e_file_processor_with_quota() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out").join("items.txt");
        let config = format!(
            r#"
            [dispatcher]
            retry_delay_ms = 50

            [processor]
            name = "archive"
            kind = "file"
            max_batch_size = 4
            min_period_ms = 100
            enforce_quota = true

            [processor.params]
            path = "{}"
            "#,
            out.display().to_string().replace('\\', "\\\\")
        );

        let blueprint = ConfigLoader::load_from_str(&config, ConfigFormat::Toml).unwrap();
        let processor = create_processor(&blueprint.processor).unwrap();
        let mut dispatcher = Dispatcher::new(QuotaProcessor::new(processor), blueprint.dispatcher);

        let input = items(10);
        let start = tokio::time::Instant::now();
        let progress = dispatcher.run(&input, &Cancellation::never()).await.unwrap();

        assert_eq!(progress.as_i64(), 9);
        // three batches, two pacing waits
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(200));
        assert!(elapsed < Duration::from_millis(210));
        assert_eq!(dispatcher.processor().rejected(), 0);

        let snapshot = dispatcher.metrics().snapshot();
        assert_eq!(snapshot.batches_completed, 3);
        assert_eq!(snapshot.blocked_count, 0);

        let written = std::fs::read_to_string(&out).unwrap();
        let expected: String = (0..10).map(|i| format!("item-{i}\n")).collect();
        assert_eq!(written, expected);
    }

    /// A quota that is tighter than the advertised limits forces blocked retries,
    /// but every item still arrives exactly once.
    #[tokio::test(start_paused = true)]
    async fn test_e2e_quota_rejections_are_retried() {
        use contracts::{BatchProcessor, DispatcherSettings, Item, Limits, ProcessError};
        use dispatcher::MockProcessor;

        /// Advertises no pacing while the inner quota wants 300ms
        struct Optimistic(QuotaProcessor<MockProcessor>);

        impl BatchProcessor for Optimistic {
            fn name(&self) -> &str {
                self.0.name()
            }

            fn limits(&self) -> Limits {
                Limits::new(2, Duration::ZERO)
            }

            async fn process(&mut self, batch: &[Item]) -> Result<(), ProcessError> {
                self.0.process(batch).await
            }
        }

        let mock = MockProcessor::new("svc", Limits::new(2, Duration::from_millis(300)));
        let handle = mock.handle();
        let settings = DispatcherSettings::with_retry_delay(Duration::from_millis(100));
        let mut dispatcher = Dispatcher::new(Optimistic(QuotaProcessor::new(mock)), settings);

        let input = items(5);
        let progress = dispatcher.run(&input, &Cancellation::never()).await.unwrap();

        assert_eq!(progress.as_i64(), 4);
        assert_eq!(handle.accepted_items(), input);
        // each follow-up batch waits out the quota in 100ms retries
        assert_eq!(dispatcher.metrics().snapshot().blocked_count, 6);
    }
}

#[cfg(test)]
mod property_tests {
    use std::time::Duration;

    use contracts::{DispatcherSettings, Limits, ProcessError, ProgressIndex};
    use dispatcher::{Cancellation, DispatchError, Dispatcher, MockProcessor};

    use super::items;

    fn settings() -> DispatcherSettings {
        DispatcherSettings::with_retry_delay(Duration::from_millis(1000))
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeding_processor_reaches_last_index() {
        for max_batch_size in [1, 3, 7, 100] {
            let mock = MockProcessor::new("svc", Limits::new(max_batch_size, Duration::ZERO));
            let mut dispatcher = Dispatcher::new(mock, settings());

            let progress = dispatcher.run(&items(7), &Cancellation::never()).await.unwrap();
            assert_eq!(progress, ProgressIndex::at(6), "max_batch_size = {max_batch_size}");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_input_makes_no_calls() {
        let mock = MockProcessor::new("svc", Limits::new(5, Duration::ZERO));
        let handle = mock.handle();
        let mut dispatcher = Dispatcher::new(mock, settings());

        let progress = dispatcher.run(&[], &Cancellation::never()).await.unwrap();

        assert_eq!(progress.as_i64(), -1);
        assert_eq!(handle.limit_calls(), 0);
        assert_eq!(handle.submission_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_resume_after_failure_has_no_gaps_or_duplicates() {
        let input = items(10);

        let failing = MockProcessor::new("svc", Limits::new(3, Duration::ZERO))
            .failing_at(2, "fail to process");
        let first = failing.handle();
        let mut dispatcher = Dispatcher::new(failing, settings());

        let interrupted = dispatcher
            .run(&input, &Cancellation::never())
            .await
            .unwrap_err();
        assert_eq!(interrupted.progress(), ProgressIndex::at(5));
        assert!(matches!(
            interrupted.error(),
            DispatchError::Processing(ProcessError::Failed { .. })
        ));

        let healthy = MockProcessor::new("svc", Limits::new(3, Duration::ZERO));
        let second = healthy.handle();
        let mut dispatcher = Dispatcher::new(healthy, settings());

        let progress = dispatcher
            .run_from(&input, interrupted.progress().resume_from(), &Cancellation::never())
            .await
            .unwrap();
        assert_eq!(progress, ProgressIndex::at(9));

        let mut delivered = first.accepted_items();
        delivered.extend(second.accepted_items());
        assert_eq!(delivered, input);
    }

    #[tokio::test(start_paused = true)]
    async fn test_accepted_batches_form_input_prefix() {
        let input = items(20);
        let mock = MockProcessor::new("svc", Limits::new(1, Duration::from_millis(10)))
            .with_limit_sequence(vec![
                Limits::new(3, Duration::from_millis(10)),
                Limits::new(1, Duration::ZERO),
                Limits::new(4, Duration::from_millis(5)),
                Limits::new(2, Duration::ZERO),
            ])
            .with_responses(vec![
                Ok(()),
                Err(ProcessError::Blocked),
                Ok(()),
                Ok(()),
                Err(ProcessError::failed("svc", "quota revoked")),
            ]);
        let handle = mock.handle();
        let mut dispatcher = Dispatcher::new(mock, settings());

        let interrupted = dispatcher
            .run(&input, &Cancellation::never())
            .await
            .unwrap_err();

        // [0..3], blocked, [3..7], [7..9], failure
        let progress = interrupted.progress();
        assert_eq!(progress, ProgressIndex::at(8));
        assert_eq!(handle.accepted_items(), input[..progress.processed_count()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_batch_failure_reports_none() {
        let mock = MockProcessor::new("svc", Limits::new(4, Duration::ZERO)).failing_at(0, "down");
        let mut dispatcher = Dispatcher::new(mock, settings());

        let interrupted = dispatcher
            .run(&items(3), &Cancellation::never())
            .await
            .unwrap_err();

        assert_eq!(interrupted.progress().as_i64(), -1);
        assert_eq!(interrupted.error().to_string(), "processor 'svc' failed: down");
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_while_blocked() {
        let mock = MockProcessor::new("svc", Limits::new(4, Duration::ZERO)).always_blocked();
        let mut dispatcher = Dispatcher::new(mock, settings());

        let cancel = Cancellation::never();
        let token = cancel.token().clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(2500)).await;
            token.cancel();
        });

        let start = tokio::time::Instant::now();
        let interrupted = dispatcher.run(&items(3), &cancel).await.unwrap_err();
        let elapsed = start.elapsed();

        assert_eq!(interrupted.progress(), ProgressIndex::NONE);
        assert!(matches!(interrupted.error(), DispatchError::Cancelled));
        // observed inside the retry wait, not after it
        assert!(elapsed >= Duration::from_millis(2500));
        assert!(elapsed < Duration::from_millis(3000));
        assert_eq!(dispatcher.metrics().snapshot().cancelled_count, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_keeps_progress() {
        let mock = MockProcessor::new("svc", Limits::new(2, Duration::from_millis(400)));
        let handle = mock.handle();
        let mut dispatcher = Dispatcher::new(mock, settings());

        let cancel = Cancellation::never().with_timeout(Duration::from_millis(1000));
        let interrupted = dispatcher.run(&items(10), &cancel).await.unwrap_err();

        // batches start at 0, 400 and 800ms; the wait for 1200ms hits the deadline
        assert_eq!(interrupted.progress(), ProgressIndex::at(5));
        assert!(matches!(interrupted.error(), DispatchError::DeadlineExceeded));
        assert_eq!(handle.submission_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stall_guard_stops_zero_sized_batches() {
        let mock = MockProcessor::new("svc", Limits::new(0, Duration::from_millis(10)));
        let handle = mock.handle();
        let settings = DispatcherSettings {
            max_empty_batches: Some(3),
            ..settings()
        };
        let mut dispatcher = Dispatcher::new(mock, settings);

        let interrupted = dispatcher
            .run(&items(2), &Cancellation::never())
            .await
            .unwrap_err();

        assert_eq!(interrupted.progress(), ProgressIndex::NONE);
        assert!(matches!(
            interrupted.error(),
            DispatchError::Stalled { consecutive: 4 }
        ));
        assert_eq!(handle.batch_sizes(), vec![0, 0, 0, 0]);
    }
}
