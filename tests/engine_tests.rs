// ABOUTME: Integration tests for the graph executor and recovery flow
// ABOUTME: Covers dependency gating, placeholder data flow, routing failures, and fix-plan retries

use harbinger::engine::{
    ExecutionResult, ExecutionStatus, FailureKind, GraphExecutor, ResultStore,
};
use harbinger::plan::{Plan, Task};

mod common;
use common::{executor, fix_plan_json, Reply, ScriptedCompletionClient, SpyAgent};

fn search_then_mail() -> Plan {
    Plan::new(
        "search_and_mail",
        vec![
            Task::new("1", "search", "web.search").with_param("query", "x"),
            Task::new("2", "mail", "mail.send")
                .with_param("to", "a@b.com")
                .with_param("body", "Results: {{1}}")
                .with_dependency("1"),
        ],
    )
}

#[tokio::test]
async fn test_placeholder_flows_into_dependent_task() {
    let search = SpyAgent::returning(r#"{"result":"3 links found"}"#);
    let mail = SpyAgent::new();
    let executor = executor(
        &[("search", search.clone()), ("mail", mail.clone())],
        ScriptedCompletionClient::silent(),
    );

    let mut results = ResultStore::new();
    let outcome = executor
        .run(&search_then_mail(), &mut results, false)
        .await
        .unwrap();

    assert!(!outcome.is_halted());
    assert_eq!(mail.calls(), 1);
    assert_eq!(mail.params(0)["body"], "Results: 3 links found");
    assert_eq!(mail.params(0)["to"], "a@b.com");
    assert!(results.succeeded("1"));
    assert!(results.succeeded("2"));
}

#[tokio::test]
async fn test_two_placeholders_resolve_independently() {
    let search = SpyAgent::returning(r#"{"result":"news digest"}"#);
    let memory = SpyAgent::returning(r#"{"output":"ada@example.com"}"#);
    let mail = SpyAgent::new();
    let executor = executor(
        &[
            ("search", search),
            ("memory", memory),
            ("mail", mail.clone()),
        ],
        ScriptedCompletionClient::silent(),
    );

    let plan = Plan::new(
        "digest",
        vec![
            Task::new("1", "search", "web.search"),
            Task::new("2", "memory", "memory.search"),
            Task::new("3", "mail", "mail.send")
                .with_param("body", "For {{2}}: {{1}}")
                .with_dependency("1")
                .with_dependency("2"),
        ],
    );

    let mut results = ResultStore::new();
    executor.run(&plan, &mut results, false).await.unwrap();

    let body = mail.params(0)["body"].as_str().unwrap().to_string();
    assert_eq!(body, "For ada@example.com: news digest");
    assert!(!body.contains("{{"));
}

#[tokio::test]
async fn test_zero_placeholders_dispatch_params_unchanged() {
    let search = SpyAgent::new();
    let executor = executor(&[("search", search.clone())], ScriptedCompletionClient::silent());

    let task = Task::new("1", "search", "web.search")
        .with_param("query", "rust {braces} stay")
        .with_param("filters", serde_json::json!({"lang": ["en"], "limit": 5}));
    let expected = serde_json::Value::Object(task.params.clone());

    let mut results = ResultStore::new();
    executor
        .run(&Plan::new("p", vec![task]), &mut results, false)
        .await
        .unwrap();

    assert_eq!(search.params(0), expected);
}

#[tokio::test]
async fn test_unmet_dependency_skips_without_halting() {
    let search = SpyAgent::new();
    let mail = SpyAgent::new();
    let executor = executor(
        &[("search", search.clone()), ("mail", mail.clone())],
        ScriptedCompletionClient::silent(),
    );

    let plan = Plan::new(
        "p",
        vec![
            Task::new("2", "mail", "mail.send").with_dependency("0"),
            Task::new("3", "mail", "mail.send").with_dependency("failed_earlier"),
            Task::new("4", "search", "web.search"),
        ],
    );

    let mut results = ResultStore::new();
    results.record(ExecutionResult::failure(
        "failed_earlier",
        FailureKind::Business,
        "nope",
    ));
    let outcome = executor.run(&plan, &mut results, false).await.unwrap();

    assert_eq!(mail.calls(), 0);
    assert_eq!(search.calls(), 1);
    assert!(!outcome.is_halted());
    let skipped: Vec<_> = outcome.skipped.iter().map(|s| s.task_id.as_str()).collect();
    assert_eq!(skipped, vec!["2", "3"]);
    assert_eq!(outcome.skipped[0].unmet_dependencies, vec!["0"]);
    assert!(!results.contains("2"));
}

#[tokio::test]
async fn test_unknown_agent_never_calls_remote_or_recovery() {
    let search = SpyAgent::new();
    let llm = ScriptedCompletionClient::new([fix_plan_json(&[("f1", "search", "web.search")])]);
    let executor = executor(&[("search", search.clone())], llm.clone());

    let plan = Plan::new(
        "p",
        vec![
            Task::new("1", "fax", "fax.send"),
            Task::new("2", "search", "web.search"),
        ],
    );

    let mut results = ResultStore::new();
    let outcome = executor.run(&plan, &mut results, false).await.unwrap();

    assert_eq!(search.calls(), 0);
    assert_eq!(llm.calls(), 0);

    let result = results.get("1").unwrap();
    assert_eq!(result.status, ExecutionStatus::Fail);
    assert_eq!(result.failure, Some(FailureKind::Routing));
    assert!(result.error_message.as_deref().unwrap().contains("fax"));

    let halt = outcome.halted.unwrap();
    assert_eq!(halt.task_id, "1");
    assert_eq!(halt.not_attempted, vec!["2"]);
}

#[tokio::test]
async fn test_fix_plan_steps_then_single_retry() {
    let search = SpyAgent::returning(r#"{"result":"3 links found"}"#);
    let mail = SpyAgent::scripted(vec![Reply::Transport("connection refused".to_string())]);
    let os = SpyAgent::new();
    let llm = ScriptedCompletionClient::new([fix_plan_json(&[
        ("f1", "os", "os.run_command"),
        ("f2", "os", "os.create_file"),
        ("f3", "os", "os.read_file"),
    ])]);
    let executor = executor(
        &[("search", search), ("mail", mail.clone()), ("os", os.clone())],
        llm.clone(),
    );

    let mut results = ResultStore::new();
    let outcome = executor
        .run(&search_then_mail(), &mut results, false)
        .await
        .unwrap();

    assert_eq!(llm.calls(), 1);
    assert_eq!(os.calls(), 3);
    assert_eq!(mail.calls(), 2);
    assert_eq!(os.task_ids(), vec!["f1", "f2", "f3"]);
    // the retry carries the same resolved params
    assert_eq!(mail.params(1)["body"], "Results: 3 links found");

    assert!(!outcome.is_halted());
    let retried = results.get("2").unwrap();
    assert!(retried.is_success());
    assert_eq!(retried.attempts, 2);
}

#[tokio::test]
async fn test_recovery_prompt_carries_failure_context() {
    let search = SpyAgent::returning(r#"{"result":"3 links found"}"#);
    let mail = SpyAgent::scripted(vec![Reply::Fail("SMTP auth rejected".to_string())]);
    let llm = ScriptedCompletionClient::new([fix_plan_json(&[("f1", "mail", "mail.healthcheck")])]);
    let executor = executor(&[("search", search), ("mail", mail)], llm.clone());

    let mut results = ResultStore::new();
    executor
        .run(&search_then_mail(), &mut results, false)
        .await
        .unwrap();

    let prompt = llm.system_prompt(0);
    assert!(prompt.contains("System Doctor"));
    assert!(prompt.contains("SMTP auth rejected"));
    assert!(prompt.contains("\"action\": \"mail.send\""));
    assert!(prompt.contains("3 links found"));
    assert!(prompt.contains("- gmail: Can draft and send emails."));
}

#[tokio::test]
async fn test_malformed_fix_plan_leaves_failure_final() {
    for reply in [
        "this is not json",
        r#"{"steps": []}"#,
        r#"{"tasks": []}"#,
    ] {
        let search = SpyAgent::new();
        let mail = SpyAgent::scripted(vec![Reply::Transport("connection refused".to_string())]);
        let llm = ScriptedCompletionClient::new([reply]);
        let executor = executor(&[("search", search), ("mail", mail.clone())], llm.clone());

        let mut results = ResultStore::new();
        let outcome = executor
            .run(&search_then_mail(), &mut results, false)
            .await
            .unwrap();

        assert_eq!(llm.calls(), 1, "reply: {reply}");
        assert_eq!(mail.calls(), 1, "reply: {reply}");
        let result = results.get("2").unwrap();
        assert_eq!(result.status, ExecutionStatus::Fail);
        assert!(result
            .error_message
            .as_deref()
            .unwrap()
            .contains("connection refused"));
        assert_eq!(outcome.halted.unwrap().task_id, "2");
    }
}

#[tokio::test]
async fn test_transport_failure_recovered_scenario() {
    let search = SpyAgent::returning(r#"{"result":"3 links found"}"#);
    let mail = SpyAgent::scripted(vec![
        Reply::Transport("connection refused".to_string()),
        Reply::Success(Some("healthy".to_string())),
        Reply::Success(Some("sent".to_string())),
    ]);
    let llm = ScriptedCompletionClient::new([fix_plan_json(&[("f1", "mail", "mail.healthcheck")])]);
    let executor = executor(&[("search", search), ("mail", mail.clone())], llm);

    let mut results = ResultStore::new();
    let outcome = executor
        .run(&search_then_mail(), &mut results, false)
        .await
        .unwrap();

    assert!(!outcome.is_halted());
    assert_eq!(mail.task_ids(), vec!["2", "f1", "2"]);
    assert!(results.succeeded("1"));
    assert!(results.succeeded("f1"));
    assert!(results.succeeded("2"));
    assert_eq!(results.get("2").unwrap().output_data.as_deref(), Some("sent"));
    assert_eq!(results.len(), 3);
}

#[tokio::test]
async fn test_failed_retry_halts_after_one_recovery() {
    let search = SpyAgent::new();
    let mail = SpyAgent::scripted(vec![
        Reply::Transport("connection refused".to_string()),
        Reply::Success(None),
        Reply::Transport("connection refused".to_string()),
    ]);
    let llm = ScriptedCompletionClient::new([
        fix_plan_json(&[("f1", "mail", "mail.healthcheck")]),
        fix_plan_json(&[("f2", "mail", "mail.healthcheck")]),
    ]);
    let executor = executor(&[("search", search), ("mail", mail.clone())], llm.clone());

    let mut plan = search_then_mail();
    plan.tasks.push(Task::new("3", "search", "web.search"));

    let mut results = ResultStore::new();
    let outcome = executor.run(&plan, &mut results, false).await.unwrap();

    assert_eq!(llm.calls(), 1);
    assert_eq!(mail.calls(), 3);
    let result = results.get("2").unwrap();
    assert!(!result.is_success());
    assert_eq!(result.attempts, 2);

    let halt = outcome.halted.unwrap();
    assert_eq!(halt.task_id, "2");
    assert_eq!(halt.not_attempted, vec!["3"]);
}

#[tokio::test]
async fn test_fix_plan_failures_continue_without_nested_recovery() {
    let search = SpyAgent::new();
    let mail = SpyAgent::scripted(vec![Reply::Fail("mailbox full".to_string())]);
    let os = SpyAgent::scripted(vec![Reply::Fail("permission denied".to_string())]);
    let llm = ScriptedCompletionClient::new([
        fix_plan_json(&[("f1", "os", "os.run_command"), ("f2", "os", "os.create_file")]),
        fix_plan_json(&[("nested", "os", "os.run_command")]),
    ]);
    let executor = executor(
        &[("search", search), ("mail", mail.clone()), ("os", os.clone())],
        llm.clone(),
    );

    let mut results = ResultStore::new();
    let outcome = executor
        .run(&search_then_mail(), &mut results, false)
        .await
        .unwrap();

    // the failed fix step is recorded, the next one still runs, and the original is retried
    assert_eq!(llm.calls(), 1);
    assert_eq!(os.task_ids(), vec!["f1", "f2"]);
    assert!(!results.succeeded("f1"));
    assert!(results.succeeded("f2"));
    assert!(!results.contains("nested"));
    assert_eq!(mail.calls(), 2);
    assert!(!outcome.is_halted());
}

#[tokio::test]
async fn test_fix_plan_inherits_output_dir() {
    let mail = SpyAgent::scripted(vec![Reply::Fail("template missing".to_string())]);
    let codegen = SpyAgent::new();
    let llm = ScriptedCompletionClient::new([fix_plan_json(&[("f1", "codegen", "codegen.generate")])]);
    let executor = executor(&[("mail", mail), ("codegen", codegen.clone())], llm);

    let plan = Plan::new(
        "p",
        vec![Task::new("1", "mail", "mail.send").with_metadata("output_dir", "/work/report")],
    );

    let mut results = ResultStore::new();
    executor.run(&plan, &mut results, false).await.unwrap();

    assert_eq!(codegen.requests()[0].metadata["output_dir"], "/work/report");
}

#[tokio::test]
async fn test_fix_plan_run_ignores_dependency_gate() {
    let os = SpyAgent::scripted(vec![Reply::Fail("disk full".to_string())]);
    let llm = ScriptedCompletionClient::silent();
    let executor = executor(&[("os", os.clone())], llm.clone());

    let plan = Plan::new(
        "fix",
        vec![
            Task::new("f1", "os", "os.run_command"),
            Task::new("f2", "os", "os.create_file").with_dependency("f1"),
            Task::new("f3", "os", "os.read_file").with_dependency("never_ran"),
        ],
    );

    let mut results = ResultStore::new();
    let outcome = executor.run(&plan, &mut results, true).await.unwrap();

    assert_eq!(os.calls(), 3);
    assert_eq!(llm.calls(), 0);
    assert!(outcome.skipped.is_empty());
    assert_eq!(outcome.failed, vec!["f1"]);
    assert!(!outcome.is_halted());
}

#[tokio::test]
async fn test_no_retry_budget_means_no_recovery() {
    let mail = SpyAgent::scripted(vec![Reply::Transport("connection refused".to_string())]);
    let llm = ScriptedCompletionClient::new([fix_plan_json(&[("f1", "mail", "mail.healthcheck")])]);
    let executor: GraphExecutor =
        executor(&[("mail", mail.clone())], llm.clone()).with_max_retries(0);

    let plan = Plan::new("p", vec![Task::new("1", "mail", "mail.send")]);
    let mut results = ResultStore::new();
    let outcome = executor.run(&plan, &mut results, false).await.unwrap();

    assert_eq!(llm.calls(), 0);
    assert_eq!(mail.calls(), 1);
    assert!(outcome.is_halted());
}

#[tokio::test]
async fn test_forward_reference_is_skipped_in_authored_order() {
    let search = SpyAgent::new();
    let mail = SpyAgent::new();
    let executor = executor(
        &[("search", search.clone()), ("mail", mail.clone())],
        ScriptedCompletionClient::silent(),
    );

    // task 1 references task 2, which only runs afterwards
    let plan = Plan::new(
        "p",
        vec![
            Task::new("1", "mail", "mail.send").with_dependency("2"),
            Task::new("2", "search", "web.search"),
        ],
    );

    let mut results = ResultStore::new();
    let outcome = executor.run(&plan, &mut results, false).await.unwrap();

    assert_eq!(mail.calls(), 0);
    assert_eq!(search.calls(), 1);
    assert_eq!(outcome.skipped[0].task_id, "1");
}

#[tokio::test]
async fn test_fix_plan_reusing_plan_ids_is_rejected() {
    let search = SpyAgent::returning(r#"{"result":"3 links found"}"#);
    let mail = SpyAgent::scripted(vec![Reply::Fail("mailbox locked".to_string())]);
    let os = SpyAgent::scripted(vec![Reply::Fail("permission denied".to_string())]);
    // the fix step reuses id "1", which already holds the search result
    let llm = ScriptedCompletionClient::new([fix_plan_json(&[("1", "os", "os.run_command")])]);
    let executor = executor(
        &[("search", search), ("mail", mail.clone()), ("os", os.clone())],
        llm.clone(),
    );
    let plan = Plan::new(
        "search_and_mail_twice",
        vec![
            Task::new("1", "search", "web.search"),
            Task::new("2", "mail", "mail.send").with_param("body", "first"),
            Task::new("3", "mail", "mail.send")
                .with_param("body", "{{1}}")
                .with_dependency("1"),
        ],
    );

    let mut results = ResultStore::new();
    let outcome = executor.run(&plan, &mut results, false).await.unwrap();

    assert_eq!(llm.calls(), 1);
    assert_eq!(os.calls(), 0);
    assert!(results.succeeded("1"));
    assert_eq!(results.get("1").unwrap().output_data.as_deref(), Some(r#"{"result":"3 links found"}"#));
    assert_eq!(mail.calls(), 1);
    assert_eq!(outcome.halted.unwrap().task_id, "2");
}

#[tokio::test]
async fn test_fix_step_results_are_marked() {
    let search = SpyAgent::returning(r#"{"result":"3 links found"}"#);
    let mail = SpyAgent::scripted(vec![
        Reply::Transport("connection refused".to_string()),
        Reply::Success(Some("healthy".to_string())),
        Reply::Success(Some("sent".to_string())),
    ]);
    let llm = ScriptedCompletionClient::new([fix_plan_json(&[("f1", "mail", "mail.healthcheck")])]);
    let executor = executor(&[("search", search), ("mail", mail)], llm);

    let mut results = ResultStore::new();
    executor
        .run(&search_then_mail(), &mut results, false)
        .await
        .unwrap();

    assert!(results.get("f1").unwrap().fix_step);
    assert!(!results.get("1").unwrap().fix_step);
    assert!(!results.get("2").unwrap().fix_step);
}
