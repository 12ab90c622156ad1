use std::cell::RefCell;
use std::path::{Path, PathBuf};

use switchman::action::Payload;
use switchman::node::Node;
use switchman::runner::{CommandOutput, ProcessRunner};
use switchman::trigger::Dispatcher;
use switchman::workflow::{DispatchRequest, WorkflowApi};

/// Process seam double: scripts per-call verdicts and records invocations.
struct RecordingRunner {
    calls: RefCell<Vec<(String, Vec<String>, Option<PathBuf>)>>,
    verdicts: RefCell<Vec<bool>>,
}

impl RecordingRunner {
    fn new(verdicts: Vec<bool>) -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            verdicts: RefCell::new(verdicts),
        }
    }

    fn count(&self) -> usize {
        self.calls.borrow().len()
    }
}

impl ProcessRunner for RecordingRunner {
    fn run(&self, program: &str, args: &[String], cwd: Option<&Path>) -> CommandOutput {
        self.calls.borrow_mut().push((
            program.to_string(),
            args.to_vec(),
            cwd.map(Path::to_path_buf),
        ));
        let success = if self.verdicts.borrow().is_empty() {
            true
        } else {
            self.verdicts.borrow_mut().remove(0)
        };
        CommandOutput {
            stdout: String::new(),
            stderr: String::new(),
            success,
            exit_code: if success { 0 } else { 1 },
        }
    }
}

/// HTTP seam double: counts dispatch calls, returns a fixed status.
struct CountingApi {
    calls: RefCell<usize>,
    status: u16,
}

impl CountingApi {
    fn new(status: u16) -> Self {
        Self {
            calls: RefCell::new(0),
            status,
        }
    }

    fn count(&self) -> usize {
        *self.calls.borrow()
    }
}

impl WorkflowApi for CountingApi {
    fn dispatch(&self, _request: &DispatchRequest) -> Result<u16, String> {
        *self.calls.borrow_mut() += 1;
        Ok(self.status)
    }
}

#[test]
fn workflow_dispatch_without_owner_makes_zero_external_calls() {
    let runner = RecordingRunner::new(vec![]);
    let api = CountingApi::new(204);
    let dispatcher = Dispatcher::new(&runner, &api).with_token(Some("token".to_string()));

    let node = Node::named("nameless");
    let result = dispatcher.trigger(&node, "workflow_dispatch", &Payload::default());

    assert!(!result.ok);
    assert_eq!(result.error.as_deref(), Some("missing owner/repo/workflow_id"));
    assert_eq!(runner.count(), 0);
    assert_eq!(api.count(), 0);
}

#[test]
fn fetch_merge_failing_fetch_never_merges() {
    let dir = tempfile::tempdir().unwrap();
    let runner = RecordingRunner::new(vec![false]);
    let api = CountingApi::new(204);
    let dispatcher = Dispatcher::new(&runner, &api).with_token(None);

    let payload = Payload {
        path: Some(dir.path().display().to_string()),
        remote: Some("origin".to_string()),
        branch: Some("main".to_string()),
        ..Payload::default()
    };
    let result = dispatcher.trigger(&Node::named("repo"), "fetch_merge", &payload);

    assert!(!result.ok);
    assert_eq!(runner.count(), 1);
    let calls = runner.calls.borrow();
    assert_eq!(calls[0].0, "git");
    assert!(calls[0].1.contains(&"fetch".to_string()));
}

#[test]
fn notify_reports_unimplemented_but_ok() {
    let runner = RecordingRunner::new(vec![]);
    let api = CountingApi::new(204);
    let dispatcher = Dispatcher::new(&runner, &api).with_token(None);

    let result = dispatcher.trigger(&Node::named("n"), "notify", &Payload::default());

    assert!(result.ok);
    assert!(result
        .message
        .as_deref()
        .unwrap()
        .contains("notify not implemented"));
    assert_eq!(runner.count(), 0);
    assert_eq!(api.count(), 0);
}

#[test]
fn bogus_action_is_reported_by_name() {
    let runner = RecordingRunner::new(vec![]);
    let api = CountingApi::new(204);
    let dispatcher = Dispatcher::new(&runner, &api).with_token(None);

    let result = dispatcher.trigger(&Node::named("n"), "bogus", &Payload::default());

    assert!(!result.ok);
    assert_eq!(result.error.as_deref(), Some("unknown action: bogus"));
    assert_eq!(runner.count(), 0);
    assert_eq!(api.count(), 0);
}

#[test]
fn trigger_result_serializes_compactly() {
    let runner = RecordingRunner::new(vec![]);
    let api = CountingApi::new(204);
    let dispatcher = Dispatcher::new(&runner, &api).with_token(None);

    let result = dispatcher.trigger(&Node::named("n"), "bogus", &Payload::default());
    let json = serde_json::to_value(&result).unwrap();

    assert_eq!(json["ok"], false);
    assert_eq!(json["error"], "unknown action: bogus");
    // absent optionals are omitted, not null
    assert!(json.get("context_key").is_none());
    assert!(json.get("command").is_none());
    assert!(json.get("message").is_none());
}

#[test]
fn workflow_dispatch_http_failure_is_reported_as_status() {
    let runner = RecordingRunner::new(vec![]);
    let api = CountingApi::new(500);
    let dispatcher = Dispatcher::new(&runner, &api).with_token(Some("token".to_string()));

    let node = Node {
        name: "site".to_string(),
        path: None,
        owner: Some("extrachill".to_string()),
        repo: None,
        slug: Some("site".to_string()),
    };
    let payload = Payload {
        workflow_id: Some("ci.yml".to_string()),
        ..Payload::default()
    };
    let result = dispatcher.trigger(&node, "workflow_dispatch", &payload);

    assert!(!result.ok);
    assert_eq!(result.error.as_deref(), Some("HTTP 500"));
    assert_eq!(api.count(), 1);
}
