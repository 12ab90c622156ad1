use serde::Serialize;
use std::path::Path;

use crate::action::{Action, MergePolicy, Payload};
use crate::node::Node;
use crate::runner::ProcessRunner;
use crate::workflow::{token_from_env, DispatchRequest, WorkflowApi, TOKEN_ENV};
use crate::log_status;

/// Uniform outcome of every dispatch path.
///
/// Resolution, precondition, unknown-action, and HTTP failures carry an
/// `error`; a plain external-command failure reports only `ok=false` - the
/// tool's own output is the diagnostic channel, not part of this contract.
#[derive(Debug, Clone, Serialize)]
pub struct TriggerResult {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl TriggerResult {
    pub fn succeeded() -> Self {
        Self {
            ok: true,
            error: None,
            action: None,
            context_key: None,
            command: None,
            message: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: Some(error.into()),
            action: None,
            context_key: None,
            command: None,
            message: None,
        }
    }

    /// External command failed; the aggregate boolean is the whole story.
    pub fn external_failure() -> Self {
        Self {
            ok: false,
            error: None,
            action: None,
            context_key: None,
            command: None,
            message: None,
        }
    }

    pub fn with_action(mut self, action: &str) -> Self {
        self.action = Some(action.to_string());
        self
    }

    pub fn with_context_key(mut self, key: Option<String>) -> Self {
        self.context_key = key;
        self
    }

    pub fn with_command(mut self, command: Option<String>) -> Self {
        self.command = command;
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// Executes trigger actions through the process and HTTP seams and
/// normalizes every outcome into a TriggerResult. Nothing escapes as a
/// panic or error: callers always get a result back.
pub struct Dispatcher<'a> {
    runner: &'a dyn ProcessRunner,
    api: &'a dyn WorkflowApi,
    token: Option<String>,
}

impl<'a> Dispatcher<'a> {
    /// Token comes from the ambient environment; use `with_token` to inject
    /// one explicitly (tests, alternate credentials).
    pub fn new(runner: &'a dyn ProcessRunner, api: &'a dyn WorkflowApi) -> Self {
        Self {
            runner,
            api,
            token: token_from_env(),
        }
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    /// Entry point for explicit-action triggers: parse, validate, dispatch.
    pub fn trigger(&self, node: &Node, action_name: &str, payload: &Payload) -> TriggerResult {
        let action = match Action::from_request(action_name, node, payload) {
            Ok(action) => action,
            Err(error) => return TriggerResult::failed(error),
        };
        log_status!("trigger", "{} for {}", action.name(), node.name);
        self.dispatch(&action)
    }

    /// Dispatch a constructed action. Exhaustive over the closed action set.
    pub fn dispatch(&self, action: &Action) -> TriggerResult {
        let result = match action {
            Action::WorkflowDispatch(params) => {
                let Some(token) = self.token.as_deref() else {
                    return TriggerResult::failed(format!("{} not set", TOKEN_ENV))
                        .with_action(action.name());
                };
                let request = DispatchRequest {
                    owner: params.owner.clone(),
                    repo: params.repo.clone(),
                    workflow_id: params.workflow_id.clone(),
                    git_ref: params.git_ref.clone(),
                    inputs: params.inputs.clone(),
                    token: token.to_string(),
                };
                match self.api.dispatch(&request) {
                    Ok(status) if status < 400 => TriggerResult::succeeded(),
                    Ok(status) => TriggerResult::failed(format!("HTTP {}", status)),
                    Err(error) => TriggerResult::failed(error),
                }
            }
            Action::GitSync(params) => {
                let mut args = vec![params.subcommand.as_str().to_string()];
                args.extend(params.args.iter().cloned());
                self.git(&params.path, &args)
            }
            Action::FetchMerge(params) => {
                let fetch = self.git(&params.path, &["fetch".to_string(), params.remote.clone()]);
                if !fetch.ok {
                    return fetch.with_action(action.name());
                }
                self.git(
                    &params.path,
                    &[
                        "merge".to_string(),
                        format!("{}/{}", params.remote, params.branch),
                    ],
                )
            }
            Action::PushMerge(params) => {
                let merge =
                    self.git(&params.path, &["merge".to_string(), params.branch.clone()]);
                if params.policy == MergePolicy::Strict && !merge.ok {
                    return merge.with_action(action.name());
                }
                let mut args = vec!["push".to_string(), params.remote.clone()];
                args.extend(params.args.iter().cloned());
                self.git(&params.path, &args)
            }
            Action::JobSubmit(params) => {
                let script_path = params.path.join(&params.script);
                let out = self.runner.run(
                    "sbatch",
                    &[script_path.display().to_string()],
                    Some(&params.path),
                );
                if out.success {
                    TriggerResult::succeeded()
                } else {
                    TriggerResult::external_failure()
                }
            }
            Action::RunScript(params) => {
                let out = self.runner.run(
                    "sh",
                    &["-c".to_string(), params.script.clone()],
                    Some(&params.path),
                );
                if out.success {
                    TriggerResult::succeeded()
                } else {
                    TriggerResult::external_failure()
                }
            }
            Action::Notify => TriggerResult::succeeded()
                .with_message("notify not implemented (platform-specific)"),
        };
        result.with_action(action.name())
    }

    fn git(&self, path: &Path, args: &[String]) -> TriggerResult {
        let mut full = vec!["-C".to_string(), path.display().to_string()];
        full.extend(args.iter().cloned());
        let out = self.runner.run("git", &full, None);
        if out.success {
            TriggerResult::succeeded()
        } else {
            TriggerResult::external_failure()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::CommandOutput;
    use std::cell::RefCell;
    use std::path::PathBuf;

    #[derive(Debug, Clone)]
    struct RecordedCall {
        program: String,
        args: Vec<String>,
        cwd: Option<PathBuf>,
    }

    /// Runner double: scripted verdicts, records every invocation.
    struct RecordingRunner {
        calls: RefCell<Vec<RecordedCall>>,
        verdicts: RefCell<Vec<bool>>,
    }

    impl RecordingRunner {
        fn succeeding() -> Self {
            Self {
                calls: RefCell::new(Vec::new()),
                verdicts: RefCell::new(Vec::new()),
            }
        }

        fn scripted(verdicts: Vec<bool>) -> Self {
            Self {
                calls: RefCell::new(Vec::new()),
                verdicts: RefCell::new(verdicts),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.borrow().len()
        }

        fn calls(&self) -> Vec<RecordedCall> {
            self.calls.borrow().clone()
        }
    }

    impl ProcessRunner for RecordingRunner {
        fn run(&self, program: &str, args: &[String], cwd: Option<&Path>) -> CommandOutput {
            self.calls.borrow_mut().push(RecordedCall {
                program: program.to_string(),
                args: args.to_vec(),
                cwd: cwd.map(Path::to_path_buf),
            });
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

    /// API double: records dispatch requests, returns a scripted status.
    struct RecordingApi {
        requests: RefCell<Vec<DispatchRequest>>,
        status: std::result::Result<u16, String>,
    }

    impl RecordingApi {
        fn accepting() -> Self {
            Self {
                requests: RefCell::new(Vec::new()),
                status: Ok(204),
            }
        }

        fn with_status(status: u16) -> Self {
            Self {
                requests: RefCell::new(Vec::new()),
                status: Ok(status),
            }
        }

        fn call_count(&self) -> usize {
            self.requests.borrow().len()
        }
    }

    impl WorkflowApi for RecordingApi {
        fn dispatch(&self, request: &DispatchRequest) -> std::result::Result<u16, String> {
            self.requests.borrow_mut().push(request.clone());
            self.status.clone()
        }
    }

    fn ci_node() -> Node {
        Node {
            name: "owner-github-site".to_string(),
            path: None,
            owner: Some("extrachill".to_string()),
            repo: Some("site".to_string()),
            slug: None,
        }
    }

    fn workflow_payload() -> Payload {
        Payload {
            workflow_id: Some("deploy.yml".to_string()),
            ..Payload::default()
        }
    }

    #[test]
    fn missing_owner_fails_before_any_call() {
        let runner = RecordingRunner::succeeding();
        let api = RecordingApi::accepting();
        let dispatcher = Dispatcher::new(&runner, &api).with_token(Some("t".to_string()));

        let node = Node::named("anon");
        let result = dispatcher.trigger(&node, "workflow_dispatch", &workflow_payload());

        assert!(!result.ok);
        assert_eq!(result.error.as_deref(), Some("missing owner/repo/workflow_id"));
        assert_eq!(runner.call_count(), 0);
        assert_eq!(api.call_count(), 0);
    }

    #[test]
    fn missing_token_fails_before_any_call() {
        let runner = RecordingRunner::succeeding();
        let api = RecordingApi::accepting();
        let dispatcher = Dispatcher::new(&runner, &api).with_token(None);

        let result = dispatcher.trigger(&ci_node(), "workflow_dispatch", &workflow_payload());

        assert!(!result.ok);
        assert_eq!(result.error.as_deref(), Some("GITHUB_TOKEN not set"));
        assert_eq!(api.call_count(), 0);
    }

    #[test]
    fn workflow_dispatch_posts_once_on_success() {
        let runner = RecordingRunner::succeeding();
        let api = RecordingApi::accepting();
        let dispatcher = Dispatcher::new(&runner, &api).with_token(Some("t".to_string()));

        let result = dispatcher.trigger(&ci_node(), "workflow_dispatch", &workflow_payload());

        assert!(result.ok);
        assert_eq!(result.action.as_deref(), Some("workflow_dispatch"));
        assert_eq!(api.call_count(), 1);
        assert_eq!(runner.call_count(), 0);
        let req = api.requests.borrow()[0].clone();
        assert_eq!(req.git_ref, "main");
    }

    #[test]
    fn workflow_dispatch_reports_http_status_failures() {
        let runner = RecordingRunner::succeeding();
        let api = RecordingApi::with_status(422);
        let dispatcher = Dispatcher::new(&runner, &api).with_token(Some("t".to_string()));

        let result = dispatcher.trigger(&ci_node(), "workflow_dispatch", &workflow_payload());

        assert!(!result.ok);
        assert_eq!(result.error.as_deref(), Some("HTTP 422"));
    }

    #[test]
    fn fetch_merge_skips_merge_when_fetch_fails() {
        let dir = tempfile::tempdir().unwrap();
        let runner = RecordingRunner::scripted(vec![false]);
        let api = RecordingApi::accepting();
        let dispatcher = Dispatcher::new(&runner, &api).with_token(None);

        let payload = Payload {
            path: Some(dir.path().display().to_string()),
            ..Payload::default()
        };
        let result = dispatcher.trigger(&Node::named("n"), "fetch_merge", &payload);

        assert!(!result.ok);
        assert!(result.error.is_none());
        assert_eq!(runner.call_count(), 1);
        let call = &runner.calls()[0];
        assert_eq!(call.program, "git");
        assert!(call.args.contains(&"fetch".to_string()));
    }

    #[test]
    fn fetch_merge_merges_remote_branch_after_fetch() {
        let dir = tempfile::tempdir().unwrap();
        let runner = RecordingRunner::succeeding();
        let api = RecordingApi::accepting();
        let dispatcher = Dispatcher::new(&runner, &api).with_token(None);

        let payload = Payload {
            path: Some(dir.path().display().to_string()),
            remote: Some("upstream".to_string()),
            branch: Some("develop".to_string()),
            ..Payload::default()
        };
        let result = dispatcher.trigger(&Node::named("n"), "fetch_merge", &payload);

        assert!(result.ok);
        let calls = runner.calls();
        assert_eq!(calls.len(), 2);
        assert!(calls[1].args.contains(&"merge".to_string()));
        assert!(calls[1].args.contains(&"upstream/develop".to_string()));
    }

    #[test]
    fn push_merge_tolerates_merge_failure_by_default() {
        let dir = tempfile::tempdir().unwrap();
        let runner = RecordingRunner::scripted(vec![false, true]);
        let api = RecordingApi::accepting();
        let dispatcher = Dispatcher::new(&runner, &api).with_token(None);

        let payload = Payload {
            path: Some(dir.path().display().to_string()),
            ..Payload::default()
        };
        let result = dispatcher.trigger(&Node::named("n"), "push_merge", &payload);

        assert!(result.ok);
        assert_eq!(runner.call_count(), 2);
    }

    #[test]
    fn push_merge_strict_aborts_on_merge_failure() {
        let dir = tempfile::tempdir().unwrap();
        let runner = RecordingRunner::scripted(vec![false, true]);
        let api = RecordingApi::accepting();
        let dispatcher = Dispatcher::new(&runner, &api).with_token(None);

        let payload = Payload {
            path: Some(dir.path().display().to_string()),
            merge_policy: Some(MergePolicy::Strict),
            ..Payload::default()
        };
        let result = dispatcher.trigger(&Node::named("n"), "push_merge", &payload);

        assert!(!result.ok);
        assert_eq!(runner.call_count(), 1);
    }

    #[test]
    fn push_merge_reflects_push_outcome() {
        let dir = tempfile::tempdir().unwrap();
        let runner = RecordingRunner::scripted(vec![true, false]);
        let api = RecordingApi::accepting();
        let dispatcher = Dispatcher::new(&runner, &api).with_token(None);

        let payload = Payload {
            path: Some(dir.path().display().to_string()),
            ..Payload::default()
        };
        let result = dispatcher.trigger(&Node::named("n"), "push_merge", &payload);

        assert!(!result.ok);
        assert!(result.error.is_none());
    }

    #[test]
    fn job_submit_runs_sbatch_from_job_directory() {
        let dir = tempfile::tempdir().unwrap();
        let runner = RecordingRunner::succeeding();
        let api = RecordingApi::accepting();
        let dispatcher = Dispatcher::new(&runner, &api).with_token(None);

        let payload = Payload {
            path: Some(dir.path().display().to_string()),
            ..Payload::default()
        };
        let result = dispatcher.trigger(&Node::named("n"), "job_submit", &payload);

        assert!(result.ok);
        let call = &runner.calls()[0];
        assert_eq!(call.program, "sbatch");
        assert_eq!(call.cwd.as_deref(), Some(dir.path()));
        assert!(call.args[0].ends_with("job.sh"));
    }

    #[test]
    fn notify_succeeds_without_external_calls() {
        let runner = RecordingRunner::succeeding();
        let api = RecordingApi::accepting();
        let dispatcher = Dispatcher::new(&runner, &api).with_token(None);

        let result = dispatcher.trigger(&Node::named("n"), "notify", &Payload::default());

        assert!(result.ok);
        assert!(result
            .message
            .as_deref()
            .unwrap()
            .contains("notify not implemented"));
        assert_eq!(runner.call_count(), 0);
        assert_eq!(api.call_count(), 0);
    }

    #[test]
    fn unknown_action_is_rejected_without_external_calls() {
        let runner = RecordingRunner::succeeding();
        let api = RecordingApi::accepting();
        let dispatcher = Dispatcher::new(&runner, &api).with_token(None);

        let result = dispatcher.trigger(&Node::named("n"), "bogus", &Payload::default());

        assert!(!result.ok);
        assert_eq!(result.error.as_deref(), Some("unknown action: bogus"));
        assert_eq!(runner.call_count(), 0);
        assert_eq!(api.call_count(), 0);
    }

    #[test]
    fn pull_merge_invokes_git_pull() {
        let dir = tempfile::tempdir().unwrap();
        let runner = RecordingRunner::succeeding();
        let api = RecordingApi::accepting();
        let dispatcher = Dispatcher::new(&runner, &api).with_token(None);

        let payload = Payload {
            path: Some(dir.path().display().to_string()),
            ..Payload::default()
        };
        let result = dispatcher.trigger(&Node::named("n"), "pull_merge", &payload);

        assert!(result.ok);
        let call = &runner.calls()[0];
        assert_eq!(call.program, "git");
        assert_eq!(call.args[0], "-C");
        assert!(call.args.contains(&"pull".to_string()));
    }
}
