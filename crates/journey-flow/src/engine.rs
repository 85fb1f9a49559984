//! The run engine: a recursive walk over the backward-linked chain.

use std::sync::Arc;
use std::time::Duration;

use async_recursion::async_recursion;
use journey_core::{Context, Hooks, Options, Session, State};
use tracing::debug;

use crate::errors::FlowError;
use crate::flow::{Flow, Node};
use crate::step::Step;

/// Pause between unanswered ask attempts, so a hook that cannot answer
/// does not spin hot.
const ASK_RETRY_PAUSE: Duration = Duration::from_millis(50);

/// Everything shared across the steps of one run.
pub(crate) struct RunEnv {
    pub(crate) session: Arc<dyn Session>,
    pub(crate) options: Arc<Options>,
    pub(crate) hooks: Arc<dyn Hooks>,
}

/// Whether to keep folding steps or short-circuit with a partial state.
/// Once a sub-pipeline reports `Stopped`, every enclosing chain passes it
/// up without consulting the stop hook again.
pub(crate) enum StepFlow {
    Continue(State),
    Stopped(State),
}

/// Run the chain ending at `node`: first the predecessor chain, then this
/// node's own step. Errors abort the remaining chain and surface verbatim.
#[async_recursion]
pub(crate) async fn run_chain(
    node: &Node,
    env: &RunEnv,
    initial: &State,
) -> Result<StepFlow, FlowError> {
    match node {
        Node::Root => Ok(StepFlow::Continue(initial.clone())),
        Node::Chain { previous, step } => {
            let state = match run_chain(previous, env, initial).await? {
                StepFlow::Stopped(state) => return Ok(StepFlow::Stopped(state)),
                StepFlow::Continue(state) => state,
            };

            if env.hooks.should_stop(&state, &env.options) {
                debug!(step = step.name(), "stop requested; returning partial state");
                return Ok(StepFlow::Stopped(state));
            }

            perform_step(step, env, state).await
        }
    }
}

async fn perform_step(step: &Step, env: &RunEnv, state: State) -> Result<StepFlow, FlowError> {
    let ctx = Context::new(
        Arc::clone(&env.session),
        Arc::clone(&env.options),
        state,
        Arc::clone(&env.hooks),
    );
    debug!(step = step.name(), "performing step");

    match step {
        Step::Act(action) => {
            action.perform(&ctx).await?;
            Ok(StepFlow::Continue(ctx.state))
        }

        Step::Generate { key, produce } => {
            let value = produce(ctx.clone()).await?;
            Ok(StepFlow::Continue(ctx.state.with(key.clone(), value)))
        }

        Step::Evaluate { evaluate } => {
            let produced = evaluate(ctx.clone()).await?;
            // Union keeps earlier keys alive even if the replacement
            // object omitted them; replacement values win on collision.
            Ok(StepFlow::Continue(ctx.state.union(produced)))
        }

        Step::AskIfNeeded {
            key,
            prompt,
            normalize,
        } => {
            if ctx.state.contains(key) {
                debug!(key, "state already has a value; not asking");
                return Ok(StepFlow::Continue(ctx.state));
            }

            let answer = loop {
                match ctx.hooks.ask(prompt).await {
                    Some(answer) => break answer,
                    None => {
                        ctx.hooks
                            .warning(&format!("no answer for '{key}'; asking again"));
                        tokio::time::sleep(ASK_RETRY_PAUSE).await;
                    }
                }
            };
            let answer = match normalize {
                Some(normalize) => normalize(answer),
                None => answer,
            };
            Ok(StepFlow::Continue(ctx.state.with(key.clone(), answer)))
        }

        Step::Branch {
            check,
            if_true,
            if_false,
        } => {
            let take = check(ctx.clone()).await?;
            debug!(take, "branch decided");

            let arm = if take { Some(if_true) } else { if_false.as_ref() };
            match arm {
                // No false arm: the branch is a pass-through.
                None => Ok(StepFlow::Continue(ctx.state)),
                Some(factory) => {
                    let sub = factory(Flow::new());
                    run_chain(&sub.node, env, &ctx.state).await
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use async_trait::async_trait;
    use journey_actions::ActionError;
    use journey_core::{Hooks, Options, PageEvent, Session, SessionError, State, UploadFile};
    use serde_json::{json, Value};
    use tokio::sync::broadcast;
    use url::Url;

    use crate::errors::FlowError;
    use crate::flow::Flow;
    use crate::outcome::RunOutcome;

    /// Minimal in-memory session; flow tests mostly exercise state
    /// transforms, so this only records interactions and serves a URL.
    struct ScriptedSession {
        ops: Mutex<Vec<String>>,
        url: Mutex<Url>,
        events: broadcast::Sender<PageEvent>,
    }

    impl ScriptedSession {
        fn new() -> Self {
            let (events, _) = broadcast::channel(16);
            Self {
                ops: Mutex::new(Vec::new()),
                url: Mutex::new(Url::parse("https://qa.example.test/").unwrap()),
                events,
            }
        }

        fn at(url: &str) -> Self {
            let session = Self::new();
            *session.url.lock().unwrap() = Url::parse(url).unwrap();
            session
        }

        fn ops(&self) -> Vec<String> {
            self.ops.lock().unwrap().clone()
        }

        fn record(&self, op: String) {
            self.ops.lock().unwrap().push(op);
        }
    }

    #[async_trait]
    impl Session for ScriptedSession {
        async fn navigate(&self, url: &Url) -> Result<(), SessionError> {
            self.record(format!("navigate {url}"));
            Ok(())
        }

        async fn click(&self, selector: &str) -> Result<(), SessionError> {
            self.record(format!("click {selector}"));
            Ok(())
        }

        async fn type_text(&self, selector: &str, text: &str) -> Result<(), SessionError> {
            self.record(format!("type {selector} {text}"));
            Ok(())
        }

        async fn select(&self, selector: &str, value: &str) -> Result<(), SessionError> {
            self.record(format!("select {selector} {value}"));
            Ok(())
        }

        async fn upload(&self, selector: &str, file: &UploadFile) -> Result<(), SessionError> {
            self.record(format!("upload {selector} {}", file.name));
            Ok(())
        }

        async fn evaluate_script(
            &self,
            _expression: &str,
            _args: &[Value],
        ) -> Result<Value, SessionError> {
            Ok(Value::Null)
        }

        async fn current_url(&self) -> Result<Url, SessionError> {
            Ok(self.url.lock().unwrap().clone())
        }

        fn events(&self) -> broadcast::Receiver<PageEvent> {
            self.events.subscribe()
        }

        async fn wait_for_navigation(&self, timeout: Duration) -> Result<bool, SessionError> {
            tokio::time::sleep(timeout).await;
            Ok(false)
        }
    }

    /// Stops once the named checkpoint key appears in state; counts how
    /// often it is consulted.
    struct StopAtCheckpoint {
        key: &'static str,
        consulted: AtomicUsize,
    }

    impl StopAtCheckpoint {
        fn new(key: &'static str) -> Self {
            Self {
                key,
                consulted: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Hooks for StopAtCheckpoint {
        async fn ask(&self, _prompt: &str) -> Option<String> {
            None
        }

        fn should_stop(&self, state: &State, _options: &Options) -> bool {
            self.consulted.fetch_add(1, Ordering::SeqCst);
            state.contains(self.key)
        }

        fn warning(&self, _message: &str) {}

        fn info(&self, _message: &str) {}
    }

    /// Answers `None` a fixed number of times before giving the answer.
    struct ReluctantAnswers {
        misses_left: AtomicUsize,
        answer: &'static str,
        prompts: Mutex<Vec<String>>,
    }

    impl ReluctantAnswers {
        fn new(misses: usize, answer: &'static str) -> Self {
            Self {
                misses_left: AtomicUsize::new(misses),
                answer,
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Hooks for ReluctantAnswers {
        async fn ask(&self, prompt: &str) -> Option<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            if self
                .misses_left
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
            {
                return None;
            }
            Some(self.answer.to_string())
        }

        fn should_stop(&self, _state: &State, _options: &Options) -> bool {
            false
        }

        fn warning(&self, _message: &str) {}

        fn info(&self, _message: &str) {}
    }

    fn session() -> Arc<ScriptedSession> {
        Arc::new(ScriptedSession::new())
    }

    #[tokio::test]
    async fn output_state_covers_the_input_state() {
        let initial = State::new().with("tenant", "qa-7");
        let flow = Flow::new()
            .generate("username", |_ctx| async move { Ok(json!("qa-user-1")) })
            .generate("password", |_ctx| async move { Ok(json!("hunter2!")) });

        let out = flow.run(session(), initial.clone(), Options::new()).await.unwrap();
        assert!(out.covers(&initial));
        assert_eq!(out.get_str("username"), Some("qa-user-1"));
        assert_eq!(out.get_str("tenant"), Some("qa-7"));
    }

    #[tokio::test]
    async fn generate_overwrites_and_distinct_keys_coexist() {
        let flow = Flow::new()
            .generate("code", |_ctx| async move { Ok(json!("111-111")) })
            .generate("email", |_ctx| async move { Ok(json!("a@b.test")) })
            .generate("code", |_ctx| async move { Ok(json!("222-222")) });

        let out = flow
            .run(session(), State::new(), Options::new())
            .await
            .unwrap();
        assert_eq!(out.get_str("code"), Some("222-222"));
        assert_eq!(out.get_str("email"), Some("a@b.test"));
    }

    #[tokio::test]
    async fn evaluate_merges_without_dropping_earlier_keys() {
        let flow = Flow::new()
            .generate("username", |_ctx| async move { Ok(json!("ada")) })
            .evaluate(|_ctx| async move {
                // Scrapes several values in one page inspection and does
                // not mention "username" at all.
                Ok(State::new()
                    .with("backup_codes", json!(["a1", "b2"]))
                    .with("recovery_email", "rec@b.test"))
            });

        let out = flow
            .run(session(), State::new(), Options::new())
            .await
            .unwrap();
        assert_eq!(out.get_str("username"), Some("ada"));
        assert_eq!(out.get_str("recovery_email"), Some("rec@b.test"));
    }

    #[tokio::test]
    async fn truthy_branch_runs_only_the_true_arm() {
        let flow = Flow::new().branch(
            |_ctx| async move { Ok(true) },
            |t| t.generate("took", |_ctx| async move { Ok(json!("true-arm")) }),
            |f| f.generate("took", |_ctx| async move { Ok(json!("false-arm")) }),
        );

        let out = flow
            .run(session(), State::new(), Options::new())
            .await
            .unwrap();
        assert_eq!(out.get_str("took"), Some("true-arm"));
    }

    #[tokio::test]
    async fn falsy_when_is_a_pass_through() {
        let initial = State::new().with("seed", 1);
        let flow = Flow::new().when(
            |_ctx| async move { Ok(false) },
            |t| t.generate("extra", |_ctx| async move { Ok(json!(true)) }),
        );

        let out = flow
            .run(session(), initial.clone(), Options::new())
            .await
            .unwrap();
        assert_eq!(out, initial);
    }

    #[tokio::test]
    async fn branch_check_sees_the_accumulated_state() {
        let flow = Flow::new()
            .generate("variant", |_ctx| async move { Ok(json!("legacy")) })
            .branch(
                |ctx| async move { Ok(ctx.state.get_str("variant") == Some("legacy")) },
                |t| t.click("#legacy-next"),
                |f| f.click("#next"),
            );

        let session = session();
        flow.run(session.clone(), State::new(), Options::new())
            .await
            .unwrap();
        assert_eq!(session.ops(), vec!["click #legacy-next"]);
    }

    #[tokio::test]
    async fn stop_before_step_n_keeps_the_state_after_step_n_minus_one() {
        let flow = Flow::new()
            .generate("account", |_ctx| async move { Ok(json!("acct-1")) })
            .generate("verified", |_ctx| async move { Ok(json!(true)) })
            .generate("never_built", |_ctx| async move { Ok(json!(true)) });

        let hooks = Arc::new(StopAtCheckpoint::new("verified"));
        let outcome = flow
            .run_with_hooks(session(), State::new(), Options::new(), hooks)
            .await
            .unwrap();

        match outcome {
            RunOutcome::Partial(state) => {
                assert!(state.contains("account"));
                assert!(state.contains("verified"));
                assert!(!state.contains("never_built"));
            }
            RunOutcome::Completed(_) => panic!("expected a partial outcome"),
        }
    }

    #[tokio::test]
    async fn partial_from_a_sub_pipeline_propagates_without_reconsulting_the_hook() {
        let flow = Flow::new()
            .generate("account", |_ctx| async move { Ok(json!("acct-1")) })
            .when(
                |_ctx| async move { Ok(true) },
                |t| {
                    t.generate("checkpoint", |_ctx| async move { Ok(json!(true)) })
                        .generate("inner_tail", |_ctx| async move { Ok(json!(true)) })
                },
            )
            .generate("outer_tail", |_ctx| async move { Ok(json!(true)) });

        let hooks = Arc::new(StopAtCheckpoint::new("checkpoint"));
        let outcome = flow
            .run_with_hooks(session(), State::new(), Options::new(), hooks.clone())
            .await
            .unwrap();

        let state = match outcome {
            RunOutcome::Partial(state) => state,
            RunOutcome::Completed(_) => panic!("expected a partial outcome"),
        };
        assert!(state.contains("checkpoint"));
        assert!(!state.contains("inner_tail"));
        assert!(!state.contains("outer_tail"));

        // Consulted before: account, the branch step, the two inner steps.
        // Never again once the sub-pipeline reported the stop.
        assert_eq!(hooks.consulted.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn a_fresh_run_restarts_from_the_first_step() {
        let executions = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&executions);
        let flow = Flow::new()
            .generate("checkpoint", |_ctx| async move { Ok(json!(true)) })
            .generate("n", move |_ctx| {
                let counter = Arc::clone(&counter);
                async move { Ok(json!(counter.fetch_add(1, Ordering::SeqCst) + 1)) }
            });

        let stopping = Arc::new(StopAtCheckpoint::new("checkpoint"));
        let outcome = flow
            .run_with_hooks(session(), State::new(), Options::new(), stopping)
            .await
            .unwrap();
        assert!(!outcome.is_completed());
        assert_eq!(executions.load(Ordering::SeqCst), 0);

        // No resumption state exists; a new run re-executes from step one.
        let out = flow
            .run(session(), State::new(), Options::new())
            .await
            .unwrap();
        assert_eq!(out.get("n"), Some(&json!(1)));
        assert_eq!(executions.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn ask_if_needed_skips_when_the_key_is_seeded() {
        let flow = Flow::new().ask_if_needed("one_time_code", "Enter the emailed code");
        let hooks = Arc::new(ReluctantAnswers::new(0, "should-not-be-used"));

        let outcome = flow
            .run_with_hooks(
                session(),
                State::new().with("one_time_code", "123-456"),
                Options::new(),
                hooks.clone(),
            )
            .await
            .unwrap();

        assert_eq!(outcome.state().get_str("one_time_code"), Some("123-456"));
        assert!(hooks.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn ask_if_needed_reprompts_until_answered_and_normalizes() {
        let flow = Flow::new().ask_if_needed_normalized(
            "one_time_code",
            "Enter the emailed code",
            |answer| answer.trim().to_string(),
        );
        let hooks = Arc::new(ReluctantAnswers::new(2, "  987-654  "));

        let outcome = flow
            .run_with_hooks(session(), State::new(), Options::new(), hooks.clone())
            .await
            .unwrap();

        assert_eq!(outcome.state().get_str("one_time_code"), Some("987-654"));
        assert_eq!(hooks.prompts.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn then_splices_see_earlier_state() {
        fn enter_code(flow: Flow) -> Flow {
            flow.type_text("#code", journey_actions::Resolver::from_state("code"))
        }

        let flow = Flow::new()
            .generate("code", |_ctx| async move { Ok(json!("314-159")) })
            .then(enter_code);

        let session = session();
        flow.run(session.clone(), State::new(), Options::new())
            .await
            .unwrap();
        assert_eq!(session.ops().last().unwrap(), "type #code 314-159");
    }

    #[tokio::test]
    async fn expectation_failures_surface_verbatim() {
        let session = Arc::new(ScriptedSession::at("https://qa.example.test/wrong"));
        let options =
            Options::new().with_base_url(Url::parse("https://qa.example.test").unwrap());
        let flow = Flow::new().expect_url("/welcome");

        let err = flow.run(session, State::new(), options).await.unwrap_err();
        assert!(matches!(
            err,
            FlowError::Action(ActionError::ExpectationFailed { .. })
        ));
    }

    #[tokio::test]
    async fn a_failing_step_aborts_the_remaining_chain() {
        let session = Arc::new(ScriptedSession::at("https://qa.example.test/wrong"));
        let options =
            Options::new().with_base_url(Url::parse("https://qa.example.test").unwrap());
        let flow = Flow::new().expect_url("/welcome").click("#never");

        let err = flow
            .run(session.clone(), State::new(), options)
            .await
            .unwrap_err();
        assert!(matches!(err, FlowError::Action(_)));
        assert!(session.ops().is_empty());
    }

    #[tokio::test]
    async fn a_flow_value_is_reusable_across_runs() {
        let shared = Flow::new().generate("stamp", |_ctx| async move { Ok(json!("fixed")) });

        // Same immutable flow, two independent contexts.
        let first = shared
            .run(session(), State::new().with("run", 1), Options::new())
            .await
            .unwrap();
        let second = shared
            .run(session(), State::new().with("run", 2), Options::new())
            .await
            .unwrap();

        assert_eq!(first.get("run"), Some(&json!(1)));
        assert_eq!(second.get("run"), Some(&json!(2)));
        assert_eq!(first.get_str("stamp"), second.get_str("stamp"));
    }

    #[tokio::test]
    async fn deriving_from_a_shared_prefix_leaves_the_prefix_intact() {
        let prefix = Flow::new().generate("base", |_ctx| async move { Ok(json!(true)) });
        let with_extra = prefix
            .clone()
            .generate("extra", |_ctx| async move { Ok(json!(true)) });

        assert_eq!(prefix.len(), 1);
        assert_eq!(with_extra.len(), 2);

        let out = prefix
            .run(session(), State::new(), Options::new())
            .await
            .unwrap();
        assert!(!out.contains("extra"));
    }
}
