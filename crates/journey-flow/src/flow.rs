//! The composable flow builder.

use std::future::Future;
use std::sync::Arc;

use journey_actions::{Action, ActionError, QuiescenceConfig, Resolver, UrlSet};
use journey_core::{Context, DefaultHooks, Hooks, Options, Session, State, UploadFile};
use serde_json::Value;
use tracing::info;
use url::Url;

use crate::engine::{self, RunEnv, StepFlow};
use crate::errors::FlowError;
use crate::outcome::RunOutcome;
use crate::step::Step;

/// An immutable, composable chain of steps with a `run` entry point.
///
/// Flows are built once (often as a module-level constant behind a
/// function) and never mutated: every builder method returns a new `Flow`
/// sharing its predecessor structurally, so embedding a flow in a branch
/// or splicing one with [`Flow::then`] copies nothing. A flow is stateless
/// and may be run many times, concurrently, against different contexts.
#[derive(Debug, Clone, Default)]
pub struct Flow {
    pub(crate) node: Arc<Node>,
}

/// Backward-linked chain: each node knows its predecessor and one step.
#[derive(Debug, Default)]
pub(crate) enum Node {
    #[default]
    Root,
    Chain {
        previous: Arc<Node>,
        step: Step,
    },
}

impl Flow {
    /// The empty pipeline.
    pub fn new() -> Self {
        Self::default()
    }

    fn derive(&self, step: Step) -> Flow {
        Flow {
            node: Arc::new(Node::Chain {
                previous: Arc::clone(&self.node),
                step,
            }),
        }
    }

    /// Append a prebuilt action; the escape hatch the named methods sit on.
    pub fn step(self, action: Action) -> Flow {
        self.derive(Step::Act(action))
    }

    pub fn navigate_to(self, url: impl Into<Resolver<String>>) -> Flow {
        self.step(Action::navigate(url))
    }

    pub fn click(self, selector: impl Into<Resolver<String>>) -> Flow {
        self.step(Action::click(selector))
    }

    pub fn type_text(
        self,
        selector: impl Into<Resolver<String>>,
        text: impl Into<Resolver<String>>,
    ) -> Flow {
        self.step(Action::type_text(selector, text))
    }

    pub fn select(
        self,
        selector: impl Into<Resolver<String>>,
        value: impl Into<Resolver<String>>,
    ) -> Flow {
        self.step(Action::select(selector, value))
    }

    /// Submit via the default `[type="submit"]` control and wait for the
    /// page to settle.
    pub fn submit(self) -> Flow {
        self.step(Action::submit(None, QuiescenceConfig::default()))
    }

    pub fn submit_via(self, selector: impl Into<Resolver<String>>) -> Flow {
        self.step(Action::submit(
            Some(selector.into()),
            QuiescenceConfig::default(),
        ))
    }

    pub fn submit_with(
        self,
        selector: impl Into<Resolver<String>>,
        quiescence: QuiescenceConfig,
    ) -> Flow {
        self.step(Action::submit(Some(selector.into()), quiescence))
    }

    pub fn upload(
        self,
        selector: impl Into<Resolver<String>>,
        file: impl Into<Resolver<UploadFile>>,
    ) -> Flow {
        self.step(Action::upload(selector, file))
    }

    /// Expect the page to sit at one of the given URLs (relative targets
    /// join the configured base; query and fragment are ignored).
    pub fn expect_url(self, expected: impl Into<Resolver<UrlSet>>) -> Flow {
        self.step(Action::expect_url(expected))
    }

    /// [`Flow::expect_url`] with caller-defined URL equivalence.
    pub fn expect_url_with<N>(self, expected: impl Into<Resolver<UrlSet>>, normalizer: N) -> Flow
    where
        N: Fn(&Url) -> Url + Send + Sync + 'static,
    {
        self.step(Action::expect_url_with(expected, normalizer))
    }

    pub fn assert_that<F, Fut>(self, description: impl Into<String>, check: F) -> Flow
    where
        F: Fn(Context) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<bool, ActionError>> + Send + 'static,
    {
        self.step(Action::assert_that(description, check))
    }

    /// Derive one named state value. If the key already exists the new
    /// value overwrites it; that is allowed and used intentionally.
    pub fn generate<F, Fut>(self, key: impl Into<String>, produce: F) -> Flow
    where
        F: Fn(Context) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, FlowError>> + Send + 'static,
    {
        self.derive(Step::Generate {
            key: key.into(),
            produce: Arc::new(move |ctx| Box::pin(produce(ctx))),
        })
    }

    /// Like [`Flow::generate`] but for a single page inspection yielding
    /// several values at once. The result is unioned over the current
    /// state, so keys can only be added or overwritten, never dropped.
    pub fn evaluate<F, Fut>(self, evaluate: F) -> Flow
    where
        F: Fn(Context) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<State, FlowError>> + Send + 'static,
    {
        self.derive(Step::Evaluate {
            evaluate: Arc::new(move |ctx| Box::pin(evaluate(ctx))),
        })
    }

    /// Fill `key` from the human if no earlier step (or the caller's
    /// initial state) provided it. Prompts until an answer arrives; this
    /// is the one step that can suspend indefinitely.
    pub fn ask_if_needed(self, key: impl Into<String>, prompt: impl Into<String>) -> Flow {
        self.derive(Step::AskIfNeeded {
            key: key.into(),
            prompt: prompt.into(),
            normalize: None,
        })
    }

    /// [`Flow::ask_if_needed`] with a normalizer applied to the answer
    /// before it enters state.
    pub fn ask_if_needed_normalized<N>(
        self,
        key: impl Into<String>,
        prompt: impl Into<String>,
        normalize: N,
    ) -> Flow
    where
        N: Fn(String) -> String + Send + Sync + 'static,
    {
        self.derive(Step::AskIfNeeded {
            key: key.into(),
            prompt: prompt.into(),
            normalize: Some(Arc::new(normalize)),
        })
    }

    /// Evaluate `check` at run time and execute whichever arm matches,
    /// adopting its output state. Each arm builds its sub-pipeline from a
    /// fresh empty flow.
    pub fn branch<C, Fut, T, E>(self, check: C, if_true: T, if_false: E) -> Flow
    where
        C: Fn(Context) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<bool, FlowError>> + Send + 'static,
        T: Fn(Flow) -> Flow + Send + Sync + 'static,
        E: Fn(Flow) -> Flow + Send + Sync + 'static,
    {
        self.derive(Step::Branch {
            check: Arc::new(move |ctx| Box::pin(check(ctx))),
            if_true: Arc::new(if_true),
            if_false: Some(Arc::new(if_false)),
        })
    }

    /// [`Flow::branch`] with a pass-through false arm.
    pub fn when<C, Fut, T>(self, check: C, if_true: T) -> Flow
    where
        C: Fn(Context) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<bool, FlowError>> + Send + 'static,
        T: Fn(Flow) -> Flow + Send + Sync + 'static,
    {
        self.derive(Step::Branch {
            check: Arc::new(move |ctx| Box::pin(check(ctx))),
            if_true: Arc::new(if_true),
            if_false: None,
        })
    }

    /// Splice a dependent sub-pipeline built on top of the current chain;
    /// the way recurring sequences (enter a one-time code, dismiss a
    /// consent wall) are factored into reusable functions.
    pub fn then(self, next: impl FnOnce(Flow) -> Flow) -> Flow {
        next(self)
    }

    /// Number of steps in the chain.
    pub fn len(&self) -> usize {
        let mut count = 0;
        let mut node = &self.node;
        while let Node::Chain { previous, .. } = node.as_ref() {
            count += 1;
            node = previous;
        }
        count
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Run to completion with default hooks: the full final state, or the
    /// first failing step's error.
    pub async fn run(
        &self,
        session: Arc<dyn Session>,
        initial: State,
        options: Options,
    ) -> Result<State, FlowError> {
        let outcome = self
            .run_with_hooks(session, initial, options, Arc::new(DefaultHooks))
            .await?;
        // DefaultHooks never requests a stop, so this is always Completed.
        Ok(outcome.into_state())
    }

    /// Run under caller-supplied hooks. A stop request surfaces as
    /// [`RunOutcome::Partial`], not an error.
    pub async fn run_with_hooks(
        &self,
        session: Arc<dyn Session>,
        initial: State,
        options: Options,
        hooks: Arc<dyn Hooks>,
    ) -> Result<RunOutcome, FlowError> {
        let env = RunEnv {
            session,
            options: Arc::new(options),
            hooks,
        };

        info!(steps = self.len(), "running flow");
        match engine::run_chain(&self.node, &env, &initial).await? {
            StepFlow::Continue(state) => Ok(RunOutcome::Completed(state)),
            StepFlow::Stopped(state) => Ok(RunOutcome::Partial(state)),
        }
    }
}
