use std::sync::{Arc, Mutex};

use futures::stream;
use tokio_test::{assert_err, assert_ok};

use groqchat::chat::{ChatSession, RoundState, SessionStore};
use groqchat::{
    CompletionRequest, CompletionService, Error, FragmentStream, Groq, KnownModel, Renderer,
    Result, Role, Turn, UsageCounters, registry,
};

/// A completion service that replays canned fragments.
#[derive(Clone, Default)]
struct ScriptedService {
    fragments: Vec<String>,
    fail_after_prefix: bool,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl ScriptedService {
    fn replying(fragments: &[&str]) -> Self {
        Self {
            fragments: fragments.iter().map(|f| f.to_string()).collect(),
            ..Self::default()
        }
    }

    fn failing_after(fragments: &[&str]) -> Self {
        Self {
            fail_after_prefix: true,
            ..Self::replying(fragments)
        }
    }

    fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl CompletionService for ScriptedService {
    async fn stream(&self, request: CompletionRequest) -> Result<FragmentStream> {
        self.requests.lock().unwrap().push(request);
        let mut items: Vec<Result<String>> = self.fragments.iter().cloned().map(Ok).collect();
        if self.fail_after_prefix {
            items.push(Err(Error::service_unavailable("upstream went away", None)));
        }
        Ok(Box::pin(stream::iter(items)))
    }
}

#[derive(Default)]
struct CollectingRenderer {
    output: String,
    errors: Vec<String>,
}

impl Renderer for CollectingRenderer {
    fn print_text(&mut self, text: &str) {
        self.output.push_str(text);
    }

    fn print_error(&mut self, error: &str) {
        self.errors.push(error.to_string());
    }

    fn print_info(&mut self, _: &str) {}

    fn finish_response(&mut self) {}
}

#[tokio::test]
async fn hello_round_trip() {
    let service = ScriptedService::replying(&["Hi", " there", "!"]);
    let mut session = ChatSession::new(service.clone());
    let mut renderer = CollectingRenderer::default();

    let turn = assert_ok!(session.submit("Hello", 32768, &mut renderer).await);

    assert_eq!(turn.content(), "Hi there!");
    assert_eq!(renderer.output, "Hi there!");
    assert_eq!(
        session.transcript(),
        &[Turn::user("Hello"), Turn::assistant("Hi there!")]
    );
    assert_eq!(session.usage().conversation_count, 1);
    assert_eq!(session.usage().total_tokens_used, 3);

    let requests = service.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].model, KnownModel::Llama33_70bVersatile);
    assert_eq!(requests[0].max_tokens, 32768);
    assert_eq!(requests[0].messages.len(), 1);
}

#[tokio::test]
async fn partial_failure_keeps_prefix() {
    let mut session = ChatSession::new(ScriptedService::failing_after(&["Partial"]));
    let mut renderer = CollectingRenderer::default();

    let err = assert_err!(session.submit("Hello", 32768, &mut renderer).await);

    assert!(err.is_service());
    assert_eq!(renderer.output, "Partial");
    assert_eq!(
        session.transcript(),
        &[Turn::user("Hello"), Turn::assistant("Partial")]
    );
    assert_eq!(session.usage(), UsageCounters::new(0, 1));
    assert_eq!(session.round_state(), RoundState::Failed);
}

#[tokio::test]
async fn transcript_alternates_roles() {
    let mut session = ChatSession::new(ScriptedService::replying(&["ok"]));
    let mut renderer = CollectingRenderer::default();

    for prompt in ["one", "two", "three"] {
        assert_ok!(session.submit(prompt, 1024, &mut renderer).await);
    }

    let transcript = session.transcript();
    assert_eq!(transcript.len(), 6);
    for (index, turn) in transcript.iter().enumerate() {
        let expected = if index % 2 == 0 {
            Role::User
        } else {
            Role::Assistant
        };
        assert_eq!(turn.role(), expected);
    }
    assert_eq!(
        transcript.len() as u64,
        2 * session.usage().conversation_count
    );
}

#[tokio::test]
async fn tokens_are_monotonic_until_reset() {
    let mut session = ChatSession::new(ScriptedService::replying(&["a few words back"]));
    let mut renderer = CollectingRenderer::default();

    let mut last = 0;
    for prompt in ["first question", "second", "and a third one"] {
        assert_ok!(session.submit(prompt, 1024, &mut renderer).await);
        let used = session.usage().total_tokens_used;
        assert!(used > last);
        last = used;
    }
    assert_eq!(last, 2 + 4 + 1 + 4 + 4 + 4);

    session.clear();
    assert_eq!(session.usage(), UsageCounters::default());
    assert!(session.transcript().is_empty());
    assert_eq!(session.model(), KnownModel::Llama33_70bVersatile);
}

#[tokio::test]
async fn model_switch_resets_only_on_change() {
    let mut session = ChatSession::new(ScriptedService::replying(&["ok"]));
    let mut renderer = CollectingRenderer::default();
    assert_ok!(session.submit("Hello", 1024, &mut renderer).await);

    assert!(!assert_ok!(session.select_model("llama-3.3-70b-versatile")));
    assert_eq!(session.transcript().len(), 2);

    let err = assert_err!(session.select_model("not-a-model"));
    assert!(err.is_unknown_model());
    assert_eq!(session.transcript().len(), 2);

    assert!(assert_ok!(session.select_model("llama3-8b-8192")));
    assert!(session.transcript().is_empty());
    assert_eq!(session.usage(), UsageCounters::default());
    assert_eq!(session.active_model().max_tokens, 8192);
}

#[tokio::test]
async fn bound_outside_range_is_rejected_before_mutation() {
    let service = ScriptedService::replying(&["never"]);
    let mut session = ChatSession::with_model(service.clone(), KnownModel::Llama3_70b8192);
    let mut renderer = CollectingRenderer::default();

    let err = assert_err!(session.submit("Hello", 16384, &mut renderer).await);
    assert!(err.is_invalid_bound());
    let err = assert_err!(session.submit("Hello", 256, &mut renderer).await);
    assert!(err.is_invalid_bound());

    assert!(session.transcript().is_empty());
    assert_eq!(session.usage(), UsageCounters::default());
    assert!(service.requests().is_empty());

    assert_ok!(session.submit("Hello", 8192, &mut renderer).await);
    assert_eq!(service.requests()[0].max_tokens, 8192);
}

#[tokio::test]
async fn sessions_are_isolated() {
    let mut first = ChatSession::new(ScriptedService::replying(&["one"]));
    let second = ChatSession::new(ScriptedService::replying(&["two"]));
    let mut renderer = CollectingRenderer::default();

    assert_ok!(first.submit("Hello", 1024, &mut renderer).await);

    assert_eq!(first.transcript().len(), 2);
    assert!(second.transcript().is_empty());
    assert_eq!(second.usage(), UsageCounters::default());
}

#[test]
fn registry_bounds_are_consistent() {
    for model in registry() {
        assert_eq!(model.bound_range(), (512, model.max_tokens));
        assert!(model.accepts_bound(model.default_bound()));
        assert_eq!(model.default_bound() % 512, 0);
        assert_eq!(model.id.parse::<KnownModel>().unwrap().descriptor(), model);
    }
}

#[test]
fn store_starts_on_default_model() {
    let store = SessionStore::default();
    assert_eq!(store.active_model().id, "llama-3.3-70b-versatile");
    assert_eq!(store.usage(), UsageCounters::default());
}

#[tokio::test]
async fn live_round_trip() {
    let Ok(api_key) = std::env::var("GROQ_API_KEY") else {
        println!("Skipping live_round_trip: GROQ_API_KEY not set");
        return;
    };

    let client = Groq::new(Some(api_key)).unwrap();
    let mut session = ChatSession::with_model(client, KnownModel::Llama31_8bInstant);
    let mut renderer = CollectingRenderer::default();

    let turn = session
        .submit("Reply with one short sentence.", 512, &mut renderer)
        .await
        .unwrap();
    assert!(!turn.content().is_empty());
    assert_eq!(renderer.output, turn.content());
    assert_eq!(session.usage().conversation_count, 1);
}
