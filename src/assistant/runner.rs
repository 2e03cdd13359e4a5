//! Assistant event loop: voice in, kitchen actions, speech out.
//!
//! [`Assistant`] owns every stateful component and mutates them from a single
//! tokio task, so nothing needs locking except the published
//! [`SharedState`] snapshot.
//!
//! # Loop
//!
//! ```text
//! tokio::select! (biased)
//!   ├─ SessionOutput   → final transcript → interpret → Dispatcher → speak
//!   │                  → fatal error      → error toast
//!   ├─ AppEvent        → mic toggle/reset, native events, UI actions,
//!   │                    search / recipe results from spawned tasks
//!   ├─ session deadline → VoiceInputController::fire_session_timer
//!   ├─ delayed line     → first step, 3 s after the recipe intro
//!   └─ 1 s tick         → CountdownTimer::tick → announcements
//! ```
//!
//! Recipe searches and lookups run on spawned tasks that report back as
//! [`AppEvent::SearchFinished`] / [`AppEvent::RecipeLoaded`]. Their failures
//! become a spoken line plus an error toast; they never end the loop.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};

use crate::command::{interpret, responses, Dispatcher, FollowUp, Intent};
use crate::config::{language_name, AppConfig};
use crate::controller::{MicrophoneProbe, SessionOutput, ToggleOutcome, VoiceInputController};
use crate::kitchen::Kitchen;
use crate::recipe::{Recipe, RecipeApi, RecipeDetail, RecipeError};
use crate::speech::{NativeEvent, RecognitionSession, SpeechCapability, SynthesisChannel, UtteranceId};

use super::state::{SharedState, Toast};

const MIC_REQUIRED: &str = "Microphone access is required for voice commands";
const START_FAILED: &str = "Failed to start voice recognition. Please try again.";
const RESET_DONE: &str = "Voice recognition reset";

// ---------------------------------------------------------------------------
// AppEvent
// ---------------------------------------------------------------------------

/// Everything that can happen to the assistant from outside the loop.
#[derive(Debug)]
pub enum AppEvent {
    /// The microphone button.
    ToggleMic,
    /// The reset button on the error affordance.
    ResetMic,
    /// A callback from the native recognizer.
    Recognizer(NativeEvent),
    /// The synthesizer finished an utterance.
    SpeechEnded(UtteranceId),
    /// An ingredient typed instead of spoken.
    TypedIngredient(String),
    RemoveIngredient(usize),
    /// Fetch and start cooking the recipe with this id.
    StartCooking(u64),
    FinishRecipe,
    TimerAddMinute,
    TimerTogglePause,
    TimerCancel,
    ChangeLanguage(String),
    /// Free-text recipe search, independent of the ingredient list.
    SearchQuery(String),
    SearchFinished(Result<Vec<Recipe>, RecipeError>),
    RecipeLoaded(Result<RecipeDetail, RecipeError>),
    Shutdown,
}

/// A line to speak once `due` passes.
struct DelayedLine {
    due: Instant,
    text: String,
}

// ---------------------------------------------------------------------------
// Assistant
// ---------------------------------------------------------------------------

pub struct Assistant {
    state: SharedState,
    config: AppConfig,
    controller: VoiceInputController,
    outputs: mpsc::UnboundedReceiver<SessionOutput>,
    synthesis: SynthesisChannel,
    kitchen: Kitchen,
    recipes: Arc<dyn RecipeApi>,
    events_tx: mpsc::Sender<AppEvent>,
    delayed: Option<DelayedLine>,
    toast: Option<Toast>,
    toast_seq: u64,
}

impl Assistant {
    /// Build the assistant around the host's speech capability.
    ///
    /// `events_tx` is the sending half of the channel later passed to
    /// [`run`](Self::run); spawned fetches report back through it.
    pub fn new(
        state: SharedState,
        config: AppConfig,
        mut capability: Box<dyn SpeechCapability>,
        probe: Box<dyn MicrophoneProbe>,
        recipes: Arc<dyn RecipeApi>,
        events_tx: mpsc::Sender<AppEvent>,
    ) -> Self {
        let synthesizer = capability.create_synthesizer();
        let session = RecognitionSession::new(capability, &config.speech);
        let (output_tx, outputs) = mpsc::unbounded_channel();
        let controller = VoiceInputController::new(session, probe, output_tx, &config.controller);

        Self {
            state,
            synthesis: SynthesisChannel::new(synthesizer, config.synthesis.clone()),
            kitchen: Kitchen::new(&config.cooking),
            controller,
            outputs,
            recipes,
            events_tx,
            delayed: None,
            toast: None,
            toast_seq: 0,
            config,
        }
    }

    // -----------------------------------------------------------------------
    // Main async loop
    // -----------------------------------------------------------------------

    /// Run until [`AppEvent::Shutdown`] arrives or every sender is gone.
    pub async fn run(mut self, mut events: mpsc::Receiver<AppEvent>) {
        let mut ticker = tokio::time::interval(Duration::from_secs(1));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        self.publish();

        loop {
            let session_deadline = self.controller.pending_deadline();
            let delayed_deadline = self.delayed.as_ref().map(|d| d.due);
            let was_counting = self.kitchen.timer.is_counting();

            tokio::select! {
                biased;

                Some(output) = self.outputs.recv() => self.handle_output(output),

                event = events.recv() => match event {
                    Some(AppEvent::Shutdown) | None => break,
                    Some(event) => self.handle_event(event),
                },

                _ = sleep_until(session_deadline) => self.on_session_timer(),

                _ = sleep_until(delayed_deadline) => self.speak_delayed(),

                _ = ticker.tick(), if was_counting => self.on_tick(),
            }

            // A countdown that just started gets a full first second.
            if self.kitchen.timer.is_counting() && !was_counting {
                ticker.reset();
            }
            self.publish();
        }

        self.controller.stop_listening();
        self.synthesis.cancel();
        self.publish();
        log::info!("assistant: event loop stopped");
    }

    // -----------------------------------------------------------------------
    // Event handlers
    // -----------------------------------------------------------------------

    fn handle_output(&mut self, output: SessionOutput) {
        match output {
            SessionOutput::Transcript(transcript) => {
                if let Some(text) = self.controller.on_transcript(transcript) {
                    self.on_command(&text);
                }
            }
            SessionOutput::Error(error) => {
                self.controller.on_session_error(&error);
                if error.is_fatal() {
                    self.show_toast(Toast::error(error.user_message()));
                }
            }
        }
    }

    fn on_command(&mut self, text: &str) {
        let intent = interpret(text);
        // Navigating supersedes the first step still waiting to be read.
        if matches!(
            intent,
            Intent::NextStep | Intent::PreviousStep | Intent::RepeatStep
        ) {
            self.delayed = None;
        }
        let outcome = Dispatcher::dispatch(&intent, &mut self.kitchen);

        if let Some(line) = outcome.speech {
            self.speak(&line);
        }
        if let Some(FollowUp::Search(ingredients)) = outcome.follow_up {
            self.spawn_search(ingredients);
        }
    }

    pub(crate) fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::ToggleMic => {
                let outcome = self.controller.toggle_listening();
                self.on_toggle(outcome);
            }
            AppEvent::ResetMic => self.controller.reset_recognition(),
            AppEvent::Recognizer(native) => self.controller.handle_native(native),
            AppEvent::SpeechEnded(id) => self.synthesis.handle_end(id),
            AppEvent::TypedIngredient(name) => {
                let name = name.trim();
                if !name.is_empty() {
                    self.kitchen.ingredients.add(name);
                    self.show_toast(Toast::success(format!("Added {name} to your ingredients!")));
                }
            }
            AppEvent::RemoveIngredient(index) => {
                if let Some(name) = self.kitchen.ingredients.remove(index) {
                    log::debug!("assistant: removed ingredient '{name}'");
                }
            }
            AppEvent::StartCooking(id) => self.spawn_recipe_lookup(id),
            AppEvent::FinishRecipe => {
                if self.kitchen.cooking.finish() {
                    self.kitchen.timer.cancel();
                    self.delayed = None;
                    self.speak(responses::RECIPE_FINISHED);
                }
            }
            AppEvent::TimerAddMinute => self.kitchen.timer.add_minute(),
            AppEvent::TimerTogglePause => {
                let line = if self.kitchen.timer.toggle_pause() {
                    responses::TIMER_PAUSED
                } else {
                    responses::TIMER_RESUMED
                };
                self.speak(line);
            }
            AppEvent::TimerCancel => {
                if self.kitchen.timer.cancel() {
                    self.speak(responses::TIMER_CANCELLED);
                }
            }
            AppEvent::ChangeLanguage(tag) => self.change_language(&tag),
            AppEvent::SearchQuery(query) => {
                let query = query.trim();
                if !query.is_empty() {
                    self.speak(&responses::searching(query));
                    self.spawn_query_search(query.to_string());
                }
            }
            AppEvent::SearchFinished(result) => self.on_search_finished(result),
            AppEvent::RecipeLoaded(result) => self.on_recipe_loaded(result),
            AppEvent::Shutdown => {}
        }
    }

    fn on_toggle(&mut self, outcome: ToggleOutcome) {
        match outcome {
            ToggleOutcome::Started => self.speak(responses::LISTENING),
            ToggleOutcome::PermissionDenied(reason) => {
                log::warn!("assistant: cannot listen: {reason}");
                self.show_toast(Toast::error(MIC_REQUIRED));
            }
            ToggleOutcome::StartRejected => self.show_toast(Toast::error(START_FAILED)),
            ToggleOutcome::Debounced | ToggleOutcome::ErrorCleared | ToggleOutcome::Stopped => {}
        }
    }

    fn on_session_timer(&mut self) {
        match self.controller.fire_session_timer() {
            Some(ToggleOutcome::Started) => {
                self.show_toast(Toast::success(RESET_DONE));
                self.speak(responses::LISTENING);
            }
            Some(other) => self.on_toggle(other),
            None => {}
        }
    }

    fn on_tick(&mut self) {
        if let Some(announcement) = self.kitchen.timer.tick() {
            self.speak(announcement.text());
        }
    }

    fn speak_delayed(&mut self) {
        if let Some(line) = self.delayed.take() {
            self.speak(&line.text);
        }
    }

    fn change_language(&mut self, tag: &str) {
        match language_name(tag) {
            Some(name) => {
                self.controller.change_language(tag);
                self.synthesis.set_language(tag);
                self.speak(&responses::language_changed(name));
            }
            None => {
                log::warn!("assistant: unsupported language '{tag}'");
                self.show_toast(Toast::error(format!("Unsupported language: {tag}")));
            }
        }
    }

    // -----------------------------------------------------------------------
    // Recipe API
    // -----------------------------------------------------------------------

    fn spawn_search(&mut self, ingredients: Vec<String>) {
        self.kitchen.loading = true;
        let api = Arc::clone(&self.recipes);
        let tx = self.events_tx.clone();
        let count = self.config.recipe_api.result_count;

        tokio::spawn(async move {
            let result = api.search_by_ingredients(&ingredients, count).await;
            if tx.send(AppEvent::SearchFinished(result)).await.is_err() {
                log::debug!("assistant: search finished after shutdown");
            }
        });
    }

    fn spawn_query_search(&mut self, query: String) {
        self.kitchen.loading = true;
        let api = Arc::clone(&self.recipes);
        let tx = self.events_tx.clone();
        let count = self.config.recipe_api.result_count;

        tokio::spawn(async move {
            let result = api.search_by_query(&query, count).await;
            if tx.send(AppEvent::SearchFinished(result)).await.is_err() {
                log::debug!("assistant: query search finished after shutdown");
            }
        });
    }

    fn spawn_recipe_lookup(&mut self, id: u64) {
        self.kitchen.loading = true;
        let api = Arc::clone(&self.recipes);
        let tx = self.events_tx.clone();

        tokio::spawn(async move {
            let result = api.recipe_details(id).await;
            if tx.send(AppEvent::RecipeLoaded(result)).await.is_err() {
                log::debug!("assistant: recipe lookup finished after shutdown");
            }
        });
    }

    fn on_search_finished(&mut self, result: Result<Vec<Recipe>, RecipeError>) {
        self.kitchen.loading = false;
        match result {
            Ok(results) => {
                log::info!("assistant: search returned {} recipes", results.len());
                self.speak(&responses::search_results(&results));
                self.kitchen.search_results = results;
            }
            Err(e) => {
                log::error!("assistant: recipe search failed: {e}");
                self.speak(&responses::search_failed(&e));
                self.show_toast(Toast::error(e.user_message()));
            }
        }
    }

    fn on_recipe_loaded(&mut self, result: Result<RecipeDetail, RecipeError>) {
        self.kitchen.loading = false;
        match result {
            Ok(detail) => {
                self.speak(&responses::recipe_intro(&detail));
                self.delayed = detail.steps().first().map(|first| DelayedLine {
                    due: Instant::now() + Duration::from_millis(self.config.cooking.first_step_delay_ms),
                    text: responses::step(1, &first.step),
                });
                self.kitchen.cooking.load(detail);
            }
            Err(e) => {
                log::error!("assistant: recipe lookup failed: {e}");
                self.speak(responses::RECIPE_LOAD_FAILED);
                self.show_toast(Toast::error(e.user_message()));
            }
        }
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn speak(&mut self, text: &str) {
        self.synthesis.speak(text, None);
    }

    fn show_toast(&mut self, toast: Toast) {
        self.toast = Some(toast);
        self.toast_seq += 1;
    }

    fn publish(&self) {
        let mut st = self.state.lock().unwrap();
        st.listening = self.controller.is_listening();
        st.mic_status = self.controller.mic_status();
        st.interim_transcript = self.controller.interim_transcript().to_string();
        st.last_transcript = self.controller.last_transcript().to_string();

        st.ingredients = self.kitchen.ingredients.as_slice().to_vec();
        st.search_results.clone_from(&self.kitchen.search_results);
        st.loading = self.kitchen.loading;

        let cooking = &self.kitchen.cooking;
        st.recipe_title = cooking.recipe().map(|r| r.title.clone());
        st.step_index = cooking.current_step_index();
        st.step_count = cooking.step_count();
        st.step_progress = cooking.progress_percent();

        let timer = &self.kitchen.timer;
        st.timer_remaining = timer.is_running().then(|| timer.remaining());
        st.timer_paused = timer.is_paused();
        st.timer_initial = timer.initial();
        st.timer_progress = timer.progress_percent();

        st.last_spoken = self.synthesis.last_text().map(str::to_string);
        st.toast.clone_from(&self.toast);
        st.toast_seq = self.toast_seq;
        st.language = self.controller.session().language().to_string();
    }
}

/// Sleep until `deadline`, or forever when there is none.
async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::assistant::state::{new_shared_state, ToastKind};
    use crate::controller::MockProbe;
    use crate::recipe::{InstructionBlock, MockRecipeApi, Step, StepLength};
    use crate::speech::{MockCapability, SynthCall};

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    struct Harness {
        assistant: Assistant,
        events_rx: mpsc::Receiver<AppEvent>,
        events_tx: mpsc::Sender<AppEvent>,
        state: SharedState,
        spoken: Arc<Mutex<Vec<SynthCall>>>,
        api: Arc<MockRecipeApi>,
    }

    fn pasta() -> RecipeDetail {
        RecipeDetail {
            id: 42,
            title: "Garlic Pasta".into(),
            servings: 2,
            ready_in_minutes: 20,
            analyzed_instructions: vec![InstructionBlock {
                name: String::new(),
                steps: vec![
                    Step {
                        number: 1,
                        step: "Boil water.".into(),
                        ..Step::default()
                    },
                    Step {
                        number: 2,
                        step: "Cook pasta.".into(),
                        length: Some(StepLength {
                            number: 40,
                            unit: "seconds".into(),
                        }),
                        ..Step::default()
                    },
                ],
            }],
            ..RecipeDetail::default()
        }
    }

    fn harness_with(api: MockRecipeApi) -> Harness {
        let cap = MockCapability::supported();
        let spoken = Arc::clone(&cap.synth_log);
        let api = Arc::new(api);
        let config = AppConfig::default();
        let state = new_shared_state(&config);
        let (events_tx, events_rx) = mpsc::channel(16);

        let assistant = Assistant::new(
            Arc::clone(&state),
            config,
            Box::new(cap),
            Box::new(MockProbe::granted()),
            Arc::clone(&api) as Arc<dyn RecipeApi>,
            events_tx.clone(),
        );
        Harness {
            assistant,
            events_rx,
            events_tx,
            state,
            spoken,
            api,
        }
    }

    fn harness() -> Harness {
        harness_with(MockRecipeApi::new(Ok(Vec::new()), Ok(pasta())))
    }

    fn last_spoken(h: &Harness) -> Option<String> {
        h.spoken.lock().unwrap().iter().rev().find_map(|call| match call {
            SynthCall::Speak(_, text) => Some(text.clone()),
            SynthCall::Cancel => None,
        })
    }

    /// Start listening and confirm the native start.
    fn listen(h: &mut Harness) {
        h.assistant.handle_event(AppEvent::ToggleMic);
        h.assistant.handle_event(AppEvent::Recognizer(NativeEvent::Started));
    }

    /// Speak `text` as a final result and process the session output.
    fn hear(h: &mut Harness, text: &str) {
        h.assistant
            .handle_event(AppEvent::Recognizer(NativeEvent::final_result(text)));
        while let Ok(output) = h.assistant.outputs.try_recv() {
            h.assistant.handle_output(output);
        }
        h.assistant.publish();
    }

    // -----------------------------------------------------------------------
    // Voice commands
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn toggling_on_announces_listening() {
        let mut h = harness();
        h.assistant.handle_event(AppEvent::ToggleMic);
        assert_eq!(last_spoken(&h).as_deref(), Some("Listening for your command..."));
    }

    #[tokio::test]
    async fn spoken_ingredient_is_added_once() {
        let mut h = harness();
        listen(&mut h);

        hear(&mut h, "Add ingredient Chicken");
        hear(&mut h, "add chicken");

        assert_eq!(h.state.lock().unwrap().ingredients, vec!["chicken".to_string()]);
        assert_eq!(
            last_spoken(&h).as_deref(),
            Some("Added chicken to your ingredients.")
        );
    }

    #[tokio::test]
    async fn voice_search_reports_the_top_result() {
        let api = MockRecipeApi::new(
            Ok(vec![Recipe {
                id: 42,
                title: "Garlic Pasta".into(),
                ..Recipe::default()
            }]),
            Ok(pasta()),
        );
        let mut h = harness_with(api);
        listen(&mut h);
        hear(&mut h, "add garlic");
        hear(&mut h, "find recipes");

        assert_eq!(
            last_spoken(&h).as_deref(),
            Some("Searching for recipes with garlic.")
        );
        assert!(h.state.lock().unwrap().loading);

        let finished = h.events_rx.recv().await.expect("search result");
        h.assistant.handle_event(finished);
        h.assistant.publish();

        assert_eq!(
            last_spoken(&h).as_deref(),
            Some("I found 1 recipes using your ingredients. The top result is Garlic Pasta.")
        );
        let st = h.state.lock().unwrap();
        assert!(!st.loading);
        assert_eq!(st.search_results.len(), 1);
        assert_eq!(h.api.searched.lock().unwrap().as_slice(), &[vec!["garlic".to_string()]]);
    }

    #[tokio::test]
    async fn typed_query_searches_by_name() {
        let api = MockRecipeApi::new(
            Ok(vec![Recipe {
                id: 42,
                title: "Garlic Pasta".into(),
                ..Recipe::default()
            }]),
            Ok(pasta()),
        );
        let mut h = harness_with(api);
        h.assistant.handle_event(AppEvent::SearchQuery("  pasta ".into()));
        assert_eq!(last_spoken(&h).as_deref(), Some("Searching for recipes with pasta."));

        let finished = h.events_rx.recv().await.expect("search result");
        h.assistant.handle_event(finished);
        h.assistant.publish();

        assert_eq!(h.api.queries.lock().unwrap().as_slice(), &["pasta".to_string()]);
        assert!(h.api.searched.lock().unwrap().is_empty());
        assert_eq!(h.state.lock().unwrap().search_results.len(), 1);
    }

    #[tokio::test]
    async fn search_failure_is_spoken_and_toasted() {
        let mut h = harness_with(MockRecipeApi::new(Err(RecipeError::InvalidApiKey), Ok(pasta())));
        h.assistant.handle_event(AppEvent::TypedIngredient("rice".into()));
        listen(&mut h);
        hear(&mut h, "search");

        let finished = h.events_rx.recv().await.expect("search result");
        h.assistant.handle_event(finished);
        h.assistant.publish();

        assert_eq!(
            last_spoken(&h).as_deref(),
            Some("Invalid API key. Please check your Spoonacular API key in the settings.")
        );
        let st = h.state.lock().unwrap();
        assert_eq!(st.toast.as_ref().map(|t| t.kind), Some(ToastKind::Error));
    }

    // -----------------------------------------------------------------------
    // Cooking
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn starting_a_recipe_introduces_it_then_reads_step_one() {
        let mut h = harness();
        h.assistant.handle_event(AppEvent::StartCooking(42));
        let loaded = h.events_rx.recv().await.expect("recipe");
        h.assistant.handle_event(loaded);

        assert_eq!(
            last_spoken(&h).as_deref(),
            Some("Let's cook Garlic Pasta. This recipe serves 2 and takes about 20 minutes to prepare.")
        );
        assert!(h.assistant.delayed.is_some());

        h.assistant.speak_delayed();
        assert_eq!(last_spoken(&h).as_deref(), Some("Step 1: Boil water."));
    }

    #[tokio::test]
    async fn navigating_drops_the_pending_first_step() {
        let mut h = harness();
        h.assistant.handle_event(AppEvent::RecipeLoaded(Ok(pasta())));
        assert!(h.assistant.delayed.is_some());

        listen(&mut h);
        hear(&mut h, "next step");

        assert!(h.assistant.delayed.is_none());
        assert!(last_spoken(&h).is_some_and(|line| line.starts_with("Step 2: Cook pasta.")));

        let st = h.state.lock().unwrap();
        assert_eq!(st.step_progress, 100.0);
        assert_eq!(st.timer_initial, 40);
        assert_eq!(st.timer_progress, 100.0);
    }

    #[tokio::test]
    async fn failed_lookup_apologises() {
        let mut h = harness_with(MockRecipeApi::new(
            Ok(Vec::new()),
            Err(RecipeError::Network("timed out".into())),
        ));
        h.assistant.handle_event(AppEvent::StartCooking(7));
        let loaded = h.events_rx.recv().await.expect("recipe");
        h.assistant.handle_event(loaded);
        h.assistant.publish();

        assert_eq!(last_spoken(&h).as_deref(), Some(responses::RECIPE_LOAD_FAILED));
        assert!(h.state.lock().unwrap().recipe_title.is_none());
    }

    #[tokio::test]
    async fn finishing_unloads_and_congratulates() {
        let mut h = harness();
        h.assistant.handle_event(AppEvent::RecipeLoaded(Ok(pasta())));
        h.assistant.handle_event(AppEvent::FinishRecipe);
        h.assistant.publish();

        assert_eq!(last_spoken(&h).as_deref(), Some(responses::RECIPE_FINISHED));
        assert!(h.assistant.delayed.is_none());
        assert!(h.state.lock().unwrap().recipe_title.is_none());
    }

    #[tokio::test]
    async fn timer_buttons() {
        let mut h = harness();
        h.assistant.handle_event(AppEvent::TimerCancel);
        assert_eq!(last_spoken(&h), None, "nothing to cancel");

        h.assistant.kitchen.timer.start(30);
        h.assistant.handle_event(AppEvent::TimerTogglePause);
        assert_eq!(last_spoken(&h).as_deref(), Some("Timer paused"));
        h.assistant.handle_event(AppEvent::TimerAddMinute);
        assert_eq!(h.assistant.kitchen.timer.remaining(), 90);
        h.assistant.handle_event(AppEvent::TimerCancel);
        assert_eq!(last_spoken(&h).as_deref(), Some("Timer cancelled"));
    }

    #[tokio::test]
    async fn language_change_updates_both_engines() {
        let mut h = harness();
        h.assistant.handle_event(AppEvent::ChangeLanguage("fr-FR".into()));
        h.assistant.publish();

        assert_eq!(last_spoken(&h).as_deref(), Some("Language changed to Français"));
        assert_eq!(h.assistant.synthesis.language(), "fr-FR");
        assert_eq!(h.state.lock().unwrap().language, "fr-FR");

        h.assistant.handle_event(AppEvent::ChangeLanguage("xx-XX".into()));
        assert_eq!(h.assistant.synthesis.language(), "fr-FR");
    }

    // -----------------------------------------------------------------------
    // Loop
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn run_publishes_and_stops_on_shutdown() {
        let h = harness();
        let Harness {
            assistant,
            events_rx,
            events_tx,
            state,
            ..
        } = h;

        events_tx
            .send(AppEvent::TypedIngredient("Basil".into()))
            .await
            .unwrap();
        events_tx.send(AppEvent::Shutdown).await.unwrap();

        assistant.run(events_rx).await;

        let st = state.lock().unwrap();
        assert_eq!(st.ingredients, vec!["basil".to_string()]);
        assert_eq!(
            st.toast.as_ref().map(|t| t.message.as_str()),
            Some("Added Basil to your ingredients!")
        );
        assert_eq!(st.toast_seq, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn run_counts_down_and_announces() {
        let h = harness();
        let Harness {
            assistant,
            events_rx,
            events_tx,
            state,
            spoken,
            ..
        } = h;
        let handle = tokio::spawn(assistant.run(events_rx));

        for event in [
            AppEvent::ToggleMic,
            AppEvent::Recognizer(NativeEvent::Started),
            AppEvent::RecipeLoaded(Ok(pasta())),
            AppEvent::Recognizer(NativeEvent::final_result("next step")),
        ] {
            events_tx.send(event).await.unwrap();
        }

        tokio::time::sleep(Duration::from_millis(11_500)).await;
        assert_eq!(state.lock().unwrap().timer_remaining, Some(29));

        tokio::time::sleep(Duration::from_secs(30)).await;
        events_tx.send(AppEvent::Shutdown).await.unwrap();
        handle.await.unwrap();

        let lines: Vec<String> = spoken
            .lock()
            .unwrap()
            .iter()
            .filter_map(|call| match call {
                SynthCall::Speak(_, text) => Some(text.clone()),
                SynthCall::Cancel => None,
            })
            .collect();
        assert!(lines.contains(&"Step 2: Cook pasta. I'll set a timer for 40 seconds.".to_string()));
        assert!(lines.contains(&"Thirty seconds remaining.".to_string()));
        assert!(lines.contains(&"Ten seconds remaining.".to_string()));
        assert!(lines.contains(&"Time is up!".to_string()));
        assert_eq!(state.lock().unwrap().timer_remaining, None);
    }

    #[tokio::test(start_paused = true)]
    async fn run_resumes_listening_after_a_reset() {
        let h = harness();
        let Harness {
            assistant,
            events_rx,
            events_tx,
            state,
            ..
        } = h;
        let handle = tokio::spawn(assistant.run(events_rx));

        events_tx.send(AppEvent::ToggleMic).await.unwrap();
        events_tx
            .send(AppEvent::Recognizer(NativeEvent::Started))
            .await
            .unwrap();
        events_tx.send(AppEvent::ResetMic).await.unwrap();

        tokio::time::sleep(Duration::from_secs(1)).await;
        {
            let st = state.lock().unwrap();
            assert!(st.listening);
            assert_eq!(
                st.toast.as_ref().map(|t| t.message.as_str()),
                Some("Voice recognition reset")
            );
        }

        events_tx.send(AppEvent::Shutdown).await.unwrap();
        handle.await.unwrap();
        assert!(!state.lock().unwrap().listening);
    }
}
