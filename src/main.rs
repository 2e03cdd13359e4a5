//! Application entry point: console voice cooking assistant.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`AppConfig`] from disk (defaults on first run) and apply the
//!    API-key environment override.
//! 3. Create the [`tokio`] runtime (multi-thread, 2 workers).
//! 4. Build the recipe client, the console speech capability and the cpal
//!    microphone probe.
//! 5. Spawn the [`Assistant`] event loop plus the forwarders that turn
//!    console recognizer / synthesizer callbacks into [`AppEvent`]s.
//! 6. Spawn the status printer.
//! 7. Read stdin on a dedicated thread until `/quit` or EOF.
//!
//! Stdin stands in for the microphone: while listening, a typed line is a
//! final transcript; otherwise it is added as an ingredient.

use std::io::BufRead;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use voice_chef::{
    assistant::{new_shared_state, AppEvent, Assistant, SharedState, ToastKind},
    config::{AppConfig, SUPPORTED_LANGUAGES},
    controller::{CpalProbe, MicStatus},
    kitchen::format_clock,
    recipe::{RecipeApi, SpoonacularClient},
    speech::{ConsoleCapability, NativeEvent},
};

const USAGE: &str = "\
commands:
  /mic                    toggle the microphone
  /reset                  reset voice recognition
  /search <query>         search recipes by name or dish
  /cook <id>              start cooking a recipe from the results
  /finish                 finish the current recipe
  /remove <n>             remove the n-th ingredient
  /timer +1m|pause|cancel control the step timer
  /lang <tag>             change language (e.g. fr-FR)
  /quit                   exit
anything else is speech while the microphone is on, otherwise an ingredient";

// ---------------------------------------------------------------------------
// Stdin parsing
// ---------------------------------------------------------------------------

/// One parsed line of console input.
#[derive(Debug)]
enum Input {
    Event(AppEvent),
    Help,
    Quit,
    Empty,
    Invalid(String),
}

fn parse_line(line: &str, listening: bool) -> Input {
    let line = line.trim();
    if line.is_empty() {
        return Input::Empty;
    }

    let Some(command) = line.strip_prefix('/') else {
        return Input::Event(if listening {
            AppEvent::Recognizer(NativeEvent::final_result(line))
        } else {
            AppEvent::TypedIngredient(line.to_string())
        });
    };

    let (name, arg) = match command.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (command, ""),
    };

    match (name, arg) {
        ("mic", _) => Input::Event(AppEvent::ToggleMic),
        ("reset", _) => Input::Event(AppEvent::ResetMic),
        ("finish", _) => Input::Event(AppEvent::FinishRecipe),
        ("cook", id) => match id.parse::<u64>() {
            Ok(id) => Input::Event(AppEvent::StartCooking(id)),
            Err(_) => Input::Invalid(format!("not a recipe id: '{id}'")),
        },
        ("remove", n) => match n.parse::<usize>() {
            Ok(n) if n > 0 => Input::Event(AppEvent::RemoveIngredient(n - 1)),
            _ => Input::Invalid(format!("not an ingredient number: '{n}'")),
        },
        ("timer", "+1m") => Input::Event(AppEvent::TimerAddMinute),
        ("timer", "pause") => Input::Event(AppEvent::TimerTogglePause),
        ("timer", "cancel") => Input::Event(AppEvent::TimerCancel),
        ("search", query) if !query.is_empty() => {
            Input::Event(AppEvent::SearchQuery(query.to_string()))
        }
        ("lang", tag) if !tag.is_empty() => Input::Event(AppEvent::ChangeLanguage(tag.to_string())),
        ("quit" | "exit", _) => Input::Quit,
        ("help", _) => Input::Help,
        _ => Input::Invalid(format!("unknown command: '{line}'")),
    }
}

fn read_stdin(events_tx: mpsc::Sender<AppEvent>, listening: Arc<AtomicBool>) {
    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                log::error!("stdin: read failed: {e}");
                break;
            }
        };

        let event = match parse_line(&line, listening.load(Ordering::SeqCst)) {
            Input::Event(event) => event,
            Input::Quit => break,
            Input::Help => {
                println!("{USAGE}");
                continue;
            }
            Input::Empty => continue,
            Input::Invalid(msg) => {
                println!("{msg}\n{USAGE}");
                continue;
            }
        };
        if events_tx.blocking_send(event).is_err() {
            return;
        }
    }
    let _ = events_tx.blocking_send(AppEvent::Shutdown);
}

// ---------------------------------------------------------------------------
// Status printer
// ---------------------------------------------------------------------------

/// Print what changed in the shared state since the last poll.
async fn print_status(state: SharedState) {
    let mut seen_toast = 0;
    let mut seen_mic = MicStatus::Ready;
    let mut seen_results: Vec<u64> = Vec::new();
    let mut seen_step: Option<(usize, usize)> = None;
    let mut seen_timer: Option<u32> = None;

    let mut interval = tokio::time::interval(Duration::from_millis(200));
    loop {
        interval.tick().await;
        let st = state.lock().unwrap();

        if st.toast_seq != seen_toast {
            seen_toast = st.toast_seq;
            if let Some(toast) = &st.toast {
                let icon = match toast.kind {
                    ToastKind::Success => "✅",
                    ToastKind::Error => "⚠️",
                };
                println!("{icon} {}", toast.message);
            }
        }

        if st.mic_status != seen_mic {
            seen_mic = st.mic_status.clone();
            if let MicStatus::Error(msg) = &seen_mic {
                println!("🎙  error: {msg} (/mic to dismiss, /reset to recover)");
            }
        }

        let ids: Vec<u64> = st.search_results.iter().map(|r| r.id).collect();
        if ids != seen_results {
            for recipe in &st.search_results {
                println!(
                    "  [{}] {} (uses {}, missing {})",
                    recipe.id, recipe.title, recipe.used_ingredient_count, recipe.missed_ingredient_count
                );
            }
            seen_results = ids;
        }

        let step = st.recipe_title.as_ref().map(|_| (st.step_index, st.step_count));
        if step != seen_step {
            if let (Some(title), Some((index, count))) = (&st.recipe_title, step) {
                println!(
                    "📖 {title}: step {} of {count} ({:.0}%)",
                    index + 1,
                    st.step_progress
                );
            }
            seen_step = step;
        }

        // Whole minutes only, plus the final ten seconds.
        let timer = st.timer_remaining;
        if timer != seen_timer {
            if let Some(secs) = timer {
                if secs % 60 == 0 || secs <= 10 {
                    let paused = if st.timer_paused { " (paused)" } else { "" };
                    println!(
                        "⏱  {} of {} ({:.0}% left){paused}",
                        format_clock(secs),
                        format_clock(st.timer_initial),
                        st.timer_progress
                    );
                }
            }
            seen_timer = timer;
        }
    }
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn main() -> anyhow::Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("voice-chef starting up");

    // 2. Configuration
    let mut config = AppConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e}); using defaults");
        AppConfig::default()
    });
    config.apply_env();

    // 3. Tokio runtime
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .expect("failed to create tokio runtime");

    rt.block_on(run(config))
}

async fn run(config: AppConfig) -> anyhow::Result<()> {
    // 4. Collaborators
    let client = SpoonacularClient::from_config(&config.recipe_api);
    let has_key = client.has_api_key();
    let recipes: Arc<dyn RecipeApi> = Arc::new(client);

    if has_key {
        let api = Arc::clone(&recipes);
        tokio::spawn(async move {
            match api.test_api_key().await {
                Ok(()) => log::info!("Recipe API key accepted"),
                Err(e) => log::warn!("Recipe API key check failed: {e}"),
            }
        });
    } else {
        log::warn!(
            "No recipe API key configured; set {} or edit settings.toml",
            voice_chef::config::API_KEY_ENV
        );
    }

    let (native_tx, mut native_rx) = mpsc::unbounded_channel();
    let (spoken_tx, mut spoken_rx) = mpsc::unbounded_channel();
    let capability = ConsoleCapability::new(native_tx, spoken_tx);
    let listening = capability.listening_flag();

    // 5. Event loop and forwarders
    let (events_tx, events_rx) = mpsc::channel::<AppEvent>(64);
    let state = new_shared_state(&config);

    let assistant = Assistant::new(
        Arc::clone(&state),
        config,
        Box::new(capability),
        Box::new(CpalProbe::new()),
        recipes,
        events_tx.clone(),
    );
    let handle = tokio::spawn(assistant.run(events_rx));

    {
        let tx = events_tx.clone();
        tokio::spawn(async move {
            while let Some(event) = native_rx.recv().await {
                if tx.send(AppEvent::Recognizer(event)).await.is_err() {
                    break;
                }
            }
        });
    }
    {
        let tx = events_tx.clone();
        tokio::spawn(async move {
            while let Some(id) = spoken_rx.recv().await {
                if tx.send(AppEvent::SpeechEnded(id)).await.is_err() {
                    break;
                }
            }
        });
    }

    // 6. Status printer
    tokio::spawn(print_status(Arc::clone(&state)));

    // 7. Stdin
    let languages: Vec<&str> = SUPPORTED_LANGUAGES.iter().map(|(tag, _)| *tag).collect();
    println!("voice-chef ready. Languages: {}\n{USAGE}", languages.join(", "));
    std::thread::Builder::new()
        .name("stdin".into())
        .spawn(move || read_stdin(events_tx, listening))?;

    handle.await?;
    log::info!("voice-chef shut down");
    Ok(())
}
