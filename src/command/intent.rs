//! Voice command grammar.
//!
//! [`interpret`] is a pure function: it never fails, and anything it does not
//! recognise becomes [`Intent::Unrecognized`]. Patterns are tried in a fixed
//! precedence order and the first match wins.

use std::sync::LazyLock;

use regex::Regex;

/// The interpreted meaning of a final transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Search,
    /// The spoken ingredient, casing as recognised.
    AddIngredient(String),
    ClearIngredients,
    NextStep,
    PreviousStep,
    RepeatStep,
    PauseTimer,
    ResumeTimer,
    Help,
    Unrecognized,
}

impl Intent {
    pub fn label(&self) -> &'static str {
        match self {
            Intent::Search => "search",
            Intent::AddIngredient(_) => "add-ingredient",
            Intent::ClearIngredients => "clear-ingredients",
            Intent::NextStep => "next-step",
            Intent::PreviousStep => "previous-step",
            Intent::RepeatStep => "repeat-step",
            Intent::PauseTimer => "pause-timer",
            Intent::ResumeTimer => "resume-timer",
            Intent::Help => "help",
            Intent::Unrecognized => "unrecognized",
        }
    }
}

// ---------------------------------------------------------------------------
// Grammar
// ---------------------------------------------------------------------------

static ADD_INGREDIENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)add (?:ingredient |ingredients )?(.*)").expect("valid add-ingredient pattern")
});

// Frequent misrecognition of "add ingredient".
static AT_INGREDIENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)at ingredient (.*)").expect("valid at-ingredient pattern"));

/// One row of the grammar: phrases the command may contain, and whole
/// commands it may equal.
struct Rule {
    contains: &'static [&'static str],
    equals: &'static [&'static str],
}

impl Rule {
    fn matches(&self, command: &str) -> bool {
        self.contains.iter().any(|p| command.contains(p)) || self.equals.contains(&command)
    }
}

const SEARCH: Rule = Rule {
    contains: &["find recipes", "search recipes", "look for recipes"],
    equals: &["find recipe", "search", "search recipe"],
};

const CLEAR: Rule = Rule {
    contains: &["clear ingredients", "remove ingredients"],
    equals: &["clear all", "start over"],
};

const NEXT: Rule = Rule {
    contains: &["next step"],
    equals: &["next", "continue", "go on", "whats next"],
};

const PREVIOUS: Rule = Rule {
    contains: &["previous step"],
    equals: &["back", "go back", "previous"],
};

const REPEAT: Rule = Rule {
    contains: &["repeat"],
    equals: &["again", "say again", "what was that"],
};

const PAUSE: Rule = Rule {
    contains: &["pause timer"],
    equals: &["pause"],
};

const RESUME: Rule = Rule {
    contains: &["resume timer"],
    equals: &["resume", "continue timer"],
};

const HELP: Rule = Rule {
    contains: &["commands"],
    equals: &["help", "what can i say"],
};

/// Parse a transcript into an [`Intent`].
///
/// ```
/// use voice_chef::command::{interpret, Intent};
///
/// assert_eq!(interpret("  Find Recipes please "), Intent::Search);
/// assert_eq!(interpret("add ingredient Basil"), Intent::AddIngredient("Basil".into()));
/// assert_eq!(interpret("banana"), Intent::Unrecognized);
/// ```
pub fn interpret(transcript: &str) -> Intent {
    let trimmed = transcript.trim();
    let command = trimmed.to_lowercase();

    if SEARCH.matches(&command) {
        return Intent::Search;
    }
    if let Some(ingredient) = captured_ingredient(trimmed) {
        return Intent::AddIngredient(ingredient);
    }
    if CLEAR.matches(&command) {
        return Intent::ClearIngredients;
    }
    if NEXT.matches(&command) {
        return Intent::NextStep;
    }
    if PREVIOUS.matches(&command) {
        return Intent::PreviousStep;
    }
    if REPEAT.matches(&command) {
        return Intent::RepeatStep;
    }
    if PAUSE.matches(&command) {
        return Intent::PauseTimer;
    }
    if RESUME.matches(&command) {
        return Intent::ResumeTimer;
    }
    if HELP.matches(&command) {
        return Intent::Help;
    }
    Intent::Unrecognized
}

/// The `<rest>` of "add [ingredient ]<rest>", or `None` if it is too short to
/// be an ingredient.
fn captured_ingredient(transcript: &str) -> Option<String> {
    let captures = ADD_INGREDIENT
        .captures(transcript)
        .or_else(|| AT_INGREDIENT.captures(transcript))?;
    let rest = captures.get(1)?.as_str().trim();
    (rest.chars().count() > 1).then(|| rest.to_string())
}
