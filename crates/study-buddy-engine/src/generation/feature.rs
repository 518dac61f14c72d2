use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A study feature backed by text generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Feature {
    Summarize,
    Elaborate,
    Simplify,
    Rephrase,
    GenerateQuiz,
    GeneratePlan,
    Explain,
    SuggestCategory,
    ProgressInsight,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown feature '{0}'")]
pub struct UnknownFeature(pub String);

const MATH_HINT: &str =
    "Write any mathematics as LaTeX, using $...$ for inline math and $$...$$ for display math.";

impl Feature {
    pub const ALL: [Feature; 9] = [
        Feature::Summarize,
        Feature::Elaborate,
        Feature::Simplify,
        Feature::Rephrase,
        Feature::GenerateQuiz,
        Feature::GeneratePlan,
        Feature::Explain,
        Feature::SuggestCategory,
        Feature::ProgressInsight,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Feature::Summarize => "summarize",
            Feature::Elaborate => "elaborate",
            Feature::Simplify => "simplify",
            Feature::Rephrase => "rephrase",
            Feature::GenerateQuiz => "generate-quiz",
            Feature::GeneratePlan => "generate-plan",
            Feature::Explain => "explain",
            Feature::SuggestCategory => "suggest-category",
            Feature::ProgressInsight => "progress-insight",
        }
    }

    /// Builds the prompt sent to the generator for `input`.
    pub fn prompt(self, input: &str) -> String {
        let input = input.trim();
        match self {
            Feature::Summarize => format!(
                "Summarize the following study notes concisely. Keep key definitions and formulas. {MATH_HINT}\n\nNotes:\n{input}"
            ),
            Feature::Elaborate => format!(
                "Elaborate on the following study notes, adding context, examples and missing steps. {MATH_HINT}\n\nNotes:\n{input}"
            ),
            Feature::Simplify => format!(
                "Rewrite the following study notes in simpler language a beginner could follow. {MATH_HINT}\n\nNotes:\n{input}"
            ),
            Feature::Rephrase => format!(
                "Rephrase the following study notes, keeping the meaning but improving clarity. {MATH_HINT}\n\nNotes:\n{input}"
            ),
            Feature::GenerateQuiz => format!(
                "Create 5 quiz questions with answers from the following notes. Format every item as two lines, \"Q: <question>\" followed by \"A: <answer>\". {MATH_HINT}\n\nNotes:\n{input}"
            ),
            Feature::GeneratePlan => format!(
                "Create a day-by-day study plan for the following subjects and goals. Keep each day to a short bullet list.\n\nSubjects and goals:\n{input}"
            ),
            Feature::Explain => format!(
                "Explain the following concept clearly, step by step, with one worked example. {MATH_HINT}\n\nConcept:\n{input}"
            ),
            Feature::SuggestCategory => format!(
                "Suggest a single short category (one or two words, e.g. Math, Reading, Lab) for this study task. Reply with the category only.\n\nTask:\n{input}"
            ),
            Feature::ProgressInsight => format!(
                "Give one short, encouraging insight and one concrete next step based on this study progress.\n\nProgress:\n{input}"
            ),
        }
    }

    /// Shown to the user in place of output when generation fails.
    pub fn fallback(self) -> &'static str {
        match self {
            Feature::Summarize => "Couldn't summarize your notes right now. Please try again.",
            Feature::Elaborate => "Couldn't elaborate on your notes right now. Please try again.",
            Feature::Simplify => "Couldn't simplify your notes right now. Please try again.",
            Feature::Rephrase => "Couldn't rephrase your notes right now. Please try again.",
            Feature::GenerateQuiz => "Couldn't generate a quiz right now. Please try again.",
            Feature::GeneratePlan => "Couldn't generate a study plan right now. Please try again.",
            Feature::Explain => "Couldn't fetch an explanation right now. Please try again.",
            Feature::SuggestCategory => "General",
            Feature::ProgressInsight => "Keep going! Every session counts.",
        }
    }

    /// Post-processes raw generated text into what the feature displays.
    pub fn extract(self, raw: &str) -> String {
        match self {
            Feature::SuggestCategory => raw
                .lines()
                .map(|l| l.trim().trim_matches(['"', '\'', '*', '.']).trim())
                .find(|l| !l.is_empty())
                .unwrap_or(self.fallback())
                .to_string(),
            _ => raw.trim().to_string(),
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Feature {
    type Err = UnknownFeature;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Feature::ALL
            .into_iter()
            .find(|f| f.name() == s)
            .ok_or_else(|| UnknownFeature(s.to_string()))
    }
}
