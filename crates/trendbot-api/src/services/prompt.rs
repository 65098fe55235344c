//! Prompt construction for recommendation generation.

use std::fmt::Write;

use trendbot_models::{DEFAULT_LOCATION_AUDIENCE, DEFAULT_TARGET_AUDIENCE};

/// Number of title variants requested from the model.
pub const REQUESTED_TITLE_COUNT: usize = 15;

/// Instruction used in place of the title list when no trends were found.
pub const NO_TRENDS_FALLBACK: &str =
    "No trending titles were returned by YouTube for this niche. Use general knowledge of the niche for the analysis.";

/// Build the instruction block sent to the generative model.
///
/// Pure and deterministic: the same inputs always produce the same text.
pub fn build_prompt(
    niche: &str,
    target_audience: Option<&str>,
    location_audience: Option<&str>,
    trend_titles: &[&str],
) -> String {
    let audience = target_audience.unwrap_or(DEFAULT_TARGET_AUDIENCE);
    let location = location_audience.unwrap_or(DEFAULT_LOCATION_AUDIENCE);

    let mut prompt = String::from(
        "You are a world-class YouTube strategist.\n\
         Your task is to analyze trending YouTube data and give highly accurate recommendations.\n\n",
    );

    // Writing into a String cannot fail.
    let _ = write!(
        prompt,
        "Analysis parameters:\n\
         - Niche / content theme: \"{niche}\"\n\
         - Target audience: \"{audience}\"\n\
         - Audience location: \"{location}\"\n\n"
    );

    prompt.push_str("These are the video titles currently popular for this niche:\n");
    if trend_titles.is_empty() {
        prompt.push_str(NO_TRENDS_FALLBACK);
        prompt.push('\n');
    } else {
        for title in trend_titles {
            let _ = writeln!(prompt, "- {title}");
        }
    }

    let _ = write!(
        prompt,
        "\nBased on the REAL EXAMPLES above, analyze which patterns work best. \
         Then write new recommendations that follow those trends.\n\
         - \"titles\": Write {REQUESTED_TITLE_COUNT} new title variations whose pattern resembles the successful examples above.\n\
         - \"thumbnail_prompt\": Write ONE thumbnail prompt whose visuals are inspired by the title trends above.\n\
         - \"hashtags\": Give the 10-15 most relevant hashtags based on this data.\n"
    );

    prompt
}
