// Recommendation prose. Pure templating over the path table: the text does
// not vary with score magnitude or margin.

use crate::assessment::questions::CareerPath;

const NEXT_STEPS: [&str; 4] = [
    "Start with fundamental concepts in the recommended area",
    "Build small projects to apply what you learn",
    "Join communities and contribute to open source",
    "Continuously upgrade your skills with advanced courses",
];

/// Builds the markdown analysis shown with an assessment result.
pub fn generate_analysis(path: CareerPath) -> String {
    let info = path.info();

    let mut analysis = format!(
        "Based on your assessment responses, your recommended tech path is: **{}**\n\n",
        info.name
    );
    analysis.push_str(&format!("{}\n\n", info.description));

    analysis.push_str("**Why this path?**\n");
    analysis.push_str(&format!(
        "Your responses indicate strong interests and aptitude in the areas that define {}. ",
        info.name
    ));
    analysis.push_str("This path aligns with your learning style and career aspirations.\n\n");

    analysis.push_str("**Next Steps:**\n");
    for (i, step) in NEXT_STEPS.iter().enumerate() {
        analysis.push_str(&format!("{}. {step}\n", i + 1));
    }
    analysis.push('\n');

    analysis
}
