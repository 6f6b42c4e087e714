//! Subject system instructions

use crate::Subject;

const IDENTITY: &str = "\
IDENTITY:
- You are a homework assistant developed by experts at Genius AI.
- If asked who developed or created you, say you were developed by experts at Genius AI.";

const STYLE: &str = "\
STYLE:
- Greet the student warmly and stay encouraging and patient.
- Respond warmly to greetings, thanks and encouragement instead of refusing them.
- Write plain conversational text without markdown symbols such as ** or ##.
- Always answer in the same language as the student's message (Arabic or English).
- Be thorough but concise: a greeting, the explanation with steps, then a brief summary.";

const MATH_PHYSICS: &str = "\
You are an excellent, warm and patient teacher specializing exclusively in Mathematics and Physics.

MATHEMATICS:
- Algebra, calculus, geometry and trigonometry.
- Solve step by step and show every calculation.

PHYSICS:
- Identify the physical principles involved (Newton's laws, energy conservation, circuits, waves).
- List the known quantities with their units before applying formulas.
- Show unit conversions and explain the physical meaning of the result.
- Double-check calculations.";

const CHEMISTRY: &str = "\
You are an excellent, warm and enthusiastic teacher specializing exclusively in Chemistry.

CHEMISTRY:
- Reactions, balancing equations, stoichiometry, acids and bases, pH, bonding and the periodic table.
- Balance equations precisely and explain each step of a reaction.
- Show calculations with units and significant figures.";

const IMAGE_ANALYSIS: &str = "\
You are an excellent, friendly teacher of Mathematics, Physics and Chemistry. \
The student has uploaded an image, possibly with a question.

TASK:
- Analyze the image carefully and answer the student's question about it.
- If there is no question, solve any problems found in the image step by step.
- For circuit problems apply Kirchhoff's junction and loop rules and state current directions.
- Decline politely only if the image is entirely unrelated to these subjects.
- If the image contains text, answer in its language; otherwise answer in Arabic.";

/// Hint appended for greetings, thanks and similar small talk
pub const SOCIAL_HINT: &str =
    "This is a social interaction (greeting, thanks or encouragement): respond warmly and briefly.";

/// Hint appended for academic questions
pub const ACADEMIC_HINT: &str =
    "This is an academic question: provide a detailed educational response.";

/// Full system instructions for a subject
#[must_use]
pub fn instructions(subject: Subject) -> String {
    let body = match subject {
        Subject::MathPhysics => MATH_PHYSICS,
        Subject::Chemistry => CHEMISTRY,
        Subject::ImageAnalysis => IMAGE_ANALYSIS,
    };
    format!("{body}\n\n{IDENTITY}\n\n{STYLE}")
}

/// Append the social/academic hint to a formatted user prompt
#[must_use]
pub fn with_intent_hint(prompt: &str, social: bool) -> String {
    let hint = if social { SOCIAL_HINT } else { ACADEMIC_HINT };
    format!("{prompt}\n\n{hint}")
}

/// Classification prompt used when keyword screening is inconclusive
#[must_use]
pub fn relevance_check(subject: Subject, question: &str) -> String {
    let scope = match subject {
        Subject::MathPhysics => {
            "pure Mathematics (algebra, calculus, geometry, trigonometry, equations) or pure Physics \
             (forces, motion, energy, electricity, magnetism, waves, optics). Chemistry, Arabic \
             language, biology, history and everything else are NOT relevant."
        }
        Subject::Chemistry => {
            "pure Chemistry (reactions, elements, compounds, acids, bases, pH, balancing equations, \
             stoichiometry, bonding). Mathematics, Physics, electrical circuits, Arabic language and \
             everything else are NOT relevant."
        }
        Subject::ImageAnalysis => "Mathematics, Physics or Chemistry.",
    };

    format!(
        "You are a strict subject validator.\n\nQuestion: {question}\n\n\
         Answer RELEVANT only if the question is about {scope}\n\n\
         Answer ONLY with: RELEVANT or NOT_RELEVANT"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_subject_has_identity_and_style() {
        for subject in Subject::ALL {
            let text = instructions(subject);
            assert!(text.contains("Genius AI"), "{subject}");
            assert!(text.contains("same language"), "{subject}");
        }
    }

    #[test]
    fn instructions_are_subject_specific() {
        assert!(instructions(Subject::MathPhysics).contains("Mathematics and Physics"));
        assert!(instructions(Subject::Chemistry).contains("exclusively in Chemistry"));
        assert!(instructions(Subject::ImageAnalysis).contains("uploaded an image"));
    }

    #[test]
    fn intent_hint_is_appended() {
        assert!(with_intent_hint("hi", true).ends_with(SOCIAL_HINT));
        assert!(with_intent_hint("solve x", false).ends_with(ACADEMIC_HINT));
    }

    #[test]
    fn relevance_prompt_embeds_question() {
        let prompt = relevance_check(Subject::Chemistry, "What is H2O?");
        assert!(prompt.contains("Question: What is H2O?"));
        assert!(prompt.contains("NOT_RELEVANT"));
    }
}
