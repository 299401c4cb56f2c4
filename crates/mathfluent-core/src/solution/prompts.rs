//! Prompt templates sent to the tutor model.

use crate::tutor::{ExplainRequest, SolveRequest};

const LATEX_EXAMPLES: &str = "    - Fractions: `\\frac{a}{b}`
    - Exponents: `x^2`
    - Square roots: `\\sqrt{x}`";

pub const SOLVE_SYSTEM_PROMPT: &str = "You are an expert math tutor. Your goal is to provide clear, accurate, and step-by-step solutions to math problems.";

pub const EXPLAIN_SYSTEM_PROMPT: &str = "You are an expert math tutor, skilled at explaining complex mathematical concepts in a clear and accessible way.";

/// User prompt asking for a step-by-step solution.
pub fn solve_prompt(request: &SolveRequest) -> String {
    let mut prompt = format!("Problem: {}\n", request.problem);
    if let Some(topic) = non_blank(request.topic.as_deref()) {
        prompt.push_str(&format!("Topic: {}\n", topic));
    }
    if let Some(level) = non_blank(request.skill_level.as_deref()) {
        prompt.push_str(&format!("Skill Level: {}\n", level));
    }
    prompt.push_str(&format!(
        "
Instructions for solution:
1. Break down the solution into logical, easy-to-follow steps.
2. Clearly state what is being done in each step. Start each step on a new line as \"Step <n>:\".
3. IMPORTANT: Ensure all mathematical formulas, variables, symbols (e.g., pi, theta), and expressions are formatted using LaTeX. For example:
{}
    - Integrals: `\\int f(x) dx`
    - Summations: `\\sum_{{i=1}}^{{n}} x_i`
    - Greek letters: `\\alpha`, `\\beta`, `\\pi`, `\\theta`
    - Multiplication: Use `\\times` for multiplication symbol if needed, or juxtaposition for variables.
4. The final answer should be clearly stated at the end of the solution.

Solution:",
        LATEX_EXAMPLES
    ));
    prompt
}

/// User prompt asking to explain one step of an existing solution.
pub fn explain_prompt(request: &ExplainRequest) -> String {
    format!(
        "You will be provided with a math problem, its complete solution (where mathematical expressions are in LaTeX), and a specific step number within that solution.
Your task is to generate a detailed explanation of the mathematical principle, theorem, or operation used in that particular step. Tailor your explanation to be easily understood by a student at the relevant skill level for the problem.

Problem: {problem}
Complete Solution (with LaTeX): {solution}
Step Number to Explain: {step}

Instructions for explanation:
1. Focus specifically on the provided step number.
2. Explain the underlying mathematical concept(s) applied in this step.
3. If it involves a formula, state the formula and explain its components.
4. If it's an algebraic manipulation, explain the rule or property being used.
5. IMPORTANT: Ensure all mathematical formulas, variables, symbols, and expressions within your explanation are formatted using LaTeX. For example:
{latex}
    - Derivatives: `\\frac{{dy}}{{dx}}`
6. Be concise yet thorough.

Explanation of Step {step}:",
        problem = request.problem,
        solution = request.solution,
        step = request.step_number,
        latex = LATEX_EXAMPLES,
    )
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
