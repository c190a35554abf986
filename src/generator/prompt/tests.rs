use super::*;
use crate::context::assemble;

#[test]
fn user_message_interpolates_question_and_context() {
    let context = assemble(&["B: 6h sleep on Tuesday", "A: 8h sleep on Monday"]);
    let prompt = build_prompt("How much did I sleep on Tuesday?", &context);

    assert_eq!(prompt.system, SYSTEM_INSTRUCTION);
    assert_eq!(
        prompt.user,
        "Question: How much did I sleep on Tuesday?\n\n\
         Context:\n- B: 6h sleep on Tuesday\n- A: 8h sleep on Monday\n\n\
         Answer with dates and numbers when possible."
    );
}

#[test]
fn system_instruction_demands_grounding() {
    assert!(SYSTEM_INSTRUCTION.contains("ONLY the provided context"));
    assert!(SYSTEM_INSTRUCTION.contains("insufficient"));
}

#[test]
fn empty_context_is_flagged() {
    let prompt = build_prompt("Anything?", "");
    assert!(prompt.user.contains("Context:\n(no context retrieved)\n"));
}

#[test]
fn custom_label_replaces_heading() {
    let prompt = build_labeled_prompt("Q?", "- row", "Context (sleep rows)");
    assert!(prompt.user.contains("Context (sleep rows):\n- row"));
}

#[test]
fn render_produces_copy_ready_block() {
    let prompt = Prompt {
        system: "sys".to_string(),
        user: "usr".to_string(),
    };
    assert_eq!(prompt.render(), "### SYSTEM\nsys\n\n### USER\nusr");
    assert_eq!(prompt.to_string(), prompt.render());
}
