//! Prompt sent to the generator on a cache miss.

use craft_core::ElementPair;

/// Worked examples shown to the model, as `(first, second, result, emoji)`.
pub const EXAMPLES: &[(&str, &str, &str, &str)] = &[
    ("Fire", "Water", "Steam", "💨"),
    ("Fire", "Earth", "Lava", "🌋"),
    ("Water", "Air", "Cloud", "☁️"),
    ("Earth", "Water", "Mud", "💦"),
];

pub fn build_prompt(pair: &ElementPair) -> String {
    let (first, second) = (pair.first(), pair.second());
    let mut prompt = String::new();

    prompt.push_str(
        "TASK: Combine the two elements provided below to create a realistic and creative result.\n",
    );
    prompt.push_str(
        "The result should be the logical combination of the two inputs, focusing on realism over creativity.\n",
    );
    prompt.push_str(&format!("- Inputs: {first} and {second}.\n"));
    prompt.push_str("- Rules:\n");
    prompt.push_str(
        "  - If combining two basic elements, prioritize creating a new thing derived from them rather than unrelated combinations.\n",
    );
    prompt.push_str(
        "  - Two of the same element should produce a larger or stronger version of it when that makes sense.\n",
    );
    prompt.push_str("  - The result must carry exactly one emoji.\n");
    prompt.push_str("  - Example combinations:\n");
    for (a, b, name, emoji) in EXAMPLES {
        prompt.push_str(&format!(
            "    - {a} + {b} = {{\"new_element\": \"{name}\", \"emoji\": \"{emoji}\"}}\n"
        ));
    }
    prompt.push_str(
        "  - Only return the result in strict JSON format: {\"new_element\": \"Name\", \"emoji\": \"Emoji\"}.\n",
    );
    prompt.push_str(&format!("- Inputs: {first} + {second}.\n"));
    prompt.push_str("Respond only with JSON.\n");
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_embeds_both_names() {
        let prompt = build_prompt(&ElementPair::new("Plant", "Time"));
        assert!(prompt.contains("- Inputs: Plant and Time."));
        assert!(prompt.contains("- Inputs: Plant + Time."));
    }

    #[test]
    fn test_prompt_lists_examples_as_json() {
        let prompt = build_prompt(&ElementPair::new("Fire", "Water"));
        assert!(prompt.contains(r#"Fire + Water = {"new_element": "Steam", "emoji": "💨"}"#));
        assert!(prompt.contains(r#"Earth + Water = {"new_element": "Mud", "emoji": "💦"}"#));
        assert!(prompt.trim_end().ends_with("Respond only with JSON."));
    }
}
