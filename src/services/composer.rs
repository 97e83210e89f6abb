use crate::models::Template;
use crate::provider::{MessageComponent, MessageParameter};
use crate::services::variables::substitute_variables;
use std::collections::HashMap;

/// Flat human-readable rendering of a template with the given variable
/// values: header, body, footer and one `text: url` line per button,
/// separated by blank lines. Tokens without a value stay literal.
pub fn preview(template: &Template, values: &HashMap<String, String>) -> String {
    let mut sections: Vec<String> = Vec::new();

    if let Some(header) = &template.header {
        sections.push(substitute_variables(header, values));
    }
    sections.push(substitute_variables(&template.body, values));
    if let Some(footer) = &template.footer {
        sections.push(substitute_variables(footer, values));
    }
    if !template.buttons.is_empty() {
        let lines: Vec<String> = template
            .buttons
            .iter()
            .map(|b| format!("{}: {}", b.text, substitute_variables(&b.url, values)))
            .collect();
        sections.push(lines.join("\n"));
    }

    sections.join("\n\n")
}

/// Build the ordered provider payload components for a template send.
///
/// Components whose source field is absent are omitted. The BODY parameter
/// list follows `template.variables` exactly, not the order values happen to
/// be supplied; the provider binds parameters positionally.
pub fn build_components(
    template: &Template,
    values: &HashMap<String, String>,
) -> Vec<MessageComponent> {
    let mut components = Vec::new();

    if let Some(header) = &template.header {
        components.push(MessageComponent {
            component_type: "HEADER".to_string(),
            sub_type: None,
            index: None,
            text: Some(substitute_variables(header, values)),
            parameters: Vec::new(),
        });
    }

    let body_parameters: Vec<MessageParameter> = template
        .variables
        .iter()
        .map(|name| {
            let value = values
                .get(name)
                .cloned()
                .unwrap_or_else(|| format!("{{{{{}}}}}", name));
            MessageParameter::text(value)
        })
        .collect();

    components.push(MessageComponent {
        component_type: "BODY".to_string(),
        sub_type: None,
        index: None,
        text: Some(substitute_variables(&template.body, values)),
        parameters: body_parameters,
    });

    if let Some(footer) = &template.footer {
        components.push(MessageComponent {
            component_type: "FOOTER".to_string(),
            sub_type: None,
            index: None,
            text: Some(substitute_variables(footer, values)),
            parameters: Vec::new(),
        });
    }

    for (index, button) in template.buttons.iter().enumerate() {
        components.push(MessageComponent {
            component_type: "BUTTON".to_string(),
            sub_type: Some("URL".to_string()),
            index: Some(index),
            text: Some(button.text.clone()),
            parameters: vec![MessageParameter::text(substitute_variables(
                &button.url,
                values,
            ))],
        });
    }

    components
}
