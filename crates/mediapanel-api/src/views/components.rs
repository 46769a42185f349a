//! Embeddable picker components.
//!
//! Both render plain markup wired through `data-*` attributes; the script
//! binds every `[data-mediapanel]` button it finds on load.

use maud::{html, Markup};

/// How a picker trigger delivers the chosen media.
#[derive(Debug, Clone, Default)]
pub struct PickerOptions<'a> {
    pub label: &'a str,
    /// `id` of an input that receives the chosen URL(s).
    pub target_input: Option<&'a str>,
    /// `id` of a rich-text editor that receives `<img>` tags.
    pub target_editor: Option<&'a str>,
    /// Size whose URL is inserted; the original when unset.
    pub size: Option<&'a str>,
    pub multiple: bool,
}

impl<'a> PickerOptions<'a> {
    pub fn new(label: &'a str) -> Self {
        Self {
            label,
            ..Self::default()
        }
    }
}

/// A trigger button that opens the picker.
pub fn media_button(options: &PickerOptions) -> Markup {
    html! {
        button.mediapanel-button type="button"
            data-mediapanel="true"
            data-target-input=[options.target_input]
            data-target-editor=[options.target_editor]
            data-size=[options.size]
            data-multiple=[options.multiple.then_some("true")] {
            (options.label)
        }
    }
}

fn input_id(name: &str) -> String {
    let safe: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();
    format!("mediapanel-input-{}", safe)
}

/// A form field: hidden input holding the chosen URL, a trigger and a preview.
pub fn media_input(name: &str, value: Option<&str>, options: &PickerOptions) -> Markup {
    let id = input_id(name);
    let button = PickerOptions {
        target_input: Some(&id),
        target_editor: None,
        ..options.clone()
    };

    html! {
        div.mediapanel-input {
            input type="hidden" id=(id) name=(name) value=[value];
            (media_button(&button))
            div.mediapanel-preview data-preview-for=(id) {
                @if let Some(url) = value.filter(|v| !v.is_empty()) {
                    img src=(url) alt="";
                }
            }
        }
    }
}
