use maud::{html, Markup, DOCTYPE};

pub const SCRIPT_URL: &str = "/vendor/mediapanel/mediapanel.js";
pub const STYLESHEET_URL: &str = "/vendor/mediapanel/mediapanel.css";

/// Renders the base HTML document with the widget assets attached.
pub fn layout(title: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                link rel="stylesheet" href=(STYLESHEET_URL);
            }
            body.mediapanel-page {
                (content)
                script src=(SCRIPT_URL) {}
            }
        }
    }
}
