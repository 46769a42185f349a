use crate::utils::flash::Flash;
use crate::views::layout::layout;
use maud::{html, Markup};
use mediapanel_core::models::{FolderTreeNode, MediaResource};
use mediapanel_core::MediaSettings;
use uuid::Uuid;

/// A folder flattened for a `<select>`, indented by depth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderOption {
    pub id: Uuid,
    pub name: String,
    pub depth: usize,
    pub media_count: i64,
}

impl FolderOption {
    fn label(&self) -> String {
        format!(
            "{}{} ({})",
            "\u{a0}\u{a0}".repeat(self.depth),
            self.name,
            self.media_count
        )
    }
}

/// Depth-first flattening; siblings keep the tree's order.
pub fn flatten_tree(nodes: &[FolderTreeNode]) -> Vec<FolderOption> {
    fn walk(nodes: &[FolderTreeNode], depth: usize, out: &mut Vec<FolderOption>) {
        for node in nodes {
            out.push(FolderOption {
                id: node.id,
                name: node.name.clone(),
                depth,
                media_count: node.media_count,
            });
            walk(&node.children, depth + 1, out);
        }
    }

    let mut out = Vec::new();
    walk(nodes, 0, &mut out);
    out
}

/// Everything the library page and the picker fragment render from.
pub struct LibraryView<'a> {
    pub media: &'a [MediaResource],
    pub folders: &'a [FolderOption],
    pub settings: &'a MediaSettings,
    pub search: Option<&'a str>,
    pub folder_id: Option<Uuid>,
}

impl LibraryView<'_> {
    fn accept(&self) -> String {
        self.settings.allowed_mimes.join(",")
    }
}

fn folder_select(view: &LibraryView, class: &str, all_label: &str) -> Markup {
    html! {
        select class=(class) name="folder_id" {
            option value="" { (all_label) }
            @for folder in view.folders {
                option value=(folder.id.to_string()) selected[view.folder_id == Some(folder.id)] {
                    (folder.label())
                }
            }
        }
    }
}

fn media_item(media: &MediaResource) -> Markup {
    let label = media.title.as_deref().unwrap_or(&media.name);
    html! {
        div.mediapanel-item data-id=(media.id.to_string()) title=(label) {
            img src=(media.thumb_url) alt=(media.alt.as_deref().unwrap_or("")) loading="lazy";
            span.mediapanel-item-name { (label) }
            span.mediapanel-item-meta { (media.width) "×" (media.height) }
        }
    }
}

/// Picker body: toolbar, drop zone and grid. Sent as `html` to AJAX clients.
pub fn modal_body(view: &LibraryView) -> Markup {
    let folders_enabled = view.settings.folders_enabled;
    html! {
        div.mediapanel-body
            data-max-size=(view.settings.max_size_kb)
            data-allowed-mimes=(view.accept())
            data-folders-enabled=(if folders_enabled { "true" } else { "false" }) {
            div.mediapanel-toolbar {
                input.mediapanel-search type="search" name="search"
                    placeholder="Search media..." value=[view.search];
                @if folders_enabled {
                    (folder_select(view, "mediapanel-folder-filter", "All folders"))
                }
            }
            div.mediapanel-dropzone {
                input.mediapanel-file-input type="file" name="image" accept=(view.accept()) multiple;
                p { "Drop images here or click to upload" }
                div.mediapanel-upload-status {}
            }
            div.mediapanel-grid {
                @if view.media.is_empty() {
                    p.mediapanel-empty { "No media found" }
                }
                @for media in view.media {
                    (media_item(media))
                }
            }
        }
    }
}

/// Full library page for browsers: flash, upload form, filters and grid.
pub fn index_page(view: &LibraryView, flash: Option<&Flash>) -> Markup {
    let folders_enabled = view.settings.folders_enabled;
    let content = html! {
        main.mediapanel-library {
            h1 { "Media library" }
            @if let Some(flash) = flash {
                div class={ "mediapanel-flash " (flash.kind.css_class()) } role="status" {
                    (flash.message)
                }
            }
            form.mediapanel-upload-form method="post" action="/media" enctype="multipart/form-data" {
                label {
                    "Image "
                    small { "(max " (view.settings.max_size_kb) " KB)" }
                    input type="file" name="image" accept=(view.accept()) required;
                }
                label { "Title" input type="text" name="title" maxlength="255"; }
                label { "Alt text" input type="text" name="alt" maxlength="255"; }
                label { "Caption" input type="text" name="caption" maxlength="500"; }
                label { "Description" textarea name="description" rows="3" {} }
                @if folders_enabled {
                    label { "Folder" (folder_select(view, "mediapanel-folder-field", "No folder")) }
                }
                button type="submit" { "Upload" }
            }
            form.mediapanel-filter-form method="get" action="/media" {
                input type="search" name="search" placeholder="Search media..." value=[view.search];
                @if folders_enabled {
                    (folder_select(view, "mediapanel-folder-filter", "All folders"))
                }
                button type="submit" { "Filter" }
            }
            (modal_body(view))
        }
    };

    layout("Media library", content)
}
