//! Stored filename generation.

use chrono::{DateTime, Utc};
use rand::distr::{Alphanumeric, SampleString};
use std::path::Path;

const RANDOM_SUFFIX_LEN: usize = 8;

/// `{YYYYMMDDHHMMSS}_{8 alphanumerics}.{ext}`.
///
/// The extension comes from the client filename; when it has none the MIME
/// subtype is used instead.
pub fn generate_file_name(original_name: &str, mime: &str, now: DateTime<Utc>) -> String {
    let suffix = Alphanumeric.sample_string(&mut rand::rng(), RANDOM_SUFFIX_LEN);
    let extension = file_extension(original_name).unwrap_or_else(|| extension_for_mime(mime));

    format!("{}_{}.{}", now.format("%Y%m%d%H%M%S"), suffix, extension)
}

/// Lowercased ASCII-alphanumeric extension of a client filename.
pub fn file_extension(original_name: &str) -> Option<String> {
    let ext: String = Path::new(original_name)
        .extension()?
        .to_str()?
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .collect::<String>()
        .to_lowercase();

    (!ext.is_empty()).then_some(ext)
}

fn extension_for_mime(mime: &str) -> String {
    match mime {
        "image/jpeg" | "image/jpg" | "image/pjpeg" => "jpg".to_string(),
        "image/svg+xml" => "svg".to_string(),
        other => {
            let subtype: String = other
                .rsplit('/')
                .next()
                .unwrap_or("")
                .chars()
                .filter(char::is_ascii_alphanumeric)
                .collect();
            if subtype.is_empty() {
                "bin".to_string()
            } else {
                subtype
            }
        }
    }
}

/// Filename without directory or extension; used as the default title and alt.
pub fn title_from_filename(original_name: &str) -> Option<String> {
    let base = original_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(original_name);
    let stem = match base.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => base,
    };
    let stem = stem.trim();
    (!stem.is_empty()).then(|| stem.to_string())
}
